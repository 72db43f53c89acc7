//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the stored row shapes always match the `keyword` and `product` models. Any backend
//! `SeaORM` supports can be used through `DATABASE_URL`; `SQLite` is the default.

use crate::entities::{Keyword, Product};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://trend_monitor.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable or returns the
/// default local `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// # Errors
/// Returns `StorageUnavailable` if the database cannot be reached.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates the `trend_keywords` and `generated_products` tables if they do not exist.
///
/// # Errors
/// Returns an error if a `CREATE TABLE` statement fails.
#[instrument(skip(db))]
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut keyword_table = schema.create_table_from_entity(Keyword);
    keyword_table.if_not_exists();
    let mut product_table = schema.create_table_from_entity(Product);
    product_table.if_not_exists();

    db.execute(builder.build(&keyword_table)).await?;
    db.execute(builder.build(&product_table)).await?;

    info!("Database tables ensured.");
    Ok(())
}
