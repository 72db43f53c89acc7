//! Shared test utilities.
//!
//! This module provides helpers for setting up in-memory test databases, creating test
//! entities with sensible defaults, and deterministic generation adapters.

use crate::{
    core::{keyword, product::NewProduct},
    entities::{self, KeywordStatus},
    errors::{BoxError, Error, Result},
    generator::{GeneratedArtifact, Generator, product_slug},
    repository::{KeywordChanges, Repository, SeaOrmRepository},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

/// Installs a tracing subscriber that writes through the test harness. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a repository over a fresh in-memory database.
pub async fn setup_test_repository() -> Result<SeaOrmRepository> {
    Ok(SeaOrmRepository::new(setup_test_db().await?))
}

/// Creates a `watching` keyword directly in the database.
pub async fn create_test_keyword(
    db: &DatabaseConnection,
    text: &str,
) -> Result<entities::keyword::Model> {
    keyword::create_keyword(db, text).await
}

/// Sets up a complete test environment with one keyword.
/// Returns (db, keyword) for product-related tests.
pub async fn setup_with_keyword() -> Result<(DatabaseConnection, entities::keyword::Model)> {
    let db = setup_test_db().await?;
    let keyword = create_test_keyword(&db, "horror movie svg").await?;
    Ok((db, keyword))
}

/// Makes every update that sets a keyword to `completed` abort inside the database.
pub async fn fail_completed_status_updates(db: &DatabaseConnection) -> Result<()> {
    db.execute_unprepared(
        "CREATE TRIGGER fail_completed_status \
         BEFORE UPDATE OF status ON trend_keywords \
         WHEN NEW.status = 'completed' \
         BEGIN SELECT RAISE(ABORT, 'connection reset'); END;",
    )
    .await?;
    Ok(())
}

/// Product fields for `keyword_id` with the given SKU.
pub fn test_new_product(keyword_id: i64, sku: &str) -> NewProduct {
    NewProduct {
        keyword_id,
        keyword_text: "horror movie svg".to_string(),
        sku: sku.to_string(),
        product_url: "https://example.com/product/horror-movie-svg".to_string(),
    }
}

/// Generator output for `keyword` with the given SKU.
pub fn test_artifact(sku: &str, keyword: &str) -> GeneratedArtifact {
    GeneratedArtifact {
        sku: sku.to_string(),
        product_url: format!("https://example.com/product/{}", product_slug(keyword)),
    }
}

/// Always returns the same artifact.
#[derive(Debug, Clone)]
pub struct FixedGenerator {
    artifact: GeneratedArtifact,
}

impl FixedGenerator {
    pub fn new(sku: &str, product_url: &str) -> Self {
        Self {
            artifact: GeneratedArtifact {
                sku: sku.to_string(),
                product_url: product_url.to_string(),
            },
        }
    }
}

impl Default for FixedGenerator {
    fn default() -> Self {
        Self::new("SKU-1234", "https://example.com/product/test")
    }
}

#[async_trait]
impl Generator for FixedGenerator {
    async fn generate(&self, _keyword: &str) -> std::result::Result<GeneratedArtifact, BoxError> {
        Ok(self.artifact.clone())
    }
}

/// Always fails with the given message.
#[derive(Debug, Clone)]
pub struct FailingGenerator {
    message: String,
}

impl FailingGenerator {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _keyword: &str) -> std::result::Result<GeneratedArtifact, BoxError> {
        Err(self.message.clone().into())
    }
}

/// Returns `SKU-1`, `SKU-2`, ... with a slug URL for the keyword.
#[derive(Debug, Default)]
pub struct SequenceGenerator {
    next: AtomicUsize,
}

#[async_trait]
impl Generator for SequenceGenerator {
    async fn generate(&self, keyword: &str) -> std::result::Result<GeneratedArtifact, BoxError> {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(test_artifact(&format!("SKU-{n}"), keyword))
    }
}

/// The repository call a [`FailingRepository`] refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// Updates that set the status to `generating`
    BeginGeneration,
    /// The atomic product insert and `completed` update
    Completion,
    /// Updates that set the status back to `watching`
    Rollback,
}

/// Wraps a real repository and reports the store as unreachable at one point.
#[derive(Debug)]
pub struct FailingRepository {
    inner: SeaOrmRepository,
    fail_at: FailurePoint,
}

impl FailingRepository {
    pub const fn new(inner: SeaOrmRepository, fail_at: FailurePoint) -> Self {
        Self { inner, fail_at }
    }

    fn unavailable() -> Error {
        Error::StorageUnavailable {
            message: "connection reset".to_string(),
        }
    }
}

#[async_trait]
impl Repository for FailingRepository {
    async fn list_keywords(
        &self,
        status: Option<KeywordStatus>,
    ) -> Result<Vec<entities::keyword::Model>> {
        self.inner.list_keywords(status).await
    }

    async fn get_keyword(&self, id: i64) -> Result<entities::keyword::Model> {
        self.inner.get_keyword(id).await
    }

    async fn insert_keyword(&self, text: &str) -> Result<entities::keyword::Model> {
        self.inner.insert_keyword(text).await
    }

    async fn update_keyword(
        &self,
        id: i64,
        changes: KeywordChanges,
    ) -> Result<entities::keyword::Model> {
        let refused = match changes.status {
            Some(KeywordStatus::Generating) => self.fail_at == FailurePoint::BeginGeneration,
            Some(KeywordStatus::Watching) => self.fail_at == FailurePoint::Rollback,
            _ => false,
        };
        if refused {
            return Err(Self::unavailable());
        }
        self.inner.update_keyword(id, changes).await
    }

    async fn insert_product(&self, product: NewProduct) -> Result<entities::product::Model> {
        self.inner.insert_product(product).await
    }

    async fn record_completion(
        &self,
        new_product: NewProduct,
        generated_at: DateTime<Utc>,
    ) -> Result<(entities::keyword::Model, entities::product::Model)> {
        if self.fail_at == FailurePoint::Completion {
            return Err(Self::unavailable());
        }
        self.inner.record_completion(new_product, generated_at).await
    }

    async fn list_products_by_keyword(
        &self,
        keyword_id: i64,
    ) -> Result<Vec<entities::product::Model>> {
        self.inner.list_products_by_keyword(keyword_id).await
    }

    async fn list_recent_products(&self) -> Result<Vec<entities::product::Model>> {
        self.inner.list_recent_products().await
    }
}
