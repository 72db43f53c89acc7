//! Product persistence - Handles storing and listing generated products.
//!
//! Products are immutable: this module only inserts and reads them. SKU uniqueness is
//! enforced by the store, and a collision surfaces as a `Conflict` error so the caller
//! can generate a fresh SKU and retry.

use crate::{
    core::keyword::{KeywordChanges, update_keyword},
    entities::{KeywordStatus, Product, keyword, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use tracing::{debug, instrument, warn};

/// Fields of a product about to be stored. The ID and creation time are assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    /// Keyword that produced the product
    pub keyword_id: i64,
    /// Keyword text at generation time
    pub keyword_text: String,
    /// Stock identifier, unique across all products
    pub sku: String,
    /// Location of the generated product
    pub product_url: String,
}

/// Stores a newly generated product.
///
/// # Errors
/// Returns an error if:
/// - The SKU or product URL is empty
/// - Another product already uses the SKU (`Conflict`)
/// - The database insert operation fails
#[instrument(skip(db, new_product), fields(keyword_id = new_product.keyword_id, sku = %new_product.sku))]
pub async fn create_product<C>(db: &C, new_product: NewProduct) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    if new_product.sku.trim().is_empty() {
        return Err(Error::Validation {
            message: "Product SKU cannot be empty".to_string(),
        });
    }
    if new_product.product_url.trim().is_empty() {
        return Err(Error::Validation {
            message: "Product URL cannot be empty".to_string(),
        });
    }

    let product = product::ActiveModel {
        keyword_id: Set(new_product.keyword_id),
        keyword_text: Set(new_product.keyword_text),
        sku: Set(new_product.sku),
        product_url: Set(new_product.product_url),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let created = product.insert(db).await?;
    debug!(product_id = created.id, "Product stored");
    Ok(created)
}

/// Stores a generated product and marks its keyword `completed` in one database transaction.
///
/// Either both writes land or neither does, so a product never exists for a generation
/// whose keyword did not reach `completed`.
///
/// # Errors
/// Returns an error if:
/// - The product fails validation or its SKU is taken (`Conflict`)
/// - The keyword does not exist
/// - Either write or the commit fails; the transaction is rolled back
#[instrument(skip(db, new_product), fields(keyword_id = new_product.keyword_id, sku = %new_product.sku))]
pub async fn record_completed_generation(
    db: &DatabaseConnection,
    new_product: NewProduct,
    generated_at: DateTimeUtc,
) -> Result<(keyword::Model, product::Model)> {
    let keyword_id = new_product.keyword_id;
    let changes = KeywordChanges {
        status: Some(KeywordStatus::Completed),
        last_generated_at: Some(generated_at),
        ..KeywordChanges::default()
    };

    // Use a transaction to ensure atomicity
    let txn = db.begin().await?;

    let written = async {
        let product = create_product(&txn, new_product).await?;
        let keyword = update_keyword(&txn, keyword_id, &changes).await?;
        Ok::<_, Error>((keyword, product))
    }
    .await;

    match written {
        Ok(written) => {
            txn.commit().await?;
            Ok(written)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!("Rollback of completed generation failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

/// Retrieves all products generated for a keyword, newest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_products_for_keyword<C>(db: &C, keyword_id: i64) -> Result<Vec<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .filter(product::Column::KeywordId.eq(keyword_id))
        .order_by_desc(product::Column::CreatedAt)
        .order_by_desc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the most recently generated products across all keywords.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_recent_products<C>(db: &C, limit: u64) -> Result<Vec<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .order_by_desc(product::Column::CreatedAt)
        .order_by_desc(product::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}
