//! Repository layer - The storage contract the lifecycle manager depends on.
//!
//! The manager never talks to a database directly. It is handed something that
//! implements [`Repository`]; [`SeaOrmRepository`] is the implementation backed by any
//! `SeaORM` connection.

/// `SeaORM`-backed repository
pub mod sea;

pub use crate::core::keyword::KeywordChanges;
pub use crate::core::product::NewProduct;
pub use sea::SeaOrmRepository;

use crate::entities::{KeywordStatus, keyword, product};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// CRUD and filtered queries over keywords and products.
///
/// Every method may fail with `StorageUnavailable` when the store cannot be reached.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Keywords newest-first by creation time, optionally filtered by status, capped at the page size.
    async fn list_keywords(&self, status: Option<KeywordStatus>) -> Result<Vec<keyword::Model>>;

    /// A single keyword. Fails with `KeywordNotFound` if it does not exist.
    async fn get_keyword(&self, id: i64) -> Result<keyword::Model>;

    /// Stores a new `watching` keyword. Fails with `Validation` if the trimmed text is empty.
    async fn insert_keyword(&self, text: &str) -> Result<keyword::Model>;

    /// Applies `changes` and returns the updated keyword. Fails with `KeywordNotFound`.
    async fn update_keyword(&self, id: i64, changes: KeywordChanges) -> Result<keyword::Model>;

    /// Stores a product. Fails with `Conflict` if the SKU is already taken.
    async fn insert_product(&self, product: NewProduct) -> Result<product::Model>;

    /// Stores a product and marks its keyword `completed` with `last_generated_at = generated_at`,
    /// atomically: if either write fails, neither is kept.
    async fn record_completion(
        &self,
        new_product: NewProduct,
        generated_at: DateTime<Utc>,
    ) -> Result<(keyword::Model, product::Model)>;

    /// Products generated for one keyword, newest first.
    async fn list_products_by_keyword(&self, keyword_id: i64) -> Result<Vec<product::Model>>;

    /// The most recent products across all keywords, capped at the page size.
    async fn list_recent_products(&self) -> Result<Vec<product::Model>>;
}
