use super::{KeywordChanges, NewProduct, Repository};
use crate::core::{keyword as keyword_store, product as product_store};
use crate::entities::{KeywordStatus, keyword, product};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

/// Default maximum number of rows returned by a listing.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Repository backed by a `SeaORM` database connection.
#[derive(Debug)]
pub struct SeaOrmRepository {
    db: DatabaseConnection,
    page_size: u64,
}

impl SeaOrmRepository {
    /// Creates a repository using the default page size.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the listing cap. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// The listing cap.
    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }
}

#[async_trait]
impl Repository for SeaOrmRepository {
    async fn list_keywords(&self, status: Option<KeywordStatus>) -> Result<Vec<keyword::Model>> {
        keyword_store::list_keywords(&self.db, status, self.page_size).await
    }

    async fn get_keyword(&self, id: i64) -> Result<keyword::Model> {
        keyword_store::get_keyword_by_id(&self.db, id)
            .await?
            .ok_or(Error::KeywordNotFound { id })
    }

    async fn insert_keyword(&self, text: &str) -> Result<keyword::Model> {
        keyword_store::create_keyword(&self.db, text).await
    }

    async fn update_keyword(&self, id: i64, changes: KeywordChanges) -> Result<keyword::Model> {
        keyword_store::update_keyword(&self.db, id, &changes).await
    }

    async fn insert_product(&self, product: NewProduct) -> Result<product::Model> {
        product_store::create_product(&self.db, product).await
    }

    async fn record_completion(
        &self,
        new_product: NewProduct,
        generated_at: DateTime<Utc>,
    ) -> Result<(keyword::Model, product::Model)> {
        product_store::record_completed_generation(&self.db, new_product, generated_at).await
    }

    async fn list_products_by_keyword(&self, keyword_id: i64) -> Result<Vec<product::Model>> {
        product_store::get_products_for_keyword(&self.db, keyword_id).await
    }

    async fn list_recent_products(&self) -> Result<Vec<product::Model>> {
        product_store::get_recent_products(&self.db, self.page_size).await
    }
}
