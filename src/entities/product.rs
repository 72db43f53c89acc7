//! Product entity - Represents a product generated from a trend keyword.
//!
//! Products are only ever created as the side effect of a successful generation
//! and are never modified afterwards. The keyword text is copied at generation
//! time so the record stays readable even if the keyword is later renamed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Generated product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "generated_products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the keyword that produced this product
    pub keyword_id: i64,
    /// Keyword text at the time of generation
    pub keyword_text: String,
    /// Stock identifier assigned by the generator (e.g., "SKU-1234")
    #[sea_orm(unique)]
    pub sku: String,
    /// Location of the generated product
    pub product_url: String,
    /// When the product was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product belongs to one keyword
    #[sea_orm(
        belongs_to = "super::keyword::Entity",
        from = "Column::KeywordId",
        to = "super::keyword::Column::Id"
    )]
    Keyword,
}

impl Related<super::keyword::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Keyword.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
