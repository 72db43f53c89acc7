//! Keyword entity - Represents a tracked trend keyword and its lifecycle status.
//!
//! Keywords are created by explicit user action and move between `watching`,
//! `generating` and `completed` as products are generated for them. Counters and
//! timestamps are written by the lifecycle manager, never by callers directly.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a keyword, stored as its lowercase name.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum KeywordStatus {
    /// Tracked, no generation in flight. Initial state of every keyword.
    #[sea_orm(string_value = "watching")]
    Watching,
    /// A generation attempt has been persisted and not yet resolved.
    #[sea_orm(string_value = "generating")]
    Generating,
    /// The most recent generation attempt produced a product.
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl KeywordStatus {
    /// The stored string form of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Watching => "watching",
            Self::Generating => "generating",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for KeywordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trend_keywords")]
pub struct Model {
    /// Unique identifier for the keyword
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Search term as entered by the user, trimmed (e.g., "horror movie svg")
    pub keyword: String,
    /// Number of times the keyword has been selected for generation
    pub search_count: i32,
    /// When the keyword was last selected for generation
    pub last_searched_at: Option<DateTimeUtc>,
    /// Current lifecycle status
    pub status: KeywordStatus,
    /// When a generation for this keyword last completed successfully
    pub last_generated_at: Option<DateTimeUtc>,
    /// When the keyword was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Keyword and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One keyword has many generated products
    #[sea_orm(has_many = "super::product::Entity")]
    Products,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
