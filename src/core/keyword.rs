//! Keyword persistence - Query and mutation functions for tracked keywords.
//!
//! These functions work over any `SeaORM` connection or transaction and back the
//! `SeaORM` repository. They enforce input validation but not lifecycle rules;
//! status transitions are decided by the lifecycle manager.

use crate::{
    entities::{Keyword, KeywordStatus, keyword},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*, sea_query::Expr};
use tracing::{debug, instrument};

/// Partial update applied to a keyword row. Fields left as `None` are not touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordChanges {
    /// New lifecycle status
    pub status: Option<KeywordStatus>,
    /// Add one to `search_count` in the same statement as the other changes
    pub increment_search_count: bool,
    /// New `last_searched_at`
    pub last_searched_at: Option<DateTimeUtc>,
    /// New `last_generated_at`
    pub last_generated_at: Option<DateTimeUtc>,
}

impl KeywordChanges {
    /// Changes that only set the status.
    #[must_use]
    pub fn status(status: KeywordStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Whether applying these changes would leave the row as it is.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && !self.increment_search_count
            && self.last_searched_at.is_none()
            && self.last_generated_at.is_none()
    }
}

/// Returns the trimmed keyword text, or a validation error if nothing is left.
///
/// # Errors
/// Returns `Validation` if the text is empty or whitespace-only.
pub fn normalize_keyword_text(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation {
            message: "Keyword text cannot be empty".to_string(),
        });
    }
    Ok(trimmed)
}

/// Lists keywords newest-first, optionally restricted to one status, capped at `limit`.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_keywords<C>(
    db: &C,
    status: Option<KeywordStatus>,
    limit: u64,
) -> Result<Vec<keyword::Model>>
where
    C: ConnectionTrait,
{
    let mut query = Keyword::find();
    if let Some(status) = status {
        query = query.filter(keyword::Column::Status.eq(status));
    }
    query
        .order_by_desc(keyword::Column::CreatedAt)
        .order_by_desc(keyword::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a keyword by its unique ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_keyword_by_id<C>(db: &C, keyword_id: i64) -> Result<Option<keyword::Model>>
where
    C: ConnectionTrait,
{
    Keyword::find_by_id(keyword_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new keyword in the `watching` state with a zero search count.
///
/// # Errors
/// Returns an error if:
/// - The keyword text is empty or whitespace-only
/// - The database insert operation fails
#[instrument(skip(db))]
pub async fn create_keyword<C>(db: &C, text: &str) -> Result<keyword::Model>
where
    C: ConnectionTrait,
{
    let text = normalize_keyword_text(text)?;

    let keyword = keyword::ActiveModel {
        keyword: Set(text.to_string()),
        search_count: Set(0),
        last_searched_at: Set(None),
        status: Set(KeywordStatus::Watching),
        last_generated_at: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let created = keyword.insert(db).await?;
    debug!(keyword_id = created.id, "Keyword created");
    Ok(created)
}

/// Applies a partial update to a keyword and returns the updated row.
///
/// The search count is incremented in the database (`search_count = search_count + 1`)
/// rather than read, modified and written back, so concurrent increments are not lost.
///
/// # Errors
/// Returns `KeywordNotFound` if no keyword has this ID, or an error if the update fails.
#[instrument(skip(db))]
pub async fn update_keyword<C>(
    db: &C,
    keyword_id: i64,
    changes: &KeywordChanges,
) -> Result<keyword::Model>
where
    C: ConnectionTrait,
{
    if !changes.is_empty() {
        let mut update = Keyword::update_many();
        if let Some(status) = changes.status {
            update = update.col_expr(keyword::Column::Status, Expr::value(status.into_value()));
        }
        if changes.increment_search_count {
            update = update.col_expr(
                keyword::Column::SearchCount,
                Expr::col(keyword::Column::SearchCount).add(1),
            );
        }
        if let Some(at) = changes.last_searched_at {
            update = update.col_expr(keyword::Column::LastSearchedAt, Expr::value(at));
        }
        if let Some(at) = changes.last_generated_at {
            update = update.col_expr(keyword::Column::LastGeneratedAt, Expr::value(at));
        }

        let result = update
            .filter(keyword::Column::Id.eq(keyword_id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(Error::KeywordNotFound { id: keyword_id });
        }
    }

    get_keyword_by_id(db, keyword_id)
        .await?
        .ok_or(Error::KeywordNotFound { id: keyword_id })
}
