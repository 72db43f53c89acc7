//! Keyword lifecycle manager - Owns the `watching → generating → completed` state machine.
//!
//! | From                     | Event                  | To           |
//! |--------------------------|------------------------|--------------|
//! | (none)                   | `add_keyword`          | `watching`   |
//! | `watching`, `completed`  | `begin_generation`     | `generating` |
//! | `generating`             | `complete_generation`  | `completed`  |
//! | `generating`             | `fail_generation`      | `watching`   |
//!
//! Every transition is persisted through the [`Repository`] before it is reported, so
//! another observer sees `generating` while a generation is in flight. The status guard
//! is a read followed by a write against an external store and is therefore best-effort:
//! callers must serialize lifecycle events for the same keyword. Events for different
//! keywords are independent.
//!
//! A process that dies between `begin_generation` and the terminal transition leaves the
//! keyword in `generating`; [`LifecycleManager::sweep_stale_generations`] can return such
//! keywords to `watching`.

use crate::{
    core::product_log::ProductLog,
    entities::{KeywordStatus, keyword, product},
    errors::{Error, Result},
    generator::{GeneratedArtifact, Generator},
    repository::{KeywordChanges, NewProduct, Repository},
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, instrument, warn};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Notification published after each persisted transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A keyword was created in `watching`
    Added(keyword::Model),
    /// A keyword entered `generating`
    GenerationStarted(keyword::Model),
    /// A keyword reached `completed` and its product was stored
    GenerationCompleted {
        /// The keyword after the transition
        keyword: keyword::Model,
        /// The stored product
        product: product::Model,
    },
    /// A keyword was returned from `generating` to `watching`
    GenerationFailed(keyword::Model),
}

/// Result of a successful [`LifecycleManager::generate`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// The keyword, now `completed`
    pub keyword: keyword::Model,
    /// The product stored for it
    pub product: product::Model,
}

/// Drives keywords through their lifecycle using a repository and a generator.
pub struct LifecycleManager<R, G> {
    repository: R,
    generator: G,
    product_log: Option<Arc<ProductLog>>,
    events: broadcast::Sender<LifecycleEvent>,
}

impl<R, G> LifecycleManager<R, G>
where
    R: Repository,
    G: Generator,
{
    /// Creates a manager over the given storage and generation adapter.
    pub fn new(repository: R, generator: G) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            repository,
            generator,
            product_log: None,
            events,
        }
    }

    /// Mirrors every stored product into `log`. The caller keeps its own handle to the log.
    #[must_use]
    pub fn with_product_log(mut self, log: Arc<ProductLog>) -> Self {
        self.product_log = Some(log);
        self
    }

    /// Subscribes to transition notifications. Only events sent after this call are received.
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    /// The storage this manager writes through.
    pub const fn repository(&self) -> &R {
        &self.repository
    }

    /// Starts tracking a new keyword in `watching`.
    ///
    /// # Errors
    /// Returns `Validation` without touching storage if the trimmed text is empty.
    #[instrument(skip(self))]
    pub async fn add_keyword(&self, text: &str) -> Result<keyword::Model> {
        let text = crate::core::keyword::normalize_keyword_text(text)?;
        let keyword = self.repository.insert_keyword(text).await?;
        info!(keyword_id = keyword.id, "Trend keyword added");
        self.publish(LifecycleEvent::Added(keyword.clone()));
        Ok(keyword)
    }

    /// Looks up a keyword.
    ///
    /// # Errors
    /// Returns `KeywordNotFound` if it does not exist.
    pub async fn get_keyword(&self, id: i64) -> Result<keyword::Model> {
        self.repository.get_keyword(id).await
    }

    /// Keywords for a status tab (or all keywords), newest first.
    ///
    /// # Errors
    /// Returns `StorageUnavailable` if the store cannot be reached.
    pub async fn list_keywords(&self, status: Option<KeywordStatus>) -> Result<Vec<keyword::Model>> {
        self.repository.list_keywords(status).await
    }

    /// Most recent products across all keywords.
    ///
    /// # Errors
    /// Returns `StorageUnavailable` if the store cannot be reached.
    pub async fn recent_products(&self) -> Result<Vec<product::Model>> {
        self.repository.list_recent_products().await
    }

    /// Products generated for one keyword, newest first.
    ///
    /// # Errors
    /// Returns `StorageUnavailable` if the store cannot be reached.
    pub async fn products_for_keyword(&self, keyword_id: i64) -> Result<Vec<product::Model>> {
        self.repository.list_products_by_keyword(keyword_id).await
    }

    /// Moves a `watching` or `completed` keyword to `generating`, counting the search.
    ///
    /// `last_generated_at` is left as it is.
    ///
    /// # Errors
    /// Returns `InvalidTransition` if the keyword is already `generating`, or
    /// `KeywordNotFound` if it does not exist.
    #[instrument(skip(self))]
    pub async fn begin_generation(&self, id: i64) -> Result<keyword::Model> {
        let current = self.repository.get_keyword(id).await?;
        if current.status == KeywordStatus::Generating {
            return Err(Error::InvalidTransition {
                id,
                from: current.status,
                event: "begin generation for",
            });
        }

        let changes = KeywordChanges {
            status: Some(KeywordStatus::Generating),
            increment_search_count: true,
            last_searched_at: Some(Utc::now()),
            last_generated_at: None,
        };
        let keyword = self.repository.update_keyword(id, changes).await?;
        info!(
            keyword_id = id,
            search_count = keyword.search_count,
            "Generation started"
        );
        self.publish(LifecycleEvent::GenerationStarted(keyword.clone()));
        Ok(keyword)
    }

    /// Stores the generated product and moves the keyword from `generating` to `completed`.
    ///
    /// Both writes are applied atomically by the repository; on failure no product is kept.
    ///
    /// # Errors
    /// Returns `InvalidTransition` if the keyword is not `generating`, `Conflict` if the
    /// SKU is already taken, or `KeywordNotFound` if the keyword does not exist.
    #[instrument(skip(self, artifact), fields(sku = %artifact.sku))]
    pub async fn complete_generation(
        &self,
        id: i64,
        artifact: GeneratedArtifact,
    ) -> Result<Generation> {
        let current = self.require_generating(id, "complete generation for").await?;

        // Product insert and status change commit together or not at all
        let (keyword, product) = self
            .repository
            .record_completion(
                NewProduct {
                    keyword_id: id,
                    keyword_text: current.keyword,
                    sku: artifact.sku,
                    product_url: artifact.product_url,
                },
                Utc::now(),
            )
            .await?;

        if let Some(log) = &self.product_log {
            if let Err(e) = log.append(&product).await {
                warn!(sku = %product.sku, "Failed to append product to local log: {}", e);
            }
        }

        info!(keyword_id = id, product_id = product.id, "Generation completed");
        self.publish(LifecycleEvent::GenerationCompleted {
            keyword: keyword.clone(),
            product: product.clone(),
        });
        Ok(Generation { keyword, product })
    }

    /// Returns a `generating` keyword to `watching`.
    ///
    /// Only the status changes; the search count and `last_searched_at` written by
    /// [`begin_generation`](Self::begin_generation) stay.
    ///
    /// # Errors
    /// Returns `InvalidTransition` if the keyword is not `generating`, or
    /// `KeywordNotFound` if it does not exist.
    #[instrument(skip(self))]
    pub async fn fail_generation(&self, id: i64) -> Result<keyword::Model> {
        self.require_generating(id, "fail generation for").await?;

        let keyword = self
            .repository
            .update_keyword(id, KeywordChanges::status(KeywordStatus::Watching))
            .await?;
        warn!(keyword_id = id, "Generation rolled back to watching");
        self.publish(LifecycleEvent::GenerationFailed(keyword.clone()));
        Ok(keyword)
    }

    /// Runs a full generation for a keyword: begin, call the generator, then complete or fail.
    ///
    /// If the generator fails, the keyword goes back to `watching` and `GenerationFailed`
    /// is returned with the generator's error as its source. If storing the product fails
    /// (for example a `Conflict` on the SKU), the keyword also goes back to `watching` and
    /// the storage error is returned. A failed rollback is logged and does not replace the
    /// original error.
    ///
    /// # Errors
    /// See above; also any error from [`begin_generation`](Self::begin_generation).
    #[instrument(skip(self))]
    pub async fn generate(&self, id: i64) -> Result<Generation> {
        let keyword = self.begin_generation(id).await?;

        let artifact = match self.generator.generate(&keyword.keyword).await {
            Ok(artifact) => artifact,
            Err(source) => {
                error!(keyword_id = id, "Generator failed: {}", source);
                self.roll_back(id).await;
                return Err(Error::GenerationFailed {
                    keyword: keyword.keyword,
                    source,
                });
            }
        };

        match self.complete_generation(id, artifact).await {
            Ok(generation) => Ok(generation),
            Err(e) => {
                error!(keyword_id = id, "Failed to record generated product: {}", e);
                self.roll_back(id).await;
                Err(e)
            }
        }
    }

    /// Returns keywords stuck in `generating` for longer than `older_than` to `watching`.
    ///
    /// A keyword counts as stuck when its `last_searched_at` (written when the generation
    /// began) is older than the threshold, or missing. Only the first page of `generating`
    /// keywords is examined per call. Keywords that cannot be reverted are logged and skipped.
    ///
    /// # Errors
    /// Returns `StorageUnavailable` if the `generating` keywords cannot be listed.
    #[instrument(skip(self))]
    pub async fn sweep_stale_generations(&self, older_than: Duration) -> Result<Vec<keyword::Model>> {
        let cutoff = Utc::now() - older_than;
        let generating = self
            .repository
            .list_keywords(Some(KeywordStatus::Generating))
            .await?;

        let mut reverted = Vec::new();
        for keyword in generating {
            let stale = keyword.last_searched_at.is_none_or(|at| at < cutoff);
            if !stale {
                continue;
            }
            match self.fail_generation(keyword.id).await {
                Ok(keyword) => reverted.push(keyword),
                Err(e) => warn!(keyword_id = keyword.id, "Could not revert stale keyword: {}", e),
            }
        }
        if !reverted.is_empty() {
            info!("Reverted {} stale generating keywords", reverted.len());
        }
        Ok(reverted)
    }

    async fn require_generating(&self, id: i64, event: &'static str) -> Result<keyword::Model> {
        let current = self.repository.get_keyword(id).await?;
        if current.status != KeywordStatus::Generating {
            return Err(Error::InvalidTransition {
                id,
                from: current.status,
                event,
            });
        }
        Ok(current)
    }

    async fn roll_back(&self, id: i64) {
        if let Err(e) = self.fail_generation(id).await {
            error!(keyword_id = id, "Rollback to watching failed: {}", e);
        }
    }

    fn publish(&self, event: LifecycleEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
