use super::{GeneratedArtifact, Generator};
use crate::errors::BoxError;
use async_trait::async_trait;
use rand::Rng;

const DEFAULT_BASE_URL: &str = "https://example.com/product";

/// Turns keyword text into a URL path segment: whitespace runs become `-`, letters are lowercased.
#[must_use]
pub fn product_slug(keyword: &str) -> String {
    keyword
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Generator that invents a product without calling anything.
///
/// SKUs are `SKU-<n>` with `n` drawn from `0..10000`, so collisions are possible and
/// surface as `Conflict` when the product is stored.
#[derive(Debug, Clone)]
pub struct MockGenerator {
    base_url: String,
}

impl MockGenerator {
    /// Creates a generator whose product URLs live under `base_url`.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, keyword: &str) -> Result<GeneratedArtifact, BoxError> {
        let number: u32 = rand::thread_rng().gen_range(0..10_000);
        Ok(GeneratedArtifact {
            sku: format!("SKU-{number}"),
            product_url: format!("{}/{}", self.base_url, product_slug(keyword)),
        })
    }
}
