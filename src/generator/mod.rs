//! Generation adapters - The boundary to whatever produces a product for a keyword.
//!
//! The lifecycle manager only sees the [`Generator`] trait. Any failure an adapter reports
//! is treated the same way: the keyword goes back to `watching` and the error is carried
//! inside `Error::GenerationFailed`.

/// HTTP adapter for an external generation service
pub mod http;
/// Offline adapter producing random SKUs, used when no service is configured
pub mod mock;

pub use http::HttpGenerator;
pub use mock::{MockGenerator, product_slug};

use crate::config::{GeneratorKind, GeneratorSettings};
use crate::errors::{BoxError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a successful generation returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    /// Stock identifier for the new product
    pub sku: String,
    /// Location of the new product
    pub product_url: String,
}

/// Produces a product for a keyword.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generates a product for `keyword`. May suspend on I/O.
    async fn generate(&self, keyword: &str) -> std::result::Result<GeneratedArtifact, BoxError>;
}

#[async_trait]
impl<T: Generator + ?Sized> Generator for Box<T> {
    async fn generate(&self, keyword: &str) -> std::result::Result<GeneratedArtifact, BoxError> {
        (**self).generate(keyword).await
    }
}

/// Builds the adapter selected in the settings.
///
/// # Errors
/// Returns a `Config` error if the HTTP adapter is selected without a usable endpoint.
pub fn from_settings(settings: &GeneratorSettings) -> Result<Box<dyn Generator>> {
    match settings.kind {
        GeneratorKind::Mock => Ok(Box::new(MockGenerator::default())),
        GeneratorKind::Http => {
            let endpoint = settings.endpoint.as_deref().unwrap_or_default();
            let generator =
                HttpGenerator::new(endpoint, Duration::from_secs(settings.timeout_secs))?;
            Ok(Box::new(generator))
        }
    }
}
