use super::{GeneratedArtifact, Generator};
use crate::errors::{BoxError, Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    keyword: &'a str,
}

/// Generator backed by an external service.
///
/// Sends `POST <endpoint>` with `{"keyword": ...}` and expects
/// `{"sku": ..., "product_url": ...}` back. Any transport error, non-success status or
/// malformed body is reported as an adapter failure.
#[derive(Debug, Clone)]
pub struct HttpGenerator {
    client: Client,
    endpoint: Url,
}

impl HttpGenerator {
    /// Creates a generator for `endpoint`. The timeout bounds each request.
    ///
    /// # Errors
    /// Returns a `Config` error if the endpoint is not a valid URL or the client cannot be built.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| Error::Config {
            message: format!("Invalid generator endpoint {endpoint:?}: {e}"),
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config {
                message: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, endpoint })
    }

    /// The endpoint requests are sent to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn generate(&self, keyword: &str) -> std::result::Result<GeneratedArtifact, BoxError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&GenerateRequest { keyword })
            .send()
            .await?
            .error_for_status()?;
        let artifact: GeneratedArtifact = response.json().await?;
        debug!(sku = %artifact.sku, "Generation service returned a product");
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_invalid_endpoint_is_config_error() {
        let result = HttpGenerator::new("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_endpoint_is_kept() {
        let generator =
            HttpGenerator::new("http://localhost:9000/generate", Duration::from_secs(1)).unwrap();
        assert_eq!(generator.endpoint().path(), "/generate");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_adapter_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP
        let generator =
            HttpGenerator::new("http://127.0.0.1:9/generate", Duration::from_secs(2)).unwrap();
        assert!(generator.generate("anything").await.is_err());
    }
}
