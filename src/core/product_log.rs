//! Local product log - An append-only JSON-lines mirror of generated products.
//!
//! The log is owned by the caller and handed to the lifecycle manager, which appends every
//! product it stores. It is read in full when opened so products can be shown without a
//! round trip to the store. Lines that cannot be parsed are skipped with a warning.

use crate::{entities::product, errors::Result};
use std::path::{Path, PathBuf};
use tokio::{
    fs::{self, OpenOptions},
    io::AsyncWriteExt,
    sync::Mutex,
};
use tracing::{debug, info, instrument, warn};

/// Append-only sequence of product records backed by a file.
#[derive(Debug)]
pub struct ProductLog {
    path: PathBuf,
    entries: Mutex<Vec<product::Model>>,
}

impl ProductLog {
    /// Opens the log at `path`, loading any existing records. A missing file is an empty log.
    ///
    /// # Errors
    /// Returns an I/O error if the file exists but cannot be read.
    #[instrument]
    pub async fn open(path: impl AsRef<Path> + std::fmt::Debug) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path).await {
            Ok(contents) => parse_entries(&contents, &path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        info!(
            "Product log {} loaded with {} entries",
            path.display(),
            entries.len()
        );
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Appends one product to the file and to the in-memory list.
    ///
    /// # Errors
    /// Returns an I/O error if the record cannot be written. The in-memory list is left
    /// unchanged in that case.
    pub async fn append(&self, product: &product::Model) -> Result<()> {
        let mut line = serde_json::to_string(product).map_err(std::io::Error::from)?;
        line.push('\n');

        // Held across the write so concurrent appends keep file and memory in the same order
        let mut entries = self.entries.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        entries.push(product.clone());
        debug!(sku = %product.sku, "Product appended to local log");
        Ok(())
    }

    /// All records, oldest first.
    pub async fn entries(&self) -> Vec<product::Model> {
        self.entries.lock().await.clone()
    }

    /// Number of records.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the log has no records.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_entries(contents: &str, path: &Path) -> Vec<product::Model> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match serde_json::from_str(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(
                    "Skipping unreadable line {} in {}: {}",
                    index + 1,
                    path.display(),
                    e
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::Utc;

    fn sample_product(id: i64, sku: &str) -> product::Model {
        product::Model {
            id,
            keyword_id: 1,
            keyword_text: "horror movie svg".to_string(),
            sku: sku.to_string(),
            product_url: "https://example.com/product/horror-movie-svg".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_log() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let log = ProductLog::open(dir.path().join("products.jsonl")).await?;
        assert!(log.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_append_then_reopen() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("products.jsonl");

        let log = ProductLog::open(&path).await?;
        let first = sample_product(1, "SKU-1");
        let second = sample_product(2, "SKU-2");
        log.append(&first).await?;
        log.append(&second).await?;
        assert_eq!(log.len().await, 2);

        let reopened = ProductLog::open(&path).await?;
        assert_eq!(reopened.entries().await, vec![first, second]);
        Ok(())
    }

    #[tokio::test]
    async fn test_unreadable_lines_are_skipped() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("products.jsonl");
        let good = sample_product(7, "SKU-7");
        let contents = format!(
            "{}\nnot json\n\n{}\n",
            serde_json::to_string(&good).unwrap(),
            "{\"id\": 8}"
        );
        std::fs::write(&path, contents)?;

        let log = ProductLog::open(&path).await?;
        assert_eq!(log.entries().await, vec![good]);
        Ok(())
    }
}
