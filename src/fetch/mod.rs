//! Loading of input files from a local path or an http(s) URL.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// Reads `source` from disk, or downloads it when it is a URL.
#[tracing::instrument(skip(client))]
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    let bytes = if is_remote(source) {
        fetch_bytes(client, source)
            .await
            .with_context(|| format!("failed to download '{source}'"))?
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("failed to read '{source}'"))?
    };
    debug!(bytes = bytes.len(), "Source loaded");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.org/stops.csv"));
        assert!(is_remote("http://example.org/routes.xlsx"));
        assert!(!is_remote("data/http_stops.csv"));
        assert!(!is_remote("routes.xlsx"));
    }

    #[tokio::test]
    async fn test_load_local_source() {
        let path = env::temp_dir().join("gtfs_sheet_builder_test_source.csv");
        fs::write(&path, "ID,name,WKT\n").unwrap();

        let client = BasicClient::new(DEFAULT_TIMEOUT).unwrap();
        let bytes = load_source(&client, path.to_str().unwrap()).await.unwrap();
        assert_eq!(bytes, b"ID,name,WKT\n");

        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_load_missing_local_source() {
        let client = BasicClient::new(DEFAULT_TIMEOUT).unwrap();
        assert!(load_source(&client, "/nonexistent/stops.csv").await.is_err());
    }
}
