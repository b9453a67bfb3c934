/*!
 * Direct HTTP fetch helpers.
 *
 * Used for pages that do not need rendering and for downloading arXiv source
 * archives. Failures are reported with the HTTP status and reason so callers
 * can degrade instead of aborting.
 */

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::info;

use crate::errors::CrawlError;

/// Download seam for crawlers that pull files outside the browser session.
/// Tests drive crawlers from fixture archives through this trait.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download `url` into `dir` and return the path of the file.
    async fn download(&self, url: &str, dir: &Path) -> Result<PathBuf, CrawlError>;
}

/// [`Fetcher`] over a shared reqwest client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        HttpFetcher { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn download(&self, url: &str, dir: &Path) -> Result<PathBuf, CrawlError> {
        download_file(&self.client, url, dir).await
    }
}

fn fetch_error(e: reqwest::Error) -> CrawlError {
    let status = e.status().map(|s| s.as_u16()).unwrap_or(0);
    CrawlError::Fetch { status, reason: e.to_string() }
}

fn status_error(status: reqwest::StatusCode) -> CrawlError {
    CrawlError::Fetch {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("unknown").to_string(),
    }
}

/// GET `url` and return the body as text, following redirects.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String, CrawlError> {
    let response = client.get(url).send().await.map_err(fetch_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(status_error(status));
    }
    response.text().await.map_err(fetch_error)
}

/// GET `url` and return `(final_url, body)` so callers can see redirects.
pub async fn fetch_text_with_url(
    client: &reqwest::Client,
    url: &str,
) -> Result<(String, String), CrawlError> {
    let response = client.get(url).send().await.map_err(fetch_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(status_error(status));
    }
    let final_url = response.url().to_string();
    let body = response.text().await.map_err(fetch_error)?;
    Ok((final_url, body))
}

/// Resolve `url` to its canonical form by following redirects once.
pub async fn canonicalize(client: &reqwest::Client, url: &str) -> String {
    match client.get(url).send().await {
        Ok(response) => response.url().to_string(),
        Err(_) => url.to_string(),
    }
}

/// Download `url` into `dir`, naming the file after the last path segment.
/// Returns the path of the downloaded file.
pub async fn download_file(
    client: &reqwest::Client,
    url: &str,
    dir: &Path,
) -> Result<PathBuf, CrawlError> {
    std::fs::create_dir_all(dir)?;
    let response = client.get(url).send().await.map_err(fetch_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(status_error(status));
    }
    let name = response
        .url()
        .path_segments()
        .and_then(|mut s| s.next_back())
        .filter(|s| !s.is_empty())
        .unwrap_or("download")
        .to_string();
    let bytes = response.bytes().await.map_err(fetch_error)?;
    let path = dir.join(name);
    std::fs::write(&path, &bytes)?;
    info!("downloaded {} ({} bytes) to {}", url, bytes.len(), path.display());
    Ok(path)
}
