//! Where audio files come from: a local directory or an HTTP base URL.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use url::Url;

#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Fetch the raw bytes of `name` (e.g. `"m.m4a"`).
    async fn fetch(&self, name: &str) -> Result<Vec<u8>>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetSource for FileSource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(name);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// HTTP 下载（reqwest 异步非阻塞）
pub struct HttpSource {
    base: Url,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base: Url) -> Self {
        Self::with_client(base, reqwest::Client::new())
    }

    pub fn with_client(mut base: Url, client: reqwest::Client) -> Self {
        // Url::join 只替换最后一段，目录地址必须以 / 结尾
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { base, client }
    }

    pub fn url_for(&self, name: &str) -> Result<Url> {
        self.base
            .join(name)
            .with_context(|| format!("Invalid asset name: {}", name))
    }
}

#[async_trait]
impl AssetSource for HttpSource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        let url = self.url_for(name)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("HTTP request failed: {}", url))?
            .error_for_status()
            .with_context(|| format!("HTTP error for {}", url))?;
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read HTTP response: {}", url))?;
        Ok(body.to_vec())
    }

    fn describe(&self) -> String {
        self.base.to_string()
    }
}

/// Pick a source for `base`: `http(s)://` URLs go over HTTP, anything else is a directory.
pub fn source_for(base: &str) -> Arc<dyn AssetSource> {
    match Url::parse(base) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Arc::new(HttpSource::new(url)),
        _ => Arc::new(FileSource::new(base)),
    }
}
