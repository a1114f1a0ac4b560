//! Where font bytes come from
//!
//! The pipeline fetches once per run; a failed fetch aborts the whole run
//! before any row is processed.

use crate::types::{FieldMapError, Result};
use std::future::Future;
use std::path::PathBuf;
#[cfg(feature = "remote-font")]
use std::time::Duration;

/// Supplier of raw TrueType bytes
pub trait FontSource {
    fn fetch_font_bytes(&self) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Font bytes already in memory
#[derive(Debug, Clone)]
pub struct StaticFont(pub Vec<u8>);

impl FontSource for StaticFont {
    async fn fetch_font_bytes(&self) -> Result<Vec<u8>> {
        if self.0.is_empty() {
            return Err(FieldMapError::FontFetch("font data is empty".to_string()));
        }
        Ok(self.0.clone())
    }
}

/// Font file on disk
#[derive(Debug, Clone)]
pub struct FileFont(pub PathBuf);

impl FontSource for FileFont {
    async fn fetch_font_bytes(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.0)
            .await
            .map_err(|e| FieldMapError::FontFetch(format!("{}: {}", self.0.display(), e)))
    }
}

/// Font fetched over HTTP(S)
#[cfg(feature = "remote-font")]
#[derive(Debug, Clone)]
pub struct RemoteFont {
    pub url: String,
    pub timeout: Duration,
}

#[cfg(feature = "remote-font")]
impl RemoteFont {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

#[cfg(feature = "remote-font")]
impl FontSource for RemoteFont {
    async fn fetch_font_bytes(&self) -> Result<Vec<u8>> {
        let fetch_error = |e: reqwest::Error| FieldMapError::FontFetch(format!("{}: {}", self.url, e));

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(fetch_error)?;
        let response = client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(fetch_error)?;
        let bytes = response.bytes().await.map_err(fetch_error)?;

        log::debug!("Fetched {} font bytes from {}", bytes.len(), self.url);
        Ok(bytes.to_vec())
    }
}

/// A font location given as a string: `http(s)://` URLs are fetched
/// remotely, anything else is a file path.
#[derive(Debug, Clone)]
pub enum FontLocation {
    Bytes(StaticFont),
    File(FileFont),
    #[cfg(feature = "remote-font")]
    Url(RemoteFont),
}

impl FontLocation {
    pub fn parse(location: &str) -> Result<Self> {
        let is_url = location.starts_with("http://") || location.starts_with("https://");
        if is_url {
            #[cfg(feature = "remote-font")]
            return Ok(Self::Url(RemoteFont::new(location)));
            #[cfg(not(feature = "remote-font"))]
            return Err(FieldMapError::Config(
                "remote fonts require the 'remote-font' feature".to_string(),
            ));
        }
        if location.is_empty() {
            return Err(FieldMapError::Config("font location is empty".to_string()));
        }
        Ok(Self::File(FileFont(PathBuf::from(location))))
    }
}

impl FontSource for FontLocation {
    async fn fetch_font_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Bytes(font) => font.fetch_font_bytes().await,
            Self::File(font) => font.fetch_font_bytes().await,
            #[cfg(feature = "remote-font")]
            Self::Url(font) => font.fetch_font_bytes().await,
        }
    }
}
