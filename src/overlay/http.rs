use super::{AssetLoader, AssetUrls};
use crate::{BasemapError, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use std::sync::Mutex;

/// Shared HTTP client with a custom User-Agent so that CDNs don't reject
/// the request. Building the client once avoids the cost of TLS and
/// connection pool setup for every fetch.
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!("basemap-sync/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
});

/// Library code and stylesheet as fetched over HTTP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAssets {
    pub script: String,
    pub stylesheet: String,
}

/// Fetches the overlay library assets and keeps them for a platform
/// adapter to inject into its rendering surface.
#[derive(Default)]
pub struct HttpAssetLoader {
    fetched: Mutex<Option<FetchedAssets>>,
}

impl HttpAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assets from the last successful load
    pub fn fetched(&self) -> Option<FetchedAssets> {
        self.fetched.lock().ok().and_then(|fetched| fetched.clone())
    }
}

async fn fetch_text(url: &str) -> Result<String> {
    let resp = HTTP_CLIENT.get(url).send().await.map_err(BasemapError::from)?;
    if !resp.status().is_success() {
        return Err(BasemapError::AssetLoad(format!("HTTP {} for {}", resp.status(), url)).into());
    }
    Ok(resp.text().await.map_err(BasemapError::from)?)
}

#[async_trait]
impl AssetLoader for HttpAssetLoader {
    async fn load_rendering_assets(&self, urls: &AssetUrls) -> Result<()> {
        log::debug!("fetching overlay assets {} and {}", urls.stylesheet_url, urls.script_url);
        let (stylesheet, script) =
            futures::try_join!(fetch_text(&urls.stylesheet_url), fetch_text(&urls.script_url))?;
        log::info!(
            "fetched overlay assets ({} bytes script, {} bytes stylesheet)",
            script.len(),
            stylesheet.len()
        );
        if let Ok(mut fetched) = self.fetched.lock() {
            *fetched = Some(FetchedAssets { script, stylesheet });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_malformed_url_fails_without_storing() {
        let loader = HttpAssetLoader::new();
        let urls = AssetUrls {
            script_url: "not a url".to_string(),
            stylesheet_url: "also not a url".to_string(),
        };
        assert!(loader.load_rendering_assets(&urls).await.is_err());
        assert!(loader.fetched().is_none());
    }
}
