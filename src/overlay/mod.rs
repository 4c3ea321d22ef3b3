//! Contracts the controller needs from the external overlay library.
//!
//! The controller never talks to a rendering engine directly. A platform
//! adapter implements these traits: [`AssetLoader`] fetches the library
//! code and stylesheet, [`OverlayFactory`] builds the map instance and
//! [`OverlayMap`] drives it afterwards.

pub mod http;

use crate::core::{config::OverlayOptions, geo::LatLngBounds};
use crate::runtime::TaskSpawner;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Locations of the overlay library's code and stylesheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUrls {
    pub script_url: String,
    pub stylesheet_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitOptions {
    pub animate: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self { animate: false }
    }
}

#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Fetches the library code and stylesheet. Completes once.
    async fn load_rendering_assets(&self, urls: &AssetUrls) -> Result<()>;
}

pub trait OverlayFactory: Send + Sync {
    /// Asks the library for a new map instance. The instance is not usable
    /// until [`OverlayMap::loaded`] resolves.
    fn construct(&self, options: OverlayOptions) -> Result<Box<dyn OverlayMap>>;
}

/// A constructed overlay map
#[async_trait]
pub trait OverlayMap: Send {
    fn set_style(&mut self, style_url: &str);

    /// Re-measure the container the overlay draws into
    fn resize(&mut self);

    fn fit_bounds(&mut self, bounds: &LatLngBounds, options: FitOptions);

    /// Resolves when the overlay fires its one-time load event
    async fn loaded(&mut self) -> Result<()>;
}

/// Everything needed to bring an overlay to life on a given platform.
///
/// A host without a render surface has no backend, which keeps the
/// basemap disabled.
#[derive(Clone)]
pub struct OverlayBackend {
    pub assets: Arc<dyn AssetLoader>,
    pub factory: Arc<dyn OverlayFactory>,
    pub spawner: Arc<dyn TaskSpawner>,
}

impl OverlayBackend {
    pub fn new(
        assets: Arc<dyn AssetLoader>,
        factory: Arc<dyn OverlayFactory>,
        spawner: Arc<dyn TaskSpawner>,
    ) -> Self {
        Self {
            assets,
            factory,
            spawner,
        }
    }
}

impl std::fmt::Debug for OverlayBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayBackend").finish_non_exhaustive()
    }
}

/// Loads the assets, constructs the overlay and waits for it to be ready
pub async fn load_overlay(
    assets: Arc<dyn AssetLoader>,
    factory: Arc<dyn OverlayFactory>,
    urls: AssetUrls,
    options: OverlayOptions,
) -> Result<Box<dyn OverlayMap>> {
    assets.load_rendering_assets(&urls).await?;
    let mut overlay = factory.construct(options)?;
    overlay.loaded().await?;
    Ok(overlay)
}
