//! # basemap-sync
//!
//! Keeps an externally rendered basemap overlay geometrically aligned with
//! the primary view of a GIS editor.
//!
//! The [`BasemapController`] decides when the overlay may be shown (CRS
//! compatibility, latitude and zoom limits), converts the host view's
//! projected extent into the overlay's geographic space, and lazily
//! constructs the external overlay exactly once.

pub mod controller;
pub mod core;
pub mod crs;
pub mod host;
pub mod lifecycle;
pub mod overlay;
pub mod policy;
pub mod prelude;
pub mod runtime;
pub mod transform;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::Bounds,
    config::{BasemapConfig, LifecycleConfig, OverlayOptions, StyleDescriptor, StyleId},
    geo::{LatLng, LatLngBounds, Point},
};

pub use controller::{BasemapController, BasemapUiState, StyleButton};
pub use crs::{Crs, CrsKind};
pub use host::{HostEvent, HostView};
pub use lifecycle::{LifecyclePhase, LifecycleTransition, ResourceLifecycle};
pub use overlay::{AssetLoader, AssetUrls, FitOptions, OverlayBackend, OverlayFactory, OverlayMap};
pub use policy::{ExtentCheck, ExtentHint};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum BasemapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Asset load error: {0}")]
    AssetLoad(String),

    #[error("Overlay error: {0}")]
    Overlay(String),

    #[error("Overlay did not become ready within {0:?}")]
    Timeout(std::time::Duration),

    #[error("Invalid extent: {0}")]
    InvalidExtent(String),

    #[error("Unknown CRS: {0}")]
    UnknownCrs(String),
}

/// Error type alias for convenience
pub type Error = BasemapError;

/// Installs `env_logger` as the `log` backend. Safe to call more than once.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(cfg!(test)).try_init();
}
