//! Prelude module for common basemap-sync types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use basemap_sync::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    config::{BasemapConfig, LifecycleConfig, OverlayOptions, StyleDescriptor, StyleId},
    geo::{LatLng, LatLngBounds, Point},
};

pub use crate::controller::{BasemapController, BasemapUiState, StyleButton};

pub use crate::crs::{Crs, CrsKind};

pub use crate::host::{HostEvent, HostView};

pub use crate::lifecycle::{LifecyclePhase, LifecycleTransition};

pub use crate::overlay::{
    http::HttpAssetLoader, AssetLoader, AssetUrls, FitOptions, OverlayBackend, OverlayFactory,
    OverlayMap,
};

pub use crate::policy::{ExtentCheck, ExtentHint};

pub use crate::runtime::{AsyncHandle, QueuedSpawner, TaskSpawner};

#[cfg(feature = "tokio-runtime")]
pub use crate::runtime::tokio_impl::TokioSpawner;

pub use crate::{BasemapError, Result};

pub use std::sync::Arc;
