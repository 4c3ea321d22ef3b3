//! Basemap configuration
//!
//! The host application supplies a [`BasemapConfig`] (usually parsed from
//! JSON) when the feature is available. Passing `None` to the controller
//! disables the basemap entirely.

use crate::core::constants::DEFAULT_LOAD_TIMEOUT_MS;
use crate::core::geo::LatLngBounds;
use crate::{BasemapError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// One selectable basemap style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDescriptor {
    pub name: String,
    #[serde(rename = "icon")]
    pub icon_url: String,
    #[serde(rename = "url")]
    pub style_url: String,
    /// Whether the style has a dark background
    #[serde(default)]
    pub dark: bool,
}

/// Position of a style in the configured list.
///
/// Styles are identified by where they sit in [`BasemapConfig::styles`],
/// never by their contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StyleId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Give up on a pending load after this many milliseconds; `None` waits forever
    #[serde(default = "default_load_timeout_ms")]
    pub load_timeout_ms: Option<u64>,
    /// Total load attempts per style selection, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_load_timeout_ms() -> Option<u64> {
    Some(DEFAULT_LOAD_TIMEOUT_MS)
}

fn default_max_attempts() -> u32 {
    1
}

impl LifecycleConfig {
    pub fn load_timeout(&self) -> Option<Duration> {
        self.load_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            load_timeout_ms: default_load_timeout_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasemapConfig {
    pub styles: Vec<StyleDescriptor>,
    /// Access token for the overlay service
    #[serde(rename = "key")]
    pub access_token: String,
    /// URL of the overlay library code
    #[serde(rename = "js")]
    pub script_url: String,
    /// URL of the overlay library stylesheet
    #[serde(rename = "css")]
    pub stylesheet_url: String,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
}

impl BasemapConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(BasemapError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(BasemapError::from)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.styles.is_empty() {
            return Err(BasemapError::Config("no basemap styles configured".to_string()).into());
        }
        if self.access_token.trim().is_empty() {
            return Err(BasemapError::Config("missing access token".to_string()).into());
        }
        if self.script_url.trim().is_empty() || self.stylesheet_url.trim().is_empty() {
            return Err(BasemapError::Config("missing overlay library URLs".to_string()).into());
        }
        if self.lifecycle.max_attempts == 0 {
            return Err(BasemapError::Config("max_attempts must be at least 1".to_string()).into());
        }
        Ok(())
    }

    pub fn style(&self, id: StyleId) -> Option<&StyleDescriptor> {
        self.styles.get(id.0)
    }

    pub fn style_ids(&self) -> impl Iterator<Item = StyleId> + '_ {
        (0..self.styles.len()).map(StyleId)
    }
}

/// Where the overlay service draws its logo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogoPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Options handed to the external overlay library when it is constructed.
///
/// All interaction is switched off: the overlay only ever follows the host view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayOptions {
    pub access_token: String,
    #[serde(rename = "style")]
    pub style_url: String,
    #[serde(serialize_with = "serialize_bbox", deserialize_with = "deserialize_bbox")]
    pub bounds: LatLngBounds,
    pub logo_position: LogoPosition,
    pub interactive: bool,
    pub drag_pan: bool,
    pub drag_rotate: bool,
    pub scroll_zoom: bool,
    pub double_click_zoom: bool,
    pub keyboard: bool,
    pub max_pitch: f64,
    pub render_world_copies: bool,
}

impl OverlayOptions {
    pub fn display_only(access_token: &str, style_url: &str, bounds: LatLngBounds) -> Self {
        Self {
            access_token: access_token.to_string(),
            style_url: style_url.to_string(),
            bounds,
            logo_position: LogoPosition::BottomLeft,
            interactive: false,
            drag_pan: false,
            drag_rotate: false,
            scroll_zoom: false,
            double_click_zoom: false,
            keyboard: false,
            max_pitch: 0.0,
            render_world_copies: true,
        }
    }

    /// JSON object in the shape the overlay library's constructor takes
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self).map_err(BasemapError::from)?)
    }
}

fn serialize_bbox<S: serde::Serializer>(
    bounds: &LatLngBounds,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    bounds.to_array().serialize(serializer)
}

fn deserialize_bbox<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<LatLngBounds, D::Error> {
    <[f64; 4]>::deserialize(deserializer).map(LatLngBounds::from_array)
}
