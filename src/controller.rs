//! The basemap synchronization controller.
//!
//! Owns every piece of mutable basemap state and is driven by three kinds
//! of input: the user toggling the panel, the user picking a style, and
//! the host view reporting extent changes. Between those the host calls
//! [`BasemapController::process_events`] to apply finished overlay loads.

use crate::core::config::{BasemapConfig, OverlayOptions, StyleId};
use crate::core::geo::LatLngBounds;
use crate::crs::{self, Crs};
use crate::host::{HostEvent, HostView};
use crate::lifecycle::{LifecycleTransition, ResourceLifecycle};
use crate::overlay::{AssetUrls, FitOptions, OverlayBackend};
use crate::policy::{self, ExtentCheck, ExtentHint};
use crate::transform::{to_geo_bounds, validate_extent};
use serde::Serialize;

pub const INCOMPATIBLE_CRS_WARNING: &str =
    "The current layer is not compatible with the projection used by the basemaps.";

/// Bounds used for the initial overlay camera when the host extent is unusable
const WORLD_BOUNDS: [f64; 4] = [-180.0, -85.0, 180.0, 85.0];

/// What was last pushed to the overlay camera
#[derive(Debug, Clone, Copy, PartialEq)]
struct FitRecord {
    bounds: LatLngBounds,
    width: f64,
    height: f64,
}

/// Mutable state owned by the controller.
///
/// The overlay instance and the loading flag live in [`ResourceLifecycle`],
/// whose phases make "loading with an instance" unrepresentable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerState {
    pub active_style: Option<StyleId>,
    pub panel_open: bool,
    pub warning: Option<String>,
    pub note_visible: bool,
    pub overlay_visible: bool,
    pub extent_hint: Option<ExtentHint>,
    last_fit: Option<FitRecord>,
}

/// Snapshot of everything the UI layer needs to draw the basemap chrome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasemapUiState {
    pub button_visible: bool,
    pub panel_open: bool,
    pub warning: Option<String>,
    pub note_visible: bool,
    pub overlay_visible: bool,
    pub extent_prompt: Option<String>,
    pub active_style: Option<StyleId>,
    pub dark_basemap: bool,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleButton {
    pub id: StyleId,
    pub name: String,
    pub icon_url: String,
    pub active: bool,
}

#[derive(Debug)]
pub struct BasemapController {
    config: Option<BasemapConfig>,
    backend: Option<OverlayBackend>,
    lifecycle: ResourceLifecycle,
    state: ControllerState,
    /// Style the overlay was built with or last switched to
    rendered_style: Option<StyleId>,
    /// Load attempts since the last style selection
    attempts: u32,
}

impl BasemapController {
    /// `config == None` disables the feature. `backend == None` means there
    /// is no surface to render into, which also keeps the overlay from loading.
    pub fn new(config: Option<BasemapConfig>, backend: Option<OverlayBackend>) -> Self {
        let config = config.and_then(|config| match config.validate() {
            Ok(()) => Some(config),
            Err(e) => {
                log::warn!("basemap disabled: {}", e);
                None
            }
        });
        let timeout = config.as_ref().and_then(|c| c.lifecycle.load_timeout());
        if config.is_none() {
            log::debug!("no basemap configuration; basemap button hidden");
        }
        Self {
            config,
            backend,
            lifecycle: ResourceLifecycle::new(timeout),
            state: ControllerState::default(),
            rendered_style: None,
            attempts: 0,
        }
    }

    pub fn config(&self) -> Option<&BasemapConfig> {
        self.config.as_ref()
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn lifecycle(&self) -> &ResourceLifecycle {
        &self.lifecycle
    }

    /// Configured and attached to a render surface
    pub fn enabled(&self) -> bool {
        self.config.is_some() && self.backend.is_some()
    }

    pub fn button_visible(&self) -> bool {
        self.config.is_some()
    }

    pub fn active_style(&self) -> Option<StyleId> {
        self.state.active_style
    }

    pub fn is_loading(&self) -> bool {
        self.lifecycle.is_loading()
    }

    pub fn has_overlay(&self) -> bool {
        self.lifecycle.is_ready()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.lifecycle.last_error()
    }

    pub fn is_dark_basemap(&self) -> bool {
        match (&self.config, self.state.active_style) {
            (Some(config), Some(id)) => config.style(id).is_some_and(|style| style.dark),
            _ => false,
        }
    }

    pub fn style_buttons(&self) -> Vec<StyleButton> {
        let Some(config) = &self.config else {
            return Vec::new();
        };
        config
            .style_ids()
            .zip(&config.styles)
            .map(|(id, style)| StyleButton {
                id,
                name: style.name.clone(),
                icon_url: style.icon_url.clone(),
                active: self.state.active_style == Some(id),
            })
            .collect()
    }

    pub fn ui_state(&self) -> BasemapUiState {
        BasemapUiState {
            button_visible: self.button_visible(),
            panel_open: self.state.panel_open,
            warning: self.state.warning.clone(),
            note_visible: self.state.note_visible,
            overlay_visible: self.state.overlay_visible,
            extent_prompt: self.state.extent_hint.map(|hint| hint.prompt()),
            active_style: self.state.active_style,
            dark_basemap: self.is_dark_basemap(),
            loading: self.is_loading(),
        }
    }

    /// Opens the basemap panel, warning when the data cannot be shown over a basemap
    pub fn enter_mode(&mut self, host: &dyn HostView) {
        // without configuration the button is hidden, so the panel stays shut
        if self.config.is_none() {
            log::debug!("basemap mode unavailable without configuration");
            return;
        }
        let data_crs = host.active_layer_crs();
        let display_crs = host.display_crs();
        if crs::is_usable(data_crs.as_ref()) && crs::is_usable(display_crs.as_ref()) {
            self.state.warning = None;
            self.state.note_visible = true;
        } else {
            log::debug!(
                "basemap incompatible with data CRS {:?} / display CRS {:?}",
                data_crs.map(|c| c.name),
                display_crs.map(|c| c.name)
            );
            self.state.warning = Some(INCOMPATIBLE_CRS_WARNING.to_string());
            self.state.note_visible = false;
        }
        self.state.panel_open = true;
    }

    /// Closes the panel. The overlay itself is left as it is.
    pub fn exit_mode(&mut self) {
        self.state.panel_open = false;
        self.state.warning = None;
        self.state.note_visible = false;
    }

    /// Activates a style, or turns the basemap off with `None`
    pub fn select_style(&mut self, host: &mut dyn HostView, style: Option<StyleId>) {
        if let Some(id) = style {
            if self.config.as_ref().and_then(|c| c.style(id)).is_none() {
                log::warn!("ignoring unknown basemap style {:?}", id);
                return;
            }
        }
        self.state.active_style = style;

        let Some(id) = style else {
            host.set_display_crs(None);
            self.hide();
            return;
        };
        if self.lifecycle.is_ready() {
            self.apply_style(id);
            self.refresh(host);
        } else {
            if !self.lifecycle.is_loading() {
                self.attempts = 0;
            }
            self.init_overlay(&*host);
        }
    }

    /// Style-button click: the active style turns off, any other becomes active
    pub fn toggle_style(&mut self, host: &mut dyn HostView, style: StyleId) {
        let next = if self.state.active_style == Some(style) {
            None
        } else {
            Some(style)
        };
        self.select_style(host, next);
    }

    /// Re-aligns the overlay with the host view. Safe to call on every
    /// extent change; repeated calls with an unchanged view do nothing.
    pub fn refresh(&mut self, host: &mut dyn HostView) {
        if !self.enabled() || !self.lifecycle.is_ready() || self.state.active_style.is_none() {
            return;
        }

        let display_crs = host.display_crs();
        let Some(display_crs) = display_crs.filter(|c| crs::is_usable(Some(c))) else {
            self.hide();
            return;
        };
        if !display_crs.is_web_mercator() {
            log::debug!("switching display CRS from {} to Web Mercator", display_crs);
            host.set_display_crs(Some(Crs::web_mercator()));
        }

        let extent = host.extent();
        if let Err(e) = validate_extent(&extent) {
            log::debug!("hiding basemap: {}", e);
            self.hide();
            return;
        }
        let bounds = to_geo_bounds(&extent);
        let zoom = policy::zoom_for_view(&extent, host.pixel_width());
        match policy::check_bounds(&bounds, zoom) {
            ExtentCheck::Visible => {
                self.show(bounds, host.pixel_width(), host.pixel_height());
            }
            ExtentCheck::Hidden { hint } => {
                self.hide();
                self.state.extent_hint = hint;
            }
        }
    }

    /// Applies finished overlay loads. Call from the host's event loop.
    pub fn process_events(&mut self, host: &mut dyn HostView) -> Option<LifecycleTransition> {
        let transition = self.lifecycle.poll()?;
        match &transition {
            LifecycleTransition::Ready => {
                if let Some(active) = self.state.active_style {
                    if self.rendered_style != Some(active) {
                        self.apply_style(active);
                    }
                }
                self.refresh(host);
            }
            LifecycleTransition::Failed(_) | LifecycleTransition::TimedOut => {
                self.rendered_style = None;
                let max_attempts = self.config.as_ref().map_or(1, |c| c.lifecycle.max_attempts);
                if self.state.active_style.is_some() && self.attempts < max_attempts {
                    log::info!("retrying overlay load ({}/{})", self.attempts + 1, max_attempts);
                    self.init_overlay(&*host);
                }
            }
        }
        Some(transition)
    }

    pub fn handle_event(&mut self, host: &mut dyn HostView, event: HostEvent) {
        match event {
            HostEvent::ExtentChanged => self.refresh(host),
            HostEvent::MapClick => {
                if self.state.panel_open {
                    self.exit_mode();
                }
            }
            HostEvent::ModeToggled(true) => self.enter_mode(&*host),
            HostEvent::ModeToggled(false) => self.exit_mode(),
        }
    }

    fn init_overlay(&mut self, host: &dyn HostView) {
        let (Some(config), Some(backend)) = (&self.config, &self.backend) else {
            log::debug!("basemap not enabled; overlay not loaded");
            return;
        };
        let Some(active) = self.state.active_style else {
            return;
        };
        let Some(style) = config.style(active) else {
            return;
        };

        let extent = host.extent();
        let bounds = match validate_extent(&extent) {
            Ok(()) => to_geo_bounds(&extent),
            Err(_) => LatLngBounds::from_array(WORLD_BOUNDS),
        };
        let urls = AssetUrls {
            script_url: config.script_url.clone(),
            stylesheet_url: config.stylesheet_url.clone(),
        };
        let options = OverlayOptions::display_only(&config.access_token, &style.style_url, bounds);
        if self.lifecycle.begin(backend, urls, options) {
            self.attempts += 1;
            self.rendered_style = Some(active);
        }
    }

    fn apply_style(&mut self, id: StyleId) {
        let Some(style) = self.config.as_ref().and_then(|c| c.style(id)) else {
            return;
        };
        if let Some(overlay) = self.lifecycle.overlay_mut() {
            overlay.set_style(&style.style_url);
            self.rendered_style = Some(id);
        }
    }

    fn show(&mut self, bounds: LatLngBounds, width: f64, height: f64) {
        self.state.extent_hint = None;
        let record = FitRecord {
            bounds,
            width,
            height,
        };
        if self.state.overlay_visible && self.state.last_fit == Some(record) {
            return;
        }
        if let Some(overlay) = self.lifecycle.overlay_mut() {
            overlay.resize();
            overlay.fit_bounds(&bounds, FitOptions { animate: false });
        }
        self.state.overlay_visible = true;
        self.state.last_fit = Some(record);
    }

    fn hide(&mut self) {
        self.state.overlay_visible = false;
        self.state.extent_hint = None;
        self.state.last_fit = None;
    }
}
