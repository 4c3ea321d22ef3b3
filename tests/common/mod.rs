//! Test doubles shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use basemap_sync::constants::{EARTH_CIRCUMFERENCE, OVERLAY_TILE_SIZE};
use basemap_sync::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::task::Poll;

/// Routes the crate's `log` output to the test harness; set `RUST_LOG` to see it
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Host view with a settable extent that records CRS changes
pub struct RecordingHost {
    pub extent: Bounds,
    pub width: f64,
    pub height: f64,
    pub display_crs: Option<Crs>,
    pub data_crs: Option<Crs>,
    pub crs_changes: Vec<Option<Crs>>,
}

impl RecordingHost {
    /// Web Mercator view centred on `center` at overlay zoom `zoom`, 1024x768 px
    pub fn at(center: LatLng, zoom: f64) -> Self {
        let mut host = Self {
            extent: Bounds::default(),
            width: 1024.0,
            height: 768.0,
            display_crs: Some(Crs::web_mercator()),
            data_crs: Some(Crs::wgs84()),
            crs_changes: Vec::new(),
        };
        host.look_at(center, zoom);
        host
    }

    pub fn look_at(&mut self, center: LatLng, zoom: f64) {
        let mpp = EARTH_CIRCUMFERENCE / OVERLAY_TILE_SIZE / 2f64.powf(zoom);
        self.extent =
            Bounds::from_center_and_size(center.to_mercator(), mpp * self.width, mpp * self.height);
    }
}

impl HostView for RecordingHost {
    fn extent(&self) -> Bounds {
        self.extent
    }

    fn pixel_width(&self) -> f64 {
        self.width
    }

    fn pixel_height(&self) -> f64 {
        self.height
    }

    fn display_crs(&self) -> Option<Crs> {
        self.display_crs.clone()
    }

    fn set_display_crs(&mut self, crs: Option<Crs>) {
        self.crs_changes.push(crs.clone());
        // no override means the data is shown in its own CRS
        self.display_crs = crs.or_else(|| self.data_crs.clone());
    }

    fn active_layer_crs(&self) -> Option<Crs> {
        self.data_crs.clone()
    }
}

/// Everything the mock overlays were asked to do
#[derive(Debug, Default)]
pub struct OverlayCalls {
    pub options: Vec<OverlayOptions>,
    pub styles: Vec<String>,
    pub resizes: usize,
    pub fits: Vec<(LatLngBounds, FitOptions)>,
}

#[derive(Default)]
pub struct Recorder {
    pub calls: Mutex<OverlayCalls>,
    /// While false, constructed overlays never fire their load event
    pub ready: AtomicBool,
    pub asset_loads: AtomicUsize,
    pub fail_assets: AtomicBool,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        let recorder = Self::default();
        recorder.ready.store(true, Ordering::SeqCst);
        Arc::new(recorder)
    }

    pub fn constructions(&self) -> usize {
        self.calls.lock().unwrap().options.len()
    }

    pub fn fit_count(&self) -> usize {
        self.calls.lock().unwrap().fits.len()
    }

    pub fn last_fit(&self) -> Option<(LatLngBounds, FitOptions)> {
        self.calls.lock().unwrap().fits.last().copied()
    }

    pub fn styles(&self) -> Vec<String> {
        self.calls.lock().unwrap().styles.clone()
    }
}

pub struct MockOverlay {
    recorder: Arc<Recorder>,
}

#[async_trait]
impl OverlayMap for MockOverlay {
    fn set_style(&mut self, style_url: &str) {
        self.recorder.calls.lock().unwrap().styles.push(style_url.to_string());
    }

    fn resize(&mut self) {
        self.recorder.calls.lock().unwrap().resizes += 1;
    }

    fn fit_bounds(&mut self, bounds: &LatLngBounds, options: FitOptions) {
        self.recorder.calls.lock().unwrap().fits.push((*bounds, options));
    }

    async fn loaded(&mut self) -> Result<()> {
        let recorder = self.recorder.clone();
        futures::future::poll_fn(move |_| {
            if recorder.ready.load(Ordering::SeqCst) {
                Poll::Ready(())
            } else {
                Poll::Pending
            }
        })
        .await;
        Ok(())
    }
}

pub struct MockFactory(pub Arc<Recorder>);

impl OverlayFactory for MockFactory {
    fn construct(&self, options: OverlayOptions) -> Result<Box<dyn OverlayMap>> {
        self.0.calls.lock().unwrap().options.push(options);
        Ok(Box::new(MockOverlay {
            recorder: self.0.clone(),
        }))
    }
}

pub struct MockAssets(pub Arc<Recorder>);

#[async_trait]
impl AssetLoader for MockAssets {
    async fn load_rendering_assets(&self, _urls: &AssetUrls) -> Result<()> {
        self.0.asset_loads.fetch_add(1, Ordering::SeqCst);
        if self.0.fail_assets.load(Ordering::SeqCst) {
            return Err(BasemapError::AssetLoad("script failed to load".to_string()).into());
        }
        Ok(())
    }
}

pub fn backend(recorder: &Arc<Recorder>, spawner: Arc<dyn TaskSpawner>) -> OverlayBackend {
    OverlayBackend::new(
        Arc::new(MockAssets(recorder.clone())),
        Arc::new(MockFactory(recorder.clone())),
        spawner,
    )
}

pub const CONFIG: &str = r#"{
    "key": "pk.test-token",
    "js": "https://cdn.example.com/overlay.js",
    "css": "https://cdn.example.com/overlay.css",
    "styles": [
        {"name": "Streets", "icon": "streets.png", "url": "style://streets"},
        {"name": "Satellite", "icon": "satellite.png", "url": "style://satellite"},
        {"name": "Dark", "icon": "dark.png", "url": "style://dark", "dark": true}
    ]
}"#;

pub fn config() -> BasemapConfig {
    BasemapConfig::from_json(CONFIG).unwrap()
}

/// Controller wired to mocks and a queued spawner
pub struct Harness {
    pub controller: BasemapController,
    pub recorder: Arc<Recorder>,
    pub spawner: Arc<QueuedSpawner>,
    pub host: RecordingHost,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(config())
    }

    pub fn with_config(config: BasemapConfig) -> Self {
        init_logging();
        let recorder = Recorder::new();
        let spawner = Arc::new(QueuedSpawner::new());
        let controller =
            BasemapController::new(Some(config), Some(backend(&recorder, spawner.clone())));
        Self {
            controller,
            recorder,
            spawner,
            host: RecordingHost::at(LatLng::new(48.85, 2.35), 10.0),
        }
    }

    pub fn select(&mut self, style: Option<StyleId>) {
        self.controller.select_style(&mut self.host, style);
    }

    /// Lets spawned loads run, then applies their outcome
    pub fn pump(&mut self) -> Option<LifecycleTransition> {
        self.spawner.run_until_stalled();
        self.controller.process_events(&mut self.host)
    }

    pub fn refresh(&mut self) {
        self.controller.refresh(&mut self.host);
    }

    /// Select a style and run the load to completion
    pub fn ready_with(&mut self, style: StyleId) {
        self.select(Some(style));
        assert_eq!(self.pump(), Some(LifecycleTransition::Ready));
    }
}
