use async_trait::async_trait;
use basemap_sync::constants::{EARTH_CIRCUMFERENCE, OVERLAY_TILE_SIZE};
use basemap_sync::prelude::*;
use std::time::Duration;

const DEFAULT_CONFIG: &str = r#"{
    "key": "demo-token",
    "js": "https://cdn.example.com/overlay.js",
    "css": "https://cdn.example.com/overlay.css",
    "styles": [
        {"name": "Streets", "icon": "streets.png", "url": "style://streets"},
        {"name": "Dark", "icon": "dark.png", "url": "style://dark", "dark": true}
    ]
}"#;

/// A data view that only knows its extent and projection
struct DemoView {
    extent: Bounds,
    size: (f64, f64),
    display_crs: Option<Crs>,
    data_crs: Option<Crs>,
}

impl DemoView {
    fn new() -> Self {
        let mut view = Self {
            extent: Bounds::default(),
            size: (1280.0, 800.0),
            display_crs: Some(Crs::wgs84()),
            data_crs: Some(Crs::wgs84()),
        };
        view.look_at(LatLng::new(37.7749, -122.4194), 12.0);
        view
    }

    fn look_at(&mut self, center: LatLng, zoom: f64) {
        let mpp = EARTH_CIRCUMFERENCE / OVERLAY_TILE_SIZE / 2f64.powf(zoom);
        let (width, height) = (mpp * self.size.0, mpp * self.size.1);
        self.extent = Bounds::from_center_and_size(center.to_mercator(), width, height);
    }
}

impl HostView for DemoView {
    fn extent(&self) -> Bounds {
        self.extent
    }

    fn pixel_width(&self) -> f64 {
        self.size.0
    }

    fn pixel_height(&self) -> f64 {
        self.size.1
    }

    fn display_crs(&self) -> Option<Crs> {
        self.display_crs.clone()
    }

    fn set_display_crs(&mut self, crs: Option<Crs>) {
        let label = crs.as_ref().map_or("data default".to_string(), |c| c.to_string());
        println!("   🌐 display CRS -> {}", label);
        self.display_crs = crs.or_else(|| self.data_crs.clone());
    }

    fn active_layer_crs(&self) -> Option<Crs> {
        self.data_crs.clone()
    }
}

/// Stands in for the external overlay library by printing what it is asked to do
struct PrintingOverlay;

#[async_trait]
impl OverlayMap for PrintingOverlay {
    fn set_style(&mut self, style_url: &str) {
        println!("   🎨 overlay style -> {}", style_url);
    }

    fn resize(&mut self) {}

    fn fit_bounds(&mut self, bounds: &LatLngBounds, _options: FitOptions) {
        let [w, s, e, n] = bounds.to_array();
        println!("   🗺️  overlay fit W {:.4} S {:.4} E {:.4} N {:.4}", w, s, e, n);
    }

    async fn loaded(&mut self) -> Result<()> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(())
    }
}

struct PrintingFactory;

impl OverlayFactory for PrintingFactory {
    fn construct(&self, options: OverlayOptions) -> Result<Box<dyn OverlayMap>> {
        println!("   🏗️  constructing overlay: {}", options.to_json()?);
        Ok(Box::new(PrintingOverlay))
    }
}

struct DelayedAssets;

#[async_trait]
impl AssetLoader for DelayedAssets {
    async fn load_rendering_assets(&self, urls: &AssetUrls) -> Result<()> {
        println!("   📦 loading {} and {}", urls.stylesheet_url, urls.script_url);
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(())
    }
}

async fn wait_for_overlay(controller: &mut BasemapController, view: &mut DemoView) {
    for _ in 0..100 {
        if let Some(transition) = controller.process_events(view) {
            println!("   ⚡ lifecycle: {:?}", transition);
            if transition == LifecycleTransition::Ready {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn report(controller: &BasemapController) {
    let ui = controller.ui_state();
    println!(
        "   overlay visible: {}  prompt: {}",
        ui.overlay_visible,
        ui.extent_prompt.as_deref().unwrap_or("-")
    );
}

/// Walks the basemap through a typical session without any UI
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    basemap_sync::init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => BasemapConfig::from_file(path)?,
        None => BasemapConfig::from_json(DEFAULT_CONFIG)?,
    };
    let spawner = TokioSpawner::current().ok_or("not running inside tokio")?;
    let backend = OverlayBackend::new(
        Arc::new(DelayedAssets),
        Arc::new(PrintingFactory),
        Arc::new(spawner),
    );
    let mut controller = BasemapController::new(Some(config), Some(backend));
    let mut view = DemoView::new();

    println!("🗺️ Basemap Demo");
    println!("==============");

    println!("\n📂 Opening basemap panel");
    controller.handle_event(&mut view, HostEvent::ModeToggled(true));
    let ui = controller.ui_state();
    println!("   note visible: {}  warning: {:?}", ui.note_visible, ui.warning);

    println!("\n🎯 Selecting first style");
    for button in controller.style_buttons() {
        println!("   [{}] {}", if button.active { "x" } else { " " }, button.name);
    }
    if let Some(first) = controller.style_buttons().first().map(|b| b.id) {
        controller.toggle_style(&mut view, first);
    }
    wait_for_overlay(&mut controller, &mut view).await;
    report(&controller);

    println!("\n🚀 Moving the view");
    let stops = [
        ("New York", LatLng::new(40.7128, -74.0060), 11.0),
        ("Street level", LatLng::new(40.7128, -74.0060), 21.5),
        ("North pole", LatLng::new(87.0, 0.0), 6.0),
        ("Tokyo", LatLng::new(35.6762, 139.6503), 10.0),
    ];
    for (name, center, zoom) in stops {
        println!("   📍 {} at zoom {}", name, zoom);
        view.look_at(center, zoom);
        controller.handle_event(&mut view, HostEvent::ExtentChanged);
        report(&controller);
    }

    println!("\n🌙 Switching to the last style");
    if let Some(last) = controller.style_buttons().last().map(|b| b.id) {
        controller.toggle_style(&mut view, last);
    }
    println!("   dark basemap: {}", controller.is_dark_basemap());

    println!("\n🛑 Turning the basemap off");
    if let Some(active) = controller.active_style() {
        controller.toggle_style(&mut view, active);
    }
    controller.handle_event(&mut view, HostEvent::MapClick);
    report(&controller);

    Ok(())
}
