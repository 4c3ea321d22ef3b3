//! The host application's side of the contract.

use crate::core::bounds::Bounds;
use crate::crs::Crs;

/// Read/write access to the primary data view the basemap follows
pub trait HostView {
    /// Visible extent in the current display CRS
    fn extent(&self) -> Bounds;

    fn pixel_width(&self) -> f64;

    fn pixel_height(&self) -> f64;

    /// CRS the view is currently drawn in, or `None` when it is unknown
    fn display_crs(&self) -> Option<Crs>;

    /// Switches the display CRS; `None` drops the override and goes back to
    /// showing the data in its own CRS.
    /// Hosts typically re-render and report [`HostEvent::ExtentChanged`].
    fn set_display_crs(&mut self, crs: Option<Crs>);

    /// CRS of the dataset behind the active layer, if known
    fn active_layer_crs(&self) -> Option<Crs>;
}

/// Notifications the host delivers to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// The view was panned, zoomed, resized or reprojected
    ExtentChanged,
    /// The user clicked on the data view
    MapClick,
    /// The basemap panel button was toggled
    ModeToggled(bool),
}
