//! Coordinate reference system descriptors and the compatibility check that
//! gates the basemap.

use crate::{BasemapError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrsKind {
    /// Spherical Web Mercator (EPSG:3857)
    WebMercator,
    /// Unprojected longitude/latitude
    Geographic,
    /// Any other projection; `invertible` is false when the host has no
    /// inverse mapping back to geographic coordinates
    Projected { invertible: bool },
}

/// Descriptor for a CRS handed out by the host's projection system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    pub name: String,
    pub kind: CrsKind,
}

static WEB_MERCATOR: Lazy<Crs> = Lazy::new(|| Crs::new("webmercator", CrsKind::WebMercator));

impl Crs {
    pub fn new(name: impl Into<String>, kind: CrsKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn web_mercator() -> Self {
        WEB_MERCATOR.clone()
    }

    pub fn wgs84() -> Self {
        Self::new("wgs84", CrsKind::Geographic)
    }

    pub fn projected(name: impl Into<String>, invertible: bool) -> Self {
        Self::new(name, CrsKind::Projected { invertible })
    }

    /// Whether coordinates in this CRS can be converted back to lon/lat
    pub fn is_invertible(&self) -> bool {
        match self.kind {
            CrsKind::WebMercator | CrsKind::Geographic => true,
            CrsKind::Projected { invertible } => invertible,
        }
    }

    pub fn is_web_mercator(&self) -> bool {
        self.kind == CrsKind::WebMercator
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for Crs {
    type Err = Box<dyn std::error::Error + Send + Sync>;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        match name.to_ascii_lowercase().as_str() {
            "webmercator" | "epsg:3857" | "epsg:900913" => {
                Ok(Self::new(name, CrsKind::WebMercator))
            }
            "wgs84" | "epsg:4326" | "latlong" | "lonlat" => {
                Ok(Self::new(name, CrsKind::Geographic))
            }
            _ => Err(BasemapError::UnknownCrs(name.to_string()).into()),
        }
    }
}

/// A CRS can back the basemap only when it exists and can be inverted to
/// geographic coordinates.
pub fn is_usable(crs: Option<&Crs>) -> bool {
    match crs {
        Some(crs) => crs.is_invertible(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_crs_is_unusable() {
        assert!(!is_usable(None));
    }

    #[test]
    fn test_invertibility_decides_usability() {
        assert!(is_usable(Some(&Crs::web_mercator())));
        assert!(is_usable(Some(&Crs::wgs84())));
        assert!(is_usable(Some(&Crs::projected("utm33n", true))));
        assert!(!is_usable(Some(&Crs::projected("custom", false))));
    }

    #[test]
    fn test_web_mercator_detection() {
        assert!(Crs::web_mercator().is_web_mercator());
        assert!(!Crs::wgs84().is_web_mercator());
        assert!(!Crs::projected("utm33n", true).is_web_mercator());
    }

    #[test]
    fn test_parse_names() {
        let crs: Crs = "EPSG:3857".parse().unwrap();
        assert!(crs.is_web_mercator());
        assert_eq!(crs.to_string(), "EPSG:3857");

        let crs: Crs = " wgs84 ".parse().unwrap();
        assert_eq!(crs.kind, CrsKind::Geographic);

        let err = "+proj=robin".parse::<Crs>().unwrap_err();
        assert!(err.to_string().contains("Unknown CRS"));
    }
}
