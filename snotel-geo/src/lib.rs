//! Spatial filtering of SNOTEL sites and GeoJSON interchange.
//!
//! Coordinates are WGS84 longitude/latitude throughout. Files declaring any
//! other coordinate reference system are rejected; reprojection is left to
//! dedicated GIS tooling.

pub mod bbox;
pub mod filter;
pub mod geojson_io;
pub mod region;

pub use bbox::BoundingBox;
pub use filter::SiteFilter;
pub use region::Region;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("invalid site properties: {0}")]
    Properties(#[from] serde_json::Error),
    #[error("unsupported geometry: expected {expected}, found {found}")]
    UnsupportedGeometry {
        expected: &'static str,
        found: String,
    },
    #[error("unsupported coordinate reference system {0:?}; only WGS84 longitude/latitude is accepted")]
    UnsupportedCrs(String),
    #[error("feature has no geometry")]
    MissingGeometry,
    #[error("invalid bounding box: {0}")]
    InvalidBoundingBox(String),
    #[error("no polygon features found")]
    EmptyRegion,
}
