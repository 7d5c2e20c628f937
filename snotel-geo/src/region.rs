use crate::BoundingBox;
use geo::{BoundingRect, Contains, MultiPolygon, Point, Polygon};

/// A named area of interest, e.g. a watershed or mountain range outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: Option<String>,
    shape: MultiPolygon<f64>,
    envelope: Option<BoundingBox>,
}

impl Region {
    pub fn new(name: Option<String>, shape: MultiPolygon<f64>) -> Self {
        let envelope = shape.bounding_rect().map(BoundingBox::from);
        Self {
            name,
            shape,
            envelope,
        }
    }

    pub fn from_polygon(name: Option<String>, polygon: Polygon<f64>) -> Self {
        Self::new(name, MultiPolygon(vec![polygon]))
    }

    pub fn shape(&self) -> &MultiPolygon<f64> {
        &self.shape
    }

    /// Envelope of the region, `None` for an empty shape.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.envelope
    }

    /// Point-in-polygon test. Points on the boundary are not contained and
    /// holes are respected.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        match &self.envelope {
            Some(envelope) if envelope.contains(lon, lat) => {
                self.shape.contains(&Point::new(lon, lat))
            }
            _ => false,
        }
    }
}
