use crate::GeoError;
use geo::Rect;
use std::str::FromStr;

/// An axis-aligned longitude/latitude box. Edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self, GeoError> {
        let values = [min_lon, min_lat, max_lon, max_lat];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(GeoError::InvalidBoundingBox(
                "coordinates must be finite numbers".to_string(),
            ));
        }
        if min_lon > max_lon || min_lat > max_lat {
            return Err(GeoError::InvalidBoundingBox(format!(
                "minimum corner ({min_lon}, {min_lat}) lies beyond maximum corner ({max_lon}, {max_lat})"
            )));
        }
        if !(-180.0..=180.0).contains(&min_lon)
            || !(-180.0..=180.0).contains(&max_lon)
            || !(-90.0..=90.0).contains(&min_lat)
            || !(-90.0..=90.0).contains(&max_lat)
        {
            return Err(GeoError::InvalidBoundingBox(
                "coordinates are outside longitude/latitude range".to_string(),
            ));
        }
        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.min_lon <= lon && lon <= self.max_lon && self.min_lat <= lat && lat <= self.max_lat
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        Self {
            min_lon: rect.min().x,
            min_lat: rect.min().y,
            max_lon: rect.max().x,
            max_lat: rect.max().y,
        }
    }
}

/// Parses `"min_lon,min_lat,max_lon,max_lat"`, the order GeoJSON `bbox`
/// members use.
impl FromStr for BoundingBox {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(GeoError::InvalidBoundingBox(format!(
                "expected min_lon,min_lat,max_lon,max_lat, got {s:?}"
            )));
        }
        let mut values = [0.0; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse::<f64>()
                .map_err(|_| GeoError::InvalidBoundingBox(format!("{part:?} is not a number")))?;
        }
        BoundingBox::new(values[0], values[1], values[2], values[3])
    }
}

#[cfg(test)]
mod tests {
    use super::BoundingBox;
    use geo::{coord, Rect};

    #[test]
    fn test_parse_and_contains_inclusive_edges() {
        let bbox: BoundingBox = "-109.1, 36.9, -102.0, 41.0".parse().unwrap();
        assert!(bbox.contains(-105.0, 40.0));
        assert!(bbox.contains(-109.1, 36.9));
        assert!(bbox.contains(-102.0, 41.0));
        assert!(!bbox.contains(-110.0, 40.0));
        assert!(!bbox.contains(-105.0, 41.01));
    }

    #[test]
    fn test_rejects_inverted_and_malformed_boxes() {
        assert!("-102,36.9,-109.1,41".parse::<BoundingBox>().is_err());
        assert!("1,2,3".parse::<BoundingBox>().is_err());
        assert!("a,b,c,d".parse::<BoundingBox>().is_err());
        assert!("0,0,200,10".parse::<BoundingBox>().is_err());
        assert!(BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_from_rect() {
        let rect = Rect::new(coord! { x: -120.0, y: 35.0 }, coord! { x: -118.0, y: 38.0 });
        let bbox = BoundingBox::from(rect);
        assert_eq!(bbox.min_lon, -120.0);
        assert_eq!(bbox.max_lat, 38.0);
    }
}
