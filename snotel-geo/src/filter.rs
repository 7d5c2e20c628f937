use crate::{BoundingBox, Region};
use snotel_core::site::Site;

/// Criteria for selecting sites. Every criterion that is set must match;
/// an empty filter keeps everything.
#[derive(Debug, Clone, Default)]
pub struct SiteFilter {
    pub bbox: Option<BoundingBox>,
    pub region: Option<Region>,
    /// Case-insensitive substring of the site name
    pub name_contains: Option<String>,
    pub min_elevation_ft: Option<f64>,
}

impl SiteFilter {
    pub fn matches(&self, site: &Site) -> bool {
        let (lon, lat) = site.point();
        if let Some(bbox) = &self.bbox {
            if !bbox.contains(lon, lat) {
                return false;
            }
        }
        if let Some(region) = &self.region {
            if !region.contains(lon, lat) {
                return false;
            }
        }
        if let Some(needle) = &self.name_contains {
            if !site.name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(min) = self.min_elevation_ft {
            // unknown elevation cannot satisfy a minimum
            if !site.elevation_ft.is_some_and(|e| e >= min) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, sites: &[Site]) -> Vec<Site> {
        sites.iter().filter(|s| self.matches(s)).cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.bbox.is_none()
            && self.region.is_none()
            && self.name_contains.is_none()
            && self.min_elevation_ft.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::SiteFilter;
    use crate::{BoundingBox, Region};
    use geo::polygon;
    use snotel_core::site::Site;

    fn site(triplet: &str, name: &str, lon: f64, lat: f64, elevation: Option<f64>) -> Site {
        Site {
            triplet: triplet.to_string(),
            name: name.to_string(),
            state: "CO".to_string(),
            network: "SNTL".to_string(),
            county: None,
            huc: None,
            elevation_ft: elevation,
            latitude: lat,
            longitude: lon,
            data_time_zone: Some(-7.0),
            begin_date: None,
            end_date: None,
        }
    }

    fn sites() -> Vec<Site> {
        vec![
            site("335:CO:SNTL", "Berthoud Summit", -105.78, 39.80, Some(11300.0)),
            site("457:CO:SNTL", "Grizzly Peak", -105.85, 39.65, Some(11100.0)),
            site("1000:OR:SNTL", "Annie Springs", -122.17, 42.87, Some(6010.0)),
            site("9:CO:SNTL", "Lost Dog", -106.75, 40.82, None),
        ]
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = SiteFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&sites()).len(), 4);
    }

    #[test]
    fn test_bbox_filter() {
        let filter = SiteFilter {
            bbox: Some(BoundingBox::new(-109.1, 36.9, -102.0, 41.0).unwrap()),
            ..Default::default()
        };
        let kept = filter.apply(&sites());
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(|s| s.triplet.contains(":CO:")));
    }

    #[test]
    fn test_region_filter() {
        let front_range = polygon![
            (x: -106.0, y: 39.5),
            (x: -105.5, y: 39.5),
            (x: -105.5, y: 40.0),
            (x: -106.0, y: 40.0),
            (x: -106.0, y: 39.5),
        ];
        let filter = SiteFilter {
            region: Some(Region::from_polygon(None, front_range)),
            ..Default::default()
        };
        let kept: Vec<String> = filter.apply(&sites()).into_iter().map(|s| s.triplet).collect();
        assert_eq!(kept, vec!["335:CO:SNTL", "457:CO:SNTL"]);
    }

    #[test]
    fn test_name_filter_is_case_insensitive() {
        let filter = SiteFilter {
            name_contains: Some("PEAK".to_string()),
            ..Default::default()
        };
        let kept = filter.apply(&sites());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "Grizzly Peak");
    }

    #[test]
    fn test_min_elevation_excludes_unknown() {
        let filter = SiteFilter {
            min_elevation_ft: Some(11200.0),
            ..Default::default()
        };
        let kept = filter.apply(&sites());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].triplet, "335:CO:SNTL");
    }

    #[test]
    fn test_criteria_combine() {
        let filter = SiteFilter {
            bbox: Some(BoundingBox::new(-109.1, 36.9, -102.0, 41.0).unwrap()),
            name_contains: Some("annie".to_string()),
            ..Default::default()
        };
        assert!(filter.apply(&sites()).is_empty());
    }
}
