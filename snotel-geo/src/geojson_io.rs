//! GeoJSON interchange for site collections and region boundaries.
//!
//! Sites are written as a `FeatureCollection` of `Point` features whose
//! properties carry the site metadata. The collection declares CRS84 through
//! a legacy `crs` member so desktop GIS tools pick the right axis order.

use crate::{GeoError, Region};
use geo::{MultiPolygon, Polygon};
use geojson::{feature::Id, Feature, FeatureCollection, GeoJson, Geometry, JsonObject, JsonValue};
use log::debug;
use snotel_core::site::Site;

pub const CRS84: &str = "urn:ogc:def:crs:OGC:1.3:CRS84";

/// Names that denote WGS84 longitude/latitude.
const ACCEPTED_CRS: &[&str] = &[
    "urn:ogc:def:crs:OGC:1.3:CRS84",
    "urn:ogc:def:crs:OGC::CRS84",
    "CRS84",
    "EPSG:4326",
    "urn:ogc:def:crs:EPSG::4326",
];

fn geometry_type(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn crs_member() -> JsonObject {
    let mut crs = JsonObject::new();
    crs.insert(
        "crs".to_string(),
        serde_json::json!({ "type": "name", "properties": { "name": CRS84 } }),
    );
    crs
}

/// Reject documents that declare a CRS other than WGS84 longitude/latitude.
/// Documents without a `crs` member are WGS84 by definition (RFC 7946).
fn check_crs(foreign_members: Option<&JsonObject>) -> Result<(), GeoError> {
    let Some(crs) = foreign_members.and_then(|m| m.get("crs")) else {
        return Ok(());
    };
    let name = crs
        .get("properties")
        .and_then(|p| p.get("name"))
        .and_then(JsonValue::as_str)
        .unwrap_or_default();
    if ACCEPTED_CRS.iter().any(|accepted| accepted.eq_ignore_ascii_case(name)) {
        Ok(())
    } else {
        Err(GeoError::UnsupportedCrs(name.to_string()))
    }
}

fn site_to_feature(site: &Site) -> Result<Feature, GeoError> {
    let mut properties = match serde_json::to_value(site)? {
        JsonValue::Object(map) => map,
        _ => JsonObject::new(),
    };
    // carried by the geometry
    properties.remove("longitude");
    properties.remove("latitude");
    Ok(Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::Point(vec![
            site.longitude,
            site.latitude,
        ]))),
        id: Some(Id::String(site.triplet.clone())),
        properties: Some(properties),
        foreign_members: None,
    })
}

fn feature_to_site(feature: Feature) -> Result<Site, GeoError> {
    let geometry = feature.geometry.ok_or(GeoError::MissingGeometry)?;
    let (lon, lat) = match &geometry.value {
        geojson::Value::Point(position) if position.len() >= 2 => (position[0], position[1]),
        other => {
            return Err(GeoError::UnsupportedGeometry {
                expected: "Point",
                found: geometry_type(other).to_string(),
            })
        }
    };
    let mut properties = feature.properties.unwrap_or_default();
    properties.insert("longitude".to_string(), JsonValue::from(lon));
    properties.insert("latitude".to_string(), JsonValue::from(lat));
    Ok(serde_json::from_value(JsonValue::Object(properties))?)
}

/// Serialize sites as a GeoJSON `FeatureCollection` of points.
pub fn sites_to_geojson(sites: &[Site]) -> Result<String, GeoError> {
    let features = sites
        .iter()
        .map(site_to_feature)
        .collect::<Result<Vec<_>, _>>()?;
    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(crs_member()),
    };
    Ok(serde_json::to_string_pretty(&GeoJson::FeatureCollection(
        collection,
    ))?)
}

/// Read sites written by [`sites_to_geojson`] (or any point collection
/// whose properties carry at least `triplet`, `name`, `state` and `network`).
pub fn sites_from_geojson(text: &str) -> Result<Vec<Site>, GeoError> {
    let geojson: GeoJson = text.parse()?;
    match geojson {
        GeoJson::FeatureCollection(collection) => {
            check_crs(collection.foreign_members.as_ref())?;
            collection.features.into_iter().map(feature_to_site).collect()
        }
        GeoJson::Feature(feature) => {
            check_crs(feature.foreign_members.as_ref())?;
            Ok(vec![feature_to_site(feature)?])
        }
        GeoJson::Geometry(geometry) => Err(GeoError::UnsupportedGeometry {
            expected: "Feature or FeatureCollection",
            found: geometry_type(&geometry.value).to_string(),
        }),
    }
}

fn collect_polygons(geometry: geo::Geometry<f64>, polygons: &mut Vec<Polygon<f64>>) -> bool {
    match geometry {
        geo::Geometry::Polygon(p) => {
            polygons.push(p);
            true
        }
        geo::Geometry::MultiPolygon(mp) => {
            polygons.extend(mp.0);
            true
        }
        geo::Geometry::GeometryCollection(gc) => {
            let mut any = false;
            for g in gc.0 {
                any |= collect_polygons(g, polygons);
            }
            any
        }
        _ => false,
    }
}

fn feature_name(feature: &Feature) -> Option<String> {
    ["name", "NAME", "Name"]
        .iter()
        .find_map(|key| feature.property(key).and_then(JsonValue::as_str))
        .map(str::to_string)
}

/// Read a region boundary from a GeoJSON geometry, feature or feature
/// collection. All polygonal parts are merged into one region; non-polygon
/// features in a collection are ignored.
pub fn read_region(text: &str) -> Result<Region, GeoError> {
    let geojson: GeoJson = text.parse()?;
    let mut polygons = Vec::new();
    let mut name = None;
    match geojson {
        GeoJson::Geometry(geometry) => {
            check_crs(geometry.foreign_members.as_ref())?;
            let found = geometry_type(&geometry.value);
            if !collect_polygons(geometry.try_into()?, &mut polygons) {
                return Err(GeoError::UnsupportedGeometry {
                    expected: "Polygon or MultiPolygon",
                    found: found.to_string(),
                });
            }
        }
        GeoJson::Feature(feature) => {
            check_crs(feature.foreign_members.as_ref())?;
            name = feature_name(&feature);
            let geometry = feature.geometry.ok_or(GeoError::MissingGeometry)?;
            let found = geometry_type(&geometry.value);
            if !collect_polygons(geometry.try_into()?, &mut polygons) {
                return Err(GeoError::UnsupportedGeometry {
                    expected: "Polygon or MultiPolygon",
                    found: found.to_string(),
                });
            }
        }
        GeoJson::FeatureCollection(collection) => {
            check_crs(collection.foreign_members.as_ref())?;
            for feature in collection.features {
                let feature_label = feature_name(&feature);
                let Some(geometry) = feature.geometry else {
                    continue;
                };
                let found = geometry_type(&geometry.value);
                if collect_polygons(geometry.try_into()?, &mut polygons) {
                    name = name.or(feature_label);
                } else {
                    debug!("Ignoring {} feature in region file", found);
                }
            }
        }
    }
    if polygons.is_empty() {
        return Err(GeoError::EmptyRegion);
    }
    Ok(Region::new(name, MultiPolygon(polygons)))
}
