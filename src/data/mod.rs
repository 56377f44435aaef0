//! Upstream data: geography (GeoJSON or TopoJSON) and the two CSV tables.

pub mod topology;

use crate::error::LoadError;
use crate::map::model::{CityRecord, Datasets, GeoCollection, GeoFeature, Polygon, RegionDensityRecord};
use anyhow::{Context, Result};
use geojson::{GeoJson, Value as GeoValue};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use topology::{feature_name, Topology};
use tracing::{info, warn};

/// Where the three datasets live
#[derive(Clone, Debug)]
pub struct DataPaths {
    pub geography: PathBuf,
    pub density: PathBuf,
    pub cities: PathBuf,
}

/// Load all three datasets. Nothing is returned unless every one loads.
pub fn load_datasets(paths: &DataPaths) -> Result<Datasets> {
    let geography = load_geography(&paths.geography)
        .with_context(|| format!("loading geography from {}", paths.geography.display()))?;
    let regions = load_density(&paths.density)
        .with_context(|| format!("loading densities from {}", paths.density.display()))?;
    let cities = load_cities(&paths.cities)
        .with_context(|| format!("loading cities from {}", paths.cities.display()))?;

    info!(
        features = geography.len(),
        regions = regions.len(),
        cities = cities.len(),
        "datasets loaded"
    );
    Ok(Datasets {
        geography,
        regions,
        cities,
    })
}

/// Numeric conversion with the semantics of a JS unary plus: surrounding
/// whitespace ignored, empty is 0, anything unparsable is NaN.
pub fn parse_js_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return f64::NAN;
        }
        return u64::from_str_radix(digits, radix).map_or(f64::NAN, |v| v as f64);
    }

    // Rust also accepts "inf" and "nan" spellings
    if s.chars().any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E')) {
        return f64::NAN;
    }
    s.parse().unwrap_or(f64::NAN)
}

/// Read a GeoJSON FeatureCollection or a TopoJSON Topology
pub fn load_geography(path: &Path) -> Result<GeoCollection, LoadError> {
    let mut bytes = fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: serde_json::Value =
        simd_json::serde::from_slice(&mut bytes).map_err(|e| LoadError::Json {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    parse_geography(value)
}

pub fn parse_geography(value: serde_json::Value) -> Result<GeoCollection, LoadError> {
    if value.get("type").and_then(serde_json::Value::as_str) == Some("Topology") {
        let topology: Topology =
            serde_json::from_value(value).map_err(|e| LoadError::Topology(e.to_string()))?;
        return topology.features();
    }

    match GeoJson::from_json_value(value)? {
        GeoJson::FeatureCollection(fc) => Ok(fc.features.into_iter().filter_map(polygon_feature).collect()),
        GeoJson::Feature(feature) => Ok(polygon_feature(feature).into_iter().collect()),
        GeoJson::Geometry(_) => Err(LoadError::UnsupportedGeography),
    }
}

fn polygon_feature(feature: geojson::Feature) -> Option<GeoFeature> {
    let name = feature_name(feature.properties.as_ref());
    let geometry = match feature.geometry.map(|g| g.value) {
        Some(GeoValue::Polygon(rings)) => vec![to_polygon(rings)],
        Some(GeoValue::MultiPolygon(polygons)) => polygons.into_iter().map(to_polygon).collect(),
        _ => {
            warn!(feature = %name, "skipping feature without polygon geometry");
            return None;
        }
    };
    Some(GeoFeature::new(name, geometry))
}

fn to_polygon(rings: Vec<Vec<Vec<f64>>>) -> Polygon {
    rings
        .into_iter()
        .map(|ring| ring.into_iter().filter(|p| p.len() >= 2).map(|p| (p[0], p[1])).collect())
        .collect()
}

#[derive(Debug, Deserialize)]
struct DensityRow {
    region: String,
    #[serde(default)]
    pop_density: String,
}

#[derive(Debug, Deserialize)]
struct CityRow {
    city: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    lat: String,
    #[serde(default, alias = "lng")]
    lon: String,
    #[serde(default)]
    population: String,
    #[serde(default)]
    capital: String,
}

fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, LoadError> {
    let csv_error = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(csv_error)?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(csv_error)
}

/// Region density table; values stay as given, NaN when unparsable
pub fn load_density(path: &Path) -> Result<Vec<RegionDensityRecord>, LoadError> {
    let rows: Vec<DensityRow> = read_rows(path)?;
    Ok(rows
        .into_iter()
        .map(|row| RegionDensityRecord {
            region: row.region,
            pop_density: parse_js_number(&row.pop_density),
        })
        .collect())
}

/// City table, accepting either `lon` or `lng` for longitude
pub fn load_cities(path: &Path) -> Result<Vec<CityRecord>, LoadError> {
    let rows: Vec<CityRow> = read_rows(path)?;
    Ok(rows
        .into_iter()
        .map(|row| CityRecord {
            city: row.city,
            country: row.country,
            lat: parse_js_number(&row.lat),
            lon: parse_js_number(&row.lon),
            population: parse_js_number(&row.population),
            capital: row.capital,
            show_label: false,
        })
        .collect())
}
