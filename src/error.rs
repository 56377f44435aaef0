use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parentElement must name a mount point")]
    MissingParent,
    #[error("container {width}x{height} leaves no drawing area after margins")]
    EmptyDrawingArea { width: f64, height: f64 },
    #[error("failed to read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML configuration")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path:?}: {message}")]
    Json { path: PathBuf, message: String },
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("invalid TopoJSON: {0}")]
    Topology(String),
    #[error("geography must be a FeatureCollection or a Topology")]
    UnsupportedGeography,
    #[error("invalid CSV in {path:?}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
