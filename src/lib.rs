pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod map;
pub mod raster;
pub mod scene;
pub mod ui;
