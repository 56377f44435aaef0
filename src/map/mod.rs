pub mod engine;
pub mod interaction;
pub mod legend;
pub mod merge;
pub mod model;
pub mod projection;
pub mod renderer;
pub mod scale;

#[cfg(test)]
mod fixtures;

pub use engine::ChoroplethMap;
pub use interaction::{PointerEvent, Tooltip, TooltipState};
pub use model::{CityRecord, Datasets, GeoCollection, GeoFeature, RegionDensityRecord};
pub use projection::Projection;
