use crate::color::Rgb;
use crate::map::model::{CityRecord, GeoCollection, GeoFeature};
use crate::map::projection::Projection;
use crate::map::scale::{symbol_radius, CityCategory, DensityScale};
use crate::scene::{Element, Fill, Hatch, JoinStats, LayerId, Scene, Shape, Target, TextAnchor};
use glam::DVec2;
use rayon::prelude::*;

/// Pattern id for countries without density data
pub const NO_DATA_PATTERN: &str = "lightstripe";

/// Symbol opacity
pub const SYMBOL_OPACITY: f64 = 0.55;

/// Cities above this population get a name label
pub const LABEL_POPULATION: f64 = 15_000_000.0;

/// Vertical gap between a symbol's center and its label
pub const LABEL_OFFSET: f64 = 16.0;

/// Baseline shift shared by all map and legend text
pub const TEXT_DY: f64 = 0.35;

/// Join stats for the three map layers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerStats {
    pub countries: JoinStats,
    pub symbols: JoinStats,
    pub labels: JoinStats,
}

/// Register the "no data" hatch
pub fn define_patterns(scene: &mut Scene) {
    scene.defs.patterns.insert(
        NO_DATA_PATTERN.to_string(),
        Hatch {
            background: Rgb::WHITE,
            stripe: Rgb::new(0xcc, 0xcc, 0xcc),
            spacing: 4.0,
            stripe_width: 1.0,
        },
    );
}

/// Country fill: density color when there is data, hatch otherwise
pub fn country_fill(feature: &GeoFeature, scale: Option<&DensityScale>) -> Fill {
    match (feature.density(), scale) {
        (Some(d), Some(scale)) => Fill::Solid(scale.color(d)),
        _ => Fill::Pattern(NO_DATA_PATTERN.to_string()),
    }
}

/// Label text: the city name for very large cities, empty otherwise
pub fn label_text(city: &CityRecord) -> &str {
    // Capitals and non-capitals use the same threshold
    if city.population > LABEL_POPULATION {
        &city.city
    } else {
        ""
    }
}

fn project_feature(feature: &GeoFeature, projection: &Projection) -> Vec<Vec<DVec2>> {
    feature
        .geometry
        .iter()
        .flat_map(|polygon| polygon.iter())
        .map(|ring| ring.iter().map(|&(lon, lat)| projection.project(lon, lat)).collect())
        .collect()
}

/// One path per feature, keyed by feature index
pub fn render_countries(
    scene: &mut Scene,
    collection: &GeoCollection,
    projection: &Projection,
    scale: Option<&DensityScale>,
) -> JoinStats {
    let elements: Vec<(usize, Element)> = collection
        .par_iter()
        .enumerate()
        .map(|(i, feature)| {
            let shape = Shape::Path {
                rings: project_feature(feature, projection),
            };
            (i, Element::new(shape, country_fill(feature, scale)).with_target(Target::Country(i)))
        })
        .collect();
    scene.join(LayerId::Countries, elements)
}

/// One circle per city, keyed by city index
pub fn render_symbols(scene: &mut Scene, cities: &[CityRecord], projection: &Projection) -> JoinStats {
    let elements = cities.iter().enumerate().map(|(i, city)| {
        let fill = CityCategory::of(city).color().map_or(Fill::None, Fill::Solid);
        let shape = Shape::Circle {
            center: projection.project(city.lon, city.lat),
            radius: symbol_radius(city.population),
        };
        (
            i,
            Element::new(shape, fill)
                .with_opacity(SYMBOL_OPACITY)
                .with_target(Target::City(i)),
        )
    });
    scene.join(LayerId::Symbols, elements)
}

/// One text per city, above its symbol; empty for cities below the threshold
pub fn render_labels(scene: &mut Scene, cities: &[CityRecord], projection: &Projection) -> JoinStats {
    let elements = cities.iter().enumerate().map(|(i, city)| {
        let center = projection.project(city.lon, city.lat);
        let shape = Shape::Text {
            position: DVec2::new(center.x, center.y - LABEL_OFFSET),
            content: label_text(city).to_string(),
            anchor: TextAnchor::Middle,
            dy: TEXT_DY,
        };
        (i, Element::new(shape, Fill::None))
    });
    scene.join(LayerId::Labels, elements)
}

/// Draw the country, symbol and label layers
pub fn render_layers(
    scene: &mut Scene,
    collection: &GeoCollection,
    cities: &[CityRecord],
    projection: &Projection,
    scale: Option<&DensityScale>,
) -> LayerStats {
    define_patterns(scene);
    LayerStats {
        countries: render_countries(scene, collection, projection, scale),
        symbols: render_symbols(scene, cities, projection),
        labels: render_labels(scene, cities, projection),
    }
}
