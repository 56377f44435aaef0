//! Small in-memory datasets shared by the map tests.

use crate::map::model::{CityRecord, Datasets, GeoCollection, GeoFeature, RegionDensityRecord};

fn rect(lon0: f64, lat0: f64, lon1: f64, lat1: f64) -> Vec<(f64, f64)> {
    vec![(lon0, lat0), (lon1, lat0), (lon1, lat1), (lon0, lat1), (lon0, lat0)]
}

pub fn regions() -> Vec<RegionDensityRecord> {
    [("Japan", 347.0), ("France", 119.2), ("Brazil", 25.4)]
        .into_iter()
        .map(|(region, pop_density)| RegionDensityRecord {
            region: region.to_string(),
            pop_density,
        })
        .collect()
}

/// Japan, France and Brazil have densities; Greenland has none
pub fn countries() -> GeoCollection {
    let mut geo = vec![
        GeoFeature::new("Japan", vec![vec![rect(129.0, 31.0, 146.0, 45.0)]]),
        GeoFeature::new("France", vec![vec![rect(-5.0, 42.0, 8.0, 51.0)]]),
        GeoFeature::new(
            "Brazil",
            vec![
                vec![rect(-74.0, -34.0, -34.0, 5.0)],
                vec![rect(-30.0, -4.0, -29.0, -3.0)],
            ],
        ),
        GeoFeature::new("Greenland", vec![vec![rect(-73.0, 60.0, -12.0, 83.0)]]),
    ];
    crate::map::merge::merge(&mut geo, &regions());
    geo
}

pub fn city(name: &str, population: f64, capital: &str) -> CityRecord {
    CityRecord {
        city: name.to_string(),
        country: "Testland".to_string(),
        lat: 0.0,
        lon: 0.0,
        population,
        capital: capital.to_string(),
        show_label: false,
    }
}

/// Tokyo sits inside the Japan rectangle, Lyon inside France
pub fn cities() -> Vec<CityRecord> {
    vec![
        CityRecord {
            city: "Tokyo".to_string(),
            country: "Japan".to_string(),
            lat: 35.69,
            lon: 139.69,
            population: 37_732_000.0,
            capital: "primary".to_string(),
            show_label: false,
        },
        CityRecord {
            city: "Lyon".to_string(),
            country: "France".to_string(),
            lat: 45.76,
            lon: 4.84,
            population: 516_092.0,
            capital: "admin".to_string(),
            show_label: false,
        },
    ]
}

pub fn datasets() -> Datasets {
    let mut geography = countries();
    for feature in &mut geography {
        feature.pop_density = None;
    }
    Datasets {
        geography,
        regions: regions(),
        cities: cities(),
    }
}
