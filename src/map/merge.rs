use crate::map::model::{CityRecord, GeoCollection, RegionDensityRecord};
use std::collections::HashMap;

/// City names that get the landmark label flag
const LABEL_ALLOW_LIST: [&str; 2] = ["Chichen Itza", "Great Wall"];

/// Join density records into features by exact name.
///
/// The first record for a region wins; names are compared byte-for-byte with
/// no trimming or case folding. Features without a record end up with
/// `pop_density == None`. Returns the number of matched features.
pub fn merge(collection: &mut GeoCollection, records: &[RegionDensityRecord]) -> usize {
    let mut by_region: HashMap<&str, f64> = HashMap::with_capacity(records.len());
    for record in records {
        by_region.entry(record.region.as_str()).or_insert(record.pop_density);
    }

    let mut matched = 0;
    for feature in collection.iter_mut() {
        feature.pop_density = by_region.get(feature.name.as_str()).copied();
        if feature.pop_density.is_some() {
            matched += 1;
        }
    }
    matched
}

/// Recompute the landmark label flag for every city
pub fn flag_labels(cities: &mut [CityRecord]) {
    for city in cities {
        city.show_label = LABEL_ALLOW_LIST.contains(&city.city.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::model::GeoFeature;

    fn record(region: &str, pop_density: f64) -> RegionDensityRecord {
        RegionDensityRecord {
            region: region.to_string(),
            pop_density,
        }
    }

    fn collection(names: &[&str]) -> GeoCollection {
        names.iter().map(|n| GeoFeature::new(*n, Vec::new())).collect()
    }

    #[test]
    fn test_exact_match() {
        let mut geo = collection(&["France", "france", "Chad "]);
        let matched = merge(&mut geo, &[record("France", 119.2), record("Chad", 13.0)]);
        assert_eq!(matched, 1);
        assert_eq!(geo[0].pop_density, Some(119.2));
        assert_eq!(geo[1].pop_density, None);
        assert_eq!(geo[2].pop_density, None);
    }

    #[test]
    fn test_first_match_wins() {
        let mut geo = collection(&["Peru"]);
        merge(&mut geo, &[record("Peru", 25.0), record("Peru", 99.0)]);
        assert_eq!(geo[0].pop_density, Some(25.0));
    }

    #[test]
    fn test_idempotent() {
        let records = [record("Japan", 347.0), record("Iceland", 3.6)];
        let mut geo = collection(&["Japan", "Iceland", "Atlantis"]);
        merge(&mut geo, &records);
        let first: Vec<_> = geo.iter().map(|f| f.pop_density).collect();
        merge(&mut geo, &records);
        let second: Vec<_> = geo.iter().map(|f| f.pop_density).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_remerge_clears_stale_values() {
        let mut geo = collection(&["Japan"]);
        merge(&mut geo, &[record("Japan", 347.0)]);
        merge(&mut geo, &[]);
        assert_eq!(geo[0].pop_density, None);
    }

    #[test]
    fn test_flag_labels() {
        let city = |name: &str| CityRecord {
            city: name.to_string(),
            country: String::new(),
            lat: 0.0,
            lon: 0.0,
            population: 0.0,
            capital: String::new(),
            show_label: false,
        };
        let mut cities = vec![city("Great Wall"), city("Tokyo")];
        flag_labels(&mut cities);
        assert!(cities[0].show_label);
        assert!(!cities[1].show_label);
    }
}
