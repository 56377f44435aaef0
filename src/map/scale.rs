use crate::color::{interpolate_hcl, Rgb};
use crate::map::model::{CityRecord, GeoCollection};

/// Low end of the density ramp
pub const DENSITY_LOW: Rgb = Rgb::new(0xc9, 0xfb, 0xf5);
/// High end of the density ramp
pub const DENSITY_HIGH: Rgb = Rgb::new(0x00, 0x00, 0x00);

pub const CAPITAL_RED: Rgb = Rgb::new(0xFF, 0x00, 0x00);
pub const LARGE_ORANGE: Rgb = Rgb::new(0xFF, 0x97, 0x00);
pub const SMALL_BLUE: Rgb = Rgb::new(0x00, 0x00, 0xFF);

/// Population splitting orange from blue symbols
pub const LARGE_CITY_POPULATION: f64 = 9_000_000.0;

/// Symbol radius range used by the legend hint
pub const SYMBOL_RADIUS_RANGE: (f64, f64) = (4.0, 25.0);

/// `[min, max]` of the finite values, or `None` if there are none
pub fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Linear density → color scale interpolated in HCL
#[derive(Clone, Debug, PartialEq)]
pub struct DensityScale {
    pub domain: (f64, f64),
    pub range: (Rgb, Rgb),
}

impl DensityScale {
    /// Domain from every defined density; features without one are skipped.
    pub fn from_collection(collection: &GeoCollection) -> Option<Self> {
        let domain = extent(collection.iter().filter_map(|f| f.density()))?;
        Some(Self {
            domain,
            range: (DENSITY_LOW, DENSITY_HIGH),
        })
    }

    pub fn color(&self, value: f64) -> Rgb {
        let (d0, d1) = self.domain;
        // a collapsed domain maps everything to the middle of the ramp
        let t = if d1 > d0 { (value - d0) / (d1 - d0) } else { 0.5 };
        interpolate_hcl(self.range.0, self.range.1, t)
    }
}

/// Square-root population → radius scale
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl SymbolScale {
    pub fn from_cities(cities: &[CityRecord]) -> Option<Self> {
        let domain = extent(cities.iter().map(|c| c.population))?;
        Some(Self {
            domain,
            range: SYMBOL_RADIUS_RANGE,
        })
    }

    pub fn radius(&self, population: f64) -> f64 {
        let (d0, d1) = (self.domain.0.sqrt(), self.domain.1.sqrt());
        let (r0, r1) = self.range;
        let t = if d1 > d0 {
            (population.sqrt() - d0) / (d1 - d0)
        } else {
            0.5
        };
        r0 + (r1 - r0) * t
    }
}

/// Rendered symbol radius in pixels: `sqrt(trunc(population) * 3e-6)`.
///
/// Populations are truncated to whole people first; anything that does not
/// produce a real radius draws as zero.
pub fn symbol_radius(population: f64) -> f64 {
    let r = (population.trunc() * 3e-6).sqrt();
    if r.is_finite() {
        r
    } else {
        0.0
    }
}

/// Symbol category of a city
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CityCategory {
    Capital,
    Large,
    Small,
    /// Exactly on the threshold (or not a number), non-capital
    Unfilled,
}

impl CityCategory {
    pub fn of(city: &CityRecord) -> Self {
        if city.is_primary_capital() {
            CityCategory::Capital
        } else if city.population > LARGE_CITY_POPULATION {
            CityCategory::Large
        } else if city.population < LARGE_CITY_POPULATION {
            CityCategory::Small
        } else {
            CityCategory::Unfilled
        }
    }

    pub fn color(self) -> Option<Rgb> {
        match self {
            CityCategory::Capital => Some(CAPITAL_RED),
            CityCategory::Large => Some(LARGE_ORANGE),
            CityCategory::Small => Some(SMALL_BLUE),
            CityCategory::Unfilled => None,
        }
    }
}

/// Scales derived for one render cycle
#[derive(Clone, Debug, Default)]
pub struct Scales {
    pub density: Option<DensityScale>,
    pub symbol: Option<SymbolScale>,
}

impl Scales {
    pub fn derive(collection: &GeoCollection, cities: &[CityRecord]) -> Self {
        Self {
            density: DensityScale::from_collection(collection),
            symbol: SymbolScale::from_cities(cities),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::model::GeoFeature;

    fn feature(name: &str, density: Option<f64>) -> GeoFeature {
        let mut f = GeoFeature::new(name, Vec::new());
        f.pop_density = density;
        f
    }

    fn city(name: &str, population: f64, capital: &str) -> CityRecord {
        CityRecord {
            city: name.to_string(),
            country: "Somewhere".to_string(),
            lat: 0.0,
            lon: 0.0,
            population,
            capital: capital.to_string(),
            show_label: false,
        }
    }

    #[test]
    fn test_density_domain_ignores_missing() {
        let geo = vec![
            feature("a", Some(12.0)),
            feature("b", None),
            feature("c", Some(401.5)),
            feature("d", Some(f64::NAN)),
        ];
        let scale = DensityScale::from_collection(&geo).unwrap();
        assert_eq!(scale.domain, (12.0, 401.5));
    }

    #[test]
    fn test_density_scale_empty() {
        let geo = vec![feature("a", None)];
        assert!(DensityScale::from_collection(&geo).is_none());
    }

    #[test]
    fn test_density_color_ends() {
        let scale = DensityScale {
            domain: (1.0, 100.0),
            range: (DENSITY_LOW, DENSITY_HIGH),
        };
        assert_eq!(scale.color(1.0), DENSITY_LOW);
        let dark = scale.color(100.0);
        assert!(dark.r as u32 + dark.g as u32 + dark.b as u32 <= 60);
    }

    #[test]
    fn test_collapsed_domain_uses_midpoint() {
        let scale = DensityScale {
            domain: (5.0, 5.0),
            range: (DENSITY_LOW, DENSITY_HIGH),
        };
        assert_eq!(
            scale.color(5.0),
            interpolate_hcl(DENSITY_LOW, DENSITY_HIGH, 0.5)
        );
    }

    #[test]
    fn test_symbol_scale_sqrt() {
        let cities = [city("a", 100.0, ""), city("b", 10_000.0, "")];
        let scale = SymbolScale::from_cities(&cities).unwrap();
        assert_eq!(scale.radius(100.0), 4.0);
        assert_eq!(scale.radius(10_000.0), 25.0);
        // sqrt(2500) = 50 is 40/90 of the way from 10 to 100
        assert!((scale.radius(2_500.0) - (4.0 + 21.0 * 40.0 / 90.0)).abs() < 1e-9);
    }

    #[test]
    fn test_rendered_radius_formula() {
        assert!((symbol_radius(37_732_000.0) - (37_732_000.0f64 * 3e-6).sqrt()).abs() < 1e-12);
        assert_eq!(symbol_radius(1_000_000.9), symbol_radius(1_000_000.0));
        assert_eq!(symbol_radius(f64::NAN), 0.0);
        assert_eq!(symbol_radius(-5.0), 0.0);
    }

    #[test]
    fn test_radius_monotonic() {
        let pops = [1.0, 500.0, 80_000.0, 2_000_000.0, 15_000_001.0];
        for w in pops.windows(2) {
            assert!(symbol_radius(w[0]) < symbol_radius(w[1]));
        }
    }

    #[test]
    fn test_category_rule() {
        assert_eq!(CityCategory::of(&city("x", 100.0, "primary")), CityCategory::Capital);
        assert_eq!(
            CityCategory::of(&city("x", 30_000_000.0, "primary")).color(),
            Some(CAPITAL_RED)
        );
        assert_eq!(
            CityCategory::of(&city("x", 10_000_000.0, "admin")).color(),
            Some(LARGE_ORANGE)
        );
        assert_eq!(
            CityCategory::of(&city("x", 5_000_000.0, "")).color(),
            Some(SMALL_BLUE)
        );
        assert_eq!(CityCategory::of(&city("x", 9_000_000.0, "")).color(), None);
        assert_eq!(CityCategory::of(&city("x", f64::NAN, "minor")).color(), None);
    }
}
