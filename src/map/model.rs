/// A closed ring of (lon, lat) coordinates in degrees
pub type Ring = Vec<(f64, f64)>;

/// Exterior ring first, then holes
pub type Polygon = Vec<Ring>;

pub type MultiPolygon = Vec<Polygon>;

/// One density row from the region table
#[derive(Clone, Debug, PartialEq)]
pub struct RegionDensityRecord {
    pub region: String,
    pub pop_density: f64,
}

/// A named country outline. `pop_density` is filled in by the merge step.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoFeature {
    pub name: String,
    pub geometry: MultiPolygon,
    pub pop_density: Option<f64>,
}

impl GeoFeature {
    pub fn new(name: impl Into<String>, geometry: MultiPolygon) -> Self {
        Self {
            name: name.into(),
            geometry,
            pop_density: None,
        }
    }

    /// Density usable for coloring: present and a real number
    pub fn density(&self) -> Option<f64> {
        self.pop_density.filter(|d| d.is_finite())
    }

    /// Every vertex of every ring
    pub fn coords(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.geometry
            .iter()
            .flat_map(|polygon| polygon.iter())
            .flat_map(|ring| ring.iter().copied())
    }
}

pub type GeoCollection = Vec<GeoFeature>;

/// A city row from the city table
#[derive(Clone, Debug, PartialEq)]
pub struct CityRecord {
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub population: f64,
    /// `"primary"` for national capitals; other values are kept verbatim
    pub capital: String,
    /// Allow-listed landmark flag; not consulted by the label layer
    pub show_label: bool,
}

impl CityRecord {
    pub fn is_primary_capital(&self) -> bool {
        self.capital == "primary"
    }
}

/// The three datasets handed over by the loader
#[derive(Clone, Debug, Default)]
pub struct Datasets {
    pub geography: GeoCollection,
    pub regions: Vec<RegionDensityRecord>,
    pub cities: Vec<CityRecord>,
}
