use crate::map::model::GeoCollection;
use glam::DVec2;
use std::f64::consts::{FRAC_PI_4, PI};

/// Latitude where the Mercator square ends (raw y = ±π)
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Mercator projection scaled and translated to fit a viewport box
#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    /// Pixels per radian
    pub scale: f64,
    /// Pixel offset added after scaling
    pub translate: DVec2,
    /// Box the projection was fit to
    pub width: f64,
    pub height: f64,
}

/// Unscaled Mercator: x = λ, y = -ln(tan(π/4 + φ/2)) so north is up
#[inline(always)]
fn mercator_raw(lon: f64, lat: f64) -> DVec2 {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let phi = lat.to_radians();
    DVec2::new(lon.to_radians(), -(FRAC_PI_4 + phi / 2.0).tan().ln())
}

impl Projection {
    /// Fit so the union of all feature geometry exactly fills `width` x `height`.
    ///
    /// The tighter axis touches both edges of the box; the other axis is
    /// centered. An empty collection centers the origin in the box.
    pub fn fit(width: f64, height: f64, collection: &GeoCollection) -> Self {
        let mut min = DVec2::splat(f64::INFINITY);
        let mut max = DVec2::splat(f64::NEG_INFINITY);
        for (lon, lat) in collection.iter().flat_map(|f| f.coords()) {
            if !lon.is_finite() || !lat.is_finite() {
                continue;
            }
            let p = mercator_raw(lon, lat);
            min = min.min(p);
            max = max.max(p);
        }

        if !min.is_finite() || !max.is_finite() {
            return Self {
                scale: width.min(height) / (2.0 * PI),
                translate: DVec2::new(width / 2.0, height / 2.0),
                width,
                height,
            };
        }

        let extent = max - min;
        let scale = match (extent.x > 0.0, extent.y > 0.0) {
            (true, true) => (width / extent.x).min(height / extent.y),
            (true, false) => width / extent.x,
            (false, true) => height / extent.y,
            (false, false) => 1.0,
        };
        let translate = DVec2::new(
            (width - scale * (min.x + max.x)) / 2.0,
            (height - scale * (min.y + max.y)) / 2.0,
        );

        Self {
            scale,
            translate,
            width,
            height,
        }
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    #[inline]
    pub fn project(&self, lon: f64, lat: f64) -> DVec2 {
        mercator_raw(lon, lat) * self.scale + self.translate
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn invert(&self, p: DVec2) -> (f64, f64) {
        let raw = (p - self.translate) / self.scale;
        let lat = 2.0 * (-raw.y).exp().atan() - PI / 2.0;
        (raw.x.to_degrees(), lat.to_degrees())
    }

    /// Check if a projected point lies inside the fitted box
    pub fn contains(&self, p: DVec2) -> bool {
        const EPS: f64 = 1e-6;
        p.x >= -EPS && p.x <= self.width + EPS && p.y >= -EPS && p.y <= self.height + EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::model::GeoFeature;

    fn square(lon0: f64, lat0: f64, lon1: f64, lat1: f64) -> GeoFeature {
        GeoFeature::new(
            "box",
            vec![vec![vec![
                (lon0, lat0),
                (lon1, lat0),
                (lon1, lat1),
                (lon0, lat1),
                (lon0, lat0),
            ]]],
        )
    }

    #[test]
    fn test_project_center() {
        let geo = vec![square(-10.0, -10.0, 10.0, 10.0)];
        let proj = Projection::fit(100.0, 100.0, &geo);
        let p = proj.project(0.0, 0.0);
        assert!((p.x - 50.0).abs() < 1e-9);
        assert!((p.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_stays_in_box() {
        let geo = vec![
            square(-170.0, -60.0, -30.0, 75.0),
            square(60.0, -90.0, 179.9, 90.0),
        ];
        let proj = Projection::fit(1400.0, 900.0, &geo);
        for p in geo.iter().flat_map(|f| f.coords()) {
            let px = proj.project(p.0, p.1);
            assert!(proj.contains(px), "{px:?} outside box");
        }
    }

    #[test]
    fn test_fit_touches_tight_axis() {
        // wide and short: width is the tight axis
        let geo = vec![square(-100.0, -5.0, 100.0, 5.0)];
        let proj = Projection::fit(400.0, 400.0, &geo);
        let west = proj.project(-100.0, 0.0);
        let east = proj.project(100.0, 0.0);
        assert!(west.x.abs() < 1e-9);
        assert!((east.x - 400.0).abs() < 1e-9);
        let north = proj.project(0.0, 5.0);
        assert!(north.y > 0.0 && north.y < 200.0);
    }

    #[test]
    fn test_north_is_up() {
        let geo = vec![square(-10.0, -10.0, 10.0, 10.0)];
        let proj = Projection::fit(100.0, 100.0, &geo);
        assert!(proj.project(0.0, 9.0).y < proj.project(0.0, -9.0).y);
    }

    #[test]
    fn test_invert_round_trip() {
        let geo = vec![square(-30.0, -20.0, 40.0, 60.0)];
        let proj = Projection::fit(640.0, 480.0, &geo);
        let (lon, lat) = proj.invert(proj.project(12.5, 41.9));
        assert!((lon - 12.5).abs() < 1e-9);
        assert!((lat - 41.9).abs() < 1e-9);
    }

    #[test]
    fn test_empty_collection() {
        let proj = Projection::fit(200.0, 100.0, &Vec::new());
        let p = proj.project(0.0, 0.0);
        assert_eq!(p, DVec2::new(100.0, 50.0));
    }
}
