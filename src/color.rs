use std::f64::consts::PI;
use std::fmt;

/// An 8-bit sRGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Blend `self` over `background` with the given opacity
    pub fn over(self, background: Rgb, opacity: f64) -> Rgb {
        let a = opacity.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| (fg as f64 * a + bg as f64 * (1.0 - a)).round() as u8;
        Rgb::new(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Rgb> for ratatui::style::Color {
    fn from(c: Rgb) -> Self {
        ratatui::style::Color::Rgb(c.r, c.g, c.b)
    }
}

// CIE Lab reference white (D50) and piecewise constants
const XN: f64 = 0.96422;
const YN: f64 = 1.0;
const ZN: f64 = 0.82521;
const T0: f64 = 4.0 / 29.0;
const T1: f64 = 6.0 / 29.0;
const T2: f64 = 3.0 * T1 * T1;
const T3: f64 = T1 * T1 * T1;

/// Cylindrical CIE Lab. `h` and `c` are NaN for achromatic colors.
#[derive(Clone, Copy, Debug)]
pub struct Hcl {
    pub h: f64,
    pub c: f64,
    pub l: f64,
}

impl From<Rgb> for Hcl {
    fn from(c: Rgb) -> Self {
        let r = srgb_to_linear(c.r);
        let g = srgb_to_linear(c.g);
        let b = srgb_to_linear(c.b);
        let y = xyz_to_lab((0.2225045 * r + 0.7168786 * g + 0.0606169 * b) / YN);
        let (x, z) = if r == g && g == b {
            (y, y)
        } else {
            (
                xyz_to_lab((0.4360747 * r + 0.3850649 * g + 0.1430804 * b) / XN),
                xyz_to_lab((0.0139322 * r + 0.0971045 * g + 0.7141733 * b) / ZN),
            )
        };
        let l = 116.0 * y - 16.0;
        let a = 500.0 * (x - y);
        let bb = 200.0 * (y - z);

        if a == 0.0 && bb == 0.0 {
            let c = if l > 0.0 && l < 100.0 { 0.0 } else { f64::NAN };
            return Hcl { h: f64::NAN, c, l };
        }

        let mut h = bb.atan2(a) * 180.0 / PI;
        if h < 0.0 {
            h += 360.0;
        }
        Hcl { h, c: (a * a + bb * bb).sqrt(), l }
    }
}

impl From<Hcl> for Rgb {
    fn from(hcl: Hcl) -> Self {
        let (a, b) = if hcl.h.is_nan() {
            (0.0, 0.0)
        } else {
            let h = hcl.h * PI / 180.0;
            let c = if hcl.c.is_nan() { 0.0 } else { hcl.c };
            (h.cos() * c, h.sin() * c)
        };

        let y = (hcl.l + 16.0) / 116.0;
        let x = XN * lab_to_xyz(y + a / 500.0);
        let z = ZN * lab_to_xyz(y - b / 200.0);
        let y = YN * lab_to_xyz(y);

        Rgb::new(
            linear_to_srgb(3.1338561 * x - 1.6168667 * y - 0.4906146 * z),
            linear_to_srgb(-0.9787684 * x + 1.9161415 * y + 0.0334540 * z),
            linear_to_srgb(0.0719453 * x - 0.2289914 * y + 1.4052427 * z),
        )
    }
}

fn srgb_to_linear(v: u8) -> f64 {
    let x = v as f64 / 255.0;
    if x <= 0.04045 {
        x / 12.92
    } else {
        ((x + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(x: f64) -> u8 {
    let v = if x <= 0.0031308 {
        12.92 * x
    } else {
        1.055 * x.powf(1.0 / 2.4) - 0.055
    };
    (255.0 * v).round().clamp(0.0, 255.0) as u8
}

fn xyz_to_lab(t: f64) -> f64 {
    if t > T3 {
        t.cbrt()
    } else {
        t / T2 + T0
    }
}

fn lab_to_xyz(t: f64) -> f64 {
    if t > T1 {
        t * t * t
    } else {
        T2 * (t - T0)
    }
}

/// Interpolate in HCL along the shorter hue arc.
/// A NaN channel on one side takes the other side's value.
pub fn interpolate_hcl(from: Rgb, to: Rgb, t: f64) -> Rgb {
    let a = Hcl::from(from);
    let b = Hcl::from(to);

    let h = match (a.h.is_nan(), b.h.is_nan()) {
        (true, true) => f64::NAN,
        (true, false) => b.h,
        (false, true) => a.h,
        (false, false) => {
            let mut d = b.h - a.h;
            if !(-180.0..=180.0).contains(&d) {
                d -= 360.0 * (d / 360.0).round();
            }
            a.h + d * t
        }
    };

    Rgb::from(Hcl {
        h,
        c: lerp_or_constant(a.c, b.c, t),
        l: lerp_or_constant(a.l, b.l, t),
    })
}

fn lerp_or_constant(a: f64, b: f64, t: f64) -> f64 {
    match (a.is_nan(), b.is_nan()) {
        (true, _) => b,
        (_, true) => a,
        _ => a + (b - a) * t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEAL: Rgb = Rgb::new(0xc9, 0xfb, 0xf5);

    #[test]
    fn test_to_hex() {
        assert_eq!(TEAL.to_hex(), "#c9fbf5");
        assert_eq!(Rgb::new(0, 0x0a, 0xff).to_hex(), "#000aff");
    }

    #[test]
    fn test_hcl_endpoints() {
        let teal = TEAL;
        assert_eq!(interpolate_hcl(teal, Rgb::BLACK, 0.0), teal);
        // black carries no hue or chroma, so the far end keeps teal's chroma at zero lightness
        let end = interpolate_hcl(teal, Rgb::BLACK, 1.0);
        assert!(end.r as u32 + end.g as u32 + end.b as u32 <= 60, "{end}");
    }

    #[test]
    fn test_achromatic_hcl() {
        let black = Hcl::from(Rgb::BLACK);
        assert!(black.h.is_nan());
        assert!(black.l.abs() < 1e-9);
        assert_eq!(Rgb::from(black), Rgb::BLACK);
    }

    #[test]
    fn test_hcl_midpoint_darkens_monotonically() {
        let teal = TEAL;
        let lum = |c: Rgb| c.r as u32 + c.g as u32 + c.b as u32;
        let samples: Vec<u32> = (0..=10)
            .map(|i| lum(interpolate_hcl(teal, Rgb::BLACK, i as f64 / 10.0)))
            .collect();
        assert!(samples.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_over_blends() {
        let red = Rgb::new(255, 0, 0);
        assert_eq!(red.over(Rgb::WHITE, 1.0), red);
        assert_eq!(red.over(Rgb::WHITE, 0.0), Rgb::WHITE);
        assert_eq!(red.over(Rgb::BLACK, 0.5), Rgb::new(128, 0, 0));
    }
}
