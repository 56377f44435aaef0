use crate::color::Rgb;

/// Upper half block: foreground paints the top pixel, background the bottom
pub const HALF_BLOCK: char = '▀';

/// RGB canvas for terminal graphics.
/// Each character cell holds a 1x2 pixel column drawn with [`HALF_BLOCK`].
#[derive(Clone, Debug)]
pub struct PixelCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    pixels: Vec<Rgb>,
}

impl PixelCanvas {
    /// Create a canvas with the given character dimensions, filled with `background`.
    /// Effective pixel resolution: width x height*2
    pub fn new(width: usize, height: usize, background: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; width * height * 2],
        }
    }

    pub fn pixel_width(&self) -> usize {
        self.width
    }

    pub fn pixel_height(&self) -> usize {
        self.height * 2
    }

    pub fn cols(&self) -> usize {
        self.width
    }

    pub fn rows(&self) -> usize {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        (x < self.pixel_width() && y < self.pixel_height()).then(|| y * self.width + x)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set a pixel using signed coordinates (ignores anything off canvas)
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Composite `color` over the current pixel
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgb, opacity: f64) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color.over(self.pixels[i], opacity);
        }
    }

    /// (top, bottom) pixel colors of a character cell
    pub fn cell(&self, col: usize, row: usize) -> Option<(Rgb, Rgb)> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let top = (row * 2) * self.width + col;
        Some((self.pixels[top], self.pixels[top + self.width]))
    }
}
