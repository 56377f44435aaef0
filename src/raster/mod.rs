//! Terminal back end: paints a [`Scene`] into a [`PixelCanvas`].
//!
//! Shapes are filled into pixels; text nodes cannot be drawn at half-block
//! resolution, so they come back as [`TextOverlay`] cells for the widget to
//! print on top.

mod canvas;
mod geometry;

pub use canvas::{PixelCanvas, HALF_BLOCK};

use crate::color::Rgb;
use crate::scene::{Defs, Element, Fill, GradientStop, Hatch, LayerId, Scene, Shape, TextAnchor};
use geometry::{fill_circle, fill_rect, fill_rings, stroke_rings};
use glam::DVec2;
use std::f64::consts::SQRT_2;

pub const BACKGROUND: Rgb = Rgb::WHITE;
pub const COUNTRY_OUTLINE: Rgb = Rgb::new(0x99, 0x99, 0x99);

/// A text node positioned in character cells
#[derive(Clone, Debug, PartialEq)]
pub struct TextOverlay {
    pub col: i32,
    pub row: i32,
    pub content: String,
    pub layer: LayerId,
}

pub struct Raster {
    pub canvas: PixelCanvas,
    pub texts: Vec<TextOverlay>,
}

/// Container units to canvas pixels
#[derive(Clone, Copy, Debug)]
struct Mapping {
    origin: DVec2,
    scale: DVec2,
}

impl Mapping {
    fn to_pixel(self, p: DVec2) -> DVec2 {
        (p + self.origin) * self.scale
    }

    fn to_scene(self, x: i32, y: i32) -> DVec2 {
        (DVec2::new(x as f64 + 0.5, y as f64 + 0.5) / self.scale) - self.origin
    }
}

enum Paint<'a> {
    Solid(Rgb),
    Hatch(&'a Hatch),
    Gradient { stops: &'a [GradientStop], x0: f64, x1: f64 },
}

impl<'a> Paint<'a> {
    fn resolve(fill: &Fill, defs: &'a Defs, bounds: Option<(DVec2, DVec2)>) -> Option<Self> {
        match fill {
            Fill::None => None,
            Fill::Solid(c) => Some(Paint::Solid(*c)),
            Fill::Pattern(id) => defs.patterns.get(id).map(Paint::Hatch),
            Fill::Gradient(id) => {
                let (min, max) = bounds?;
                defs.gradients.get(id).map(|stops| Paint::Gradient {
                    stops,
                    x0: min.x,
                    x1: max.x,
                })
            }
        }
    }

    /// Color at a point in chart coordinates
    fn color_at(&self, p: DVec2) -> Rgb {
        match self {
            Paint::Solid(c) => *c,
            Paint::Hatch(hatch) => {
                // Stripes rotated 45 degrees
                let u = (p.x + p.y).rem_euclid(hatch.spacing * SQRT_2);
                if u < hatch.stripe_width * SQRT_2 {
                    hatch.stripe
                } else {
                    hatch.background
                }
            }
            Paint::Gradient { stops, x0, x1 } => {
                let span = x1 - x0;
                let t = if span > 0.0 { (p.x - x0) / span } else { 0.0 };
                gradient_color(stops, t.clamp(0.0, 1.0) * 100.0)
            }
        }
    }
}

/// Linear RGB interpolation between the stops around `offset` (percent)
pub fn gradient_color(stops: &[GradientStop], offset: f64) -> Rgb {
    let Some(first) = stops.first() else {
        return BACKGROUND;
    };
    if offset <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if offset <= b.offset {
            let span = b.offset - a.offset;
            let t = if span > 0.0 { (offset - a.offset) / span } else { 1.0 };
            return b.color.over(a.color, t);
        }
    }
    stops.last().map_or(first.color, |s| s.color)
}

/// Paint the scene onto a `cols` x `rows` character grid
pub fn rasterize(scene: &Scene, cols: usize, rows: usize) -> Raster {
    let mut canvas = PixelCanvas::new(cols, rows, BACKGROUND);
    let mut texts = Vec::new();
    if scene.width <= 0.0 || scene.height <= 0.0 {
        return Raster { canvas, texts };
    }
    let mapping = Mapping {
        origin: scene.origin,
        scale: DVec2::new(
            canvas.pixel_width() as f64 / scene.width,
            canvas.pixel_height() as f64 / scene.height,
        ),
    };

    for (layer, node) in scene.painted() {
        paint_element(&mut canvas, &mut texts, &scene.defs, layer, &node.element, mapping);
    }
    Raster { canvas, texts }
}

fn paint_element(
    canvas: &mut PixelCanvas,
    texts: &mut Vec<TextOverlay>,
    defs: &Defs,
    layer: LayerId,
    element: &Element,
    mapping: Mapping,
) {
    let (width, height) = (canvas.pixel_width(), canvas.pixel_height());
    let paint = Paint::resolve(&element.fill, defs, element.shape.bounds());
    let opacity = element.opacity;

    let plot = |canvas: &mut PixelCanvas, x: i32, y: i32| {
        if let Some(paint) = &paint {
            canvas.blend_pixel(x, y, paint.color_at(mapping.to_scene(x, y)), opacity);
        }
    };

    match &element.shape {
        Shape::Path { rings } => {
            let rings: Vec<Vec<DVec2>> = rings
                .iter()
                .map(|ring| ring.iter().map(|&p| mapping.to_pixel(p)).collect())
                .collect();
            fill_rings(&rings, width, height, |x, y| plot(canvas, x, y));
            if layer == LayerId::Countries {
                stroke_rings(canvas, &rings, COUNTRY_OUTLINE);
            }
        }
        Shape::Circle { center, radius } => {
            let r = radius * mapping.scale.min_element();
            fill_circle(mapping.to_pixel(*center), r, width, height, |x, y| plot(canvas, x, y));
        }
        Shape::Rect { origin, size } => {
            let min = mapping.to_pixel(*origin);
            let max = mapping.to_pixel(*origin + *size);
            fill_rect(min, max, width, height, |x, y| plot(canvas, x, y));
        }
        Shape::Text {
            position,
            content,
            anchor,
            ..
        } => {
            if content.is_empty() {
                return;
            }
            let p = mapping.to_pixel(*position);
            let len = content.chars().count() as f64;
            let start = match anchor {
                TextAnchor::Start => p.x,
                TextAnchor::Middle => p.x - len / 2.0,
            };
            texts.push(TextOverlay {
                col: start.round() as i32,
                row: (p.y / 2.0).floor() as i32,
                content: content.clone(),
                layer,
            });
        }
    }
}
