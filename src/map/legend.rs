use crate::color::Rgb;
use crate::config::MapConfig;
use crate::map::renderer::{SYMBOL_OPACITY, TEXT_DY};
use crate::map::scale::{DensityScale, SymbolScale, DENSITY_HIGH, DENSITY_LOW};
use crate::scene::{Element, Fill, GradientStop, LayerId, Scene, Shape, TextAnchor};
use glam::DVec2;

pub const LEGEND_GRADIENT: &str = "legend-gradient";
pub const LEGEND_TITLE: &str = "Pop. density per square km";

/// Gap between the gradient and the symbol-size hint
const SYMBOL_HINT_GAP: f64 = 40.0;
const SYMBOL_HINT_COLOR: Rgb = Rgb::new(0x88, 0x88, 0x88);

/// One end of the density gradient
#[derive(Clone, Debug, PartialEq)]
pub struct LegendStop {
    pub color: Rgb,
    pub value: f64,
    /// Percent
    pub offset: f64,
}

/// The two gradient ends; values are NaN when no feature has a density
pub fn legend_stops(scale: Option<&DensityScale>) -> [LegendStop; 2] {
    let (min, max) = scale.map_or((f64::NAN, f64::NAN), |s| s.domain);
    [
        LegendStop {
            color: DENSITY_LOW,
            value: min,
            offset: 0.0,
        },
        LegendStop {
            color: DENSITY_HIGH,
            value: max,
            offset: 100.0,
        },
    ]
}

/// Round half up to one decimal and print like a JS number
pub fn format_legend_value(value: f64) -> String {
    let rounded = (value * 10.0 + 0.5).floor() / 10.0;
    // normalizes -0
    format!("{}", rounded + 0.0)
}

fn format_population(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.0}k", value / 1_000.0)
    } else {
        format!("{}", value.trunc())
    }
}

fn text(position: DVec2, content: impl Into<String>, anchor: TextAnchor) -> Element {
    Element::new(
        Shape::Text {
            position,
            content: content.into(),
            anchor,
            dy: TEXT_DY,
        },
        Fill::None,
    )
}

/// Top-left corner of the legend group in chart coordinates
pub fn legend_origin(config: &MapConfig) -> DVec2 {
    DVec2::new(
        config.legend_left,
        config.inner_height() - config.legend_bottom,
    )
}

/// Draw the gradient swatch, its end labels and the optional symbol-size hint
pub fn render_legend(
    scene: &mut Scene,
    config: &MapConfig,
    density: Option<&DensityScale>,
    symbol: Option<&SymbolScale>,
) {
    let origin = legend_origin(config);
    let width = config.legend_rect_width;
    let stops = legend_stops(density);

    scene.defs.gradients.insert(
        LEGEND_GRADIENT.to_string(),
        stops
            .iter()
            .map(|s| GradientStop {
                offset: s.offset,
                color: s.color,
            })
            .collect(),
    );

    let swatch = Element::new(
        Shape::Rect {
            origin,
            size: DVec2::new(width, config.legend_rect_height),
        },
        Fill::Gradient(LEGEND_GRADIENT.to_string()),
    );
    let title = text(origin + DVec2::new(0.0, -10.0), LEGEND_TITLE, TextAnchor::Start);
    scene.join(LayerId::LegendSwatch, [(0, swatch), (1, title)]);

    let labels = stops.iter().enumerate().map(|(i, stop)| {
        let x = if i == 0 { 0.0 } else { width };
        (
            i,
            text(
                origin + DVec2::new(x, 20.0),
                format_legend_value(stop.value),
                TextAnchor::Middle,
            ),
        )
    });
    scene.join(LayerId::LegendLabels, labels);

    let hint = match symbol {
        Some(scale) if config.legend_symbols => symbol_hint(origin, config, scale),
        _ => Vec::new(),
    };
    scene.join(LayerId::LegendSymbols, hint);
}

/// Circles for the smallest and largest population, resting on the swatch's bottom edge
fn symbol_hint(origin: DVec2, config: &MapConfig, scale: &SymbolScale) -> Vec<(usize, Element)> {
    let baseline = origin.y + config.legend_rect_height;
    let mut x = origin.x + config.legend_rect_width + SYMBOL_HINT_GAP;
    let mut elements = Vec::with_capacity(4);

    for (i, population) in [scale.domain.0, scale.domain.1].into_iter().enumerate() {
        let radius = scale.radius(population);
        x += radius;
        let circle = Element::new(
            Shape::Circle {
                center: DVec2::new(x, baseline - radius),
                radius,
            },
            Fill::Solid(SYMBOL_HINT_COLOR),
        )
        .with_opacity(SYMBOL_OPACITY);
        let caption = text(
            DVec2::new(x, origin.y + 20.0),
            format_population(population),
            TextAnchor::Middle,
        );
        elements.push((2 * i, circle));
        elements.push((2 * i + 1, caption));
        x += radius + SYMBOL_HINT_GAP / 2.0;
    }
    elements
}
