//! SVG export.
//!
//! Serializes a [`Scene`] into a standalone SVG document: paint servers go
//! into `<defs>`, every layer becomes a `<g class=..>` inside the chart group
//! translated by the scene origin. Pure function, no I/O.

use crate::scene::{Element, Fill, Scene, Shape, TextAnchor};
use std::fmt::Write;

/// Escape the five XML special characters for text content and attributes
fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn fill_attr(fill: &Fill) -> String {
    match fill {
        Fill::None => "none".to_string(),
        Fill::Solid(c) => c.to_hex(),
        Fill::Pattern(id) | Fill::Gradient(id) => format!("url(#{})", xml_escape(id)),
    }
}

/// `d` attribute for closed rings
fn path_data(rings: &[Vec<glam::DVec2>]) -> String {
    let mut d = String::new();
    for ring in rings {
        for (i, p) in ring.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{cmd}{:.2},{:.2}", p.x, p.y);
        }
        if !ring.is_empty() {
            d.push('Z');
        }
    }
    d
}

fn write_element(out: &mut String, class: &str, element: &Element) {
    let fill = fill_attr(&element.fill);
    let opacity = if element.opacity < 1.0 {
        format!(" opacity=\"{}\"", element.opacity)
    } else {
        String::new()
    };
    match &element.shape {
        Shape::Path { rings } => {
            let _ = writeln!(
                out,
                "<path class=\"{class}\" d=\"{}\" fill=\"{fill}\" fill-rule=\"evenodd\"{opacity}/>",
                path_data(rings)
            );
        }
        Shape::Circle { center, radius } => {
            let _ = writeln!(
                out,
                "<circle class=\"{class}\" cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{fill}\"{opacity}/>",
                center.x, center.y, radius
            );
        }
        Shape::Rect { origin, size } => {
            let _ = writeln!(
                out,
                "<rect class=\"{class}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{fill}\"{opacity}/>",
                origin.x, origin.y, size.x, size.y
            );
        }
        Shape::Text {
            position,
            content,
            anchor,
            dy,
        } => {
            let anchor = match anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
            };
            let fill = if matches!(element.fill, Fill::None) {
                String::new()
            } else {
                format!(" fill=\"{fill}\"")
            };
            let _ = writeln!(
                out,
                "<text class=\"{class}\" x=\"{:.2}\" y=\"{:.2}\" dy=\"{dy}em\" text-anchor=\"{anchor}\"{fill}{opacity}>{}</text>",
                position.x,
                position.y,
                xml_escape(content)
            );
        }
    }
}

/// Serialize the scene as an SVG document
pub fn to_svg(scene: &Scene) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" id=\"{}\" width=\"{}\" height=\"{}\">",
        xml_escape(&scene.id),
        scene.width,
        scene.height
    );

    out.push_str("<defs>\n");
    for (id, hatch) in &scene.defs.patterns {
        let s = hatch.spacing;
        let _ = writeln!(
            out,
            "<pattern id=\"{}\" patternUnits=\"userSpaceOnUse\" width=\"{s}\" height=\"{s}\" patternTransform=\"rotate(45)\">\
             <rect width=\"{s}\" height=\"{s}\" fill=\"{}\"/>\
             <line x1=\"0\" y1=\"0\" x2=\"0\" y2=\"{s}\" stroke=\"{}\" stroke-width=\"{}\"/></pattern>",
            xml_escape(id),
            hatch.background,
            hatch.stripe,
            hatch.stripe_width
        );
    }
    for (id, stops) in &scene.defs.gradients {
        let _ = writeln!(out, "<linearGradient id=\"{}\">", xml_escape(id));
        for stop in stops {
            let _ = writeln!(
                out,
                "<stop offset=\"{}%\" stop-color=\"{}\"/>",
                stop.offset, stop.color
            );
        }
        out.push_str("</linearGradient>\n");
    }
    out.push_str("</defs>\n");

    let _ = writeln!(
        out,
        "<g transform=\"translate({},{})\">",
        scene.origin.x, scene.origin.y
    );
    let mut current = None;
    for (layer, node) in scene.painted() {
        if current != Some(layer) {
            if current.is_some() {
                out.push_str("</g>\n");
            }
            let _ = writeln!(out, "<g class=\"{}-layer\">", layer.class());
            current = Some(layer);
        }
        write_element(&mut out, layer.class(), &node.element);
    }
    if current.is_some() {
        out.push_str("</g>\n");
    }
    out.push_str("</g>\n</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::scene::{GradientStop, LayerId};
    use glam::DVec2;

    #[test]
    fn test_escape() {
        assert_eq!(xml_escape("Côte d'Ivoire & <co>"), "Côte d&apos;Ivoire &amp; &lt;co&gt;");
    }

    #[test]
    fn test_document_structure() {
        let mut scene = Scene::new("map", 300.0, 200.0, DVec2::new(5.0, 6.0));
        scene.defs.gradients.insert(
            "legend-gradient".into(),
            vec![
                GradientStop { offset: 0.0, color: Rgb::WHITE },
                GradientStop { offset: 100.0, color: Rgb::BLACK },
            ],
        );
        scene.join(
            LayerId::Countries,
            [(
                0,
                Element::new(
                    Shape::Path {
                        rings: vec![vec![DVec2::ZERO, DVec2::new(10.0, 0.0), DVec2::new(0.0, 10.0)]],
                    },
                    Fill::Pattern("lightstripe".into()),
                ),
            )],
        );
        scene.join(
            LayerId::Labels,
            [(
                0,
                Element::new(
                    Shape::Text {
                        position: DVec2::new(1.0, 2.0),
                        content: "São Paulo".into(),
                        anchor: TextAnchor::Middle,
                        dy: 0.35,
                    },
                    Fill::None,
                ),
            )],
        );

        let svg = to_svg(&scene);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("id=\"map\" width=\"300\" height=\"200\""));
        assert!(svg.contains("<stop offset=\"100%\" stop-color=\"#000000\"/>"));
        assert!(svg.contains("M0.00,0.00L10.00,0.00L0.00,10.00Z"));
        assert!(svg.contains("fill=\"url(#lightstripe)\""));
        assert!(svg.contains("translate(5,6)"));
        assert!(svg.contains(">São Paulo</text>"));
        assert!(svg.find("country-layer").unwrap() < svg.find("geo-label-layer").unwrap());
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
