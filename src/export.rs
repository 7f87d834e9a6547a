//! Writing frames to disk as SVG documents or JSON.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo_types::Coord;
use itertools::Itertools;
use log::info;

use crate::color::Color;
use crate::dimension::Size2D;
use crate::render::{ElementKind, Frame, RenderedElement};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderStats;

    fn element(kind: ElementKind, points: Vec<Coord<f64>>) -> RenderedElement {
        RenderedElement {
            kind,
            points,
            depth: 1.0,
            fill: Some(Color::RED),
            stroke: None,
            tag: None,
            object: 0,
            face: None,
        }
    }

    #[test]
    fn svg_keeps_element_order() {
        let frame = Frame {
            elements: vec![
                RenderedElement {
                    tag: Some("a<b".to_string()),
                    ..element(
                        ElementKind::Polygon,
                        vec![
                            Coord { x: 0.0, y: 0.0 },
                            Coord { x: 10.0, y: 0.0 },
                            Coord { x: 10.0, y: 10.0 },
                        ],
                    )
                },
                element(ElementKind::Dot { radius: 3.0 }, vec![Coord { x: 5.0, y: 5.0 }]),
                RenderedElement {
                    fill: None,
                    stroke: Some(Color::rgba(0, 0, 255, 128)),
                    ..element(
                        ElementKind::Line,
                        vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }],
                    )
                },
            ],
            stats: RenderStats::default(),
        };
        let svg = to_svg(&frame, Size2D::new(20.0, 20.0), Color::WHITE);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r##"<rect width="100%" height="100%" fill="#ffffff"/>"##));
        assert!(svg.contains(
            r##"<polygon points="0.00,0.00 10.00,0.00 10.00,10.00" fill="#ff0000" data-tag="a&lt;b"/>"##
        ));
        assert!(svg.contains(r##"<circle cx="5.00" cy="5.00" r="3.00" fill="#ff0000"/>"##));
        assert!(svg.contains(r##"stroke="#0000ff" stroke-opacity="0.502""##));

        let polygon = svg.find("<polygon").unwrap();
        let circle = svg.find("<circle").unwrap();
        let line = svg.find("<line").unwrap();
        assert!(polygon < circle && circle < line);
    }
}

/// Renders a frame as a standalone SVG document. Elements are written in
/// frame order, so later elements paint over earlier ones.
pub fn to_svg(frame: &Frame, size: Size2D, background: Color) -> String {
    let mut svg = String::new();
    // writing to a String cannot fail
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}">"#,
        size.width, size.height, size.width, size.height
    );
    let _ = writeln!(
        svg,
        r#"<rect width="100%" height="100%"{}/>"#,
        paint("fill", Some(background))
    );
    for element in &frame.elements {
        let _ = writeln!(svg, "{}", svg_element(element));
    }
    svg.push_str("</svg>\n");
    svg
}

fn svg_element(element: &RenderedElement) -> String {
    let tag = element
        .tag
        .as_deref()
        .map(|t| format!(r#" data-tag="{}""#, escape(t)))
        .unwrap_or_default();
    let fill = paint("fill", element.fill);
    let stroke = paint("stroke", element.stroke);

    match (element.kind, element.points.as_slice()) {
        (ElementKind::Dot { radius }, [c, ..]) => format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}"{fill}{stroke}{tag}/>"#,
            c.x, c.y, radius
        ),
        (ElementKind::Line, [a, b, ..]) => format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}"{stroke}{tag}/>"#,
            a.x, a.y, b.x, b.y
        ),
        (_, points) => format!(
            r#"<polygon points="{}"{fill}{stroke}{tag}/>"#,
            points
                .iter()
                .map(|c: &Coord<f64>| format!("{:.2},{:.2}", c.x, c.y))
                .join(" ")
        ),
    }
}

/// A fill or stroke attribute, with an opacity attribute for translucent colors.
fn paint(attribute: &str, color: Option<Color>) -> String {
    match color {
        None => String::new(),
        Some(c) if c.is_opaque() => {
            format!(r##" {attribute}="#{:02x}{:02x}{:02x}""##, c.r, c.g, c.b)
        }
        Some(c) => format!(
            r##" {attribute}="#{:02x}{:02x}{:02x}" {attribute}-opacity="{:.3}""##,
            c.r,
            c.g,
            c.b,
            c.a as f64 / 255.0
        ),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn write_svg(path: &Path, frame: &Frame, size: Size2D, background: Color) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(to_svg(frame, size, background).as_bytes())?;
    writer.flush()?;
    info!("wrote {} elements to {}", frame.elements.len(), path.display());
    Ok(())
}

pub fn write_json(path: &Path, frame: &Frame) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, frame)
        .with_context(|| format!("failed to serialize frame to {}", path.display()))?;
    writer.flush()?;
    info!("wrote {} elements to {}", frame.elements.len(), path.display());
    Ok(())
}
