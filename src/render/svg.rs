use std::fmt::{self, Write};

use super::ir::{DiagramIR, Node};
use super::layout::{Layout, LayoutEdge, LayoutNode};
use super::measure::TextMetrics;

const STYLE: &str = r#"<style>
  .entity-bg { fill: #fff; }
  .entity-header { fill: #e0e0e0; }
  .object { fill: #f5f5f5; }
  .entity-border { fill: none; stroke: #333; stroke-width: 1.5; }
  .entity-name { font-family: monospace; font-size: 14px; font-weight: bold; }
  .column-text { font-family: monospace; font-size: 12px; white-space: pre; }
  .referenced { font-weight: bold; }
  .fk { font-style: italic; }
  .edge { stroke: #666; stroke-width: 1.5; fill: none; }
</style>"#;

/// Write the SVG document for a laid-out diagram.
pub fn write_svg(ir: &DiagramIR, layout: &Layout, metrics: &TextMetrics) -> Result<String, fmt::Error> {
    let mut svg = String::new();

    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        layout.width, layout.height, layout.width, layout.height
    )?;
    writeln!(svg, "{}", STYLE)?;
    writeln!(
        svg,
        r##"<defs><marker id="arrow" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="8" markerHeight="8" orient="auto-start-reverse"><path d="M 0 0 L 10 5 L 0 10 z" fill="#666" /></marker></defs>"##
    )?;

    // Edges first, behind nodes.
    for edge in &layout.edges {
        write_edge(&mut svg, edge)?;
    }

    for layout_node in &layout.nodes {
        if let Some(node) = ir.node(&layout_node.id) {
            write_node(&mut svg, layout_node, node, metrics)?;
        }
    }

    writeln!(svg, "</svg>")?;
    Ok(svg)
}

fn write_node(svg: &mut String, layout: &LayoutNode, node: &Node, metrics: &TextMetrics) -> fmt::Result {
    let (x, y, w, h) = (layout.x, layout.y, layout.width, layout.height);
    let header_h = metrics.header_height();

    if !node.is_table && node.columns.is_empty() {
        writeln!(
            svg,
            r#"<rect class="object" x="{}" y="{}" width="{}" height="{}" rx="8" />"#,
            x, y, w, h
        )?;
        writeln!(
            svg,
            r#"<text class="entity-name" x="{}" y="{}" text-anchor="middle">{}</text>"#,
            x + w / 2.0,
            y + h / 2.0 + 5.0,
            escape_xml(&node.label)
        )?;
        return writeln!(
            svg,
            r#"<rect class="entity-border" x="{}" y="{}" width="{}" height="{}" rx="8" />"#,
            x, y, w, h
        );
    }

    writeln!(
        svg,
        r#"<rect class="entity-bg" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
        x, y, w, h
    )?;

    if node.columns.is_empty() {
        writeln!(
            svg,
            r#"<rect class="entity-header" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
            x, y, w, h
        )?;
    } else {
        // Square off the header's bottom corners.
        writeln!(
            svg,
            r#"<rect class="entity-header" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
            x, y, w, header_h
        )?;
        writeln!(
            svg,
            r#"<rect class="entity-header" x="{}" y="{}" width="{}" height="4" />"#,
            x,
            y + header_h - 4.0,
            w
        )?;
    }

    writeln!(
        svg,
        r#"<text class="entity-name" x="{}" y="{}" text-anchor="middle">{}</text>"#,
        x + w / 2.0,
        y + header_h / 2.0 + 5.0,
        escape_xml(&node.label)
    )?;

    if !node.columns.is_empty() {
        writeln!(
            svg,
            r##"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="#333" stroke-width="1" />"##,
            x,
            y + header_h,
            x + w,
            y + header_h
        )?;

        for (row, column) in node.columns.iter().enumerate() {
            let mut class = "column-text".to_string();
            if column.is_referenced {
                class.push_str(" referenced");
            }
            if column.is_fk {
                class.push_str(" fk");
            }

            writeln!(
                svg,
                r#"<text class="{}" x="{}" y="{}">{}</text>"#,
                class,
                x + metrics.padding_x,
                y + metrics.row_center(row) + 4.0,
                escape_xml(&column.text())
            )?;
        }
    }

    writeln!(
        svg,
        r#"<rect class="entity-border" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
        x, y, w, h
    )
}

fn write_edge(svg: &mut String, edge: &LayoutEdge) -> fmt::Result {
    let points: Vec<String> = edge.points.iter().map(|(x, y)| format!("{},{}", x, y)).collect();
    writeln!(
        svg,
        r#"<polyline class="edge" points="{}" marker-end="url(#arrow)" />"#,
        points.join(" ")
    )
}

/// Escape markup characters. Control characters that XML 1.0 does not allow
/// become U+FFFD.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c.is_control() && c < '\u{7f}' => out.push('\u{fffd}'),
            '\u{fffe}' | '\u{ffff}' => out.push('\u{fffd}'),
            c => out.push(c),
        }
    }
    out
}
