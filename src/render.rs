//! Diagram rendering for the top-down packing view.
//!
//! Two renderers share the same [`TopDownLayout`]: a standalone SVG document
//! and a character grid for the terminal. Both draw the carton outline and
//! one rectangle per unit footprint; the height axis is not shown.

use std::fmt::Write as _;

use crate::geometry::TopDownLayout;

/// Pixels per inch in the SVG output.
const SVG_SCALE: f64 = 20.0;
const SVG_MARGIN_LEFT: f64 = 60.0;
const SVG_MARGIN_RIGHT: f64 = 20.0;
const SVG_MARGIN_TOP: f64 = 40.0;
const SVG_MARGIN_BOTTOM: f64 = 50.0;

/// Widest terminal grid in characters (excluding the frame).
const TEXT_MAX_COLUMNS: f64 = 100.0;

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Renders the layout as an SVG document.
///
/// The Y axis points up like a regular plot and both axes share one scale,
/// so the carton keeps its aspect ratio.
pub fn render_svg(layout: &TopDownLayout, title: &str) -> String {
    let plot_w = layout.carton_length * SVG_SCALE;
    let plot_h = layout.carton_width * SVG_SCALE;
    let width = SVG_MARGIN_LEFT + plot_w + SVG_MARGIN_RIGHT;
    let height = SVG_MARGIN_TOP + plot_h + SVG_MARGIN_BOTTOM;

    let sx = |x: f64| SVG_MARGIN_LEFT + x * SVG_SCALE;
    let sy = |y: f64| SVG_MARGIN_TOP + (layout.carton_width - y) * SVG_SCALE;

    let mut svg = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.2}" height="{h:.2}" viewBox="0 0 {w:.2} {h:.2}">"#,
        w = width,
        h = height
    );
    let title = escape_xml(title);
    let _ = writeln!(svg, "  <title>{}</title>", title);
    let _ = writeln!(
        svg,
        r#"  <text x="{:.2}" y="24" text-anchor="middle" font-family="sans-serif" font-size="16">{}</text>"#,
        width / 2.0,
        title
    );

    for unit in &layout.units {
        let _ = writeln!(
            svg,
            r#"  <rect class="unit" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="cyan" fill-opacity="0.5" stroke="blue"/>"#,
            sx(unit.x),
            sy(unit.y + unit.width),
            unit.length * SVG_SCALE,
            unit.width * SVG_SCALE
        );
    }

    let _ = writeln!(
        svg,
        r#"  <rect class="carton" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="black" stroke-width="2"/>"#,
        sx(0.0),
        sy(layout.carton_width),
        plot_w,
        plot_h
    );

    // Axis ticks at the carton edges
    let _ = writeln!(
        svg,
        r#"  <text x="{:.2}" y="{:.2}" text-anchor="middle" font-family="sans-serif" font-size="12">0</text>"#,
        sx(0.0),
        sy(0.0) + 16.0
    );
    let _ = writeln!(
        svg,
        r#"  <text x="{:.2}" y="{:.2}" text-anchor="middle" font-family="sans-serif" font-size="12">{}</text>"#,
        sx(layout.carton_length),
        sy(0.0) + 16.0,
        layout.carton_length
    );
    let _ = writeln!(
        svg,
        r#"  <text x="{:.2}" y="{:.2}" text-anchor="end" font-family="sans-serif" font-size="12">{}</text>"#,
        sx(0.0) - 6.0,
        sy(layout.carton_width) + 4.0,
        layout.carton_width
    );

    let _ = writeln!(
        svg,
        r#"  <text x="{:.2}" y="{:.2}" text-anchor="middle" font-family="sans-serif" font-size="13">Length (inches)</text>"#,
        sx(layout.carton_length / 2.0),
        height - 12.0
    );
    let label_y = sy(layout.carton_width / 2.0);
    let _ = writeln!(
        svg,
        r#"  <text x="20" y="{y:.2}" text-anchor="middle" font-family="sans-serif" font-size="13" transform="rotate(-90 20 {y:.2})">Width (inches)</text>"#,
        y = label_y
    );
    svg.push_str("</svg>\n");
    svg
}

/// Renders the layout as a framed character grid.
///
/// Two columns per inch horizontally and one row per inch vertically keep
/// the proportions roughly square in a terminal. Neighbouring units use
/// alternating fill characters so they stay distinguishable.
pub fn render_text(layout: &TopDownLayout) -> String {
    let col_scale = (TEXT_MAX_COLUMNS / layout.carton_length).min(2.0);
    let row_scale = col_scale / 2.0;
    let cols = (layout.carton_length * col_scale).ceil().max(1.0) as usize;
    let rows = (layout.carton_width * row_scale).ceil().max(1.0) as usize;

    let border = format!("+{}+", "-".repeat(cols));
    let mut out = String::with_capacity((cols + 3) * (rows + 2));
    out.push_str(&border);
    out.push('\n');

    for r in 0..rows {
        out.push('|');
        let y = layout.carton_width - (r as f64 + 0.5) / row_scale;
        for c in 0..cols {
            let x = (c as f64 + 0.5) / col_scale;
            let ch = match layout.unit_at(x, y) {
                Some((_, unit)) => {
                    let i = (unit.x / unit.length).round() as u64;
                    let j = (unit.y / unit.width).round() as u64;
                    if (i + j) % 2 == 0 { '#' } else { '%' }
                }
                None => ' ',
            };
            out.push(ch);
        }
        out.push_str("|\n");
    }

    out.push_str(&border);
    out.push('\n');
    out
}
