//! Cairo-based rendering of the selection overlay.

use super::color::Color;
use super::overlay::OverlayStyle;
use super::region::{PolygonRegion, RectangleRegion};
use crate::input::ActiveShape;
use crate::util::SurfaceMapping;

/// Renders the selection overlay onto a Cairo context.
///
/// Paints the whole `width`×`height` area with the mask color (replacing
/// whatever was there, so repeated renders of the same state are
/// pixel-identical), then cuts out and outlines the active shape.
///
/// Zero-size rectangles and polygons with fewer than two vertices add
/// nothing beyond the mask.
///
/// # Arguments
/// * `ctx` - Cairo drawing context of the overlay surface
/// * `width` - Surface width in pixels
/// * `height` - Surface height in pixels
/// * `shape` - Shape reported by the selection controller, if any
/// * `mapping` - Element-to-surface coordinate mapping
/// * `style` - Mask and outline appearance
pub fn render_overlay(
    ctx: &cairo::Context,
    width: i32,
    height: i32,
    shape: Option<ActiveShape<'_>>,
    mapping: &SurfaceMapping,
    style: &OverlayStyle,
) {
    let _ = ctx.save();

    ctx.set_operator(cairo::Operator::Source);
    style.mask.apply(ctx);
    ctx.rectangle(0.0, 0.0, width as f64, height as f64);
    let _ = ctx.fill();
    ctx.set_operator(cairo::Operator::Over);

    match shape {
        Some(ActiveShape::Rectangle(rect)) => render_rectangle(ctx, &rect, mapping, style),
        Some(ActiveShape::Polygon(polygon)) => render_polygon(ctx, polygon, mapping, style),
        None => {}
    }

    let _ = ctx.restore();
}

/// Makes the whole surface fully transparent.
pub fn clear_surface(ctx: &cairo::Context) {
    let _ = ctx.save();
    ctx.set_operator(cairo::Operator::Clear);
    let _ = ctx.paint();
    let _ = ctx.restore();
}

/// Cut out and outline a rectangle
fn render_rectangle(
    ctx: &cairo::Context,
    rect: &RectangleRegion,
    mapping: &SurfaceMapping,
    style: &OverlayStyle,
) {
    if rect.is_empty() {
        return;
    }
    let (x, y, w, h) = mapping.rect_to_surface(rect.x, rect.y, rect.width, rect.height);

    ctx.set_operator(cairo::Operator::Clear);
    ctx.rectangle(x, y, w, h);
    let _ = ctx.fill();
    ctx.set_operator(cairo::Operator::Over);

    outline(ctx, style.outline, style.outline_width);
    ctx.set_line_join(cairo::LineJoin::Miter);
    ctx.rectangle(x, y, w, h);
    let _ = ctx.stroke();
}

/// Draw polygon edges and vertices; closed polygons are also cut out
fn render_polygon(
    ctx: &cairo::Context,
    polygon: &PolygonRegion,
    mapping: &SurfaceMapping,
    style: &OverlayStyle,
) {
    if polygon.len() < 2 {
        return;
    }

    if polygon.is_closed() {
        ctx.set_operator(cairo::Operator::Clear);
        trace_polygon(ctx, polygon, mapping);
        let _ = ctx.fill();
        ctx.set_operator(cairo::Operator::Over);
    }

    outline(ctx, style.outline, style.outline_width);
    ctx.set_line_join(cairo::LineJoin::Round);
    ctx.set_line_cap(cairo::LineCap::Round);
    ctx.new_path();
    for (from, to) in polygon.edges() {
        let (x1, y1) = mapping.to_surface(from);
        let (x2, y2) = mapping.to_surface(to);
        ctx.move_to(x1, y1);
        ctx.line_to(x2, y2);
    }
    let _ = ctx.stroke();

    if style.vertex_radius > 0.0 {
        style.outline.apply(ctx);
        for point in polygon.points() {
            let (x, y) = mapping.to_surface(*point);
            ctx.new_sub_path();
            ctx.arc(x, y, style.vertex_radius, 0.0, std::f64::consts::PI * 2.0);
        }
        let _ = ctx.fill();
    }
}

/// Builds a closed path through the polygon vertices in surface space.
pub(crate) fn trace_polygon(
    ctx: &cairo::Context,
    polygon: &PolygonRegion,
    mapping: &SurfaceMapping,
) {
    ctx.new_path();
    let mut points = polygon.points().iter().map(|p| mapping.to_surface(*p));
    if let Some((x, y)) = points.next() {
        ctx.move_to(x, y);
        for (x, y) in points {
            ctx.line_to(x, y);
        }
        ctx.close_path();
    }
}

fn outline(ctx: &cairo::Context, color: Color, width: f64) {
    color.apply(ctx);
    ctx.set_line_width(width);
}
