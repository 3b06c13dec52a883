// src/renderer.rs
use egui::{Pos2, Rect, Vec2};

use crate::style::Tool;
use crate::surface::{CoverageMask, RasterSurface};

/// Stroke a straight segment with round caps.
///
/// Called repeatedly with `from` = previous point it approximates a freehand curve.
pub fn paint_segment(surface: &mut RasterSurface, from: Pos2, to: Pos2) {
    let half = half_width(surface);
    let bounds = Rect::from_two_pos(from, to).expand(half + 1.0);
    stroke(surface, bounds, |p| distance_to_segment(p, from, to) <= half);
}

/// Stroke the shape tool's straight line from `start` to `end`
pub fn paint_line(surface: &mut RasterSurface, start: Pos2, end: Pos2) {
    paint_segment(surface, start, end);
}

/// Stroke the outline of the rectangle spanned by two opposite corners.
///
/// The corners may be given in any order, so dragging in any direction works.
/// A rectangle with no extent draws nothing.
pub fn paint_rectangle(surface: &mut RasterSurface, start: Pos2, end: Pos2) {
    let rect = Rect::from_two_pos(start, end);
    if rect.width() == 0.0 && rect.height() == 0.0 {
        return;
    }
    let half = half_width(surface);
    let outer = rect.expand(half);
    let inner = rect.shrink(half);
    stroke(surface, outer.expand(1.0), |p| {
        outer.contains(p) && !(inner.is_positive() && inner.contains(p) && !on_edge(inner, p))
    });
}

/// Stroke a circle centred on `center` whose radius reaches `edge`
pub fn paint_circle(surface: &mut RasterSurface, center: Pos2, edge: Pos2) {
    let radius = center.distance(edge);
    if radius == 0.0 {
        return;
    }
    let half = half_width(surface);
    let bounds = Rect::from_center_size(center, Vec2::splat(2.0 * (radius + half + 1.0)));
    stroke(surface, bounds, |p| (p.distance(center) - radius).abs() <= half);
}

/// Draw the shape a tool produces between its anchor and the current point
pub fn paint_shape(surface: &mut RasterSurface, tool: Tool, start: Pos2, end: Pos2) {
    match tool {
        Tool::Brush => paint_segment(surface, start, end),
        Tool::Line => paint_line(surface, start, end),
        Tool::Rectangle => paint_rectangle(surface, start, end),
        Tool::Circle => paint_circle(surface, start, end),
    }
}

fn half_width(surface: &RasterSurface) -> f32 {
    surface.context().line_width.max(1.0) / 2.0
}

fn stroke(surface: &mut RasterSurface, bounds: Rect, covers: impl Fn(Pos2) -> bool) {
    if let Some(mask) = CoverageMask::from_fn(bounds, surface.size(), covers) {
        surface.fill_mask(&mask);
    }
}

// The inner rect's boundary still belongs to the stroke.
fn on_edge(rect: Rect, p: Pos2) -> bool {
    p.x == rect.min.x || p.x == rect.max.x || p.y == rect.min.y || p.y == rect.max.y
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
