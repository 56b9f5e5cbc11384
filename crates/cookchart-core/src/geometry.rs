//! Board geometry: anchors, edge curves, grid snapping and free-space search.

use crate::config::BoardConfig;
use crate::model::{Node, Side};
use kurbo::{CubicBez, ParamCurveNearest, Point, Rect};

/// Margin kept around existing nodes when auto-placing a new one.
pub const PLACEMENT_MARGIN: f64 = 18.0;
/// Horizontal step of the ring search.
pub const SEARCH_STEP_X: f64 = 34.0;
/// Vertical step of the column walk and ring search.
pub const SEARCH_STEP_Y: f64 = 28.0;
/// Number of vertical steps tried before the ring search.
pub const VERTICAL_TRIES: i32 = 12;
/// Largest ring radius (in steps) of the ring search.
pub const MAX_RING: i32 = 10;
/// Half the width of an edge's hit stroke.
pub const EDGE_HIT_TOLERANCE: f64 = 9.0;
/// Inflation applied to edge control-point bounds for marquee tests.
pub const EDGE_MARQUEE_MARGIN: f64 = 6.0;

/// Snap a coordinate to the nearest grid line.
pub fn snap(value: f64, grid_size: f64) -> f64 {
    (value / grid_size).round() * grid_size
}

/// Snap a point to the nearest grid intersection.
pub fn snap_point(point: Point, grid_size: f64) -> Point {
    Point::new(snap(point.x, grid_size), snap(point.y, grid_size))
}

/// Point on a node's boundary where an edge attaches.
pub fn anchor_for(node: &Node, side: Side, node_width: f64) -> Point {
    let x = match side {
        Side::Left => node.x,
        Side::Right => node.x + node_width,
        Side::Top | Side::Bottom => node.x + node_width / 2.0,
    };
    let y = match side {
        Side::Top => node.y,
        Side::Bottom => node.y + node.h,
        Side::Left | Side::Right => node.y + node.h / 2.0,
    };
    Point::new(x, y)
}

/// Control points for a curve leaving `from` perpendicular to `from_side` and
/// entering `to` perpendicular to `to_side`.
pub fn bezier_controls(from: Point, from_side: Side, to: Point, to_side: Side) -> (Point, Point) {
    let gap = from.distance(to);
    let d = (gap * 0.4).clamp(14.0, 64.0);
    (from + from_side.outward() * d, to + to_side.outward() * d)
}

/// Full cubic for an edge between two anchors.
pub fn edge_curve(from: Point, from_side: Side, to: Point, to_side: Side) -> CubicBez {
    let (c1, c2) = bezier_controls(from, from_side, to, to_side);
    CubicBez::new(from, c1, c2, to)
}

/// Evaluate a cubic Bezier at `t`.
pub fn cubic_point(t: f64, p0: Point, p1: Point, p2: Point, p3: Point) -> Point {
    let u = 1.0 - t;
    let (uu, tt) = (u * u, t * t);
    let v = p0.to_vec2() * (uu * u)
        + p1.to_vec2() * (3.0 * uu * t)
        + p2.to_vec2() * (3.0 * u * tt)
        + p3.to_vec2() * (tt * t);
    v.to_point()
}

/// Visual midpoint of a curve, where edge arrows land.
pub fn curve_midpoint(curve: &CubicBez) -> Point {
    cubic_point(0.5, curve.p0, curve.p1, curve.p2, curve.p3)
}

/// Curve for an edge-arrow decoration: leaves vertically downward from the
/// node and arrives vertically at the target midpoint.
pub fn edge_arrow_curve(from: Point, to: Point) -> CubicBez {
    let dy = ((to.y - from.y).abs() * 0.45).clamp(16.0, 56.0);
    CubicBez::new(
        from,
        Point::new(from.x, from.y + dy),
        Point::new(to.x, to.y - dy),
        to,
    )
}

/// Bounding box of a curve's control polygon, inflated by `margin`.
pub fn curve_control_bounds(curve: &CubicBez, margin: f64) -> Rect {
    let pts = [curve.p0, curve.p1, curve.p2, curve.p3];
    let min_x = pts.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let min_y = pts.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_x = pts.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let max_y = pts.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    Rect::new(min_x, min_y, max_x, max_y).inflate(margin, margin)
}

/// Whether a point lies within `tolerance` of a curve.
pub fn curve_hit(curve: &CubicBez, point: Point, tolerance: f64) -> bool {
    curve.nearest(point, 1e-3).distance_sq <= tolerance * tolerance
}

/// Whether two rectangles overlap once separated by less than `margin`.
///
/// Rectangles exactly `margin` apart do not intersect.
pub fn intersects(a: Rect, b: Rect, margin: f64) -> bool {
    !(a.x1 + margin <= b.x0 || b.x1 + margin <= a.x0 || a.y1 + margin <= b.y0 || b.y1 + margin <= a.y0)
}

/// Whether rectangles overlap or touch (closed intervals), used by marquee hits.
pub fn rects_touch(a: Rect, b: Rect) -> bool {
    !(a.x1 < b.x0 || a.x0 > b.x1 || a.y1 < b.y0 || a.y0 > b.y1)
}

/// Snap a candidate node origin to the grid and clamp it into the board.
pub fn clamped_node_origin(point: Point, height: f64, config: &BoardConfig) -> Point {
    let s = snap_point(point, config.grid_size);
    Point::new(
        s.x.min(config.board_width - config.node_width).max(0.0),
        s.y.min(config.board_height - height).max(0.0),
    )
}

/// Whether a default-height node could sit at `origin` without crowding any
/// existing node.
pub fn can_place_node_at<'a, I>(nodes: I, origin: Point, config: &BoardConfig) -> bool
where
    I: IntoIterator<Item = &'a Node>,
{
    let candidate = Rect::new(
        origin.x,
        origin.y,
        origin.x + config.node_width,
        origin.y + config.node_height,
    );
    !nodes
        .into_iter()
        .any(|n| intersects(candidate, n.rect(config.node_width), PLACEMENT_MARGIN))
}

/// Find a free origin near `preferred` that lies strictly past `origin_y` in
/// the direction `y_dir` (+1 down, -1 up).
///
/// Tries the preferred point, then walks the same column, then searches
/// square rings of growing radius. Returns `None` when every candidate is
/// taken or on the wrong side.
pub fn find_nearby_free_position(
    nodes: &[Node],
    preferred: Point,
    origin_y: f64,
    y_dir: f64,
    config: &BoardConfig,
) -> Option<Point> {
    let direction_ok = |y: f64| if y_dir > 0.0 { y > origin_y } else { y < origin_y };
    let free = |p: Point| direction_ok(p.y) && can_place_node_at(nodes, p, config);

    let base = clamped_node_origin(preferred, config.node_height, config);
    if free(base) {
        return Some(base);
    }

    for i in 1..=VERTICAL_TRIES {
        let p = clamped_node_origin(
            Point::new(base.x, base.y + y_dir * f64::from(i) * SEARCH_STEP_Y),
            config.node_height,
            config,
        );
        if free(p) {
            return Some(p);
        }
    }

    let mut dx_order = vec![0];
    for i in 1..=MAX_RING {
        dx_order.push(i);
        dx_order.push(-i);
    }
    for ring in 1..=MAX_RING {
        for &dx in dx_order.iter().filter(|dx| dx.abs() <= ring) {
            for dy in -ring..=ring {
                if dx.abs().max(dy.abs()) != ring {
                    continue;
                }
                let p = clamped_node_origin(
                    Point::new(
                        base.x + f64::from(dx) * SEARCH_STEP_X,
                        base.y + f64::from(dy) * SEARCH_STEP_Y,
                    ),
                    config.node_height,
                    config,
                );
                if free(p) {
                    return Some(p);
                }
            }
        }
    }
    None
}
