use super::geometry::{Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Moves `hitbox` by `delta_move`, one axis at a time, stopping flush
/// against any obstacle in the way.
///
/// Horizontal runs first, then vertical from the horizontally resolved box,
/// which lets a diagonal move slide along a wall instead of being rejected.
/// Each axis tests the swept span (start box united with the moved box) so
/// a long step cannot pass through a thin obstacle. When several obstacles
/// block the same axis the nearest one wins, independent of slice order.
pub fn resolve(hitbox: Rect, delta_move: Vec2, obstacles: &[Rect]) -> Rect {
    let horizontal = resolve_axis(hitbox, delta_move.x, obstacles, Axis::Horizontal);
    resolve_axis(horizontal, delta_move.y, obstacles, Axis::Vertical)
}

fn resolve_axis(start: Rect, delta: f32, obstacles: &[Rect], axis: Axis) -> Rect {
    if delta == 0.0 || !delta.is_finite() {
        return start;
    }

    let moved = match axis {
        Axis::Horizontal => start.translated(Vec2::new(delta, 0.0)),
        Axis::Vertical => start.translated(Vec2::new(0.0, delta)),
    };
    let swept = start.union(&moved);
    let forward = delta > 0.0;
    let mut resolved = moved;

    for obstacle in obstacles {
        let blocks = obstacle.overlaps(&moved)
            || (obstacle.overlaps(&swept) && lies_ahead(&start, obstacle, axis, forward));
        if !blocks {
            continue;
        }

        match (axis, forward) {
            (Axis::Horizontal, true) => {
                let limit = place_before(obstacle.left(), start.width);
                resolved.x = resolved.x.min(limit);
            }
            (Axis::Horizontal, false) => {
                resolved.x = resolved.x.max(obstacle.right());
            }
            (Axis::Vertical, true) => {
                let limit = place_before(obstacle.top(), start.height);
                resolved.y = resolved.y.min(limit);
            }
            (Axis::Vertical, false) => {
                resolved.y = resolved.y.max(obstacle.bottom());
            }
        }
    }

    resolved
}

fn lies_ahead(start: &Rect, obstacle: &Rect, axis: Axis, forward: bool) -> bool {
    match (axis, forward) {
        (Axis::Horizontal, true) => obstacle.left() >= start.right(),
        (Axis::Horizontal, false) => obstacle.right() <= start.left(),
        (Axis::Vertical, true) => obstacle.top() >= start.bottom(),
        (Axis::Vertical, false) => obstacle.bottom() <= start.top(),
    }
}

/// Leading coordinate for a box of `size` whose far edge must not pass
/// `edge`. `edge - size + size` can round above `edge`; step down until the
/// far edge is at or below it.
fn place_before(edge: f32, size: f32) -> f32 {
    let mut position = edge - size;
    while position + size > edge {
        position -= position.abs().max(1.0) * f32::EPSILON;
    }
    position
}
