use kurbo::{Point, Rect};

/// Whether `point` lies inside the circle of `radius` around `center`.
///
/// Squared-distance comparison, boundary inclusive, no epsilon.
pub fn point_in_circle(point: Point, radius: f64, center: Point) -> bool {
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    dx * dx + dy * dy <= radius * radius
}

/// Circle spanned by a rect: its center plus half the rect width as radius.
pub fn rect_circle(rect: Rect) -> (Point, f64) {
    (rect.center(), rect.width() / 2.0)
}
