use super::Vector2d;

/// Rotates a vector 90 degrees anti-clockwise, so that it points to the left of `vec`.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// A unit vector pointing along the given heading in radians.
pub fn heading_vector(heading: f64) -> Vector2d {
    let (sin, cos) = heading.sin_cos();
    Vector2d::new(cos, sin)
}

/// The heading in radians of a vector, measured anti-clockwise from the x-axis.
pub fn vector_heading(vec: Vector2d) -> f64 {
    vec.y.atan2(vec.x)
}
