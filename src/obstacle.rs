use crate::math::{heading_vector, rot90, Point2d};

/// Obstacles moving slower than this are treated as static, in m/s.
const STATIC_SPEED_THRESHOLD: f64 = 0.5;

/// Represents a vehicle, pedestrian, stop wall or other object
/// the ego vehicle may need to stop before reaching.
#[derive(Clone, Debug)]
pub struct Obstacle {
    /// The obstacle ID.
    id: String,
    /// The world space coordinates of the centre of the obstacle.
    centre: Point2d,
    /// The heading of the obstacle in radians.
    heading: f64,
    /// The length of the obstacle in m.
    length: f64,
    /// The width of the obstacle in m.
    width: f64,
    /// The speed of the obstacle in m/s.
    speed: f64,
    /// Whether the obstacle was injected by the planner rather than perceived.
    is_virtual: bool,
}

/// The attributes of a perceived obstacle.
#[derive(Clone, Copy, Debug)]
pub struct ObstacleAttributes {
    /// The world space coordinates of the centre of the obstacle.
    pub centre: Point2d,
    /// The heading of the obstacle in radians.
    pub heading: f64,
    /// The length of the obstacle in m.
    pub length: f64,
    /// The width of the obstacle in m.
    pub width: f64,
    /// The speed of the obstacle in m/s.
    pub speed: f64,
}

impl Obstacle {
    /// Creates a perceived obstacle.
    pub fn new(id: impl Into<String>, attributes: &ObstacleAttributes) -> Self {
        Self {
            id: id.into(),
            centre: attributes.centre,
            heading: attributes.heading,
            length: attributes.length,
            width: attributes.width,
            speed: attributes.speed,
            is_virtual: false,
        }
    }

    /// Creates a zero-extent, stationary virtual obstacle.
    pub(crate) fn new_virtual(id: impl Into<String>, centre: Point2d, heading: f64) -> Self {
        Self {
            id: id.into(),
            centre,
            heading,
            length: 0.0,
            width: 0.0,
            speed: 0.0,
            is_virtual: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn centre(&self) -> Point2d {
        self.centre
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Whether the obstacle was injected by the planner, such as a stop wall.
    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    /// Whether the obstacle is effectively stationary.
    pub fn is_static(&self) -> bool {
        self.is_virtual || self.speed.abs() < STATIC_SPEED_THRESHOLD
    }

    /// The world space corners of the obstacle's bounding box.
    pub fn corners(&self) -> [Point2d; 4] {
        let half_len = 0.5 * self.length;
        box_corners(self.centre, self.heading, half_len, half_len, 0.5 * self.width)
    }
}

/// Computes the corners of an oriented box.
///
/// # Parameters
/// * `origin` - The reference point of the box
/// * `heading` - The heading of the box in radians
/// * `front` - The distance from `origin` to the front edge
/// * `back` - The distance from `origin` to the back edge
/// * `half_width` - Half the width of the box
pub(crate) fn box_corners(
    origin: Point2d,
    heading: f64,
    front: f64,
    back: f64,
    half_width: f64,
) -> [Point2d; 4] {
    let dir = heading_vector(heading);
    let left = rot90(dir) * half_width;
    let front = origin + dir * front;
    let back = origin - dir * back;
    [front + left, front - left, back - left, back + left]
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn parked_car(speed: f64) -> Obstacle {
        Obstacle::new(
            "car",
            &ObstacleAttributes {
                centre: Point2d::new(10.0, 2.0),
                heading: 0.0,
                length: 4.0,
                width: 2.0,
                speed,
            },
        )
    }

    #[test]
    fn slow_obstacles_are_static() {
        assert!(parked_car(0.0).is_static());
        assert!(parked_car(0.3).is_static());
        assert!(!parked_car(0.5).is_static());
        assert!(!parked_car(8.0).is_static());
    }

    #[test]
    fn virtual_obstacles_are_static_and_flagged() {
        let wall = Obstacle::new_virtual("CREEP_1", Point2d::new(0.0, 0.0), 0.0);
        assert!(wall.is_virtual());
        assert!(wall.is_static());
        assert_eq!(wall.length(), 0.0);
        assert!(!parked_car(0.0).is_virtual());
    }

    #[test]
    fn corners_of_axis_aligned_box() {
        let corners = parked_car(0.0).corners();
        let xs = corners.map(|p| p.x);
        let ys = corners.map(|p| p.y);
        assert_approx_eq!(xs[0], 12.0);
        assert_approx_eq!(ys[0], 3.0);
        assert_approx_eq!(xs[2], 8.0);
        assert_approx_eq!(ys[2], 1.0);
    }
}
