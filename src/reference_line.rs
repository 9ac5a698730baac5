//! An arc-length parameterised reference line.

use crate::error::PlanningError;
use crate::math::{
    equidistant_points_along_curve, project_point_onto_curve, rot90, vector_heading,
    ParametricCurve2d, Point2d, QuadraticBezier2d, Vector2d,
};
use crate::util::Interval;
use cgmath::prelude::*;

/// The spacing of the points used to build the reference line segments, in m.
const SEGMENT_STEP: f64 = 0.5;

/// Arc lengths this close past either end still resolve to that end, in m.
const LENGTH_EPSILON: f64 = 1e-6;

/// The path a vehicle intends to follow, parameterised by arc length `s`.
#[derive(Clone, Debug)]
pub struct ReferenceLine {
    scale: f64,
    length: f64,
    segments: Vec<QuadraticBezier2d>,
}

/// A point on the reference line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferencePoint {
    /// The world space position.
    pub pos: Point2d,
    /// The heading of the reference line in radians.
    pub heading: f64,
    /// The arc length of the point along the reference line in m.
    pub s: f64,
}

/// A position relative to the reference line.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SlPoint {
    /// The longitudinal position in m.
    pub s: f64,
    /// The lateral offset in m, positive to the left.
    pub l: f64,
}

/// The extents of an object relative to the reference line.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SlBoundary {
    /// The longitudinal extents in m.
    pub s: Interval<f64>,
    /// The lateral extents in m.
    pub l: Interval<f64>,
}

impl ReferencePoint {
    pub fn x(&self) -> f64 {
        self.pos.x
    }

    pub fn y(&self) -> f64 {
        self.pos.y
    }
}

impl SlBoundary {
    /// Creates the smallest boundary containing all of the given points.
    pub fn enclosing(points: &[SlPoint]) -> Option<Self> {
        Some(Self {
            s: Interval::enclosing(points.iter().map(|p| p.s))?,
            l: Interval::enclosing(points.iter().map(|p| p.l))?,
        })
    }

    /// The rearmost longitudinal position.
    pub fn start_s(&self) -> f64 {
        self.s.min
    }

    /// The foremost longitudinal position.
    pub fn end_s(&self) -> f64 {
        self.s.max
    }
}

impl ReferenceLine {
    /// Creates a new [ReferenceLine] from the given parametric curve.
    pub fn new(curve: &impl ParametricCurve2d) -> Result<Self, PlanningError> {
        let (mut points, length) = equidistant_points_along_curve(curve, SEGMENT_STEP);
        if points.len() < 2 {
            let start = curve.sample(curve.bounds().min);
            return Err(PlanningError::DegenerateReferenceLine {
                x: start.x,
                y: start.y,
            });
        }

        // Ensure number of points are odd so they can be evenly divided among segments
        if points.len() % 2 == 0 {
            let p1 = points[points.len() - 2];
            let p2 = points[points.len() - 1];
            points.push(p2 + (p2 - p1));
        }

        let segments = points
            .windows(3)
            .step_by(2)
            .map(|window| {
                let (p1, p2, p3) = (window[0], window[1], window[2]);
                let mid = p1.midpoint(p3);
                let control = p2 + (p2 - mid);
                QuadraticBezier2d::new(&[p1, control, p3])
            })
            .collect::<Vec<_>>();

        Ok(Self {
            scale: 0.5 / SEGMENT_STEP,
            length,
            segments,
        })
    }

    /// The length of the reference line in m.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Resolves an arc length to a point on the reference line.
    ///
    /// Fails if `s` lies outside of the reference line. Only rounding error
    /// within `LENGTH_EPSILON` of either end is tolerated.
    pub fn get_reference_point(&self, s: f64) -> Result<ReferencePoint, PlanningError> {
        if !(s >= -LENGTH_EPSILON && s <= self.length + LENGTH_EPSILON) {
            return Err(PlanningError::OutOfReferenceLine {
                s,
                length: self.length,
            });
        }
        let (segment, t) = self.sample_internal(s.clamp(0.0, self.length));
        Ok(ReferencePoint {
            pos: segment.sample(t),
            heading: vector_heading(segment.sample_dt(t)),
            s,
        })
    }

    /// Projects a world space point onto the reference line.
    ///
    /// Points beyond either end are measured along the tangent at that end,
    /// so `s` may be negative or greater than the length of the line.
    pub fn xy_to_sl(&self, point: Point2d) -> Result<SlPoint, PlanningError> {
        let pos = project_point_onto_curve(self, point, 0.001, None)
            .filter(|pos| pos.is_finite())
            .ok_or(PlanningError::Projection {
                x: point.x,
                y: point.y,
            })?;
        let pos = pos.clamp(0.0, self.length);

        let (segment, t) = self.sample_internal(pos);
        let c = segment.sample(t);
        let tan = segment.sample_dt(t).normalize();
        let rel = point - c;

        Ok(SlPoint {
            s: pos + rel.dot(tan),
            l: rel.dot(rot90(tan)),
        })
    }

    /// Looks up the segment containing `pos`, and the segment's
    /// parameter at that position.
    fn sample_internal(&self, pos: f64) -> (&QuadraticBezier2d, f64) {
        let pos = pos.max(0.0) * self.scale;
        let idx = usize::min(pos as usize, self.segments.len() - 1);
        let t = pos - (idx as f64);
        (&self.segments[idx], t)
    }
}

impl ParametricCurve2d for ReferenceLine {
    fn sample(&self, t: f64) -> Point2d {
        let (segment, t) = self.sample_internal(t);
        segment.sample(t)
    }

    fn bounds(&self) -> Interval<f64> {
        Interval::new(0.0, self.length())
    }

    fn sample_dt(&self, t: f64) -> Vector2d {
        let (segment, t) = self.sample_internal(t);
        segment.sample_dt(t) * self.scale
    }

    fn sample_dt2(&self, t: f64) -> Vector2d {
        let (segment, t) = self.sample_internal(t);
        segment.sample_dt2(t) * self.scale.powi(2)
    }
}
