//! A reference line together with everything decided about it this cycle.

use crate::decision::{PathDecision, PathObstacle};
use crate::error::PlanningError;
use crate::frame::{VehicleParams, VehicleState};
use crate::math::Point2d;
use crate::obstacle::{box_corners, Obstacle};
use crate::reference_line::{ReferenceLine, SlBoundary, SlPoint};

/// A candidate reference line and the decisions made along it.
#[derive(Clone, Debug)]
pub struct ReferenceLineInfo {
    reference_line: ReferenceLine,
    /// The ego vehicle's footprint relative to the reference line.
    adc_sl_boundary: SlBoundary,
    path_decision: PathDecision,
}

impl ReferenceLineInfo {
    /// Creates a new [ReferenceLineInfo], projecting the ego vehicle's
    /// footprint onto the reference line.
    pub fn new(
        reference_line: ReferenceLine,
        vehicle_state: &VehicleState,
        vehicle_params: &VehicleParams,
    ) -> Result<Self, PlanningError> {
        let corners = box_corners(
            Point2d::new(vehicle_state.x, vehicle_state.y),
            vehicle_state.heading,
            vehicle_params.front_edge_to_center,
            vehicle_params.back_edge_to_center,
            0.5 * vehicle_params.width,
        );
        let adc_sl_boundary = sl_boundary(&reference_line, corners).ok_or(
            PlanningError::Projection {
                x: vehicle_state.x,
                y: vehicle_state.y,
            },
        )?;
        Ok(Self::with_adc_sl_boundary(reference_line, adc_sl_boundary))
    }

    /// Creates a new [ReferenceLineInfo] with an already known ego vehicle footprint.
    pub fn with_adc_sl_boundary(
        reference_line: ReferenceLine,
        adc_sl_boundary: SlBoundary,
    ) -> Self {
        Self {
            reference_line,
            adc_sl_boundary,
            path_decision: PathDecision::new(),
        }
    }

    pub fn reference_line(&self) -> &ReferenceLine {
        &self.reference_line
    }

    /// The ego vehicle's footprint relative to the reference line.
    pub fn adc_sl_boundary(&self) -> &SlBoundary {
        &self.adc_sl_boundary
    }

    pub fn set_adc_sl_boundary(&mut self, boundary: SlBoundary) {
        self.adc_sl_boundary = boundary;
    }

    pub fn path_decision(&self) -> &PathDecision {
        &self.path_decision
    }

    pub fn path_decision_mut(&mut self) -> &mut PathDecision {
        &mut self.path_decision
    }

    /// Projects an obstacle onto the reference line and adds it to the path decision.
    ///
    /// Fails if the obstacle cannot be projected, or if its ID is taken by an
    /// obstacle of the other kind.
    pub fn add_obstacle(&mut self, obstacle: Obstacle) -> Result<&PathObstacle, PlanningError> {
        let boundary = sl_boundary(&self.reference_line, obstacle.corners()).ok_or_else(|| {
            PlanningError::ObstacleRegistration {
                id: obstacle.id().to_string(),
            }
        })?;
        self.path_decision.add_path_obstacle(obstacle, boundary)
    }
}

/// Computes the boundary of a set of points relative to the reference line.
fn sl_boundary(reference_line: &ReferenceLine, corners: [Point2d; 4]) -> Option<SlBoundary> {
    let points = corners
        .into_iter()
        .map(|corner| reference_line.xy_to_sl(corner))
        .collect::<Result<Vec<SlPoint>, _>>()
        .ok()?;
    SlBoundary::enclosing(&points)
}
