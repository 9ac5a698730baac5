//! The planning frame: the ego vehicle's state and the obstacles known this cycle.

use crate::error::PlanningError;
use crate::obstacle::Obstacle;
use crate::reference_line_info::ReferenceLineInfo;
use std::collections::HashMap;

/// The estimated state of the ego vehicle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VehicleState {
    /// The world space x-coordinate of the vehicle's reference point in m.
    pub x: f64,
    /// The world space y-coordinate of the vehicle's reference point in m.
    pub y: f64,
    /// The heading in radians.
    pub heading: f64,
    /// The speed in m/s.
    pub speed: f64,
}

/// The physical dimensions of the ego vehicle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleParams {
    /// The vehicle length in m.
    pub length: f64,
    /// The vehicle width in m.
    pub width: f64,
    /// Distance from the vehicle's reference point to its front edge, in m.
    pub front_edge_to_center: f64,
    /// Distance from the vehicle's reference point to its back edge, in m.
    pub back_edge_to_center: f64,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            length: 4.933,
            width: 2.11,
            front_edge_to_center: 3.89,
            back_edge_to_center: 1.043,
        }
    }
}

/// A single planning cycle.
#[derive(Clone, Debug)]
pub struct Frame {
    /// The sequence number of the planning cycle.
    sequence_num: u32,
    vehicle_state: VehicleState,
    vehicle_params: VehicleParams,
    /// All obstacles known in this cycle, keyed by their ID.
    obstacles: HashMap<String, Obstacle>,
}

impl Frame {
    /// Creates a new frame.
    pub fn new(
        sequence_num: u32,
        vehicle_state: VehicleState,
        vehicle_params: VehicleParams,
    ) -> Self {
        Self {
            sequence_num,
            vehicle_state,
            vehicle_params,
            obstacles: HashMap::new(),
        }
    }

    pub fn sequence_num(&self) -> u32 {
        self.sequence_num
    }

    pub fn vehicle_state(&self) -> &VehicleState {
        &self.vehicle_state
    }

    pub fn vehicle_params(&self) -> &VehicleParams {
        &self.vehicle_params
    }

    /// Adds a perceived obstacle to the frame, replacing any with the same ID.
    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.insert(obstacle.id().to_string(), obstacle);
    }

    pub fn find_obstacle(&self, id: &str) -> Option<&Obstacle> {
        self.obstacles.get(id)
    }

    /// Returns an iterator over all the obstacles in the frame.
    pub fn obstacles(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.values()
    }

    /// Creates a static virtual obstacle on the reference line at `obstacle_s`,
    /// which downstream planning treats as a wall to stop before.
    ///
    /// Creating an obstacle with an existing ID replaces it.
    pub fn create_stop_obstacle(
        &mut self,
        reference_line_info: &ReferenceLineInfo,
        id: &str,
        obstacle_s: f64,
    ) -> Result<&Obstacle, PlanningError> {
        if id.is_empty() {
            return Err(PlanningError::ObstacleCreation {
                id: id.to_string(),
                reason: "obstacle id is empty".to_string(),
            });
        }
        let point = reference_line_info
            .reference_line()
            .get_reference_point(obstacle_s)
            .map_err(|err| PlanningError::ObstacleCreation {
                id: id.to_string(),
                reason: err.to_string(),
            })?;

        let obstacle = Obstacle::new_virtual(id, point.pos, point.heading);
        self.obstacles.insert(id.to_string(), obstacle);
        self.obstacles
            .get(id)
            .ok_or_else(|| PlanningError::ObstacleCreation {
                id: id.to_string(),
                reason: "obstacle was not stored".to_string(),
            })
    }
}
