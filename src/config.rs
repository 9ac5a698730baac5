//! Task configuration.

use crate::error::PlanningError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The configuration of the creep decider.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CreepConfig {
    /// How far before the creep stop point the vehicle must stop, in m.
    pub stop_distance: f64,
    /// The speed at which to creep, in m/s.
    pub speed_limit: f64,
    /// The remaining creep distance below which completion is evaluated, in m.
    pub max_valid_stop_distance: f64,
    /// The minimum time before a static obstacle may cross the ego path, in s.
    pub min_boundary_t: f64,
}

impl Default for CreepConfig {
    fn default() -> Self {
        Self {
            stop_distance: 0.5,
            speed_limit: 1.0,
            max_valid_stop_distance: 0.3,
            min_boundary_t: 6.0,
        }
    }
}

impl CreepConfig {
    /// Checks that every value is finite and non-negative.
    pub fn validate(&self) -> Result<(), PlanningError> {
        let fields = [
            ("stop_distance", self.stop_distance),
            ("speed_limit", self.speed_limit),
            ("max_valid_stop_distance", self.max_valid_stop_distance),
            ("min_boundary_t", self.min_boundary_t),
        ];
        match fields.into_iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            Some((field, value)) => Err(PlanningError::InvalidConfig { field, value }),
            None => Ok(()),
        }
    }
}

/// The kind of task in the planning pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TaskType {
    DeciderCreep,
}

/// The configuration of a single task in the planning pipeline.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskConfig {
    pub task_type: TaskType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub decider_creep_config: Option<CreepConfig>,
}

impl TaskConfig {
    /// Creates the config of a creep decider task.
    pub fn creep(config: CreepConfig) -> Self {
        Self {
            task_type: TaskType::DeciderCreep,
            decider_creep_config: Some(config),
        }
    }

    /// Parses a task config from JSON.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, PlanningError> {
        serde_json::from_str(json).map_err(|err| PlanningError::ConfigParse(err.to_string()))
    }
}
