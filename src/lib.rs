pub use cgmath;
pub use config::{CreepConfig, TaskConfig, TaskType};
pub use creep::{
    CreepDecider, CreepDistance, FixedCreepDistance, StopFence, CREEP_DECISION_TAG,
    CREEP_VO_ID_PREFIX,
};
#[cfg(feature = "debug")]
pub use debug::take_debug_frame;
pub use decision::{
    ObjectDecision, ObjectStop, PathDecision, PathObstacle, StBoundary, StopReasonCode,
};
pub use error::PlanningError;
pub use frame::{Frame, VehicleParams, VehicleState};
pub use obstacle::{Obstacle, ObstacleAttributes};
pub use reference_line::{ReferenceLine, ReferencePoint, SlBoundary, SlPoint};
pub use reference_line_info::ReferenceLineInfo;
pub use scenario::{ProceedWithCautionSpeedKind, ProceedWithCautionSpeedParam, ScenarioContext};
pub use task::{DecisionOutcome, Decider};
pub use util::Interval;

mod config;
mod creep;
mod debug;
mod decision;
mod error;
mod frame;
pub mod math;
mod obstacle;
mod reference_line;
mod reference_line_info;
mod scenario;
mod task;
mod util;
