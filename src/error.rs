//! Errors raised while building planning decisions.

use thiserror::Error;

/// An error raised by the planning collaborators or a decider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanningError {
    /// A task was configured without its decider-specific config block.
    #[error("task config is missing the `{0}` block")]
    MissingConfig(&'static str),
    /// A config value is outside its allowed range.
    #[error("invalid config value for `{field}`: {value}")]
    InvalidConfig { field: &'static str, value: f64 },
    /// A config document could not be parsed.
    #[error("failed to parse task config: {0}")]
    ConfigParse(String),
    /// The obstacle factory refused to create an obstacle.
    #[error("failed to create obstacle [{id}]: {reason}")]
    ObstacleCreation { id: String, reason: String },
    /// An obstacle could not be registered on the reference line.
    #[error("failed to create path obstacle for [{id}]")]
    ObstacleRegistration { id: String },
    /// A decision referenced an obstacle that is not on the reference line.
    #[error("no path obstacle with id [{0}]")]
    UnknownObstacle(String),
    /// An arc length lies outside of the reference line.
    #[error("s = {s:.3} is outside of the reference line [0, {length:.3}]")]
    OutOfReferenceLine { s: f64, length: f64 },
    /// A reference line was built from a curve with no length.
    #[error("reference line starting at ({x:.3}, {y:.3}) has zero length")]
    DegenerateReferenceLine { x: f64, y: f64 },
    /// A point could not be projected onto the reference line.
    #[error("failed to project ({x:.3}, {y:.3}) onto the reference line")]
    Projection { x: f64, y: f64 },
}
