//! State shared between the stages of an active scenario.

/// How the speed planner should limit speed while proceeding with caution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProceedWithCautionSpeedKind {
    /// Proceed at a fixed speed.
    #[default]
    FixedSpeed,
    /// Proceed with caution until a fixed arc length is reached.
    FixedDistance,
}

/// The target of the proceed-with-caution speed profile.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProceedWithCautionSpeedParam {
    pub kind: ProceedWithCautionSpeedKind,
    /// The arc length along the reference line to proceed to, in m.
    pub distance: f64,
}

/// State that lives for the duration of the active scenario.
///
/// A single decider writes to it each planning cycle; later stages
/// read it once that decider has run.
#[derive(Clone, Debug, Default)]
pub struct ScenarioContext {
    pub proceed_with_caution_speed: ProceedWithCautionSpeedParam,
}

impl ScenarioContext {
    pub fn new() -> Self {
        Default::default()
    }
}
