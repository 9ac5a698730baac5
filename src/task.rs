//! The interface every decider in the planning pipeline implements.

use crate::error::PlanningError;
use crate::frame::Frame;
use crate::reference_line_info::ReferenceLineInfo;

/// The result of running a decider for one planning cycle.
#[derive(Clone, Debug, PartialEq)]
pub enum DecisionOutcome {
    /// The decider's decisions were applied to the reference line.
    Applied,
    /// The decider could not apply its decisions. The cycle may still proceed;
    /// it is up to the host whether to treat this as fatal.
    Skipped(PlanningError),
}

impl DecisionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    /// Converts the outcome into a `Result`, treating a skip as an error.
    pub fn into_result(self) -> Result<(), PlanningError> {
        match self {
            Self::Applied => Ok(()),
            Self::Skipped(err) => Err(err),
        }
    }
}

/// A planning task which makes decisions about a reference line.
pub trait Decider {
    /// The name of the decider, used in logs.
    fn name(&self) -> &str;

    /// Runs the decider for one planning cycle.
    fn process(
        &self,
        frame: &mut Frame,
        reference_line_info: &mut ReferenceLineInfo,
    ) -> DecisionOutcome;
}
