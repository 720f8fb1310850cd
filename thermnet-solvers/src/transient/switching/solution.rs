use std::fmt;

use nalgebra::DVector;

/// Reasons the solver can give up before reaching the end of the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The configured number of step attempts was used up.
    MaxSteps,

    /// The step size fell below what the time resolution can represent.
    StepSizeTooSmall,
}

/// Indicates how the solver terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Reached the end of the time span.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,

    /// Gave up before reaching the end of the time span.
    Failed(Failure),
}

impl Status {
    /// Returns `true` unless the solver gave up.
    #[must_use]
    pub fn is_success(self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => f.write_str("the solver reached the end of the time span"),
            Self::StoppedByObserver => f.write_str("the observer stopped the solver"),
            Self::Failed(Failure::MaxSteps) => {
                f.write_str("the step budget was exhausted before the end of the time span")
            }
            Self::Failed(Failure::StepSizeTooSmall) => {
                f.write_str("the required step size fell below the time resolution")
            }
        }
    }
}

/// Work counters for a solver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub rhs_evaluations: usize,
    pub jacobian_evaluations: usize,
    pub lu_decompositions: usize,
    pub method_switches: usize,
}

/// The result of a switching-solver run.
#[derive(Debug, Clone)]
pub struct Solution {
    /// How the solver terminated.
    pub status: Status,

    /// Output times, either the requested evaluation times reached so far or
    /// every accepted step when none were requested.
    pub times: Vec<f64>,

    /// State at each output time.
    pub states: Vec<DVector<f64>>,

    /// Work counters.
    pub stats: Stats,
}
