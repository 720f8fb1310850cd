//! Adaptive integrator that switches between explicit and implicit formulas.
//!
//! # Algorithm
//!
//! Integration starts with the Dormand–Prince 5(4) pair, which is cheap per
//! step and accurate for smooth, non-stiff problems. After every accepted step
//! the solver estimates `h·|λ|` for the dominant eigenvalue of the Jacobian.
//! When the step size is repeatedly held at the explicit formula's stability
//! limit, the problem is treated as stiff and the solver switches to a
//! variable-order backward differentiation formula (orders 1 to 5) solved by
//! Newton iteration with a finite-difference Jacobian. When the BDF step sizes
//! fall back inside the explicit stability region for long enough, it switches
//! back.
//!
//! [`Method::NonStiff`] and [`Method::Stiff`] pin the solver to one family.
//!
//! Local errors are measured in a weighted RMS norm with per-component weights
//! `atol + rtol·max(|y_n|, |y_{n+1}|)` and steps are accepted when the norm is
//! at most one.
//!
//! # Output
//!
//! States at the requested evaluation times come from cubic Hermite
//! interpolation over the accepted step that contains them. Times that fall on
//! a step endpoint, including the start of the span, return the stored state
//! exactly. With no evaluation times, every accepted step is recorded.
//!
//! # Failure
//!
//! Running out of step attempts or step size is not an [`Error`]. The solver
//! returns [`Status::Failed`] together with the output gathered so far.
//!
//! # Example
//!
//! ```
//! use std::convert::Infallible;
//!
//! use thermnet_core::OdeSystem;
//! use thermnet_solvers::transient::switching::{self, Config, Status};
//!
//! struct Decay;
//!
//! impl OdeSystem for Decay {
//!     type Error = Infallible;
//!
//!     fn dimension(&self) -> usize {
//!         1
//!     }
//!
//!     fn derivative(&self, _t: f64, y: &[f64], dydt: &mut [f64]) -> Result<(), Infallible> {
//!         dydt[0] = -y[0];
//!         Ok(())
//!     }
//! }
//!
//! let config = Config::new(1e-8, 1e-10).unwrap();
//! let solution =
//!     switching::solve_unobserved(&Decay, [0.0, 1.0], &[1.0], &[0.5, 1.0], &config).unwrap();
//!
//! assert_eq!(solution.status, Status::Complete);
//! assert!((solution.states[1][0] - (-1.0_f64).exp()).abs() < 1e-7);
//! ```

mod action;
mod bdf;
mod config;
mod dense;
mod dopri;
mod error;
mod event;
mod integrate;
mod jacobian;
mod norm;
mod rhs;
mod solution;
mod stiffness;

#[cfg(test)]
mod tests;

pub use action::Action;
pub use config::{Config, ConfigError, Method};
pub use error::Error;
pub use event::{Event, Formula};
pub use solution::{Failure, Solution, Stats, Status};

use thermnet_core::{Observer, OdeSystem};

use integrate::integrate;

/// Integrates `system` over `span` from `initial`.
///
/// `t_eval` lists the output times. They must be non-decreasing and lie
/// inside `span`; an empty slice records every accepted step instead.
///
/// The observer receives an [`Event`] for the initial state and after each
/// accepted step, and may return [`Action::StopEarly`] to end the run.
///
/// # Errors
///
/// Returns an error if the inputs are invalid or the system fails to evaluate.
pub fn solve<S, Obs>(
    system: &S,
    span: [f64; 2],
    initial: &[f64],
    t_eval: &[f64],
    config: &Config,
    observer: Obs,
) -> Result<Solution, Error>
where
    S: OdeSystem,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    integrate(system, span, initial, t_eval, config, observer)
}

/// Integrates `system` without observation.
///
/// This is a convenience wrapper around [`solve`] that discards events.
///
/// # Errors
///
/// Returns an error if the inputs are invalid or the system fails to evaluate.
pub fn solve_unobserved<S: OdeSystem>(
    system: &S,
    span: [f64; 2],
    initial: &[f64],
    t_eval: &[f64],
    config: &Config,
) -> Result<Solution, Error> {
    solve(system, span, initial, t_eval, config, ())
}
