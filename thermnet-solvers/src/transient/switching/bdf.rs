//! Variable-step, variable-order backward differentiation formulas.
//!
//! The formulas are built directly from the stored step history, so the step
//! size can change on every step without interpolating the history onto a
//! uniform grid. For order `k`, let `z_0 = t_{n+1}` and `z_1..z_k` be the `k`
//! most recent accepted times. The solution polynomial through those points
//! must satisfy the ODE at `z_0`:
//!
//! ```text
//! Σ_j c_j·y_j = f(z_0, y_0),    c_j = ℓ_j'(z_0)
//! ```
//!
//! where `ℓ_j` are the Lagrange basis polynomials. Because `Σ_j c_j = 0` this
//! can be rewritten around the latest state `y_n`:
//!
//! ```text
//! y_{n+1} = y_n + γh·f(t_{n+1}, y_{n+1}) + Σ_{j≥2} d_j·(y_j − y_n)
//! γh = 1/c_0,    d_j = −c_j/c_0
//! ```
//!
//! Each step is solved by a simplified Newton iteration on `I − γh·J`.

use std::collections::VecDeque;

use log::trace;
use nalgebra::{DMatrix, DVector, Dyn, linalg::LU};
use thermnet_core::OdeSystem;

use super::{
    Config, Error, Stats, jacobian,
    norm::{rms, scale},
    rhs::Rhs,
};

const MAX_NEWTON_ITERATIONS: usize = 4;
const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const JACOBIAN_MAX_AGE: usize = 20;

/// Outcome of one BDF step attempt.
pub(super) enum Attempt {
    Accepted {
        y: DVector<f64>,
        f: DVector<f64>,
        h_next: f64,
    },
    Rejected {
        h_next: f64,
    },
}

struct Factorization {
    gamma_h: f64,
    lu: LU<f64, Dyn, Dyn>,
}

/// State carried between BDF steps.
pub(super) struct Bdf {
    max_order: usize,
    order: usize,
    steps_at_order: usize,
    failures: usize,
    times: VecDeque<f64>,
    states: VecDeque<DVector<f64>>,
    jacobian: Option<DMatrix<f64>>,
    jacobian_time: f64,
    jacobian_age: usize,
    factorization: Option<Factorization>,
    previous_error: Option<(f64, DVector<f64>)>,
}

impl Bdf {
    pub(super) fn new(max_order: usize) -> Self {
        Self {
            max_order,
            order: 1,
            steps_at_order: 0,
            failures: 0,
            times: VecDeque::with_capacity(max_order + 2),
            states: VecDeque::with_capacity(max_order + 2),
            jacobian: None,
            jacobian_time: f64::NAN,
            jacobian_age: 0,
            factorization: None,
            previous_error: None,
        }
    }

    /// Discards the history and starts again at order one from `(t, y)`.
    pub(super) fn restart(&mut self, t: f64, y: &DVector<f64>) {
        *self = Self::new(self.max_order);
        self.times.push_front(t);
        self.states.push_front(y.clone());
    }

    /// Order the next attempt will use.
    pub(super) fn order(&self) -> usize {
        self.order.min(self.usable_order())
    }

    /// `‖J‖∞` of the current Jacobian, if one has been evaluated.
    pub(super) fn jacobian_norm(&self) -> Option<f64> {
        self.jacobian.as_ref().map(jacobian::inf_norm)
    }

    /// Highest order the history supports.
    ///
    /// Order `k` needs `k` points for the corrector and `k + 1` for the
    /// predictor, except on the very first step, which predicts with `f_n`.
    fn usable_order(&self) -> usize {
        self.times.len().saturating_sub(1).max(1)
    }

    /// Attempts a step from the latest history point to `t_new`.
    ///
    /// `f_n` must be `f` at the latest history point.
    pub(super) fn attempt<S: OdeSystem>(
        &mut self,
        rhs: &mut Rhs<'_, S>,
        f_n: &DVector<f64>,
        t_new: f64,
        config: &Config,
        stats: &mut Stats,
    ) -> Result<Attempt, Error> {
        let k = self.order();
        let t_n = self.times[0];
        let h = t_new - t_n;

        let (c0, coefficients) = corrector_coefficients(t_new, self.times.range(..k));
        let gamma_h = 1.0 / c0;

        // Coefficient `c_j` belongs to `states[j - 1]`.
        let y_n = self.states[0].clone();
        let mut psi = y_n.clone();
        for (c, y_j) in coefficients[2..].iter().zip(self.states.iter().skip(1)) {
            psi.axpy(-c / c0, &(y_j - &y_n), 1.0);
        }

        let first_step = self.times.len() == 1;
        let (y_pred, constant) = if first_step {
            (&y_n + f_n * h, 0.5)
        } else {
            (
                extrapolate(t_new, self.times.range(..=k), self.states.range(..=k)),
                error_constant(t_new, &self.times, k),
            )
        };

        let corrected =
            self.solve_corrector(rhs, f_n, t_new, &psi, &y_pred, gamma_h, config, stats)?;
        let Some(y_new) = corrected else {
            self.failures += 1;
            trace!("BDF Newton iteration failed at t = {t_n}, h = {h}");
            return Ok(Attempt::Rejected {
                h_next: h * 0.25,
            });
        };

        let local_error = (&y_new - &y_pred) * constant;
        let weights = scale(&y_n, &y_new, config.atol(), config.rtol());
        let error = rms(&local_error, &weights);

        if !(error <= 1.0) {
            self.failures += 1;
            if self.failures >= 2 && self.order > 1 {
                self.order -= 1;
                self.steps_at_order = 0;
            }
            if self.failures >= 3 {
                self.jacobian = None;
            }
            let factor = if error.is_nan() {
                MIN_FACTOR
            } else {
                order_factor(error, k).clamp(MIN_FACTOR, SAFETY)
            };
            return Ok(Attempt::Rejected { h_next: h * factor });
        }

        let f_new = rhs.eval(t_new, &y_new)?;

        self.failures = 0;
        self.steps_at_order += 1;
        self.jacobian_age += 1;
        if self.jacobian_age >= JACOBIAN_MAX_AGE {
            self.jacobian = None;
        }

        let factor = self.select_order(t_new, &y_new, &local_error, &weights, error, h, k);
        self.previous_error = Some((h, local_error));

        self.times.push_front(t_new);
        self.states.push_front(y_new.clone());
        self.times.truncate(self.max_order + 2);
        self.states.truncate(self.max_order + 2);

        Ok(Attempt::Accepted {
            y: y_new,
            f: f_new,
            h_next: h * factor,
        })
    }

    /// Solves the corrector equation, refreshing a stale Jacobian once on failure.
    #[allow(clippy::too_many_arguments, clippy::float_cmp)]
    fn solve_corrector<S: OdeSystem>(
        &mut self,
        rhs: &mut Rhs<'_, S>,
        f_n: &DVector<f64>,
        t_new: f64,
        psi: &DVector<f64>,
        y_pred: &DVector<f64>,
        gamma_h: f64,
        config: &Config,
        stats: &mut Stats,
    ) -> Result<Option<DVector<f64>>, Error> {
        let t_n = self.times[0];

        loop {
            if self.jacobian.is_none() {
                self.refresh_jacobian(rhs, f_n, config, stats)?;
            }

            let needs_factorization = self
                .factorization
                .as_ref()
                .is_none_or(|factorization| factorization.gamma_h != gamma_h);
            if needs_factorization {
                let Some(jacobian) = self.jacobian.as_ref() else {
                    return Ok(None);
                };
                let n = jacobian.nrows();
                let iteration_matrix = DMatrix::identity(n, n) - jacobian * gamma_h;
                self.factorization = Some(Factorization {
                    gamma_h,
                    lu: iteration_matrix.lu(),
                });
                stats.lu_decompositions += 1;
            }

            let Some(factorization) = self.factorization.as_ref() else {
                return Ok(None);
            };
            if let Some(y) = newton(rhs, t_new, psi, y_pred, gamma_h, &factorization.lu, config)? {
                return Ok(Some(y));
            }

            if self.jacobian_time == t_n {
                return Ok(None);
            }
            self.refresh_jacobian(rhs, f_n, config, stats)?;
        }
    }

    fn refresh_jacobian<S: OdeSystem>(
        &mut self,
        rhs: &mut Rhs<'_, S>,
        f_n: &DVector<f64>,
        config: &Config,
        stats: &mut Stats,
    ) -> Result<(), Error> {
        let t_n = self.times[0];
        let floor = config.atol().max(1e-8);
        self.jacobian = Some(jacobian::forward_difference(
            rhs,
            t_n,
            &self.states[0],
            f_n,
            floor,
        )?);
        self.jacobian_time = t_n;
        self.jacobian_age = 0;
        self.factorization = None;
        stats.jacobian_evaluations += 1;
        Ok(())
    }

    /// Picks the order for the next step and returns its step size factor.
    ///
    /// A change is considered only after `k + 2` steps at the current order.
    #[allow(clippy::too_many_arguments, clippy::cast_precision_loss)]
    fn select_order(
        &mut self,
        t_new: f64,
        y_new: &DVector<f64>,
        local_error: &DVector<f64>,
        weights: &DVector<f64>,
        error: f64,
        h: f64,
        k: usize,
    ) -> f64 {
        let mut best_order = k;
        let mut best_factor = order_factor(error, k) / 1.2;

        if self.steps_at_order >= k + 2 {
            // Lower order: compare against the degree k − 1 predictor.
            if k > 1 {
                let lower = extrapolate(t_new, self.times.range(..k), self.states.range(..k));
                let lower_error = rms(
                    &((y_new - lower) * error_constant(t_new, &self.times, k - 1)),
                    weights,
                );
                let factor = order_factor(lower_error, k - 1) / 1.3;
                if factor > best_factor {
                    best_order = k - 1;
                    best_factor = factor;
                }
            }

            // Higher order: the change in the local error between steps.
            if k < self.max_order && self.times.len() > k + 1 {
                if let Some((h_previous, previous)) = &self.previous_error {
                    let ratio = (h / h_previous).powi(i32::try_from(k + 1).unwrap_or(i32::MAX));
                    let difference = local_error - previous * ratio;
                    let higher_error = rms(&difference, weights) / (k + 2) as f64;
                    let factor = order_factor(higher_error, k + 1) / 1.4;
                    if factor > best_factor {
                        best_order = k + 1;
                        best_factor = factor;
                    }
                }
            }
        }

        if best_order != k {
            trace!("BDF order {k} -> {best_order}");
            self.order = best_order;
            self.steps_at_order = 0;
        }

        let max_growth = if best_order >= 3 { 1.5 } else { 2.0 };
        best_factor.min(max_growth)
    }
}

/// Step size factor `error^(−1/(order+1))`, infinite for a zero error.
#[allow(clippy::cast_precision_loss)]
fn order_factor(error: f64, order: usize) -> f64 {
    if error == 0.0 {
        f64::INFINITY
    } else {
        SAFETY * error.powf(-1.0 / (order + 1) as f64)
    }
}

/// Returns `c_0` and `[c_0, c_1, …, c_k]` for the nodes `t_new, times…`.
fn corrector_coefficients<'a>(
    t_new: f64,
    times: impl Iterator<Item = &'a f64>,
) -> (f64, Vec<f64>) {
    let nodes: Vec<f64> = std::iter::once(t_new).chain(times.copied()).collect();
    let c0: f64 = nodes[1..].iter().map(|z| 1.0 / (t_new - z)).sum();

    let mut coefficients = vec![c0];
    for (j, &z_j) in nodes.iter().enumerate().skip(1) {
        let numerator: f64 = nodes
            .iter()
            .enumerate()
            .filter(|&(m, _)| m != 0 && m != j)
            .map(|(_, z_m)| t_new - z_m)
            .product();
        let denominator: f64 = nodes
            .iter()
            .enumerate()
            .filter(|&(m, _)| m != j)
            .map(|(_, z_m)| z_j - z_m)
            .product();
        coefficients.push(numerator / denominator);
    }

    (c0, coefficients)
}

/// Ratio between the corrector's local error and the predictor–corrector
/// difference at order `k`.
fn error_constant(t_new: f64, times: &VecDeque<f64>, k: usize) -> f64 {
    let c0: f64 = times.range(..k).map(|z| 1.0 / (t_new - z)).sum();
    let inverse = 1.0 / c0;
    inverse / (inverse + (t_new - times[k]))
}

/// Evaluates the interpolating polynomial through `(times, states)` at `t`.
fn extrapolate<'a>(
    t: f64,
    times: impl Iterator<Item = &'a f64>,
    states: impl Iterator<Item = &'a DVector<f64>>,
) -> DVector<f64> {
    let nodes: Vec<f64> = times.copied().collect();
    let mut out: Option<DVector<f64>> = None;

    for (i, y_i) in states.enumerate() {
        let weight: f64 = nodes
            .iter()
            .enumerate()
            .filter(|&(m, _)| m != i)
            .map(|(_, x_m)| (t - x_m) / (nodes[i] - x_m))
            .product();
        match out.as_mut() {
            Some(out) => out.axpy(weight, y_i, 1.0),
            None => out = Some(y_i * weight),
        }
    }

    out.unwrap_or_else(|| DVector::zeros(0))
}

/// Simplified Newton iteration for `y = ψ + γh·f(t, y)`.
///
/// Returns `None` when the iteration diverges or converges too slowly.
fn newton<S: OdeSystem>(
    rhs: &mut Rhs<'_, S>,
    t: f64,
    psi: &DVector<f64>,
    y_pred: &DVector<f64>,
    gamma_h: f64,
    lu: &LU<f64, Dyn, Dyn>,
    config: &Config,
) -> Result<Option<DVector<f64>>, Error> {
    let tolerance = (10.0 * f64::EPSILON / config.rtol()).max(config.rtol().sqrt().min(0.03));
    let weights = y_pred.map(|y| config.atol() + config.rtol() * y.abs());

    let mut y = y_pred.clone();
    let mut previous_norm: Option<f64> = None;

    for iteration in 0..MAX_NEWTON_ITERATIONS {
        let f = rhs.eval(t, &y)?;
        let residual = psi + f * gamma_h - &y;
        let Some(dy) = lu.solve(&residual) else {
            return Ok(None);
        };

        let dy_norm = rms(&dy, &weights);
        if !dy_norm.is_finite() {
            return Ok(None);
        }

        let rate = previous_norm.map(|previous| dy_norm / previous);
        if let Some(rate) = rate {
            let remaining = i32::try_from(MAX_NEWTON_ITERATIONS - iteration).unwrap_or(i32::MAX);
            if rate >= 1.0 || rate.powi(remaining) / (1.0 - rate) * dy_norm > tolerance {
                return Ok(None);
            }
        }

        y += dy;

        if dy_norm == 0.0 || rate.is_some_and(|rate| rate / (1.0 - rate) * dy_norm < tolerance) {
            return Ok(Some(y));
        }
        previous_norm = Some(dy_norm);
    }

    Ok(None)
}
