//! Dormand–Prince 5(4) step with stiffness estimate.

use nalgebra::DVector;
use thermnet_core::OdeSystem;

use super::{
    Config, Error,
    norm::{rms, scale},
    rhs::Rhs,
};

pub(super) const ORDER: usize = 5;

const C: [f64; 6] = [1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];

#[rustfmt::skip]
const A: [&[f64]; 6] = [
    &[1.0 / 5.0],
    &[3.0 / 40.0, 9.0 / 40.0],
    &[44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0],
    &[19372.0 / 6561.0, -25360.0 / 2187.0, 64448.0 / 6561.0, -212.0 / 729.0],
    &[9017.0 / 3168.0, -355.0 / 33.0, 46732.0 / 5247.0, 49.0 / 176.0, -5103.0 / 18656.0],
    &[35.0 / 384.0, 0.0, 500.0 / 1113.0, 125.0 / 192.0, -2187.0 / 6784.0, 11.0 / 84.0],
];

/// Difference between the fifth- and fourth-order weights.
const E: [f64; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

/// Result of one trial step.
pub(super) struct Trial {
    /// Fifth-order solution at `t + h`.
    pub y: DVector<f64>,

    /// `f(t + h, y)`, reused as the first stage of the next step.
    pub f: DVector<f64>,

    /// Weighted RMS of the embedded error estimate.
    pub error: f64,

    /// Estimate of `h·|λ|` for the dominant eigenvalue.
    pub h_lambda: f64,
}

/// Takes one step from `(t, y)` with `f0 = f(t, y)`.
pub(super) fn step<S: OdeSystem>(
    rhs: &mut Rhs<'_, S>,
    t: f64,
    y: &DVector<f64>,
    f0: &DVector<f64>,
    h: f64,
    config: &Config,
) -> Result<Trial, Error> {
    let mut k: Vec<DVector<f64>> = Vec::with_capacity(7);
    k.push(f0.clone());

    for (c, a) in C.iter().zip(A) {
        let y_stage = combine(y, h, a, &k);
        k.push(rhs.eval(t + c * h, &y_stage)?);
    }

    // Stages six and seven share their abscissa, so `k[6]` is `f(t + h, y_new)`.
    let y_new = combine(y, h, A[5], &k);
    let y_sixth = combine(y, h, A[4], &k);
    let f_new = k[6].clone();

    let error_vec = combine(&DVector::zeros(y.len()), h, &E, &k);
    let error = rms(&error_vec, &scale(y, &y_new, config.atol(), config.rtol()));

    let numerator = (&k[6] - &k[5]).norm();
    let denominator = (&y_new - &y_sixth).norm();
    let h_lambda = if denominator > 0.0 {
        h * numerator / denominator
    } else {
        0.0
    };

    Ok(Trial {
        y: y_new,
        f: f_new,
        error,
        h_lambda,
    })
}

/// Step size factor after a step with the given error norm.
///
/// Clamped to `[0.2, 10]`, and never above one right after a rejection.
pub(super) fn step_factor(error: f64, after_rejection: bool) -> f64 {
    let max = if after_rejection { 1.0 } else { 10.0 };
    if error == 0.0 {
        return max;
    }
    #[allow(clippy::cast_precision_loss)]
    let factor = 0.9 * error.powf(-1.0 / ORDER as f64);
    if factor.is_nan() {
        0.2
    } else {
        factor.clamp(0.2, max)
    }
}

/// Returns `y + h·Σ a_i·k_i`.
fn combine(y: &DVector<f64>, h: f64, a: &[f64], k: &[DVector<f64>]) -> DVector<f64> {
    let mut out = y.clone();
    for (a, k) in a.iter().zip(k) {
        if *a != 0.0 {
            out.axpy(h * a, k, 1.0);
        }
    }
    out
}
