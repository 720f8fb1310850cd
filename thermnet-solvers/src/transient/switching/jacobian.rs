use nalgebra::{DMatrix, DVector};
use thermnet_core::OdeSystem;

use super::{Error, rhs::Rhs};

/// Approximates `∂f/∂y` at `(t, y)` by forward differences.
///
/// `f` must be `f(t, y)`. Each column costs one right-hand-side evaluation.
/// Perturbations are `√ε·max(|y_j|, floor)`, rounded so that `y_j + δ` is
/// exactly representable.
pub(super) fn forward_difference<S: OdeSystem>(
    rhs: &mut Rhs<'_, S>,
    t: f64,
    y: &DVector<f64>,
    f: &DVector<f64>,
    floor: f64,
) -> Result<DMatrix<f64>, Error> {
    let n = y.len();
    let mut jacobian = DMatrix::zeros(n, n);
    let root_eps = f64::EPSILON.sqrt();
    let mut perturbed = y.clone();

    for j in 0..n {
        let yj = y[j];
        perturbed[j] = yj + root_eps * yj.abs().max(floor);
        let delta = perturbed[j] - yj;

        let f_perturbed = rhs.eval(t, &perturbed)?;
        jacobian.set_column(j, &((f_perturbed - f) / delta));

        perturbed[j] = yj;
    }

    Ok(jacobian)
}

/// Returns the maximum absolute row sum.
pub(super) fn inf_norm(matrix: &DMatrix<f64>) -> f64 {
    matrix
        .row_iter()
        .map(|row| row.iter().map(|v| v.abs()).sum::<f64>())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use approx::assert_relative_eq;

    /// `f(y) = [y0·y1, -3·y0]`
    struct Product;

    impl OdeSystem for Product {
        type Error = Infallible;

        fn dimension(&self) -> usize {
            2
        }

        fn derivative(&self, _t: f64, y: &[f64], dydt: &mut [f64]) -> Result<(), Self::Error> {
            dydt[0] = y[0] * y[1];
            dydt[1] = -3.0 * y[0];
            Ok(())
        }
    }

    #[test]
    fn matches_analytic_jacobian() {
        let system = Product;
        let mut rhs = Rhs::new(&system);
        let y = DVector::from_vec(vec![2.0, 5.0]);
        let f = rhs.eval(0.0, &y).unwrap();

        let jacobian = forward_difference(&mut rhs, 0.0, &y, &f, 1e-8).unwrap();

        assert_relative_eq!(jacobian[(0, 0)], 5.0, epsilon = 1e-6);
        assert_relative_eq!(jacobian[(0, 1)], 2.0, epsilon = 1e-6);
        assert_relative_eq!(jacobian[(1, 0)], -3.0, epsilon = 1e-6);
        assert_relative_eq!(jacobian[(1, 1)], 0.0, epsilon = 1e-6);
        assert_eq!(rhs.evaluations(), 3);

        assert_relative_eq!(inf_norm(&jacobian), 7.0, epsilon = 1e-5);
    }
}
