use nalgebra::DVector;

/// Per-component error scale `atol + rtol·max(|a|, |b|)`.
pub(super) fn scale(a: &DVector<f64>, b: &DVector<f64>, atol: f64, rtol: f64) -> DVector<f64> {
    a.zip_map(b, |a, b| atol + rtol * a.abs().max(b.abs()))
}

/// Root-mean-square of `v` divided component-wise by `scale`.
///
/// Returns zero for empty vectors.
#[allow(clippy::cast_precision_loss)]
pub(super) fn rms(v: &DVector<f64>, scale: &DVector<f64>) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v
        .iter()
        .zip(scale.iter())
        .map(|(v, s)| (v / s).powi(2))
        .sum();
    (sum / v.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn scale_uses_larger_magnitude() {
        let a = DVector::from_vec(vec![1.0, -4.0]);
        let b = DVector::from_vec(vec![-2.0, 3.0]);
        let s = scale(&a, &b, 1e-6, 0.1);

        assert_relative_eq!(s[0], 0.200_001);
        assert_relative_eq!(s[1], 0.400_001);
    }

    #[test]
    fn weighted_rms() {
        let v = DVector::from_vec(vec![3.0, 4.0]);
        let s = DVector::from_vec(vec![1.0, 2.0]);

        // sqrt((9 + 4) / 2)
        assert_relative_eq!(rms(&v, &s), (6.5_f64).sqrt());
        assert_eq!(rms(&DVector::zeros(0), &DVector::zeros(0)), 0.0);
    }
}
