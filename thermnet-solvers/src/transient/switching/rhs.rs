use nalgebra::DVector;
use thermnet_core::OdeSystem;

use super::Error;

/// Evaluates an [`OdeSystem`] on `nalgebra` vectors and counts the calls.
pub(super) struct Rhs<'a, S> {
    system: &'a S,
    evaluations: usize,
}

impl<'a, S: OdeSystem> Rhs<'a, S> {
    pub(super) fn new(system: &'a S) -> Self {
        Self {
            system,
            evaluations: 0,
        }
    }

    pub(super) fn eval(&mut self, t: f64, y: &DVector<f64>) -> Result<DVector<f64>, Error> {
        let mut dydt = DVector::zeros(y.len());
        self.system
            .derivative(t, y.as_slice(), dydt.as_mut_slice())
            .map_err(Error::system)?;
        self.evaluations += 1;
        Ok(dydt)
    }

    pub(super) fn evaluations(&self) -> usize {
        self.evaluations
    }
}
