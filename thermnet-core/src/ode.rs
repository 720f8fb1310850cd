/// A system of first-order ordinary differential equations `dy/dt = f(t, y)`.
///
/// Implementors describe the right-hand side only; integration, step-size
/// control and output are the solver's concern. Solvers call [`derivative`]
/// many times per step (stages, Jacobian columns, Newton iterations), so it
/// must be a pure function of `t` and `y`.
///
/// [`derivative`]: OdeSystem::derivative
pub trait OdeSystem {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the number of state variables.
    fn dimension(&self) -> usize;

    /// Writes `f(t, y)` into `dydt`.
    ///
    /// Both slices have length [`dimension`](OdeSystem::dimension).
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the derivative cannot be evaluated.
    fn derivative(&self, t: f64, y: &[f64], dydt: &mut [f64]) -> Result<(), Self::Error>;
}
