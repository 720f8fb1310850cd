use thiserror::Error;

/// Which formula family the solver may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    /// Start explicit and switch to BDF when stiffness is detected (and back).
    #[default]
    Auto,

    /// Dormand–Prince 5(4) only.
    NonStiff,

    /// BDF only.
    Stiff,
}

/// Configuration for the switching solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    rtol: f64,
    atol: f64,
    method: Method,
    max_steps: usize,
    initial_step: Option<f64>,
    max_step: Option<f64>,
    max_order: usize,
}

/// Errors that can occur when validating a switching solver config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rtol must be finite and at least 100 machine epsilons")]
    RelTol,

    #[error("atol must be finite and non-negative")]
    AbsTol,

    #[error("max_steps must be at least one")]
    MaxSteps,

    #[error("initial_step must be finite and positive")]
    InitialStep,

    #[error("max_step must be positive")]
    MaxStep,

    #[error("max_order must be between 1 and {}", Config::MAX_ORDER)]
    MaxOrder,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(1e-3, 1e-7).unwrap()
    }
}

impl Config {
    /// Highest supported BDF order.
    pub const MAX_ORDER: usize = 5;

    /// Creates a config with the given tolerances and defaults for the rest.
    ///
    /// # Errors
    ///
    /// Returns an error if `rtol` is non-finite or too small to be meaningful
    /// in double precision, or if `atol` is negative or non-finite.
    pub fn new(rtol: f64, atol: f64) -> Result<Self, ConfigError> {
        if !rtol.is_finite() || rtol < 100.0 * f64::EPSILON {
            return Err(ConfigError::RelTol);
        }
        if !atol.is_finite() || atol < 0.0 {
            return Err(ConfigError::AbsTol);
        }

        Ok(Self {
            rtol,
            atol,
            method: Method::Auto,
            max_steps: 100_000,
            initial_step: None,
            max_step: None,
            max_order: Self::MAX_ORDER,
        })
    }

    /// Returns the config with the given method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Returns the config with the given budget of step attempts.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_steps` is zero.
    pub fn with_max_steps(mut self, max_steps: usize) -> Result<Self, ConfigError> {
        if max_steps == 0 {
            return Err(ConfigError::MaxSteps);
        }
        self.max_steps = max_steps;
        Ok(self)
    }

    /// Returns the config with a fixed first step size.
    ///
    /// # Errors
    ///
    /// Returns an error if `h` is not finite and positive.
    pub fn with_initial_step(mut self, h: f64) -> Result<Self, ConfigError> {
        if !h.is_finite() || h <= 0.0 {
            return Err(ConfigError::InitialStep);
        }
        self.initial_step = Some(h);
        Ok(self)
    }

    /// Returns the config with an upper bound on the step size.
    ///
    /// `f64::INFINITY` is accepted and means no bound.
    ///
    /// # Errors
    ///
    /// Returns an error if `h` is NaN or not positive.
    pub fn with_max_step(mut self, h: f64) -> Result<Self, ConfigError> {
        if h.is_nan() || h <= 0.0 {
            return Err(ConfigError::MaxStep);
        }
        self.max_step = Some(h);
        Ok(self)
    }

    /// Returns the config with the highest BDF order the solver may use.
    ///
    /// # Errors
    ///
    /// Returns an error if `order` is outside `1..=5`.
    pub fn with_max_order(mut self, order: usize) -> Result<Self, ConfigError> {
        if !(1..=Self::MAX_ORDER).contains(&order) {
            return Err(ConfigError::MaxOrder);
        }
        self.max_order = order;
        Ok(self)
    }

    /// Returns the relative tolerance.
    #[must_use]
    pub fn rtol(&self) -> f64 {
        self.rtol
    }

    /// Returns the absolute tolerance.
    #[must_use]
    pub fn atol(&self) -> f64 {
        self.atol
    }

    /// Returns the formula selection.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the budget of step attempts, accepted and rejected.
    #[must_use]
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Returns the configured first step, if any.
    #[must_use]
    pub fn initial_step(&self) -> Option<f64> {
        self.initial_step
    }

    /// Returns the step size bound, if any.
    #[must_use]
    pub fn max_step(&self) -> Option<f64> {
        self.max_step
    }

    /// Returns the highest BDF order.
    #[must_use]
    pub fn max_order(&self) -> usize {
        self.max_order
    }
}
