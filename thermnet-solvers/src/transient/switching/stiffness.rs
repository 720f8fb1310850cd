/// Flags stiffness from the explicit formula's `h·λ` estimates.
///
/// The estimate exceeds [`Self::BOUND`] only when the step size is limited by
/// stability rather than accuracy. Fifteen such accepted steps without six
/// clean ones in a row count as stiff.
#[derive(Debug, Default)]
pub(super) struct StiffnessDetector {
    stiff_steps: usize,
    clean_steps: usize,
}

impl StiffnessDetector {
    const BOUND: f64 = 3.25;
    const STIFF_STEPS: usize = 15;
    const RESET_STEPS: usize = 6;

    /// Records an accepted step and returns `true` when the problem looks stiff.
    pub(super) fn observe(&mut self, h_lambda: f64) -> bool {
        if h_lambda > Self::BOUND {
            self.clean_steps = 0;
            self.stiff_steps += 1;
            if self.stiff_steps >= Self::STIFF_STEPS {
                *self = Self::default();
                return true;
            }
        } else {
            self.clean_steps += 1;
            if self.clean_steps == Self::RESET_STEPS {
                self.stiff_steps = 0;
            }
        }
        false
    }
}

/// Flags when the implicit formula's steps would be stable for the explicit one.
///
/// Uses `h·‖J‖∞` as a bound on `h·|λ|`; twenty consecutive accepted steps
/// under [`Self::BOUND`] count as non-stiff.
#[derive(Debug, Default)]
pub(super) struct NonStiffnessDetector {
    clean_steps: usize,
}

impl NonStiffnessDetector {
    const BOUND: f64 = 2.0;
    const CLEAN_STEPS: usize = 20;

    /// Records an accepted step and returns `true` when the problem looks non-stiff.
    pub(super) fn observe(&mut self, h_norm: f64) -> bool {
        if h_norm < Self::BOUND {
            self.clean_steps += 1;
            if self.clean_steps >= Self::CLEAN_STEPS {
                *self = Self::default();
                return true;
            }
        } else {
            self.clean_steps = 0;
        }
        false
    }
}
