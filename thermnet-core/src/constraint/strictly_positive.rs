use std::cmp::Ordering;

use num_traits::Zero;

use crate::constraint::{Constrained, Constraint, ConstraintError};

/// Marker type enforcing that a value is strictly greater than zero.
///
/// Works with any `T: PartialOrd + Zero`, which includes `f64` and the `uom`
/// quantities used throughout thermnet (volumes, densities, lengths).
///
/// # Examples
///
/// ```
/// use thermnet_core::constraint::StrictlyPositive;
/// use uom::si::{f64::Volume, volume::cubic_meter};
///
/// assert!(StrictlyPositive::new(Volume::new::<cubic_meter>(0.01)).is_ok());
/// assert!(StrictlyPositive::new(Volume::new::<cubic_meter>(0.0)).is_err());
/// assert!(StrictlyPositive::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StrictlyPositive;

impl StrictlyPositive {
    /// Constructs `Constrained<T, StrictlyPositive>` if the value is greater than zero.
    ///
    /// # Errors
    ///
    /// - [`ConstraintError::Negative`] if the value is below zero.
    /// - [`ConstraintError::Zero`] if the value equals zero.
    /// - [`ConstraintError::NotANumber`] if comparison is undefined (e.g., NaN).
    pub fn new<T: PartialOrd + Zero>(
        value: T,
    ) -> Result<Constrained<T, StrictlyPositive>, ConstraintError> {
        Constrained::<T, StrictlyPositive>::new(value)
    }
}

impl<T: PartialOrd + Zero> Constraint<T> for StrictlyPositive {
    fn check(value: &T) -> Result<(), ConstraintError> {
        match value.partial_cmp(&T::zero()) {
            Some(Ordering::Greater) => Ok(()),
            Some(Ordering::Equal) => Err(ConstraintError::Zero),
            Some(Ordering::Less) => Err(ConstraintError::Negative),
            None => Err(ConstraintError::NotANumber),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use uom::si::{f64::Length, length::meter};

    #[test]
    fn positive_values_pass() {
        assert!(StrictlyPositive::new(1e-12).is_ok());
        assert!(StrictlyPositive::new(Length::new::<meter>(1.0)).is_ok());
    }

    #[test]
    fn zero_negative_and_nan_fail() {
        assert_eq!(StrictlyPositive::new(0.0), Err(ConstraintError::Zero));
        assert_eq!(StrictlyPositive::new(-3.0), Err(ConstraintError::Negative));
        assert_eq!(
            StrictlyPositive::new(f64::NAN),
            Err(ConstraintError::NotANumber)
        );
        assert_eq!(
            StrictlyPositive::new(Length::new::<meter>(-0.5)),
            Err(ConstraintError::Negative)
        );
    }
}
