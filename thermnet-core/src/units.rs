//! Unit helpers for absolute temperatures.

use uom::si::{f64::ThermodynamicTemperature, thermodynamic_temperature::kelvin};

/// Extension methods for `ThermodynamicTemperature`.
pub trait TemperatureOps {
    /// Returns the absolute temperature in kelvin.
    ///
    /// Radiative exchange and the network's state vector work on absolute
    /// temperatures, so this is the canonical conversion used by thermnet.
    fn kelvin(self) -> f64;

    /// Builds an absolute temperature from a value in kelvin.
    fn from_kelvin(value: f64) -> Self;
}

impl TemperatureOps for ThermodynamicTemperature {
    fn kelvin(self) -> f64 {
        self.get::<kelvin>()
    }

    fn from_kelvin(value: f64) -> Self {
        ThermodynamicTemperature::new::<kelvin>(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::thermodynamic_temperature::{degree_celsius, degree_fahrenheit};

    #[test]
    fn kelvin_from_other_scales() {
        let t = ThermodynamicTemperature::new::<degree_celsius>(26.85);
        assert_relative_eq!(t.kelvin(), 300.0, epsilon = 1e-9);

        let t = ThermodynamicTemperature::new::<degree_fahrenheit>(-459.67);
        assert_relative_eq!(t.kelvin(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn kelvin_values_are_unchanged() {
        for value in [0.0, 273.15, 400.0, 1.0e4] {
            assert_eq!(ThermodynamicTemperature::from_kelvin(value).kelvin(), value);
        }
    }
}
