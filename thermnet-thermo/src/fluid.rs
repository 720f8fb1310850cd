//! Fluid property providers.

#[cfg(feature = "coolprop")]
pub mod coolprop;

mod table;

pub use table::{FluidModel, FluidTable};

use uom::si::f64::{
    MassDensity, Pressure, SpecificHeatCapacity, ThermalConductivity, ThermodynamicTemperature,
};

use crate::PropertyError;

/// Trait for looking up fluid properties at a given temperature and pressure.
///
/// Fluids are identified by name (for example `"Water"` or `"Nitrogen"`), so a
/// network description can refer to any fluid the provider knows about.
/// Providers must be deterministic: the same inputs always yield the same value.
///
/// Thermnet calls each method once per fluid node, when the node is built.
pub trait FluidProperties {
    /// Returns the fluid's density.
    ///
    /// # Errors
    ///
    /// Returns a [`PropertyError`] if the fluid is unknown or the density
    /// cannot be evaluated at the given state.
    fn density(
        &self,
        fluid: &str,
        temperature: ThermodynamicTemperature,
        pressure: Pressure,
    ) -> Result<MassDensity, PropertyError>;

    /// Returns the fluid's thermal conductivity.
    ///
    /// # Errors
    ///
    /// Returns a [`PropertyError`] if the fluid is unknown or the conductivity
    /// cannot be evaluated at the given state.
    fn thermal_conductivity(
        &self,
        fluid: &str,
        temperature: ThermodynamicTemperature,
        pressure: Pressure,
    ) -> Result<ThermalConductivity, PropertyError>;

    /// Returns the fluid's specific heat capacity at constant pressure.
    ///
    /// # Errors
    ///
    /// Returns a [`PropertyError`] if the fluid is unknown or the specific heat
    /// cannot be evaluated at the given state.
    fn specific_heat(
        &self,
        fluid: &str,
        temperature: ThermodynamicTemperature,
        pressure: Pressure,
    ) -> Result<SpecificHeatCapacity, PropertyError>;
}

impl<P: FluidProperties + ?Sized> FluidProperties for &P {
    fn density(
        &self,
        fluid: &str,
        temperature: ThermodynamicTemperature,
        pressure: Pressure,
    ) -> Result<MassDensity, PropertyError> {
        (**self).density(fluid, temperature, pressure)
    }

    fn thermal_conductivity(
        &self,
        fluid: &str,
        temperature: ThermodynamicTemperature,
        pressure: Pressure,
    ) -> Result<ThermalConductivity, PropertyError> {
        (**self).thermal_conductivity(fluid, temperature, pressure)
    }

    fn specific_heat(
        &self,
        fluid: &str,
        temperature: ThermodynamicTemperature,
        pressure: Pressure,
    ) -> Result<SpecificHeatCapacity, PropertyError> {
        (**self).specific_heat(fluid, temperature, pressure)
    }
}
