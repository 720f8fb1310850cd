use std::sync::{Mutex, MutexGuard};

use rfluids::{
    io::{FluidInputPair, FluidParam},
    native::AbstractState,
};
use uom::si::{
    f64::{
        MassDensity, Pressure, SpecificHeatCapacity, ThermalConductivity, ThermodynamicTemperature,
    },
    mass_density::kilogram_per_cubic_meter,
    pressure::pascal,
    specific_heat_capacity::joule_per_kilogram_kelvin,
    thermal_conductivity::watt_per_meter_kelvin,
    thermodynamic_temperature::kelvin,
};

use crate::PropertyError;

use super::FluidProperties;

/// A fluid property provider backed by `CoolProp`.
///
/// Fluid names are passed straight to CoolProp (for example `"Water"`,
/// `"Nitrogen"`, or `"R134a"`), using the configured backend (`"HEOS"` by default).
/// A fresh `AbstractState` is created per lookup, which is fine because
/// thermnet only queries properties while building nodes.
pub struct CoolProp {
    backend: String,
    lock: Mutex<()>,
}

impl Default for CoolProp {
    fn default() -> Self {
        Self::new("HEOS")
    }
}

impl CoolProp {
    /// Creates a provider using the given CoolProp backend.
    #[must_use]
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            lock: Mutex::new(()),
        }
    }

    /// Evaluates `param` for `fluid` at the given temperature and pressure.
    fn keyed_output(
        &self,
        fluid: &str,
        param: FluidParam,
        property: &'static str,
        temperature: ThermodynamicTemperature,
        pressure: Pressure,
    ) -> Result<f64, PropertyError> {
        let _guard = self.guard()?;

        let mut state = AbstractState::new(&self.backend, fluid)
            .map_err(|_| PropertyError::UnknownFluid(fluid.to_owned()))?;
        state
            .update(
                FluidInputPair::PT,
                pressure.get::<pascal>(),
                temperature.get::<kelvin>(),
            )
            .map_err(|err| PropertyError::InvalidInput(err.to_string()))?;

        let value = state
            .keyed_output(param)
            .map_err(|err| PropertyError::Backend(err.to_string()))?;

        if value.is_finite() {
            Ok(value)
        } else {
            Err(PropertyError::Undefined {
                property,
                context: Some(format!("CoolProp returned {value} for `{fluid}`")),
            })
        }
    }

    /// Serializes access to the CoolProp library.
    fn guard(&self) -> Result<MutexGuard<'_, ()>, PropertyError> {
        self.lock
            .lock()
            .map_err(|_| PropertyError::Backend("CoolProp lock poisoned".into()))
    }
}

impl FluidProperties for CoolProp {
    fn density(
        &self,
        fluid: &str,
        temperature: ThermodynamicTemperature,
        pressure: Pressure,
    ) -> Result<MassDensity, PropertyError> {
        let value = self.keyed_output(fluid, FluidParam::DMass, "density", temperature, pressure)?;
        Ok(MassDensity::new::<kilogram_per_cubic_meter>(value))
    }

    fn thermal_conductivity(
        &self,
        fluid: &str,
        temperature: ThermodynamicTemperature,
        pressure: Pressure,
    ) -> Result<ThermalConductivity, PropertyError> {
        let value = self.keyed_output(
            fluid,
            FluidParam::Conductivity,
            "thermal conductivity",
            temperature,
            pressure,
        )?;
        Ok(ThermalConductivity::new::<watt_per_meter_kelvin>(value))
    }

    fn specific_heat(
        &self,
        fluid: &str,
        temperature: ThermodynamicTemperature,
        pressure: Pressure,
    ) -> Result<SpecificHeatCapacity, PropertyError> {
        let value = self.keyed_output(
            fluid,
            FluidParam::CpMass,
            "specific heat",
            temperature,
            pressure,
        )?;
        Ok(SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(value))
    }
}
