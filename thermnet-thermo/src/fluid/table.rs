use std::collections::HashMap;

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

/// Property model for a single fluid in a [`FluidTable`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FluidModel {
    /// Constant density, conductivity, and specific heat.
    ///
    /// Suitable for liquids where pressure and temperature effects on the
    /// properties can be ignored.
    Incompressible {
        density: MassDensity,
        conductivity: ThermalConductivity,
        specific_heat: SpecificHeatCapacity,
    },

    /// Ideal gas with constant conductivity and specific heat.
    ///
    /// Density follows `ρ = P / (R·T)`.
    /// The specific gas constant `R` shares the dimension of a specific heat capacity.
    IdealGas {
        gas_constant: SpecificHeatCapacity,
        conductivity: ThermalConductivity,
        specific_heat: SpecificHeatCapacity,
    },
}

impl FluidModel {
    fn density(
        &self,
        temperature: ThermodynamicTemperature,
        pressure: Pressure,
    ) -> Result<MassDensity, PropertyError> {
        match *self {
            Self::Incompressible { density, .. } => Ok(density),
            Self::IdealGas { gas_constant, .. } => {
                let t = temperature.get::<kelvin>();
                let p = pressure.get::<pascal>();
                if !(t > 0.0) {
                    return Err(PropertyError::InvalidInput(format!(
                        "ideal gas density needs a positive absolute temperature, got {t} K"
                    )));
                }
                if !(p > 0.0) {
                    return Err(PropertyError::InvalidInput(format!(
                        "ideal gas density needs a positive pressure, got {p} Pa"
                    )));
                }
                let r = gas_constant.get::<joule_per_kilogram_kelvin>();
                Ok(MassDensity::new::<kilogram_per_cubic_meter>(p / (r * t)))
            }
        }
    }

    fn conductivity(&self) -> ThermalConductivity {
        match *self {
            Self::Incompressible { conductivity, .. } | Self::IdealGas { conductivity, .. } => {
                conductivity
            }
        }
    }

    fn specific_heat(&self) -> SpecificHeatCapacity {
        match *self {
            Self::Incompressible { specific_heat, .. } | Self::IdealGas { specific_heat, .. } => {
                specific_heat
            }
        }
    }
}

/// An in-process fluid property provider keyed by fluid name.
///
/// Each entry is a [`FluidModel`]. Lookups of names that are not in the table
/// fail with [`PropertyError::UnknownFluid`] rather than falling back to a default.
///
/// # Example
///
/// ```
/// use thermnet_thermo::{FluidProperties, FluidTable};
/// use uom::si::{
///     f64::{Pressure, ThermodynamicTemperature},
///     mass_density::kilogram_per_cubic_meter,
///     pressure::atmosphere,
///     thermodynamic_temperature::kelvin,
/// };
///
/// let table = FluidTable::standard();
/// let rho = table
///     .density(
///         "Air",
///         ThermodynamicTemperature::new::<kelvin>(300.0),
///         Pressure::new::<atmosphere>(1.0),
///     )
///     .unwrap();
/// assert!((rho.get::<kilogram_per_cubic_meter>() - 1.1766).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FluidTable {
    fluids: HashMap<String, FluidModel>,
}

impl FluidTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table with water, air, and nitrogen near room conditions.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with_fluid(
                "Water",
                FluidModel::Incompressible {
                    density: MassDensity::new::<kilogram_per_cubic_meter>(997.047),
                    conductivity: ThermalConductivity::new::<watt_per_meter_kelvin>(0.6065),
                    specific_heat: SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(4184.0),
                },
            )
            .with_fluid(
                "Air",
                FluidModel::IdealGas {
                    gas_constant: SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(287.053),
                    conductivity: ThermalConductivity::new::<watt_per_meter_kelvin>(0.0262),
                    specific_heat: SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(1005.0),
                },
            )
            .with_fluid(
                "Nitrogen",
                FluidModel::IdealGas {
                    gas_constant: SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(296.8),
                    conductivity: ThermalConductivity::new::<watt_per_meter_kelvin>(0.0259),
                    specific_heat: SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(1040.0),
                },
            )
    }

    /// Returns the table with `model` registered under `name`.
    ///
    /// Replaces any existing entry with the same name.
    #[must_use]
    pub fn with_fluid(mut self, name: impl Into<String>, model: FluidModel) -> Self {
        self.insert(name, model);
        self
    }

    /// Registers `model` under `name`, returning the model it replaced, if any.
    pub fn insert(&mut self, name: impl Into<String>, model: FluidModel) -> Option<FluidModel> {
        self.fluids.insert(name.into(), model)
    }

    /// Returns the model registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::UnknownFluid`] if no such fluid is registered.
    pub fn get(&self, name: &str) -> Result<&FluidModel, PropertyError> {
        self.fluids
            .get(name)
            .ok_or_else(|| PropertyError::UnknownFluid(name.to_owned()))
    }
}

impl FluidProperties for FluidTable {
    fn density(
        &self,
        fluid: &str,
        temperature: ThermodynamicTemperature,
        pressure: Pressure,
    ) -> Result<MassDensity, PropertyError> {
        self.get(fluid)?.density(temperature, pressure)
    }

    fn thermal_conductivity(
        &self,
        fluid: &str,
        _temperature: ThermodynamicTemperature,
        _pressure: Pressure,
    ) -> Result<ThermalConductivity, PropertyError> {
        Ok(self.get(fluid)?.conductivity())
    }

    fn specific_heat(
        &self,
        fluid: &str,
        _temperature: ThermodynamicTemperature,
        _pressure: Pressure,
    ) -> Result<SpecificHeatCapacity, PropertyError> {
        Ok(self.get(fluid)?.specific_heat())
    }
}
