use std::{fmt, str::FromStr};

use thermnet_core::{
    constraint::{Constrained, ConstraintError, NonNegative, StrictlyPositive, UnitInterval},
    units::TemperatureOps,
};
use thermnet_thermo::{FluidProperties, Material, PropertyError};
use uom::si::{
    f64::{
        HeatCapacity, MassDensity, Power, Pressure, SpecificHeatCapacity, ThermalConductivity,
        ThermodynamicTemperature, Volume,
    },
    mass_density::kilogram_per_cubic_meter,
    power::watt,
    pressure::pascal,
    specific_heat_capacity::joule_per_kilogram_kelvin,
    thermal_conductivity::watt_per_meter_kelvin,
    volume::cubic_meter,
};

use crate::NetworkError;

/// Index of a node within a [`Network`](crate::Network).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the position of the node in the network's node order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}", self.0)
    }
}

/// The two kinds of medium a node can hold.
///
/// Parses case-insensitively from `"FLUID"` and `"SOLID"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediumKind {
    Fluid,
    Solid,
}

impl FromStr for MediumKind {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("fluid") {
            Ok(Self::Fluid)
        } else if s.eq_ignore_ascii_case("solid") {
            Ok(Self::Solid)
        } else {
            Err(NetworkError::UnknownMediumKind(s.to_owned()))
        }
    }
}

impl fmt::Display for MediumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fluid => "FLUID",
            Self::Solid => "SOLID",
        })
    }
}

/// What a node is made of.
#[derive(Debug, Clone, PartialEq)]
pub enum Medium {
    /// A fluid resolved through a [`FluidProperties`] provider at the node's
    /// temperature and this pressure.
    Fluid { name: String, pressure: Pressure },

    /// A solid from the material table.
    Solid(Material),
}

impl Medium {
    /// Resolves a medium from its kind and identifier.
    ///
    /// Solids look the identifier up in the closed [`Material`] table, so an
    /// unknown material fails here rather than during simulation.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::UnknownMaterial`] for an unknown solid, and
    /// [`PropertyError::InvalidInput`] for a fluid without a pressure.
    pub fn resolve(
        kind: MediumKind,
        identifier: &str,
        pressure: Option<Pressure>,
    ) -> Result<Self, PropertyError> {
        match kind {
            MediumKind::Solid => Ok(Self::Solid(identifier.parse()?)),
            MediumKind::Fluid => {
                let pressure = pressure.ok_or_else(|| {
                    PropertyError::InvalidInput(format!(
                        "fluid `{identifier}` needs an ambient pressure"
                    ))
                })?;
                Ok(Self::Fluid {
                    name: identifier.to_owned(),
                    pressure,
                })
            }
        }
    }

    #[must_use]
    pub fn kind(&self) -> MediumKind {
        match self {
            Self::Fluid { .. } => MediumKind::Fluid,
            Self::Solid(_) => MediumKind::Solid,
        }
    }
}

impl fmt::Display for Medium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fluid { name, pressure } => {
                write!(f, "{name} at {} Pa", pressure.get::<pascal>())
            }
            Self::Solid(material) => write!(f, "{material}"),
        }
    }
}

/// Everything needed to build a [`Node`].
///
/// Created with [`NodeConfig::solid`] or [`NodeConfig::fluid`] and adjusted
/// with the `with_*` methods. Unless changed, a node has a volume of
/// 0.01 m³, no heat generation, zero emissivity, and is free to change
/// temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeConfig {
    pub name: Option<String>,
    pub medium: Medium,
    pub temperature: ThermodynamicTemperature,
    pub volume: Volume,
    pub heat_generation: Power,
    pub emissivity: f64,
    pub isothermal: bool,
}

impl NodeConfig {
    /// Creates a config for a node with the given medium and initial temperature.
    #[must_use]
    pub fn new(medium: Medium, temperature: ThermodynamicTemperature) -> Self {
        Self {
            name: None,
            medium,
            temperature,
            volume: Volume::new::<cubic_meter>(0.01),
            heat_generation: Power::new::<watt>(0.0),
            emissivity: 0.0,
            isothermal: false,
        }
    }

    /// Creates a config for a solid node.
    #[must_use]
    pub fn solid(material: Material, temperature: ThermodynamicTemperature) -> Self {
        Self::new(Medium::Solid(material), temperature)
    }

    /// Creates a config for a fluid node held at `pressure`.
    #[must_use]
    pub fn fluid(
        name: impl Into<String>,
        pressure: Pressure,
        temperature: ThermodynamicTemperature,
    ) -> Self {
        Self::new(
            Medium::Fluid {
                name: name.into(),
                pressure,
            },
            temperature,
        )
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_volume(mut self, volume: Volume) -> Self {
        self.volume = volume;
        self
    }

    #[must_use]
    pub fn with_heat_generation(mut self, heat_generation: Power) -> Self {
        self.heat_generation = heat_generation;
        self
    }

    #[must_use]
    pub fn with_emissivity(mut self, emissivity: f64) -> Self {
        self.emissivity = emissivity;
        self
    }

    /// Holds the node at its initial temperature for the whole run.
    #[must_use]
    pub fn isothermal(mut self) -> Self {
        self.isothermal = true;
        self
    }
}

/// A lumped thermal mass with a single temperature.
///
/// Density, conductivity, and specific heat are looked up once, at the
/// initial temperature, and never change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: Option<String>,
    medium: Medium,
    temperature: ThermodynamicTemperature,
    density: MassDensity,
    thermal_conductivity: ThermalConductivity,
    specific_heat: SpecificHeatCapacity,
    volume: Constrained<Volume, NonNegative>,
    heat_generation: Power,
    emissivity: Constrained<f64, UnitInterval>,
    isothermal: bool,
}

impl Node {
    /// Builds a node, resolving its properties through `fluids` if it holds a fluid.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::UnresolvedMedium`] if the medium's properties cannot
    ///   be found or are not finite.
    /// - [`NetworkError::InvalidNode`] if the temperature is not positive, the
    ///   volume is negative, the emissivity lies outside `[0, 1]`, or the heat
    ///   generation is not finite.
    /// - [`NetworkError::SingularThermalMass`] if a non-isothermal node has a
    ///   zero volume, density, or specific heat.
    pub fn new<P: FluidProperties + ?Sized>(
        config: NodeConfig,
        fluids: &P,
    ) -> Result<Self, NetworkError> {
        let label = config
            .name
            .clone()
            .unwrap_or_else(|| config.medium.to_string());
        let invalid = |parameter: &'static str, source: ConstraintError| {
            NetworkError::InvalidNode {
                node: label.clone(),
                parameter,
                source,
            }
        };

        StrictlyPositive::new(config.temperature.kelvin())
            .map_err(|e| invalid("temperature", e))?;
        let volume = NonNegative::new(config.volume).map_err(|e| invalid("volume", e))?;
        let emissivity =
            UnitInterval::new(config.emissivity).map_err(|e| invalid("emissivity", e))?;
        if !config.heat_generation.get::<watt>().is_finite() {
            return Err(invalid("heat generation", ConstraintError::NotANumber));
        }

        let (density, thermal_conductivity, specific_heat) =
            snapshot(&config.medium, config.temperature, fluids).map_err(|source| {
                NetworkError::UnresolvedMedium {
                    node: label.clone(),
                    source,
                }
            })?;
        NonNegative::new(thermal_conductivity.get::<watt_per_meter_kelvin>())
            .map_err(|e| invalid("thermal conductivity", e))?;

        if !config.isothermal {
            let singular = |parameter: &'static str| NetworkError::SingularThermalMass {
                node: label.clone(),
                parameter,
            };
            if !(density.get::<kilogram_per_cubic_meter>() > 0.0) {
                return Err(singular("density"));
            }
            if !(specific_heat.get::<joule_per_kilogram_kelvin>() > 0.0) {
                return Err(singular("specific heat"));
            }
            if !(config.volume.get::<cubic_meter>() > 0.0) {
                return Err(singular("volume"));
            }
        }

        Ok(Self {
            name: config.name,
            medium: config.medium,
            temperature: config.temperature,
            density,
            thermal_conductivity,
            specific_heat,
            volume,
            heat_generation: config.heat_generation,
            emissivity,
            isothermal: config.isothermal,
        })
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn medium(&self) -> &Medium {
        &self.medium
    }

    #[must_use]
    pub fn temperature(&self) -> ThermodynamicTemperature {
        self.temperature
    }

    #[must_use]
    pub fn density(&self) -> MassDensity {
        self.density
    }

    #[must_use]
    pub fn thermal_conductivity(&self) -> ThermalConductivity {
        self.thermal_conductivity
    }

    #[must_use]
    pub fn specific_heat(&self) -> SpecificHeatCapacity {
        self.specific_heat
    }

    #[must_use]
    pub fn volume(&self) -> Volume {
        self.volume.get()
    }

    #[must_use]
    pub fn heat_generation(&self) -> Power {
        self.heat_generation
    }

    #[must_use]
    pub fn emissivity(&self) -> f64 {
        self.emissivity.get()
    }

    #[must_use]
    pub fn is_isothermal(&self) -> bool {
        self.isothermal
    }

    /// Returns `ρ·V·c`, the heat needed to raise the node by one kelvin.
    #[must_use]
    pub fn thermal_mass(&self) -> HeatCapacity {
        self.density * self.volume.get() * self.specific_heat
    }

    /// Sets the node's temperature, keeping its property snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidNode`] if the temperature is not positive.
    pub fn set_temperature(
        &mut self,
        temperature: ThermodynamicTemperature,
    ) -> Result<(), NetworkError> {
        StrictlyPositive::new(temperature.kelvin()).map_err(|source| {
            NetworkError::InvalidNode {
                node: self.label(),
                parameter: "temperature",
                source,
            }
        })?;
        self.temperature = temperature;
        Ok(())
    }

    /// Name used in diagnostics: the node's name, or its medium if unnamed.
    pub(crate) fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.medium.to_string())
    }
}

fn snapshot<P: FluidProperties + ?Sized>(
    medium: &Medium,
    temperature: ThermodynamicTemperature,
    fluids: &P,
) -> Result<(MassDensity, ThermalConductivity, SpecificHeatCapacity), PropertyError> {
    let (density, conductivity, specific_heat) = match medium {
        Medium::Fluid { name, pressure } => (
            fluids.density(name, temperature, *pressure)?,
            fluids.thermal_conductivity(name, temperature, *pressure)?,
            fluids.specific_heat(name, temperature, *pressure)?,
        ),
        Medium::Solid(material) => {
            let record = material.record();
            (
                record.density,
                record.thermal_conductivity,
                record.specific_heat,
            )
        }
    };

    let undefined = |property: &'static str| PropertyError::Undefined {
        property,
        context: Some(medium.to_string()),
    };
    if !density.get::<kilogram_per_cubic_meter>().is_finite() {
        return Err(undefined("density"));
    }
    if !conductivity.get::<watt_per_meter_kelvin>().is_finite() {
        return Err(undefined("thermal conductivity"));
    }
    if !specific_heat.get::<joule_per_kilogram_kelvin>().is_finite() {
        return Err(undefined("specific heat"));
    }

    Ok((density, conductivity, specific_heat))
}
