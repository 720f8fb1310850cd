//! Solid materials with tabulated properties.

use std::{fmt, str::FromStr};

use uom::si::{
    f64::{
        MassDensity, Pressure, SpecificHeatCapacity, ThermalConductivity, ThermodynamicTemperature,
    },
    mass_density::kilogram_per_cubic_meter,
    pressure::{gigapascal, megapascal},
    specific_heat_capacity::joule_per_kilogram_kelvin,
    thermal_conductivity::watt_per_meter_kelvin,
    thermodynamic_temperature::degree_celsius,
};

use crate::PropertyError;

/// A solid material known to thermnet.
///
/// The set is closed: names that do not parse to a variant are rejected with
/// [`PropertyError::UnknownMaterial`] instead of silently producing a node
/// without properties.
///
/// ```
/// use thermnet_thermo::Material;
///
/// let steel: Material = "SS316".parse().unwrap();
/// assert_eq!(steel, Material::Ss316);
/// assert!("Unobtainium".parse::<Material>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    /// Austenitic stainless steel, grade 316.
    Ss316,
    /// Aluminum alloy 6061.
    Al6061,
}

impl Material {
    /// All known materials.
    pub const ALL: [Material; 2] = [Material::Ss316, Material::Al6061];

    /// Returns the canonical name used in network descriptions.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ss316 => "SS316",
            Self::Al6061 => "Al6061",
        }
    }

    /// Returns the full property record for this material.
    #[must_use]
    pub fn record(self) -> MaterialRecord {
        match self {
            Self::Ss316 => MaterialRecord {
                density: MassDensity::new::<kilogram_per_cubic_meter>(8030.0),
                specific_heat: SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(500.0),
                thermal_conductivity: ThermalConductivity::new::<watt_per_meter_kelvin>(16.3),
                tensile_strength: Pressure::new::<megapascal>(580.0),
                yield_strength: Pressure::new::<megapascal>(290.0),
                bearing_strength: None,
                elastic_modulus: Pressure::new::<gigapascal>(193.0),
                shear_strength: None,
                poisson_ratio: None,
                charpy_impact: Some(105.0),
                izod_impact: Some(129.0),
                electrical_resistivity: 7.4e-7,
                magnetic_permeability: Some(1.008),
                thermal_expansion: Some(ThermalExpansion {
                    at_20c: 16.0,
                    at_250c: 16.2,
                    at_500c: 17.5,
                }),
                melting_point: ThermodynamicTemperature::new::<degree_celsius>(1385.0),
            },
            Self::Al6061 => MaterialRecord {
                density: MassDensity::new::<kilogram_per_cubic_meter>(2700.0),
                specific_heat: SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(896.0),
                thermal_conductivity: ThermalConductivity::new::<watt_per_meter_kelvin>(167.0),
                tensile_strength: Pressure::new::<megapascal>(310.0),
                yield_strength: Pressure::new::<megapascal>(276.0),
                bearing_strength: Some(Pressure::new::<megapascal>(607.0)),
                elastic_modulus: Pressure::new::<gigapascal>(68.9),
                shear_strength: Some(Pressure::new::<megapascal>(207.0)),
                poisson_ratio: Some(0.33),
                charpy_impact: None,
                izod_impact: None,
                electrical_resistivity: 3.99e-8,
                magnetic_permeability: None,
                thermal_expansion: None,
                melting_point: ThermodynamicTemperature::new::<degree_celsius>(617.0),
            },
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Names must match exactly, as in `"SS316"`.
impl FromStr for Material {
    type Err = PropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|material| material.name() == s)
            .ok_or_else(|| PropertyError::UnknownMaterial(s.to_owned()))
    }
}

/// Mean coefficients of linear thermal expansion, in µm/(m·K).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalExpansion {
    pub at_20c: f64,
    pub at_250c: f64,
    pub at_500c: f64,
}

/// Tabulated properties of a solid material.
///
/// Only the first three fields enter the heat balance. The rest are
/// informational and are `None` where no value is tabulated.
///
/// Impact energies are in joules and electrical resistivity is in Ω·m.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialRecord {
    pub density: MassDensity,
    pub specific_heat: SpecificHeatCapacity,
    pub thermal_conductivity: ThermalConductivity,
    pub tensile_strength: Pressure,
    pub yield_strength: Pressure,
    pub bearing_strength: Option<Pressure>,
    pub elastic_modulus: Pressure,
    pub shear_strength: Option<Pressure>,
    pub poisson_ratio: Option<f64>,
    pub charpy_impact: Option<f64>,
    pub izod_impact: Option<f64>,
    pub electrical_resistivity: f64,
    pub magnetic_permeability: Option<f64>,
    pub thermal_expansion: Option<ThermalExpansion>,
    pub melting_point: ThermodynamicTemperature,
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::thermodynamic_temperature::kelvin;

    #[test]
    fn names_round_trip() {
        for material in Material::ALL {
            assert_eq!(material.name().parse::<Material>(), Ok(material));
            assert_eq!(material.to_string(), material.name());
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(
            "ss316".parse::<Material>(),
            Err(PropertyError::UnknownMaterial("ss316".into()))
        );
        assert!("".parse::<Material>().is_err());
    }

    #[test]
    fn stainless_thermal_properties() {
        let record = Material::Ss316.record();

        assert_relative_eq!(record.density.get::<kilogram_per_cubic_meter>(), 8030.0);
        assert_relative_eq!(
            record.specific_heat.get::<joule_per_kilogram_kelvin>(),
            500.0
        );
        assert_relative_eq!(
            record.thermal_conductivity.get::<watt_per_meter_kelvin>(),
            16.3
        );
        assert_relative_eq!(record.melting_point.get::<kelvin>(), 1658.15);
    }

    #[test]
    fn aluminum_thermal_properties() {
        let record = Material::Al6061.record();

        assert_relative_eq!(record.density.get::<kilogram_per_cubic_meter>(), 2700.0);
        assert_relative_eq!(
            record.specific_heat.get::<joule_per_kilogram_kelvin>(),
            896.0
        );
        assert_relative_eq!(
            record.thermal_conductivity.get::<watt_per_meter_kelvin>(),
            167.0
        );
        assert_eq!(record.poisson_ratio, Some(0.33));
        assert!(record.thermal_expansion.is_none());
    }

    #[test]
    fn informational_fields_use_si_units() {
        let stainless = Material::Ss316.record();
        let aluminum = Material::Al6061.record();

        assert_relative_eq!(stainless.electrical_resistivity, 7.4e-7);
        assert_relative_eq!(aluminum.electrical_resistivity, 3.99e-8);
        assert!(stainless.shear_strength.is_none());
        assert_relative_eq!(
            aluminum
                .shear_strength
                .map_or(0.0, |strength| strength.get::<megapascal>()),
            207.0
        );
    }
}
