use std::fmt;

use thermnet_core::constraint::{
    Constrained, ConstraintError, NonNegative, StrictlyPositive, UnitInterval,
};
use uom::si::{
    area::square_meter,
    f64::{Area, HeatTransfer, Length, ThermalConductivity},
    heat_transfer::watt_per_square_meter_kelvin,
    length::meter,
    thermal_conductivity::watt_per_meter_kelvin,
};

use crate::{NetworkError, Node, NodeId, heat_balance::STEFAN_BOLTZMANN};

/// Index of a path within a [`Network`](crate::Network).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathId(pub(crate) usize);

impl PathId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "path {}", self.0)
    }
}

/// Geometry and coefficients of a path between two nodes.
///
/// Positive heat flow runs from `from` to `to`. Without an explicit
/// emissivity the path radiates with the emissivity of its `from` node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathConfig {
    pub from: NodeId,
    pub to: NodeId,
    pub area: Area,
    pub length: Length,
    pub convection: HeatTransfer,
    pub emissivity: Option<f64>,
}

impl PathConfig {
    /// Creates a conduction-only path.
    #[must_use]
    pub fn new(from: NodeId, to: NodeId, area: Area, length: Length) -> Self {
        Self {
            from,
            to,
            area,
            length,
            convection: HeatTransfer::new::<watt_per_square_meter_kelvin>(0.0),
            emissivity: None,
        }
    }

    #[must_use]
    pub fn with_convection(mut self, coefficient: HeatTransfer) -> Self {
        self.convection = coefficient;
        self
    }

    #[must_use]
    pub fn with_emissivity(mut self, emissivity: f64) -> Self {
        self.emissivity = Some(emissivity);
        self
    }
}

/// A thermal link between two nodes.
///
/// The conductivity is the mean of the endpoint conductivities, fixed when
/// the path is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    from: NodeId,
    to: NodeId,
    area: Constrained<Area, NonNegative>,
    length: Constrained<Length, StrictlyPositive>,
    convection: Constrained<HeatTransfer, NonNegative>,
    conductivity: ThermalConductivity,
    emissivity: Constrained<f64, UnitInterval>,
}

impl Path {
    /// Builds the path with index `id` against the nodes it will join.
    pub(crate) fn new(id: PathId, config: PathConfig, nodes: &[Node]) -> Result<Self, NetworkError> {
        let endpoint = |node: NodeId| {
            nodes.get(node.0).ok_or(NetworkError::UnknownNode {
                index: node.0,
                count: nodes.len(),
            })
        };
        let from = endpoint(config.from)?;
        let to = endpoint(config.to)?;
        if config.from == config.to {
            return Err(NetworkError::SelfLoop(config.from.0));
        }

        let invalid = |parameter: &'static str, source: ConstraintError| {
            NetworkError::InvalidPath {
                path: id.0,
                parameter,
                source,
            }
        };
        let area = NonNegative::new(config.area).map_err(|e| invalid("area", e))?;
        let length = StrictlyPositive::new(config.length).map_err(|e| invalid("length", e))?;
        let convection =
            NonNegative::new(config.convection).map_err(|e| invalid("convection coefficient", e))?;
        let emissivity = UnitInterval::new(config.emissivity.unwrap_or(from.emissivity()))
            .map_err(|e| invalid("emissivity", e))?;

        Ok(Self {
            from: config.from,
            to: config.to,
            area,
            length,
            convection,
            conductivity: (from.thermal_conductivity() + to.thermal_conductivity()) / 2.0,
            emissivity,
        })
    }

    #[must_use]
    pub fn from(&self) -> NodeId {
        self.from
    }

    #[must_use]
    pub fn to(&self) -> NodeId {
        self.to
    }

    #[must_use]
    pub fn area(&self) -> Area {
        self.area.get()
    }

    #[must_use]
    pub fn length(&self) -> Length {
        self.length.get()
    }

    #[must_use]
    pub fn convection(&self) -> HeatTransfer {
        self.convection.get()
    }

    #[must_use]
    pub fn conductivity(&self) -> ThermalConductivity {
        self.conductivity
    }

    #[must_use]
    pub fn emissivity(&self) -> f64 {
        self.emissivity.get()
    }

    /// Returns the linear conductance `k·A/dx + h·A` in W/K.
    #[must_use]
    pub fn conductance(&self) -> f64 {
        let area = self.area.get().get::<square_meter>();
        let k = self.conductivity.get::<watt_per_meter_kelvin>();
        let dx = self.length.get().get::<meter>();
        let h = self.convection.get().get::<watt_per_square_meter_kelvin>();
        k * area / dx + h * area
    }

    /// Returns `σ·e·A` in W/K⁴ for the given emissivity.
    pub(crate) fn radiative_coefficient(&self, emissivity: f64) -> f64 {
        STEFAN_BOLTZMANN * emissivity * self.area.get().get::<square_meter>()
    }
}
