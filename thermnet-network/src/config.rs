//! Network descriptions in TOML.
//!
//! A file lists nodes and paths in SI units, with optional solver and time
//! settings:
//!
//! ```toml
//! [solver]
//! rtol = 1e-6
//! method = "auto"        # "auto", "non-stiff", or "stiff"
//! branch = "auto"        # "auto", "two-node", or "general"
//!
//! [time]
//! start = 0.0
//! end = 10000.0
//! points = 11            # or an explicit `eval = [...]`
//!
//! [[node]]
//! name = "hot"
//! kind = "SOLID"
//! medium = "SS316"
//! temperature = 400.0
//!
//! [[node]]
//! name = "air"
//! kind = "FLUID"
//! medium = "Air"
//! pressure = 101325.0
//! temperature = 300.0
//! isothermal = true
//!
//! [[path]]
//! from = "hot"
//! to = "air"
//! area = 0.01
//! length = 1.0
//! convection = 10.0
//! ```
//!
//! Node fields `volume` (m³, default 0.01), `heat-generation` (W),
//! `emissivity`, and `isothermal` are optional, as are the path fields
//! `convection` (W/m²·K) and `emissivity`.

use std::{
    collections::HashMap,
    fs,
    path::{Path as FsPath, PathBuf},
    str::FromStr,
};

use log::debug;
use serde::{Deserialize, Deserializer};
use thermnet_solvers::transient::switching::{self, ConfigError, Method};
use thermnet_thermo::FluidProperties;
use thiserror::Error;
use uom::si::{
    area::square_meter,
    f64::{
        Area, HeatTransfer, Length, Power, Pressure, ThermodynamicTemperature, Time, Volume,
    },
    heat_transfer::watt_per_square_meter_kelvin,
    length::meter,
    power::watt,
    pressure::pascal,
    thermodynamic_temperature::kelvin,
    time::second,
    volume::cubic_meter,
};

use crate::{
    BranchSelection, Medium, MediumKind, Network, NetworkError, NodeConfig, NodeId, PathConfig,
    Simulation, SimulationConfig, simulate,
};

/// Errors raised while loading a network description.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid network description")]
    Parse(#[from] toml::de::Error),

    #[error("node name `{0}` is used more than once")]
    DuplicateNode(String),

    #[error("path {path} references unknown node `{name}`")]
    UnknownNode { path: usize, name: String },

    #[error("invalid [time] section: {0}")]
    Time(String),

    #[error("invalid [solver] section")]
    Solver(#[from] ConfigError),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// A parsed, not yet resolved, network description.
///
/// Parse with [`str::parse`] or [`NetworkConfig::from_file`], then resolve
/// media and node names with [`NetworkConfig::build`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    #[serde(default)]
    solver: SolverSection,
    time: Option<TimeSection>,
    #[serde(default, rename = "node")]
    nodes: Vec<NodeSection>,
    #[serde(default, rename = "path")]
    paths: Vec<PathSection>,
}

/// A network built from a description, ready to simulate.
#[derive(Debug, Clone)]
pub struct LoadedNetwork {
    pub network: Network,
    pub config: SimulationConfig,

    /// The `[time]` span, if the description has one.
    pub span: Option<[Time; 2]>,

    pub t_eval: Vec<Time>,
}

impl LoadedNetwork {
    /// Simulates the network over the description's span and output times.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Time`] if the description has no `[time]` section,
    /// and any error from [`simulate`].
    pub fn simulate(&self) -> Result<Simulation, LoadError> {
        let span = self
            .span
            .ok_or_else(|| LoadError::Time("no time span given".into()))?;
        Ok(simulate(&self.network, span, &self.t_eval, &self.config)?)
    }
}

impl FromStr for NetworkConfig {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

impl NetworkConfig {
    /// Reads and parses a description from a file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the file cannot be read and
    /// [`LoadError::Parse`] if it is not a valid description.
    pub fn from_file(path: impl AsRef<FsPath>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        text.parse()
    }

    /// Resolves media and node names and builds the network.
    ///
    /// # Errors
    ///
    /// Fails on unknown medium kinds, materials, fluids, or node names, on
    /// duplicate node names, and on invalid node, path, solver, or time values.
    pub fn build<P: FluidProperties + ?Sized>(
        &self,
        fluids: &P,
    ) -> Result<LoadedNetwork, LoadError> {
        let mut network = Network::new();
        let mut ids: HashMap<&str, NodeId> = HashMap::new();

        for node in &self.nodes {
            if ids.contains_key(node.name.as_str()) {
                return Err(LoadError::DuplicateNode(node.name.clone()));
            }
            let id = network.add_node(node.config()?, fluids)?;
            ids.insert(&node.name, id);
        }

        for (index, path) in self.paths.iter().enumerate() {
            let endpoint = |name: &str| {
                ids.get(name)
                    .copied()
                    .ok_or_else(|| LoadError::UnknownNode {
                        path: index,
                        name: name.to_owned(),
                    })
            };
            let mut config =
                PathConfig::new(endpoint(&path.from)?, endpoint(&path.to)?, path.area, path.length)
                    .with_convection(path.convection);
            config.emissivity = path.emissivity;
            network.add_path(config)?;
        }

        let (span, t_eval) = match &self.time {
            Some(time) => {
                let (span, t_eval) = time.resolve()?;
                (Some(span), t_eval)
            }
            None => (None, Vec::new()),
        };

        debug!(
            "loaded network description: {} nodes, {} paths",
            network.nodes().len(),
            network.paths().len()
        );

        Ok(LoadedNetwork {
            network,
            config: self.solver.simulation_config()?,
            span,
            t_eval,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum MethodName {
    Auto,
    NonStiff,
    Stiff,
}

impl From<MethodName> for Method {
    fn from(name: MethodName) -> Self {
        match name {
            MethodName::Auto => Method::Auto,
            MethodName::NonStiff => Method::NonStiff,
            MethodName::Stiff => Method::Stiff,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum BranchName {
    Auto,
    TwoNode,
    General,
}

impl From<BranchName> for BranchSelection {
    fn from(name: BranchName) -> Self {
        match name {
            BranchName::Auto => BranchSelection::Auto,
            BranchName::TwoNode => BranchSelection::TwoNode,
            BranchName::General => BranchSelection::General,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
struct SolverSection {
    rtol: f64,
    atol: f64,
    method: MethodName,
    max_steps: usize,
    initial_step: Option<f64>,
    max_step: Option<f64>,
    max_order: usize,
    branch: BranchName,
}

impl Default for SolverSection {
    fn default() -> Self {
        let solver = switching::Config::default();
        Self {
            rtol: solver.rtol(),
            atol: solver.atol(),
            method: MethodName::Auto,
            max_steps: solver.max_steps(),
            initial_step: None,
            max_step: None,
            max_order: solver.max_order(),
            branch: BranchName::Auto,
        }
    }
}

impl SolverSection {
    fn simulation_config(&self) -> Result<SimulationConfig, ConfigError> {
        let mut solver = switching::Config::new(self.rtol, self.atol)?
            .with_method(self.method.into())
            .with_max_steps(self.max_steps)?
            .with_max_order(self.max_order)?;
        if let Some(h) = self.initial_step {
            solver = solver.with_initial_step(h)?;
        }
        if let Some(h) = self.max_step {
            solver = solver.with_max_step(h)?;
        }
        Ok(SimulationConfig::new(solver).with_branch(self.branch.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
struct TimeSection {
    #[serde(default = "zero_time", deserialize_with = "seconds")]
    start: Time,
    #[serde(deserialize_with = "seconds")]
    end: Time,
    eval: Option<Vec<f64>>,
    points: Option<usize>,
}

impl TimeSection {
    #[allow(clippy::cast_precision_loss)]
    fn resolve(&self) -> Result<([Time; 2], Vec<Time>), LoadError> {
        let span = [self.start, self.end];
        let t_eval = match (&self.eval, self.points) {
            (Some(_), Some(_)) => {
                return Err(LoadError::Time("give either `eval` or `points`, not both".into()));
            }
            (Some(eval), None) => eval.iter().map(|&t| Time::new::<second>(t)).collect(),
            (None, Some(0)) => {
                return Err(LoadError::Time("`points` must be at least one".into()));
            }
            (None, Some(1)) => vec![self.start],
            (None, Some(points)) => {
                let start = self.start.get::<second>();
                let step = (self.end.get::<second>() - start) / (points - 1) as f64;
                (0..points)
                    .map(|i| {
                        if i == points - 1 {
                            self.end
                        } else {
                            Time::new::<second>(start + step * i as f64)
                        }
                    })
                    .collect()
            }
            (None, None) => Vec::new(),
        };
        Ok((span, t_eval))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct NodeSection {
    name: String,
    kind: String,
    medium: String,
    #[serde(deserialize_with = "kelvins")]
    temperature: ThermodynamicTemperature,
    #[serde(default = "default_volume", deserialize_with = "cubic_meters")]
    volume: Volume,
    #[serde(default = "zero_power", deserialize_with = "watts")]
    heat_generation: Power,
    #[serde(default, deserialize_with = "pascals")]
    pressure: Option<Pressure>,
    #[serde(default)]
    emissivity: f64,
    #[serde(default)]
    isothermal: bool,
}

impl NodeSection {
    fn config(&self) -> Result<NodeConfig, NetworkError> {
        let kind: MediumKind = self.kind.parse()?;
        let medium = Medium::resolve(kind, &self.medium, self.pressure).map_err(|source| {
            NetworkError::UnresolvedMedium {
                node: self.name.clone(),
                source,
            }
        })?;

        let mut config = NodeConfig::new(medium, self.temperature)
            .with_name(self.name.clone())
            .with_volume(self.volume)
            .with_heat_generation(self.heat_generation)
            .with_emissivity(self.emissivity);
        config.isothermal = self.isothermal;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
struct PathSection {
    from: String,
    to: String,
    #[serde(deserialize_with = "square_meters")]
    area: Area,
    #[serde(deserialize_with = "meters")]
    length: Length,
    #[serde(default = "no_convection", deserialize_with = "heat_transfer")]
    convection: HeatTransfer,
    emissivity: Option<f64>,
}

fn zero_time() -> Time {
    Time::new::<second>(0.0)
}

fn default_volume() -> Volume {
    Volume::new::<cubic_meter>(0.01)
}

fn zero_power() -> Power {
    Power::new::<watt>(0.0)
}

fn no_convection() -> HeatTransfer {
    HeatTransfer::new::<watt_per_square_meter_kelvin>(0.0)
}

fn seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Time, D::Error> {
    f64::deserialize(deserializer).map(Time::new::<second>)
}

fn kelvins<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<ThermodynamicTemperature, D::Error> {
    f64::deserialize(deserializer).map(ThermodynamicTemperature::new::<kelvin>)
}

fn cubic_meters<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Volume, D::Error> {
    f64::deserialize(deserializer).map(Volume::new::<cubic_meter>)
}

fn watts<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Power, D::Error> {
    f64::deserialize(deserializer).map(Power::new::<watt>)
}

fn pascals<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Pressure>, D::Error> {
    Option::<f64>::deserialize(deserializer).map(|p| p.map(Pressure::new::<pascal>))
}

fn square_meters<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Area, D::Error> {
    f64::deserialize(deserializer).map(Area::new::<square_meter>)
}

fn meters<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Length, D::Error> {
    f64::deserialize(deserializer).map(Length::new::<meter>)
}

fn heat_transfer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<HeatTransfer, D::Error> {
    f64::deserialize(deserializer).map(HeatTransfer::new::<watt_per_square_meter_kelvin>)
}
