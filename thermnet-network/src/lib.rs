//! Lumped-parameter thermal networks and their transient simulation.
//!
//! A [`Network`] holds thermal masses ([`Node`]s) joined by exchange pathways
//! ([`Path`]s) that carry conduction, convection, and radiation. Each node has
//! one temperature and contributes one equation `dT/dt` to an ODE system,
//! assembled by [`HeatBalance`] and integrated by [`simulate`] with the
//! stiff-capable switching solver from `thermnet-solvers`.
//!
//! # Example
//!
//! ```
//! use thermnet_network::{Network, NodeConfig, PathConfig, SimulationConfig, simulate};
//! use thermnet_thermo::{FluidTable, Material};
//! use uom::si::{
//!     area::square_meter,
//!     f64::{Area, Length, ThermodynamicTemperature, Time},
//!     length::meter,
//!     thermodynamic_temperature::kelvin,
//!     time::second,
//! };
//!
//! let fluids = FluidTable::standard();
//! let mut network = Network::new();
//! let hot = network
//!     .add_node(
//!         NodeConfig::solid(Material::Ss316, ThermodynamicTemperature::new::<kelvin>(400.0)),
//!         &fluids,
//!     )
//!     .unwrap();
//! let cold = network
//!     .add_node(
//!         NodeConfig::solid(Material::Ss316, ThermodynamicTemperature::new::<kelvin>(300.0)),
//!         &fluids,
//!     )
//!     .unwrap();
//! network
//!     .add_path(PathConfig::new(
//!         hot,
//!         cold,
//!         Area::new::<square_meter>(0.01),
//!         Length::new::<meter>(1.0),
//!     ))
//!     .unwrap();
//!
//! let span = [Time::new::<second>(0.0), Time::new::<second>(1000.0)];
//! let result = simulate(&network, span, &[], &SimulationConfig::default()).unwrap();
//!
//! assert!(result.success());
//! let last = result.final_temperatures();
//! assert!(last[0] < ThermodynamicTemperature::new::<kelvin>(400.0));
//! assert!(last[0] > last[1]);
//! ```

mod config;
mod connectivity;
mod error;
mod heat_balance;
mod network;
mod node;
mod path;
mod simulate;

pub use config::{LoadError, LoadedNetwork, NetworkConfig};
pub use connectivity::{Connectivity, Link, Role};
pub use error::NetworkError;
pub use heat_balance::{Branch, BranchSelection, HeatBalance, STEFAN_BOLTZMANN};
pub use network::Network;
pub use node::{Medium, MediumKind, Node, NodeConfig, NodeId};
pub use path::{Path, PathConfig, PathId};
pub use simulate::{Simulation, SimulationConfig, simulate};
