//! Right-hand side of a network's ODE system.
//!
//! Every path carries a heat flow from its `from` node to its `to` node:
//!
//! ```text
//! q = (k·A/dx + h·A)·(T_from − T_to) + σ·e·A·(T_from⁴ − T_to⁴)
//! ```
//!
//! and each free node integrates `dT/dt = (E_g + Σ ±q) / (ρ·V·c)`.
//! Isothermal nodes have a rate of exactly zero.
//!
//! Two branches evaluate the balance. The two-node branch handles a pair of
//! nodes joined by one path directly, radiating with each node's own
//! emissivity. The general branch walks the [`Connectivity`] table and
//! radiates with the path's emissivity. With matching emissivities both give
//! identical rates.

use std::convert::Infallible;

use log::debug;
use thermnet_core::OdeSystem;
use uom::si::{area::square_meter, f64::Power, power::watt};

use crate::{Connectivity, Network, NetworkError, Node, NodeId, connectivity::inverse_mass};

/// Stefan–Boltzmann constant in W/(m²·K⁴).
pub const STEFAN_BOLTZMANN: f64 = 5.678e-8;

/// The evaluation strategy a [`HeatBalance`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    TwoNode,
    General,
}

/// How to choose a [`Branch`] for a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BranchSelection {
    /// Two-node for exactly two nodes and one path, general otherwise.
    #[default]
    Auto,
    /// Two-node; fails for any other topology.
    TwoNode,
    /// General, for any topology.
    General,
}

/// Per-node constants, in SI units.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Terms {
    inverse_mass: f64,
    generation: f64,
    emissivity: f64,
    isothermal: bool,
}

impl Terms {
    fn new(node: &Node) -> Self {
        Self {
            inverse_mass: inverse_mass(node),
            generation: node.heat_generation().get::<watt>(),
            emissivity: node.emissivity(),
            isothermal: node.is_isothermal(),
        }
    }
}

/// Per-path constants, in SI units.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Exchange {
    from: usize,
    to: usize,
    area: f64,
    conductance: f64,
    radiation: f64,
}

impl Exchange {
    /// Heat flow from `from` to `to`, in W.
    fn heat_flow(&self, temperatures: &[f64]) -> f64 {
        let (a, b) = (temperatures[self.from], temperatures[self.to]);
        self.conductance * (a - b) + self.radiation * (a.powi(4) - b.powi(4))
    }
}

/// The rates `dT/dt` of every node as a function of all node temperatures.
///
/// Built once from a [`Network`] and independent of it afterwards. Rates are
/// a pure function of the temperature vector, which is in kelvin and in node
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatBalance {
    branch: Branch,
    terms: Vec<Terms>,
    exchanges: Vec<Exchange>,
    connectivity: Connectivity,
}

impl HeatBalance {
    /// Assembles the balance for `network` with the branch chosen by `selection`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::NotTwoNode`] if the two-node branch is requested
    /// for a network that is not two nodes joined by a single path.
    pub fn new(network: &Network, selection: BranchSelection) -> Result<Self, NetworkError> {
        let nodes = network.nodes().len();
        let paths = network.paths().len();
        let two_node = nodes == 2 && paths == 1;

        let branch = match selection {
            BranchSelection::Auto if two_node => Branch::TwoNode,
            BranchSelection::Auto | BranchSelection::General => Branch::General,
            BranchSelection::TwoNode if two_node => Branch::TwoNode,
            BranchSelection::TwoNode => return Err(NetworkError::NotTwoNode { nodes, paths }),
        };

        let connectivity = match branch {
            Branch::TwoNode => Connectivity::default(),
            Branch::General => Connectivity::build(network.nodes(), network.paths())?,
        };

        let terms: Vec<Terms> = network.nodes().iter().map(Terms::new).collect();
        let exchanges = network
            .paths()
            .iter()
            .map(|path| Exchange {
                from: path.from().index(),
                to: path.to().index(),
                area: path.area().get::<square_meter>(),
                conductance: path.conductance(),
                radiation: path.radiative_coefficient(path.emissivity()),
            })
            .collect();

        debug!(
            "assembled {branch:?} heat balance: {nodes} nodes ({} isothermal), {paths} paths",
            terms.iter().filter(|terms| terms.isothermal).count()
        );

        Ok(Self {
            branch,
            terms,
            exchanges,
            connectivity,
        })
    }

    /// Assembles the two-node balance.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::NotTwoNode`] unless the network is two nodes
    /// joined by a single path.
    pub fn two_node(network: &Network) -> Result<Self, NetworkError> {
        Self::new(network, BranchSelection::TwoNode)
    }

    /// Assembles the general balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the network's paths reference missing nodes.
    pub fn general(network: &Network) -> Result<Self, NetworkError> {
        Self::new(network, BranchSelection::General)
    }

    #[must_use]
    pub fn branch(&self) -> Branch {
        self.branch
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.terms.len()
    }

    /// Returns `dT/dt` for every node, in K/s.
    ///
    /// # Panics
    ///
    /// Panics if `temperatures` does not have one entry per node.
    #[must_use]
    pub fn rates(&self, temperatures: &[f64]) -> Vec<f64> {
        let mut rates = vec![0.0; self.terms.len()];
        self.rates_into(temperatures, &mut rates);
        rates
    }

    /// Writes `dT/dt` for every node into `rates`.
    ///
    /// # Panics
    ///
    /// Panics if either slice does not have one entry per node.
    pub fn rates_into(&self, temperatures: &[f64], rates: &mut [f64]) {
        assert_eq!(temperatures.len(), self.terms.len(), "one temperature per node");
        assert_eq!(rates.len(), self.terms.len(), "one rate per node");

        for (index, rate) in rates.iter_mut().enumerate() {
            *rate = self.node_rate(index, temperatures);
        }
    }

    /// Returns the instantaneous `from → to` heat flow of every path.
    ///
    /// # Panics
    ///
    /// Panics if `temperatures` does not have one entry per node.
    #[must_use]
    pub fn path_heat_flows(&self, temperatures: &[f64]) -> Vec<Power> {
        assert_eq!(temperatures.len(), self.terms.len(), "one temperature per node");

        self.exchanges
            .iter()
            .map(|exchange| Power::new::<watt>(exchange.heat_flow(temperatures)))
            .collect()
    }

    /// `dT/dt` of a single node; zero for isothermal nodes.
    pub(crate) fn node_rate(&self, index: usize, temperatures: &[f64]) -> f64 {
        let terms = &self.terms[index];
        if terms.isothermal {
            return 0.0;
        }

        match self.branch {
            Branch::TwoNode => {
                let exchange = &self.exchanges[0];
                let other = if exchange.from == index {
                    exchange.to
                } else {
                    exchange.from
                };

                let (t_me, t_other) = (temperatures[index], temperatures[other]);
                let radiation = STEFAN_BOLTZMANN * terms.emissivity * exchange.area;
                let outflow = exchange.conductance * (t_me - t_other)
                    + radiation * (t_me.powi(4) - t_other.powi(4));

                terms.generation * terms.inverse_mass + (-outflow) * terms.inverse_mass
            }
            Branch::General => {
                let mut rate = terms.generation * terms.inverse_mass;
                for link in self.connectivity.links(NodeId(index)) {
                    let flow = self.exchanges[link.path.index()].heat_flow(temperatures);
                    rate += link.sign * flow * link.inverse_mass;
                }
                rate
            }
        }
    }
}

impl OdeSystem for HeatBalance {
    type Error = Infallible;

    fn dimension(&self) -> usize {
        self.terms.len()
    }

    fn derivative(&self, _t: f64, y: &[f64], dydt: &mut [f64]) -> Result<(), Self::Error> {
        self.rates_into(y, dydt);
        Ok(())
    }
}
