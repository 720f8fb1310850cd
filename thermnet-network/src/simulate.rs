use std::{cell::RefCell, convert::Infallible};

use log::debug;
use nalgebra::{DMatrix, DVector};
use thermnet_core::{OdeSystem, units::TemperatureOps};
use thermnet_solvers::transient::switching::{self, Stats, Status};
use uom::si::{
    f64::{ThermodynamicTemperature, Time},
    time::second,
};

use crate::{Branch, BranchSelection, HeatBalance, Network, NetworkError, NodeId};

/// Settings for [`simulate`].
///
/// The default solver uses a relative tolerance of 1e-3, an absolute
/// tolerance of 1e-7, and switches between explicit and BDF formulas as the
/// problem's stiffness changes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationConfig {
    pub solver: switching::Config,
    pub branch: BranchSelection,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(solver: switching::Config) -> Self {
        Self {
            solver,
            branch: BranchSelection::default(),
        }
    }

    #[must_use]
    pub fn with_branch(mut self, branch: BranchSelection) -> Self {
        self.branch = branch;
        self
    }
}

/// Temperature trajectory of a network.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub status: Status,
    pub times: Vec<Time>,

    /// Temperatures in kelvin, one row per node and one column per time.
    pub temperatures: DMatrix<f64>,

    pub stats: Stats,
    pub branch: Branch,
}

impl Simulation {
    /// Returns `true` if the run reached the end of its span.
    #[must_use]
    pub fn success(&self) -> bool {
        self.status.is_success()
    }

    /// Describes how the run ended.
    #[must_use]
    pub fn message(&self) -> String {
        self.status.to_string()
    }

    /// Returns the temperature of `node` at output index `step`.
    #[must_use]
    pub fn temperature(&self, node: NodeId, step: usize) -> Option<ThermodynamicTemperature> {
        self.temperatures
            .get((node.index(), step))
            .map(|&t| ThermodynamicTemperature::from_kelvin(t))
    }

    /// Returns the temperatures of `node` at every output time.
    #[must_use]
    pub fn history(&self, node: NodeId) -> Vec<ThermodynamicTemperature> {
        if node.index() >= self.temperatures.nrows() {
            return Vec::new();
        }
        self.temperatures
            .row(node.index())
            .iter()
            .map(|&t| ThermodynamicTemperature::from_kelvin(t))
            .collect()
    }

    /// Returns every node's temperature at the last output time.
    ///
    /// Empty if no times were recorded.
    #[must_use]
    pub fn final_temperatures(&self) -> Vec<ThermodynamicTemperature> {
        let Some(last) = self.temperatures.ncols().checked_sub(1) else {
            return Vec::new();
        };
        self.temperatures
            .column(last)
            .iter()
            .map(|&t| ThermodynamicTemperature::from_kelvin(t))
            .collect()
    }
}

/// Integrates the node temperatures of `network` over `span`.
///
/// Temperatures are reported at each time in `t_eval`, which must be
/// non-decreasing and inside `span`. With an empty `t_eval`, every accepted
/// solver step is reported instead.
///
/// Isothermal nodes are not integrated. Their rows hold their initial
/// temperature exactly, and when no node is free the solver is not run.
///
/// A run that cannot finish (step budget or step size exhausted) is not an
/// error: it returns a failed [`Status`] with the trajectory so far.
///
/// # Errors
///
/// Returns an error if the branch cannot be assembled for this network, or if
/// the span, evaluation times, or solver settings are invalid.
pub fn simulate(
    network: &Network,
    span: [Time; 2],
    t_eval: &[Time],
    config: &SimulationConfig,
) -> Result<Simulation, NetworkError> {
    let balance = HeatBalance::new(network, config.branch)?;
    let span = span.map(|t| t.get::<second>());
    let t_eval: Vec<f64> = t_eval.iter().map(|t| t.get::<second>()).collect();

    let initial: Vec<f64> = network
        .nodes()
        .iter()
        .map(|node| node.temperature().kelvin())
        .collect();
    let free: Vec<usize> = network
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, node)| !node.is_isothermal())
        .map(|(index, _)| index)
        .collect();

    let (status, times, states, stats) = if free.is_empty() {
        debug!("every node is isothermal, skipping integration");
        let times = fixed_times(span, &t_eval)?;
        let states = vec![DVector::zeros(0); times.len()];
        (Status::Complete, times, states, Stats::default())
    } else {
        let system = FreeNodes {
            balance: &balance,
            scratch: RefCell::new(initial.clone()),
            free: free.clone(),
        };
        let start: Vec<f64> = free.iter().map(|&index| initial[index]).collect();
        let solution =
            switching::solve_unobserved(&system, span, &start, &t_eval, &config.solver)?;
        (
            solution.status,
            solution.times,
            solution.states,
            solution.stats,
        )
    };

    let mut slot = vec![None; initial.len()];
    for (position, &index) in free.iter().enumerate() {
        slot[index] = Some(position);
    }
    let temperatures = DMatrix::from_fn(initial.len(), times.len(), |node, step| {
        slot[node].map_or(initial[node], |position| states[step][position])
    });

    debug!(
        "simulated {} nodes over [{}, {}] s: {status}, {} output times",
        initial.len(),
        span[0],
        span[1],
        times.len()
    );

    Ok(Simulation {
        status,
        times: times.into_iter().map(Time::new::<second>).collect(),
        temperatures,
        stats,
        branch: balance.branch(),
    })
}

/// The free nodes of a network as an ODE system.
///
/// `scratch` holds the full temperature vector. Its isothermal entries never
/// change; the free entries are overwritten on every evaluation.
struct FreeNodes<'a> {
    balance: &'a HeatBalance,
    scratch: RefCell<Vec<f64>>,
    free: Vec<usize>,
}

impl OdeSystem for FreeNodes<'_> {
    type Error = Infallible;

    fn dimension(&self) -> usize {
        self.free.len()
    }

    fn derivative(&self, _t: f64, y: &[f64], dydt: &mut [f64]) -> Result<(), Self::Error> {
        let mut temperatures = self.scratch.borrow_mut();
        for (&index, &value) in self.free.iter().zip(y) {
            temperatures[index] = value;
        }

        for (dydt, &index) in dydt.iter_mut().zip(&self.free) {
            *dydt = self.balance.node_rate(index, &temperatures);
        }
        Ok(())
    }
}

/// Output times for a network with nothing to integrate.
///
/// Applies the same checks the solver applies to its span and evaluation times.
fn fixed_times([start, end]: [f64; 2], t_eval: &[f64]) -> Result<Vec<f64>, switching::Error> {
    if !start.is_finite() || !end.is_finite() || start > end {
        return Err(switching::Error::Span { start, end });
    }

    let inside = t_eval
        .iter()
        .all(|t| t.is_finite() && (start..=end).contains(t));
    let ordered = t_eval.windows(2).all(|pair| pair[0] <= pair[1]);
    if !(inside && ordered) {
        return Err(switching::Error::EvalTimes);
    }

    Ok(match t_eval {
        [] if start < end => vec![start, end],
        [] => vec![start],
        times => times.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use thermnet_thermo::{FluidTable, Material};
    use uom::si::{
        area::square_meter,
        f64::{Area, Length},
        length::meter,
        thermodynamic_temperature::kelvin,
    };

    use crate::{NodeConfig, PathConfig};

    fn seconds(values: &[f64]) -> Vec<Time> {
        values.iter().map(|&t| Time::new::<second>(t)).collect()
    }

    fn boundaries_only() -> Network {
        let fluids = FluidTable::new();
        let mut network = Network::new();
        let a = network
            .add_node(
                NodeConfig::solid(Material::Ss316, ThermodynamicTemperature::new::<kelvin>(400.0))
                    .isothermal(),
                &fluids,
            )
            .unwrap();
        let b = network
            .add_node(
                NodeConfig::solid(Material::Ss316, ThermodynamicTemperature::new::<kelvin>(300.0))
                    .isothermal(),
                &fluids,
            )
            .unwrap();
        network
            .add_path(PathConfig::new(
                a,
                b,
                Area::new::<square_meter>(0.01),
                Length::new::<meter>(1.0),
            ))
            .unwrap();
        network
    }

    #[test]
    fn all_isothermal_network_is_not_integrated() {
        let network = boundaries_only();
        let span = [Time::new::<second>(0.0), Time::new::<second>(100.0)];

        let result = simulate(
            &network,
            span,
            &seconds(&[0.0, 50.0, 100.0]),
            &SimulationConfig::default(),
        )
        .unwrap();

        assert!(result.success());
        assert_eq!(result.stats, Stats::default());
        assert_eq!(result.temperatures.ncols(), 3);
        assert!(result.temperatures.row(0).iter().all(|&t| t == 400.0));
        assert!(result.temperatures.row(1).iter().all(|&t| t == 300.0));
    }

    #[test]
    fn all_isothermal_network_defaults_to_span_ends() {
        let network = boundaries_only();
        let span = [Time::new::<second>(5.0), Time::new::<second>(10.0)];

        let result = simulate(&network, span, &[], &SimulationConfig::default()).unwrap();

        assert_eq!(result.times, seconds(&[5.0, 10.0]));
    }

    #[test]
    fn all_isothermal_network_still_checks_times() {
        let network = boundaries_only();
        let span = [Time::new::<second>(0.0), Time::new::<second>(10.0)];

        assert!(matches!(
            simulate(&network, span, &seconds(&[20.0]), &SimulationConfig::default()),
            Err(NetworkError::Solver(switching::Error::EvalTimes))
        ));
        assert!(matches!(
            simulate(
                &network,
                [span[1], span[0]],
                &[],
                &SimulationConfig::default()
            ),
            Err(NetworkError::Solver(switching::Error::Span { .. }))
        ));
    }

    #[test]
    fn accessors_read_the_trajectory() {
        let network = boundaries_only();
        let span = [Time::new::<second>(0.0), Time::new::<second>(1.0)];
        let result = simulate(&network, span, &[], &SimulationConfig::default()).unwrap();

        assert_eq!(
            result.temperature(NodeId(1), 1),
            Some(ThermodynamicTemperature::new::<kelvin>(300.0))
        );
        assert_eq!(result.temperature(NodeId(2), 0), None);
        assert_eq!(result.history(NodeId(0)).len(), 2);
        assert!(result.history(NodeId(5)).is_empty());
        assert_eq!(result.final_temperatures().len(), 2);
        assert_eq!(result.message(), Status::Complete.to_string());
    }

    #[test]
    fn free_node_rates_match_the_full_balance() {
        let fluids = FluidTable::new();
        let kelvins = ThermodynamicTemperature::new::<kelvin>;
        let mut network = Network::new();
        let a = network
            .add_node(NodeConfig::solid(Material::Ss316, kelvins(400.0)).isothermal(), &fluids)
            .unwrap();
        let b = network
            .add_node(NodeConfig::solid(Material::Ss316, kelvins(320.0)), &fluids)
            .unwrap();
        let c = network
            .add_node(NodeConfig::solid(Material::Ss316, kelvins(300.0)).isothermal(), &fluids)
            .unwrap();
        for (from, to) in [(a, b), (b, c)] {
            network
                .add_path(PathConfig::new(
                    from,
                    to,
                    Area::new::<square_meter>(0.01),
                    Length::new::<meter>(0.5),
                ))
                .unwrap();
        }

        let balance = HeatBalance::new(&network, BranchSelection::Auto).unwrap();
        let system = FreeNodes {
            balance: &balance,
            scratch: RefCell::new(vec![400.0, 320.0, 300.0]),
            free: vec![1],
        };

        let mut dydt = [0.0];
        for middle in [350.0, 320.0, 310.0] {
            system.derivative(0.0, &[middle], &mut dydt).unwrap();
            assert_eq!(dydt[0], balance.rates(&[400.0, middle, 300.0])[1]);
        }
        assert_eq!(*system.scratch.borrow(), vec![400.0, 310.0, 300.0]);
    }
}
