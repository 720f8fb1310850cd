use log::debug;
use thermnet_thermo::FluidProperties;
use uom::si::f64::ThermodynamicTemperature;

use crate::{NetworkError, Node, NodeConfig, NodeId, Path, PathConfig, PathId, Simulation};

/// Nodes and the paths between them.
///
/// The topology only grows: nodes and paths are appended and addressed by
/// the [`NodeId`] and [`PathId`] returned on insertion. Every path is checked
/// against the nodes already present, so a network is never malformed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Network {
    nodes: Vec<Node>,
    paths: Vec<Path>,
}

impl Network {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a node from `config` and adds it.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Node::new`].
    pub fn add_node<P: FluidProperties + ?Sized>(
        &mut self,
        config: NodeConfig,
        fluids: &P,
    ) -> Result<NodeId, NetworkError> {
        let node = Node::new(config, fluids)?;
        Ok(self.push_node(node))
    }

    /// Adds an already built node.
    pub fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        debug!("added {id} ({})", node.label());
        self.nodes.push(node);
        id
    }

    /// Adds a path between two existing nodes.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::UnknownNode`] or [`NetworkError::SelfLoop`] for
    /// bad endpoints and [`NetworkError::InvalidPath`] for bad geometry.
    pub fn add_path(&mut self, config: PathConfig) -> Result<PathId, NetworkError> {
        let id = PathId(self.paths.len());
        let path = Path::new(id, config, &self.nodes)?;
        self.paths.push(path);
        Ok(id)
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn path(&self, id: PathId) -> Option<&Path> {
        self.paths.get(id.0)
    }

    /// Returns the first node with the given name.
    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.name() == Some(name))
            .map(NodeId)
    }

    /// Returns the current node temperatures in node order.
    #[must_use]
    pub fn temperatures(&self) -> Vec<ThermodynamicTemperature> {
        self.nodes.iter().map(Node::temperature).collect()
    }

    /// Moves every node to its last temperature in `simulation`.
    ///
    /// A later simulation then continues from where this one ended.
    /// Property snapshots are not refreshed. Does nothing if the simulation
    /// recorded no times.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::TrajectoryShape`] if the simulation was run on a
    /// network with a different number of nodes.
    pub fn apply_final_temperatures(&mut self, simulation: &Simulation) -> Result<(), NetworkError> {
        let expected = self.nodes.len();
        let actual = simulation.temperatures.nrows();
        if actual != expected {
            return Err(NetworkError::TrajectoryShape { expected, actual });
        }

        for (node, temperature) in self.nodes.iter_mut().zip(simulation.final_temperatures()) {
            node.set_temperature(temperature)?;
        }
        Ok(())
    }
}
