use thermnet_core::constraint::ConstraintError;
use thermnet_solvers::transient::switching;
use thermnet_thermo::PropertyError;
use thiserror::Error;

/// Errors raised while building or simulating a thermal network.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// A node's medium could not be resolved to properties.
    #[error("node `{node}`: unresolved medium")]
    UnresolvedMedium {
        node: String,
        #[source]
        source: PropertyError,
    },

    /// A medium kind other than `FLUID` or `SOLID`.
    #[error("unknown medium kind `{0}`, expected FLUID or SOLID")]
    UnknownMediumKind(String),

    /// A non-isothermal node would have no thermal mass to store heat in.
    #[error("node `{node}` has a singular thermal mass: {parameter} must be positive")]
    SingularThermalMass {
        node: String,
        parameter: &'static str,
    },

    #[error("node `{node}`: invalid {parameter}")]
    InvalidNode {
        node: String,
        parameter: &'static str,
        #[source]
        source: ConstraintError,
    },

    #[error("path {path}: invalid {parameter}")]
    InvalidPath {
        path: usize,
        parameter: &'static str,
        #[source]
        source: ConstraintError,
    },

    /// A path endpoint is not in the node collection.
    #[error("node {index} does not exist in a network of {count} nodes")]
    UnknownNode { index: usize, count: usize },

    /// A path joins a node to itself.
    #[error("path connects node {0} to itself")]
    SelfLoop(usize),

    /// The two-node heat balance was requested for a different topology.
    #[error(
        "two-node heat balance needs exactly two nodes and one path, \
         got {nodes} nodes and {paths} paths"
    )]
    NotTwoNode { nodes: usize, paths: usize },

    /// A trajectory does not cover every node of the network.
    #[error("trajectory has {actual} node rows, network has {expected} nodes")]
    TrajectoryShape { expected: usize, actual: usize },

    #[error(transparent)]
    Solver(#[from] switching::Error),
}
