//! Per-node index of touching paths.

use uom::si::heat_capacity::joule_per_kelvin;

use crate::{NetworkError, Node, NodeId, Path, PathId};

/// Which end of a path a node sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The path's `from` node, which loses heat when the path flow is positive.
    From,
    /// The path's `to` node, which gains heat when the path flow is positive.
    To,
}

impl Role {
    /// Returns −1 for [`Role::From`] and +1 for [`Role::To`].
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Self::From => -1.0,
            Self::To => 1.0,
        }
    }
}

/// One entry of a node's connectivity: a path it touches and how.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub path: PathId,
    pub role: Role,

    /// Multiplier applied to the path's `from → to` heat flow.
    pub sign: f64,

    /// `1/(ρ·V·c)` of the node, in K/J. Zero for isothermal nodes.
    pub inverse_mass: f64,
}

/// Signed-edge table mapping every node to the paths that touch it.
///
/// Built once before integration and read-only afterwards. A node's links
/// keep the order of the paths in the network.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Connectivity {
    links: Vec<Vec<Link>>,
}

impl Connectivity {
    /// Builds the table for `nodes` joined by `paths`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::UnknownNode`] if a path endpoint is out of range
    /// and [`NetworkError::SelfLoop`] if a path starts and ends at one node.
    pub fn build(nodes: &[Node], paths: &[Path]) -> Result<Self, NetworkError> {
        let count = nodes.len();
        let mut links: Vec<Vec<Link>> = vec![Vec::new(); count];

        for (index, path) in paths.iter().enumerate() {
            for node in [path.from(), path.to()] {
                if node.0 >= count {
                    return Err(NetworkError::UnknownNode {
                        index: node.0,
                        count,
                    });
                }
            }
            if path.from() == path.to() {
                return Err(NetworkError::SelfLoop(path.from().0));
            }

            for (node, role) in [(path.from(), Role::From), (path.to(), Role::To)] {
                links[node.0].push(Link {
                    path: PathId(index),
                    role,
                    sign: role.sign(),
                    inverse_mass: inverse_mass(&nodes[node.0]),
                });
            }
        }

        Ok(Self { links })
    }

    /// Returns the links of `node`, or an empty slice if it is out of range.
    #[must_use]
    pub fn links(&self, node: NodeId) -> &[Link] {
        self.links.get(node.0).map(Vec::as_slice).unwrap_or(&[])
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.links.len()
    }
}

/// Returns `1/(ρ·V·c)` for a node that integrates, zero for one that does not.
pub(crate) fn inverse_mass(node: &Node) -> f64 {
    if node.is_isothermal() {
        0.0
    } else {
        1.0 / node.thermal_mass().get::<joule_per_kelvin>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use thermnet_thermo::{FluidTable, Material};
    use uom::si::{
        area::square_meter,
        f64::{Area, Length, ThermodynamicTemperature},
        length::meter,
        thermodynamic_temperature::kelvin,
    };

    use crate::{Network, NodeConfig, PathConfig};

    fn chain() -> Network {
        let fluids = FluidTable::new();
        let t = ThermodynamicTemperature::new::<kelvin>(300.0);
        let mut network = Network::new();
        let a = network
            .add_node(NodeConfig::solid(Material::Ss316, t).isothermal(), &fluids)
            .unwrap();
        let b = network
            .add_node(NodeConfig::solid(Material::Ss316, t), &fluids)
            .unwrap();
        let c = network
            .add_node(NodeConfig::solid(Material::Al6061, t), &fluids)
            .unwrap();
        let area = Area::new::<square_meter>(0.01);
        let length = Length::new::<meter>(1.0);
        network
            .add_path(PathConfig::new(a, b, area, length))
            .unwrap();
        network
            .add_path(PathConfig::new(b, c, area, length))
            .unwrap();
        network
    }

    #[test]
    fn links_record_role_and_sign() {
        let network = chain();
        let table = Connectivity::build(network.nodes(), network.paths()).unwrap();

        assert_eq!(table.node_count(), 3);

        let a = table.links(NodeId(0));
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].role, Role::From);
        assert_relative_eq!(a[0].sign, -1.0);
        assert_relative_eq!(a[0].inverse_mass, 0.0);

        let b = table.links(NodeId(1));
        assert_eq!(
            b.iter().map(|link| (link.path, link.role)).collect::<Vec<_>>(),
            vec![(PathId(0), Role::To), (PathId(1), Role::From)]
        );
        assert_relative_eq!(
            b[0].inverse_mass,
            1.0 / (8030.0 * 0.01 * 500.0),
            max_relative = 1e-12
        );

        let c = table.links(NodeId(2));
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].role, Role::To);
        assert_relative_eq!(
            c[0].inverse_mass,
            1.0 / (2700.0 * 0.01 * 896.0),
            max_relative = 1e-12
        );
    }

    #[test]
    fn out_of_range_node_has_no_links() {
        let network = chain();
        let table = Connectivity::build(network.nodes(), network.paths()).unwrap();

        assert!(table.links(NodeId(7)).is_empty());
    }

    #[test]
    fn endpoints_outside_the_node_set_are_rejected() {
        let network = chain();

        assert!(matches!(
            Connectivity::build(&network.nodes()[..2], network.paths()),
            Err(NetworkError::UnknownNode { index: 2, count: 2 })
        ));
    }
}
