use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::coords::{GridCell, GridFrame, WorldPos};
use crate::error::SimError;
use crate::node::{Edge, Node, NodeId, NodeRole};

/// Distance under which a position counts as sitting on a node.
pub const NODE_SNAP_TOLERANCE: f32 = 0.1;

/// Per-cell probabilities used by [`World::generate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleChances {
    pub depot: f32,
    pub house: f32,
}

impl Default for RoleChances {
    fn default() -> Self {
        Self { depot: 0.1, house: 0.2 }
    }
}

#[derive(Debug, Clone)]
pub struct World {
    frame: GridFrame,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    depot: NodeId,
}

impl World {
    /// Rolls a role for every cell except the two terminal corners of the
    /// row-major sweep. Cell 0 is the ground start and stays a road; the last
    /// cell becomes the depot when no earlier cell claimed it. The other two
    /// corners (`size - 1` and `size * (size - 1)`) roll like any inner cell.
    pub fn generate(frame: GridFrame, chances: RoleChances, rng: &mut impl Rng) -> Result<Self, SimError> {
        let count = frame.cell_count();
        let last = count.saturating_sub(1);
        let mut depot_placed = false;
        let mut roles = Vec::with_capacity(count);
        for index in 0..count {
            let role = if index == 0 {
                NodeRole::Road
            } else if index == last {
                if depot_placed { NodeRole::Road } else { NodeRole::Depot }
            } else {
                let roll: f32 = rng.r#gen();
                if roll < chances.depot && !depot_placed {
                    depot_placed = true;
                    NodeRole::Depot
                } else if rng.r#gen::<f32>() < chances.house {
                    NodeRole::House
                } else {
                    NodeRole::Road
                }
            };
            roles.push(role);
        }
        Self::from_roles(frame, roles)
    }

    /// Builds a world from an explicit row-major role layout.
    pub fn from_roles(frame: GridFrame, roles: Vec<NodeRole>) -> Result<Self, SimError> {
        if frame.size < 2 {
            return Err(SimError::Configuration(format!("grid size {} is too small", frame.size)));
        }
        if roles.len() != frame.cell_count() {
            return Err(SimError::Configuration(format!(
                "layout has {} cells, grid needs {}",
                roles.len(),
                frame.cell_count()
            )));
        }
        let depots: Vec<NodeId> = roles
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_depot())
            .map(|(i, _)| i)
            .collect();
        let depot = match depots.as_slice() {
            [only] => *only,
            [] => return Err(SimError::Configuration("world has no depot".into())),
            _ => return Err(SimError::Configuration(format!("world has {} depots", depots.len()))),
        };

        let mut nodes = Vec::with_capacity(roles.len());
        for (id, role) in roles.into_iter().enumerate() {
            let cell = frame.cell_at(id).ok_or_else(|| SimError::Configuration(format!("cell {id} out of range")))?;
            nodes.push(Node { id, position: frame.to_world(cell), role });
        }
        let edges = grid_edges(frame.size as usize);
        Ok(Self { frame, nodes, edges, depot })
    }

    pub fn frame(&self) -> &GridFrame {
        &self.frame
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn depot(&self) -> &Node {
        &self.nodes[self.depot]
    }

    /// Where ground vehicles spawn and return to.
    pub fn start(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn houses(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.role.is_house())
    }

    pub fn house_count(&self) -> usize {
        self.houses().count()
    }

    pub fn node_at(&self, p: WorldPos) -> Option<&Node> {
        self.nodes.iter().find(|n| n.position.near_xz(p, NODE_SNAP_TOLERANCE))
    }

    pub fn cell_of(&self, id: NodeId) -> Option<GridCell> {
        self.frame.cell_at(id)
    }

    pub fn are_adjacent(&self, a: NodeId, b: NodeId) -> bool {
        match (self.cell_of(a), self.cell_of(b)) {
            (Some(ca), Some(cb)) => ca.manhattan(cb) == 1,
            _ => false,
        }
    }
}

/// Right and bottom neighbours only, so each undirected edge appears once.
fn grid_edges(size: usize) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(2 * size * size.saturating_sub(1));
    for i in 0..size {
        for j in 0..size {
            let current = i * size + j;
            if j + 1 < size {
                edges.push(Edge::new(current, current + 1));
            }
            if i + 1 < size {
                edges.push(Edge::new(current, current + size));
            }
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn frame() -> GridFrame {
        GridFrame::new(6, 4.0, -10.0, -10.0)
    }

    fn layout_with_depot(depot: usize) -> Vec<NodeRole> {
        let mut roles = vec![NodeRole::Road; 36];
        roles[depot] = NodeRole::Depot;
        roles
    }

    #[test]
    fn corner_nodes_land_on_expected_coordinates() {
        let w = World::from_roles(frame(), layout_with_depot(14)).unwrap();
        assert_eq!(w.nodes()[0].position, WorldPos::new(-10.0, 0.0, -10.0));
        assert_eq!(w.nodes()[35].position, WorldPos::new(10.0, 0.0, 10.0));
        assert_eq!(w.depot().id, 14);
    }

    #[test]
    fn only_terminal_corners_skip_the_roll() {
        let mut rng = StdRng::seed_from_u64(1);
        let w = World::generate(frame(), RoleChances { depot: 0.0, house: 1.0 }, &mut rng).unwrap();
        assert_eq!(w.nodes()[0].role, NodeRole::Road);
        assert_eq!(w.nodes()[35].role, NodeRole::Depot);
        assert_eq!(w.nodes()[5].role, NodeRole::House);
        assert_eq!(w.nodes()[30].role, NodeRole::House);
        assert_eq!(w.house_count(), 34);
    }

    #[test]
    fn edges_form_full_lattice() {
        let w = World::from_roles(frame(), layout_with_depot(14)).unwrap();
        assert_eq!(w.edges().len(), 2 * 6 * 5);
        assert!(w.edges().iter().all(|e| w.are_adjacent(e.a, e.b)));
        let degree = |id| w.edges().iter().filter(|e| e.touches(id)).count();
        assert_eq!(degree(0), 2);
        assert_eq!(degree(1), 3);
        assert_eq!(degree(7), 4);
    }

    #[test]
    fn layouts_need_exactly_one_depot() {
        let none = World::from_roles(frame(), vec![NodeRole::Road; 36]);
        assert!(matches!(none, Err(SimError::Configuration(_))));
        let mut two = layout_with_depot(3);
        two[9] = NodeRole::Depot;
        assert!(matches!(World::from_roles(frame(), two), Err(SimError::Configuration(_))));
        let short = World::from_roles(frame(), vec![NodeRole::Depot]);
        assert!(matches!(short, Err(SimError::Configuration(_))));
    }

    #[test]
    fn generation_forces_depot_on_last_cell() {
        let mut rng = StdRng::seed_from_u64(7);
        let chances = RoleChances { depot: 0.0, house: 0.5 };
        let w = World::generate(frame(), chances, &mut rng).unwrap();
        assert_eq!(w.depot().id, 35);
        assert_eq!(w.start().role, NodeRole::Road);
    }

    #[test]
    fn generation_can_yield_no_houses() {
        let mut rng = StdRng::seed_from_u64(1);
        let chances = RoleChances { depot: 0.1, house: 0.0 };
        let w = World::generate(frame(), chances, &mut rng).unwrap();
        assert_eq!(w.house_count(), 0);
    }

    #[test]
    fn node_lookup_by_position() {
        let w = World::from_roles(frame(), layout_with_depot(14)).unwrap();
        assert_eq!(w.node_at(WorldPos::on_ground(-2.05, -1.98)).map(|n| n.id), Some(14));
        assert!(w.node_at(WorldPos::on_ground(-1.0, -1.0)).is_none());
    }
}
