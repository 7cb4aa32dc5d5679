//! Shortest paths over the delivery lattice.
//!
//! Dispatch code only sees [`Navigator`], which converts node coordinates to
//! grid cells, asks a [`Pathfinder`] for a cell route and converts the result
//! back to world waypoints. Any search algorithm can be plugged in through the
//! trait.

use std::fmt::Debug;

use pathfinding::prelude::{astar, bfs};

use crate::coords::{GridCell, GridFrame, WorldPos};
use crate::node::Node;
use crate::world::World;

/// Read-only adjacency of the lattice, indexed by row-major cell index.
#[derive(Debug, Clone)]
pub struct GridGraph {
    frame: GridFrame,
    adjacency: Vec<Vec<usize>>,
}

impl GridGraph {
    pub fn from_world(world: &World) -> Self {
        let frame = *world.frame();
        let mut adjacency = vec![Vec::new(); frame.cell_count()];
        for e in world.edges() {
            adjacency[e.a].push(e.b);
            adjacency[e.b].push(e.a);
        }
        Self { frame, adjacency }
    }

    pub fn frame(&self) -> &GridFrame {
        &self.frame
    }

    pub fn neighbors(&self, c: GridCell) -> impl Iterator<Item = GridCell> + '_ {
        self.frame
            .index(c)
            .map(|i| self.adjacency[i].as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(|&i| self.frame.cell_at(i))
    }
}

/// Narrow capability used by dispatch: a cell route from `start` to `goal`
/// inclusive, or `None` when unreachable.
///
/// Implementations receive the graph by shared reference and keep all search
/// state local to the call.
pub trait Pathfinder: Debug {
    fn find_path(&self, graph: &GridGraph, start: GridCell, goal: GridCell) -> Option<Vec<GridCell>>;
}

/// A* with unit edge costs and a Manhattan heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct AStar;

impl Pathfinder for AStar {
    fn find_path(&self, graph: &GridGraph, start: GridCell, goal: GridCell) -> Option<Vec<GridCell>> {
        if !graph.frame().contains(start) || !graph.frame().contains(goal) {
            return None;
        }
        astar(
            &start,
            |&c| graph.neighbors(c).map(|n| (n, 1u32)).collect::<Vec<_>>(),
            |&c| c.manhattan(goal),
            |&c| c == goal,
        )
        .map(|(path, _cost)| path)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BreadthFirst;

impl Pathfinder for BreadthFirst {
    fn find_path(&self, graph: &GridGraph, start: GridCell, goal: GridCell) -> Option<Vec<GridCell>> {
        if !graph.frame().contains(start) || !graph.frame().contains(goal) {
            return None;
        }
        bfs(&start, |&c| graph.neighbors(c).collect::<Vec<_>>(), |&c| c == goal)
    }
}

/// Pathfinding adapter bound to one generated world.
#[derive(Debug, Clone)]
pub struct Navigator {
    graph: GridGraph,
}

impl Navigator {
    pub fn new(world: &World) -> Self {
        Self { graph: GridGraph::from_world(world) }
    }

    pub fn graph(&self) -> &GridGraph {
        &self.graph
    }

    /// World waypoints from `from` to `to`, both included. Empty when the
    /// pathfinder finds no route.
    pub fn find_path(&self, finder: &dyn Pathfinder, from: &Node, to: &Node) -> Vec<WorldPos> {
        let frame = self.graph.frame();
        let (Some(start), Some(goal)) = (frame.to_cell(from.position), frame.to_cell(to.position)) else {
            return Vec::new();
        };
        finder
            .find_path(&self.graph, start, goal)
            .map(|cells| cells.into_iter().map(|c| frame.to_world(c)).collect())
            .unwrap_or_default()
    }

    /// Like [`Navigator::find_path`] but degrades to the two-point route
    /// `[from, to]` when no path exists. The flag reports the fallback.
    pub fn route_or_direct(&self, finder: &dyn Pathfinder, from: &Node, to: &Node) -> (Vec<WorldPos>, bool) {
        let path = self.find_path(finder, from, to);
        if path.is_empty() {
            tracing::warn!(from = from.id, to = to.id, "no path found, using direct route");
            (vec![from.position, to.position], true)
        } else {
            tracing::debug!(from = from.id, to = to.id, waypoints = path.len(), "path computed");
            (path, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeRole;

    #[derive(Debug)]
    struct NoRoute;

    impl Pathfinder for NoRoute {
        fn find_path(&self, _: &GridGraph, _: GridCell, _: GridCell) -> Option<Vec<GridCell>> {
            None
        }
    }

    fn world() -> World {
        let mut roles = vec![NodeRole::Road; 36];
        roles[14] = NodeRole::Depot;
        roles[35] = NodeRole::House;
        World::from_roles(GridFrame::new(6, 4.0, -10.0, -10.0), roles).unwrap()
    }

    fn assert_adjacent_steps(path: &[WorldPos], frame: &GridFrame) {
        for pair in path.windows(2) {
            let a = frame.to_cell(pair[0]).unwrap();
            let b = frame.to_cell(pair[1]).unwrap();
            assert_eq!(a.manhattan(b), 1, "{a:?} -> {b:?}");
        }
    }

    #[test]
    fn astar_path_is_shortest_and_adjacent() {
        let w = world();
        let nav = Navigator::new(&w);
        let path = nav.find_path(&AStar, w.start(), w.depot());
        // (0,0) -> (2,2): four steps, five waypoints.
        assert_eq!(path.len(), 5);
        assert_eq!(path.first(), Some(&w.start().position));
        assert_eq!(path.last(), Some(&w.depot().position));
        assert_adjacent_steps(&path, w.frame());
    }

    #[test]
    fn algorithms_are_interchangeable() {
        let w = world();
        let nav = Navigator::new(&w);
        let house = w.node(35).unwrap();
        let a = nav.find_path(&AStar, w.depot(), house);
        let b = nav.find_path(&BreadthFirst, w.depot(), house);
        assert_eq!(a.len(), b.len());
        assert_eq!(a.last(), b.last());
        assert_adjacent_steps(&b, w.frame());
    }

    #[test]
    fn same_node_path_is_single_waypoint() {
        let w = world();
        let nav = Navigator::new(&w);
        assert_eq!(nav.find_path(&AStar, w.depot(), w.depot()), vec![w.depot().position]);
    }

    #[test]
    fn missing_route_falls_back_to_direct() {
        let w = world();
        let nav = Navigator::new(&w);
        assert!(nav.find_path(&NoRoute, w.start(), w.depot()).is_empty());
        let (path, direct) = nav.route_or_direct(&NoRoute, w.start(), w.depot());
        assert!(direct);
        assert_eq!(path, vec![w.start().position, w.depot().position]);
    }

    #[test]
    fn cells_outside_the_graph_have_no_route() {
        let w = world();
        let nav = Navigator::new(&w);
        assert!(AStar.find_path(nav.graph(), GridCell::new(0, 0), GridCell::new(9, 9)).is_none());
    }
}
