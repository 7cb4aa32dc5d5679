use serde::{Deserialize, Serialize};

use crate::coords::WorldPos;
use crate::node::{Node, NodeId};
use crate::orders::OrderId;
use crate::world::{NODE_SNAP_TOLERANCE, World};

pub type VehicleId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleKind {
	/// Shuttles orders from the start node to the depot along roads.
	Ground,
	/// Flies packages from the depot straight to houses.
	Aerial,
}

impl VehicleKind {
	pub fn label(self) -> &'static str {
		match self {
			VehicleKind::Ground => "Ground vehicle",
			VehicleKind::Aerial => "Aerial vehicle",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleState {
	Idle,
	Moving,
}

/// Direction of the current trip. Only aerial vehicles ever return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Leg {
	Outbound,
	Returning,
}

/// Outcome of reaching the end of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
	DroppedAtDepot { order: OrderId },
	ReturnedToStart,
	Delivered { order: OrderId, house: NodeId },
	ReturnedToDepot,
	None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
	pub id: VehicleId,
	pub kind: VehicleKind,
	pub position: WorldPos,
	pub carrying: bool,
	pub state: VehicleState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
	id: VehicleId,
	kind: VehicleKind,
	speed: f32,
	position: WorldPos,
	path: Vec<WorldPos>,
	cursor: usize,
	cargo: Option<OrderId>,
	target: Option<NodeId>,
	state: VehicleState,
	leg: Leg,
}

impl Vehicle {
	pub fn new(id: VehicleId, kind: VehicleKind, position: WorldPos, speed: f32) -> Self {
		Self {
			id,
			kind,
			speed,
			position,
			path: Vec::new(),
			cursor: 0,
			cargo: None,
			target: None,
			state: VehicleState::Idle,
			leg: Leg::Outbound,
		}
	}

	pub fn id(&self) -> VehicleId {
		self.id
	}

	pub fn kind(&self) -> VehicleKind {
		self.kind
	}

	pub fn position(&self) -> WorldPos {
		self.position
	}

	pub fn path(&self) -> &[WorldPos] {
		&self.path
	}

	pub fn cursor(&self) -> usize {
		self.cursor
	}

	pub fn cargo(&self) -> Option<OrderId> {
		self.cargo
	}

	pub fn target(&self) -> Option<NodeId> {
		self.target
	}

	pub fn state(&self) -> VehicleState {
		self.state
	}

	pub fn leg(&self) -> Leg {
		self.leg
	}

	pub fn is_carrying(&self) -> bool {
		self.cargo.is_some()
	}

	/// Idle and empty, i.e. ready for new work.
	pub fn is_available(&self) -> bool {
		self.state == VehicleState::Idle && self.cargo.is_none()
	}

	pub fn has_pending_waypoints(&self) -> bool {
		self.cursor < self.path.len()
	}

	pub fn snapshot(&self) -> VehicleSnapshot {
		VehicleSnapshot {
			id: self.id,
			kind: self.kind,
			position: self.position,
			carrying: self.is_carrying(),
			state: self.state,
		}
	}

	pub fn set_path(&mut self, path: Vec<WorldPos>) {
		self.path = path;
		self.cursor = 0;
		self.state = VehicleState::Moving;
	}

	/// Takes on `order` and starts along `path`. Does nothing unless the
	/// vehicle is available.
	pub fn load(&mut self, order: OrderId, target: Option<NodeId>, path: Vec<WorldPos>) -> bool {
		if !self.is_available() {
			return false;
		}
		self.cargo = Some(order);
		self.target = target;
		self.leg = Leg::Outbound;
		self.set_path(path);
		true
	}

	/// Sends an aerial vehicle that finished a delivery back along `path`.
	pub fn begin_return(&mut self, path: Vec<WorldPos>) -> bool {
		if self.kind != VehicleKind::Aerial || self.leg != Leg::Returning || self.cargo.is_some() {
			return false;
		}
		self.set_path(path);
		true
	}

	/// Moves toward the current waypoint by `speed * dt`. Returns true on the
	/// call that consumes the last waypoint.
	pub fn advance(&mut self, dt: f32) -> bool {
		let Some(&waypoint) = self.path.get(self.cursor) else {
			return false;
		};
		if !self.position.step_towards(waypoint, self.speed * dt) {
			return false;
		}
		self.cursor += 1;
		self.cursor >= self.path.len()
	}

	/// Applies the end-of-path transition for this vehicle's kind.
	pub fn on_arrival(&mut self, world: &World) -> Transition {
		match self.kind {
			VehicleKind::Ground => self.ground_arrival(world),
			VehicleKind::Aerial => self.aerial_arrival(world),
		}
	}

	fn ground_arrival(&mut self, world: &World) -> Transition {
		match self.cargo {
			Some(order) if self.is_at(world.depot()) => {
				self.cargo = None;
				self.target = None;
				self.state = VehicleState::Idle;
				Transition::DroppedAtDepot { order }
			}
			None if self.is_at(world.start()) => {
				self.state = VehicleState::Idle;
				Transition::ReturnedToStart
			}
			_ => Transition::None,
		}
	}

	fn aerial_arrival(&mut self, world: &World) -> Transition {
		match (self.cargo, self.target.and_then(|t| world.node(t))) {
			(Some(order), Some(house)) if house.role.is_house() && self.is_at(house) => {
				let house = house.id;
				self.cargo = None;
				self.target = None;
				self.leg = Leg::Returning;
				Transition::Delivered { order, house }
			}
			(None, _) if self.is_at(world.depot()) => {
				self.state = VehicleState::Idle;
				self.leg = Leg::Outbound;
				Transition::ReturnedToDepot
			}
			_ => Transition::None,
		}
	}

	fn is_at(&self, node: &Node) -> bool {
		self.position.near_xz(node.position, NODE_SNAP_TOLERANCE)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::coords::GridFrame;
	use crate::node::NodeRole;

	// 3x3 lattice at spacing 1: start (0,0), depot node 4 at (1,1), house node 8 at (2,2).
	fn world() -> World {
		let mut roles = vec![NodeRole::Road; 9];
		roles[4] = NodeRole::Depot;
		roles[8] = NodeRole::House;
		World::from_roles(GridFrame::new(3, 1.0, 0.0, 0.0), roles).unwrap()
	}

	fn run_to_end(v: &mut Vehicle) -> usize {
		let mut ticks = 0;
		while !v.advance(1.0) {
			ticks += 1;
			assert!(ticks < 1000, "vehicle never arrived");
		}
		ticks + 1
	}

	#[test]
	fn vehicle_init() {
		let v = Vehicle::new(1, VehicleKind::Ground, WorldPos::default(), 0.5);
		assert_eq!(v.id(), 1);
		assert_eq!(v.state(), VehicleState::Idle);
		assert!(v.is_available());
		assert!(v.cargo().is_none());
	}

	#[test]
	fn empty_path_is_inert() {
		let mut v = Vehicle::new(1, VehicleKind::Ground, WorldPos::on_ground(0.5, 0.5), 0.5);
		assert!(!v.advance(1.0));
		v.set_path(Vec::new());
		assert!(!v.advance(1.0));
		assert_eq!(v.position(), WorldPos::on_ground(0.5, 0.5));
	}

	#[test]
	fn movement_snaps_to_waypoints() {
		let mut v = Vehicle::new(1, VehicleKind::Ground, WorldPos::default(), 0.3);
		v.set_path(vec![WorldPos::on_ground(1.0, 0.0), WorldPos::on_ground(1.0, 1.0)]);
		let ticks = run_to_end(&mut v);
		// Each unit leg takes four steps of 0.3.
		assert_eq!(ticks, 8);
		assert_eq!(v.position(), WorldPos::on_ground(1.0, 1.0));
		assert_eq!(v.cursor(), 2);
		assert!(!v.advance(1.0));
	}

	#[test]
	fn ground_drop_off_at_depot() {
		let w = world();
		let mut v = Vehicle::new(1, VehicleKind::Ground, w.start().position, 0.25);
		assert!(v.load(7, None, vec![w.start().position, w.node(1).unwrap().position, w.depot().position]));
		run_to_end(&mut v);
		assert_eq!(v.on_arrival(&w), Transition::DroppedAtDepot { order: 7 });
		assert!(v.is_available());
	}

	#[test]
	fn ground_return_to_start() {
		let w = world();
		let mut v = Vehicle::new(1, VehicleKind::Ground, w.depot().position, 0.25);
		v.set_path(vec![w.depot().position, w.node(3).unwrap().position, w.start().position]);
		run_to_end(&mut v);
		assert_eq!(v.on_arrival(&w), Transition::ReturnedToStart);
		assert_eq!(v.state(), VehicleState::Idle);
	}

	#[test]
	fn ground_cargo_is_not_released_away_from_depot() {
		let w = world();
		let mut v = Vehicle::new(1, VehicleKind::Ground, w.start().position, 0.25);
		v.load(7, None, vec![w.node(1).unwrap().position]);
		run_to_end(&mut v);
		assert_eq!(v.on_arrival(&w), Transition::None);
		assert_eq!(v.cargo(), Some(7));
	}

	#[test]
	fn aerial_delivery_then_return() {
		let w = world();
		let house = w.node(8).unwrap();
		let mut v = Vehicle::new(2, VehicleKind::Aerial, w.depot().position, 0.4);
		assert!(v.load(3, Some(8), vec![house.position]));
		run_to_end(&mut v);
		assert_eq!(v.on_arrival(&w), Transition::Delivered { order: 3, house: 8 });
		assert_eq!(v.leg(), Leg::Returning);
		assert!(!v.is_available());

		assert!(v.begin_return(vec![w.depot().position]));
		run_to_end(&mut v);
		assert_eq!(v.on_arrival(&w), Transition::ReturnedToDepot);
		assert!(v.is_available());
		assert_eq!(v.leg(), Leg::Outbound);
	}

	#[test]
	fn loading_while_carrying_is_a_no_op() {
		let w = world();
		let mut v = Vehicle::new(2, VehicleKind::Aerial, w.depot().position, 0.4);
		assert!(v.load(3, Some(8), vec![w.node(8).unwrap().position]));
		assert!(!v.load(4, Some(8), vec![w.start().position]));
		assert_eq!(v.cargo(), Some(3));
		assert_eq!(v.path(), &[w.node(8).unwrap().position]);
	}

	#[test]
	fn return_requires_finished_delivery() {
		let w = world();
		let mut v = Vehicle::new(2, VehicleKind::Aerial, w.depot().position, 0.4);
		assert!(!v.begin_return(vec![w.depot().position]));
		let mut g = Vehicle::new(1, VehicleKind::Ground, w.start().position, 0.4);
		assert!(!g.begin_return(vec![w.depot().position]));
		assert_eq!(g.state(), VehicleState::Idle);
	}
}
