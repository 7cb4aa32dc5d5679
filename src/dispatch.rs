//! Matching vehicles with work and reacting to finished legs.
//!
//! Assignment is greedy: the first available vehicle of the right kind takes
//! the first eligible work item. No batching or cost-based routing.

use rand::Rng;
use rand::rngs::StdRng;

use crate::clock::{Clock, DispatchAction};
use crate::config::SimConfig;
use crate::coords::WorldPos;
use crate::error::SimError;
use crate::events::{LogEvent, LogKind};
use crate::orders::{OrderRegistry, OrderStatus};
use crate::packages::PackageRegistry;
use crate::pathfinder::{Navigator, Pathfinder};
use crate::vehicles::{Transition, Vehicle, VehicleId, VehicleKind};
use crate::world::World;

/// Everything dispatch reads or mutates besides the fleet itself.
pub struct DispatchContext<'a> {
	pub world: &'a World,
	pub navigator: &'a Navigator,
	pub pathfinder: &'a dyn Pathfinder,
	pub orders: &'a mut OrderRegistry,
	pub packages: &'a mut PackageRegistry,
	pub clock: &'a mut Clock,
	pub config: &'a SimConfig,
	pub rng: &'a mut StdRng,
	pub outbox: &'a mut Vec<LogEvent>,
}

impl DispatchContext<'_> {
	fn emit(&mut self, kind: LogKind, message: String) {
		self.outbox.push(LogEvent::new(self.clock.now(), kind, message));
	}

	fn package_drop_point(&mut self) -> WorldPos {
		let depot = self.world.depot().position;
		let r = self.config.package_scatter;
		if !(r > 0.0) || !r.is_finite() {
			return depot;
		}
		WorldPos::on_ground(depot.x + self.rng.gen_range(-r..=r), depot.z + self.rng.gen_range(-r..=r))
	}
}

#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
	vehicles: Vec<Vehicle>,
}

impl Dispatcher {
	pub fn new() -> Self {
		Self { vehicles: Vec::new() }
	}

	/// Replaces the fleet: ground vehicles at the start node, aerial ones at
	/// the depot. Ids are 1-based, ground first.
	pub fn spawn(&mut self, world: &World, config: &SimConfig) {
		self.vehicles.clear();
		let mut next_id: VehicleId = 1;
		for _ in 0..config.ground_vehicles {
			self.vehicles.push(Vehicle::new(next_id, VehicleKind::Ground, world.start().position, config.ground_speed));
			next_id += 1;
		}
		for _ in 0..config.aerial_vehicles {
			self.vehicles.push(Vehicle::new(next_id, VehicleKind::Aerial, world.depot().position, config.aerial_speed));
			next_id += 1;
		}
	}

	pub fn clear(&mut self) {
		self.vehicles.clear();
	}

	pub fn vehicles(&self) -> &[Vehicle] {
		&self.vehicles
	}

	pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
		self.vehicles.iter().find(|v| v.id() == id)
	}

	fn index_of(&self, id: VehicleId) -> Option<usize> {
		self.vehicles.iter().position(|v| v.id() == id)
	}

	/// Moves every vehicle one step and applies arrival transitions.
	pub fn advance_vehicles(&mut self, dt: f32, ctx: &mut DispatchContext<'_>) -> Result<(), SimError> {
		for idx in 0..self.vehicles.len() {
			if self.vehicles[idx].advance(dt) {
				let transition = self.vehicles[idx].on_arrival(ctx.world);
				self.apply_transition(idx, transition, ctx)?;
			}
		}
		Ok(())
	}

	/// Every available ground vehicle tries to pick up a pending order.
	pub fn dispatch_ground(&mut self, ctx: &mut DispatchContext<'_>) -> Result<(), SimError> {
		for idx in 0..self.vehicles.len() {
			if self.vehicles[idx].kind() == VehicleKind::Ground {
				self.try_pickup(idx, ctx)?;
			}
		}
		Ok(())
	}

	pub fn handle(&mut self, action: DispatchAction, ctx: &mut DispatchContext<'_>) -> Result<(), SimError> {
		match action {
			DispatchAction::AttemptPickup(id) => {
				if let Some(idx) = self.index_of(id) {
					self.try_pickup(idx, ctx)?;
				}
			}
			DispatchAction::AttemptAerialDispatch => {
				self.assign_aerial(ctx)?;
			}
			DispatchAction::ReturnToDepot(id) => {
				let depot = ctx.world.depot().position;
				if let Some(idx) = self.index_of(id) {
					if self.vehicles[idx].begin_return(vec![depot]) {
						tracing::debug!(vehicle = id, "returning to depot");
					}
				}
			}
		}
		Ok(())
	}

	/// Loads the first pending order onto the ground vehicle at `idx` and
	/// routes it to the depot. Returns whether an order was picked up.
	pub fn try_pickup(&mut self, idx: usize, ctx: &mut DispatchContext<'_>) -> Result<bool, SimError> {
		let Some(vehicle) = self.vehicles.get(idx) else {
			return Ok(false);
		};
		if vehicle.kind() != VehicleKind::Ground || !vehicle.is_available() {
			return Ok(false);
		}
		let Some(order) = ctx.orders.next_pending().copied() else {
			return Ok(false);
		};

		let world = ctx.world;
		let origin = world.node_at(vehicle.position()).unwrap_or(world.start());
		let (path, direct) = ctx.navigator.route_or_direct(ctx.pathfinder, origin, world.depot());
		ctx.orders.mark_assigned(order.id)?;
		let who = format!("{} {}", vehicle.kind().label(), vehicle.id());
		self.vehicles[idx].load(order.id, None, path);

		let message = if direct {
			format!("{who} picked up order {} (direct route)", order.id)
		} else {
			format!("{who} picked up order {} for house {}", order.id, order.house_id)
		};
		ctx.emit(LogKind::GroundPickup, message);
		Ok(true)
	}

	/// Hands the first staged package to the first available aerial vehicle
	/// and sends it straight to the order's house.
	pub fn assign_aerial(&mut self, ctx: &mut DispatchContext<'_>) -> Result<bool, SimError> {
		let Some(idx) = self
			.vehicles
			.iter()
			.position(|v| v.kind() == VehicleKind::Aerial && v.is_available())
		else {
			return Ok(false);
		};
		let Some(package) = ctx.packages.take_first() else {
			return Ok(false);
		};
		let order = *ctx
			.orders
			.get(package.order_id)
			.ok_or(SimError::UnknownOrder(package.order_id))?;
		if order.status == OrderStatus::Delivered {
			tracing::warn!(order = order.id, "discarding package for an already delivered order");
			return Ok(false);
		}
		let house = ctx
			.world
			.node(order.house_id)
			.filter(|n| n.role.is_house())
			.ok_or(SimError::NotAHouse(order.house_id))?;

		let vehicle = &mut self.vehicles[idx];
		vehicle.load(order.id, Some(house.id), vec![house.position]);
		let who = format!("{} {}", vehicle.kind().label(), vehicle.id());
		ctx.emit(LogKind::AerialPickup, format!("{who} picked up package for order {}", order.id));
		Ok(true)
	}

	fn apply_transition(&mut self, idx: usize, transition: Transition, ctx: &mut DispatchContext<'_>) -> Result<(), SimError> {
		let id = self.vehicles[idx].id();
		let who = format!("{} {id}", self.vehicles[idx].kind().label());
		let pause = ctx.config.return_pause_ticks;
		match transition {
			Transition::DroppedAtDepot { order } => {
				let drop_point = ctx.package_drop_point();
				ctx.packages.stage(order, drop_point);
				ctx.emit(LogKind::DepotDropOff, format!("{who} dropped order {order} at the depot"));

				let world = ctx.world;
				let (path, _) = ctx.navigator.route_or_direct(ctx.pathfinder, world.depot(), world.start());
				self.vehicles[idx].set_path(path);
				ctx.clock.schedule(ctx.config.depot_load_delay_ticks, DispatchAction::AttemptAerialDispatch);
			}
			Transition::ReturnedToStart => {
				ctx.clock.schedule(pause, DispatchAction::AttemptPickup(id));
			}
			Transition::Delivered { order, house } => {
				ctx.orders.mark_delivered(order)?;
				ctx.emit(LogKind::Delivered, format!("{who} delivered order {order} to house {house}"));
				ctx.clock.schedule(pause, DispatchAction::ReturnToDepot(id));
			}
			Transition::ReturnedToDepot => {
				ctx.clock.schedule(pause, DispatchAction::AttemptAerialDispatch);
			}
			Transition::None => {
				tracing::debug!(vehicle = id, "path finished away from a stop");
			}
		}
		Ok(())
	}
}
