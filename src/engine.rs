use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, ScheduledAction, Tick};
use crate::config::SimConfig;
use crate::dispatch::{DispatchContext, Dispatcher};
use crate::error::SimError;
use crate::events::{LogEvent, LogKind};
use crate::hud::SimStats;
use crate::node::{Edge, Node, NodeId};
use crate::orders::{Order, OrderRegistry, OrderStatus};
use crate::packages::{Package, PackageRegistry};
use crate::pathfinder::{AStar, Navigator, Pathfinder};
use crate::vehicles::{Vehicle, VehicleSnapshot};
use crate::world::World;

/// Static layout handed to presentation code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
	pub depot: Node,
}

pub type EventSink = Box<dyn FnMut(&LogEvent)>;

/// One self-contained simulation. All world, order, package and vehicle state
/// lives here; callers observe it through snapshots and subscribed sinks.
pub struct Engine {
	config: SimConfig,
	pathfinder: Box<dyn Pathfinder>,
	world: Option<World>,
	navigator: Option<Navigator>,
	orders: OrderRegistry,
	packages: PackageRegistry,
	dispatcher: Dispatcher,
	clock: Clock,
	rng: StdRng,
	log: Vec<LogEvent>,
	sinks: Vec<EventSink>,
}

impl Engine {
	pub fn new(config: SimConfig) -> Result<Self, SimError> {
		Self::with_pathfinder(config, Box::new(AStar))
	}

	pub fn with_pathfinder(config: SimConfig, pathfinder: Box<dyn Pathfinder>) -> Result<Self, SimError> {
		config.validate()?;
		Ok(Self {
			clock: Clock::new(config.ticks_per_second),
			rng: seeded_rng(config.seed),
			config,
			pathfinder,
			world: None,
			navigator: None,
			orders: OrderRegistry::new(),
			packages: PackageRegistry::new(),
			dispatcher: Dispatcher::new(),
			log: Vec::new(),
			sinks: Vec::new(),
		})
	}

	pub fn subscribe(&mut self, sink: impl FnMut(&LogEvent) + 'static) {
		self.sinks.push(Box::new(sink));
	}

	// ---------- Commands ----------

	/// Generates a fresh world and starts the clock. No-op while running.
	pub fn start(&mut self) -> Result<(), SimError> {
		if self.clock.is_running() {
			return Ok(());
		}
		self.rng = seeded_rng(self.config.seed);
		let world = World::generate(self.config.frame(), self.config.role_chances(), &mut self.rng)?;
		self.launch(world)
	}

	/// Starts on a caller-supplied layout instead of a generated one.
	pub fn start_with_world(&mut self, world: World) -> Result<(), SimError> {
		if self.clock.is_running() {
			return Ok(());
		}
		self.rng = seeded_rng(self.config.seed);
		self.launch(world)
	}

	/// Stops the clock, drops queued actions unfired and empties every
	/// collection.
	pub fn reset(&mut self) {
		self.clock.reset();
		self.world = None;
		self.navigator = None;
		self.orders.clear();
		self.packages.clear();
		self.dispatcher.clear();
		self.log.clear();
		let now = self.clock.now();
		self.publish(LogEvent::new(now, LogKind::SimulationReset, "Simulation reset"));
	}

	/// Places an order for a random house.
	pub fn place_order(&mut self) -> Result<Order, SimError> {
		let world = self.world.as_ref().ok_or(SimError::NoHousesAvailable)?;
		let houses: Vec<NodeId> = world.houses().map(|n| n.id).collect();
		if houses.is_empty() {
			return Err(SimError::NoHousesAvailable);
		}
		let house = houses[self.rng.gen_range(0..houses.len())];
		let order = self.orders.place(world, house)?;
		let now = self.clock.now();
		self.publish(LogEvent::new(
			now,
			LogKind::OrderPlaced,
			format!("Order placed for house {} (Order ID: {})", order.house_id, order.id),
		));
		Ok(order)
	}

	/// Runs one pass: move vehicles, dispatch idle ground vehicles, then fire
	/// due delayed actions. Does nothing while stopped. A negative or
	/// non-finite `dt` is rejected before anything moves.
	pub fn tick(&mut self, dt: f32) -> Result<(), SimError> {
		if !dt.is_finite() || dt < 0.0 {
			return Err(SimError::Configuration(format!("tick step must be finite and non-negative, got {dt}")));
		}
		if !self.clock.is_running() {
			return Ok(());
		}
		self.clock.advance_tick();
		self.with_dispatch(|d, ctx| d.advance_vehicles(dt, ctx))?;
		self.with_dispatch(|d, ctx| d.dispatch_ground(ctx))?;
		for action in self.clock.take_due() {
			self.fire(action)?;
		}
		Ok(())
	}

	/// Converts elapsed real time into fixed ticks and runs them. Returns the
	/// number of ticks run.
	pub fn advance(&mut self, elapsed_seconds: f32) -> Result<u32, SimError> {
		let steps = self.clock.accumulate(elapsed_seconds);
		let dt = self.clock.step_seconds();
		for _ in 0..steps {
			self.tick(dt)?;
		}
		Ok(steps)
	}

	/// Runs `ticks` fixed steps regardless of wall time.
	pub fn run_ticks(&mut self, ticks: u64) -> Result<(), SimError> {
		let dt = self.config.tick_seconds();
		for _ in 0..ticks {
			self.tick(dt)?;
		}
		Ok(())
	}

	// ---------- Queries ----------

	pub fn config(&self) -> &SimConfig {
		&self.config
	}

	pub fn is_running(&self) -> bool {
		self.clock.is_running()
	}

	pub fn now(&self) -> Tick {
		self.clock.now()
	}

	pub fn pending_actions(&self) -> usize {
		self.clock.pending()
	}

	pub fn world(&self) -> Option<&World> {
		self.world.as_ref()
	}

	pub fn world_snapshot(&self) -> Option<WorldSnapshot> {
		self.world.as_ref().map(|w| WorldSnapshot {
			nodes: w.nodes().to_vec(),
			edges: w.edges().to_vec(),
			depot: *w.depot(),
		})
	}

	pub fn vehicles(&self) -> &[Vehicle] {
		self.dispatcher.vehicles()
	}

	pub fn vehicle_snapshots(&self) -> Vec<VehicleSnapshot> {
		self.dispatcher.vehicles().iter().map(Vehicle::snapshot).collect()
	}

	pub fn order_summaries(&self) -> Vec<Order> {
		self.orders.iter().copied().collect()
	}

	pub fn packages(&self) -> Vec<Package> {
		self.packages.iter().copied().collect()
	}

	pub fn log(&self) -> &[LogEvent] {
		&self.log
	}

	pub fn stats(&self) -> SimStats {
		SimStats {
			total_orders: self.orders.len(),
			delivered_orders: self.orders.count_with(OrderStatus::Delivered),
			active_vehicles: self.dispatcher.vehicles().len(),
			packages_in_transit: self.packages.len(),
		}
	}

	// ---------- Internals ----------

	fn launch(&mut self, world: World) -> Result<(), SimError> {
		self.clock.reset();
		self.orders.clear();
		self.packages.clear();
		self.dispatcher.spawn(&world, &self.config);
		self.navigator = Some(Navigator::new(&world));
		tracing::info!(
			size = world.frame().size,
			depot = world.depot().id,
			houses = world.house_count(),
			"world ready"
		);
		self.world = Some(world);

		self.clock.start();
		self.clock.schedule(self.config.initial_order_delay_ticks, ScheduledAction::PlaceOrder);
		if self.config.auto_orders {
			self.clock.schedule(self.config.auto_order_interval_ticks, ScheduledAction::AutoOrder);
		}
		let now = self.clock.now();
		self.publish(LogEvent::new(now, LogKind::SimulationStarted, "Simulation started"));
		Ok(())
	}

	fn fire(&mut self, action: ScheduledAction) -> Result<(), SimError> {
		match action {
			ScheduledAction::PlaceOrder => self.place_scheduled_order(),
			ScheduledAction::AutoOrder => {
				if self.rng.gen_bool(self.config.auto_order_chance) {
					self.place_scheduled_order()?;
				}
				self.clock.schedule(self.config.auto_order_interval_ticks, ScheduledAction::AutoOrder);
				Ok(())
			}
			ScheduledAction::Dispatch(action) => self.with_dispatch(|d, ctx| d.handle(action, ctx)),
		}
	}

	fn place_scheduled_order(&mut self) -> Result<(), SimError> {
		match self.place_order() {
			Ok(_) => Ok(()),
			Err(SimError::NoHousesAvailable) => {
				tracing::warn!("no houses available, skipping scheduled order");
				Ok(())
			}
			Err(e) => Err(e),
		}
	}

	fn with_dispatch(
		&mut self,
		f: impl FnOnce(&mut Dispatcher, &mut DispatchContext<'_>) -> Result<(), SimError>,
	) -> Result<(), SimError> {
		let (Some(world), Some(navigator)) = (self.world.as_ref(), self.navigator.as_ref()) else {
			return Ok(());
		};
		let mut outbox = Vec::new();
		let result = {
			let mut ctx = DispatchContext {
				world,
				navigator,
				pathfinder: self.pathfinder.as_ref(),
				orders: &mut self.orders,
				packages: &mut self.packages,
				clock: &mut self.clock,
				config: &self.config,
				rng: &mut self.rng,
				outbox: &mut outbox,
			};
			f(&mut self.dispatcher, &mut ctx)
		};
		for event in outbox {
			self.publish(event);
		}
		result
	}

	fn publish(&mut self, event: LogEvent) {
		tracing::info!(tick = event.tick, kind = ?event.kind, "{}", event.message);
		for sink in &mut self.sinks {
			sink(&event);
		}
		self.log.push(event);
	}
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
	match seed {
		Some(s) => StdRng::seed_from_u64(s),
		None => StdRng::from_entropy(),
	}
}
