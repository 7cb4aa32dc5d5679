//! Logical simulation time.
//!
//! The clock counts ticks and owns a FIFO queue of delayed actions keyed by
//! the tick they fire on. Nothing here reads wall-clock time; callers that run
//! at a display refresh rate feed elapsed seconds into [`Clock::accumulate`]
//! and get back whole fixed steps to run.

use crate::vehicles::VehicleId;

pub type Tick = u64;

/// Deferred fleet work, carried out by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchAction {
	/// A ground vehicle back at the start looks for a pending order.
	AttemptPickup(VehicleId),
	/// Match an idle aerial vehicle with a staged package.
	AttemptAerialDispatch,
	/// An aerial vehicle that finished a delivery heads back to the depot.
	ReturnToDepot(VehicleId),
}

/// Work deferred to a later tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
	Dispatch(DispatchAction),
	PlaceOrder,
	/// Roll for an automatic order and schedule the next roll.
	AutoOrder,
}

impl From<DispatchAction> for ScheduledAction {
	fn from(action: DispatchAction) -> Self {
		ScheduledAction::Dispatch(action)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scheduled {
	fire_at: Tick,
	action: ScheduledAction,
}

#[derive(Debug, Clone)]
pub struct Clock {
	now: Tick,
	running: bool,
	step_seconds: f32,
	accumulator: f32,
	queue: Vec<Scheduled>,
}

impl Clock {
	pub fn new(ticks_per_second: u32) -> Self {
		Self {
			now: 0,
			running: false,
			step_seconds: 1.0 / ticks_per_second.max(1) as f32,
			accumulator: 0.0,
			queue: Vec::new(),
		}
	}

	pub fn now(&self) -> Tick {
		self.now
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn step_seconds(&self) -> f32 {
		self.step_seconds
	}

	pub fn pending(&self) -> usize {
		self.queue.len()
	}

	pub fn start(&mut self) {
		self.running = true;
	}

	/// Stops the clock and drops every queued action unfired.
	pub fn reset(&mut self) {
		self.running = false;
		self.now = 0;
		self.accumulator = 0.0;
		self.queue.clear();
	}

	/// Moves to the next tick and returns it.
	pub fn advance_tick(&mut self) -> Tick {
		self.now += 1;
		self.now
	}

	/// Queues `action` to fire `delay` ticks from now. A zero delay fires on
	/// the current tick if its due actions have not been taken yet, otherwise
	/// on the next one.
	pub fn schedule(&mut self, delay: u64, action: impl Into<ScheduledAction>) -> Tick {
		let action = action.into();
		let fire_at = self.now + delay;
		tracing::debug!(?action, fire_at, "scheduled");
		self.queue.push(Scheduled { fire_at, action });
		fire_at
	}

	/// Removes and returns every action due at or before now, in the order
	/// they were scheduled.
	pub fn take_due(&mut self) -> Vec<ScheduledAction> {
		let now = self.now;
		let mut due = Vec::new();
		self.queue.retain(|s| {
			if s.fire_at <= now {
				due.push(s.action);
				false
			} else {
				true
			}
		});
		due
	}

	/// Adds elapsed real time and returns how many fixed steps are now owed.
	/// Negative or non-finite time is ignored.
	pub fn accumulate(&mut self, elapsed_seconds: f32) -> u32 {
		if !self.running || !elapsed_seconds.is_finite() || elapsed_seconds <= 0.0 {
			return 0;
		}
		self.accumulator += elapsed_seconds;
		let steps = (self.accumulator / self.step_seconds).floor();
		self.accumulator -= steps * self.step_seconds;
		steps as u32
	}
}
