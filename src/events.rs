use serde::{Deserialize, Serialize};

use crate::clock::Tick;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogKind {
	SimulationStarted,
	SimulationReset,
	OrderPlaced,
	GroundPickup,
	DepotDropOff,
	AerialPickup,
	Delivered,
}

/// A log-worthy happening, stamped with the tick it occurred on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
	pub tick: Tick,
	pub kind: LogKind,
	pub message: String,
}

impl LogEvent {
	pub fn new(tick: Tick, kind: LogKind, message: impl Into<String>) -> Self {
		Self { tick, kind, message: message.into() }
	}
}
