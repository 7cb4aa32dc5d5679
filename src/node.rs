use serde::{Deserialize, Serialize};

use crate::coords::WorldPos;

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
	Road,
	House,
	Depot,
}

impl NodeRole {
	pub fn is_house(self) -> bool {
		matches!(self, NodeRole::House)
	}

	pub fn is_depot(self) -> bool {
		matches!(self, NodeRole::Depot)
	}

	pub fn label(self) -> &'static str {
		match self {
			NodeRole::Road => "road",
			NodeRole::House => "house",
			NodeRole::Depot => "depot",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
	pub id: NodeId,
	pub position: WorldPos,
	pub role: NodeRole,
}

/// Undirected connection between two nodes; `a < b` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
	pub a: NodeId,
	pub b: NodeId,
}

impl Edge {
	pub fn new(a: NodeId, b: NodeId) -> Self {
		if a <= b { Self { a, b } } else { Self { a: b, b: a } }
	}

	pub fn touches(&self, id: NodeId) -> bool {
		self.a == id || self.b == id
	}
}
