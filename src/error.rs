use thiserror::Error;

use crate::node::NodeId;
use crate::orders::OrderId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
	#[error("Configuration error: {0}")]
	Configuration(String),
	#[error("No houses available to place an order")]
	NoHousesAvailable,
	#[error("Unknown order: {0}")]
	UnknownOrder(OrderId),
	#[error("Node {0} is not a house")]
	NotAHouse(NodeId),
}
