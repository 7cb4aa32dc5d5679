use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::node::NodeId;
use crate::world::World;

pub type OrderId = u32;

/// Lifecycle of an order. Variants are ordered so that a status can only move
/// forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Assigned,
    Delivered,
}

impl OrderStatus {
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Waiting",
            OrderStatus::Assigned => "In Progress",
            OrderStatus::Delivered => "Delivered",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub house_id: NodeId,
    pub status: OrderStatus,
}

impl Order {
    pub fn description(&self) -> String {
        format!("Order #{} - House at node {}", self.id, self.house_id)
    }
}

/// Orders in insertion order. Selection is a linear "first eligible" scan,
/// which is fine for the handful of orders a run accumulates.
#[derive(Debug, Clone)]
pub struct OrderRegistry {
    orders: Vec<Order>,
    next_id: OrderId,
}

impl Default for OrderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderRegistry {
    pub fn new() -> Self {
        Self { orders: Vec::new(), next_id: 1 }
    }

    pub fn clear(&mut self) {
        self.orders.clear();
        self.next_id = 1;
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Records a new pending order for `house_id`.
    pub fn place(&mut self, world: &World, house_id: NodeId) -> Result<Order, SimError> {
        if world.house_count() == 0 {
            return Err(SimError::NoHousesAvailable);
        }
        if !world.node(house_id).is_some_and(|n| n.role.is_house()) {
            return Err(SimError::NotAHouse(house_id));
        }
        let order = Order { id: self.next_id, house_id, status: OrderStatus::Pending };
        self.next_id += 1;
        self.orders.push(order);
        Ok(order)
    }

    pub fn next_pending(&self) -> Option<&Order> {
        self.orders.iter().find(|o| o.status == OrderStatus::Pending)
    }

    pub fn any_pending(&self) -> bool {
        self.next_pending().is_some()
    }

    pub fn mark_assigned(&mut self, id: OrderId) -> Result<(), SimError> {
        self.advance(id, OrderStatus::Pending, OrderStatus::Assigned)
    }

    pub fn mark_delivered(&mut self, id: OrderId) -> Result<(), SimError> {
        self.advance(id, OrderStatus::Assigned, OrderStatus::Delivered)
    }

    pub fn count_with(&self, status: OrderStatus) -> usize {
        self.orders.iter().filter(|o| o.status == status).count()
    }

    // Moves `id` from `from` to `to`; any other current status is left alone.
    fn advance(&mut self, id: OrderId, from: OrderStatus, to: OrderStatus) -> Result<(), SimError> {
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(SimError::UnknownOrder(id))?;
        if order.status == from {
            order.status = to;
        }
        Ok(())
    }
}
