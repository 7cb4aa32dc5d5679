use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::coords::WorldPos;
use crate::orders::OrderId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub order_id: OrderId,
    pub position: WorldPos,
}

/// Packages waiting at the depot, handed out in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PackageRegistry {
    staged: VecDeque<Package>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self { staged: VecDeque::new() }
    }

    pub fn stage(&mut self, order_id: OrderId, position: WorldPos) {
        self.staged.push_back(Package { order_id, position });
    }

    pub fn take_first(&mut self) -> Option<Package> {
        self.staged.pop_front()
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.staged.iter()
    }

    pub fn clear(&mut self) {
        self.staged.clear();
    }
}
