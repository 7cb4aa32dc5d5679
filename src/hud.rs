use serde::{Deserialize, Serialize};

use crate::events::LogEvent;
use crate::orders::{Order, OrderStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimStats {
	pub total_orders: usize,
	pub delivered_orders: usize,
	pub active_vehicles: usize,
	pub packages_in_transit: usize,
}

pub fn format_stats(stats: &SimStats) -> String {
	format!(
		"Orders: {} | Delivered: {} | Vehicles: {} | Packages: {}",
		stats.total_orders, stats.delivered_orders, stats.active_vehicles, stats.packages_in_transit
	)
}

/// One line per undelivered order, or a placeholder when there are none.
pub fn format_order_queue(orders: &[Order]) -> Vec<String> {
	let out: Vec<String> = orders
		.iter()
		.filter(|o| o.status != OrderStatus::Delivered)
		.map(|o| format!("{}: {}", o.description(), o.status.label()))
		.collect();
	if out.is_empty() {
		return vec!["No active orders".to_string()];
	}
	out
}

pub fn format_log_line(event: &LogEvent) -> String {
	format!("[tick {:>6}] {}", event.tick, event.message)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::events::LogKind;

	#[test]
	fn stats_format() {
		let s = format_stats(&SimStats { total_orders: 3, delivered_orders: 1, active_vehicles: 2, packages_in_transit: 0 });
		assert!(s.contains("Orders: 3"));
		assert!(s.contains("Delivered: 1"));
		assert!(s.contains("Vehicles: 2"));
		assert!(s.contains("Packages: 0"));
	}

	#[test]
	fn queue_lists_undelivered_orders() {
		let orders = vec![
			Order { id: 1, house_id: 5, status: OrderStatus::Delivered },
			Order { id: 2, house_id: 7, status: OrderStatus::Assigned },
			Order { id: 3, house_id: 5, status: OrderStatus::Pending },
		];
		let lines = format_order_queue(&orders);
		assert_eq!(
			lines,
			vec![
				"Order #2 - House at node 7: In Progress".to_string(),
				"Order #3 - House at node 5: Waiting".to_string(),
			]
		);
	}

	#[test]
	fn empty_queue_placeholder() {
		assert_eq!(format_order_queue(&[]), vec!["No active orders".to_string()]);
	}

	#[test]
	fn log_line_carries_tick() {
		let line = format_log_line(&LogEvent::new(42, LogKind::OrderPlaced, "Order placed"));
		assert!(line.contains("42"));
		assert!(line.ends_with("Order placed"));
	}
}
