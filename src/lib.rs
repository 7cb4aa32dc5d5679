pub mod clock;
pub mod config;
pub mod coords;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod events;
pub mod hud;
pub mod node;
pub mod orders;
pub mod packages;
pub mod pathfinder;
pub mod vehicles;
pub mod world;

// Re-exports for convenience in tests and integration users.
pub use clock::{Clock, DispatchAction, ScheduledAction, Tick};
pub use config::SimConfig;
pub use coords::{GridCell, GridFrame, WorldPos};
pub use dispatch::Dispatcher;
pub use engine::{Engine, WorldSnapshot};
pub use error::SimError;
pub use events::{LogEvent, LogKind};
pub use hud::{SimStats, format_log_line, format_order_queue, format_stats};
pub use node::{Edge, Node, NodeId, NodeRole};
pub use orders::{Order, OrderId, OrderRegistry, OrderStatus};
pub use packages::{Package, PackageRegistry};
pub use pathfinder::{AStar, BreadthFirst, GridGraph, Navigator, Pathfinder};
pub use vehicles::{Leg, Transition, Vehicle, VehicleId, VehicleKind, VehicleSnapshot, VehicleState};
pub use world::{RoleChances, World};
