use serde::{Deserialize, Serialize};

use crate::coords::GridFrame;
use crate::error::SimError;
use crate::world::RoleChances;

/// Tunables for one simulation run. Durations are in ticks, speeds in world
/// units per simulated second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub grid_size: u32,
    pub spacing: f32,
    pub origin_x: f32,
    pub origin_z: f32,
    pub depot_chance: f32,
    pub house_chance: f32,
    pub ticks_per_second: u32,
    pub ground_speed: f32,
    pub aerial_speed: f32,
    pub ground_vehicles: u32,
    pub aerial_vehicles: u32,
    /// Pause between a depot drop-off and the aerial dispatch attempt.
    pub depot_load_delay_ticks: u64,
    /// Pause after a vehicle finishes a leg before it looks for more work.
    pub return_pause_ticks: u64,
    pub initial_order_delay_ticks: u64,
    pub auto_orders: bool,
    pub auto_order_interval_ticks: u64,
    pub auto_order_chance: f64,
    /// Radius of the random offset applied to staged packages.
    pub package_scatter: f32,
    /// Fixed seed for reproducible runs; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_size: 6,
            spacing: 4.0,
            origin_x: -10.0,
            origin_z: -10.0,
            depot_chance: 0.1,
            house_chance: 0.2,
            ticks_per_second: 60,
            ground_speed: 3.0,
            aerial_speed: 4.8,
            ground_vehicles: 1,
            aerial_vehicles: 1,
            depot_load_delay_ticks: 30,
            return_pause_ticks: 60,
            initial_order_delay_ticks: 60,
            auto_orders: true,
            auto_order_interval_ticks: 240,
            auto_order_chance: 0.5,
            package_scatter: 1.0,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn from_json_str(s: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(s).map_err(|e| SimError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn frame(&self) -> GridFrame {
        GridFrame::new(self.grid_size, self.spacing, self.origin_x, self.origin_z)
    }

    pub fn role_chances(&self) -> RoleChances {
        RoleChances { depot: self.depot_chance, house: self.house_chance }
    }

    /// Seconds advanced by one fixed tick.
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.ticks_per_second as f32
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let fail = |msg: String| Err(SimError::Configuration(msg));
        if self.grid_size < 2 {
            return fail(format!("grid_size must be at least 2, got {}", self.grid_size));
        }
        if !(self.spacing > 0.0) || !self.spacing.is_finite() {
            return fail(format!("spacing must be positive and finite, got {}", self.spacing));
        }
        if !self.origin_x.is_finite() || !self.origin_z.is_finite() {
            return fail("origin must be finite".into());
        }
        if self.ticks_per_second == 0 {
            return fail("ticks_per_second must be positive".into());
        }
        for (name, speed) in [("ground_speed", self.ground_speed), ("aerial_speed", self.aerial_speed)] {
            if !(speed > 0.0) || !speed.is_finite() {
                return fail(format!("{name} must be positive and finite, got {speed}"));
            }
        }
        for (name, p) in [("depot_chance", self.depot_chance), ("house_chance", self.house_chance)] {
            if !(0.0..=1.0).contains(&p) {
                return fail(format!("{name} must be within [0, 1], got {p}"));
            }
        }
        if !(0.0..=1.0).contains(&self.auto_order_chance) {
            return fail(format!("auto_order_chance must be within [0, 1], got {}", self.auto_order_chance));
        }
        if self.auto_orders && self.auto_order_interval_ticks == 0 {
            return fail("auto_order_interval_ticks must be positive".into());
        }
        if self.ground_vehicles == 0 || self.aerial_vehicles == 0 {
            return fail("at least one vehicle of each kind is required".into());
        }
        if !(self.package_scatter >= 0.0) || !self.package_scatter.is_finite() {
            return fail(format!("package_scatter must be finite and not negative, got {}", self.package_scatter));
        }
        Ok(())
    }
}
