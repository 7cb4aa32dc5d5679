use serde::{Deserialize, Serialize};

/// Integer cell on the delivery lattice. `x` is the column, `z` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub z: i32,
}

impl GridCell {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub fn manhattan(self, other: GridCell) -> u32 {
        self.x.abs_diff(other.x) + self.z.abs_diff(other.z)
    }
}

/// Continuous world-space position. Everything in the core lives on the
/// ground plane (`y == 0`); `y` is kept so snapshots match the 3D layout.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPos {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn on_ground(x: f32, z: f32) -> Self {
        Self { x, y: 0.0, z }
    }

    pub fn distance_xz(self, other: WorldPos) -> f32 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        (dx * dx + dz * dz).sqrt()
    }

    pub fn near_xz(self, other: WorldPos, tolerance: f32) -> bool {
        (self.x - other.x).abs() < tolerance && (self.z - other.z).abs() < tolerance
    }

    /// Steps toward `target` by at most `step`. Returns true when the target
    /// was reached, in which case the position equals `target` exactly.
    pub fn step_towards(&mut self, target: WorldPos, step: f32) -> bool {
        let distance = self.distance_xz(target);
        if distance <= step {
            self.x = target.x;
            self.z = target.z;
            return true;
        }
        self.x += (target.x - self.x) / distance * step;
        self.z += (target.z - self.z) / distance * step;
        false
    }
}

/// Placement of an `size x size` lattice in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridFrame {
    pub size: u32,
    pub spacing: f32,
    pub origin_x: f32,
    pub origin_z: f32,
}

impl GridFrame {
    pub fn new(size: u32, spacing: f32, origin_x: f32, origin_z: f32) -> Self {
        Self { size, spacing, origin_x, origin_z }
    }

    pub fn cell_count(&self) -> usize {
        (self.size as usize) * (self.size as usize)
    }

    pub fn contains(&self, c: GridCell) -> bool {
        let n = self.size as i32;
        c.x >= 0 && c.z >= 0 && c.x < n && c.z < n
    }

    pub fn to_world(&self, c: GridCell) -> WorldPos {
        WorldPos::on_ground(
            self.origin_x + c.x as f32 * self.spacing,
            self.origin_z + c.z as f32 * self.spacing,
        )
    }

    /// Inverse of [`GridFrame::to_world`]; `None` outside the lattice.
    pub fn to_cell(&self, p: WorldPos) -> Option<GridCell> {
        let c = GridCell {
            x: ((p.x - self.origin_x) / self.spacing).round() as i32,
            z: ((p.z - self.origin_z) / self.spacing).round() as i32,
        };
        self.contains(c).then_some(c)
    }

    /// Row-major index: `z * size + x`.
    pub fn index(&self, c: GridCell) -> Option<usize> {
        if !self.contains(c) {
            return None;
        }
        Some((c.z as usize) * (self.size as usize) + c.x as usize)
    }

    pub fn cell_at(&self, index: usize) -> Option<GridCell> {
        if index >= self.cell_count() {
            return None;
        }
        let n = self.size as usize;
        Some(GridCell { x: (index % n) as i32, z: (index / n) as i32 })
    }
}
