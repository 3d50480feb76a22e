//! Roll Block - a rolling-cuboid tile puzzle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (block rolling, tiles, bridges, levels)
//! - `settings`: Data-driven timing and rule configuration

pub mod settings;
pub mod sim;

pub use settings::{BridgeCycle, Settings, SettingsError};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (20 Hz)
    pub const SIM_DT: f64 = 0.05;
    /// Cadence of the staged tile reveal at level start
    pub const REVEAL_INTERVAL: f64 = 0.1;
    /// Maximum simulation steps per pump to prevent spiral of death
    pub const MAX_CATCHUP_TICKS: u32 = 8;

    /// Board dimensions (cells per side) for the shipped levels
    pub const BOARD_SIZE: usize = 14;
    /// Largest board a level pack may declare
    pub const MAX_BOARD_SIZE: usize = 64;
    /// World size of one grid cell
    pub const CELL_SIZE: f32 = 0.5;
    /// Tile slab thickness (tiles sit just below y = 0)
    pub const TILE_THICKNESS: f32 = 0.2;

    /// Block extents: the short side and the long side
    pub const BLOCK_UNIT: f32 = 0.5;
    pub const BLOCK_LONG: f32 = 1.0;
    /// Height above resting position the block spawns at
    pub const SPAWN_DROP: f32 = 0.5;

    /// Tip angle advance per tick (degrees)
    pub const ROLL_STEP_DEG: f32 = 10.0;
    /// Corrective roll advance per tick (degrees)
    pub const CORRECTIVE_STEP_DEG: f32 = 25.0;
    /// Angle at which a tip lands
    pub const TIP_COMPLETE_DEG: f32 = 90.0;
    /// Tumble advance while falling through a hole (degrees)
    pub const TUMBLE_STEP_DEG: f32 = 10.0;

    /// Vertical descent per tick for each falling state
    pub const HOLE_FALL_STEP: f32 = 0.5;
    pub const BREAK_FALL_STEP: f32 = 0.25;
    pub const TARGET_FALL_STEP: f32 = 0.25;
    pub const SETTLE_STEP: f32 = 0.05;
    /// Below this height the block has left the board
    pub const DEATH_THRESHOLD: f32 = -3.0;

    /// Bridge hinge motion per tick (degrees)
    pub const BRIDGE_STEP_DEG: u32 = 5;
    /// Hinge angle of a fully swung-away bridge
    pub const BRIDGE_CLOSED_DEG: u32 = 90;
    /// Hinge angle a bridge starts at once instantiated
    pub const BRIDGE_START_DEG: u32 = 5;

    /// Number of levels in the shipped pack
    pub const SHIPPED_LEVELS: u32 = 4;
}

/// Wrap an angle in degrees back into (0, 360]
#[inline]
pub fn wrap_degrees(mut angle: f32) -> f32 {
    while angle > 360.0 {
        angle -= 360.0;
    }
    angle
}

/// Rotation of `angle_deg` degrees about `axis` through `pivot`
#[inline]
pub fn rotation_about(pivot: Vec3, axis: Vec3, angle_deg: f32) -> glam::Mat4 {
    glam::Mat4::from_translation(pivot)
        * glam::Mat4::from_axis_angle(axis, angle_deg.to_radians())
        * glam::Mat4::from_translation(-pivot)
}
