//! The rolling block
//!
//! Pose, discrete orientation and fall status of the player-controlled
//! cuboid. Presentation transforms are derived from this state on demand.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use super::board::Cell;
use crate::consts::*;
use crate::rotation_about;

/// Move command direction. Up/Down run along z, Left/Right along x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards -z
    Up,
    /// Towards +z
    Down,
    /// Towards -x
    Left,
    /// Towards +x
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Grid step (dx, dz)
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Unit vector of travel in world space
    pub fn vector(self) -> Vec3 {
        let (dx, dz) = self.delta();
        Vec3::new(dx as f32, 0.0, dz as f32)
    }

    /// Axis the block tips about when rolling this way
    pub fn tip_axis(self) -> Vec3 {
        match self {
            Direction::Up => Vec3::NEG_X,
            Direction::Down => Vec3::X,
            Direction::Left => Vec3::Z,
            Direction::Right => Vec3::NEG_Z,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Whether travel is along the x axis
    pub fn along_x(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Parse a single-letter command (U/D/L/R, case-insensitive)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'U' => Some(Direction::Up),
            'D' => Some(Direction::Down),
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Orientation class of the block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// Upright, one cell footprint
    StandingY,
    /// Lying along x, two cells
    LyingX,
    /// Lying along z, two cells
    LyingZ,
}

impl Orientation {
    /// Extents (length x, height y, breadth z) that define this orientation
    pub fn extents(self) -> Vec3 {
        match self {
            Orientation::StandingY => Vec3::new(BLOCK_UNIT, BLOCK_LONG, BLOCK_UNIT),
            Orientation::LyingX => Vec3::new(BLOCK_LONG, BLOCK_UNIT, BLOCK_UNIT),
            Orientation::LyingZ => Vec3::new(BLOCK_UNIT, BLOCK_UNIT, BLOCK_LONG),
        }
    }

    /// Recover the orientation from extents, `None` if they match none
    pub fn from_extents(extents: Vec3) -> Option<Self> {
        [
            Orientation::StandingY,
            Orientation::LyingX,
            Orientation::LyingZ,
        ]
        .into_iter()
        .find(|o| o.extents().abs_diff_eq(extents, 1e-4))
    }

    pub fn is_standing(self) -> bool {
        self == Orientation::StandingY
    }
}

/// Vertical/motion status of the block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallStatus {
    /// On solid ground, accepts roll commands
    Resting,
    /// Spawn-only descent onto the board
    SettlingIntoPlace,
    FallingThroughHole,
    /// Descending together with a consumed fragile tile
    Breaking { cell: Cell },
    /// Forced re-centering tip after landing half over a hole
    CorrectiveRoll,
    /// Victory descent through the destination
    ReachedTarget,
}

/// What kind of animation currently occupies the block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationKind {
    Roll,
    CorrectiveRoll,
    Settle,
    Fall,
    Break,
    Victory,
}

/// Command admission state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activity {
    Idle,
    Animating(AnimationKind),
}

/// A tip in flight about a bottom edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tip {
    pub direction: Direction,
    /// Degrees swept so far (0..90)
    pub angle: f32,
    /// Degrees added per tick
    pub step: f32,
}

/// Presentation view of the block
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlockPose {
    /// Centre of the resting cuboid before any in-flight rotation
    pub position: Vec3,
    pub extents: Vec3,
    pub orientation: Orientation,
    /// In-flight rotation (tip or tumble), degrees
    pub angle: f32,
    pub axis: Vec3,
    pub pivot: Vec3,
    /// Unit cube → world transform
    pub model: Mat4,
}

/// The player-controlled block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub pos: Vec3,
    /// x = length, y = height, z = breadth
    pub extents: Vec3,
    pub orientation: Orientation,
    pub status: FallStatus,
    pub tip: Option<Tip>,
    /// Direction of the most recent tip (falling tumbles about it)
    pub heading: Direction,
    /// Tumble angle while falling through a hole, degrees
    pub tumble: f32,
}

impl Block {
    /// Place a standing block above `cell`, ready to settle
    pub fn spawn(cell: Cell) -> Self {
        let extents = Orientation::StandingY.extents();
        let ground = cell.world();
        Self {
            pos: Vec3::new(ground.x, extents.y / 2.0 + SPAWN_DROP, ground.z),
            extents,
            orientation: Orientation::StandingY,
            status: FallStatus::SettlingIntoPlace,
            tip: None,
            heading: Direction::Right,
            tumble: 0.0,
        }
    }

    /// Height of the block centre when resting on the board
    pub fn rest_height(&self) -> f32 {
        self.extents.y / 2.0
    }

    pub fn activity(&self) -> Activity {
        let kind = match (self.status, self.tip) {
            (FallStatus::Resting, None) => return Activity::Idle,
            (FallStatus::Resting, Some(_)) => AnimationKind::Roll,
            (FallStatus::CorrectiveRoll, _) => AnimationKind::CorrectiveRoll,
            (FallStatus::SettlingIntoPlace, _) => AnimationKind::Settle,
            (FallStatus::FallingThroughHole, _) => AnimationKind::Fall,
            (FallStatus::Breaking { .. }, _) => AnimationKind::Break,
            (FallStatus::ReachedTarget, _) => AnimationKind::Victory,
        };
        Activity::Animating(kind)
    }

    /// Whether a new move command would be admitted
    pub fn is_idle(&self) -> bool {
        self.activity() == Activity::Idle
    }

    /// Bottom edge of the footprint in `direction`
    pub fn pivot(&self, direction: Direction) -> Vec3 {
        let half = self.extents / 2.0;
        let edge = direction.vector() * half;
        self.pos + edge - Vec3::new(0.0, half.y, 0.0)
    }

    /// Whether extents agree with the recorded orientation
    pub fn is_consistent(&self) -> bool {
        Orientation::from_extents(self.extents) == Some(self.orientation)
    }

    pub fn pose(&self) -> BlockPose {
        let (direction, angle) = match (self.tip, self.status) {
            (Some(tip), _) => (tip.direction, tip.angle),
            (None, FallStatus::FallingThroughHole) => (self.heading, self.tumble),
            _ => (self.heading, 0.0),
        };
        let pivot = self.pivot(direction);
        let axis = direction.tip_axis();
        let model = rotation_about(pivot, axis, angle)
            * Mat4::from_translation(self.pos)
            * Mat4::from_scale(self.extents);
        BlockPose {
            position: self.pos,
            extents: self.extents,
            orientation: self.orientation,
            angle,
            axis,
            pivot,
            model,
        }
    }
}
