//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Time comes from the caller, never from a system clock
//! - Stable iteration order (bridges by id, tiles by reveal order)
//! - No rendering or platform dependencies

pub mod block;
pub mod board;
pub mod bridge;
pub mod clock;
pub mod events;
pub mod level;
pub mod roll;
pub mod session;
pub mod tick;
pub mod validator;

pub use block::{Activity, AnimationKind, Block, BlockPose, Direction, FallStatus, Orientation};
pub use board::{Board, Cell, TileKind, TileView};
pub use bridge::{BridgeController, BridgeId, BridgeView, HingeIntent};
pub use clock::SimClock;
pub use events::GameEvent;
pub use level::{Level, LevelDescriptor, LevelError, LevelPack};
pub use roll::RollRejected;
pub use session::{Session, SessionError, SessionStatus, Snapshot};
pub use tick::{TickInput, tick};
pub use validator::Footprint;
