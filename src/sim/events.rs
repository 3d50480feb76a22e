//! Simulation events
//!
//! Emitted by the position validator, the bridges and the session; drained
//! by the presentation layer after each pump.

use serde::{Deserialize, Serialize};

use super::block::Direction;
use super::board::Cell;
use super::bridge::BridgeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Footprint has no support
    EnteredHole,
    /// A standing block consumed the fragile tile at this cell
    Broke(Cell),
    /// A standing block stopped on the destination
    ReachedTarget,
    SteppedOnSwitch(BridgeId),
    /// Lying block half over a hole; it tips away from the hole
    Overhang(Direction),
    BridgeOpened(BridgeId),
    BridgeClosed(BridgeId),
    /// The spawned block finished settling onto the board
    Landed,
    LevelStarted(u32),
    /// The block left the board; the level restarts
    LevelFailed(u32),
    LevelCompleted(u32),
    SessionWon,
    /// Out of lives
    SessionLost,
}
