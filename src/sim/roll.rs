//! Roll engine
//!
//! Starts tips, advances them each tick and lands the block in its new
//! resting pose. Only the block is touched here; consequences of the
//! landing are decided by the position validator.

use std::fmt;

use glam::Vec3;

use super::block::{Block, Direction, FallStatus, Orientation, Tip};
use super::board::Board;
use super::validator::footprint_of;
use crate::consts::*;

/// Why a move command was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollRejected {
    /// An animation is already in flight
    Busy,
    /// The landing footprint would leave the board
    OffBoard,
}

impl fmt::Display for RollRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollRejected::Busy => write!(f, "block is busy"),
            RollRejected::OffBoard => write!(f, "move would leave the board"),
        }
    }
}

impl std::error::Error for RollRejected {}

/// Resting position and extents after tipping one step in `direction`
pub fn landing(pos: Vec3, extents: Vec3, direction: Direction) -> (Vec3, Vec3) {
    let mut pos = pos;
    let mut extents = extents;
    let sign = direction.vector();
    if direction.along_x() {
        pos.x += sign.x * (extents.x + extents.y) / 2.0;
        std::mem::swap(&mut extents.x, &mut extents.y);
    } else {
        pos.z += sign.z * (extents.z + extents.y) / 2.0;
        std::mem::swap(&mut extents.z, &mut extents.y);
    }
    pos.y = extents.y / 2.0;
    (pos, extents)
}

/// Resting position and extents after a lying block stands up on its half
/// towards `direction`
pub fn recentre_landing(pos: Vec3, direction: Direction) -> (Vec3, Vec3) {
    let extents = Orientation::StandingY.extents();
    let mut pos = pos + direction.vector() * (CELL_SIZE / 2.0);
    pos.y = extents.y / 2.0;
    (pos, extents)
}

// Reject tips whose landing footprint is off the board
fn check_landing(board: &Board, (pos, extents): (Vec3, Vec3)) -> Result<(), RollRejected> {
    let orientation = Orientation::from_extents(extents).ok_or(RollRejected::OffBoard)?;
    if footprint_of(pos, orientation)
        .cells()
        .all(|cell| board.contains(cell))
    {
        Ok(())
    } else {
        Err(RollRejected::OffBoard)
    }
}

/// Start a player roll. Only admitted while the block is idle.
pub fn begin_roll(block: &mut Block, board: &Board, direction: Direction) -> Result<(), RollRejected> {
    if !block.is_idle() {
        return Err(RollRejected::Busy);
    }
    check_landing(board, landing(block.pos, block.extents, direction))?;
    block.heading = direction;
    block.tip = Some(Tip {
        direction,
        angle: 0.0,
        step: ROLL_STEP_DEG,
    });
    Ok(())
}

/// Start a forced re-centering roll after landing half over a hole. The
/// block stands up on the supported cell, which lies towards `direction`.
pub fn begin_corrective_roll(
    block: &mut Block,
    board: &Board,
    direction: Direction,
) -> Result<(), RollRejected> {
    if block.orientation.is_standing() {
        return Err(RollRejected::Busy);
    }
    check_landing(board, recentre_landing(block.pos, direction))?;
    block.heading = direction;
    block.status = FallStatus::CorrectiveRoll;
    block.tip = Some(Tip {
        direction,
        angle: 0.0,
        step: CORRECTIVE_STEP_DEG,
    });
    Ok(())
}

/// Advance the in-flight tip one tick. Returns true when the block landed.
pub fn advance_tip(block: &mut Block) -> bool {
    let Some(tip) = block.tip.as_mut() else {
        return false;
    };
    tip.angle += tip.step;
    if tip.angle < TIP_COMPLETE_DEG {
        return false;
    }

    let direction = tip.direction;
    block.tip = None;
    let (pos, extents) = if block.status == FallStatus::CorrectiveRoll {
        recentre_landing(block.pos, direction)
    } else {
        landing(block.pos, block.extents, direction)
    };
    block.pos = pos;
    block.extents = extents;
    if let Some(orientation) = Orientation::from_extents(extents) {
        block.orientation = orientation;
    }
    true
}
