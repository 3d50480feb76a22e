//! Position validator
//!
//! Inspects the block footprint against the board after every landing and
//! reports what happens next as events. Nothing is mutated here; the
//! session applies the events to the block, board and bridges.

use glam::Vec3;

use super::block::{Block, Direction, Orientation};
use super::board::{Board, Cell, TileKind};
use super::events::GameEvent;
use crate::consts::*;

/// Grid cells under the block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Footprint {
    Single(Cell),
    /// Two adjacent cells, lower coordinate first
    Pair(Cell, Cell),
}

impl Footprint {
    pub fn cells(self) -> impl Iterator<Item = Cell> {
        let (first, second) = match self {
            Footprint::Single(cell) => (cell, None),
            Footprint::Pair(a, b) => (a, Some(b)),
        };
        std::iter::once(first).chain(second)
    }
}

/// Footprint of a block resting at `pos` in `orientation`
pub fn footprint_of(pos: Vec3, orientation: Orientation) -> Footprint {
    let quarter = BLOCK_LONG / 4.0;
    match orientation {
        Orientation::StandingY => Footprint::Single(Cell::from_world(pos.x, pos.z)),
        Orientation::LyingX => {
            let first = Cell::from_world(pos.x - quarter, pos.z);
            Footprint::Pair(first, first.step(Direction::Right, 1))
        }
        Orientation::LyingZ => {
            let first = Cell::from_world(pos.x, pos.z - quarter);
            Footprint::Pair(first, first.step(Direction::Down, 1))
        }
    }
}

pub fn footprint(block: &Block) -> Footprint {
    footprint_of(block.pos, block.orientation)
}

/// Decide the consequences of the block's current resting footprint.
/// An empty result means the block simply rests.
pub fn inspect(block: &Block, board: &Board) -> Vec<GameEvent> {
    match footprint(block) {
        Footprint::Single(cell) => inspect_standing(cell, board),
        Footprint::Pair(first, second) => inspect_lying(first, second, block.orientation, board),
    }
}

fn inspect_standing(cell: Cell, board: &Board) -> Vec<GameEvent> {
    let kind = board.kind(cell);
    if kind.is_empty() {
        return vec![GameEvent::EnteredHole];
    }
    if kind == TileKind::Fragile {
        return vec![GameEvent::Broke(cell)];
    }
    if cell == board.destination() {
        return vec![GameEvent::ReachedTarget];
    }
    kind.switch_target()
        .map(GameEvent::SteppedOnSwitch)
        .into_iter()
        .collect()
}

fn inspect_lying(first: Cell, second: Cell, orientation: Orientation, board: &Board) -> Vec<GameEvent> {
    let (a, b) = (board.kind(first), board.kind(second));
    // Tip away from the unsupported end, onto the side still standing
    let (towards_first, towards_second) = match orientation {
        Orientation::LyingZ => (Direction::Up, Direction::Down),
        _ => (Direction::Left, Direction::Right),
    };

    match (a.is_empty(), b.is_empty()) {
        (true, true) => vec![GameEvent::EnteredHole],
        (true, false) => vec![GameEvent::Overhang(towards_second)],
        (false, true) => vec![GameEvent::Overhang(towards_first)],
        (false, false) => [a, b]
            .into_iter()
            .filter_map(TileKind::switch_target)
            .map(GameEvent::SteppedOnSwitch)
            .collect(),
    }
}
