//! Hinged bridges
//!
//! A bridge owns two cells and swings between lying flat (cells passable)
//! and hanging away (cells are holes). Switch tiles nudge it.

use serde::{Deserialize, Serialize};

use super::board::{Board, Cell, TileKind};
use super::events::GameEvent;
use crate::consts::*;
use crate::settings::BridgeCycle;

/// Which of the two per-level bridges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BridgeId {
    A,
    B,
}

impl BridgeId {
    pub fn index(self) -> usize {
        match self {
            BridgeId::A => 0,
            BridgeId::B => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(BridgeId::A),
            1 => Some(BridgeId::B),
            _ => None,
        }
    }
}

/// Direction the hinge is currently heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HingeIntent {
    /// Towards 0 degrees, cells become passable on arrival
    Opening,
    /// Towards 90 degrees, cells become holes on arrival
    Closing,
}

/// Presentation view of a bridge
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BridgeView {
    pub id: BridgeId,
    pub angle: u32,
    pub cells: [Cell; 2],
    pub intent: HingeIntent,
}

/// A pair of linked cells on a shared hinge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeController {
    pub id: BridgeId,
    pub cells: [Cell; 2],
    /// Hinge angle in degrees, 0 = flat, 90 = swung away
    pub angle: u32,
    pub intent: HingeIntent,
}

impl BridgeController {
    /// Freshly instantiated bridge, just starting to swing away
    pub fn new(id: BridgeId, cells: [Cell; 2]) -> Self {
        Self {
            id,
            cells,
            angle: BRIDGE_START_DEG,
            intent: HingeIntent::Closing,
        }
    }

    pub fn is_open(&self) -> bool {
        self.angle == 0
    }

    pub fn is_closed(&self) -> bool {
        self.angle == BRIDGE_CLOSED_DEG
    }

    /// Advance the hinge one tick, flipping the owned cells on arrival
    pub fn step(&mut self, board: &mut Board, cycle: BridgeCycle) -> Option<GameEvent> {
        if cycle == BridgeCycle::Latching && self.at_rest() {
            return None;
        }

        match self.intent {
            HingeIntent::Closing => {
                self.angle = (self.angle + BRIDGE_STEP_DEG).min(BRIDGE_CLOSED_DEG);
                if self.is_closed() {
                    self.set_cells(board, TileKind::Empty);
                    self.intent = HingeIntent::Opening;
                    log::debug!("Bridge {:?} closed", self.id);
                    return Some(GameEvent::BridgeClosed(self.id));
                }
            }
            HingeIntent::Opening => {
                self.angle = self.angle.saturating_sub(BRIDGE_STEP_DEG);
                if self.is_open() {
                    self.set_cells(board, TileKind::Normal);
                    self.intent = HingeIntent::Closing;
                    log::debug!("Bridge {:?} opened", self.id);
                    return Some(GameEvent::BridgeOpened(self.id));
                }
            }
        }
        None
    }

    /// Perturb a resting hinge so it starts moving the other way.
    /// Returns false (no-op) when the hinge is mid-swing.
    pub fn nudge(&mut self) -> bool {
        if self.is_open() {
            self.angle = BRIDGE_STEP_DEG;
            self.intent = HingeIntent::Closing;
            true
        } else if self.is_closed() {
            self.angle = BRIDGE_CLOSED_DEG - BRIDGE_STEP_DEG;
            self.intent = HingeIntent::Opening;
            true
        } else {
            false
        }
    }

    pub fn view(&self) -> BridgeView {
        BridgeView {
            id: self.id,
            angle: self.angle,
            cells: self.cells,
            intent: self.intent,
        }
    }

    // Flat at 0 waiting to close, or swung away at 90 waiting to open
    fn at_rest(&self) -> bool {
        (self.is_open() && self.intent == HingeIntent::Closing)
            || (self.is_closed() && self.intent == HingeIntent::Opening)
    }

    fn set_cells(&self, board: &mut Board, kind: TileKind) {
        for cell in self.cells {
            board.set(cell, kind);
        }
    }
}
