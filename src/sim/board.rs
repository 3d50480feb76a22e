//! Tile board
//!
//! Fixed-size grid of tile kinds, the staged reveal order and the
//! destination cell. Grid cell `(x, z)` sits at world `(x / 2, z / 2)`.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::block::Direction;
use super::bridge::BridgeId;
use crate::consts::*;

/// A grid coordinate on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub z: i32,
}

impl Cell {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Neighbouring cell `steps` cells away in `direction`
    pub fn step(self, direction: Direction, steps: i32) -> Self {
        let (dx, dz) = direction.delta();
        Self::new(self.x + dx * steps, self.z + dz * steps)
    }

    /// World position of the cell centre on the tile surface
    pub fn world(self) -> Vec3 {
        Vec3::new(self.x as f32 * CELL_SIZE, 0.0, self.z as f32 * CELL_SIZE)
    }

    /// Grid cell containing the world point (x, z)
    pub fn from_world(x: f32, z: f32) -> Self {
        Self::new((x / CELL_SIZE).round() as i32, (z / CELL_SIZE).round() as i32)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Semantic type of a board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileKind {
    /// Hole, no tile present
    #[default]
    Empty,
    Normal,
    /// Consumed on first contact with a standing block
    Fragile,
    BridgeSwitchA,
    BridgeSwitchB,
}

impl TileKind {
    pub fn is_empty(self) -> bool {
        self == TileKind::Empty
    }

    /// Bridge controlled by this tile, if it is a switch
    pub fn switch_target(self) -> Option<BridgeId> {
        match self {
            TileKind::BridgeSwitchA => Some(BridgeId::A),
            TileKind::BridgeSwitchB => Some(BridgeId::B),
            _ => None,
        }
    }
}

/// Presentation view of one revealed tile
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileView {
    pub cell: Cell,
    pub kind: TileKind,
    /// Centre of the tile slab
    pub world: Vec3,
}

/// Grid of tiles for the active level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    kinds: Vec<TileKind>,
    /// Downward offset of each tile (fragile tiles sink with a breaking block)
    sink: Vec<f32>,
    reveal_order: Vec<Cell>,
    revealed: usize,
    destination: Cell,
}

impl Board {
    /// Create an all-empty board
    pub fn new(size: usize, destination: Cell) -> Self {
        Self {
            size,
            kinds: vec![TileKind::Empty; size * size],
            sink: vec![0.0; size * size],
            reveal_order: Vec::new(),
            revealed: 0,
            destination,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn destination(&self) -> Cell {
        self.destination
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.index(cell).is_some()
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        let size = self.size as i32;
        if (0..size).contains(&cell.x) && (0..size).contains(&cell.z) {
            Some(cell.x as usize * self.size + cell.z as usize)
        } else {
            None
        }
    }

    /// Tile kind at `cell`, `None` off the board
    pub fn get(&self, cell: Cell) -> Option<TileKind> {
        self.index(cell).map(|i| self.kinds[i])
    }

    /// Tile kind at `cell`; anything off the board is a hole
    pub fn kind(&self, cell: Cell) -> TileKind {
        self.get(cell).unwrap_or(TileKind::Empty)
    }

    /// Overwrite the tile kind at `cell`. Returns false off the board.
    pub fn set(&mut self, cell: Cell, kind: TileKind) -> bool {
        match self.index(cell) {
            Some(i) => {
                self.kinds[i] = kind;
                true
            }
            None => false,
        }
    }

    /// Turn a fragile tile into a hole. Returns true if a tile was consumed.
    pub fn consume_fragile(&mut self, cell: Cell) -> bool {
        if self.get(cell) == Some(TileKind::Fragile) {
            self.set(cell, TileKind::Empty)
        } else {
            false
        }
    }

    /// Lower a tile by `amount` (breaking tiles fall with the block)
    pub fn sink(&mut self, cell: Cell, amount: f32) {
        if let Some(i) = self.index(cell) {
            self.sink[i] += amount;
        }
    }

    /// Centre of the tile slab at `cell`
    pub fn tile_world(&self, cell: Cell) -> Vec3 {
        let sink = self.index(cell).map(|i| self.sink[i]).unwrap_or(0.0);
        cell.world() + Vec3::new(0.0, -TILE_THICKNESS / 2.0 - sink, 0.0)
    }

    /// Replace the reveal order and restart staging
    pub fn set_reveal_order(&mut self, order: Vec<Cell>) {
        self.reveal_order = order;
        self.revealed = 0;
    }

    /// Activate the next tile in reveal order
    pub fn reveal_next(&mut self) -> Option<Cell> {
        let cell = self.reveal_order.get(self.revealed).copied()?;
        self.revealed += 1;
        Some(cell)
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed
    }

    pub fn total_tiles(&self) -> usize {
        self.reveal_order.len()
    }

    pub fn is_fully_revealed(&self) -> bool {
        self.revealed == self.reveal_order.len()
    }

    /// Every revealed tile in reveal order
    pub fn revealed_tiles(&self) -> impl Iterator<Item = TileView> + '_ {
        self.reveal_order[..self.revealed].iter().map(|&cell| TileView {
            cell,
            kind: self.kind(cell),
            world: self.tile_world(cell),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_world_mapping() {
        let cell = Cell::new(3, 5);
        let world = cell.world();
        assert_eq!(world, Vec3::new(1.5, 0.0, 2.5));
        assert_eq!(Cell::from_world(world.x, world.z), cell);
        // Slightly off-centre points still round to the same cell
        assert_eq!(Cell::from_world(1.6, 2.4), cell);
    }

    #[test]
    fn test_out_of_bounds_reads_are_holes() {
        let mut board = Board::new(BOARD_SIZE, Cell::new(1, 1));
        board.set(Cell::new(0, 0), TileKind::Normal);

        assert_eq!(board.get(Cell::new(-1, 0)), None);
        assert_eq!(board.get(Cell::new(0, 14)), None);
        assert_eq!(board.kind(Cell::new(14, 14)), TileKind::Empty);
        assert_eq!(board.kind(Cell::new(0, 0)), TileKind::Normal);
        assert!(!board.set(Cell::new(20, 0), TileKind::Normal));
    }

    #[test]
    fn test_consume_fragile_only_once() {
        let mut board = Board::new(BOARD_SIZE, Cell::new(1, 1));
        let cell = Cell::new(4, 4);
        board.set(cell, TileKind::Fragile);

        assert!(board.consume_fragile(cell));
        assert_eq!(board.kind(cell), TileKind::Empty);
        assert!(!board.consume_fragile(cell));
    }

    #[test]
    fn test_reveal_staging() {
        let mut board = Board::new(BOARD_SIZE, Cell::new(1, 1));
        board.set_reveal_order(vec![Cell::new(1, 1), Cell::new(1, 2)]);
        assert_eq!(board.revealed_tiles().count(), 0);
        assert!(!board.is_fully_revealed());

        assert_eq!(board.reveal_next(), Some(Cell::new(1, 1)));
        assert_eq!(board.reveal_next(), Some(Cell::new(1, 2)));
        assert_eq!(board.reveal_next(), None);
        assert!(board.is_fully_revealed());
        assert_eq!(board.revealed_tiles().count(), 2);
    }

    #[test]
    fn test_sinking_tile_moves_down() {
        let mut board = Board::new(BOARD_SIZE, Cell::new(1, 1));
        let cell = Cell::new(2, 2);
        let before = board.tile_world(cell);
        board.sink(cell, 0.25);
        let after = board.tile_world(cell);
        assert!((before.y - after.y - 0.25).abs() < 1e-6);
    }
}
