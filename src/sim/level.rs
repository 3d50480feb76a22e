//! Level content
//!
//! Levels are authored as a JSON pack of flat coordinate lists and validated
//! once at load time. A validated `Level` never fails during simulation.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::board::{Board, Cell, TileKind};
use super::bridge::BridgeId;
use crate::consts::*;

/// Shipped level pack, embedded at compile time
const SHIPPED_PACK: &str = include_str!("../../assets/levels.json");

/// Malformed level content
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("failed to read level pack: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse level pack: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("level pack contains no levels")]
    EmptyPack,
    #[error("no level {0} in this pack")]
    NoSuchLevel(u32),
    #[error("level {level}: board size {size} must be between 1 and {max}", max = MAX_BOARD_SIZE)]
    BoardSize { level: u32, size: usize },
    #[error("level {level}: `{field}` has an odd number of coordinates ({len})")]
    OddCoordinates {
        level: u32,
        field: &'static str,
        len: usize,
    },
    #[error("level {level}: `{field}` cell {cell} lies outside the {size}x{size} board")]
    OutOfBounds {
        level: u32,
        field: &'static str,
        cell: Cell,
        size: usize,
    },
    #[error("level {level}: `{field}` cell {cell} is not part of the revealed tile set")]
    NotRevealed {
        level: u32,
        field: &'static str,
        cell: Cell,
    },
    #[error("level {level}: tile {cell} is listed more than once")]
    DuplicateTile { level: u32, cell: Cell },
    #[error("level {level}: destination {cell} must be a normal tile")]
    DestinationNotNormal { level: u32, cell: Cell },
    #[error("level {level}: switch at {cell} has no paired bridge {bridge:?}")]
    UnpairedSwitch {
        level: u32,
        cell: Cell,
        bridge: BridgeId,
    },
    #[error("level {level}: bridge {index} must list exactly two cells")]
    MalformedBridge { level: u32, index: usize },
    #[error("level {level}: bridge cell {cell} overlaps a tile")]
    BridgeOverlapsTile { level: u32, cell: Cell },
    #[error("level {level}: {count} bridges defined, at most two are supported")]
    TooManyBridges { level: u32, count: usize },
}

/// Level as authored in the JSON pack
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelDescriptor {
    pub name: String,
    /// Board cells per side
    #[serde(default = "default_board_size")]
    pub size: usize,
    /// Flat `x, z` list of every tile, in reveal order
    pub tiles: Vec<i32>,
    #[serde(default)]
    pub fragile: Vec<i32>,
    #[serde(default)]
    pub switch_a: Vec<i32>,
    #[serde(default)]
    pub switch_b: Vec<i32>,
    /// Each entry is `x0, z0, x1, z1`
    #[serde(default)]
    pub bridges: Vec<Vec<i32>>,
    pub spawn: Vec<i32>,
    pub destination: Vec<i32>,
}

fn default_board_size() -> usize {
    BOARD_SIZE
}

/// A validated level
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub number: u32,
    pub name: String,
    pub size: usize,
    /// Tiles in reveal order
    pub tiles: Vec<Cell>,
    pub fragile: Vec<Cell>,
    pub switches: Vec<(Cell, BridgeId)>,
    pub bridges: Vec<[Cell; 2]>,
    pub spawn: Cell,
    pub destination: Cell,
}

impl Level {
    /// Validate an authored descriptor as level `number`
    pub fn from_descriptor(number: u32, desc: &LevelDescriptor) -> Result<Self, LevelError> {
        let board_size = LevelError::BoardSize {
            level: number,
            size: desc.size,
        };
        if desc.size == 0 || desc.size > MAX_BOARD_SIZE {
            return Err(board_size);
        }
        let size = i32::try_from(desc.size).map_err(|_| board_size)?;

        let cells = |field: &'static str, coords: &[i32]| -> Result<Vec<Cell>, LevelError> {
            if coords.len() % 2 != 0 {
                return Err(LevelError::OddCoordinates {
                    level: number,
                    field,
                    len: coords.len(),
                });
            }
            coords
                .chunks_exact(2)
                .map(|c| Cell::new(c[0], c[1]))
                .map(|cell| {
                    if (0..size).contains(&cell.x) && (0..size).contains(&cell.z) {
                        Ok(cell)
                    } else {
                        Err(LevelError::OutOfBounds {
                            level: number,
                            field,
                            cell,
                            size: desc.size,
                        })
                    }
                })
                .collect()
        };
        let single = |field: &'static str, coords: &[i32]| -> Result<Cell, LevelError> {
            let list = cells(field, coords)?;
            match list.as_slice() {
                [cell] => Ok(*cell),
                _ => Err(LevelError::OddCoordinates {
                    level: number,
                    field,
                    len: coords.len(),
                }),
            }
        };

        let tiles = cells("tiles", &desc.tiles)?;
        let mut revealed = HashSet::new();
        for &cell in &tiles {
            if !revealed.insert(cell) {
                return Err(LevelError::DuplicateTile { level: number, cell });
            }
        }
        let require_revealed = |field: &'static str, cell: Cell| {
            if revealed.contains(&cell) {
                Ok(())
            } else {
                Err(LevelError::NotRevealed {
                    level: number,
                    field,
                    cell,
                })
            }
        };

        let fragile = cells("fragile", &desc.fragile)?;
        for &cell in &fragile {
            require_revealed("fragile", cell)?;
        }

        if desc.bridges.len() > 2 {
            return Err(LevelError::TooManyBridges {
                level: number,
                count: desc.bridges.len(),
            });
        }
        let mut bridges = Vec::with_capacity(desc.bridges.len());
        for (index, coords) in desc.bridges.iter().enumerate() {
            let pair = cells("bridges", coords)?;
            let [a, b] = pair.as_slice() else {
                return Err(LevelError::MalformedBridge { level: number, index });
            };
            for cell in [*a, *b] {
                if revealed.contains(&cell) {
                    return Err(LevelError::BridgeOverlapsTile { level: number, cell });
                }
            }
            bridges.push([*a, *b]);
        }

        let mut switches = Vec::new();
        for (field, coords, bridge) in [
            ("switch_a", &desc.switch_a, BridgeId::A),
            ("switch_b", &desc.switch_b, BridgeId::B),
        ] {
            for cell in cells(field, coords)? {
                require_revealed(field, cell)?;
                if bridge.index() >= bridges.len() {
                    return Err(LevelError::UnpairedSwitch {
                        level: number,
                        cell,
                        bridge,
                    });
                }
                switches.push((cell, bridge));
            }
        }

        let spawn = single("spawn", &desc.spawn)?;
        require_revealed("spawn", spawn)?;
        let destination = single("destination", &desc.destination)?;
        require_revealed("destination", destination)?;
        if fragile.contains(&destination) || switches.iter().any(|&(c, _)| c == destination) {
            return Err(LevelError::DestinationNotNormal {
                level: number,
                cell: destination,
            });
        }

        Ok(Self {
            number,
            name: desc.name.clone(),
            size: desc.size,
            tiles,
            fragile,
            switches,
            bridges,
            spawn,
            destination,
        })
    }

    /// Fresh board for this level, every tile kind marked, nothing revealed
    pub fn build_board(&self) -> Board {
        let mut board = Board::new(self.size, self.destination);
        for &cell in &self.tiles {
            board.set(cell, TileKind::Normal);
        }
        for &cell in &self.fragile {
            board.set(cell, TileKind::Fragile);
        }
        for &(cell, bridge) in &self.switches {
            let kind = match bridge {
                BridgeId::A => TileKind::BridgeSwitchA,
                BridgeId::B => TileKind::BridgeSwitchB,
            };
            board.set(cell, kind);
        }
        board.set_reveal_order(self.tiles.clone());
        board
    }
}

/// Ordered set of validated levels, numbered from 1
#[derive(Debug, Clone, PartialEq)]
pub struct LevelPack {
    levels: Vec<Level>,
}

#[derive(Deserialize)]
struct PackFile {
    levels: Vec<LevelDescriptor>,
}

impl LevelPack {
    /// The levels that ship with the game
    pub fn shipped() -> Result<Self, LevelError> {
        Self::from_json(SHIPPED_PACK)
    }

    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let file: PackFile = serde_json::from_str(json)?;
        Self::from_descriptors(&file.levels)
    }

    pub fn from_file(path: &Path) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path)?;
        let pack = Self::from_json(&json)?;
        log::info!("Loaded {} levels from {}", pack.len(), path.display());
        Ok(pack)
    }

    pub fn from_descriptors(descriptors: &[LevelDescriptor]) -> Result<Self, LevelError> {
        if descriptors.is_empty() {
            return Err(LevelError::EmptyPack);
        }
        let levels = descriptors
            .iter()
            .zip(1..)
            .map(|(desc, number)| Level::from_descriptor(number, desc))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { levels })
    }

    /// Level by 1-based number
    pub fn get(&self, number: u32) -> Option<&Level> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.levels.get(index)
    }

    pub fn len(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
