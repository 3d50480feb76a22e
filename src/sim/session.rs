//! Session state
//!
//! One `Session` owns everything mutable about a play-through: the active
//! level's board, block and bridges, the level index and the session
//! outcome. Every operation takes the session explicitly.

use serde::{Deserialize, Serialize};

use super::block::{Block, BlockPose, Direction, FallStatus};
use super::board::{Board, TileView};
use super::bridge::{BridgeController, BridgeId, BridgeView};
use super::events::GameEvent;
use super::level::{Level, LevelError, LevelPack};
use super::roll::{self, RollRejected};
use crate::settings::{Settings, SettingsError};

/// Outcome of the play-through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Playing,
    /// Every level completed
    Won,
    /// Ran out of lives
    Lost,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        self != SessionStatus::Playing
    }
}

/// Why a session could not start
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Everything the presentation layer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub level: u32,
    pub level_name: String,
    pub status: SessionStatus,
    pub block: BlockPose,
    /// Block is hidden until every tile has been revealed
    pub block_visible: bool,
    pub tiles: Vec<TileView>,
    pub bridges: Vec<BridgeView>,
    pub revealed: usize,
    pub total_tiles: usize,
    pub moves: u32,
    pub deaths: u32,
    pub lives: Option<u32>,
}

/// The level manager and sole owner of simulation state
#[derive(Debug, Clone)]
pub struct Session {
    settings: Settings,
    pack: LevelPack,
    level: Level,
    /// Current level number (1-based)
    pub level_index: u32,
    pub board: Board,
    pub block: Block,
    /// Empty until the reveal staging completes
    pub bridges: Vec<BridgeController>,
    pub status: SessionStatus,
    /// Moves accepted on the current level attempt
    pub moves: u32,
    pub deaths: u32,
    pub lives: Option<u32>,
    /// Simulation tick counter
    pub time_ticks: u64,
    events: Vec<GameEvent>,
    /// Set whenever a level (re)starts; the clock restarts reveal staging
    restaged: bool,
}

impl Session {
    /// Start a session on `settings.start_level`
    pub fn new(pack: LevelPack, settings: Settings) -> Result<Self, SessionError> {
        settings.validate()?;
        let start = settings.start_level;
        let level = pack.get(start).cloned().ok_or(LevelError::NoSuchLevel(start))?;
        let mut session = Self {
            lives: settings.lives,
            settings,
            pack,
            board: level.build_board(),
            block: Block::spawn(level.spawn),
            level,
            level_index: start,
            bridges: Vec::new(),
            status: SessionStatus::Playing,
            moves: 0,
            deaths: 0,
            time_ticks: 0,
            events: Vec::new(),
            restaged: false,
        };
        session.initialize(start)?;
        Ok(session)
    }

    /// Session on the shipped levels with default settings
    pub fn shipped() -> Result<Self, SessionError> {
        Self::new(LevelPack::shipped()?, Settings::default())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn level_count(&self) -> u32 {
        self.pack.len()
    }

    /// Load level `number` from scratch
    pub fn initialize(&mut self, number: u32) -> Result<(), LevelError> {
        let level = self
            .pack
            .get(number)
            .cloned()
            .ok_or(LevelError::NoSuchLevel(number))?;
        self.load(level);
        Ok(())
    }

    fn load(&mut self, level: Level) {
        log::info!("Level {} \"{}\" starting", level.number, level.name);
        self.level_index = level.number;
        self.board = level.build_board();
        self.block = Block::spawn(level.spawn);
        self.bridges.clear();
        self.moves = 0;
        self.restaged = true;
        self.events.push(GameEvent::LevelStarted(level.number));
        self.level = level;
    }

    /// Restart the current level after a death
    pub fn reset(&mut self) {
        let level = self.level.clone();
        self.load(level);
    }

    /// Move on to the next level, or win the session after the last one
    pub fn advance(&mut self) {
        let next = self.level_index + 1;
        match self.pack.get(next).cloned() {
            Some(level) => self.load(level),
            None => {
                log::info!("All {} levels complete", self.pack.len());
                self.level_index = next;
                self.status = SessionStatus::Won;
                self.events.push(GameEvent::SessionWon);
            }
        }
    }

    /// Reveal the next staged tile. Returns false once everything is shown.
    pub fn reveal_next(&mut self) -> bool {
        if self.board.reveal_next().is_none() {
            return false;
        }
        if self.board.is_fully_revealed() {
            self.instantiate_bridges();
        }
        true
    }

    fn instantiate_bridges(&mut self) {
        self.bridges = self
            .level
            .bridges
            .iter()
            .enumerate()
            .filter_map(|(i, &cells)| BridgeId::from_index(i).map(|id| BridgeController::new(id, cells)))
            .collect();
    }

    /// Submit a move command; dropped unless the block is idle
    pub fn request_roll(&mut self, direction: Direction) -> Result<(), RollRejected> {
        if self.status.is_terminal() {
            return Err(RollRejected::Busy);
        }
        match roll::begin_roll(&mut self.block, &self.board, direction) {
            Ok(()) => {
                self.moves += 1;
                Ok(())
            }
            Err(e) => {
                log::debug!("Roll {:?} dropped: {}", direction, e);
                Err(e)
            }
        }
    }

    /// Apply the validator's verdict on the block's new footprint
    pub(crate) fn apply_position_events(&mut self, events: Vec<GameEvent>) {
        self.block.status = FallStatus::Resting;
        self.block.tumble = 0.0;
        for event in events {
            match event {
                GameEvent::EnteredHole => {
                    self.block.status = FallStatus::FallingThroughHole;
                }
                GameEvent::Broke(cell) => {
                    self.board.consume_fragile(cell);
                    self.block.status = FallStatus::Breaking { cell };
                }
                GameEvent::ReachedTarget => {
                    self.block.status = FallStatus::ReachedTarget;
                }
                GameEvent::SteppedOnSwitch(id) => {
                    if let Some(bridge) = self.bridges.get_mut(id.index()) {
                        bridge.nudge();
                    }
                }
                GameEvent::Overhang(direction) => {
                    log::debug!("Overhang, correcting {:?}", direction);
                    if roll::begin_corrective_roll(&mut self.block, &self.board, direction).is_err() {
                        self.block.status = FallStatus::FallingThroughHole;
                    }
                }
                _ => {}
            }
            self.events.push(event);
        }
    }

    /// The block left the board: restart, advance or end the session
    pub(crate) fn resolve_exit(&mut self) {
        match self.block.status {
            FallStatus::ReachedTarget => {
                log::info!("Level {} complete in {} moves", self.level_index, self.moves);
                self.events.push(GameEvent::LevelCompleted(self.level_index));
                self.advance();
            }
            FallStatus::FallingThroughHole | FallStatus::Breaking { .. } => {
                self.deaths += 1;
                self.events.push(GameEvent::LevelFailed(self.level_index));
                if let Some(lives) = self.lives.as_mut() {
                    *lives = lives.saturating_sub(1);
                    if *lives == 0 {
                        log::info!("Out of lives on level {}", self.level_index);
                        self.status = SessionStatus::Lost;
                        self.events.push(GameEvent::SessionLost);
                        return;
                    }
                }
                self.reset();
            }
            _ => {}
        }
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether a level (re)started since the last call
    pub fn take_restaged(&mut self) -> bool {
        std::mem::take(&mut self.restaged)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            level: self.level_index,
            level_name: self.level.name.clone(),
            status: self.status,
            block: self.block.pose(),
            block_visible: self.board.is_fully_revealed(),
            tiles: self.board.revealed_tiles().collect(),
            bridges: self.bridges.iter().map(BridgeController::view).collect(),
            revealed: self.board.revealed_count(),
            total_tiles: self.board.total_tiles(),
            moves: self.moves,
            deaths: self.deaths,
            lives: self.lives,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::block::Orientation;
    use crate::sim::board::{Cell, TileKind};

    #[test]
    fn test_initialize_stages_level() {
        let session = Session::shipped().unwrap();
        assert_eq!(session.level_index, 1);
        assert_eq!(session.status, SessionStatus::Playing);
        assert_eq!(session.board.revealed_count(), 0);
        assert!(session.bridges.is_empty());
        assert_eq!(session.block.status, FallStatus::SettlingIntoPlace);
        assert_eq!(session.block.orientation, Orientation::StandingY);
        assert_eq!(
            Cell::from_world(session.block.pos.x, session.block.pos.z),
            Cell::new(3, 5)
        );
        assert!(session.block.pos.y > session.block.rest_height());
    }

    #[test]
    fn test_unknown_start_level() {
        let settings = Settings {
            start_level: 9,
            ..Default::default()
        };
        assert!(matches!(
            Session::new(LevelPack::shipped().unwrap(), settings),
            Err(SessionError::Level(LevelError::NoSuchLevel(9)))
        ));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = Settings {
            tick_interval: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            Session::new(LevelPack::shipped().unwrap(), settings),
            Err(SessionError::Settings(SettingsError::Invalid(_)))
        ));

        let settings = Settings {
            max_catchup_ticks: 0,
            ..Default::default()
        };
        assert!(Session::new(LevelPack::shipped().unwrap(), settings).is_err());
    }

    #[test]
    fn test_bridges_appear_after_reveal() {
        let settings = Settings {
            start_level: 3,
            ..Default::default()
        };
        let mut session = Session::new(LevelPack::shipped().unwrap(), settings).unwrap();
        let total = session.board.total_tiles();
        for _ in 0..total - 1 {
            assert!(session.reveal_next());
            assert!(session.bridges.is_empty());
        }
        assert!(session.reveal_next());
        assert_eq!(session.bridges.len(), 2);
        assert_eq!(session.bridges[0].angle, 5);
        assert!(!session.reveal_next());
        assert_eq!(session.snapshot().tiles.len(), total);
    }

    #[test]
    fn test_advance_past_last_level_wins() {
        let settings = Settings {
            start_level: 4,
            ..Default::default()
        };
        let mut session = Session::new(LevelPack::shipped().unwrap(), settings).unwrap();
        session.advance();
        assert_eq!(session.status, SessionStatus::Won);
        assert!(session.drain_events().contains(&GameEvent::SessionWon));
        assert_eq!(
            session.request_roll(Direction::Right),
            Err(RollRejected::Busy)
        );
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut session = Session::shipped().unwrap();
        let fresh_board = session.board.clone();
        let fresh_block = session.block.clone();

        while session.reveal_next() {}
        session.board.set(Cell::new(3, 3), TileKind::Empty);
        session.block.pos.y = -1.0;
        session.reset();

        assert_eq!(session.board, fresh_board);
        assert_eq!(session.block, fresh_block);
        assert!(session.bridges.is_empty());
        assert!(session.take_restaged());
        assert!(!session.take_restaged());
    }

    #[test]
    fn test_lives_run_out() {
        let settings = Settings {
            lives: Some(1),
            ..Default::default()
        };
        let mut session = Session::new(LevelPack::shipped().unwrap(), settings).unwrap();
        session.block.status = FallStatus::FallingThroughHole;
        session.resolve_exit();

        assert_eq!(session.status, SessionStatus::Lost);
        assert_eq!(session.deaths, 1);
        assert_eq!(session.lives, Some(0));
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::SessionLost));
    }
}
