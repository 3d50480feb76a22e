//! Fixed timestep simulation tick
//!
//! Advances the session by exactly one step: admits a pending command,
//! swings the bridges, moves the block and resolves the death threshold.

use super::block::{Direction, FallStatus};
use super::events::GameEvent;
use super::roll;
use super::session::Session;
use super::validator;
use crate::consts::*;
use crate::wrap_degrees;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Edge-triggered move command
    pub roll: Option<Direction>,
}

impl TickInput {
    pub fn roll(direction: Direction) -> Self {
        Self {
            roll: Some(direction),
        }
    }
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut Session, input: &TickInput) {
    if session.status.is_terminal() {
        return;
    }

    session.time_ticks += 1;

    if let Some(direction) = input.roll {
        // Rejections are logged by the session and otherwise ignored
        let _ = session.request_roll(direction);
    }

    let cycle = session.settings().bridge_cycle;
    let mut bridge_events = Vec::new();
    for bridge in &mut session.bridges {
        bridge_events.extend(bridge.step(&mut session.board, cycle));
    }
    for event in bridge_events {
        session.push_event(event);
    }

    step_block(session);

    if session.block.pos.y < DEATH_THRESHOLD {
        session.resolve_exit();
    }
}

fn step_block(session: &mut Session) {
    let block = &mut session.block;
    match block.status {
        FallStatus::Resting | FallStatus::CorrectiveRoll => {
            if roll::advance_tip(block) {
                let events = validator::inspect(block, &session.board);
                session.apply_position_events(events);
            }
        }
        FallStatus::SettlingIntoPlace => {
            // Held in the air until every tile is on the board
            if !session.board.is_fully_revealed() {
                return;
            }
            let rest = block.rest_height();
            block.pos.y = (block.pos.y - SETTLE_STEP).max(rest);
            if block.pos.y <= rest {
                block.status = FallStatus::Resting;
                session.push_event(GameEvent::Landed);
            }
        }
        FallStatus::FallingThroughHole => {
            block.tumble = wrap_degrees(block.tumble + TUMBLE_STEP_DEG);
            block.pos.y -= HOLE_FALL_STEP;
        }
        FallStatus::Breaking { cell } => {
            block.pos.y -= BREAK_FALL_STEP;
            session.board.sink(cell, BREAK_FALL_STEP);
        }
        FallStatus::ReachedTarget => {
            block.pos.y -= TARGET_FALL_STEP;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{BridgeCycle, Settings};
    use crate::sim::block::{Activity, Block, Orientation};
    use crate::sim::board::{Cell, TileKind};
    use crate::sim::bridge::HingeIntent;
    use crate::sim::level::LevelPack;
    use crate::sim::session::SessionStatus;
    use proptest::prelude::*;

    fn session_on(level: u32, cycle: BridgeCycle) -> Session {
        let settings = Settings {
            start_level: level,
            bridge_cycle: cycle,
            ..Default::default()
        };
        Session::new(LevelPack::shipped().unwrap(), settings).unwrap()
    }

    /// Reveal every tile and let the block settle
    fn ready(session: &mut Session) {
        while session.reveal_next() {}
        let mut guard = 0;
        while session.block.status == FallStatus::SettlingIntoPlace {
            tick(session, &TickInput::default());
            guard += 1;
            assert!(guard < 50, "block never settled");
        }
        session.drain_events();
    }

    /// Issue one roll and run until the block is idle or leaves the resting states
    fn roll(session: &mut Session, direction: Direction) {
        tick(session, &TickInput::roll(direction));
        let mut guard = 0;
        while session.block.tip.is_some() {
            tick(session, &TickInput::default());
            guard += 1;
            assert!(guard < 50, "roll never landed");
        }
    }

    fn play(session: &mut Session, moves: &str) {
        for c in moves.chars() {
            let direction = Direction::from_char(c).unwrap();
            assert!(session.block.is_idle(), "block busy before move {}", c);
            roll(session, direction);
        }
    }

    fn run_until_level_changes(session: &mut Session) {
        let level = session.level_index;
        let mut guard = 0;
        while session.level_index == level && !session.status.is_terminal() {
            tick(session, &TickInput::default());
            guard += 1;
            assert!(guard < 200, "level never changed");
        }
    }

    #[test]
    fn test_settling_waits_for_reveal() {
        let mut session = session_on(1, BridgeCycle::Autonomous);
        let y = session.block.pos.y;
        for _ in 0..20 {
            tick(&mut session, &TickInput::default());
        }
        assert_eq!(session.block.pos.y, y);
        assert_eq!(session.block.status, FallStatus::SettlingIntoPlace);

        ready(&mut session);
        assert_eq!(session.block.status, FallStatus::Resting);
        assert!((session.block.pos.y - session.block.rest_height()).abs() < 1e-6);
    }

    #[test]
    fn test_commands_dropped_while_animating() {
        let mut session = session_on(1, BridgeCycle::Autonomous);
        ready(&mut session);

        tick(&mut session, &TickInput::roll(Direction::Right));
        assert_eq!(session.moves, 1);
        // Second command mid-roll is rejected, not queued
        tick(&mut session, &TickInput::roll(Direction::Down));
        assert_eq!(session.moves, 1);
        assert_eq!(
            session.block.tip.map(|t| t.direction),
            Some(Direction::Right)
        );

        while session.block.tip.is_some() {
            tick(&mut session, &TickInput::default());
        }
        assert_eq!(session.block.orientation, Orientation::LyingX);
        assert_eq!(session.block.activity(), Activity::Idle);
    }

    #[test]
    fn test_hole_fall_resets_level() {
        let mut session = session_on(1, BridgeCycle::Autonomous);
        let fresh_board = session.board.clone();
        let fresh_block = session.block.clone();
        ready(&mut session);

        // Spawn (3, 5); two tips up lands standing on the hole at (3, 2)
        play(&mut session, "U");
        assert_eq!(session.block.orientation, Orientation::LyingZ);
        roll(&mut session, Direction::Up);
        assert_eq!(session.block.status, FallStatus::FallingThroughHole);

        let mut last_y = session.block.pos.y;
        let mut guard = 0;
        while session.block.status == FallStatus::FallingThroughHole {
            tick(&mut session, &TickInput::default());
            if session.block.status == FallStatus::FallingThroughHole {
                assert!(session.block.pos.y < last_y);
                last_y = session.block.pos.y;
            }
            guard += 1;
            assert!(guard < 20);
        }

        assert_eq!(session.level_index, 1);
        assert_eq!(session.deaths, 1);
        assert_eq!(session.board, fresh_board);
        assert_eq!(session.block, fresh_block);
        assert!(session.bridges.is_empty());
        assert!(session.drain_events().contains(&GameEvent::LevelFailed(1)));
    }

    #[test]
    fn test_fragile_consumption_then_plain_fall() {
        let mut session = session_on(2, BridgeCycle::Autonomous);
        ready(&mut session);

        // Lying across the fragile pair (9, 2)-(9, 3); weight is spread
        let fragile = Cell::new(9, 4);
        session.block.extents = Orientation::LyingZ.extents();
        session.block.orientation = Orientation::LyingZ;
        session.block.pos = glam::Vec3::new(9.0 * CELL_SIZE, 0.0, 2.5 * CELL_SIZE);
        session.block.pos.y = session.block.rest_height();
        assert!(validator::inspect(&session.block, &session.board).is_empty());

        // Standing up onto (9, 4) breaks it
        roll(&mut session, Direction::Down);
        assert_eq!(session.block.status, FallStatus::Breaking { cell: fragile });
        assert_eq!(session.board.kind(fragile), TileKind::Empty);
        assert!(session.drain_events().contains(&GameEvent::Broke(fragile)));

        let tile_y = session.board.tile_world(fragile).y;
        let block_y = session.block.pos.y;
        tick(&mut session, &TickInput::default());
        assert!(session.board.tile_world(fragile).y < tile_y);
        assert!(session.block.pos.y < block_y);

        // Second visit to the consumed cell is an ordinary hole
        let mut block = session.block.clone();
        block.status = FallStatus::Resting;
        block.pos.y = block.rest_height();
        let events = validator::inspect(&block, &session.board);
        assert_eq!(events, vec![GameEvent::EnteredHole]);
    }

    #[test]
    fn test_level_one_scenario() {
        let mut session = session_on(1, BridgeCycle::Autonomous);
        ready(&mut session);
        assert_eq!(session.block.orientation, Orientation::StandingY);

        play(&mut session, "RDRURURRDDDLDLL");
        assert_eq!(session.block.status, FallStatus::ReachedTarget);
        assert_eq!(session.moves, 15);

        run_until_level_changes(&mut session);
        assert_eq!(session.level_index, 2);
        assert_eq!(session.status, SessionStatus::Playing);
        assert_eq!(session.level().name, "Thin Ice");
        assert_eq!(
            Cell::from_world(session.block.pos.x, session.block.pos.z),
            Cell::new(4, 10)
        );
        assert_eq!(session.block.status, FallStatus::SettlingIntoPlace);
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::LevelCompleted(1)));
        assert!(events.contains(&GameEvent::LevelStarted(2)));
    }

    /// Latch every bridge flat so the crossing cells hold
    fn lower_bridges(session: &mut Session) {
        let mut guard = 0;
        while !session.bridges.iter().all(|b| b.is_closed()) {
            tick(session, &TickInput::default());
            guard += 1;
            assert!(guard < 40);
        }
        for bridge in &mut session.bridges {
            assert!(bridge.nudge());
        }
        while !session.bridges.iter().all(|b| b.is_open()) {
            tick(session, &TickInput::default());
            guard += 1;
            assert!(guard < 80);
        }
    }

    #[test]
    fn test_full_session_win() {
        let mut session = session_on(1, BridgeCycle::Latching);
        let solutions = [
            "RDRURURRDDDLDLL",
            "RRRUURUUURULDDLLLLLDRU",
            "RRRDDLDRUURDLDDLLL",
            "RRRRRULDRDDDDRDLUR",
        ];
        for (i, moves) in solutions.into_iter().enumerate() {
            assert_eq!(session.level_index, i as u32 + 1);
            ready(&mut session);
            if !session.bridges.is_empty() {
                lower_bridges(&mut session);
                assert_eq!(session.board.kind(session.bridges[0].cells[0]), TileKind::Normal);
            }
            play(&mut session, moves);
            assert_eq!(session.block.status, FallStatus::ReachedTarget);
            run_until_level_changes(&mut session);
        }

        assert_eq!(session.status, SessionStatus::Won);
        assert_eq!(session.deaths, 0);
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::LevelCompleted(4)));
        assert_eq!(events.last(), Some(&GameEvent::SessionWon));

        // Terminal sessions ignore further ticks
        let ticks = session.time_ticks;
        tick(&mut session, &TickInput::roll(Direction::Up));
        assert_eq!(session.time_ticks, ticks);
    }

    #[test]
    fn test_switch_nudges_bridge() {
        let mut session = session_on(3, BridgeCycle::Latching);
        ready(&mut session);
        for _ in 0..20 {
            tick(&mut session, &TickInput::default());
        }
        assert!(session.bridges[0].is_closed());

        // Spawn (4, 4): one tip left lies across switch A at (2, 4) and (3, 4)
        play(&mut session, "L");
        assert_eq!(session.block.orientation, Orientation::LyingX);
        assert_eq!(session.bridges[0].angle, 85);
        assert_eq!(session.bridges[0].intent, HingeIntent::Opening);

        let mut guard = 0;
        while !session.bridges[0].is_open() {
            tick(&mut session, &TickInput::default());
            guard += 1;
            assert!(guard < 30);
        }
        assert_eq!(session.board.kind(Cell::new(6, 4)), TileKind::Normal);
        assert_eq!(session.board.kind(Cell::new(7, 4)), TileKind::Normal);
        // Bridge B untouched
        assert!(session.bridges[1].is_closed());
    }

    #[test]
    fn test_overhang_stands_up_on_supported_cell() {
        let mut session = session_on(1, BridgeCycle::Autonomous);
        ready(&mut session);

        // Standing on (3, 4); tipping up lies across hole (3, 2) and tile (3, 3)
        session.block.pos.z = 4.0 * CELL_SIZE;
        roll(&mut session, Direction::Up);

        let events = session.drain_events();
        assert_eq!(events, vec![GameEvent::Overhang(Direction::Down)]);
        assert_eq!(session.block.status, FallStatus::Resting);
        assert_eq!(session.block.orientation, Orientation::StandingY);
        assert_eq!(
            Cell::from_world(session.block.pos.x, session.block.pos.z),
            Cell::new(3, 3)
        );
        // Corrections are not player moves
        assert_eq!(session.moves, 1);
    }

    /// Lying block straddling hole (2, 5) and tile (3, 5) on level 1
    fn straddling_hole(session: &mut Session) {
        session.block.extents = Orientation::LyingX.extents();
        session.block.orientation = Orientation::LyingX;
        session.block.pos.x = 2.5 * CELL_SIZE;
        session.block.pos.y = session.block.rest_height();
    }

    #[test]
    fn test_corrective_roll_lands_standing() {
        let mut session = session_on(1, BridgeCycle::Autonomous);
        ready(&mut session);
        straddling_hole(&mut session);

        let events = validator::inspect(&session.block, &session.board);
        assert_eq!(events, vec![GameEvent::Overhang(Direction::Right)]);
        session.apply_position_events(events);
        assert_eq!(session.block.status, FallStatus::CorrectiveRoll);
        assert_eq!(
            session.block.activity(),
            Activity::Animating(crate::sim::block::AnimationKind::CorrectiveRoll)
        );

        let mut ticks = 0;
        while session.block.status == FallStatus::CorrectiveRoll {
            tick(&mut session, &TickInput::default());
            ticks += 1;
        }
        assert_eq!(ticks, 4);
        assert_eq!(session.block.orientation, Orientation::StandingY);
        assert_eq!(
            Cell::from_world(session.block.pos.x, session.block.pos.z),
            Cell::new(3, 5)
        );
        assert_eq!(session.block.status, FallStatus::Resting);
    }

    #[test]
    fn test_corrective_roll_ignores_cell_beyond_support() {
        let mut session = session_on(1, BridgeCycle::Autonomous);
        ready(&mut session);
        session.board.set(Cell::new(4, 5), TileKind::Empty);
        straddling_hole(&mut session);

        let events = validator::inspect(&session.block, &session.board);
        session.apply_position_events(events);
        while session.block.status == FallStatus::CorrectiveRoll {
            tick(&mut session, &TickInput::default());
        }

        assert_eq!(session.block.status, FallStatus::Resting);
        assert_eq!(
            Cell::from_world(session.block.pos.x, session.block.pos.z),
            Cell::new(3, 5)
        );
        assert!(!session.drain_events().contains(&GameEvent::EnteredHole));
    }

    proptest! {
        #[test]
        fn prop_orientation_and_height_invariants(moves in prop::collection::vec(0usize..4, 1..40)) {
            let mut session = session_on(1, BridgeCycle::Autonomous);
            ready(&mut session);

            let idle = TickInput::default();
            for index in moves {
                let input = TickInput::roll(Direction::ALL[index]);
                for step in 0..12 {
                    let before = session.block.clone();
                    let level = session.level_index;
                    let resting_idle = before.is_idle();
                    tick(&mut session, if step == 0 { &input } else { &idle });
                    if session.take_restaged() {
                        while session.reveal_next() {}
                    }
                    let after = &session.block;

                    prop_assert!(after.is_consistent());
                    prop_assert_eq!(Orientation::from_extents(after.extents), Some(after.orientation));

                    if session.level_index != level || session.block == Block::spawn(session.level().spawn) {
                        continue;
                    }
                    let falling = matches!(
                        before.status,
                        FallStatus::FallingThroughHole
                            | FallStatus::Breaking { .. }
                            | FallStatus::ReachedTarget
                            | FallStatus::SettlingIntoPlace
                    );
                    if falling && after.status == before.status {
                        prop_assert!(after.pos.y <= before.pos.y);
                    }
                    if resting_idle && step > 0 && after.status == FallStatus::Resting {
                        prop_assert_eq!(after.pos.y, before.pos.y);
                    }
                }
            }
        }
    }
}
