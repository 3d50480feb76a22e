//! Simulation clock
//!
//! Drives the session from a caller-provided monotonic time. The fixed tick
//! and the reveal cadence each keep their own next-due watermark, so the
//! outcome depends only on elapsed time, never on how often `pump` is called.

use super::block::Direction;
use super::session::Session;
use super::tick::{TickInput, tick};

#[derive(Debug, Clone)]
pub struct SimClock {
    tick_interval: f64,
    reveal_interval: f64,
    max_catchup_ticks: u32,
    next_tick: f64,
    next_reveal: f64,
    /// One-shot input, cleared once a tick has consumed it
    input: TickInput,
}

impl SimClock {
    /// Clock for `session` starting at `now`; the first tick and reveal fall
    /// due one interval later
    pub fn new(session: &mut Session, now: f64) -> Self {
        session.take_restaged();
        let settings = session.settings();
        Self {
            tick_interval: settings.tick_interval,
            reveal_interval: settings.reveal_interval,
            max_catchup_ticks: settings.max_catchup_ticks,
            next_tick: now + settings.tick_interval,
            next_reveal: now + settings.reveal_interval,
            input: TickInput::default(),
        }
    }

    /// Queue a move command for the next tick. A newer command replaces an unconsumed one.
    pub fn queue(&mut self, direction: Direction) {
        self.input.roll = Some(direction);
    }

    pub fn has_pending_input(&self) -> bool {
        self.input.roll.is_some()
    }

    /// Restart reveal staging from `now`
    pub fn restart_reveal(&mut self, now: f64) {
        self.next_reveal = now + self.reveal_interval;
    }

    /// Run every tick and reveal due at `now`, in time order. Returns ticks run.
    pub fn pump(&mut self, session: &mut Session, now: f64) -> u32 {
        let mut ticks = 0;
        loop {
            if session.status.is_terminal() {
                break;
            }

            let tick_due = self.next_tick <= now;
            let reveal_due = self.next_reveal <= now && !session.board.is_fully_revealed();

            if reveal_due && (!tick_due || self.next_reveal <= self.next_tick) {
                session.reveal_next();
                self.next_reveal += self.reveal_interval;
                continue;
            }
            if !tick_due {
                break;
            }
            if ticks == self.max_catchup_ticks {
                log::debug!(
                    "Clock {:.3}s behind, resyncing",
                    now - self.next_tick
                );
                self.next_tick = now + self.tick_interval;
                continue;
            }

            let at = self.next_tick;
            tick(session, &self.input);
            self.input = TickInput::default();
            self.next_tick += self.tick_interval;
            ticks += 1;

            if session.take_restaged() {
                self.restart_reveal(at);
            }
        }
        ticks
    }
}
