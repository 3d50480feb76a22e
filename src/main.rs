//! Roll Block headless runner
//!
//! Plays a move script or a seeded random demo against the simulation,
//! driving the clock at a presentation frame rate, and reports the outcome.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use roll_block::sim::{Direction, GameEvent, LevelPack, Session, SimClock};
use roll_block::{BridgeCycle, Settings};

/// Presentation frame interval, deliberately unrelated to the tick rate
const FRAME_DT: f64 = 1.0 / 60.0;

#[derive(Parser, Debug)]
#[command(name = "roll-block", version, about = "Headless rolling block puzzle runner")]
struct Args {
    /// Level to start on (1-based)
    #[arg(short, long)]
    level: Option<u32>,

    /// Move script such as RDRURURRDDDLDLL (U, D, L, R; whitespace ignored)
    #[arg(short, long, conflicts_with = "demo")]
    moves: Option<String>,

    /// Play random moves from this seed
    #[arg(long)]
    demo: Option<u64>,

    /// Simulated seconds to run before giving up
    #[arg(long, default_value_t = 120.0)]
    seconds: f64,

    /// Level pack JSON file (defaults to the shipped levels)
    #[arg(long)]
    levels: Option<PathBuf>,

    /// Settings JSON file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Bridge behaviour: autonomous or latching
    #[arg(long, value_parser = parse_cycle)]
    bridge_cycle: Option<BridgeCycle>,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

fn parse_cycle(s: &str) -> Result<BridgeCycle, String> {
    BridgeCycle::from_str(s).ok_or_else(|| format!("unknown bridge cycle '{}'", s))
}

/// Where the next move comes from
enum MoveSource {
    Script(std::vec::IntoIter<Direction>),
    Demo(Pcg32),
    None,
}

impl MoveSource {
    fn next(&mut self) -> Option<Direction> {
        match self {
            MoveSource::Script(moves) => moves.next(),
            MoveSource::Demo(rng) => Some(Direction::ALL[rng.random_range(0..Direction::ALL.len())]),
            MoveSource::None => None,
        }
    }
}

fn parse_moves(script: &str) -> Result<Vec<Direction>, String> {
    script
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| Direction::from_char(c).ok_or_else(|| format!("invalid move '{}'", c)))
        .collect()
}

fn report(event: GameEvent) {
    match event {
        GameEvent::LevelStarted(n) => println!("Level {} started", n),
        GameEvent::LevelCompleted(n) => println!("Level {} complete", n),
        GameEvent::LevelFailed(n) => println!("Level {} failed, restarting", n),
        GameEvent::SessionWon => println!("All levels complete!"),
        GameEvent::SessionLost => println!("Out of lives"),
        other => log::debug!("{:?}", other),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = match &args.settings {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    if let Some(level) = args.level {
        settings.start_level = level;
    }
    if let Some(cycle) = args.bridge_cycle {
        settings.bridge_cycle = cycle;
    }
    settings.validate()?;

    let pack = match &args.levels {
        Some(path) => LevelPack::from_file(path)?,
        None => LevelPack::shipped()?,
    };
    log::info!(
        "Roll Block starting: {} levels, bridges {}",
        pack.len(),
        settings.bridge_cycle.as_str()
    );

    let mut source = match (&args.moves, args.demo) {
        (Some(script), _) => MoveSource::Script(parse_moves(script)?.into_iter()),
        (None, Some(seed)) => MoveSource::Demo(Pcg32::seed_from_u64(seed)),
        (None, None) => MoveSource::None,
    };
    let scripted = !matches!(source, MoveSource::Demo(_));

    let mut session = Session::new(pack, settings)?;
    let mut clock = SimClock::new(&mut session, 0.0);
    let mut now = 0.0;

    for event in session.drain_events() {
        report(event);
    }

    while now < args.seconds && !session.status.is_terminal() {
        if session.block.is_idle() && !clock.has_pending_input() {
            match source.next() {
                Some(direction) => clock.queue(direction),
                // Script finished and the block has come to rest
                None if scripted => break,
                None => {}
            }
        }

        now += FRAME_DT;
        clock.pump(&mut session, now);
        for event in session.drain_events() {
            report(event);
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    } else {
        println!(
            "Level {} \"{}\": {:?} after {:.2}s, {} moves, {} deaths",
            session.level_index,
            session.level().name,
            session.status,
            now,
            session.moves,
            session.deaths
        );
    }
    Ok(())
}
