use clap::Parser;
use log::{info, warn};
use simplelog::{Config, LevelFilter, WriteLogger};
use snek_engine::{GameConfig, GameEngine, Input, InputSet, Snapshot, StepResult};
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::thread;

/// Drives the snake engine from a tick script: one line per tick, holding the
/// symbols seen during that tick (quit up down left right pause start cancel).
#[derive(Parser, Debug)]
#[command(name = "snek-engine", version)]
struct Args {
    /// Tick script to replay; reads stdin when omitted
    script: Option<PathBuf>,

    /// Seed for apple placement, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Sleep between ticks at the pace set by the current speed
    #[arg(long)]
    realtime: bool,

    #[arg(long, default_value = "snek-engine.log")]
    log_file: PathBuf,

    /// More log detail (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(long, default_value_t = GameConfig::default().screen_width)]
    screen_width: u32,

    #[arg(long, default_value_t = GameConfig::default().screen_height)]
    screen_height: u32,

    #[arg(long, default_value_t = GameConfig::default().block_size)]
    block_size: u32,

    #[arg(long, default_value_t = GameConfig::default().wall_blocks)]
    wall_blocks: u32,

    #[arg(long, default_value_t = GameConfig::default().initial_speed)]
    initial_speed: u32,

    #[arg(long, default_value_t = GameConfig::default().speed_change)]
    speed_change: f64,

    #[arg(long, default_value_t = GameConfig::default().initial_snake_length)]
    initial_snake_length: u16,

    #[arg(long, default_value_t = GameConfig::default().initial_apples)]
    initial_apples: u16,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    fn game_config(&self) -> GameConfig {
        GameConfig {
            screen_width: self.screen_width,
            screen_height: self.screen_height,
            block_size: self.block_size,
            wall_blocks: self.wall_blocks,
            initial_speed: self.initial_speed,
            speed_change: self.speed_change,
            initial_snake_length: self.initial_snake_length,
            initial_apples: self.initial_apples,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // Set up logging before anything else
    WriteLogger::init(
        args.log_level(),
        Config::default(),
        File::create(&args.log_file)?,
    )
    .expect("Failed to initialize logger");

    info!("Starting snek-engine");

    let config = args.game_config();
    let mut engine = match args.seed {
        Some(seed) => GameEngine::with_seed(config, seed)?,
        None => GameEngine::new(config)?,
    };

    let script: Box<dyn BufRead> = match &args.script {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let mut out = io::stdout().lock();

    let mut tick = 0u64;
    for line in script.lines() {
        let Some(inputs) = parse_tick(&line?) else {
            continue;
        };

        tick += 1;
        let result = engine.step(inputs);
        writeln!(out, "{}", status_line(tick, &engine.snapshot(), result))?;

        if engine.is_terminated() {
            break;
        }
        if args.realtime {
            out.flush()?;
            thread::sleep(engine.tick_interval());
        }
    }

    info!("Stopped after {tick} ticks");
    Ok(())
}

/// One script line to one tick. Comment lines are not ticks; unknown symbols
/// are logged and dropped.
fn parse_tick(line: &str) -> Option<InputSet> {
    let line = line.trim();
    if line.starts_with('#') {
        return None;
    }

    let inputs = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .filter_map(|token| match token.parse::<Input>() {
            Ok(input) => Some(input),
            Err(e) => {
                warn!("Ignoring input: {e}");
                None
            }
        })
        .collect();
    Some(inputs)
}

fn status_line(tick: u64, snapshot: &Snapshot, result: StepResult) -> String {
    let head = snapshot
        .snake
        .first()
        .map_or_else(|| "-".to_string(), |pos| pos.to_string());
    format!(
        "tick={tick} phase={} score={} speed={} length={} head={head} result={result}",
        snapshot.phase,
        snapshot.score,
        snapshot.speed,
        snapshot.snake.len(),
    )
}
