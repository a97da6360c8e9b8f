use crate::apples::Apples;
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::grid::{Direction, Pos, Size};
use crate::input::{Input, InputSet};
use crate::snek::Snek;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Waiting at the new-game prompt, before the first run or after a loss.
    #[default]
    Idle,
    Running,
    Paused,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Paused => "paused",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collision {
    Wall,
    Itself,
}

/// What a call to [`GameEngine::step`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    Waiting,               // Not running this tick, nothing moved
    Moved,                 // Normal movement
    Nommed { score: u32 }, // Ate an apple, with the new score
    Collision(Collision),  // Hit a wall or itself, back to idle
    Terminated,            // Quit, the driver should stop
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepResult::Waiting => f.write_str("waiting"),
            StepResult::Moved => f.write_str("moved"),
            StepResult::Nommed { score } => write!(f, "nommed({score})"),
            StepResult::Collision(Collision::Wall) => f.write_str("hit-wall"),
            StepResult::Collision(Collision::Itself) => f.write_str("hit-self"),
            StepResult::Terminated => f.write_str("terminated"),
        }
    }
}

/// Everything that belongs to one run: the field, the snake, the apples and
/// the score and speed they have earned.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SnekHaus {
    size: Size,
    snek: Snek,
    apples: Apples,
    score: u32,
    speed: u32,
}

impl SnekHaus {
    fn new(config: &GameConfig, rng: &mut impl Rng) -> Self {
        let size = config.grid_size();
        let snek = Snek::new(size, config.initial_snake_length);
        let mut apples = Apples::default();
        apples.place(usize::from(config.initial_apples), size, &snek, rng);

        SnekHaus {
            size,
            snek,
            apples,
            score: 0,
            speed: config.initial_speed,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn snek(&self) -> &Snek {
        &self.snek
    }

    pub fn apples(&self) -> &Apples {
        &self.apples
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    fn check_collision(&self, head: Pos) -> Option<Collision> {
        if !self.size.contains(head) {
            Some(Collision::Wall)
        } else if self.snek.hit_itself() {
            Some(Collision::Itself)
        } else {
            None
        }
    }

    fn check_nomming(&mut self, head: Pos, speed_change: f64, rng: &mut impl Rng) -> bool {
        if !self.apples.take(head) {
            return false;
        }

        self.apples.place(1, self.size, &self.snek, rng);
        self.score += 1;
        self.speed = scale_speed(self.speed, speed_change);
        debug!(
            "Apple eaten at {head}, score {} speed {}",
            self.score, self.speed
        );
        true
    }

    /// Move, then collision check against the grown body, then either eat or
    /// drop the tail.
    fn slither_on(&mut self, speed_change: f64, rng: &mut impl Rng) -> StepResult {
        let Some(head) = self.snek.slither() else {
            return StepResult::Waiting;
        };

        if let Some(collision) = self.check_collision(head) {
            return StepResult::Collision(collision);
        }

        if self.check_nomming(head, speed_change, rng) {
            return StepResult::Nommed { score: self.score };
        }

        self.snek.shed_tail();
        StepResult::Moved
    }
}

/// Rounds half to even on every step, so growth compounds through the
/// rounding rather than following `initial * factor^n`.
pub fn scale_speed(speed: u32, factor: f64) -> u32 {
    (f64::from(speed) * factor).round_ties_even() as u32
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameState {
    phase: Phase,
    haus: SnekHaus,
}

impl GameState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn haus(&self) -> &SnekHaus {
        &self.haus
    }
}

/// An owned copy of the state for a renderer to draw from.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub phase: Phase,
    pub snake: Vec<Pos>,
    pub apples: Vec<Pos>,
    pub score: u32,
    pub speed: u32,
    pub direction: Direction,
}

pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
    state: GameState,
    terminated: bool,
}

impl GameEngine {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Seeded engine: identical inputs give identical runs, apples included.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let size = config.grid_size();
        info!("Engine ready on a {}x{} grid", size.width, size.height);

        Ok(GameEngine {
            state: GameState {
                phase: Phase::Idle,
                haus: SnekHaus {
                    size,
                    speed: config.initial_speed,
                    ..SnekHaus::default()
                },
            },
            config,
            rng,
            terminated: false,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid_size(&self) -> Size {
        self.state.haus.size
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// How long the driver should wait between ticks at the current speed.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.state.haus.speed.max(1)))
    }

    pub fn snapshot(&self) -> Snapshot {
        let haus = &self.state.haus;
        Snapshot {
            phase: self.state.phase,
            snake: haus.snek.cells().collect(),
            apples: haus.apples.iter().collect(),
            score: haus.score,
            speed: haus.speed,
            direction: haus.snek.direction(),
        }
    }

    /// Advances one tick. Input is handled first; if the game is running
    /// after that, the snake moves once.
    pub fn step(&mut self, inputs: InputSet) -> StepResult {
        if self.terminated {
            return StepResult::Terminated;
        }

        if inputs.contains(Input::Quit) {
            return self.terminate();
        }

        match self.state.phase {
            Phase::Idle => {
                if inputs.contains(Input::Cancel) {
                    return self.terminate();
                } else if inputs.contains(Input::Start) {
                    self.new_game();
                }
            }
            Phase::Paused => {
                if inputs.contains(Input::Cancel) {
                    info!("Run abandoned with score {}", self.state.haus.score);
                    self.state.phase = Phase::Idle;
                } else if inputs.contains(Input::Pause) {
                    info!("Resumed");
                    self.state.phase = Phase::Running;
                }
            }
            Phase::Running => {
                if inputs.contains(Input::Cancel) || inputs.contains(Input::Pause) {
                    info!("Paused");
                    self.state.phase = Phase::Paused;
                }
                self.state
                    .haus
                    .snek
                    .steer(inputs.iter().filter_map(|input| input.direction()));
            }
        }

        if self.state.phase != Phase::Running {
            return StepResult::Waiting;
        }

        let result = self
            .state
            .haus
            .slither_on(self.config.speed_change, &mut self.rng);
        if let StepResult::Collision(collision) = result {
            info!(
                "Game over ({collision:?}) with score {}",
                self.state.haus.score
            );
            self.state.phase = Phase::Idle;
        }
        result
    }

    fn new_game(&mut self) {
        self.state.haus = SnekHaus::new(&self.config, &mut self.rng);
        self.state.phase = Phase::Running;
        info!("New game started");
    }

    fn terminate(&mut self) -> StepResult {
        info!("Quit requested");
        self.terminated = true;
        StepResult::Terminated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> GameConfig {
        // 10x10 grid
        GameConfig {
            screen_width: 160,
            screen_height: 160,
            ..GameConfig::default()
        }
    }

    fn running_engine(seed: u64) -> GameEngine {
        let mut engine = GameEngine::with_seed(small_config(), seed).unwrap();
        engine.new_game();
        engine
    }

    /// Replaces the run with a hand-built snake and apple layout.
    fn set_haus(engine: &mut GameEngine, snek: Snek, apples: &[Pos]) {
        let haus = &mut engine.state.haus;
        haus.snek = snek;
        haus.apples.clear();
        for apple in apples {
            haus.apples.plant(*apple, &haus.snek);
        }
    }

    fn step_with(engine: &mut GameEngine, inputs: &[Input]) -> StepResult {
        engine.step(inputs.iter().copied().collect())
    }

    #[test]
    fn test_engine_starts_idle_and_empty() {
        let engine = GameEngine::with_seed(small_config(), 1).unwrap();
        let snapshot = engine.snapshot();

        assert_eq!(snapshot.phase, Phase::Idle);
        assert!(snapshot.snake.is_empty());
        assert!(snapshot.apples.is_empty());
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.speed, 10);
        assert!(!engine.is_terminated());
        assert_eq!(engine.grid_size(), Size::new(10, 10));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GameConfig {
            block_size: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            GameEngine::new(config),
            Err(ConfigError::ZeroBlockSize)
        ));
    }

    #[test]
    fn test_new_game_layout() {
        let mut engine = GameEngine::with_seed(small_config(), 3).unwrap();
        engine.new_game();
        let snapshot = engine.snapshot();

        assert_eq!(snapshot.phase, Phase::Running);
        assert_eq!(
            snapshot.snake,
            vec![Pos::new(5, 5), Pos::new(4, 5), Pos::new(3, 5)]
        );
        assert_eq!(snapshot.apples.len(), 3);
        assert_eq!(snapshot.direction, Direction::East);
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.speed, 10);
    }

    #[test]
    fn test_start_tick_also_moves() {
        let mut engine = GameEngine::with_seed(small_config(), 3).unwrap();

        let result = step_with(&mut engine, &[Input::Start]);
        assert_ne!(result, StepResult::Waiting);
        assert_eq!(engine.phase(), Phase::Running);
        assert_eq!(engine.snapshot().snake[0], Pos::new(6, 5));
    }

    #[test]
    fn test_idle_ignores_other_symbols() {
        let mut engine = GameEngine::with_seed(small_config(), 3).unwrap();
        let before = engine.snapshot();

        let result = step_with(&mut engine, &[Input::Up, Input::Pause, Input::Right]);
        assert_eq!(result, StepResult::Waiting);
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_quit_from_every_phase() {
        for phase in [Phase::Idle, Phase::Running, Phase::Paused] {
            let mut engine = running_engine(5);
            engine.state.phase = phase;

            // Quit dominates whatever else arrives in the tick
            let result = step_with(&mut engine, &[Input::Start, Input::Pause, Input::Quit]);
            assert_eq!(result, StepResult::Terminated);
            assert!(engine.is_terminated());
            assert_eq!(engine.phase(), phase);
        }
    }

    #[test]
    fn test_cancel_from_idle_terminates() {
        let mut engine = GameEngine::with_seed(small_config(), 3).unwrap();

        // Cancel wins over start at the prompt
        let result = step_with(&mut engine, &[Input::Start, Input::Cancel]);
        assert_eq!(result, StepResult::Terminated);
        assert!(engine.is_terminated());

        // Once terminated nothing else happens
        assert_eq!(step_with(&mut engine, &[Input::Start]), StepResult::Terminated);
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut engine = running_engine(9);

        let result = step_with(&mut engine, &[Input::Pause]);
        assert_eq!(result, StepResult::Waiting);
        assert_eq!(engine.phase(), Phase::Paused);

        let paused = engine.snapshot();
        let result = step_with(&mut engine, &[Input::Pause]);
        assert_ne!(result, StepResult::Waiting);
        assert_eq!(engine.phase(), Phase::Running);
        assert_ne!(engine.snapshot().snake, paused.snake, "Resume tick moves");
    }

    #[test]
    fn test_cancel_pauses_then_abandons() {
        let mut engine = running_engine(9);

        step_with(&mut engine, &[Input::Cancel]);
        assert_eq!(engine.phase(), Phase::Paused);

        // Cancel beats resume when both arrive
        step_with(&mut engine, &[Input::Cancel, Input::Pause]);
        assert_eq!(engine.phase(), Phase::Idle);
        assert!(!engine.is_terminated());
    }

    #[test]
    fn test_pause_idempotence() {
        let mut engine = running_engine(11);
        step_with(&mut engine, &[Input::Pause]);
        let paused = engine.state().clone();

        for _ in 0..10 {
            assert_eq!(engine.step(InputSet::new()), StepResult::Waiting);
            assert_eq!(engine.state(), &paused);
        }

        // Direction symbols are ignored while paused
        step_with(&mut engine, &[Input::Up]);
        assert_eq!(engine.state(), &paused);
    }

    #[test]
    fn test_pausing_tick_still_steers() {
        let mut engine = running_engine(11);

        step_with(&mut engine, &[Input::Pause, Input::Up]);
        assert_eq!(engine.phase(), Phase::Paused);
        assert_eq!(engine.snapshot().direction, Direction::North);
    }

    #[test]
    fn test_movement_keeps_length() {
        let mut engine = running_engine(13);
        set_haus(
            &mut engine,
            Snek::from_cells(
                [Pos::new(5, 5), Pos::new(4, 5), Pos::new(3, 5)],
                Direction::East,
            ),
            &[Pos::new(0, 9), Pos::new(9, 9), Pos::new(0, 0)],
        );

        for _ in 0..3 {
            let before = engine.snapshot().snake.len();
            assert_eq!(engine.step(InputSet::new()), StepResult::Moved);
            assert_eq!(engine.snapshot().snake.len(), before);
        }
        assert_eq!(engine.snapshot().snake[0], Pos::new(8, 5));
    }

    #[test]
    fn test_opposite_direction_guard() {
        let mut engine = running_engine(13);

        step_with(&mut engine, &[Input::Left]);
        assert_eq!(engine.snapshot().direction, Direction::East);
        assert_eq!(engine.phase(), Phase::Running);

        step_with(&mut engine, &[Input::Down]);
        assert_eq!(engine.snapshot().direction, Direction::South);

        step_with(&mut engine, &[Input::Up]);
        assert_eq!(engine.snapshot().direction, Direction::South);
    }

    #[test]
    fn test_eating_grows_and_replaces_apple() {
        let mut engine = running_engine(17);
        set_haus(
            &mut engine,
            Snek::from_cells(
                [Pos::new(5, 5), Pos::new(4, 5), Pos::new(3, 5)],
                Direction::East,
            ),
            &[Pos::new(6, 5), Pos::new(0, 0), Pos::new(9, 9)],
        );

        let result = engine.step(InputSet::new());
        assert_eq!(result, StepResult::Nommed { score: 1 });

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.snake.len(), 4);
        assert_eq!(snapshot.snake[0], Pos::new(6, 5));
        assert_eq!(snapshot.snake[3], Pos::new(3, 5), "Tail not removed");
        assert_eq!(snapshot.apples.len(), 3);
        assert!(!snapshot.apples.contains(&Pos::new(6, 5)));
        assert_eq!(snapshot.score, 1);
        assert_eq!(snapshot.speed, 11);
    }

    #[test]
    fn test_wall_collision() {
        let mut engine = running_engine(19);
        set_haus(
            &mut engine,
            Snek::from_cells(
                [Pos::new(9, 2), Pos::new(8, 2), Pos::new(7, 2)],
                Direction::East,
            ),
            &[Pos::new(0, 0)],
        );

        let result = engine.step(InputSet::new());
        assert_eq!(result, StepResult::Collision(Collision::Wall));
        assert_eq!(engine.phase(), Phase::Idle);

        // The fatal head is kept for the game-over screen
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.snake[0], Pos::new(10, 2));
        assert_eq!(snapshot.snake.len(), 4);
    }

    #[test]
    fn test_wall_collision_top_edge() {
        let mut engine = running_engine(19);
        set_haus(
            &mut engine,
            Snek::from_cells([Pos::new(4, 0), Pos::new(4, 1)], Direction::North),
            &[],
        );

        assert_eq!(
            engine.step(InputSet::new()),
            StepResult::Collision(Collision::Wall)
        );
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_self_collision() {
        let mut engine = running_engine(23);
        // Heading west with the body curling round below the head.
        // Turning south runs into (4, 6), which is not the tail.
        set_haus(
            &mut engine,
            Snek::from_cells(
                [
                    Pos::new(4, 5),
                    Pos::new(5, 5),
                    Pos::new(5, 6),
                    Pos::new(4, 6),
                    Pos::new(3, 6),
                ],
                Direction::West,
            ),
            &[Pos::new(0, 0)],
        );

        let result = step_with(&mut engine, &[Input::Down]);
        assert_eq!(result, StepResult::Collision(Collision::Itself));
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_chasing_tail_is_a_collision() {
        // The head enters the cell the tail is leaving this same tick. The
        // check runs before the tail moves, so this ends the game.
        let mut engine = running_engine(29);
        set_haus(
            &mut engine,
            Snek::from_cells(
                [Pos::new(4, 5), Pos::new(5, 5), Pos::new(5, 4), Pos::new(4, 4)],
                Direction::West,
            ),
            &[Pos::new(0, 0)],
        );

        let result = step_with(&mut engine, &[Input::Up]);
        assert_eq!(result, StepResult::Collision(Collision::Itself));
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_speed_rounding_compounds() {
        let mut speed = 10;
        let mut seen = Vec::new();
        for _ in 0..10 {
            speed = scale_speed(speed, 1.1);
            seen.push(speed);
        }
        assert_eq!(seen, vec![11, 12, 13, 14, 15, 16, 18, 20, 22, 24]);

        // Not the same as rounding the closed form
        let closed_form = (10.0 * 1.1f64.powi(4)).round() as u32;
        assert_eq!(closed_form, 15);
        assert_eq!(seen[3], 14);
    }

    #[test]
    fn test_speed_after_consecutive_apples() {
        let mut engine = running_engine(31);
        // A row of apples straight ahead
        let row: Vec<Pos> = (6..10).map(|x| Pos::new(x, 5)).collect();
        set_haus(
            &mut engine,
            Snek::from_cells(
                [Pos::new(5, 5), Pos::new(4, 5), Pos::new(3, 5)],
                Direction::East,
            ),
            &row,
        );

        let mut expected = 10;
        for score in 1..=4 {
            assert_eq!(engine.step(InputSet::new()), StepResult::Nommed { score });
            expected = scale_speed(expected, 1.1);
            assert_eq!(engine.snapshot().speed, expected);
        }
        assert_eq!(expected, 14);
        assert_eq!(engine.snapshot().snake.len(), 7);
        assert_eq!(engine.snapshot().apples.len(), 4);
    }

    #[test]
    fn test_reset_is_deterministic() {
        let mut engine = running_engine(37);
        let first = engine.snapshot();

        // Lose by running east into the wall
        for _ in 0..10 {
            if engine.step(InputSet::new()) == StepResult::Collision(Collision::Wall) {
                break;
            }
        }
        assert_eq!(engine.phase(), Phase::Idle);

        engine.new_game();
        let second = engine.snapshot();

        assert_eq!(second.snake, first.snake);
        assert_eq!(second.score, 0);
        assert_eq!(second.speed, 10);
        assert_eq!(second.direction, Direction::East);
        assert_eq!(second.phase, Phase::Running);
    }

    #[test]
    fn test_seeded_runs_match() {
        let inputs = [
            vec![Input::Start],
            vec![],
            vec![Input::Down],
            vec![],
            vec![Input::Left],
        ];

        let run = |seed| {
            let mut engine = GameEngine::with_seed(small_config(), seed).unwrap();
            for tick in &inputs {
                step_with(&mut engine, tick);
            }
            engine.snapshot()
        };

        assert_eq!(run(41), run(41));
    }

    #[test]
    fn test_tick_interval_tracks_speed() {
        let mut engine = running_engine(43);
        assert_eq!(engine.tick_interval(), Duration::from_millis(100));

        engine.state.haus.speed = 20;
        assert_eq!(engine.tick_interval(), Duration::from_millis(50));
    }
}
