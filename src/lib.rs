//! Grid snake game engine. The engine is advanced one tick at a time with the
//! set of input symbols seen during that tick; drawing, key mapping and frame
//! timing belong to whoever drives it.

pub mod apples;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod input;
pub mod snek;

pub use config::GameConfig;
pub use engine::{Collision, GameEngine, GameState, Phase, Snapshot, StepResult};
pub use error::{ConfigError, ParseInputError};
pub use grid::{Direction, Pos, Size};
pub use input::{Input, InputSet};
