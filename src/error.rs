use std::fmt;

/// Rejected [`GameConfig`](crate::GameConfig) values, reported before any
/// engine is built so apple placement can never spin on a full grid.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    ZeroBlockSize,
    EmptyGrid { width: i32, height: i32 },
    ZeroSnakeLength,
    SnakeTooLong { length: u16, max: i32 },
    NotEnoughRoom { cells: i64, required: i64 },
    ZeroSpeed,
    InvalidSpeedChange { factor: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroBlockSize => write!(f, "block size must be non-zero"),
            Self::EmptyGrid { width, height } => {
                write!(f, "derived grid {width}x{height} has no playable cells")
            }
            Self::ZeroSnakeLength => write!(f, "initial snake length must be non-zero"),
            Self::SnakeTooLong { length, max } => write!(
                f,
                "initial snake length {length} does not fit the grid (max {max})"
            ),
            Self::NotEnoughRoom { cells, required } => write!(
                f,
                "grid has {cells} cells, needs more than {required} for snake and apples"
            ),
            Self::ZeroSpeed => write!(f, "initial speed must be positive"),
            Self::InvalidSpeedChange { factor } => {
                write!(f, "speed change factor {factor} must be finite and >= 1.0")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseInputError {
    pub symbol: String,
}

impl fmt::Display for ParseInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown input symbol `{}`", self.symbol)
    }
}

impl std::error::Error for ParseInputError {}
