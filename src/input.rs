use crate::error::ParseInputError;
use crate::grid::Direction;
use std::str::FromStr;

/// Logical signals the driver can deliver in a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Input {
    Quit,
    Up,
    Down,
    Left,
    Right,
    Pause,
    Start,
    Cancel,
}

impl Input {
    pub const ALL: [Input; 8] = [
        Input::Quit,
        Input::Up,
        Input::Down,
        Input::Left,
        Input::Right,
        Input::Pause,
        Input::Start,
        Input::Cancel,
    ];

    pub fn direction(&self) -> Option<Direction> {
        match self {
            Input::Up => Some(Direction::North),
            Input::Down => Some(Direction::South),
            Input::Left => Some(Direction::West),
            Input::Right => Some(Direction::East),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl FromStr for Input {
    type Err = ParseInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quit" => Ok(Input::Quit),
            "up" => Ok(Input::Up),
            "down" => Ok(Input::Down),
            "left" => Ok(Input::Left),
            "right" => Ok(Input::Right),
            "pause" | "space" => Ok(Input::Pause),
            "start" | "enter" | "return" => Ok(Input::Start),
            "cancel" | "escape" | "esc" => Ok(Input::Cancel),
            _ => Err(ParseInputError {
                symbol: s.to_string(),
            }),
        }
    }
}

/// Unordered set of the symbols seen during one tick. Presence is all that
/// matters: pressing a key twice in a tick is the same as pressing it once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSet(u8);

impl InputSet {
    pub fn new() -> Self {
        InputSet(0)
    }

    pub fn insert(&mut self, input: Input) {
        self.0 |= input.bit();
    }

    pub fn contains(&self, input: Input) -> bool {
        self.0 & input.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Input> + '_ {
        Input::ALL.into_iter().filter(move |input| self.contains(*input))
    }
}

impl From<Input> for InputSet {
    fn from(input: Input) -> Self {
        InputSet(input.bit())
    }
}

impl FromIterator<Input> for InputSet {
    fn from_iter<I: IntoIterator<Item = Input>>(iter: I) -> Self {
        let mut set = InputSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<Input> for InputSet {
    fn extend<I: IntoIterator<Item = Input>>(&mut self, iter: I) {
        for input in iter {
            self.insert(input);
        }
    }
}

impl<const N: usize> From<[Input; N]> for InputSet {
    fn from(inputs: [Input; N]) -> Self {
        inputs.into_iter().collect()
    }
}
