use crate::error::ConfigError;
use crate::grid::Size;

/// Game tuning. The screen/block/wall fields describe the window layout only
/// as far as needed to derive the playable grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    pub block_size: u32,
    /// Wall thickness, in blocks, on every side of the field.
    pub wall_blocks: u32,
    /// Ticks per second at the start of a run.
    pub initial_speed: u32,
    pub speed_change: f64,
    pub initial_snake_length: u16,
    pub initial_apples: u16,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            screen_width: 800,
            screen_height: 600,
            block_size: 10,
            wall_blocks: 3,
            initial_speed: 10,
            speed_change: 1.1,
            initial_snake_length: 3,
            initial_apples: 3,
        }
    }
}

impl GameConfig {
    /// Playable cells left once the walls are taken off the screen.
    pub fn grid_size(&self) -> Size {
        let blocks = |pixels: u32| {
            let across = i64::from(pixels.checked_div(self.block_size).unwrap_or(0));
            let walls = 2 * i64::from(self.wall_blocks);
            (across - walls).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
        };
        Size::new(blocks(self.screen_width), blocks(self.screen_height))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }

        let size = self.grid_size();
        if size.width <= 0 || size.height <= 0 {
            return Err(ConfigError::EmptyGrid {
                width: size.width,
                height: size.height,
            });
        }

        // The body runs from the centre column back towards x = 0
        let max_length = size.center().x + 1;
        if self.initial_snake_length == 0 {
            return Err(ConfigError::ZeroSnakeLength);
        }
        if i32::from(self.initial_snake_length) > max_length {
            return Err(ConfigError::SnakeTooLong {
                length: self.initial_snake_length,
                max: max_length,
            });
        }

        let required = i64::from(self.initial_apples) + i64::from(self.initial_snake_length);
        if size.cells() <= required {
            return Err(ConfigError::NotEnoughRoom {
                cells: size.cells(),
                required,
            });
        }

        if self.initial_speed == 0 {
            return Err(ConfigError::ZeroSpeed);
        }
        if !self.speed_change.is_finite() || self.speed_change < 1.0 {
            return Err(ConfigError::InvalidSpeedChange {
                factor: self.speed_change,
            });
        }

        Ok(())
    }
}
