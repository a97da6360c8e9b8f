use crate::grid::{Pos, Size};
use crate::snek::Snek;
use log::debug;
use rand::Rng;

/// The apples on the field, kept in placement order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Apples {
    cells: Vec<Pos>,
}

impl Apples {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = Pos> + '_ {
        self.cells.iter().copied()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Removes the apple at `pos`, if there is one.
    pub fn take(&mut self, pos: Pos) -> bool {
        match self.cells.iter().position(|apple| *apple == pos) {
            Some(index) => {
                self.cells.remove(index);
                true
            }
            None => false,
        }
    }

    /// Places `count` apples by rejection sampling: each draw is uniform over
    /// the grid and is redrawn until it lands clear of the snake and of every
    /// apple already down. The caller must leave enough free cells.
    pub fn place(&mut self, count: usize, size: Size, snek: &Snek, rng: &mut impl Rng) {
        for _ in 0..count {
            let pos = loop {
                let pos = Pos {
                    x: rng.gen_range(0..size.width),
                    y: rng.gen_range(0..size.height),
                };

                if !self.contains(pos) && !snek.contains(pos) {
                    break pos;
                }
            };
            self.plant(pos, snek);
        }
    }

    pub(crate) fn plant(&mut self, pos: Pos, snek: &Snek) {
        assert!(
            !self.contains(pos) && !snek.contains(pos),
            "Attempted to place apple at occupied cell {pos}"
        );
        debug!("Apple placed at {pos}");
        self.cells.push(pos);
    }
}
