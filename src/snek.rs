use crate::grid::{Direction, Pos, Size};
use std::collections::{HashSet, VecDeque};

/// The snake. `body` runs head first: index 0 is the head, the back is the
/// tail.
#[derive(Clone, Debug, PartialEq)]
pub struct Snek {
    body: VecDeque<Pos>,
    direction: Direction,
}

impl Default for Snek {
    fn default() -> Self {
        Snek {
            body: VecDeque::new(),
            direction: Direction::East,
        }
    }
}

impl Snek {
    /// Lays the snake out along the centre row, head on the centre cell and
    /// the rest trailing off towards x = 0, heading east.
    pub fn new(size: Size, initial_length: u16) -> Self {
        let head = size.center();
        let body = (0..i32::from(initial_length))
            .map(|i| Pos {
                x: head.x - i,
                y: head.y,
            })
            .collect();

        Snek {
            body,
            direction: Direction::East,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_cells(cells: impl IntoIterator<Item = Pos>, direction: Direction) -> Self {
        Snek {
            body: cells.into_iter().collect(),
            direction,
        }
    }

    pub fn head(&self) -> Option<Pos> {
        self.body.front().copied()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn cells(&self) -> impl Iterator<Item = Pos> + '_ {
        self.body.iter().copied()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.body.contains(&pos)
    }

    /// Applies this tick's requested headings in order. Each is checked
    /// against the heading held when the tick started, so the last legal
    /// request wins and a straight reversal is never taken.
    pub fn steer(&mut self, wanted: impl IntoIterator<Item = Direction>) {
        let blocked = self.direction.opposite();
        for direction in wanted {
            if direction != blocked {
                self.direction = direction;
            }
        }
    }

    /// Pushes a new head one cell along the current heading. The tail stays
    /// put until [`Snek::shed_tail`] is called.
    pub fn slither(&mut self) -> Option<Pos> {
        let new_head = self.head()?.offset(self.direction.into());
        self.body.push_front(new_head);
        Some(new_head)
    }

    pub fn shed_tail(&mut self) -> Option<Pos> {
        self.body.pop_back()
    }

    /// True when any two segments share a cell. Run between `slither` and
    /// `shed_tail`, this counts the outgoing tail as still occupied.
    pub fn hit_itself(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.body.len());
        !self.body.iter().all(|pos| seen.insert(*pos))
    }
}
