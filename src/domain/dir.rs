/// Absolute movement directions on the maze grid.
///
/// Screen coordinates: x grows rightward, y grows downward, so
/// `Up` is (0, -1). The declaration order UP, LEFT, DOWN, RIGHT is
/// the tie-break priority the ghost decision engine depends on.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Up,
    Left,
    Down,
    Right,
}

impl Dir {
    /// Tie-break / fallback iteration order.
    pub const PRIORITY: [Dir; 4] = [Dir::Up, Dir::Left, Dir::Down, Dir::Right];

    /// Unit delta (dx, dy) in tile units.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Left => (-1, 0),
            Dir::Down => (0, 1),
            Dir::Right => (1, 0),
        }
    }

    pub fn reverse(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Left => Dir::Right,
            Dir::Down => Dir::Up,
            Dir::Right => Dir::Left,
        }
    }

    /// The direction a left turn from this heading would take.
    pub fn turn_left(self) -> Dir {
        match self {
            Dir::Up => Dir::Left,
            Dir::Left => Dir::Down,
            Dir::Down => Dir::Right,
            Dir::Right => Dir::Up,
        }
    }

    /// The direction a right turn from this heading would take.
    pub fn turn_right(self) -> Dir {
        match self {
            Dir::Up => Dir::Right,
            Dir::Right => Dir::Down,
            Dir::Down => Dir::Left,
            Dir::Left => Dir::Up,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Dir::Left | Dir::Right)
    }
}
