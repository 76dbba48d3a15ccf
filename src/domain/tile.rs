/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Empty,
    Wall,
    /// Ghost-house door: blocks the player, permeable for ghosts
    /// entering or leaving the house.
    Gate,
    Pellet,
    PowerPellet,
    // Bonus fruit symbols, also used as per-level badges.
    Cherry,
    Strawberry,
    Peach,
    Apple,
    Grapes,
    Galaxian,
    Bell,
    Key,
}

/// Number of distinct tile kinds, for per-kind counting arrays.
pub const TILE_KINDS: usize = 13;

impl Tile {
    /// Dense index used by the maze's per-kind counters.
    pub fn index(self) -> usize {
        match self {
            Tile::Empty => 0,
            Tile::Wall => 1,
            Tile::Gate => 2,
            Tile::Pellet => 3,
            Tile::PowerPellet => 4,
            Tile::Cherry => 5,
            Tile::Strawberry => 6,
            Tile::Peach => 7,
            Tile::Apple => 8,
            Tile::Grapes => 9,
            Tile::Galaxian => 10,
            Tile::Bell => 11,
            Tile::Key => 12,
        }
    }

    pub fn is_wall(self) -> bool {
        matches!(self, Tile::Wall)
    }

    pub fn is_gate(self) -> bool {
        matches!(self, Tile::Gate)
    }

    /// Either pellet kind?
    pub fn is_any_pellet(self) -> bool {
        matches!(self, Tile::Pellet | Tile::PowerPellet)
    }

    pub fn is_fruit(self) -> bool {
        matches!(
            self,
            Tile::Cherry
                | Tile::Strawberry
                | Tile::Peach
                | Tile::Apple
                | Tile::Grapes
                | Tile::Galaxian
                | Tile::Bell
                | Tile::Key
        )
    }

    /// Score awarded when the player lands on this tile.
    /// Fruit points come from the level table, not from here.
    pub fn score(self) -> u32 {
        match self {
            Tile::Pellet => 10,
            Tile::PowerPellet => 50,
            _ => 0,
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Empty
    }
}
