/// Maze model: fixed-topology grid plus named geometry.
///
/// ## Tile layers
///
/// Two layers:
///   - `original` — the maze as loaded. **Never mutated** after load.
///   - `tiles`    — the active copy (pellets get eaten, fruit appears).
///
/// All mutations go through `set()`, which also keeps the per-kind
/// counters in sync so "all pellets eaten" is an O(1) question.
/// `reset()` restores `tiles = original` at level start.
///
/// ## Out-of-range reads
///
/// `get()` on a coordinate outside the grid returns `Tile::Empty`
/// rather than faulting: movement lookahead routinely probes one tile
/// past the current position, and the tunnel mouths have no wall a
/// probe could be clamped against.

use super::tile::{Tile, TILE_KINDS};

/// Inclusive rectangular tile region.
#[derive(Clone, Copy, Debug)]
pub struct Region {
    pub min: (i32, i32),
    pub max: (i32, i32),
}

impl Region {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min.0 && x <= self.max.0 && y >= self.min.1 && y <= self.max.1
    }

    /// Center of the region in sub-tile coordinates.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min.0 + self.max.0) as f64 / 2.0,
            (self.min.1 + self.max.1) as f64 / 2.0,
        )
    }
}

pub struct Maze {
    width: i32,
    height: i32,
    /// Maze as loaded. Never mutated.
    original: Vec<Tile>,
    /// Active copy, reset from `original` at level start.
    tiles: Vec<Tile>,
    /// Per-kind tile counts for the active layer.
    counts: [usize; TILE_KINDS],

    // ── Named geometry ──
    /// Scatter-target corner per personality, in Blinky/Pinky/Inky/Clyde order.
    pub scatter_corners: [(i32, i32); 4],
    /// The two tunnel spans (slow zone for ghosts, wrap at the mouths).
    pub tunnels: [Region; 2],
    /// Zones where ghosts may not turn upward while scattering/chasing.
    pub red_zones: [Region; 2],
    pub player_start: (i32, i32),
    /// Ghost house, outer walls included.
    pub home_outer: Region,
    /// Floor of the ghost house where the ghosts idle.
    pub home_inner: Region,
    /// Tile just above the gate; target when leaving the house.
    pub home_exit: (i32, i32),
    /// Idle slot per personality inside (Blinky: just outside) the house.
    pub home_slots: [(i32, i32); 4],
    /// Where bonus fruit appears.
    pub fruit_tile: (i32, i32),
}

impl Maze {
    /// Build a maze from a tile grid and its geometry. Counts are derived.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        width: i32,
        height: i32,
        tiles: Vec<Tile>,
        scatter_corners: [(i32, i32); 4],
        tunnels: [Region; 2],
        red_zones: [Region; 2],
        player_start: (i32, i32),
        home_outer: Region,
        home_inner: Region,
        home_exit: (i32, i32),
        home_slots: [(i32, i32); 4],
        fruit_tile: (i32, i32),
    ) -> Self {
        assert_eq!(tiles.len(), (width * height) as usize);
        let mut maze = Maze {
            width,
            height,
            original: tiles.clone(),
            tiles,
            counts: [0; TILE_KINDS],
            scatter_corners,
            tunnels,
            red_zones,
            player_start,
            home_outer,
            home_inner,
            home_exit,
            home_slots,
            fruit_tile,
        };
        maze.recount();
        maze
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width && y >= 0 && y < self.height {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    /// Active tile at (x, y). Out of range reads as Empty.
    pub fn get(&self, x: i32, y: i32) -> Tile {
        self.idx(x, y).map_or(Tile::Empty, |i| self.tiles[i])
    }

    /// Set a tile in the active layer, keeping counts in sync.
    /// Out-of-range writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        if let Some(i) = self.idx(x, y) {
            let old = self.tiles[i];
            if old != tile {
                self.counts[old.index()] -= 1;
                self.counts[tile.index()] += 1;
                self.tiles[i] = tile;
            }
        }
    }

    /// Active-layer count of a tile kind.
    pub fn count(&self, tile: Tile) -> usize {
        self.counts[tile.index()]
    }

    /// Pellets of both kinds still on the board.
    pub fn pellets_left(&self) -> usize {
        self.count(Tile::Pellet) + self.count(Tile::PowerPellet)
    }

    /// Restore the active layer from the original (level start).
    pub fn reset(&mut self) {
        self.tiles.copy_from_slice(&self.original);
        self.recount();
    }

    fn recount(&mut self) {
        self.counts = [0; TILE_KINDS];
        for &t in &self.tiles {
            self.counts[t.index()] += 1;
        }
    }

    /// Is (x, y) inside either red zone (no upward turns for ghosts there)?
    pub fn in_red_zone(&self, x: i32, y: i32) -> bool {
        self.red_zones.iter().any(|z| z.contains(x, y))
    }

    /// Is (x, y) inside either tunnel span?
    pub fn in_tunnel(&self, x: i32, y: i32) -> bool {
        self.tunnels.iter().any(|z| z.contains(x, y))
    }

    /// Half the maze's diagonal span, in tiles. Used by the ghost
    /// decision engine as the reverse-direction penalty.
    pub fn half_diagonal(&self) -> f64 {
        ((self.width as f64).powi(2) + (self.height as f64).powi(2)).sqrt() / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_maze(rows: &[&str]) -> Maze {
        let h = rows.len() as i32;
        let w = rows[0].len() as i32;
        let mut tiles = Vec::with_capacity((w * h) as usize);
        for row in rows {
            for ch in row.chars() {
                tiles.push(match ch {
                    '#' => Tile::Wall,
                    '.' => Tile::Pellet,
                    'o' => Tile::PowerPellet,
                    '-' => Tile::Gate,
                    _ => Tile::Empty,
                });
            }
        }
        let r = Region { min: (0, 0), max: (0, 0) };
        Maze::new(
            w,
            h,
            tiles,
            [(0, 0); 4],
            [r, r],
            [r, r],
            (1, 1),
            r,
            r,
            (1, 1),
            [(1, 1); 4],
            (1, 1),
        )
    }

    #[test]
    fn out_of_range_reads_empty() {
        let m = tiny_maze(&["###", "#.#", "###"]);
        assert_eq!(m.get(-1, 0), Tile::Empty);
        assert_eq!(m.get(3, 1), Tile::Empty);
        assert_eq!(m.get(0, 99), Tile::Empty);
        assert_eq!(m.get(0, 0), Tile::Wall);
    }

    #[test]
    fn counts_track_mutation() {
        let mut m = tiny_maze(&["...", ".o.", "..."]);
        assert_eq!(m.count(Tile::Pellet), 8);
        assert_eq!(m.count(Tile::PowerPellet), 1);
        assert_eq!(m.pellets_left(), 9);

        m.set(0, 0, Tile::Empty);
        m.set(1, 1, Tile::Empty);
        assert_eq!(m.pellets_left(), 7);
        assert_eq!(m.count(Tile::Empty), 2);

        // Writing the same tile twice is a no-op for the counters.
        m.set(0, 0, Tile::Empty);
        assert_eq!(m.count(Tile::Empty), 2);
    }

    #[test]
    fn reset_restores_original() {
        let mut m = tiny_maze(&["...", "...", "..."]);
        for y in 0..3 {
            for x in 0..3 {
                m.set(x, y, Tile::Empty);
            }
        }
        assert_eq!(m.pellets_left(), 0);
        m.reset();
        assert_eq!(m.pellets_left(), 9);
    }

    #[test]
    fn out_of_range_write_ignored() {
        let mut m = tiny_maze(&["."]);
        m.set(5, 5, Tile::Wall);
        assert_eq!(m.count(Tile::Wall), 0);
        assert_eq!(m.pellets_left(), 1);
    }

    #[test]
    fn region_contains_and_center() {
        let r = Region { min: (2, 3), max: (4, 5) };
        assert!(r.contains(2, 3));
        assert!(r.contains(4, 5));
        assert!(!r.contains(5, 5));
        assert_eq!(r.center(), (3.0, 4.0));
    }
}
