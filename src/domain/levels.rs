/// Per-level difficulty table.
///
/// All values follow the original cabinet's dossier. Speeds are
/// percentages of the nominal "100%" tile speed; the session turns
/// them into keyframe clocks. The table flattens out at level 21,
/// higher levels reuse that row.

use super::tile::Tile;

/// Pellet limits for the shared release counter, Blinky..Clyde order.
/// Used only while the global counter is active (after a death).
pub const GLOBAL_RELEASE_LIMITS: [u32; 4] = [0, 7, 17, 32];

#[derive(Clone, Copy, Debug)]
pub struct LevelSpec {
    pub number: u32,
    /// Bonus fruit symbol for this level, also the level badge.
    pub fruit: Tile,
    pub fruit_points: u32,

    // Player speed, percent. "dots" variants apply while eat-slow is on.
    pub player_pct: u32,
    pub player_dots_pct: u32,
    pub player_fright_pct: u32,
    pub player_fright_dots_pct: u32,

    // Ghost speed, percent.
    pub ghost_pct: u32,
    pub ghost_tunnel_pct: u32,
    pub ghost_fright_pct: u32,

    pub fright_ms: f64,
    pub fright_flashes: u32,

    // Blinky's speed-ups as the maze empties.
    pub elroy1_dots: usize,
    pub elroy1_pct: u32,
    pub elroy2_dots: usize,
    pub elroy2_pct: u32,

    /// (scatter_ms, chase_ms) phases; the last chase never ends.
    pub waves: [(f64, f64); 4],

    /// Per-ghost pellet counts gating the house door, Blinky..Clyde.
    pub release_limits: [u32; 4],
    /// Forced release after this long in the house.
    pub max_home_ms: f64,
}

impl LevelSpec {
    /// Spec for a 1-based level number, clamped past the table's end.
    pub fn for_level(number: u32) -> Self {
        let n = number.clamp(1, 21);
        let (fruit, fruit_points) = fruit_for(n);
        let (player_pct, player_dots_pct, player_fright_pct, player_fright_dots_pct) =
            player_speeds(n);
        let (ghost_pct, ghost_tunnel_pct, ghost_fright_pct) = ghost_speeds(n);
        let (fright_ms, fright_flashes) = fright_for(n);
        let (elroy1_dots, elroy2_dots) = elroy_dots(n);
        LevelSpec {
            number,
            fruit,
            fruit_points,
            player_pct,
            player_dots_pct,
            player_fright_pct,
            player_fright_dots_pct,
            ghost_pct,
            ghost_tunnel_pct,
            ghost_fright_pct,
            fright_ms,
            fright_flashes,
            elroy1_dots,
            elroy1_pct: ghost_pct + 5,
            elroy2_dots,
            elroy2_pct: ghost_pct + 10,
            waves: waves_for(n),
            release_limits: release_limits(n),
            max_home_ms: if n <= 4 { 4000.0 } else { 3000.0 },
        }
    }
}

fn fruit_for(n: u32) -> (Tile, u32) {
    match n {
        1 => (Tile::Cherry, 100),
        2 => (Tile::Strawberry, 300),
        3 | 4 => (Tile::Peach, 500),
        5 | 6 => (Tile::Apple, 700),
        7 | 8 => (Tile::Grapes, 1000),
        9 | 10 => (Tile::Galaxian, 2000),
        11 | 12 => (Tile::Bell, 3000),
        _ => (Tile::Key, 5000),
    }
}

fn player_speeds(n: u32) -> (u32, u32, u32, u32) {
    match n {
        1 => (80, 71, 90, 79),
        2..=4 => (90, 79, 95, 83),
        5..=20 => (100, 87, 100, 87),
        _ => (90, 79, 90, 79),
    }
}

fn ghost_speeds(n: u32) -> (u32, u32, u32) {
    match n {
        1 => (75, 40, 50),
        2..=4 => (85, 45, 55),
        _ => (95, 50, 60),
    }
}

fn fright_for(n: u32) -> (f64, u32) {
    let (secs, flashes) = match n {
        1 => (6, 5),
        2 | 6 | 10 => (5, 5),
        3 => (4, 5),
        4 | 14 => (3, 5),
        5 | 7 | 8 | 11 => (2, 5),
        9 | 12 | 13 | 15 | 16 | 18 => (1, 3),
        _ => (0, 0),
    };
    (secs as f64 * 1000.0, flashes)
}

fn elroy_dots(n: u32) -> (usize, usize) {
    match n {
        1 => (20, 10),
        2 => (30, 15),
        3..=5 => (40, 20),
        6..=8 => (50, 25),
        9..=11 => (60, 30),
        12..=14 => (80, 40),
        15..=18 => (100, 50),
        _ => (120, 60),
    }
}

fn waves_for(n: u32) -> [(f64, f64); 4] {
    const FOREVER: f64 = f64::INFINITY;
    match n {
        1 => [
            (7000.0, 20000.0),
            (7000.0, 20000.0),
            (5000.0, 20000.0),
            (5000.0, FOREVER),
        ],
        2..=4 => [
            (7000.0, 20000.0),
            (7000.0, 20000.0),
            (5000.0, 1033000.0),
            (17.0, FOREVER),
        ],
        _ => [
            (5000.0, 20000.0),
            (5000.0, 20000.0),
            (5000.0, 1037000.0),
            (17.0, FOREVER),
        ],
    }
}

fn release_limits(n: u32) -> [u32; 4] {
    match n {
        1 => [0, 0, 30, 60],
        2 => [0, 0, 0, 50],
        _ => [0, 0, 0, 0],
    }
}
