/// Actor position: sub-tile coordinates plus one quantized step per tick.
///
/// ## Two derived tiles per step
///
/// A step computes two DIFFERENT integer tiles from the tentative
/// position:
///
///   - the *landing* tile, biased toward the tile already passed until
///     the actor is more than half a sub-step into the next one. This
///     rounded tile is what collision-with-other-actors and tile
///     effects see, and it reproduces the original game's slightly
///     corner-cutting feel.
///   - the *forward* tile, consulted only for the wall test: once the
///     position is past the lane center in the travel direction, the
///     forward tile is the next tile over, so an actor can never step
///     beyond the center of the last open tile in front of a wall.
///
/// A failed step mutates nothing except the `collided` flag.
///
/// Tunnel wrap is NOT handled here; the mouths read as `Empty` beyond
/// the grid and the session re-positions the actor. The position is
/// clamped to one tile beyond the grid so it stays finite either way.

use super::dir::Dir;
use super::keyframe::{Keyframe, CENTER_EPS};
use super::maze::Maze;
use super::tile::Tile;

/// The two wall-test policies actors step under. Ghosts entering or
/// leaving the house pass gates; everyone else treats them as walls.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CollisionPolicy {
    BlockWalls,
    BlockWallsAndGates,
}

impl CollisionPolicy {
    pub fn blocks(self, tile: Tile) -> bool {
        match self {
            CollisionPolicy::BlockWalls => tile.is_wall(),
            CollisionPolicy::BlockWallsAndGates => tile.is_wall() || tile.is_gate(),
        }
    }
}

/// Cumulative walking statistics, updated only on committed steps.
#[derive(Clone, Copy, Default, Debug)]
pub struct WalkStats {
    /// Distance walked, in tiles.
    pub distance: f64,
    /// Landing-tile changes.
    pub tiles_crossed: u64,
    /// Frames that ended exactly on a lane center.
    pub centers_hit: u64,
    /// One-shot tile entries (pre-center zone crossings).
    pub tiles_entered: u64,
}

#[derive(Clone, Debug)]
pub struct ActorPos {
    x: f64,
    y: f64,
    tile_x: i32,
    tile_y: i32,
    pub last_dir: Dir,
    pub collided: bool,
    pub stats: WalkStats,
}

impl ActorPos {
    /// Place an actor at the exact lane center of a tile.
    pub fn at_tile_center(tile_x: i32, tile_y: i32, clock: &Keyframe) -> Self {
        ActorPos {
            x: clock.center_value(tile_x as f64),
            y: clock.center_value(tile_y as f64),
            tile_x,
            tile_y,
            last_dir: Dir::Left,
            collided: false,
            stats: WalkStats::default(),
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn tile(&self) -> (i32, i32) {
        (self.tile_x, self.tile_y)
    }

    /// Reposition outright (tunnel wrap, mode resets). Tiles re-derive
    /// by truncation; stats are untouched.
    pub fn set(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
        self.tile_x = x.floor() as i32;
        self.tile_y = y.floor() as i32;
    }

    /// One quantized step in `dir`. Returns false (and mutates nothing
    /// but `collided`) when the forward tile is blocked under `policy`.
    pub fn step(&mut self, dir: Dir, clock: &Keyframe, maze: &Maze, policy: CollisionPolicy) -> bool {
        let plan = self.plan(dir, clock, maze);
        if policy.blocks(maze.get(plan.forward.0, plan.forward.1)) {
            self.collided = true;
            return false;
        }

        let old_tile = (self.tile_x, self.tile_y);
        self.x = plan.x;
        self.y = plan.y;
        self.tile_x = plan.landing.0;
        self.tile_y = plan.landing.1;
        self.last_dir = dir;
        self.collided = false;

        self.stats.distance += clock.step_size();
        if (self.tile_x, self.tile_y) != old_tile {
            self.stats.tiles_crossed += 1;
        }
        if clock.is_center(self.x, self.y) {
            self.stats.centers_hit += 1;
        }
        if clock.entered_tile(dir, self.x, self.y) {
            self.stats.tiles_entered += 1;
        }
        true
    }

    /// Non-mutating variant of `step`: would the step succeed?
    pub fn test(&self, dir: Dir, clock: &Keyframe, maze: &Maze, policy: CollisionPolicy) -> bool {
        let plan = self.plan(dir, clock, maze);
        !policy.blocks(maze.get(plan.forward.0, plan.forward.1))
    }

    fn plan(&self, dir: Dir, clock: &Keyframe, maze: &Maze) -> StepPlan {
        let s = clock.step_size();
        let (dx, dy) = dir.delta();

        let (x, y, axis, delta) = if dir.is_horizontal() {
            let nx = clamp_axis(self.x + dx as f64 * s, maze.width());
            (nx, clock.center_value(self.y), nx, dx)
        } else {
            let ny = clamp_axis(self.y + dy as f64 * s, maze.height());
            (clock.center_value(self.x), ny, ny, dy)
        };

        let landing_axis = (axis - delta as f64 * s / 2.0).floor() as i32;
        let forward_axis = forward_tile(axis, delta, clock);

        let (landing, forward) = if dir.is_horizontal() {
            let row = y.floor() as i32;
            ((landing_axis, row), (forward_axis, row))
        } else {
            let col = x.floor() as i32;
            ((col, landing_axis), (col, forward_axis))
        };

        StepPlan { x, y, landing, forward }
    }

    // ── Distance queries ──

    pub fn dist_sq(&self, x: f64, y: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        dx * dx + dy * dy
    }

    pub fn dist(&self, x: f64, y: f64) -> f64 {
        self.dist_sq(x, y).sqrt()
    }

    pub fn manhattan(&self, x: f64, y: f64) -> f64 {
        (self.x - x).abs() + (self.y - y).abs()
    }
}

struct StepPlan {
    x: f64,
    y: f64,
    landing: (i32, i32),
    forward: (i32, i32),
}

/// Keep the position finite: at most one tile beyond either edge
/// (the tunnel mouths), never further.
fn clamp_axis(v: f64, dim: i32) -> f64 {
    v.clamp(-1.0, dim as f64)
}

/// The tile the wall test must inspect: past the lane center in the
/// travel direction the actor is committed to the next tile over.
fn forward_tile(v: f64, delta: i32, clock: &Keyframe) -> i32 {
    let tile = v.floor();
    let frac = v - tile;
    let c = clock.center();
    if delta > 0 && frac > c + CENTER_EPS {
        tile as i32 + 1
    } else if delta < 0 && frac < c - CENTER_EPS {
        tile as i32 - 1
    } else {
        tile as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::maze::Region;

    fn open_maze(rows: &[&str]) -> Maze {
        let h = rows.len() as i32;
        let w = rows[0].len() as i32;
        let mut tiles = Vec::new();
        for row in rows {
            for ch in row.chars() {
                tiles.push(match ch {
                    '#' => Tile::Wall,
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

    fn clock8() -> Keyframe {
        // frame rate 64 with 8 fields/s gives exactly 8 frames per tile.
        Keyframe::new(64, 8.0)
    }

    #[test]
    fn eight_steps_cross_one_tile() {
        let maze = open_maze(&["#####", "#   #", "#####"]);
        let kf = clock8();
        let mut pos = ActorPos::at_tile_center(1, 1, &kf);
        let mut center_frames = vec![];
        for i in 0..8 {
            assert!(pos.step(Dir::Right, &kf, &maze, CollisionPolicy::BlockWalls));
            if kf.is_center(pos.x(), pos.y()) {
                center_frames.push(i + 1);
            }
        }
        assert_eq!(pos.tile(), (2, 1));
        // Even subdivision: exactly one centered frame per tile walked.
        assert_eq!(center_frames, vec![8]);
        assert_eq!(pos.stats.tiles_crossed, 1);
        assert_eq!(pos.stats.tiles_entered, 1);
    }

    #[test]
    fn centered_once_per_tile_crossing() {
        let maze = open_maze(&["#######", "#     #", "#######"]);
        let kf = clock8();
        let mut pos = ActorPos::at_tile_center(1, 1, &kf);
        let mut centers = 0;
        for _ in 0..32 {
            pos.step(Dir::Right, &kf, &maze, CollisionPolicy::BlockWalls);
            if kf.is_center(pos.x(), pos.y()) {
                centers += 1;
            }
        }
        // 32 sub-steps = 4 tiles, but the wall stops the actor at (5,1).
        assert_eq!(pos.tile(), (5, 1));
        assert_eq!(centers, 4);
    }

    #[test]
    fn blocked_step_changes_nothing_but_flag() {
        let maze = open_maze(&["###", "# #", "###"]);
        let kf = clock8();
        let mut pos = ActorPos::at_tile_center(1, 1, &kf);
        let (x, y) = (pos.x(), pos.y());
        let stats = pos.stats;

        assert!(!pos.step(Dir::Right, &kf, &maze, CollisionPolicy::BlockWalls));
        assert!(pos.collided);
        assert_eq!(pos.x(), x);
        assert_eq!(pos.y(), y);
        assert_eq!(pos.tile(), (1, 1));
        assert_eq!(pos.stats.distance, stats.distance);
        assert_eq!(pos.stats.tiles_crossed, stats.tiles_crossed);
    }

    #[test]
    fn stops_at_center_before_wall() {
        let maze = open_maze(&["####", "#  #", "####"]);
        let kf = clock8();
        let mut pos = ActorPos::at_tile_center(1, 1, &kf);
        // Walk right: one full tile succeeds, then half a tile to the
        // center of (2,1), then the wall at (3,1) blocks.
        let mut ok = 0;
        for _ in 0..20 {
            if pos.step(Dir::Right, &kf, &maze, CollisionPolicy::BlockWalls) {
                ok += 1;
            }
        }
        assert_eq!(ok, 8);
        assert_eq!(pos.tile(), (2, 1));
        assert!(kf.is_center(pos.x(), pos.y()));
    }

    #[test]
    fn gate_policy_difference() {
        let maze = open_maze(&["###", "#-#", "# #", "###"]);
        let kf = clock8();
        let pos = ActorPos::at_tile_center(1, 2, &kf);
        assert!(pos.test(Dir::Up, &kf, &maze, CollisionPolicy::BlockWalls));
        assert!(!pos.test(Dir::Up, &kf, &maze, CollisionPolicy::BlockWallsAndGates));
    }

    #[test]
    fn success_grows_stats_monotonically() {
        let maze = open_maze(&["#####", "#   #", "#####"]);
        let kf = clock8();
        let mut pos = ActorPos::at_tile_center(1, 1, &kf);
        let mut last = 0.0;
        for _ in 0..8 {
            assert!(pos.step(Dir::Right, &kf, &maze, CollisionPolicy::BlockWalls));
            assert!(pos.stats.distance > last);
            last = pos.stats.distance;
        }
    }

    #[test]
    fn landing_tile_is_adjacent_after_step() {
        let maze = open_maze(&["#####", "#   #", "#   #", "#####"]);
        let kf = clock8();
        let mut pos = ActorPos::at_tile_center(2, 1, &kf);
        for dir in [Dir::Down, Dir::Right, Dir::Up, Dir::Left] {
            for _ in 0..8 {
                let prev = pos.tile();
                if pos.step(dir, &kf, &maze, CollisionPolicy::BlockWalls) {
                    let now = pos.tile();
                    let d = (now.0 - prev.0).abs() + (now.1 - prev.1).abs();
                    assert!(d <= 1, "non-adjacent move {prev:?} -> {now:?}");
                }
            }
        }
    }

    #[test]
    fn off_grid_probe_reads_empty_and_clamps() {
        let maze = open_maze(&["   "]);
        let kf = clock8();
        let mut pos = ActorPos::at_tile_center(0, 0, &kf);
        // Walking off the left edge is not blocked (Empty beyond the
        // grid) and the position clamps one tile out.
        for _ in 0..40 {
            pos.step(Dir::Left, &kf, &maze, CollisionPolicy::BlockWalls);
        }
        assert!(pos.x() >= -1.0);
        assert_eq!(pos.tile().0, -1);
    }
}
