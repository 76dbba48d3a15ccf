/// Ghost state machine and decision engine.
///
/// ## Mode graph
///
/// ```text
/// Away → LevelSetup → Start ─┬─ (Blinky) → Scatter/Chase ⇄ Scared
///                            └─ (others) → Home → LeaveHome ──┘  │
///                 Phantom ← eaten while Scared ←─────────────────┘
///                    └──→ Home (and straight back out)
/// ```
///
/// `PacmanDied` freezes a ghost in place until the session re-places it.
/// Scatter/Chase/Scared broadcasts only reach ghosts that are out
/// roaming; a ghost in the house, returning as eyes, or frozen keeps
/// its local mode.
///
/// ## Steering
///
/// Decisions happen at a decision point: the lane center of a tile, or
/// immediately after a blocked step. Non-scared steering scores the
/// four absolute directions by distance from the neighboring tile to
/// the target, blocked directions excluded, the direct reverse carrying
/// a half-diagonal penalty so it only wins when nothing else is open.
/// Ties go UP, LEFT, DOWN, RIGHT. Scared steering draws one random
/// candidate and falls back through the same fixed order.

use crate::domain::actor::{ActorPos, CollisionPolicy};
use crate::domain::dir::Dir;
use crate::domain::keyframe::Keyframe;
use crate::domain::levels::GLOBAL_RELEASE_LIMITS;
use crate::domain::maze::Maze;
use crate::domain::rng::RngSource;
use crate::sim::coordinator::Coordinator;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GhostMode {
    Away,
    LevelSetup,
    Start,
    Home,
    LeaveHome,
    Chase,
    Scatter,
    Scared,
    Phantom,
    PacmanDied,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Personality {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl Personality {
    /// Fixed evaluation order for broadcasts and collision checks.
    pub const ALL: [Personality; 4] = [
        Personality::Blinky,
        Personality::Pinky,
        Personality::Inky,
        Personality::Clyde,
    ];

    pub fn index(self) -> usize {
        match self {
            Personality::Blinky => 0,
            Personality::Pinky => 1,
            Personality::Inky => 2,
            Personality::Clyde => 3,
        }
    }
}

pub struct Ghost {
    pub personality: Personality,
    pub mode: GhostMode,
    pub pos: ActorPos,
    pub dir: Dir,
    /// Personal pellet counter gating the house door.
    pub pellet_counter: u32,
    /// Times this ghost has gone phantom this player-life.
    pub phantom_trips: u32,
    /// Look-ahead decision waiting to be consumed: (dir, at tile).
    pending: Option<(Dir, (i32, i32))>,
}

impl Ghost {
    pub fn new(personality: Personality, maze: &Maze, clock: &Keyframe) -> Self {
        let mut ghost = Ghost {
            personality,
            mode: GhostMode::Away,
            pos: ActorPos::at_tile_center(0, 0, clock),
            dir: Dir::Left,
            pellet_counter: 0,
            phantom_trips: 0,
            pending: None,
        };
        ghost.place(maze, clock);
        ghost
    }

    /// Put the ghost on its spawn tile: Blinky above the gate, the
    /// rest in their berths.
    pub fn place(&mut self, maze: &Maze, clock: &Keyframe) {
        let (x, y) = match self.personality {
            Personality::Blinky => maze.home_exit,
            p => maze.home_slots[p.index()],
        };
        self.pos = ActorPos::at_tile_center(x, y, clock);
        self.dir = Dir::Left;
        self.pending = None;
        self.mode = GhostMode::LevelSetup;
    }

    /// Fresh level: placement plus counter resets.
    pub fn reset_for_level(&mut self, maze: &Maze, clock: &Keyframe) {
        self.place(maze, clock);
        self.pellet_counter = 0;
        self.phantom_trips = 0;
    }

    /// After a death: placement only, pellet counters survive
    /// (the shared counter takes over the gating).
    pub fn reset_for_life(&mut self, maze: &Maze, clock: &Keyframe) {
        self.place(maze, clock);
        self.phantom_trips = 0;
    }

    pub fn start(&mut self) {
        self.mode = GhostMode::Start;
    }

    pub fn freeze_for_death(&mut self) {
        self.mode = GhostMode::PacmanDied;
        self.pending = None;
    }

    /// Eaten while scared: become eyes and head home.
    pub fn set_phantom(&mut self) {
        self.mode = GhostMode::Phantom;
        self.phantom_trips += 1;
        self.pending = None;
    }

    /// Global-mode broadcast. Ghosts that are not out roaming ignore
    /// it; a Scatter/Chase/Scared flip reverses the ghost on the spot.
    pub fn receive(&mut self, mode: GhostMode) {
        match self.mode {
            GhostMode::Chase | GhostMode::Scatter | GhostMode::Scared => {}
            _ => return,
        }
        match mode {
            GhostMode::Chase | GhostMode::Scatter | GhostMode::Scared => {
                if self.mode != mode {
                    self.dir = self.dir.reverse();
                    self.pending = None;
                }
                self.mode = mode;
            }
            _ => {}
        }
    }

    /// Drops a stored look-ahead decision. The session calls this when
    /// it teleports the ghost across the tunnel, where the awaited tile
    /// no longer exists on the ghost's path.
    pub fn clear_pending(&mut self) {
        self.pending = None;
    }

    pub fn is_roaming(&self) -> bool {
        matches!(
            self.mode,
            GhostMode::Chase | GhostMode::Scatter | GhostMode::Scared
        )
    }
}

/// Everything one ghost's tick needs besides the ghost itself.
pub struct GhostCtx<'a> {
    pub maze: &'a Maze,
    pub clock: &'a Keyframe,
    pub coordinator: &'a mut Coordinator,
    pub rng: &'a mut RngSource,
    pub player_pos: (f64, f64),
    pub player_dir: Dir,
    pub blinky_pos: (f64, f64),
    pub legacy_targeting: bool,
    pub look_ahead: bool,
    pub manhattan: bool,
    /// External direction feed when this ghost is human-driven.
    pub manual_dir: Option<Dir>,
}

pub fn tick(ghost: &mut Ghost, ctx: &mut GhostCtx) {
    match ghost.mode {
        GhostMode::Away | GhostMode::LevelSetup | GhostMode::PacmanDied => {}
        GhostMode::Start => {
            if ghost.personality == Personality::Blinky {
                ghost.mode = ctx.coordinator.roam_mode();
                ghost.dir = Dir::Left;
            } else {
                ghost.mode = GhostMode::Home;
                ghost.dir = Dir::Up;
            }
        }
        GhostMode::Home => {
            if can_leave_home(ghost, ctx.coordinator) {
                ghost.mode = GhostMode::LeaveHome;
            } else {
                // Idle bounce against the berth walls.
                let ok = ghost
                    .pos
                    .step(ghost.dir, ctx.clock, ctx.maze, CollisionPolicy::BlockWallsAndGates);
                if !ok {
                    ghost.dir = ghost.dir.reverse();
                }
            }
        }
        GhostMode::LeaveHome => leave_home(ghost, ctx),
        GhostMode::Phantom => run_home(ghost, ctx),
        GhostMode::Chase | GhostMode::Scatter | GhostMode::Scared => roam(ghost, ctx),
    }
}

/// House release gate, strictly in precedence order: forced-release
/// timer first (consumed on use), then the already-escaped shortcut,
/// then pellet counters. The ordering resolves the original game's
/// house soft-locks.
pub fn can_leave_home(ghost: &Ghost, coordinator: &mut Coordinator) -> bool {
    if coordinator.home_timer_expired() {
        coordinator.reset_home_timer();
        return true;
    }
    if ghost.phantom_trips > 0 {
        return true;
    }
    let idx = ghost.personality.index();
    if coordinator.global_active {
        if coordinator.global_counter >= GLOBAL_RELEASE_LIMITS[idx] {
            if ghost.personality == Personality::Clyde {
                // The shared counter has served all four; back to
                // personal counters for the rest of the level.
                coordinator.deactivate_global_counter();
            }
            true
        } else {
            false
        }
    } else {
        ghost.pellet_counter >= coordinator.level().release_limits[idx]
    }
}

fn leave_home(ghost: &mut Ghost, ctx: &mut GhostCtx) {
    let (ex, ey) = centered(ctx.maze.home_exit, ctx.clock);
    let half_step = ctx.clock.step_size() / 2.0;

    if (ghost.pos.x() - ex).abs() > half_step {
        ghost.dir = if ghost.pos.x() < ex { Dir::Right } else { Dir::Left };
    } else if (ghost.pos.y() - ey).abs() > half_step {
        ghost.dir = Dir::Up;
    } else {
        ghost.mode = ctx.coordinator.roam_mode();
        ghost.dir = Dir::Left;
        return;
    }
    // Walls only: the gate is permeable on the way out.
    ghost.pos.step(ghost.dir, ctx.clock, ctx.maze, CollisionPolicy::BlockWalls);
}

/// Eyes running back to the house after being eaten.
fn run_home(ghost: &mut Ghost, ctx: &mut GhostCtx) {
    let target = target_for(
        ghost.personality,
        GhostMode::Phantom,
        (ghost.pos.x(), ghost.pos.y()),
        ctx.player_pos,
        ctx.player_dir,
        ctx.blinky_pos,
        ctx.maze,
        ctx.clock,
        ctx.legacy_targeting,
    );

    let tile = (target.0.floor() as i32, target.1.floor() as i32);
    if ghost.pos.tile() == tile && ctx.clock.is_center(ghost.pos.x(), ghost.pos.y()) {
        ghost.mode = GhostMode::Home;
        ghost.dir = Dir::Up;
        return;
    }

    let at_decision = ctx.clock.is_center(ghost.pos.x(), ghost.pos.y()) || ghost.pos.collided;
    if at_decision {
        ghost.dir = steer_to_target(
            &ghost.pos,
            ghost.dir,
            target,
            ctx.maze,
            ctx.clock,
            CollisionPolicy::BlockWalls,
            false,
            ctx.manhattan,
        );
    }
    ghost.pos.step(ghost.dir, ctx.clock, ctx.maze, CollisionPolicy::BlockWalls);
}

fn roam(ghost: &mut Ghost, ctx: &mut GhostCtx) {
    let policy = CollisionPolicy::BlockWallsAndGates;

    if let Some(d) = ctx.manual_dir {
        // Human-driven ghost: no decision engine at all.
        if ghost.pos.test(d, ctx.clock, ctx.maze, policy) {
            ghost.dir = d;
        }
        ghost.pos.step(ghost.dir, ctx.clock, ctx.maze, policy);
        return;
    }

    let centered = ctx.clock.is_center(ghost.pos.x(), ghost.pos.y());

    if let Some((d, tile)) = ghost.pending {
        if centered && ghost.pos.tile() == tile {
            ghost.dir = d;
            ghost.pending = None;
        }
    }

    let at_decision = centered || ghost.pos.collided;
    if at_decision && ghost.pending.is_none() {
        if ghost.mode == GhostMode::Scared {
            ghost.dir = steer_scared(&ghost.pos, ghost.dir, ctx.maze, ctx.clock, policy, ctx.rng);
        } else if ctx.look_ahead
            && !ghost.pos.collided
            && ghost.pos.test(ghost.dir, ctx.clock, ctx.maze, policy)
        {
            // Decide for the next tile while still approaching it. A
            // colliding look-ahead defers the decision to the corner.
            let (tx, ty) = ghost.pos.tile();
            let (dx, dy) = ghost.dir.delta();
            let ahead = (tx + dx, ty + dy);
            let probe = ActorPos::at_tile_center(ahead.0, ahead.1, ctx.clock);
            let d = steer(ghost, &probe, ahead, ctx);
            ghost.pending = Some((d, ahead));
        } else {
            let here = ghost.pos.tile();
            let from = ghost.pos.clone();
            ghost.dir = steer(ghost, &from, here, ctx);
        }
    }

    ghost.pos.step(ghost.dir, ctx.clock, ctx.maze, policy);
}

/// Non-scared steering from `from`, with the red-zone upward ban
/// evaluated at the decision tile.
fn steer(ghost: &Ghost, from: &ActorPos, decision_tile: (i32, i32), ctx: &GhostCtx) -> Dir {
    let target = target_for(
        ghost.personality,
        ghost.mode,
        (ghost.pos.x(), ghost.pos.y()),
        ctx.player_pos,
        ctx.player_dir,
        ctx.blinky_pos,
        ctx.maze,
        ctx.clock,
        ctx.legacy_targeting,
    );
    let forbid_up = matches!(ghost.mode, GhostMode::Scatter | GhostMode::Chase)
        && ctx.maze.in_red_zone(decision_tile.0, decision_tile.1);
    steer_to_target(
        from,
        ghost.dir,
        target,
        ctx.maze,
        ctx.clock,
        CollisionPolicy::BlockWallsAndGates,
        forbid_up,
        ctx.manhattan,
    )
}

/// Where a ghost wants to go, per personality and mode.
#[allow(clippy::too_many_arguments)]
pub fn target_for(
    personality: Personality,
    mode: GhostMode,
    own: (f64, f64),
    player: (f64, f64),
    player_dir: Dir,
    blinky: (f64, f64),
    maze: &Maze,
    clock: &Keyframe,
    legacy: bool,
) -> (f64, f64) {
    match mode {
        GhostMode::Scatter => centered(maze.scatter_corners[personality.index()], clock),
        GhostMode::Home => centered(maze.home_slots[personality.index()], clock),
        GhostMode::LeaveHome => centered(maze.home_exit, clock),
        GhostMode::Phantom => match personality {
            Personality::Blinky => maze.home_inner.center(),
            p => centered(maze.home_slots[p.index()], clock),
        },
        GhostMode::Chase => match personality {
            Personality::Blinky => player,
            Personality::Pinky => {
                let (dx, dy) = player_dir.delta();
                let mut t = (player.0 + 4.0 * dx as f64, player.1 + 4.0 * dy as f64);
                // The original's overflow bug: facing up also shifts
                // the ambush point four tiles left.
                if legacy && player_dir == Dir::Up {
                    t.0 -= 4.0;
                }
                t
            }
            Personality::Inky => {
                let (dx, dy) = player_dir.delta();
                let pivot = (player.0 + 2.0 * dx as f64, player.1 + 2.0 * dy as f64);
                (2.0 * pivot.0 - blinky.0, 2.0 * pivot.1 - blinky.1)
            }
            Personality::Clyde => {
                let dx = own.0 - player.0;
                let dy = own.1 - player.1;
                if dx * dx + dy * dy > 64.0 {
                    player
                } else {
                    centered(maze.scatter_corners[personality.index()], clock)
                }
            }
        },
        // Scared and the frozen modes steer nowhere.
        _ => own,
    }
}

/// Score all four directions by distance-to-target and take the best.
/// Ties break UP, LEFT, DOWN, RIGHT.
#[allow(clippy::too_many_arguments)]
pub fn steer_to_target(
    from: &ActorPos,
    current: Dir,
    target: (f64, f64),
    maze: &Maze,
    clock: &Keyframe,
    policy: CollisionPolicy,
    forbid_up: bool,
    manhattan: bool,
) -> Dir {
    let reverse = current.reverse();
    let blocked =
        |d: Dir| (forbid_up && d == Dir::Up) || !from.test(d, clock, maze, policy);

    // Corridor shortcut: with both turns blocked there is nothing to
    // score, keep going (or reverse out of a dead end).
    if blocked(current.turn_left()) && blocked(current.turn_right()) {
        return if !blocked(current) { current } else { reverse };
    }

    let measure = |x: f64, y: f64| {
        let dx = x - target.0;
        let dy = y - target.1;
        if manhattan {
            dx.abs() + dy.abs()
        } else {
            dx * dx + dy * dy
        }
    };
    // Reverse penalty, in the metric's own scale.
    let penalty = if manhattan {
        maze.half_diagonal()
    } else {
        maze.half_diagonal().powi(2)
    };

    let (tx, ty) = from.tile();
    let mut best: Option<(f64, Dir)> = None;
    for d in Dir::PRIORITY {
        if blocked(d) {
            continue;
        }
        let (dx, dy) = d.delta();
        let (nx, ny) = centered((tx + dx, ty + dy), clock);
        let mut m = measure(nx, ny);
        if d == reverse {
            m += penalty;
        }
        if best.map_or(true, |(bm, _)| m < bm) {
            best = Some((m, d));
        }
    }
    if let Some((_, d)) = best {
        return d;
    }

    // Every direction scored as blocked (the upward ban can do this):
    // any physically open non-reverse direction, then forced reversal.
    for d in Dir::PRIORITY {
        if d != reverse && from.test(d, clock, maze, policy) {
            return d;
        }
    }
    reverse
}

/// Frightened steering: one random draw picks the first candidate,
/// then the fixed order serves as fallback. Reverse only when cornered.
pub fn steer_scared(
    from: &ActorPos,
    current: Dir,
    maze: &Maze,
    clock: &Keyframe,
    policy: CollisionPolicy,
    rng: &mut RngSource,
) -> Dir {
    let reverse = current.reverse();
    let first = Dir::PRIORITY[rng.pick(4) as usize];
    for d in [first, Dir::Up, Dir::Left, Dir::Down, Dir::Right] {
        if d == reverse {
            continue;
        }
        if from.test(d, clock, maze, policy) {
            return d;
        }
    }
    reverse
}

fn centered(tile: (i32, i32), clock: &Keyframe) -> (f64, f64) {
    (
        clock.center_value(tile.0 as f64),
        clock.center_value(tile.1 as f64),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::levels::LevelSpec;
    use crate::domain::tile::Tile;
    use crate::domain::maze::Region;

    fn maze_from(rows: &[&str]) -> Maze {
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
            [(0, 0), (0, 0), (0, 0), (0, 0)],
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

    fn clock() -> Keyframe {
        Keyframe::new(64, 8.0)
    }

    /// 4-way junction at (2,2).
    fn crossroads() -> Maze {
        maze_from(&[
            "#####",
            "##.##",
            "#...#",
            "##.##",
            "#####",
        ])
    }

    #[test]
    fn equidistant_tie_goes_up() {
        let maze = crossroads();
        let kf = clock();
        let pos = ActorPos::at_tile_center(2, 2, &kf);
        // Up and Left neighbors are both sqrt(5) tiles from (0.5, 0.5).
        let d = steer_to_target(
            &pos,
            Dir::Up,
            (0.5, 0.5),
            &maze,
            &kf,
            CollisionPolicy::BlockWalls,
            false,
            false,
        );
        assert_eq!(d, Dir::Up);
    }

    #[test]
    fn never_reverses_at_a_junction() {
        let maze = crossroads();
        let kf = clock();
        let pos = ActorPos::at_tile_center(2, 2, &kf);
        // Target straight behind the ghost in every heading. The
        // reverse would always win on raw distance.
        let targets = [(2.5, 4.5), (4.5, 2.5), (2.5, 0.5), (0.5, 2.5)];
        for (dir, target) in [Dir::Up, Dir::Left, Dir::Down, Dir::Right].into_iter().zip(targets) {
            let d = steer_to_target(
                &pos, dir, target, &maze, &kf,
                CollisionPolicy::BlockWalls, false, false,
            );
            assert_ne!(d, dir.reverse(), "reversed while heading {dir:?}");
        }
    }

    #[test]
    fn dead_end_forces_reversal() {
        let maze = maze_from(&["#####", "#.. #", "#####"]);
        let kf = clock();
        // Centered in the dead-end tile, heading into the wall.
        let pos = ActorPos::at_tile_center(1, 1, &kf);
        let d = steer_to_target(
            &pos,
            Dir::Left,
            (3.5, 1.5),
            &maze,
            &kf,
            CollisionPolicy::BlockWalls,
            false,
            false,
        );
        assert_eq!(d, Dir::Right);
    }

    #[test]
    fn corridor_continues_straight() {
        let maze = maze_from(&["#####", "#...#", "#####"]);
        let kf = clock();
        let pos = ActorPos::at_tile_center(2, 1, &kf);
        let d = steer_to_target(
            &pos,
            Dir::Right,
            (0.5, 1.5),
            &maze,
            &kf,
            CollisionPolicy::BlockWalls,
            false,
            false,
        );
        // Both turns are walls, so straight wins even though the
        // target sits behind.
        assert_eq!(d, Dir::Right);
    }

    #[test]
    fn red_zone_ban_suppresses_upward_turn() {
        let maze = crossroads();
        let kf = clock();
        let pos = ActorPos::at_tile_center(2, 2, &kf);
        // The target is straight up; the ban forces second best.
        let free = steer_to_target(
            &pos, Dir::Left, (2.5, 0.5), &maze, &kf,
            CollisionPolicy::BlockWalls, false, false,
        );
        assert_eq!(free, Dir::Up);
        let banned = steer_to_target(
            &pos, Dir::Left, (2.5, 0.5), &maze, &kf,
            CollisionPolicy::BlockWalls, true, false,
        );
        assert_ne!(banned, Dir::Up);
        assert_ne!(banned, Dir::Right); // still no free reversal
    }

    #[test]
    fn pinky_overshoots_and_legacy_adds_left_shift() {
        let maze = crossroads();
        let kf = clock();
        let player = (10.5, 10.5);
        let accurate = target_for(
            Personality::Pinky, GhostMode::Chase, (0.0, 0.0),
            player, Dir::Up, (0.0, 0.0), &maze, &kf, false,
        );
        assert_eq!(accurate, (10.5, 6.5));
        let legacy = target_for(
            Personality::Pinky, GhostMode::Chase, (0.0, 0.0),
            player, Dir::Up, (0.0, 0.0), &maze, &kf, true,
        );
        assert_eq!(legacy, (6.5, 6.5));
        // The quirk is up-only.
        let right = target_for(
            Personality::Pinky, GhostMode::Chase, (0.0, 0.0),
            player, Dir::Right, (0.0, 0.0), &maze, &kf, true,
        );
        assert_eq!(right, (14.5, 10.5));
    }

    #[test]
    fn inky_doubles_the_blinky_vector() {
        let maze = crossroads();
        let kf = clock();
        let player = (10.5, 10.5);
        let blinky = (4.5, 10.5);
        // Pivot is two ahead of the player: (12.5, 10.5).
        let t = target_for(
            Personality::Inky, GhostMode::Chase, (0.0, 0.0),
            player, Dir::Right, blinky, &maze, &kf, false,
        );
        assert_eq!(t, (20.5, 10.5));
    }

    #[test]
    fn clyde_switches_at_eight_tiles() {
        let maze = crossroads();
        let kf = clock();
        let player = (10.5, 10.5);
        let far = target_for(
            Personality::Clyde, GhostMode::Chase, (30.5, 10.5),
            player, Dir::Right, (0.0, 0.0), &maze, &kf, false,
        );
        assert_eq!(far, player);
        let near = target_for(
            Personality::Clyde, GhostMode::Chase, (13.5, 10.5),
            player, Dir::Right, (0.0, 0.0), &maze, &kf, false,
        );
        let corner = maze.scatter_corners[Personality::Clyde.index()];
        assert_eq!(near, (kf.center_value(corner.0 as f64), kf.center_value(corner.1 as f64)));
    }

    #[test]
    fn scared_never_picks_reverse_with_an_exit_open() {
        let maze = crossroads();
        let kf = clock();
        let pos = ActorPos::at_tile_center(2, 2, &kf);
        let mut rng = RngSource::arcade(0x0123);
        for _ in 0..200 {
            let d = steer_scared(&pos, Dir::Right, &maze, &kf, CollisionPolicy::BlockWalls, &mut rng);
            assert_ne!(d, Dir::Left);
        }
    }

    #[test]
    fn scared_reverses_out_of_a_dead_end() {
        let maze = maze_from(&["#####", "#.. #", "#####"]);
        let kf = clock();
        let pos = ActorPos::at_tile_center(1, 1, &kf);
        let mut rng = RngSource::arcade(7);
        let d = steer_scared(&pos, Dir::Left, &maze, &kf, CollisionPolicy::BlockWalls, &mut rng);
        assert_eq!(d, Dir::Right);
    }

    // ── House release ──

    fn house_coord() -> Coordinator {
        Coordinator::new(LevelSpec::for_level(1), 50)
    }

    fn home_ghost(p: Personality) -> Ghost {
        let maze = crossroads();
        let kf = clock();
        let mut g = Ghost::new(p, &maze, &kf);
        g.mode = GhostMode::Home;
        g
    }

    #[test]
    fn pinky_leaves_immediately_on_level_one() {
        let mut c = house_coord();
        let pinky = home_ghost(Personality::Pinky);
        assert!(can_leave_home(&pinky, &mut c));
    }

    #[test]
    fn clyde_waits_for_sixty_pellets_on_level_one() {
        let mut c = house_coord();
        let mut clyde = home_ghost(Personality::Clyde);
        assert!(!can_leave_home(&clyde, &mut c));
        clyde.pellet_counter = 60;
        assert!(can_leave_home(&clyde, &mut c));
    }

    #[test]
    fn escaped_once_always_leaves() {
        let mut c = house_coord();
        let mut clyde = home_ghost(Personality::Clyde);
        clyde.phantom_trips = 1;
        assert!(can_leave_home(&clyde, &mut c));
    }

    #[test]
    fn home_timer_release_is_consumed() {
        let mut c = house_coord();
        let inky = home_ghost(Personality::Inky);
        let clyde = home_ghost(Personality::Clyde);
        for _ in 0..201 {
            c.tick();
        }
        assert!(c.home_timer_expired());
        // First claimant gets the release and re-arms the timer.
        assert!(can_leave_home(&inky, &mut c));
        assert!(!can_leave_home(&clyde, &mut c));
    }

    #[test]
    fn global_counter_gates_until_clyde_resets_it() {
        let mut c = house_coord();
        c.set_mode(GhostMode::PacmanDied, 0.0);
        assert!(c.global_active);

        let pinky = home_ghost(Personality::Pinky);
        let mut clyde = home_ghost(Personality::Clyde);
        clyde.pellet_counter = 100; // ignored while the shared counter rules

        // Shared limits: Pinky 7, Clyde 32.
        assert!(!can_leave_home(&pinky, &mut c));
        assert!(!can_leave_home(&clyde, &mut c));
        for _ in 0..7 {
            c.pellet_eaten();
        }
        assert!(can_leave_home(&pinky, &mut c));
        assert!(!can_leave_home(&clyde, &mut c));
        for _ in 0..25 {
            c.pellet_eaten();
        }
        assert!(can_leave_home(&clyde, &mut c));
        // Clyde's release retires the shared counter.
        assert!(!c.global_active);
    }

    #[test]
    fn broadcasts_skip_housed_ghosts() {
        let mut g = home_ghost(Personality::Pinky);
        g.receive(GhostMode::Scared);
        assert_eq!(g.mode, GhostMode::Home);

        g.mode = GhostMode::Chase;
        let dir = g.dir;
        g.receive(GhostMode::Scared);
        assert_eq!(g.mode, GhostMode::Scared);
        assert_eq!(g.dir, dir.reverse());
    }

    #[test]
    fn repeated_broadcast_does_not_reverse_again() {
        let mut g = home_ghost(Personality::Pinky);
        g.mode = GhostMode::Scatter;
        let dir = g.dir;
        g.receive(GhostMode::Scatter);
        assert_eq!(g.dir, dir);
    }
}
