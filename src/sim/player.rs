/// Player state machine: movement, tile effects, fruit, and the
/// ghost-collision resolution that closes every tick.
///
/// `Freeze` is a transient overlay (score popups, eating pauses) that
/// shelves the active mode and its remaining time and restores both on
/// expiry. Only the first freeze in a tick writes the shelf; a second
/// collision in the same tick extends the timer without clobbering it.

use crate::domain::actor::{ActorPos, CollisionPolicy};
use crate::domain::dir::Dir;
use crate::domain::keyframe::Keyframe;
use crate::domain::maze::Maze;
use crate::domain::rng::RngSource;
use crate::domain::tile::Tile;
use crate::sim::coordinator::Coordinator;
use crate::sim::event::GameEvent;
use crate::sim::ghost::{Ghost, GhostMode};

const POLICY: CollisionPolicy = CollisionPolicy::BlockWallsAndGates;

/// Frames of eat-slow left after stepping off the dot trail.
const EAT_SLOW_TAIL_FRAMES: u32 = 3;
/// Full-stop frames after a power pellet.
const POWER_STOP_FRAMES: u32 = 3;
const DEAD_MS: f64 = 2000.0;
const FREEZE_MS: f64 = 1000.0;
const EXTRA_LIFE_SCORE: u32 = 10_000;

/// Dot counts that summon the bonus fruit.
const FRUIT_TRIGGERS: [u32; 2] = [70, 170];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlayerMode {
    Freeze,
    LevelSetup,
    Start,
    Normal,
    Powered,
    Dead,
}

/// Score popup shown during a freeze.
#[derive(Clone, Copy, Debug)]
pub struct Popup {
    pub x: f64,
    pub y: f64,
    pub points: u32,
}

pub struct Player {
    pub mode: PlayerMode,
    prev_mode: PlayerMode,
    ms_left: f64,
    prev_ms_left: f64,
    stop_frames: u32,

    pub pos: ActorPos,
    pub dir: Dir,
    /// Buffered input, applied at the next legal turn point.
    pub wanted_dir: Option<Dir>,

    pub score: u32,
    pub lives: u32,
    /// Ghosts eaten this power phase; drives score escalation.
    pub ghosts_eaten: u32,
    /// Dots eaten this level (both kinds).
    pub pellets_eaten: u32,

    eat_slow: bool,
    eat_slow_tail: u32,

    /// Fruit lifetime; zero means no fruit on the board.
    pub fruit_ms_left: f64,
    pub popup: Option<Popup>,

    extra_life_awarded: bool,
    death_reported: bool,
}

impl Player {
    pub fn new(maze: &Maze, clock: &Keyframe) -> Self {
        let (x, y) = maze.player_start;
        Player {
            mode: PlayerMode::LevelSetup,
            prev_mode: PlayerMode::LevelSetup,
            ms_left: 0.0,
            prev_ms_left: 0.0,
            stop_frames: 0,
            pos: ActorPos::at_tile_center(x, y, clock),
            dir: Dir::Left,
            wanted_dir: None,
            score: 0,
            lives: 3,
            ghosts_eaten: 0,
            pellets_eaten: 0,
            eat_slow: false,
            eat_slow_tail: 0,
            fruit_ms_left: 0.0,
            popup: None,
            extra_life_awarded: false,
            death_reported: false,
        }
    }

    /// Back to the spawn tile; level progress (score, dots) survives.
    pub fn reset_for_life(&mut self, maze: &Maze, clock: &Keyframe) {
        let (x, y) = maze.player_start;
        self.pos = ActorPos::at_tile_center(x, y, clock);
        self.dir = Dir::Left;
        self.wanted_dir = None;
        self.mode = PlayerMode::Start;
        self.stop_frames = 0;
        self.ghosts_eaten = 0;
        self.eat_slow = false;
        self.eat_slow_tail = 0;
        self.fruit_ms_left = 0.0;
        self.popup = None;
        self.death_reported = false;
    }

    pub fn reset_for_level(&mut self, maze: &Maze, clock: &Keyframe) {
        self.reset_for_life(maze, clock);
        self.mode = PlayerMode::LevelSetup;
        self.pellets_eaten = 0;
    }

    pub fn start(&mut self) {
        self.mode = PlayerMode::Normal;
    }

    /// Movement slowed by dot eating this frame?
    pub fn eating(&self) -> bool {
        self.eat_slow
    }

    pub fn is_powered(&self) -> bool {
        self.mode == PlayerMode::Powered
            || (self.mode == PlayerMode::Freeze && self.prev_mode == PlayerMode::Powered)
    }
}

/// Everything one player tick needs besides the player itself.
pub struct PlayerCtx<'a> {
    pub maze: &'a mut Maze,
    pub clock: &'a Keyframe,
    pub coordinator: &'a mut Coordinator,
    pub ghosts: &'a mut [Ghost; 4],
    pub rng: &'a mut RngSource,
    pub events: &'a mut Vec<GameEvent>,
    pub frame_ms: f64,
    pub invincible: bool,
}

/// One tick. Returns false exactly once, when the death animation
/// timer expires; the session owns respawn vs game-over from there.
pub fn tick(player: &mut Player, ctx: &mut PlayerCtx) -> bool {
    match player.mode {
        PlayerMode::LevelSetup | PlayerMode::Start => true,
        PlayerMode::Freeze => {
            player.ms_left -= ctx.frame_ms;
            if player.ms_left <= 0.0 {
                player.mode = player.prev_mode;
                player.ms_left = player.prev_ms_left;
                player.popup = None;
            }
            true
        }
        PlayerMode::Dead => {
            player.ms_left -= ctx.frame_ms;
            if player.ms_left <= 0.0 && !player.death_reported {
                player.death_reported = true;
                return false;
            }
            true
        }
        PlayerMode::Powered => {
            player.ms_left -= ctx.frame_ms;
            if player.ms_left <= 0.0 {
                player.mode = PlayerMode::Normal;
                player.ghosts_eaten = 0;
            }
            move_and_interact(player, ctx);
            true
        }
        PlayerMode::Normal => {
            move_and_interact(player, ctx);
            true
        }
    }
}

fn move_and_interact(player: &mut Player, ctx: &mut PlayerCtx) {
    if player.stop_frames > 0 {
        player.stop_frames -= 1;
    } else {
        apply_turn(player, ctx);
        player.pos.step(player.dir, ctx.clock, ctx.maze, POLICY);
    }

    let (tx, ty) = player.pos.tile();
    match ctx.maze.get(tx, ty) {
        Tile::Pellet => eat_pellet(player, ctx, tx, ty),
        Tile::PowerPellet => eat_power_pellet(player, ctx, tx, ty),
        tile => {
            if player.eat_slow && !tile.is_any_pellet() {
                if player.eat_slow_tail > 0 {
                    player.eat_slow_tail -= 1;
                } else {
                    player.eat_slow = false;
                }
            }
        }
    }

    tick_fruit(player, ctx);
    resolve_ghost_collisions(player, ctx);

    if !player.extra_life_awarded && player.score >= EXTRA_LIFE_SCORE {
        player.extra_life_awarded = true;
        player.lives += 1;
        ctx.events.push(GameEvent::ExtraLife);
    }
}

/// A buffered reverse applies instantly; any other turn waits for the
/// lane center and an open tile.
fn apply_turn(player: &mut Player, ctx: &PlayerCtx) {
    let Some(w) = player.wanted_dir else { return };
    if w == player.dir.reverse() {
        player.dir = w;
        player.wanted_dir = None;
    } else if ctx.clock.is_center(player.pos.x(), player.pos.y())
        && player.pos.test(w, ctx.clock, ctx.maze, POLICY)
    {
        player.dir = w;
        player.wanted_dir = None;
    }
}

fn eat_pellet(player: &mut Player, ctx: &mut PlayerCtx, tx: i32, ty: i32) {
    ctx.maze.set(tx, ty, Tile::Empty);
    player.score += Tile::Pellet.score();
    count_dot(player, ctx);
    player.eat_slow = true;
    player.eat_slow_tail = EAT_SLOW_TAIL_FRAMES;
    ctx.events.push(GameEvent::PelletEaten { x: tx, y: ty });

    if FRUIT_TRIGGERS.contains(&player.pellets_eaten) {
        spawn_fruit(player, ctx);
    }
    if ctx.maze.pellets_left() == 0 {
        ctx.events.push(GameEvent::LevelCleared);
    }
}

fn eat_power_pellet(player: &mut Player, ctx: &mut PlayerCtx, tx: i32, ty: i32) {
    ctx.maze.set(tx, ty, Tile::Empty);
    player.score += Tile::PowerPellet.score();
    count_dot(player, ctx);
    player.eat_slow = true;
    player.eat_slow_tail = EAT_SLOW_TAIL_FRAMES;
    // The original's visible chomp pause on the big dot.
    player.stop_frames = POWER_STOP_FRAMES;
    player.ghosts_eaten = 0;
    ctx.events.push(GameEvent::PowerPelletEaten { x: tx, y: ty });

    let fright_ms = ctx.coordinator.level().fright_ms;
    if fright_ms > 0.0 {
        player.mode = PlayerMode::Powered;
        player.ms_left = fright_ms;
        ctx.coordinator.set_mode(GhostMode::Scared, fright_ms);
        for g in ctx.ghosts.iter_mut() {
            g.receive(GhostMode::Scared);
        }
    } else {
        // Late levels have no fright; the ghosts still flip around.
        for g in ctx.ghosts.iter_mut() {
            if g.is_roaming() {
                g.dir = g.dir.reverse();
            }
        }
    }

    if ctx.maze.pellets_left() == 0 {
        ctx.events.push(GameEvent::LevelCleared);
    }
}

/// Shared dot bookkeeping: totals, the coordinator's release counter,
/// and the first housed ghost's personal counter.
fn count_dot(player: &mut Player, ctx: &mut PlayerCtx) {
    player.pellets_eaten += 1;
    ctx.coordinator.pellet_eaten();
    if !ctx.coordinator.global_active {
        for g in ctx.ghosts.iter_mut() {
            if g.mode == GhostMode::Home {
                g.pellet_counter += 1;
                break;
            }
        }
    }
}

fn spawn_fruit(player: &mut Player, ctx: &mut PlayerCtx) {
    let (fx, fy) = ctx.maze.fruit_tile;
    ctx.maze.set(fx, fy, ctx.coordinator.level().fruit);
    player.fruit_ms_left = 9000.0 + ctx.rng.pick(1001) as f64;
    ctx.events.push(GameEvent::FruitSpawned { x: fx, y: fy });
}

fn tick_fruit(player: &mut Player, ctx: &mut PlayerCtx) {
    if player.fruit_ms_left <= 0.0 {
        return;
    }
    player.fruit_ms_left -= ctx.frame_ms;

    let (fx, fy) = ctx.maze.fruit_tile;
    if player.fruit_ms_left <= 0.0 {
        ctx.maze.set(fx, fy, Tile::Empty);
        player.fruit_ms_left = 0.0;
        ctx.events.push(GameEvent::FruitExpired);
        return;
    }

    // Sub-tile test: the fruit straddles the lane, tile rounding is
    // too coarse here.
    let cx = ctx.clock.center_value(fx as f64);
    let cy = ctx.clock.center_value(fy as f64);
    if player.pos.dist_sq(cx, cy) < 1.0 {
        let points = ctx.coordinator.level().fruit_points;
        player.score += points;
        ctx.maze.set(fx, fy, Tile::Empty);
        player.fruit_ms_left = 0.0;
        player.popup = Some(Popup { x: cx, y: cy, points });
        enter_freeze(player, FREEZE_MS);
        ctx.events.push(GameEvent::FruitEaten { points });
    }
}

/// Fixed Blinky..Clyde order; every same-tick collision is honored,
/// eating one ghost never shields the player from the next.
fn resolve_ghost_collisions(player: &mut Player, ctx: &mut PlayerCtx) {
    let ptile = player.pos.tile();
    let mut died = false;

    for g in ctx.ghosts.iter_mut() {
        if g.pos.tile() != ptile {
            continue;
        }
        match g.mode {
            GhostMode::Scared => {
                let points = Tile::PowerPellet.score() * 4 << player.ghosts_eaten.min(3);
                player.ghosts_eaten += 1;
                player.score += points;
                g.set_phantom();
                player.popup = Some(Popup { x: player.pos.x(), y: player.pos.y(), points });
                enter_freeze(player, FREEZE_MS);
                ctx.events.push(GameEvent::GhostEaten {
                    ghost: g.personality.index(),
                    points,
                });
            }
            GhostMode::Chase | GhostMode::Scatter => {
                if !ctx.invincible {
                    died = true;
                }
            }
            _ => {}
        }
    }

    if died {
        player.mode = PlayerMode::Dead;
        player.ms_left = DEAD_MS;
        player.popup = None;
        ctx.coordinator.set_mode(GhostMode::PacmanDied, 0.0);
        for g in ctx.ghosts.iter_mut() {
            g.freeze_for_death();
        }
        ctx.events.push(GameEvent::PlayerKilled);
    }
}

fn enter_freeze(player: &mut Player, ms: f64) {
    if player.mode == PlayerMode::Freeze {
        // Keep the shelved mode; just make sure the popup shows.
        player.ms_left = player.ms_left.max(ms);
    } else {
        player.prev_mode = player.mode;
        player.prev_ms_left = player.ms_left;
        player.mode = PlayerMode::Freeze;
        player.ms_left = ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::levels::LevelSpec;
    use crate::sim::ghost::Personality;
    use crate::sim::level::classic_maze;

    struct Rig {
        maze: Maze,
        clock: Keyframe,
        coordinator: Coordinator,
        ghosts: [Ghost; 4],
        rng: RngSource,
        events: Vec<GameEvent>,
        player: Player,
    }

    /// 64 fps / 8 fields per second: exact 8-frame tiles, 15.625 ms frames.
    fn rig() -> Rig {
        let maze = classic_maze();
        let clock = Keyframe::new(64, 8.0);
        let coordinator = Coordinator::new(LevelSpec::for_level(1), 64);
        let ghosts = [
            Ghost::new(Personality::Blinky, &maze, &clock),
            Ghost::new(Personality::Pinky, &maze, &clock),
            Ghost::new(Personality::Inky, &maze, &clock),
            Ghost::new(Personality::Clyde, &maze, &clock),
        ];
        let mut player = Player::new(&maze, &clock);
        player.start();
        Rig {
            maze,
            clock,
            coordinator,
            ghosts,
            rng: RngSource::arcade(0x1111),
            events: Vec::new(),
            player,
        }
    }

    fn tick_once(r: &mut Rig) -> bool {
        let mut ctx = PlayerCtx {
            maze: &mut r.maze,
            clock: &r.clock,
            coordinator: &mut r.coordinator,
            ghosts: &mut r.ghosts,
            rng: &mut r.rng,
            events: &mut r.events,
            frame_ms: 1000.0 / 64.0,
            invincible: false,
        };
        tick(&mut r.player, &mut ctx)
    }

    #[test]
    fn pellet_scores_and_slows() {
        let mut r = rig();
        // Walking left from spawn reaches the dot at (12, 23).
        r.player.dir = Dir::Left;
        for _ in 0..8 {
            tick_once(&mut r);
        }
        assert_eq!(r.player.score, 10);
        assert_eq!(r.player.pellets_eaten, 1);
        assert!(r.player.eating());
        assert_eq!(r.maze.get(12, 23), Tile::Empty);
    }

    #[test]
    fn eat_slow_clears_a_few_frames_past_the_trail() {
        let mut r = rig();
        r.player.dir = Dir::Left;
        for _ in 0..8 {
            tick_once(&mut r);
        }
        assert!(r.player.eating());
        // Turn back onto the already-cleared trail.
        r.player.wanted_dir = Some(Dir::Right);
        let mut slow_frames = 0;
        for _ in 0..6 {
            if r.player.eating() {
                slow_frames += 1;
            }
            tick_once(&mut r);
        }
        assert!(!r.player.eating());
        assert!(slow_frames > 0);
    }

    #[test]
    fn seventieth_dot_summons_fruit() {
        let mut r = rig();
        r.player.pellets_eaten = 69;
        r.player.dir = Dir::Left;
        for _ in 0..8 {
            tick_once(&mut r);
        }
        assert_eq!(r.player.pellets_eaten, 70);
        assert_eq!(r.maze.get(13, 17), Tile::Cherry);
        // Spawned mid-run, so a few frames may already have elapsed.
        assert!(r.player.fruit_ms_left >= 9000.0 - 100.0);
        assert!(r.player.fruit_ms_left <= 10000.0);
    }

    #[test]
    fn fruit_expires_back_to_empty() {
        let mut r = rig();
        r.player.pellets_eaten = 69;
        r.player.dir = Dir::Left;
        for _ in 0..8 {
            tick_once(&mut r);
        }
        // Let the player idle against a wall far from the fruit.
        for _ in 0..(11 * 64) {
            tick_once(&mut r);
        }
        assert_eq!(r.maze.get(13, 17), Tile::Empty);
        assert_eq!(r.player.fruit_ms_left, 0.0);
        assert!(r
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::FruitExpired)));
    }

    #[test]
    fn power_pellet_enters_powered_and_frightens() {
        let mut r = rig();
        for g in r.ghosts.iter_mut() {
            g.mode = GhostMode::Scatter;
        }
        // Drop a power pellet right under the player.
        let (px, py) = r.player.pos.tile();
        r.maze.set(px, py, Tile::PowerPellet);
        tick_once(&mut r);

        assert_eq!(r.player.mode, PlayerMode::Powered);
        assert_eq!(r.player.score, 50);
        for g in r.ghosts.iter() {
            assert_eq!(g.mode, GhostMode::Scared);
        }
        assert!(r.coordinator.scared_ms_left().is_some());
    }

    #[test]
    fn ghost_scores_escalate_in_one_power_phase() {
        let mut r = rig();
        let (px, py) = r.player.pos.tile();
        r.player.mode = PlayerMode::Powered;
        r.player.ms_left = 6000.0;
        // Two scared ghosts on the player's tile in the same tick.
        for i in [1, 2] {
            r.ghosts[i].mode = GhostMode::Scared;
            r.ghosts[i].pos = ActorPos::at_tile_center(px, py, &r.clock);
        }
        tick_once(&mut r);

        assert_eq!(r.player.score, 200 + 400);
        assert_eq!(r.player.ghosts_eaten, 2);
        assert_eq!(r.ghosts[1].mode, GhostMode::Phantom);
        assert_eq!(r.ghosts[2].mode, GhostMode::Phantom);
        assert_eq!(r.player.mode, PlayerMode::Freeze);
    }

    #[test]
    fn powered_exit_resets_the_eaten_counter() {
        let mut r = rig();
        r.player.mode = PlayerMode::Powered;
        r.player.ms_left = 40.0;
        r.player.ghosts_eaten = 3;
        for _ in 0..4 {
            tick_once(&mut r);
        }
        assert_eq!(r.player.mode, PlayerMode::Normal);
        assert_eq!(r.player.ghosts_eaten, 0);
    }

    #[test]
    fn chase_contact_kills_once() {
        let mut r = rig();
        let (px, py) = r.player.pos.tile();
        r.ghosts[0].mode = GhostMode::Chase;
        r.ghosts[0].pos = ActorPos::at_tile_center(px, py, &r.clock);
        assert!(tick_once(&mut r));
        assert_eq!(r.player.mode, PlayerMode::Dead);
        for g in r.ghosts.iter() {
            assert_eq!(g.mode, GhostMode::PacmanDied);
        }

        // Death animation runs, then exactly one false.
        let mut falses = 0;
        for _ in 0..(4 * 64) {
            if !tick_once(&mut r) {
                falses += 1;
            }
        }
        assert_eq!(falses, 1);
    }

    #[test]
    fn scared_eat_does_not_shield_from_chase_in_same_tick() {
        let mut r = rig();
        let (px, py) = r.player.pos.tile();
        r.player.mode = PlayerMode::Powered;
        r.player.ms_left = 6000.0;
        r.ghosts[1].mode = GhostMode::Scared;
        r.ghosts[1].pos = ActorPos::at_tile_center(px, py, &r.clock);
        r.ghosts[2].mode = GhostMode::Chase;
        r.ghosts[2].pos = ActorPos::at_tile_center(px, py, &r.clock);
        tick_once(&mut r);

        assert_eq!(r.player.score, 200);
        assert_eq!(r.player.mode, PlayerMode::Dead);
    }

    #[test]
    fn freeze_restores_powered_time() {
        let mut r = rig();
        r.player.mode = PlayerMode::Powered;
        r.player.ms_left = 5000.0;
        enter_freeze(&mut r.player, 100.0);
        enter_freeze(&mut r.player, 100.0); // nested: shelf untouched
        assert_eq!(r.player.mode, PlayerMode::Freeze);

        // 100 ms at 15.625 ms frames: the 7th tick restores the shelf.
        for _ in 0..7 {
            tick_once(&mut r);
        }
        assert_eq!(r.player.mode, PlayerMode::Powered);
        assert!((r.player.ms_left - 5000.0).abs() < 1e-6);
    }

    #[test]
    fn invincibility_blocks_death() {
        let mut r = rig();
        let (px, py) = r.player.pos.tile();
        r.ghosts[0].mode = GhostMode::Chase;
        r.ghosts[0].pos = ActorPos::at_tile_center(px, py, &r.clock);
        let mut ctx = PlayerCtx {
            maze: &mut r.maze,
            clock: &r.clock,
            coordinator: &mut r.coordinator,
            ghosts: &mut r.ghosts,
            rng: &mut r.rng,
            events: &mut r.events,
            frame_ms: 1000.0 / 64.0,
            invincible: true,
        };
        assert!(tick(&mut r.player, &mut ctx));
        assert_ne!(r.player.mode, PlayerMode::Dead);
    }
}
