/// One game session: the maze, the coordinator, the four ghosts and
/// the player, ticked in a fixed order once per rendered frame.
///
/// ## Tick order
///
///   1. coordinator (wave timers; expiries broadcast to the ghosts)
///   2. ghosts, Blinky first (mode step, movement, steering)
///   3. player (movement, tile effects, collision resolution)
///
/// Everything is owned here; nothing persists between sessions. Speeds
/// are modeled by giving each actor its own keyframe clock per tick,
/// derived from the level's percentage tables. When an actor's clock
/// subdivision changes (tunnel entry, fright, Elroy) its position is
/// re-aligned to the new step grid so lane centers stay reachable.

use crate::domain::actor::ActorPos;
use crate::domain::dir::Dir;
use crate::domain::keyframe::Keyframe;
use crate::domain::levels::LevelSpec;
use crate::domain::maze::Maze;
use crate::domain::rng::RngSource;
use crate::sim::coordinator::Coordinator;
use crate::sim::event::GameEvent;
use crate::sim::ghost::{self, Ghost, GhostCtx, GhostMode, Personality};
use crate::sim::player::{self, Player, PlayerCtx};

/// Eyes sprint home faster than anything else on the board.
const PHANTOM_PCT: u32 = 150;
/// Ghosts idle slowly inside and just outside the house.
const HOUSE_PCT: u32 = 40;

/// Read-only behavior switches, fixed for the session's lifetime.
#[derive(Clone, Copy, Debug, Default)]
pub struct Toggles {
    /// Reproduce the original's Pinky up-targeting bug.
    pub legacy_targeting: bool,
    /// Ghosts decide one tile ahead instead of on the tile.
    pub look_ahead: bool,
    /// Manhattan distance instead of squared Euclidean.
    pub manhattan: bool,
    pub invincible: bool,
    /// Blinky is human-driven.
    pub manual_ghost: bool,
}

pub struct Session {
    pub maze: Maze,
    pub coordinator: Coordinator,
    pub ghosts: [Ghost; 4],
    pub player: Player,
    pub rng: RngSource,
    pub toggles: Toggles,
    /// Events from the most recent tick.
    pub events: Vec<GameEvent>,

    pub level_number: u32,
    frame_rate: u32,
    /// Requested fields-per-second at 100% speed.
    base_fields: f64,
    /// Last frames-per-field used per ghost, for re-alignment.
    ghost_fpf: [Option<u32>; 4],
    player_fpf: Option<u32>,
    /// External direction feed for the human-driven ghost.
    pub manual_ghost_dir: Option<Dir>,
}

impl Session {
    pub fn new(
        maze: Maze,
        frame_rate: u32,
        base_fields: f64,
        toggles: Toggles,
        rng: RngSource,
    ) -> Self {
        let clock = Keyframe::new(frame_rate, base_fields);
        let coordinator = Coordinator::new(LevelSpec::for_level(1), frame_rate);
        let ghosts = [
            Ghost::new(Personality::Blinky, &maze, &clock),
            Ghost::new(Personality::Pinky, &maze, &clock),
            Ghost::new(Personality::Inky, &maze, &clock),
            Ghost::new(Personality::Clyde, &maze, &clock),
        ];
        let player = Player::new(&maze, &clock);
        Session {
            maze,
            coordinator,
            ghosts,
            player,
            rng,
            toggles,
            events: Vec::new(),
            level_number: 1,
            frame_rate,
            base_fields,
            ghost_fpf: [None; 4],
            player_fpf: None,
            manual_ghost_dir: None,
        }
    }

    pub fn level(&self) -> &LevelSpec {
        self.coordinator.level()
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// The clock actors run sync frames against (100% speed).
    pub fn base_clock(&self) -> Keyframe {
        Keyframe::new(self.frame_rate, self.base_fields)
    }

    /// Restock the board and park everyone for the given level.
    pub fn start_level(&mut self, number: u32) {
        self.level_number = number;
        self.maze.reset();
        self.coordinator = Coordinator::new(LevelSpec::for_level(number), self.frame_rate);
        let clock = self.base_clock();
        for g in &mut self.ghosts {
            g.reset_for_level(&self.maze, &clock);
        }
        self.player.reset_for_level(&self.maze, &clock);
        self.rng.reseed();
        self.ghost_fpf = [None; 4];
        self.player_fpf = None;
    }

    /// Re-park after a lost life; board and counters carry over.
    pub fn respawn(&mut self) {
        let clock = self.base_clock();
        for g in &mut self.ghosts {
            g.reset_for_life(&self.maze, &clock);
        }
        self.player.reset_for_life(&self.maze, &clock);
        self.rng.reseed();
        self.ghost_fpf = [None; 4];
        self.player_fpf = None;
    }

    /// Release the actors: intro is over, play begins.
    pub fn begin_play(&mut self) {
        self.coordinator.set_mode(GhostMode::Start, 0.0);
        for g in &mut self.ghosts {
            g.start();
        }
        self.player.start();
    }

    pub fn level_cleared(&self) -> bool {
        self.maze.pellets_left() == 0
    }

    pub fn steer_player(&mut self, dir: Dir) {
        self.player.wanted_dir = Some(dir);
    }

    /// One frame. Returns false exactly once when the player's death
    /// animation finishes.
    pub fn tick(&mut self) -> bool {
        self.events.clear();

        if let Some(mode) = self.coordinator.tick() {
            for g in &mut self.ghosts {
                g.receive(mode);
            }
        }

        let player_pos = (self.player.pos.x(), self.player.pos.y());
        let player_dir = self.player.dir;
        let blinky_pos = (self.ghosts[0].pos.x(), self.ghosts[0].pos.y());

        for i in 0..self.ghosts.len() {
            let pct = self.ghost_pct(i);
            let clock = self.clock_for(pct);
            if self.ghost_fpf[i] != Some(clock.frames_per_field()) {
                realign(&mut self.ghosts[i].pos, &clock);
                self.ghost_fpf[i] = Some(clock.frames_per_field());
            }
            let manual = (i == 0 && self.toggles.manual_ghost)
                .then_some(self.manual_ghost_dir)
                .flatten();
            let mut ctx = GhostCtx {
                maze: &self.maze,
                clock: &clock,
                coordinator: &mut self.coordinator,
                rng: &mut self.rng,
                player_pos,
                player_dir,
                blinky_pos,
                legacy_targeting: self.toggles.legacy_targeting,
                look_ahead: self.toggles.look_ahead,
                manhattan: self.toggles.manhattan,
                manual_dir: manual,
            };
            ghost::tick(&mut self.ghosts[i], &mut ctx);
            if wrap_tunnel(&mut self.ghosts[i].pos, &self.maze) {
                self.ghosts[i].clear_pending();
            }
        }

        let pct = self.player_pct();
        let clock = self.clock_for(pct);
        if self.player_fpf != Some(clock.frames_per_field()) {
            realign(&mut self.player.pos, &clock);
            self.player_fpf = Some(clock.frames_per_field());
        }
        let mut ctx = PlayerCtx {
            maze: &mut self.maze,
            clock: &clock,
            coordinator: &mut self.coordinator,
            ghosts: &mut self.ghosts,
            rng: &mut self.rng,
            events: &mut self.events,
            frame_ms: 1000.0 / self.frame_rate as f64,
            invincible: self.toggles.invincible,
        };
        let alive = player::tick(&mut self.player, &mut ctx);
        wrap_tunnel(&mut self.player.pos, &self.maze);
        alive
    }

    fn clock_for(&self, pct: u32) -> Keyframe {
        Keyframe::new(self.frame_rate, self.base_fields * pct as f64 / 100.0)
    }

    fn ghost_pct(&self, i: usize) -> u32 {
        let lvl = self.coordinator.level();
        let g = &self.ghosts[i];
        let (tx, ty) = g.pos.tile();
        match g.mode {
            GhostMode::Phantom => PHANTOM_PCT,
            GhostMode::Home | GhostMode::LeaveHome => HOUSE_PCT,
            GhostMode::Scared => lvl.ghost_fright_pct,
            GhostMode::Chase | GhostMode::Scatter => {
                if self.maze.in_tunnel(tx, ty) {
                    lvl.ghost_tunnel_pct
                } else if g.personality == Personality::Blinky {
                    self.elroy_pct(lvl)
                } else {
                    lvl.ghost_pct
                }
            }
            _ => lvl.ghost_pct,
        }
    }

    /// Blinky's speed-up as the board empties; suspended while Clyde
    /// is still in the house.
    fn elroy_pct(&self, lvl: &LevelSpec) -> u32 {
        if self.ghosts[Personality::Clyde.index()].mode == GhostMode::Home {
            return lvl.ghost_pct;
        }
        let left = self.maze.pellets_left();
        if left <= lvl.elroy2_dots {
            lvl.elroy2_pct
        } else if left <= lvl.elroy1_dots {
            lvl.elroy1_pct
        } else {
            lvl.ghost_pct
        }
    }

    fn player_pct(&self) -> u32 {
        let lvl = self.coordinator.level();
        let eating = self.player.eating();
        if self.player.is_powered() {
            if eating {
                lvl.player_fright_dots_pct
            } else {
                lvl.player_fright_pct
            }
        } else if eating {
            lvl.player_dots_pct
        } else {
            lvl.player_pct
        }
    }
}

/// The tunnel mouths wrap by re-positioning one board width over.
/// Returns whether the position was moved.
fn wrap_tunnel(pos: &mut ActorPos, maze: &Maze) -> bool {
    let w = maze.width() as f64;
    let (tx, _) = pos.tile();
    if tx < 0 {
        pos.set(pos.x() + w, pos.y());
        true
    } else if tx >= maze.width() {
        pos.set(pos.x() - w, pos.y());
        true
    } else {
        false
    }
}

/// Snap a position onto a clock's step grid after a subdivision change.
fn realign(pos: &mut ActorPos, clock: &Keyframe) {
    let x = clock.align(pos.x());
    let y = clock.align(pos.y());
    pos.set(x, y);
}
