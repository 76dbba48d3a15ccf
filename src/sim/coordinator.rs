/// Global ghost-mode coordinator.
///
/// Owns the scatter/chase wave clock, the fright carve-out, the shared
/// house timer and the shared pellet-release counter. One instance per
/// session; ghosts receive mode changes as broadcasts from the session
/// loop, the coordinator itself never touches a ghost.
///
/// ## Wave clock
///
/// Each wave-table phase is a (scatter, chase) pair. Scatter expiry
/// flips to that phase's chase; chase expiry advances the phase index
/// (pinned at the table's last entry) and starts the next scatter. The
/// final chase duration is infinite, so a session that outlives the
/// table chases forever.
///
/// A fright interval is carved OUT of the running phase: the
/// interrupted mode and its remaining time are saved on entry and
/// restored verbatim on expiry, so fright never consumes scatter or
/// chase budget.

use crate::domain::levels::LevelSpec;
use crate::sim::ghost::GhostMode;

pub struct Coordinator {
    pub mode: GhostMode,
    prev_mode: GhostMode,
    ms_left: f64,
    prev_ms_left: f64,

    /// Index into the wave table, pinned at the last entry.
    phase_index: usize,
    /// How many scatter phases have started, including the current one.
    pub scatter_entries: u32,

    /// Shared forced-release timer, counts down while any ghost is home.
    home_ms_left: f64,
    /// Shared pellet-release counter, active after a player death.
    pub global_counter: u32,
    pub global_active: bool,

    level: LevelSpec,
    frame_ms: f64,
}

impl Coordinator {
    pub fn new(level: LevelSpec, frame_rate: u32) -> Self {
        Coordinator {
            mode: GhostMode::Away,
            prev_mode: GhostMode::Away,
            ms_left: 0.0,
            prev_ms_left: 0.0,
            phase_index: 0,
            scatter_entries: 0,
            home_ms_left: level.max_home_ms,
            global_counter: 0,
            global_active: false,
            level,
            frame_ms: 1000.0 / frame_rate as f64,
        }
    }

    pub fn level(&self) -> &LevelSpec {
        &self.level
    }

    pub fn ms_left(&self) -> f64 {
        self.ms_left
    }

    /// Remaining fright time, or None outside a fright interval.
    /// The renderer keys flashing off this.
    pub fn scared_ms_left(&self) -> Option<f64> {
        (self.mode == GhostMode::Scared).then_some(self.ms_left)
    }

    /// The mode a ghost leaving the house should roam in. Fright does
    /// not apply to a fresh leaver, so it resolves to the phase the
    /// fright interrupted.
    pub fn roam_mode(&self) -> GhostMode {
        let phase = if self.mode == GhostMode::Scared {
            self.prev_mode
        } else {
            self.mode
        };
        match phase {
            GhostMode::Chase => GhostMode::Chase,
            _ => GhostMode::Scatter,
        }
    }

    /// Advance all timers one frame. Returns the new global mode when a
    /// timer expiry caused a transition; the session broadcasts it.
    pub fn tick(&mut self) -> Option<GhostMode> {
        if self.home_ms_left > 0.0 {
            self.home_ms_left -= self.frame_ms;
        }

        match self.mode {
            GhostMode::Scatter | GhostMode::Chase | GhostMode::Scared => {}
            _ => return None,
        }

        self.ms_left -= self.frame_ms;
        if self.ms_left > 0.0 {
            return None;
        }

        let next = match self.mode {
            GhostMode::Scatter => {
                self.mode = GhostMode::Chase;
                self.ms_left = self.level.waves[self.phase_index].1;
                GhostMode::Chase
            }
            GhostMode::Chase => {
                self.phase_index = (self.phase_index + 1).min(self.level.waves.len() - 1);
                self.enter_scatter();
                GhostMode::Scatter
            }
            GhostMode::Scared => {
                // Resume the interrupted phase where it left off.
                self.mode = self.prev_mode;
                self.ms_left = self.prev_ms_left;
                self.mode
            }
            _ => unreachable!(),
        };
        Some(next)
    }

    /// Mode broadcast entry point. Unsupported modes are logged and
    /// dropped rather than corrupting the wave clock.
    pub fn set_mode(&mut self, mode: GhostMode, ms: f64) {
        match mode {
            GhostMode::Start => {
                self.phase_index = 0;
                self.enter_scatter();
            }
            GhostMode::Scatter => {
                self.mode = GhostMode::Scatter;
                self.ms_left = ms;
                self.scatter_entries += 1;
            }
            GhostMode::Chase => {
                self.mode = GhostMode::Chase;
                self.ms_left = ms;
            }
            GhostMode::Scared => {
                // Nested frights extend the timer but keep the original
                // interrupted phase on the shelf.
                if self.mode != GhostMode::Scared {
                    self.prev_mode = self.mode;
                    self.prev_ms_left = self.ms_left;
                    self.mode = GhostMode::Scared;
                }
                self.ms_left = ms;
            }
            GhostMode::PacmanDied => {
                // A death re-arms the shared release counter.
                self.mode = GhostMode::PacmanDied;
                self.global_active = true;
                self.global_counter = 0;
                self.home_ms_left = self.level.max_home_ms;
            }
            GhostMode::LevelSetup => {
                self.mode = GhostMode::LevelSetup;
                self.phase_index = 0;
                self.scatter_entries = 0;
                self.ms_left = 0.0;
                self.global_active = false;
                self.global_counter = 0;
                self.home_ms_left = self.level.max_home_ms;
            }
            other => {
                eprintln!("coordinator: ignoring mode broadcast {other:?}");
            }
        }
    }

    fn enter_scatter(&mut self) {
        self.mode = GhostMode::Scatter;
        self.ms_left = self.level.waves[self.phase_index].0;
        self.scatter_entries += 1;
    }

    // ── House release bookkeeping ──

    /// One pellet eaten; feeds the shared counter while it is active.
    pub fn pellet_eaten(&mut self) {
        if self.global_active {
            self.global_counter += 1;
        }
    }

    pub fn home_timer_expired(&self) -> bool {
        self.home_ms_left <= 0.0
    }

    pub fn reset_home_timer(&mut self) {
        self.home_ms_left = self.level.max_home_ms;
    }

    /// Shared counter hit Clyde's limit: fall back to per-ghost
    /// counters for the rest of the level.
    pub fn deactivate_global_counter(&mut self) {
        self.global_active = false;
        self.global_counter = 0;
    }
}
