/// Input state tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous steering while a key is held
///   - Edge-triggered actions (pause, confirm) that fire on the press
///   - Separate steering feeds for the player and the manual ghost
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind};

use crate::domain::dir::Dir;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Player steering: arrows first, then WASD.
const PLAYER_KEYS: [(KeyCode, Dir); 8] = [
    (KeyCode::Up, Dir::Up),
    (KeyCode::Left, Dir::Left),
    (KeyCode::Down, Dir::Down),
    (KeyCode::Right, Dir::Right),
    (KeyCode::Char('w'), Dir::Up),
    (KeyCode::Char('a'), Dir::Left),
    (KeyCode::Char('s'), Dir::Down),
    (KeyCode::Char('d'), Dir::Right),
];

/// Manual-ghost steering on IJKL.
const GHOST_KEYS: [(KeyCode, Dir); 4] = [
    (KeyCode::Char('i'), Dir::Up),
    (KeyCode::Char('j'), Dir::Left),
    (KeyCode::Char('k'), Dir::Down),
    (KeyCode::Char('l'), Dir::Right),
];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned from "not held" → "held" during the
    /// most recent drain_events() call. Used for edge-triggered actions.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.raw_events.push(key);

                match key.kind {
                    KeyEventKind::Release if self.honor_release => {
                        self.last_active.remove(&key.code);
                    }
                    KeyEventKind::Release => {
                        // Ignore release when enhancement not confirmed;
                        // rely on timeout-based expiry instead
                    }
                    _ => {
                        let was_held = self.is_held_inner(key.code);
                        self.last_active.insert(key.code, Instant::now());
                        if !was_held {
                            self.fresh_presses.push(key.code);
                        }
                    }
                }
            }
        }

        // Expire keys that have timed out (fallback for terminals without Release)
        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Latest steering direction held for the player, if any.
    /// Later bindings win so a fresh key press overrides a held one.
    pub fn player_dir(&self) -> Option<Dir> {
        self.newest_dir(&PLAYER_KEYS)
    }

    /// Steering for the human-driven ghost (IJKL).
    pub fn ghost_dir(&self) -> Option<Dir> {
        self.newest_dir(&GHOST_KEYS)
    }

    fn newest_dir(&self, bindings: &[(KeyCode, Dir)]) -> Option<Dir> {
        bindings
            .iter()
            .filter_map(|&(code, dir)| self.last_active.get(&code).map(|t| (*t, dir)))
            .max_by_key(|&(t, _)| t)
            .map(|(_, dir)| dir)
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys freshly pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        use crossterm::event::KeyModifiers;
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    // ── Internal ──

    fn is_held_inner(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }
}
