/// Entry point and frame loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::{GameConfig, RngKind};
use domain::rng::RngSource;
use sim::event::GameEvent;
use sim::level::classic_maze;
use sim::session::{Session, Toggles};
use ui::input::InputState;
use ui::renderer::{Phase, Renderer, Scene};
use ui::sound::SoundEngine;

/// Idle sleep between event polls, well under one frame.
const FRAME_SLEEP: Duration = Duration::from_millis(2);

/// Level intro ("READY!") duration after a level load.
const INTRO_MS: u64 = 2200;
/// Shorter pause when respawning mid-level.
const RESPAWN_MS: u64 = 1200;
/// Wall-flash duration after the last pellet.
const CLEAR_MS: u64 = 2600;
/// How long GAME OVER stays before falling back to the title.
const GAME_OVER_MS: u64 = 5000;

fn main() {
    let config = GameConfig::load();

    let mut app = App::new(&config);
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut app, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("game error: {e}");
    }

    println!();
    println!("Final score: {}", app.high_score);
}

struct App {
    session: Session,
    phase: Phase,
    /// Frame counter within the current phase, drives blink/flash.
    anim_tick: u32,
    /// Frames left until the current phase auto-advances (0 = none).
    phase_frames_left: u32,
    paused: bool,
    high_score: u32,
    manual_ghost: bool,
}

impl App {
    fn new(config: &GameConfig) -> Self {
        App {
            session: build_session(config),
            phase: Phase::Title,
            anim_tick: 0,
            phase_frames_left: 0,
            paused: false,
            high_score: 0,
            manual_ghost: config.behavior.manual_ghost,
        }
    }

    fn enter(&mut self, phase: Phase, ms: u64) {
        self.phase = phase;
        self.anim_tick = 0;
        self.phase_frames_left = self.ms_to_frames(ms);
        self.paused = false;
    }

    fn ms_to_frames(&self, ms: u64) -> u32 {
        ((ms * self.session.frame_rate() as u64) / 1000) as u32
    }
}

fn build_session(config: &GameConfig) -> Session {
    let toggles = Toggles {
        legacy_targeting: config.behavior.legacy_targeting,
        look_ahead: config.behavior.look_ahead,
        manhattan: config.behavior.manhattan_distance,
        invincible: config.behavior.invincible,
        manual_ghost: config.behavior.manual_ghost,
    };
    let rng = match config.rng.kind {
        RngKind::Arcade => RngSource::arcade(config.rng.seed as u16),
        RngKind::Standard => RngSource::standard(config.rng.seed),
        RngKind::Hardware => RngSource::hardware(),
    };
    Session::new(
        classic_maze(),
        config.display.frame_rate,
        config.display.fields_per_second,
        toggles,
        rng,
    )
}

fn game_loop(
    app: &mut App,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let frame = Duration::from_nanos(1_000_000_000 / app.session.frame_rate() as u64);
    // Every Nth frame is render-only so the achieved actor speed
    // averages back down to the requested one.
    let sync_every = app.session.base_clock().sync_frame_count();
    let mut frame_no: u64 = 0;
    let mut last_frame = Instant::now();

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() || kb.any_pressed(&[KeyCode::Char('q'), KeyCode::Char('Q')]) {
            break;
        }
        handle_phase_input(app, sound, &kb, config);

        if last_frame.elapsed() >= frame {
            last_frame = Instant::now();
            frame_no += 1;
            app.anim_tick = app.anim_tick.wrapping_add(1);

            let render_only = matches!(sync_every, Some(n) if frame_no % n as u64 == 0);

            if !app.paused && !render_only {
                advance_phase(app, sound);
            }
            app.high_score = app.high_score.max(app.session.player.score);
        }

        let scene = Scene {
            session: &app.session,
            phase: app.phase,
            anim_tick: app.anim_tick,
            paused: app.paused,
            high_score: app.high_score,
        };
        renderer.render(&scene)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// One simulation frame, plus the phase transitions it triggers.
fn advance_phase(app: &mut App, sound: Option<&SoundEngine>) {
    match app.phase {
        Phase::Playing => {
            let alive = app.session.tick();
            process_sound_events(sound, &app.session.events);

            if app.session.events.iter().any(|e| matches!(e, GameEvent::PlayerKilled)) {
                app.enter(Phase::Dying, 0);
            } else if app.session.events.iter().any(|e| matches!(e, GameEvent::LevelCleared)) {
                if let Some(sfx) = sound {
                    sfx.play_clear();
                }
                app.enter(Phase::LevelComplete, CLEAR_MS);
            }
            debug_assert!(alive || app.phase == Phase::Dying);
        }
        Phase::Dying => {
            // Keep ticking: the dead-timer inside the player state
            // machine reports exactly once when the collapse is over.
            if !app.session.tick() {
                let p = &mut app.session.player;
                p.lives = p.lives.saturating_sub(1);
                if p.lives == 0 {
                    app.enter(Phase::GameOver, GAME_OVER_MS);
                } else {
                    app.session.respawn();
                    app.enter(Phase::LevelIntro, RESPAWN_MS);
                }
            }
        }
        Phase::LevelIntro => {
            if app.phase_frames_left > 0 {
                app.phase_frames_left -= 1;
            } else {
                app.session.begin_play();
                app.enter(Phase::Playing, 0);
            }
        }
        Phase::LevelComplete => {
            if app.phase_frames_left > 0 {
                app.phase_frames_left -= 1;
            } else {
                let next = app.session.level_number + 1;
                app.session.start_level(next);
                if let Some(sfx) = sound {
                    sfx.play_intro();
                }
                app.enter(Phase::LevelIntro, INTRO_MS);
            }
        }
        Phase::GameOver => {
            if app.phase_frames_left > 0 {
                app.phase_frames_left -= 1;
            } else {
                app.enter(Phase::Title, 0);
            }
        }
        Phase::Title => {}
    }
}

const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];

fn handle_phase_input(
    app: &mut App,
    sound: Option<&SoundEngine>,
    kb: &InputState,
    config: &GameConfig,
) {
    match app.phase {
        Phase::Title => {
            if kb.any_pressed(KEYS_CONFIRM) {
                // Fresh session so score, lives and rng state all restart
                app.session = build_session(config);
                app.session.start_level(1);
                if let Some(sfx) = sound {
                    sfx.play_intro();
                }
                app.enter(Phase::LevelIntro, INTRO_MS);
            }
        }
        Phase::Playing => {
            if kb.any_pressed(&[KeyCode::Char('p'), KeyCode::Char('P')]) {
                app.paused = !app.paused;
            }
            if app.paused {
                return;
            }
            if kb.any_pressed(&[KeyCode::Esc]) {
                app.enter(Phase::Title, 0);
                return;
            }
            if let Some(dir) = kb.player_dir() {
                app.session.steer_player(dir);
            }
            if app.manual_ghost {
                app.session.manual_ghost_dir = kb.ghost_dir();
            }
        }
        Phase::GameOver => {
            if kb.any_pressed(KEYS_CONFIRM) || kb.any_pressed(&[KeyCode::Esc]) {
                app.enter(Phase::Title, 0);
            }
        }
        Phase::LevelIntro | Phase::LevelComplete | Phase::Dying => {}
    }
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::PelletEaten { .. } => sfx.play_munch(),
            GameEvent::PowerPelletEaten { .. } => sfx.play_power(),
            GameEvent::FruitEaten { .. } => sfx.play_fruit(),
            GameEvent::GhostEaten { .. } => sfx.play_ghost(),
            GameEvent::PlayerKilled => sfx.play_die(),
            GameEvent::ExtraLife => sfx.play_extra_life(),
            _ => {}
        }
    }
}
