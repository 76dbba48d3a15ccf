/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
    pub rng: RngConfig,
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    /// Render frames per second; the simulation ticks once per frame.
    pub frame_rate: u32,
    /// Tiles per second at 100% speed. Per-actor percentages scale this.
    pub fields_per_second: f64,
}

#[derive(Clone, Debug)]
pub struct BehaviorConfig {
    pub legacy_targeting: bool,
    pub look_ahead: bool,
    pub manhattan_distance: bool,
    pub invincible: bool,
    pub manual_ghost: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RngKind {
    Arcade,
    Standard,
    Hardware,
}

#[derive(Clone, Debug)]
pub struct RngConfig {
    pub kind: RngKind,
    pub seed: u64,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    behavior: TomlBehavior,
    #[serde(default)]
    rng: TomlRng,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_frame_rate")]
    frame_rate: u32,
    #[serde(default = "default_fields_per_second")]
    fields_per_second: f64,
}

#[derive(Deserialize, Debug)]
struct TomlBehavior {
    #[serde(default = "default_true")]
    legacy_targeting: bool,
    #[serde(default)]
    look_ahead: bool,
    #[serde(default)]
    manhattan_distance: bool,
    #[serde(default)]
    invincible: bool,
    #[serde(default)]
    manual_ghost: bool,
}

#[derive(Deserialize, Debug)]
struct TomlRng {
    #[serde(default = "default_rng_source")]
    source: String,
    #[serde(default = "default_seed")]
    seed: u64,
}

// ── Defaults ──

fn default_frame_rate() -> u32 { 60 }
fn default_fields_per_second() -> f64 { 8.0 }
fn default_true() -> bool { true }
fn default_rng_source() -> String { "arcade".into() }
fn default_seed() -> u64 { 0x1234 }

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            frame_rate: default_frame_rate(),
            fields_per_second: default_fields_per_second(),
        }
    }
}

impl Default for TomlBehavior {
    fn default() -> Self {
        TomlBehavior {
            legacy_targeting: true,
            look_ahead: false,
            manhattan_distance: false,
            invincible: false,
            manual_ghost: false,
        }
    }
}

impl Default for TomlRng {
    fn default() -> Self {
        TomlRng {
            source: default_rng_source(),
            seed: default_seed(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());

        let kind = match toml_cfg.rng.source.to_ascii_lowercase().as_str() {
            "standard" => RngKind::Standard,
            "hardware" => RngKind::Hardware,
            "arcade" => RngKind::Arcade,
            other => {
                eprintln!("Warning: unknown rng source {other:?}, using arcade");
                RngKind::Arcade
            }
        };

        GameConfig {
            display: DisplayConfig {
                frame_rate: toml_cfg.display.frame_rate.max(1),
                fields_per_second: toml_cfg.display.fields_per_second,
            },
            behavior: BehaviorConfig {
                legacy_targeting: toml_cfg.behavior.legacy_targeting,
                look_ahead: toml_cfg.behavior.look_ahead,
                manhattan_distance: toml_cfg.behavior.manhattan_distance,
                invincible: toml_cfg.behavior.invincible,
                manual_ghost: toml_cfg.behavior.manual_ghost,
            },
            rng: RngConfig {
                kind,
                seed: toml_cfg.rng.seed,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so an installed binary still finds its data.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/mazechase)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/mazechase");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory (/usr/share/mazechase)
    let sys = PathBuf::from("/usr/share/mazechase");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    // 5. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
