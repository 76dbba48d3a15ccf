/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.
///
/// Each board tile occupies 2 terminal columns so the maze reads
/// roughly square in a typical terminal font.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::dir::Dir;
use crate::domain::tile::Tile;
use crate::sim::ghost::{GhostMode, Personality};
use crate::sim::player::PlayerMode;
use crate::sim::session::Session;

/// App-level presentation phase, owned by the frame loop in main.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    LevelIntro,
    Playing,
    Dying,
    LevelComplete,
    GameOver,
}

/// Everything the renderer needs for one frame.
pub struct Scene<'a> {
    pub session: &'a Session,
    pub phase: Phase,
    /// Frame counter within the current phase, drives blink/flash cycles.
    pub anim_tick: u32,
    pub paused: bool,
    pub high_score: u32,
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 8],   // UTF-8 bytes of the glyph (emoji fruit included)
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool,    // true = this char occupies 2 terminal columns
    cont: bool,    // true = continuation of previous wide char (skip render)
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// Using the SAME explicit RGB for both `Clear(ClearType::All)` and
    /// every cell's background keeps the inter-row gap pixels on VTE-based
    /// terminals identical to the cell color, so no horizontal seams show.
    const BASE_BG: Color = Color::Rgb { r: 12, g: 12, b: 24 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0, 0, 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 8],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Sentinel used to invalidate the back buffer: differs from any real
    /// cell, so every position gets re-emitted on the next diff.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0, 0, 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    /// Normalize bg: Color::Reset → BASE_BG so every cell carries an
    /// explicit background (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        let len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.ch_len = len;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn from_char_wide(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::from_char(c, fg, bg);
        cell.wide = true;
        cell
    }

    fn as_str(&self) -> &str {
        if self.ch_len == 0 {
            return "";
        }
        unsafe { std::str::from_utf8_unchecked(&self.ch[..self.ch_len as usize]) }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::from_char(ch, fg, bg));
            cx += 1;
        }
    }
}

// ── Renderer ──

/// Each board tile = 2 terminal columns.
const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

// Palette
const WALL_BG: Color = Color::Rgb { r: 28, g: 28, b: 150 };
const GATE_FG: Color = Color::Rgb { r: 255, g: 184, b: 222 };
const PELLET_FG: Color = Color::Rgb { r: 255, g: 184, b: 151 };
const PLAYER_FG: Color = Color::Rgb { r: 255, g: 255, b: 0 };
const SCARED_FG: Color = Color::Rgb { r: 66, g: 66, b: 255 };
const HUD_BG: Color = Color::Rgb { r: 18, g: 18, b: 50 };

/// Fright flashing starts this long before the scare runs out.
const FLASH_WINDOW_MS: f64 = 2000.0;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, scene: &Scene) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change → clear for a clean transition
        if self.last_phase != Some(scene.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(scene.phase);
        }

        self.front.clear();

        match scene.phase {
            Phase::Title => self.compose_title(scene),
            Phase::LevelIntro => self.compose_board_phase(scene, Some("READY!"), true),
            Phase::Playing => self.compose_board_phase(scene, None, true),
            Phase::Dying => self.compose_board_phase(scene, None, false),
            Phase::LevelComplete => self.compose_level_complete(scene),
            Phase::GameOver => self.compose_board_phase(scene, Some("GAME  OVER"), false),
        }

        if scene.paused {
            self.compose_pause_overlay();
        }

        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors at start of frame. No ResetColor here: it
        // would reset to the terminal's native default, which may differ
        // from BASE_BG and cause line artifacts.
        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                // Continuation cells (right half of a wide glyph) never render
                if cell.cont {
                    x += 1;
                    continue;
                }

                // A wide glyph must re-render if its continuation changed
                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    x += 1;
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                let advance = if cell.wide { 2 } else { 1 };
                cursor_at = Some((x + advance, y));
                x += advance;
            }
        }

        self.writer.flush()
    }

    // ── Board composition ──

    /// Playing / intro / dying / game-over all share the board view;
    /// they differ in the banner text and whether ghosts are shown.
    fn compose_board_phase(&mut self, scene: &Scene, banner: Option<&str>, show_ghosts: bool) {
        self.compose_hud(scene);
        self.compose_tiles(scene, false);

        if show_ghosts {
            self.compose_ghosts(scene);
        }
        self.compose_player(scene);
        self.compose_popup(scene);

        if let Some(text) = banner {
            // Banner goes on the blank row below the ghost house,
            // where the arcade machine writes READY!.
            let row = MAP_ROW + 17;
            let cols = scene.session.maze.width() as usize * CELL_W;
            let x = cols.saturating_sub(text.len()) / 2;
            let fg = if text.starts_with("GAME") {
                Color::Rgb { r: 255, g: 64, b: 64 }
            } else {
                Color::Rgb { r: 255, g: 255, b: 80 }
            };
            self.front.put_str(x, row, text, fg, Color::Reset);
        }

        self.compose_footer(scene);
    }

    fn compose_hud(&mut self, scene: &Scene) {
        let buf_w = self.front.width;
        for x in 0..buf_w {
            self.front.set(x, HUD_ROW, Cell::from_char(' ', Color::White, HUD_BG));
        }
        let s = scene.session;
        let hud = format!(
            " SCORE {:<7}  HIGH {:<7}  LEVEL {:<2}",
            s.player.score,
            scene.high_score.max(s.player.score),
            s.level_number,
        );
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    /// Lives and fruit badge on the row below the maze.
    fn compose_footer(&mut self, scene: &Scene) {
        let s = scene.session;
        let row = MAP_ROW + s.maze.height() as usize + 1;
        if row >= self.front.height {
            return;
        }
        // One marker per remaining spare life
        let spare = s.player.lives.saturating_sub(1);
        for i in 0..spare.min(5) {
            self.front.set(1 + (i as usize) * 2, row, Cell::from_char('ᗧ', PLAYER_FG, Color::Reset));
        }
        // Current level's fruit on the right edge
        let glyph = fruit_glyph(s.level().fruit);
        let x = (s.maze.width() as usize) * CELL_W - 3;
        self.front.set(x, row, Cell::from_char_wide(glyph, Color::Reset, Color::Reset));
        self.front.set(x + 1, row, Cell::WIDE_CONT);

        let help_row = row + 2;
        if help_row < self.front.height {
            let help = " Arrows/WASD: steer   P: pause   Q: quit";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    /// `flash_walls` alternates the wall color, used by the level-clear
    /// animation.
    fn compose_tiles(&mut self, scene: &Scene, flash_walls: bool) {
        let s = scene.session;
        let maze = &s.maze;
        let wall_bg = if flash_walls && scene.anim_tick / 8 % 2 == 1 {
            Color::Rgb { r: 220, g: 220, b: 255 }
        } else {
            WALL_BG
        };
        // Power pellets blink at ~2.5Hz
        let pp_visible = scene.anim_tick / 12 % 2 == 0;

        for gy in 0..maze.height() {
            let row = MAP_ROW + gy as usize;
            if row >= self.front.height {
                break;
            }
            for gx in 0..maze.width() {
                let col = gx as usize * CELL_W;
                if col + 1 >= self.front.width {
                    break;
                }
                let tile = maze.get(gx, gy);
                match tile {
                    Tile::Empty => {
                        self.front.set(col, row, Cell::BLANK);
                        self.front.set(col + 1, row, Cell::BLANK);
                    }
                    Tile::Wall => {
                        self.front.set(col, row, Cell::from_char(' ', Color::White, wall_bg));
                        self.front.set(col + 1, row, Cell::from_char(' ', Color::White, wall_bg));
                    }
                    Tile::Gate => {
                        self.front.set(col, row, Cell::from_char('─', GATE_FG, Color::Reset));
                        self.front.set(col + 1, row, Cell::from_char('─', GATE_FG, Color::Reset));
                    }
                    Tile::Pellet => {
                        self.front.set(col, row, Cell::from_char('·', PELLET_FG, Color::Reset));
                        self.front.set(col + 1, row, Cell::BLANK);
                    }
                    Tile::PowerPellet => {
                        let c = if pp_visible { '●' } else { ' ' };
                        self.front.set(col, row, Cell::from_char(c, PELLET_FG, Color::Reset));
                        self.front.set(col + 1, row, Cell::BLANK);
                    }
                    fruit => {
                        let glyph = fruit_glyph(fruit);
                        self.front.set(col, row, Cell::from_char_wide(glyph, Color::Reset, Color::Reset));
                        self.front.set(col + 1, row, Cell::WIDE_CONT);
                    }
                }
            }
        }
    }

    fn compose_ghosts(&mut self, scene: &Scene) {
        let s = scene.session;
        let scared_left = s.coordinator.scared_ms_left();

        for ghost in &s.ghosts {
            if ghost.mode == GhostMode::Away {
                continue;
            }
            let gx = ghost.pos.x().round() as i32;
            let gy = ghost.pos.y().round() as i32;
            let col = gx.max(0) as usize * CELL_W;
            let row = MAP_ROW + gy.max(0) as usize;

            let (glyph, fg) = match ghost.mode {
                GhostMode::Phantom => ('"', Color::White),
                GhostMode::Scared => {
                    let flashing = matches!(scared_left, Some(ms) if ms < FLASH_WINDOW_MS)
                        && scene.anim_tick / 6 % 2 == 1;
                    ('ᗣ', if flashing { Color::White } else { SCARED_FG })
                }
                _ => ('ᗣ', ghost_color(ghost.personality)),
            };
            self.front.set(col, row, Cell::from_char(glyph, fg, Color::Reset));
        }
    }

    fn compose_player(&mut self, scene: &Scene) {
        let s = scene.session;
        let p = &s.player;
        let gx = p.pos.x().round() as i32;
        let gy = p.pos.y().round() as i32;
        let col = gx.max(0) as usize * CELL_W;
        let row = MAP_ROW + gy.max(0) as usize;

        let glyph = if scene.phase == Phase::Dying || p.mode == PlayerMode::Dead {
            // Collapse animation: shrink then vanish
            match scene.anim_tick / 10 {
                0..=1 => 'ᗧ',
                2..=3 => 'O',
                4..=5 => 'o',
                6 => '·',
                _ => ' ',
            }
        } else {
            // Chomp: mouth opens toward the travel direction on alternate frames
            if scene.anim_tick / 4 % 2 == 0 {
                '●'
            } else {
                match p.dir {
                    Dir::Right => 'ᗤ',
                    Dir::Left => 'ᗧ',
                    Dir::Up => 'ᗢ',
                    Dir::Down => 'ᗣ',
                }
            }
        };
        self.front.set(col, row, Cell::from_char(glyph, PLAYER_FG, Color::Reset));
    }

    fn compose_popup(&mut self, scene: &Scene) {
        if let Some(popup) = &scene.session.player.popup {
            let text = popup.points.to_string();
            let col = (popup.x.round() as usize) * CELL_W;
            let row = MAP_ROW + popup.y.round() as usize;
            self.front.put_str(col, row, &text, Color::Rgb { r: 80, g: 255, b: 255 }, Color::Reset);
        }
    }

    // ── Static screens ──

    fn compose_title(&mut self, scene: &Scene) {
        let cols = self.front.width;
        let center = |s: &str| cols.saturating_sub(s.chars().count()) / 2;

        let title = [
            "███╗   ███╗ █████╗ ███████╗███████╗",
            "████╗ ████║██╔══██╗╚══███╔╝██╔════╝",
            "██╔████╔██║███████║  ███╔╝ █████╗",
            "██║╚██╔╝██║██╔══██║ ███╔╝  ██╔══╝",
            "██║ ╚═╝ ██║██║  ██║███████╗███████╗",
            "╚═╝     ╚═╝╚═╝  ╚═╝╚══════╝╚══════╝",
            "            C H A S E",
        ];
        for (i, line) in title.iter().copied().enumerate() {
            self.front.put_str(center(line), 2 + i, line, PLAYER_FG, Color::Reset);
        }

        // Cast roll, one ghost per row
        let cast: [(Personality, &str, &str); 4] = [
            (Personality::Blinky, "BLINKY", "shadow"),
            (Personality::Pinky, "PINKY", "speedy"),
            (Personality::Inky, "INKY", "bashful"),
            (Personality::Clyde, "CLYDE", "pokey"),
        ];
        for (i, (who, name, nick)) in cast.iter().enumerate() {
            let row = 11 + i * 2;
            let line = format!("ᗣ  {:<8} \"{}\"", name, nick);
            self.front.put_str(center(&line), row, &line, ghost_color(*who), Color::Reset);
        }

        let chase = "ᗧ · · · ᗣ ᗣ ᗣ ᗣ";
        self.front.put_str(center(chase), 20, chase, PLAYER_FG, Color::Reset);

        if scene.anim_tick / 16 % 2 == 0 {
            let prompt = "PRESS ENTER TO START";
            self.front.put_str(center(prompt), 23, prompt, Color::White, Color::Reset);
        }
        let hi = format!("HIGH SCORE  {}", scene.high_score);
        self.front.put_str(center(&hi), 25, &hi, Color::DarkGrey, Color::Reset);
    }

    fn compose_level_complete(&mut self, scene: &Scene) {
        self.compose_hud(scene);
        self.compose_tiles(scene, true);
        self.compose_player(scene);
        self.compose_footer(scene);
    }

    fn compose_pause_overlay(&mut self) {
        let text = "║ PAUSED ║";
        let cols = self.front.width;
        let x = cols.saturating_sub(text.len()) / 2;
        let row = MAP_ROW + 14;
        let bg = Color::Rgb { r: 60, g: 60, b: 20 };
        self.front.put_str(x, row.saturating_sub(1), "╔════════╗", Color::Yellow, bg);
        self.front.put_str(x, row, text, Color::Yellow, bg);
        self.front.put_str(x, row + 1, "╚════════╝", Color::Yellow, bg);
    }
}

fn ghost_color(who: Personality) -> Color {
    match who {
        Personality::Blinky => Color::Rgb { r: 255, g: 40, b: 40 },
        Personality::Pinky => Color::Rgb { r: 255, g: 184, b: 255 },
        Personality::Inky => Color::Rgb { r: 0, g: 255, b: 255 },
        Personality::Clyde => Color::Rgb { r: 255, g: 184, b: 82 },
    }
}

fn fruit_glyph(tile: Tile) -> char {
    match tile {
        Tile::Cherry => '🍒',
        Tile::Strawberry => '🍓',
        Tile::Peach => '🍑',
        Tile::Apple => '🍎',
        Tile::Grapes => '🍇',
        Tile::Galaxian => '🚀',
        Tile::Bell => '🔔',
        Tile::Key => '🔑',
        _ => '?',
    }
}
