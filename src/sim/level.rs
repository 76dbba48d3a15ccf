/// The built-in board.
///
/// ## Tile legend:
///   '#' = wall            '-' = house gate
///   '.' = pellet          'o' = power pellet
///   'P' = player spawn    ' ' = empty path
///
/// Geometry (tunnels, red zones, house boxes, scatter corners) is
/// keyed to this layout, so the two are defined side by side.

use crate::domain::maze::{Maze, Region};
use crate::domain::tile::Tile;

pub const BOARD_WIDTH: i32 = 28;
pub const BOARD_HEIGHT: i32 = 31;

#[rustfmt::skip]
const CLASSIC: [&str; 31] = [
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.##### ## #####.######",
    "######.##### ## #####.######",
    "######.##          ##.######",
    "######.## ###--### ##.######",
    "######.## #      # ##.######",
    "      .   #      #   .      ",
    "######.## #      # ##.######",
    "######.## ######## ##.######",
    "######.##          ##.######",
    "######.## ######## ##.######",
    "######.## ######## ##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......P .......##..o#",
    "###.##.##.########.##.##.###",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
];

/// Build the classic board with its named geometry.
pub fn classic_maze() -> Maze {
    let mut tiles = Vec::with_capacity((BOARD_WIDTH * BOARD_HEIGHT) as usize);
    let mut player_start = (13, 23);

    for (y, row) in CLASSIC.iter().enumerate() {
        debug_assert_eq!(row.len(), BOARD_WIDTH as usize, "row {y} width");
        for (x, ch) in row.chars().enumerate() {
            tiles.push(match ch {
                '#' => Tile::Wall,
                '-' => Tile::Gate,
                '.' => Tile::Pellet,
                'o' => Tile::PowerPellet,
                'P' => {
                    player_start = (x as i32, y as i32);
                    Tile::Empty
                }
                _ => Tile::Empty,
            });
        }
    }

    Maze::new(
        BOARD_WIDTH,
        BOARD_HEIGHT,
        tiles,
        // Blinky, Pinky, Inky, Clyde.
        [(25, 0), (2, 0), (27, 30), (0, 30)],
        [
            Region { min: (0, 14), max: (5, 14) },
            Region { min: (22, 14), max: (27, 14) },
        ],
        // No upward turns for scattering/chasing ghosts here.
        [
            Region { min: (10, 11), max: (17, 11) },
            Region { min: (10, 23), max: (17, 23) },
        ],
        player_start,
        Region { min: (10, 12), max: (17, 16) },
        Region { min: (11, 13), max: (16, 15) },
        (13, 11),
        // Berth per personality; Blinky returns to the center berth
        // only as a phantom, he spawns at the exit tile.
        [(13, 14), (13, 14), (11, 14), (15, 14)],
        (13, 17),
    )
}
