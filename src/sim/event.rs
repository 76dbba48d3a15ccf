/// Events emitted during a simulation tick.
/// The presentation layer consumes these for sound and popups.

#[derive(Clone, Copy, Debug)]
pub enum GameEvent {
    PelletEaten { x: i32, y: i32 },
    PowerPelletEaten { x: i32, y: i32 },
    FruitSpawned { x: i32, y: i32 },
    FruitExpired,
    FruitEaten { points: u32 },
    GhostEaten { ghost: usize, points: u32 },
    PlayerKilled,
    ExtraLife,
    LevelCleared,
}
