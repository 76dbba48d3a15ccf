pub mod actor;
pub mod dir;
pub mod keyframe;
pub mod levels;
pub mod maze;
pub mod rng;
pub mod tile;
