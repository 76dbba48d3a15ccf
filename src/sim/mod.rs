pub mod coordinator;
pub mod event;
pub mod ghost;
pub mod level;
pub mod player;
pub mod session;
