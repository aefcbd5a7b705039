pub mod common;
pub mod config;
pub mod error;
pub mod map;
pub mod pathfinder;
pub mod stat;
pub mod state;
