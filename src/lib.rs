//! Hollowfield library crate.
//!
//! The binary crate (`main.rs`) is the game entry point; this library
//! exposes the same modules so the `tests/` integration suite can drive
//! systems and resources headlessly, without a window or GPU.

pub mod shared;
pub mod input;
pub mod world;
pub mod player;
pub mod actions;
pub mod farming;
pub mod items;
pub mod combat;
pub mod enemies;
pub mod npcs;
pub mod horror;
pub mod audio;
pub mod render;
pub mod save;
