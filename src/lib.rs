//! Tile/sprite atlas animation with scripted projects.
//!
//! A project is a directory holding `config.json` and `main.rhai`. The
//! [`runner::Runner`] loads it, creates the renderer, hands the script a
//! namespace of engine capabilities and runs it; the script builds its scene
//! from tilesets and sprite sheets and animates it through the ticker.

pub mod atlas;
pub mod config;
pub mod error;
pub mod loaders;
pub mod path;
pub mod player;
pub mod renderer;
pub mod runner;
pub mod script;
pub mod sprites;
pub mod texture;
pub mod tiles;
pub mod types;
