pub mod core;
pub mod main;
pub mod refresh;
pub mod render;
mod run_effect;
