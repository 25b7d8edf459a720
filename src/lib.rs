pub mod config;
pub mod core;
pub mod error;
pub mod headless;
pub mod insights;
pub mod log;
pub mod metrics;
pub mod pipeline;
pub mod random;

// Decoupled game loop architecture
pub mod actors;
pub mod app;
pub mod render;
pub mod tea;
pub mod ui;

pub use error::{Error, Result};
