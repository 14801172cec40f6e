//! Arena scene assembly.
//!
//! Builds the grid, cage wall, grass and ball drawables from an
//! [`ArenaConfig`], moves the ball each tick and issues the draws in a fixed
//! order. Everything here talks to the GPU only through the `arena-render`
//! drawable contract, so the same scene runs on wgpu and on the recording
//! backend.
//!
//! # Invariants
//! - Drawable capacities are sized at setup from the cage dimensions and are
//!   never exceeded.
//! - Layout matrices are device-ready (transposed) when they leave this crate.
//! - Draw order is grid, wall, grass, dry grass, ball.

mod arena;
mod ball;
mod config;
pub mod layout;
mod textures;

pub use arena::{Arena, DrawableStats};
pub use ball::{BALL_Z, BallState, HIT_OFFSET};
pub use config::{
    ArenaConfig, BallConfig, CameraConfig, ConfigError, GridConfig, MAX_INSTANCE_BUFFER_BYTES,
    TexturePaths,
};
pub use textures::{ArenaTextures, TextureSource, TextureSources};

use arena_render::RenderError;

/// Number of selectable ball skins.
pub const BALL_SKINS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub fn crate_info() -> &'static str {
    "arena-scene v0.1.0"
}
