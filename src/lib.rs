//! Shadow Runner - an endless side-scrolling platformer
//!
//! Core modules:
//! - `sim`: Gameplay rules (level generation, segment lifecycle, score, abilities)
//! - `platform`: Host engine boundary (Phaser in the browser, headless natively)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Frame rate the host engine targets
    pub const TARGET_FPS: u32 = 60;
    /// Nominal frame time
    pub const FRAME_DT: f32 = 1.0 / TARGET_FPS as f32;
    /// Longest frame the rules will integrate (tab switches, hitches)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// World gravity handed to the host physics (pixels/s²)
    pub const WORLD_GRAVITY: f32 = 300.0;
    /// Extra gravity on the player body once it is enabled
    pub const PLAYER_GRAVITY: f32 = 300.0;
    /// Terminal fall speed of the player
    pub const MAX_FALL_SPEED: f32 = 600.0;
}
