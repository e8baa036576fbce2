//! Platform abstraction layer
//!
//! Separates gameplay from the engine that hosts it:
//! - `host`: the engine services the simulation consumes
//! - `backdrop`: parallax background layout
//! - `headless`: recording host for tests and native runs
//! - `phaser`: Phaser 3 bindings (browser only)

pub mod backdrop;
pub mod headless;
pub mod host;
#[cfg(target_arch = "wasm32")]
pub mod phaser;

pub use backdrop::Backdrop;
pub use headless::HeadlessHost;
pub use host::{Body, Effect, EntityId, Facing, Host, MonsterKind, Sprite};
