//! Gameplay simulation
//!
//! All gameplay rules live here. Rendering, physics and input polling belong
//! to the host engine and are reached only through `platform::Host`:
//! - `segment`: procedural generation of one level slice
//! - `lifecycle`: keeping slices alive ahead of the player and reclaiming them
//! - `status`: score and timed abilities
//! - `tick`: the per-frame rules

pub mod events;
pub mod geometry;
pub mod lifecycle;
pub mod segment;
pub mod state;
pub mod status;
pub mod tick;

pub use events::{EventListener, GameEvent};
pub use geometry::{Aabb, PlatformSpan};
pub use lifecycle::{Coin, Monster, PowerUp, Segment, SegmentTrack, TrackUpdate};
pub use segment::{MonsterSpawn, PowerUpSpawn, SegmentPlan, generate_segment};
pub use state::{Bullet, EntityAllocator, GamePhase, GameState, Player};
pub use status::{AbilityKind, AbilityTimer, Status};
pub use tick::{Contact, TickInput, tick};
