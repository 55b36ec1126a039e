//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod actor;
pub mod collision;
pub mod projection;
pub mod rect;
pub mod spawner;
pub mod state;
pub mod tick;

pub use actor::{Actor, Bullet, BulletKind, Explosion, Obstacle, ObstacleKind, Player};
pub use collision::{CollisionResult, is_near_miss, player_obstacle_collision};
pub use projection::{Projection, RoadGeometry, ScaleRange};
pub use rect::Rect;
pub use spawner::{SpawnPolicy, SpawnRules, SpawnSlot, choose_spawn_pattern};
pub use state::{DestroyCause, GameEvent, RaceMode, RaceState, Weapon};
pub use tick::{TickInput, tick};
