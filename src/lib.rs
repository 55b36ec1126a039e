//! Highway Escape - A lane-based pseudo-3D arcade racer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (projection, actors, spawner, race state machine)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences (difficulty, screen size)
//! - `highscores`: Leaderboard fed by crash events
//! - `persistence`: Versioned JSON storage on disk

pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::{Difficulty, Tuning};

/// Game configuration constants
pub mod consts {
    /// Simulation tick rate (one step per rendered frame)
    pub const SIM_HZ: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;

    /// Default screen size the road geometry is laid out for
    pub const SCREEN_WIDTH: f32 = 900.0;
    pub const SCREEN_HEIGHT: f32 = 700.0;

    /// Player sits at a fixed depth near the camera
    pub const PLAYER_DEPTH: f32 = 0.92;
    /// Obstacles past this depth are behind the camera and removed
    pub const DESPAWN_DEPTH: f32 = 1.2;
    /// Bullets that reach the horizon are removed
    pub const BULLET_HORIZON_DEPTH: f32 = 0.0;
    /// Bullets leave the car slightly ahead of the player
    pub const BULLET_MUZZLE_OFFSET: f32 = 0.04;

    /// New obstacles appear near the horizon, inside this depth window
    pub const Z_SPAWN_MIN: f32 = 0.03;
    pub const Z_SPAWN_MAX: f32 = 0.20;

    /// Base footprints (width, height) in abstract units before depth scaling
    pub const PLAYER_FOOTPRINT: (f32, f32) = (72.0, 100.0);
    pub const CAR_FOOTPRINT: (f32, f32) = (75.0, 145.0);
    pub const CONE_FOOTPRINT: (f32, f32) = (34.0, 34.0);
    /// Roadblock width comes from the lane width; only height is fixed
    pub const ROADBLOCK_HEIGHT: f32 = 65.0;
    /// Fraction of two lane widths a roadblock spans
    pub const ROADBLOCK_WIDTH_FILL: f32 = 0.95;
    pub const BULLET_FOOTPRINT: (f32, f32) = (10.0, 26.0);
    pub const EMPOWERED_BULLET_FOOTPRINT: (f32, f32) = (18.0, 40.0);
    pub const EXPLOSION_FOOTPRINT: (f32, f32) = (120.0, 120.0);

    /// Obstacles "sit" on the road: center raised by this fraction of height
    pub const OBSTACLE_LIFT: f32 = 0.10;

    /// Explosion animation
    pub const EXPLOSION_FRAMES: u32 = 8;
    pub const EXPLOSION_TICKS_PER_FRAME: u32 = 4;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Quadratic ease-in, gives approaching objects apparent acceleration
#[inline]
pub fn ease_in(t: f32) -> f32 {
    t * t
}

/// Current wall-clock time in UNIX milliseconds (0 if the clock is before the epoch)
pub fn unix_millis() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
