//! Moving entities on the road
//!
//! Every actor lives on a single depth axis (plus a discrete lane) and turns
//! into a screen rectangle through the [`Projection`]. Variant-specific data
//! (footprint, health, destruction rule) is carried by small kind enums rather
//! than a type hierarchy.

use glam::Vec2;

use super::projection::{Projection, ScaleRange};
use super::rect::Rect;
use crate::consts::*;
use crate::lerp;

/// Shared motion/lifecycle contract
pub trait Actor {
    /// Current depth (0 = horizon, 1 = camera)
    fn depth(&self) -> f32;
    /// Screen-space bounding rectangle
    fn bounding_rect(&self, projection: &Projection) -> Rect;
    /// Whether the actor should be pruned
    fn is_expired(&self) -> bool;
}

/// The player's car
#[derive(Debug, Clone)]
pub struct Player {
    /// Committed lane
    pub lane: usize,
    /// Lane being moved toward
    pub target_lane: usize,
    /// Lane change progress: 0 = just started, 1 = settled
    pub lane_blend: f32,
    /// Fixed depth near the camera
    pub depth: f32,
    /// Blend gained per tick
    pub lane_change_step: f32,
    lane_count: usize,
    /// Ticks of collision immunity left (granted by near misses)
    pub immunity_ticks: u32,
}

impl Player {
    /// New player settled in the middle lane
    pub fn new(lane_count: usize, lane_change_step: f32) -> Self {
        let lane_count = lane_count.max(1);
        let lane = lane_count / 2;
        Self {
            lane,
            target_lane: lane,
            lane_blend: 1.0,
            depth: PLAYER_DEPTH,
            lane_change_step,
            lane_count,
            immunity_ticks: 0,
        }
    }

    /// True while a lane change is in progress
    pub fn is_changing_lanes(&self) -> bool {
        self.lane != self.target_lane
    }

    /// Request a move one lane to the left.
    ///
    /// Ignored mid-transition and at the left edge.
    pub fn move_left(&mut self) {
        if self.is_changing_lanes() || self.target_lane == 0 {
            return;
        }
        self.target_lane -= 1;
        self.lane_blend = 0.0;
    }

    /// Request a move one lane to the right.
    ///
    /// Ignored mid-transition and at the right edge.
    pub fn move_right(&mut self) {
        if self.is_changing_lanes() || self.target_lane + 1 >= self.lane_count {
            return;
        }
        self.target_lane += 1;
        self.lane_blend = 0.0;
    }

    /// Advance lane change and timers by one tick
    pub fn update(&mut self) {
        self.immunity_ticks = self.immunity_ticks.saturating_sub(1);

        if self.is_changing_lanes() {
            self.lane_blend = (self.lane_blend + self.lane_change_step).min(1.0);
            if self.lane_blend >= 1.0 {
                self.lane = self.target_lane;
            }
        } else {
            self.lane_blend = 1.0;
        }
    }

    /// Lane the car mostly occupies (switches halfway through a lane change)
    pub fn effective_lane(&self) -> usize {
        if self.lane_blend >= 0.5 {
            self.target_lane
        } else {
            self.lane
        }
    }

    pub fn is_immune(&self) -> bool {
        self.immunity_ticks > 0
    }
}

impl Actor for Player {
    fn depth(&self) -> f32 {
        self.depth
    }

    fn bounding_rect(&self, projection: &Projection) -> Rect {
        let y = projection.y_from_depth(self.depth);
        let x = if self.is_changing_lanes() {
            let from = projection.lane_center_at_row(self.lane, y);
            let to = projection.lane_center_at_row(self.target_lane, y);
            lerp(from, to, self.lane_blend.clamp(0.0, 1.0))
        } else {
            projection.lane_center_at_row(self.lane, y)
        };
        let scale = ScaleRange::PLAYER.at(self.depth);
        let size = Vec2::from(PLAYER_FOOTPRINT) * scale;
        Rect::from_bottom_center(Vec2::new(x, y), size)
    }

    fn is_expired(&self) -> bool {
        false
    }
}

/// Obstacle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    /// Takes several bullet hits
    Car,
    /// Destroyed by a single hit
    Cone,
    /// Spans `lane` and `lane + 1`; destroyed by a single hit
    Roadblock,
}

impl ObstacleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Car => "car",
            ObstacleKind::Cone => "cone",
            ObstacleKind::Roadblock => "roadblock",
        }
    }

    /// Number of lanes this kind occupies
    pub fn lane_span(&self) -> usize {
        match self {
            ObstacleKind::Roadblock => 2,
            _ => 1,
        }
    }
}

/// An approaching obstacle
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Leftmost lane occupied
    pub lane: usize,
    pub depth: f32,
    /// Only cars carry health
    pub health: Option<u8>,
    /// Near-miss bonus already awarded
    pub near_miss_scored: bool,
    /// Set when destroyed; pruned at the end of the tick
    pub destroyed: bool,
}

impl Obstacle {
    pub fn new(id: u32, kind: ObstacleKind, lane: usize, depth: f32, car_health: u8) -> Self {
        Self {
            id,
            kind,
            lane,
            depth,
            health: (kind == ObstacleKind::Car).then_some(car_health),
            near_miss_scored: false,
            destroyed: false,
        }
    }

    /// Lanes covered by this obstacle
    pub fn lanes(&self) -> std::ops::Range<usize> {
        self.lane..self.lane + self.kind.lane_span()
    }

    pub fn occupies(&self, lane: usize) -> bool {
        self.lanes().contains(&lane)
    }

    /// Move toward the camera
    pub fn advance(&mut self, delta_depth: f32) {
        self.depth += delta_depth;
    }

    /// Apply `damage`. Returns true if this hit destroyed the obstacle.
    ///
    /// Cones and roadblocks go down in one hit regardless of damage.
    pub fn take_hit(&mut self, damage: u8) -> bool {
        if self.destroyed {
            return false;
        }
        match self.health.as_mut() {
            Some(hp) => {
                *hp = hp.saturating_sub(damage);
                if *hp == 0 {
                    self.destroyed = true;
                }
            }
            None => self.destroyed = true,
        }
        self.destroyed
    }
}

impl Actor for Obstacle {
    fn depth(&self) -> f32 {
        self.depth
    }

    fn bounding_rect(&self, projection: &Projection) -> Rect {
        let y = projection.y_from_depth(self.depth);
        let scale = ScaleRange::OBSTACLE.at(self.depth);
        let (x, size) = match self.kind {
            ObstacleKind::Car => (
                projection.lane_center_at_row(self.lane, y),
                Vec2::from(CAR_FOOTPRINT) * scale,
            ),
            ObstacleKind::Cone => (
                projection.lane_center_at_row(self.lane, y),
                Vec2::from(CONE_FOOTPRINT) * scale,
            ),
            ObstacleKind::Roadblock => {
                let width = projection.lane_width_at_row(y) * 2.0 * ROADBLOCK_WIDTH_FILL;
                (
                    projection.lane_pair_center_at_row(self.lane, y),
                    Vec2::new(width, ROADBLOCK_HEIGHT) * scale,
                )
            }
        };
        Rect::from_center(Vec2::new(x, y - size.y * OBSTACLE_LIFT), size)
    }

    fn is_expired(&self) -> bool {
        self.destroyed || self.depth > DESPAWN_DEPTH
    }
}

/// Bullet variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletKind {
    Standard,
    /// Fired while empowered; destroys anything in one hit
    Empowered,
}

/// A shot travelling away from the player toward the horizon
#[derive(Debug, Clone)]
pub struct Bullet {
    pub kind: BulletKind,
    pub lane: usize,
    pub depth: f32,
    /// Consumed on its first hit
    pub spent: bool,
}

impl Bullet {
    pub fn new(kind: BulletKind, lane: usize, depth: f32) -> Self {
        Self {
            kind,
            lane,
            depth,
            spent: false,
        }
    }

    /// Damage dealt to a car
    pub fn damage(&self, car_health: u8) -> u8 {
        match self.kind {
            BulletKind::Standard => 1,
            BulletKind::Empowered => car_health.max(1),
        }
    }

    /// Move toward the horizon by its own speed
    pub fn advance(&mut self, bullet_speed: f32) {
        self.depth -= bullet_speed.abs();
    }
}

impl Actor for Bullet {
    fn depth(&self) -> f32 {
        self.depth
    }

    fn bounding_rect(&self, projection: &Projection) -> Rect {
        let y = projection.y_from_depth(self.depth);
        let x = projection.lane_center_at_row(self.lane, y);
        let base = match self.kind {
            BulletKind::Standard => BULLET_FOOTPRINT,
            BulletKind::Empowered => EMPOWERED_BULLET_FOOTPRINT,
        };
        let size = Vec2::from(base) * ScaleRange::OBSTACLE.at(self.depth);
        Rect::from_center(Vec2::new(x, y - size.y * OBSTACLE_LIFT), size)
    }

    fn is_expired(&self) -> bool {
        self.spent || self.depth < BULLET_HORIZON_DEPTH
    }
}

/// A fixed-position explosion animation
#[derive(Debug, Clone)]
pub struct Explosion {
    /// Screen x of the blast center
    pub center_x: f32,
    /// Depth at creation; never changes
    pub depth: f32,
    /// Current animation frame
    pub frame: u32,
    ticks_in_frame: u32,
}

impl Explosion {
    pub fn new(center_x: f32, depth: f32) -> Self {
        Self {
            center_x,
            depth,
            frame: 0,
            ticks_in_frame: 0,
        }
    }

    /// Step the animation by one tick
    pub fn update(&mut self) {
        self.ticks_in_frame += 1;
        if self.ticks_in_frame >= EXPLOSION_TICKS_PER_FRAME {
            self.ticks_in_frame = 0;
            self.frame += 1;
        }
    }
}

impl Actor for Explosion {
    fn depth(&self) -> f32 {
        self.depth
    }

    fn bounding_rect(&self, projection: &Projection) -> Rect {
        let y = projection.y_from_depth(self.depth);
        let size = Vec2::from(EXPLOSION_FOOTPRINT) * ScaleRange::EXPLOSION.at(self.depth);
        Rect::from_center(Vec2::new(self.center_x, y), size)
    }

    fn is_expired(&self) -> bool {
        self.frame >= EXPLOSION_FRAMES
    }
}
