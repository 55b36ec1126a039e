//! Collision detection between projected hitboxes
//!
//! Contact is pass/fail on screen rectangles; there is no collision response.

use glam::Vec2;

use super::actor::{Actor, Obstacle, ObstacleKind};
use super::projection::Projection;
use super::rect::Rect;
use crate::tuning::Tuning;

/// Result of a contact check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a contact occurred
    pub hit: bool,
    /// Center of the overlapping region (screen space)
    pub point: Vec2,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
        }
    }

    fn at(point: Vec2) -> Self {
        Self { hit: true, point }
    }
}

/// Whether an obstacle has visually reached the player's row
pub fn in_collidable_band(obstacle: &Obstacle, tuning: &Tuning) -> bool {
    obstacle.depth > tuning.collide_depth_min && obstacle.depth < tuning.collide_depth_max
}

/// Forgiving hitbox: the bounding rect shrunk by the configured inset
pub fn obstacle_hitbox(obstacle: &Obstacle, projection: &Projection, tuning: &Tuning) -> Rect {
    obstacle
        .bounding_rect(projection)
        .inset(tuning.hitbox_inset, tuning.hitbox_inset)
}

/// Test the player's rect against an obstacle
///
/// Only obstacles inside the collidable band can hit; the obstacle's rect is
/// inset so visually-adjacent boxes don't register.
pub fn player_obstacle_collision(
    player_rect: &Rect,
    obstacle: &Obstacle,
    projection: &Projection,
    tuning: &Tuning,
) -> CollisionResult {
    if obstacle.destroyed || !in_collidable_band(obstacle, tuning) {
        return CollisionResult::miss();
    }
    let hitbox = obstacle_hitbox(obstacle, projection, tuning);
    match player_rect.intersection(&hitbox) {
        Some(overlap) => CollisionResult::at(overlap.center()),
        None => CollisionResult::miss(),
    }
}

/// Near miss: a car or cone alongside the player, close but not touching
pub fn is_near_miss(
    player_rect: &Rect,
    obstacle: &Obstacle,
    projection: &Projection,
    tuning: &Tuning,
) -> bool {
    if obstacle.destroyed
        || obstacle.near_miss_scored
        || obstacle.kind == ObstacleKind::Roadblock
        || obstacle.depth <= tuning.near_miss_depth
        || obstacle.depth >= tuning.collide_depth_max
    {
        return false;
    }
    let rect = obstacle.bounding_rect(projection);
    if player_rect.intersects(&rect) {
        return false;
    }
    let threshold = tuning
        .near_miss_min_gap
        .max(player_rect.w * tuning.near_miss_gap_fraction);
    player_rect.horizontal_gap(&rect) < threshold
}

/// Bullet against obstacle: plain rectangle overlap
pub fn bullet_obstacle_collision(bullet_rect: &Rect, obstacle_rect: &Rect) -> CollisionResult {
    match bullet_rect.intersection(obstacle_rect) {
        Some(overlap) => CollisionResult::at(overlap.center()),
        None => CollisionResult::miss(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::actor::Player;

    fn setup() -> (Projection, Tuning, Rect) {
        let projection = Projection::default();
        let tuning = Tuning::default();
        let player = Player::new(3, tuning.lane_change_step);
        let rect = player.bounding_rect(&projection);
        (projection, tuning, rect)
    }

    #[test]
    fn test_same_lane_car_in_band_hits() {
        let (projection, tuning, player_rect) = setup();
        let car = Obstacle::new(1, ObstacleKind::Car, 1, 0.90, 5);
        let result = player_obstacle_collision(&player_rect, &car, &projection, &tuning);
        assert!(result.hit);
        assert!(player_rect.center().distance(result.point) < player_rect.h);
    }

    #[test]
    fn test_outside_band_never_hits() {
        let (projection, tuning, player_rect) = setup();
        let early = Obstacle::new(1, ObstacleKind::Car, 1, 0.80, 5);
        let passed = Obstacle::new(2, ObstacleKind::Car, 1, 1.05, 5);
        assert!(!player_obstacle_collision(&player_rect, &early, &projection, &tuning).hit);
        assert!(!player_obstacle_collision(&player_rect, &passed, &projection, &tuning).hit);
    }

    #[test]
    fn test_other_lane_misses() {
        let (projection, tuning, player_rect) = setup();
        let car = Obstacle::new(1, ObstacleKind::Car, 0, 0.90, 5);
        assert!(!player_obstacle_collision(&player_rect, &car, &projection, &tuning).hit);
    }

    #[test]
    fn test_roadblock_over_player_lane_hits() {
        let (projection, tuning, player_rect) = setup();
        let block = Obstacle::new(1, ObstacleKind::Roadblock, 0, 0.90, 5);
        assert!(player_obstacle_collision(&player_rect, &block, &projection, &tuning).hit);
    }

    #[test]
    fn test_near_miss_requires_small_gap() {
        let (projection, tuning, player_rect) = setup();
        let wide = Tuning {
            near_miss_min_gap: 1000.0,
            ..tuning.clone()
        };
        let beside = Obstacle::new(1, ObstacleKind::Car, 0, 0.95, 5);
        assert!(!player_rect.intersects(&beside.bounding_rect(&projection)));
        assert!(is_near_miss(&player_rect, &beside, &projection, &wide));

        let narrow = Tuning {
            near_miss_min_gap: 0.0,
            near_miss_gap_fraction: 0.0,
            ..tuning
        };
        assert!(!is_near_miss(&player_rect, &beside, &projection, &narrow));
    }

    #[test]
    fn test_settled_player_never_near_misses_next_lane() {
        // Lane centers are far apart at the player's row; the bonus needs a
        // lane change that squeezes past the obstacle
        let (projection, tuning, player_rect) = setup();
        for lane in [0, 2] {
            for depth in [0.94, 0.97, 0.99] {
                let car = Obstacle::new(1, ObstacleKind::Car, lane, depth, 5);
                assert!(player_rect.horizontal_gap(&car.bounding_rect(&projection)) > 100.0);
                assert!(!is_near_miss(&player_rect, &car, &projection, &tuning));
            }
        }
    }

    #[test]
    fn test_lane_change_squeeze_is_near_miss() {
        let projection = Projection::default();
        let tuning = Tuning::default();
        let mut player = Player::new(3, tuning.lane_change_step);
        player.target_lane = 2;
        player.lane_blend = 0.62;
        let player_rect = player.bounding_rect(&projection);
        let car = Obstacle::new(1, ObstacleKind::Car, 2, 0.943, 5);
        assert!(is_near_miss(&player_rect, &car, &projection, &tuning));
    }

    #[test]
    fn test_near_miss_scores_once() {
        let (projection, tuning, player_rect) = setup();
        let wide = Tuning {
            near_miss_min_gap: 1000.0,
            ..tuning
        };
        let mut cone = Obstacle::new(1, ObstacleKind::Cone, 0, 0.95, 5);
        assert!(is_near_miss(&player_rect, &cone, &projection, &wide));
        cone.near_miss_scored = true;
        assert!(!is_near_miss(&player_rect, &cone, &projection, &wide));
    }

    #[test]
    fn test_bullet_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(bullet_obstacle_collision(&a, &Rect::new(5.0, 5.0, 10.0, 10.0)).hit);
        assert!(!bullet_obstacle_collision(&a, &Rect::new(50.0, 5.0, 10.0, 10.0)).hit);
    }
}
