//! Fairness-constrained obstacle spawner
//!
//! Decides what (if anything) appears near the horizon on a spawn attempt.
//! The load-bearing property: at no tick may obstacles in the danger band
//! `[danger_z, DESPAWN_DEPTH]` cover every lane.
//!
//! All obstacles advance by the same speed, so their relative depths are
//! frozen at spawn time. Any group of obstacles that will one day share the
//! danger band therefore lies within `DESPAWN_DEPTH - danger_z` of each other
//! right now. Checking the candidate against that "shadow" window is enough to
//! keep an escape lane open for the rest of every obstacle's life.

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use super::actor::{Obstacle, ObstacleKind};
use crate::consts::DESPAWN_DEPTH;

const SHADOW_PAD: f32 = 1e-3;

/// Which spawn algorithm to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpawnPolicy {
    /// Two-tier spacing plus fairness ceiling
    #[default]
    Fair,
    /// Single occupancy test around the spawn depth, no ceiling.
    /// Gives NO guarantee that a lane stays open.
    Simple,
}

/// Spacing, fairness and mix parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnRules {
    pub policy: SpawnPolicy,
    /// Obstacles at or past this depth are "about to reach the player"
    pub danger_z: f32,
    /// Minimum depth gap to an obstacle in the same lane
    pub min_same_lane_gap_z: f32,
    /// Minimum depth gap to an obstacle in a neighboring lane
    pub min_adj_lane_gap_z: f32,
    /// Occupancy radius used by the simple policy
    pub simple_occupancy_z: f32,
    pub two_obstacle_chance: f64,
    pub cone_chance: f64,
    pub roadblock_chance: f64,
}

impl Default for SpawnRules {
    fn default() -> Self {
        Self {
            policy: SpawnPolicy::Fair,
            danger_z: 0.65,
            min_same_lane_gap_z: 0.48,
            min_adj_lane_gap_z: 0.30,
            simple_occupancy_z: 0.15,
            two_obstacle_chance: 0.22,
            cone_chance: 0.15,
            roadblock_chance: 0.10,
        }
    }
}

impl SpawnRules {
    /// Depth span of the danger band
    pub fn danger_band_len(&self) -> f32 {
        (DESPAWN_DEPTH - self.danger_z).max(0.0)
    }

    /// Shadow window radius; padded so float drift in per-tick motion cannot open a hole
    fn shadow_radius(&self) -> f32 {
        self.danger_band_len() + SHADOW_PAD
    }
}

/// One obstacle to create at the spawn depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnSlot {
    /// Leftmost lane
    pub lane: usize,
    pub kind: ObstacleKind,
}

/// Pick the obstacles to spawn at depth `z0`. An empty result is a normal outcome.
pub fn choose_spawn_pattern<R: Rng + ?Sized>(
    obstacles: &[Obstacle],
    z0: f32,
    lane_count: usize,
    rules: &SpawnRules,
    rng: &mut R,
) -> Vec<SpawnSlot> {
    match rules.policy {
        SpawnPolicy::Fair => fair_pattern(obstacles, z0, lane_count, rules, rng),
        SpawnPolicy::Simple => simple_pattern(obstacles, z0, lane_count, rules, rng),
    }
}

/// Lanes occupied by obstacles at or past the danger depth
pub fn danger_lanes(obstacles: &[Obstacle], danger_z: f32) -> BTreeSet<usize> {
    obstacles
        .iter()
        .filter(|o| !o.destroyed && o.depth >= danger_z)
        .flat_map(|o| o.lanes())
        .collect()
}

/// Lanes of obstacles that could share the danger band with something spawned at `z0`
fn shadow_lanes(obstacles: &[Obstacle], z0: f32, band_len: f32) -> BTreeSet<usize> {
    obstacles
        .iter()
        .filter(|o| !o.destroyed && (o.depth - z0).abs() <= band_len)
        .flat_map(|o| o.lanes())
        .collect()
}

/// Two-tier spacing predicate: strict in the same lane, looser next door
pub fn lane_has_space(obstacles: &[Obstacle], lane: usize, z0: f32, rules: &SpawnRules) -> bool {
    obstacles.iter().filter(|o| !o.destroyed).all(|o| {
        let dz = (o.depth - z0).abs();
        o.lanes().all(|occ| {
            if occ == lane {
                dz >= rules.min_same_lane_gap_z
            } else if occ.abs_diff(lane) == 1 {
                dz >= rules.min_adj_lane_gap_z
            } else {
                true
            }
        })
    })
}

fn fair_pattern<R: Rng + ?Sized>(
    obstacles: &[Obstacle],
    z0: f32,
    lane_count: usize,
    rules: &SpawnRules,
    rng: &mut R,
) -> Vec<SpawnSlot> {
    let max_blocked = lane_count.saturating_sub(1);

    let danger = danger_lanes(obstacles, rules.danger_z);
    let mut blocked = shadow_lanes(obstacles, z0, rules.shadow_radius());
    blocked.extend(danger.iter().copied());

    let fits = |extra: &[usize]| {
        let mut union = blocked.clone();
        union.extend(extra.iter().copied());
        union.len() <= max_blocked
    };

    let free: Vec<usize> = (0..lane_count)
        .filter(|&l| !danger.contains(&l) && lane_has_space(obstacles, l, z0, rules))
        .filter(|&l| fits(&[l]))
        .collect();
    if free.is_empty() {
        return Vec::new();
    }

    let block_budget = max_blocked.saturating_sub(danger.len());

    if block_budget >= 2 {
        let candidates: Vec<usize> = (0..lane_count.saturating_sub(1))
            .filter(|&l| free.contains(&l) && free.contains(&(l + 1)))
            .filter(|&l| fits(&[l, l + 1]))
            .collect();
        if let Some(&lane) = candidates.choose(rng) {
            if rng.random_bool(rules.roadblock_chance.clamp(0.0, 1.0)) {
                return vec![SpawnSlot {
                    lane,
                    kind: ObstacleKind::Roadblock,
                }];
            }
        }
    }

    let mut lanes = free;
    lanes.shuffle(rng);

    let mut count = 1;
    if block_budget >= 1
        && lanes.len() >= 2
        && rng.random_bool(rules.two_obstacle_chance.clamp(0.0, 1.0))
        && fits(&lanes[..2])
    {
        count = 2;
    }

    lanes
        .into_iter()
        .take(count)
        .map(|lane| SpawnSlot {
            lane,
            kind: pick_kind(rules, rng),
        })
        .collect()
}

fn simple_pattern<R: Rng + ?Sized>(
    obstacles: &[Obstacle],
    z0: f32,
    lane_count: usize,
    rules: &SpawnRules,
    rng: &mut R,
) -> Vec<SpawnSlot> {
    let occupied: BTreeSet<usize> = obstacles
        .iter()
        .filter(|o| !o.destroyed && (o.depth - z0).abs() < rules.simple_occupancy_z)
        .flat_map(|o| o.lanes())
        .collect();
    let available: Vec<usize> = (0..lane_count).filter(|l| !occupied.contains(l)).collect();
    if available.is_empty() {
        return Vec::new();
    }

    if available.len() >= 2 && rng.random_bool(rules.roadblock_chance.clamp(0.0, 1.0)) {
        if let Some(&lane) = available[..available.len() - 1].choose(rng) {
            if available.contains(&(lane + 1)) {
                return vec![SpawnSlot {
                    lane,
                    kind: ObstacleKind::Roadblock,
                }];
            }
        }
    }

    let count = if available.len() > 1 && rng.random_bool(rules.two_obstacle_chance.clamp(0.0, 1.0)) {
        2
    } else {
        1
    };
    let chosen: Vec<usize> = available.choose_multiple(rng, count).copied().collect();
    chosen
        .into_iter()
        .map(|lane| SpawnSlot {
            lane,
            kind: pick_kind(rules, rng),
        })
        .collect()
}

fn pick_kind<R: Rng + ?Sized>(rules: &SpawnRules, rng: &mut R) -> ObstacleKind {
    if rng.random_bool(rules.cone_chance.clamp(0.0, 1.0)) {
        ObstacleKind::Cone
    } else {
        ObstacleKind::Car
    }
}
