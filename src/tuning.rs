//! Data-driven game balance
//!
//! Every gameplay number the race loop consults lives in [`Tuning`]. Partial
//! JSON files are accepted; missing fields fall back to the defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sim::spawner::SpawnRules;

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Build the tuning table for this preset
    pub fn tuning(&self) -> Tuning {
        let mut tuning = Tuning::default();
        match self {
            Difficulty::Easy => {
                tuning.base_speed = 0.0022;
                tuning.speed_ramp_per_sec = 0.0001;
                tuning.spawn_gap_min = 0.24;
                tuning.spawn_gap_max = 0.40;
                tuning.spawn.two_obstacle_chance = 0.10;
                tuning.spawn.roadblock_chance = 0.05;
                tuning.magazine_size = 8;
            }
            Difficulty::Normal => {}
            Difficulty::Hard => {
                tuning.base_speed = 0.0036;
                tuning.speed_ramp_per_sec = 0.0003;
                tuning.spawn_gap_min = 0.14;
                tuning.spawn_gap_max = 0.26;
                tuning.spawn.two_obstacle_chance = 0.30;
                tuning.spawn.roadblock_chance = 0.15;
                tuning.car_health = 6;
                tuning.magazine_size = 5;
            }
        }
        tuning
    }
}

/// Gameplay balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Number of lanes on the road
    pub lane_count: usize,

    // === Speed ===
    /// Starting base speed (depth units per tick)
    pub base_speed: f32,
    /// Base speed gained per elapsed second of racing
    pub speed_ramp_per_sec: f32,
    /// Target speed multiplier while boosting
    pub boost_factor: f32,
    /// Target speed multiplier while braking
    pub brake_factor: f32,
    /// Exponential smoothing factor toward the target speed (per tick)
    pub speed_smoothing: f32,

    // === Score ===
    /// Score per tick is `1 + floor(speed * score_speed_factor)`
    pub score_speed_factor: f32,

    // === Spawning ===
    /// Distance travelled between spawn attempts is uniform in [min, max]
    pub spawn_gap_min: f32,
    pub spawn_gap_max: f32,
    /// Fairness and spacing rules
    pub spawn: SpawnRules,

    // === Player ===
    /// Lane blend gained per tick while changing lanes
    pub lane_change_step: f32,

    // === Collision ===
    /// Obstacles collide with the player only while inside (min, max) depth
    pub collide_depth_min: f32,
    pub collide_depth_max: f32,
    /// Total shrink applied to obstacle hitboxes on each axis
    pub hitbox_inset: f32,

    // === Near miss ===
    pub near_miss_depth: f32,
    pub near_miss_bonus: u64,
    /// Minimum horizontal gap threshold, in screen units
    pub near_miss_min_gap: f32,
    /// Gap threshold as a fraction of the player's width
    pub near_miss_gap_fraction: f32,
    pub near_miss_immunity_ticks: u32,

    // === Weapons ===
    pub magazine_size: u32,
    pub reload_ticks: u32,
    pub fire_cooldown_ticks: u32,
    /// Depth travelled per tick by a bullet, toward the horizon
    pub bullet_speed: f32,
    pub car_health: u8,
    pub car_destroy_score: u64,
    pub light_destroy_score: u64,

    // === Empowered mode ===
    /// Empowered mode is granted each time the score crosses a multiple of this
    pub empower_score_step: u64,
    pub empower_ticks: u32,
    /// Points for ramming an obstacle while empowered
    pub contact_score: u64,

    // === Countdown ===
    /// Number of beats ("3", "2", "1", "GO")
    pub countdown_beats: u8,
    pub countdown_beat_ticks: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            lane_count: 3,

            base_speed: 0.003,
            speed_ramp_per_sec: 0.0002,
            boost_factor: 1.5,
            brake_factor: 0.7,
            speed_smoothing: 0.1,

            score_speed_factor: 1000.0,

            spawn_gap_min: 0.18,
            spawn_gap_max: 0.32,
            spawn: SpawnRules::default(),

            lane_change_step: 0.22,

            collide_depth_min: 0.85,
            collide_depth_max: 1.0,
            hitbox_inset: 15.0,

            near_miss_depth: 0.93,
            near_miss_bonus: 150,
            near_miss_min_gap: 18.0,
            near_miss_gap_fraction: 0.22,
            near_miss_immunity_ticks: 8,

            magazine_size: 6,
            reload_ticks: 90,
            fire_cooldown_ticks: 10,
            bullet_speed: 0.025,
            car_health: 5,
            car_destroy_score: 500,
            light_destroy_score: 100,

            empower_score_step: 20_000,
            empower_ticks: 300,
            contact_score: 250,

            countdown_beats: 4,
            countdown_beat_ticks: 60,
        }
    }
}

impl Tuning {
    /// Clamp values that would break the simulation's invariants
    pub fn sanitized(mut self) -> Self {
        self.lane_count = self.lane_count.max(2);
        self.spawn_gap_min = self.spawn_gap_min.max(0.01);
        self.spawn_gap_max = self.spawn_gap_max.max(self.spawn_gap_min);
        self.lane_change_step = self.lane_change_step.clamp(0.01, 1.0);
        self.speed_smoothing = self.speed_smoothing.clamp(0.0, 1.0);
        self.magazine_size = self.magazine_size.max(1);
        self.reload_ticks = self.reload_ticks.max(1);
        self.car_health = self.car_health.max(1);
        self.empower_score_step = self.empower_score_step.max(1);
        self.countdown_beats = self.countdown_beats.max(1);
        self.countdown_beat_ticks = self.countdown_beat_ticks.max(1);
        self
    }

    /// Total countdown length in ticks
    pub fn countdown_ticks(&self) -> u32 {
        self.countdown_beats as u32 * self.countdown_beat_ticks
    }

    /// Overlay a partial JSON document onto this table. Nested objects merge
    /// field by field; anything not mentioned keeps its current value.
    pub fn with_overrides(self, overrides: &Value) -> Result<Self, serde_json::Error> {
        let mut merged = serde_json::to_value(&self)?;
        merge_json(&mut merged, overrides);
        serde_json::from_value(merged)
    }
}

fn merge_json(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                merge_json(base.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (base, patch) => *base = patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_round_trips_through_name() {
        for d in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
        }
        assert_eq!(Difficulty::from_str("nightmare"), None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning: Tuning = serde_json::from_str(r#"{ "lane_count": 4 }"#).unwrap();
        assert_eq!(tuning.lane_count, 4);
        assert_eq!(tuning.car_health, Tuning::default().car_health);
        assert_eq!(tuning.spawn, SpawnRules::default());
    }

    #[test]
    fn test_sanitized_keeps_an_escape_lane_possible() {
        let tuning = Tuning {
            lane_count: 1,
            spawn_gap_max: 0.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(tuning.lane_count, 2);
        assert!(tuning.spawn_gap_max >= tuning.spawn_gap_min);
    }

    #[test]
    fn test_overrides_merge_over_preset() {
        use crate::sim::spawner::SpawnPolicy;

        let hard = Difficulty::Hard.tuning();
        let overrides = serde_json::json!({
            "spawn": { "policy": "Simple" },
            "magazine_size": 9
        });
        let tuning = hard.clone().with_overrides(&overrides).unwrap();
        assert_eq!(tuning.spawn.policy, SpawnPolicy::Simple);
        assert_eq!(tuning.magazine_size, 9);
        // Untouched fields keep the preset's values, nested ones included
        assert_eq!(tuning.base_speed, hard.base_speed);
        assert_eq!(tuning.spawn.roadblock_chance, hard.spawn.roadblock_chance);
    }

    #[test]
    fn test_bad_override_is_an_error() {
        let overrides = serde_json::json!({ "lane_count": "three" });
        assert!(Tuning::default().with_overrides(&overrides).is_err());
    }

    #[test]
    fn test_hard_is_faster_than_easy() {
        assert!(Difficulty::Hard.tuning().base_speed > Difficulty::Easy.tuning().base_speed);
        assert_eq!(Difficulty::Normal.tuning(), Tuning::default());
    }
}
