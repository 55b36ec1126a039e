//! Race session state
//!
//! `RaceState` exclusively owns every actor collection. Collaborators read it
//! and drain its event queue; only `tick` mutates it.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::actor::{Bullet, Explosion, Obstacle, ObstacleKind, Player};
use super::projection::{Projection, RoadGeometry};
use crate::tuning::Tuning;

/// Top-level mode of the race state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceMode {
    /// Title screen, nothing moves
    Menu,
    /// 3-2-1-GO staging, input ignored
    Countdown,
    /// Active gameplay
    Racing,
    /// Racing suspended
    Paused,
    /// Run ended in a collision
    Crashed,
}

impl RaceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RaceMode::Menu => "menu",
            RaceMode::Countdown => "countdown",
            RaceMode::Racing => "racing",
            RaceMode::Paused => "paused",
            RaceMode::Crashed => "crashed",
        }
    }
}

/// What destroyed an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyCause {
    Bullet,
    /// Rammed while empowered
    Contact,
}

/// Outward signals for rendering, audio and persistence collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ModeChanged { from: RaceMode, to: RaceMode },
    /// A countdown beat started; `remaining` is 0 for "GO"
    CountdownBeat { remaining: u8 },
    Spawned { count: usize },
    ShotFired,
    ReloadStarted,
    ReloadFinished,
    /// A car absorbed a bullet
    ObstacleHit { id: u32, health: u8 },
    ObstacleDestroyed { id: u32, kind: ObstacleKind, cause: DestroyCause },
    NearMiss { id: u32 },
    EmpoweredStarted,
    EmpoweredEnded,
    /// Emitted exactly once per crash
    Crashed { score: u64, distance: f32 },
}

/// Magazine and reload state
#[derive(Debug, Clone)]
pub struct Weapon {
    pub ammo: u32,
    pub magazine_size: u32,
    /// Ticks left on the current reload (0 = not reloading)
    pub reload_ticks: u32,
    /// Ticks until the next shot is allowed
    pub cooldown_ticks: u32,
}

impl Weapon {
    pub fn new(magazine_size: u32) -> Self {
        Self {
            ammo: magazine_size,
            magazine_size,
            reload_ticks: 0,
            cooldown_ticks: 0,
        }
    }

    pub fn is_reloading(&self) -> bool {
        self.reload_ticks > 0
    }

    pub fn can_fire(&self) -> bool {
        !self.is_reloading() && self.cooldown_ticks == 0 && self.ammo > 0
    }
}

/// Complete race session state
#[derive(Debug, Clone)]
pub struct RaceState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub tuning: Tuning,
    pub projection: Projection,

    pub mode: RaceMode,
    pub score: u64,
    /// Score at the last crash
    pub last_score: u64,
    /// Distance travelled this run (display units)
    pub distance: f32,
    /// Current forward velocity (depth per tick)
    pub speed: f32,
    /// Ramping base speed that boost/brake modulate
    pub base_speed: f32,
    /// Ticks spent racing this run
    pub race_ticks: u64,
    /// Ticks left in the countdown
    pub countdown_ticks: u32,

    pub player: Player,
    pub weapon: Weapon,
    /// Ticks left in empowered mode (0 = not empowered)
    pub empowered_ticks: u32,

    /// Live actors (sorted by id for determinism)
    pub obstacles: Vec<Obstacle>,
    pub bullets: Vec<Bullet>,
    pub explosions: Vec<Explosion>,

    /// Distance accumulated toward the next spawn attempt
    pub spawn_progress: f32,
    /// Randomized distance threshold for the next spawn attempt
    pub next_spawn_gap: f32,

    /// Road scroll phase in [0, 1) for the renderer
    pub scroll_phase: f32,

    /// Host should exit
    pub quit_requested: bool,

    events: Vec<GameEvent>,
    next_id: u32,
}

impl RaceState {
    /// New session in the menu, default road geometry
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self::with_geometry(seed, tuning, RoadGeometry::default())
    }

    pub fn with_geometry(seed: u64, tuning: Tuning, geometry: RoadGeometry) -> Self {
        let tuning = tuning.sanitized();
        let projection = Projection::new(geometry, tuning.lane_count);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player::new(tuning.lane_count, tuning.lane_change_step),
            weapon: Weapon::new(tuning.magazine_size),
            projection,
            mode: RaceMode::Menu,
            score: 0,
            last_score: 0,
            distance: 0.0,
            speed: tuning.base_speed,
            base_speed: tuning.base_speed,
            race_ticks: 0,
            countdown_ticks: 0,
            empowered_ticks: 0,
            obstacles: Vec::new(),
            bullets: Vec::new(),
            explosions: Vec::new(),
            spawn_progress: 0.0,
            next_spawn_gap: 0.0,
            scroll_phase: 0.0,
            quit_requested: false,
            events: Vec::new(),
            next_id: 1,
            tuning,
        };
        state.next_spawn_gap = state.roll_spawn_gap();
        state
    }

    /// Discard every actor and reset run fields. Mode, seed stream and
    /// `last_score` are left alone.
    pub fn reset_run(&mut self) {
        self.player = Player::new(self.tuning.lane_count, self.tuning.lane_change_step);
        self.weapon = Weapon::new(self.tuning.magazine_size);
        self.score = 0;
        self.distance = 0.0;
        self.base_speed = self.tuning.base_speed;
        self.speed = self.base_speed;
        self.race_ticks = 0;
        self.countdown_ticks = 0;
        self.empowered_ticks = 0;
        self.obstacles.clear();
        self.bullets.clear();
        self.explosions.clear();
        self.spawn_progress = 0.0;
        self.next_spawn_gap = self.roll_spawn_gap();
        self.scroll_phase = 0.0;
        self.next_id = 1;
    }

    /// Switch modes, recording the transition
    pub fn set_mode(&mut self, mode: RaceMode) {
        if self.mode == mode {
            return;
        }
        log::info!("Race mode: {} -> {}", self.mode.as_str(), mode.as_str());
        self.events.push(GameEvent::ModeChanged {
            from: self.mode,
            to: mode,
        });
        self.mode = mode;
    }

    pub fn is_empowered(&self) -> bool {
        self.empowered_ticks > 0
    }

    /// Label for the current countdown beat ("3", "2", "1", "GO")
    pub fn countdown_label(&self) -> Option<String> {
        if self.mode != RaceMode::Countdown {
            return None;
        }
        let beat = self.countdown_ticks.div_ceil(self.tuning.countdown_beat_ticks);
        Some(match beat.saturating_sub(1) {
            0 => "GO".to_string(),
            n => n.to_string(),
        })
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub(crate) fn roll_spawn_gap(&mut self) -> f32 {
        let (lo, hi) = (self.tuning.spawn_gap_min, self.tuning.spawn_gap_max);
        if hi > lo {
            self.rng.random_range(lo..=hi)
        } else {
            lo
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events queued since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take every queued event
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Spawn an obstacle at the given lane and depth
    pub fn spawn_obstacle(&mut self, kind: ObstacleKind, lane: usize, depth: f32) -> u32 {
        let id = self.next_entity_id();
        let lane = lane.min(self.tuning.lane_count.saturating_sub(kind.lane_span()));
        self.obstacles
            .push(Obstacle::new(id, kind, lane, depth, self.tuning.car_health));
        id
    }

    /// Ensure actors are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.obstacles.sort_by_key(|o| o.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_starts_in_menu() {
        let state = RaceState::new(1, Tuning::default());
        assert_eq!(state.mode, RaceMode::Menu);
        assert_eq!(state.player.lane, 1);
        assert_eq!(state.weapon.ammo, state.tuning.magazine_size);
        assert!(state.next_spawn_gap >= state.tuning.spawn_gap_min);
        assert!(state.next_spawn_gap <= state.tuning.spawn_gap_max);
    }

    #[test]
    fn test_reset_run_clears_actors() {
        let mut state = RaceState::new(1, Tuning::default());
        state.spawn_obstacle(ObstacleKind::Car, 0, 0.5);
        state.bullets.push(Bullet::new(crate::sim::actor::BulletKind::Standard, 1, 0.5));
        state.explosions.push(Explosion::new(10.0, 0.5));
        state.score = 999;
        state.last_score = 500;
        state.reset_run();
        assert!(state.obstacles.is_empty());
        assert!(state.bullets.is_empty());
        assert!(state.explosions.is_empty());
        assert_eq!(state.score, 0);
        assert_eq!(state.last_score, 500);
    }

    #[test]
    fn test_set_mode_records_transition_once() {
        let mut state = RaceState::new(1, Tuning::default());
        state.set_mode(RaceMode::Racing);
        state.set_mode(RaceMode::Racing);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::ModeChanged {
                from: RaceMode::Menu,
                to: RaceMode::Racing
            }]
        );
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_roadblock_lane_clamped_onto_road() {
        let mut state = RaceState::new(1, Tuning::default());
        state.spawn_obstacle(ObstacleKind::Roadblock, 2, 0.1);
        assert_eq!(state.obstacles[0].lane, 1);
    }

    #[test]
    fn test_spawn_obstacle_total_on_unsanitized_lane_count() {
        let mut state = RaceState::new(1, Tuning::default());
        state.tuning.lane_count = 1;
        state.spawn_obstacle(ObstacleKind::Roadblock, 3, 0.1);
        state.tuning.lane_count = 0;
        state.spawn_obstacle(ObstacleKind::Car, 2, 0.1);
        assert_eq!(state.obstacles[0].lane, 0);
        assert_eq!(state.obstacles[1].lane, 0);
    }

    #[test]
    fn test_countdown_labels() {
        let mut state = RaceState::new(1, Tuning::default());
        assert_eq!(state.countdown_label(), None);
        state.mode = RaceMode::Countdown;
        state.countdown_ticks = state.tuning.countdown_ticks();
        assert_eq!(state.countdown_label().as_deref(), Some("3"));
        state.countdown_ticks = 61;
        assert_eq!(state.countdown_label().as_deref(), Some("1"));
        state.countdown_ticks = 60;
        assert_eq!(state.countdown_label().as_deref(), Some("GO"));
    }
}
