//! Fixed timestep simulation tick
//!
//! Core race loop that advances the session deterministically. Within a
//! racing tick the order is fixed: player movement, speed/score, weapon,
//! spawner, actor motion, collision tests, pruning.

use glam::Vec2;

use super::actor::{Actor, Bullet, BulletKind, Explosion, ObstacleKind};
use super::collision::{bullet_obstacle_collision, is_near_miss, player_obstacle_collision};
use super::spawner::choose_spawn_pattern;
use super::state::{DestroyCause, GameEvent, RaceMode, RaceState};
use crate::consts::*;
use crate::lerp;
use rand::Rng;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Leave the menu and start the countdown
    pub start: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub fire: bool,
    /// Pause toggle
    pub pause: bool,
    /// Restart from pause or crash
    pub restart: bool,
    /// Back to the menu from pause or crash
    pub menu: bool,
    pub quit: bool,
    /// Held: target speed is boosted
    pub boost: bool,
    /// Held: target speed is reduced
    pub brake: bool,
    /// Built-in driver steers and shoots
    pub autopilot: bool,
}

/// Advance the race state by one fixed timestep
pub fn tick(state: &mut RaceState, input: &TickInput, dt: f32) {
    if input.quit {
        log::info!("Quit requested");
        state.quit_requested = true;
        return;
    }

    match state.mode {
        RaceMode::Menu => {
            if input.start {
                start_countdown(state);
            }
        }

        RaceMode::Countdown => step_countdown(state),

        RaceMode::Racing => {
            if input.pause {
                state.set_mode(RaceMode::Paused);
                return;
            }
            step_race(state, input, dt);
        }

        RaceMode::Paused => {
            if input.pause {
                state.set_mode(RaceMode::Racing);
            } else if input.restart {
                restart(state);
            } else if input.menu {
                back_to_menu(state);
            }
        }

        RaceMode::Crashed => {
            if input.restart {
                restart(state);
            } else if input.menu {
                back_to_menu(state);
            } else {
                // Let the crash explosion finish
                for explosion in &mut state.explosions {
                    explosion.update();
                }
                state.explosions.retain(|e| !e.is_expired());
            }
        }
    }

    // Ensure deterministic ordering
    state.normalize_order();
}

fn start_countdown(state: &mut RaceState) {
    state.reset_run();
    state.countdown_ticks = state.tuning.countdown_ticks();
    state.set_mode(RaceMode::Countdown);
    state.push_event(GameEvent::CountdownBeat {
        remaining: state.tuning.countdown_beats - 1,
    });
    log::info!("Race starting (seed {})", state.seed);
}

fn step_countdown(state: &mut RaceState) {
    // Road keeps scrolling under the countdown; nothing spawns
    state.scroll_phase = (state.scroll_phase + state.base_speed * 2.2).fract();

    state.countdown_ticks = state.countdown_ticks.saturating_sub(1);
    let beat_ticks = state.tuning.countdown_beat_ticks;
    if state.countdown_ticks == 0 {
        state.set_mode(RaceMode::Racing);
    } else if state.countdown_ticks % beat_ticks == 0 {
        let remaining = (state.countdown_ticks / beat_ticks).saturating_sub(1) as u8;
        state.push_event(GameEvent::CountdownBeat { remaining });
    }
}

/// Explicit reset instead of re-entering the game loop
fn restart(state: &mut RaceState) {
    state.reset_run();
    state.set_mode(RaceMode::Racing);
    log::info!("Race restarted");
}

fn back_to_menu(state: &mut RaceState) {
    state.reset_run();
    state.set_mode(RaceMode::Menu);
}

fn step_race(state: &mut RaceState, input: &TickInput, dt: f32) {
    let mut input = input.clone();
    if input.autopilot {
        drive_autopilot(state, &mut input);
    }
    let input = &input;

    state.race_ticks += 1;

    // 1. Player movement
    if input.move_left {
        state.player.move_left();
    }
    if input.move_right {
        state.player.move_right();
    }
    state.player.update();

    // 2. Speed: smooth toward boost/brake target, ramp the base
    let factor = if input.boost {
        state.tuning.boost_factor
    } else if input.brake {
        state.tuning.brake_factor
    } else {
        1.0
    };
    let target = state.base_speed * factor;
    state.speed = lerp(state.speed, target, state.tuning.speed_smoothing);
    state.base_speed += state.tuning.speed_ramp_per_sec * dt;

    // 3. Score and distance
    let points = 1 + (state.speed * state.tuning.score_speed_factor).max(0.0) as u64;
    award(state, points);
    state.distance += state.speed * 1000.0;

    // 4. Weapon
    update_weapon(state, input.fire);

    // 5. Spawner, driven by distance travelled
    state.spawn_progress += state.speed;
    if state.spawn_progress >= state.next_spawn_gap {
        spawn_wave(state);
        state.spawn_progress = 0.0;
        state.next_spawn_gap = state.roll_spawn_gap();
    }

    // 6. Motion
    let speed = state.speed;
    for obstacle in &mut state.obstacles {
        obstacle.advance(speed);
    }
    let bullet_speed = state.tuning.bullet_speed;
    for bullet in &mut state.bullets {
        bullet.advance(bullet_speed);
    }
    for explosion in &mut state.explosions {
        explosion.update();
    }

    // 7. Collisions
    resolve_bullet_hits(state);
    resolve_player_contacts(state);

    // 8. Prune
    state.obstacles.retain(|o| !o.is_expired());
    state.bullets.retain(|b| !b.is_expired());
    state.explosions.retain(|e| !e.is_expired());

    // 9. Cosmetic scroll phase, empowered timer
    state.scroll_phase = (state.scroll_phase + state.speed * 2.2).fract();
    if state.mode == RaceMode::Racing && state.empowered_ticks > 0 {
        state.empowered_ticks -= 1;
        if state.empowered_ticks == 0 {
            state.push_event(GameEvent::EmpoweredEnded);
        }
    }
}

/// Add points; crossing a multiple of the empower step grants empowered mode
fn award(state: &mut RaceState, points: u64) {
    let step = state.tuning.empower_score_step;
    let before = state.score / step;
    state.score += points;
    if state.score / step > before {
        if !state.is_empowered() {
            state.push_event(GameEvent::EmpoweredStarted);
        }
        state.empowered_ticks = state.tuning.empower_ticks;
        log::debug!("Empowered at score {}", state.score);
    }
}

fn update_weapon(state: &mut RaceState, fire: bool) {
    let weapon = &mut state.weapon;
    weapon.cooldown_ticks = weapon.cooldown_ticks.saturating_sub(1);

    if weapon.is_reloading() {
        weapon.reload_ticks -= 1;
        if weapon.reload_ticks == 0 {
            weapon.ammo = weapon.magazine_size;
            state.push_event(GameEvent::ReloadFinished);
            log::debug!("Reload finished");
        }
        // Fire blocked while reloading
        return;
    }

    if !fire || !weapon.can_fire() {
        return;
    }

    weapon.ammo -= 1;
    weapon.cooldown_ticks = state.tuning.fire_cooldown_ticks;
    let out_of_ammo = weapon.ammo == 0;
    if out_of_ammo {
        weapon.reload_ticks = state.tuning.reload_ticks;
    }

    let kind = if state.is_empowered() {
        BulletKind::Empowered
    } else {
        BulletKind::Standard
    };
    let lane = state.player.effective_lane();
    let depth = state.player.depth - BULLET_MUZZLE_OFFSET;
    state.bullets.push(Bullet::new(kind, lane, depth));
    state.push_event(GameEvent::ShotFired);

    if out_of_ammo {
        state.push_event(GameEvent::ReloadStarted);
        log::debug!("Magazine empty, reloading");
    }
}

fn spawn_wave(state: &mut RaceState) {
    let z0 = state.rng().random_range(Z_SPAWN_MIN..=Z_SPAWN_MAX);
    let lane_count = state.tuning.lane_count;
    let rules = state.tuning.spawn.clone();
    let slots = {
        let obstacles = std::mem::take(&mut state.obstacles);
        let slots = choose_spawn_pattern(&obstacles, z0, lane_count, &rules, state.rng());
        state.obstacles = obstacles;
        slots
    };
    if slots.is_empty() {
        return;
    }
    for slot in &slots {
        state.spawn_obstacle(slot.kind, slot.lane, z0);
    }
    log::debug!("Spawned {} obstacle(s) at z={:.3}: {:?}", slots.len(), z0, slots);
    state.push_event(GameEvent::Spawned { count: slots.len() });
}

/// Bullets damage the nearest obstacle they overlap in their lane
pub(crate) fn resolve_bullet_hits(state: &mut RaceState) {
    let projection = state.projection;
    let car_health = state.tuning.car_health;
    let mut destroyed = Vec::new();
    let mut hits = Vec::new();

    for bullet in state.bullets.iter_mut().filter(|b| !b.spent) {
        let bullet_rect = bullet.bounding_rect(&projection);
        let target = state
            .obstacles
            .iter_mut()
            .filter(|o| !o.destroyed && o.occupies(bullet.lane))
            .filter(|o| bullet_obstacle_collision(&bullet_rect, &o.bounding_rect(&projection)).hit)
            .max_by(|a, b| a.depth.total_cmp(&b.depth));

        let Some(obstacle) = target else {
            continue;
        };
        bullet.spent = true;
        if obstacle.take_hit(bullet.damage(car_health)) {
            let center_x = obstacle.bounding_rect(&projection).center().x;
            destroyed.push((obstacle.id, obstacle.kind, center_x, obstacle.depth));
        } else if let Some(health) = obstacle.health {
            hits.push(GameEvent::ObstacleHit {
                id: obstacle.id,
                health,
            });
        }
    }

    for event in hits {
        state.push_event(event);
    }
    for (id, kind, center_x, depth) in destroyed {
        let points = match kind {
            ObstacleKind::Car => state.tuning.car_destroy_score,
            ObstacleKind::Cone | ObstacleKind::Roadblock => state.tuning.light_destroy_score,
        };
        award(state, points);
        state.explosions.push(Explosion::new(center_x, depth));
        state.push_event(GameEvent::ObstacleDestroyed {
            id,
            kind,
            cause: DestroyCause::Bullet,
        });
        log::debug!("Shot down {} #{}", kind.as_str(), id);
    }
}

/// Player against obstacles: near-miss bonuses, empowered ramming, crashes
fn resolve_player_contacts(state: &mut RaceState) {
    let projection = state.projection;
    let player_rect = state.player.bounding_rect(&projection);
    let empowered = state.is_empowered();

    for i in 0..state.obstacles.len() {
        let obstacle = &state.obstacles[i];
        if is_near_miss(&player_rect, obstacle, &projection, &state.tuning) {
            let id = obstacle.id;
            state.obstacles[i].near_miss_scored = true;
            state.player.immunity_ticks = state.tuning.near_miss_immunity_ticks;
            let bonus = state.tuning.near_miss_bonus;
            award(state, bonus);
            state.push_event(GameEvent::NearMiss { id });
            continue;
        }

        if state.player.is_immune() {
            continue;
        }

        let contact =
            player_obstacle_collision(&player_rect, &state.obstacles[i], &projection, &state.tuning);
        if !contact.hit {
            continue;
        }

        if empowered {
            let obstacle = &mut state.obstacles[i];
            obstacle.destroyed = true;
            let (id, kind, depth) = (obstacle.id, obstacle.kind, obstacle.depth);
            let points = state.tuning.contact_score;
            award(state, points);
            state.explosions.push(Explosion::new(contact.point.x, depth));
            state.push_event(GameEvent::ObstacleDestroyed {
                id,
                kind,
                cause: DestroyCause::Contact,
            });
        } else {
            crash(state, contact.point);
            return;
        }
    }
}

fn crash(state: &mut RaceState, point: Vec2) {
    state.last_score = state.score;
    state
        .explosions
        .push(Explosion::new(point.x, state.player.depth));
    state.push_event(GameEvent::Crashed {
        score: state.score,
        distance: state.distance,
    });
    state.set_mode(RaceMode::Crashed);
    log::info!(
        "Crashed: score={} distance={:.0} after {} ticks",
        state.score,
        state.distance,
        state.race_ticks
    );
}

/// Depth ahead of the player at which the autopilot starts caring
const AUTOPILOT_LOOKAHEAD: f32 = 0.35;

/// Steer toward the lane with the most room ahead; shoot cars in our lane
fn drive_autopilot(state: &RaceState, input: &mut TickInput) {
    let player = &state.player;
    let lanes = state.tuning.lane_count;

    // Room ahead per lane: distance to the nearest obstacle not yet past us
    let clearance = |lane: usize| {
        state
            .obstacles
            .iter()
            .filter(|o| !o.destroyed && o.occupies(lane))
            .filter(|o| o.depth < state.tuning.collide_depth_max)
            .map(|o| (player.depth - o.depth).max(0.0))
            .fold(f32::MAX, f32::min)
    };

    let current = player.effective_lane();
    let current_room = clearance(current);
    let best = (0..lanes)
        .max_by(|&a, &b| {
            clearance(a)
                .total_cmp(&clearance(b))
                .then_with(|| b.abs_diff(current).cmp(&a.abs_diff(current)))
        })
        .unwrap_or(current);

    if current_room < AUTOPILOT_LOOKAHEAD && !player.is_changing_lanes() {
        if best < current {
            input.move_left = true;
        } else if best > current {
            input.move_right = true;
        }
    }

    input.fire = state.obstacles.iter().any(|o| {
        !o.destroyed
            && o.kind == ObstacleKind::Car
            && o.occupies(current)
            && o.depth > Z_SPAWN_MAX
            && o.depth < state.tuning.collide_depth_min
    });
}
