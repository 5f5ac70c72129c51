//! Per-frame simulation step
//!
//! Advances one run deterministically: physics, spawning, obstacles,
//! scoring, distance, and terminal transitions.

use super::collision::check_collision;
use super::obstacle::ObstacleSpawner;
use super::state::{GameEvent, RunPhase, SimulationState};
use crate::consts::*;

/// Logical player action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Jump,
    Duck(bool),
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Actions applied in arrival order before physics runs
    pub actions: Vec<Action>,
    /// Host clock in milliseconds; drives the rhythm pulse
    pub now_ms: f64,
}

impl TickInput {
    /// No actions at the given host time
    pub fn at(now_ms: f64) -> Self {
        Self {
            actions: Vec::new(),
            now_ms,
        }
    }

    pub fn with(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

/// Advance the run by one frame
///
/// Does nothing unless the run is `Running`. Events produced by this tick
/// replace `state.events`.
pub fn tick(state: &mut SimulationState, input: &TickInput) {
    state.events.clear();
    if state.phase != RunPhase::Running {
        return;
    }

    for action in &input.actions {
        match *action {
            Action::Jump => {
                if state.character.jump() {
                    state.events.push(GameEvent::Jumped);
                }
            }
            Action::Duck(active) => state.character.set_ducking(active),
        }
    }

    state.character.tick();
    state.update_effects();

    // Speed is recomputed every tick from distance and wall-clock time
    let elapsed_ms = (input.now_ms - state.start_time_ms).max(0.0);
    let speed = state.config.speed_at(state.distance, elapsed_ms).max(0.0);
    state.current_speed = speed;

    if let Some(rhythm) = state.config.rhythm {
        let beat = rhythm.beat_index(elapsed_ms);
        if state.last_beat != Some(beat) {
            state.last_beat = Some(beat);
            state.events.push(GameEvent::Beat {
                accent: rhythm.is_accent(beat),
            });
        }
    }

    if ObstacleSpawner::gate_open(&state.config, state.frame_count, state.obstacles.last()) {
        let id = state.next_entity_id();
        let obstacle = state.spawner.spawn(id);
        state.obstacles.push(obstacle);
    }

    let mut collided = None;
    let mut bursts = Vec::new();
    for obstacle in state.obstacles.iter_mut() {
        obstacle.x -= speed;

        if check_collision(&state.character, obstacle) {
            collided = Some(obstacle.id);
            break;
        }

        if !obstacle.passed && obstacle.trailing_edge() < state.character.x {
            obstacle.passed = true;
            state.score += PASS_AWARD;
            state.events.push(GameEvent::ObstaclePassed { id: obstacle.id });
            bursts.push((
                obstacle.trailing_edge(),
                obstacle.y + obstacle.height / 2.0,
                obstacle.kind.color_index(),
            ));
        }
    }

    if let Some(id) = collided {
        state.obstacles.retain(|o| o.id != id);
        state.phase = RunPhase::Failed;
        state.events.push(GameEvent::Collided { id });
        log::info!(
            "Run failed at distance {:.0} (score {})",
            state.distance,
            state.score
        );
        return;
    }

    state.obstacles.retain(|o| !o.is_offscreen());
    for (x, y, color) in bursts {
        state.emit_pass_burst(x, y, color);
    }

    state.distance += speed;
    state.frame_count += 1;

    if state.distance >= state.config.level_distance {
        state.phase = RunPhase::Cleared;
        state.events.push(GameEvent::LevelCleared);
        log::info!(
            "Cleared {} after {} frames (score {})",
            state.mode.name(),
            state.frame_count,
            state.score
        );
    }
}
