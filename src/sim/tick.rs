//! Per-frame simulation tick
//!
//! One physics step per rendered frame: move and collide, feed progress, and
//! hand velocity over to the convergence animator once the threshold is passed.

use super::collision::{CollisionEvent, CollisionSet, ResolveParams, advance_and_resolve};
use super::convergence::ConvergenceAnimator;
use super::state::SimState;
use crate::config::{BottomPolicy, EngineConfig, PaddlePolicy};

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// False when the tick was skipped (zero-size arena or already settled)
    pub ran: bool,
    pub collisions: CollisionSet,
    /// Qualifying collisions fed to the progress tracker
    pub qualifying: usize,
    /// Revealed prefix length changed
    pub revealed_changed: bool,
    /// Homing started on this tick
    pub convergence_started: bool,
    /// Ball settled on the target on this tick
    pub arrived: bool,
    /// Ball left through the open bottom
    pub escaped: bool,
}

/// Collision parameters for a configuration
pub fn resolve_params(config: &EngineConfig) -> ResolveParams {
    let defaults = ResolveParams::default();
    let (paddle_policy, nudge, serve_boost) = match &config.paddle {
        Some(p) => (p.policy, p.nudge, p.serve_boost),
        None => (PaddlePolicy::Directional, defaults.nudge, 1.0),
    };
    ResolveParams {
        paddle_policy,
        nudge,
        serve_boost,
        bounce_bottom: config.sequence.bottom == BottomPolicy::Bounce || config.paddle.is_none(),
    }
}

/// Advance the simulation by one frame
pub fn tick(state: &mut SimState, config: &EngineConfig) -> TickOutcome {
    let mut outcome = TickOutcome::default();

    if !state.arena.is_valid() {
        log::debug!(
            "Skipping tick on {}x{} arena",
            state.arena.width,
            state.arena.height
        );
        return outcome;
    }
    if state.convergence.arrived() {
        return outcome;
    }

    outcome.ran = true;
    state.time_ticks += 1;

    let params = resolve_params(config);
    let collisions =
        advance_and_resolve(&mut state.ball, &state.arena, state.paddle.as_ref(), &params);
    outcome.collisions = collisions;

    if collisions.contains(CollisionEvent::Escaped) {
        outcome.escaped = true;
        return outcome;
    }

    let revealed_before = state.progress.revealed_len();
    for event in collisions.iter() {
        if state.progress.on_collision(event) {
            outcome.qualifying += 1;
        }
    }
    outcome.revealed_changed = state.progress.revealed_len() != revealed_before;

    if state.progress.should_converge() && state.convergence.activate() {
        outcome.convergence_started = true;
        let target = ConvergenceAnimator::target(&state.arena, &config.convergence);
        log::info!(
            "Hit count {} passed threshold, homing to ({:.1}, {:.1})",
            state.progress.hit_count(),
            target.x,
            target.y
        );
    }

    outcome.arrived = state
        .convergence
        .step(&mut state.ball, &state.arena, &config.convergence);

    outcome
}
