//! Homing toward the final resting point
//!
//! Once active, velocity is overridden every tick with a fixed fraction of the
//! remaining displacement, so the ball decelerates exponentially into the
//! target while its radius eases down to the configured minimum.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Arena, Ball};
use crate::config::ConvergenceConfig;
use crate::consts::ARRIVAL_EPSILON;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvergenceAnimator {
    active: bool,
    arrived: bool,
}

impl ConvergenceAnimator {
    /// Start homing; returns true only on the first call of a run
    pub fn activate(&mut self) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        true
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn arrived(&self) -> bool {
        self.arrived
    }

    /// Target point for the arena's current orientation
    pub fn target(arena: &Arena, config: &ConvergenceConfig) -> Vec2 {
        arena.at_fraction(config.target.pick(arena.orientation()))
    }

    /// Apply one tick of homing to the ball; returns true on the arrival tick
    pub fn step(&mut self, ball: &mut Ball, arena: &Arena, config: &ConvergenceConfig) -> bool {
        if !self.active || self.arrived {
            return false;
        }

        let orientation = arena.orientation();
        let min_radius = config.min_radius.pick(orientation);
        if ball.radius > min_radius {
            ball.radius = (ball.radius - config.shrink_step).max(min_radius);
        }

        let target = Self::target(arena, config);
        let delta = target - ball.pos;
        ball.vel = delta * config.damping;

        if delta.x.abs() < ARRIVAL_EPSILON && delta.y.abs() < ARRIVAL_EPSILON {
            ball.pos = target;
            ball.vel = Vec2::ZERO;
            self.arrived = true;
            log::info!("Ball settled at ({:.1}, {:.1})", target.x, target.y);
            return true;
        }
        false
    }
}
