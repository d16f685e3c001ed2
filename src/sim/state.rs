//! Simulation state and core types
//!
//! Everything a single run owns lives in [`SimState`]; the tick is its only writer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::convergence::ConvergenceAnimator;
use super::geometry::Rect;
use super::progress::ProgressTracker;
use crate::clamp_span;
use crate::config::{EngineConfig, PaddleConfig, SpawnPoint};

/// Arena orientation, derived from its aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Landscape,
    Portrait,
}

/// The bounded play area, sized by the host viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Both dimensions positive (a zero-size viewport skips ticks)
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn orientation(&self) -> Orientation {
        if self.width > self.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    /// Point at the given fractions of width and height
    #[inline]
    pub fn at_fraction(&self, fraction: Vec2) -> Vec2 {
        Vec2::new(self.width, self.height) * fraction
    }
}

/// The ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    /// Displacement per tick
    pub vel: Vec2,
    pub radius: f32,
    /// Set at spawn; suppresses top-wall bounces until the ball is fully inside
    pub spawn_guard: bool,
    /// Whether the one-time serve boost has been applied this run
    pub served: bool,
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel,
            radius,
            spawn_guard: true,
            served: false,
        }
    }

    /// Move the ball to a spawn point and re-arm the spawn guard
    pub fn respawn(&mut self, pos: Vec2) {
        self.pos = pos;
        self.spawn_guard = true;
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Left edge
    pub x: f32,
    /// Top edge (derived from the arena height)
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub bottom_margin: f32,
}

impl Paddle {
    /// Create a paddle centered horizontally in the arena
    pub fn new(config: &PaddleConfig, arena: &Arena) -> Self {
        let mut paddle = Self {
            x: 0.0,
            y: 0.0,
            width: config.width,
            height: config.height,
            bottom_margin: config.bottom_margin,
        };
        paddle.center(arena);
        paddle
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Largest legal left edge
    #[inline]
    pub fn max_x(&self, arena: &Arena) -> f32 {
        arena.width - self.width
    }

    /// Move the left edge, clamped to `[0, arena.width - width]`
    pub fn set_x(&mut self, x: f32, arena: &Arena) {
        self.x = clamp_span(x, 0.0, self.max_x(arena));
    }

    /// Recompute the vertical offset and re-clamp after an arena change
    pub fn fit(&mut self, arena: &Arena) {
        self.y = arena.height - self.height - self.bottom_margin;
        self.set_x(self.x, arena);
    }

    pub fn center(&mut self, arena: &Arena) {
        self.x = (arena.width - self.width) / 2.0;
        self.fit(arena);
    }
}

/// Resolve a spawn point against the arena
pub fn spawn_position(spawn: SpawnPoint, arena: &Arena, radius: f32) -> Vec2 {
    match spawn {
        SpawnPoint::Fraction { x, y } => arena.at_fraction(Vec2::new(x, y)),
        SpawnPoint::TopCenter => Vec2::new(arena.width / 2.0, radius + 1.0),
        SpawnPoint::Fixed { x, y } => Vec2::new(x, y),
    }
}

/// Complete state of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimState {
    pub arena: Arena,
    pub ball: Ball,
    pub paddle: Option<Paddle>,
    pub progress: ProgressTracker,
    pub convergence: ConvergenceAnimator,
    /// Physics ticks run so far
    pub time_ticks: u64,
}

impl SimState {
    /// Create a fresh run for the given arena
    pub fn new(config: &EngineConfig, arena: Arena) -> Self {
        let pos = spawn_position(config.arena.spawn, &arena, config.ball.radius);
        Self {
            arena,
            ball: Ball::new(pos, config.ball.velocity, config.ball.radius),
            paddle: config.paddle.as_ref().map(|p| Paddle::new(p, &arena)),
            progress: ProgressTracker::new(&config.progress, config.paddle.is_some()),
            convergence: ConvergenceAnimator::default(),
            time_ticks: 0,
        }
    }

    /// Return the ball to its spawn point and center the paddle
    pub fn recenter(&mut self, spawn: SpawnPoint) {
        let pos = spawn_position(spawn, &self.arena, self.ball.radius);
        self.ball.respawn(pos);
        if let Some(paddle) = &mut self.paddle {
            paddle.center(&self.arena);
        }
    }

    /// Pull the ball back inside the arena after it shrank
    pub fn contain_ball(&mut self) {
        let r = self.ball.radius;
        self.ball.pos.x = clamp_span(self.ball.pos.x, r, self.arena.width - r);
        self.ball.pos.y = clamp_span(self.ball.pos.y, r, self.arena.height - r);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;

    #[test]
    fn test_orientation() {
        assert_eq!(Arena::new(1000.0, 800.0).orientation(), Orientation::Landscape);
        assert_eq!(Arena::new(400.0, 800.0).orientation(), Orientation::Portrait);
        // Square counts as portrait (width must strictly exceed height)
        assert_eq!(Arena::new(500.0, 500.0).orientation(), Orientation::Portrait);
    }

    #[test]
    fn test_paddle_fit_and_clamp() {
        let config = PaddleConfig {
            width: 100.0,
            height: 10.0,
            bottom_margin: 50.0,
            ..PaddleConfig::default()
        };
        let arena = Arena::new(800.0, 600.0);
        let mut paddle = Paddle::new(&config, &arena);
        assert_eq!(paddle.x, 350.0);
        assert_eq!(paddle.y, 540.0);

        paddle.set_x(790.0, &arena);
        assert_eq!(paddle.x, 700.0);

        let narrow = Arena::new(300.0, 400.0);
        paddle.fit(&narrow);
        assert_eq!(paddle.x, 200.0);
        assert_eq!(paddle.y, 340.0);
    }

    #[test]
    fn test_spawn_positions() {
        let arena = Arena::new(800.0, 600.0);
        assert_eq!(
            spawn_position(SpawnPoint::Fraction { x: 0.5, y: 0.25 }, &arena, 40.0),
            Vec2::new(400.0, 150.0)
        );
        assert_eq!(
            spawn_position(SpawnPoint::TopCenter, &arena, 40.0),
            Vec2::new(400.0, 41.0)
        );
    }

    #[test]
    fn test_new_state_from_preset() {
        let config = EngineConfig::from_preset(Preset::Classic);
        let state = SimState::new(&config, Arena::new(500.0, 400.0));
        assert_eq!(state.ball.pos, Vec2::new(50.0, 50.0));
        assert_eq!(state.ball.radius, 7.0);
        let paddle = state.paddle.as_ref().unwrap();
        assert_eq!(paddle.y, 395.0);
        assert_eq!(state.progress.hit_count(), 0);
        assert!(!state.convergence.is_active());
    }
}
