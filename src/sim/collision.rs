//! Collision detection and response
//!
//! One call per tick: move the ball by its velocity, then resolve walls and
//! the paddle. Walls reflect elastically; the paddle resolves along the axis
//! of least penetration and pushes the ball clear so it cannot stick.

use glam::Vec2;

use super::geometry::circle_rect_contact;
use super::state::{Arena, Ball, Paddle};
use crate::config::PaddlePolicy;

/// A collision reported by the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionEvent {
    LeftWall,
    RightWall,
    TopWall,
    BottomWall,
    /// Ball landed on the top face of the paddle
    Paddle,
    /// Ball touched the paddle's side or underside
    PaddleGraze,
    /// Ball left through an open arena bottom
    Escaped,
}

impl CollisionEvent {
    const ALL: [CollisionEvent; 7] = [
        CollisionEvent::LeftWall,
        CollisionEvent::RightWall,
        CollisionEvent::TopWall,
        CollisionEvent::BottomWall,
        CollisionEvent::Paddle,
        CollisionEvent::PaddleGraze,
        CollisionEvent::Escaped,
    ];

    #[inline]
    pub fn is_wall(self) -> bool {
        matches!(
            self,
            CollisionEvent::LeftWall
                | CollisionEvent::RightWall
                | CollisionEvent::TopWall
                | CollisionEvent::BottomWall
        )
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Set of collisions that happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionSet(u8);

impl CollisionSet {
    pub fn insert(&mut self, event: CollisionEvent) {
        self.0 |= event.bit();
    }

    pub fn contains(&self, event: CollisionEvent) -> bool {
        self.0 & event.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Events in a fixed order (walls first)
    pub fn iter(&self) -> impl Iterator<Item = CollisionEvent> + '_ {
        CollisionEvent::ALL
            .into_iter()
            .filter(|event| self.contains(*event))
    }
}

/// Per-run collision parameters
#[derive(Debug, Clone, Copy)]
pub struct ResolveParams {
    pub paddle_policy: PaddlePolicy,
    /// Clearance added when pushing the ball off the paddle
    pub nudge: f32,
    /// Velocity multiplier for the first paddle hit of a run
    pub serve_boost: f32,
    /// Bottom edge reflects (false: the ball escapes instead)
    pub bounce_bottom: bool,
}

impl Default for ResolveParams {
    fn default() -> Self {
        Self {
            paddle_policy: PaddlePolicy::Directional,
            nudge: crate::consts::PADDLE_NUDGE,
            serve_boost: crate::consts::SERVE_BOOST,
            bounce_bottom: true,
        }
    }
}

/// Advance the ball one tick and resolve every collision
pub fn advance_and_resolve(
    ball: &mut Ball,
    arena: &Arena,
    paddle: Option<&Paddle>,
    params: &ResolveParams,
) -> CollisionSet {
    let mut events = CollisionSet::default();
    ball.pos += ball.vel;
    let r = ball.radius;

    // Side walls
    if ball.pos.x - r <= 0.0 {
        ball.vel.x = -ball.vel.x;
        events.insert(CollisionEvent::LeftWall);
    } else if ball.pos.x + r >= arena.width {
        ball.vel.x = -ball.vel.x;
        events.insert(CollisionEvent::RightWall);
    }

    // Top wall (not while the ball is still entering from its spawn point)
    if ball.pos.y - r <= 0.0 {
        if !ball.spawn_guard {
            ball.vel.y = -ball.vel.y;
            events.insert(CollisionEvent::TopWall);
        }
    } else {
        ball.spawn_guard = false;
    }

    let paddle_contact = match paddle {
        Some(paddle) => resolve_paddle(ball, paddle, params, &mut events),
        None => false,
    };

    // Bottom wall
    if !paddle_contact {
        if params.bounce_bottom {
            if ball.pos.y + r >= arena.height {
                ball.vel.y = -ball.vel.y;
                events.insert(CollisionEvent::BottomWall);
            }
        } else if ball.pos.y + r > arena.height {
            events.insert(CollisionEvent::Escaped);
        }
    }

    events
}

/// Returns true on any paddle contact
fn resolve_paddle(
    ball: &mut Ball,
    paddle: &Paddle,
    params: &ResolveParams,
    events: &mut CollisionSet,
) -> bool {
    let rect = paddle.rect();
    let r = ball.radius;

    let qualifying = match params.paddle_policy {
        PaddlePolicy::Overlap => {
            if !(ball.pos.y + r >= rect.top() && rect.spans_x(ball.pos.x)) {
                return false;
            }
            ball.vel.y = -ball.vel.y;
            true
        }
        PaddlePolicy::Directional => {
            let Some(offset) = circle_rect_contact(ball.pos, r, &rect) else {
                return false;
            };
            // Center inside the paddle: resolve against the face it came through
            let offset = if offset == Vec2::ZERO {
                Vec2::new(0.0, if ball.vel.y > 0.0 { -1.0 } else { 1.0 })
            } else {
                offset
            };
            let clearance = r + params.nudge;

            if offset.x.abs() > offset.y.abs() {
                if offset.x < 0.0 {
                    ball.vel.x = -ball.vel.x.abs();
                    ball.pos.x = rect.left() - clearance;
                } else {
                    ball.vel.x = ball.vel.x.abs();
                    ball.pos.x = rect.right() + clearance;
                }
                false
            } else if offset.y < 0.0 {
                ball.vel.y = -ball.vel.y.abs();
                ball.pos.y = rect.top() - clearance;
                ball.vel.y < 0.0
            } else {
                ball.vel.y = ball.vel.y.abs();
                ball.pos.y = rect.bottom() + clearance;
                false
            }
        }
    };

    if qualifying {
        events.insert(CollisionEvent::Paddle);
        if !ball.served {
            ball.served = true;
            ball.vel *= params.serve_boost;
            log::debug!("Serve boost applied, velocity now {}", ball.vel);
        }
    } else {
        events.insert(CollisionEvent::PaddleGraze);
    }
    true
}
