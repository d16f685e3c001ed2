//! Simulation module
//!
//! All physics lives here. This module is pure:
//! - One step per frame, velocities in units per tick
//! - No timers, rendering or platform dependencies
//! - A single writer (`tick`) per run

pub mod collision;
pub mod convergence;
pub mod geometry;
pub mod progress;
pub mod state;
pub mod tick;

pub use collision::{CollisionEvent, CollisionSet, ResolveParams, advance_and_resolve};
pub use convergence::ConvergenceAnimator;
pub use geometry::{Rect, circle_rect_contact};
pub use progress::ProgressTracker;
pub use state::{Arena, Ball, Orientation, Paddle, SimState, spawn_position};
pub use tick::{TickOutcome, resolve_params, tick};
