//! Rally - a bouncing-ball reveal engine
//!
//! Core modules:
//! - `sim`: Per-frame simulation (physics, collisions, progress, convergence)
//! - `sequence`: Stage state machine that gates the simulation and emits intents
//! - `platform`: Input translation from host control events
//! - `render`: Drawing the scene onto a host-provided 2D surface
//! - `config`: Data-driven engine configuration and variant presets

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod config;
pub mod error;
pub mod platform;
pub mod render;
pub mod sequence;
pub mod sim;

pub use config::{EngineConfig, Preset};
pub use error::EngineError;
pub use sequence::{Frame, Intent, SequenceController, SequenceStage, TerminalAction};

/// Engine defaults shared by every preset
pub mod consts {
    /// Hit counter increment per qualifying collision
    pub const HIT_STEP: usize = 6;
    /// Convergence begins once the hit counter exceeds this
    pub const CONVERGE_THRESHOLD: usize = 29;
    /// Fraction of the remaining displacement covered per tick while homing
    pub const CONVERGE_DAMPING: f32 = 0.03;
    /// Radius lost per tick while homing
    pub const SHRINK_STEP: f32 = 0.5;
    /// Homing is complete once both displacement components are below this
    pub const ARRIVAL_EPSILON: f32 = 1.0;

    /// Distance the ball is pushed off the paddle after a hit (prevents sticking)
    pub const PADDLE_NUDGE: f32 = 5.0;
    /// Velocity multiplier applied on the first paddle hit of a run
    pub const SERVE_BOOST: f32 = 2.0;

    /// Start message display time
    pub const ANNOUNCE_MS: f64 = 2000.0;
    /// Blank screen between the start message and play
    pub const INTERLUDE_MS: f64 = 1000.0;
    /// Delay before the revealed text starts fading
    pub const TEXT_FADE_DELAY_MS: f64 = 800.0;
    /// Text fade duration
    pub const TEXT_FADE_MS: f64 = 1000.0;
}

/// Clamp `value` into `[min, max]`, collapsing to `min` when the range is inverted or NaN
///
/// Paddles wider than a narrow arena produce `max < min`; `f32::clamp` panics there.
#[inline]
pub fn clamp_span(value: f32, min: f32, max: f32) -> f32 {
    if !(max >= min) {
        min
    } else {
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_span_inverted_range() {
        assert_eq!(clamp_span(50.0, 0.0, 100.0), 50.0);
        assert_eq!(clamp_span(-5.0, 0.0, 100.0), 0.0);
        assert_eq!(clamp_span(150.0, 0.0, 100.0), 100.0);
        assert_eq!(clamp_span(30.0, 0.0, -20.0), 0.0);
        assert_eq!(clamp_span(30.0, 0.0, f32::NAN), 0.0);
    }
}
