//! Engine configuration and variant presets
//!
//! Every variant of the game is one [`EngineConfig`]. Sections default
//! independently, so a JSON file can override just the fields it cares about.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::EngineError;
use crate::sim::Orientation;

/// Named variants shipped with the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Small fixed arena, keyboard paddle, a miss ends the run
    Classic,
    /// Full-screen keyboard paddle game revealing the phrase
    #[default]
    Tennis,
    /// Trackpad paddle, start message, text fades before the ball settles
    TennisVideo,
    /// Small trackpad paddle; arrival reveals the hidden video
    TennisVideoMobile,
    /// No paddle; wall bounces reveal the phrase, start is tied to video playback
    NoPlatform,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Classic => "classic",
            Preset::Tennis => "tennis",
            Preset::TennisVideo => "tennis_video",
            Preset::TennisVideoMobile => "tennis_video_mobile",
            Preset::NoPlatform => "no_platform",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "classic" | "game" => Some(Preset::Classic),
            "tennis" => Some(Preset::Tennis),
            "tennis_video" | "video" => Some(Preset::TennisVideo),
            "tennis_video_mobile" | "mobile" => Some(Preset::TennisVideoMobile),
            "no_platform" | "noplatform" => Some(Preset::NoPlatform),
            _ => None,
        }
    }

    pub const ALL: [Preset; 5] = [
        Preset::Classic,
        Preset::Tennis,
        Preset::TennisVideo,
        Preset::TennisVideoMobile,
        Preset::NoPlatform,
    ];
}

/// A value that differs between landscape and portrait arenas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oriented<T> {
    pub landscape: T,
    pub portrait: T,
}

impl<T: Copy> Oriented<T> {
    /// Same value for both orientations
    pub const fn uniform(value: T) -> Self {
        Self {
            landscape: value,
            portrait: value,
        }
    }

    pub fn pick(&self, orientation: Orientation) -> T {
        match orientation {
            Orientation::Landscape => self.landscape,
            Orientation::Portrait => self.portrait,
        }
    }
}

/// What happens to the ball when the host viewport changes size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResizePolicy {
    /// Move the ball back to its spawn point and center the paddle
    #[default]
    Recenter,
    /// Leave positions alone (clamping the paddle only)
    Keep,
}

/// Where the ball starts a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpawnPoint {
    /// Fractions of the arena size
    Fraction { x: f32, y: f32 },
    /// Horizontally centered, touching the top edge
    TopCenter,
    /// Absolute arena coordinates
    Fixed { x: f32, y: f32 },
}

impl Default for SpawnPoint {
    fn default() -> Self {
        SpawnPoint::Fraction { x: 0.5, y: 0.25 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub resize_policy: ResizePolicy,
    pub spawn: SpawnPoint,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            resize_policy: ResizePolicy::Recenter,
            spawn: SpawnPoint::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    pub radius: f32,
    /// Initial velocity in units per tick
    pub velocity: Vec2,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            radius: 40.0,
            velocity: Vec2::new(5.0, 5.0),
        }
    }
}

/// How ball-vs-paddle contact is detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaddlePolicy {
    /// Closest-point test, resolved on the axis of least penetration.
    /// Only hits landing on the top face count.
    #[default]
    Directional,
    /// Ball bottom at or past the paddle top while its center is over the paddle.
    /// Every overlap counts.
    Overlap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddleConfig {
    pub width: f32,
    pub height: f32,
    /// Gap between the paddle and the arena bottom
    pub bottom_margin: f32,
    /// Displacement per arrow-key press
    pub key_step: f32,
    pub policy: PaddlePolicy,
    pub nudge: f32,
    /// Multiplier applied to the velocity on the first paddle hit of a run
    pub serve_boost: f32,
}

impl Default for PaddleConfig {
    fn default() -> Self {
        Self {
            width: 225.0,
            height: 15.0,
            bottom_margin: 100.0,
            key_step: 75.0,
            policy: PaddlePolicy::Directional,
            nudge: PADDLE_NUDGE,
            serve_boost: SERVE_BOOST,
        }
    }
}

/// Which collisions advance the hit counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProgressSource {
    /// Paddle hits when a paddle exists, wall bounces otherwise
    #[default]
    Auto,
    Walls,
    Paddle,
}

impl ProgressSource {
    /// Settle `Auto` once paddle presence is known
    pub fn resolve(self, has_paddle: bool) -> Self {
        match self {
            ProgressSource::Auto if has_paddle => ProgressSource::Paddle,
            ProgressSource::Auto => ProgressSource::Walls,
            source => source,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Text revealed one prefix at a time
    pub phrase: String,
    pub step: usize,
    pub threshold: usize,
    pub source: ProgressSource,
    /// Sound played on every qualifying collision
    pub hit_sound: Option<String>,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            phrase: "THE   ART   OF    BEING HUMAN      ".to_string(),
            step: HIT_STEP,
            threshold: CONVERGE_THRESHOLD,
            source: ProgressSource::Auto,
            hit_sound: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvergenceConfig {
    pub damping: f32,
    pub shrink_step: f32,
    /// Target as fractions of arena width/height
    pub target: Oriented<Vec2>,
    pub min_radius: Oriented<f32>,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            damping: CONVERGE_DAMPING,
            shrink_step: SHRINK_STEP,
            target: Oriented::uniform(Vec2::new(0.56, 0.43)),
            min_radius: Oriented::uniform(8.0),
        }
    }
}

/// What starts a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    #[default]
    Immediate,
    /// First time the host playback position reaches `at_seconds`
    Playback { at_seconds: f64 },
}

/// The single side effect requested once the ball settles on its target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerminalAction {
    /// Keep drawing the settled ball
    #[default]
    Freeze,
    StopRendering,
    RevealMedia,
    Navigate { url: String },
    /// Start a fresh run
    Reset,
}

/// What the arena bottom does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BottomPolicy {
    #[default]
    Bounce,
    /// A ball that slips past the paddle ends the run
    EndRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextFade {
    pub delay_ms: f64,
    pub duration_ms: f64,
}

impl Default for TextFade {
    fn default() -> Self {
        Self {
            delay_ms: TEXT_FADE_DELAY_MS,
            duration_ms: TEXT_FADE_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    pub trigger: Trigger,
    pub announce_ms: f64,
    /// Blank interval between the start message and play (0 = none)
    pub interlude_ms: f64,
    /// Fade of the revealed text, timed from the start of convergence
    pub text_fade: Option<TextFade>,
    pub on_resolved: TerminalAction,
    pub bottom: BottomPolicy,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            trigger: Trigger::Immediate,
            announce_ms: ANNOUNCE_MS,
            interlude_ms: 0.0,
            text_fade: None,
            on_resolved: TerminalAction::Freeze,
            bottom: BottomPolicy::Bounce,
        }
    }
}

/// CSS colors handed to the render target
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// `None` clears to transparent (video shows through)
    pub background: Option<String>,
    pub ball: String,
    pub paddle: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Some("#e0ff9e".to_string()),
            ball: "#f6f6f6".to_string(),
            paddle: "#f6f6f6".to_string(),
        }
    }
}

/// Full configuration for one engine instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub arena: ArenaConfig,
    pub ball: BallConfig,
    /// `None` for variants without a paddle
    pub paddle: Option<PaddleConfig>,
    pub progress: ProgressConfig,
    pub convergence: ConvergenceConfig,
    pub sequence: SequenceConfig,
    pub palette: Palette,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            ball: BallConfig::default(),
            paddle: Some(PaddleConfig::default()),
            progress: ProgressConfig::default(),
            convergence: ConvergenceConfig::default(),
            sequence: SequenceConfig::default(),
            palette: Palette::default(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration from a preset (applies preset overrides to the defaults)
    pub fn from_preset(preset: Preset) -> Self {
        let mut config = Self::default();
        config.apply_preset(preset);
        config
    }

    /// Apply a preset's overrides on top of the current values
    pub fn apply_preset(&mut self, preset: Preset) {
        match preset {
            Preset::Classic => {
                self.arena = ArenaConfig {
                    resize_policy: ResizePolicy::Keep,
                    spawn: SpawnPoint::Fixed { x: 50.0, y: 50.0 },
                };
                self.ball = BallConfig {
                    radius: 7.0,
                    velocity: Vec2::new(2.0, 2.0),
                };
                self.paddle = Some(PaddleConfig {
                    width: 75.0,
                    height: 5.0,
                    bottom_margin: 0.0,
                    key_step: 20.0,
                    ..PaddleConfig::default()
                });
                self.progress.phrase.clear();
                self.convergence.min_radius = Oriented::uniform(self.ball.radius);
                self.sequence.announce_ms = 0.0;
                self.sequence.bottom = BottomPolicy::EndRun;
                self.palette = Palette {
                    background: Some("#8ACE00".to_string()),
                    ball: "black".to_string(),
                    paddle: "black".to_string(),
                };
            }
            Preset::Tennis => {
                self.sequence.announce_ms = 0.0;
                self.convergence.target = Oriented::uniform(Vec2::new(0.5, 0.5));
                self.convergence.min_radius = Oriented::uniform(self.ball.radius);
            }
            Preset::TennisVideo => {
                self.convergence.target = Oriented::uniform(Vec2::new(0.5, 0.5));
                self.convergence.min_radius = Oriented::uniform(self.ball.radius);
                self.sequence.interlude_ms = INTERLUDE_MS;
                self.sequence.text_fade = Some(TextFade {
                    delay_ms: 1000.0,
                    duration_ms: 0.0,
                });
                self.palette.background = None;
            }
            Preset::TennisVideoMobile => {
                self.ball = BallConfig {
                    radius: 20.0,
                    velocity: Vec2::new(6.0, 6.0),
                };
                self.paddle = Some(PaddleConfig {
                    width: 100.0,
                    height: 10.0,
                    bottom_margin: 50.0,
                    ..PaddleConfig::default()
                });
                self.convergence.target = Oriented::uniform(Vec2::new(0.5, 0.5));
                self.convergence.min_radius = Oriented::uniform(20.0);
                self.sequence.text_fade = Some(TextFade::default());
                self.sequence.on_resolved = TerminalAction::RevealMedia;
                self.palette.background = None;
            }
            Preset::NoPlatform => {
                self.arena.spawn = SpawnPoint::TopCenter;
                self.ball = BallConfig {
                    radius: 40.0,
                    velocity: Vec2::new(1.2, 1.2),
                };
                self.paddle = None;
                self.progress.phrase = "the   art   of    be\u{131}ng human      ".to_string();
                self.progress.hit_sound = Some("pong".to_string());
                self.convergence.target = Oriented {
                    landscape: Vec2::new(0.57, 0.42),
                    portrait: Vec2::new(0.56, 0.48),
                };
                self.convergence.min_radius = Oriented {
                    landscape: 8.0,
                    portrait: 4.0,
                };
                self.sequence.trigger = Trigger::Playback { at_seconds: 89.0 };
                self.sequence.announce_ms = 0.0;
                self.palette = Palette {
                    background: None,
                    ball: "#e6331b".to_string(),
                    paddle: "#e6331b".to_string(),
                };
            }
        }
    }

    /// Parse a configuration from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Effective progress source once paddle presence is known
    pub fn progress_source(&self) -> ProgressSource {
        self.progress.source.resolve(self.paddle.is_some())
    }

    /// Reject configurations the engine cannot run
    pub fn validate(&self) -> Result<(), EngineError> {
        let ball = &self.ball;
        if !(ball.radius.is_finite() && ball.radius > 0.0) {
            return Err(EngineError::invalid("ball.radius", ball.radius, "a positive number"));
        }
        if !ball.velocity.is_finite() {
            return Err(EngineError::invalid("ball.velocity", ball.velocity, "finite components"));
        }

        if let Some(paddle) = &self.paddle {
            if !(paddle.width > 0.0 && paddle.height > 0.0) {
                return Err(EngineError::invalid(
                    "paddle.width/height",
                    format!("{}x{}", paddle.width, paddle.height),
                    "positive dimensions",
                ));
            }
            if !(paddle.key_step >= 0.0 && paddle.nudge >= 0.0) {
                return Err(EngineError::invalid(
                    "paddle.key_step/nudge",
                    format!("{}/{}", paddle.key_step, paddle.nudge),
                    "non-negative numbers",
                ));
            }
            if !(paddle.serve_boost > 0.0) {
                return Err(EngineError::invalid(
                    "paddle.serve_boost",
                    paddle.serve_boost,
                    "a positive multiplier",
                ));
            }
        } else if self.progress.source == ProgressSource::Paddle {
            return Err(EngineError::invalid(
                "progress.source",
                "paddle",
                "'walls' or 'auto' when no paddle is configured",
            ));
        }

        if self.progress.step == 0 {
            return Err(EngineError::invalid("progress.step", 0, "at least 1"));
        }

        let conv = &self.convergence;
        if !(conv.damping > 0.0 && conv.damping <= 1.0) {
            return Err(EngineError::invalid("convergence.damping", conv.damping, "a value in (0, 1]"));
        }
        if !(conv.shrink_step >= 0.0) {
            return Err(EngineError::invalid(
                "convergence.shrink_step",
                conv.shrink_step,
                "a non-negative number",
            ));
        }
        for radius in [conv.min_radius.landscape, conv.min_radius.portrait] {
            if !(radius > 0.0 && radius <= ball.radius) {
                return Err(EngineError::invalid(
                    "convergence.min_radius",
                    radius,
                    "a positive radius no larger than ball.radius",
                ));
            }
        }
        for target in [conv.target.landscape, conv.target.portrait] {
            let in_unit = |v: f32| (0.0..=1.0).contains(&v);
            if !(in_unit(target.x) && in_unit(target.y)) {
                return Err(EngineError::invalid(
                    "convergence.target",
                    target,
                    "fractions in [0, 1]",
                ));
            }
        }

        let seq = &self.sequence;
        for (field, ms) in [
            ("sequence.announce_ms", seq.announce_ms),
            ("sequence.interlude_ms", seq.interlude_ms),
        ] {
            if !(ms.is_finite() && ms >= 0.0) {
                return Err(EngineError::invalid(field, ms, "a non-negative duration"));
            }
        }
        if let Some(fade) = seq.text_fade
            && !(fade.delay_ms >= 0.0 && fade.duration_ms >= 0.0)
        {
            return Err(EngineError::invalid(
                "sequence.text_fade",
                format!("{}/{}", fade.delay_ms, fade.duration_ms),
                "non-negative durations",
            ));
        }
        if let Trigger::Playback { at_seconds } = seq.trigger
            && !(at_seconds.is_finite() && at_seconds >= 0.0)
        {
            return Err(EngineError::invalid(
                "sequence.trigger.at_seconds",
                at_seconds,
                "a non-negative playback position",
            ));
        }
        if let TerminalAction::Navigate { url } = &seq.on_resolved
            && url.trim().is_empty()
        {
            return Err(EngineError::invalid("sequence.on_resolved.url", url, "a non-empty URL"));
        }
        if seq.bottom == BottomPolicy::EndRun && self.paddle.is_none() {
            return Err(EngineError::invalid(
                "sequence.bottom",
                "end_run",
                "'bounce' when no paddle is configured",
            ));
        }

        Ok(())
    }
}
