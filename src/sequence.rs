//! Stage state machine around the simulation
//!
//! The controller owns the run. Each animation frame the host calls
//! [`SequenceController::advance`] with the elapsed time; stage timers, the
//! text fade and the physics tick all advance from that single call, and the
//! side effects the host must perform come back as [`Intent`]s.
//!
//! ```text
//! AwaitingTrigger -> Announcing -> [Interlude] -> Running -> Resolved
//!                                                    \-> Lost (open bottom)
//! ```

use crate::config::{EngineConfig, ResizePolicy, TextFade, Trigger};
use crate::error::EngineError;
use crate::platform::{ControlEvent, InputAdapter};
use crate::render::SceneView;
use crate::sim::{Arena, ConvergenceAnimator, SimState, tick};

pub use crate::config::TerminalAction;

/// Current stage of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStage {
    /// Constructed, waiting for the start trigger
    AwaitingTrigger,
    /// Start message on screen
    Announcing,
    /// Blank screen before play
    Interlude,
    /// Physics advancing every frame
    Running,
    /// Ball settled on its target
    Resolved,
    /// Ball slipped past the paddle
    Lost,
}

impl SequenceStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, SequenceStage::Resolved | SequenceStage::Lost)
    }
}

/// A side effect the host should perform
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    ShowStartMessage,
    ClearStartMessage,
    RunStarted,
    /// Fire-and-forget; failures are the host's to ignore
    PlaySound(String),
    /// Number of phrase characters now revealed
    RevealText { len: usize },
    FadeOutText { duration_ms: f64 },
    HideText,
    Terminal(TerminalAction),
    ShowGameOver,
    Restarted,
}

/// Per-frame input from the host
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frame {
    /// Milliseconds since the previous frame
    pub dt_ms: f64,
    /// Current media playback position in seconds, if a time signal is attached
    pub playback_position: Option<f64>,
}

impl Frame {
    pub fn elapsed(dt_ms: f64) -> Self {
        Self {
            dt_ms,
            playback_position: None,
        }
    }

    pub fn with_playback(mut self, position: f64) -> Self {
        self.playback_position = Some(position);
        self
    }
}

/// Text fade timeline, started when homing begins
#[derive(Debug, Clone, Copy, PartialEq)]
enum FadeState {
    Idle,
    Waiting { elapsed_ms: f64 },
    Fading { elapsed_ms: f64 },
    Done,
}

/// Owns one run and drives it frame by frame
#[derive(Debug)]
pub struct SequenceController {
    config: EngineConfig,
    input: Option<InputAdapter>,
    state: SimState,
    stage: SequenceStage,
    stage_elapsed_ms: f64,
    trigger_latched: bool,
    fade: FadeState,
    stopped: bool,
}

impl SequenceController {
    /// Validate the configuration and set up a run on the given arena
    pub fn new(config: EngineConfig, arena: Arena) -> Result<Self, EngineError> {
        config.validate()?;
        if !arena.is_valid() {
            return Err(EngineError::InvalidArena {
                width: arena.width,
                height: arena.height,
            });
        }

        let state = SimState::new(&config, arena);
        let input = config.paddle.as_ref().map(|p| InputAdapter::new(p.key_step));
        log::info!(
            "Run created on {}x{} arena (paddle: {})",
            arena.width,
            arena.height,
            input.is_some()
        );

        Ok(Self {
            config,
            input,
            state,
            stage: SequenceStage::AwaitingTrigger,
            stage_elapsed_ms: 0.0,
            trigger_latched: false,
            fade: FadeState::Idle,
            stopped: false,
        })
    }

    pub fn stage(&self) -> SequenceStage {
        self.stage
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    /// Whether the host should keep scheduling frames
    pub fn wants_frames(&self) -> bool {
        if self.stopped {
            return false;
        }
        match self.stage {
            SequenceStage::Lost => false,
            SequenceStage::Resolved => {
                self.config.sequence.on_resolved != TerminalAction::StopRendering
                    || matches!(self.fade, FadeState::Waiting { .. } | FadeState::Fading { .. })
            }
            _ => true,
        }
    }

    /// Snapshot for the renderer
    pub fn view(&self) -> SceneView<'_> {
        SceneView {
            stage: self.stage,
            arena: self.state.arena,
            ball: &self.state.ball,
            paddle: self.state.paddle.as_ref(),
            revealed: self.state.progress.revealed_prefix(),
            text_visible: self.fade != FadeState::Done,
        }
    }

    /// Record a playback position; the trigger latches the first time it is reached
    pub fn observe_playback(&mut self, position: f64) {
        if self.trigger_latched {
            return;
        }
        if let Trigger::Playback { at_seconds } = self.config.sequence.trigger
            && position >= at_seconds
        {
            self.trigger_latched = true;
            log::info!("Playback reached {position:.2}s, start trigger latched");
        }
    }

    /// Apply a host control event between frames
    pub fn handle_input(&mut self, event: ControlEvent) {
        if self.stopped {
            return;
        }
        if let ControlEvent::Resize { width, height } = event {
            self.resize(width, height);
            return;
        }
        if let (Some(input), Some(paddle)) = (&self.input, &mut self.state.paddle) {
            input.apply(paddle, &self.state.arena, event);
        }
    }

    /// Adopt a new viewport size
    ///
    /// A zero-size viewport is stored as-is; ticks are skipped until a valid size arrives.
    /// Non-finite sizes are ignored.
    pub fn resize(&mut self, width: f32, height: f32) {
        if !width.is_finite() || !height.is_finite() {
            log::warn!("Ignoring non-finite viewport size {width}x{height}");
            return;
        }
        let arena = Arena::new(width, height);
        self.state.arena = arena;
        if !arena.is_valid() {
            log::warn!("Viewport resized to {width}x{height}, pausing physics");
            return;
        }

        match self.stage {
            SequenceStage::Resolved => {
                // Settle on the new orientation's mark
                let convergence = &self.config.convergence;
                let ball = &mut self.state.ball;
                ball.pos = ConvergenceAnimator::target(&arena, convergence);
                ball.radius = ball
                    .radius
                    .min(convergence.min_radius.pick(arena.orientation()));
            }
            SequenceStage::Lost => {}
            _ => match self.config.arena.resize_policy {
                ResizePolicy::Recenter => self.state.recenter(self.config.arena.spawn),
                ResizePolicy::Keep => self.state.contain_ball(),
            },
        }
        if let (Some(input), Some(paddle)) = (&self.input, &mut self.state.paddle) {
            input.refit(paddle, &arena);
        }
        log::debug!("Arena resized to {width}x{height} ({:?})", arena.orientation());
    }

    /// Advance timers and physics by one frame
    pub fn advance(&mut self, frame: Frame) -> Vec<Intent> {
        let mut intents = Vec::new();
        if self.stopped {
            return intents;
        }

        if let Some(position) = frame.playback_position {
            self.observe_playback(position);
        }
        let dt_ms = if frame.dt_ms.is_finite() && frame.dt_ms > 0.0 {
            frame.dt_ms
        } else {
            0.0
        };

        self.advance_fade(dt_ms, &mut intents);
        self.settle_stages(dt_ms, &mut intents);

        if self.stage == SequenceStage::Running {
            self.run_tick(&mut intents);
        }

        intents
    }

    /// Discard the current run and start over from the trigger
    pub fn restart(&mut self) {
        self.state = SimState::new(&self.config, self.state.arena);
        self.stage = SequenceStage::AwaitingTrigger;
        self.stage_elapsed_ms = 0.0;
        self.trigger_latched = false;
        self.fade = FadeState::Idle;
        self.stopped = false;
        log::info!("Run restarted");
    }

    /// Cancel pending timers and stop producing frames
    pub fn stop(&mut self) {
        self.stopped = true;
        self.fade = FadeState::Idle;
        log::info!("Run stopped in {:?}", self.stage);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn trigger_ready(&self) -> bool {
        match self.config.sequence.trigger {
            Trigger::Immediate => true,
            Trigger::Playback { .. } => self.trigger_latched,
        }
    }

    fn enter(&mut self, stage: SequenceStage, carried_ms: f64) {
        log::info!("Stage {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
        self.stage_elapsed_ms = carried_ms;
    }

    /// Walk through every timed stage whose time is up, carrying leftover time forward
    fn settle_stages(&mut self, dt_ms: f64, intents: &mut Vec<Intent>) {
        let seq = &self.config.sequence;
        let (announce_ms, interlude_ms) = (seq.announce_ms, seq.interlude_ms);
        let mut budget = dt_ms;

        loop {
            match self.stage {
                SequenceStage::AwaitingTrigger => {
                    if !self.trigger_ready() {
                        return;
                    }
                    // Time spent waiting does not count toward the announcement
                    budget = 0.0;
                    self.enter(SequenceStage::Announcing, 0.0);
                    if announce_ms > 0.0 {
                        intents.push(Intent::ShowStartMessage);
                    }
                }
                SequenceStage::Announcing => {
                    self.stage_elapsed_ms += budget;
                    budget = 0.0;
                    if self.stage_elapsed_ms < announce_ms {
                        return;
                    }
                    let overflow = self.stage_elapsed_ms - announce_ms;
                    if announce_ms > 0.0 {
                        intents.push(Intent::ClearStartMessage);
                    }
                    if interlude_ms > 0.0 {
                        self.enter(SequenceStage::Interlude, overflow);
                    } else {
                        self.enter(SequenceStage::Running, overflow);
                        intents.push(Intent::RunStarted);
                    }
                }
                SequenceStage::Interlude => {
                    self.stage_elapsed_ms += budget;
                    budget = 0.0;
                    if self.stage_elapsed_ms < interlude_ms {
                        return;
                    }
                    let overflow = self.stage_elapsed_ms - interlude_ms;
                    self.enter(SequenceStage::Running, overflow);
                    intents.push(Intent::RunStarted);
                }
                SequenceStage::Running => {
                    self.stage_elapsed_ms += budget;
                    return;
                }
                SequenceStage::Resolved | SequenceStage::Lost => return,
            }
        }
    }

    fn run_tick(&mut self, intents: &mut Vec<Intent>) {
        let outcome = tick(&mut self.state, &self.config);
        if !outcome.ran {
            return;
        }

        if outcome.escaped {
            self.enter(SequenceStage::Lost, 0.0);
            intents.push(Intent::ShowGameOver);
            return;
        }

        if outcome.qualifying > 0
            && let Some(sound) = &self.config.progress.hit_sound
        {
            intents.push(Intent::PlaySound(sound.clone()));
        }
        if outcome.revealed_changed {
            intents.push(Intent::RevealText {
                len: self.state.progress.revealed_len(),
            });
        }
        if outcome.convergence_started && self.config.sequence.text_fade.is_some() {
            self.fade = FadeState::Waiting { elapsed_ms: 0.0 };
        }

        if outcome.arrived {
            self.enter(SequenceStage::Resolved, 0.0);
            let action = self.config.sequence.on_resolved.clone();
            log::info!("Run resolved after {} ticks: {:?}", self.state.time_ticks, action);
            let reset = action == TerminalAction::Reset;
            intents.push(Intent::Terminal(action));
            if reset {
                self.restart();
                intents.push(Intent::Restarted);
            }
        }
    }

    fn advance_fade(&mut self, dt_ms: f64, intents: &mut Vec<Intent>) {
        let Some(TextFade {
            delay_ms,
            duration_ms,
        }) = self.config.sequence.text_fade
        else {
            return;
        };

        let mut budget = dt_ms;
        loop {
            match self.fade {
                FadeState::Waiting { elapsed_ms } => {
                    let elapsed_ms = elapsed_ms + budget;
                    budget = 0.0;
                    if elapsed_ms < delay_ms {
                        self.fade = FadeState::Waiting { elapsed_ms };
                        return;
                    }
                    intents.push(Intent::FadeOutText { duration_ms });
                    self.fade = FadeState::Fading {
                        elapsed_ms: elapsed_ms - delay_ms,
                    };
                }
                FadeState::Fading { elapsed_ms } => {
                    let elapsed_ms = elapsed_ms + budget;
                    budget = 0.0;
                    if elapsed_ms < duration_ms {
                        self.fade = FadeState::Fading { elapsed_ms };
                        return;
                    }
                    intents.push(Intent::HideText);
                    self.fade = FadeState::Done;
                }
                FadeState::Idle | FadeState::Done => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Oriented, Preset, SpawnPoint};
    use glam::Vec2;

    fn controller(config: EngineConfig) -> SequenceController {
        SequenceController::new(config, Arena::new(1000.0, 800.0)).unwrap()
    }

    fn immediate_config() -> EngineConfig {
        let mut config = EngineConfig::from_preset(Preset::NoPlatform);
        config.sequence.trigger = Trigger::Immediate;
        config.sequence.announce_ms = 0.0;
        config
    }

    #[test]
    fn test_rejects_zero_arena() {
        let result = SequenceController::new(EngineConfig::default(), Arena::new(0.0, 600.0));
        assert!(matches!(result, Err(EngineError::InvalidArena { .. })));
    }

    #[test]
    fn test_immediate_trigger_without_announcement_runs_first_frame() {
        let mut ctl = controller(immediate_config());
        assert_eq!(ctl.stage(), SequenceStage::AwaitingTrigger);
        let spawn = ctl.state().ball.pos;

        let intents = ctl.advance(Frame::elapsed(16.0));
        assert_eq!(intents, vec![Intent::RunStarted]);
        assert_eq!(ctl.stage(), SequenceStage::Running);
        assert_ne!(ctl.state().ball.pos, spawn);
    }

    #[test]
    fn test_announce_then_interlude_then_run() {
        let mut config = immediate_config();
        config.sequence.announce_ms = 2000.0;
        config.sequence.interlude_ms = 1000.0;
        let mut ctl = controller(config);

        assert_eq!(ctl.advance(Frame::elapsed(16.0)), vec![Intent::ShowStartMessage]);
        assert_eq!(ctl.stage(), SequenceStage::Announcing);

        assert!(ctl.advance(Frame::elapsed(1500.0)).is_empty());
        assert_eq!(ctl.stage(), SequenceStage::Announcing);

        // 2100 ms in: message cleared, 100 ms carried into the interlude
        assert_eq!(ctl.advance(Frame::elapsed(600.0)), vec![Intent::ClearStartMessage]);
        assert_eq!(ctl.stage(), SequenceStage::Interlude);

        assert!(ctl.advance(Frame::elapsed(850.0)).is_empty());
        assert_eq!(ctl.advance(Frame::elapsed(50.0)), vec![Intent::RunStarted]);
        assert_eq!(ctl.stage(), SequenceStage::Running);
    }

    #[test]
    fn test_long_frame_skips_through_stages() {
        let mut config = immediate_config();
        config.sequence.announce_ms = 2000.0;
        config.sequence.interlude_ms = 1000.0;
        let mut ctl = controller(config);
        ctl.advance(Frame::elapsed(0.0));

        let intents = ctl.advance(Frame::elapsed(5000.0));
        assert_eq!(intents, vec![Intent::ClearStartMessage, Intent::RunStarted]);
        assert_eq!(ctl.stage(), SequenceStage::Running);
    }

    #[test]
    fn test_playback_trigger_latches() {
        let mut config = immediate_config();
        config.sequence.trigger = Trigger::Playback { at_seconds: 89.0 };
        let mut ctl = controller(config);

        assert!(ctl.advance(Frame::elapsed(16.0).with_playback(88.5)).is_empty());
        assert_eq!(ctl.stage(), SequenceStage::AwaitingTrigger);

        let intents = ctl.advance(Frame::elapsed(16.0).with_playback(89.0));
        assert_eq!(intents, vec![Intent::RunStarted]);

        // Seeking back does not un-trigger
        ctl.advance(Frame::elapsed(16.0).with_playback(10.0));
        assert_eq!(ctl.stage(), SequenceStage::Running);
    }

    #[test]
    fn test_zero_resize_pauses_physics() {
        let mut ctl = controller(immediate_config());
        ctl.advance(Frame::elapsed(16.0));
        ctl.resize(0.0, 0.0);
        let pos = ctl.state().ball.pos;
        assert!(ctl.advance(Frame::elapsed(16.0)).is_empty());
        assert_eq!(ctl.state().ball.pos, pos);

        ctl.resize(800.0, 600.0);
        ctl.advance(Frame::elapsed(16.0));
        assert_ne!(ctl.state().ball.pos, pos);
    }

    #[test]
    fn test_resize_recenters_ball() {
        let mut ctl = controller(immediate_config());
        for _ in 0..10 {
            ctl.advance(Frame::elapsed(16.0));
        }
        ctl.handle_input(ControlEvent::Resize {
            width: 600.0,
            height: 900.0,
        });
        assert_eq!(ctl.state().ball.pos, Vec2::new(300.0, 41.0));
        assert!(ctl.state().ball.spawn_guard);
    }

    #[test]
    fn test_resolves_with_navigate() {
        let mut config = immediate_config();
        config.arena.spawn = SpawnPoint::Fixed { x: 500.0, y: 400.0 };
        config.convergence.min_radius = Oriented::uniform(8.0);
        config.sequence.on_resolved = TerminalAction::Navigate {
            url: "https://example.com/about".to_string(),
        };
        let mut ctl = controller(config);
        ctl.advance(Frame::elapsed(16.0));
        ctl.state.convergence.activate();

        let mut terminal = Vec::new();
        for _ in 0..2000 {
            let intents = ctl.advance(Frame::elapsed(16.0));
            terminal.extend(
                intents
                    .into_iter()
                    .filter(|i| matches!(i, Intent::Terminal(_))),
            );
            if ctl.stage() == SequenceStage::Resolved {
                break;
            }
        }
        assert_eq!(ctl.stage(), SequenceStage::Resolved);
        assert_eq!(
            terminal,
            vec![Intent::Terminal(TerminalAction::Navigate {
                url: "https://example.com/about".to_string()
            })]
        );

        // No further physics
        let pos = ctl.state().ball.pos;
        assert!(ctl.advance(Frame::elapsed(16.0)).is_empty());
        assert_eq!(ctl.state().ball.pos, pos);
        assert!(ctl.wants_frames());
    }

    #[test]
    fn test_reset_on_resolve_restarts() {
        let mut config = immediate_config();
        config.sequence.on_resolved = TerminalAction::Reset;
        let mut ctl = controller(config);
        ctl.advance(Frame::elapsed(16.0));
        ctl.state.convergence.activate();

        let mut saw_restart = false;
        for _ in 0..2000 {
            if ctl.advance(Frame::elapsed(16.0)).contains(&Intent::Restarted) {
                saw_restart = true;
                break;
            }
        }
        assert!(saw_restart);
        assert_eq!(ctl.stage(), SequenceStage::AwaitingTrigger);
        assert!(!ctl.state().convergence.is_active());
        assert_eq!(ctl.state().progress.hit_count(), 0);
    }

    #[test]
    fn test_text_fade_timeline() {
        let mut config = immediate_config();
        config.sequence.text_fade = Some(TextFade {
            delay_ms: 800.0,
            duration_ms: 1000.0,
        });
        let mut ctl = controller(config);
        ctl.advance(Frame::elapsed(16.0));
        ctl.fade = FadeState::Waiting { elapsed_ms: 0.0 };

        let intents = ctl.advance(Frame::elapsed(700.0));
        assert!(!intents.iter().any(|i| matches!(i, Intent::FadeOutText { .. })));
        let intents = ctl.advance(Frame::elapsed(200.0));
        assert!(intents.contains(&Intent::FadeOutText { duration_ms: 1000.0 }));
        assert!(ctl.view().text_visible);

        let intents = ctl.advance(Frame::elapsed(1000.0));
        assert!(intents.contains(&Intent::HideText));
        assert!(!ctl.view().text_visible);
    }

    #[test]
    fn test_stop_cancels_everything() {
        let mut ctl = controller(immediate_config());
        ctl.advance(Frame::elapsed(16.0));
        ctl.stop();
        assert!(!ctl.wants_frames());
        let pos = ctl.state().ball.pos;
        assert!(ctl.advance(Frame::elapsed(16.0)).is_empty());
        assert_eq!(ctl.state().ball.pos, pos);
    }

    #[test]
    fn test_paddle_input_moves_paddle() {
        let mut ctl = controller(EngineConfig::from_preset(Preset::Tennis));
        let x = ctl.state().paddle.as_ref().unwrap().x;
        ctl.handle_input(ControlEvent::Key(crate::platform::KeyDirection::Right));
        assert_eq!(ctl.state().paddle.as_ref().unwrap().x, x + 75.0);
    }

    #[test]
    fn test_non_finite_resize_keeps_arena() {
        let mut ctl = controller(EngineConfig::from_preset(Preset::Tennis));
        ctl.resize(f32::NAN, 600.0);
        ctl.handle_input(ControlEvent::Resize {
            width: 800.0,
            height: f32::INFINITY,
        });
        assert_eq!(ctl.state().arena, Arena::new(1000.0, 800.0));

        let x = ctl.state().paddle.as_ref().unwrap().x;
        ctl.handle_input(ControlEvent::Key(crate::platform::KeyDirection::Left));
        assert_eq!(ctl.state().paddle.as_ref().unwrap().x, x - 75.0);
    }

    #[test]
    fn test_keep_policy_pulls_ball_inside_shrunk_arena() {
        let mut config = immediate_config();
        config.arena.resize_policy = ResizePolicy::Keep;
        config.arena.spawn = SpawnPoint::Fixed { x: 450.0, y: 200.0 };
        let mut ctl = SequenceController::new(config, Arena::new(500.0, 400.0)).unwrap();
        ctl.advance(Frame::elapsed(16.0));
        assert_eq!(ctl.state().ball.pos.x, 451.2);

        ctl.resize(300.0, 400.0);
        assert_eq!(ctl.state().ball.pos.x, 260.0);

        for _ in 0..10 {
            ctl.advance(Frame::elapsed(16.0));
        }
        // One bounce off the new right wall, then the ball travels away from it
        assert_eq!(ctl.state().progress.hit_count(), 6);
        assert!(ctl.state().ball.pos.x < 260.0);
        assert!(ctl.state().ball.vel.x < 0.0);
    }

    #[test]
    fn test_resolved_ball_follows_resize() {
        let mut config = immediate_config();
        config.arena.spawn = SpawnPoint::Fixed { x: 500.0, y: 400.0 };
        let mut ctl = controller(config);
        ctl.advance(Frame::elapsed(16.0));
        ctl.state.convergence.activate();
        for _ in 0..2000 {
            ctl.advance(Frame::elapsed(16.0));
            if ctl.stage() == SequenceStage::Resolved {
                break;
            }
        }
        assert_eq!(ctl.stage(), SequenceStage::Resolved);
        assert_eq!(ctl.state().ball.radius, 8.0);

        ctl.resize(400.0, 800.0);
        let arena = Arena::new(400.0, 800.0);
        let target = ConvergenceAnimator::target(&arena, &ctl.config().convergence);
        assert_eq!(target, Vec2::new(400.0, 800.0) * Vec2::new(0.56, 0.48));
        assert_eq!(ctl.state().ball.pos, target);
        assert_eq!(ctl.state().ball.radius, 4.0);
        assert_eq!(ctl.stage(), SequenceStage::Resolved);
    }

    #[test]
    fn test_corner_hit_plays_one_sound() {
        let mut config = immediate_config();
        config.arena.spawn = SpawnPoint::Fixed { x: 959.0, y: 759.0 };
        let mut ctl = controller(config);

        let intents = ctl.advance(Frame::elapsed(16.0));
        assert_eq!(
            intents,
            vec![
                Intent::RunStarted,
                Intent::PlaySound("pong".to_string()),
                Intent::RevealText { len: 12 },
            ]
        );
        assert_eq!(ctl.state().progress.hit_count(), 12);
        assert_eq!(ctl.view().revealed, "the   art   ");
    }
}
