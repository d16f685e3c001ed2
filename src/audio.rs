//! Hit sounds via the Web Audio API
//!
//! Sounds are synthesized on the fly; there are no asset files to load.
//! Playback is fire-and-forget and every failure is swallowed.

use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

/// Sounds the engine can request by id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    /// Short two-tone blip on a qualifying collision
    Pong,
    /// Falling tones when the ball slips past the paddle
    GameOver,
}

impl Sound {
    /// Map a configured sound id
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "pong" | "hit" => Some(Sound::Pong),
            "game_over" => Some(Sound::GameOver),
            _ => None,
        }
    }
}

pub struct AudioManager {
    ctx: Option<AudioContext>,
    volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - hit sounds disabled");
        }
        Self {
            ctx,
            volume: 0.6,
            muted: false,
        }
    }

    /// Resume the context (browsers require a user gesture first)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Play a sound by its configured id; unknown ids are logged and skipped
    pub fn play_id(&self, id: &str) {
        match Sound::from_id(id) {
            Some(sound) => self.play(sound),
            None => log::warn!("Unknown sound id {id:?}"),
        }
    }

    pub fn play(&self, sound: Sound) {
        if self.muted || self.volume <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match sound {
            Sound::Pong => self.play_pong(ctx),
            Sound::GameOver => self.play_game_over(ctx),
        }
    }

    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Square-wave click with a quick pitch drop
    fn play_pong(&self, ctx: &AudioContext) {
        let Some((osc, gain)) = self.create_osc(ctx, 480.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(self.volume * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.09)
            .ok();
        osc.frequency().set_value_at_time(480.0, t).ok();
        osc.frequency().set_value_at_time(240.0, t + 0.04).ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.1).ok();
    }

    fn play_game_over(&self, ctx: &AudioContext) {
        for (i, freq) in [400.0, 300.0, 200.0].iter().enumerate() {
            let delay = i as f64 * 0.18;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(self.volume * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.3).ok();
            }
        }
    }
}
