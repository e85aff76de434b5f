//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed!
//! Each [`SoundEffect`] recipe from `sound` becomes a set of scheduled
//! oscillator sweeps.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::settings::Settings;
use crate::sound::{AudioSink, SoundEffect, Sweep, Waveform};

/// Gain floor for exponential ramps (must stay above zero)
const SILENCE: f32 = 0.001;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    volume: f32,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: Settings::default().effective_volume(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut audio = Self::new();
        audio.set_volume(settings.effective_volume());
        audio
    }

    /// Create an oscillator with gain envelope
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

    /// Schedule one sweep relative to the context clock
    fn play_sweep(&self, ctx: &AudioContext, sweep: &Sweep, vol: f32) {
        let start_hz = sweep.start_hz + sweep.jitter_hz * js_sys::Math::random() as f32;
        let Some((osc, gain)) = self.create_osc(ctx, start_hz, oscillator_type(sweep.wave)) else {
            return;
        };
        let t = ctx.current_time() + sweep.delay;
        let end = t + sweep.duration;

        gain.gain().set_value_at_time(sweep.gain * vol, t).ok();
        gain.gain().exponential_ramp_to_value_at_time(SILENCE, end).ok();
        osc.frequency().set_value_at_time(start_hz, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(sweep.end_hz, end)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(end).ok();
    }
}

impl AudioSink for AudioManager {
    fn play(&self, effect: SoundEffect) {
        let vol = self.volume;
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        for sweep in effect.sweeps() {
            self.play_sweep(ctx, sweep, vol);
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Resume audio context (required after user gesture)
    fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }
}

fn oscillator_type(wave: Waveform) -> OscillatorType {
    match wave {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Square => OscillatorType::Square,
        Waveform::Sawtooth => OscillatorType::Sawtooth,
        Waveform::Triangle => OscillatorType::Triangle,
    }
}
