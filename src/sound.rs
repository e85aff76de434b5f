//! Sound effect catalogue
//!
//! Every effect is a short list of oscillator sweeps. The recipes are plain
//! data so they can be inspected off the browser; `audio` turns them into
//! Web Audio nodes.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Hero ate a trash item
    Eat,
    /// Hero split
    Split,
    /// Hero ejected mass
    Eject,
    /// Hero popped a virus
    VirusHit,
    /// Hero extracted, or swallowed another player
    CashOut,
    /// Menu hover
    Hover,
    /// Menu click
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One exponential frequency sweep with a decaying gain envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub start_hz: f32,
    pub end_hz: f32,
    /// Random extra added to `start_hz` (0 = fixed pitch)
    pub jitter_hz: f32,
    pub wave: Waveform,
    /// Seconds
    pub duration: f64,
    /// Peak gain before master/sfx volume
    pub gain: f32,
    /// Seconds after trigger
    pub delay: f64,
}

const fn sweep(start_hz: f32, end_hz: f32, wave: Waveform, duration: f64, gain: f32) -> Sweep {
    Sweep {
        start_hz,
        end_hz,
        jitter_hz: 0.0,
        wave,
        duration,
        gain,
        delay: 0.0,
    }
}

const EAT: [Sweep; 1] = [Sweep {
    jitter_hz: 200.0,
    ..sweep(600.0, 800.0, Waveform::Sine, 0.1, 0.05)
}];
const SPLIT: [Sweep; 1] = [sweep(800.0, 200.0, Waveform::Sawtooth, 0.15, 0.1)];
const EJECT: [Sweep; 1] = [sweep(300.0, 100.0, Waveform::Square, 0.1, 0.03)];
// low rumble plus a crackle
const VIRUS_HIT: [Sweep; 2] = [
    sweep(120.0, 35.0, Waveform::Sawtooth, 0.4, 0.15),
    sweep(1400.0, 300.0, Waveform::Square, 0.25, 0.04),
];
const CASH_OUT: [Sweep; 3] = [
    sweep(400.0, 1200.0, Waveform::Triangle, 0.5, 0.1),
    Sweep {
        delay: 0.1,
        ..sweep(600.0, 1500.0, Waveform::Sine, 0.5, 0.1)
    },
    Sweep {
        delay: 0.2,
        ..sweep(800.0, 2000.0, Waveform::Sine, 0.8, 0.05)
    },
];
const HOVER: [Sweep; 1] = [sweep(200.0, 300.0, Waveform::Sine, 0.05, 0.02)];
const CLICK: [Sweep; 1] = [sweep(400.0, 100.0, Waveform::Square, 0.05, 0.05)];

impl SoundEffect {
    pub fn sweeps(self) -> &'static [Sweep] {
        match self {
            SoundEffect::Eat => &EAT,
            SoundEffect::Split => &SPLIT,
            SoundEffect::Eject => &EJECT,
            SoundEffect::VirusHit => &VIRUS_HIT,
            SoundEffect::CashOut => &CASH_OUT,
            SoundEffect::Hover => &HOVER,
            SoundEffect::Click => &CLICK,
        }
    }

    /// Seconds from trigger until the last sweep ends
    pub fn length(self) -> f64 {
        self.sweeps()
            .iter()
            .map(|s| s.delay + s.duration)
            .fold(0.0, f64::max)
    }
}

/// Anything that can play sound effects; triggers are fire-and-forget
pub trait AudioSink {
    fn play(&self, effect: SoundEffect);

    /// Apply volume settings (0.0 mutes)
    fn set_volume(&mut self, _volume: f32) {}

    /// Unlock output after a user gesture
    fn resume(&self) {}
}

/// Sink that discards everything (native builds, tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&self, _effect: SoundEffect) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_effect_has_audible_sweeps() {
        for effect in [
            SoundEffect::Eat,
            SoundEffect::Split,
            SoundEffect::Eject,
            SoundEffect::VirusHit,
            SoundEffect::CashOut,
            SoundEffect::Hover,
            SoundEffect::Click,
        ] {
            let sweeps = effect.sweeps();
            assert!(!sweeps.is_empty(), "{effect:?}");
            for s in sweeps {
                // exponential ramps need strictly positive endpoints
                assert!(s.start_hz > 0.0 && s.end_hz > 0.0);
                assert!(s.gain > 0.0 && s.gain <= 1.0);
                assert!(s.duration > 0.0);
            }
        }
    }

    #[test]
    fn test_cash_out_is_a_staggered_arpeggio() {
        let sweeps = SoundEffect::CashOut.sweeps();
        assert_eq!(sweeps.len(), 3);
        assert!(sweeps.windows(2).all(|w| w[0].delay < w[1].delay));
        assert!((SoundEffect::CashOut.length() - 1.0).abs() < 1e-9);
    }
}
