//! Feedback for step events: sounds, particle bursts and screen shake
//!
//! The simulation only reports what happened; this dispatcher decides how
//! it looks and sounds, honouring the player's settings.

use crate::color;
use crate::settings::Settings;
use crate::sim::{GameEvent, Owner, World};
use crate::sound::{AudioSink, NullAudio, SoundEffect};

/// Shake when a hero cell pops a virus
const VIRUS_SHAKE: f32 = 20.0;
/// Shake when a hero cell swallows another player
const KILL_SHAKE: f32 = 10.0;

/// Burst shape: (particle count, max speed)
const TRASH_BURST: (usize, f32) = (2, 5.0);
const VIRUS_BURST: (usize, f32) = (8, 10.0);
const MERGE_BURST: (usize, f32) = (6, 15.0);
const KILL_BURST: (usize, f32) = (10, 15.0);

pub struct Effects {
    settings: Settings,
    audio: Box<dyn AudioSink>,
}

impl Default for Effects {
    fn default() -> Self {
        Self::new(Settings::default(), Box::new(NullAudio))
    }
}

impl Effects {
    pub fn new(settings: Settings, mut audio: Box<dyn AudioSink>) -> Self {
        audio.set_volume(settings.effective_volume());
        Self { settings, audio }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.audio.set_volume(settings.effective_volume());
        self.settings = settings;
    }

    /// Silence or restore audio (page hidden / visible)
    pub fn set_suspended(&mut self, suspended: bool) {
        let volume = if suspended && self.settings.mute_on_blur {
            0.0
        } else {
            self.settings.effective_volume()
        };
        self.audio.set_volume(volume);
    }

    pub fn play(&self, effect: SoundEffect) {
        self.audio.play(effect);
    }

    pub fn resume_audio(&self) {
        self.audio.resume();
    }

    /// React to every event from one step
    pub fn dispatch(&mut self, world: &mut World, events: &[GameEvent]) {
        let max_particles = self.settings.max_particles();
        let shake = self.settings.effective_screen_shake();

        for event in events {
            match *event {
                GameEvent::TrashEaten { owner, pos, .. } => {
                    if owner.is_hero() {
                        self.audio.play(SoundEffect::Eat);
                        let (count, speed) = TRASH_BURST;
                        world.burst(pos, color::GOLD, speed, count, max_particles);
                    }
                }
                GameEvent::EjectedEaten { .. } => {}
                GameEvent::VirusHit { owner, pos } => {
                    let (count, speed) = VIRUS_BURST;
                    world.burst(pos, color::VIRUS_GREEN, speed, count, max_particles);
                    if owner.is_hero() {
                        self.audio.play(SoundEffect::VirusHit);
                        if shake {
                            world.camera.add_shake(VIRUS_SHAKE);
                        }
                    }
                }
                GameEvent::CellEaten {
                    predator,
                    prey,
                    pos,
                    color,
                } => {
                    let (count, speed) = KILL_BURST;
                    world.burst(pos, color, speed, count, max_particles);
                    if predator.is_hero() {
                        self.audio.play(SoundEffect::CashOut);
                        if shake {
                            world.camera.add_shake(KILL_SHAKE);
                        }
                    }
                    if prey == Owner::Hero {
                        log::debug!("Hero cell swallowed by {:?}", predator);
                    }
                }
                GameEvent::CellsMerged { pos, color, .. } => {
                    let (count, speed) = MERGE_BURST;
                    world.burst(pos, color, speed, count, max_particles);
                }
                GameEvent::HeroSplit { .. } => self.audio.play(SoundEffect::Split),
                GameEvent::HeroEjected { .. } => self.audio.play(SoundEffect::Eject),
                GameEvent::PortalSpawned { .. } | GameEvent::PortalClosed => {}
                GameEvent::PortalOpened { pos } => {
                    log::info!("Portal open at ({:.0}, {:.0})", pos.x, pos.y);
                }
                GameEvent::CashOut { .. } => self.audio.play(SoundEffect::CashOut),
                GameEvent::GameOver => {}
            }
        }
    }
}
