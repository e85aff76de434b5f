//! One play session
//!
//! Bundles the world with everything the frame loop needs around it: input
//! capture, frame timing, effects and the end-of-session callbacks. The
//! callbacks are one-shot; whichever ending happens first fires once and the
//! session then stays frozen.

use crate::config::GameConfig;
use crate::effects::Effects;
use crate::platform::{FrameClock, InputState};
use crate::sim::{self, Termination, TickInput, World};
use crate::tuning::Tuning;

type Callback = Box<dyn FnOnce(u32)>;

/// End-of-session notifications (both receive the score)
#[derive(Default)]
pub struct SessionHooks {
    pub on_game_over: Option<Callback>,
    pub on_cash_out: Option<Callback>,
}

impl SessionHooks {
    pub fn new(on_game_over: impl FnOnce(u32) + 'static, on_cash_out: impl FnOnce(u32) + 'static) -> Self {
        Self {
            on_game_over: Some(Box::new(on_game_over)),
            on_cash_out: Some(Box::new(on_cash_out)),
        }
    }

    fn fire(&mut self, termination: Termination) {
        let hook = match termination {
            Termination::GameOver => self.on_game_over.take(),
            Termination::CashOut(_) => self.on_cash_out.take(),
        };
        // the other ending can no longer happen
        self.on_game_over = None;
        self.on_cash_out = None;
        if let Some(hook) = hook {
            hook(termination.score());
        }
    }
}

pub struct Session {
    config: GameConfig,
    world: World,
    input: InputState,
    clock: FrameClock,
    effects: Effects,
    hooks: SessionHooks,
    outcome: Option<Termination>,
}

impl Session {
    pub fn new(config: GameConfig, tuning: Tuning, seed: u64, effects: Effects, hooks: SessionHooks) -> Self {
        let world = World::new(&config, tuning, seed);
        log::info!("Session started for {} (wager {})", config.nickname, config.wager);
        Self {
            config,
            world,
            input: InputState::new(),
            clock: FrameClock::new(),
            effects,
            hooks,
            outcome: None,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut Effects {
        &mut self.effects
    }

    pub fn clock_mut(&mut self) -> &mut FrameClock {
        &mut self.clock
    }

    pub fn outcome(&self) -> Option<Termination> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Estimated earnings for the final score (0 until the session ends)
    pub fn estimated_earnings(&self) -> f64 {
        self.outcome
            .map(|t| self.config.estimated_earnings(t.score()))
            .unwrap_or(0.0)
    }

    /// Run one display frame at timestamp `now_ms`. Returns the termination
    /// on the frame the session ends.
    pub fn frame(&mut self, now_ms: f64) -> Option<Termination> {
        let dt = self.clock.tick(now_ms);
        let input = self.input.take_tick_input();
        self.advance(&input, dt)
    }

    /// Step with explicit input and elapsed frames
    pub fn advance(&mut self, input: &TickInput, dt: f32) -> Option<Termination> {
        if self.outcome.is_some() {
            return None;
        }

        let outcome = sim::step(&mut self.world, input, dt);
        self.effects.dispatch(&mut self.world, &outcome.events);

        let termination = outcome.termination?;
        log::info!("Session over: {:?}", termination);
        self.outcome = Some(termination);
        self.hooks.fire(termination);
        Some(termination)
    }
}
