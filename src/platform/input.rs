//! Input capture state
//!
//! Browser listeners write into [`InputState`]; the frame loop drains it once
//! per frame. The pointer is latest-value-wins; split and eject are
//! edge-triggered so holding a key fires once.

use std::collections::HashSet;

use glam::Vec2;

use crate::sim::TickInput;

pub const SPLIT_KEY: &str = "Space";
pub const EJECT_KEY: &str = "KeyW";

#[derive(Debug, Default)]
pub struct InputState {
    pointer: Vec2,
    held: HashSet<String>,
    split: bool,
    eject: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer moved to client position (`x`, `y`) on a `width` × `height`
    /// viewport; stored as the offset from the viewport centre
    pub fn pointer_moved(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.pointer = Vec2::new(x - width / 2.0, y - height / 2.0);
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Key went down. Returns true when this is a fresh press of a game key
    /// (callers use it to suppress the browser default).
    pub fn key_down(&mut self, code: &str) -> bool {
        if !self.held.insert(code.to_string()) {
            return false;
        }
        match code {
            SPLIT_KEY => {
                self.split = true;
                true
            }
            EJECT_KEY => {
                self.eject = true;
                true
            }
            _ => false,
        }
    }

    pub fn key_up(&mut self, code: &str) {
        self.held.remove(code);
    }

    /// Forget held keys (window lost focus, so key-ups may never arrive)
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// Commands for this frame; clears the edge-triggered flags
    pub fn take_tick_input(&mut self) -> TickInput {
        TickInput {
            pointer: self.pointer,
            split: std::mem::take(&mut self.split),
            eject: std::mem::take(&mut self.eject),
        }
    }
}
