//! Pointer and wheel input delivered to controllers

use glam::Vec2;

/// Event types for plot interaction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlotEvent {
    MousePress {
        position: Vec2,
        button: MouseButton,
        modifiers: Modifiers,
    },
    MouseRelease {
        position: Vec2,
        button: MouseButton,
    },
    MouseMove {
        position: Vec2,
        viewport_px: (u32, u32),
        modifiers: Modifiers,
    },
    MouseWheel {
        delta: f32,
    },
}

/// Mouse button enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Event handler trait for plot interaction
pub trait EventHandler {
    /// Returns `true` when the event changed any camera.
    fn handle_event(&mut self, event: PlotEvent) -> bool;
}
