//! Keyboard and mouse input state.
//!
//! Keys map to two kinds of actions: held actions are level-triggered and
//! read every step, triggers fire once per key press and wait in a queue
//! until some flow takes them.

use std::collections::HashSet;

use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Held {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
    Boost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    ToggleCamera,
    Interact,
    NextPalette,
    SelectPalette(usize),
    ReleasePointer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Held(Held),
    Trigger(Trigger),
}

pub fn action_for(key: KeyCode) -> Option<Action> {
    use Action::{Held as H, Trigger as T};
    let action = match key {
        KeyCode::KeyW => H(Held::Forward),
        KeyCode::KeyS => H(Held::Backward),
        KeyCode::KeyA | KeyCode::ArrowLeft => H(Held::Left),
        KeyCode::KeyD | KeyCode::ArrowRight => H(Held::Right),
        KeyCode::Space | KeyCode::ArrowUp => H(Held::Up),
        KeyCode::KeyC | KeyCode::ArrowDown => H(Held::Down),
        KeyCode::ShiftLeft | KeyCode::ShiftRight => H(Held::Boost),
        KeyCode::KeyV => T(Trigger::ToggleCamera),
        KeyCode::KeyE | KeyCode::Enter => T(Trigger::Interact),
        KeyCode::Tab => T(Trigger::NextPalette),
        KeyCode::Digit1 => T(Trigger::SelectPalette(0)),
        KeyCode::Digit2 => T(Trigger::SelectPalette(1)),
        KeyCode::Digit3 => T(Trigger::SelectPalette(2)),
        KeyCode::Digit4 => T(Trigger::SelectPalette(3)),
        KeyCode::Digit5 => T(Trigger::SelectPalette(4)),
        KeyCode::Escape => T(Trigger::ReleasePointer),
        _ => return None,
    };
    Some(action)
}

#[derive(Debug, Default, Clone)]
pub struct Controls {
    held: HashSet<Held>,
    triggers: Vec<Trigger>,
    mouse_delta: (f64, f64),
}

impl Controls {
    /// Feeds one key transition. Returns whether the key is bound.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool, repeat: bool) -> bool {
        match action_for(key) {
            Some(Action::Held(held)) => {
                if pressed {
                    self.held.insert(held);
                } else {
                    self.held.remove(&held);
                }
                true
            }
            Some(Action::Trigger(trigger)) => {
                if pressed && !repeat {
                    self.triggers.push(trigger);
                }
                true
            }
            None => false,
        }
    }

    pub fn is_held(&self, held: Held) -> bool {
        self.held.contains(&held)
    }

    /// -1, 0 or 1 depending on which of the two opposing actions is held.
    pub fn axis(&self, negative: Held, positive: Held) -> f32 {
        match (self.is_held(negative), self.is_held(positive)) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    pub fn push_trigger(&mut self, trigger: Trigger) {
        self.triggers.push(trigger);
    }

    /// Removes every queued occurrence of `trigger`; true if there was one.
    pub fn take_trigger(&mut self, trigger: Trigger) -> bool {
        let before = self.triggers.len();
        self.triggers.retain(|t| *t != trigger);
        self.triggers.len() != before
    }

    /// Drains all palette selections in press order.
    pub fn take_palette_triggers(&mut self) -> Vec<Trigger> {
        let (palette, rest): (Vec<_>, Vec<_>) = self
            .triggers
            .drain(..)
            .partition(|t| matches!(t, Trigger::NextPalette | Trigger::SelectPalette(_)));
        self.triggers = rest;
        palette
    }

    pub fn add_mouse_delta(&mut self, dx: f64, dy: f64) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    pub fn take_mouse_delta(&mut self) -> (f64, f64) {
        std::mem::take(&mut self.mouse_delta)
    }

    /// Drops triggers nobody consumed this frame.
    pub fn end_frame(&mut self) {
        self.triggers.clear();
    }

    pub fn clear(&mut self) {
        self.held.clear();
        self.triggers.clear();
        self.mouse_delta = (0.0, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_keys_follow_press_and_release() {
        let mut controls = Controls::default();
        controls.handle_key(KeyCode::KeyW, true, false);
        assert!(controls.is_held(Held::Forward));
        controls.handle_key(KeyCode::KeyW, false, false);
        assert!(!controls.is_held(Held::Forward));
    }

    #[test]
    fn repeated_presses_do_not_retrigger() {
        let mut controls = Controls::default();
        controls.handle_key(KeyCode::KeyV, true, false);
        controls.handle_key(KeyCode::KeyV, true, true);
        controls.handle_key(KeyCode::KeyV, false, false);
        assert!(controls.take_trigger(Trigger::ToggleCamera));
        assert!(!controls.take_trigger(Trigger::ToggleCamera));
    }

    #[test]
    fn opposing_keys_cancel_out() {
        let mut controls = Controls::default();
        controls.handle_key(KeyCode::KeyA, true, false);
        assert_eq!(controls.axis(Held::Left, Held::Right), -1.0);
        controls.handle_key(KeyCode::KeyD, true, false);
        assert_eq!(controls.axis(Held::Left, Held::Right), 0.0);
    }

    #[test]
    fn palette_triggers_keep_order_and_leave_others() {
        let mut controls = Controls::default();
        controls.handle_key(KeyCode::Digit3, true, false);
        controls.handle_key(KeyCode::KeyE, true, false);
        controls.handle_key(KeyCode::Tab, true, false);
        assert_eq!(
            controls.take_palette_triggers(),
            vec![Trigger::SelectPalette(2), Trigger::NextPalette]
        );
        assert!(controls.take_trigger(Trigger::Interact));
    }

    #[test]
    fn mouse_delta_is_consumed_once() {
        let mut controls = Controls::default();
        controls.add_mouse_delta(3.0, -1.0);
        controls.add_mouse_delta(1.0, 1.0);
        assert_eq!(controls.take_mouse_delta(), (4.0, 0.0));
        assert_eq!(controls.take_mouse_delta(), (0.0, 0.0));
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut controls = Controls::default();
        assert!(!controls.handle_key(KeyCode::KeyQ, true, false));
    }
}
