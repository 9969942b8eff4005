//! Keyboard state owned by the application loop and passed by reference
//! into the per-frame callback — no hidden shared state between the
//! event handler and the render call.

use winit::event::KeyEvent;

use crate::renderer::atlas::Glyph;

/// Key scalars at or above this are ignored, matching the demo's
/// accepted key-code range.
pub const MAX_KEY_SCALAR: u32 = 1024;

/// Per-frame input snapshot. The core only consumes the "currently
/// selected glyph": an 8-bit projection of the last accepted key event.
#[derive(Debug, Clone)]
pub struct InputState {
    selected: Glyph,
}

impl InputState {
    pub fn new(initial: Glyph) -> Self {
        Self { selected: initial }
    }

    /// Feed one key scalar (press or repeat). Scalars in
    /// `0..MAX_KEY_SCALAR` are accepted and truncated to 8 bits;
    /// anything else is ignored. Returns whether the event was accepted.
    pub fn accept_scalar(&mut self, code: u32) -> bool {
        if code < MAX_KEY_SCALAR {
            self.selected = (code & 0xFF) as Glyph;
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> Glyph {
        self.selected
    }
}

/// Project a winit key event to a numeric scalar: the first printable
/// character the key produced. Modifier and navigation keys yield
/// `None` and leave the selection unchanged.
pub fn key_scalar(event: &KeyEvent) -> Option<u32> {
    event
        .text
        .as_ref()?
        .chars()
        .find(|ch| !ch.is_control())
        .map(|ch| ch as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_projects_ascii() {
        let mut input = InputState::new(b'A');
        assert!(input.accept_scalar('z' as u32));
        assert_eq!(input.selected(), b'z');
    }

    #[test]
    fn truncates_to_eight_bits() {
        let mut input = InputState::new(0);
        assert!(input.accept_scalar(0x141)); // 'Ł'
        assert_eq!(input.selected(), 0x41);
    }

    #[test]
    fn rejects_scalars_at_or_above_limit() {
        let mut input = InputState::new(b'A');
        assert!(!input.accept_scalar(MAX_KEY_SCALAR));
        assert!(!input.accept_scalar(0x2764)); // '❤'
        assert_eq!(input.selected(), b'A', "rejected events must not change the selection");
    }

    #[test]
    fn boundary_scalar_just_below_limit_is_accepted() {
        let mut input = InputState::new(0);
        assert!(input.accept_scalar(MAX_KEY_SCALAR - 1));
        assert_eq!(input.selected(), ((MAX_KEY_SCALAR - 1) & 0xFF) as u8);
    }
}
