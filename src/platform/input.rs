//! Fire/pause input mapping and debouncing

/// A physical thing that can be held down
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputSource {
    /// Keyboard key, by `KeyboardEvent.code`
    Key(String),
    /// Mouse/pen pointer, by `pointerId`
    Pointer(i32),
    /// Touch point, by `Touch.identifier`
    Touch(i32),
}

/// What a key does in the duel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Fire,
    Pause,
}

/// Map a `KeyboardEvent.key` value to an action
pub fn key_action(key: &str) -> Option<KeyAction> {
    match key {
        " " | "Spacebar" | "Enter" => Some(KeyAction::Fire),
        "Escape" => Some(KeyAction::Pause),
        _ => None,
    }
}

/// Tracks held sources so a press-and-hold only fires once
#[derive(Debug, Default, Clone)]
pub struct FireLatch {
    held: Vec<InputSource>,
}

impl FireLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a press. Returns true only for a fresh press.
    pub fn press(&mut self, source: InputSource) -> bool {
        if self.held.contains(&source) {
            return false;
        }
        self.held.push(source);
        true
    }

    /// Register a key-down, rejecting OS auto-repeat
    pub fn press_key(&mut self, code: &str, repeat: bool) -> bool {
        if repeat {
            return false;
        }
        self.press(InputSource::Key(code.to_string()))
    }

    pub fn release(&mut self, source: &InputSource) {
        self.held.retain(|s| s != source);
    }

    /// Forget everything held (focus loss can swallow the release events)
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, source: &InputSource) -> bool {
        self.held.contains(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(key_action(" "), Some(KeyAction::Fire));
        assert_eq!(key_action("Enter"), Some(KeyAction::Fire));
        assert_eq!(key_action("Escape"), Some(KeyAction::Pause));
        assert_eq!(key_action("a"), None);
    }

    #[test]
    fn test_hold_fires_once() {
        let mut latch = FireLatch::new();
        let space = InputSource::Key("Space".into());
        assert!(latch.press(space.clone()));
        assert!(!latch.press(space.clone()));
        latch.release(&space);
        assert!(latch.press(space));
    }

    #[test]
    fn test_auto_repeat_rejected() {
        let mut latch = FireLatch::new();
        assert!(!latch.press_key("Space", true));
        assert!(latch.press_key("Space", false));
        assert!(!latch.press_key("Space", false));
    }

    #[test]
    fn test_sources_are_independent() {
        let mut latch = FireLatch::new();
        assert!(latch.press(InputSource::Touch(0)));
        assert!(latch.press(InputSource::Pointer(1)));
        assert!(latch.is_held(&InputSource::Touch(0)));
        latch.release_all();
        assert!(!latch.is_held(&InputSource::Touch(0)));
        assert!(latch.press(InputSource::Touch(0)));
    }
}
