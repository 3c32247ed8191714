use std::collections::HashSet;

use super::types::{InputEvent, Key, KeyState};

/// Whole-keyboard state at one point in time.
///
/// A plain value: copies handed out by [`InputPoller::snapshot`] do not change
/// when later events arrive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardSnapshot {
    held: HashSet<Key>,
}

impl KeyboardSnapshot {
    #[inline]
    pub fn is_pressed(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    #[inline]
    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    fn apply(&mut self, key: Key, state: KeyState) {
        match state {
            KeyState::Pressed => {
                self.held.insert(key);
            }
            KeyState::Released => {
                self.held.remove(&key);
            }
        }
    }
}

/// Keyboard poller: caches the keyboard snapshot and refreshes it on key events.
///
/// Non-keyboard events leave the snapshot untouched, except focus loss, which
/// clears it so keys released while unfocused do not stay stuck.
#[derive(Debug, Default)]
pub struct InputPoller {
    snapshot: KeyboardSnapshot,
}

impl InputPoller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::Key { key, state, .. } => {
                self.snapshot.apply(*key, *state);

                if let Some(line) = movement_echo(*key, *state) {
                    log::info!("{line}");
                }
            }
            InputEvent::Focused(false) => {
                self.snapshot = KeyboardSnapshot::default();
            }
            InputEvent::Focused(true) => {}
        }
    }

    /// Returns whether `key` is held according to the last refresh.
    #[inline]
    pub fn is_pressed(&self, key: Key) -> bool {
        self.snapshot.is_pressed(key)
    }

    /// Returns a copy of the cached snapshot.
    #[inline]
    pub fn snapshot(&self) -> KeyboardSnapshot {
        self.snapshot.clone()
    }
}

/// Log line for a movement key event. Every down, repeat and up is echoed.
fn movement_echo(key: Key, state: KeyState) -> Option<String> {
    if !key.is_movement() {
        return None;
    }
    let verb = match state {
        KeyState::Pressed => "pressed",
        KeyState::Released => "released",
    };
    Some(format!("{key} key {verb}"))
}
