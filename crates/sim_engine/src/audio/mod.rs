//! Audio contract
//!
//! Playback is external. The core only asks for named sounds to be played.

use std::cell::RefCell;
use std::rc::Rc;

use log::trace;

/// Sound sink supplied by the host
pub trait AudioPlayer {
    /// Play the sound registered under `name`
    fn play_sound(&mut self, name: &str);
}

/// Audio player that ignores every request
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioPlayer for NullAudio {
    fn play_sound(&mut self, name: &str) {
        trace!("NullAudio: '{name}'");
    }
}

/// Audio player that remembers what it was asked to play
///
/// Clones share the same log, so a host can keep one clone and hand the other
/// to the engine.
#[derive(Debug, Default, Clone)]
pub struct RecordingAudio {
    played: Rc<RefCell<Vec<String>>>,
}

impl RecordingAudio {
    /// Empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sounds in request order
    pub fn played(&self) -> Vec<String> {
        self.played.borrow().clone()
    }
}

impl AudioPlayer for RecordingAudio {
    fn play_sound(&mut self, name: &str) {
        self.played.borrow_mut().push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_log() {
        let handle = RecordingAudio::new();
        let mut player: Box<dyn AudioPlayer> = Box::new(handle.clone());
        player.play_sound("flap");
        player.play_sound("ting");
        assert_eq!(handle.played(), vec!["flap", "ting"]);
    }
}
