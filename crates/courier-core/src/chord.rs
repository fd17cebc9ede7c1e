//! Two-key timed sequences such as `gg` and `dd`.

use std::time::{Duration, Instant};

/// How long the first key of a chord stays pending.
pub const CHORD_TIMEOUT: Duration = Duration::from_millis(500);

/// Keys that start a chord.
pub const CHORD_KEYS: [char; 2] = ['g', 'd'];

/// Result of feeding a key to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordOutcome {
    /// The key is not chord-eligible; state is untouched.
    NotChord,
    /// The key was recorded and is waiting for its pair.
    Pending,
    /// The same key arrived twice within the timeout.
    Complete(char),
}

/// Recognizes repeated chord keys within [`CHORD_TIMEOUT`].
#[derive(Debug, Clone, Default)]
pub struct ChordDetector {
    pending: Option<(char, Instant)>,
}

impl ChordDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_chord_key(key: char) -> bool {
        CHORD_KEYS.contains(&key)
    }

    /// Feed a key pressed at `now`.
    pub fn press(&mut self, key: char, now: Instant) -> ChordOutcome {
        if !Self::is_chord_key(key) {
            return ChordOutcome::NotChord;
        }

        match self.pending {
            Some((pending, at)) if pending == key && now.saturating_duration_since(at) < CHORD_TIMEOUT => {
                self.pending = None;
                ChordOutcome::Complete(key)
            }
            _ => {
                self.pending = Some((key, now));
                ChordOutcome::Pending
            }
        }
    }

    /// The pending key, if it has not yet expired at `now`.
    pub fn pending(&self, now: Instant) -> Option<char> {
        self.pending
            .filter(|(_, at)| now.saturating_duration_since(*at) < CHORD_TIMEOUT)
            .map(|(key, _)| key)
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_press_completes() {
        let mut chord = ChordDetector::new();
        let start = Instant::now();
        assert_eq!(chord.press('g', start), ChordOutcome::Pending);
        assert_eq!(
            chord.press('g', start + Duration::from_millis(200)),
            ChordOutcome::Complete('g')
        );
        assert_eq!(chord.pending(start), None);
    }

    #[test]
    fn test_expired_key_restarts() {
        let mut chord = ChordDetector::new();
        let start = Instant::now();
        chord.press('g', start);
        let later = start + Duration::from_millis(600);
        assert_eq!(chord.press('g', later), ChordOutcome::Pending);
        assert_eq!(chord.pending(later), Some('g'));
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let mut chord = ChordDetector::new();
        let start = Instant::now();
        chord.press('d', start);
        assert_eq!(chord.press('d', start + CHORD_TIMEOUT), ChordOutcome::Pending);
    }

    #[test]
    fn test_different_key_replaces_pending() {
        let mut chord = ChordDetector::new();
        let start = Instant::now();
        chord.press('g', start);
        assert_eq!(chord.press('d', start), ChordOutcome::Pending);
        assert_eq!(chord.pending(start), Some('d'));
    }

    #[test]
    fn test_other_keys_leave_state_alone() {
        let mut chord = ChordDetector::new();
        let start = Instant::now();
        chord.press('g', start);
        assert_eq!(chord.press('j', start), ChordOutcome::NotChord);
        assert_eq!(chord.press('g', start), ChordOutcome::Complete('g'));
    }
}
