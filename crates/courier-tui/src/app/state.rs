//! Kernel state owned by the dispatcher.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::Local;

use courier_core::ChordDetector;

use super::constants::FLASH_DURATION;

/// Input mode. At most one of the input modes is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// Vim-style `:` command line.
    CommandPrompt,
    /// `/` filter line.
    FilterPrompt,
    /// Autocomplete command palette.
    Palette,
}

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Info,
    Warn,
    Error,
}

/// Transient status-line message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
    pub expires_at: Instant,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            expires_at: Instant::now() + FLASH_DURATION,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Text shown in the header, recomputed on every status tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLine {
    pub clock: String,
    pub grant: String,
    /// Seconds until the next auto refresh, or `None` when paused.
    pub countdown: Option<u64>,
}

impl StatusLine {
    pub fn compute(grant: &str, interval: Duration, since_load: Duration) -> Self {
        let countdown = (!interval.is_zero())
            .then(|| interval.saturating_sub(since_load).as_secs());
        Self {
            clock: Local::now().format("%H:%M:%S").to_string(),
            grant: grant.to_string(),
            countdown,
        }
    }

    /// Countdown label for the header.
    pub fn refresh_label(&self) -> String {
        match self.countdown {
            Some(secs) => format!("refresh in {secs}s"),
            None => "paused".to_string(),
        }
    }
}

/// Kernel flags. Only the dispatcher mutates these.
#[derive(Debug, Default)]
pub struct KernelState {
    pub mode: Mode,
    pub chord: ChordDetector,
    pub flash: Option<Flash>,
    pub status: StatusLine,
    pub quit: bool,
}

impl KernelState {
    pub fn flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        let flash = Flash::new(level, message);
        match level {
            FlashLevel::Error => tracing::warn!(message = %flash.message, "Flash"),
            _ => tracing::debug!(message = %flash.message, "Flash"),
        }
        self.flash = Some(flash);
    }

    /// Drop the flash once it has expired.
    pub fn expire_flash(&mut self, now: Instant) {
        if self.flash.as_ref().is_some_and(|flash| flash.is_expired(now)) {
            self.flash = None;
        }
    }
}

/// Shared `running` flag. The ticker stops for good once it reads false.
#[derive(Debug, Clone)]
pub struct RunFlag(Arc<Mutex<bool>>);

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl RunFlag {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(true)))
    }

    pub fn is_running(&self) -> bool {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn stop(&self) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_expires() {
        let mut state = KernelState::default();
        state.flash(FlashLevel::Info, "hello");
        state.expire_flash(Instant::now());
        assert!(state.flash.is_some());
        state.expire_flash(Instant::now() + FLASH_DURATION);
        assert!(state.flash.is_none());
    }

    #[test]
    fn test_status_countdown() {
        let status = StatusLine::compute("a@example.com", Duration::from_secs(30), Duration::from_secs(12));
        assert_eq!(status.countdown, Some(18));
        assert_eq!(status.refresh_label(), "refresh in 18s");

        let paused = StatusLine::compute("a@example.com", Duration::ZERO, Duration::from_secs(12));
        assert_eq!(paused.refresh_label(), "paused");
    }

    #[test]
    fn test_run_flag_is_shared() {
        let flag = RunFlag::new();
        let other = flag.clone();
        assert!(other.is_running());
        flag.stop();
        assert!(!other.is_running());
    }
}
