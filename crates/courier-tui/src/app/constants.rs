//! Application constants.

use std::time::Duration;

/// Number of rows to move when pressing Ctrl-F/Ctrl-B.
pub const PAGE_SIZE: usize = 20;

/// Number of rows to move when pressing Ctrl-D/Ctrl-U.
pub const HALF_PAGE_SIZE: usize = PAGE_SIZE / 2;

/// Capacity of the UI message channel.
pub const UI_CHANNEL_SIZE: usize = 256;

/// Event loop tick interval in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 50;

/// Period of the status ticker.
pub const STATUS_TICK: Duration = Duration::from_secs(1);

/// How long a flash message stays visible.
pub const FLASH_DURATION: Duration = Duration::from_secs(4);

/// Deadline for list and summary loads.
pub const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Deadline for single-record mutations.
pub const MUTATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for form submissions.
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);
