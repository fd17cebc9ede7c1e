//! Terminal user interface for courier.
//!
//! A k9s-style dashboard over a messaging and calendar API, built with
//! ratatui. One modal dispatcher owns the screen: it routes every key to the
//! command palette, a prompt, the chord detector or the view on top of the
//! page stack, and merges the results of background API calls back into the
//! views.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use courier_core::{Config, DemoClient, GrantIdentity};
//!
//! let config = Config::builder()
//!     .client(Arc::new(DemoClient::new()))
//!     .grant(GrantIdentity::new("grant-demo-1", "alex@example.com", "google"))
//!     .build()
//!     .unwrap();
//! courier_tui::run(config).unwrap();
//! ```
//!
//! # Keyboard Navigation
//!
//! - `j`/`k` - Move down/up
//! - `gg`/`G` - Jump to top/bottom
//! - `Enter` - Open the selected item
//! - `Esc` - Clear the filter or go back
//! - `:` - Command palette
//! - `/` - Filter
//! - `dd` - Delete
//! - `?` - Help
//! - `Ctrl-c` - Quit

pub mod app;
mod event;
pub mod settings;
pub mod theme;
mod ui;
pub mod views;

use courier_core::Config;

pub use app::{App, AppResult};
pub use settings::Settings;
pub use theme::{Theme, ThemeVariant};

/// Run the TUI until the user quits.
pub fn run(config: Config) -> AppResult<()> {
    // Create tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    let terminal = ratatui::init();
    // The app spawns its first load on construction, so build it inside the runtime
    let result = rt.block_on(async move { App::new(config).run(terminal).await });
    ratatui::restore();

    // Shutdown runtime immediately to cancel background tasks
    rt.shutdown_timeout(std::time::Duration::from_millis(100));

    result
}
