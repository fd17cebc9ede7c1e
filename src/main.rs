//! courier - A k9s-style terminal dashboard for mail, calendar and contacts.
//!
//! Usage:
//!   courier                      Launch the dashboard
//!   courier --view messages      Start on a resource view
//!   courier --theme light        Use the light palette
//!   courier --help               Show help

use std::fs::File;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use courier_core::{Config, DemoClient, GrantIdentity, MemoryGrantStore, StalePolicy, ViewName};
use courier_tui::{Settings, ThemeVariant};

#[derive(Parser)]
#[command(
    name = "courier",
    version,
    about = "A k9s-style terminal dashboard for mail, calendar and contacts",
    long_about = "courier browses messages, drafts, events, contacts, webhooks and grants \
                  from a single keyboard-driven screen.\n\n\
                  Settings are read from the config file and overridden by these flags."
)]
struct Cli {
    /// Color palette
    #[arg(long)]
    theme: Option<ThemeArg>,

    /// View to open at startup (unknown names open the dashboard)
    #[arg(long)]
    view: Option<String>,

    /// Auto-refresh interval in seconds, 0 to disable
    #[arg(long)]
    refresh: Option<u64>,

    /// Grant to start with
    #[arg(long)]
    grant: Option<String>,

    /// Email address shown for the grant
    #[arg(long)]
    email: Option<String>,

    /// Use the plain `:` prompt instead of the autocomplete palette
    #[arg(long)]
    no_palette: bool,

    /// What to do with a load result that finishes after a newer one
    #[arg(long)]
    stale_results: Option<StaleArg>,

    /// Simulated API latency for the demo backend
    #[arg(long, default_value = "150")]
    latency_ms: u64,

    /// Run without a grant store (grant switching disabled)
    #[arg(long)]
    no_grant_store: bool,

    /// Log file (defaults to the cache directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Write the effective settings to the config file and exit
    #[arg(long)]
    save_settings: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ThemeArg {
    Dark,
    Light,
}

impl From<ThemeArg> for ThemeVariant {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Dark => ThemeVariant::Dark,
            ThemeArg::Light => ThemeVariant::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StaleArg {
    /// Drop results older than the newest request
    Discard,
    /// Apply every result as it arrives
    Apply,
}

impl From<StaleArg> for StalePolicy {
    fn from(arg: StaleArg) -> Self {
        match arg {
            StaleArg::Discard => StalePolicy::Discard,
            StaleArg::Apply => StalePolicy::Apply,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.log_file.clone())?;

    let settings = merge_settings(Settings::load(), &cli);
    if cli.save_settings {
        let path = settings.save().wrap_err("Failed to save settings")?;
        println!("Saved settings to {}", path.display());
        return Ok(());
    }

    let grant = initial_grant(&cli);
    tracing::info!(grant = %grant.id, view = %settings.initial_view, "Starting courier");

    let client = DemoClient::new().with_latency(Duration::from_millis(cli.latency_ms));
    let mut builder = Config::builder();
    builder
        .client(Arc::new(client))
        .grant(grant)
        .refresh_interval(Duration::from_secs(settings.refresh_secs))
        .initial_view(settings.initial_view)
        .theme(settings.theme.to_string())
        .palette(settings.palette)
        .stale_policy(settings.stale_results);
    if !cli.no_grant_store {
        builder.grant_store(Arc::new(MemoryGrantStore::new()));
    }
    let config = builder.build().wrap_err("Invalid configuration")?;

    courier_tui::run(config)
}

/// Apply command-line overrides on top of the settings file.
fn merge_settings(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(theme) = cli.theme {
        settings.theme = theme.into();
    }
    if let Some(view) = &cli.view {
        settings.initial_view = ViewName::from_name(view);
    }
    if let Some(refresh) = cli.refresh {
        settings.refresh_secs = refresh;
    }
    if cli.no_palette {
        settings.palette = false;
    }
    if let Some(stale) = cli.stale_results {
        settings.stale_results = stale.into();
    }
    settings
}

/// The first demo grant, with any overrides from the command line.
fn initial_grant(cli: &Cli) -> GrantIdentity {
    let mut grant = DemoClient::grants().into_iter().next().unwrap_or_default();
    if let Some(id) = &cli.grant {
        grant.id = id.clone();
    }
    if let Some(email) = &cli.email {
        grant.email = email.clone();
    }
    grant
}

/// Log to a file; the terminal belongs to the TUI.
fn init_logging(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("courier")
            .join("courier.log"),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = File::create(&path)
        .wrap_err_with(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::parse_from([
            "courier",
            "--theme",
            "light",
            "--view",
            "events",
            "--refresh",
            "0",
            "--no-palette",
            "--stale-results",
            "apply",
        ]);
        let settings = merge_settings(Settings::default(), &cli);
        assert_eq!(settings.theme, ThemeVariant::Light);
        assert_eq!(settings.initial_view, ViewName::Events);
        assert_eq!(settings.refresh_secs, 0);
        assert!(!settings.palette);
        assert_eq!(settings.stale_results, StalePolicy::Apply);
    }

    #[test]
    fn test_unknown_view_falls_back_to_dashboard() {
        let cli = Cli::parse_from(["courier", "--view", "nope"]);
        let settings = merge_settings(Settings::default(), &cli);
        assert_eq!(settings.initial_view, ViewName::Dashboard);
    }

    #[test]
    fn test_grant_overrides() {
        let cli = Cli::parse_from(["courier", "--grant", "g-42", "--email", "me@example.com"]);
        let grant = initial_grant(&cli);
        assert_eq!(grant.id, "g-42");
        assert_eq!(grant.email, "me@example.com");
        assert_eq!(grant.provider, "google");
    }
}
