//! Runtime configuration snapshot.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::client::{ApiClient, GrantStore};
use crate::model::{GrantIdentity, ViewName};

/// What to do with a load result that arrives after a newer load was issued.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StalePolicy {
    /// Drop results older than the newest load for the same target.
    #[default]
    Discard,
    /// Apply every result in arrival order; the last one wins.
    Apply,
}

/// Configuration consumed by the kernel at construction.
///
/// Only the active grant changes afterwards, through a grant switch.
#[derive(Clone, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Config {
    /// API used by every view.
    pub client: Arc<dyn ApiClient>,

    /// Store for the default grant; grant switching is unavailable without one.
    #[builder(default, setter(strip_option))]
    pub grant_store: Option<Arc<dyn GrantStore>>,

    /// Grant the session starts with.
    #[builder(setter(into))]
    pub grant: GrantIdentity,

    /// Auto-refresh interval; zero disables auto refresh.
    #[builder(default = "Duration::from_secs(30)")]
    pub refresh_interval: Duration,

    /// View shown at startup.
    #[builder(default)]
    pub initial_view: ViewName,

    /// Theme name, `dark` or `light`.
    #[builder(default = "\"dark\".to_string()", setter(into))]
    pub theme: String,

    /// Whether `:` opens the autocomplete palette instead of the plain prompt.
    #[builder(default = "true")]
    pub palette: bool,

    #[builder(default)]
    pub stale_policy: StalePolicy,
}

impl ConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.grant {
            Some(grant) if grant.id.trim().is_empty() => Err("Grant id cannot be empty".to_string()),
            Some(_) => Ok(()),
            None => Err("Grant is required".to_string()),
        }
    }
}

impl Config {
    /// Create a new config builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("grant", &self.grant)
            .field("grant_store", &self.grant_store.is_some())
            .field("refresh_interval", &self.refresh_interval)
            .field("initial_view", &self.initial_view)
            .field("theme", &self.theme)
            .field("palette", &self.palette)
            .field("stale_policy", &self.stale_policy)
            .finish_non_exhaustive()
    }
}
