//! Startup settings
//!
//! The experimental condition is read once from the page URL and never changes
//! during a session.

use serde::{Deserialize, Serialize};

/// Experimental condition controlling how computer avatars pick recipients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Condition {
    /// Human receives the ball often and always receives the final throw
    #[default]
    Inclusion,
    /// Human rarely receives the ball, less so as the session goes on
    Exclusion,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Inclusion => "inclusion",
            Condition::Exclusion => "exclusion",
        }
    }

    /// Map the `v` parameter to a condition. Only `"2"` selects exclusion.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("2") => Condition::Exclusion,
            _ => Condition::Inclusion,
        }
    }
}

/// Session settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub condition: Condition,
    /// RNG seed override (native runner only)
    pub seed: Option<u64>,
}

impl Settings {
    /// Query parameter carrying the condition version
    pub const CONDITION_PARAM: &'static str = "v";

    /// Parse settings from a URL query string (`?v=2&...` or `v=2&...`)
    pub fn from_query(query: &str) -> Self {
        let version = query_param(query, Self::CONDITION_PARAM);
        Self {
            condition: Condition::from_param(version.as_deref()),
            seed: None,
        }
    }

    /// Read settings from the page URL (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let search = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        let version = web_sys::UrlSearchParams::new_with_str(&search)
            .ok()
            .and_then(|params| params.get(Self::CONDITION_PARAM));
        let settings = Self {
            condition: Condition::from_param(version.as_deref()),
            seed: None,
        };
        log::info!("Condition: {} (query {:?})", settings.condition.as_str(), search);
        settings
    }

    /// Read settings from the process arguments
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        use clap::Parser;

        let settings = Self::from(Cli::parse());
        log::info!("Condition: {}", settings.condition.as_str());
        settings
    }
}

/// First decoded value for `name` in a query string
pub fn query_param(query: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Command line for the headless runner
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, clap::Parser)]
#[command(name = "ball-toss")]
#[command(about = "Run a headless ball toss session", long_about = None)]
pub struct Cli {
    /// Condition version: 2 selects exclusion, anything else inclusion
    #[arg(short = 'v', long = "v", value_name = "VERSION")]
    pub version: Option<String>,

    /// RNG seed for a reproducible session
    #[arg(long)]
    pub seed: Option<u64>,
}

#[cfg(not(target_arch = "wasm32"))]
impl From<Cli> for Settings {
    fn from(cli: Cli) -> Self {
        Self {
            condition: Condition::from_param(cli.version.as_deref()),
            seed: cli.seed,
        }
    }
}
