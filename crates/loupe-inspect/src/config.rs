#![forbid(unsafe_code)]

//! Inspector configuration.
//!
//! Sources, lowest precedence first: [`InspectorConfig::default`], a JSON
//! options object ([`InspectorConfig::from_json`]), environment variables
//! ([`InspectorConfig::apply_env_with`]). Invalid environment values are
//! ignored with a warning; invalid JSON is an error.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use loupe_core::{ToolMode, warn};

use crate::selection::DEFAULT_LINK_MARKER;
use crate::spacing::Edges;

pub const ENV_DEFAULT_TOOL: &str = "LOUPE_DEFAULT_TOOL";
pub const ENV_INFO_TTL_MS: &str = "LOUPE_INFO_TTL_MS";
pub const ENV_SPACING_EDGES: &str = "LOUPE_SPACING_EDGES";
pub const ENV_DIAGNOSTICS: &str = "LOUPE_DIAGNOSTICS";

/// Default info popup lifetime.
pub const DEFAULT_INFO_TTL_MS: u64 = 3000;

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// The options object did not parse.
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid inspector options: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Inspector options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InspectorConfig {
    /// Mode installed by `activate`.
    pub default_tool: ToolMode,
    /// Info popup lifetime in milliseconds.
    pub info_ttl_ms: u64,
    /// Edges that get spacing bands.
    #[serde(deserialize_with = "deserialize_edges")]
    pub spacing_edges: Edges,
    /// Attribute that marks script-driven links (clicks keep their default).
    pub link_marker_attr: String,
    /// Record a [`DiagnosticLog`](crate::diagnostics::DiagnosticLog).
    pub diagnostics: bool,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            default_tool: ToolMode::Inspect,
            info_ttl_ms: DEFAULT_INFO_TTL_MS,
            spacing_edges: Edges::TOP,
            link_marker_attr: DEFAULT_LINK_MARKER.to_owned(),
            diagnostics: false,
        }
    }
}

fn deserialize_edges<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Edges, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl InspectorConfig {
    /// Defaults overridden by the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().apply_env_with(|key| std::env::var(key).ok())
    }

    /// Parse a JSON options object. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Override fields from `get_env`. Unparseable values are ignored.
    #[must_use]
    pub fn apply_env_with<F>(mut self, get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = get_env(ENV_DEFAULT_TOOL) {
            match value.parse() {
                Ok(mode) => self.default_tool = mode,
                Err(err) => {
                    warn!(%err, "ignoring {ENV_DEFAULT_TOOL}");
                }
            }
        }
        if let Some(value) = get_env(ENV_INFO_TTL_MS) {
            match value.trim().parse() {
                Ok(ms) => self.info_ttl_ms = ms,
                Err(_) => {
                    warn!(value = %value, "ignoring {ENV_INFO_TTL_MS}");
                }
            }
        }
        if let Some(value) = get_env(ENV_SPACING_EDGES) {
            match value.parse() {
                Ok(edges) => self.spacing_edges = edges,
                Err(err) => {
                    warn!(%err, "ignoring {ENV_SPACING_EDGES}");
                }
            }
        }
        if let Some(value) = get_env(ENV_DIAGNOSTICS)
            && let Some(enabled) = parse_bool(&value)
        {
            self.diagnostics = enabled;
        }
        self
    }

    #[must_use]
    pub fn with_default_tool(mut self, mode: ToolMode) -> Self {
        self.default_tool = mode;
        self
    }

    #[must_use]
    pub fn with_info_ttl(mut self, ttl: Duration) -> Self {
        self.info_ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn with_spacing_edges(mut self, edges: Edges) -> Self {
        self.spacing_edges = edges;
        self
    }

    #[must_use]
    pub fn with_link_marker_attr(mut self, attr: impl Into<String>) -> Self {
        self.link_marker_attr = attr.into();
        self
    }

    #[must_use]
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Info popup lifetime.
    #[must_use]
    pub fn info_ttl(&self) -> Duration {
        Duration::from_millis(self.info_ttl_ms)
    }
}
