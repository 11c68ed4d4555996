//! Tracing / logging initialisation helpers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

/// Log level per component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// Override per component: crate name → level
    #[serde(default)]
    pub components: BTreeMap<String, String>,
    /// Emit JSON structured logs (true) or human-readable text (false)
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: BTreeMap::new(),
            json: false,
        }
    }
}

impl LogConfig {
    /// `debug` globally, `trace` for the collect pipeline.
    pub fn verbose() -> Self {
        Self::default()
            .with_level("debug")
            .with_component("chunkmap-core", "trace")
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_component(mut self, component: impl Into<String>, level: impl Into<String>) -> Self {
        self.components.insert(component.into(), level.into());
        self
    }

    /// Filter directive string, e.g. `"info,chunkmap_core=debug"`.
    pub fn directives(&self) -> String {
        let mut directives = self.level.clone();
        for (component, level) in &self.components {
            directives.push(',');
            directives.push_str(&component.replace('-', "_"));
            directives.push('=');
            directives.push_str(level);
        }
        directives
    }
}

/// Initialise the global subscriber with the given log config.
///
/// `RUST_LOG`, when set, wins over the configured directives. Fails if a
/// global subscriber is already installed.
pub fn init_tracing(config: &LogConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.directives()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_thread_names(true))
            .try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_normalise_crate_names() {
        let cfg = LogConfig::default()
            .with_level("warn")
            .with_component("chunkmap-core", "debug")
            .with_component("chunkmap-cli", "info");
        assert_eq!(cfg.directives(), "warn,chunkmap_cli=info,chunkmap_core=debug");
    }

    #[test]
    fn verbose_traces_core() {
        let cfg = LogConfig::verbose();
        assert_eq!(cfg.directives(), "debug,chunkmap_core=trace");
        assert!(!cfg.json);
    }

    #[test]
    fn deserialize_with_defaults() {
        let cfg: LogConfig = serde_json::from_str(r#"{ "json": true }"#).unwrap();
        assert_eq!(cfg.level, "info");
        assert!(cfg.components.is_empty());
        assert!(cfg.json);
    }
}
