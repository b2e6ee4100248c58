//! Tracing / logging initialisation helpers.

use std::collections::BTreeMap;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

/// Log level per component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error",
    /// or a full `EnvFilter` directive string
    pub level: String,
    /// Override per component: crate name → level
    pub components: BTreeMap<String, String>,
    /// Emit JSON structured logs (true) or human-readable text (false)
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            components: BTreeMap::new(),
            json: false,
        }
    }
}

impl LogConfig {
    /// Add overrides given as `component=level` pairs. Pairs without a
    /// `=` or with an empty side are skipped.
    pub fn with_components<'a>(mut self, pairs: impl IntoIterator<Item = &'a str>) -> Self {
        for pair in pairs {
            if let Some((component, level)) = pair.split_once('=') {
                let (component, level) = (component.trim(), level.trim());
                if !component.is_empty() && !level.is_empty() {
                    self.components.insert(component.to_string(), level.to_string());
                }
            }
        }
        self
    }

    /// Directive string, e.g. `"info,chainalert_stream=debug"`.
    pub fn directives(&self) -> String {
        let mut directives = self.level.clone();
        for (component, level) in &self.components {
            directives.push_str(&format!(",{}={}", component.replace('-', "_"), level));
        }
        directives
    }
}

/// Install the global subscriber. Call once at startup.
/// An invalid directive string falls back to `info`.
pub fn init_tracing(config: &LogConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_new(config.directives()).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_include_components() {
        let mut config = LogConfig::default();
        config
            .components
            .insert("chainalert-stream".into(), "debug".into());
        config.components.insert("reqwest".into(), "warn".into());
        assert_eq!(
            config.directives(),
            "info,chainalert_stream=debug,reqwest=warn"
        );
    }

    #[test]
    fn components_from_pairs() {
        let config = LogConfig::default().with_components([
            "chainalert-stream=debug",
            " reqwest = warn ",
            "no-level",
            "=trace",
        ]);
        assert_eq!(config.components.len(), 2);
        assert_eq!(
            config.directives(),
            "info,chainalert_stream=debug,reqwest=warn"
        );
    }

    #[test]
    fn second_init_is_an_error_not_a_panic() {
        let config = LogConfig::default();
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
