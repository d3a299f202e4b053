use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub middleware: MiddlewareConfig,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Install the logging middleware (default: true).
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Render the committed state in `after` logs (default: true).
    #[serde(default = "default_log_state")]
    pub log_state: bool,
}

/// Built-in middleware toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Install the delay middleware (default: false).
    #[serde(default)]
    pub delay: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            filter: default_filter(),
            log_state: default_log_state(),
        }
    }
}

fn default_logging_enabled() -> bool {
    true
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_log_state() -> bool {
    true
}
