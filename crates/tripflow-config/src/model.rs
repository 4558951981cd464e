use serde::{de::Deserializer, Deserialize, Serialize};
use std::{fmt, path::PathBuf};

/// Stores booking-flow settings. Every field has a default so partial files load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional directory for wizard progress files. Defaults to `<data dir>/tripflow/progress`.
    pub progress_dir: Option<PathBuf>,
    pub progress_key_prefix: String,
    /// Origin whose links are guarded while the wizard holds unsaved progress.
    pub app_origin: String,
    /// Path prefix of the wizard itself; links under it are never guarded.
    pub wizard_path: String,
    pub auto_confirm_fallback_days: u32,
    pub log_level: LogLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Full `EnvFilter` directive string; takes precedence over `log_level`.
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            progress_dir: None,
            progress_key_prefix: Self::default_progress_key_prefix(),
            app_origin: "http://localhost:3000".into(),
            wizard_path: "/booking".into(),
            auto_confirm_fallback_days: Self::default_auto_confirm_fallback_days(),
            log_level: LogLevel::default(),
            log_filter: None,
        }
    }
}

impl Config {
    pub fn default_progress_key_prefix() -> String {
        "booking-wizard-progress-".into()
    }

    pub fn default_auto_confirm_fallback_days() -> u32 {
        3
    }

    pub fn resolve_progress_dir(&self) -> PathBuf {
        if let Some(path) = &self.progress_dir {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("tripflow").join("progress")
    }

    /// Filter directive for the tracing subscriber.
    pub fn resolve_log_filter(&self) -> String {
        match self.log_filter.as_deref().map(str::trim) {
            Some(filter) if !filter.is_empty() => filter.to_string(),
            _ => format!("tripflow={}", self.log_level),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn from_value(value: Option<String>) -> Self {
        value
            .map(|v| LogLevel::from_str(v.trim()))
            .unwrap_or_default()
    }

    pub fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" | "warning" => LogLevel::Warn,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            _ => LogLevel::Info,
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(LogLevel::from_value(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let cfg: Config = serde_json::from_str(r#"{"log_level": "LOUD"}"#).expect("config");
        assert_eq!(cfg.log_level, LogLevel::Info);
        assert_eq!(cfg.resolve_log_filter(), "tripflow=info");
    }

    #[test]
    fn explicit_filter_wins() {
        let cfg = Config {
            log_level: LogLevel::Trace,
            log_filter: Some("tripflow_core=debug,warn".into()),
            ..Config::default()
        };
        assert_eq!(cfg.resolve_log_filter(), "tripflow_core=debug,warn");

        let blank = Config {
            log_level: LogLevel::Debug,
            log_filter: Some("  ".into()),
            ..Config::default()
        };
        assert_eq!(blank.resolve_log_filter(), "tripflow=debug");
    }

    #[test]
    fn progress_dir_defaults_under_tripflow() {
        let cfg = Config::default();
        assert!(cfg.resolve_progress_dir().ends_with("tripflow/progress"));

        let custom = Config {
            progress_dir: Some(PathBuf::from("/srv/progress")),
            ..Config::default()
        };
        assert_eq!(custom.resolve_progress_dir(), PathBuf::from("/srv/progress"));
    }
}
