use std::collections::HashMap;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::api::types::BlockType;
use crate::error::{PlannerError, Result};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    pub url: String,
    #[serde(default)]
    pub api_token: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScheduleConfig {
    /// Type used when Enter commits text that is neither a command nor a match.
    #[serde(default = "default_catch_all")]
    pub catch_all_type: BlockType,
    #[serde(default = "default_task_minutes")]
    pub default_task_minutes: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            catch_all_type: default_catch_all(),
            default_task_minutes: default_task_minutes(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Defaults to `dayplan.log` next to the config file.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct KeybindingsConfig {
    #[serde(default)]
    pub bindings: HashMap<String, String>,
}

fn default_catch_all() -> BlockType {
    BlockType::Personal
}

fn default_task_minutes() -> u32 {
    15
}

fn default_log_level() -> String {
    "info".into()
}

impl AppConfig {
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        let config: AppConfig = Figment::new()
            .merge(Serialized::defaults(AppConfig::defaults()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("DAYPLAN_").split("__"))
            .extract()
            .map_err(|e| PlannerError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend.url.is_empty() {
            return Err(PlannerError::Config("backend.url is required".into()));
        }
        if matches!(
            self.schedule.catch_all_type,
            BlockType::Routine | BlockType::Event
        ) {
            return Err(PlannerError::Config(
                "schedule.catch_all_type cannot be routine or event".into(),
            ));
        }
        if self.schedule.default_task_minutes == 0 {
            return Err(PlannerError::Config(
                "schedule.default_task_minutes must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn config_dir() -> Option<PathBuf> {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(|xdg| PathBuf::from(xdg).join("dayplan"))
            .or_else(|| {
                directories::BaseDirs::new()
                    .map(|dirs| dirs.home_dir().join(".config").join("dayplan"))
            })
    }

    pub fn log_path(&self, config_path: &Path) -> PathBuf {
        self.logging.file.clone().unwrap_or_else(|| {
            config_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("dayplan.log")
        })
    }

    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = r#"[backend]
url = "http://localhost:8080/api"
api_token = ""  # or set DAYPLAN_BACKEND__API_TOKEN

[schedule]
catch_all_type = "personal"
default_task_minutes = 15

[logging]
level = "info"  # overridden by RUST_LOG
# file = "/tmp/dayplan.log"

# Override global keys:
# [keybindings.bindings]
# quit = "Ctrl+q"
# reload = "Ctrl+r"
"#;

        std::fs::write(path, content)?;
        Ok(())
    }

    fn defaults() -> Self {
        Self {
            backend: BackendConfig {
                url: String::new(),
                api_token: String::new(),
            },
            schedule: ScheduleConfig::default(),
            logging: LoggingConfig::default(),
            keybindings: KeybindingsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_valid_config_from_toml() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[backend]
url = "https://plan.example.com/api"
api_token = "token-123"

[schedule]
catch_all_type = "admin"
default_task_minutes = 20

[logging]
level = "debug"
"#,
        );

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.backend.url, "https://plan.example.com/api");
        assert_eq!(config.backend.api_token, "token-123");
        assert_eq!(config.schedule.catch_all_type, BlockType::Admin);
        assert_eq!(config.schedule.default_task_minutes, 20);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn defaults_apply_for_missing_optional_sections() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[backend]
url = "http://localhost:8080/api"
"#,
        );

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.schedule.catch_all_type, BlockType::Personal);
        assert_eq!(config.schedule.default_task_minutes, 15);
        assert_eq!(config.logging.level, "info");
        assert!(config.keybindings.bindings.is_empty());
        assert_eq!(config.log_path(&path), tmp.path().join("dayplan.log"));
    }

    #[test]
    fn validate_fails_without_backend_url() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[backend]
url = ""
"#,
        );

        let msg = AppConfig::load_from_path(&path).unwrap_err().to_string();
        assert!(msg.contains("backend.url"));
    }

    #[test]
    fn validate_rejects_event_as_catch_all() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[backend]
url = "http://localhost"

[schedule]
catch_all_type = "event"
"#,
        );

        let msg = AppConfig::load_from_path(&path).unwrap_err().to_string();
        assert!(msg.contains("catch_all_type"));
    }

    #[test]
    fn unknown_block_type_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[backend]
url = "http://localhost"

[schedule]
catch_all_type = "nap"
"#,
        );

        assert!(matches!(
            AppConfig::load_from_path(&path),
            Err(PlannerError::Config(_))
        ));
    }

    #[test]
    fn keybinding_overrides_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[backend]
url = "http://localhost"

[keybindings.bindings]
quit = "Ctrl+x"
"#,
        );

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.keybindings.bindings.get("quit").unwrap(), "Ctrl+x");
    }

    #[test]
    fn write_default_creates_loadable_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("subdir").join("config.toml");

        AppConfig::write_default(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[backend]"));
        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.backend.url, "http://localhost:8080/api");
    }
}
