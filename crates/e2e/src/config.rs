//! Suite configuration: TOML file, then environment, then CLI flags

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use kanban_common::Credentials;

use crate::a11y::A11yConfig;
use crate::error::{E2eError, E2eResult};
use crate::playwright::{Browser, PlaywrightConfig};
use crate::server::ServerConfig;
use crate::visual::VisualConfig;

pub const ENV_BASE_URL: &str = "KANBAN_E2E_BASE_URL";
pub const ENV_USER_EMAIL: &str = "KANBAN_E2E_USER_EMAIL";
pub const ENV_USER_PASSWORD: &str = "KANBAN_E2E_USER_PASSWORD";
pub const ENV_DB_PATH: &str = "KANBAN_E2E_DB_PATH";
pub const ENV_BROWSER: &str = "KANBAN_E2E_BROWSER";

/// Everything a suite run needs to know about its environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Origin of the application under test
    pub base_url: String,

    pub server: ServerConfig,

    pub browser: PlaywrightConfig,

    pub visual: VisualConfig,

    pub accessibility: A11yConfig,

    /// Account used by the auth scenarios
    pub test_user: Credentials,

    /// The application's JSON database file, read to check user existence
    pub database_path: Option<PathBuf>,

    /// Where the results JSON is written
    pub output_dir: PathBuf,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            server: ServerConfig::default(),
            browser: PlaywrightConfig::default(),
            visual: VisualConfig::default(),
            accessibility: A11yConfig::default(),
            test_user: Credentials::new("filip@example.com", "Asdf.1234#"),
            database_path: None,
            output_dir: PathBuf::from("test-results"),
        }
    }
}

impl SuiteConfig {
    /// Parse a configuration from TOML
    pub fn from_toml(content: &str) -> E2eResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        debug!("Loading suite config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Apply `KANBAN_E2E_*` environment overrides
    pub fn apply_env(&mut self) -> E2eResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key/value source
    pub fn apply_overrides<F>(&mut self, lookup: F) -> E2eResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(email) = lookup(ENV_USER_EMAIL) {
            self.test_user.email = email;
        }
        if let Some(password) = lookup(ENV_USER_PASSWORD) {
            self.test_user.password = password;
        }
        if let Some(path) = lookup(ENV_DB_PATH) {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(browser) = lookup(ENV_BROWSER) {
            self.browser.browser = browser.parse()?;
        }
        self.validate()
    }

    /// Reject configurations that cannot work
    pub fn validate(&self) -> E2eResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(E2eError::Config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if !(0.0..=100.0).contains(&self.visual.threshold) {
            return Err(E2eError::Config(format!(
                "visual.threshold must be a percentage, got {}",
                self.visual.threshold
            )));
        }
        // Screenshots are cleared at startup, baselines never are
        if self.visual.actual_dir == self.visual.baseline_dir {
            return Err(E2eError::Config(format!(
                "visual.actual_dir and visual.baseline_dir must differ, both are '{}'",
                self.visual.actual_dir.display()
            )));
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl std::str::FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" | "safari" => Ok(Browser::Webkit),
            other => Err(E2eError::Config(format!("unknown browser '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_application_dev_server() {
        let config = SuiteConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.browser.viewport_width, 660);
        assert_eq!(config.browser.viewport_height, 550);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = SuiteConfig::from_toml(
            r#"
base_url = "http://127.0.0.1:4000/"
database_path = "../trelloapp/backend/data/database.json"

[browser]
browser = "firefox"
expect_timeout_ms = 8000

[visual]
threshold = 1.5

[test_user]
email = "qa@example.com"
password = "secret"
"#,
        )
        .unwrap();

        assert_eq!(config.origin(), "http://127.0.0.1:4000");
        assert!(matches!(config.browser.browser, Browser::Firefox));
        assert_eq!(config.browser.expect_timeout_ms, 8000);
        assert_eq!(config.browser.viewport_width, 660);
        assert_eq!(config.visual.threshold, 1.5);
        assert_eq!(config.test_user.email, "qa@example.com");
        assert!(config.database_path.is_some());
    }

    #[test]
    fn test_env_overrides_win_over_file() {
        let env: HashMap<&str, &str> = [
            (ENV_BASE_URL, "http://staging:3000"),
            (ENV_USER_PASSWORD, "from-env"),
            (ENV_BROWSER, "webkit"),
        ]
        .into_iter()
        .collect();

        let mut config = SuiteConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.base_url, "http://staging:3000");
        assert_eq!(config.test_user.password, "from-env");
        assert_eq!(config.test_user.email, "filip@example.com");
        assert!(matches!(config.browser.browser, Browser::Webkit));
    }

    #[test]
    fn test_sample_config_parses() {
        let config = SuiteConfig::from_toml(include_str!("../kanban-e2e.toml")).unwrap();
        let defaults = SuiteConfig::default();

        assert_eq!(config.base_url, defaults.base_url);
        assert!(config.server.command.is_empty());
        assert_eq!(config.visual.viewport_width, 1920);
        assert_eq!(config.test_user, defaults.test_user);
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let err = SuiteConfig::from_toml(r#"base_url = "localhost:3000""#).unwrap_err();
        assert!(matches!(err, E2eError::Config(_)));
    }

    #[test]
    fn test_rejects_screenshots_in_baseline_dir() {
        let mut config = SuiteConfig::default();
        config.visual.actual_dir = config.visual.baseline_dir.clone();
        assert!(matches!(config.validate(), Err(E2eError::Config(_))));
    }

    #[test]
    fn test_rejects_unknown_browser() {
        let mut config = SuiteConfig::default();
        let err = config
            .apply_overrides(|key| (key == ENV_BROWSER).then(|| "lynx".to_string()))
            .unwrap_err();
        assert!(matches!(err, E2eError::Config(_)));
    }
}
