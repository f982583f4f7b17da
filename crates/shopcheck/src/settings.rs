//! Template settings: timeouts, settle intervals and evidence options.
//!
//! Resolution order is defaults, then an optional YAML file, then
//! environment variables.

use crate::result::{TemplateError, TemplateResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default element wait (30 seconds)
pub const DEFAULT_ELEMENT_TIMEOUT_MS: u64 = 30_000;

/// Default assertion wait (10 seconds)
pub const DEFAULT_ASSERTION_TIMEOUT_MS: u64 = 10_000;

/// Default modal open/close wait (10 seconds)
pub const DEFAULT_MODAL_TIMEOUT_MS: u64 = 10_000;

/// Pause after submitting a form
pub const DEFAULT_SUBMIT_SETTLE_MS: u64 = 2_000;

/// Pause after searching or sorting a list
pub const DEFAULT_LIST_SETTLE_MS: u64 = 2_000;

/// Pause after loading more list items
pub const DEFAULT_LOAD_MORE_SETTLE_MS: u64 = 3_000;

/// Default evidence directory
pub const DEFAULT_EVIDENCE_ROOT: &str = "Evidence";

/// Site under test
pub const DEFAULT_BASE_URL: &str = "https://automationexercise.com";

/// Environment variable overriding the base URL
pub const ENV_BASE_URL: &str = "SHOPCHECK_BASE_URL";

/// Environment variable overriding the evidence root
pub const ENV_EVIDENCE_DIR: &str = "SHOPCHECK_EVIDENCE_DIR";

/// Environment variable selecting the screenshot mode
pub const ENV_SCREENSHOTS: &str = "SCREENSHOTS";

/// Environment variable overriding the element timeout
pub const ENV_ELEMENT_TIMEOUT_MS: &str = "SHOPCHECK_ELEMENT_TIMEOUT_MS";

// =============================================================================
// SCREENSHOT MODE
// =============================================================================

/// How much screenshot evidence templates write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotMode {
    /// No template screenshots
    Off,
    /// Explicit template screenshots and failure shots
    #[default]
    Minimal,
    /// Also a before and after shot around every action
    All,
}

impl ScreenshotMode {
    /// Whether template step screenshots are written
    #[must_use]
    pub const fn captures_steps(self) -> bool {
        !matches!(self, Self::Off)
    }

    /// Whether a `-FAILED` shot is taken when an action errors
    #[must_use]
    pub const fn captures_failures(self) -> bool {
        self.captures_steps()
    }

    /// Whether actions get `-before` / `-after` shots
    #[must_use]
    pub const fn captures_step_evidence(self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for ScreenshotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Off => "off",
            Self::Minimal => "minimal",
            Self::All => "all",
        };
        f.write_str(name)
    }
}

impl FromStr for ScreenshotMode {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "minimal" => Ok(Self::Minimal),
            "all" => Ok(Self::All),
            other => Err(TemplateError::configuration(format!(
                "unknown screenshot mode '{other}' (expected off, minimal or all)"
            ))),
        }
    }
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Settings every template reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Element visibility wait in milliseconds
    pub element_timeout_ms: u64,
    /// Assertion wait in milliseconds
    pub assertion_timeout_ms: u64,
    /// Modal open/close wait in milliseconds
    pub modal_timeout_ms: u64,
    /// Pause after submit in milliseconds
    pub submit_settle_ms: u64,
    /// Pause after search/sort in milliseconds
    pub list_settle_ms: u64,
    /// Pause after load-more in milliseconds
    pub load_more_settle_ms: u64,
    /// Screenshot evidence mode
    pub screenshot_mode: ScreenshotMode,
    /// Evidence directory
    pub evidence_root: PathBuf,
    /// Base URL of the site under test
    pub base_url: String,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            element_timeout_ms: DEFAULT_ELEMENT_TIMEOUT_MS,
            assertion_timeout_ms: DEFAULT_ASSERTION_TIMEOUT_MS,
            modal_timeout_ms: DEFAULT_MODAL_TIMEOUT_MS,
            submit_settle_ms: DEFAULT_SUBMIT_SETTLE_MS,
            list_settle_ms: DEFAULT_LIST_SETTLE_MS,
            load_more_settle_ms: DEFAULT_LOAD_MORE_SETTLE_MS,
            screenshot_mode: ScreenshotMode::default(),
            evidence_root: PathBuf::from(DEFAULT_EVIDENCE_ROOT),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl TemplateSettings {
    /// Defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> TemplateResult<Self> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Parse YAML; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> TemplateResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load a YAML file
    pub fn load_file(path: impl AsRef<Path>) -> TemplateResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Apply overrides from a variable lookup
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> TemplateResult<Self> {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(dir) = lookup(ENV_EVIDENCE_DIR).filter(|v| !v.is_empty()) {
            self.evidence_root = PathBuf::from(dir);
        }
        if let Some(mode) = lookup(ENV_SCREENSHOTS).filter(|v| !v.is_empty()) {
            self.screenshot_mode = mode.parse()?;
        }
        if let Some(ms) = lookup(ENV_ELEMENT_TIMEOUT_MS).filter(|v| !v.is_empty()) {
            self.element_timeout_ms = ms.trim().parse().map_err(|_| {
                TemplateError::configuration(format!(
                    "{ENV_ELEMENT_TIMEOUT_MS} must be a number of milliseconds, got '{ms}'"
                ))
            })?;
        }
        Ok(self)
    }

    /// Set the element timeout
    #[must_use]
    pub fn with_element_timeout_ms(mut self, ms: u64) -> Self {
        self.element_timeout_ms = ms;
        self
    }

    /// Set the modal timeout
    #[must_use]
    pub fn with_modal_timeout_ms(mut self, ms: u64) -> Self {
        self.modal_timeout_ms = ms;
        self
    }

    /// Set every settle interval at once
    #[must_use]
    pub fn with_settle_ms(mut self, submit: u64, list: u64, load_more: u64) -> Self {
        self.submit_settle_ms = submit;
        self.list_settle_ms = list;
        self.load_more_settle_ms = load_more;
        self
    }

    /// Set the screenshot mode
    #[must_use]
    pub fn with_screenshot_mode(mut self, mode: ScreenshotMode) -> Self {
        self.screenshot_mode = mode;
        self
    }

    /// Set the evidence root
    #[must_use]
    pub fn with_evidence_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.evidence_root = root.into();
        self
    }

    /// Element wait
    #[must_use]
    pub const fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }

    /// Assertion wait
    #[must_use]
    pub const fn assertion_timeout(&self) -> Duration {
        Duration::from_millis(self.assertion_timeout_ms)
    }

    /// Modal wait
    #[must_use]
    pub const fn modal_timeout(&self) -> Duration {
        Duration::from_millis(self.modal_timeout_ms)
    }

    /// Post-submit pause
    #[must_use]
    pub const fn submit_settle(&self) -> Duration {
        Duration::from_millis(self.submit_settle_ms)
    }

    /// Post-search/sort pause
    #[must_use]
    pub const fn list_settle(&self) -> Duration {
        Duration::from_millis(self.list_settle_ms)
    }

    /// Post-load-more pause
    #[must_use]
    pub const fn load_more_settle(&self) -> Duration {
        Duration::from_millis(self.load_more_settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    mod default_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let settings = TemplateSettings::default();
            assert_eq!(settings.element_timeout(), Duration::from_secs(30));
            assert_eq!(settings.modal_timeout(), Duration::from_secs(10));
            assert_eq!(settings.submit_settle(), Duration::from_secs(2));
            assert_eq!(settings.load_more_settle(), Duration::from_secs(3));
            assert_eq!(settings.screenshot_mode, ScreenshotMode::Minimal);
            assert_eq!(settings.evidence_root, PathBuf::from("Evidence"));
        }

        #[test]
        fn test_builder() {
            let settings = TemplateSettings::new()
                .with_settle_ms(0, 0, 0)
                .with_screenshot_mode(ScreenshotMode::Off);
            assert_eq!(settings.list_settle(), Duration::ZERO);
            assert!(!settings.screenshot_mode.captures_steps());
        }

        #[test]
        fn test_mode_levels() {
            assert!(!ScreenshotMode::Off.captures_failures());
            assert!(ScreenshotMode::Minimal.captures_failures());
            assert!(!ScreenshotMode::Minimal.captures_step_evidence());
            assert!(ScreenshotMode::All.captures_step_evidence());
        }
    }

    mod env_tests {
        use super::*;

        #[test]
        fn test_overrides() {
            let settings = TemplateSettings::default()
                .with_env_overrides(lookup(&[
                    (ENV_BASE_URL, "http://localhost:8080"),
                    (ENV_SCREENSHOTS, "all"),
                    (ENV_ELEMENT_TIMEOUT_MS, "500"),
                ]))
                .unwrap();
            assert_eq!(settings.base_url, "http://localhost:8080");
            assert_eq!(settings.screenshot_mode, ScreenshotMode::All);
            assert_eq!(settings.element_timeout_ms, 500);
        }

        #[test]
        fn test_empty_values_ignored() {
            let settings = TemplateSettings::default()
                .with_env_overrides(lookup(&[(ENV_EVIDENCE_DIR, "")]))
                .unwrap();
            assert_eq!(settings.evidence_root, PathBuf::from(DEFAULT_EVIDENCE_ROOT));
        }

        #[test]
        fn test_bad_values_rejected() {
            assert!(TemplateSettings::default()
                .with_env_overrides(lookup(&[(ENV_SCREENSHOTS, "sometimes")]))
                .is_err());
            assert!(TemplateSettings::default()
                .with_env_overrides(lookup(&[(ENV_ELEMENT_TIMEOUT_MS, "soon")]))
                .is_err());
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_partial_yaml() {
            let settings =
                TemplateSettings::from_yaml_str("modal_timeout_ms: 2500\nscreenshot_mode: 'off'\n")
                    .unwrap();
            assert_eq!(settings.modal_timeout_ms, 2500);
            assert_eq!(settings.screenshot_mode, ScreenshotMode::Off);
            assert_eq!(settings.element_timeout_ms, DEFAULT_ELEMENT_TIMEOUT_MS);
        }

        #[test]
        fn test_load_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("settings.yaml");
            std::fs::write(&path, "evidence_root: out/evidence\n").unwrap();
            let settings = TemplateSettings::load_file(&path).unwrap();
            assert_eq!(settings.evidence_root, PathBuf::from("out/evidence"));
        }
    }
}
