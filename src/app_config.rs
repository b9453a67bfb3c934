use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::gateways;
use crate::journals;
use crate::translators;
use crate::translators::PollingPolicy;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Translation backend identifier ("deepl" or "google")
    #[serde(default = "default_translator")]
    pub translator: String,

    /// Gateway identifier ("useless" disables institutional proxying)
    #[serde(default = "default_gateway")]
    pub gateway: String,

    /// Explicit journal identifier; empty means infer from the URL
    #[serde(default)]
    pub journal: String,

    /// Chunking and polling settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Browser session settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Optional key=value credentials file loaded into the environment
    #[serde(default)]
    pub credentials_file: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Chunking and polling settings shared by all backends
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Maximum characters sent to the backend in one request
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Milliseconds between page-source polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound on polls per chunk
    #[serde(default = "default_poll_trials")]
    pub poll_trials: u32,

    /// Milliseconds to pause between consecutive chunks
    #[serde(default = "default_chunk_pause_ms")]
    pub chunk_pause_ms: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_trials: default_poll_trials(),
            chunk_pause_ms: default_chunk_pause_ms(),
        }
    }
}

impl TranslationConfig {
    pub fn polling_policy(&self) -> PollingPolicy {
        PollingPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            trials: self.poll_trials,
            chunk_pause: Duration::from_millis(self.chunk_pause_ms),
        }
    }
}

/// Browser session settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionConfig {
    /// WebDriver endpoint probed at startup; empty disables the probe and
    /// uses plain HTTP fetches
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Seconds to wait after a WebDriver navigation for rendering to settle
    #[serde(default = "default_load_wait_secs")]
    pub load_wait_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            load_wait_secs: default_load_wait_secs(),
        }
    }
}

impl SessionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn load_wait(&self) -> Duration {
        Duration::from_secs(self.load_wait_secs)
    }
}

/// Output settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    /// Directory for rendered HTML/PDF files; empty means
    /// `<data dir>/ronyaku`
    #[serde(default)]
    pub out_dir: String,

    /// Also convert the HTML to PDF with wkhtmltopdf
    #[serde(default)]
    pub pdf: bool,

    /// Remove the intermediate HTML after PDF conversion
    #[serde(default)]
    pub delete_html: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { out_dir: String::new(), pdf: false, delete_html: false }
    }
}

impl OutputConfig {
    /// Resolved output directory, defaulting under the platform data dir.
    pub fn resolved_out_dir(&self) -> PathBuf {
        if !self.out_dir.is_empty() {
            return PathBuf::from(&self.out_dir);
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ronyaku")
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_translator() -> String {
    "deepl".to_string()
}

fn default_gateway() -> String {
    "useless".to_string()
}

fn default_max_chars() -> usize {
    5000
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_poll_trials() -> u32 {
    30
}

fn default_chunk_pause_ms() -> u64 {
    1000
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_load_wait_secs() -> u64 {
    3
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.as_ref().display(), e))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.as_ref().display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path.as_ref().display(), e))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.source_language.is_empty() || self.target_language.is_empty() {
            return Err(anyhow!("Source and target languages must be set"));
        }
        if translators::get(&self.translator).is_err() {
            return Err(anyhow!(
                "Unknown translator '{}' (supported: {})",
                self.translator,
                translators::supported().join(", ")
            ));
        }
        if gateways::get(&self.gateway).is_err() {
            return Err(anyhow!(
                "Unknown gateway '{}' (supported: {})",
                self.gateway,
                gateways::supported().join(", ")
            ));
        }
        if !self.journal.is_empty() && journals::resolve(&self.journal).is_err() {
            return Err(anyhow!(
                "Unknown journal '{}' (supported: {})",
                self.journal,
                journals::supported().join(", ")
            ));
        }
        if self.translation.max_chars == 0 {
            return Err(anyhow!("translation.max_chars must be positive"));
        }
        if self.translation.poll_trials == 0 {
            return Err(anyhow!("translation.poll_trials must be positive"));
        }
        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_language: "ja".to_string(),
            translator: default_translator(),
            gateway: default_gateway(),
            journal: String::new(),
            translation: TranslationConfig::default(),
            session: SessionConfig::default(),
            output: OutputConfig::default(),
            credentials_file: String::new(),
            log_level: LogLevel::default(),
        }
    }
}
