//! Site configuration.
//!
//! Configuration is read once from a TOML secrets file and passed explicitly
//! to the pieces that need it. Keys use the secrets-file spelling
//! (`BRAND_NAME`, `GOOGLE_SHEET_NAME`, ...) and environment variables with the
//! same names override file values.
//!
//! ```toml
//! BRAND_NAME = "Thrive with Frida"
//! GOOGLE_SHEET_NAME = "ThriveWFrida_Inquiries"
//! GOOGLE_SERVICE_ACCOUNT_JSON = '''{ "client_email": "...", "private_key": "..." }'''
//! SUBMIT_INTERVAL = "6s"
//! REQUEST_TIMEOUT = "5s"
//! ```

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::domain::policy::DEFAULT_MIN_INTERVAL;

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid duration in {key}: {value}")]
    Duration { key: &'static str, value: String },
}

/// Everything the inquiry pipeline and its host page need to know.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    #[serde(rename = "BRAND_NAME")]
    pub brand_name: String,
    #[serde(rename = "TAGLINE")]
    pub tagline: String,
    #[serde(rename = "HEX_PRIMARY")]
    pub primary_color: String,
    #[serde(rename = "HEX_ACCENT")]
    pub accent_color: String,
    /// Name of the spreadsheet inquiries are appended to
    #[serde(rename = "GOOGLE_SHEET_NAME")]
    pub sheet_name: String,
    /// Service-account key JSON. `None` sends every inquiry to the log fallback.
    #[serde(rename = "GOOGLE_SERVICE_ACCOUNT_JSON")]
    pub credentials_json: Option<String>,
    /// Value written to the `source` column
    #[serde(rename = "INQUIRY_SOURCE")]
    pub source: String,
    #[serde(rename = "SUBMIT_INTERVAL", with = "humantime_serde")]
    pub min_submit_interval: Duration,
    /// Upper bound on each outbound spreadsheet request
    #[serde(rename = "REQUEST_TIMEOUT", with = "humantime_serde")]
    pub request_timeout: Duration,
    #[serde(rename = "SERVICES_PATH")]
    pub services_path: PathBuf,
}

const OVERRIDE_KEYS: [&str; 10] = [
    "BRAND_NAME",
    "TAGLINE",
    "HEX_PRIMARY",
    "HEX_ACCENT",
    "GOOGLE_SHEET_NAME",
    "GOOGLE_SERVICE_ACCOUNT_JSON",
    "INQUIRY_SOURCE",
    "SUBMIT_INTERVAL",
    "REQUEST_TIMEOUT",
    "SERVICES_PATH",
];

impl SiteConfig {
    /// Parse configuration from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a TOML file, then apply environment overrides.
    ///
    /// A missing file is not an error: defaults plus environment are used.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, keyed by the secrets-file names.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in OVERRIDE_KEYS {
            let Some(value) = lookup(key) else { continue };
            match key {
                "BRAND_NAME" => self.brand_name = value,
                "TAGLINE" => self.tagline = value,
                "HEX_PRIMARY" => self.primary_color = value,
                "HEX_ACCENT" => self.accent_color = value,
                "GOOGLE_SHEET_NAME" => self.sheet_name = value,
                "GOOGLE_SERVICE_ACCOUNT_JSON" => self.credentials_json = Some(value),
                "INQUIRY_SOURCE" => self.source = value,
                "SUBMIT_INTERVAL" => self.min_submit_interval = parse_duration(key, &value)?,
                "REQUEST_TIMEOUT" => self.request_timeout = parse_duration(key, &value)?,
                "SERVICES_PATH" => self.services_path = PathBuf::from(value),
                _ => {}
            }
        }
        Ok(())
    }

    /// Credentials, if present and not blank.
    pub fn credentials(&self) -> Option<&str> {
        self.credentials_json
            .as_deref()
            .filter(|json| !json.trim().is_empty())
    }

    /// Page title in the `Page — Brand` form used across the site.
    pub fn page_title(&self, page: &str) -> String {
        format!("{page} — {}", self.brand_name)
    }
}

fn parse_duration(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    humantime_serde::re::humantime::parse_duration(value.trim()).map_err(|_| {
        ConfigError::Duration {
            key,
            value: value.to_string(),
        }
    })
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            brand_name: "Thrive with Frida".to_string(),
            tagline: "Simplicity in Motion".to_string(),
            primary_color: "#0F1115".to_string(),
            accent_color: "#C7A97B".to_string(),
            sheet_name: "ThriveWFrida_Inquiries".to_string(),
            credentials_json: None,
            source: "website".to_string(),
            min_submit_interval: DEFAULT_MIN_INTERVAL,
            request_timeout: Duration::from_secs(5),
            services_path: PathBuf::from("data/services.json"),
        }
    }
}

// Credentials stay out of logs
impl fmt::Debug for SiteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteConfig")
            .field("brand_name", &self.brand_name)
            .field("tagline", &self.tagline)
            .field("primary_color", &self.primary_color)
            .field("accent_color", &self.accent_color)
            .field("sheet_name", &self.sheet_name)
            .field(
                "credentials_json",
                &self.credentials().map(|_| "<redacted>"),
            )
            .field("source", &self.source)
            .field("min_submit_interval", &self.min_submit_interval)
            .field("request_timeout", &self.request_timeout)
            .field("services_path", &self.services_path)
            .finish()
    }
}
