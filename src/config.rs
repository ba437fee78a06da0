//! Converter settings.
//!
//! Stored as a JSON object on disk; every field is optional:
//! ```json
//! {
//!   "agency": { "id": "UPSI", "timezone": "Asia/Kuala_Lumpur" },
//!   "publisher": { "name": "UPSI" },
//!   "output_dir": "output",
//!   "zip_name": "gtfs.zip",
//!   "unresolved_stops": "warn"
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Values of the single `agency.txt` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgencyConfig {
    pub id: String,
    pub name: String,
    pub url: String,
    pub timezone: String,
    pub lang: String,
}

impl Default for AgencyConfig {
    fn default() -> Self {
        Self {
            id: "UPSI".to_string(),
            name: "Universiti Pendidikan Sultan Idris".to_string(),
            url: "http://www.upsi.edu.my".to_string(),
            timezone: "Asia/Kuala_Lumpur".to_string(),
            lang: "en".to_string(),
        }
    }
}

/// Publisher values of the `feed_info.txt` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    pub name: String,
    pub url: String,
    pub lang: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            name: "UPSI".to_string(),
            url: "http://www.upsi.edu.my".to_string(),
            lang: "en".to_string(),
        }
    }
}

/// What to do with timetable stop names missing from the stop list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedStopPolicy {
    /// Log and use the raw name as `stop_id`
    #[default]
    Warn,
    /// Abort the conversion
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub agency: AgencyConfig,
    pub publisher: PublisherConfig,
    pub output_dir: String,
    pub zip_name: String,
    pub unresolved_stops: UnresolvedStopPolicy,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            agency: AgencyConfig::default(),
            publisher: PublisherConfig::default(),
            output_dir: "output".to_string(),
            zip_name: "gtfs.zip".to_string(),
            unresolved_stops: UnresolvedStopPolicy::default(),
        }
    }
}

impl ConverterConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{path}'"))?;
        Self::from_json(&content).with_context(|| format!("invalid config '{path}'"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Loads from `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
