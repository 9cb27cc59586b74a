//! CLI configuration

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};

use kindred_core::policy::{DEFAULT_AGE_OF_MAJORITY, DEFAULT_REFERENCE_YEAR};
use kindred_core::{FamilyTree, MarriagePolicy, SequentialIds, UlidIds};

use crate::output::OutputFormat;

/// Get default config file path
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kindred")
        .join("config.toml")
}

/// Year against which marriageability is classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "YearSetting", into = "YearSetting")]
pub enum ReferenceYear {
    Fixed(i32),
    /// The calendar year when the session starts
    Current,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum YearSetting {
    Number(i32),
    Text(String),
}

impl TryFrom<YearSetting> for ReferenceYear {
    type Error = String;

    fn try_from(value: YearSetting) -> Result<Self, Self::Error> {
        match value {
            YearSetting::Number(year) => Self::fixed(year),
            YearSetting::Text(text) => text.parse(),
        }
    }
}

impl From<ReferenceYear> for YearSetting {
    fn from(value: ReferenceYear) -> Self {
        match value {
            ReferenceYear::Fixed(year) => Self::Number(year),
            ReferenceYear::Current => Self::Text("current".to_string()),
        }
    }
}

impl std::str::FromStr for ReferenceYear {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("current") {
            return Ok(Self::Current);
        }
        let year = s
            .parse::<i32>()
            .map_err(|_| format!("expected a year or \"current\", got '{}'", s))?;
        Self::fixed(year)
    }
}

impl std::fmt::Display for ReferenceYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(year) => write!(f, "{}", year),
            Self::Current => write!(f, "current"),
        }
    }
}

impl ReferenceYear {
    fn fixed(year: i32) -> Result<Self, String> {
        if year < 0 {
            return Err(format!("reference_year must not be negative, got {}", year));
        }
        Ok(Self::Fixed(year))
    }

    pub fn resolve(&self) -> i32 {
        match self {
            Self::Fixed(year) => *year,
            Self::Current => MarriagePolicy::current_year().reference_year,
        }
    }
}

/// How new person identifiers are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    Sequential,
    Ulid,
}

impl std::str::FromStr for IdScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "ulid" => Ok(Self::Ulid),
            _ => Err(format!("expected 'sequential' or 'ulid', got '{}'", s)),
        }
    }
}

fn check_age_of_majority(age: i32) -> Result<i32, String> {
    if age < 0 {
        return Err(format!("age_of_majority must not be negative, got {}", age));
    }
    Ok(age)
}

fn non_negative_age<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    check_age_of_majority(i32::deserialize(deserializer)?).map_err(serde::de::Error::custom)
}

/// Configuration for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reference_year: ReferenceYear,
    #[serde(deserialize_with = "non_negative_age")]
    pub age_of_majority: i32,
    pub id_scheme: IdScheme,
    pub id_prefix: String,
    pub format: OutputFormat,
    pub prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference_year: ReferenceYear::Fixed(DEFAULT_REFERENCE_YEAR),
            age_of_majority: DEFAULT_AGE_OF_MAJORITY,
            id_scheme: IdScheme::Sequential,
            id_prefix: "P".to_string(),
            format: OutputFormat::Text,
            prompt: "> ".to_string(),
        }
    }
}

impl Config {
    /// Load config from `path`, falling back to defaults if the file is absent
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &[
            "reference_year",
            "age_of_majority",
            "id_scheme",
            "id_prefix",
            "format",
            "prompt",
        ]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "reference_year" => Some(self.reference_year.to_string()),
            "age_of_majority" => Some(self.age_of_majority.to_string()),
            "id_scheme" => Some(format!("{:?}", self.id_scheme).to_lowercase()),
            "id_prefix" => Some(self.id_prefix.clone()),
            "format" => Some(self.format.as_str().to_string()),
            "prompt" => Some(self.prompt.clone()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "reference_year" => {
                self.reference_year = value.parse().map_err(anyhow::Error::msg)?;
            }
            "age_of_majority" => {
                let age = value
                    .parse()
                    .with_context(|| format!("Invalid age of majority: {}", value))?;
                self.age_of_majority = check_age_of_majority(age).map_err(anyhow::Error::msg)?;
            }
            "id_scheme" => self.id_scheme = value.parse().map_err(anyhow::Error::msg)?,
            "id_prefix" => self.id_prefix = value.to_string(),
            "format" => self.format = value.parse().map_err(anyhow::Error::msg)?,
            "prompt" => self.prompt = value.to_string(),
            _ => anyhow::bail!(
                "Unknown config key: {} (available: {})",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }

    pub fn marriage_policy(&self) -> MarriagePolicy {
        MarriagePolicy::new(self.reference_year.resolve(), self.age_of_majority)
    }

    /// Fresh registry configured with this policy and identifier scheme
    pub fn build_tree(&self) -> FamilyTree {
        let tree = FamilyTree::new().with_policy(self.marriage_policy());
        match self.id_scheme {
            IdScheme::Sequential => {
                tree.with_id_generator(SequentialIds::with_prefix(self.id_prefix.clone()))
            }
            IdScheme::Ulid => tree.with_id_generator(UlidIds),
        }
    }
}
