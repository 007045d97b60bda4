//! `fragview.toml` configuration support.
//!
//! The file is optional; every field has a default so a bare install runs
//! with a 15 second rotation over whatever the shader directory contains.
//! Durations accept either plain seconds or humantime strings ("90s",
//! "2m 30s").

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub surface: SurfaceSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RotationConfig {
    /// Auto-advance toggle; manual navigation works either way.
    #[serde(default = "default_auto")]
    pub auto: bool,
    /// Time each shader stays on screen before the rotation advances.
    #[serde(default = "default_interval", deserialize_with = "deserialize_duration")]
    pub interval: Duration,
    /// Optional explicit ordering; catalogued names not listed here are
    /// appended alphabetically.
    #[serde(default)]
    pub order: Vec<String>,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            auto: default_auto(),
            interval: default_interval(),
            order: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SurfaceSettings {
    /// Initial window size, e.g. `"1920x1080"`.
    #[serde(default = "default_size", deserialize_with = "deserialize_size")]
    pub size: (u32, u32),
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            size: default_size(),
        }
    }
}

fn default_auto() -> bool {
    true
}

fn default_interval() -> Duration {
    Duration::from_secs(15)
}

fn default_size() -> (u32, u32) {
    (1920, 1080)
}

impl ViewConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: ViewConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rotation.auto && self.rotation.interval.is_zero() {
            return Err(ConfigError::Invalid(
                "rotation.interval must be greater than zero while auto is enabled".into(),
            ));
        }

        for name in &self.rotation.order {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "rotation.order contains an empty shader name".into(),
                ));
            }
        }

        if self.surface.size.0 == 0 || self.surface.size.1 == 0 {
            return Err(ConfigError::Invalid(
                "surface.size dimensions must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

/// Parses a `WIDTHxHEIGHT` size string.
pub fn parse_size(raw: &str) -> Result<(u32, u32), String> {
    let mut parts = raw.trim().splitn(2, ['x', 'X']);
    let width = parts.next().and_then(|value| value.trim().parse().ok());
    let height = parts.next().and_then(|value| value.trim().parse().ok());
    match (width, height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => Ok((width, height)),
        _ => Err(format!("invalid size '{raw}'; expected WIDTHxHEIGHT")),
    }
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<(u32, u32), D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_size(&raw).map_err(de::Error::custom)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;

    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs_f64(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}
