use std::{env, path::PathBuf, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cuotas_domain::{DebtSource, Role};

use crate::ConfigError;

/// Environment variable that overrides the application directory.
pub const HOME_ENV: &str = "CUOTAS_HOME";

const DEFAULT_HOME_DIR: &str = ".cuotas";

/// Application directory: `$CUOTAS_HOME` when set, `~/.cuotas` otherwise.
pub fn app_home() -> PathBuf {
    if let Some(value) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
        return PathBuf::from(value);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_HOME_DIR)
}

/// Stores user-configurable CLI preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    /// Role of the operator using this installation.
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub debt_source: DebtSource,
    /// Fixed offset east of UTC, in minutes. The host zone is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,
    /// Amount suggested by `pay` and `settle` when none is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_fee: Option<String>,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for the roster file. Defaults to `<home>/data`.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "es-AR".into(),
            currency: "ARS".into(),
            role: Role::default(),
            debt_source: DebtSource::default(),
            utc_offset_minutes: None,
            default_fee: None,
            ui_color_enabled: Self::default_ui_color_enabled(),
            data_root: None,
        }
    }
}

impl Config {
    pub const KEYS: &'static [&'static str] = &[
        "locale",
        "currency",
        "role",
        "debt_source",
        "utc_offset_minutes",
        "default_fee",
        "ui_color_enabled",
        "data_root",
    ];

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn resolve_data_root(&self, home: &std::path::Path) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }
        home.join("data")
    }

    /// Key/value pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let optional = |value: Option<String>| value.unwrap_or_else(|| "-".into());
        vec![
            ("locale", self.locale.clone()),
            ("currency", self.currency.clone()),
            ("role", self.role.to_string()),
            ("debt_source", self.debt_source.to_string()),
            (
                "utc_offset_minutes",
                optional(self.utc_offset_minutes.map(|value| value.to_string())),
            ),
            ("default_fee", optional(self.default_fee.clone())),
            ("ui_color_enabled", self.ui_color_enabled.to_string()),
            (
                "data_root",
                optional(
                    self.data_root
                        .as_ref()
                        .map(|path| path.display().to_string()),
                ),
            ),
        ]
    }

    /// Updates one key from its textual form. `-` or an empty value clears
    /// optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let cleared = value.is_empty() || value == "-";
        match key {
            "locale" if !cleared => self.locale = value.to_string(),
            "currency" if !cleared => self.currency = value.to_ascii_uppercase(),
            "role" => self.role = Role::from_str(value).ok_or_else(invalid)?,
            "debt_source" => self.debt_source = DebtSource::from_str(value).ok_or_else(invalid)?,
            "utc_offset_minutes" => {
                self.utc_offset_minutes = if cleared {
                    None
                } else {
                    let minutes: i32 = value.parse().map_err(|_| invalid())?;
                    if minutes.abs() >= 24 * 60 {
                        return Err(invalid());
                    }
                    Some(minutes)
                }
            }
            "default_fee" => {
                self.default_fee = if cleared {
                    None
                } else {
                    Some(normalize_fee(value).ok_or_else(invalid)?)
                }
            }
            "ui_color_enabled" => {
                self.ui_color_enabled = match value.to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => true,
                    "false" | "off" | "no" | "0" => false,
                    _ => return Err(invalid()),
                }
            }
            "data_root" => {
                self.data_root = if cleared {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            "locale" | "currency" => return Err(invalid()),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

/// Positive decimal with two places; a decimal comma is accepted.
fn normalize_fee(raw: &str) -> Option<String> {
    let mut amount = Decimal::from_str(&raw.replace(',', ".")).ok()?;
    if amount <= Decimal::ZERO {
        return None;
    }
    amount = amount.round_dp(2);
    amount.rescale(2);
    Some(amount.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_parses_typed_keys() {
        let mut config = Config::default();
        config.set("role", "admin").unwrap();
        config.set("debt_source", "ledger").unwrap();
        config.set("utc_offset_minutes", "-180").unwrap();
        config.set("ui_color_enabled", "off").unwrap();
        config.set("currency", "eur").unwrap();

        assert_eq!(config.role, Role::Admin);
        assert_eq!(config.debt_source, DebtSource::Ledger);
        assert_eq!(config.utc_offset_minutes, Some(-180));
        assert!(!config.ui_color_enabled);
        assert_eq!(config.currency, "EUR");

        config.set("utc_offset_minutes", "-").unwrap();
        assert_eq!(config.utc_offset_minutes, None);

        config.set("default_fee", "1500,5").unwrap();
        assert_eq!(config.default_fee.as_deref(), Some("1500.50"));
    }

    #[test]
    fn set_rejects_bad_input() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("role", "owner"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(config.set("utc_offset_minutes", "1440").is_err());
        assert!(config.set("locale", "").is_err());
        assert!(matches!(
            config.set("default_fee", "abc"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(config.set("default_fee", "0").is_err());
        assert_eq!(config.default_fee, None);
        assert!(matches!(
            config.set("theme", "dark"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn entries_cover_every_key() {
        let config = Config::default();
        let keys: Vec<&str> = config.entries().into_iter().map(|(key, _)| key).collect();
        assert_eq!(keys, Config::KEYS);
    }
}
