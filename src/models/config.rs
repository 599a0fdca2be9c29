use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::errors::{Result, SchemaError};

use super::schema::JsonStyle;

pub const SOURCE_VAR: &str = "KCSCHEMA_SOURCE";
pub const LOCATION_VAR: &str = "KCSCHEMA_LOCATION";
pub const JSON_STYLE_VAR: &str = "KCSCHEMA_JSON_STYLE";

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[default]
    Builtin,
    File,
    Postgres,
    MySql,
}

impl FromStr for SourceType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "builtin" | "keycloak" => Ok(SourceType::Builtin),
            "file" | "json" => Ok(SourceType::File),
            "postgres" | "postgresql" => Ok(SourceType::Postgres),
            "mysql" | "mariadb" => Ok(SourceType::MySql),
            other => Err(SchemaError::Config(format!("unknown schema source: {}", other))),
        }
    }
}

/// Where the registry's table definitions come from.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct SourceConfig {
    pub source_type: SourceType,
    /// Catalog path for `File`, database URL for `Postgres` and `MySql`.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub json_style: JsonStyle,
}

impl SourceConfig {
    /// Reads the configuration from the environment, loading `.env` first.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source_type = match lookup(SOURCE_VAR) {
            Some(value) => value.parse()?,
            None => SourceType::default(),
        };
        let json_style = match lookup(JSON_STYLE_VAR) {
            Some(value) => value.parse()?,
            None => JsonStyle::default(),
        };
        let location = lookup(LOCATION_VAR).filter(|l| !l.trim().is_empty());

        let config = Self {
            source_type,
            location,
            json_style,
        };
        config.require_location()?;
        Ok(config)
    }

    /// The location, required by every source except the built-in catalog.
    pub fn require_location(&self) -> Result<Option<&str>> {
        match (self.source_type, self.location.as_deref()) {
            (SourceType::Builtin, location) => Ok(location),
            (_, Some(location)) => Ok(Some(location)),
            (source, None) => Err(SchemaError::Config(format!(
                "{} must be set for source {:?}",
                LOCATION_VAR, source
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_to_builtin() {
        let config = SourceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.source_type, SourceType::Builtin);
        assert_eq!(config.json_style, JsonStyle::Snake);
        assert_eq!(config.location, None);
    }

    #[test]
    fn test_reads_all_variables() {
        let config = SourceConfig::from_lookup(lookup(&[
            (SOURCE_VAR, "postgres"),
            (LOCATION_VAR, "postgres://keycloak@localhost/keycloak"),
            (JSON_STYLE_VAR, "lower_camel"),
        ]))
        .unwrap();
        assert_eq!(config.source_type, SourceType::Postgres);
        assert_eq!(config.json_style, JsonStyle::LowerCamel);
        assert_eq!(
            config.location.as_deref(),
            Some("postgres://keycloak@localhost/keycloak")
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = SourceConfig::from_lookup(lookup(&[(SOURCE_VAR, "oracle")])).unwrap_err();
        assert!(matches!(err, SchemaError::Config(_)));

        let err = SourceConfig::from_lookup(lookup(&[(JSON_STYLE_VAR, "kebab")])).unwrap_err();
        assert!(matches!(err, SchemaError::Config(_)));
    }

    #[test]
    fn test_location_required_for_external_sources() {
        let err = SourceConfig::from_lookup(lookup(&[(SOURCE_VAR, "file")])).unwrap_err();
        assert!(matches!(err, SchemaError::Config(msg) if msg.contains(LOCATION_VAR)));
    }
}
