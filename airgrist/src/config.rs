//! This module contains import configurations.
//!
//! Credentials and target ids are explicit objects handed to the client
//! constructors and the importer, owned by the caller.

use std::collections::HashMap;
use std::env;

use crate::error::Result;
use crate::{Error, ErrorKind};

/// Source (Airtable) credentials.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct AirtableConfig {
    /// API key used as a bearer token.
    pub api_key: String,
}

/// Destination (Grist) endpoint and credentials.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct GristConfig {
    /// Base URL of the Grist instance (e.g. `https://docs.getgrist.com`).
    pub api_url: String,
    /// API key used as a bearer token.
    pub api_key: String,
}

/// Everything one import run needs.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct ImportConfig {
    /// Source credentials.
    pub airtable: AirtableConfig,
    /// Destination endpoint and credentials.
    pub grist: GristConfig,
    /// Destination workspace that will hold the created document.
    pub workspace_id: i64,
    /// Name of the document to create.
    pub document_name: String,
    /// Names of the tables to import. Empty means import every table.
    pub select_tables: Vec<String>,
}

impl TryFrom<&'_ HashMap<String, String>> for ImportConfig {
    type Error = Error;

    fn try_from(value: &'_ HashMap<String, String>) -> Result<Self> {
        let mut config = ImportConfig::default();

        config.airtable.api_key = required(value, "airtable.api_key")?;
        config.grist.api_url = required(value, "grist.api_url")?;
        config.grist.api_key = required(value, "grist.api_key")?;
        config.document_name = required(value, "grist.document_name")?;

        config.workspace_id = required(value, "grist.workspace_id")?
            .parse::<i64>()
            .map_err(|e| {
                Error::new(
                    ErrorKind::ConfigInvalid,
                    "Can't parse grist.workspace_id as an integer.",
                )
                .set_source(e)
            })?;

        value.get("import.select_tables").iter().for_each(|v| {
            config.select_tables = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        Ok(config)
    }
}

impl ImportConfig {
    /// Load the configuration from `AIRGRIST_*` environment variables:
    /// `AIRGRIST_AIRTABLE_API_KEY`, `AIRGRIST_GRIST_API_URL`,
    /// `AIRGRIST_GRIST_API_KEY`, `AIRGRIST_GRIST_WORKSPACE_ID`,
    /// `AIRGRIST_GRIST_DOCUMENT_NAME` and the optional
    /// `AIRGRIST_IMPORT_SELECT_TABLES` (comma separated).
    pub fn from_env() -> Result<Self> {
        let mut map = HashMap::new();
        for (key, dotted) in [
            ("AIRGRIST_AIRTABLE_API_KEY", "airtable.api_key"),
            ("AIRGRIST_GRIST_API_URL", "grist.api_url"),
            ("AIRGRIST_GRIST_API_KEY", "grist.api_key"),
            ("AIRGRIST_GRIST_WORKSPACE_ID", "grist.workspace_id"),
            ("AIRGRIST_GRIST_DOCUMENT_NAME", "grist.document_name"),
            ("AIRGRIST_IMPORT_SELECT_TABLES", "import.select_tables"),
        ] {
            if let Ok(v) = env::var(key) {
                map.insert(dotted.to_string(), v);
            }
        }

        Self::try_from(&map)
    }
}

fn required(value: &HashMap<String, String>, key: &'static str) -> Result<String> {
    value.get(key).cloned().ok_or_else(|| {
        Error::new(ErrorKind::ConfigInvalid, format!("{key} is missing."))
            .with_context("key", key)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_map() -> HashMap<String, String> {
        HashMap::from(
            [
                ("airtable.api_key", "patAAA"),
                ("grist.api_url", "https://grist.example.org"),
                ("grist.api_key", "gristKKK"),
                ("grist.workspace_id", "146993"),
                ("grist.document_name", "Airtable Import"),
            ]
            .map(|(k, v)| (k.to_string(), v.to_string())),
        )
    }

    #[test]
    fn test_config_from_map() {
        let config = ImportConfig::try_from(&full_map()).unwrap();

        assert_eq!(config.airtable.api_key, "patAAA");
        assert_eq!(config.grist.api_url, "https://grist.example.org");
        assert_eq!(config.workspace_id, 146993);
        assert_eq!(config.document_name, "Airtable Import");
        assert!(config.select_tables.is_empty());
    }

    #[test]
    fn test_config_select_tables() {
        let mut map = full_map();
        map.insert(
            "import.select_tables".to_string(),
            "Participants, Catalog".to_string(),
        );

        let config = ImportConfig::try_from(&map).unwrap();
        assert_eq!(config.select_tables, vec!["Participants", "Catalog"]);
    }

    #[test]
    fn test_config_missing_key() {
        let mut map = full_map();
        map.remove("grist.api_key");

        let err = ImportConfig::try_from(&map).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert_eq!(err.context("key"), Some("grist.api_key"));
    }

    #[test]
    fn test_config_bad_workspace_id() {
        let mut map = full_map();
        map.insert("grist.workspace_id".to_string(), "not-a-number".to_string());

        let err = ImportConfig::try_from(&map).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }
}
