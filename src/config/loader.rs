use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::analysis::ApiIssue;
use crate::symbol::ApiLevel;

/// Project configuration for compatibility analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lowest platform version the project supports
    pub min_sdk: ApiLevel,

    /// Version the project is compiled and tested against
    pub target_sdk: ApiLevel,

    /// Analyze test source sets
    pub include_test_sources: bool,

    /// Per-source-set inclusion overrides, keyed by source-set name
    pub source_sets: BTreeMap<String, bool>,

    /// Check configuration
    pub checks: ChecksConfig,

    /// Additional boolean helper predicates recognized as version guards
    pub helpers: Vec<HelperPattern>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    /// Flag symbols missing on supported versions
    pub new_api: bool,

    /// Flag compile-time-inlined constants from newer SDKs
    pub inlined_api: bool,

    /// Flag resource attributes ignored on older versions
    pub unused_attribute: bool,

    /// Flag version checks that cannot vary at runtime
    pub obsolete_sdk_int: bool,

    /// Flag overrides of members introduced at newer levels
    pub override_check: bool,
}

/// A helper predicate recognized by name pattern, standing for a
/// version-at-least check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelperPattern {
    /// Regex matched against the helper method name
    pub pattern: String,
    /// Version the helper proves when it returns true
    pub level: ApiLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_sdk: 1,
            target_sdk: 1,
            include_test_sources: false,
            source_sets: BTreeMap::new(),
            checks: ChecksConfig::default(),
            helpers: Vec::new(),
        }
    }
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            new_api: true,
            inlined_api: true,
            unused_attribute: true,
            obsolete_sdk_int: true,
            override_check: true,
        }
    }
}

impl Config {
    pub fn new(min_sdk: ApiLevel, target_sdk: ApiLevel) -> Self {
        Self {
            min_sdk,
            target_sdk,
            ..Self::default()
        }
    }

    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".apicompat.yml",
            ".apicompat.yaml",
            ".apicompat.toml",
            "apicompat.yml",
            "apicompat.yaml",
            "apicompat.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        // No config file found, use defaults
        Ok(Self::default())
    }

    /// Whether a check is enabled
    pub fn is_check_enabled(&self, issue: ApiIssue) -> bool {
        match issue {
            ApiIssue::NewApi => self.checks.new_api,
            ApiIssue::InlinedApi => self.checks.inlined_api,
            ApiIssue::UnusedAttribute => self.checks.unused_attribute,
            ApiIssue::ObsoleteSdkInt => self.checks.obsolete_sdk_int,
            ApiIssue::Override => self.checks.override_check,
        }
    }
}
