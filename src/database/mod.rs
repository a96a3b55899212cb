//! Immutable lookup table mapping platform symbols to the API level that
//! introduced them.
//!
//! The table is constructed once (from a JSON data file or the builder) and
//! injected into the analysis; nothing here is global or mutable after
//! construction, so a single instance can back any number of parallel
//! translation-unit walks.

mod hierarchy;
pub mod rules;

pub use hierarchy::TypeHierarchy;
pub use rules::{SpecialRequirement, SpecialRuleKind};

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::trace;

use crate::symbol::ApiLevel;

/// Requirement for one symbol as resolved by the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRequirement {
    pub required_level: ApiLevel,
}

impl VersionRequirement {
    pub fn new(required_level: ApiLevel) -> Self {
        Self { required_level }
    }
}

/// Raw on-disk shape of the version table
#[derive(Debug, Deserialize)]
struct RawDatabase {
    #[serde(default)]
    classes: HashMap<String, ApiLevel>,
    #[serde(default)]
    members: HashMap<String, ApiLevel>,
    #[serde(default)]
    attributes: HashMap<String, ApiLevel>,
    /// type -> direct supertypes
    #[serde(default)]
    hierarchy: HashMap<String, Vec<String>>,
}

/// The version-requirement table plus the supertype graph used to resolve
/// members that moved between declaring types across releases.
#[derive(Debug, Clone, Default)]
pub struct VersionDatabase {
    classes: HashMap<String, ApiLevel>,
    members: HashMap<String, ApiLevel>,
    attributes: HashMap<String, ApiLevel>,
    hierarchy: TypeHierarchy,
}

impl VersionDatabase {
    pub fn builder() -> VersionDatabaseBuilder {
        VersionDatabaseBuilder::default()
    }

    /// Load the table from a JSON data file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read version table: {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse version table: {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawDatabase = serde_json::from_str(json)?;
        let mut builder = Self::builder();
        for (name, level) in raw.classes {
            builder = builder.class(name, level);
        }
        for (key, level) in raw.members {
            let (owner, member) = key
                .split_once('#')
                .with_context(|| format!("Member key missing '#' separator: {key}"))?;
            builder = builder.member(owner, member, level);
        }
        for (name, level) in raw.attributes {
            builder = builder.attribute(name, level);
        }
        for (ty, supers) in raw.hierarchy {
            for s in supers {
                builder = builder.supertype(&ty, &s);
            }
        }
        Ok(builder.build())
    }

    /// Level at which a class became available; `None` when unknown
    /// (treated as always available).
    pub fn lookup_class(&self, name: &str) -> Option<VersionRequirement> {
        self.classes
            .get(name)
            .copied()
            .map(VersionRequirement::new)
    }

    /// Class level with the level-1 default applied
    pub fn class_level(&self, name: &str) -> ApiLevel {
        self.lookup_class(name).map(|r| r.required_level).unwrap_or(1)
    }

    /// Resolve `owner#member`, trying the statically resolved owner first
    /// and then every supertype it may have inherited the member from.
    ///
    /// When a member is reachable through more than one declaring type the
    /// lowest level wins: static resolution picking a newer-looking
    /// declaring class must not over-report a member that older code could
    /// always reach through a supertype.
    pub fn lookup_member(&self, owner: &str, member: &str) -> Option<VersionRequirement> {
        let mut best: Option<ApiLevel> = None;
        for ty in self.hierarchy.closure(owner) {
            if let Some(&level) = self.members.get(&member_key(&ty, member)) {
                trace!(owner = %ty, member, level, "member candidate");
                best = Some(best.map_or(level, |b: ApiLevel| b.min(level)));
            }
        }
        best.map(VersionRequirement::new)
    }

    /// Level for a resource XML attribute or tag
    pub fn lookup_attribute(&self, name: &str) -> Option<VersionRequirement> {
        self.attributes
            .get(name)
            .copied()
            .map(VersionRequirement::new)
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.members.is_empty() && self.attributes.is_empty()
    }
}

fn member_key(owner: &str, member: &str) -> String {
    format!("{owner}#{member}")
}

/// Builder for in-memory table construction
#[derive(Debug, Default)]
pub struct VersionDatabaseBuilder {
    db: VersionDatabase,
}

impl VersionDatabaseBuilder {
    pub fn class(mut self, name: impl Into<String>, level: ApiLevel) -> Self {
        self.db.classes.insert(name.into(), level);
        self
    }

    pub fn member(mut self, owner: &str, member: &str, level: ApiLevel) -> Self {
        self.db.members.insert(member_key(owner, member), level);
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, level: ApiLevel) -> Self {
        self.db.attributes.insert(name.into(), level);
        self
    }

    pub fn supertype(mut self, ty: &str, supertype: &str) -> Self {
        self.db.hierarchy.add_supertype(ty, supertype);
        self
    }

    pub fn build(self) -> VersionDatabase {
        self.db
    }
}
