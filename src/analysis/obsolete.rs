//! Detection of version checks that can never vary at runtime.
//!
//! Given the project floor, every runtime version value lies in
//! `[minSdk, infinity)`. A comparison whose truth value is the same across
//! that whole range is dead logic.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::guards::{CompareOp, VersionGuardExpression};
use crate::symbol::ApiLevel;

/// Outcome of classifying one version comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObsoleteClassification {
    AlwaysTrue,
    AlwaysFalse,
    Necessary,
}

/// What carried the obsolete check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObsoleteSubject {
    /// Literal version comparison in code
    Comparison,
    /// Resource folder version qualifier
    FolderQualifier,
    /// Requirement annotation already implied by an outer floor
    Annotation,
}

impl ObsoleteSubject {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObsoleteSubject::Comparison => "comparison",
            ObsoleteSubject::FolderQualifier => "folder",
            ObsoleteSubject::Annotation => "annotation",
        }
    }
}

static FOLDER_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|-)v(\d+)(?:-|$)").unwrap());

/// Classifies literal comparisons, folder qualifiers and annotation floors
/// against the project floor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObsoleteCheckDetector;

impl ObsoleteCheckDetector {
    pub fn new() -> Self {
        Self
    }

    /// Classify a literal comparison over the value range `[min_sdk, inf)`.
    /// Both operand orders normalize to the same answer.
    pub fn classify(
        &self,
        expr: &VersionGuardExpression,
        min_sdk: ApiLevel,
    ) -> ObsoleteClassification {
        let (op, n) = expr.normalized();
        match op {
            CompareOp::Ge if n <= min_sdk => ObsoleteClassification::AlwaysTrue,
            CompareOp::Gt if n < min_sdk => ObsoleteClassification::AlwaysTrue,
            CompareOp::Lt if n <= min_sdk => ObsoleteClassification::AlwaysFalse,
            CompareOp::Le if n < min_sdk => ObsoleteClassification::AlwaysFalse,
            CompareOp::Eq if n < min_sdk => ObsoleteClassification::AlwaysFalse,
            _ => ObsoleteClassification::Necessary,
        }
    }

    /// Classify a resource folder name. Returns the qualifier's level and
    /// its classification when the name carries a `-vNN` qualifier; a
    /// qualifier at or below the project floor selects the folder on every
    /// device, making the qualifier dead.
    pub fn classify_folder(
        &self,
        folder_name: &str,
        min_sdk: ApiLevel,
    ) -> Option<(ApiLevel, ObsoleteClassification)> {
        let caps = FOLDER_VERSION.captures(folder_name)?;
        let level: ApiLevel = caps[1].parse().ok()?;
        let classification = if level <= min_sdk {
            ObsoleteClassification::AlwaysTrue
        } else {
            ObsoleteClassification::Necessary
        };
        Some((level, classification))
    }

    /// Classify an annotation floor against the floor outside it
    pub fn classify_annotation(
        &self,
        declared: ApiLevel,
        outer_floor: ApiLevel,
    ) -> ObsoleteClassification {
        if declared <= outer_floor {
            ObsoleteClassification::AlwaysTrue
        } else {
            ObsoleteClassification::Necessary
        }
    }
}
