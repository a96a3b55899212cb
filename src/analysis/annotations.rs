//! Version-constraint annotation resolution.
//!
//! Three mechanisms carry version bounds: the requires-version marker, the
//! target-version marker, and test-filter/config markers carrying a
//! {min, max} range. All normalize to one integer floor per declaration;
//! scope-chain resolution is innermost-first.

use serde::{Deserialize, Serialize};

use crate::symbol::scope::{ScopeId, ScopeTree};
use crate::symbol::ApiLevel;

/// Which marker carried the constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationMechanism {
    /// Declares the minimum level the annotated code requires
    RequiresVersion,
    /// Declares the level the annotated code is written against,
    /// overriding the outer floor within its scope
    TargetVersion,
    /// Test-filter/config marker carrying an inclusive {min, max} range
    TestFilter,
}

/// One version-constraint annotation on a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionAnnotation {
    pub mechanism: AnnotationMechanism,
    pub min: Option<ApiLevel>,
    pub max: Option<ApiLevel>,
}

impl VersionAnnotation {
    pub fn requires(level: ApiLevel) -> Self {
        Self {
            mechanism: AnnotationMechanism::RequiresVersion,
            min: Some(level),
            max: None,
        }
    }

    pub fn target(level: ApiLevel) -> Self {
        Self {
            mechanism: AnnotationMechanism::TargetVersion,
            min: Some(level),
            max: None,
        }
    }

    pub fn test_filter(min: Option<ApiLevel>, max: Option<ApiLevel>) -> Self {
        Self {
            mechanism: AnnotationMechanism::TestFilter,
            min,
            max,
        }
    }
}

/// A redundant annotation: its floor was already implied by the scope
/// outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedundantAnnotation {
    pub scope: ScopeId,
    pub declared: ApiLevel,
    pub outer_effective: ApiLevel,
}

/// Resolves effective required levels over scope chains
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationResolver;

impl AnnotationResolver {
    pub fn new() -> Self {
        Self
    }

    /// Floor declared by the annotations on one declaration, if any.
    ///
    /// Simultaneous markers intersect: the floor is the largest min bound.
    /// Max bounds participate in the intersection but only mins produce a
    /// floor.
    pub fn declaration_floor(annotations: &[VersionAnnotation]) -> Option<ApiLevel> {
        annotations.iter().filter_map(|a| a.min).max()
    }

    /// Effective required level for a usage site: the innermost explicit
    /// annotation on the chain wins; no annotation means no constraint
    /// (level 1).
    pub fn effective_required(&self, tree: &ScopeTree, scope: ScopeId) -> ApiLevel {
        for id in tree.chain(scope) {
            if let Some(floor) = Self::declaration_floor(&tree.frame(id).annotations) {
                return floor;
            }
        }
        1
    }

    /// An inner annotation is redundant when the scope outside it already
    /// guarantees at least its value.
    pub fn is_redundant(inner: ApiLevel, outer_effective: ApiLevel) -> bool {
        inner <= outer_effective
    }

    /// Sweep a scope tree for annotations that are redundant against the
    /// project floor plus the annotations of their strict ancestors.
    pub fn redundant_annotations(
        &self,
        tree: &ScopeTree,
        min_sdk: ApiLevel,
    ) -> Vec<RedundantAnnotation> {
        let mut result = Vec::new();
        for (id, frame) in tree.iter() {
            let Some(declared) = Self::declaration_floor(&frame.annotations) else {
                continue;
            };

            let mut outer = min_sdk;
            for ancestor in tree.chain(id).into_iter().skip(1) {
                if let Some(floor) = Self::declaration_floor(&tree.frame(ancestor).annotations) {
                    outer = outer.max(floor);
                }
            }

            if Self::is_redundant(declared, outer) {
                result.push(RedundantAnnotation {
                    scope: id,
                    declared,
                    outer_effective: outer,
                });
            }
        }
        result
    }
}
