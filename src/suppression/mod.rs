//! Scope-based suppression, the final filter before findings surface.

pub mod baseline;

pub use baseline::{Baseline, BaselineError, BaselineStats, FindingFingerprint};

use crate::analysis::ApiIssue;
use crate::config::Config;
use crate::symbol::scope::{ScopeId, ScopeTree};

/// Wildcard marker suppressing every issue in a scope
pub const SUPPRESS_ALL: &str = "all";

/// Applies lexical suppressions and source-set policy
#[derive(Debug, Clone, Copy, Default)]
pub struct SuppressionEngine;

impl SuppressionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Whether `issue` is suppressed at `scope`.
    ///
    /// Any enclosing frame carrying the issue id or the wildcard counts.
    /// Containment is purely lexical: a class-level suppression covers
    /// nested, inner and anonymous classes because their frames chain
    /// through the class frame, while sibling top-level classes never do.
    /// Field frames only enclose their initializer, which scopes
    /// field-level suppressions to exactly that expression.
    pub fn is_suppressed(&self, tree: &ScopeTree, scope: ScopeId, issue: ApiIssue) -> bool {
        let id = issue.id();
        tree.chain(scope).into_iter().any(|frame_id| {
            tree.frame(frame_id)
                .suppressions
                .iter()
                .any(|s| s.eq_ignore_ascii_case(id) || s.eq_ignore_ascii_case(SUPPRESS_ALL))
        })
    }

    /// Whether a whole source set is excluded from analysis.
    ///
    /// Test source sets are excluded unless the project opts them in; an
    /// explicit per-source-set override wins either way.
    pub fn is_source_set_excluded(&self, config: &Config, source_set: &str) -> bool {
        if let Some(&include) = config.source_sets.get(source_set) {
            return !include;
        }
        is_test_source_set(source_set) && !config.include_test_sources
    }
}

fn is_test_source_set(name: &str) -> bool {
    name == "test" || name == "androidTest" || name.ends_with("Test")
}
