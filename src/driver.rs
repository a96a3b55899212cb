//! Per-translation-unit analysis pipeline.
//!
//! The walker hands each unit over as an immutable fact set: a scope tree,
//! the symbol references inside it, and the literal version comparisons it
//! contains. Units are independent, so the driver fans them out with
//! rayon; within a unit the composition is a plain outside-in walk per
//! usage site.

use rayon::prelude::*;
use std::path::PathBuf;
use tracing::debug;

use crate::analysis::{
    AnnotationResolver, ApiChecker, ApiIssue, EffectiveContext, Finding, GuardAnalyzer,
    NamePatternMatcher, ObsoleteCheckDetector, ObsoleteClassification, ObsoleteSubject,
    ReasonCode, Severity, Verdict, VersionGuardExpression,
};
use crate::config::Config;
use crate::database::VersionDatabase;
use crate::suppression::SuppressionEngine;
use crate::symbol::scope::{ScopeId, ScopeTree};
use crate::symbol::{Location, SymbolReference};

/// A symbol reference tied to the scope it occurs in
#[derive(Debug, Clone)]
pub struct ScopedReference {
    pub scope: ScopeId,
    pub reference: SymbolReference,
}

/// A literal version comparison tied to the scope it occurs in
#[derive(Debug, Clone)]
pub struct ScopedComparison {
    pub scope: ScopeId,
    pub expression: VersionGuardExpression,
    pub location: Location,
}

/// Pre-resolved facts for one source file
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    pub path: PathBuf,
    pub source_set: String,
    pub scopes: ScopeTree,
    pub references: Vec<ScopedReference>,
    pub comparisons: Vec<ScopedComparison>,
}

impl TranslationUnit {
    pub fn new(path: impl Into<PathBuf>, scopes: ScopeTree) -> Self {
        Self {
            path: path.into(),
            source_set: "main".to_string(),
            scopes,
            references: Vec::new(),
            comparisons: Vec::new(),
        }
    }

    pub fn with_source_set(mut self, source_set: impl Into<String>) -> Self {
        self.source_set = source_set.into();
        self
    }

    pub fn add_reference(&mut self, scope: ScopeId, reference: SymbolReference) {
        self.references.push(ScopedReference { scope, reference });
    }

    pub fn add_comparison(
        &mut self,
        scope: ScopeId,
        expression: VersionGuardExpression,
        location: Location,
    ) {
        self.comparisons.push(ScopedComparison {
            scope,
            expression,
            location,
        });
    }
}

/// Runs the full pipeline over translation units
pub struct AnalysisDriver {
    db: VersionDatabase,
    config: Config,
    guards: GuardAnalyzer,
    resolver: AnnotationResolver,
    obsolete: ObsoleteCheckDetector,
    suppression: SuppressionEngine,
}

impl AnalysisDriver {
    pub fn new(db: VersionDatabase, config: Config) -> Self {
        let mut matcher = NamePatternMatcher::with_defaults();
        for helper in &config.helpers {
            matcher = matcher.pattern(&helper.pattern, helper.level);
        }

        Self {
            db,
            config,
            guards: GuardAnalyzer::with_matcher(Box::new(matcher)),
            resolver: AnnotationResolver::new(),
            obsolete: ObsoleteCheckDetector::new(),
            suppression: SuppressionEngine::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &VersionDatabase {
        &self.db
    }

    /// Effective context at a usage site: project floor, raised by
    /// annotations and guards along the chain, outermost first.
    pub fn context_for(&self, tree: &ScopeTree, scope: ScopeId) -> EffectiveContext {
        let mut ctx = EffectiveContext::new(self.config.min_sdk, self.config.target_sdk);
        for id in tree.chain_outside_in(scope) {
            let frame = tree.frame(id);
            if let Some(floor) = AnnotationResolver::declaration_floor(&frame.annotations) {
                ctx = ctx.with_annotation_floor(floor);
            }
            if let Some(guard) = &frame.guard {
                ctx = self.guards.narrow(ctx, guard);
            }
        }
        ctx
    }

    /// Analyze one unit
    pub fn analyze_unit(&self, unit: &TranslationUnit) -> Vec<Finding> {
        if self.suppression.is_source_set_excluded(&self.config, &unit.source_set) {
            debug!(path = %unit.path.display(), source_set = %unit.source_set, "source set excluded");
            return Vec::new();
        }

        let checker = ApiChecker::new(&self.db);
        let mut findings = Vec::new();

        for scoped in &unit.references {
            let ctx = self.context_for(&unit.scopes, scoped.scope);
            let verdict = checker.evaluate(&scoped.reference, &ctx);
            if !verdict.is_reportable() {
                continue;
            }
            let issue = verdict.reason.issue();
            if !self.config.is_check_enabled(issue) {
                continue;
            }
            if self.suppression.is_suppressed(&unit.scopes, scoped.scope, issue) {
                continue;
            }
            findings.push(Finding::from_verdict(
                verdict,
                scoped.reference.location.clone(),
                scoped.reference.kind.display_name(),
                scoped.reference.qualified_name.clone(),
            ));
        }

        if self.config.is_check_enabled(ApiIssue::ObsoleteSdkInt) {
            self.collect_obsolete_comparisons(unit, &mut findings);
            self.collect_redundant_annotations(unit, &mut findings);
        }

        sort_findings(&mut findings);
        findings
    }

    /// Analyze many units in parallel. Output order is deterministic
    /// regardless of scheduling.
    pub fn analyze(&self, units: &[TranslationUnit]) -> Vec<Finding> {
        let mut findings: Vec<Finding> = units
            .par_iter()
            .flat_map(|unit| self.analyze_unit(unit))
            .collect();
        sort_findings(&mut findings);
        findings
    }

    /// Classify resource folder version qualifiers against the project
    /// floor. Folder names are passed as seen under `res/`.
    pub fn check_resource_folders(&self, folders: &[String]) -> Vec<Finding> {
        if !self.config.is_check_enabled(ApiIssue::ObsoleteSdkInt) {
            return Vec::new();
        }

        let mut findings = Vec::new();
        for folder in folders {
            let Some((level, classification)) =
                self.obsolete.classify_folder(folder, self.config.min_sdk)
            else {
                continue;
            };
            if classification != ObsoleteClassification::AlwaysTrue {
                continue;
            }
            debug!(
                subject = ObsoleteSubject::FolderQualifier.as_str(),
                folder = %folder,
                level,
                "obsolete check"
            );
            findings.push(Finding {
                issue: ApiIssue::ObsoleteSdkInt,
                severity: Severity::Warning,
                message: format!(
                    "This folder configuration (v{level}) is unnecessary; the minimum \
                     version is already {} or higher",
                    self.config.min_sdk
                ),
                location: Location::new(PathBuf::from(folder), 0, 0),
                symbol: Some(folder.clone()),
                required_level: level,
                effective_min: self.config.min_sdk,
                reason: ReasonCode::ObsoleteAlwaysTrue,
            });
        }
        sort_findings(&mut findings);
        findings
    }

    fn collect_obsolete_comparisons(&self, unit: &TranslationUnit, findings: &mut Vec<Finding>) {
        for scoped in &unit.comparisons {
            let classification = self.obsolete.classify(&scoped.expression, self.config.min_sdk);
            let reason = match classification {
                ObsoleteClassification::Necessary => continue,
                ObsoleteClassification::AlwaysTrue => ReasonCode::ObsoleteAlwaysTrue,
                ObsoleteClassification::AlwaysFalse => ReasonCode::ObsoleteAlwaysFalse,
            };
            if self
                .suppression
                .is_suppressed(&unit.scopes, scoped.scope, ApiIssue::ObsoleteSdkInt)
            {
                continue;
            }
            let (_, literal) = scoped.expression.normalized();
            let verdict = Verdict {
                severity: Severity::Warning,
                required_level: literal,
                effective_min: self.config.min_sdk,
                reason,
            };
            debug!(
                subject = ObsoleteSubject::Comparison.as_str(),
                expression = %scoped.expression,
                "obsolete check"
            );
            findings.push(Finding::from_verdict(
                verdict,
                scoped.location.clone(),
                ObsoleteSubject::Comparison.as_str(),
                scoped.expression.to_string(),
            ));
        }
    }

    fn collect_redundant_annotations(&self, unit: &TranslationUnit, findings: &mut Vec<Finding>) {
        for redundant in self
            .resolver
            .redundant_annotations(&unit.scopes, self.config.min_sdk)
        {
            if self
                .suppression
                .is_suppressed(&unit.scopes, redundant.scope, ApiIssue::ObsoleteSdkInt)
            {
                continue;
            }
            let location = unit
                .scopes
                .frame(redundant.scope)
                .location
                .clone()
                .unwrap_or_else(|| Location::new(unit.path.clone(), 0, 0));
            debug!(
                subject = ObsoleteSubject::Annotation.as_str(),
                declared = redundant.declared,
                outer = redundant.outer_effective,
                "obsolete check"
            );
            findings.push(Finding {
                issue: ApiIssue::ObsoleteSdkInt,
                severity: Severity::Warning,
                message: format!(
                    "Unnecessary; version requirement {} is already implied by the \
                     enclosing scope (effective floor is {})",
                    redundant.declared, redundant.outer_effective
                ),
                location,
                symbol: None,
                required_level: redundant.declared,
                effective_min: redundant.outer_effective,
                reason: ReasonCode::ObsoleteAlwaysTrue,
            });
        }
    }
}

fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        (
            &a.location.file,
            a.location.line,
            a.location.column,
            a.issue.id(),
            &a.symbol,
        )
            .cmp(&(
                &b.location.file,
                b.location.line,
                b.location.column,
                b.issue.id(),
                &b.symbol,
            ))
    });
}
