//! apicompat - API-level compatibility checking for Android-style
//! SDK-versioned platforms
//!
//! This library decides, for each pre-resolved platform symbol reference,
//! whether the reference is safe at the project's declared minimum version
//! and what should be reported when it is not.
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **Symbol model** - References, locations and the lexical scope tree
//! 2. **Version database** - Symbol-to-level table with hierarchy fallback
//! 3. **Context composition** - Annotation floors and guard narrowing
//! 4. **Verdict evaluation** - Severity and reason per reference
//! 5. **Suppression** - Scope suppressions, source-set policy, baselines
//! 6. **Reporting** - Terminal and JSON output
//!
//! Parsing source and resource files is the caller's concern: the walker
//! hands over immutable fact sets ([`driver::TranslationUnit`]) and
//! receives [`analysis::Finding`]s back.

pub mod analysis;
pub mod config;
pub mod database;
pub mod driver;
pub mod report;
pub mod suppression;
pub mod symbol;

pub use analysis::{
    AnnotationResolver, ApiChecker, ApiIssue, EffectiveContext, Finding, GuardAnalyzer,
    ObsoleteCheckDetector, ReasonCode, Severity, Verdict,
};
pub use config::Config;
pub use database::{VersionDatabase, VersionRequirement};
pub use driver::{AnalysisDriver, TranslationUnit};
pub use report::{ReportFormat, Reporter};
pub use suppression::{Baseline, SuppressionEngine};
pub use symbol::{ApiLevel, Location, SymbolKind, SymbolReference};
