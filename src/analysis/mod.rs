pub mod annotations;
mod checker;
pub mod context;
pub mod guards;
pub mod obsolete;

pub use annotations::{AnnotationMechanism, AnnotationResolver, VersionAnnotation};
pub use checker::ApiChecker;
pub use context::EffectiveContext;
pub use guards::{
    BranchPosition, CompareOp, GuardAnalyzer, GuardCondition, GuardScope,
    HelperPredicateMatcher, NamePatternMatcher, VersionGuardExpression,
};
pub use obsolete::{ObsoleteCheckDetector, ObsoleteClassification, ObsoleteSubject};

use serde::{Deserialize, Serialize};

use crate::symbol::{ApiLevel, Location};

/// Issues the checker can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiIssue {
    /// Symbol does not exist on all supported platform versions
    NewApi,

    /// Constant whose value was inlined at compile time against a newer SDK
    InlinedApi,

    /// Resource attribute or element silently ignored on older versions
    UnusedAttribute,

    /// Version check or marker that cannot vary given the project floor
    ObsoleteSdkInt,

    /// Override of a member that only exists on newer versions
    Override,
}

impl ApiIssue {
    /// Stable id used in suppression scopes and reports
    pub fn id(&self) -> &'static str {
        match self {
            ApiIssue::NewApi => "NewApi",
            ApiIssue::InlinedApi => "InlinedApi",
            ApiIssue::UnusedAttribute => "UnusedAttribute",
            ApiIssue::ObsoleteSdkInt => "ObsoleteSdkInt",
            ApiIssue::Override => "Override",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            ApiIssue::NewApi => Severity::Error,
            ApiIssue::InlinedApi => Severity::Warning,
            ApiIssue::UnusedAttribute => Severity::Warning,
            ApiIssue::ObsoleteSdkInt => Severity::Warning,
            ApiIssue::Override => Severity::Error,
        }
    }

    pub fn all() -> &'static [ApiIssue] {
        &[
            ApiIssue::NewApi,
            ApiIssue::InlinedApi,
            ApiIssue::UnusedAttribute,
            ApiIssue::ObsoleteSdkInt,
            ApiIssue::Override,
        ]
    }
}

impl std::fmt::Display for ApiIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Severity of a verdict or finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    None,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    pub fn is_reportable(&self) -> bool {
        *self != Severity::None
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a verdict was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReasonCode {
    /// Symbol is available at the effective floor
    Available,

    /// Symbol requires a newer version than the effective floor
    RequiresNewApi,

    /// Compile-time-inlined constant from a newer SDK; loads fine, value
    /// may be stale
    InlinedConstant,

    /// Resource attribute or element inert below its level
    InertOnOlderVersions,

    /// Catching or declaring a type the verifier resolves at class load;
    /// a preceding runtime version check cannot prevent the load-time
    /// failure, only a declaration-level requirement annotation can.
    ClassLoadRisk,

    /// Multi-catch compiled down to a common supertype newer than the
    /// declared disjuncts
    ExceptionSupertype,

    /// Default or static interface method
    DefaultInterfaceMethod,

    /// Repeatable-annotation container mechanism
    RepeatableAnnotation,

    /// Cast (explicit or compiler-inserted) to a newer type
    CastRequiresNewApi,

    /// For-each over a concrete view type newer than its interface
    IteratedViewType,

    /// Override of a member introduced at a newer level
    OverridesNewerMember,

    /// Version comparison always true given the project floor
    ObsoleteAlwaysTrue,

    /// Version comparison always false given the project floor
    ObsoleteAlwaysFalse,
}

impl ReasonCode {
    /// Issue this reason reports under
    pub fn issue(&self) -> ApiIssue {
        match self {
            ReasonCode::Available => ApiIssue::NewApi,
            ReasonCode::RequiresNewApi
            | ReasonCode::ClassLoadRisk
            | ReasonCode::ExceptionSupertype
            | ReasonCode::DefaultInterfaceMethod
            | ReasonCode::RepeatableAnnotation
            | ReasonCode::CastRequiresNewApi
            | ReasonCode::IteratedViewType => ApiIssue::NewApi,
            ReasonCode::InlinedConstant => ApiIssue::InlinedApi,
            ReasonCode::InertOnOlderVersions => ApiIssue::UnusedAttribute,
            ReasonCode::OverridesNewerMember => ApiIssue::Override,
            ReasonCode::ObsoleteAlwaysTrue | ReasonCode::ObsoleteAlwaysFalse => {
                ApiIssue::ObsoleteSdkInt
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::Available => "available",
            ReasonCode::RequiresNewApi => "requires-new-api",
            ReasonCode::InlinedConstant => "inlined-constant",
            ReasonCode::InertOnOlderVersions => "inert-on-older-versions",
            ReasonCode::ClassLoadRisk => "class-load-risk",
            ReasonCode::ExceptionSupertype => "exception-supertype",
            ReasonCode::DefaultInterfaceMethod => "default-interface-method",
            ReasonCode::RepeatableAnnotation => "repeatable-annotation",
            ReasonCode::CastRequiresNewApi => "cast-requires-new-api",
            ReasonCode::IteratedViewType => "iterated-view-type",
            ReasonCode::OverridesNewerMember => "overrides-newer-member",
            ReasonCode::ObsoleteAlwaysTrue => "obsolete-always-true",
            ReasonCode::ObsoleteAlwaysFalse => "obsolete-always-false",
        }
    }
}

/// Terminal result of checking one symbol reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub severity: Severity,
    pub required_level: ApiLevel,
    pub effective_min: ApiLevel,
    pub reason: ReasonCode,
}

impl Verdict {
    pub fn none(effective_min: ApiLevel) -> Self {
        Self {
            severity: Severity::None,
            required_level: 1,
            effective_min,
            reason: ReasonCode::Available,
        }
    }

    pub fn is_reportable(&self) -> bool {
        self.severity.is_reportable()
    }
}

/// One reportable finding, ready for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub issue: ApiIssue,
    pub severity: Severity,
    pub message: String,
    pub location: Location,
    /// Qualified symbol the finding is about, when there is one
    pub symbol: Option<String>,
    pub required_level: ApiLevel,
    pub effective_min: ApiLevel,
    pub reason: ReasonCode,
}

impl Finding {
    /// Build a finding from a reportable verdict
    pub fn from_verdict(
        verdict: Verdict,
        location: Location,
        kind_name: &'static str,
        symbol: impl Into<String>,
    ) -> Self {
        let symbol = symbol.into();
        let issue = verdict.reason.issue();
        let message = default_message(&verdict, kind_name, &symbol);
        Self {
            issue,
            severity: verdict.severity,
            message,
            location,
            symbol: Some(symbol),
            required_level: verdict.required_level,
            effective_min: verdict.effective_min,
            reason: verdict.reason,
        }
    }
}

fn capitalized(kind_name: &str) -> String {
    let mut chars = kind_name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn default_message(verdict: &Verdict, kind_name: &str, symbol: &str) -> String {
    let required = verdict.required_level;
    let min = verdict.effective_min;
    match verdict.reason {
        ReasonCode::InlinedConstant => format!(
            "Field requires API level {required} (current min is {min}): {symbol}; \
             the constant is inlined at compile time and may hold a stale value on older versions"
        ),
        ReasonCode::InertOnOlderVersions => format!(
            "{} {symbol} is only used in API level {required} and higher (current min is {min})",
            capitalized(kind_name)
        ),
        ReasonCode::ClassLoadRisk => format!(
            "Exception requires API level {required} (current min is {min}): {symbol}; \
             a preceding version check cannot prevent the class verifier from rejecting \
             this clause when the enclosing class loads, annotate the surrounding \
             declaration with a version requirement instead"
        ),
        ReasonCode::ExceptionSupertype => format!(
            "Multi-catch compiles to a common supertype requiring API level {required} \
             (current min is {min}): {symbol}"
        ),
        ReasonCode::DefaultInterfaceMethod => format!(
            "Default and static interface methods require API level {required} \
             (current min is {min}): {symbol}"
        ),
        ReasonCode::RepeatableAnnotation => format!(
            "Repeatable annotations require API level {required} (current min is {min}): {symbol}"
        ),
        ReasonCode::OverridesNewerMember => format!(
            "Override of {symbol} requires API level {required} (current min is {min})"
        ),
        ReasonCode::ObsoleteAlwaysTrue => {
            format!("Unnecessary; the version is always at least {required}")
        }
        ReasonCode::ObsoleteAlwaysFalse => {
            format!("Unnecessary; the version is never below {required}")
        }
        _ => format!(
            "{} requires API level {required} (current min is {min}): {symbol}",
            capitalized(kind_name)
        ),
    }
}
