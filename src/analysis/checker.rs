//! Verdict evaluation: one symbol reference plus its effective context in,
//! one verdict out. Pure and stateless; the same inputs always produce the
//! same verdict.

use tracing::debug;

use crate::analysis::context::EffectiveContext;
use crate::analysis::{ReasonCode, Severity, Verdict};
use crate::database::rules::{apply_special_rules, SpecialRuleKind};
use crate::database::VersionDatabase;
use crate::symbol::{ApiLevel, ReferenceDetail, SymbolKind, SymbolReference};

/// Attribute whose relevance depends on the target SDK rather than the
/// minimum: themes on layout includes are only honored by the inflater
/// once the app targets the level that introduced them.
const INCLUDE_TAG: &str = "include";
const THEME_ATTRIBUTE_SUFFIX: &str = ":theme";

/// Evaluates symbol references against the version table
pub struct ApiChecker<'a> {
    db: &'a VersionDatabase,
}

impl<'a> ApiChecker<'a> {
    pub fn new(db: &'a VersionDatabase) -> Self {
        Self { db }
    }

    /// Decide whether `reference` is safe in `ctx`
    pub fn evaluate(&self, reference: &SymbolReference, ctx: &EffectiveContext) -> Verdict {
        let (required, special) = match self.required_level(reference) {
            Some(pair) => pair,
            None => return Verdict::none(ctx.flow_floor()),
        };
        if required <= 1 {
            return Verdict::none(ctx.flow_floor());
        }

        // Class-load-sensitive references are resolved by the verifier
        // before any guard in a method body runs, so only the surface
        // floor (project minimum plus requirement annotations) counts.
        let floor = if reference.kind.is_class_load_sensitive() {
            ctx.surface_floor()
        } else {
            ctx.flow_floor()
        };
        if required <= floor {
            return Verdict::none(floor);
        }

        if self.is_target_gated_attribute(reference) && ctx.target_sdk() < required {
            // The inflater never consults the attribute at this target
            // level, so there is nothing to warn about yet.
            return Verdict::none(floor);
        }

        let reason = self.reason_for(reference, special, required, ctx);
        let severity = match reason {
            ReasonCode::InlinedConstant | ReasonCode::InertOnOlderVersions => Severity::Warning,
            _ => Severity::Error,
        };

        debug!(
            symbol = %reference.qualified_name,
            required,
            floor,
            reason = reason.as_str(),
            "flagged reference"
        );

        Verdict {
            severity,
            required_level: required,
            effective_min: floor,
            reason,
        }
    }

    /// Requirement for a reference: special rules first, in their fixed
    /// priority order, then the plain table lookup.
    fn required_level(
        &self,
        reference: &SymbolReference,
    ) -> Option<(ApiLevel, Option<SpecialRuleKind>)> {
        if let Some(special) = apply_special_rules(self.db, reference) {
            return Some((special.required_level, Some(special.rule)));
        }

        let level = match reference.kind {
            SymbolKind::MethodCall
            | SymbolKind::MethodOverride
            | SymbolKind::FieldRead
            | SymbolKind::EnumSwitchCase => self.member_level(reference)?,
            SymbolKind::ClassReference
            | SymbolKind::ExceptionCatch
            | SymbolKind::SuperType
            | SymbolKind::Cast => self.db.lookup_class(&reference.qualified_name)?.required_level,
            SymbolKind::XmlTag | SymbolKind::XmlAttribute => {
                self.db.lookup_attribute(&reference.qualified_name)?.required_level
            }
        };
        Some((level, None))
    }

    /// Member lookup across every owner the reference can resolve through.
    /// The statically resolved declaring type is tried alongside the owner
    /// in the qualified name; the lowest level of any path wins so that a
    /// member reachable through an older path is never over-reported.
    fn member_level(&self, reference: &SymbolReference) -> Option<ApiLevel> {
        let (name_owner, member) = reference.qualified_name.split_once('#')?;

        let mut best: Option<ApiLevel> = None;
        let mut consider = |owner: &str| {
            if let Some(req) = self.db.lookup_member(owner, member) {
                best = Some(best.map_or(req.required_level, |b: ApiLevel| {
                    b.min(req.required_level)
                }));
            }
        };

        if let Some(declaring) = &reference.declaring_type {
            consider(declaring);
            if declaring != name_owner {
                consider(name_owner);
            }
        } else {
            consider(name_owner);
        }
        best
    }

    fn reason_for(
        &self,
        reference: &SymbolReference,
        special: Option<SpecialRuleKind>,
        required: ApiLevel,
        ctx: &EffectiveContext,
    ) -> ReasonCode {
        match reference.kind {
            SymbolKind::ExceptionCatch => {
                // A guard that would have covered the level makes the
                // verdict about the guard's inadequacy, not availability.
                if ctx.flow_floor() >= required {
                    ReasonCode::ClassLoadRisk
                } else if special == Some(SpecialRuleKind::ExceptionSupertype) {
                    ReasonCode::ExceptionSupertype
                } else {
                    ReasonCode::RequiresNewApi
                }
            }
            SymbolKind::MethodOverride => match special {
                Some(SpecialRuleKind::DefaultInterfaceMethod) => ReasonCode::DefaultInterfaceMethod,
                _ => ReasonCode::OverridesNewerMember,
            },
            SymbolKind::FieldRead
                if matches!(
                    reference.detail,
                    ReferenceDetail::ConstantField { inlined: true }
                ) =>
            {
                ReasonCode::InlinedConstant
            }
            SymbolKind::XmlTag | SymbolKind::XmlAttribute => ReasonCode::InertOnOlderVersions,
            SymbolKind::Cast => ReasonCode::CastRequiresNewApi,
            _ => match special {
                Some(SpecialRuleKind::DefaultInterfaceMethod) => ReasonCode::DefaultInterfaceMethod,
                Some(SpecialRuleKind::RepeatableAnnotation) => ReasonCode::RepeatableAnnotation,
                Some(SpecialRuleKind::IteratedView) => ReasonCode::IteratedViewType,
                Some(SpecialRuleKind::Cast) => ReasonCode::CastRequiresNewApi,
                _ => ReasonCode::RequiresNewApi,
            },
        }
    }

    fn is_target_gated_attribute(&self, reference: &SymbolReference) -> bool {
        reference.kind == SymbolKind::XmlAttribute
            && reference.qualified_name.ends_with(THEME_ATTRIBUTE_SUFFIX)
            && reference.declaring_type.as_deref() == Some(INCLUDE_TAG)
    }
}
