//! Irregular requirement rules that are not plain table lookups.
//!
//! Each rule is a variant evaluated in a fixed priority order; the first
//! one that claims a reference wins, and only then does the checker fall
//! back to the table. Keeping them in one list here keeps the main
//! evaluation path free of scattered conditionals.

use crate::database::VersionDatabase;
use crate::symbol::{ApiLevel, ReferenceDetail, SymbolKind, SymbolReference};

/// Level at which interfaces may carry default and static methods
pub const DEFAULT_INTERFACE_METHOD_LEVEL: ApiLevel = 24;

/// Level at which the repeatable-annotation container mechanism exists
pub const REPEATABLE_ANNOTATION_LEVEL: ApiLevel = 24;

/// Which special rule produced a requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialRuleKind {
    MultiCatch,
    /// Multi-catch whose compiled common supertype is newer than the
    /// declared disjuncts
    ExceptionSupertype,
    DefaultInterfaceMethod,
    RepeatableAnnotation,
    Cast,
    IteratedView,
}

/// Requirement produced by a special rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialRequirement {
    pub required_level: ApiLevel,
    pub rule: SpecialRuleKind,
}

#[derive(Debug, Clone, Copy)]
enum SpecialRule {
    MultiCatch,
    InterfaceMethod,
    RepeatableAnnotation,
    Cast,
    IteratedView,
}

/// Priority order; earlier rules win
const RULES: &[SpecialRule] = &[
    SpecialRule::MultiCatch,
    SpecialRule::InterfaceMethod,
    SpecialRule::RepeatableAnnotation,
    SpecialRule::Cast,
    SpecialRule::IteratedView,
];

/// Run the special rules against a reference
pub fn apply_special_rules(
    db: &VersionDatabase,
    reference: &SymbolReference,
) -> Option<SpecialRequirement> {
    RULES.iter().find_map(|rule| rule.evaluate(db, reference))
}

impl SpecialRule {
    fn evaluate(
        &self,
        db: &VersionDatabase,
        reference: &SymbolReference,
    ) -> Option<SpecialRequirement> {
        match self {
            SpecialRule::MultiCatch => {
                let ReferenceDetail::MultiCatch {
                    disjuncts,
                    compiled_supertype,
                } = &reference.detail
                else {
                    return None;
                };
                if reference.kind != SymbolKind::ExceptionCatch || disjuncts.is_empty() {
                    return None;
                }

                // Every disjunct must be loadable, so the clause requires
                // the newest of them.
                let declared = disjuncts
                    .iter()
                    .map(|t| db.class_level(t))
                    .max()
                    .unwrap_or(1);

                // When the compiler substitutes a common supertype that is
                // not one of the declared types, the generated dispatch
                // references that supertype instead.
                if let Some(supertype) = compiled_supertype {
                    if !disjuncts.contains(supertype) {
                        let level = db.class_level(supertype).max(declared);
                        return Some(SpecialRequirement {
                            required_level: level,
                            rule: SpecialRuleKind::ExceptionSupertype,
                        });
                    }
                }

                Some(SpecialRequirement {
                    required_level: declared,
                    rule: SpecialRuleKind::MultiCatch,
                })
            }

            SpecialRule::InterfaceMethod => {
                let ReferenceDetail::InterfaceMethod { has_body, is_static } = reference.detail
                else {
                    return None;
                };
                if !has_body && !is_static {
                    return None;
                }
                Some(SpecialRequirement {
                    required_level: DEFAULT_INTERFACE_METHOD_LEVEL,
                    rule: SpecialRuleKind::DefaultInterfaceMethod,
                })
            }

            SpecialRule::RepeatableAnnotation => {
                if reference.detail != ReferenceDetail::RepeatableAnnotation {
                    return None;
                }
                Some(SpecialRequirement {
                    required_level: REPEATABLE_ANNOTATION_LEVEL,
                    rule: SpecialRuleKind::RepeatableAnnotation,
                })
            }

            SpecialRule::Cast => {
                let ReferenceDetail::Cast { .. } = reference.detail else {
                    return None;
                };
                // Implicit widening conversions compile to the same
                // checkcast as an explicit cast, so both check the target
                // type's level.
                let level = db.class_level(&reference.qualified_name);
                if level <= 1 {
                    return None;
                }
                Some(SpecialRequirement {
                    required_level: level,
                    rule: SpecialRuleKind::Cast,
                })
            }

            SpecialRule::IteratedView => {
                let ReferenceDetail::IteratedView { view_type } = &reference.detail else {
                    return None;
                };
                // The loop iterates an old interface, but the bytecode
                // references the concrete view type returned by the
                // accessor.
                let level = db.class_level(view_type);
                if level <= 1 {
                    return None;
                }
                Some(SpecialRequirement {
                    required_level: level,
                    rule: SpecialRuleKind::IteratedView,
                })
            }
        }
    }
}
