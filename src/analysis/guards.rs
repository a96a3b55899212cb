//! Version-guard narrowing.
//!
//! A guard is a runtime conditional comparing the platform version against
//! a literal. Inside the branch the comparison proves, the guaranteed
//! minimum version rises; guards can only raise the floor established by
//! outer scopes, never lower it.

use regex::Regex;
use tracing::trace;

use crate::analysis::context::EffectiveContext;
use crate::symbol::ApiLevel;

/// Comparison operator in a version guard, as written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl CompareOp {
    /// Mirror the operator for swapped operand order:
    /// `N op SDK_INT` reads the same as `SDK_INT (mirror op) N`.
    fn mirrored(self) -> CompareOp {
        match self {
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Le => CompareOp::Ge,
            CompareOp::Eq => CompareOp::Eq,
            CompareOp::Ge => CompareOp::Le,
            CompareOp::Gt => CompareOp::Lt,
        }
    }
}

/// One literal version comparison, e.g. `SDK_INT >= 23` or `23 <= SDK_INT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionGuardExpression {
    pub op: CompareOp,
    pub literal: ApiLevel,
    pub sdk_on_left: bool,
}

impl VersionGuardExpression {
    /// Comparison written with the version value on the left
    pub fn new(op: CompareOp, literal: ApiLevel) -> Self {
        Self {
            op,
            literal,
            sdk_on_left: true,
        }
    }

    /// Comparison written with the literal on the left
    pub fn reversed(op: CompareOp, literal: ApiLevel) -> Self {
        Self {
            op,
            literal,
            sdk_on_left: false,
        }
    }

    /// Canonical form with the version value on the left
    pub fn normalized(&self) -> (CompareOp, ApiLevel) {
        if self.sdk_on_left {
            (self.op, self.literal)
        } else {
            (self.op.mirrored(), self.literal)
        }
    }
}

impl std::fmt::Display for VersionGuardExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self.op {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Eq => "==",
            CompareOp::Ge => ">=",
            CompareOp::Gt => ">",
        };
        if self.sdk_on_left {
            write!(f, "SDK_INT {op} {}", self.literal)
        } else {
            write!(f, "{} {op} SDK_INT", self.literal)
        }
    }
}

/// Boolean structure of a guard condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardCondition {
    /// Literal version comparison
    Check(VersionGuardExpression),
    /// Boolean helper predicate recognized by name, e.g. `isAtLeastQ`
    Helper(String),
    And(Box<GuardCondition>, Box<GuardCondition>),
    Or(Box<GuardCondition>, Box<GuardCondition>),
    Not(Box<GuardCondition>),
    /// Anything the walker could not decode; never narrows
    Unknown,
}

impl GuardCondition {
    pub fn check(op: CompareOp, literal: ApiLevel) -> Self {
        GuardCondition::Check(VersionGuardExpression::new(op, literal))
    }

    pub fn helper(name: impl Into<String>) -> Self {
        GuardCondition::Helper(name.into())
    }

    pub fn and(a: GuardCondition, b: GuardCondition) -> Self {
        GuardCondition::And(Box::new(a), Box::new(b))
    }

    pub fn or(a: GuardCondition, b: GuardCondition) -> Self {
        GuardCondition::Or(Box::new(a), Box::new(b))
    }

    pub fn negated(c: GuardCondition) -> Self {
        GuardCondition::Not(Box::new(c))
    }
}

/// Where a usage site sits relative to a guard conditional
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchPosition {
    /// Inside the branch taken when the condition is true
    Then,
    /// Inside the branch taken when the condition is false
    Else,
    /// After the conditional, in the same block
    After,
}

/// One guard conditional as seen from a usage site's scope chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardScope {
    pub condition: GuardCondition,
    pub position: BranchPosition,
    /// Then-branch ends in an unconditional return/throw/fail-fast call
    pub then_exits: bool,
    /// Else-branch ends in an unconditional return/throw/fail-fast call
    pub else_exits: bool,
}

impl GuardScope {
    pub fn then_branch(condition: GuardCondition) -> Self {
        Self {
            condition,
            position: BranchPosition::Then,
            then_exits: false,
            else_exits: false,
        }
    }

    pub fn else_branch(condition: GuardCondition) -> Self {
        Self {
            condition,
            position: BranchPosition::Else,
            then_exits: false,
            else_exits: false,
        }
    }

    /// Code after the conditional, with the given branch-exit facts
    pub fn after(condition: GuardCondition, then_exits: bool, else_exits: bool) -> Self {
        Self {
            condition,
            position: BranchPosition::After,
            then_exits,
            else_exits,
        }
    }
}

/// Floors a condition proves on each branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BranchFloors {
    pub then_floor: Option<ApiLevel>,
    pub else_floor: Option<ApiLevel>,
    /// Exact version proven by an equality check on the then branch
    pub then_exact: Option<ApiLevel>,
}

/// Maps boolean helper predicates, recognized by method name, to the
/// version bound they stand for. Name matching is heuristic by nature, so
/// it lives behind this trait and new ecosystem helpers are added as
/// patterns rather than narrowing-logic changes.
pub trait HelperPredicateMatcher: Send + Sync {
    /// The level `name()` proves when it returns true, if recognized
    fn match_helper(&self, name: &str) -> Option<ApiLevel>;
}

/// Regex-backed matcher with the stock platform helpers preloaded
pub struct NamePatternMatcher {
    fixed: Vec<(Regex, ApiLevel)>,
    numeric: Regex,
}

impl NamePatternMatcher {
    pub fn empty() -> Self {
        Self {
            fixed: Vec::new(),
            numeric: Regex::new(r"^isAtLeast(?:Sdk|Api)?(\d+)$").unwrap(),
        }
    }

    /// Matcher preloaded with the `isAtLeast<Codename>` helpers
    pub fn with_defaults() -> Self {
        let mut matcher = Self::empty();
        let codenames: &[(&str, ApiLevel)] = &[
            ("N", 24),
            ("NMR1", 25),
            ("O", 26),
            ("OMR1", 27),
            ("P", 28),
            ("Q", 29),
            ("R", 30),
            ("S", 31),
            ("Sv2", 32),
            ("T", 33),
            ("U", 34),
            ("V", 35),
        ];
        for (codename, level) in codenames {
            matcher = matcher.pattern(&format!("^isAtLeast{codename}$"), *level);
        }
        matcher
    }

    /// Add a custom pattern; invalid regexes are ignored rather than
    /// failing analysis.
    pub fn pattern(mut self, regex: &str, level: ApiLevel) -> Self {
        if let Ok(re) = Regex::new(regex) {
            self.fixed.push((re, level));
        }
        self
    }
}

impl Default for NamePatternMatcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl HelperPredicateMatcher for NamePatternMatcher {
    fn match_helper(&self, name: &str) -> Option<ApiLevel> {
        for (re, level) in &self.fixed {
            if re.is_match(name) {
                return Some(*level);
            }
        }
        if let Some(caps) = self.numeric.captures(name) {
            return caps[1].parse().ok();
        }
        None
    }
}

/// Computes the floor a guard establishes for a usage site
pub struct GuardAnalyzer {
    matcher: Box<dyn HelperPredicateMatcher>,
}

impl GuardAnalyzer {
    pub fn new() -> Self {
        Self {
            matcher: Box::new(NamePatternMatcher::with_defaults()),
        }
    }

    pub fn with_matcher(matcher: Box<dyn HelperPredicateMatcher>) -> Self {
        Self { matcher }
    }

    /// Floors proven by a condition on each branch.
    ///
    /// Conjunctions accumulate then-floors (both sides hold when the whole
    /// condition is true) but prove nothing on the else branch; the dual
    /// holds for disjunctions. Unrecognized shapes never narrow.
    pub fn branch_floors(&self, condition: &GuardCondition) -> BranchFloors {
        match condition {
            GuardCondition::Check(expr) => match expr.normalized() {
                (CompareOp::Ge, n) => BranchFloors {
                    then_floor: Some(n),
                    ..Default::default()
                },
                (CompareOp::Gt, n) => BranchFloors {
                    then_floor: Some(n.saturating_add(1)),
                    ..Default::default()
                },
                (CompareOp::Lt, n) => BranchFloors {
                    else_floor: Some(n),
                    ..Default::default()
                },
                (CompareOp::Le, n) => BranchFloors {
                    else_floor: Some(n.saturating_add(1)),
                    ..Default::default()
                },
                (CompareOp::Eq, n) => BranchFloors {
                    then_floor: Some(n),
                    then_exact: Some(n),
                    else_floor: None,
                },
            },

            GuardCondition::Helper(name) => match self.matcher.match_helper(name) {
                Some(level) => {
                    trace!(helper = %name, level, "recognized helper predicate");
                    BranchFloors {
                        then_floor: Some(level),
                        ..Default::default()
                    }
                }
                None => BranchFloors::default(),
            },

            GuardCondition::And(a, b) => {
                let fa = self.branch_floors(a);
                let fb = self.branch_floors(b);
                BranchFloors {
                    then_floor: max_opt(fa.then_floor, fb.then_floor),
                    // !(A && B) leaves open which side failed
                    else_floor: None,
                    then_exact: fa.then_exact.or(fb.then_exact),
                }
            }

            GuardCondition::Or(a, b) => {
                let fa = self.branch_floors(a);
                let fb = self.branch_floors(b);
                BranchFloors {
                    // A || B leaves open which side was satisfied
                    then_floor: None,
                    // !(A || B) means both sides failed
                    else_floor: max_opt(fa.else_floor, fb.else_floor),
                    then_exact: None,
                }
            }

            GuardCondition::Not(inner) => {
                let f = self.branch_floors(inner);
                BranchFloors {
                    then_floor: f.else_floor,
                    else_floor: f.then_floor,
                    then_exact: None,
                }
            }

            GuardCondition::Unknown => BranchFloors::default(),
        }
    }

    /// Apply one guard frame to the context, per the usage site's position
    /// relative to the conditional.
    ///
    /// Per guard site the narrowing follows
    /// `Unguarded -> {PositiveBranch(floor), NegativeBranch(floor)}`, and a
    /// usage after the conditional inherits the surviving branch's floor
    /// when the other branch cannot fall through.
    pub fn narrow(&self, ctx: EffectiveContext, guard: &GuardScope) -> EffectiveContext {
        let floors = self.branch_floors(&guard.condition);

        let (floor, exact) = match guard.position {
            BranchPosition::Then => (floors.then_floor, floors.then_exact),
            BranchPosition::Else => (floors.else_floor, None),
            BranchPosition::After => match (guard.then_exits, guard.else_exits) {
                // Only the else path reaches code after the conditional
                (true, false) => (floors.else_floor, None),
                // Only the then path reaches code after the conditional
                (false, true) => (floors.then_floor, floors.then_exact),
                // Both branches exit: nothing after is reachable, keep the
                // stronger floor so no spurious finding is emitted
                (true, true) => (max_opt(floors.then_floor, floors.else_floor), None),
                (false, false) => (None, None),
            },
        };

        let mut ctx = match floor {
            Some(level) => ctx.with_guard_floor(level),
            None => ctx,
        };
        if let Some(level) = exact {
            ctx = ctx.with_max_guaranteed(level);
        }
        ctx
    }
}

impl Default for GuardAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn max_opt(a: Option<ApiLevel>, b: Option<ApiLevel>) -> Option<ApiLevel> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}
