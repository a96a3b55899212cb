//! Integration tests for guard narrowing through the scope tree

use apicompat::analysis::guards::{CompareOp, GuardCondition, GuardScope, VersionGuardExpression};
use apicompat::config::HelperPattern;
use apicompat::driver::{AnalysisDriver, TranslationUnit};
use apicompat::symbol::scope::{ScopeId, ScopeKind, ScopeTree};
use apicompat::symbol::{Location, SymbolKind, SymbolReference};
use apicompat::{Config, VersionDatabase};
use std::path::PathBuf;

fn sample_db() -> VersionDatabase {
    VersionDatabase::builder()
        .member("android.app.Notification.Builder", "setColor", 23)
        .member("android.media.MediaCodec", "getCanonicalName", 29)
        .build()
}

fn loc(line: usize) -> Location {
    Location::new(PathBuf::from("src/Main.kt"), line, 5)
}

fn set_color(line: usize) -> SymbolReference {
    SymbolReference::new(
        SymbolKind::MethodCall,
        "android.app.Notification.Builder#setColor",
        loc(line),
    )
}

struct GuardedUnit {
    tree: ScopeTree,
    method: ScopeId,
}

fn method_scope() -> GuardedUnit {
    let mut tree = ScopeTree::new();
    let file = tree.root(ScopeKind::File);
    let method = tree.child(file, ScopeKind::Method);
    GuardedUnit { tree, method }
}

fn run(driver: &AnalysisDriver, tree: ScopeTree, scope: ScopeId, reference: SymbolReference) -> usize {
    let mut unit = TranslationUnit::new("src/Main.kt", tree);
    unit.add_reference(scope, reference);
    driver.analyze_unit(&unit).len()
}

#[test]
fn test_then_branch_narrows_else_does_not() {
    let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));

    let GuardedUnit { mut tree, method } = method_scope();
    let then_branch = tree.child(method, ScopeKind::GuardBranch);
    tree.set_guard(
        then_branch,
        GuardScope::then_branch(GuardCondition::check(CompareOp::Ge, 23)),
    );
    assert_eq!(run(&driver, tree, then_branch, set_color(5)), 0);

    let GuardedUnit { mut tree, method } = method_scope();
    let else_branch = tree.child(method, ScopeKind::GuardBranch);
    tree.set_guard(
        else_branch,
        GuardScope::else_branch(GuardCondition::check(CompareOp::Ge, 23)),
    );
    assert_eq!(run(&driver, tree, else_branch, set_color(7)), 1);
}

#[test]
fn test_less_than_guard_narrows_else_branch() {
    let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));

    // if (SDK_INT < 23) { ... } else { setColor() }
    let GuardedUnit { mut tree, method } = method_scope();
    let else_branch = tree.child(method, ScopeKind::GuardBranch);
    tree.set_guard(
        else_branch,
        GuardScope::else_branch(GuardCondition::check(CompareOp::Lt, 23)),
    );
    assert_eq!(run(&driver, tree, else_branch, set_color(6)), 0);
}

#[test]
fn test_early_return_propagates_floor_after_conditional() {
    let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));

    // if (SDK_INT < 23) { return; }
    // setColor()
    let GuardedUnit { mut tree, method } = method_scope();
    let after = tree.child(method, ScopeKind::GuardBranch);
    tree.set_guard(
        after,
        GuardScope::after(GuardCondition::check(CompareOp::Lt, 23), true, false),
    );
    assert_eq!(run(&driver, tree, after, set_color(8)), 0);
}

#[test]
fn test_early_throw_in_else_propagates_positive_floor() {
    let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));

    // if (SDK_INT >= 23) { } else { throw new IllegalStateException(); }
    // setColor()
    let GuardedUnit { mut tree, method } = method_scope();
    let after = tree.child(method, ScopeKind::GuardBranch);
    tree.set_guard(
        after,
        GuardScope::after(GuardCondition::check(CompareOp::Ge, 23), false, true),
    );
    assert_eq!(run(&driver, tree, after, set_color(8)), 0);
}

#[test]
fn test_fallthrough_conditional_does_not_narrow_after() {
    let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));

    // if (SDK_INT >= 23) { log(); }
    // setColor()
    let GuardedUnit { mut tree, method } = method_scope();
    let after = tree.child(method, ScopeKind::GuardBranch);
    tree.set_guard(
        after,
        GuardScope::after(GuardCondition::check(CompareOp::Ge, 23), false, false),
    );
    assert_eq!(run(&driver, tree, after, set_color(8)), 1);
}

#[test]
fn test_reversed_operand_order() {
    let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));

    // if (23 <= SDK_INT) { setColor() }
    let GuardedUnit { mut tree, method } = method_scope();
    let branch = tree.child(method, ScopeKind::GuardBranch);
    tree.set_guard(
        branch,
        GuardScope::then_branch(GuardCondition::Check(VersionGuardExpression::reversed(
            CompareOp::Le,
            23,
        ))),
    );
    assert_eq!(run(&driver, tree, branch, set_color(5)), 0);
}

#[test]
fn test_conjunction_accumulates_disjunction_does_not() {
    let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));

    // if (isEnabled && SDK_INT >= 23) { setColor() }
    let GuardedUnit { mut tree, method } = method_scope();
    let branch = tree.child(method, ScopeKind::GuardBranch);
    tree.set_guard(
        branch,
        GuardScope::then_branch(GuardCondition::and(
            GuardCondition::Unknown,
            GuardCondition::check(CompareOp::Ge, 23),
        )),
    );
    assert_eq!(run(&driver, tree, branch, set_color(5)), 0);

    // if (isEnabled || SDK_INT >= 23) { setColor() } proves nothing
    let GuardedUnit { mut tree, method } = method_scope();
    let branch = tree.child(method, ScopeKind::GuardBranch);
    tree.set_guard(
        branch,
        GuardScope::then_branch(GuardCondition::or(
            GuardCondition::Unknown,
            GuardCondition::check(CompareOp::Ge, 23),
        )),
    );
    assert_eq!(run(&driver, tree, branch, set_color(5)), 1);
}

#[test]
fn test_negated_disjunction_narrows_else() {
    let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));

    // if (SDK_INT < 23 || disabled) { return; } else { setColor() }
    // Both disjuncts are false in the else branch.
    let GuardedUnit { mut tree, method } = method_scope();
    let branch = tree.child(method, ScopeKind::GuardBranch);
    tree.set_guard(
        branch,
        GuardScope::else_branch(GuardCondition::or(
            GuardCondition::check(CompareOp::Lt, 23),
            GuardCondition::Unknown,
        )),
    );
    assert_eq!(run(&driver, tree, branch, set_color(6)), 0);
}

#[test]
fn test_equality_guard_is_exact() {
    let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));

    // if (SDK_INT == 23) { setColor() } -- fine for a 23-level symbol
    let GuardedUnit { mut tree, method } = method_scope();
    let branch = tree.child(method, ScopeKind::GuardBranch);
    tree.set_guard(
        branch,
        GuardScope::then_branch(GuardCondition::check(CompareOp::Eq, 23)),
    );
    assert_eq!(run(&driver, tree, branch, set_color(5)), 0);

    // -- but not for a 29-level symbol
    let GuardedUnit { mut tree, method } = method_scope();
    let branch = tree.child(method, ScopeKind::GuardBranch);
    tree.set_guard(
        branch,
        GuardScope::then_branch(GuardCondition::check(CompareOp::Eq, 23)),
    );
    let newer = SymbolReference::new(
        SymbolKind::MethodCall,
        "android.media.MediaCodec#getCanonicalName",
        loc(5),
    );
    assert_eq!(run(&driver, tree, branch, newer), 1);
}

#[test]
fn test_helper_predicate_recognized_by_name() {
    let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));

    // if (BuildCompat.isAtLeastQ()) { getCanonicalName() }
    let GuardedUnit { mut tree, method } = method_scope();
    let branch = tree.child(method, ScopeKind::GuardBranch);
    tree.set_guard(
        branch,
        GuardScope::then_branch(GuardCondition::helper("isAtLeastQ")),
    );
    let newer = SymbolReference::new(
        SymbolKind::MethodCall,
        "android.media.MediaCodec#getCanonicalName",
        loc(5),
    );
    assert_eq!(run(&driver, tree, branch, newer), 0);
}

#[test]
fn test_custom_helper_pattern_from_config() {
    let mut config = Config::new(21, 33);
    config.helpers.push(HelperPattern {
        pattern: "^supportsColoredNotifications$".to_string(),
        level: 23,
    });
    let driver = AnalysisDriver::new(sample_db(), config);

    let GuardedUnit { mut tree, method } = method_scope();
    let branch = tree.child(method, ScopeKind::GuardBranch);
    tree.set_guard(
        branch,
        GuardScope::then_branch(GuardCondition::helper("supportsColoredNotifications")),
    );
    assert_eq!(run(&driver, tree, branch, set_color(5)), 0);
}

#[test]
fn test_unrecognized_condition_never_narrows() {
    let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));

    let GuardedUnit { mut tree, method } = method_scope();
    let branch = tree.child(method, ScopeKind::GuardBranch);
    tree.set_guard(branch, GuardScope::then_branch(GuardCondition::Unknown));
    assert_eq!(run(&driver, tree, branch, set_color(5)), 1);
}

#[test]
fn test_nested_guards_are_monotone() {
    let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));

    // if (SDK_INT >= 23) { if (SDK_INT >= 21) { setColor() } }
    // The weaker inner guard must not lower the floor the outer one set.
    let GuardedUnit { mut tree, method } = method_scope();
    let outer = tree.child(method, ScopeKind::GuardBranch);
    tree.set_guard(
        outer,
        GuardScope::then_branch(GuardCondition::check(CompareOp::Ge, 23)),
    );
    let inner = tree.child(outer, ScopeKind::GuardBranch);
    tree.set_guard(
        inner,
        GuardScope::then_branch(GuardCondition::check(CompareOp::Ge, 21)),
    );
    assert_eq!(run(&driver, tree, inner, set_color(6)), 0);
}

#[test]
fn test_effective_floor_is_monotone_along_chain() {
    let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));

    let mut tree = ScopeTree::new();
    let file = tree.root(ScopeKind::File);
    let method = tree.child(file, ScopeKind::Method);
    let outer = tree.child(method, ScopeKind::GuardBranch);
    tree.set_guard(
        outer,
        GuardScope::then_branch(GuardCondition::check(CompareOp::Ge, 24)),
    );
    let inner = tree.child(outer, ScopeKind::GuardBranch);
    tree.set_guard(
        inner,
        GuardScope::then_branch(GuardCondition::check(CompareOp::Ge, 26)),
    );

    let mut previous = 0;
    for scope in [file, method, outer, inner] {
        let floor = driver.context_for(&tree, scope).flow_floor();
        assert!(floor >= previous, "floor dropped from {previous} to {floor}");
        assert!(floor >= driver.config().min_sdk);
        previous = floor;
    }
}
