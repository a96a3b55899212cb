//! Integration tests for verdict evaluation across the full pipeline

use apicompat::analysis::guards::{CompareOp, GuardCondition, GuardScope};
use apicompat::analysis::{ApiIssue, ReasonCode, Severity, VersionAnnotation};
use apicompat::driver::{AnalysisDriver, TranslationUnit};
use apicompat::symbol::scope::{ScopeId, ScopeKind, ScopeTree};
use apicompat::symbol::{Location, ReferenceDetail, SymbolKind, SymbolReference};
use apicompat::{Config, VersionDatabase};
use std::path::PathBuf;

/// Honor RUST_LOG for debugging individual tests
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn sample_db() -> VersionDatabase {
    VersionDatabase::builder()
        .member("android.app.Notification.Builder", "setColor", 23)
        .member("android.os.Build.VERSION_CODES", "Q", 29)
        .class("android.system.ErrnoException", 21)
        .class("java.util.concurrent.ConcurrentHashMap.KeySetView", 24)
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

/// File scope plus one method scope
fn method_tree() -> (ScopeTree, ScopeId) {
    let mut tree = ScopeTree::new();
    let file = tree.root(ScopeKind::File);
    let method = tree.child(file, ScopeKind::Method);
    (tree, method)
}

mod unguarded_references {
    use super::*;

    // Symbol requires level 23, minSdk is 21, no guard
    #[test]
    fn test_call_above_min_sdk_is_error() {
        super::init_tracing();
        let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));
        let (tree, method) = method_tree();
        let mut unit = TranslationUnit::new("src/Main.kt", tree);
        unit.add_reference(method, set_color(4));

        let findings = driver.analyze_unit(&unit);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].issue, ApiIssue::NewApi);
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[0].required_level, 23);
        assert_eq!(findings[0].effective_min, 21);
    }

    // Same symbol with a project-wide minSdk at the required level
    #[test]
    fn test_call_at_min_sdk_is_clean() {
        let driver = AnalysisDriver::new(sample_db(), Config::new(23, 33));
        let (tree, method) = method_tree();
        let mut unit = TranslationUnit::new("src/Main.kt", tree);
        unit.add_reference(method, set_color(4));

        assert!(driver.analyze_unit(&unit).is_empty());
    }
}

mod guarded_references {
    use super::*;

    // Same symbol inside if (SDK_INT >= 23) { ... }
    #[test]
    fn test_sufficient_guard_clears_call() {
        let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));
        let mut tree = ScopeTree::new();
        let file = tree.root(ScopeKind::File);
        let method = tree.child(file, ScopeKind::Method);
        let branch = tree.child(method, ScopeKind::GuardBranch);
        tree.set_guard(
            branch,
            GuardScope::then_branch(GuardCondition::check(CompareOp::Ge, 23)),
        );

        let mut unit = TranslationUnit::new("src/Main.kt", tree);
        unit.add_reference(branch, set_color(5));

        assert!(driver.analyze_unit(&unit).is_empty());
    }

    #[test]
    fn test_insufficient_guard_still_flags() {
        let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));
        let mut tree = ScopeTree::new();
        let file = tree.root(ScopeKind::File);
        let method = tree.child(file, ScopeKind::Method);
        let branch = tree.child(method, ScopeKind::GuardBranch);
        tree.set_guard(
            branch,
            GuardScope::then_branch(GuardCondition::check(CompareOp::Ge, 22)),
        );

        let mut unit = TranslationUnit::new("src/Main.kt", tree);
        unit.add_reference(branch, set_color(5));

        let findings = driver.analyze_unit(&unit);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].effective_min, 22);
    }
}

mod inlined_constants {
    use super::*;

    // Compile-time-inlined constant requiring 29, minSdk 21, no guard
    #[test]
    fn test_inlined_constant_is_warning_not_error() {
        let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));
        let (tree, method) = method_tree();
        let mut unit = TranslationUnit::new("src/Main.kt", tree);
        unit.add_reference(
            method,
            SymbolReference::new(
                SymbolKind::FieldRead,
                "android.os.Build.VERSION_CODES#Q",
                loc(7),
            )
            .with_detail(ReferenceDetail::ConstantField { inlined: true }),
        );

        let findings = driver.analyze_unit(&unit);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].issue, ApiIssue::InlinedApi);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].required_level, 29);
    }
}

mod exception_catches {
    use super::*;

    fn catch_errno(line: usize) -> SymbolReference {
        SymbolReference::new(
            SymbolKind::ExceptionCatch,
            "android.system.ErrnoException",
            loc(line),
        )
    }

    // Catching a type that does not exist below 21, guarded only by a
    // preceding SDK_INT >= 21 check: the guard cannot prevent the class
    // verifier from rejecting the catch clause at class-load time.
    #[test]
    fn test_guard_does_not_clear_catch() {
        let driver = AnalysisDriver::new(sample_db(), Config::new(19, 33));
        let mut tree = ScopeTree::new();
        let file = tree.root(ScopeKind::File);
        let method = tree.child(file, ScopeKind::Method);
        let branch = tree.child(method, ScopeKind::GuardBranch);
        tree.set_guard(
            branch,
            GuardScope::then_branch(GuardCondition::check(CompareOp::Ge, 21)),
        );

        let mut unit = TranslationUnit::new("src/Main.kt", tree);
        unit.add_reference(branch, catch_errno(6));

        let findings = driver.analyze_unit(&unit);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[0].reason, ReasonCode::ClassLoadRisk);
    }

    // A declaration-level requirement annotation does clear it
    #[test]
    fn test_class_annotation_clears_catch() {
        let driver = AnalysisDriver::new(sample_db(), Config::new(19, 33));
        let mut tree = ScopeTree::new();
        let file = tree.root(ScopeKind::File);
        let class = tree.child(file, ScopeKind::Class);
        let method = tree.child(class, ScopeKind::Method);
        tree.annotate(class, VersionAnnotation::requires(21));

        let mut unit = TranslationUnit::new("src/Main.kt", tree);
        unit.add_reference(method, catch_errno(6));

        assert!(driver.analyze_unit(&unit).is_empty());
    }

    #[test]
    fn test_multi_catch_supertype_reason() {
        let db = VersionDatabase::builder()
            .class("java.lang.ReflectiveOperationException", 19)
            .class("java.lang.IllegalAccessException", 1)
            .class("java.lang.InstantiationException", 1)
            .build();
        let driver = AnalysisDriver::new(db, Config::new(16, 33));
        let (tree, method) = method_tree();
        let mut unit = TranslationUnit::new("src/Main.kt", tree);
        unit.add_reference(
            method,
            SymbolReference::new(SymbolKind::ExceptionCatch, "multi-catch", loc(9)).with_detail(
                ReferenceDetail::MultiCatch {
                    disjuncts: vec![
                        "java.lang.IllegalAccessException".to_string(),
                        "java.lang.InstantiationException".to_string(),
                    ],
                    compiled_supertype: Some(
                        "java.lang.ReflectiveOperationException".to_string(),
                    ),
                },
            ),
        );

        let findings = driver.analyze_unit(&unit);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].reason, ReasonCode::ExceptionSupertype);
        assert_eq!(findings[0].required_level, 19);
    }
}

mod nested_annotations {
    use super::*;

    // Inner annotation requiring 22 nested inside an outer scope requiring
    // 23: the inner one is advisory-redundant and the effective floor for
    // nested references stays 23.
    #[test]
    fn test_redundant_inner_annotation() {
        let driver = AnalysisDriver::new(sample_db(), Config::new(14, 33));
        let mut tree = ScopeTree::new();
        let file = tree.root(ScopeKind::File);
        let class = tree.child(file, ScopeKind::Class);
        let method = tree.child(class, ScopeKind::Method);
        tree.annotate(class, VersionAnnotation::requires(23));
        tree.annotate(method, VersionAnnotation::requires(22));
        tree.set_location(method, loc(12));

        let mut unit = TranslationUnit::new("src/Main.kt", tree);
        unit.add_reference(method, set_color(14));

        let findings = driver.analyze_unit(&unit);
        // The reference itself is clean (floor 23); only the redundant
        // annotation advisory remains.
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].issue, ApiIssue::ObsoleteSdkInt);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].required_level, 22);
        assert_eq!(findings[0].effective_min, 23);
    }

    #[test]
    fn test_annotation_floor_reaches_nested_anonymous_classes() {
        let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));
        let mut tree = ScopeTree::new();
        let file = tree.root(ScopeKind::File);
        let class = tree.child(file, ScopeKind::Class);
        let method = tree.child(class, ScopeKind::Method);
        let lambda = tree.child(method, ScopeKind::Lambda);
        let anon = tree.child(lambda, ScopeKind::AnonymousClass);
        tree.annotate(class, VersionAnnotation::requires(23));

        let mut unit = TranslationUnit::new("src/Main.kt", tree);
        unit.add_reference(anon, set_color(20));

        assert!(driver.analyze_unit(&unit).is_empty());
    }
}

mod special_rules {
    use super::*;

    #[test]
    fn test_default_interface_method_fixed_level() {
        let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));
        let (tree, method) = method_tree();
        let mut unit = TranslationUnit::new("src/Main.kt", tree);
        unit.add_reference(
            method,
            SymbolReference::new(
                SymbolKind::MethodOverride,
                "com.example.Listener#onEvent",
                loc(3),
            )
            .with_detail(ReferenceDetail::InterfaceMethod {
                has_body: true,
                is_static: false,
            }),
        );

        let findings = driver.analyze_unit(&unit);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].reason, ReasonCode::DefaultInterfaceMethod);
        assert_eq!(findings[0].required_level, 24);
    }

    #[test]
    fn test_iterated_view_checks_concrete_type() {
        let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));
        let (tree, method) = method_tree();
        let mut unit = TranslationUnit::new("src/Main.kt", tree);
        unit.add_reference(
            method,
            SymbolReference::new(SymbolKind::MethodCall, "java.util.Set#iterator", loc(8))
                .with_detail(ReferenceDetail::IteratedView {
                    view_type: "java.util.concurrent.ConcurrentHashMap.KeySetView".to_string(),
                }),
        );

        let findings = driver.analyze_unit(&unit);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].reason, ReasonCode::IteratedViewType);
        assert_eq!(findings[0].required_level, 24);
    }

    #[test]
    fn test_moved_member_is_not_over_reported() {
        let db = VersionDatabase::builder()
            .member("android.widget.TextView", "setTextAppearance", 23)
            .member("android.widget.TextViewBase", "setTextAppearance", 1)
            .supertype("android.widget.TextView", "android.widget.TextViewBase")
            .build();
        let driver = AnalysisDriver::new(db, Config::new(19, 33));
        let (tree, method) = method_tree();
        let mut unit = TranslationUnit::new("src/Main.kt", tree);
        unit.add_reference(
            method,
            SymbolReference::new(
                SymbolKind::MethodCall,
                "android.widget.TextView#setTextAppearance",
                loc(4),
            ),
        );

        assert!(driver.analyze_unit(&unit).is_empty());
    }
}

mod determinism {
    use super::*;

    #[test]
    fn test_repeated_runs_identical() {
        let driver = AnalysisDriver::new(sample_db(), Config::new(21, 33));
        let mut tree = ScopeTree::new();
        let file = tree.root(ScopeKind::File);
        let method = tree.child(file, ScopeKind::Method);

        let mut unit = TranslationUnit::new("src/Main.kt", tree);
        unit.add_reference(method, set_color(4));
        unit.add_reference(
            method,
            SymbolReference::new(
                SymbolKind::FieldRead,
                "android.os.Build.VERSION_CODES#Q",
                loc(9),
            )
            .with_detail(ReferenceDetail::ConstantField { inlined: true }),
        );

        let first = driver.analyze_unit(&unit);
        for _ in 0..5 {
            assert_eq!(driver.analyze_unit(&unit), first);
        }
    }
}
