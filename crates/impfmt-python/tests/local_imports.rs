//! Local-import resolution against package aggregators on disk.

use std::fs;
use std::path::{Path, PathBuf};

use impfmt_python::{transform, Engine, SkipReason, TransformOptions};
use tempfile::TempDir;

const AGGREGATOR: &str = "from .other import Bar as Baz\nfrom .submodule import Foo\n";

/// `pkg/` with an aggregator re-exporting `Foo` from `pkg/submodule.py`.
fn package() -> (TempDir, PathBuf) {
    let root = tempfile::tempdir().unwrap();
    let pkg = root.path().join("pkg");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(pkg.join("__init__.py"), AGGREGATOR).unwrap();
    fs::write(pkg.join("submodule.py"), "class Foo:\n    pass\n").unwrap();
    fs::write(pkg.join("other.py"), "class Bar:\n    pass\n").unwrap();
    (root, pkg)
}

fn module(dir: &Path, name: &str, source: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, source).unwrap();
    path
}

fn reasons(engine: &mut Engine, path: &Path) -> Vec<(String, SkipReason)> {
    engine
        .transform_file(path)
        .unwrap()
        .skipped
        .into_iter()
        .map(|skip| (skip.name, skip.reason))
        .collect()
}

#[test]
fn package_import_is_rewritten_to_submodule() {
    let (_root, pkg) = package();
    let path = module(&pkg, "consumer.py", "from pkg import Foo  # needed\n\nFoo()\n");
    let outcome = Engine::default().transform_file(&path).unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.output, "from .submodule import Foo  # needed\n\nFoo()\n");
    assert!(outcome.skipped.is_empty());
}

#[test]
fn relative_package_import_is_rewritten() {
    let (_root, pkg) = package();
    let path = module(&pkg, "consumer.py", "from . import Foo\n");
    let outcome = Engine::default().transform_file(&path).unwrap();
    assert_eq!(outcome.output, "from .submodule import Foo\n");
}

#[test]
fn rewrite_merges_with_existing_direct_import() {
    let (_root, pkg) = package();
    let path = module(
        &pkg,
        "consumer.py",
        "from .submodule import Foo\nfrom pkg import Foo\n",
    );
    let outcome = Engine::default().transform_file(&path).unwrap();
    assert_eq!(outcome.output, "from .submodule import Foo\n");
}

#[test]
fn aliased_import_is_left_alone() {
    let (_root, pkg) = package();
    let path = module(&pkg, "consumer.py", "from pkg import Foo as F\n");
    let mut engine = Engine::default();
    let outcome = engine.transform_file(&path).unwrap();
    assert!(!outcome.changed);
    assert_eq!(
        reasons(&mut engine, &path),
        vec![("pkg.Foo".to_string(), SkipReason::Aliased)]
    );
}

#[test]
fn names_not_re_exported_are_left_alone() {
    let (_root, pkg) = package();
    let path = module(&pkg, "consumer.py", "from pkg import Baz\nfrom pkg import Missing\n");
    let mut engine = Engine::default();
    assert!(!engine.transform_file(&path).unwrap().changed);
    assert_eq!(
        reasons(&mut engine, &path),
        vec![
            ("pkg.Baz".to_string(), SkipReason::NotReExported),
            ("pkg.Missing".to_string(), SkipReason::NotReExported),
        ]
    );
}

#[test]
fn other_packages_plain_and_star_imports_are_skipped() {
    let (_root, pkg) = package();
    let path = module(
        &pkg,
        "consumer.py",
        "from other import Foo\nfrom pkg import *\nimport pkg\n",
    );
    let mut engine = Engine::default();
    assert!(!engine.transform_file(&path).unwrap().changed);
    assert_eq!(
        reasons(&mut engine, &path),
        vec![
            ("other.Foo".to_string(), SkipReason::ForeignModule),
            ("pkg.*".to_string(), SkipReason::Wildcard),
            ("pkg".to_string(), SkipReason::PlainImport),
        ]
    );
}

#[test]
fn aggregator_is_never_rewritten() {
    let (_root, pkg) = package();
    let init = pkg.join("__init__.py");
    let mut engine = Engine::default();
    let outcome = engine.transform_file(&init).unwrap();
    assert!(!outcome.changed);
    assert!(outcome
        .skipped
        .iter()
        .any(|skip| skip.name == ".submodule.Foo" && skip.reason == SkipReason::IsAggregator));
}

#[test]
fn aggregator_is_read_once_and_never_written() {
    let (_root, pkg) = package();
    let first = module(&pkg, "first.py", "from pkg import Foo\n");
    let second = module(&pkg, "second.py", "from . import Foo\n");
    let mut engine = Engine::default();
    engine.transform_file(&first).unwrap();
    engine.transform_file(&second).unwrap();
    assert_eq!(engine.cache().len(), 1);
    assert!(engine.cache().contains(&pkg.join("__init__.py")));
    assert_eq!(fs::read_to_string(pkg.join("__init__.py")).unwrap(), AGGREGATOR);
    assert_eq!(fs::read_to_string(&first).unwrap(), "from pkg import Foo\n");
}

#[test]
fn files_outside_packages_have_no_aggregator() {
    let root = tempfile::tempdir().unwrap();
    let path = module(root.path(), "script.py", "from pkg import Foo\n");
    let mut engine = Engine::default();
    assert_eq!(
        reasons(&mut engine, &path),
        vec![("pkg.Foo".to_string(), SkipReason::NoAggregator)]
    );
}

#[test]
fn unparsable_aggregator_is_a_skip() {
    let root = tempfile::tempdir().unwrap();
    let pkg = root.path().join("pkg");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(pkg.join("__init__.py"), "from . import (\n").unwrap();
    let path = module(&pkg, "consumer.py", "from pkg import Foo\n");
    let mut engine = Engine::default();
    let outcome = engine.transform_file(&path).unwrap();
    assert!(!outcome.changed);
    assert_eq!(outcome.skipped[0].reason, SkipReason::AggregatorUnreadable);
}

#[test]
fn nested_package_identity() {
    let (_root, pkg) = package();
    let inner = pkg.join("inner");
    fs::create_dir_all(&inner).unwrap();
    fs::write(inner.join("__init__.py"), "from pkg.inner.impl import Thing\n").unwrap();
    let path = module(&inner, "user.py", "from pkg.inner import Thing\n");
    let outcome = Engine::default().transform_file(&path).unwrap();
    assert_eq!(outcome.output, "from pkg.inner.impl import Thing\n");
}

#[test]
fn resolution_can_be_disabled() {
    let (_root, pkg) = package();
    let path = module(&pkg, "consumer.py", "from pkg import Foo\n");
    let mut engine = Engine::new(TransformOptions {
        resolve_local_imports: Some(false),
        ..TransformOptions::default()
    });
    let outcome = engine.transform_file(&path).unwrap();
    assert!(!outcome.changed);
    assert!(outcome.skipped.is_empty());
}

#[test]
fn sources_without_a_path_are_not_resolved() {
    let outcome = transform("from pkg import Foo\n", &TransformOptions::default()).unwrap();
    assert!(!outcome.changed);
    assert!(outcome.skipped.is_empty());
}
