//! Unit tests for registry loading and report rendering.
//!
//! These exercise pure parsing and formatting without any external
//! programs.

mod helpers;

use helpers::{TestEnv, REGISTRY};
use libstack::registry::{Registry, RuntimeEntry};
use libstack::table;
use libstack::Error;
use pretty_assertions::assert_eq;
use std::fs;

// =============================================================================
// registry.rs tests
// =============================================================================

#[test]
fn test_load_missing_registry_is_config_error() {
    let env = TestEnv::new();
    let err = Registry::load(&env.config.registry_path).unwrap_err();
    assert!(matches!(err, Error::Config(_)), "got {:?}", err);
}

#[test]
fn test_load_malformed_registry() {
    let env = TestEnv::new();
    fs::write(&env.config.registry_path, "libraries: [unclosed").unwrap();
    let err = Registry::load(&env.config.registry_path).unwrap_err();
    assert!(matches!(err, Error::Yaml { .. }), "got {:?}", err);
}

#[test]
fn test_libraries_sorted_by_id() {
    let registry = Registry::from_yaml(REGISTRY).unwrap();
    let ids: Vec<&str> = registry.libraries().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["foo", "headeronly", "numpy", "stdlib-only"]);
}

#[test]
fn test_lookup_unknown_is_not_found() {
    let registry = Registry::from_yaml(REGISTRY).unwrap();
    assert!(matches!(registry.lookup("nope"), Err(Error::NotFound(id)) if id == "nope"));
}

#[test]
fn test_build_image_defaults_to_runtime() {
    let yaml = r#"
runtimes:
  - runtime: gcc
libraries:
  a:
    lang: C
    name: A
    version: '1'
    runtime: gcc
  b:
    lang: C
    name: B
    version: '1'
    runtime: gcc
    build-image: gcc-cuda
"#;
    let registry = Registry::from_yaml(yaml).unwrap();
    assert_eq!(registry.lookup("a").unwrap().build_image(), "gcc");
    assert_eq!(registry.lookup("b").unwrap().build_image(), "gcc-cuda");
}

#[test]
fn test_undeclared_runtime_rejected() {
    let yaml = r#"
runtimes:
  - runtime: gcc
libraries:
  a:
    lang: C
    name: A
    version: '1'
    runtime: clang
"#;
    let err = Registry::from_yaml(yaml).unwrap_err();
    assert!(
        matches!(&err, Error::Config(msg) if msg.contains("clang")),
        "got {:?}",
        err
    );
}

#[test]
fn test_build_script_requires_source() {
    let yaml = r#"
runtimes:
  - runtime: gcc
libraries:
  a:
    lang: C
    name: A
    version: '1'
    runtime: gcc
    build-script: a.sh
"#;
    assert!(matches!(Registry::from_yaml(yaml), Err(Error::Config(_))));
}

#[test]
fn test_missing_version_is_missing_field() {
    let yaml = r#"
runtimes:
  - runtime: gcc
libraries:
  a:
    lang: C
    name: A
    runtime: gcc
"#;
    match Registry::from_yaml(yaml) {
        Err(Error::MissingField { id, field }) => {
            assert_eq!(id, "a");
            assert_eq!(field, "version");
        }
        other => panic!("expected MissingField, got {:?}", other),
    }
}

#[test]
fn test_duplicate_runtime_rejected() {
    let yaml = "runtimes:\n  - runtime: gcc\n  - runtime: gcc\n";
    assert!(matches!(Registry::from_yaml(yaml), Err(Error::Config(_))));
}

#[test]
fn test_unquoted_float_version() {
    let yaml = r#"
runtimes:
  - runtime: gcc
libraries:
  a:
    lang: C
    name: A
    version: 2.5
    runtime: gcc
"#;
    let registry = Registry::from_yaml(yaml).unwrap();
    assert_eq!(registry.lookup("a").unwrap().version, "2.5");
}

#[test]
fn test_libraries_for_runtime() {
    let registry = Registry::from_yaml(REGISTRY).unwrap();
    let python = RuntimeEntry {
        runtime: "python".into(),
    };
    let all = RuntimeEntry {
        runtime: "all".into(),
    };
    let ids: Vec<&str> = registry
        .libraries_for_runtime(&python)
        .map(|l| l.id.as_str())
        .collect();
    assert_eq!(ids, vec!["numpy", "stdlib-only"]);
    assert_eq!(registry.libraries_for_runtime(&all).count(), 4);
}

// =============================================================================
// table.rs tests
// =============================================================================

#[test]
fn test_list_table() {
    let registry = Registry::from_yaml(REGISTRY).unwrap();
    let rendered = table::library_table(&registry).render_fixed("");
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(
        lines[0],
        "ID           Language  Name         Version  Runtime"
    );
    assert_eq!(
        lines[2],
        "foo          C++       Foo          2.0      gcc"
    );
    assert!(lines[5].starts_with("stdlib-only  Python"));
}

#[test]
fn test_readme_table_links_homepage() {
    let registry = Registry::from_yaml(REGISTRY).unwrap();
    let markdown = table::library_table_markdown(&registry);
    assert!(markdown.starts_with("| ID | Language | Name | Version | Runtime |\n"));
    assert!(markdown.contains("| foo | C++ | [Foo](https://example.com/foo) | 2.0 | gcc |"));
    assert!(markdown.contains("| numpy | Python | NumPy | 1.26.4 | python |"));
}
