//! Integration tests for the markup lint pass

use std::fs;
use std::path::Path;

use blocktpl::{lint, LintCategory, Resolver, Template, TemplateConfig};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_broken_fixture_all_categories() {
    let path = fixture("broken.html");
    let source = fs::read_to_string(&path).unwrap();
    let warnings = lint::check(&source, &TemplateConfig::default(), &Resolver::for_file(&path));

    let categories: Vec<LintCategory> = warnings.iter().map(|w| w.category).collect();
    assert_eq!(
        categories,
        vec![
            LintCategory::Unterminated,
            LintCategory::StrayEnd,
            LintCategory::MissingInclude
        ]
    );
}

#[test]
fn test_page_fixture_only_missing_include() {
    let path = fixture("page.html");
    let source = fs::read_to_string(&path).unwrap();
    let warnings = lint::check(&source, &TemplateConfig::default(), &Resolver::for_file(&path));

    assert_eq!(warnings.len(), 1, "got: {:?}", warnings);
    assert_eq!(warnings[0].category, LintCategory::MissingInclude);
    assert!(warnings[0].message.contains("./missing.html"));
}

#[test]
fn test_report_fixture_clean() {
    let path = fixture("report.txt");
    let source = fs::read_to_string(&path).unwrap();
    let warnings = lint::check(&source, &TemplateConfig::default(), &Resolver::for_file(&path));
    assert!(
        warnings.is_empty(),
        "Expected no warnings, got: {:?}",
        warnings
            .iter()
            .map(|w| format!("{}: {}", w.category, w.message))
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_lint_does_not_change_rendering() {
    let path = fixture("broken.html");
    let mut tpl = Template::from_file(&path, TemplateConfig::default()).unwrap();
    tpl.block_mut("ok").unwrap().parse();
    let out = tpl.print(false);
    assert!(out.starts_with("fine\n<!--begin:open-->never closed\n<!--end:gone-->"));
    assert!(out.contains(r#"{FILE "./nowhere.html"}"#));
}

#[test]
fn test_warning_format() {
    let path = fixture("broken.html");
    let source = fs::read_to_string(&path).unwrap();
    let warnings = lint::check(&source, &TemplateConfig::default(), &Resolver::for_file(&path));

    for w in &warnings {
        let report = w.format(&source, "broken.html");
        assert!(report.contains(&w.category.to_string()), "report: {}", report);
    }
}
