//! Lint pass for template markup.
//!
//! Rendering never fails on textual irregularities: unterminated markers stay
//! literal and missing includes stay in place. This pass reports them so
//! template authors can find them. It walks the raw source (includes are not
//! spliced), so every span points into the text that was linted.

use std::collections::HashSet;
use std::fmt;

use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::config::TemplateConfig;
use crate::error::Span;
use crate::parser::{lexer, scan, Resolver, MAX_NESTING_DEPTH};

/// A lint warning about template markup
#[derive(Debug)]
pub struct LintWarning {
    pub category: LintCategory,
    pub message: String,
    pub span: Span,
}

/// Category of lint defect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintCategory {
    Unterminated,
    StrayEnd,
    Duplicate,
    MissingInclude,
}

impl fmt::Display for LintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintCategory::Unterminated => write!(f, "unterminated"),
            LintCategory::StrayEnd => write!(f, "stray-end"),
            LintCategory::Duplicate => write!(f, "duplicate"),
            LintCategory::MissingInclude => write!(f, "missing-include"),
        }
    }
}

impl LintWarning {
    /// Format the warning with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Warning, filename, self.span.start)
            .with_message(format!("[{}] {}", self.category, self.message))
            .with_label(
                Label::new((filename, self.span.clone()))
                    .with_message(&self.message)
                    .with_color(Color::Yellow),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => format!("warning[{}]: {}", self.category, self.message),
        }
    }
}

/// Run all lint checks on a template source.
///
/// `resolver` decides whether an inclusion token points at a readable file.
pub fn check(source: &str, config: &TemplateConfig, resolver: &Resolver) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    check_includes(source, resolver, &mut warnings);
    check_level(source, 0, 0, config, &mut warnings);
    warnings.sort_by_key(|w| w.span.start);
    warnings
}

// ── Includes ──────────────────────────────────────────────────────

fn check_includes(source: &str, resolver: &Resolver, warnings: &mut Vec<LintWarning>) {
    for (path, span) in lexer::includes(source) {
        if resolver.read(&path).is_none() {
            warnings.push(LintWarning {
                category: LintCategory::MissingInclude,
                message: format!(
                    "include '{}' not found (looked at {}), token is left in the output",
                    path,
                    resolver.qualify(&path).display()
                ),
                span,
            });
        }
    }
}

// ── Block markers ─────────────────────────────────────────────────

/// Check one level of regions, then recurse into each region body.
/// `offset` is the position of `text` within the linted source. Levels past
/// the parser's nesting limit are not checked, they render as text.
fn check_level(
    text: &str,
    offset: usize,
    depth: usize,
    config: &TemplateConfig,
    warnings: &mut Vec<LintWarning>,
) {
    if depth > MAX_NESTING_DEPTH {
        return;
    }
    let scanned = scan(text, config.match_mode);
    let shift = |span: &Span| span.start + offset..span.end + offset;

    for (name, span) in &scanned.unterminated {
        warnings.push(LintWarning {
            category: LintCategory::Unterminated,
            message: format!("block '{}' has no matching end marker, rendered as text", name),
            span: shift(span),
        });
    }

    for (name, span) in &scanned.stray_ends {
        warnings.push(LintWarning {
            category: LintCategory::StrayEnd,
            message: format!("end marker for '{}' closes no block, rendered as text", name),
            span: shift(span),
        });
    }

    let mut seen = HashSet::new();
    for region in &scanned.regions {
        if !seen.insert(region.name.as_str()) {
            warnings.push(LintWarning {
                category: LintCategory::Duplicate,
                message: format!(
                    "block '{}' is defined more than once at this level, the last definition wins",
                    region.name
                ),
                span: shift(&region.span),
            });
        }
        check_level(
            &text[region.body.clone()],
            offset + region.body.start,
            depth + 1,
            config,
            warnings,
        );
    }
}
