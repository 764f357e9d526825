//! Block region matching over the marker stream
//!
//! A region is a `<!--begin:NAME-->` marker, its body, and the
//! `<!--end:NAME-->` marker that closes it. Names compare ASCII
//! case-insensitively. Only top-level regions are returned; the body of each
//! region is scanned again when its child block is built.

use crate::config::MatchMode;

use super::lexer::{self, Span, Token};

/// A matched top-level region
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Name as written in the begin marker
    pub name: String,
    /// Full span, markers included
    pub span: Span,
    /// Span of the text between the markers
    pub body: Span,
}

/// Result of scanning one level of a template
#[derive(Debug, Default)]
pub struct Scan {
    /// Regions in source order
    pub regions: Vec<Region>,
    /// Begin markers at this level that no end marker closes
    pub unterminated: Vec<(String, Span)>,
    /// End markers at this level that close no region
    pub stray_ends: Vec<(String, Span)>,
}

/// Find the top-level regions of `text`
pub fn scan(text: &str, mode: MatchMode) -> Scan {
    let markers = lexer::markers(text);
    let mut result = Scan::default();
    let mut i = 0;

    while i < markers.len() {
        let (token, span) = &markers[i];
        match token {
            Token::Begin(name) => {
                let close = match mode {
                    MatchMode::Greedy => find_last_end(&markers, i, name),
                    MatchMode::Nested => find_balanced_end(&markers, i, name),
                };
                match close {
                    Some(j) => {
                        let end_span = &markers[j].1;
                        result.regions.push(Region {
                            name: name.clone(),
                            span: span.start..end_span.end,
                            body: span.end..end_span.start,
                        });
                        i = j + 1;
                    }
                    None => {
                        result.unterminated.push((name.clone(), span.clone()));
                        i += 1;
                    }
                }
            }
            Token::End(name) => {
                result.stray_ends.push((name.clone(), span.clone()));
                i += 1;
            }
            _ => i += 1,
        }
    }

    result
}

fn same_name(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Index of the last end marker named `name` after `begin`
fn find_last_end(markers: &[(Token, Span)], begin: usize, name: &str) -> Option<usize> {
    markers
        .iter()
        .enumerate()
        .skip(begin + 1)
        .rev()
        .find(|(_, (tok, _))| matches!(tok, Token::End(n) if same_name(n, name)))
        .map(|(j, _)| j)
}

/// Index of the end marker that balances `begin`, counting same-named nesting
fn find_balanced_end(markers: &[(Token, Span)], begin: usize, name: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (j, (tok, _)) in markers.iter().enumerate().skip(begin + 1) {
        match tok {
            Token::Begin(n) if same_name(n, name) => depth += 1,
            Token::End(n) if same_name(n, name) => {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
            }
            _ => {}
        }
    }
    None
}
