//! Lexer for template markup using logos
//!
//! Only the structural markers are reported. Everything else in the template
//! is plain text and is filtered out of the token stream.

use logos::{Lexer, Logos};

pub use crate::error::Span;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    /// `<!--begin:NAME-->`, keyword matched case-insensitively
    #[regex(r"<!--[bB][eE][gG][iI][nN]:", marker_name)]
    Begin(String),

    /// `<!--end:NAME-->`, keyword matched case-insensitively
    #[regex(r"<!--[eE][nN][dD]:", marker_name)]
    End(String),

    /// `{FILE "path"}`; the path has no escaping and cannot contain `"`
    #[regex(r#"\{FILE "[^"]*"\}"#, |lex| {
        let s = lex.slice();
        s[7..s.len() - 2].to_string()
    })]
    Include(String),

    /// `{name}` with an identifier-like name (dotted keys included)
    #[regex(r"\{[A-Za-z0-9_.\-]+\}", |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    Variable(String),

    // Plain text. The single-character tokens let the lexer fall back
    // cleanly when a `<` or `{` does not start a marker.
    #[regex(r"[^<{]+")]
    #[token("<")]
    #[token("{")]
    Text,
}

/// Read the block name after a marker keyword, up to the first `-->`.
///
/// A name may not contain `<` or `>`. When it does, only the keyword is
/// consumed as an error, so a later well-formed marker still lexes.
/// Whitespace between the colon and the name is not part of the name.
fn marker_name(lex: &mut Lexer<Token>) -> Option<String> {
    let rest = lex.remainder();
    let close = rest.find(MARKER_CLOSE)?;
    let name = &rest[..close];
    if name.contains(|c: char| c == '<' || c == '>') {
        return None;
    }
    let name = name.trim_start().to_string();
    lex.bump(close + MARKER_CLOSE.len());
    Some(name)
}

const MARKER_CLOSE: &str = "-->";

impl Token {
    /// The block name carried by a begin or end marker
    pub fn marker(&self) -> Option<&str> {
        match self {
            Token::Begin(name) | Token::End(name) => Some(name),
            _ => None,
        }
    }
}

/// Lex input string into structural tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
        .filter(|(tok, _)| *tok != Token::Text)
}

/// Block markers only, in source order
pub fn markers(input: &str) -> Vec<(Token, Span)> {
    lex(input)
        .filter(|(tok, _)| tok.marker().is_some())
        .collect()
}

/// Inclusion tokens only, in source order
pub fn includes(input: &str) -> Vec<(String, Span)> {
    lex(input)
        .filter_map(|(tok, span)| match tok {
            Token::Include(path) => Some((path, span)),
            _ => None,
        })
        .collect()
}

/// Variable placeholder names, in source order
pub fn variables(input: &str) -> Vec<(String, Span)> {
    lex(input)
        .filter_map(|(tok, span)| match tok {
            Token::Variable(name) => Some((name, span)),
            _ => None,
        })
        .collect()
}
