//! Block nodes - variable binding and the parse/flush render protocol
//!
//! Every block owns a template fragment in which child regions have been
//! replaced by `##name##` placeholders. Rendering is split in two steps:
//!
//! - [`Block::parse`] renders a snapshot of the current state and appends it
//!   to the block's buffer. Calling it repeatedly with different variables is
//!   how a region is repeated once per data row.
//! - [`Block::flush`] hands out everything accumulated so far and empties the
//!   buffer. A parent flushes each child exactly once per snapshot.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::LazyLock;

use log::trace;
use regex::Regex;

use crate::config::{TemplateConfig, UnboundVariables};
use crate::error::TemplateError;
use crate::parser::lexer;
use crate::value::Value;

/// Child placeholders that survived expansion
static LEFTOVER_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"##.*?##").expect("valid placeholder pattern"));

/// A newline, a run of whitespace-only lines, and the next newline
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s+\n").expect("valid blank line pattern"));

/// The placeholder that marks where a child block is expanded
pub fn placeholder(name: &str) -> String {
    format!("##{}##", name)
}

/// One region of a template, with its own variables and output buffer
#[derive(Debug, Clone)]
pub struct Block {
    name: String,
    template: String,
    children: Vec<Block>,
    variables: HashMap<String, String>,
    buffer: Vec<String>,
    collapse_blank_lines: bool,
    unbound_variables: UnboundVariables,
}

impl Block {
    /// Create a block from its template and already-built children
    pub fn new(
        name: impl Into<String>,
        template: impl Into<String>,
        children: Vec<Block>,
        config: &TemplateConfig,
    ) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            children,
            variables: HashMap::new(),
            buffer: Vec::new(),
            collapse_blank_lines: config.collapse_blank_lines,
            unbound_variables: config.unbound_variables,
        }
    }

    /// Name of the region this block was built from (empty for the root)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Template text with child placeholders
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Direct children in order of first appearance
    pub fn children(&self) -> &[Block] {
        &self.children
    }

    /// Names of the direct children
    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.name.as_str()).collect()
    }

    /// Distinct `{name}` placeholders in the template, in order of appearance
    pub fn placeholders(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for (name, _) in lexer::variables(&self.template) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Current value bound to `key` on this block
    pub fn variable(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// True if nothing has been parsed since the last flush
    pub fn is_buffer_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Look up a direct child by exact name
    pub fn block(&self, name: &str) -> Result<&Block, TemplateError> {
        match self.children.iter().position(|c| c.name == name) {
            Some(index) => Ok(&self.children[index]),
            None => Err(self.unknown(name)),
        }
    }

    /// Look up a direct child by exact name, mutably
    pub fn block_mut(&mut self, name: &str) -> Result<&mut Block, TemplateError> {
        match self.children.iter().position(|c| c.name == name) {
            Some(index) => Ok(&mut self.children[index]),
            None => Err(self.unknown(name)),
        }
    }

    fn unknown(&self, name: &str) -> TemplateError {
        TemplateError::unknown_block(
            name,
            self.child_names().into_iter().map(String::from).collect(),
        )
    }

    /// Bind a value on this block and every block below it.
    ///
    /// Lists and maps bind one dotted key per scalar they contain. Existing
    /// bindings of the same key are overwritten at every level.
    pub fn assign(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        for (flat_key, scalar) in value.into().flatten(key) {
            self.assign_scalar(&flat_key, &scalar);
        }
        self
    }

    fn assign_scalar(&mut self, key: &str, value: &str) {
        self.variables.insert(key.to_string(), value.to_string());
        for child in &mut self.children {
            child.assign_scalar(key, value);
        }
    }

    /// Render a snapshot of the current state and append it to the buffer
    pub fn parse(&mut self) -> &mut Self {
        let snapshot = self.snapshot();
        trace!("parsed '{}' ({} bytes)", self.name, snapshot.len());
        self.buffer.push(snapshot);
        self
    }

    /// Take everything parsed since the last flush, leaving the buffer empty
    pub fn flush(&mut self) -> String {
        let out = std::mem::take(&mut self.buffer).concat();
        trace!("flushed '{}' ({} bytes)", self.name, out.len());
        out
    }

    fn snapshot(&mut self) -> String {
        let mut result = self.bind_variables();

        for child in &mut self.children {
            let content = child.flush();
            result = result.replace(&placeholder(&child.name), &content);
        }

        let result = LEFTOVER_PLACEHOLDER.replace_all(&result, "");
        if self.collapse_blank_lines {
            BLANK_LINES.replace_all(&result, "\n").into_owned()
        } else {
            result.into_owned()
        }
    }

    /// Substitute `{name}` placeholders in one pass over the template.
    ///
    /// Substituted values are not scanned again.
    fn bind_variables(&self) -> String {
        let template = self.template.as_str();
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                out.push_str(&rest[open..]);
                return out;
            };

            let key = &after[..close];
            if let Some(value) = self.variables.get(key) {
                out.push_str(value);
                rest = &after[close + 1..];
            } else if self.unbound_variables == UnboundVariables::Blank && is_variable_name(key) {
                rest = &after[close + 1..];
            } else {
                out.push('{');
                rest = after;
            }
        }

        out.push_str(rest);
        out
    }

    /// Indented outline of the block tree, one block per line with the
    /// placeholders it uses
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(&mut out, 0);
        out
    }

    fn write_outline(&self, out: &mut String, depth: usize) {
        let name = if self.name.is_empty() { "<root>" } else { &self.name };
        let placeholders = self.placeholders();
        let _ = if placeholders.is_empty() {
            writeln!(out, "{}{}", "  ".repeat(depth), name)
        } else {
            let list: Vec<String> = placeholders.iter().map(|p| format!("{{{}}}", p)).collect();
            writeln!(out, "{}{} {}", "  ".repeat(depth), name, list.join(" "))
        };
        for child in &self.children {
            child.write_outline(out, depth + 1);
        }
    }
}

fn is_variable_name(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}
