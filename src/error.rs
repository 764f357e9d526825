//! Error types for template loading and block lookup

use std::path::PathBuf;

use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Errors that can surface to the caller.
///
/// Textual irregularities (missing includes, unterminated block markers) are
/// never reported here; they degrade into literal output and are only visible
/// through [`crate::lint`].
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The top-level template could not be read
    #[error("template not found: {}", .path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A child block was requested by a name the node does not have
    #[error("unknown block '{name}'{}", format_available(.available))]
    UnknownBlock { name: String, available: Vec<String> },
}

impl TemplateError {
    /// Create a source-not-found error
    pub fn source_not_found(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SourceNotFound {
            path: path.into(),
            source,
        }
    }

    /// Create an unknown-block error listing the names that do exist
    pub fn unknown_block(name: impl Into<String>, available: Vec<String>) -> Self {
        Self::UnknownBlock {
            name: name.into(),
            available,
        }
    }
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        " (node has no child blocks)".to_string()
    } else {
        format!(" (available: {})", available.join(", "))
    }
}
