//! blocktpl - hierarchical block templates
//!
//! A template is plain text with three kinds of markup:
//!
//! - `<!--begin:NAME-->...<!--end:NAME-->` delimits a named block region,
//! - `{name}` is a variable placeholder,
//! - `{FILE "path"}` splices in another file before blocks are extracted.
//!
//! Parsing builds a tree of [`Block`]s. Variables assigned on a block are
//! visible in every block below it. Each block renders into a buffer with
//! [`Block::parse`]; parsing a block several times repeats it, and the parent
//! picks up the accumulated output the next time it is parsed.
//!
//! # Example
//!
//! ```rust
//! use blocktpl::{Template, TemplateConfig};
//!
//! let mut tpl = Template::from_str(
//!     "<ul><!--begin:item--><li>{name}</li><!--end:item--></ul>",
//!     None,
//!     TemplateConfig::default(),
//! );
//!
//! for name in ["a", "b"] {
//!     tpl.block_mut("item").unwrap().assign("name", name).parse();
//! }
//!
//! assert_eq!(tpl.print(false), "<ul><li>a</li><li>b</li></ul>");
//! ```

pub mod block;
pub mod config;
pub mod error;
pub mod lint;
pub mod parser;
pub mod value;

use std::io::Write;
use std::path::{Path, PathBuf};

pub use block::Block;
pub use config::{ConfigError, MatchMode, TemplateConfig, UnboundVariables};
pub use error::TemplateError;
pub use lint::{LintCategory, LintWarning};
pub use parser::{BlockParser, Resolver};
pub use value::Value;

/// A template file bound to its root block
#[derive(Debug, Clone)]
pub struct Template {
    root: Block,
    config: TemplateConfig,
    base_dir: Option<PathBuf>,
}

impl Template {
    /// Load a template file and build its block tree
    ///
    /// # Example
    ///
    /// ```rust
    /// use blocktpl::{Template, TemplateConfig, TemplateError};
    ///
    /// let result = Template::from_file("does/not/exist.html", TemplateConfig::default());
    /// assert!(matches!(result, Err(TemplateError::SourceNotFound { .. })));
    /// ```
    pub fn from_file(path: impl AsRef<Path>, config: TemplateConfig) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let root = BlockParser::parse_file(path, config.clone())?;
        Ok(Self {
            root,
            config,
            base_dir: path.parent().map(Path::to_path_buf),
        })
    }

    /// Build a template from text. `./` includes resolve against `base_dir`.
    pub fn from_str(source: &str, base_dir: Option<&Path>, config: TemplateConfig) -> Self {
        let resolver = match base_dir {
            Some(dir) => Resolver::with_base_dir(dir),
            None => Resolver::new(),
        };
        let root = BlockParser::new(resolver, config.clone()).parse_str(source);
        Self {
            root,
            config,
            base_dir: base_dir.map(Path::to_path_buf),
        }
    }

    /// The configuration the template was built with
    pub fn config(&self) -> &TemplateConfig {
        &self.config
    }

    /// Directory `./` includes were resolved against
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// The root block
    pub fn root(&self) -> &Block {
        &self.root
    }

    /// The root block, mutably
    pub fn root_mut(&mut self) -> &mut Block {
        &mut self.root
    }

    /// A top-level block by name
    pub fn block(&self, name: &str) -> Result<&Block, TemplateError> {
        self.root.block(name)
    }

    /// A top-level block by name, mutably
    pub fn block_mut(&mut self, name: &str) -> Result<&mut Block, TemplateError> {
        self.root.block_mut(name)
    }

    /// Bind a value on the whole tree
    pub fn assign(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.root.assign(key, value);
        self
    }

    /// Render a snapshot of the root into its buffer
    pub fn parse(&mut self) -> &mut Self {
        self.root.parse();
        self
    }

    /// Take the rendered output. Does not parse first.
    pub fn render(&mut self) -> String {
        self.root.flush()
    }

    /// Parse, take the output, and optionally write it to stdout
    pub fn print(&mut self, to_stdout: bool) -> String {
        self.root.parse();
        let out = self.render();
        if to_stdout {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(out.as_bytes()).and_then(|_| stdout.flush()) {
                log::error!("failed to write rendered template: {}", e);
            }
        }
        out
    }
}
