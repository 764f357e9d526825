//! File inclusion - splices `{FILE "path"}` tokens with file contents

use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::lexer;

/// Prefix marking a path as relative to the template directory
const TEMPLATE_DIR_PREFIX: &str = "./";

/// Reads template sources and expands inclusion tokens.
///
/// Paths written as `./name` resolve against the directory of the root
/// template; every other path is used as given.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    base_dir: Option<PathBuf>,
}

impl Resolver {
    /// Create a resolver without a template directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver whose `./` paths resolve against `base_dir`
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    /// Create a resolver for a template file, rooted at its directory
    pub fn for_file(path: &Path) -> Self {
        match path.parent() {
            Some(dir) => Self::with_base_dir(dir),
            None => Self::new(),
        }
    }

    /// The directory `./` paths resolve against
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Qualify a path written in a template
    pub fn qualify(&self, path: &str) -> PathBuf {
        match (path.strip_prefix(TEMPLATE_DIR_PREFIX), &self.base_dir) {
            (Some(rest), Some(base)) => base.join(rest),
            _ => PathBuf::from(path),
        }
    }

    /// Read a file referenced from a template, `None` if it cannot be read
    pub fn read(&self, path: &str) -> Option<String> {
        std::fs::read_to_string(self.qualify(path)).ok()
    }

    /// Replace every inclusion token with the contents of its file.
    ///
    /// Tokens whose file cannot be read stay in place unchanged. Included
    /// content is not scanned again here; its own tokens are expanded when
    /// that text is resolved as part of a block.
    pub fn expand(&self, text: &str) -> String {
        let tokens = lexer::includes(text);
        if tokens.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for (path, span) in tokens {
            out.push_str(&text[last..span.start]);
            match self.read(&path) {
                Some(contents) => {
                    debug!("included '{}' ({} bytes)", path, contents.len());
                    out.push_str(&contents);
                }
                None => {
                    warn!("include '{}' not found, leaving token in place", path);
                    out.push_str(&text[span.clone()]);
                }
            }
            last = span.end;
        }
        out.push_str(&text[last..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_qualify_relative_prefix() {
        let resolver = Resolver::with_base_dir("/srv/views");
        assert_eq!(
            resolver.qualify("./header.html"),
            PathBuf::from("/srv/views/header.html")
        );
    }

    #[test]
    fn test_qualify_other_paths_as_given() {
        let resolver = Resolver::with_base_dir("/srv/views");
        assert_eq!(resolver.qualify("/etc/motd"), PathBuf::from("/etc/motd"));
        assert_eq!(resolver.qualify("header.html"), PathBuf::from("header.html"));
    }

    #[test]
    fn test_qualify_without_base_dir() {
        let resolver = Resolver::new();
        assert_eq!(resolver.qualify("./a.html"), PathBuf::from("./a.html"));
    }

    #[test]
    fn test_for_file_uses_parent() {
        let resolver = Resolver::for_file(Path::new("/srv/views/page.html"));
        assert_eq!(resolver.base_dir(), Some(Path::new("/srv/views")));
    }

    #[test]
    fn test_expand_splices_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("nav.html"), "<nav/>").unwrap();
        let resolver = Resolver::with_base_dir(dir.path());

        let out = resolver.expand(r#"<body>{FILE "./nav.html"}</body>"#);
        assert_eq!(out, "<body><nav/></body>");
    }

    #[test]
    fn test_expand_missing_file_left_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = Resolver::with_base_dir(dir.path());

        let text = r#"a {FILE "./missing.html"} b"#;
        assert_eq!(resolver.expand(text), text);
    }

    #[test]
    fn test_expand_is_single_level() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("outer.html"), r#"[{FILE "./inner.html"}]"#).unwrap();
        fs::write(dir.path().join("inner.html"), "inner").unwrap();
        let resolver = Resolver::with_base_dir(dir.path());

        let once = resolver.expand(r#"{FILE "./outer.html"}"#);
        assert_eq!(once, r#"[{FILE "./inner.html"}]"#);
        assert_eq!(resolver.expand(&once), "[inner]");
    }
}
