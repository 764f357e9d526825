//! Block parser - turns template text into a tree of blocks

mod include;
pub mod lexer;
pub mod regions;

use std::path::Path;

use log::{debug, warn};

use crate::block::{placeholder, Block};
use crate::config::TemplateConfig;
use crate::error::TemplateError;

pub use include::Resolver;
pub use regions::{scan, Region, Scan};

/// Blocks nested deeper than this keep their body as literal text
pub const MAX_NESTING_DEPTH: usize = 128;

/// Builds block trees from template sources
#[derive(Debug, Clone)]
pub struct BlockParser {
    resolver: Resolver,
    config: TemplateConfig,
}

impl BlockParser {
    /// Create a parser with an explicit resolver
    pub fn new(resolver: Resolver, config: TemplateConfig) -> Self {
        Self { resolver, config }
    }

    /// The resolver used for inclusion tokens
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// The configuration handed to every block built
    pub fn config(&self) -> &TemplateConfig {
        &self.config
    }

    /// Read a template file and build its block tree.
    ///
    /// Includes written as `./path` resolve against the file's directory.
    pub fn parse_file(path: &Path, config: TemplateConfig) -> Result<Block, TemplateError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| TemplateError::source_not_found(path, e))?;
        debug!("loaded template {} ({} bytes)", path.display(), source.len());
        Ok(Self::new(Resolver::for_file(path), config).parse_str(&source))
    }

    /// Build a block tree from template text
    pub fn parse_str(&self, text: &str) -> Block {
        self.build(String::new(), text, 0)
    }

    fn build(&self, name: String, text: &str, depth: usize) -> Block {
        let expanded = self.resolver.expand(text);
        if expanded.len() > self.config.large_input_threshold {
            debug!(
                "block '{}' is a large input ({} bytes > {})",
                name,
                expanded.len(),
                self.config.large_input_threshold
            );
        }

        if depth > MAX_NESTING_DEPTH {
            warn!(
                "block '{}' is nested deeper than {} levels, body kept as text",
                name, MAX_NESTING_DEPTH
            );
            return Block::new(name, expanded, Vec::new(), &self.config);
        }

        let scanned = scan(&expanded, self.config.match_mode);
        for (marker, span) in &scanned.unterminated {
            warn!(
                "unterminated block '{}' in '{}' at byte {}, kept as text",
                marker, name, span.start
            );
        }
        for (marker, span) in &scanned.stray_ends {
            warn!(
                "end marker for '{}' in '{}' at byte {} closes no block, kept as text",
                marker, name, span.start
            );
        }

        let mut template = String::with_capacity(expanded.len());
        let mut children: Vec<Block> = Vec::new();
        let mut last = 0;

        for region in scanned.regions {
            template.push_str(&expanded[last..region.span.start]);
            template.push_str(&placeholder(&region.name));
            last = region.span.end;

            let child = self.build(region.name, &expanded[region.body], depth + 1);
            match children.iter_mut().find(|c| c.name() == child.name()) {
                Some(existing) => {
                    debug!("block '{}' redefined in '{}', later region wins", child.name(), name);
                    *existing = child;
                }
                None => children.push(child),
            }
        }
        template.push_str(&expanded[last..]);

        debug!("built block '{}' with {} children", name, children.len());
        Block::new(name, template, children, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchMode;
    use pretty_assertions::assert_eq;

    fn parser() -> BlockParser {
        BlockParser::new(Resolver::new(), TemplateConfig::default())
    }

    #[test]
    fn test_plain_text_has_no_children() {
        let block = parser().parse_str("just text");
        assert_eq!(block.template(), "just text");
        assert!(block.children().is_empty());
    }

    #[test]
    fn test_region_replaced_by_placeholder() {
        let block = parser().parse_str("<ul><!--begin:item--><li>{x}</li><!--end:item--></ul>");
        assert_eq!(block.template(), "<ul>##item##</ul>");
        assert_eq!(block.child_names(), vec!["item"]);
        assert_eq!(block.block("item").unwrap().template(), "<li>{x}</li>");
    }

    #[test]
    fn test_nested_tree() {
        let block = parser().parse_str(
            "<!--begin:table--><table><!--begin:row--><tr>{v}</tr><!--end:row--></table><!--end:table-->",
        );
        let table = block.block("table").unwrap();
        assert_eq!(table.template(), "<table>##row##</table>");
        assert_eq!(table.block("row").unwrap().template(), "<tr>{v}</tr>");
    }

    #[test]
    fn test_children_in_order_of_appearance() {
        let block = parser().parse_str(
            "<!--begin:b-->1<!--end:b--><!--begin:a-->2<!--end:a--><!--begin:c-->3<!--end:c-->",
        );
        assert_eq!(block.child_names(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_placeholder_keeps_begin_marker_case() {
        let block = parser().parse_str("<!--begin:Row-->x<!--end:row-->");
        assert_eq!(block.template(), "##Row##");
        assert!(block.block("Row").is_ok());
        assert!(block.block("row").is_err());
    }

    #[test]
    fn test_unterminated_marker_left_literal() {
        let block = parser().parse_str("a<!--begin:row-->b");
        assert_eq!(block.template(), "a<!--begin:row-->b");
        assert!(block.children().is_empty());
    }

    #[test]
    fn test_nested_mode_duplicate_siblings_later_wins() {
        let config = TemplateConfig::new().with_match_mode(MatchMode::Nested);
        let block = BlockParser::new(Resolver::new(), config)
            .parse_str("<!--begin:a-->1<!--end:a-->|<!--begin:a-->2<!--end:a-->");
        assert_eq!(block.template(), "##a##|##a##");
        assert_eq!(block.children().len(), 1);
        assert_eq!(block.block("a").unwrap().template(), "2");
    }

    #[test]
    fn test_malformed_marker_keeps_later_block() {
        let block = parser().parse_str("<!--begin:a- <!--begin:row-->x<!--end:row-->");
        assert_eq!(block.child_names(), vec!["row"]);
        assert_eq!(block.template(), "<!--begin:a- ##row##");

        let block = parser().parse_str("<!--end:zz <!--begin:row-->x<!--end:row-->");
        assert_eq!(block.child_names(), vec!["row"]);
    }

    #[test]
    fn test_deep_nesting_is_bounded() {
        let levels = 2000;
        let mut text = String::new();
        for i in 0..levels {
            text.push_str(&format!("<!--begin:b{}-->", i));
        }
        text.push('x');
        for i in (0..levels).rev() {
            text.push_str(&format!("<!--end:b{}-->", i));
        }

        let root = parser().parse_str(&text);
        let mut block = &root;
        let mut depth = 0;
        while let Some(child) = block.children().first() {
            block = child;
            depth += 1;
        }
        assert_eq!(depth, MAX_NESTING_DEPTH + 1);
        assert_eq!(block.name(), format!("b{}", MAX_NESTING_DEPTH));
        assert!(block
            .template()
            .starts_with(&format!("<!--begin:b{}-->", MAX_NESTING_DEPTH + 1)));
    }

    #[test]
    fn test_unterminated_and_stray_markers_logged() {
        logging::init();
        parser().parse_str("<!--begin:unclosed_marker-->x<!--end:stray_marker-->");
        let lines = logging::take_warnings();
        assert!(lines.iter().any(|l| l.contains("unterminated block 'unclosed_marker'")));
        assert!(lines.iter().any(|l| l.contains("'stray_marker'") && l.contains("closes no block")));
    }

    mod logging {
        use std::sync::Mutex;

        use log::{Level, LevelFilter, Log, Metadata, Record};

        struct Capture(Mutex<Vec<String>>);

        static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

        impl Log for Capture {
            fn enabled(&self, metadata: &Metadata) -> bool {
                metadata.level() <= Level::Warn
            }

            fn log(&self, record: &Record) {
                if self.enabled(record.metadata()) {
                    self.0.lock().unwrap().push(record.args().to_string());
                }
            }

            fn flush(&self) {}
        }

        pub fn init() {
            let _ = log::set_logger(&CAPTURE);
            log::set_max_level(LevelFilter::Warn);
        }

        pub fn take_warnings() -> Vec<String> {
            std::mem::take(&mut *CAPTURE.0.lock().unwrap())
        }
    }

    #[test]
    fn test_parse_file_missing() {
        let result = BlockParser::parse_file(Path::new("/no/such/template.html"), TemplateConfig::default());
        assert!(matches!(result, Err(TemplateError::SourceNotFound { .. })));
    }
}
