//! blocktpl CLI
//!
//! Usage:
//!   blocktpl [OPTIONS] <TEMPLATE>
//!
//! Options:
//!   -d, --data <FILE>        TOML table assigned to the root block
//!   -s, --set <KEY=VALUE>    Assign a single variable (repeatable)
//!   -c, --config <FILE>      Template configuration (TOML format)
//!   --keep-blank-lines       Do not collapse blank lines
//!   --nested                 Pair block markers by depth
//!   --lint                   Report markup problems on stderr
//!   --tree                   Print the block tree instead of rendering
//!   -v, --verbose            Debug logging
//!   -h, --help               Print help

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{debug, LevelFilter};

use blocktpl::{lint, MatchMode, Resolver, Template, TemplateConfig, Value};

#[derive(Parser)]
#[command(name = "blocktpl")]
#[command(about = "Render hierarchical block templates")]
struct Cli {
    /// Template file
    template: PathBuf,

    /// TOML data file; every top-level key is assigned to the root block
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Assign a variable, applied after --data
    #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, String)>,

    /// Template configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep whitespace-only lines in the output
    #[arg(long)]
    keep_blank_lines: bool,

    /// Pair block markers by depth instead of first-begin/last-end
    #[arg(long)]
    nested: bool,

    /// Report markup problems on stderr before rendering
    #[arg(long)]
    lint: bool,

    /// Print the block tree instead of rendering
    #[arg(long)]
    tree: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(message) = run(cli) {
        eprintln!("Error: {}", message);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let mut config = match &cli.config {
        Some(path) => TemplateConfig::from_file(path)
            .map_err(|e| format!("loading config '{}': {}", path.display(), e))?,
        None => TemplateConfig::default(),
    };
    if cli.keep_blank_lines {
        config.collapse_blank_lines = false;
    }
    if cli.nested {
        config.match_mode = MatchMode::Nested;
    }
    debug!("configuration: {:?}", config);

    if cli.lint {
        let source = fs::read_to_string(&cli.template)
            .map_err(|e| format!("reading '{}': {}", cli.template.display(), e))?;
        let filename = cli.template.display().to_string();
        for warning in lint::check(&source, &config, &Resolver::for_file(&cli.template)) {
            eprint!("{}", warning.format(&source, &filename));
        }
    }

    let mut tpl = Template::from_file(&cli.template, config).map_err(|e| e.to_string())?;

    if cli.tree {
        print!("{}", tpl.root().outline());
        return Ok(());
    }

    if let Some(path) = &cli.data {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("reading data '{}': {}", path.display(), e))?;
        let table: toml::Table = toml::from_str(&content)
            .map_err(|e| format!("parsing data '{}': {}", path.display(), e))?;
        for (key, value) in table {
            tpl.assign(&key, Value::from(value));
        }
    }

    for (key, value) in cli.set {
        tpl.assign(&key, value);
    }

    tpl.print(true);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("title=Hello=World"),
            Ok(("title".to_string(), "Hello=World".to_string()))
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
