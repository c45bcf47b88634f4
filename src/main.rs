use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use termdoc::renderer::DEFAULT_WIDTH;
use termdoc::{DocumentParser, DocumentRenderer, Theme, ThemeConfig};

/// termdoc - render HTML document trees as terminal text
#[derive(Parser, Debug)]
#[command(name = "termdoc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON node tree to render (stdin when absent or "-")
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output width in columns
    #[arg(short, long, env = "COLUMNS", default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Theme file (defaults to <config dir>/termdoc/theme.json)
    #[arg(long, value_name = "PATH")]
    theme: Option<PathBuf>,

    /// Emit no ANSI escape sequences
    #[arg(long)]
    no_color: bool,

    /// Draw tables with plain ASCII borders
    #[arg(long)]
    ascii: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match cli.theme.clone().or_else(ThemeConfig::default_path) {
        Some(path) => {
            debug!(path = %path.display(), "loading theme");
            ThemeConfig::load(&path)?
        }
        None => ThemeConfig::default(),
    };
    config.no_color |= cli.no_color;
    config.table.ascii |= cli.ascii;

    let input = read_input(cli.input.as_ref())?;
    let document = DocumentParser::parse_json(&input)?;
    let renderer = DocumentRenderer::new(Theme::from_config(&config)).with_width(cli.width);

    let output = renderer.render(&document);
    io::stdout()
        .write_all(output.as_bytes())
        .context("Failed to write output")?;

    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display())),
        _ => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}
