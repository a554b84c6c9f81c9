mod manifest;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clarg_argparse::{Outcome, Token, TokenKind, Tokenizer};
use serde::Serialize;
use std::{fs, path::PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

use crate::manifest::{DEFAULT_MANIFEST_NAME, Manifest};

/// Exit code for argv that does not match the manifest.
const PARSE_ERROR_EXIT: i32 = 2;

#[derive(Parser)]
#[command(name = "clarg")]
#[command(version, long_about = None)]
#[command(about = "Tokenize and parse argv against a JSON command manifest")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter clarg.json
    Init(InitArgs),

    /// Show how argv is tokenized
    Tokens(TokensArgs),

    /// Register every declaration in a manifest and report problems
    Check(CheckArgs),

    /// Parse argv against a manifest and print the values
    Parse(ParseArgs),
}

#[derive(Parser)]
struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Command name (default: directory name)
    #[arg(short, long)]
    name: Option<String>,
}

#[derive(Parser)]
struct TokensArgs {
    /// Print tokens as JSON
    #[arg(long)]
    json: bool,

    /// Arguments to tokenize (after `--`)
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

#[derive(Parser)]
struct CheckArgs {
    /// Path to clarg.json manifest
    #[arg(short, long, default_value = DEFAULT_MANIFEST_NAME, value_name = "FILE")]
    manifest: PathBuf,
}

#[derive(Parser)]
struct ParseArgs {
    /// Path to clarg.json manifest
    #[arg(short, long, default_value = DEFAULT_MANIFEST_NAME, value_name = "FILE")]
    manifest: PathBuf,

    /// Print values as JSON
    #[arg(long)]
    json: bool,

    /// Store unregistered options instead of failing
    #[arg(long)]
    allow_unknown: bool,

    /// Include help/version/verbosity in the output
    #[arg(long)]
    with_builtins: bool,

    /// Arguments to parse (after `--`)
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init(args),
        Commands::Tokens(args) => tokens(args),
        Commands::Check(args) => check(args),
        Commands::Parse(args) => parse(args),
    }
}

fn init(args: InitArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let manifest_path = manifest::write_default_manifest(&dir, args.name.as_deref())?;

    eprintln!("Created: {}", manifest_path.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Edit {DEFAULT_MANIFEST_NAME} to declare arguments and options");
    eprintln!("  2. Run: clarg check");
    eprintln!("  3. Run: clarg parse -- <ARGS>");

    Ok(())
}

#[derive(Serialize)]
struct TokenView {
    kind: &'static str,
    raw: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    nested: Vec<TokenView>,
}

impl From<&Token> for TokenView {
    fn from(token: &Token) -> Self {
        Self {
            kind: kind_name(token.kind()),
            raw: token.raw().to_string(),
            nested: token.nested().iter().map(TokenView::from).collect(),
        }
    }
}

fn kind_name(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::ShortOption => "short-option",
        TokenKind::LongOption => "long-option",
        TokenKind::Literal => "literal",
        TokenKind::Constant => "constant",
        TokenKind::VariadicOpen => "variadic-open",
        TokenKind::VariadicClose => "variadic-close",
    }
}

fn tokens(args: TokensArgs) -> Result<()> {
    tracing::debug!("executing tokens command");

    let tokens = Tokenizer::tokenize(&args.args).context("failed to tokenize arguments")?;
    let views: Vec<TokenView> = tokens.iter().map(TokenView::from).collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    for view in &views {
        println!("{:<15} {}", view.kind, view.raw);
        for child in &view.nested {
            println!("  {:<13} {}", child.kind, child.raw);
        }
    }
    Ok(())
}

fn check(args: CheckArgs) -> Result<()> {
    tracing::debug!("executing check command");

    let manifest = Manifest::from_file(&args.manifest)?;
    let parser = manifest.build_parser()?;

    eprintln!(
        "OK: {} ({} argument(s), {} option(s))",
        parser.name(),
        parser.registered_arguments().len(),
        manifest.options.len()
    );
    Ok(())
}

fn parse(args: ParseArgs) -> Result<()> {
    tracing::debug!("executing parse command");

    let mut manifest = Manifest::from_file(&args.manifest)?;
    manifest.allow_unknown |= args.allow_unknown;
    let mut parser = manifest.build_parser()?;

    let argv: Vec<&str> = std::iter::once(manifest.name.as_str())
        .chain(args.args.iter().map(String::as_str))
        .collect();

    match parser.parse(&argv) {
        Ok(Outcome::Parsed) => {}
        // Help and version already wrote their output.
        Ok(Outcome::Help | Outcome::Version) => return Ok(()),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(PARSE_ERROR_EXIT);
        }
    }

    let values = parser.values(args.with_builtins);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else {
        for (key, value) in values.iter() {
            println!("{key} = {value}");
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
