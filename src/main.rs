//! msl - inspect, check and format macro scripts
//!
//! The script comes from `-e <script>`, a file argument, or stdin.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use msl::{Config, Stats, check_with, parse_with, to_msl, token_statistics, tokenize, tree_string};

#[derive(Parser)]
#[command(name = "msl")]
#[command(about = "Macro scripting language tools")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to an msl.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Maximum group nesting depth (overrides config)
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct Input {
    /// Script text given inline
    #[arg(short = 'e', long = "expr")]
    expr: Option<String>,

    /// Script file (stdin when neither this nor --expr is given)
    #[arg(conflicts_with = "expr")]
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// List tokens with their positions
    Tokens {
        #[command(flatten)]
        input: Input,

        /// Emit JSON
        #[arg(long)]
        json: bool,

        /// Print per-kind token counts instead
        #[arg(long)]
        summary: bool,
    },

    /// Print the syntax tree
    Parse {
        #[command(flatten)]
        input: Input,

        /// Emit the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report bracket problems and the first parse error; exits 1 if any
    Check {
        #[command(flatten)]
        input: Input,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the script in canonical form
    Fmt {
        #[command(flatten)]
        input: Input,
    },

    /// Print node statistics
    Stats {
        #[command(flatten)]
        input: Input,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(max_depth) = cli.max_depth {
        config.parser.max_depth = max_depth;
    }

    match cli.command {
        Command::Tokens {
            input,
            json,
            summary,
        } => {
            let script = read_script(&input, &config)?;
            let tokens = tokenize(&script);
            match (json, summary) {
                (true, true) => {
                    let stats = token_statistics(&tokens);
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                }
                (true, false) => println!("{}", serde_json::to_string_pretty(&tokens)?),
                (false, true) => {
                    for (kind, count) in token_statistics(&tokens) {
                        println!("{kind:<12} {count}");
                    }
                }
                (false, false) => {
                    for token in &tokens {
                        println!("{token}");
                    }
                }
            }
        }

        Command::Parse { input, json } => {
            let script = read_script(&input, &config)?;
            match parse_with(&script, &config.parser) {
                Ok(node) if json => println!("{}", serde_json::to_string_pretty(&node)?),
                Ok(node) => print!("{}", tree_string(&node)),
                Err(error) => {
                    eprintln!("error: {error}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        Command::Check { input, json } => {
            let script = read_script(&input, &config)?;
            let report = check_with(&script, &config.parser);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for diagnostic in &report.diagnostics {
                    println!("{}: {}", diagnostic.position, diagnostic.message);
                }
                if let Some(error) = &report.parse_error {
                    println!("error: {error}");
                }
                if report.is_valid() {
                    println!("ok");
                }
            }

            if !report.is_valid() {
                return Ok(ExitCode::FAILURE);
            }
        }

        Command::Fmt { input } => {
            let script = read_script(&input, &config)?;
            match parse_with(&script, &config.parser) {
                Ok(node) => println!("{}", to_msl(&node)),
                Err(error) => {
                    eprintln!("error: {error}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        Command::Stats { input, json } => {
            let script = read_script(&input, &config)?;
            let node = match parse_with(&script, &config.parser) {
                Ok(node) => node,
                Err(error) => {
                    eprintln!("error: {error}");
                    return Ok(ExitCode::FAILURE);
                }
            };
            let stats = Stats::collect(&node);

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("total nodes:    {}", stats.total_nodes);
                println!("max depth:      {}", stats.max_depth);
                println!("terminals:      {}", stats.terminal_nodes);
                println!("keys:           {}", stats.key_nodes);
                println!("timing nodes:   {}", stats.timing_nodes);
                println!("operator nodes: {}", stats.operator_nodes);
                for (kind, count) in &stats.by_kind {
                    println!("  {kind:<14}{count}");
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn read_script(input: &Input, config: &Config) -> Result<String> {
    let script = match (&input.expr, &input.file) {
        (Some(expr), _) => expr.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read script from stdin")?;
            buffer
        }
    };

    if !config.limits.allows(&script) {
        bail!(
            "script is {} characters long, the limit is {}",
            script.chars().count(),
            config.limits.max_script_length
        );
    }

    tracing::debug!(length = script.len(), "read script");
    Ok(script)
}
