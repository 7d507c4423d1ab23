//! sqlbridge — translate SQL between Presto, Hive and Vertica.
//!
//! # Usage
//!
//! ```bash
//! # Translate a file from Presto to Hive
//! sqlbridge query.sql --from presto --to hive
//!
//! # Read stdin, print only the query
//! echo "select a[1] from t" | sqlbridge -f presto -t vertica -q
//!
//! # Show the rules a pair runs
//! sqlbridge rules -f vertica -t hive
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use serde::Serialize;
use sqlbridge::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlbridge")]
#[command(version)]
#[command(about = "Translate SQL queries between Presto, Hive and Vertica", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = "EXAMPLES:
    sqlbridge query.sql --from presto --to hive
    cat query.sql | sqlbridge -f hive -t vertica --quiet
    sqlbridge query.sql -f vertica -t presto --format json
    sqlbridge rules -f presto -t hive")]
struct Cli {
    /// File holding the query (`-` or absent reads stdin)
    file: Option<PathBuf>,

    /// Source dialect
    #[arg(short, long, value_enum)]
    from: Option<CliDialect>,

    /// Destination dialect
    #[arg(short, long, value_enum)]
    to: Option<CliDialect>,

    /// Print only the translated query, without the replacement report
    #[arg(short, long)]
    quiet: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Config file path
    #[arg(long, env = "SQLBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Disable coloured output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum CliDialect {
    Presto,
    Hive,
    Vertica,
}

impl From<CliDialect> for Dialect {
    fn from(d: CliDialect) -> Self {
        match d {
            CliDialect::Presto => Dialect::Presto,
            CliDialect::Hive => Dialect::Hive,
            CliDialect::Vertica => Dialect::Vertica,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List the rules a translation runs, in order
    Rules {
        /// Source dialect
        #[arg(short, long, value_enum, default_value = "presto")]
        from: CliDialect,

        /// Destination dialect
        #[arg(short, long, value_enum, default_value = "hive")]
        to: CliDialect,
    },
    /// List the supported dialects
    Dialects,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    source: Dialect,
    destination: Dialect,
    sql: &'a str,
    preamble: Option<&'a str>,
    warnings: &'a [String],
    replacements: Vec<&'a Replacement>,
    total: usize,
}

impl<'a> JsonOutput<'a> {
    fn new(transpiler: &Transpiler, translation: &'a Translation) -> Self {
        Self {
            source: transpiler.source(),
            destination: transpiler.destination(),
            sql: &translation.sql,
            preamble: translation.preamble.as_deref(),
            warnings: translation.report.warnings(),
            replacements: translation.report.replacements().collect(),
            total: translation.report.total(),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let result = match &cli.command {
        Some(Commands::Rules { from, to }) => {
            show_rules(Transpiler::new((*from).into(), (*to).into()));
            Ok(())
        }
        Some(Commands::Dialects) => {
            show_dialects();
            Ok(())
        }
        None => run(&cli),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if !config.color() {
        colored::control::set_override(false);
    }

    let source = cli.from.map_or_else(|| config.source(), Dialect::from);
    let destination = cli.to.map_or_else(|| config.destination(), Dialect::from);
    let verbose = !cli.quiet && config.verbose();

    let query = read_query(cli.file.as_deref())?;
    let transpiler = Transpiler::new(source, destination);
    let translation = transpiler.translate(&query);

    match cli.format {
        OutputFormat::Json => {
            let output = JsonOutput::new(&transpiler, &translation);
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            if verbose {
                print_report(&translation.report);
                println!();
            }
            if let Some(preamble) = &translation.preamble {
                print!("{}", preamble.cyan());
            }
            println!("{}", translation.sql);
        }
    }
    Ok(())
}

fn read_query(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        _ => {
            let mut query = String::new();
            io::stdin()
                .read_to_string(&mut query)
                .context("failed to read query from stdin")?;
            Ok(query)
        }
    }
}

fn print_report(report: &Report) {
    for warning in report.warnings() {
        println!("{}", warning.yellow());
    }
    if !report.warnings().is_empty() {
        println!();
    }
    println!("{}", report.headline().green().bold());
    for replacement in report.replacements() {
        println!(
            "  • {}:  {}",
            replacement.rule.white(),
            replacement.count.to_string().cyan()
        );
    }
}

fn show_rules(transpiler: Transpiler) {
    println!(
        "{} {} {} {}",
        "Rules for".cyan().bold(),
        transpiler.source().to_string().yellow(),
        "→".dimmed(),
        transpiler.destination().to_string().yellow()
    );
    println!();

    let rules = transpiler.rules();
    if rules.is_empty() {
        println!("{}", "(none: source and destination are the same dialect)".dimmed());
        return;
    }
    for (i, rule) in rules.iter().enumerate() {
        println!("{:>3}. {}", (i + 1).to_string().dimmed(), rule);
    }
}

fn show_dialects() {
    println!("{}", "Supported dialects:".cyan().bold());
    for dialect in Dialect::ALL {
        println!("  • {}", dialect.to_string().white());
    }
}
