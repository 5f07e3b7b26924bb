// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Sequin CLI entrypoint.
//!
//! Reads one diagram from a file (or stdin), reports diagnostics on stderr and writes the
//! canonical text, the JSON model or nothing to stdout.

use std::error::Error;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use sequin::format::mermaid::{Diagnostic, ExportOptions, ParseOptions, ParsedSequence, Severity};
use sequin::ops::{apply_ops, SeqOp};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON file with `parse` and `export` option sections
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Fail on the first warning or error diagnostic
    #[arg(long, global = true)]
    strict: bool,

    /// Deepest allowed block nesting
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Spaces per nesting level in the output
    #[arg(long, global = true)]
    indent: Option<usize>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the canonical form of a diagram
    Fmt {
        /// Input file; stdin when omitted
        input: Option<PathBuf>,
    },
    /// Print the parsed model as JSON
    Json {
        input: Option<PathBuf>,
    },
    /// Only report diagnostics; exits non-zero when any has error severity
    Check {
        input: Option<PathBuf>,
    },
    /// Apply a JSON list of edit operations and print the result
    Apply {
        /// JSON file holding an array of operations
        #[arg(long)]
        ops: PathBuf,
        input: Option<PathBuf>,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Config {
    parse: ParseOptions,
    export: ExportOptions,
}

impl Config {
    fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    fn with_overrides(mut self, cli: &Cli) -> Self {
        if cli.strict {
            self.parse.strict = true;
        }
        if let Some(max_depth) = cli.max_depth {
            self.parse.max_depth = Some(max_depth);
        }
        if let Some(indent) = cli.indent {
            self.export.indent = indent;
        }
        self
    }
}

fn read_input(path: Option<&Path>) -> Result<String, Box<dyn Error>> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn report(source: &str, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let severity = diagnostic.severity().as_str();
        eprintln!(
            "{source}:{}: {severity}: {}",
            diagnostic.line_no, diagnostic.kind
        );
    }
}

fn parse_input(
    path: Option<&Path>,
    options: &ParseOptions,
) -> Result<ParsedSequence, Box<dyn Error>> {
    let source = path.map_or_else(|| "<stdin>".to_owned(), |path| path.display().to_string());
    let input = read_input(path)?;
    let parsed = sequin::parse_with_options(&input, options)?;
    report(&source, &parsed.diagnostics);
    Ok(parsed)
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = (|| -> Result<i32, Box<dyn Error>> {
        let cli = Cli::parse();
        let config = Config::load(cli.config.as_deref())?.with_overrides(&cli);
        info!(command = ?cli.command, "starting");

        match &cli.command {
            Command::Fmt { input } => {
                let parsed = parse_input(input.as_deref(), &config.parse)?;
                print!("{}", sequin::serialize_with_options(&parsed.ast, &config.export));
            }
            Command::Json { input } => {
                let parsed = parse_input(input.as_deref(), &config.parse)?;
                println!("{}", serde_json::to_string_pretty(&parsed.ast)?);
            }
            Command::Check { input } => {
                let parsed = parse_input(input.as_deref(), &config.parse)?;
                if parsed.diagnostics.iter().any(|d| d.severity() == Severity::Error) {
                    return Ok(1);
                }
            }
            Command::Apply { ops, input } => {
                let ops: Vec<SeqOp> = serde_json::from_str(&std::fs::read_to_string(ops)?)?;
                let parsed = parse_input(input.as_deref(), &config.parse)?;
                let result = apply_ops(&parsed.ast, &ops)?;
                debug!(applied = result.applied, "applied operations");
                print!("{}", sequin::serialize_with_options(&result.ast, &config.export));
            }
        }
        Ok(0)
    })();

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    }
}
