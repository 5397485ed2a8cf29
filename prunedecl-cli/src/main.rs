//! prunedecl CLI - instance-selection driver for the dead declaration pass.
//!
//! Features:
//! - Query the number of removable instances
//! - Apply one instance (`--counter N`) or a range (`--to-counter M`)
//! - All-at-once mode collapsing every candidate into one instance
//! - Candidate listing in plain text or JSON
//! - prunedecl.toml next to the source, or an explicit `--config`

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use prunedecl_core::{
    init_plain_logging, init_structured_logging, load_config, load_config_file, load_tree,
    log_event, print_json, print_plain, IoResultExt, PruneConfig, PruneError, Prunedecl, Selection,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Remove unreferenced declarations from a reduced program")]
pub struct Cli {
    /// Source file the tree dump describes
    source: PathBuf,

    /// Program tree dump (JSON) produced by the parser
    #[arg(long, value_name = "TREE")]
    tree: PathBuf,

    /// Only report the number of available instances
    #[arg(long)]
    query_instances: bool,

    /// 1-based ordinal of the instance to apply
    #[arg(long, default_value_t = 1)]
    counter: usize,

    /// Apply every instance from --counter up to this ordinal
    #[arg(long)]
    to_counter: Option<usize>,

    /// Offer all unreferenced declarations as a single instance
    #[arg(long)]
    all_at_once: bool,

    /// Write the rewritten source to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// List the available instances instead of applying one
    #[arg(long)]
    list: bool,

    /// Output listings and counts in JSON format
    #[arg(long)]
    json: bool,

    /// Configuration file (default: prunedecl.toml next to the source)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit logs as JSON on stderr
    #[arg(long)]
    log_json: bool,
}

/// Explicit --config, else prunedecl.toml beside the source, else defaults.
fn resolve_config(cli: &Cli) -> Result<PruneConfig> {
    if let Some(path) = &cli.config {
        return load_config_file(path);
    }
    let dir = cli.source.parent().unwrap_or_else(|| Path::new("."));
    Ok(load_config(dir)?.unwrap_or_default())
}

/// Exit code for a failed run; plumbing errors outside the engine count as I/O.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<PruneError>()
        .map_or(4, PruneError::exit_code)
}

fn run(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let json = cli.json || config.wants_json();

    let tree = load_tree(&cli.tree)?;
    let source = fs::read(&cli.source).with_path(&cli.source)?;

    let pruner = Prunedecl::new(tree, source)
        .all_at_once(cli.all_at_once)
        .with_config(&config);
    let analysis = pruner.analyze()?;
    let mut transformation = pruner.transformation(&analysis);

    if cli.query_instances {
        let count = transformation.query_count();
        if json {
            let out = serde_json::json!({ "instances": count, "summary": analysis.summary });
            println!("{}", serde_json::to_string_pretty(&out)?);
        } else {
            println!("Available transformation instances: {}", count);
        }
        return Ok(());
    }

    if cli.list {
        let rows = transformation.describe();
        if json {
            print_json(&rows);
        } else {
            print_plain(&rows);
        }
        return Ok(());
    }

    let selection = Selection::from_counters(cli.counter, cli.to_counter);
    let report = transformation.select_and_apply(selection)?;
    let text = transformation.rewritten();
    log_event(
        "rewrite",
        &format!(
            "{} removed, {} skipped, {} bytes",
            report.removed, report.skipped, report.bytes
        ),
    );

    match &cli.output {
        Some(path) => fs::write(path, &text)
            .with_path(path)
            .with_context(|| format!("Failed to write rewritten source to {}", path.display()))?,
        None => std::io::stdout()
            .lock()
            .write_all(&text)
            .context("Failed to write rewritten source to stdout")?,
    }
    Ok(())
}

fn main() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] prunedecl internal error: {}", info);
        eprintln!("[PANIC] The process will exit with code 3.");
        std::process::exit(3);
    }));

    let cli = Cli::parse();

    if cli.log_json {
        init_structured_logging();
    } else {
        init_plain_logging();
    }

    if let Err(err) = run(&cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(exit_code_for(&err));
    }
}
