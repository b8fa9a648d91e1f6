extern crate env_logger;
#[macro_use]
extern crate log;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;

mod cli;
mod error;
mod id;
mod io;
mod merge;
mod reader;
mod record;
mod replace;
mod summary;
mod writer;

use cli::{Cli, Commands, MergeArgs, ReplaceArgs};
use error::SeqError;
use id::IdGenerator;
use merge::{MergeConfig, Merger};
use replace::{ReplaceConfig, ReplacementEngine};
use summary::RunSummary;

fn merge(args: &MergeArgs) -> Result<()> {
    let started = Instant::now();
    let config = MergeConfig {
        inputs: args.inputs.clone(),
        output: args.output.clone(),
    };

    let mut merger = Merger::new(config, IdGenerator::new(args.id_template()))?;
    if let Err(e) = merger.run().map(|_| ()) {
        let stats = merger.stats();
        warn!(
            "Merge stopped after {} files and {} sequences",
            stats.files_processed, stats.total_records
        );
        return Err(e.into());
    }

    let stats = merger.stats().clone();
    info!(
        "Merged {} files, {} sequences into {}",
        stats.files_processed,
        stats.total_records,
        args.output.display()
    );

    if let Some(path) = &args.summary {
        let inputs = args.inputs.clone();
        RunSummary::new("merge", inputs, args.output.clone(), started, stats).write(path)?;
    }
    Ok(())
}

fn replace(args: &ReplaceArgs) -> Result<()> {
    let started = Instant::now();
    let seed = args
        .seed
        .unwrap_or_else(|| chrono::Utc::now().timestamp().unsigned_abs());

    let config = ReplaceConfig {
        input: args.input.clone(),
        output: args.output.clone(),
        log: args.log.clone(),
        mode: args.mode.mode(),
        replacements: args.sequences.iter().map(|s| s.as_bytes().to_vec()).collect(),
        seed,
    };

    let mut engine = ReplacementEngine::new(config)?;
    if let Err(e) = engine.run().map(|_| ()) {
        let stats = engine.stats();
        warn!(
            "Run stopped after {} records, {} replacements applied",
            stats.total_records,
            stats.replacements
        );
        return Err(e.into());
    }

    let stats = engine.stats().clone();
    info!(
        "Processed {} records, applied {} replacements. Log written to {}",
        stats.total_records,
        stats.replacements,
        args.log.display()
    );
    if stats.headers_dropped > 0 {
        info!(
            "Dropped {} of {} FASTA headers with an empty sequence",
            stats.headers_dropped, stats.headers_seen
        );
    }

    if let Some(path) = &args.summary {
        let inputs: Vec<PathBuf> = vec![args.input.clone()];
        RunSummary::new("replace", inputs, args.output.clone(), started, stats).write(path)?;
    }
    Ok(())
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_target(false)
        .init();

    debug!("seqsplice v{}", cli::VERSION);

    match &cli.command {
        Commands::Merge(args) => merge(args),
        Commands::Replace(args) => replace(args),
    }
}

fn main() {
    if let Err(err) = try_main() {
        error!("{}", err);

        // report any errors that are produced
        err.chain()
            .skip(1)
            .for_each(|cause| error!("  because: {}", cause));

        let code = err.downcast_ref::<SeqError>().map_or(1, SeqError::exit_code);
        std::process::exit(code);
    }
}
