//! CLI for cue/trigger stitching.
//!
//! Subcommands:
//!  - `stitch`  : stitch synthetic cue/trigger pairs into LoCoMo conversations.
//!  - `unified` : build the unified benchmark input (LoCoMo QA + Cognitive samples).
//!  - `gap`     : show how a time-gap phrase is parsed.
//!
//! JSON goes to stdout (or `--out`); logs go to stderr.
//!
//! Usage examples:
//!  cargo run -p cue-stitch -- stitch --locomo locomo10.json --plus locomo_plus.json -o stitched.json
//!  cargo run -p cue-stitch -- gap "about two weeks later"

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

mod options;

use crate::options::{configure_workers, parse_pairing, StitchFlags};

use cue_stitch::{
    dataset::{load_locomo_json, load_synthetic_pairs_json, save_json_pretty},
    parse_time_gap, stitch_batch,
    unified::build_unified_samples,
    utils::logging,
    StitchedContext,
};

/// CLI entrypoint.
#[derive(Parser)]
#[command(
    name = "cue-stitch",
    about = "Stitch synthetic cue/trigger dialogue into multi-session conversations",
    version
)]
struct Cli {
    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stitch each synthetic pair into a background conversation.
    Stitch(StitchArgs),

    /// Build unified benchmark samples (five QA categories plus Cognitive).
    Unified(UnifiedArgs),

    /// Parse a time-gap phrase and print the day count.
    Gap(GapArgs),
}

/// Arguments for the `stitch` subcommand.
#[derive(Args, Debug)]
struct StitchArgs {
    /// LoCoMo conversation file (JSON array).
    #[arg(long, value_name = "PATH")]
    locomo: PathBuf,

    /// Synthetic cue/trigger pair file (JSON array).
    #[arg(long, value_name = "PATH")]
    plus: PathBuf,

    /// Path to write stitched contexts to (stdout when omitted).
    #[arg(long, short = 'o', value_name = "PATH")]
    out: Option<PathBuf>,

    /// How pairs are matched with conversations: cyclic|random.
    #[arg(long, default_value = "cyclic")]
    pairing: String,

    /// Seed for `--pairing random`.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of parallel workers (default: one per core).
    #[arg(long)]
    workers: Option<usize>,

    #[command(flatten)]
    stitch: StitchFlags,
}

/// Arguments for the `unified` subcommand.
#[derive(Args, Debug)]
struct UnifiedArgs {
    /// LoCoMo conversation file (JSON array).
    #[arg(long, value_name = "PATH")]
    locomo: PathBuf,

    /// Synthetic cue/trigger pair file; Cognitive samples are skipped when omitted.
    #[arg(long, value_name = "PATH")]
    plus: Option<PathBuf>,

    /// Path to write samples to (stdout when omitted).
    #[arg(long, short = 'o', value_name = "PATH")]
    out: Option<PathBuf>,

    /// Use only the first N synthetic pairs.
    #[arg(long)]
    plus_limit: Option<usize>,

    #[command(flatten)]
    stitch: StitchFlags,
}

/// Arguments for the `gap` subcommand.
#[derive(Args, Debug)]
struct GapArgs {
    /// Time-gap phrase, e.g. "about two weeks later".
    text: String,

    /// Output as JSON.
    #[arg(long)]
    json: bool,
}

/// Application entry point.
fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_with_level(logging::level_from_flags(cli.verbose, cli.quiet));

    match cli.command {
        Commands::Stitch(args) => run_stitch(args),
        Commands::Unified(args) => run_unified(args),
        Commands::Gap(args) => run_gap(args),
    }
}

/// Write `value` to `out`, or pretty-print it to stdout.
fn emit_json<T: Serialize + ?Sized>(value: &T, out: Option<&PathBuf>) -> Result<()> {
    match out {
        Some(path) => {
            save_json_pretty(value, path).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(())
        }
    }
}

/// Run the `stitch` subcommand.
///
/// Pairs whose conversation cannot be stitched (bad dates, no sessions, ...)
/// are skipped with a warning; the rest are written in pair order.
fn run_stitch(args: StitchArgs) -> Result<()> {
    configure_workers(args.workers)?;
    let pairing = parse_pairing(&args.pairing, args.seed)?;
    let cfg = args.stitch.to_config();

    let items = load_locomo_json(&args.locomo)
        .with_context(|| format!("loading conversations from {}", args.locomo.display()))?;
    let pairs = load_synthetic_pairs_json(&args.plus)
        .with_context(|| format!("loading synthetic pairs from {}", args.plus.display()))?;
    info!(
        conversations = items.len(),
        pairs = pairs.len(),
        "loaded inputs"
    );
    if items.is_empty() {
        return Err(anyhow::anyhow!(
            "{} contains no conversations",
            args.locomo.display()
        ));
    }

    let outcomes = stitch_batch(&items, &pairs, pairing, &cfg);
    let mut contexts: Vec<StitchedContext> = Vec::with_capacity(outcomes.len());
    let mut skipped = 0usize;
    for outcome in outcomes {
        match outcome.result {
            Ok(ctx) => contexts.push(ctx),
            Err(e) => {
                skipped += 1;
                warn!(
                    pair = outcome.pair_index,
                    conversation = outcome.conversation_index,
                    error = %e,
                    "skipping pair"
                );
            }
        }
    }

    emit_json(&contexts, args.out.as_ref())?;
    if let Some(outp) = &args.out {
        println!(
            "Saved {} stitched contexts to {} ({} skipped).",
            contexts.len(),
            outp.display(),
            skipped
        );
    }
    Ok(())
}

/// Run the `unified` subcommand.
fn run_unified(args: UnifiedArgs) -> Result<()> {
    let cfg = args.stitch.to_config();
    let items = load_locomo_json(&args.locomo)
        .with_context(|| format!("loading conversations from {}", args.locomo.display()))?;
    let pairs = match &args.plus {
        Some(path) => load_synthetic_pairs_json(path)
            .with_context(|| format!("loading synthetic pairs from {}", path.display()))?,
        None => Vec::new(),
    };

    let samples = build_unified_samples(&items, &pairs, args.plus_limit, &cfg);
    emit_json(&samples, args.out.as_ref())?;
    if let Some(outp) = &args.out {
        println!("Wrote {} samples to {}", samples.len(), outp.display());
    }
    Ok(())
}

/// Run the `gap` subcommand.
fn run_gap(args: GapArgs) -> Result<()> {
    let gap = parse_time_gap(&args.text);
    if args.json {
        let out = json!({
            "text": args.text,
            "days": gap.days(),
            "recognized": gap.is_recognized(),
            "approximate": gap.is_approximate(),
            "parsed": gap,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if gap.is_recognized() {
        println!("{} days", gap.days());
    } else {
        println!("0 days (unrecognized)");
    }
    Ok(())
}
