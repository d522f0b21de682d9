use anyhow::Result;
use cue_stitch::{Pairing, StitchConfig};

/// Shared stitching flags accepted by `stitch` and `unified`.
#[derive(clap::Args, Debug, Clone)]
pub(crate) struct StitchFlags {
    /// Days between the last real session and the trigger query.
    #[arg(long, default_value_t = cue_stitch::temporal::DEFAULT_QUERY_OFFSET_DAYS)]
    pub(crate) query_offset_days: i64,

    /// Accept conversations whose session dates go backwards instead of rejecting them.
    #[arg(long)]
    pub(crate) allow_unordered_sessions: bool,
}

impl StitchFlags {
    pub(crate) fn to_config(&self) -> StitchConfig {
        StitchConfig {
            query_offset_days: self.query_offset_days,
            require_monotonic_sessions: !self.allow_unordered_sessions,
        }
    }
}

/// Parse `--pairing` (cyclic|random) together with `--seed`.
pub(crate) fn parse_pairing(mode: &str, seed: u64) -> Result<Pairing> {
    match mode.to_lowercase().as_str() {
        "cyclic" => Ok(Pairing::Cyclic),
        "random" => Ok(Pairing::Random { seed }),
        other => Err(anyhow::anyhow!(
            "unsupported --pairing '{}'; supported: cyclic|random",
            other
        )),
    }
}

/// Size the global rayon pool. `None` keeps rayon's default (one thread per core).
pub(crate) fn configure_workers(workers: Option<usize>) -> Result<()> {
    if let Some(n) = workers {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n.max(1))
            .build_global()
            .map_err(|e| anyhow::anyhow!("configuring {} workers: {}", n, e))?;
    }
    Ok(())
}
