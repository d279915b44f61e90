//! Re-score a recorded trial log.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use flexsort_core::{AssessmentData, FlexSortConfig, FlexSortSession, ReportTier, SessionId, Trial};
use serde::Deserialize;
use tracing::info;

use crate::config::ConfigLoader;
use crate::report;

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// JSON file holding a trial array or a saved scorecard
    pub path: PathBuf,

    /// Report tier to render (basic, standard, premium)
    #[arg(long, default_value = "premium")]
    pub tier: ReportTier,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Accepted input shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordedLog {
    Scorecard(Box<AssessmentData>),
    Trials(Vec<Trial>),
}

pub fn run(args: ScoreArgs, config_path: Option<&Path>) -> Result<()> {
    let (config, source) = ConfigLoader::load(config_path)?;
    info!(%source, path = %args.path.display(), "Scoring recorded log");

    let contents = std::fs::read_to_string(&args.path)
        .with_context(|| format!("failed to read {}", args.path.display()))?;
    let result = score(config, &contents)?;
    report::print(&result, args.tier, args.json)
}

/// Replay a JSON log through a fresh session and return its scorecard.
pub fn score(config: FlexSortConfig, json: &str) -> Result<AssessmentData> {
    let (session_id, trials) = match serde_json::from_str(json).context("unrecognized log format")? {
        RecordedLog::Scorecard(data) => (data.session_id, data.trials),
        RecordedLog::Trials(trials) => (SessionId::new(), trials),
    };
    let session = FlexSortSession::replay(session_id, config, &trials)
        .context("trial log does not replay under this configuration")?;
    Ok(session.result()?)
}
