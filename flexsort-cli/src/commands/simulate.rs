//! Simulated sessions against scripted subjects.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Args;
use flexsort_core::{AssessmentData, FlexSortConfig, FlexSortSession, ReportTier};
use tracing::info;

use crate::config::ConfigLoader;
use crate::report;
use crate::subject::{Profile, ScriptedSubject};

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Response pattern of the simulated subject
    #[arg(long, value_enum, default_value_t = Profile::Perfect)]
    pub profile: Profile,

    /// Stimulus and subject seed (overrides the configured seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Report tier to render (basic, standard, premium)
    #[arg(long, default_value = "premium")]
    pub tier: ReportTier,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Save the full scorecard to the results directory
    #[arg(long)]
    pub save: bool,
}

pub fn run(args: SimulateArgs, config_path: Option<&Path>) -> Result<()> {
    let (mut config, source) = ConfigLoader::load(config_path)?;
    info!(%source, profile = ?args.profile, "Simulating session");
    if args.seed.is_some() {
        config.session.seed = args.seed;
    }

    let result = simulate(config, args.profile)?;
    if args.save {
        let path = save(&result, &flexsort_paths::results_dir())?;
        info!(path = %path.display(), "Scorecard saved");
    }
    report::print(&result, args.tier, args.json)
}

/// Drive a whole session with a scripted subject.
pub fn simulate(config: FlexSortConfig, profile: Profile) -> Result<AssessmentData> {
    let mut session = FlexSortSession::new(config)?;
    let mut subject = ScriptedSubject::new(profile, session.seed());
    let mut at = Utc::now();

    while let (Some(ctx), Some(stimulus)) =
        (session.current_context(), session.current_stimulus().copied())
    {
        let (choice, response_time) = subject.respond(&ctx, &stimulus);
        at += Duration::milliseconds((response_time * 1000.0).round() as i64);
        session.submit_response_at(choice, response_time, at)?;
    }
    Ok(session.result()?)
}

/// Write a scorecard as `<session_id>.json` under `dir`.
pub fn save(result: &AssessmentData, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(format!("{}.json", result.session_id));
    std::fs::write(&path, serde_json::to_string_pretty(result)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
