//! Tier-filtered scorecard rendering.
//!
//! The engine always computes the full scorecard; this module decides how
//! much of it a report tier shows.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use flexsort_core::{
    AdaptationBand, AssessmentData, BlockSummary, ErrorControlBand, Interpretation,
    ReportFeature, ReportTier, ScoreBand, SessionId, SpeedBand, Trial,
};
use serde::Serialize;

/// Headline metrics shown from the standard tier up.
#[derive(Debug, Serialize)]
pub struct Performance {
    pub shifts_achieved: u32,
    pub possible_shifts: u32,
    pub perseverative_errors: u32,
    pub adaptation_latency: f64,
    pub avg_response_time: f64,
    pub accuracy: f64,
}

/// Which interventions fired.
#[derive(Debug, Serialize)]
pub struct AdaptiveSupport {
    pub guided_mode_triggered: bool,
    pub rule_training_triggered: bool,
}

/// A scorecard with the sections the tier does not unlock left out.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub tier: ReportTier,
    pub session_id: SessionId,
    pub cognitive_flexibility_score: u32,
    pub score_band: ScoreBand,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<Performance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adaptive_support: Option<AdaptiveSupport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<Interpretation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<&'a [BlockSummary]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trials: Option<&'a [Trial]>,
}

impl<'a> Report<'a> {
    pub fn build(data: &'a AssessmentData, tier: ReportTier) -> Self {
        let caps = tier.capabilities();
        let interpretation = Interpretation::of(data);
        let gate = |feature| caps.allows(feature);

        Self {
            tier,
            session_id: data.session_id,
            cognitive_flexibility_score: data.cognitive_flexibility_score,
            score_band: interpretation.score,
            performance: gate(ReportFeature::PerformanceMetrics).then(|| Performance {
                shifts_achieved: data.shifts_achieved,
                possible_shifts: data.blocks.len().saturating_sub(1) as u32,
                perseverative_errors: data.perseverative_errors,
                adaptation_latency: data.adaptation_latency,
                avg_response_time: data.avg_response_time,
                accuracy: data.accuracy,
            }),
            adaptive_support: gate(ReportFeature::AdaptiveFeatures).then(|| AdaptiveSupport {
                guided_mode_triggered: data.guided_mode_triggered,
                rule_training_triggered: data.rule_training_triggered,
            }),
            summary: gate(ReportFeature::NarrativeSummary)
                .then(|| narrative(data, &interpretation)),
            interpretation: gate(ReportFeature::ClinicalInterpretation).then_some(interpretation),
            blocks: gate(ReportFeature::BlockCharts).then_some(data.blocks.as_slice()),
            trials: gate(ReportFeature::RawDataExport).then_some(data.trials.as_slice()),
        }
    }
}

/// Plain-language summary assembled from the interpretation bands.
pub fn narrative(data: &AssessmentData, interpretation: &Interpretation) -> String {
    let possible = data.blocks.len().saturating_sub(1);
    let adaptation = match interpretation.adaptation {
        AdaptationBand::Excellent => "adapted readily to changing rules",
        AdaptationBand::Good => "adapted to most rule changes",
        AdaptationBand::Developing => "found it hard to adapt when the rule changed",
    };
    let control = match interpretation.error_control {
        ErrorControlBand::Strong => "rarely held on to a retired rule",
        ErrorControlBand::Moderate => "sometimes held on to a retired rule",
        ErrorControlBand::Significant => "often kept applying a retired rule",
    };
    let speed = match interpretation.speed {
        SpeedBand::Efficient => "quick",
        SpeedBand::Typical => "typical",
        SpeedBand::Deliberate => "slow and deliberate",
    };

    let mut text = format!(
        "{} cognitive flexibility. The subject {} ({} of {} shifts) and {} ({} perseverative errors). Responses were {} at {:.2}s on average.",
        interpretation.score.label(),
        adaptation,
        data.shifts_achieved,
        possible,
        control,
        data.perseverative_errors,
        speed,
        data.avg_response_time,
    );
    if data.rule_training_triggered {
        text.push_str(" Rule training was needed, so explicit instruction may help.");
    } else if data.guided_mode_triggered {
        text.push_str(" Guided mode was needed during at least one shift.");
    }
    text
}

/// Print a scorecard as JSON or tables.
pub fn print(data: &AssessmentData, tier: ReportTier, json: bool) -> Result<()> {
    let report = Report::build(data, tier);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", summary_table(&report));
    if let Some(summary) = &report.summary {
        println!("\n{summary}");
    }
    if let Some(blocks) = report.blocks {
        println!("\n{}", blocks_table(blocks));
    }
    if let Some(interpretation) = &report.interpretation {
        println!("\n{}", interpretation_table(interpretation));
    }
    Ok(())
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    table
}

fn summary_table(report: &Report<'_>) -> Table {
    let mut table = new_table(&["Metric", "Value"]);
    table.add_row(vec![Cell::new("Session"), Cell::new(report.session_id)]);
    table.add_row(vec![Cell::new("Tier"), Cell::new(report.tier.as_str())]);
    table.add_row(vec![
        Cell::new("Cognitive flexibility"),
        Cell::new(format!(
            "{} ({})",
            report.cognitive_flexibility_score,
            report.score_band.label()
        ))
        .fg(score_color(report.score_band)),
    ]);

    if let Some(perf) = &report.performance {
        table.add_row(vec![
            Cell::new("Shifts achieved"),
            Cell::new(format!("{} / {}", perf.shifts_achieved, perf.possible_shifts)),
        ]);
        table.add_row(vec![
            Cell::new("Perseverative errors"),
            Cell::new(perf.perseverative_errors),
        ]);
        table.add_row(vec![
            Cell::new("Adaptation latency"),
            Cell::new(format!("{:.1} trials", perf.adaptation_latency)),
        ]);
        table.add_row(vec![
            Cell::new("Avg response time"),
            Cell::new(format!("{:.2}s", perf.avg_response_time)),
        ]);
        table.add_row(vec![
            Cell::new("Accuracy"),
            Cell::new(format!("{:.0}%", perf.accuracy * 100.0)),
        ]);
    }
    if let Some(support) = &report.adaptive_support {
        table.add_row(vec![
            Cell::new("Guided mode"),
            Cell::new(yes_no(support.guided_mode_triggered)),
        ]);
        table.add_row(vec![
            Cell::new("Rule training"),
            Cell::new(yes_no(support.rule_training_triggered)),
        ]);
    }
    table
}

fn blocks_table(blocks: &[BlockSummary]) -> Table {
    let mut table = new_table(&[
        "Block",
        "Rule",
        "Accuracy",
        "Avg RT",
        "Latency",
        "Persev.",
        "Peak support",
    ]);
    for block in blocks {
        table.add_row(vec![
            Cell::new(block.rule_block_number),
            Cell::new(block.rule),
            Cell::new(format!("{:.0}%", block.accuracy * 100.0)),
            Cell::new(format!("{:.2}s", block.avg_response_time)),
            Cell::new(if block.adapted {
                block.latency.to_string()
            } else {
                "-".to_string()
            }),
            Cell::new(block.perseverative_errors),
            Cell::new(format!("{:?}", block.peak_intervention)),
        ]);
    }
    table
}

fn interpretation_table(interpretation: &Interpretation) -> Table {
    let mut table = new_table(&["Domain", "Band"]);
    table.add_row(vec![
        Cell::new("Overall"),
        Cell::new(interpretation.score.label()),
    ]);
    table.add_row(vec![
        Cell::new("Adaptation"),
        Cell::new(format!("{:?}", interpretation.adaptation)),
    ]);
    table.add_row(vec![
        Cell::new("Error control"),
        Cell::new(format!("{:?}", interpretation.error_control)),
    ]);
    table.add_row(vec![
        Cell::new("Processing speed"),
        Cell::new(format!("{:?}", interpretation.speed)),
    ]);
    table
}

fn score_color(band: ScoreBand) -> Color {
    match band {
        ScoreBand::Excellent | ScoreBand::VeryGood => Color::Green,
        ScoreBand::Good | ScoreBand::Average => Color::Yellow,
        ScoreBand::BelowAverage | ScoreBand::NeedsImprovement => Color::Red,
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use flexsort_core::{FlexSortConfig, FlexSortSession};

    fn scorecard() -> AssessmentData {
        let mut config = FlexSortConfig::default();
        config.session.seed = Some(21);
        let mut session = FlexSortSession::new(config).unwrap();
        while let Some(ctx) = session.current_context() {
            let choice = session
                .current_stimulus()
                .and_then(|s| s.matching_card(ctx.rule))
                .unwrap();
            session.submit_response_at(choice, 1.5, Utc::now()).unwrap();
        }
        session.result().unwrap()
    }

    #[test]
    fn test_basic_report_shows_headline_only() {
        let data = scorecard();
        let report = Report::build(&data, ReportTier::Basic);
        assert_eq!(report.cognitive_flexibility_score, data.cognitive_flexibility_score);
        assert!(report.performance.is_none());
        assert!(report.summary.is_none());
        assert!(report.trials.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("performance").is_none());
        assert_eq!(json["score_band"], "excellent");
    }

    #[test]
    fn test_standard_report_adds_summary_but_not_blocks() {
        let data = scorecard();
        let report = Report::build(&data, ReportTier::Standard);
        assert_eq!(report.performance.as_ref().unwrap().possible_shifts, 5);
        assert!(report.adaptive_support.is_some());
        assert!(report.summary.is_some());
        assert!(report.blocks.is_none());
        assert!(report.interpretation.is_none());
    }

    #[test]
    fn test_premium_report_includes_raw_trials() {
        let data = scorecard();
        let report = Report::build(&data, ReportTier::Premium);
        assert_eq!(report.blocks.unwrap().len(), 6);
        assert_eq!(report.trials.unwrap().len(), 36);
        assert!(report.interpretation.is_some());
    }

    #[test]
    fn test_narrative_mentions_shifts_and_interventions() {
        let mut data = scorecard();
        let text = narrative(&data, &Interpretation::of(&data));
        assert!(text.starts_with("Excellent cognitive flexibility."));
        assert!(text.contains("5 of 5 shifts"));
        assert!(!text.contains("Guided mode"));

        data.guided_mode_triggered = true;
        let text = narrative(&data, &Interpretation::of(&data));
        assert!(text.contains("Guided mode was needed"));
    }
}
