//! Metrics aggregation over a completed trial log.
//!
//! The aggregator is a pure fold: the same log and configuration always
//! produce the same [`AssessmentData`]. Intervention flags are rebuilt by
//! running a fresh [`AdaptiveTriggerMonitor`] over the log, so an escalation
//! on the very last trial is still reported.

use crate::config::{FlexSortConfig, ScoringConfig};
use crate::error::{FlexSortError, Result};
use crate::monitor::AdaptiveTriggerMonitor;
use crate::types::{AssessmentData, BlockSummary, InterventionLevel, SessionId, Trial, TrialType};

/// Folds a finished trial log into the session scorecard.
#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    config: FlexSortConfig,
}

impl MetricsAggregator {
    /// Create an aggregator for logs produced under `config`.
    pub fn new(config: &FlexSortConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
        })
    }

    /// Compute the scorecard for a complete, ordered trial log.
    pub fn aggregate(&self, session_id: SessionId, trials: &[Trial]) -> Result<AssessmentData> {
        let expected = self.config.session.total_trials() as usize;
        if trials.len() != expected {
            return Err(FlexSortError::SessionIncomplete {
                submitted: trials.len(),
                expected,
            });
        }
        for (idx, trial) in trials.iter().enumerate() {
            let want = idx as u32 + 1;
            if trial.trial_number != want {
                return Err(FlexSortError::OutOfOrder {
                    expected: want,
                    got: trial.trial_number,
                });
            }
        }

        let block_size = self.config.session.block_size;
        let peaks = self.replay_monitor(trials)?;
        let blocks: Vec<BlockSummary> = trials
            .chunks(block_size as usize)
            .zip(peaks.peaks)
            .map(|(block, peak)| summarize_block(block, block_size, peak))
            .collect();

        let possible_shifts = blocks.len().saturating_sub(1) as u32;
        let shifts_achieved = blocks.iter().skip(1).filter(|b| b.adapted).count() as u32;
        let perseverative_errors = trials.iter().filter(|t| t.perseverative).count() as u32;
        let adaptation_latency = mean(blocks.iter().skip(1).map(|b| f64::from(b.latency)))
            .unwrap_or(0.0);
        let core_response_time = mean_core_response_time(trials);
        let accuracy = trials.iter().filter(|t| t.correct).count() as f64 / trials.len() as f64;

        let cognitive_flexibility_score = flexibility_score(
            &self.config.scoring,
            shifts_achieved,
            possible_shifts,
            perseverative_errors,
            core_response_time,
        );

        // Length was checked against a non-zero total above.
        let completed_at = trials
            .last()
            .map(|t| t.timestamp)
            .unwrap_or_default();

        Ok(AssessmentData {
            session_id,
            trials: trials.to_vec(),
            cognitive_flexibility_score,
            shifts_achieved,
            perseverative_errors,
            adaptation_latency,
            avg_response_time: core_response_time.unwrap_or(0.0),
            accuracy,
            guided_mode_triggered: peaks.guided_mode_triggered,
            rule_training_triggered: peaks.rule_training_triggered,
            blocks,
            completed_at,
        })
    }

    fn replay_monitor(&self, trials: &[Trial]) -> Result<MonitorReplay> {
        let mut monitor = AdaptiveTriggerMonitor::new(self.config.monitor.clone())?;
        let mut peaks = Vec::with_capacity(self.config.session.blocks as usize);
        let mut previous_errors = 0;

        for trial in trials {
            if trial.trial_in_block == 1 && trial.rule_block_number > 1 {
                monitor.start_block(trial.rule_block_number, previous_errors);
            }
            monitor.update(trial);
            previous_errors = trial.consecutive_errors;
            if trial.trial_in_block == self.config.session.block_size {
                peaks.push(monitor.block_peak());
            }
        }

        Ok(MonitorReplay {
            peaks,
            guided_mode_triggered: monitor.guided_mode_triggered(),
            rule_training_triggered: monitor.rule_training_triggered(),
        })
    }
}

struct MonitorReplay {
    peaks: Vec<InterventionLevel>,
    guided_mode_triggered: bool,
    rule_training_triggered: bool,
}

fn summarize_block(block: &[Trial], block_size: u32, peak: InterventionLevel) -> BlockSummary {
    let first = &block[0];
    let latency = block
        .last()
        .and_then(Trial::latency)
        .unwrap_or(block_size)
        .min(block_size);
    BlockSummary {
        rule_block_number: first.rule_block_number,
        rule: first.rule,
        accuracy: block.iter().filter(|t| t.correct).count() as f64 / block.len() as f64,
        avg_response_time: mean(block.iter().map(|t| t.response_time)).unwrap_or(0.0),
        latency,
        adapted: latency < block_size,
        perseverative_errors: block.iter().filter(|t| t.perseverative).count() as u32,
        peak_intervention: peak,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Mean response time over core trials, `None` when there are none.
pub fn mean_core_response_time(trials: &[Trial]) -> Option<f64> {
    mean(
        trials
            .iter()
            .filter(|t| t.trial_type == TrialType::Core)
            .map(|t| t.response_time),
    )
}

/// Composite 0 - 100 score from the headline metrics.
///
/// A log without core trials gets the speed floor.
pub fn flexibility_score(
    scoring: &ScoringConfig,
    shifts_achieved: u32,
    possible_shifts: u32,
    perseverative_errors: u32,
    avg_response_time: Option<f64>,
) -> u32 {
    let shift_ratio = if possible_shifts == 0 {
        0.0
    } else {
        f64::from(shifts_achieved.min(possible_shifts)) / f64::from(possible_shifts)
    };
    let error_control =
        (1.0 - scoring.perseveration_penalty * f64::from(perseverative_errors)).max(0.0);
    let speed = match avg_response_time {
        Some(rt) => ((scoring.slow_response_secs - rt)
            / (scoring.slow_response_secs - scoring.fast_response_secs))
            .clamp(scoring.speed_floor, 1.0),
        None => scoring.speed_floor,
    };

    let raw = 100.0
        * (scoring.shift_weight * shift_ratio
            + scoring.error_weight * error_control
            + scoring.speed_weight * speed);
    raw.round().clamp(0.0, 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stimulus::REFERENCE_CARDS;
    use crate::types::Rule;
    use chrono::{TimeZone, Utc};

    fn make_trial(trial_number: u32, response_time: f64, trial_type: TrialType) -> Trial {
        Trial {
            trial_number,
            rule: Rule::Color,
            stimulus: REFERENCE_CARDS[0],
            user_choice: 0,
            correct: true,
            response_time,
            trial_type,
            rule_switch: false,
            perseverative: false,
            consecutive_errors: 0,
            trial_in_block: 1,
            rule_block_number: 1,
            adaptation_latency: None,
            initial_rule_discovery_latency: Some(0),
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_mean_core_response_time_of_evenly_spaced_trials() {
        let trials: Vec<Trial> = (0..30)
            .map(|i| make_trial(i + 1, 1.0 + 2.0 * f64::from(i) / 29.0, TrialType::Core))
            .collect();
        let mean = mean_core_response_time(&trials).unwrap();
        let expected = trials.iter().map(|t| t.response_time).sum::<f64>() / 30.0;
        assert!((mean - expected).abs() < 1e-9);
        assert!((mean - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_core_response_time_ignores_other_trial_types() {
        let trials = vec![
            make_trial(1, 1.0, TrialType::Core),
            make_trial(2, 9.0, TrialType::Buffer),
            make_trial(3, 9.0, TrialType::Guided),
            make_trial(4, 3.0, TrialType::Core),
        ];
        assert_eq!(mean_core_response_time(&trials), Some(2.0));
        assert_eq!(
            mean_core_response_time(&[make_trial(1, 1.0, TrialType::Extended)]),
            None
        );
    }

    #[test]
    fn test_perfect_fast_performance_scores_100() {
        let score = flexibility_score(&ScoringConfig::default(), 5, 5, 0, Some(1.0));
        assert_eq!(score, 100);
    }

    #[test]
    fn test_score_decreases_with_perseveration() {
        let scoring = ScoringConfig::default();
        let clean = flexibility_score(&scoring, 5, 5, 0, Some(2.0));
        let some = flexibility_score(&scoring, 5, 5, 3, Some(2.0));
        let many = flexibility_score(&scoring, 5, 5, 20, Some(2.0));
        assert!(clean > some);
        assert!(some > many);
        // Error-control term is floored at zero
        assert_eq!(many, flexibility_score(&scoring, 5, 5, 50, Some(2.0)));
    }

    #[test]
    fn test_score_decreases_with_slower_responses() {
        let scoring = ScoringConfig::default();
        let fast = flexibility_score(&scoring, 3, 5, 2, Some(1.2));
        let slow = flexibility_score(&scoring, 3, 5, 2, Some(4.0));
        let slowest = flexibility_score(&scoring, 3, 5, 2, Some(30.0));
        assert!(fast > slow);
        assert!(slow > slowest);
        assert_eq!(slowest, flexibility_score(&scoring, 3, 5, 2, Some(60.0)));
    }

    #[test]
    fn test_score_weights_are_applied() {
        let scoring = ScoringConfig::default();
        // 0.5 * 0 + 0.3 * 0 + 0.2 * 1.0
        assert_eq!(flexibility_score(&scoring, 0, 5, 10, Some(0.5)), 20);
        // 0.5 * 1 + 0.3 * 1 + 0.2 * 0.0
        assert_eq!(flexibility_score(&scoring, 5, 5, 0, Some(5.0)), 80);
        assert_eq!(flexibility_score(&scoring, 5, 5, 0, None), 80);
    }

    #[test]
    fn test_aggregate_rejects_incomplete_log() {
        let aggregator = MetricsAggregator::new(&FlexSortConfig::default()).unwrap();
        let trials = vec![make_trial(1, 1.0, TrialType::Core)];
        let err = aggregator.aggregate(SessionId::new(), &trials).unwrap_err();
        assert!(matches!(
            err,
            FlexSortError::SessionIncomplete {
                submitted: 1,
                expected: 36
            }
        ));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = FlexSortConfig::default();
        config.session.block_size = 0;
        let err = MetricsAggregator::new(&config).unwrap_err();
        assert!(matches!(err, FlexSortError::InvalidConfig(_)));

        let mut config = FlexSortConfig::default();
        config.scoring.shift_weight = 0.9;
        assert!(MetricsAggregator::new(&config).is_err());
    }

    #[test]
    fn test_aggregate_rejects_misnumbered_log() {
        let aggregator = MetricsAggregator::new(&FlexSortConfig::default()).unwrap();
        let mut trials: Vec<Trial> = (1..=36)
            .map(|n| make_trial(n, 1.0, TrialType::Core))
            .collect();
        trials.swap(3, 4);
        let err = aggregator.aggregate(SessionId::new(), &trials).unwrap_err();
        assert!(matches!(
            err,
            FlexSortError::OutOfOrder {
                expected: 4,
                got: 5
            }
        ));
    }
}
