//! Trial classifier.
//!
//! Turns one raw response plus the scheduler's rule context into an
//! immutable [`Trial`]. Classification is total: every response yields
//! exactly one labeled trial.

use chrono::{DateTime, Utc};

use crate::config::FlexSortConfig;
use crate::error::{FlexSortError, Result};
use crate::scheduler::RuleContext;
use crate::stimulus::{REFERENCE_CARDS, Stimulus};
use crate::types::{InterventionLevel, Trial, TrialType};

/// A subject response as captured by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawResponse {
    /// Index of the chosen reference card.
    pub user_choice: u8,
    /// Seconds.
    pub response_time: f64,
    pub timestamp: DateTime<Utc>,
}

impl RawResponse {
    pub fn new(user_choice: u8, response_time: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            user_choice,
            response_time,
            timestamp,
        }
    }

    /// Reject choices outside the reference cards and unusable timings.
    pub fn validate(&self) -> Result<()> {
        if usize::from(self.user_choice) >= REFERENCE_CARDS.len() {
            return Err(FlexSortError::InvalidChoice(self.user_choice));
        }
        if !self.response_time.is_finite() || self.response_time < 0.0 {
            return Err(FlexSortError::InvalidResponseTime(self.response_time));
        }
        Ok(())
    }
}

/// Running session state the classifier reads but does not own.
#[derive(Debug, Clone, Copy)]
pub struct RunningState<'a> {
    /// Consecutive errors before this trial.
    pub consecutive_errors: u32,
    /// Monitor level when the trial is presented.
    pub level: InterventionLevel,
    /// Correctness of the earlier trials of the active block, in order.
    pub block_outcomes: &'a [bool],
}

/// Index of the first trial that begins a run of `streak` correct responses.
///
/// Only runs that complete inside `outcomes` count.
pub fn latency_to_adapt(outcomes: &[bool], streak: u32) -> Option<u32> {
    let streak = streak.max(1) as usize;
    let mut run = 0usize;
    for (idx, &correct) in outcomes.iter().enumerate() {
        run = if correct { run + 1 } else { 0 };
        if run == streak {
            return Some((idx + 1 - streak) as u32);
        }
    }
    None
}

/// Labels raw responses.
#[derive(Debug, Clone, Copy)]
pub struct TrialClassifier {
    buffer_trials: u32,
    recovery_streak: u32,
}

impl TrialClassifier {
    pub fn new(config: &FlexSortConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            buffer_trials: config.session.buffer_trials,
            recovery_streak: config.monitor.recovery_streak,
        })
    }

    /// Whether a position falls inside a post-switch grace window.
    pub fn in_grace_window(&self, ctx: &RuleContext) -> bool {
        ctx.position.block > 1 && ctx.position.trial_in_block <= self.buffer_trials
    }

    /// Produce the labeled trial for one response.
    pub fn classify(
        &self,
        response: &RawResponse,
        stimulus: &Stimulus,
        ctx: &RuleContext,
        state: RunningState<'_>,
    ) -> Trial {
        let choice = Some(response.user_choice);
        let correct = stimulus.matching_card(ctx.rule) == choice;
        let buffer = self.in_grace_window(ctx);

        let perseverative = !correct
            && !buffer
            && ctx
                .previous_rule
                .is_some_and(|prev| stimulus.matching_card(prev) == choice);

        let trial_type = if buffer {
            TrialType::Buffer
        } else {
            state.level.trial_type()
        };

        let consecutive_errors = if correct {
            0
        } else {
            state.consecutive_errors + 1
        };

        let mut outcomes = Vec::with_capacity(state.block_outcomes.len() + 1);
        outcomes.extend_from_slice(state.block_outcomes);
        outcomes.push(correct);
        let latency = latency_to_adapt(&outcomes, self.recovery_streak)
            .unwrap_or(outcomes.len() as u32);

        let (adaptation_latency, initial_rule_discovery_latency) = if ctx.position.block == 1 {
            (None, Some(latency))
        } else {
            (Some(latency), None)
        };

        Trial {
            trial_number: ctx.trial_number,
            rule: ctx.rule,
            stimulus: *stimulus,
            user_choice: response.user_choice,
            correct,
            response_time: response.response_time,
            trial_type,
            rule_switch: ctx.rule_switch,
            perseverative,
            consecutive_errors,
            trial_in_block: ctx.position.trial_in_block,
            rule_block_number: ctx.position.block,
            adaptation_latency,
            initial_rule_discovery_latency,
            timestamp: response.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::BlockPosition;
    use crate::stimulus::{Color, Shape};
    use crate::types::Rule;

    // color -> card 0, shape -> card 1, number -> card 2
    fn stimulus() -> Stimulus {
        Stimulus {
            color: Color::Red,
            shape: Shape::Star,
            count: 3,
        }
    }

    fn ctx(block: u32, trial_in_block: u32, rule: Rule, previous_rule: Option<Rule>) -> RuleContext {
        RuleContext {
            trial_number: (block - 1) * 6 + trial_in_block,
            rule,
            previous_rule,
            position: BlockPosition {
                block,
                trial_in_block,
            },
            rule_switch: block > 1 && trial_in_block == 1,
        }
    }

    fn state(consecutive_errors: u32, outcomes: &[bool]) -> RunningState<'_> {
        RunningState {
            consecutive_errors,
            level: InterventionLevel::Normal,
            block_outcomes: outcomes,
        }
    }

    fn response(choice: u8) -> RawResponse {
        RawResponse::new(choice, 1.5, Utc::now())
    }

    fn classifier() -> TrialClassifier {
        TrialClassifier::new(&FlexSortConfig::default()).unwrap()
    }

    #[test]
    fn test_correct_choice_matches_current_rule() {
        let trial = classifier().classify(
            &response(1),
            &stimulus(),
            &ctx(2, 3, Rule::Shape, Some(Rule::Color)),
            state(2, &[true, false]),
        );
        assert!(trial.correct);
        assert!(!trial.perseverative);
        assert_eq!(trial.consecutive_errors, 0);
        assert_eq!(trial.trial_type, TrialType::Core);
    }

    #[test]
    fn test_old_rule_choice_after_grace_is_perseverative() {
        let trial = classifier().classify(
            &response(0),
            &stimulus(),
            &ctx(2, 2, Rule::Shape, Some(Rule::Color)),
            state(1, &[false]),
        );
        assert!(!trial.correct);
        assert!(trial.perseverative);
        assert_eq!(trial.consecutive_errors, 2);
        assert_eq!(trial.adaptation_latency, Some(2));
        assert_eq!(trial.initial_rule_discovery_latency, None);
    }

    #[test]
    fn test_grace_window_trial_is_buffer_and_never_perseverative() {
        let trial = classifier().classify(
            &response(0),
            &stimulus(),
            &ctx(2, 1, Rule::Shape, Some(Rule::Color)),
            state(0, &[]),
        );
        assert_eq!(trial.trial_type, TrialType::Buffer);
        assert!(trial.rule_switch);
        assert!(!trial.perseverative);
        assert_eq!(trial.consecutive_errors, 1);
    }

    #[test]
    fn test_unrelated_error_is_not_perseverative() {
        let trial = classifier().classify(
            &response(3),
            &stimulus(),
            &ctx(3, 4, Rule::Number, Some(Rule::Shape)),
            state(0, &[true, true, true]),
        );
        assert!(!trial.correct);
        assert!(!trial.perseverative);
    }

    #[test]
    fn test_block_one_cannot_be_perseverative() {
        let trial = classifier().classify(
            &response(1),
            &stimulus(),
            &ctx(1, 2, Rule::Color, None),
            state(0, &[true]),
        );
        assert!(!trial.correct);
        assert!(!trial.perseverative);
        assert_eq!(trial.trial_type, TrialType::Core);
        assert_eq!(trial.initial_rule_discovery_latency, Some(2));
        assert_eq!(trial.adaptation_latency, None);
    }

    #[test]
    fn test_active_intervention_labels_trial() {
        let c = classifier();
        let guided = c.classify(
            &response(2),
            &stimulus(),
            &ctx(2, 5, Rule::Shape, Some(Rule::Color)),
            RunningState {
                consecutive_errors: 3,
                level: InterventionLevel::GuidedMode,
                block_outcomes: &[true, false, false, false],
            },
        );
        assert_eq!(guided.trial_type, TrialType::Guided);

        let extended = c.classify(
            &response(2),
            &stimulus(),
            &ctx(2, 6, Rule::Shape, Some(Rule::Color)),
            RunningState {
                consecutive_errors: 5,
                level: InterventionLevel::RuleTraining,
                block_outcomes: &[false, false, false, false, false],
            },
        );
        assert_eq!(extended.trial_type, TrialType::Extended);
        assert_eq!(extended.adaptation_latency, Some(6));
    }

    #[test]
    fn test_buffer_takes_precedence_over_intervention() {
        let trial = classifier().classify(
            &response(1),
            &stimulus(),
            &ctx(4, 1, Rule::Shape, Some(Rule::Number)),
            RunningState {
                consecutive_errors: 4,
                level: InterventionLevel::GuidedMode,
                block_outcomes: &[],
            },
        );
        assert_eq!(trial.trial_type, TrialType::Buffer);
    }

    #[test]
    fn test_latency_finds_first_sustained_run() {
        assert_eq!(latency_to_adapt(&[true, true], 2), Some(0));
        assert_eq!(latency_to_adapt(&[false, true, false, true, true], 2), Some(3));
        assert_eq!(latency_to_adapt(&[true, false, true], 2), None);
        assert_eq!(latency_to_adapt(&[], 2), None);
        assert_eq!(latency_to_adapt(&[false, true, true, true], 3), Some(1));
    }

    #[test]
    fn test_latency_settles_once_run_completes() {
        let c = classifier();
        let trial = c.classify(
            &response(1),
            &stimulus(),
            &ctx(2, 4, Rule::Shape, Some(Rule::Color)),
            state(0, &[false, false, true]),
        );
        assert_eq!(trial.adaptation_latency, Some(2));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = FlexSortConfig::default();
        config.session.buffer_trials = config.session.block_size;
        assert!(matches!(
            TrialClassifier::new(&config),
            Err(FlexSortError::InvalidConfig(_))
        ));

        let mut config = FlexSortConfig::default();
        config.monitor.recovery_streak = 0;
        assert!(TrialClassifier::new(&config).is_err());
    }

    #[test]
    fn test_raw_response_validation() {
        assert!(RawResponse::new(3, 0.0, Utc::now()).validate().is_ok());
        assert!(matches!(
            RawResponse::new(4, 1.0, Utc::now()).validate(),
            Err(FlexSortError::InvalidChoice(4))
        ));
        assert!(matches!(
            RawResponse::new(0, -0.1, Utc::now()).validate(),
            Err(FlexSortError::InvalidResponseTime(_))
        ));
        assert!(RawResponse::new(0, f64::NAN, Utc::now()).validate().is_err());
    }
}
