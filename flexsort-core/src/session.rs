//! Assessment session: the sequencing shell around the engine components.
//!
//! Each response flows Scheduler → Classifier → Monitor before the trial is
//! appended to the log, and only then is the next response accepted.
//! Submission takes `&mut self`, so a session can never process two
//! trials at once.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::classifier::{RawResponse, RunningState, TrialClassifier};
use crate::config::FlexSortConfig;
use crate::error::{FlexSortError, Result};
use crate::metrics::MetricsAggregator;
use crate::monitor::AdaptiveTriggerMonitor;
use crate::scheduler::{RuleBlockScheduler, RuleContext, SchedulerStep};
use crate::stimulus::{Stimulus, StimulusDeck};
use crate::types::{AssessmentData, InterventionLevel, SessionId, Trial};

/// One subject's run through the rule-switching task.
#[derive(Debug)]
pub struct FlexSortSession {
    id: SessionId,
    config: FlexSortConfig,
    scheduler: RuleBlockScheduler,
    classifier: TrialClassifier,
    monitor: AdaptiveTriggerMonitor,
    aggregator: MetricsAggregator,
    deck: StimulusDeck,
    /// Stimulus awaiting a response; `None` once complete.
    current_stimulus: Option<Stimulus>,
    consecutive_errors: u32,
    /// Correctness of the active block's trials so far.
    block_outcomes: Vec<bool>,
    trials: Vec<Trial>,
}

impl FlexSortSession {
    /// Start a session, failing fast on invalid configuration.
    pub fn new(config: FlexSortConfig) -> Result<Self> {
        Self::with_id(SessionId::new(), config)
    }

    /// Start a session under a known ID.
    pub fn with_id(id: SessionId, config: FlexSortConfig) -> Result<Self> {
        config.validate()?;
        let monitor = AdaptiveTriggerMonitor::new(config.monitor.clone())?;
        let mut deck = StimulusDeck::new(config.session.seed);
        let current_stimulus = Some(deck.draw());

        info!(
            session = %id,
            seed = deck.seed(),
            trials = config.session.total_trials(),
            "Session started"
        );

        Ok(Self {
            id,
            scheduler: RuleBlockScheduler::new(&config.session)?,
            classifier: TrialClassifier::new(&config)?,
            aggregator: MetricsAggregator::new(&config)?,
            monitor,
            deck,
            current_stimulus,
            consecutive_errors: 0,
            block_outcomes: Vec::with_capacity(config.session.block_size as usize),
            trials: Vec::with_capacity(config.session.total_trials() as usize),
            config,
        })
    }

    /// Rebuild a session from a persisted trial log.
    ///
    /// Every recorded trial is re-derived from its stimulus, choice and
    /// timing; the rebuilt session holds the same running counters as the
    /// one that produced the log.
    pub fn replay(id: SessionId, config: FlexSortConfig, trials: &[Trial]) -> Result<Self> {
        let mut session = Self::with_id(id, config)?;
        for recorded in trials {
            let Some(ctx) = session.scheduler.context() else {
                return Err(FlexSortError::SessionComplete);
            };
            if recorded.trial_number != ctx.trial_number {
                return Err(FlexSortError::OutOfOrder {
                    expected: ctx.trial_number,
                    got: recorded.trial_number,
                });
            }
            let response = RawResponse::new(
                recorded.user_choice,
                recorded.response_time,
                recorded.timestamp,
            );
            response.validate()?;

            let derived = session.record(response, recorded.stimulus, ctx);
            if let Some(field) = first_difference(recorded, &derived) {
                return Err(FlexSortError::ReplayMismatch {
                    trial_number: recorded.trial_number,
                    reason: format!("recorded {field} differs from derived value"),
                });
            }
        }
        debug!(session = %session.id, replayed = trials.len(), "Session replayed");
        Ok(session)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &FlexSortConfig {
        &self.config
    }

    /// Seed of the stimulus deck, for reproducing the presentation order.
    pub fn seed(&self) -> u64 {
        self.deck.seed()
    }

    /// Stimulus the subject should sort next.
    pub fn current_stimulus(&self) -> Option<&Stimulus> {
        self.current_stimulus.as_ref()
    }

    /// Rule context of the next trial.
    pub fn current_context(&self) -> Option<RuleContext> {
        self.scheduler.context()
    }

    /// Support level the next trial will be framed with.
    pub fn intervention_level(&self) -> InterventionLevel {
        self.monitor.level()
    }

    pub fn guided_mode_triggered(&self) -> bool {
        self.monitor.guided_mode_triggered()
    }

    pub fn rule_training_triggered(&self) -> bool {
        self.monitor.rule_training_triggered()
    }

    pub fn is_complete(&self) -> bool {
        self.scheduler.is_complete()
    }

    /// The append-only trial log.
    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    /// Submit a response captured now.
    pub fn submit_response(&mut self, user_choice: u8, response_time: f64) -> Result<Trial> {
        self.submit_response_at(user_choice, response_time, Utc::now())
    }

    /// Submit a response captured at `timestamp`.
    pub fn submit_response_at(
        &mut self,
        user_choice: u8,
        response_time: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<Trial> {
        let (Some(ctx), Some(stimulus)) = (self.scheduler.context(), self.current_stimulus) else {
            warn!(session = %self.id, "Response rejected: session already complete");
            return Err(FlexSortError::SessionComplete);
        };

        let response = RawResponse::new(user_choice, response_time, timestamp);
        if let Err(err) = response.validate() {
            warn!(session = %self.id, trial = ctx.trial_number, %err, "Response rejected");
            return Err(err);
        }

        Ok(self.record(response, stimulus, ctx))
    }

    /// Scorecard for the completed session.
    pub fn result(&self) -> Result<AssessmentData> {
        if !self.is_complete() {
            return Err(FlexSortError::SessionIncomplete {
                submitted: self.trials.len(),
                expected: self.scheduler.total_trials() as usize,
            });
        }
        self.aggregator.aggregate(self.id, &self.trials)
    }

    fn record(&mut self, response: RawResponse, stimulus: Stimulus, ctx: RuleContext) -> Trial {
        let trial = self.classifier.classify(
            &response,
            &stimulus,
            &ctx,
            RunningState {
                consecutive_errors: self.consecutive_errors,
                level: self.monitor.level(),
                block_outcomes: &self.block_outcomes,
            },
        );
        self.monitor.update(&trial);
        self.consecutive_errors = trial.consecutive_errors;
        self.block_outcomes.push(trial.correct);
        self.trials.push(trial.clone());

        debug!(
            trial = trial.trial_number,
            block = trial.rule_block_number,
            rule = %trial.rule,
            correct = trial.correct,
            perseverative = trial.perseverative,
            trial_type = trial.trial_type.as_str(),
            "Trial recorded"
        );

        match self.scheduler.advance() {
            SchedulerStep::Continue => {
                self.current_stimulus = Some(self.deck.draw());
            }
            SchedulerStep::RuleSwitch { .. } => {
                self.block_outcomes.clear();
                let block = trial.rule_block_number + 1;
                self.monitor.start_block(block, self.consecutive_errors);
                self.current_stimulus = Some(self.deck.draw());
            }
            SchedulerStep::Complete => {
                self.current_stimulus = None;
                info!(session = %self.id, trials = self.trials.len(), "Session complete");
            }
        }

        trial
    }
}

/// First label on which a recorded trial disagrees with the derived one.
fn first_difference(recorded: &Trial, derived: &Trial) -> Option<&'static str> {
    if recorded.rule != derived.rule {
        Some("rule")
    } else if recorded.correct != derived.correct {
        Some("correct")
    } else if recorded.trial_type != derived.trial_type {
        Some("trial_type")
    } else if recorded.rule_switch != derived.rule_switch {
        Some("rule_switch")
    } else if recorded.perseverative != derived.perseverative {
        Some("perseverative")
    } else if recorded.consecutive_errors != derived.consecutive_errors {
        Some("consecutive_errors")
    } else if recorded.trial_in_block != derived.trial_in_block
        || recorded.rule_block_number != derived.rule_block_number
    {
        Some("block position")
    } else if recorded.latency() != derived.latency() {
        Some("latency")
    } else {
        None
    }
}
