//! Adaptive trigger monitor for remedial interventions.
//!
//! Watches the error stream inside a block and escalates support when the
//! subject fails to adapt. Support never blocks progression: the subject
//! keeps answering and only the framing of later trials changes.
//!
//! ## State Machine
//!
//! ```text
//! ┌────────┐  streak >= T1  ┌────────────┐  streak >= T2  ┌──────────────┐
//! │ Normal │ ─────────────► │ GuidedMode │ ─────────────► │ RuleTraining │
//! └───┬────┘                └─────┬──────┘                └──────┬───────┘
//!     ▲                           │                              │
//!     └──────── K consecutive correct responses ◄────────────────┘
//! ```
//!
//! The error streak is counted within the active block only. At a block
//! boundary the level drops back to `Normal` unless the subject is still
//! inside a failing streak of at least T1 errors.

use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::error::{FlexSortError, Result};
use crate::types::{InterventionLevel, Trial};

/// Transition event emitted when the intervention level changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorTransition {
    /// Support escalated after an error streak.
    Escalated {
        from: InterventionLevel,
        to: InterventionLevel,
        trial_number: u32,
        error_streak: u32,
    },
    /// Sustained correct responding resolved the intervention.
    Resolved {
        from: InterventionLevel,
        trial_number: u32,
    },
    /// A new block opened while the subject was still failing.
    CarriedOver {
        level: InterventionLevel,
        block: u32,
    },
    /// A new block opened and the intervention was dropped.
    Reset {
        from: InterventionLevel,
        block: u32,
    },
}

/// Escalating support controller for one session.
#[derive(Debug, Clone)]
pub struct AdaptiveTriggerMonitor {
    config: MonitorConfig,
    level: InterventionLevel,
    /// Consecutive correct responses, for resolution.
    correct_streak: u32,
    /// Highest level reached in the active block.
    block_peak: InterventionLevel,
    guided_mode_triggered: bool,
    rule_training_triggered: bool,
}

impl AdaptiveTriggerMonitor {
    /// Create a monitor, rejecting inconsistent thresholds.
    pub fn new(config: MonitorConfig) -> Result<Self> {
        if config.guided_threshold == 0 || config.recovery_streak == 0 {
            return Err(FlexSortError::InvalidConfig(
                "monitor thresholds must be greater than 0".to_string(),
            ));
        }
        if config.training_threshold <= config.guided_threshold {
            return Err(FlexSortError::InvalidConfig(format!(
                "training_threshold ({}) must exceed guided_threshold ({})",
                config.training_threshold, config.guided_threshold
            )));
        }
        Ok(Self {
            config,
            level: InterventionLevel::Normal,
            correct_streak: 0,
            block_peak: InterventionLevel::Normal,
            guided_mode_triggered: false,
            rule_training_triggered: false,
        })
    }

    /// Current support level.
    pub fn level(&self) -> InterventionLevel {
        self.level
    }

    /// Highest level reached in the active block.
    pub fn block_peak(&self) -> InterventionLevel {
        self.block_peak
    }

    /// Whether guided mode fired at any point in the session.
    pub fn guided_mode_triggered(&self) -> bool {
        self.guided_mode_triggered
    }

    /// Whether rule training fired at any point in the session.
    pub fn rule_training_triggered(&self) -> bool {
        self.rule_training_triggered
    }

    /// Record a classified trial and potentially change level.
    ///
    /// Returns `Some(MonitorTransition)` if the level changed.
    pub fn update(&mut self, trial: &Trial) -> Option<MonitorTransition> {
        if trial.correct {
            self.correct_streak += 1;
            if self.level != InterventionLevel::Normal
                && self.correct_streak >= self.config.recovery_streak
            {
                let from = self.level;
                self.level = InterventionLevel::Normal;
                info!(
                    trial = trial.trial_number,
                    from = ?from,
                    "Intervention resolved"
                );
                return Some(MonitorTransition::Resolved {
                    from,
                    trial_number: trial.trial_number,
                });
            }
            return None;
        }

        self.correct_streak = 0;
        let error_streak = trial.consecutive_errors.min(trial.trial_in_block);

        let next = match self.level {
            InterventionLevel::Normal if error_streak >= self.config.guided_threshold => {
                self.guided_mode_triggered = true;
                InterventionLevel::GuidedMode
            }
            InterventionLevel::GuidedMode if error_streak >= self.config.training_threshold => {
                self.rule_training_triggered = true;
                InterventionLevel::RuleTraining
            }
            _ => return None,
        };

        let from = self.level;
        self.level = next;
        self.block_peak = self.block_peak.max(next);
        warn!(
            trial = trial.trial_number,
            block = trial.rule_block_number,
            error_streak,
            to = ?next,
            "Intervention escalated"
        );
        Some(MonitorTransition::Escalated {
            from,
            to: next,
            trial_number: trial.trial_number,
            error_streak,
        })
    }

    /// Enter a new block, given the running error streak at the boundary.
    pub fn start_block(&mut self, block: u32, consecutive_errors: u32) -> Option<MonitorTransition> {
        let transition = match self.level {
            InterventionLevel::Normal => None,
            level if consecutive_errors >= self.config.guided_threshold => {
                debug!(block, level = ?level, "Intervention carried into new block");
                Some(MonitorTransition::CarriedOver { level, block })
            }
            from => {
                self.level = InterventionLevel::Normal;
                debug!(block, from = ?from, "Intervention reset at block boundary");
                Some(MonitorTransition::Reset { from, block })
            }
        };
        self.block_peak = self.level;
        transition
    }
}
