//! Engine configuration types.
//!
//! Session shape, intervention thresholds, and scoring weights. Every policy
//! constant lives here so a scorecard can be reproduced from the trial log
//! and the configuration that produced it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FlexSortError, Result};
use crate::types::Rule;

/// Default number of rule blocks per session.
pub const DEFAULT_BLOCKS: u32 = 6;
/// Default number of trials per block.
pub const DEFAULT_BLOCK_SIZE: u32 = 6;
/// Default grace window after each rule switch.
pub const DEFAULT_BUFFER_TRIALS: u32 = 1;
/// Consecutive in-block errors that raise guided mode (T1).
pub const DEFAULT_GUIDED_THRESHOLD: u32 = 3;
/// Consecutive in-block errors that raise rule training (T2).
pub const DEFAULT_TRAINING_THRESHOLD: u32 = 5;
/// Consecutive correct responses that count as adapted (K).
pub const DEFAULT_RECOVERY_STREAK: u32 = 2;

/// Score weight of the shifts-achieved ratio.
pub const SHIFT_WEIGHT: f64 = 0.5;
/// Score weight of the error-control term.
pub const ERROR_WEIGHT: f64 = 0.3;
/// Score weight of the speed term.
pub const SPEED_WEIGHT: f64 = 0.2;
/// Error-control loss per perseverative error.
pub const PERSEVERATION_PENALTY: f64 = 0.15;
/// Mean response time (seconds) at or below which the speed term is 1.0.
pub const FAST_RESPONSE_SECS: f64 = 1.0;
/// Mean response time (seconds) at or above which the speed term bottoms out.
pub const SLOW_RESPONSE_SECS: f64 = 5.0;
/// Lowest value the speed term can take.
pub const SPEED_FLOOR: f64 = 0.0;

/// Upper bound on `blocks * block_size`.
pub const MAX_TOTAL_TRIALS: u32 = 10_000;

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Main engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlexSortConfig {
    /// Block layout and stimulus seed.
    pub session: SessionConfig,
    /// Intervention thresholds.
    pub monitor: MonitorConfig,
    /// Composite score weighting.
    pub scoring: ScoringConfig,
}

impl FlexSortConfig {
    /// Load and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: FlexSortConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject inconsistent settings.
    pub fn validate(&self) -> Result<()> {
        self.session.validate()?;
        self.monitor.validate(&self.session)?;
        self.scoring.validate()
    }
}

/// Block layout for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of rule blocks.
    pub blocks: u32,
    /// Trials per block.
    pub block_size: u32,
    /// Grace trials at the start of every post-switch block.
    pub buffer_trials: u32,
    /// Explicit rule per block; `color, shape, number` repeating when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_sequence: Option<Vec<Rule>>,
    /// Stimulus deck seed; drawn from entropy when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            blocks: DEFAULT_BLOCKS,
            block_size: DEFAULT_BLOCK_SIZE,
            buffer_trials: DEFAULT_BUFFER_TRIALS,
            rule_sequence: None,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Total trials in a complete session.
    #[must_use]
    pub fn total_trials(&self) -> u32 {
        self.blocks.saturating_mul(self.block_size)
    }

    /// Rule for every block, in order.
    #[must_use]
    pub fn rules(&self) -> Vec<Rule> {
        match &self.rule_sequence {
            Some(rules) => rules.clone(),
            None => (0..self.blocks as usize)
                .map(|i| Rule::ALL[i % Rule::ALL.len()])
                .collect(),
        }
    }

    /// Reject block layouts the scheduler cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.blocks < 2 {
            return Err(FlexSortError::InvalidConfig(format!(
                "blocks must be at least 2, got {}",
                self.blocks
            )));
        }
        if self.block_size == 0 {
            return Err(FlexSortError::InvalidConfig(
                "block_size must be greater than 0".to_string(),
            ));
        }
        match self.blocks.checked_mul(self.block_size) {
            Some(total) if total <= MAX_TOTAL_TRIALS => {}
            _ => {
                return Err(FlexSortError::InvalidConfig(format!(
                    "{} blocks of {} trials exceeds the limit of {} trials",
                    self.blocks, self.block_size, MAX_TOTAL_TRIALS
                )));
            }
        }
        if self.buffer_trials >= self.block_size {
            return Err(FlexSortError::InvalidConfig(format!(
                "buffer_trials ({}) must be smaller than block_size ({})",
                self.buffer_trials, self.block_size
            )));
        }
        if let Some(rules) = &self.rule_sequence {
            if rules.len() != self.blocks as usize {
                return Err(FlexSortError::InvalidConfig(format!(
                    "rule_sequence has {} rules for {} blocks",
                    rules.len(),
                    self.blocks
                )));
            }
            if let Some(pos) = rules.windows(2).position(|pair| pair[0] == pair[1]) {
                return Err(FlexSortError::InvalidConfig(format!(
                    "blocks {} and {} share rule '{}'",
                    pos + 1,
                    pos + 2,
                    rules[pos]
                )));
            }
        }
        Ok(())
    }
}

/// Thresholds for the adaptive trigger monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// In-block error streak that raises guided mode (T1).
    pub guided_threshold: u32,
    /// In-block error streak that raises rule training (T2).
    pub training_threshold: u32,
    /// Correct streak that resolves an intervention and marks adaptation (K).
    pub recovery_streak: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            guided_threshold: DEFAULT_GUIDED_THRESHOLD,
            training_threshold: DEFAULT_TRAINING_THRESHOLD,
            recovery_streak: DEFAULT_RECOVERY_STREAK,
        }
    }
}

impl MonitorConfig {
    pub(crate) fn validate(&self, session: &SessionConfig) -> Result<()> {
        if self.guided_threshold == 0 {
            return Err(FlexSortError::InvalidConfig(
                "guided_threshold must be greater than 0".to_string(),
            ));
        }
        if self.training_threshold <= self.guided_threshold {
            return Err(FlexSortError::InvalidConfig(format!(
                "training_threshold ({}) must exceed guided_threshold ({})",
                self.training_threshold, self.guided_threshold
            )));
        }
        if self.recovery_streak == 0 || self.recovery_streak > session.block_size {
            return Err(FlexSortError::InvalidConfig(format!(
                "recovery_streak must be between 1 and block_size ({}), got {}",
                session.block_size, self.recovery_streak
            )));
        }
        Ok(())
    }
}

/// Weighting of the composite cognitive flexibility score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub shift_weight: f64,
    pub error_weight: f64,
    pub speed_weight: f64,
    pub perseveration_penalty: f64,
    pub fast_response_secs: f64,
    pub slow_response_secs: f64,
    pub speed_floor: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            shift_weight: SHIFT_WEIGHT,
            error_weight: ERROR_WEIGHT,
            speed_weight: SPEED_WEIGHT,
            perseveration_penalty: PERSEVERATION_PENALTY,
            fast_response_secs: FAST_RESPONSE_SECS,
            slow_response_secs: SLOW_RESPONSE_SECS,
            speed_floor: SPEED_FLOOR,
        }
    }
}

impl ScoringConfig {
    fn validate(&self) -> Result<()> {
        let weights = [self.shift_weight, self.error_weight, self.speed_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(FlexSortError::InvalidConfig(
                "score weights must be finite and non-negative".to_string(),
            ));
        }
        let total: f64 = weights.iter().sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(FlexSortError::InvalidConfig(format!(
                "score weights must sum to 1.0, got {total}"
            )));
        }
        if !self.perseveration_penalty.is_finite() || self.perseveration_penalty < 0.0 {
            return Err(FlexSortError::InvalidConfig(
                "perseveration_penalty must be finite and non-negative".to_string(),
            ));
        }
        if !(self.fast_response_secs >= 0.0 && self.slow_response_secs > self.fast_response_secs)
            || !self.slow_response_secs.is_finite()
        {
            return Err(FlexSortError::InvalidConfig(format!(
                "response time bounds must satisfy 0 <= fast ({}) < slow ({})",
                self.fast_response_secs, self.slow_response_secs
            )));
        }
        if !(0.0..=1.0).contains(&self.speed_floor) {
            return Err(FlexSortError::InvalidConfig(format!(
                "speed_floor must be within 0.0..=1.0, got {}",
                self.speed_floor
            )));
        }
        Ok(())
    }
}
