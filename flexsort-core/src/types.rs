//! Core data model: rules, trials, and the session scorecard.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stimulus::Stimulus;

/// Unique identifier for an assessment session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new session ID with a UUIDv7 (time-ordered).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hidden sorting criterion for a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Color,
    Shape,
    Number,
}

impl Rule {
    /// Every rule, in default presentation order.
    pub const ALL: [Rule; 3] = [Rule::Color, Rule::Shape, Rule::Number];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Shape => "shape",
            Self::Number => "number",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a trial was framed when presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialType {
    /// Scored trial.
    Core,
    /// Grace trial right after a rule switch; never perseverative.
    Buffer,
    /// Presented while guided mode was active.
    Guided,
    /// Presented while rule training was active.
    Extended,
    /// Walkthrough trial produced by the presentation layer.
    Demo,
    /// Warm-up trial produced by the presentation layer.
    Practice,
}

impl TrialType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Buffer => "buffer",
            Self::Guided => "guided",
            Self::Extended => "extended",
            Self::Demo => "demo",
            Self::Practice => "practice",
        }
    }
}

/// Support level raised by the adaptive trigger monitor.
///
/// Ordered by severity so escalation can be compared directly.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum InterventionLevel {
    #[default]
    Normal,
    GuidedMode,
    RuleTraining,
}

impl InterventionLevel {
    /// Trial framing for a trial presented at this level outside the grace window.
    #[must_use]
    pub fn trial_type(&self) -> TrialType {
        match self {
            Self::Normal => TrialType::Core,
            Self::GuidedMode => TrialType::Guided,
            Self::RuleTraining => TrialType::Extended,
        }
    }
}

/// One labeled subject response. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub trial_number: u32,
    pub rule: Rule,
    pub stimulus: Stimulus,
    /// Index of the reference card the subject chose.
    pub user_choice: u8,
    pub correct: bool,
    /// Seconds.
    pub response_time: f64,
    pub trial_type: TrialType,
    pub rule_switch: bool,
    pub perseverative: bool,
    pub consecutive_errors: u32,
    pub trial_in_block: u32,
    pub rule_block_number: u32,
    /// Blocks 2 and later only.
    pub adaptation_latency: Option<u32>,
    /// Block 1 only.
    pub initial_rule_discovery_latency: Option<u32>,
    pub timestamp: DateTime<Utc>,
}

impl Trial {
    /// Latency recorded on this trial, whichever block it belongs to.
    #[must_use]
    pub fn latency(&self) -> Option<u32> {
        self.adaptation_latency
            .or(self.initial_rule_discovery_latency)
    }
}

/// Per-block breakdown of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub rule_block_number: u32,
    pub rule: Rule,
    /// Fraction of the block's trials answered correctly (0.0 - 1.0).
    pub accuracy: f64,
    /// Mean response time over every trial in the block, seconds.
    pub avg_response_time: f64,
    /// Trials elapsed before sustained correct responding; block size if never.
    pub latency: u32,
    /// Whether sustained correct responding was reached inside the block.
    pub adapted: bool,
    pub perseverative_errors: u32,
    /// Highest support level reached while the block was active.
    pub peak_intervention: InterventionLevel,
}

/// Session scorecard, folded once from the completed trial log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentData {
    pub session_id: SessionId,
    pub trials: Vec<Trial>,
    /// Composite 0 - 100.
    pub cognitive_flexibility_score: u32,
    pub shifts_achieved: u32,
    pub perseverative_errors: u32,
    /// Mean post-switch latency in trials.
    pub adaptation_latency: f64,
    /// Mean response time over core trials, seconds.
    pub avg_response_time: f64,
    /// Fraction of all trials answered correctly (0.0 - 1.0).
    pub accuracy: f64,
    pub guided_mode_triggered: bool,
    pub rule_training_triggered: bool,
    pub blocks: Vec<BlockSummary>,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Rule::Number).unwrap(), "\"number\"");
        let parsed: Rule = serde_json::from_str("\"shape\"").unwrap();
        assert_eq!(parsed, Rule::Shape);
    }

    #[test]
    fn test_trial_type_serializes_snake_case() {
        for ty in [
            TrialType::Core,
            TrialType::Buffer,
            TrialType::Guided,
            TrialType::Extended,
            TrialType::Demo,
            TrialType::Practice,
        ] {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty.as_str()));
        }
    }

    #[test]
    fn test_intervention_levels_are_ordered_by_severity() {
        assert!(InterventionLevel::Normal < InterventionLevel::GuidedMode);
        assert!(InterventionLevel::GuidedMode < InterventionLevel::RuleTraining);
        assert_eq!(
            InterventionLevel::RuleTraining.trial_type(),
            TrialType::Extended
        );
    }

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
