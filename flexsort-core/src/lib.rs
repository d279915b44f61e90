//! Flex Sort assessment engine.
//!
//! An adaptive rule-switching task: the subject sorts stimulus cards by a
//! hidden rule (color, shape or number) that changes between blocks.
//!
//! # Architecture
//!
//! A [`FlexSortSession`] feeds each response through a fixed pipeline:
//!
//! - **Scheduler** ([`RuleBlockScheduler`]) owns the rule sequence and the
//!   position of the next trial
//! - **Classifier** ([`TrialClassifier`]) labels the response as an
//!   immutable [`Trial`]
//! - **Monitor** ([`AdaptiveTriggerMonitor`]) escalates support after
//!   error streaks
//! - **Aggregator** ([`MetricsAggregator`]) folds the completed log into
//!   an [`AssessmentData`] scorecard
//!
//! Scorecards are labeled with [`Interpretation`] bands and filtered for
//! presentation by [`ReportTier`].

mod classifier;
mod config;
mod error;
mod interpret;
mod metrics;
mod monitor;
mod scheduler;
mod session;
mod stimulus;
mod tier;
mod types;

// Configuration
pub use config::{
    DEFAULT_BLOCK_SIZE, DEFAULT_BLOCKS, DEFAULT_BUFFER_TRIALS, DEFAULT_GUIDED_THRESHOLD,
    DEFAULT_RECOVERY_STREAK, DEFAULT_TRAINING_THRESHOLD, FlexSortConfig, MonitorConfig,
    ScoringConfig, SessionConfig,
};

// Errors
pub use error::{FlexSortError, Result};

// Engine components
pub use classifier::{RawResponse, RunningState, TrialClassifier, latency_to_adapt};
pub use metrics::{MetricsAggregator, flexibility_score, mean_core_response_time};
pub use monitor::{AdaptiveTriggerMonitor, MonitorTransition};
pub use scheduler::{BlockPosition, RuleBlockScheduler, RuleContext, SchedulerStep};
pub use session::FlexSortSession;

// Stimuli
pub use stimulus::{Color, REFERENCE_CARDS, Shape, Stimulus, StimulusDeck};

// Data model
pub use types::{
    AssessmentData, BlockSummary, InterventionLevel, Rule, SessionId, Trial, TrialType,
};

// Reporting
pub use interpret::{AdaptationBand, ErrorControlBand, Interpretation, ScoreBand, SpeedBand};
pub use tier::{ReportFeature, ReportTier, TierCapabilities};
