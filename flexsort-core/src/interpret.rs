//! Qualitative bands for a finished scorecard.
//!
//! Downstream reports label scores rather than recompute them; these bands
//! are the single source of those labels.

use serde::{Deserialize, Serialize};

use crate::types::AssessmentData;

/// Label for the composite cognitive flexibility score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    NeedsImprovement,
    BelowAverage,
    Average,
    Good,
    VeryGood,
    Excellent,
}

impl ScoreBand {
    #[must_use]
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => Self::Excellent,
            80..=89 => Self::VeryGood,
            70..=79 => Self::Good,
            60..=69 => Self::Average,
            40..=59 => Self::BelowAverage,
            _ => Self::NeedsImprovement,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::VeryGood => "Very Good",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::BelowAverage => "Below Average",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }
}

/// How readily the subject re-adapted across shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptationBand {
    Excellent,
    Good,
    Developing,
}

impl AdaptationBand {
    #[must_use]
    pub fn from_shifts(shifts_achieved: u32) -> Self {
        match shifts_achieved {
            4.. => Self::Excellent,
            3 => Self::Good,
            _ => Self::Developing,
        }
    }
}

/// Inhibitory control implied by the perseverative error count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorControlBand {
    Strong,
    Moderate,
    Significant,
}

impl ErrorControlBand {
    #[must_use]
    pub fn from_errors(perseverative_errors: u32) -> Self {
        match perseverative_errors {
            0..=2 => Self::Strong,
            3..=5 => Self::Moderate,
            _ => Self::Significant,
        }
    }
}

/// Processing speed implied by mean core response time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedBand {
    Efficient,
    Typical,
    Deliberate,
}

impl SpeedBand {
    #[must_use]
    pub fn from_response_time(avg_response_time: f64) -> Self {
        if avg_response_time <= 2.0 {
            Self::Efficient
        } else if avg_response_time <= 3.0 {
            Self::Typical
        } else {
            Self::Deliberate
        }
    }
}

/// All bands for one scorecard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpretation {
    pub score: ScoreBand,
    pub adaptation: AdaptationBand,
    pub error_control: ErrorControlBand,
    pub speed: SpeedBand,
}

impl Interpretation {
    #[must_use]
    pub fn of(data: &AssessmentData) -> Self {
        Self {
            score: ScoreBand::from_score(data.cognitive_flexibility_score),
            adaptation: AdaptationBand::from_shifts(data.shifts_achieved),
            error_control: ErrorControlBand::from_errors(data.perseverative_errors),
            speed: SpeedBand::from_response_time(data.avg_response_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_band_boundaries() {
        assert_eq!(ScoreBand::from_score(100), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_score(90), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_score(89), ScoreBand::VeryGood);
        assert_eq!(ScoreBand::from_score(70), ScoreBand::Good);
        assert_eq!(ScoreBand::from_score(60), ScoreBand::Average);
        assert_eq!(ScoreBand::from_score(59), ScoreBand::BelowAverage);
        assert_eq!(ScoreBand::from_score(40), ScoreBand::BelowAverage);
        assert_eq!(ScoreBand::from_score(39), ScoreBand::NeedsImprovement);
        assert_eq!(ScoreBand::from_score(0).label(), "Needs Improvement");
    }

    #[test]
    fn test_score_bands_are_ordered() {
        assert!(ScoreBand::Excellent > ScoreBand::VeryGood);
        assert!(ScoreBand::BelowAverage > ScoreBand::NeedsImprovement);
    }

    #[test]
    fn test_descriptive_bands() {
        assert_eq!(AdaptationBand::from_shifts(5), AdaptationBand::Excellent);
        assert_eq!(AdaptationBand::from_shifts(3), AdaptationBand::Good);
        assert_eq!(AdaptationBand::from_shifts(2), AdaptationBand::Developing);
        assert_eq!(ErrorControlBand::from_errors(2), ErrorControlBand::Strong);
        assert_eq!(ErrorControlBand::from_errors(5), ErrorControlBand::Moderate);
        assert_eq!(ErrorControlBand::from_errors(6), ErrorControlBand::Significant);
        assert_eq!(SpeedBand::from_response_time(2.0), SpeedBand::Efficient);
        assert_eq!(SpeedBand::from_response_time(2.5), SpeedBand::Typical);
        assert_eq!(SpeedBand::from_response_time(3.5), SpeedBand::Deliberate);
    }
}
