//! Report tier capability lookup.
//!
//! Which parts of a scorecard a report tier may show. Presentation layers
//! consult this table; scoring never does.

use serde::{Deserialize, Serialize};

use crate::error::FlexSortError;

/// Purchased report tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportTier {
    Basic,
    Standard,
    Premium,
}

impl ReportTier {
    pub const ALL: [ReportTier; 3] = [ReportTier::Basic, ReportTier::Standard, ReportTier::Premium];

    /// Get capabilities for this tier
    pub fn capabilities(&self) -> TierCapabilities {
        match self {
            Self::Basic => TierCapabilities {
                headline_scores: true,
                performance_metrics: false,
                adaptive_features: false,
                narrative_summary: false,
                block_charts: false,
                clinical_interpretation: false,
                raw_data_export: false,
            },
            Self::Standard => TierCapabilities {
                headline_scores: true,
                performance_metrics: true,
                adaptive_features: true,
                narrative_summary: true,
                block_charts: false,
                clinical_interpretation: false,
                raw_data_export: false,
            },
            Self::Premium => TierCapabilities {
                headline_scores: true,
                performance_metrics: true,
                adaptive_features: true,
                narrative_summary: true,
                block_charts: true,
                clinical_interpretation: true,
                raw_data_export: true,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Premium => "premium",
        }
    }
}

impl std::str::FromStr for ReportTier {
    type Err = FlexSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "standard" => Ok(Self::Standard),
            "premium" => Ok(Self::Premium),
            _ => Err(FlexSortError::UnknownTier(s.to_string())),
        }
    }
}

/// Feature flags unlocked by a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCapabilities {
    pub headline_scores: bool,
    pub performance_metrics: bool,
    pub adaptive_features: bool,
    pub narrative_summary: bool,
    pub block_charts: bool,
    pub clinical_interpretation: bool,
    pub raw_data_export: bool,
}

impl Default for TierCapabilities {
    fn default() -> Self {
        ReportTier::Basic.capabilities()
    }
}

impl TierCapabilities {
    /// Check if this capability set includes a feature
    pub fn allows(&self, feature: ReportFeature) -> bool {
        match feature {
            ReportFeature::HeadlineScores => self.headline_scores,
            ReportFeature::PerformanceMetrics => self.performance_metrics,
            ReportFeature::AdaptiveFeatures => self.adaptive_features,
            ReportFeature::NarrativeSummary => self.narrative_summary,
            ReportFeature::BlockCharts => self.block_charts,
            ReportFeature::ClinicalInterpretation => self.clinical_interpretation,
            ReportFeature::RawDataExport => self.raw_data_export,
        }
    }
}

/// Report sections gated by tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFeature {
    HeadlineScores,
    PerformanceMetrics,
    AdaptiveFeatures,
    NarrativeSummary,
    BlockCharts,
    ClinicalInterpretation,
    RawDataExport,
}

impl ReportFeature {
    pub const ALL: [ReportFeature; 7] = [
        ReportFeature::HeadlineScores,
        ReportFeature::PerformanceMetrics,
        ReportFeature::AdaptiveFeatures,
        ReportFeature::NarrativeSummary,
        ReportFeature::BlockCharts,
        ReportFeature::ClinicalInterpretation,
        ReportFeature::RawDataExport,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::HeadlineScores => "Headline scores",
            Self::PerformanceMetrics => "Performance metrics",
            Self::AdaptiveFeatures => "Adaptive features",
            Self::NarrativeSummary => "Narrative summary",
            Self::BlockCharts => "Block charts",
            Self::ClinicalInterpretation => "Clinical interpretation",
            Self::RawDataExport => "Raw data export",
        }
    }
}
