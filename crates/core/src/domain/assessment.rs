use crate::domain::observation::RiskLevel;
use serde::Serialize;
use std::fmt;

/// Output of the risk-assessment stage: four scored components, the weighted
/// composite, and the deterministic narrative. Immutable once produced.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessmentRecord {
    pub overall_risk_level: RiskLevel,
    pub overall_risk_score: f64,
    pub urgency: Urgency,
    pub concentration: RiskComponent<ConcentrationRiskLevel>,
    pub dependency: RiskComponent<DependencyLevel>,
    pub ntm_impact: RiskComponent<NtmImpactLevel>,
    pub trend: RiskComponent<TrendRiskLevel>,
    pub vulnerabilities: Vec<String>,
    pub key_drivers: Vec<String>,
    pub disruption_likelihood: Disruption,
    pub disruption_impact: Disruption,
    pub narrative: String,
}

/// One scored sub-assessment. The level type differs per component so each
/// ladder stays exhaustively matched.
#[derive(Debug, Clone, Serialize)]
pub struct RiskComponent<L> {
    pub score: f64,
    pub level: L,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConcentrationRiskLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyLevel {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NtmImpactLevel {
    High,
    Medium,
    Low,
    Minimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendRiskLevel {
    Worsening,
    Concern,
    Improving,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    Urgent,
    Monitor,
    Stable,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Urgency::Urgent => "URGENT",
            Urgency::Monitor => "MONITOR",
            Urgency::Stable => "STABLE",
        };
        f.write_str(s)
    }
}

/// Disruption likelihood/impact on a 1-10 scale with a display label. The two
/// are bucketed from different inputs and are not derived from each other.
#[derive(Debug, Clone, Serialize)]
pub struct Disruption {
    pub score: u8,
    pub label: String,
}
