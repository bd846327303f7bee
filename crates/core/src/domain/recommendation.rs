use crate::domain::observation::RiskLevel;
use serde::Serialize;
use std::fmt;

/// Output of the diversification-strategy stage. Strategy order is fixed by
/// the rule table (India expansion, then multi-country, then nearshoring) and
/// is never re-sorted by computed magnitude.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationRecord {
    pub primary_recommendation: Option<Strategy>,
    pub strategies: Vec<Strategy>,
    pub india_opportunity: IndiaOpportunity,
    pub other_opportunities: Vec<RegionalOpportunity>,
    pub expected_outcomes: Option<ExpectedOutcomes>,
    pub roadmap: Roadmap,
    pub timeline: String,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Strategy {
    pub priority: u8,
    pub name: String,
    pub target: String,
    pub action: String,
    pub timeline: String,
    pub feasibility: Feasibility,
    pub expected_impact: String,
    pub implementation_steps: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum Feasibility {
    High,
    Medium,
    MediumLow,
    Low,
}

impl fmt::Display for Feasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Feasibility::High => "HIGH",
            Feasibility::Medium => "MEDIUM",
            Feasibility::MediumLow => "MEDIUM-LOW",
            Feasibility::Low => "LOW",
        };
        f.write_str(s)
    }
}

/// India-as-alternative-supplier analysis behind the primary strategy.
#[derive(Debug, Clone, Serialize)]
pub struct IndiaOpportunity {
    pub feasibility: Feasibility,
    pub priority: u8,
    pub current_share: f64,
    pub target_share: f64,
    pub increase: f64,
    pub india_rca: f64,
    pub opportunity_score: f64,
    pub rationale: String,
    pub barriers: Vec<String>,
    pub advantages: Vec<String>,
}

/// Entry of the static regional-opportunity rule table. `current_share` is
/// only known for the residual-share region; the others sit inside "other".
#[derive(Debug, Clone, Serialize)]
pub struct RegionalOpportunity {
    pub region: String,
    pub potential: OpportunityPotential,
    pub current_share: Option<f64>,
    pub rationale: String,
    pub timeline: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum OpportunityPotential {
    MediumHigh,
    Medium,
    LowMedium,
}

impl fmt::Display for OpportunityPotential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OpportunityPotential::MediumHigh => "MEDIUM-HIGH",
            OpportunityPotential::Medium => "MEDIUM",
            OpportunityPotential::LowMedium => "LOW-MEDIUM",
        };
        f.write_str(s)
    }
}

/// Projected effect of executing the primary strategy. The dependency and
/// concentration deltas are fixed heuristics, deliberately not re-derived
/// from the indicator formulas.
#[derive(Debug, Clone, Serialize)]
pub struct ExpectedOutcomes {
    pub risk_reduction: RiskShift,
    pub china_dependency: DependencyShift,
    pub market_concentration: ConcentrationShift,
    pub cost_impact: CostImpact,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskShift {
    pub from: Option<RiskLevel>,
    pub to: RiskLevel,
    pub timeline: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DependencyShift {
    pub current: f64,
    pub target: f64,
    pub reduction: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConcentrationShift {
    pub current_hhi: f64,
    pub target_hhi: f64,
    /// Percent improvement; `None` when the current HHI is zero.
    pub improvement: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CostImpact {
    pub initial: String,
    pub long_term: String,
    pub roi_period: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Roadmap {
    pub urgency: String,
    pub phases: Vec<RoadmapPhase>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoadmapPhase {
    pub phase: String,
    pub actions: Vec<String>,
}
