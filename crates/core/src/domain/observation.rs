use crate::domain::quarter::Quarter;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One raw panel row: a single `(hs_code, quarter)` observation of US import
/// flows, partner export totals, and the product's non-tariff-measure profile.
/// Trade magnitudes are in thousands of USD.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeObservation {
    pub date: Quarter,
    pub hs_code: String,
    pub product_name: String,
    pub us_import_china: f64,
    pub us_import_india: f64,
    pub us_import_world: f64,
    pub china_export_world: f64,
    pub india_export_world: f64,
    pub ntm_count: u32,
    #[serde(deserialize_with = "de_severity")]
    pub ntm_severity: NtmSeverity,
    #[serde(deserialize_with = "de_flag")]
    pub has_sps: bool,
    #[serde(deserialize_with = "de_flag")]
    pub has_tbt: bool,
    #[serde(deserialize_with = "de_flag")]
    pub has_export_restriction: bool,
    pub technical_measure_count: u32,
    pub non_technical_count: u32,
    #[serde(default)]
    pub ntm_codes: String,
}

/// NTM severity classification as carried in the source data. Values other
/// than HIGH/MEDIUM/LOW are collapsed to `None` so a dirty cell never aborts
/// a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NtmSeverity {
    High,
    Medium,
    Low,
    None,
}

impl fmt::Display for NtmSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NtmSeverity::High => "HIGH",
            NtmSeverity::Medium => "MEDIUM",
            NtmSeverity::Low => "LOW",
            NtmSeverity::None => "NONE",
        };
        f.write_str(s)
    }
}

/// Supplier-concentration tier derived from HHI. Both thresholds are strict:
/// HHI exactly 0.25 is MODERATE, exactly 0.15 is LOW.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConcentrationLevel {
    High,
    Moderate,
    Low,
}

impl ConcentrationLevel {
    pub fn from_hhi(hhi: f64) -> Self {
        if hhi > 0.25 {
            ConcentrationLevel::High
        } else if hhi > 0.15 {
            ConcentrationLevel::Moderate
        } else {
            ConcentrationLevel::Low
        }
    }
}

impl fmt::Display for ConcentrationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConcentrationLevel::High => "HIGH",
            ConcentrationLevel::Moderate => "MODERATE",
            ConcentrationLevel::Low => "LOW",
        };
        f.write_str(s)
    }
}

/// Geopolitical risk tier. Lower bounds are inclusive: a score of exactly 70
/// is HIGH, exactly 40 is MEDIUM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            RiskLevel::High
        } else if score >= 40.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
        };
        f.write_str(s)
    }
}

/// Which partner holds the stronger revealed comparative advantage for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RcaAdvantage {
    China,
    India,
    Neutral,
}

impl fmt::Display for RcaAdvantage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RcaAdvantage::China => "CHINA",
            RcaAdvantage::India => "INDIA",
            RcaAdvantage::Neutral => "NEUTRAL",
        };
        f.write_str(s)
    }
}

/// Direction of a share series relative to its own 4-quarter moving average.
/// Equality (or an undefined share) reads as STABLE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendDirection::Increasing => "INCREASING",
            TrendDirection::Decreasing => "DECREASING",
            TrendDirection::Stable => "STABLE",
        };
        f.write_str(s)
    }
}

/// A panel row with every derived indicator attached. Built once by
/// `indicators::enrich`, then read-only for the life of the panel.
///
/// `Option` fields are `None` where the underlying ratio is undefined
/// (zero denominator) or where the product has no prior quarter.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedObservation {
    #[serde(flatten)]
    pub obs: TradeObservation,
    pub quarter_num: i32,
    pub year: i32,

    // Market shares (percent of US imports).
    pub china_share_us: Option<f64>,
    pub india_share_us: Option<f64>,
    pub other_share_us: Option<f64>,
    pub us_share_china_exports: Option<f64>,
    pub us_share_india_exports: Option<f64>,

    // Concentration.
    pub hhi_us_imports: Option<f64>,
    pub concentration_level: Option<ConcentrationLevel>,
    pub diversification_score: Option<f64>,

    // Trade intensity (panel-wide world proxy in the denominator).
    pub trade_intensity_china: Option<f64>,
    pub trade_intensity_india: Option<f64>,

    // Quarter-over-quarter growth, percent.
    pub us_import_china_growth: Option<f64>,
    pub us_import_india_growth: Option<f64>,
    pub us_import_world_growth: Option<f64>,
    pub china_export_world_growth: Option<f64>,
    pub india_export_world_growth: Option<f64>,

    // Dependency.
    pub china_dependency_risk: Option<f64>,
    pub china_india_ratio: f64,

    // Revealed comparative advantage (per-quarter totals).
    pub china_rca: f64,
    pub india_rca: f64,
    pub rca_advantage: RcaAdvantage,

    // Composite scores.
    pub geopolitical_risk_score: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub india_opportunity_score: Option<f64>,

    // Trend.
    pub china_share_ma4: Option<f64>,
    pub india_share_ma4: Option<f64>,
    pub china_trend: TrendDirection,
    pub india_trend: TrendDirection,
    pub china_momentum: Option<f64>,
    pub india_momentum: Option<f64>,
}

fn de_severity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NtmSeverity, D::Error> {
    let s = String::deserialize(deserializer)?;
    Ok(match s.trim().to_ascii_uppercase().as_str() {
        "HIGH" => NtmSeverity::High,
        "MEDIUM" => NtmSeverity::Medium,
        "LOW" => NtmSeverity::Low,
        _ => NtmSeverity::None,
    })
}

// CSV exports spell booleans several ways (True/False from pandas, 1/0 from
// spreadsheets), so parse leniently instead of relying on serde's bool.
fn de_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let s = String::deserialize(deserializer)?;
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid boolean flag: {other:?}"
        ))),
    }
}
