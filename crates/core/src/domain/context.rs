use crate::domain::observation::{
    ConcentrationLevel, NtmSeverity, RcaAdvantage, RiskLevel, TrendDirection,
};
use crate::domain::quarter::Quarter;
use serde::Serialize;

/// Read-only snapshot of one product at one quarter, grouped into the metric
/// families the inference stages consume. Assembled once per query; never
/// mutated downstream.
#[derive(Debug, Clone, Serialize)]
pub struct ContextRecord {
    pub hs_code: String,
    pub product_name: String,
    pub quarter: Quarter,
    pub metrics: MarketMetrics,
    pub indicators: TradeIndicators,
    pub trends: TrendMetrics,
    pub ntm: NtmProfile,
    pub trade_values: TradeValues,
    pub history: Vec<HistoryPoint>,
}

/// Share and concentration picture for the snapshot quarter. `None` means the
/// underlying ratio was undefined for this row (zero world imports).
#[derive(Debug, Clone, Serialize)]
pub struct MarketMetrics {
    pub china_share: Option<f64>,
    pub india_share: Option<f64>,
    pub other_share: Option<f64>,
    pub china_dependency_risk: Option<f64>,
    pub geopolitical_risk_score: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub hhi: Option<f64>,
    pub concentration_level: Option<ConcentrationLevel>,
    pub diversification_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TradeIndicators {
    pub china_rca: f64,
    pub india_rca: f64,
    pub rca_advantage: RcaAdvantage,
    pub trade_intensity_china: Option<f64>,
    pub trade_intensity_india: Option<f64>,
    pub india_opportunity_score: Option<f64>,
}

/// Trend family. Momentum defaults to 0 at a series start so downstream
/// threshold checks stay total.
#[derive(Debug, Clone, Serialize)]
pub struct TrendMetrics {
    pub china_trend: TrendDirection,
    pub india_trend: TrendDirection,
    pub china_momentum: f64,
    pub india_momentum: f64,
    pub china_share_ma4: Option<f64>,
    pub india_share_ma4: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NtmProfile {
    pub ntm_count: u32,
    pub ntm_severity: NtmSeverity,
    pub has_sps: bool,
    pub has_tbt: bool,
    pub has_export_restriction: bool,
    pub technical_measures: u32,
    pub non_technical_measures: u32,
    pub ntm_codes: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TradeValues {
    pub us_import_china: i64,
    pub us_import_india: i64,
    pub us_import_world: i64,
}

/// One point of the trailing (at most 4-quarter) series behind the snapshot,
/// ending at the snapshot quarter.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryPoint {
    pub quarter: Quarter,
    pub china_share: Option<f64>,
    pub india_share: Option<f64>,
    pub risk_score: Option<f64>,
}
