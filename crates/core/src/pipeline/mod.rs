pub mod risk;
pub mod snapshot;
pub mod strategy;

pub use risk::assess;
pub use snapshot::{assemble, MissingEntity};
pub use strategy::recommend;

use crate::domain::assessment::RiskAssessmentRecord;
use crate::domain::context::ContextRecord;
use crate::domain::observation::{NtmSeverity, RiskLevel};
use crate::domain::quarter::Quarter;
use crate::domain::recommendation::RecommendationRecord;
use crate::indicators::EnrichedPanel;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

/// Full three-stage result for one product query: the assembled context, its
/// risk assessment, and the diversification recommendation derived from both.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub hs_code: String,
    pub product_name: String,
    pub quarter: Quarter,
    pub context: ContextRecord,
    pub risk_assessment: RiskAssessmentRecord,
    pub recommendation: RecommendationRecord,
    pub generated_at: DateTime<Utc>,
}

/// Runs the stages in order. Only the context stage can fail (unknown product
/// or quarter); assessment and recommendation are total functions over it.
pub fn analyze(
    panel: &EnrichedPanel,
    hs_code: &str,
    quarter: Option<&Quarter>,
) -> anyhow::Result<Analysis> {
    let context = assemble(panel, hs_code, quarter)?;
    let risk_assessment = assess(&context);
    let recommendation = recommend(&context, &risk_assessment);

    tracing::info!(
        hs_code,
        quarter = %context.quarter,
        risk_score = risk_assessment.overall_risk_score,
        risk_level = %risk_assessment.overall_risk_level,
        strategies = recommendation.strategies.len(),
        "analysis complete"
    );

    Ok(Analysis {
        hs_code: context.hs_code.clone(),
        product_name: context.product_name.clone(),
        quarter: context.quarter,
        context,
        risk_assessment,
        recommendation,
        generated_at: Utc::now(),
    })
}

/// One product's latest-quarter line in the portfolio view.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioRow {
    pub hs_code: String,
    pub product_name: String,
    pub quarter: Quarter,
    pub china_share: Option<f64>,
    pub india_share: Option<f64>,
    pub risk_score: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub ntm_count: u32,
    pub ntm_severity: NtmSeverity,
    pub opportunity_score: Option<f64>,
}

/// Latest quarter per product, ranked by risk score descending. Undefined
/// scores sort last; ties keep panel (HS code) order.
pub fn rank_portfolio(panel: &EnrichedPanel) -> Vec<PortfolioRow> {
    let mut rows: Vec<PortfolioRow> = Vec::new();

    // Panel rows are sorted by (hs_code, quarter); the last row of each
    // product group is its latest quarter.
    let all = panel.rows();
    for (i, row) in all.iter().enumerate() {
        let is_last_of_product = all
            .get(i + 1)
            .map_or(true, |next| next.obs.hs_code != row.obs.hs_code);
        if !is_last_of_product {
            continue;
        }
        rows.push(PortfolioRow {
            hs_code: row.obs.hs_code.clone(),
            product_name: row.obs.product_name.clone(),
            quarter: row.obs.date,
            china_share: row.china_share_us,
            india_share: row.india_share_us,
            risk_score: row.geopolitical_risk_score,
            risk_level: row.risk_level,
            ntm_count: row.obs.ntm_count,
            ntm_severity: row.obs.ntm_severity,
            opportunity_score: row.india_opportunity_score,
        });
    }

    rows.sort_by(|a, b| {
        let a_score = a.risk_score.unwrap_or(f64::NEG_INFINITY);
        let b_score = b.risk_score.unwrap_or(f64::NEG_INFINITY);
        b_score
            .partial_cmp(&a_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.hs_code.cmp(&b.hs_code))
    });

    rows
}

#[cfg(test)]
pub(crate) mod testutil {
    use crate::domain::context::{
        ContextRecord, MarketMetrics, NtmProfile, TradeIndicators, TradeValues, TrendMetrics,
    };
    use crate::domain::observation::{
        ConcentrationLevel, NtmSeverity, RcaAdvantage, RiskLevel, TrendDirection,
    };

    /// Quiet-market baseline: low shares, diffuse concentration, no NTMs,
    /// stable trends. Tests override individual fields to probe one ladder
    /// or rule at a time.
    pub(crate) fn context() -> ContextRecord {
        ContextRecord {
            hs_code: "8517".to_string(),
            product_name: "Telephone sets and smartphones".to_string(),
            quarter: "2024-Q3".parse().unwrap(),
            metrics: MarketMetrics {
                china_share: Some(20.0),
                india_share: Some(8.0),
                other_share: Some(72.0),
                china_dependency_risk: Some(20.0),
                geopolitical_risk_score: Some(25.0),
                risk_level: Some(RiskLevel::Low),
                hhi: Some(0.1),
                concentration_level: Some(ConcentrationLevel::Low),
                diversification_score: Some(0.9),
            },
            indicators: TradeIndicators {
                china_rca: 1.0,
                india_rca: 0.5,
                rca_advantage: RcaAdvantage::China,
                trade_intensity_china: Some(1.0),
                trade_intensity_india: Some(0.5),
                india_opportunity_score: Some(30.0),
            },
            trends: TrendMetrics {
                china_trend: TrendDirection::Stable,
                india_trend: TrendDirection::Stable,
                china_momentum: 0.0,
                india_momentum: 0.0,
                china_share_ma4: Some(20.0),
                india_share_ma4: Some(8.0),
            },
            ntm: NtmProfile {
                ntm_count: 0,
                ntm_severity: NtmSeverity::None,
                has_sps: false,
                has_tbt: false,
                has_export_restriction: false,
                technical_measures: 0,
                non_technical_measures: 0,
                ntm_codes: "None".to_string(),
            },
            trade_values: TradeValues {
                us_import_china: 200,
                us_import_india: 80,
                us_import_world: 1000,
            },
            history: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{enrich, testutil::observation};

    fn panel() -> EnrichedPanel {
        enrich(vec![
            // Heavy China concentration.
            observation("8517", "2024-Q2", [800.0, 50.0, 1000.0, 5000.0, 400.0]),
            observation("8517", "2024-Q3", [820.0, 55.0, 1000.0, 5100.0, 420.0]),
            // Balanced product.
            observation("6203", "2024-Q2", [300.0, 250.0, 1000.0, 2000.0, 1800.0]),
            observation("6203", "2024-Q3", [310.0, 260.0, 1000.0, 2050.0, 1850.0]),
            // India-dominant product.
            observation("1006", "2024-Q3", [50.0, 600.0, 1000.0, 300.0, 4000.0]),
        ])
    }

    #[test]
    fn analyze_runs_all_three_stages() {
        let analysis = analyze(&panel(), "8517", None).unwrap();
        assert_eq!(analysis.hs_code, "8517");
        assert_eq!(analysis.quarter.to_string(), "2024-Q3");
        assert!(analysis.context.metrics.china_share.unwrap() > 70.0);
        assert!(!analysis.risk_assessment.narrative.is_empty());
        assert!(!analysis.recommendation.roadmap.phases.is_empty());
    }

    #[test]
    fn analyze_propagates_missing_entity() {
        let err = analyze(&panel(), "9999", None).unwrap_err();
        assert!(err.downcast_ref::<MissingEntity>().is_some());
    }

    #[test]
    fn portfolio_takes_latest_quarter_per_product() {
        let rows = rank_portfolio(&panel());
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.quarter.to_string() == "2024-Q3"));
    }

    #[test]
    fn portfolio_is_ranked_by_risk_descending() {
        let rows = rank_portfolio(&panel());
        assert_eq!(rows[0].hs_code, "8517");
        let scores: Vec<f64> = rows.iter().map(|r| r.risk_score.unwrap()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }
}
