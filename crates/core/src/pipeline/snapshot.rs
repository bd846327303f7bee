use crate::domain::context::{
    ContextRecord, HistoryPoint, MarketMetrics, NtmProfile, TradeIndicators, TradeValues,
    TrendMetrics,
};
use crate::domain::observation::EnrichedObservation;
use crate::domain::quarter::Quarter;
use crate::indicators::{round_dp, EnrichedPanel};
use std::fmt;

/// The only hard failure in the query path: the product (or the requested
/// quarter for it) is not in the panel. Carried through `anyhow` and
/// recovered by callers via `downcast_ref`.
#[derive(Debug, Clone)]
pub struct MissingEntity {
    pub hs_code: String,
    pub quarter: Option<Quarter>,
}

impl fmt::Display for MissingEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quarter {
            Some(q) => write!(f, "no data for HS code {} in quarter {q}", self.hs_code),
            None => write!(f, "no data found for HS code {}", self.hs_code),
        }
    }
}

impl std::error::Error for MissingEntity {}

const TRAILING_QUARTERS: usize = 4;

/// Projects one `(product, quarter)` of the enriched panel into the
/// normalized context record the inference stages consume. With no quarter
/// given, the product's latest quarter is selected. The trailing history
/// covers at most the last four quarters up to AND including the selected
/// one — earlier quarters only, never later.
pub fn assemble(
    panel: &EnrichedPanel,
    hs_code: &str,
    quarter: Option<&Quarter>,
) -> anyhow::Result<ContextRecord> {
    let product: Vec<&EnrichedObservation> = panel
        .rows()
        .iter()
        .filter(|r| r.obs.hs_code == hs_code)
        .collect();

    if product.is_empty() {
        return Err(MissingEntity {
            hs_code: hs_code.to_string(),
            quarter: None,
        }
        .into());
    }

    // Rows are panel-sorted, so the last row holds the latest quarter.
    let selected = match quarter {
        Some(q) => *q,
        None => product[product.len() - 1].obs.date,
    };

    let Some(row) = product.iter().find(|r| r.obs.date == selected) else {
        return Err(MissingEntity {
            hs_code: hs_code.to_string(),
            quarter: Some(selected),
        }
        .into());
    };

    let window: Vec<&&EnrichedObservation> = product
        .iter()
        .filter(|r| r.obs.date <= selected)
        .collect();
    let skip = window.len().saturating_sub(TRAILING_QUARTERS);
    let history = window
        .into_iter()
        .skip(skip)
        .map(|r| HistoryPoint {
            quarter: r.obs.date,
            china_share: r.china_share_us,
            india_share: r.india_share_us,
            risk_score: r.geopolitical_risk_score,
        })
        .collect();

    Ok(project(row, history))
}

fn project(row: &EnrichedObservation, history: Vec<HistoryPoint>) -> ContextRecord {
    let o = &row.obs;
    ContextRecord {
        hs_code: o.hs_code.clone(),
        product_name: o.product_name.clone(),
        quarter: o.date,
        metrics: MarketMetrics {
            china_share: row.china_share_us,
            india_share: row.india_share_us,
            other_share: row.other_share_us,
            china_dependency_risk: row.china_dependency_risk,
            geopolitical_risk_score: row.geopolitical_risk_score,
            risk_level: row.risk_level,
            hhi: row.hhi_us_imports,
            concentration_level: row.concentration_level,
            diversification_score: row.diversification_score,
        },
        indicators: TradeIndicators {
            china_rca: round_dp(row.china_rca, 2),
            india_rca: round_dp(row.india_rca, 2),
            rca_advantage: row.rca_advantage,
            trade_intensity_china: row.trade_intensity_china.map(|v| round_dp(v, 2)),
            trade_intensity_india: row.trade_intensity_india.map(|v| round_dp(v, 2)),
            india_opportunity_score: row.india_opportunity_score,
        },
        trends: TrendMetrics {
            china_trend: row.china_trend,
            india_trend: row.india_trend,
            china_momentum: row.china_momentum.unwrap_or(0.0),
            india_momentum: row.india_momentum.unwrap_or(0.0),
            china_share_ma4: row.china_share_ma4,
            india_share_ma4: row.india_share_ma4,
        },
        ntm: NtmProfile {
            ntm_count: o.ntm_count,
            ntm_severity: o.ntm_severity,
            has_sps: o.has_sps,
            has_tbt: o.has_tbt,
            has_export_restriction: o.has_export_restriction,
            technical_measures: o.technical_measure_count,
            non_technical_measures: o.non_technical_count,
            ntm_codes: if o.ntm_codes.trim().is_empty() {
                "None".to_string()
            } else {
                o.ntm_codes.clone()
            },
        },
        trade_values: TradeValues {
            us_import_china: o.us_import_china as i64,
            us_import_india: o.us_import_india as i64,
            us_import_world: o.us_import_world as i64,
        },
        history,
    }
}
