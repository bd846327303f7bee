mod concentration;
mod dependency;
mod growth;
mod intensity;
mod rca;
mod score;
mod shares;
mod trend;

use crate::domain::observation::{
    EnrichedObservation, RcaAdvantage, TradeObservation, TrendDirection,
};

/// Immutable, caller-owned handle over the fully enriched panel. Built once;
/// every query borrows it, none mutate it.
#[derive(Debug, Clone)]
pub struct EnrichedPanel {
    rows: Vec<EnrichedObservation>,
}

impl EnrichedPanel {
    /// Rows sorted by `(hs_code, quarter)`.
    pub fn rows(&self) -> &[EnrichedObservation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Attaches every derived indicator to the raw panel. Row count is preserved;
/// rows are sorted by `(hs_code, quarter)` and each family is computed by its
/// own pass, in dependency order (shares feed concentration, concentration
/// feeds scores, and so on).
pub fn enrich(observations: Vec<TradeObservation>) -> EnrichedPanel {
    let mut rows: Vec<EnrichedObservation> = observations.into_iter().map(seed).collect();
    rows.sort_by(|a, b| {
        a.obs
            .hs_code
            .cmp(&b.obs.hs_code)
            .then(a.obs.date.cmp(&b.obs.date))
    });

    shares::apply(&mut rows);
    concentration::apply(&mut rows);
    intensity::apply(&mut rows);
    growth::apply(&mut rows);
    dependency::apply(&mut rows);
    rca::apply(&mut rows);
    score::apply(&mut rows);
    trend::apply(&mut rows);

    tracing::debug!(rows = rows.len(), "panel enriched");
    EnrichedPanel { rows }
}

fn seed(obs: TradeObservation) -> EnrichedObservation {
    let quarter_num = obs.date.sort_key();
    let year = obs.date.year;
    EnrichedObservation {
        obs,
        quarter_num,
        year,
        china_share_us: None,
        india_share_us: None,
        other_share_us: None,
        us_share_china_exports: None,
        us_share_india_exports: None,
        hhi_us_imports: None,
        concentration_level: None,
        diversification_score: None,
        trade_intensity_china: None,
        trade_intensity_india: None,
        us_import_china_growth: None,
        us_import_india_growth: None,
        us_import_world_growth: None,
        china_export_world_growth: None,
        india_export_world_growth: None,
        china_dependency_risk: None,
        china_india_ratio: 0.0,
        china_rca: 0.0,
        india_rca: 0.0,
        rca_advantage: RcaAdvantage::Neutral,
        geopolitical_risk_score: None,
        risk_level: None,
        india_opportunity_score: None,
        china_share_ma4: None,
        india_share_ma4: None,
        china_trend: TrendDirection::Stable,
        india_trend: TrendDirection::Stable,
        china_momentum: None,
        india_momentum: None,
    }
}

/// Round-half-to-even at `dp` decimal places, matching the precision contract
/// of the output columns.
pub(crate) fn round_dp(value: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (value * factor).round_ties_even() / factor
}

#[cfg(test)]
pub(crate) mod testutil {
    use crate::domain::observation::{NtmSeverity, TradeObservation};
    use crate::domain::quarter::Quarter;

    pub fn observation(hs_code: &str, date: &str, flows: [f64; 5]) -> TradeObservation {
        let [china, india, world, china_exp, india_exp] = flows;
        TradeObservation {
            date: date.parse::<Quarter>().unwrap(),
            hs_code: hs_code.to_string(),
            product_name: format!("Product {hs_code}"),
            us_import_china: china,
            us_import_india: india,
            us_import_world: world,
            china_export_world: china_exp,
            india_export_world: india_exp,
            ntm_count: 0,
            ntm_severity: NtmSeverity::None,
            has_sps: false,
            has_tbt: false,
            has_export_restriction: false,
            technical_measure_count: 0,
            non_technical_count: 0,
            ntm_codes: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testutil::observation;

    fn sample_panel() -> Vec<TradeObservation> {
        vec![
            observation("8517", "2024-Q1", [500.0, 100.0, 1000.0, 5000.0, 800.0]),
            observation("8517", "2024-Q2", [550.0, 120.0, 1100.0, 5200.0, 850.0]),
            observation("8471", "2024-Q1", [300.0, 50.0, 900.0, 4000.0, 600.0]),
            observation("8471", "2024-Q2", [280.0, 70.0, 950.0, 4100.0, 700.0]),
        ]
    }

    #[test]
    fn preserves_row_count_and_sorts() {
        let panel = enrich(sample_panel());
        assert_eq!(panel.len(), 4);
        let keys: Vec<_> = panel
            .rows()
            .iter()
            .map(|r| (r.obs.hs_code.clone(), r.obs.date))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn enrichment_is_idempotent() {
        let a = enrich(sample_panel());
        let b = enrich(sample_panel());
        for (x, y) in a.rows().iter().zip(b.rows()) {
            assert_eq!(
                serde_json::to_string(x).unwrap(),
                serde_json::to_string(y).unwrap()
            );
        }
    }

    #[test]
    fn zero_world_row_does_not_poison_the_rest() {
        let mut raw = sample_panel();
        raw.push(observation("9999", "2024-Q1", [10.0, 5.0, 0.0, 100.0, 50.0]));
        let panel = enrich(raw);
        assert_eq!(panel.len(), 5);

        let bad = panel
            .rows()
            .iter()
            .find(|r| r.obs.hs_code == "9999")
            .unwrap();
        assert!(bad.china_share_us.is_none());
        assert!(bad.india_share_us.is_none());
        assert!(bad.geopolitical_risk_score.is_none());

        let good = panel
            .rows()
            .iter()
            .find(|r| r.obs.hs_code == "8517")
            .unwrap();
        assert!(good.china_share_us.is_some());
        assert!(good.geopolitical_risk_score.is_some());
    }

    #[test]
    fn rounds_ties_to_even() {
        assert_eq!(round_dp(0.125, 2), 0.12);
        assert_eq!(round_dp(0.135, 2), 0.14);
        assert_eq!(round_dp(2.5, 0), 2.0);
    }
}
