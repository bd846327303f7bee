use super::round_dp;
use crate::domain::observation::{EnrichedObservation, RiskLevel};

/// Composite score pass. Both scores are weighted sums saturated into
/// [0, 100]; a missing input (undefined share or intensity) leaves the score
/// undefined rather than guessing.
///
/// Risk:        0.5·china_share + 0.3·(HHI·100) + 4·min(intensity_china, 5)
/// Opportunity: 0.4·(100 − india_share) + 10·min(india_rca, 5) + 0.4·china_share
pub(super) fn apply(rows: &mut [EnrichedObservation]) {
    for row in rows {
        if let (Some(china), Some(hhi), Some(intensity)) = (
            row.china_share_us,
            row.hhi_us_imports,
            row.trade_intensity_china,
        ) {
            let raw = china * 0.5 + hhi * 100.0 * 0.3 + intensity.min(5.0) * 4.0;
            let score = round_dp(raw.clamp(0.0, 100.0), 2);
            row.geopolitical_risk_score = Some(score);
            row.risk_level = Some(RiskLevel::from_score(score));
        }

        if let (Some(china), Some(india)) = (row.china_share_us, row.india_share_us) {
            let raw = (100.0 - india) * 0.4 + row.india_rca.min(5.0) * 10.0 + china * 0.4;
            row.india_opportunity_score = Some(round_dp(raw.clamp(0.0, 100.0), 2));
        }
    }
}
