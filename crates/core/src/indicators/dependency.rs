use super::round_dp;
use crate::domain::observation::EnrichedObservation;

/// Diversification/dependency pass. `china_dependency_risk` is the China
/// share carried under its own name for downstream consumers; the
/// China/India ratio adds 1 to the denominator so it is total.
pub(super) fn apply(rows: &mut [EnrichedObservation]) {
    for row in rows {
        row.diversification_score = row.hhi_us_imports.map(|hhi| round_dp(1.0 - hhi, 4));
        row.china_dependency_risk = row.china_share_us.map(|share| round_dp(share, 2));
        row.china_india_ratio =
            round_dp(row.obs.us_import_china / (row.obs.us_import_india + 1.0), 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{concentration, seed, shares, testutil::observation};

    #[test]
    fn diversification_complements_hhi() {
        let mut rows = vec![seed(observation(
            "x",
            "2024-Q1",
            [400.0, 300.0, 1000.0, 1.0, 1.0],
        ))];
        shares::apply(&mut rows);
        concentration::apply(&mut rows);
        apply(&mut rows);

        let hhi = rows[0].hhi_us_imports.unwrap();
        let div = rows[0].diversification_score.unwrap();
        assert!((hhi + div - 1.0).abs() < 1e-9);
        assert_eq!(rows[0].china_dependency_risk, rows[0].china_share_us);
    }

    #[test]
    fn ratio_survives_zero_india_imports() {
        let mut rows = vec![seed(observation(
            "x",
            "2024-Q1",
            [500.0, 0.0, 1000.0, 1.0, 1.0],
        ))];
        apply(&mut rows);
        assert_eq!(rows[0].china_india_ratio, 500.0);
    }
}
