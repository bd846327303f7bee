use super::round_dp;
use crate::domain::observation::{ConcentrationLevel, EnrichedObservation};

/// HHI pass: sum of squared fractional shares over the China/India/residual
/// split, plus the threshold classification.
pub(super) fn apply(rows: &mut [EnrichedObservation]) {
    for row in rows {
        let (Some(china), Some(india), Some(other)) =
            (row.china_share_us, row.india_share_us, row.other_share_us)
        else {
            continue;
        };

        let hhi = (china / 100.0).powi(2) + (india / 100.0).powi(2) + (other / 100.0).powi(2);
        let hhi = round_dp(hhi, 4);
        row.hhi_us_imports = Some(hhi);
        row.concentration_level = Some(ConcentrationLevel::from_hhi(hhi));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{seed, shares, testutil::observation};

    #[test]
    fn hhi_stays_in_unit_interval() {
        let cases = [
            [1000.0, 0.0, 1000.0, 1.0, 1.0],
            [500.0, 250.0, 1000.0, 1.0, 1.0],
            [10.0, 10.0, 1000.0, 1.0, 1.0],
        ];
        for flows in cases {
            let mut rows = vec![seed(observation("x", "2024-Q1", flows))];
            shares::apply(&mut rows);
            apply(&mut rows);
            let hhi = rows[0].hhi_us_imports.unwrap();
            assert!((0.0..=1.0).contains(&hhi), "hhi out of range: {hhi}");
        }
    }

    #[test]
    fn single_supplier_market_is_maximally_concentrated() {
        let mut rows = vec![seed(observation(
            "x",
            "2024-Q1",
            [1000.0, 0.0, 1000.0, 1.0, 1.0],
        ))];
        shares::apply(&mut rows);
        apply(&mut rows);
        assert_eq!(rows[0].hhi_us_imports, Some(1.0));
        assert_eq!(rows[0].concentration_level, Some(ConcentrationLevel::High));
    }

    #[test]
    fn undefined_shares_yield_no_hhi() {
        let mut rows = vec![seed(observation(
            "x",
            "2024-Q1",
            [10.0, 5.0, 0.0, 1.0, 1.0],
        ))];
        shares::apply(&mut rows);
        apply(&mut rows);
        assert!(rows[0].hhi_us_imports.is_none());
        assert!(rows[0].concentration_level.is_none());
    }
}
