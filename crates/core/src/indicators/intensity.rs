use super::round_dp;
use crate::domain::observation::EnrichedObservation;

/// Trade-intensity pass: bilateral import share relative to the partner's
/// global export capacity share.
///
/// The denominator's world-trade proxy is the `us_import_world` sum over the
/// ENTIRE panel — one scalar reused for every row, not a per-quarter total.
/// That is a deliberate simplification carried over from the source data
/// pipeline; the RCA pass uses per-quarter totals instead, and the two are
/// knowingly not dimensionally consistent with each other.
pub(super) fn apply(rows: &mut [EnrichedObservation]) {
    let world_trade_proxy: f64 = rows.iter().map(|r| r.obs.us_import_world).sum();
    if world_trade_proxy == 0.0 {
        return;
    }

    for row in rows {
        let o = &row.obs;
        if o.us_import_world == 0.0 {
            continue;
        }

        if o.china_export_world != 0.0 {
            let value = (o.us_import_china / o.us_import_world)
                / (o.china_export_world / world_trade_proxy);
            row.trade_intensity_china = Some(round_dp(value, 4));
        }
        if o.india_export_world != 0.0 {
            let value = (o.us_import_india / o.us_import_world)
                / (o.india_export_world / world_trade_proxy);
            row.trade_intensity_india = Some(round_dp(value, 4));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{seed, testutil::observation};

    #[test]
    fn proxy_is_panel_wide_not_per_quarter() {
        // Two quarters with different world totals. A per-quarter denominator
        // would give the same intensity for identical rows; the panel-wide
        // proxy must not.
        let mut rows = vec![
            seed(observation("x", "2024-Q1", [500.0, 0.0, 1000.0, 2000.0, 1.0])),
            seed(observation("x", "2024-Q2", [500.0, 0.0, 1000.0, 2000.0, 1.0])),
            seed(observation("y", "2024-Q1", [0.0, 0.0, 3000.0, 1.0, 1.0])),
        ];
        apply(&mut rows);

        // proxy = 1000 + 1000 + 3000 = 5000; (500/1000) / (2000/5000) = 1.25
        assert_eq!(rows[0].trade_intensity_china, Some(1.25));
        assert_eq!(rows[1].trade_intensity_china, Some(1.25));
    }

    #[test]
    fn zero_partner_exports_leave_intensity_undefined() {
        let mut rows = vec![seed(observation(
            "x",
            "2024-Q1",
            [500.0, 100.0, 1000.0, 0.0, 0.0],
        ))];
        apply(&mut rows);
        assert!(rows[0].trade_intensity_china.is_none());
        assert!(rows[0].trade_intensity_india.is_none());
    }
}
