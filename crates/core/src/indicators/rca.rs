use super::round_dp;
use crate::domain::observation::{EnrichedObservation, RcaAdvantage};
use crate::domain::quarter::Quarter;
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, Copy)]
struct QuarterTotals {
    china_exports: f64,
    india_exports: f64,
    world_imports: f64,
}

/// Revealed-comparative-advantage pass. Unlike the trade-intensity proxy,
/// RCA normalizes against the SAME quarter's cross-product totals: first
/// aggregate per-quarter sums into a lookup, then map each row against it.
/// Degenerate denominators (a zero quarter total, or zero world imports on
/// the row) yield 0 rather than an undefined ratio.
pub(super) fn apply(rows: &mut [EnrichedObservation]) {
    let mut totals: BTreeMap<Quarter, QuarterTotals> = BTreeMap::new();
    for row in rows.iter() {
        let entry = totals.entry(row.obs.date).or_default();
        entry.china_exports += row.obs.china_export_world;
        entry.india_exports += row.obs.india_export_world;
        entry.world_imports += row.obs.us_import_world;
    }

    for row in rows {
        let t = totals[&row.obs.date];
        row.china_rca = rca(
            row.obs.china_export_world,
            t.china_exports,
            row.obs.us_import_world,
            t.world_imports,
        );
        row.india_rca = rca(
            row.obs.india_export_world,
            t.india_exports,
            row.obs.us_import_world,
            t.world_imports,
        );

        row.rca_advantage = if row.china_rca > row.india_rca {
            RcaAdvantage::China
        } else if row.india_rca > row.china_rca {
            RcaAdvantage::India
        } else {
            RcaAdvantage::Neutral
        };
    }
}

fn rca(partner_exports: f64, partner_total: f64, world_imports: f64, world_total: f64) -> f64 {
    if partner_total <= 0.0 || world_total <= 0.0 || world_imports == 0.0 {
        return 0.0;
    }
    round_dp((partner_exports / partner_total) / (world_imports / world_total), 4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{seed, testutil::observation};

    #[test]
    fn normalizes_against_same_quarter_totals() {
        // Q1: china totals 3000, world totals 2000.
        // Row x: (2000/3000) / (1000/2000) = 4/3.
        let mut rows = vec![
            seed(observation("x", "2024-Q1", [0.0, 0.0, 1000.0, 2000.0, 100.0])),
            seed(observation("y", "2024-Q1", [0.0, 0.0, 1000.0, 1000.0, 300.0])),
            // A later quarter with wildly different totals must not bleed in.
            seed(observation("x", "2024-Q2", [0.0, 0.0, 9000.0, 9000.0, 900.0])),
        ];
        apply(&mut rows);
        assert_eq!(rows[0].china_rca, round_dp(4.0 / 3.0, 4));
        assert_eq!(rows[2].obs.date.to_string(), "2024-Q2");
    }

    #[test]
    fn zero_totals_give_zero_not_nan() {
        let mut rows = vec![seed(observation(
            "x",
            "2024-Q1",
            [0.0, 0.0, 1000.0, 0.0, 0.0],
        ))];
        apply(&mut rows);
        assert_eq!(rows[0].china_rca, 0.0);
        assert_eq!(rows[0].india_rca, 0.0);
        assert_eq!(rows[0].rca_advantage, RcaAdvantage::Neutral);
    }

    #[test]
    fn advantage_goes_to_the_higher_rca() {
        let mut rows = vec![
            seed(observation("x", "2024-Q1", [0.0, 0.0, 1000.0, 2000.0, 100.0])),
            seed(observation("y", "2024-Q1", [0.0, 0.0, 1000.0, 500.0, 900.0])),
        ];
        apply(&mut rows);
        assert_eq!(rows[0].rca_advantage, RcaAdvantage::China);
        assert_eq!(rows[1].rca_advantage, RcaAdvantage::India);
    }
}
