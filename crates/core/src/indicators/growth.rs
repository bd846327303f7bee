use super::round_dp;
use crate::domain::observation::EnrichedObservation;

/// Growth pass: quarter-over-quarter percent change for every flow column,
/// computed independently per product. The first quarter of each product has
/// no prior observation and stays `None`, as does any change off a zero base.
///
/// Relies on rows being sorted by `(hs_code, quarter)`.
pub(super) fn apply(rows: &mut [EnrichedObservation]) {
    for i in 1..rows.len() {
        if rows[i - 1].obs.hs_code != rows[i].obs.hs_code {
            continue;
        }

        let prev = rows[i - 1].obs.clone();
        let row = &mut rows[i];
        row.us_import_china_growth = pct_change(prev.us_import_china, row.obs.us_import_china);
        row.us_import_india_growth = pct_change(prev.us_import_india, row.obs.us_import_india);
        row.us_import_world_growth = pct_change(prev.us_import_world, row.obs.us_import_world);
        row.china_export_world_growth =
            pct_change(prev.china_export_world, row.obs.china_export_world);
        row.india_export_world_growth =
            pct_change(prev.india_export_world, row.obs.india_export_world);
    }
}

fn pct_change(prev: f64, current: f64) -> Option<f64> {
    if prev == 0.0 {
        return None;
    }
    Some(round_dp((current - prev) / prev * 100.0, 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{seed, testutil::observation};

    #[test]
    fn first_quarter_of_each_product_is_null() {
        let mut rows = vec![
            seed(observation("a", "2024-Q1", [100.0, 10.0, 200.0, 50.0, 5.0])),
            seed(observation("a", "2024-Q2", [110.0, 11.0, 220.0, 55.0, 6.0])),
            seed(observation("b", "2024-Q2", [300.0, 30.0, 600.0, 80.0, 9.0])),
        ];
        apply(&mut rows);

        assert!(rows[0].us_import_china_growth.is_none());
        assert_eq!(rows[1].us_import_china_growth, Some(10.0));
        assert_eq!(rows[1].us_import_world_growth, Some(10.0));
        // New product: no carry-over from the previous product's last row.
        assert!(rows[2].us_import_china_growth.is_none());
    }

    #[test]
    fn zero_base_yields_null_not_infinity() {
        let mut rows = vec![
            seed(observation("a", "2024-Q1", [0.0, 10.0, 200.0, 50.0, 5.0])),
            seed(observation("a", "2024-Q2", [50.0, 11.0, 220.0, 55.0, 6.0])),
        ];
        apply(&mut rows);
        assert!(rows[1].us_import_china_growth.is_none());
        assert_eq!(rows[1].us_import_india_growth, Some(10.0));
    }
}
