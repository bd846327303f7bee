use super::round_dp;
use crate::domain::observation::{EnrichedObservation, TrendDirection};

/// Trend pass: 4-quarter trailing mean per product (expanding window for the
/// first three quarters), a direction label against that mean, and the
/// first-difference momentum. Relies on `(hs_code, quarter)` sort order.
pub(super) fn apply(rows: &mut [EnrichedObservation]) {
    let mut start = 0;
    while start < rows.len() {
        let hs_code = rows[start].obs.hs_code.clone();
        let mut end = start;
        while end < rows.len() && rows[end].obs.hs_code == hs_code {
            end += 1;
        }
        apply_product(&mut rows[start..end]);
        start = end;
    }
}

fn apply_product(rows: &mut [EnrichedObservation]) {
    for i in 0..rows.len() {
        let window_start = i.saturating_sub(3);

        let china_ma = trailing_mean(rows[window_start..=i].iter().map(|r| r.china_share_us));
        let india_ma = trailing_mean(rows[window_start..=i].iter().map(|r| r.india_share_us));

        let row_china_share = rows[i].china_share_us;
        let row_india_share = rows[i].india_share_us;
        let prev_china = (i > 0).then(|| rows[i - 1].china_share_us).flatten();
        let prev_india = (i > 0).then(|| rows[i - 1].india_share_us).flatten();

        let row = &mut rows[i];
        row.china_share_ma4 = china_ma;
        row.india_share_ma4 = india_ma;
        row.china_trend = direction(row_china_share, china_ma);
        row.india_trend = direction(row_india_share, india_ma);
        row.china_momentum = diff(row_china_share, prev_china);
        row.india_momentum = diff(row_india_share, prev_india);
    }
}

fn trailing_mean(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let defined: Vec<f64> = values.flatten().collect();
    if defined.is_empty() {
        return None;
    }
    Some(round_dp(defined.iter().sum::<f64>() / defined.len() as f64, 2))
}

fn direction(share: Option<f64>, ma: Option<f64>) -> TrendDirection {
    match (share, ma) {
        (Some(s), Some(m)) if s > m => TrendDirection::Increasing,
        (Some(s), Some(m)) if s < m => TrendDirection::Decreasing,
        _ => TrendDirection::Stable,
    }
}

fn diff(current: Option<f64>, prev: Option<f64>) -> Option<f64> {
    match (current, prev) {
        (Some(c), Some(p)) => Some(round_dp(c - p, 2)),
        _ => None,
    }
}
