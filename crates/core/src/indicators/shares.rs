use super::round_dp;
use crate::domain::observation::EnrichedObservation;

/// Market-share pass: each partner's percent of US imports plus the residual,
/// and the US's share of each partner's own export total. Rows with zero
/// world imports keep `None` shares and are left for downstream passes to
/// skip.
pub(super) fn apply(rows: &mut [EnrichedObservation]) {
    for row in rows {
        let o = &row.obs;

        if o.us_import_world != 0.0 {
            let china = round_dp(o.us_import_china / o.us_import_world * 100.0, 2);
            let india = round_dp(o.us_import_india / o.us_import_world * 100.0, 2);
            row.china_share_us = Some(china);
            row.india_share_us = Some(india);
            row.other_share_us = Some(round_dp(100.0 - china - india, 2));
        }

        if o.china_export_world != 0.0 {
            row.us_share_china_exports =
                Some(round_dp(o.us_import_china / o.china_export_world * 100.0, 2));
        }
        if o.india_export_world != 0.0 {
            row.us_share_india_exports =
                Some(round_dp(o.us_import_india / o.india_export_world * 100.0, 2));
        }
    }
}
