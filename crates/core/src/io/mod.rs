use crate::domain::observation::TradeObservation;
use crate::indicators::EnrichedPanel;
use anyhow::{ensure, Context};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::Path;

/// Loads the raw quarterly panel from CSV. Rejects duplicate
/// `(hs_code, quarter)` keys outright: a duplicated row would silently skew
/// every per-quarter aggregate downstream.
pub fn load_panel(path: &Path) -> anyhow::Result<Vec<TradeObservation>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening panel file {}", path.display()))?;

    let mut rows = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for (i, record) in reader.deserialize::<TradeObservation>().enumerate() {
        let row = record.with_context(|| format!("parsing panel row {}", i + 2))?;
        ensure!(
            seen.insert((row.hs_code.clone(), row.date.to_string())),
            "duplicate panel row for HS code {} in {}",
            row.hs_code,
            row.date
        );
        rows.push(row);
    }

    tracing::info!(rows = rows.len(), path = %path.display(), "panel loaded");
    Ok(rows)
}

const ENRICHED_HEADER: &[&str] = &[
    "date",
    "hs_code",
    "product_name",
    "us_import_china",
    "us_import_india",
    "us_import_world",
    "china_export_world",
    "india_export_world",
    "ntm_count",
    "ntm_severity",
    "has_sps",
    "has_tbt",
    "has_export_restriction",
    "technical_measure_count",
    "non_technical_count",
    "ntm_codes",
    "quarter_num",
    "year",
    "china_share_us",
    "india_share_us",
    "other_share_us",
    "us_share_china_exports",
    "us_share_india_exports",
    "hhi_us_imports",
    "concentration_level",
    "diversification_score",
    "trade_intensity_china",
    "trade_intensity_india",
    "us_import_china_growth",
    "us_import_india_growth",
    "us_import_world_growth",
    "china_export_world_growth",
    "india_export_world_growth",
    "china_dependency_risk",
    "china_india_ratio",
    "china_rca",
    "india_rca",
    "rca_advantage",
    "geopolitical_risk_score",
    "risk_level",
    "india_opportunity_score",
    "china_share_ma4",
    "india_share_ma4",
    "china_trend",
    "india_trend",
    "china_momentum",
    "india_momentum",
    "analysis_timestamp",
];

/// Writes the enriched panel with a fixed column order: raw columns first,
/// then the derived families in computation order, then the run timestamp.
/// Undefined metrics become empty cells, never a sentinel number.
pub fn write_enriched(
    path: &Path,
    panel: &EnrichedPanel,
    generated_at: DateTime<Utc>,
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating output file {}", path.display()))?;

    writer.write_record(ENRICHED_HEADER)?;

    let timestamp = generated_at.to_rfc3339();
    for row in panel.rows() {
        let o = &row.obs;
        writer.write_record([
            o.date.to_string(),
            o.hs_code.clone(),
            o.product_name.clone(),
            o.us_import_china.to_string(),
            o.us_import_india.to_string(),
            o.us_import_world.to_string(),
            o.china_export_world.to_string(),
            o.india_export_world.to_string(),
            o.ntm_count.to_string(),
            o.ntm_severity.to_string(),
            o.has_sps.to_string(),
            o.has_tbt.to_string(),
            o.has_export_restriction.to_string(),
            o.technical_measure_count.to_string(),
            o.non_technical_count.to_string(),
            o.ntm_codes.clone(),
            row.quarter_num.to_string(),
            row.year.to_string(),
            cell(row.china_share_us),
            cell(row.india_share_us),
            cell(row.other_share_us),
            cell(row.us_share_china_exports),
            cell(row.us_share_india_exports),
            cell(row.hhi_us_imports),
            row.concentration_level
                .map(|l| l.to_string())
                .unwrap_or_default(),
            cell(row.diversification_score),
            cell(row.trade_intensity_china),
            cell(row.trade_intensity_india),
            cell(row.us_import_china_growth),
            cell(row.us_import_india_growth),
            cell(row.us_import_world_growth),
            cell(row.china_export_world_growth),
            cell(row.india_export_world_growth),
            cell(row.china_dependency_risk),
            row.china_india_ratio.to_string(),
            row.china_rca.to_string(),
            row.india_rca.to_string(),
            row.rca_advantage.to_string(),
            cell(row.geopolitical_risk_score),
            row.risk_level.map(|l| l.to_string()).unwrap_or_default(),
            cell(row.india_opportunity_score),
            cell(row.china_share_ma4),
            cell(row.india_share_ma4),
            row.china_trend.to_string(),
            row.india_trend.to_string(),
            cell(row.china_momentum),
            cell(row.india_momentum),
            timestamp.clone(),
        ])?;
    }

    writer
        .flush()
        .with_context(|| format!("flushing output file {}", path.display()))?;
    tracing::info!(rows = panel.len(), path = %path.display(), "enriched panel written");
    Ok(())
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{enrich, testutil::observation};
    use std::fs;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("tradewatch-{}-{name}", std::process::id()))
    }

    const RAW: &str = "\
date,hs_code,product_name,us_import_china,us_import_india,us_import_world,china_export_world,india_export_world,ntm_count,ntm_severity,has_sps,has_tbt,has_export_restriction,technical_measure_count,non_technical_count,ntm_codes
2024-Q1,8517,Telephone sets,500.0,100.0,1000.0,5000.0,800.0,12,MEDIUM,true,false,false,8,4,\"A14,B31\"
2024-Q2,8517,Telephone sets,550.0,120.0,1100.0,5200.0,850.0,12,MEDIUM,true,false,false,8,4,\"A14,B31\"
";

    #[test]
    fn loads_a_well_formed_panel() {
        let path = temp_path("load.csv");
        fs::write(&path, RAW).unwrap();
        let rows = load_panel(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].hs_code, "8517");
        assert_eq!(rows[1].date.to_string(), "2024-Q2");
    }

    #[test]
    fn rejects_duplicate_product_quarter_keys() {
        let mut data = RAW.to_string();
        data.push_str(
            "2024-Q1,8517,Telephone sets,1.0,1.0,1.0,1.0,1.0,0,,false,false,false,0,0,\n",
        );
        let path = temp_path("dup.csv");
        fs::write(&path, data).unwrap();
        let err = load_panel(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert!(err.to_string().contains("duplicate panel row"));
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = load_panel(Path::new("/nonexistent/panel.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/panel.csv"));
    }

    #[test]
    fn written_panel_has_fixed_header_and_empty_undefined_cells() {
        let panel = enrich(vec![
            observation("8517", "2024-Q1", [500.0, 100.0, 1000.0, 5000.0, 800.0]),
            // Zero world imports: every share cell must come out empty.
            observation("9999", "2024-Q1", [10.0, 5.0, 0.0, 100.0, 50.0]),
        ]);

        let path = temp_path("out.csv");
        write_enriched(&path, &panel, Utc::now()).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();

        let mut lines = written.lines();
        let header = lines.next().unwrap();
        assert_eq!(header, ENRICHED_HEADER.join(","));

        let bad_row = lines.find(|l| l.starts_with("2024-Q1,9999")).unwrap();
        let fields: Vec<&str> = bad_row.split(',').collect();
        let share_idx = ENRICHED_HEADER
            .iter()
            .position(|h| *h == "china_share_us")
            .unwrap();
        assert_eq!(fields[share_idx], "");
    }

    #[test]
    fn written_base_columns_reload_cleanly() {
        let panel = enrich(vec![observation(
            "8517",
            "2024-Q1",
            [500.0, 100.0, 1000.0, 5000.0, 800.0],
        )]);
        let path = temp_path("reload.csv");
        write_enriched(&path, &panel, Utc::now()).unwrap();

        // The enriched file is a superset of the raw schema; serde ignores
        // the extra columns.
        let rows = load_panel(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].us_import_china, 500.0);
    }
}
