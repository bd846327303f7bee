use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tradewatch_core::domain::quarter::Quarter;
use tradewatch_core::{indicators, io, pipeline};

#[derive(Debug, Parser)]
#[command(name = "tradewatch_worker")]
struct Args {
    /// Raw panel CSV. Defaults to TRADE_PANEL_PATH.
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute every derived indicator and write the enriched panel CSV.
    Enrich {
        /// Output CSV path. Defaults to TRADE_OUTPUT_PATH.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run the full analysis for one product and print it as JSON.
    Analyze {
        hs_code: String,

        /// Quarter key (YYYY-Qn). Defaults to the product's latest quarter.
        #[arg(long)]
        quarter: Option<String>,
    },
    /// Rank all products by latest-quarter risk score and print as JSON.
    Portfolio,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let settings = tradewatch_core::config::Settings::from_env()?;

    let input = match args.input {
        Some(path) => path,
        None => PathBuf::from(settings.require_panel_path()?),
    };

    let panel = indicators::enrich(io::load_panel(&input)?);

    match args.command {
        Command::Enrich { output } => {
            let output = output
                .or_else(|| settings.output_path.clone().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("trade_panel_enriched.csv"));
            io::write_enriched(&output, &panel, chrono::Utc::now())?;
            log_summary(&panel);
        }
        Command::Analyze { hs_code, quarter } => {
            let quarter = quarter
                .map(|q| q.parse::<Quarter>())
                .transpose()
                .context("invalid quarter key, expected YYYY-Qn")?;
            let analysis = pipeline::analyze(&panel, &hs_code, quarter.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        Command::Portfolio => {
            let rows = pipeline::rank_portfolio(&panel);
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}

/// Post-enrichment summary, mirroring what a reviewer checks first: panel
/// coverage, the concentration picture, and how the risk tiers split.
fn log_summary(panel: &indicators::EnrichedPanel) {
    use tradewatch_core::domain::observation::RiskLevel;

    let rows = panel.rows();
    let products: std::collections::BTreeSet<&str> =
        rows.iter().map(|r| r.obs.hs_code.as_str()).collect();

    let high = rows.iter().filter(|r| r.risk_level == Some(RiskLevel::High)).count();
    let medium = rows.iter().filter(|r| r.risk_level == Some(RiskLevel::Medium)).count();
    let low = rows.iter().filter(|r| r.risk_level == Some(RiskLevel::Low)).count();

    tracing::info!(
        rows = rows.len(),
        products = products.len(),
        avg_china_share = mean(rows.iter().filter_map(|r| r.china_share_us)),
        avg_india_share = mean(rows.iter().filter_map(|r| r.india_share_us)),
        avg_hhi = mean(rows.iter().filter_map(|r| r.hhi_us_imports)),
        risk_high = high,
        risk_medium = medium,
        risk_low = low,
        china_rca_above_one = rows.iter().filter(|r| r.china_rca > 1.0).count(),
        india_rca_above_one = rows.iter().filter(|r| r.india_rca > 1.0).count(),
        "enrichment summary"
    );
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        return None;
    }
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    Some((avg * 100.0).round() / 100.0)
}
