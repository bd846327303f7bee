use crate::domain::assessment::{
    ConcentrationRiskLevel, DependencyLevel, Disruption, NtmImpactLevel, RiskAssessmentRecord,
    RiskComponent, TrendRiskLevel, Urgency,
};
use crate::domain::context::{ContextRecord, NtmProfile, TrendMetrics};
use crate::domain::observation::{NtmSeverity, RiskLevel, TrendDirection};
use crate::indicators::round_dp;

const WEIGHT_CONCENTRATION: f64 = 0.3;
const WEIGHT_DEPENDENCY: f64 = 0.3;
const WEIGHT_NTM: f64 = 0.25;
const WEIGHT_TREND: f64 = 0.15;

/// Scores a context record against the four risk ladders and rolls them into
/// the weighted composite. Pure and total: undefined upstream metrics read as
/// zero, which lands in the lowest rung of each ladder. The narrative is a
/// fixed template over the computed pieces — same input, same bytes.
pub fn assess(ctx: &ContextRecord) -> RiskAssessmentRecord {
    let hhi = ctx.metrics.hhi.unwrap_or(0.0);
    let china_share = ctx.metrics.china_share.unwrap_or(0.0);

    let concentration = assess_concentration(hhi);
    let dependency = assess_dependency(china_share);
    let ntm_impact = assess_ntm(&ctx.ntm);
    let trend = assess_trend(&ctx.trends);

    let overall = round_dp(
        concentration.score * WEIGHT_CONCENTRATION
            + dependency.score * WEIGHT_DEPENDENCY
            + ntm_impact.score * WEIGHT_NTM
            + trend.score * WEIGHT_TREND,
        1,
    );

    let (overall_risk_level, urgency) = if overall >= 70.0 {
        (RiskLevel::High, Urgency::Urgent)
    } else if overall >= 40.0 {
        (RiskLevel::Medium, Urgency::Monitor)
    } else {
        (RiskLevel::Low, Urgency::Stable)
    };

    let vulnerabilities = identify_vulnerabilities(&concentration, &dependency, &ntm_impact, &trend);
    let key_drivers = identify_key_drivers(china_share, hhi, &ctx.ntm, &ctx.trends);
    let narrative = narrative(overall_risk_level, overall, &vulnerabilities, &key_drivers);

    RiskAssessmentRecord {
        overall_risk_level,
        overall_risk_score: overall,
        urgency,
        concentration,
        dependency,
        ntm_impact,
        trend,
        vulnerabilities,
        key_drivers,
        disruption_likelihood: disruption_likelihood(overall),
        disruption_impact: disruption_impact(china_share),
        narrative,
    }
}

fn assess_concentration(hhi: f64) -> RiskComponent<ConcentrationRiskLevel> {
    let (score, level, description) = if hhi > 0.25 {
        (
            90.0,
            ConcentrationRiskLevel::High,
            "Highly concentrated market - limited alternatives available".to_string(),
        )
    } else if hhi > 0.15 {
        (
            60.0,
            ConcentrationRiskLevel::Medium,
            "Moderately concentrated - diversification needed".to_string(),
        )
    } else {
        (
            30.0,
            ConcentrationRiskLevel::Low,
            "Well-diversified market structure".to_string(),
        )
    };
    RiskComponent { score, level, description }
}

fn assess_dependency(china_share: f64) -> RiskComponent<DependencyLevel> {
    let (score, level, description) = if china_share > 70.0 {
        (
            95.0,
            DependencyLevel::Critical,
            format!("Critical dependency on China ({china_share}%)"),
        )
    } else if china_share > 50.0 {
        (
            80.0,
            DependencyLevel::High,
            format!("High dependency on China ({china_share}%)"),
        )
    } else if china_share > 30.0 {
        (
            50.0,
            DependencyLevel::Medium,
            format!("Moderate China exposure ({china_share}%)"),
        )
    } else {
        (
            20.0,
            DependencyLevel::Low,
            format!("Low China dependency ({china_share}%)"),
        )
    };
    RiskComponent { score, level, description }
}

fn assess_ntm(ntm: &NtmProfile) -> RiskComponent<NtmImpactLevel> {
    let count = ntm.ntm_count;
    let severity = ntm.ntm_severity;

    let (score, level, description) = if severity == NtmSeverity::High || count >= 30 {
        (
            80.0,
            NtmImpactLevel::High,
            format!("{count} NTMs with {severity} severity - significant compliance burden"),
        )
    } else if severity == NtmSeverity::Medium || count >= 15 {
        (
            55.0,
            NtmImpactLevel::Medium,
            format!("{count} NTMs with {severity} severity - moderate barriers"),
        )
    } else if count > 0 {
        (
            30.0,
            NtmImpactLevel::Low,
            format!("{count} NTMs - manageable compliance requirements"),
        )
    } else {
        (
            10.0,
            NtmImpactLevel::Minimal,
            "No significant NTM barriers".to_string(),
        )
    };
    RiskComponent { score, level, description }
}

fn assess_trend(trends: &TrendMetrics) -> RiskComponent<TrendRiskLevel> {
    let momentum = trends.china_momentum;

    let (score, level, description) = match trends.china_trend {
        TrendDirection::Increasing if momentum > 3.0 => (
            70.0,
            TrendRiskLevel::Worsening,
            format!("China share increasing rapidly (+{momentum}%)"),
        ),
        TrendDirection::Increasing => (
            50.0,
            TrendRiskLevel::Concern,
            "China share trending upward".to_string(),
        ),
        TrendDirection::Decreasing if momentum < -3.0 => (
            20.0,
            TrendRiskLevel::Improving,
            format!("China share declining ({momentum}%)"),
        ),
        _ => (
            35.0,
            TrendRiskLevel::Stable,
            "Trade patterns relatively stable".to_string(),
        ),
    };
    RiskComponent { score, level, description }
}

fn identify_vulnerabilities(
    concentration: &RiskComponent<ConcentrationRiskLevel>,
    dependency: &RiskComponent<DependencyLevel>,
    ntm: &RiskComponent<NtmImpactLevel>,
    trend: &RiskComponent<TrendRiskLevel>,
) -> Vec<String> {
    let mut out = Vec::new();

    if matches!(dependency.level, DependencyLevel::Critical | DependencyLevel::High) {
        out.push(format!("🔴 {}", dependency.description));
    }
    if concentration.level == ConcentrationRiskLevel::High {
        out.push(format!("🔴 {}", concentration.description));
    }
    if matches!(ntm.level, NtmImpactLevel::High | NtmImpactLevel::Medium) {
        out.push(format!("🟡 {}", ntm.description));
    }
    if matches!(trend.level, TrendRiskLevel::Worsening | TrendRiskLevel::Concern) {
        out.push(format!("⚠️ {}", trend.description));
    }

    if out.is_empty() {
        out.push("✅ No critical vulnerabilities identified".to_string());
    }
    out
}

fn identify_key_drivers(
    china_share: f64,
    hhi: f64,
    ntm: &NtmProfile,
    trends: &TrendMetrics,
) -> Vec<String> {
    let mut out = Vec::new();

    if china_share > 50.0 {
        out.push("Concentration on single supplier (China)".to_string());
    }
    if ntm.ntm_count > 20 {
        out.push(format!("High regulatory burden ({} NTMs)", ntm.ntm_count));
    }
    if ntm.has_tbt && ntm.has_sps {
        out.push("Multiple technical barriers (SPS + TBT)".to_string());
    }
    if trends.china_trend == TrendDirection::Increasing {
        out.push("Increasing China market share trend".to_string());
    }
    if hhi > 0.25 {
        out.push("Limited supplier diversification".to_string());
    }

    if out.is_empty() {
        out.push("Diversified, stable market conditions".to_string());
    }
    out
}

fn disruption_likelihood(overall: f64) -> Disruption {
    if overall >= 70.0 {
        Disruption { score: 8, label: "High (7-8/10)".to_string() }
    } else if overall >= 50.0 {
        Disruption { score: 6, label: "Medium (5-6/10)".to_string() }
    } else {
        Disruption { score: 3, label: "Low (2-4/10)".to_string() }
    }
}

fn disruption_impact(china_share: f64) -> Disruption {
    if china_share > 70.0 {
        Disruption { score: 9, label: "Critical (8-9/10)".to_string() }
    } else if china_share > 50.0 {
        Disruption { score: 7, label: "High (6-7/10)".to_string() }
    } else if china_share > 30.0 {
        Disruption { score: 5, label: "Medium (4-5/10)".to_string() }
    } else {
        Disruption { score: 3, label: "Low (2-3/10)".to_string() }
    }
}

fn narrative(
    level: RiskLevel,
    score: f64,
    vulnerabilities: &[String],
    drivers: &[String],
) -> String {
    let vuln_lines: Vec<String> = vulnerabilities.iter().map(|v| format!("- {v}")).collect();
    let driver_lines: Vec<String> = drivers.iter().map(|d| format!("- {d}")).collect();
    format!(
        "**Risk Assessment Summary**\n\n\
         Overall Risk: **{level}** (Score: {score}/100)\n\n\
         **Primary Vulnerabilities:**\n{}\n\n\
         **Key Risk Drivers:**\n{}",
        vuln_lines.join("\n"),
        driver_lines.join("\n"),
    )
}
