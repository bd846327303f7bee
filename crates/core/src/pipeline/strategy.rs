use crate::domain::assessment::RiskAssessmentRecord;
use crate::domain::context::ContextRecord;
use crate::domain::observation::RiskLevel;
use crate::domain::recommendation::{
    ConcentrationShift, CostImpact, DependencyShift, ExpectedOutcomes, Feasibility,
    IndiaOpportunity, OpportunityPotential, RecommendationRecord, RegionalOpportunity, RiskShift,
    Roadmap, RoadmapPhase, Strategy,
};
use crate::indicators::round_dp;

/// Turns a context record plus its risk assessment into the ranked strategy
/// set. Strategy order is fixed by the rule table; an empty set is not an
/// error, it produces a "continue monitoring" summary.
pub fn recommend(ctx: &ContextRecord, assessment: &RiskAssessmentRecord) -> RecommendationRecord {
    let risk_level = assessment.overall_risk_level;
    let china_share = ctx.metrics.china_share.unwrap_or(0.0);

    let india = analyze_india_opportunity(ctx);
    let other_opportunities = identify_other_opportunities(ctx);
    let strategies = prioritize_strategies(&india, risk_level, china_share);
    let expected_outcomes = expected_outcomes(&strategies, ctx);
    let summary = summary(&strategies, expected_outcomes.as_ref());

    RecommendationRecord {
        primary_recommendation: strategies.first().cloned(),
        strategies,
        india_opportunity: india,
        other_opportunities,
        expected_outcomes,
        roadmap: roadmap(risk_level),
        timeline: estimate_timeline(risk_level),
        summary,
    }
}

fn analyze_india_opportunity(ctx: &ContextRecord) -> IndiaOpportunity {
    let india_share = ctx.metrics.india_share.unwrap_or(0.0);
    let india_rca = ctx.indicators.india_rca;
    let opportunity_score = ctx.indicators.india_opportunity_score.unwrap_or(0.0);

    let (feasibility, priority, rationale) = if india_rca > 1.5 && opportunity_score > 60.0 {
        (
            Feasibility::High,
            1,
            format!(
                "India has strong comparative advantage (RCA: {india_rca}) and high opportunity score ({opportunity_score})"
            ),
        )
    } else if india_rca > 1.0 && opportunity_score > 40.0 {
        (
            Feasibility::Medium,
            2,
            format!(
                "India has moderate advantage (RCA: {india_rca}) with decent opportunity ({opportunity_score})"
            ),
        )
    } else {
        (
            Feasibility::Low,
            3,
            format!(
                "Limited India advantage (RCA: {india_rca}), opportunity score: {opportunity_score}"
            ),
        )
    };

    let (delta, cap) = match feasibility {
        Feasibility::High => (15.0, 40.0),
        Feasibility::Medium => (10.0, 30.0),
        _ => (5.0, 20.0),
    };
    let target_share = (india_share + delta).min(cap);

    IndiaOpportunity {
        feasibility,
        priority,
        current_share: round_dp(india_share, 1),
        target_share: round_dp(target_share, 1),
        increase: round_dp(target_share - india_share, 1),
        india_rca: round_dp(india_rca, 2),
        opportunity_score: round_dp(opportunity_score, 1),
        rationale,
        barriers: india_barriers(india_rca, india_share),
        advantages: india_advantages(india_rca, opportunity_score),
    }
}

fn india_barriers(india_rca: f64, india_share: f64) -> Vec<String> {
    let mut out = Vec::new();
    if india_rca < 1.0 {
        out.push("Lower comparative advantage vs global competitors".to_string());
    }
    if india_share < 5.0 {
        out.push("Currently low market presence - needs supplier development".to_string());
    }
    out.push("Compliance with US import regulations".to_string());
    out
}

fn india_advantages(india_rca: f64, opportunity_score: f64) -> Vec<String> {
    let mut out = Vec::new();
    if india_rca > 1.5 {
        out.push(format!("Strong competitive advantage (RCA: {india_rca})"));
    } else if india_rca > 1.0 {
        out.push(format!("Competitive advantage present (RCA: {india_rca})"));
    }
    if opportunity_score > 60.0 {
        out.push("High diversification opportunity score".to_string());
    }
    out.push("Democratic partner with stable trade relations".to_string());
    out.push("Growing manufacturing capabilities".to_string());
    out
}

/// Static rule table: entries are gated on share thresholds but their content
/// is fixed, not computed from the data.
fn identify_other_opportunities(ctx: &ContextRecord) -> Vec<RegionalOpportunity> {
    let other_share = ctx.metrics.other_share.unwrap_or(0.0);
    let china_share = ctx.metrics.china_share.unwrap_or(0.0);
    let mut out = Vec::new();

    if other_share > 20.0 {
        out.push(RegionalOpportunity {
            region: "ASEAN (Vietnam, Thailand, Malaysia)".to_string(),
            potential: OpportunityPotential::MediumHigh,
            current_share: Some(round_dp(other_share, 1)),
            rationale: "Growing manufacturing hubs with established supply chains".to_string(),
            timeline: "12-18 months".to_string(),
        });
    }

    if china_share > 40.0 {
        out.push(RegionalOpportunity {
            region: "Mexico (Nearshoring)".to_string(),
            potential: OpportunityPotential::Medium,
            current_share: None,
            rationale: "USMCA benefits, reduced logistics costs, geographic proximity".to_string(),
            timeline: "18-24 months".to_string(),
        });
    }

    out.push(RegionalOpportunity {
        region: "European Union".to_string(),
        potential: OpportunityPotential::LowMedium,
        current_share: None,
        rationale: "High quality standards, technological expertise".to_string(),
        timeline: "24+ months".to_string(),
    });

    out
}

fn prioritize_strategies(
    india: &IndiaOpportunity,
    risk_level: RiskLevel,
    china_share: f64,
) -> Vec<Strategy> {
    let mut out = Vec::new();

    if matches!(india.feasibility, Feasibility::High | Feasibility::Medium) {
        let timeline = if india.feasibility == Feasibility::High {
            "6-12 months"
        } else {
            "12-18 months"
        };
        out.push(Strategy {
            priority: 1,
            name: "India Sourcing Expansion".to_string(),
            target: format!(
                "Increase India share from {}% to {}%",
                india.current_share, india.target_share
            ),
            action: format!("Shift {}% of sourcing to Indian suppliers", india.increase),
            timeline: timeline.to_string(),
            feasibility: india.feasibility,
            expected_impact: format!(
                "Reduce China dependency to {}%",
                round_dp(china_share - india.increase, 1)
            ),
            implementation_steps: vec![
                "Identify and qualify Indian suppliers".to_string(),
                "Pilot orders (5% volume)".to_string(),
                "Quality validation and certification".to_string(),
                "Gradual scale-up to target volume".to_string(),
            ],
        });
    }

    if risk_level == RiskLevel::High && china_share > 60.0 {
        out.push(Strategy {
            priority: 2,
            name: "Multi-Country Diversification".to_string(),
            target: "Distribute imports across 3-4 countries".to_string(),
            action: "Reduce single-country exposure below 50%".to_string(),
            timeline: "12-24 months".to_string(),
            feasibility: Feasibility::Medium,
            expected_impact: "Lower HHI below 0.25 (competitive market)".to_string(),
            implementation_steps: vec![
                "Develop ASEAN supplier network".to_string(),
                "Explore nearshoring to Mexico".to_string(),
                "Establish dual-sourcing arrangements".to_string(),
                "Implement risk-hedging contracts".to_string(),
            ],
        });
    }

    if risk_level == RiskLevel::High {
        out.push(Strategy {
            priority: 3,
            name: "Nearshoring Initiative".to_string(),
            target: "Establish North American supply base".to_string(),
            action: "Develop Mexico/US manufacturing capacity".to_string(),
            timeline: "18-36 months".to_string(),
            feasibility: Feasibility::MediumLow,
            expected_impact: "Long-term supply chain resilience".to_string(),
            implementation_steps: vec![
                "Partner with USMCA manufacturers".to_string(),
                "Invest in regional capacity building".to_string(),
                "Leverage government incentives".to_string(),
                "Gradual transition (5-10% initially)".to_string(),
            ],
        });
    }

    out
}

/// Fixed projection heuristics, deliberately decoupled from the indicator
/// formulas: the dependency reduction comes from the primary strategy's
/// stated target (its trailing percent) or a flat 15% cut, and the projected
/// HHI is a flat 20% improvement. Neither is re-derived from the share math.
fn expected_outcomes(strategies: &[Strategy], ctx: &ContextRecord) -> Option<ExpectedOutcomes> {
    let primary = strategies.first()?;
    let china_share = ctx.metrics.china_share.unwrap_or(0.0);
    let current_hhi = ctx.metrics.hhi.unwrap_or(0.0);

    let new_china_share = if primary.name.contains("India") {
        match trailing_percent(&primary.target) {
            Some(reduction) => china_share - reduction,
            None => china_share * 0.85,
        }
    } else {
        china_share * 0.85
    };

    let new_hhi = current_hhi * 0.8;
    let improvement = if current_hhi > 0.0 {
        Some(round_dp((current_hhi - new_hhi) / current_hhi * 100.0, 1))
    } else {
        None
    };

    Some(ExpectedOutcomes {
        risk_reduction: RiskShift {
            from: ctx.metrics.risk_level,
            to: if ctx.metrics.risk_level == Some(RiskLevel::High) {
                RiskLevel::Medium
            } else {
                RiskLevel::Low
            },
            timeline: primary.timeline.clone(),
        },
        china_dependency: DependencyShift {
            current: round_dp(china_share, 1),
            target: round_dp(new_china_share, 1),
            reduction: round_dp(china_share - new_china_share, 1),
        },
        market_concentration: ConcentrationShift {
            current_hhi: round_dp(current_hhi, 3),
            target_hhi: round_dp(new_hhi, 3),
            improvement,
        },
        cost_impact: CostImpact {
            initial: "+5-8% (transition costs)".to_string(),
            long_term: "Neutral (competitive pricing)".to_string(),
            roi_period: "12-18 months".to_string(),
        },
    })
}

/// Last whitespace token of the target line, percent sign stripped. For the
/// India strategy's "Increase India share from X% to Y%" this is Y — the
/// stated target share, which the projection treats as the reduction amount.
fn trailing_percent(target: &str) -> Option<f64> {
    let last = target.split_whitespace().next_back()?;
    last.trim_end_matches('%').parse().ok()
}

fn roadmap(risk_level: RiskLevel) -> Roadmap {
    let urgency = match risk_level {
        RiskLevel::High => "IMMEDIATE",
        RiskLevel::Medium => "30 DAYS",
        RiskLevel::Low => "90 DAYS",
    };

    // Phase content is intentionally independent of the data; only the
    // urgency label varies.
    let phases = vec![
        RoadmapPhase {
            phase: "Immediate (0-30 days)".to_string(),
            actions: vec![
                "🔍 Conduct supplier audit in target countries".to_string(),
                "📊 Establish baseline metrics and KPIs".to_string(),
                "🤝 Engage with trade associations".to_string(),
                "📋 Review and update procurement policies".to_string(),
            ],
        },
        RoadmapPhase {
            phase: "Short-term (30-90 days)".to_string(),
            actions: vec![
                "🏭 Identify and qualify 3-5 alternative suppliers".to_string(),
                "📦 Initiate pilot orders (5-10% volume)".to_string(),
                "✅ Quality validation and compliance checks".to_string(),
                "💼 Negotiate commercial terms".to_string(),
            ],
        },
        RoadmapPhase {
            phase: "Medium-term (3-12 months)".to_string(),
            actions: vec![
                "📈 Scale pilot to 15-25% of volume".to_string(),
                "🔄 Implement dual-sourcing strategy".to_string(),
                "📉 Monitor cost and quality metrics".to_string(),
                "🎯 Adjust targets based on results".to_string(),
            ],
        },
        RoadmapPhase {
            phase: "Long-term (12+ months)".to_string(),
            actions: vec![
                "🌐 Achieve target diversification ratios".to_string(),
                "🏆 Establish strategic partnerships".to_string(),
                "📊 Continuous monitoring and optimization".to_string(),
                "🔄 Periodic risk reassessment".to_string(),
            ],
        },
    ];

    Roadmap {
        urgency: urgency.to_string(),
        phases,
    }
}

fn estimate_timeline(risk_level: RiskLevel) -> String {
    match risk_level {
        RiskLevel::High => "6-12 months (accelerated due to high risk)".to_string(),
        RiskLevel::Medium => "12-18 months (standard implementation)".to_string(),
        RiskLevel::Low => "18-24 months (gradual optimization)".to_string(),
    }
}

fn summary(strategies: &[Strategy], outcomes: Option<&ExpectedOutcomes>) -> String {
    let Some(primary) = strategies.first() else {
        return "Current sourcing strategy is adequately diversified. Continue monitoring."
            .to_string();
    };

    let (reduction, improvement, from, to) = match outcomes {
        Some(o) => (
            o.china_dependency.reduction,
            o.market_concentration.improvement.unwrap_or(0.0),
            o.risk_reduction
                .from
                .map(|l| l.to_string())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            o.risk_reduction.to.to_string(),
        ),
        None => (0.0, 0.0, "UNKNOWN".to_string(), "LOW".to_string()),
    };

    format!(
        "**Strategic Diversification Recommendation**\n\n\
         **Priority Action:** {}\n\
         - **Target:** {}\n\
         - **Timeline:** {}\n\
         - **Feasibility:** {}\n\n\
         **Expected Impact:**\n\
         - Reduce China dependency by {reduction}%\n\
         - Improve market concentration (HHI) by {improvement}%\n\
         - Risk level: {from} → {to}\n\n\
         **Implementation:** Start with pilot phase, scale gradually based on validation results.",
        primary.name, primary.target, primary.timeline, primary.feasibility,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::observation::{ConcentrationLevel, RiskLevel};
    use crate::pipeline::{risk::assess, testutil::context};

    #[test]
    fn strong_india_position_yields_high_feasibility() {
        let mut ctx = context();
        ctx.indicators.india_rca = 2.0;
        ctx.indicators.india_opportunity_score = Some(75.0);
        ctx.metrics.india_share = Some(12.0);

        let assessment = assess(&ctx);
        let recs = recommend(&ctx, &assessment);

        let india = &recs.india_opportunity;
        assert_eq!(india.feasibility, Feasibility::High);
        assert_eq!(india.priority, 1);
        assert_eq!(india.target_share, 27.0);
        assert_eq!(india.increase, 15.0);

        let primary = recs.primary_recommendation.as_ref().unwrap();
        assert_eq!(primary.name, "India Sourcing Expansion");
        assert_eq!(primary.timeline, "6-12 months");
        assert_eq!(primary.target, "Increase India share from 12% to 27%");
    }

    #[test]
    fn target_share_is_capped() {
        let mut ctx = context();
        ctx.indicators.india_rca = 2.0;
        ctx.indicators.india_opportunity_score = Some(75.0);
        ctx.metrics.india_share = Some(30.0);

        let recs = recommend(&ctx, &assess(&ctx));
        assert_eq!(recs.india_opportunity.target_share, 40.0);
        assert_eq!(recs.india_opportunity.increase, 10.0);
    }

    #[test]
    fn high_risk_adds_multi_country_and_nearshoring_in_fixed_order() {
        let mut ctx = context();
        ctx.indicators.india_rca = 2.0;
        ctx.indicators.india_opportunity_score = Some(75.0);
        ctx.metrics.india_share = Some(5.0);
        ctx.metrics.china_share = Some(80.0);
        ctx.metrics.hhi = Some(0.65);
        ctx.metrics.risk_level = Some(RiskLevel::High);
        ctx.metrics.concentration_level = Some(ConcentrationLevel::High);
        ctx.ntm.ntm_count = 35;

        let assessment = assess(&ctx);
        assert_eq!(assessment.overall_risk_level, RiskLevel::High);

        let recs = recommend(&ctx, &assessment);
        let names: Vec<&str> = recs.strategies.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "India Sourcing Expansion",
                "Multi-Country Diversification",
                "Nearshoring Initiative"
            ]
        );
        assert_eq!(recs.roadmap.urgency, "IMMEDIATE");
        assert_eq!(recs.roadmap.phases.len(), 4);
    }

    #[test]
    fn quiet_market_yields_no_strategies_and_no_error() {
        let ctx = context();
        let recs = recommend(&ctx, &assess(&ctx));
        assert!(recs.strategies.is_empty());
        assert!(recs.primary_recommendation.is_none());
        assert!(recs.expected_outcomes.is_none());
        assert_eq!(
            recs.summary,
            "Current sourcing strategy is adequately diversified. Continue monitoring."
        );
    }

    #[test]
    fn outcome_projection_uses_the_fixed_heuristics() {
        let mut ctx = context();
        ctx.indicators.india_rca = 2.0;
        ctx.indicators.india_opportunity_score = Some(75.0);
        ctx.metrics.india_share = Some(12.0);
        ctx.metrics.china_share = Some(60.0);
        ctx.metrics.hhi = Some(0.5);

        let recs = recommend(&ctx, &assess(&ctx));
        let outcomes = recs.expected_outcomes.unwrap();

        // Reduction is the parsed trailing percent of the target line, i.e.
        // the stated target share (27), not the 15-point increase.
        assert_eq!(outcomes.china_dependency.current, 60.0);
        assert_eq!(outcomes.china_dependency.target, 33.0);
        assert_eq!(outcomes.china_dependency.reduction, 27.0);

        // HHI projection is a flat 20% improvement.
        assert_eq!(outcomes.market_concentration.current_hhi, 0.5);
        assert_eq!(outcomes.market_concentration.target_hhi, 0.4);
        assert_eq!(outcomes.market_concentration.improvement, Some(20.0));
    }

    #[test]
    fn non_india_primary_uses_flat_reduction() {
        let mut ctx = context();
        // India infeasible, but risk must come out HIGH with china > 60.
        ctx.indicators.india_rca = 0.5;
        ctx.indicators.india_opportunity_score = Some(20.0);
        ctx.metrics.china_share = Some(80.0);
        ctx.metrics.hhi = Some(0.65);
        ctx.ntm.ntm_count = 35;
        ctx.ntm.ntm_severity = crate::domain::observation::NtmSeverity::High;

        let assessment = assess(&ctx);
        assert_eq!(assessment.overall_risk_level, RiskLevel::High);

        let recs = recommend(&ctx, &assessment);
        let primary = recs.primary_recommendation.as_ref().unwrap();
        assert_eq!(primary.name, "Multi-Country Diversification");

        let outcomes = recs.expected_outcomes.unwrap();
        assert_eq!(outcomes.china_dependency.target, 68.0); // 80 * 0.85
        assert_eq!(outcomes.china_dependency.reduction, 12.0);
    }

    #[test]
    fn regional_table_is_gated_on_shares() {
        let mut ctx = context();
        ctx.metrics.other_share = Some(10.0);
        ctx.metrics.china_share = Some(30.0);
        let recs = recommend(&ctx, &assess(&ctx));
        let regions: Vec<&str> = recs
            .other_opportunities
            .iter()
            .map(|o| o.region.as_str())
            .collect();
        assert_eq!(regions, vec!["European Union"]);

        let mut ctx = context();
        ctx.metrics.other_share = Some(35.0);
        ctx.metrics.china_share = Some(45.0);
        let recs = recommend(&ctx, &assess(&ctx));
        assert_eq!(recs.other_opportunities.len(), 3);
        assert_eq!(recs.other_opportunities[0].current_share, Some(35.0));
    }

    #[test]
    fn trailing_percent_parses_the_target_line() {
        assert_eq!(
            trailing_percent("Increase India share from 12% to 27.5%"),
            Some(27.5)
        );
        assert_eq!(trailing_percent("Distribute imports across 3-4 countries"), None);
    }
}
