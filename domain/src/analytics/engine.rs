//! Metrics engine
//!
//! Pure function from a canonical [`RawClassification`] to
//! [`EnrichedAnalytics`]. Identical input always yields identical output.

use super::enriched::{
    CalculatedInsights, ConfidenceMetrics, ConsensusEvolution, ConsensusStrength, ConsensusType,
    EnrichedAnalytics, EnrichedTheme, Summary,
};
use super::profile::analyze_models;
use super::raw::RawClassification;
use super::theme::{percent, score_theme};

const CONTROVERSY_THRESHOLD: u32 = 40;
const EMERGENT_IMPACT: u32 = 6;

fn count(themes: &[EnrichedTheme], kind: ConsensusType) -> usize {
    themes.iter().filter(|t| t.consensus_type == kind).count()
}

fn mean(values: impl Iterator<Item = u32>, empty: f64) -> f64 {
    let (sum, n) = values.fold((0u64, 0u64), |(s, n), v| (s + v as u64, n + 1));
    if n == 0 { empty } else { sum as f64 / n as f64 }
}

fn summarize(themes: &[EnrichedTheme], total_models: usize) -> Summary {
    let consensus_score = mean(themes.iter().map(|t| t.consensus_strength_score), 0.0).round() as u32;
    let consensus_strength = if consensus_score >= 80 {
        ConsensusStrength::Strong
    } else if consensus_score >= 60 {
        ConsensusStrength::Moderate
    } else {
        ConsensusStrength::Weak
    };
    let controversy_count = themes
        .iter()
        .filter(|t| {
            t.consensus_type == ConsensusType::Split || t.controversy_score > CONTROVERSY_THRESHOLD
        })
        .count();

    Summary {
        total_themes: themes.len(),
        consensus_strength,
        consensus_score,
        controversy_count,
        participation_rate: 100,
        reliability_index: percent(count(themes, ConsensusType::Unanimous), themes.len()),
        total_models,
    }
}

fn confidence(themes: &[EnrichedTheme]) -> ConfidenceMetrics {
    let agree: usize = themes.iter().map(|t| t.metrics.agree_count).sum();
    let mentioned: usize = themes.iter().map(|t| t.metrics.mentioned_count).sum();
    ConfidenceMetrics {
        unanimous_themes: count(themes, ConsensusType::Unanimous),
        majority_themes: count(themes, ConsensusType::Majority),
        split_themes: count(themes, ConsensusType::Split),
        single_voice_themes: count(themes, ConsensusType::Single),
        overall_agreement_rate: percent(agree, mentioned),
    }
}

fn evolution(raw: &RawClassification, themes: &[EnrichedTheme]) -> ConsensusEvolution {
    let stability = 100.0 - mean(themes.iter().map(|t| t.controversy_score), 0.0);
    ConsensusEvolution {
        pattern: raw.consensus_formation.pattern.clone(),
        description: raw.consensus_formation.description.clone(),
        stability_score: stability.round() as u32,
        emergent_themes: themes
            .iter()
            .filter(|t| t.impact_score >= EMERGENT_IMPACT && t.consensus_type != ConsensusType::Unanimous)
            .count(),
        unanimous_count: count(themes, ConsensusType::Unanimous),
        split_count: count(themes, ConsensusType::Split),
    }
}

/// First theme holding the maximum of `key` among those passing `keep`.
fn first_max<'a>(
    themes: &'a [EnrichedTheme],
    keep: impl Fn(&EnrichedTheme) -> bool,
    key: impl Fn(&EnrichedTheme) -> u32,
) -> Option<&'a EnrichedTheme> {
    themes
        .iter()
        .filter(|t| keep(t))
        .fold(None, |best: Option<&EnrichedTheme>, t| match best {
            Some(b) if key(b) >= key(t) => Some(b),
            _ => Some(t),
        })
}

fn insights(
    themes: &[EnrichedTheme],
    summary: &Summary,
    confidence: &ConfidenceMetrics,
) -> CalculatedInsights {
    let strongest_consensus = first_max(
        themes,
        |t| t.metrics.mentioned_count > 1,
        |t| t.consensus_strength_score,
    )
    .map(|t| t.theme.name.clone())
    .unwrap_or_else(|| "No clear consensus found".to_string());

    let biggest_controversy = first_max(themes, |_| true, |t| t.controversy_score)
        .map(|t| t.theme.name.clone())
        .unwrap_or_else(|| "No significant controversies".to_string());

    let model_diversity = if confidence.overall_agreement_rate >= 80 {
        "Low diversity - models largely aligned"
    } else if confidence.overall_agreement_rate >= 60 {
        "Moderate diversity - healthy disagreement"
    } else {
        "High diversity - significant differences in approach"
    };

    let consensus_quality = if summary.reliability_index >= 50 {
        "High reliability"
    } else {
        "Mixed reliability"
    };

    CalculatedInsights {
        strongest_consensus,
        biggest_controversy,
        model_diversity: model_diversity.to_string(),
        consensus_quality: consensus_quality.to_string(),
    }
}

/// Derive every metric from a canonical classification.
pub fn compute_metrics(raw: &RawClassification) -> EnrichedAnalytics {
    let themes: Vec<EnrichedTheme> = raw.themes.iter().map(score_theme).collect();
    let summary = summarize(&themes, raw.model_names().len());
    let confidence_metrics = confidence(&themes);
    let consensus_evolution = evolution(raw, &themes);
    let ai_generated_insights = insights(&themes, &summary, &confidence_metrics);

    EnrichedAnalytics {
        insights: raw.insights.clone(),
        model_behavior: raw.model_behavior.clone(),
        calculated_model_behavior: analyze_models(raw),
        themes,
        summary,
        confidence_metrics,
        consensus_evolution,
        ai_generated_insights,
    }
}
