//! Per-theme scoring

use super::enriched::{AgreementLevel, ConsensusType, EnrichedTheme, MentionMetrics, StanceCounts};
use super::raw::{MentionType, RawTheme, Stance};

/// `round(100 * numerator / denominator)`, 0 when the denominator is 0
pub(crate) fn percent(numerator: usize, denominator: usize) -> u32 {
    if denominator == 0 {
        return 0;
    }
    (100.0 * numerator as f64 / denominator as f64).round() as u32
}

pub fn stance_counts(theme: &RawTheme) -> StanceCounts {
    let mut counts = StanceCounts {
        total_models: theme.model_positions.len(),
        ..StanceCounts::default()
    };
    for position in theme.model_positions.values() {
        match position.stance {
            Stance::Agree => counts.agree_count += 1,
            Stance::Disagree => counts.disagree_count += 1,
            Stance::Neutral => counts.neutral_count += 1,
            Stance::NotMentioned => counts.not_mentioned_count += 1,
        }
    }
    counts.mentioned_count = counts.total_models - counts.not_mentioned_count;
    counts
}

/// Classify the voting pattern.
///
/// Majority compares against half of *all* recorded models, not half of the
/// mentioning ones, so themes many models skipped rarely reach majority.
pub fn consensus_type(counts: &StanceCounts) -> ConsensusType {
    let agree = counts.agree_count;
    let disagree = counts.disagree_count;
    let mentioned = counts.mentioned_count;

    // A theme no model addressed has no consensus, not a vacuous unanimity.
    if mentioned > 0 && agree == mentioned {
        ConsensusType::Unanimous
    } else if agree > disagree && agree as f64 > counts.total_models as f64 / 2.0 {
        ConsensusType::Majority
    } else if agree == disagree && agree > 0 {
        ConsensusType::Split
    } else if mentioned == 1 {
        ConsensusType::Single
    } else {
        ConsensusType::None
    }
}

pub fn agreement_level(counts: &StanceCounts) -> AgreementLevel {
    let ratio = if counts.mentioned_count > 0 {
        counts.agree_count as f64 / counts.mentioned_count as f64
    } else {
        0.0
    };
    if ratio >= 1.0 {
        AgreementLevel::Unanimous
    } else if ratio >= 0.75 {
        AgreementLevel::Strong
    } else if ratio >= 0.5 {
        AgreementLevel::Moderate
    } else if ratio > 0.0 {
        AgreementLevel::Weak
    } else {
        AgreementLevel::Single
    }
}

/// Importance base scaled by the mentioned share, clamped to 1..=10
pub fn impact_score(theme: &RawTheme, counts: &StanceCounts) -> u32 {
    let share = if counts.total_models > 0 {
        counts.mentioned_count as f64 / counts.total_models as f64
    } else {
        0.0
    };
    ((theme.importance.base_impact() * share).round() as u32).clamp(1, 10)
}

pub fn mention_metrics(theme: &RawTheme) -> MentionMetrics {
    let total = theme.model_positions.len();
    let (mut direct, mut indirect, mut omitted) = (0, 0, 0);
    for position in theme.model_positions.values() {
        match position.mention_type {
            Some(MentionType::Direct) => direct += 1,
            Some(MentionType::Indirect) => indirect += 1,
            Some(MentionType::Omitted) => omitted += 1,
            None => {}
        }
    }
    let addressed = direct + indirect;
    MentionMetrics {
        direct,
        indirect,
        omitted,
        coverage_score: percent(addressed, total),
        clarity_score: percent(direct, addressed),
        coverage_label: format!("{}/{} models addressed", addressed, total),
    }
}

/// Enrich one theme with every derived field.
pub fn score_theme(theme: &RawTheme) -> EnrichedTheme {
    let counts = stance_counts(theme);
    let supporting_outputs = theme
        .model_positions
        .iter()
        .filter(|(_, p)| p.stance == Stance::Agree)
        .map(|(model, _)| model.clone())
        .collect();

    EnrichedTheme {
        consensus_type: consensus_type(&counts),
        agreement_level: agreement_level(&counts),
        consensus_strength_score: percent(counts.agree_count, counts.mentioned_count),
        controversy_score: percent(counts.disagree_count, counts.mentioned_count),
        impact_score: impact_score(theme, &counts),
        supporting_outputs,
        mention_metrics: mention_metrics(theme),
        metrics: counts,
        theme: theme.clone(),
    }
}
