//! Per-model profiles and pairwise relationships

use super::enriched::{
    MentionPatterns, MentionStyle, ModelBehaviorAnalysis, ModelProfile, ModelRelationship,
    RelationshipType,
};
use super::raw::{MentionType, RawClassification, Stance};
use super::theme::percent;
use std::collections::BTreeMap;

const AGREEABLE_THRESHOLD: u32 = 70;
const DIVERGENT_THRESHOLD: u32 = 40;

fn mention_style(directness: u32) -> MentionStyle {
    if directness >= 70 {
        MentionStyle::Explicit
    } else if directness >= 40 {
        MentionStyle::Balanced
    } else {
        MentionStyle::Implicit
    }
}

pub fn relationship_type(agreement_percentage: u32) -> RelationshipType {
    if agreement_percentage >= 80 {
        RelationshipType::Aligned
    } else if agreement_percentage >= 60 {
        RelationshipType::Complementary
    } else if agreement_percentage <= 40 {
        RelationshipType::Opposing
    } else {
        RelationshipType::Independent
    }
}

/// Profile a single model across every theme.
pub fn profile_model(raw: &RawClassification, model: &str) -> ModelProfile {
    let (mut mentions, mut agreements) = (0, 0);
    let (mut direct, mut indirect, mut omitted) = (0, 0, 0);

    for theme in &raw.themes {
        let stance = theme.stance_of(model);
        if stance.is_mentioned() {
            mentions += 1;
        }
        if stance == Stance::Agree {
            agreements += 1;
        }
        match theme.model_positions.get(model).and_then(|p| p.mention_type) {
            Some(MentionType::Direct) => direct += 1,
            Some(MentionType::Indirect) => indirect += 1,
            Some(MentionType::Omitted) => omitted += 1,
            None => {}
        }
    }

    let agreement_score = percent(agreements, mentions);
    let coverage_score = percent(mentions, raw.themes.len());
    let trust_score = (0.7 * agreement_score as f64 + 0.3 * coverage_score as f64).round() as u32;
    let directness_score = percent(direct, mentions).min(100);

    let behavior = raw.model_behavior.get(model);
    let response_style = behavior
        .map(|b| b.response_style.clone())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "balanced".to_string());

    ModelProfile {
        agreement_score,
        divergence_score: 100 - agreement_score,
        trust_score,
        coverage_score,
        unique_contributions: behavior.map_or(0, |b| b.unique_contributions.len()),
        response_style,
        signature_moves: behavior.map(|b| b.tendencies.clone()).unwrap_or_default(),
        mention_patterns: MentionPatterns {
            direct,
            indirect,
            omitted,
            directness_score,
            mention_style: mention_style(directness_score),
        },
    }
}

/// Agreement between two models over the themes both mentioned.
///
/// A pair with no shared theme scores 0.
pub fn relate(raw: &RawClassification, model_a: &str, model_b: &str) -> ModelRelationship {
    let (mut shared, mut same) = (0, 0);
    for theme in &raw.themes {
        let a = theme.stance_of(model_a);
        let b = theme.stance_of(model_b);
        if a.is_mentioned() && b.is_mentioned() {
            shared += 1;
            if a == b {
                same += 1;
            }
        }
    }
    let agreement_percentage = percent(same, shared);
    ModelRelationship {
        model_a: model_a.to_string(),
        model_b: model_b.to_string(),
        agreement_percentage,
        relationship_type: relationship_type(agreement_percentage),
    }
}

/// Profiles, rankings and relationships for every model in the payload.
pub fn analyze_models(raw: &RawClassification) -> ModelBehaviorAnalysis {
    let models = raw.model_names();
    if models.is_empty() {
        return ModelBehaviorAnalysis::default();
    }

    let profiles: Vec<(String, ModelProfile)> = models
        .iter()
        .map(|m| (m.clone(), profile_model(raw, m)))
        .collect();

    let mut by_agreement: Vec<&(String, ModelProfile)> = profiles.iter().collect();
    by_agreement.sort_by(|a, b| b.1.agreement_score.cmp(&a.1.agreement_score));

    let mut most_agreeable: Vec<String> = by_agreement
        .iter()
        .filter(|(_, p)| p.agreement_score >= AGREEABLE_THRESHOLD)
        .map(|(m, _)| m.clone())
        .collect();
    if most_agreeable.is_empty()
        && let Some((first, _)) = by_agreement.first()
    {
        most_agreeable.push(first.clone());
    }

    let mut most_divergent: Vec<String> = by_agreement
        .iter()
        .filter(|(_, p)| p.divergence_score >= DIVERGENT_THRESHOLD)
        .map(|(m, _)| m.clone())
        .collect();
    if most_divergent.is_empty()
        && let Some((last, _)) = by_agreement.last()
    {
        most_divergent.push(last.clone());
    }

    let mut model_relationships = Vec::new();
    for (i, a) in models.iter().enumerate() {
        for b in &models[i + 1..] {
            model_relationships.push(relate(raw, a, b));
        }
    }

    let coverage_by_model = profiles
        .iter()
        .map(|(m, p)| (m.clone(), p.coverage_score))
        .collect();
    let model_profiles: BTreeMap<String, ModelProfile> = profiles.into_iter().collect();

    ModelBehaviorAnalysis {
        most_agreeable,
        most_divergent,
        coverage_by_model,
        model_profiles,
        model_relationships,
    }
}
