//! Console output formatter for consensus runs

use colored::Colorize;
use polyllm_domain::{
    CodenameMapping, ConsensusSection, EnrichedAnalytics, EnrichedTheme, ModelCatalog,
    ModelDescriptor, QueryResult, SectionResult,
};
use serde::Serialize;

/// Formats pipeline results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Banner printed before the fan-out
    pub fn format_header(prompt: &str, models: &[ModelDescriptor]) -> String {
        let names: Vec<&str> = models.iter().map(|m| m.display_name.as_str()).collect();
        format!(
            "{}\n\n{} {}\n{} {}\n",
            Self::header("PolyLLM Consensus"),
            "Prompt:".cyan().bold(),
            prompt,
            "Models:".cyan().bold(),
            names.join(", ")
        )
    }

    /// One model's answer from the fan-out
    pub fn format_result(result: &QueryResult) -> String {
        if result.is_success() {
            format!(
                "\n{}\n{}\n",
                format!("── {} ──", result.model.display_name).yellow().bold(),
                result.response.trim_end()
            )
        } else {
            format!(
                "\n{}\nError: {}\n",
                format!("── {} ──", result.model.display_name).red().bold(),
                result.error_message().unwrap_or("Unknown")
            )
        }
    }

    /// A completed consensus section, with real model names
    pub fn format_section(section: &SectionResult) -> String {
        let mut output = Self::section_header(section.section.title());
        if !section.marker_found {
            output.push_str(&format!(
                "{}\n",
                "(section markers missing, showing the whole response)".dimmed()
            ));
        }
        output.push_str(section.display.trim());
        output.push('\n');
        output
    }

    /// Everything the analytics carry, for `--output full`
    pub fn format_analytics(analytics: &EnrichedAnalytics, prompt: &str) -> String {
        let mut output = Self::header("Agreement Analytics");
        output.push('\n');
        if !prompt.is_empty() {
            output.push_str(&format!("{} {}\n", "Prompt:".cyan().bold(), prompt));
        }
        output.push_str(&Self::summary_block(analytics));

        output.push_str(&Self::section_header("Themes"));
        if analytics.themes.is_empty() {
            output.push_str("No themes were identified.\n");
        }
        for theme in &analytics.themes {
            output.push_str(&Self::format_theme(theme));
        }

        let confidence = &analytics.confidence_metrics;
        output.push_str(&Self::section_header("Confidence"));
        output.push_str(&format!(
            "Unanimous {} · Majority {} · Split {} · Single voice {}\n",
            confidence.unanimous_themes,
            confidence.majority_themes,
            confidence.split_themes,
            confidence.single_voice_themes
        ));
        output.push_str(&format!(
            "Overall agreement rate: {}%\n",
            confidence.overall_agreement_rate
        ));

        let evolution = &analytics.consensus_evolution;
        output.push_str(&Self::section_header("Consensus Evolution"));
        if !evolution.pattern.is_empty() {
            output.push_str(&format!("Pattern: {}\n", evolution.pattern));
        }
        if !evolution.description.is_empty() {
            output.push_str(&format!("{}\n", evolution.description));
        }
        output.push_str(&format!(
            "Stability {} · Emergent themes {} · Unanimous {} · Split {}\n",
            evolution.stability_score,
            evolution.emergent_themes,
            evolution.unanimous_count,
            evolution.split_count
        ));

        output.push_str(&Self::format_model_behavior(analytics));
        output.push_str(&Self::format_insights(analytics));
        output.push_str(&Self::footer());
        output
    }

    /// Headline numbers and insights, for `--output synthesis`
    pub fn format_analytics_summary(analytics: &EnrichedAnalytics) -> String {
        let mut output = Self::section_header("Agreement Summary");
        output.push_str(&Self::summary_block(analytics));
        for theme in &analytics.themes {
            output.push_str(&format!(
                "  {} {} ({}, {})\n",
                Self::theme_bullet(theme),
                theme.theme.name,
                label(&theme.consensus_type),
                theme.mention_metrics.coverage_label
            ));
        }
        output.push_str(&Self::format_insights(analytics));
        output
    }

    /// Format analytics as JSON
    pub fn format_analytics_json(analytics: &EnrichedAnalytics) -> String {
        serde_json::to_string_pretty(analytics).unwrap_or_else(|_| "{}".to_string())
    }

    /// Catalog listing with the codename each model would receive
    pub fn format_models(catalog: &ModelCatalog) -> String {
        let mut output = Self::section_header("Model Catalog");
        let mapping = CodenameMapping::assign(catalog.models()).ok();
        for model in catalog.models() {
            let codename = mapping
                .as_ref()
                .and_then(|m| m.codename_for(&model.id))
                .unwrap_or("-");
            output.push_str(&format!(
                "  {:<8} {:<28} {:<44} {:>7}\n",
                codename,
                model.display_name,
                model.id.dimmed(),
                model.max_output_tokens
            ));
        }
        output.push_str(&format!(
            "\n{} {}\n{} {}\n",
            "Consensus default:".cyan(),
            ModelCatalog::DEFAULT_CONSENSUS_MODEL,
            "Conversion default:".cyan(),
            ModelCatalog::DEFAULT_CONVERSION_MODEL
        ));
        output
    }

    /// Status line for a section that is about to be requested
    pub fn format_turn_start(section: ConsensusSection) -> String {
        format!(
            "Turn {}/{}: {}",
            section.index() + 1,
            ConsensusSection::ALL.len(),
            section.title()
        )
    }

    fn summary_block(analytics: &EnrichedAnalytics) -> String {
        let summary = &analytics.summary;
        let strength = label(&summary.consensus_strength);
        let strength = match strength.as_str() {
            "strong" => strength.green().bold(),
            "moderate" => strength.yellow().bold(),
            _ => strength.red().bold(),
        };
        format!(
            "{} {} ({}/100) · {} themes · {} controversial · reliability {}% · {} models\n",
            "Consensus:".cyan().bold(),
            strength,
            summary.consensus_score,
            summary.total_themes,
            summary.controversy_count,
            summary.reliability_index,
            summary.total_models
        )
    }

    fn theme_bullet(theme: &EnrichedTheme) -> colored::ColoredString {
        match label(&theme.consensus_type).as_str() {
            "unanimous" => "●".green(),
            "majority" => "●".cyan(),
            "split" => "●".red(),
            _ => "○".dimmed(),
        }
    }

    fn format_theme(theme: &EnrichedTheme) -> String {
        let counts = &theme.metrics;
        let mut output = format!(
            "\n{} {} [{} importance]\n",
            Self::theme_bullet(theme),
            theme.theme.name.bold(),
            label(&theme.theme.importance)
        );
        if !theme.theme.statement.is_empty() {
            output.push_str(&format!("  {}\n", theme.theme.statement));
        }
        output.push_str(&format!(
            "  {} / {} agreement · strength {} · controversy {} · impact {}\n",
            label(&theme.consensus_type),
            label(&theme.agreement_level),
            theme.consensus_strength_score,
            theme.controversy_score,
            theme.impact_score
        ));
        output.push_str(&format!(
            "  agree {} · disagree {} · neutral {} · silent {} · {}\n",
            counts.agree_count,
            counts.disagree_count,
            counts.neutral_count,
            counts.not_mentioned_count,
            theme.mention_metrics.coverage_label
        ));
        if !theme.supporting_outputs.is_empty() {
            output.push_str(&format!(
                "  {} {}\n",
                "supported by".dimmed(),
                theme.supporting_outputs.join(", ")
            ));
        }
        output
    }

    fn format_model_behavior(analytics: &EnrichedAnalytics) -> String {
        let behavior = &analytics.calculated_model_behavior;
        let mut output = Self::section_header("Model Behavior");
        if behavior.model_profiles.is_empty() {
            output.push_str("No model positions were reported.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<28} {:>6} {:>6} {:>6} {:>6}  {}\n",
            "Model", "agree", "trust", "cover", "direct", "style"
        ));
        for (name, profile) in &behavior.model_profiles {
            output.push_str(&format!(
                "{:<28} {:>5}% {:>6} {:>5}% {:>5}%  {} / {}\n",
                name,
                profile.agreement_score,
                profile.trust_score,
                profile.coverage_score,
                profile.mention_patterns.directness_score,
                profile.response_style,
                label(&profile.mention_patterns.mention_style)
            ));
        }

        output.push_str(&format!(
            "\nMost agreeable: {}\nMost divergent: {}\n",
            behavior.most_agreeable.join(", "),
            behavior.most_divergent.join(", ")
        ));

        for relationship in &behavior.model_relationships {
            output.push_str(&format!(
                "  {} ↔ {}: {}% ({})\n",
                relationship.model_a,
                relationship.model_b,
                relationship.agreement_percentage,
                label(&relationship.relationship_type)
            ));
        }
        output
    }

    fn format_insights(analytics: &EnrichedAnalytics) -> String {
        let insights = &analytics.insights;
        let calculated = &analytics.ai_generated_insights;
        let mut output = Self::section_header("Insights");

        if !insights.main_conclusion.is_empty() {
            output.push_str(&format!("{}\n", insights.main_conclusion));
        }
        for finding in &insights.key_findings {
            output.push_str(&format!("  * {}\n", finding));
        }
        for (title, text) in [
            ("Surprising patterns", &insights.surprising_patterns),
            ("Practical implications", &insights.practical_implications),
        ] {
            if !text.is_empty() {
                output.push_str(&format!("{} {}\n", format!("{}:", title).cyan(), text));
            }
        }

        output.push_str(&format!(
            "{} {}\n{} {}\n{} {}\n{} {}\n",
            "Strongest consensus:".green(),
            calculated.strongest_consensus,
            "Biggest controversy:".yellow(),
            calculated.biggest_controversy,
            "Model diversity:".cyan(),
            calculated.model_diversity,
            "Consensus quality:".cyan(),
            calculated.consensus_quality
        ));
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

/// Lowercase wire label of a unit enum
fn label<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}
