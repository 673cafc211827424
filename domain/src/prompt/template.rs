//! Consensus prompt template
//!
//! Placeholders understood by [`ConsensusPromptTemplate::build`]:
//!
//! | Placeholder | Replaced with |
//! |-------------|---------------|
//! | `[NUMBER]` | number of successful model outputs |
//! | `%%USER_PROMPT%%` | the user's original prompt |
//! | `__MODEL_OUTPUT_BLOCK_GOES_HERE__` | one codename-delimited block per output |
//!
//! The comparison-table, voting-summary and disagreements blocks are
//! rewritten with examples that use the run's real codenames.

use crate::consensus::section::{ConsensusSection, replace_block};

pub const NUMBER_PLACEHOLDER: &str = "[NUMBER]";
pub const USER_PROMPT_PLACEHOLDER: &str = "%%USER_PROMPT%%";
pub const MODEL_OUTPUT_PLACEHOLDER: &str = "__MODEL_OUTPUT_BLOCK_GOES_HERE__";

const DEFAULT_TEMPLATE: &str = r#"You are a meticulous AI Analyst and Synthesizer. Your task is to analyze, compare, and synthesize information from [NUMBER] different AI-generated outputs, which were all responses to the exact same initial prompt. Your goal is to identify areas of consensus, disagreement, and omission, and use this information to present a unified understanding.

You will analyze these outputs to:
1. Identify key themes and categories addressed across all outputs
2. Compare what each output said (or didn't say) about each theme
3. Determine consensus through majority agreement or sole substantive information, making sure to note when themes are merely omitted instead of disagreed with
4. Synthesize the consensus into a single output that is compatible with the original prompt

The original prompt that all models responded to:

## ORIGINAL_PROMPT_START
%%USER_PROMPT%%
## ORIGINAL_PROMPT_END

The following [NUMBER] outputs were generated in response to that prompt:

__MODEL_OUTPUT_BLOCK_GOES_HERE__

To analyze consensus, you'll use two classification systems:

**Consensus Type** (for the comparison table) - Describes the voting pattern:
- Unanimous: All outputs that address the theme agree
- Majority: More outputs agree than disagree (don't count "not addressed")
- Split: Equal numbers agree and disagree
- Single voice: Only one output addresses this theme
- No consensus: Outputs have incompatible positions
- For each output be sure to use the table to include key information and notes, detailing what each output did or didn't have to say about that particular theme.

**Agreement Level** (for the consensus summary) - Describes the strength of consensus:
- Unanimous: All outputs agree
- Strong: Most outputs agree, few or no disagreements
- Moderate: More agree than disagree
- Weak: Barely more agreement than disagreement
- Single: Only one output addressed this

Important guidelines:
- Be objective and base your analysis strictly on the provided text
- List supporting outputs by name without counting
- Identify ALL significant themes across outputs, not just the ones in examples
- Use clear, descriptive names for themes based on their actual content
- Do not introduce information not present in the outputs

**CRITICAL FORMATTING INSTRUCTIONS:**
You MUST produce your response using EXACTLY the section markers shown below. Include ALL sections in the exact order shown. Use the exact section markers (## SECTION_NAME_START and ## SECTION_NAME_END) with no modifications. Do not add any text outside of these sections.

Your response must contain these exact sections in this exact order:

## COMPARISON_TABLE_START
| Theme/Category | Output 1 | Output 2 | Output 3 | Consensus Type |
|----------------|----------|----------|----------|----------------|
## COMPARISON_TABLE_END

## CONSENSUS_SUMMARY_START
| Theme/Category | Consensus Statement | Agreement Level | Supporting Outputs |
|----------------|-------------------|-----------------|-------------------|
## CONSENSUS_SUMMARY_END

## MENTION_QUALITY_START
### Mention Quality Analysis

For each theme, categorize how models addressed it:
- Direct: Model explicitly discusses the theme with clear, specific language
- Indirect: Model implies or alludes to the theme without explicit statement
- Omitted: Model doesn't address the theme at all

**Theme: [Theme Name]**
- **Direct mentions:** Output 1, Output 2 (explicitly discussed with specific language)
- **Indirect mentions:** Output 3 (implied or alluded to without explicit statement)
- **Omitted:** Output 4, Output 5 (theme not addressed at all)
- **Coverage:** 3/5 models addressed (60% - 2 direct, 1 indirect)
- **Insight:** Most models directly addressed this theme, showing strong engagement

[Continue for each theme...]
## MENTION_QUALITY_END

## VOTING_SUMMARY_START
Theme: Theme 1
Agreed: Output 1, Output 2
Disagreed: Output 3
Not addressed: None
Type: Majority consensus
## VOTING_SUMMARY_END

## DISAGREEMENTS_START
Theme: Theme 1
Output 1 position: [stance]
Output 3 position: [different stance]
Significance: This disagreement matters because [reason]
## DISAGREEMENTS_END

## SYNTHESIS_START
[Based on the original prompt and the consensus established above, write a comprehensive response that directly answers the original question. Use the consensus positions for each theme. However, be sure to incorporate all new themes, details, insights, ideas, and content from each output into this singular unified version. Never acknowledge within this synthesis that the synthesis itself is a result of this process. Match the collective average tone and style of the original outputs.]
## SYNTHESIS_END

Remember: Use ONLY these section markers. Include ALL sections. Add NO text outside the sections."#;

/// One successful model output, identified only by its codename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOutput {
    pub codename: String,
    pub response: String,
}

impl ModelOutput {
    pub fn new(codename: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            codename: codename.into(),
            response: response.into(),
        }
    }
}

/// Template for the initial consensus prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsensusPromptTemplate {
    text: String,
}

impl ConsensusPromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn builtin() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Placeholders and section markers the template lacks.
    ///
    /// An empty list means the template satisfies the marker schema.
    pub fn missing_markers(&self) -> Vec<String> {
        let mut required: Vec<String> = [
            NUMBER_PLACEHOLDER,
            USER_PROMPT_PLACEHOLDER,
            MODEL_OUTPUT_PLACEHOLDER,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        for section in ConsensusSection::ALL {
            required.push(section.start_marker());
            required.push(section.end_marker());
        }
        required
            .into_iter()
            .filter(|marker| !self.text.contains(marker.as_str()))
            .collect()
    }

    /// Fill the template for one consensus run.
    pub fn build(&self, user_prompt: &str, outputs: &[ModelOutput]) -> String {
        let codes: Vec<&str> = outputs.iter().map(|o| o.codename.as_str()).collect();

        let mut prompt = self
            .text
            .replace(NUMBER_PLACEHOLDER, &outputs.len().to_string());
        prompt = replace_block(
            &prompt,
            ConsensusSection::ComparisonTable,
            &comparison_table(&codes),
        );
        prompt = replace_block(
            &prompt,
            ConsensusSection::VotingSummary,
            &voting_examples(&codes),
        );
        prompt = replace_block(
            &prompt,
            ConsensusSection::Disagreements,
            &disagreement_example(&codes),
        );
        // User and model text go in last so marker text inside them is never rewritten.
        prompt = prompt.replacen(USER_PROMPT_PLACEHOLDER, user_prompt, 1);
        prompt.replacen(MODEL_OUTPUT_PLACEHOLDER, &output_block(outputs), 1)
    }

    /// Initial consensus prompt with the step-by-step notice appended
    pub fn build_first_turn(&self, user_prompt: &str, outputs: &[ModelOutput]) -> String {
        format!(
            "{}\n\n{}",
            self.build(user_prompt, outputs),
            ConsensusSection::first().instruction()
        )
    }
}

impl Default for ConsensusPromptTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}

fn comparison_table(codes: &[&str]) -> String {
    let header = format!("| Theme/Category | {} | Consensus Type |", codes.join(" | "));
    let columns = codes
        .iter()
        .map(|_| "-".repeat(9))
        .collect::<Vec<_>>()
        .join("|");
    let separator = format!("|{}|{}|{}|", "-".repeat(16), columns, "-".repeat(16));
    format!("{}\n{}", header, separator)
}

/// `ceil(n * numerator / 5)` without floating point
fn ceil_fifths(n: usize, numerator: usize) -> usize {
    (n * numerator).div_ceil(5)
}

fn join_or(codes: &[&str], fallback: &str) -> String {
    if codes.is_empty() {
        fallback.to_string()
    } else {
        codes.join(", ")
    }
}

fn voting_examples(codes: &[&str]) -> String {
    let agreed_end = ceil_fifths(codes.len(), 3);
    let disagreed_end = ceil_fifths(codes.len(), 4).max(agreed_end);

    format!(
        "**Theme: [Your Theme Name Here]**\n\
         - **Agreed:** {}\n\
         - **Disagreed:** {}\n\
         - **Not addressed:** {}\n\
         - **Type:** [Unanimous/Majority/Split/Single voice]\n\
         \n\
         **Theme: [Another Theme]**\n\
         - **Agreed:** {}\n\
         - **Disagreed:** None\n\
         - **Not addressed:** None\n\
         - **Type:** Unanimous consensus",
        join_or(&codes[..agreed_end], "[List models that agree]"),
        join_or(&codes[agreed_end..disagreed_end], "None"),
        join_or(&codes[disagreed_end..], "None"),
        codes.join(", "),
    )
}

fn disagreement_example(codes: &[&str]) -> String {
    format!(
        "### **Theme: [Theme Name]**\n\
         - **{} position:** [their stance]\n\
         - **{} position:** [different stance]\n\
         - **Significance:** This disagreement matters because [reason]",
        codes.first().copied().unwrap_or("llm-X"),
        codes.get(1).copied().unwrap_or("llm-Y"),
    )
}

fn output_block(outputs: &[ModelOutput]) -> String {
    let mut block = String::new();
    for output in outputs {
        let code = output.codename.to_uppercase();
        block.push_str(&format!("\n## {}_OUTPUT_START\n", code));
        block.push_str(&format!("**Response:**\n{}\n", output.response));
        block.push_str(&format!("## {}_OUTPUT_END\n", code));
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs() -> Vec<ModelOutput> {
        vec![
            ModelOutput::new("llm-!", "Answer one"),
            ModelOutput::new("llm-*", "Answer two"),
            ModelOutput::new("llm-%", "Answer three"),
        ]
    }

    #[test]
    fn test_builtin_template_has_all_markers() {
        assert!(ConsensusPromptTemplate::builtin().missing_markers().is_empty());
    }

    #[test]
    fn test_missing_markers_reported() {
        let template = ConsensusPromptTemplate::new("[NUMBER] %%USER_PROMPT%%");
        let missing = template.missing_markers();
        assert!(missing.contains(&MODEL_OUTPUT_PLACEHOLDER.to_string()));
        assert!(missing.contains(&"## SYNTHESIS_END".to_string()));
        assert!(!missing.contains(&NUMBER_PLACEHOLDER.to_string()));
    }

    #[test]
    fn test_build_replaces_placeholders() {
        let prompt = ConsensusPromptTemplate::builtin().build("What is Rust?", &outputs());
        assert!(prompt.contains("information from 3 different AI-generated outputs"));
        assert!(prompt.contains("## ORIGINAL_PROMPT_START\nWhat is Rust?\n## ORIGINAL_PROMPT_END"));
        assert!(!prompt.contains(NUMBER_PLACEHOLDER));
        assert!(!prompt.contains(MODEL_OUTPUT_PLACEHOLDER));
    }

    #[test]
    fn test_build_comparison_table() {
        let prompt = ConsensusPromptTemplate::builtin().build("q", &outputs());
        let expected = format!(
            "## COMPARISON_TABLE_START\n| Theme/Category | llm-! | llm-* | llm-% | Consensus Type |\n|{}|{}|{}|{}|{}|\n## COMPARISON_TABLE_END",
            "-".repeat(16),
            "-".repeat(9),
            "-".repeat(9),
            "-".repeat(9),
            "-".repeat(16)
        );
        assert!(prompt.contains(&expected));
    }

    #[test]
    fn test_build_output_block_uses_codenames_only() {
        let prompt = ConsensusPromptTemplate::builtin().build("q", &outputs());
        assert!(prompt.contains("\n## LLM-!_OUTPUT_START\n**Response:**\nAnswer one\n## LLM-!_OUTPUT_END\n"));
        assert!(prompt.contains("## LLM-%_OUTPUT_START"));
    }

    #[test]
    fn test_voting_examples_split_codes() {
        let codes = ["a", "b", "c", "d", "e"];
        let text = voting_examples(&codes);
        assert!(text.contains("- **Agreed:** a, b, c\n"));
        assert!(text.contains("- **Disagreed:** d\n"));
        assert!(text.contains("- **Not addressed:** e\n"));
    }

    #[test]
    fn test_voting_examples_single_code() {
        let text = voting_examples(&["a"]);
        assert!(text.contains("- **Agreed:** a\n"));
        assert!(text.contains("- **Disagreed:** None\n"));
    }

    #[test]
    fn test_disagreement_example_fallback_codes() {
        let text = disagreement_example(&["llm-!"]);
        assert!(text.contains("**llm-! position:**"));
        assert!(text.contains("**llm-Y position:**"));
    }

    #[test]
    fn test_first_turn_appends_step_notice() {
        let prompt = ConsensusPromptTemplate::builtin().build_first_turn("q", &outputs());
        assert!(prompt.ends_with(ConsensusSection::ComparisonTable.instruction()));
    }

    #[test]
    fn test_user_prompt_with_number_placeholder_is_not_rewritten() {
        let prompt = ConsensusPromptTemplate::builtin().build("Explain [NUMBER]", &outputs());
        assert!(prompt.contains("Explain [NUMBER]"));
    }
}
