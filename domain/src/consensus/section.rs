//! Consensus section schema
//!
//! The section markers are the contract between the consensus prompt
//! template and the extractor: the template must contain every
//! `## NAME_START` / `## NAME_END` pair, and each turn's response is scanned
//! for the pair belonging to that turn. Adding a section means adding a
//! variant here and nothing else.

use serde::{Deserialize, Serialize};

/// Version of the marker schema shared by templates and the extractor
pub const MARKER_SCHEMA_VERSION: u32 = 1;

/// One of the fixed, ordered sections of a consensus document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConsensusSection {
    ComparisonTable,
    ConsensusSummary,
    MentionQuality,
    VotingSummary,
    Disagreements,
    Synthesis,
}

impl ConsensusSection {
    /// All sections in conversation order
    pub const ALL: [ConsensusSection; 6] = [
        ConsensusSection::ComparisonTable,
        ConsensusSection::ConsensusSummary,
        ConsensusSection::MentionQuality,
        ConsensusSection::VotingSummary,
        ConsensusSection::Disagreements,
        ConsensusSection::Synthesis,
    ];

    /// camelCase key used when notifying collaborators
    pub fn key(&self) -> &'static str {
        match self {
            ConsensusSection::ComparisonTable => "comparisonTable",
            ConsensusSection::ConsensusSummary => "consensusSummary",
            ConsensusSection::MentionQuality => "mentionQuality",
            ConsensusSection::VotingSummary => "votingSummary",
            ConsensusSection::Disagreements => "disagreements",
            ConsensusSection::Synthesis => "synthesis",
        }
    }

    /// Marker stem, e.g. `COMPARISON_TABLE`
    pub fn marker_name(&self) -> &'static str {
        match self {
            ConsensusSection::ComparisonTable => "COMPARISON_TABLE",
            ConsensusSection::ConsensusSummary => "CONSENSUS_SUMMARY",
            ConsensusSection::MentionQuality => "MENTION_QUALITY",
            ConsensusSection::VotingSummary => "VOTING_SUMMARY",
            ConsensusSection::Disagreements => "DISAGREEMENTS",
            ConsensusSection::Synthesis => "SYNTHESIS",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ConsensusSection::ComparisonTable => "Comparison Table",
            ConsensusSection::ConsensusSummary => "Consensus Summary",
            ConsensusSection::MentionQuality => "Mention Quality",
            ConsensusSection::VotingSummary => "Voting Summary",
            ConsensusSection::Disagreements => "Disagreements",
            ConsensusSection::Synthesis => "Synthesis",
        }
    }

    pub fn start_marker(&self) -> String {
        format!("## {}_START", self.marker_name())
    }

    pub fn end_marker(&self) -> String {
        format!("## {}_END", self.marker_name())
    }

    /// Position in the conversation (0-based)
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn first() -> Self {
        ConsensusSection::ComparisonTable
    }

    pub fn next(&self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// User-turn instruction that asks for this section.
    ///
    /// The first section is requested by the initial prompt itself, so its
    /// instruction is the step-by-step notice appended to that prompt.
    pub fn instruction(&self) -> &'static str {
        match self {
            ConsensusSection::ComparisonTable => {
                "**IMPORTANT: You will generate this analysis in steps. First, output ONLY the comparison table section (COMPARISON_TABLE_START to COMPARISON_TABLE_END). After I confirm receipt, I will ask you to continue with the next section. Do not output multiple sections in one response.**"
            }
            ConsensusSection::ConsensusSummary => {
                "Now output the consensus summary section (CONSENSUS_SUMMARY_START to CONSENSUS_SUMMARY_END)."
            }
            ConsensusSection::MentionQuality => {
                "Now output the mention quality analysis section (MENTION_QUALITY_START to MENTION_QUALITY_END). For each theme, analyze whether each model addressed it directly (with explicit language), indirectly (implied or alluded to), or omitted it entirely. Include coverage percentages and insights about engagement patterns."
            }
            ConsensusSection::VotingSummary => {
                "Now output the voting summary section (VOTING_SUMMARY_START to VOTING_SUMMARY_END)."
            }
            ConsensusSection::Disagreements => {
                "Now output the disagreements section (DISAGREEMENTS_START to DISAGREEMENTS_END)."
            }
            ConsensusSection::Synthesis => {
                "Finally, output the synthesis section (SYNTHESIS_START to SYNTHESIS_END)."
            }
        }
    }

    /// Extract this section's body from a model response.
    ///
    /// Marker matching is case-insensitive and takes the first end marker
    /// after the start marker. Without both markers the whole trimmed
    /// response is returned and `marker_found` is false.
    pub fn extract(&self, response: &str) -> SectionExtract {
        match find_between(response, &self.start_marker(), &self.end_marker()) {
            Some(body) => SectionExtract {
                text: body.trim().to_string(),
                marker_found: true,
            },
            None => SectionExtract {
                text: response.trim().to_string(),
                marker_found: false,
            },
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }
}

impl std::fmt::Display for ConsensusSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.marker_name())
    }
}

/// Result of scanning a response for a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionExtract {
    pub text: String,
    pub marker_found: bool,
}

/// Case-insensitive search for the text between `start` and `end`.
///
/// Markers are ASCII, so lowercasing ASCII keeps byte offsets aligned with
/// the original text.
fn find_between<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let haystack = text.to_ascii_lowercase();
    let start = start.to_ascii_lowercase();
    let end = end.to_ascii_lowercase();

    let body_start = haystack.find(&start)? + start.len();
    let body_len = haystack[body_start..].find(&end)?;
    Some(&text[body_start..body_start + body_len])
}

/// Replace the first `start ... end` block (markers included) in `text`.
///
/// Returns the text unchanged when the block is absent.
pub fn replace_block(text: &str, section: ConsensusSection, body: &str) -> String {
    let start = section.start_marker();
    let end = section.end_marker();
    let Some(block_start) = text.find(&start) else {
        return text.to_string();
    };
    let Some(end_offset) = text[block_start..].find(&end) else {
        return text.to_string();
    };
    let block_end = block_start + end_offset + end.len();

    let mut out = String::with_capacity(text.len() + body.len());
    out.push_str(&text[..block_start]);
    out.push_str(&start);
    out.push('\n');
    out.push_str(body);
    out.push('\n');
    out.push_str(&end);
    out.push_str(&text[block_end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_order() {
        assert_eq!(ConsensusSection::first(), ConsensusSection::ComparisonTable);
        assert_eq!(
            ConsensusSection::ComparisonTable.next(),
            Some(ConsensusSection::ConsensusSummary)
        );
        assert_eq!(ConsensusSection::Synthesis.next(), None);
        assert_eq!(ConsensusSection::MentionQuality.index(), 2);
        assert!(ConsensusSection::ComparisonTable < ConsensusSection::Synthesis);
    }

    #[test]
    fn test_markers() {
        let section = ConsensusSection::VotingSummary;
        assert_eq!(section.start_marker(), "## VOTING_SUMMARY_START");
        assert_eq!(section.end_marker(), "## VOTING_SUMMARY_END");
        assert_eq!(section.key(), "votingSummary");
        assert_eq!(ConsensusSection::from_key("votingSummary"), Some(section));
    }

    #[test]
    fn test_extract_with_markers() {
        let response = "preamble\n## SYNTHESIS_START\n\n  The answer.  \n## SYNTHESIS_END\ntrailer";
        let extract = ConsensusSection::Synthesis.extract(response);
        assert!(extract.marker_found);
        assert_eq!(extract.text, "The answer.");
    }

    #[test]
    fn test_extract_case_insensitive() {
        let response = "## synthesis_start\nbody\n## Synthesis_End";
        let extract = ConsensusSection::Synthesis.extract(response);
        assert!(extract.marker_found);
        assert_eq!(extract.text, "body");
    }

    #[test]
    fn test_extract_falls_back_to_whole_response() {
        let response = "  | a | b |\n|---|---|  ";
        let extract = ConsensusSection::ComparisonTable.extract(response);
        assert!(!extract.marker_found);
        assert_eq!(extract.text, "| a | b |\n|---|---|");
    }

    #[test]
    fn test_extract_missing_end_marker() {
        let response = "## DISAGREEMENTS_START\nunterminated";
        let extract = ConsensusSection::Disagreements.extract(response);
        assert!(!extract.marker_found);
        assert_eq!(extract.text, response);
    }

    #[test]
    fn test_extract_uses_first_end_marker() {
        let response = "## DISAGREEMENTS_START\none\n## DISAGREEMENTS_END\n## DISAGREEMENTS_END";
        let extract = ConsensusSection::Disagreements.extract(response);
        assert_eq!(extract.text, "one");
    }

    #[test]
    fn test_replace_block() {
        let text = "head\n## VOTING_SUMMARY_START\nold\n## VOTING_SUMMARY_END\ntail";
        let replaced = replace_block(text, ConsensusSection::VotingSummary, "new");
        assert_eq!(
            replaced,
            "head\n## VOTING_SUMMARY_START\nnew\n## VOTING_SUMMARY_END\ntail"
        );
    }

    #[test]
    fn test_replace_block_absent() {
        let text = "no markers here";
        assert_eq!(
            replace_block(text, ConsensusSection::Synthesis, "x"),
            "no markers here"
        );
    }
}
