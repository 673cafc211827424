//! Consensus document accumulated turn by turn

use super::codename::CodenameMapping;
use super::section::ConsensusSection;
use serde::{Deserialize, Serialize};

/// One completed consensus section (immutable once recorded)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionResult {
    pub section: ConsensusSection,
    /// Extracted text, codenames intact
    pub raw: String,
    /// Extracted text with codenames replaced by real names
    pub display: String,
    /// False when the markers were missing and the whole response was used
    pub marker_found: bool,
}

/// The ordered sections produced by one consensus run
///
/// Sections can only be appended in [`ConsensusSection::ALL`] order, so a
/// document is always a prefix of the full section sequence. The full text
/// is the concatenation of every raw turn response, each followed by a blank
/// line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusDocument {
    prompt: String,
    mapping: CodenameMapping,
    sections: Vec<SectionResult>,
    full_text: String,
}

impl ConsensusDocument {
    /// Start an empty document for the given initial consensus prompt.
    pub fn new(prompt: impl Into<String>, mapping: CodenameMapping) -> Self {
        Self {
            prompt: prompt.into(),
            mapping,
            sections: Vec::new(),
            full_text: String::new(),
        }
    }

    /// The initial consensus prompt (template already filled)
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn mapping(&self) -> &CodenameMapping {
        &self.mapping
    }

    pub fn sections(&self) -> &[SectionResult] {
        &self.sections
    }

    pub fn section(&self, section: ConsensusSection) -> Option<&SectionResult> {
        self.sections.iter().find(|s| s.section == section)
    }

    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// The section the next turn must produce, or `None` when complete
    pub fn next_section(&self) -> Option<ConsensusSection> {
        ConsensusSection::ALL.get(self.sections.len()).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.next_section().is_none()
    }

    /// Record the raw response of the next turn.
    ///
    /// Returns the new section, or `None` when the document is already
    /// complete.
    pub fn record_turn(&mut self, response: &str) -> Option<&SectionResult> {
        let section = self.next_section()?;
        let extract = section.extract(response);
        let display = self.mapping.reveal(&extract.text);

        self.full_text.push_str(response);
        self.full_text.push_str("\n\n");
        self.sections.push(SectionResult {
            section,
            raw: extract.text,
            display,
            marker_found: extract.marker_found,
        });
        self.sections.last()
    }

    /// Full text with codenames replaced by real names
    pub fn revealed_text(&self) -> String {
        self.mapping.reveal(&self.full_text)
    }
}
