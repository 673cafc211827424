//! Domain layer for polyllm
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Consensus
//!
//! Several models answer the same prompt independently. A designated
//! consensus model then reads their anonymized answers and writes a
//! structured consensus document, one [`ConsensusSection`] per turn.
//!
//! ## Analytics
//!
//! A conversion model classifies the consensus document into themes and
//! per-model stances. [`extract_json`] recovers the payload from free text,
//! [`parse_classification`] validates and normalizes it, and
//! [`compute_metrics`] derives every score.

pub mod analytics;
pub mod config;
pub mod consensus;
pub mod core;
pub mod extraction;
pub mod prompt;
pub mod query;
pub mod session;

// Re-export commonly used types
pub use analytics::{
    ClassificationError, EnrichedAnalytics, EnrichedTheme, RawClassification, Stance, analyze,
    compute_metrics, parse_classification,
};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity, has_errors};
pub use consensus::{
    codename::CodenameMapping,
    document::{ConsensusDocument, SectionResult},
    section::ConsensusSection,
};
pub use core::{
    error::DomainError,
    model::{ModelCatalog, ModelDescriptor},
    question::UserPrompt,
};
pub use extraction::{ExtractionError, ExtractionStage, ValidationReport, extract_json};
pub use prompt::{ConsensusPromptTemplate, ConversionFormat, ConversionPromptTemplate, ModelOutput};
pub use query::result::QueryResult;
pub use session::{
    consensus_session::{ConsensusSession, SessionStage},
    entities::{Message, Role, Transcript},
};
