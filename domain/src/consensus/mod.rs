//! Consensus conversation domain.
//!
//! - [`section::ConsensusSection`]: the ordered section schema and markers
//! - [`codename::CodenameMapping`]: per-run model anonymization
//! - [`document::ConsensusDocument`]: sections accumulated turn by turn

pub mod codename;
pub mod document;
pub mod section;
