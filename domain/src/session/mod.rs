//! Conversation and session state.
//!
//! - [`entities::Transcript`]: alternating user/assistant turns sent to the consensus model
//! - [`consensus_session::ConsensusSession`]: everything one submission produces

pub mod consensus_session;
pub mod entities;
