//! Application layer for polyllm
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{GenerationParams, RunParams};
pub use ports::{
    chat_gateway::{ChatCompletion, ChatGateway, ChatRequest, GatewayError},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    presenter::{ConsensusPresenter, NoPresenter},
    progress::{NoProgress, QueryProgressNotifier},
};
pub use use_cases::convert_analytics::{
    ConversionOutcome, ConvertAnalyticsError, ConvertAnalyticsUseCase, analyze_text,
};
pub use use_cases::query_models::{QueryModelsError, QueryModelsUseCase};
pub use use_cases::run_consensus::{ConsensusError, RunConsensusInput, RunConsensusUseCase};
pub use use_cases::run_pipeline::{PipelineError, RunPipelineInput, RunPipelineUseCase};
