//! Run Consensus use case
//!
//! Drives the consensus model through one turn per [`ConsensusSection`].
//!
//! # Turn protocol
//!
//! ```text
//! turn 1: base prompt (template + anonymized outputs + first instruction)
//! turn k: transcript so far + "now output section k", flattened to one prompt
//! ```
//!
//! The transport has no conversation memory, so every turn after the first
//! resends the whole transcript as `USER: ...` / `ASSISTANT: ...` blocks.
//! A failed turn aborts the run; the sections completed before it travel
//! with the error.

use crate::config::{GenerationParams, RunParams};
use crate::ports::chat_gateway::{ChatGateway, ChatRequest};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::presenter::ConsensusPresenter;
use crate::use_cases::shared::{cancellable, complete_with_timeout};
use polyllm_domain::query::result::successful;
use polyllm_domain::{
    CodenameMapping, ConsensusDocument, ConsensusPromptTemplate, ConsensusSection, DomainError,
    ModelDescriptor, ModelOutput, QueryResult, Transcript, UserPrompt,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur during a consensus run
#[derive(Error, Debug)]
pub enum ConsensusError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Consensus turn for {section} failed: {message}")]
    TurnFailed {
        section: ConsensusSection,
        message: String,
        partial: Box<ConsensusDocument>,
    },

    #[error("Consensus cancelled during {section}")]
    Cancelled {
        section: ConsensusSection,
        partial: Box<ConsensusDocument>,
    },
}

impl ConsensusError {
    /// Sections completed before the run stopped, if any turn ran
    pub fn partial(&self) -> Option<&ConsensusDocument> {
        match self {
            ConsensusError::TurnFailed { partial, .. } | ConsensusError::Cancelled { partial, .. } => {
                Some(partial)
            }
            ConsensusError::Domain(_) => None,
        }
    }

    /// The section whose turn did not complete
    pub fn failed_section(&self) -> Option<ConsensusSection> {
        match self {
            ConsensusError::TurnFailed { section, .. } | ConsensusError::Cancelled { section, .. } => {
                Some(*section)
            }
            ConsensusError::Domain(_) => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ConsensusError::Cancelled { .. })
    }
}

/// Input for the RunConsensus use case
#[derive(Debug, Clone)]
pub struct RunConsensusInput {
    pub prompt: UserPrompt,
    /// Fan-out results; failures are skipped
    pub results: Vec<QueryResult>,
    pub consensus_model: ModelDescriptor,
}

impl RunConsensusInput {
    pub fn new(prompt: UserPrompt, results: Vec<QueryResult>, consensus_model: ModelDescriptor) -> Self {
        Self {
            prompt,
            results,
            consensus_model,
        }
    }
}

/// Use case for generating the consensus document
pub struct RunConsensusUseCase {
    gateway: Arc<dyn ChatGateway>,
    template: ConsensusPromptTemplate,
    generation: GenerationParams,
    run: RunParams,
    cancellation_token: Option<CancellationToken>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl RunConsensusUseCase {
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self {
            gateway,
            template: ConsensusPromptTemplate::builtin(),
            generation: GenerationParams::default(),
            run: RunParams::default(),
            cancellation_token: None,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_template(mut self, template: ConsensusPromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_generation_params(mut self, params: GenerationParams) -> Self {
        self.generation = params;
        self
    }

    pub fn with_run_params(mut self, params: RunParams) -> Self {
        self.run = params;
        self
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Run every turn and return the complete document.
    pub async fn execute(
        &self,
        input: RunConsensusInput,
        presenter: &dyn ConsensusPresenter,
    ) -> Result<ConsensusDocument, ConsensusError> {
        let successes = successful(&input.results);
        if successes.is_empty() {
            return Err(DomainError::NoSuccessfulResponses.into());
        }

        let models: Vec<ModelDescriptor> = successes.iter().map(|r| r.model.clone()).collect();
        let mapping = CodenameMapping::assign(&models)?;
        let outputs = anonymize(&successes, &mapping);

        let base_prompt = self
            .template
            .build_first_turn(input.prompt.content(), &outputs);
        let mut document = ConsensusDocument::new(base_prompt.clone(), mapping);
        let mut transcript = Transcript::new();
        transcript.add_user_message(base_prompt);

        info!(
            "Starting consensus with {} on {} outputs",
            input.consensus_model.id,
            outputs.len()
        );

        while let Some(section) = document.next_section() {
            if section != ConsensusSection::first() {
                if !self.run.turn_cooldown.is_zero()
                    && cancellable(
                        &self.cancellation_token,
                        tokio::time::sleep(self.run.turn_cooldown),
                    )
                    .await
                    .is_none()
                {
                    return Err(ConsensusError::Cancelled {
                        section,
                        partial: Box::new(document),
                    });
                }
                transcript.add_user_message(section.instruction());
            }

            presenter.on_turn_start(section);
            let prompt = transcript.flatten();
            debug!(
                "Consensus turn {} ({}): {} bytes",
                section.index() + 1,
                section.key(),
                prompt.len()
            );

            let request = ChatRequest::new(input.consensus_model.clone(), prompt, self.generation);
            let outcome = cancellable(
                &self.cancellation_token,
                complete_with_timeout(self.gateway.as_ref(), &request, self.run.request_timeout),
            )
            .await;

            let completion = match outcome {
                None => {
                    info!("Consensus cancelled during {}", section);
                    return Err(ConsensusError::Cancelled {
                        section,
                        partial: Box::new(document),
                    });
                }
                Some(Err(e)) => {
                    warn!("Consensus turn {} failed: {}", section, e);
                    self.conversation_logger.log(ConversationEvent::new(
                        "consensus_turn_failed",
                        serde_json::json!({
                            "section": section.key(),
                            "model": input.consensus_model.id,
                            "error": e.to_string(),
                        }),
                    ));
                    return Err(ConsensusError::TurnFailed {
                        section,
                        message: e.to_string(),
                        partial: Box::new(document),
                    });
                }
                Some(Ok(completion)) => completion,
            };

            self.conversation_logger.log(ConversationEvent::new(
                "consensus_turn",
                serde_json::json!({
                    "section": section.key(),
                    "model": input.consensus_model.id,
                    "prompt": request.prompt,
                    "response": completion.content,
                    "usage": completion.usage,
                }),
            ));

            transcript.add_assistant_message(completion.content.as_str());
            if let Some(result) = document.record_turn(&completion.content).cloned() {
                if !result.marker_found {
                    warn!(
                        "Markers for {} not found, using the full response",
                        section
                    );
                }
                presenter.on_section(&result, document.mapping());
            }
        }

        info!("Consensus complete ({} bytes)", document.full_text().len());
        Ok(document)
    }
}

/// Successful outputs labelled with their codenames, in input order
fn anonymize(successes: &[QueryResult], mapping: &CodenameMapping) -> Vec<ModelOutput> {
    successes
        .iter()
        .filter_map(|r| {
            mapping
                .codename_for(&r.model.id)
                .map(|code| ModelOutput::new(code, r.response.as_str()))
        })
        .collect()
}
