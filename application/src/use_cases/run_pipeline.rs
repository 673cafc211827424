//! Run Pipeline use case
//!
//! Orchestrates the full flow for one submission:
//! fan-out query → consensus conversation → conversion → metrics.
//! Every stage output lands in a [`ConsensusSession`] owned by the caller.

use crate::ports::presenter::ConsensusPresenter;
use crate::ports::progress::QueryProgressNotifier;
use crate::use_cases::convert_analytics::{ConvertAnalyticsError, ConvertAnalyticsUseCase};
use crate::use_cases::query_models::{QueryModelsError, QueryModelsUseCase};
use crate::use_cases::run_consensus::{ConsensusError, RunConsensusInput, RunConsensusUseCase};
use polyllm_domain::{ConsensusSession, ModelDescriptor, UserPrompt};
use thiserror::Error;
use tracing::info;

/// Errors that stop the pipeline
///
/// Consensus and conversion failures carry the session as it stood, so the
/// caller can still show completed sections or the raw conversion text.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Query(#[from] QueryModelsError),

    #[error("{source}")]
    Consensus {
        source: ConsensusError,
        session: Box<ConsensusSession>,
    },

    #[error("{source}")]
    Conversion {
        source: ConvertAnalyticsError,
        session: Box<ConsensusSession>,
    },
}

impl PipelineError {
    pub fn session(&self) -> Option<&ConsensusSession> {
        match self {
            PipelineError::Query(_) => None,
            PipelineError::Consensus { session, .. } | PipelineError::Conversion { session, .. } => {
                Some(session)
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        match self {
            PipelineError::Query(e) => *e == QueryModelsError::Cancelled,
            PipelineError::Consensus { source, .. } => source.is_cancelled(),
            PipelineError::Conversion { source, .. } => {
                matches!(source, ConvertAnalyticsError::Cancelled)
            }
        }
    }
}

/// Input for the RunPipeline use case
#[derive(Debug, Clone)]
pub struct RunPipelineInput {
    pub prompt: UserPrompt,
    pub models: Vec<ModelDescriptor>,
    pub consensus_model: ModelDescriptor,
    pub conversion_model: ModelDescriptor,
    /// Stop after the consensus document
    pub skip_analytics: bool,
}

impl RunPipelineInput {
    pub fn new(
        prompt: UserPrompt,
        models: Vec<ModelDescriptor>,
        consensus_model: ModelDescriptor,
        conversion_model: ModelDescriptor,
    ) -> Self {
        Self {
            prompt,
            models,
            consensus_model,
            conversion_model,
            skip_analytics: false,
        }
    }

    pub fn without_analytics(mut self) -> Self {
        self.skip_analytics = true;
        self
    }
}

/// Use case composing the three stages
pub struct RunPipelineUseCase {
    query: QueryModelsUseCase,
    consensus: RunConsensusUseCase,
    conversion: ConvertAnalyticsUseCase,
}

impl RunPipelineUseCase {
    pub fn new(
        query: QueryModelsUseCase,
        consensus: RunConsensusUseCase,
        conversion: ConvertAnalyticsUseCase,
    ) -> Self {
        Self {
            query,
            consensus,
            conversion,
        }
    }

    pub fn conversion(&self) -> &ConvertAnalyticsUseCase {
        &self.conversion
    }

    pub async fn execute(
        &self,
        input: RunPipelineInput,
        progress: &dyn QueryProgressNotifier,
        presenter: &dyn ConsensusPresenter,
    ) -> Result<ConsensusSession, PipelineError> {
        let mut session = ConsensusSession::new(input.prompt.clone(), input.models.clone());

        let results = self
            .query
            .execute_with_progress(&input.models, &input.prompt, progress)
            .await?;
        session.record_results(results.clone());

        let consensus_input =
            RunConsensusInput::new(input.prompt.clone(), results, input.consensus_model);
        let document = match self.consensus.execute(consensus_input, presenter).await {
            Ok(document) => document,
            Err(source) => {
                if let Some(partial) = source.partial() {
                    session.record_consensus(partial.clone());
                }
                return Err(PipelineError::Consensus {
                    source,
                    session: Box::new(session),
                });
            }
        };
        session.record_consensus(document.clone());

        if input.skip_analytics {
            info!("Skipping analytics");
            return Ok(session);
        }

        match self
            .conversion
            .execute(&document, &input.conversion_model)
            .await
        {
            Ok(outcome) => {
                session.record_conversion_raw(outcome.raw);
                presenter.on_analytics(&outcome.analytics, input.prompt.content());
                session.record_analytics(outcome.analytics);
                Ok(session)
            }
            Err(source) => {
                if let Some(raw) = source.raw_text() {
                    session.record_conversion_raw(raw);
                }
                Err(PipelineError::Conversion {
                    source,
                    session: Box::new(session),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunParams;
    use crate::ports::chat_gateway::GatewayError;
    use crate::ports::presenter::NoPresenter;
    use crate::ports::progress::NoProgress;
    use crate::use_cases::shared::testing::{Reply, ScriptedGateway};
    use polyllm_domain::{ConsensusSection, ModelCatalog, SessionStage};
    use std::sync::Arc;
    use std::time::Duration;

    const CONSENSUS: &str = "consensus/model";
    const CONVERTER: &str = "converter/model";

    fn pipeline(gateway: Arc<ScriptedGateway>) -> RunPipelineUseCase {
        let run = RunParams::default().with_turn_cooldown(Duration::ZERO);
        RunPipelineUseCase::new(
            QueryModelsUseCase::new(gateway.clone()).with_run_params(run.clone()),
            RunConsensusUseCase::new(gateway.clone()).with_run_params(run.clone()),
            ConvertAnalyticsUseCase::new(gateway).with_run_params(run),
        )
    }

    fn input() -> RunPipelineInput {
        RunPipelineInput::new(
            UserPrompt::new("Is Rust fast?").unwrap(),
            vec![
                ModelDescriptor::new("openai/gpt-4.1", "GPT-4.1", 1_000, 1_000),
                ModelDescriptor::new("x-ai/grok-3-beta", "Grok 3 Beta", 1_000, 1_000),
            ],
            ModelDescriptor::from_id(CONSENSUS),
            ModelDescriptor::from_id(CONVERTER),
        )
    }

    #[tokio::test]
    async fn test_full_run_reaches_analytics() {
        let payload = r#"{"formatVersion": "v1", "themes": [{
            "name": "Speed", "statement": "Rust is fast",
            "modelPositions": {"GPT-4.1": {"stance": "agree"}, "Grok 3 Beta": {"stance": "agree"}}
        }]}"#;
        let gateway =
            Arc::new(ScriptedGateway::new().script(CONVERTER, vec![Reply::ok(payload)]));

        let session = pipeline(gateway)
            .execute(input(), &NoProgress, &NoPresenter)
            .await
            .unwrap();

        assert_eq!(session.stage(), SessionStage::Analyzed);
        assert_eq!(session.results().len(), 2);
        assert_eq!(session.conversion_raw(), Some(payload));
        let analytics = session.analytics().unwrap();
        assert_eq!(analytics.summary.total_models, 2);
    }

    #[tokio::test]
    async fn test_skip_analytics() {
        let gateway = Arc::new(ScriptedGateway::new());
        let session = pipeline(gateway.clone())
            .execute(input().without_analytics(), &NoProgress, &NoPresenter)
            .await
            .unwrap();

        assert_eq!(session.stage(), SessionStage::ConsensusReady);
        assert!(gateway.prompts_for(CONVERTER).is_empty());
    }

    #[tokio::test]
    async fn test_consensus_failure_keeps_partial_document() {
        let gateway = Arc::new(ScriptedGateway::new().script(
            CONSENSUS,
            vec![
                Reply::ok("table"),
                Reply::err(GatewayError::Connection("reset".to_string())),
            ],
        ));
        let err = pipeline(gateway)
            .execute(input(), &NoProgress, &NoPresenter)
            .await
            .unwrap_err();

        let session = err.session().unwrap();
        let partial = session.consensus().unwrap();
        assert_eq!(partial.sections().len(), 1);
        assert_eq!(
            partial.sections()[0].section,
            ConsensusSection::ComparisonTable
        );
        assert!(!err.is_cancelled());
    }

    #[tokio::test]
    async fn test_all_models_failing_stops_before_consensus() {
        let failure = || Reply::err(GatewayError::EmptyContent);
        let gateway = Arc::new(
            ScriptedGateway::new()
                .script("openai/gpt-4.1", vec![failure()])
                .script("x-ai/grok-3-beta", vec![failure()]),
        );
        let err = pipeline(gateway.clone())
            .execute(input(), &NoProgress, &NoPresenter)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Consensus { .. }));
        assert!(err.session().unwrap().consensus().is_none());
        assert!(gateway.prompts_for(CONSENSUS).is_empty());
    }

    #[tokio::test]
    async fn test_repeated_model_is_rejected_before_fan_out() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut input = input();
        input.models = ModelCatalog::builtin().resolve_all(&["openai/gpt-4.1", "openai/gpt-4.1"]);

        let err = pipeline(gateway.clone())
            .execute(input, &NoProgress, &NoPresenter)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Query(QueryModelsError::DuplicateModel(ref id)) if id == "openai/gpt-4.1"
        ));
        assert!(gateway.prompts_for("openai/gpt-4.1").is_empty());
        assert!(gateway.prompts_for(CONSENSUS).is_empty());
    }
}
