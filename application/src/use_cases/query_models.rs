//! Query Models use case
//!
//! Fans one prompt out to every selected model in parallel and collects a
//! uniform [`QueryResult`] per model, in the caller's order.

use crate::config::{GenerationParams, RunParams};
use crate::ports::chat_gateway::{ChatGateway, ChatRequest};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::progress::{NoProgress, QueryProgressNotifier};
use crate::use_cases::shared::{cancellable, complete_with_timeout};
use polyllm_domain::core::string::preview;
use polyllm_domain::{ModelDescriptor, QueryResult, UserPrompt};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that abort the whole fan-out.
///
/// Individual model failures are never errors here; they become
/// `QueryResult { success: false }` entries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryModelsError {
    #[error("No models selected")]
    NoModels,

    #[error("Model selected more than once: {0}")]
    DuplicateModel(String),

    #[error("Query cancelled")]
    Cancelled,
}

/// Use case for querying several models at once
pub struct QueryModelsUseCase {
    gateway: Arc<dyn ChatGateway>,
    generation: GenerationParams,
    run: RunParams,
    cancellation_token: Option<CancellationToken>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl QueryModelsUseCase {
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self {
            gateway,
            generation: GenerationParams::default(),
            run: RunParams::default(),
            cancellation_token: None,
            conversation_logger: Arc::new(NoConversationLogger),
        }
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

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        models: &[ModelDescriptor],
        prompt: &UserPrompt,
    ) -> Result<Vec<QueryResult>, QueryModelsError> {
        self.execute_with_progress(models, prompt, &NoProgress).await
    }

    /// Execute the use case with progress callbacks.
    ///
    /// Output order always matches `models`, whatever order the responses
    /// arrive in.
    pub async fn execute_with_progress(
        &self,
        models: &[ModelDescriptor],
        prompt: &UserPrompt,
        progress: &dyn QueryProgressNotifier,
    ) -> Result<Vec<QueryResult>, QueryModelsError> {
        if models.is_empty() {
            return Err(QueryModelsError::NoModels);
        }
        // Codenames map one-to-one onto models.
        for (i, model) in models.iter().enumerate() {
            if models[..i].iter().any(|m| m.id == model.id) {
                return Err(QueryModelsError::DuplicateModel(model.id.clone()));
            }
        }

        info!("Querying {} models", models.len());

        let mut join_set = JoinSet::new();
        for (index, model) in models.iter().enumerate() {
            let gateway = Arc::clone(&self.gateway);
            let request = ChatRequest::new(model.clone(), prompt.content(), self.generation);
            let timeout = self.run.request_timeout;

            progress.on_start(index, model);
            debug!(
                "Requesting {} (max_tokens={})",
                model.id,
                request.max_tokens()
            );

            join_set.spawn(async move {
                let outcome = complete_with_timeout(gateway.as_ref(), &request, timeout).await;
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<QueryResult>> = vec![None; models.len()];

        loop {
            let Some(joined) = cancellable(&self.cancellation_token, join_set.join_next()).await
            else {
                join_set.abort_all();
                return Err(QueryModelsError::Cancelled);
            };
            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok((index, outcome)) => {
                    let model = &models[index];
                    let result = match outcome {
                        Ok(completion) => {
                            info!("Model {} responded successfully", model.id);
                            QueryResult::success(model.clone(), completion.content, completion.usage)
                        }
                        Err(e) => {
                            warn!("Model {} failed: {}", model.id, e);
                            QueryResult::failure(model.clone(), e.to_string())
                        }
                    };
                    self.log_result(&result);
                    progress.on_stop(index, model);
                    progress.on_response(index, &result);
                    slots[index] = Some(result);
                }
                Err(e) => {
                    warn!("Query task join error: {}", e);
                }
            }
        }

        // A slot stays empty only if its task panicked.
        let results = slots
            .into_iter()
            .zip(models)
            .enumerate()
            .map(|(index, (slot, model))| {
                slot.unwrap_or_else(|| {
                    let result = QueryResult::failure(model.clone(), "Query task aborted");
                    progress.on_stop(index, model);
                    progress.on_response(index, &result);
                    result
                })
            })
            .collect::<Vec<_>>();

        info!(
            "{} of {} models responded",
            results.iter().filter(|r| r.is_success()).count(),
            results.len()
        );
        Ok(results)
    }

    fn log_result(&self, result: &QueryResult) {
        self.conversation_logger.log(ConversationEvent::new(
            "model_response",
            serde_json::json!({
                "model": result.model.id,
                "success": result.success,
                "bytes": result.response.len(),
                "text": result.response,
                "error": result.error,
                "usage": result.usage,
            }),
        ));
        if let Some(error) = result.error_message() {
            debug!("{} error detail: {}", result.model.id, preview(error, 200));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::chat_gateway::GatewayError;
    use crate::use_cases::shared::testing::{Reply, ScriptedGateway};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingProgress {
        started: Mutex<Vec<usize>>,
        responded: Mutex<Vec<usize>>,
    }

    impl QueryProgressNotifier for RecordingProgress {
        fn on_start(&self, index: usize, _model: &ModelDescriptor) {
            self.started.lock().unwrap().push(index);
        }
        fn on_stop(&self, _index: usize, _model: &ModelDescriptor) {}
        fn on_response(&self, index: usize, _result: &QueryResult) {
            self.responded.lock().unwrap().push(index);
        }
    }

    fn models(ids: &[&str]) -> Vec<ModelDescriptor> {
        ids.iter().map(|id| ModelDescriptor::from_id(*id)).collect()
    }

    fn prompt() -> UserPrompt {
        UserPrompt::new("What is consensus?").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_order_matches_input_under_latency() {
        let delays = [50u64, 10, 40, 20, 30];
        let ids = ["m0", "m1", "m2", "m3", "m4"];
        let mut gateway = ScriptedGateway::new();
        for (id, delay) in ids.iter().zip(delays) {
            gateway = gateway.script(
                id,
                vec![Reply::ok(&format!("answer {}", id)).after(Duration::from_millis(delay))],
            );
        }

        let progress = RecordingProgress::default();
        let results = QueryModelsUseCase::new(Arc::new(gateway))
            .execute_with_progress(&models(&ids), &prompt(), &progress)
            .await
            .unwrap();

        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.model.id, ids[i]);
            assert_eq!(result.response, format!("answer {}", ids[i]));
        }
        assert_eq!(*progress.started.lock().unwrap(), vec![0, 1, 2, 3, 4]);
        // Responses are reported in completion order, not input order.
        assert_eq!(*progress.responded.lock().unwrap(), vec![1, 3, 4, 2, 0]);
    }

    #[tokio::test]
    async fn test_single_failure_is_isolated() {
        let gateway = ScriptedGateway::new().script(
            "m1",
            vec![Reply::err(GatewayError::Http {
                status: 500,
                message: "Unknown error".to_string(),
            })],
        );
        let results = QueryModelsUseCase::new(Arc::new(gateway))
            .execute(&models(&["m0", "m1", "m2"]), &prompt())
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_success());
        assert!(!results[1].is_success());
        assert!(results[2].is_success());
        assert_eq!(results[1].error_message(), Some("HTTP 500: Unknown error"));
        assert_eq!(results[1].response, "");
        assert_eq!(results[0].response, "reply from m0");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_failed_result() {
        let gateway = ScriptedGateway::new().script(
            "slow",
            vec![Reply::ok("late").after(Duration::from_secs(30))],
        );
        let results = QueryModelsUseCase::new(Arc::new(gateway))
            .with_run_params(RunParams::default().with_request_timeout(Some(Duration::from_secs(5))))
            .execute(&models(&["slow", "fast"]), &prompt())
            .await
            .unwrap();

        assert_eq!(results[0].error_message(), Some("Request timed out after 5s"));
        assert!(results[1].is_success());
    }

    #[tokio::test]
    async fn test_prompt_is_sent_verbatim() {
        let gateway = Arc::new(ScriptedGateway::new());
        QueryModelsUseCase::new(gateway.clone())
            .execute(&models(&["m0"]), &prompt())
            .await
            .unwrap();
        assert_eq!(gateway.prompts_for("m0"), vec!["What is consensus?".to_string()]);
    }

    #[tokio::test]
    async fn test_no_models() {
        let err = QueryModelsUseCase::new(Arc::new(ScriptedGateway::new()))
            .execute(&[], &prompt())
            .await
            .unwrap_err();
        assert_eq!(err, QueryModelsError::NoModels);
    }

    #[tokio::test]
    async fn test_duplicate_model_rejected_before_requests() {
        let gateway = Arc::new(ScriptedGateway::new());
        let err = QueryModelsUseCase::new(gateway.clone())
            .execute(&models(&["m0", "m1", "m0"]), &prompt())
            .await
            .unwrap_err();
        assert_eq!(err, QueryModelsError::DuplicateModel("m0".to_string()));
        assert!(gateway.prompts_for("m0").is_empty());
        assert!(gateway.prompts_for("m1").is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_responses() {
        let token = CancellationToken::new();
        token.cancel();
        let err = QueryModelsUseCase::new(Arc::new(ScriptedGateway::new()))
            .with_cancellation(token)
            .execute(&models(&["m0"]), &prompt())
            .await
            .unwrap_err();
        assert_eq!(err, QueryModelsError::Cancelled);
    }
}
