//! Convert Analytics use case
//!
//! Asks a conversion model to classify the consensus document into themes
//! and stances, recovers the JSON from its answer and scores it.

use crate::config::{GenerationParams, RunParams};
use crate::ports::chat_gateway::{ChatGateway, ChatRequest};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::use_cases::shared::{cancellable, complete_with_timeout};
use polyllm_domain::extraction::extract_json_with_stage;
use polyllm_domain::{
    ClassificationError, ConsensusDocument, ConversionFormat, ConversionPromptTemplate,
    EnrichedAnalytics, ExtractionError, ExtractionStage, ModelDescriptor, analyze,
};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur while producing analytics
///
/// Extraction and classification failures keep the raw model text so it can
/// be corrected by hand and resubmitted through
/// [`ConvertAnalyticsUseCase::from_manual_text`].
#[derive(Error, Debug)]
pub enum ConvertAnalyticsError {
    #[error("Conversion request failed: {0}")]
    Gateway(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("{source}")]
    Classification {
        source: ClassificationError,
        raw: String,
    },

    #[error("Conversion cancelled")]
    Cancelled,
}

impl ConvertAnalyticsError {
    /// Raw text available for manual repair
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            ConvertAnalyticsError::Extraction(e) => Some(e.raw()),
            ConvertAnalyticsError::Classification { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Whether a different prompt could plausibly fix the failure
    fn is_content_failure(&self) -> bool {
        matches!(
            self,
            ConvertAnalyticsError::Extraction(_) | ConvertAnalyticsError::Classification { .. }
        )
    }
}

/// Scored analytics plus everything needed to audit how they were produced
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    /// Conversion-model output exactly as received (or as hand-edited)
    pub raw: String,
    /// The sanitized JSON value that was scored
    pub value: Value,
    pub stage: ExtractionStage,
    /// Template used, `None` for manual repair
    pub format: Option<ConversionFormat>,
    pub analytics: EnrichedAnalytics,
}

/// Use case for the structured-data conversion
pub struct ConvertAnalyticsUseCase {
    gateway: Arc<dyn ChatGateway>,
    standard_template: ConversionPromptTemplate,
    safe_template: ConversionPromptTemplate,
    retry_with_safe: bool,
    generation: GenerationParams,
    run: RunParams,
    cancellation_token: Option<CancellationToken>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl ConvertAnalyticsUseCase {
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self {
            gateway,
            standard_template: ConversionPromptTemplate::builtin(ConversionFormat::Standard),
            safe_template: ConversionPromptTemplate::builtin(ConversionFormat::Safe),
            retry_with_safe: true,
            generation: GenerationParams::default(),
            run: RunParams::default(),
            cancellation_token: None,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_standard_template(mut self, template: ConversionPromptTemplate) -> Self {
        self.standard_template = template;
        self
    }

    /// Disable the fallback attempt with the simplified template.
    pub fn without_safe_retry(mut self) -> Self {
        self.retry_with_safe = false;
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

    /// Convert a consensus document into scored analytics.
    ///
    /// When the standard template's answer cannot be extracted or validated,
    /// one more attempt is made with the simplified template.
    pub async fn execute(
        &self,
        document: &ConsensusDocument,
        model: &ModelDescriptor,
    ) -> Result<ConversionOutcome, ConvertAnalyticsError> {
        let first = self
            .attempt(document, model, ConversionFormat::Standard)
            .await;
        match first {
            Err(e) if self.retry_with_safe && e.is_content_failure() => {
                warn!("Standard conversion failed ({}), retrying with safe format", e);
                self.attempt(document, model, ConversionFormat::Safe).await
            }
            other => other,
        }
    }

    async fn attempt(
        &self,
        document: &ConsensusDocument,
        model: &ModelDescriptor,
        format: ConversionFormat,
    ) -> Result<ConversionOutcome, ConvertAnalyticsError> {
        let template = match format {
            ConversionFormat::Standard => &self.standard_template,
            ConversionFormat::Safe => &self.safe_template,
        };
        let prompt = template.build(document.mapping(), document.full_text());
        info!(
            "Requesting {} conversion from {}",
            format.format_version(),
            model.id
        );

        let request = ChatRequest::new(model.clone(), prompt, self.generation);
        let completion = cancellable(
            &self.cancellation_token,
            complete_with_timeout(self.gateway.as_ref(), &request, self.run.request_timeout),
        )
        .await
        .ok_or(ConvertAnalyticsError::Cancelled)?
        .map_err(|e| ConvertAnalyticsError::Gateway(e.to_string()))?;

        self.conversation_logger.log(ConversationEvent::new(
            "conversion_response",
            serde_json::json!({
                "model": model.id,
                "format": format.format_version(),
                "prompt": request.prompt,
                "response": completion.content,
                "usage": completion.usage,
            }),
        ));

        let result = analyze_text(&completion.content);
        self.log_outcome(&result);
        result.map(|mut outcome| {
            outcome.format = Some(format);
            outcome
        })
    }

    /// Manual repair path: score hand-edited text without another model call.
    pub fn from_manual_text(&self, raw: &str) -> Result<ConversionOutcome, ConvertAnalyticsError> {
        let result = analyze_text(raw);
        self.log_outcome(&result);
        result
    }

    fn log_outcome(&self, result: &Result<ConversionOutcome, ConvertAnalyticsError>) {
        let payload = match result {
            Ok(outcome) => serde_json::json!({
                "success": true,
                "stage": format!("{:?}", outcome.stage),
                "themes": outcome.analytics.themes.len(),
            }),
            Err(e) => serde_json::json!({
                "success": false,
                "error": e.to_string(),
            }),
        };
        self.conversation_logger
            .log(ConversationEvent::new("extraction_result", payload));
    }
}

/// Extract, validate, normalize and score raw conversion text.
pub fn analyze_text(raw: &str) -> Result<ConversionOutcome, ConvertAnalyticsError> {
    let (value, stage) = extract_json_with_stage(raw)?;
    if stage != ExtractionStage::Direct {
        debug!("JSON recovered at stage {:?}", stage);
    }
    let analytics = analyze(&value).map_err(|source| ConvertAnalyticsError::Classification {
        source,
        raw: raw.to_string(),
    })?;
    Ok(ConversionOutcome {
        raw: raw.to_string(),
        value,
        stage,
        format: None,
        analytics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::chat_gateway::GatewayError;
    use crate::use_cases::shared::testing::{Reply, ScriptedGateway};
    use polyllm_domain::{CodenameMapping, ModelCatalog};

    const CONVERTER: &str = "converter/model";

    const V1_PAYLOAD: &str = r#"```json
{
  "formatVersion": "v1",
  "themes": [{
    "name": "Testing",
    "statement": "Tests matter",
    "importance": "high",
    "modelPositions": {
      "GPT-4.1": {"stance": "agree", "mentionType": "direct"},
      "Grok 3 Beta": {"stance": "agree", "mentionType": "indirect"},
    }
  }],
}
```"#;

    fn document() -> ConsensusDocument {
        let models = ModelCatalog::builtin().resolve_all(&["openai/gpt-4.1", "x-ai/grok-3-beta"]);
        let mut doc = ConsensusDocument::new("prompt", CodenameMapping::assign(&models).unwrap());
        doc.record_turn("## COMPARISON_TABLE_START\nllm-* and llm-% agree\n## COMPARISON_TABLE_END");
        doc
    }

    fn model() -> ModelDescriptor {
        ModelDescriptor::from_id(CONVERTER)
    }

    #[tokio::test]
    async fn test_fenced_payload_with_trailing_commas() {
        let gateway = Arc::new(ScriptedGateway::new().script(CONVERTER, vec![Reply::ok(V1_PAYLOAD)]));
        let outcome = ConvertAnalyticsUseCase::new(gateway.clone())
            .execute(&document(), &model())
            .await
            .unwrap();

        assert_eq!(outcome.format, Some(ConversionFormat::Standard));
        assert_eq!(outcome.analytics.themes.len(), 1);
        assert_eq!(outcome.analytics.summary.reliability_index, 100);

        // The conversion prompt carries real names, not codenames.
        let prompt = &gateway.prompts_for(CONVERTER)[0];
        assert!(prompt.contains("llm-*: GPT-4.1"));
        assert!(prompt.contains("GPT-4.1 and Grok 3 Beta agree"));
    }

    #[tokio::test]
    async fn test_retries_with_safe_format() {
        let v2 = r#"{"formatVersion": "v2", "themes": [
            {"name": "t", "statement": "s", "models": [{"name": "GPT-4.1", "stance": "agree"}]}
        ]}"#;
        let gateway = Arc::new(ScriptedGateway::new().script(
            CONVERTER,
            vec![Reply::ok("I cannot produce JSON today."), Reply::ok(v2)],
        ));
        let outcome = ConvertAnalyticsUseCase::new(gateway.clone())
            .execute(&document(), &model())
            .await
            .unwrap();

        assert_eq!(outcome.format, Some(ConversionFormat::Safe));
        assert_eq!(gateway.prompts_for(CONVERTER).len(), 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_raw_text() {
        let gateway = Arc::new(
            ScriptedGateway::new().script(CONVERTER, vec![Reply::ok(r#"{"themes": "nope"}"#)]),
        );
        let err = ConvertAnalyticsUseCase::new(gateway)
            .without_safe_retry()
            .execute(&document(), &model())
            .await
            .unwrap_err();

        assert!(matches!(err, ConvertAnalyticsError::Classification { .. }));
        assert_eq!(err.raw_text(), Some(r#"{"themes": "nope"}"#));
    }

    #[tokio::test]
    async fn test_gateway_failure_is_not_retried() {
        let gateway = Arc::new(
            ScriptedGateway::new().script(CONVERTER, vec![Reply::err(GatewayError::EmptyContent)]),
        );
        let err = ConvertAnalyticsUseCase::new(gateway.clone())
            .execute(&document(), &model())
            .await
            .unwrap_err();

        assert!(matches!(err, ConvertAnalyticsError::Gateway(_)));
        assert!(err.raw_text().is_none());
        assert_eq!(gateway.prompts_for(CONVERTER).len(), 1);
    }

    #[test]
    fn test_manual_repair_path() {
        let use_case = ConvertAnalyticsUseCase::new(Arc::new(ScriptedGateway::new()));
        let outcome = use_case.from_manual_text(V1_PAYLOAD).unwrap();
        assert!(outcome.format.is_none());
        assert_eq!(outcome.analytics.themes[0].theme.name, "Testing");

        let err = use_case.from_manual_text("no json here").unwrap_err();
        assert_eq!(err.raw_text(), Some("no json here"));
    }
}
