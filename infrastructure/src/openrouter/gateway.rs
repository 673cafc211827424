//! HTTP gateway for OpenRouter-style `/chat/completions` endpoints.

use super::error::OpenRouterError;
use async_trait::async_trait;
use polyllm_application::{ChatCompletion, ChatGateway, ChatRequest, GatewayError};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_TITLE: &str = "PolyLLM Consensus Engine";

/// Connection settings for [`OpenRouterGateway`]
#[derive(Debug, Clone, PartialEq)]
pub struct OpenRouterSettings {
    pub api_key: String,
    pub base_url: String,
    /// Transport-level timeout, `None` to wait indefinitely
    pub timeout: Option<Duration>,
    pub referer: Option<String>,
    pub title: Option<String>,
}

impl OpenRouterSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Some(Duration::from_secs(120)),
            referer: None,
            title: Some(DEFAULT_TITLE.to_string()),
        }
    }
}

/// Chat gateway over HTTPS JSON POST
#[derive(Debug, Clone)]
pub struct OpenRouterGateway {
    client: reqwest::Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl OpenRouterGateway {
    pub fn new(settings: OpenRouterSettings) -> Result<Self, OpenRouterError> {
        if settings.api_key.trim().is_empty() {
            return Err(OpenRouterError::MissingApiKey);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth = HeaderValue::from_str(&format!("Bearer {}", settings.api_key.trim()))
            .map_err(|_| OpenRouterError::InvalidApiKey)?;
        headers.insert(AUTHORIZATION, auth);

        if let Some(referer) = &settings.referer {
            let value = HeaderValue::from_str(referer)
                .map_err(|_| OpenRouterError::InvalidHeader("HTTP-Referer"))?;
            headers.insert("HTTP-Referer", value);
        }
        if let Some(title) = &settings.title {
            let value =
                HeaderValue::from_str(title).map_err(|_| OpenRouterError::InvalidHeader("X-Title"))?;
            headers.insert("X-Title", value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            timeout: settings.timeout,
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

// =============================================================================
// API TYPES
// =============================================================================

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

impl<'a> ChatApiRequest<'a> {
    fn from_request(request: &'a ChatRequest) -> Self {
        Self {
            model: &request.model.id,
            messages: vec![ApiMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.params.temperature,
            max_tokens: request.max_tokens(),
            top_p: request.params.top_p,
            frequency_penalty: request.params.frequency_penalty,
            presence_penalty: request.params.presence_penalty,
        }
    }
}

#[derive(Deserialize)]
struct ChatApiResponse {
    choices: Option<Vec<Choice>>,
    usage: Option<Value>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    message: Option<String>,
}

/// Turn a status code and body into a completion or a gateway error.
fn parse_response(status: u16, body: &str) -> Result<ChatCompletion, GatewayError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .and_then(|e| e.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(GatewayError::Http { status, message });
    }

    let parsed: ChatApiResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::InvalidResponse(format!("malformed body: {}", e)))?;

    let content = parsed
        .choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| GatewayError::InvalidResponse("no message content".to_string()))?;

    if content.trim().is_empty() {
        return Err(GatewayError::EmptyContent);
    }

    Ok(ChatCompletion {
        content,
        usage: parsed.usage.unwrap_or_else(|| Value::Object(Default::default())),
    })
}

#[async_trait]
impl ChatGateway for OpenRouterGateway {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, GatewayError> {
        let body = ChatApiRequest::from_request(request);
        debug!(
            "POST {} model={} max_tokens={}",
            self.chat_url(),
            body.model,
            body.max_tokens
        );

        let response = self
            .client
            .post(self.chat_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| match self.timeout {
                Some(timeout) if e.is_timeout() => GatewayError::Timeout(timeout),
                _ => GatewayError::Connection(e.to_string()),
            })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        parse_response(status, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyllm_application::GenerationParams;
    use polyllm_domain::ModelDescriptor;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest::new(
            ModelDescriptor::new("openai/chatgpt-4o-latest", "ChatGPT 4o", 4_096, 4_096),
            "hello",
            GenerationParams::default(),
        );
        let body = serde_json::to_value(ChatApiRequest::from_request(&request)).unwrap();

        assert_eq!(body["model"], "openai/chatgpt-4o-latest");
        assert_eq!(body["messages"], json!([{"role": "user", "content": "hello"}]));
        assert_eq!(body["max_tokens"], 4_096);
        assert_eq!(body["frequency_penalty"], 0.0);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_max_tokens_clamped_to_ceiling() {
        let request = ChatRequest::new(
            ModelDescriptor::new("openai/gpt-4.1", "GPT-4.1", 100_000, 100_000),
            "hi",
            GenerationParams::default(),
        );
        assert_eq!(ChatApiRequest::from_request(&request).max_tokens, 16_000);
    }

    #[test]
    fn test_parse_success() {
        let body = r#"{"choices":[{"message":{"content":"Hi there"}}],"usage":{"total_tokens":7}}"#;
        let completion = parse_response(200, body).unwrap();
        assert_eq!(completion.content, "Hi there");
        assert_eq!(completion.usage["total_tokens"], 7);
    }

    #[test]
    fn test_missing_usage_defaults_to_empty_object() {
        let body = r#"{"choices":[{"message":{"content":"x"}}]}"#;
        assert_eq!(parse_response(200, body).unwrap().usage, json!({}));
    }

    #[test]
    fn test_http_error_uses_provider_message() {
        let err = parse_response(429, r#"{"error":{"message":"Rate limited"}}"#).unwrap_err();
        assert_eq!(err.to_string(), "HTTP 429: Rate limited");

        let err = parse_response(502, "<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.to_string(), "HTTP 502: Unknown error");
    }

    #[test]
    fn test_missing_content() {
        let err = parse_response(200, r#"{"choices":[]}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid response format - no message content"
        );
    }

    #[test]
    fn test_empty_content() {
        let err = parse_response(200, r#"{"choices":[{"message":{"content":"  "}}]}"#).unwrap_err();
        assert_eq!(err, GatewayError::EmptyContent);
    }

    #[test]
    fn test_missing_key_rejected() {
        let err = OpenRouterGateway::new(OpenRouterSettings::new("  ")).unwrap_err();
        assert!(matches!(err, OpenRouterError::MissingApiKey));
    }

    #[test]
    fn test_builds_with_valid_settings() {
        let mut settings = OpenRouterSettings::new("sk-test");
        settings.base_url = "http://localhost:9999/v1/".to_string();
        let gateway = OpenRouterGateway::new(settings).unwrap();
        assert_eq!(gateway.chat_url(), "http://localhost:9999/v1/chat/completions");
    }

    /// Serve one canned HTTP response and hand back the raw request.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/api/v1", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let length = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= head_end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });

        (base_url, handle)
    }

    #[tokio::test]
    async fn test_complete_against_local_server() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"choices":[{"message":{"content":"pong"}}],"usage":{"prompt_tokens":3}}"#,
        )
        .await;

        let mut settings = OpenRouterSettings::new("sk-test");
        settings.base_url = base_url;
        settings.referer = Some("https://example.com".to_string());
        let gateway = OpenRouterGateway::new(settings).unwrap();

        let request = ChatRequest::new(
            ModelDescriptor::from_id("openai/gpt-4.1"),
            "ping",
            GenerationParams::default(),
        );
        let completion = gateway.complete(&request).await.unwrap();
        assert_eq!(completion.content, "pong");
        assert_eq!(completion.usage["prompt_tokens"], 3);

        let raw = server.await.unwrap();
        let lower = raw.to_ascii_lowercase();
        assert!(raw.starts_with("POST /api/v1/chat/completions"));
        assert!(lower.contains("authorization: bearer sk-test"));
        assert!(lower.contains("x-title: polyllm consensus engine"));
        assert!(lower.contains("http-referer: https://example.com"));
        assert!(raw.contains(r#""content":"ping""#));
    }

    #[tokio::test]
    async fn test_complete_reports_http_error() {
        let (base_url, _server) = serve_once(
            "HTTP/1.1 401 Unauthorized",
            r#"{"error":{"message":"No auth credentials found"}}"#,
        )
        .await;

        let mut settings = OpenRouterSettings::new("sk-bad");
        settings.base_url = base_url;
        let gateway = OpenRouterGateway::new(settings).unwrap();

        let request = ChatRequest::new(
            ModelDescriptor::from_id("openai/gpt-4.1"),
            "ping",
            GenerationParams::default(),
        );
        let err = gateway.complete(&request).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 401: No auth credentials found");
    }

    #[tokio::test]
    async fn test_transport_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection without answering.
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let mut settings = OpenRouterSettings::new("sk-test");
        settings.base_url = format!("http://{}", addr);
        settings.timeout = Some(Duration::from_millis(200));
        let gateway = OpenRouterGateway::new(settings).unwrap();

        let request = ChatRequest::new(
            ModelDescriptor::from_id("m"),
            "ping",
            GenerationParams::default(),
        );
        let err = gateway.complete(&request).await.unwrap_err();
        assert_eq!(err, GatewayError::Timeout(Duration::from_millis(200)));
    }
}
