//! Wire layer for the hosted inference service.
//!
//! [`InferenceTransport`] is the seam between the retry/fallback logic and
//! the network. The production implementation is [`HttpTransport`]; tests
//! substitute a scripted transport.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::AssistantError;
use crate::prompt::END_OF_INSTRUCTION;

/// Request body sent to a model endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub inputs: String,
    pub parameters: GenerateParameters,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateParameters {
    pub max_length: u32,
}

impl GenerateRequest {
    pub fn new(inputs: impl Into<String>, max_length: u32) -> Self {
        Self {
            inputs: inputs.into(),
            parameters: GenerateParameters { max_length },
        }
    }
}

/// Raw reply from a model endpoint: the HTTP status and body text.
#[derive(Debug, Clone)]
pub struct TransportReply {
    pub status: u16,
    pub body: String,
}

impl TransportReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Abstraction over the inference HTTP calls.
#[async_trait]
pub trait InferenceTransport: Send + Sync {
    /// POST a generation request to the named model.
    async fn generate(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<TransportReply, AssistantError>;

    /// Probe the named model endpoint, returning the HTTP status.
    async fn probe(&self, model: &str) -> Result<u16, AssistantError>;
}

/// Production transport over the hosted inference HTTP API.
///
/// Endpoints are `<base_url><model_id>`; the credential goes in a Bearer
/// authorization header.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    credential: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            credential: credential.into(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}{}", self.base_url, model)
    }
}

#[async_trait]
impl InferenceTransport for HttpTransport {
    async fn generate(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<TransportReply, AssistantError> {
        let response = self
            .client
            .post(self.endpoint(model))
            .bearer_auth(&self.credential)
            .json(request)
            .send()
            .await
            .map_err(|e| AssistantError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::Transport(e.to_string()))?;
        Ok(TransportReply::new(status, body))
    }

    async fn probe(&self, model: &str) -> Result<u16, AssistantError> {
        let response = self
            .client
            .get(self.endpoint(model))
            .bearer_auth(&self.credential)
            .send()
            .await
            .map_err(|e| AssistantError::Transport(e.to_string()))?;
        Ok(response.status().as_u16())
    }
}

/// Response shape a model is expected to produce.
///
/// Instruction-tuned models echo the prompt and mark the boundary with
/// `[/INST]`; summarization models return the answer directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Instruct,
    Summarization,
}

/// Extract the answer text from a 200 reply body.
///
/// Both families return a JSON array whose first element holds the text:
/// `generated_text` for instruct models (prompt echo stripped at the last
/// end-of-instruction marker), `summary_text` for summarization models.
pub fn parse_reply(
    family: ModelFamily,
    model: &str,
    body: &str,
) -> Result<String, AssistantError> {
    let malformed = |detail: &str| AssistantError::MalformedResponse {
        model: model.to_string(),
        detail: detail.to_string(),
    };

    let value: Value =
        serde_json::from_str(body).map_err(|e| malformed(&format!("invalid JSON: {}", e)))?;
    let first = value
        .as_array()
        .and_then(|items| items.first())
        .ok_or_else(|| malformed("expected a non-empty array"))?;

    match family {
        ModelFamily::Instruct => {
            let generated = first
                .get("generated_text")
                .and_then(Value::as_str)
                .ok_or_else(|| malformed("missing generated_text"))?;
            let answer = match generated.rfind(END_OF_INSTRUCTION) {
                Some(pos) => &generated[pos + END_OF_INSTRUCTION.len()..],
                None => generated,
            };
            Ok(answer.trim().to_string())
        }
        ModelFamily::Summarization => {
            let summary = first
                .get("summary_text")
                .and_then(Value::as_str)
                .ok_or_else(|| malformed("missing summary_text"))?;
            Ok(summary.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_serializes_inputs_and_parameters() {
        let request = GenerateRequest::new("hello", 500);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["inputs"], "hello");
        assert_eq!(json["parameters"]["max_length"], 500);
    }

    #[test]
    fn test_parse_instruct_strips_prompt_echo() {
        let body = r#"[{"generated_text": "<s>[INST] question [/INST] The answer. "}]"#;
        let answer = parse_reply(ModelFamily::Instruct, "m", body).unwrap();
        assert_eq!(answer, "The answer.");
    }

    #[test]
    fn test_parse_instruct_splits_at_last_marker() {
        let body = r#"[{"generated_text": "[INST] a [/INST] mid [INST] b [/INST] final"}]"#;
        let answer = parse_reply(ModelFamily::Instruct, "m", body).unwrap();
        assert_eq!(answer, "final");
    }

    #[test]
    fn test_parse_instruct_without_marker_returns_whole_text() {
        let body = r#"[{"generated_text": "  plain answer  "}]"#;
        let answer = parse_reply(ModelFamily::Instruct, "m", body).unwrap();
        assert_eq!(answer, "plain answer");
    }

    #[test]
    fn test_parse_summarization_returns_text_as_is() {
        let body = r#"[{"summary_text": "A short summary."}]"#;
        let answer = parse_reply(ModelFamily::Summarization, "m", body).unwrap();
        assert_eq!(answer, "A short summary.");
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = parse_reply(ModelFamily::Instruct, "m", "not json").unwrap_err();
        assert!(matches!(err, AssistantError::MalformedResponse { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_parse_rejects_empty_array() {
        let err = parse_reply(ModelFamily::Summarization, "m", "[]").unwrap_err();
        assert!(matches!(err, AssistantError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_rejects_wrong_field() {
        let body = r#"[{"summary_text": "x"}]"#;
        let err = parse_reply(ModelFamily::Instruct, "mistral", body).unwrap_err();
        match err {
            AssistantError::MalformedResponse { model, detail } => {
                assert_eq!(model, "mistral");
                assert!(detail.contains("generated_text"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_object_body() {
        let body = r#"{"error": "model loading"}"#;
        let err = parse_reply(ModelFamily::Instruct, "m", body).unwrap_err();
        assert!(matches!(err, AssistantError::MalformedResponse { .. }));
    }

    #[test]
    fn test_http_transport_endpoint() {
        let transport = HttpTransport::new(
            "https://api-inference.huggingface.co/models/",
            "secret",
        );
        assert_eq!(
            transport.endpoint("google/flan-t5-base"),
            "https://api-inference.huggingface.co/models/google/flan-t5-base"
        );
    }
}
