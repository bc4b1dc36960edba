//! Conversational query client.
//!
//! Sends chat queries to a hosted inference service with a primary and a
//! fallback model, retries transient failures with backoff, and keeps a
//! rolling conversation context. Remote failures never surface as errors
//! from this module; an exhausted query yields a fixed apology reply.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use normtrack_core::config::AssistantConfig;

use crate::context::ConversationContext;
use crate::error::AssistantError;
use crate::prompt::{field_suggestion_prompt, format_prompt};
use crate::retry::RetryPolicy;
use crate::transport::{
    parse_reply, GenerateRequest, HttpTransport, InferenceTransport, ModelFamily,
};

/// Reply text used when every model and attempt has failed.
pub const FALLBACK_ANSWER: &str =
    "I apologize, but I'm unable to process your request at the moment. Please try again later.";

/// Which configured model produced (or was last asked for) an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Primary,
    Fallback,
}

impl ModelKind {
    fn family(self) -> ModelFamily {
        match self {
            ModelKind::Primary => ModelFamily::Instruct,
            ModelKind::Fallback => ModelFamily::Summarization,
        }
    }
}

/// A chat answer together with the model that produced it.
///
/// When `answer` is the apology text, `model` is [`ModelKind::Fallback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub answer: String,
    pub model: ModelKind,
}

/// Reachability of the inference service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    /// No credential is configured; no request was made.
    Unconfigured,
    /// The primary model endpoint answered the probe.
    Connected,
    /// The probe failed or returned a non-success status.
    Error { detail: String },
}

/// Snapshot of the client's configuration and service reachability.
#[derive(Debug, Clone)]
pub struct ModelStatus {
    pub primary_model: String,
    pub fallback_model: String,
    pub status: ServiceStatus,
    pub context_turns: usize,
}

/// Client for the conversational assistant.
///
/// Owns one conversation context; create one client per conversation.
pub struct AssistantClient {
    config: AssistantConfig,
    credential: Option<String>,
    transport: Arc<dyn InferenceTransport>,
    context: ConversationContext,
    policy: RetryPolicy,
}

impl AssistantClient {
    /// Build a client reading the credential from the configured
    /// environment variable.
    pub fn from_env(config: AssistantConfig) -> Self {
        let credential = std::env::var(&config.api_key_env).ok();
        if credential.is_none() {
            warn!(
                "Environment variable {} is not set; inference requests will be unauthenticated",
                config.api_key_env
            );
        }
        let transport = Arc::new(HttpTransport::new(
            config.api_base_url.clone(),
            credential.clone().unwrap_or_default(),
        ));
        Self::build(config, credential, transport)
    }

    /// Build a client over an explicit transport.
    pub fn with_transport(
        config: AssistantConfig,
        credential: Option<String>,
        transport: Arc<dyn InferenceTransport>,
    ) -> Self {
        Self::build(config, credential, transport)
    }

    fn build(
        config: AssistantConfig,
        credential: Option<String>,
        transport: Arc<dyn InferenceTransport>,
    ) -> Self {
        let policy = RetryPolicy::new(
            config.max_attempts,
            Duration::from_secs(config.backoff_floor_secs),
            Duration::from_secs(config.backoff_cap_secs),
            config.jitter,
        );
        let context = ConversationContext::new(config.context_turns);
        Self {
            config,
            credential,
            transport,
            context,
            policy,
        }
    }

    fn model_id(&self, kind: ModelKind) -> &str {
        match kind {
            ModelKind::Primary => &self.config.primary_model,
            ModelKind::Fallback => &self.config.fallback_model,
        }
    }

    /// Send one prompt to the given model, retrying transient failures.
    ///
    /// Returns `None` when all attempts are exhausted or the model's reply
    /// does not match its family's shape. Never returns an error.
    async fn query_model(&self, kind: ModelKind, prompt: &str) -> Option<String> {
        let model = self.model_id(kind);
        let request = GenerateRequest::new(prompt, self.config.max_length);

        for attempt in 1..=self.policy.max_attempts {
            let failure = match self.transport.generate(model, &request).await {
                Ok(reply) if reply.status == 200 => {
                    match parse_reply(kind.family(), model, &reply.body) {
                        Ok(answer) => {
                            debug!("Model {} answered on attempt {}", model, attempt);
                            return Some(answer);
                        }
                        Err(e) => e,
                    }
                }
                Ok(reply) if reply.status == 429 => AssistantError::RateLimited,
                Ok(reply) => AssistantError::Status(reply.status),
                Err(e) => e,
            };

            if !failure.is_retryable() {
                warn!("Model {} gave an unusable reply: {}", model, failure);
                return None;
            }
            warn!(
                "Model {} attempt {}/{} failed: {}",
                model, attempt, self.policy.max_attempts, failure
            );
            if attempt < self.policy.max_attempts {
                tokio::time::sleep(self.policy.delay_before_next(attempt)).await;
            }
        }
        None
    }

    /// Answer a chat query, preferring the primary model and falling back
    /// to the fallback model, then to the fixed apology reply.
    ///
    /// A successful turn is appended to the conversation context; a failed
    /// one leaves the context untouched.
    pub async fn get_response(&mut self, query: &str) -> ChatReply {
        let prompt = format_prompt(self.context.recent(self.config.prompt_turns), query);

        for kind in [ModelKind::Primary, ModelKind::Fallback] {
            if let Some(answer) = self.query_model(kind, &prompt).await {
                self.context.push(query, answer.clone());
                return ChatReply {
                    answer,
                    model: kind,
                };
            }
            info!("Model {} could not answer", self.model_id(kind));
        }

        warn!("All models failed; returning the fixed apology reply");
        ChatReply {
            answer: FALLBACK_ANSWER.to_string(),
            model: ModelKind::Fallback,
        }
    }

    /// Suggest an example value for a form field.
    ///
    /// One-off request against the fallback model; does not touch the
    /// conversation context. Falls back to a generic placeholder.
    pub async fn get_field_suggestion(&self, field_name: &str, form_type: &str) -> String {
        let prompt = field_suggestion_prompt(field_name, form_type);
        match self.query_model(ModelKind::Fallback, &prompt).await {
            Some(answer) if !answer.trim().is_empty() => answer,
            _ => format!("Example {}", field_name),
        }
    }

    /// Report the configured models and whether the service is reachable.
    pub async fn model_info(&self) -> ModelStatus {
        let status = if self.credential.is_none() {
            ServiceStatus::Unconfigured
        } else {
            match self.transport.probe(&self.config.primary_model).await {
                Ok(code) if (200..300).contains(&code) => ServiceStatus::Connected,
                Ok(code) => ServiceStatus::Error {
                    detail: format!("probe returned status {}", code),
                },
                Err(e) => ServiceStatus::Error {
                    detail: e.to_string(),
                },
            }
        };
        ModelStatus {
            primary_model: self.config.primary_model.clone(),
            fallback_model: self.config.fallback_model.clone(),
            status,
            context_turns: self.context.len(),
        }
    }

    /// Forget the conversation so far.
    pub fn clear_context(&mut self) {
        self.context.clear();
        info!("Conversation context cleared");
    }

    /// Number of turns currently remembered.
    pub fn context_len(&self) -> usize {
        self.context.len()
    }
}
