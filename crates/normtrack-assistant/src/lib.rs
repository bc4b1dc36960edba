//! Conversational assistant for ISO management queries.
//!
//! Wraps a hosted inference service behind a small client: primary and
//! fallback models, retry with backoff, a rolling conversation context,
//! and a fixed apology reply when everything fails.

pub mod client;
pub mod context;
pub mod error;
pub mod prompt;
pub mod retry;
pub mod transport;

pub use client::{
    AssistantClient, ChatReply, ModelKind, ModelStatus, ServiceStatus, FALLBACK_ANSWER,
};
pub use context::{ConversationContext, Turn};
pub use error::AssistantError;
pub use retry::RetryPolicy;
pub use transport::{
    GenerateRequest, HttpTransport, InferenceTransport, ModelFamily, TransportReply,
};
