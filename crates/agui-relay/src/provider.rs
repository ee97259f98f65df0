use std::fmt;
use std::pin::Pin;

use crate::errors::ProviderError;

/// Stable identifier for an upstream adapter implementation (for example `openai`).
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ProviderId(pub String);

impl ProviderId {
    /// Creates a provider id from any string-like value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the provider id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProviderId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// One message of prior conversation history.
///
/// Passed through to the upstream endpoint verbatim; role values are not
/// validated here.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    /// Creates a message with the given role and content.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// A function tool advertised to the model.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool arguments, passed through as-is.
    pub parameters: serde_json::Value,
}

/// Fully composed request handed to an upstream adapter.
#[derive(Clone, Debug)]
pub struct CompletionRequest {
    /// Identifier for this turn, used in logs only.
    pub turn_id: uuid::Uuid,
    /// System prompt installed ahead of the conversation.
    pub system_prompt: String,
    /// Prior turns, oldest first.
    pub history: Vec<ChatMessage>,
    /// The new user message.
    pub message: String,
    /// Tools the model may invoke.
    pub tools: Vec<ToolSpec>,
}

/// One fragment of a streamed tool invocation.
///
/// `id` and `name` are present only on the fragment that opens the
/// invocation; later fragments carry argument chunks attributed by `slot`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolCallDelta {
    /// Provider-assigned index distinguishing concurrent invocations.
    pub slot: u32,
    pub id: Option<String>,
    pub name: Option<String>,
    /// A chunk of the JSON-encoded arguments blob, split at arbitrary
    /// byte boundaries.
    pub arguments: Option<String>,
}

/// Normalized incremental unit produced by an upstream adapter.
#[derive(Clone, Debug, PartialEq)]
pub enum UpstreamDelta {
    /// A fragment of assistant text, possibly empty.
    Text { text: String },
    /// A fragment of a streamed tool invocation.
    ToolCall { delta: ToolCallDelta },
}

/// Boxed stream of normalized deltas returned by `ProviderAdapter::start_stream`.
pub type DeltaStream =
    Pin<Box<dyn futures::Stream<Item = Result<UpstreamDelta, ProviderError>> + Send>>;

/// Contract implemented by upstream vendor integrations.
#[async_trait::async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Returns the stable identifier for this adapter.
    fn id(&self) -> ProviderId;

    /// Opens one streaming completion and returns the normalized delta stream.
    ///
    /// Exhaustion of the returned stream marks the natural end of the turn;
    /// an `Err` item is terminal.
    async fn start_stream(
        &self,
        request: CompletionRequest,
    ) -> Result<DeltaStream, ProviderError>;
}
