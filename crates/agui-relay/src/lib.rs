//! Streaming relay for an AG-UI style chat agent.
//!
//! One turn at a time, the relay opens an upstream completion stream and
//! republishes it as typed [`ChatEvent`]s: progress notices, verbatim text
//! fragments, and at most one generated UI component with its confirmation.
//! Vendor-specific integrations are namespaced under `vendors::*`.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use agui_relay::vendors::openai::OpenAiProvider;
//! use agui_relay::{ChatRequest, RelayError, stream_chat};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), RelayError> {
//! let provider = Arc::new(OpenAiProvider::from_env()?);
//!
//! let mut stream = stream_chat(
//!     provider,
//!     ChatRequest {
//!         message: "Show me the weather in Paris".into(),
//!         history: Vec::new(),
//!     },
//! );
//!
//! while let Some(event) = stream.next_event().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

/// Built-in agent definition: system prompt and the `generate_ui` tool.
pub mod agent;
/// Public error types used by the relay API.
pub mod errors;
/// Typed events relayed to the client.
pub mod event;
/// Upstream adapter contracts and normalized delta types.
pub mod provider;
/// Relay entry point and streaming handle.
pub mod relay;
/// Per-turn invocation accumulation and finalization.
mod turn;
/// Vendor-specific integrations.
pub mod vendors;

pub use errors::{ProviderError, RelayError};
pub use event::{ActivityStatus, ActivityUpdate, ChatEvent, UiComponent};
pub use provider::{
    ChatMessage, CompletionRequest, DeltaStream, ProviderAdapter, ProviderId, ToolCallDelta,
    ToolSpec, UpstreamDelta,
};
pub use relay::{ChatRequest, ChatStream, stream_chat};
