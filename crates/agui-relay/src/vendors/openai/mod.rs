//! OpenAI Chat Completions integration.
//!
//! Vendor-specific configuration lives here so the root relay API can remain
//! provider-agnostic.
mod adapter;
mod config;
pub(crate) mod transport;

pub use adapter::OpenAiProvider;
pub use config::OpenAiClientConfig;
