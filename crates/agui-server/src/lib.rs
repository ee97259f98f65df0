//! HTTP transport for the AG-UI chat relay.

/// Router, handlers, and shared state.
pub mod api;
/// Environment configuration helpers.
pub mod config;
