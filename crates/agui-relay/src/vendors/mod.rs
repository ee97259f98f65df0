//! Vendor-specific upstream integrations.

pub mod openai;
