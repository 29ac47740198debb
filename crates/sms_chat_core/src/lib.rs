//! Shared outbound-SMS and chat-teardown domain primitives.
//!
//! This crate owns request/response contracts, validation, request builders
//! for the communications platform, and the tagged handler error. It
//! intentionally excludes HTTP transport and Lambda runtime concerns, which
//! live in `sms_chat_lambda`.

pub mod attributes;
pub mod contract;
pub mod error;
pub mod flows;
pub mod outbound;
pub mod projection;
pub mod resources;
