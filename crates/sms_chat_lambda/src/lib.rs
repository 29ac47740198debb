//! Lambda handlers and platform adapters for chat teardown and outbound SMS.
//!
//! This crate owns runtime integration details (API Gateway event shapes,
//! the communications platform REST client, environment configuration and
//! logging) and delegates contracts and request building to `sms_chat_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod logging;
