//! Infrastructure layer for billsplit.
//!
//! File-backed implementations of the core persistence contracts plus
//! configuration loading. Storage is deliberately simple: one JSON
//! collection file holding every stored session.

mod config;
mod json_session_repository;

pub use config::{AppConfig, ExtractionConfig, load_config};
pub use json_session_repository::JsonSessionRepository;
