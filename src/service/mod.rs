//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by support-desk:
//! - Database services (e.g., SurrealDB)
//! - LLM services (e.g., any OpenAI-compatible API)
//! - Ticket classification on top of the LLM service
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod classifier;
pub mod db;
pub mod llm;
