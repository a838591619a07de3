//! Core components, types, and utilities for support-desk.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - The prompt template for ticket classification.
//! - Ticket domain types and result handling.

pub mod config;
pub mod prompts;
pub mod types;
