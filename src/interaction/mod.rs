//! HTTP request handling for support-desk.
//!
//! This module provides the handlers behind the HTTP surface:
//! - Listing, creating, and updating tickets
//! - Aggregate ticket statistics
//! - LLM-backed category/priority suggestions

pub mod classify;
pub mod error;
pub mod stats;
pub mod tickets;
pub mod validation;
