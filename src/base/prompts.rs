//! Prompt templates for LLM usage.

/// Placeholder replaced by the caller-supplied ticket description.
pub const DESCRIPTION_PLACEHOLDER: &str = "{description}";

/// Classification prompt.
///
/// The allowed values mirror [`crate::base::types::CATEGORIES`] and [`crate::base::types::PRIORITIES`].
pub const CLASSIFY_PROMPT: &str = r#####"
You are a support ticket classification assistant.

Allowed categories:
billing, technical, account, general

Allowed priorities:
low, medium, high, critical

Return ONLY valid JSON.
Do not include explanation.
Example:
{"category": "billing", "priority": "high"}

Ticket description:
{description}
"#####;
