//! Ticket classification backed by an LLM.
//!
//! The classifier renders the configured prompt around a ticket description,
//! sends it through an [`LlmClient`], and pulls a category/priority suggestion out
//! of the reply. Models do not reliably return bare JSON, so the reply is cut down
//! to its outermost `{ ... }` span before parsing.

use anyhow::{Context, anyhow};
use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

use crate::base::{
    config::Config,
    prompts::DESCRIPTION_PLACEHOLDER,
    types::{Res, Suggestion},
};

use super::llm::LlmClient;

/// Suggests a category and priority for a ticket description.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Classifier {
    llm: LlmClient,
    prompt_template: String,
}

impl Classifier {
    pub fn new(config: &Config, llm: LlmClient) -> Self {
        Self {
            llm,
            prompt_template: config.classify_prompt_template.clone(),
        }
    }

    /// Embed the description verbatim into the prompt template.
    pub fn render_prompt(&self, description: &str) -> String {
        self.prompt_template.replacen(DESCRIPTION_PLACEHOLDER, description, 1)
    }

    /// Ask the LLM for a suggestion; one outbound call, no retries.
    #[instrument(name = "Classifier::classify", skip_all)]
    pub async fn classify(&self, description: &str) -> Res<Suggestion> {
        let prompt = self.render_prompt(description);
        let reply = self.llm.get_chat_completion(&prompt).await?;

        let suggestion = parse_suggestion(&reply)?;
        info!(category = ?suggestion.suggested_category, priority = ?suggestion.suggested_priority, "Classified ticket.");

        Ok(suggestion)
    }
}

/// Return the span from the first `{` to the last `}` of `reply`, inclusive.
pub fn extract_json_object(reply: &str) -> Res<&str> {
    let start = reply.find('{').ok_or_else(|| anyhow!("LLM reply contains no JSON object"))?;
    let end = reply
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| anyhow!("LLM reply contains no closing brace for its JSON object"))?;

    Ok(&reply[start..=end])
}

/// Parse an LLM reply into a [`Suggestion`].
///
/// Missing or `null` keys become `None`. Non-string values are ignored.
pub fn parse_suggestion(reply: &str) -> Res<Suggestion> {
    let json = extract_json_object(reply.trim())?;
    let object: Map<String, Value> = serde_json::from_str(json).context("LLM reply is not a valid JSON object")?;

    Ok(Suggestion {
        suggested_category: string_field(&object, "category"),
        suggested_priority: string_field(&object, "priority"),
    })
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(value) => Some(value.clone()),
        Value::Null => None,
        other => {
            warn!("Ignoring non-string `{key}` in LLM reply: {other}");
            None
        }
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use mockall::mock;

    use super::*;
    use crate::{
        base::{config::ConfigInner, prompts::CLASSIFY_PROMPT},
        service::llm::GenericLlmClient,
    };

    mock! {
        pub Llm {}

        #[async_trait]
        impl GenericLlmClient for Llm {
            async fn get_chat_completion(&self, prompt: &str) -> Res<String>;
        }
    }

    fn create_test_classifier(llm: MockLlm) -> Classifier {
        let config = Config {
            inner: Arc::new(ConfigInner {
                llm_api_key: "test_key".to_string(),
                classify_prompt_template: CLASSIFY_PROMPT.to_string(),
                ..Default::default()
            }),
        };

        Classifier::new(&config, LlmClient::new(Arc::new(llm)))
    }

    #[test]
    fn test_extract_plain_object() {
        assert_eq!(extract_json_object(r#"{"a": 1}"#).unwrap(), r#"{"a": 1}"#);
    }

    #[test]
    fn test_extract_takes_outermost_span() {
        let reply = r#"Here: {"category": "billing", "meta": {"x": 1}} and {"y": 2} done"#;

        assert_eq!(extract_json_object(reply).unwrap(), r#"{"category": "billing", "meta": {"x": 1}} and {"y": 2}"#);
    }

    #[test]
    fn test_extract_without_braces_fails() {
        assert!(extract_json_object("billing, high").is_err());
        assert!(extract_json_object("} backwards {").is_err());
        assert!(extract_json_object("{ never closed").is_err());
    }

    #[test]
    fn test_parse_bare_json() {
        let suggestion = parse_suggestion(r#"{"category": "billing", "priority": "high"}"#).unwrap();

        assert_eq!(suggestion.suggested_category.as_deref(), Some("billing"));
        assert_eq!(suggestion.suggested_priority.as_deref(), Some("high"));
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let suggestion = parse_suggestion(r#"Sure! {"category": "technical", "priority": "low"} Hope that helps."#).unwrap();

        assert_eq!(suggestion.suggested_category.as_deref(), Some("technical"));
        assert_eq!(suggestion.suggested_priority.as_deref(), Some("low"));
    }

    #[test]
    fn test_parse_json_in_code_fence() {
        let reply = "```json\n{\"category\": \"account\", \"priority\": \"critical\"}\n```";
        let suggestion = parse_suggestion(reply).unwrap();

        assert_eq!(suggestion.suggested_category.as_deref(), Some("account"));
        assert_eq!(suggestion.suggested_priority.as_deref(), Some("critical"));
    }

    #[test]
    fn test_parse_missing_keys_are_none() {
        let suggestion = parse_suggestion(r#"{"category": "general"}"#).unwrap();

        assert_eq!(suggestion.suggested_category.as_deref(), Some("general"));
        assert_eq!(suggestion.suggested_priority, None);

        let suggestion = parse_suggestion(r#"{"priority": null, "category": 3}"#).unwrap();

        assert_eq!(suggestion, Suggestion::default());
    }

    #[test]
    fn test_parse_malformed_json_fails() {
        assert!(parse_suggestion(r#"{"category": billing}"#).is_err());
        assert!(parse_suggestion("no json here").is_err());
    }

    #[test]
    fn test_render_prompt_embeds_description_and_allowed_values() {
        let classifier = create_test_classifier(MockLlm::new());
        let prompt = classifier.render_prompt("My invoice is wrong.");

        assert!(prompt.contains("My invoice is wrong."));
        assert!(prompt.contains("billing, technical, account, general"));
        assert!(prompt.contains("low, medium, high, critical"));
        assert!(prompt.contains(r#"{"category": "billing", "priority": "high"}"#));
        assert!(!prompt.contains(DESCRIPTION_PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_classify_sends_rendered_prompt() {
        let mut llm = MockLlm::new();
        llm.expect_get_chat_completion()
            .withf(|prompt| prompt.contains("Cannot log in since yesterday."))
            .times(1)
            .returning(|_| Ok(r#"{"category": "account", "priority": "medium"}"#.to_string()));

        let classifier = create_test_classifier(llm);
        let suggestion = classifier.classify("Cannot log in since yesterday.").await.unwrap();

        assert_eq!(suggestion.suggested_category.as_deref(), Some("account"));
        assert_eq!(suggestion.suggested_priority.as_deref(), Some("medium"));
    }

    #[tokio::test]
    async fn test_classify_propagates_llm_errors() {
        let mut llm = MockLlm::new();
        llm.expect_get_chat_completion().times(1).returning(|_| Err(anyhow!("provider unavailable")));

        let classifier = create_test_classifier(llm);
        let err = classifier.classify("Anything").await.unwrap_err();

        assert!(err.to_string().contains("provider unavailable"));
    }
}
