use crate::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, GenerationError, GenerationStage,
    Provider,
};
use crate::Generator;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Source text budget per prompt, in characters.
pub const MAX_SOURCE_CHARS: usize = 15000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const ANTHROPIC_API_VERSION: &str = "2023-06-01";

const SYSTEM_PROMPT: &str = "You are a senior business analyst and QA engineer. \
You read functional specifications and derive precise, verifiable artefacts from them. \
Always answer in the language of the source material.";

static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*•]|\d+[.)])\s+").expect("list marker pattern is valid"));
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[a-zA-Z]*\s*\n(.*?)```").expect("code fence pattern is valid")
});

/// LLM-backed generator for rules, checkpoints and test cases
pub struct AIService {
    provider: Provider,
    http_client: reqwest::Client,
}

impl AIService {
    pub fn new(provider: Provider) -> Result<Self, GenerationError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        info!(
            "✅ AI service initialized (provider: {}, model: {})",
            provider.name(),
            provider.model()
        );
        Ok(Self {
            provider,
            http_client,
        })
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    async fn generate(
        &self,
        stage: GenerationStage,
        prompt: String,
    ) -> Result<Vec<String>, GenerationError> {
        info!("🤖 Generating {} (prompt length: {})", stage, prompt.len());

        let response = match &self.provider {
            Provider::AzureOpenAi {
                endpoint,
                api_key,
                deployment,
                api_version,
            } => {
                self.call_azure_openai(
                    endpoint,
                    api_key,
                    deployment,
                    api_version,
                    &prompt,
                    max_tokens_for(stage),
                )
                .await?
            }
            Provider::Anthropic { api_key, model } => {
                self.call_claude(api_key, model, &prompt, max_tokens_for(stage))
                    .await?
            }
        };

        let items = parse_generated_items(&response);
        if items.is_empty() {
            warn!("⚠️ Generation service returned no {} (response length: {})", stage, response.len());
            return Err(GenerationError::EmptyResponse(stage));
        }

        info!("✅ {} {} generated", items.len(), stage);
        Ok(items)
    }

    async fn call_azure_openai(
        &self,
        endpoint: &str,
        api_key: &str,
        deployment: &str,
        api_version: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, GenerationError> {
        let url = azure_chat_url(endpoint, deployment, api_version);
        debug!("🔗 Calling Azure OpenAI deployment '{}'", deployment);

        let request = ChatCompletionRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.2,
            max_tokens,
        };

        let response = self
            .http_client
            .post(&url)
            .header("api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("❌ Azure OpenAI returned HTTP {}", status.as_u16());
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        info!("✅ Azure OpenAI response received, length: {}", content.len());
        Ok(content)
    }

    async fn call_claude(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, GenerationError> {
        debug!("🔗 Calling Claude API with prompt length: {}", prompt.len());

        let content = format!("{}\n\n{}", SYSTEM_PROMPT, prompt);
        let request = anthropic_sdk::Client::new()
            .version(ANTHROPIC_API_VERSION)
            .auth(api_key)
            .model(model)
            .messages(&json!([
                {"role": "user", "content": content}
            ]))
            .max_tokens(max_tokens as i32)
            .build()
            .map_err(|e| GenerationError::Provider(format!("failed to build Claude request: {}", e)))?;

        let message = Arc::new(Mutex::new(String::new()));
        let message_clone = Arc::clone(&message);

        request
            .execute(move |text| {
                let message_clone = Arc::clone(&message_clone);
                async move {
                    if let Ok(mut message) = message_clone.lock() {
                        message.push_str(&text);
                    }
                }
            })
            .await
            .map_err(|e| GenerationError::Provider(format!("Claude request failed: {}", e)))?;

        let response_text = message
            .lock()
            .map(|text| text.clone())
            .map_err(|_| GenerationError::Provider("Claude response buffer poisoned".to_string()))?;

        info!("✅ Claude API response received, length: {}", response_text.len());
        Ok(response_text)
    }
}

#[async_trait(?Send)]
impl Generator for AIService {
    async fn generate_rules(&self, text: &str) -> Result<Vec<String>, GenerationError> {
        self.generate(GenerationStage::Rules, rules_prompt(text)).await
    }

    async fn generate_checkpoints(&self, rules: &[String]) -> Result<Vec<String>, GenerationError> {
        self.generate(GenerationStage::Checkpoints, checkpoints_prompt(rules))
            .await
    }

    async fn generate_test_cases(
        &self,
        checkpoints: &[String],
    ) -> Result<Vec<String>, GenerationError> {
        self.generate(GenerationStage::TestCases, test_cases_prompt(checkpoints))
            .await
    }
}

fn max_tokens_for(stage: GenerationStage) -> u32 {
    match stage {
        GenerationStage::Rules => 2000,
        GenerationStage::Checkpoints => 3000,
        GenerationStage::TestCases => 4000,
    }
}

pub(crate) fn azure_chat_url(endpoint: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        endpoint.trim_end_matches('/'),
        deployment,
        api_version
    )
}

/// Cut `text` to [`MAX_SOURCE_CHARS`] characters on a char boundary.
pub fn truncate_source(text: &str) -> String {
    match text.char_indices().nth(MAX_SOURCE_CHARS) {
        Some((cut, _)) => {
            warn!(
                "📄 Truncating source text from {} to {} chars",
                text.chars().count(),
                MAX_SOURCE_CHARS
            );
            format!("{}...[TRUNCATED]", &text[..cut])
        }
        None => text.to_string(),
    }
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn rules_prompt(text: &str) -> String {
    format!(
        r#"Extract every business rule from the following requirements document.
A business rule is a single, self-contained statement of how the system must behave
(calculations, validations, constraints, conditions, authorisations).

DOCUMENT:
{}

Return ONLY a JSON array of strings, one business rule per element."#,
        truncate_source(text)
    )
}

pub fn checkpoints_prompt(rules: &[String]) -> String {
    format!(
        r#"For each business rule below, derive the control points a tester must verify.
Each checkpoint must be atomic, observable and verifiable.

BUSINESS RULES:
{}

Return ONLY a JSON array of strings, one checkpoint per element."#,
        truncate_source(&numbered(rules))
    )
}

pub fn test_cases_prompt(checkpoints: &[String]) -> String {
    format!(
        r#"Write one test case for each checkpoint below. Each test case contains a title,
preconditions, numbered steps, test data and the expected result, formatted in Markdown.

CHECKPOINTS:
{}

Return ONLY a JSON array of strings, one Markdown test case per element."#,
        truncate_source(&numbered(checkpoints))
    )
}

/// Turn a model response into a list of items.
///
/// A JSON array (bare, inside a code fence, or under an `items` key) is
/// preferred; anything else is read line by line with list markers removed.
pub fn parse_generated_items(response: &str) -> Vec<String> {
    let trimmed = response.trim();
    let candidate = CODE_FENCE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(trimmed);

    if let Ok(json_response) = serde_json::from_str::<Value>(candidate) {
        let array = match &json_response {
            Value::Array(items) => Some(items),
            Value::Object(map) => map.get("items").and_then(Value::as_array),
            _ => None,
        };
        if let Some(items) = array {
            return items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                })
                .filter(|item| !item.is_empty())
                .collect();
        }
    }

    debug!("🔍 Response is not a JSON list, falling back to line parsing");
    candidate
        .lines()
        .map(str::trim)
        .map(|line| LIST_MARKER.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}
