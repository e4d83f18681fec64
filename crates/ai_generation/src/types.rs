use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Step of the rules → checkpoints → test cases chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    Rules,
    Checkpoints,
    TestCases,
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationStage::Rules => write!(f, "business rules"),
            GenerationStage::Checkpoints => write!(f, "checkpoints"),
            GenerationStage::TestCases => write!(f, "test cases"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request to generation service failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generation service returned no usable {0}")]
    EmptyResponse(GenerationStage),
    #[error("generation provider error: {0}")]
    Provider(String),
}

/// Backend and credentials used for generation.
#[derive(Clone)]
pub enum Provider {
    AzureOpenAi {
        endpoint: String,
        api_key: String,
        deployment: String,
        api_version: String,
    },
    Anthropic {
        api_key: String,
        model: String,
    },
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::AzureOpenAi { .. } => "azure-openai",
            Provider::Anthropic { .. } => "anthropic",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::AzureOpenAi { deployment, .. } => deployment,
            Provider::Anthropic { model, .. } => model,
        }
    }
}

// Keys stay out of logs
impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::AzureOpenAi {
                endpoint,
                deployment,
                api_version,
                ..
            } => f
                .debug_struct("AzureOpenAi")
                .field("endpoint", endpoint)
                .field("api_key", &"<redacted>")
                .field("deployment", deployment)
                .field("api_version", api_version)
                .finish(),
            Provider::Anthropic { model, .. } => f
                .debug_struct("Anthropic")
                .field("api_key", &"<redacted>")
                .field("model", model)
                .finish(),
        }
    }
}

/// Azure OpenAI chat-completions request body.
#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_keys() {
        let provider = Provider::AzureOpenAi {
            endpoint: "https://example.openai.azure.com/".to_string(),
            api_key: "super-secret".to_string(),
            deployment: "gpt-4o".to_string(),
            api_version: "2024-02-15-preview".to_string(),
        };
        let rendered = format!("{:?}", provider);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("gpt-4o"));

        let anthropic = Provider::Anthropic {
            api_key: "sk-ant-secret".to_string(),
            model: "claude-3-5-sonnet-20241022".to_string(),
        };
        assert!(!format!("{:?}", anthropic).contains("sk-ant-secret"));
        assert_eq!(anthropic.model(), "claude-3-5-sonnet-20241022");
    }
}
