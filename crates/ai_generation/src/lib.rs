//! LLM generation of business rules, checkpoints and test cases.

use async_trait::async_trait;

mod ai_service;
mod types;

pub use ai_service::{
    checkpoints_prompt, parse_generated_items, rules_prompt, test_cases_prompt, truncate_source,
    AIService, MAX_SOURCE_CHARS,
};
pub use types::{GenerationError, GenerationStage, Provider};

/// Generation collaborator used by each pipeline step.
#[async_trait(?Send)]
pub trait Generator {
    /// Business rules found in a requirements document.
    async fn generate_rules(&self, text: &str) -> Result<Vec<String>, GenerationError>;

    /// Verifiable checkpoints derived from business rules.
    async fn generate_checkpoints(&self, rules: &[String]) -> Result<Vec<String>, GenerationError>;

    /// One test case per checkpoint.
    async fn generate_test_cases(
        &self,
        checkpoints: &[String],
    ) -> Result<Vec<String>, GenerationError>;
}
