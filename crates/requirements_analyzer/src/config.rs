use ai_generation::Provider;
use anyhow::{anyhow, Context, Result};
use checkpoint_dedup::{DedupConfig, SimilarityMeasure, DEFAULT_THRESHOLD};

pub const DEFAULT_AZURE_ENDPOINT: &str = "https://chat-genai.openai.azure.com/";
pub const DEFAULT_AZURE_MODEL: &str = "gpt-4o";
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-02-15-preview";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Configuration from environment
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: Provider,
    pub dedup: DedupConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            provider: provider_from_lookup(&lookup)?,
            dedup: dedup_from_lookup(&lookup)?,
        })
    }
}

/// Deduplication settings only; needs no credentials.
pub fn dedup_from_env() -> Result<DedupConfig> {
    dedup_from_lookup(&|key: &str| std::env::var(key).ok())
}

fn provider_from_lookup<F>(lookup: &F) -> Result<Provider>
where
    F: Fn(&str) -> Option<String>,
{
    let provider = lookup("LLM_PROVIDER").unwrap_or_else(|| "azure".to_string());

    match provider.trim().to_lowercase().as_str() {
        "azure" | "azure-openai" | "openai" => Ok(Provider::AzureOpenAi {
            api_key: lookup("AZURE_OPENAI_API_KEY")
                .ok_or_else(|| anyhow!("AZURE_OPENAI_API_KEY not set"))?,
            endpoint: lookup("AZURE_OPENAI_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_AZURE_ENDPOINT.to_string()),
            deployment: lookup("AZURE_OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_AZURE_MODEL.to_string()),
            api_version: lookup("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string()),
        }),
        "anthropic" | "claude" => Ok(Provider::Anthropic {
            api_key: lookup("ANTHROPIC_API_KEY")
                .ok_or_else(|| anyhow!("ANTHROPIC_API_KEY not set"))?,
            model: lookup("ANTHROPIC_MODEL")
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
        }),
        other => Err(anyhow!(
            "unknown LLM_PROVIDER '{}' (expected 'azure' or 'anthropic')",
            other
        )),
    }
}

fn dedup_from_lookup<F>(lookup: &F) -> Result<DedupConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let threshold = match lookup("DEDUP_THRESHOLD") {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .with_context(|| format!("DEDUP_THRESHOLD '{}' is not a number", raw))?,
        None => DEFAULT_THRESHOLD,
    };
    let measure = match lookup("DEDUP_MEASURE") {
        Some(raw) => raw.parse::<SimilarityMeasure>()?,
        None => SimilarityMeasure::default(),
    };

    Ok(DedupConfig::new(measure, threshold)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_azure_defaults() {
        let config = Config::from_lookup(lookup_from(&[("AZURE_OPENAI_API_KEY", "k")])).unwrap();

        match config.provider {
            Provider::AzureOpenAi {
                endpoint,
                deployment,
                api_version,
                ..
            } => {
                assert_eq!(endpoint, DEFAULT_AZURE_ENDPOINT);
                assert_eq!(deployment, "gpt-4o");
                assert_eq!(api_version, DEFAULT_AZURE_API_VERSION);
            }
            other => panic!("unexpected provider {:?}", other),
        }
        assert_eq!(config.dedup, DedupConfig::default());
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("AZURE_OPENAI_API_KEY"));
    }

    #[test]
    fn test_anthropic_provider() {
        let config = Config::from_lookup(lookup_from(&[
            ("LLM_PROVIDER", "anthropic"),
            ("ANTHROPIC_API_KEY", "k"),
            ("ANTHROPIC_MODEL", "claude-test"),
        ]))
        .unwrap();
        assert_eq!(config.provider.model(), "claude-test");
    }

    #[test]
    fn test_dedup_settings() {
        let config = Config::from_lookup(lookup_from(&[
            ("AZURE_OPENAI_API_KEY", "k"),
            ("DEDUP_THRESHOLD", "0.9"),
            ("DEDUP_MEASURE", "jaccard"),
        ]))
        .unwrap();
        assert_eq!(config.dedup.threshold(), 0.9);
        assert_eq!(config.dedup.measure(), SimilarityMeasure::TokenJaccard);
    }

    #[test]
    fn test_invalid_dedup_settings() {
        assert!(Config::from_lookup(lookup_from(&[
            ("AZURE_OPENAI_API_KEY", "k"),
            ("DEDUP_THRESHOLD", "high"),
        ]))
        .is_err());
        assert!(Config::from_lookup(lookup_from(&[
            ("AZURE_OPENAI_API_KEY", "k"),
            ("DEDUP_THRESHOLD", "1.2"),
        ]))
        .is_err());
        assert!(Config::from_lookup(lookup_from(&[("LLM_PROVIDER", "mistral")])).is_err());
    }
}
