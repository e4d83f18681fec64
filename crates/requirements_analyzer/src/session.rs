use ai_generation::{GenerationError, Generator};
use checkpoint_dedup::{DedupConfig, DuplicateMatch, Partition};
use chrono::{DateTime, Utc};
use document_processing::{
    clean_text, extract_text, parse_checkpoint_lines, top_words, ExtractionError, WordCount,
};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no document text loaded, load a requirements document first")]
    MissingText,
    #[error("no business rules available, generate the rules first")]
    MissingRules,
    #[error("no checkpoints available, generate the checkpoints first")]
    MissingCheckpoints,
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Outcome of comparing freshly generated checkpoints with the existing ones.
#[derive(Debug, Clone, Serialize)]
pub struct DedupReport {
    pub generated_count: usize,
    pub duplicates: Vec<DuplicateMatch>,
    pub config: DedupConfig,
    pub created_at: DateTime<Utc>,
}

/// Leading slice of the duplicates plus how many were left out.
#[derive(Debug, PartialEq)]
pub struct DuplicatePreview<'a> {
    pub shown: &'a [DuplicateMatch],
    pub remaining: usize,
}

impl DedupReport {
    /// Counts come from `partition`, so they always add up.
    pub fn new(partition: &Partition, config: DedupConfig) -> Self {
        Self {
            generated_count: partition.retained.len() + partition.duplicates.len(),
            duplicates: partition.duplicates.clone(),
            config,
            created_at: Utc::now(),
        }
    }

    pub fn removed_count(&self) -> usize {
        self.duplicates.len()
    }

    pub fn retained_count(&self) -> usize {
        self.generated_count.saturating_sub(self.duplicates.len())
    }

    pub fn preview(&self, limit: usize) -> DuplicatePreview<'_> {
        let shown = &self.duplicates[..self.duplicates.len().min(limit)];
        DuplicatePreview {
            shown,
            remaining: self.duplicates.len() - shown.len(),
        }
    }
}

/// Everything one analysis run accumulates, handed from step to step.
///
/// `existing_checkpoints` is `None` until a reference file is loaded; a
/// loaded but empty file still counts as loaded.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    text: String,
    rules: Vec<String>,
    existing_checkpoints: Option<Vec<String>>,
    checkpoints: Vec<String>,
    dedup_report: Option<DedupReport>,
    test_cases: Vec<String>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract a requirements document and make it the session's source text.
    pub fn load_document(&mut self, path: &Path) -> Result<&str, SessionError> {
        let text = extract_text(path)?;
        self.set_text(text);
        Ok(&self.text)
    }

    pub fn set_text(&mut self, text: String) {
        info!("📄 Session text set ({} characters)", text.chars().count());
        self.text = text;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn word_frequencies(&self, n: usize) -> Vec<WordCount> {
        top_words(&clean_text(&self.text), n)
    }

    pub async fn generate_rules<G>(&mut self, generator: &G) -> Result<&[String], SessionError>
    where
        G: Generator + ?Sized,
    {
        if self.text.trim().is_empty() {
            return Err(SessionError::MissingText);
        }

        self.rules = generator.generate_rules(&self.text).await?;
        info!("✅ {} business rules generated", self.rules.len());
        Ok(&self.rules)
    }

    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    /// Load reference checkpoints, one per non-blank line, from a PDF, Word or text file.
    pub fn load_existing_checkpoints(&mut self, path: &Path) -> Result<usize, SessionError> {
        let text = extract_text(path)?;
        let checkpoints = parse_checkpoint_lines(&text);
        let count = checkpoints.len();
        self.set_existing_checkpoints(checkpoints);
        Ok(count)
    }

    pub fn set_existing_checkpoints(&mut self, checkpoints: Vec<String>) {
        info!("📥 {} existing checkpoints loaded", checkpoints.len());
        self.existing_checkpoints = Some(checkpoints);
    }

    pub fn existing_checkpoints(&self) -> Option<&[String]> {
        self.existing_checkpoints.as_deref()
    }

    /// Generate checkpoints from the rules, dropping those that repeat an
    /// existing checkpoint when a reference set was loaded.
    pub async fn generate_checkpoints<G>(
        &mut self,
        generator: &G,
        dedup_config: &DedupConfig,
    ) -> Result<&[String], SessionError>
    where
        G: Generator + ?Sized,
    {
        if self.rules.is_empty() {
            return Err(SessionError::MissingRules);
        }

        let raw_checkpoints = generator.generate_checkpoints(&self.rules).await?;

        match &self.existing_checkpoints {
            Some(existing) => {
                let partition = dedup_config.partition(&raw_checkpoints, existing);
                let report = DedupReport::new(&partition, *dedup_config);
                if report.removed_count() > 0 {
                    warn!("🔁 {} duplicates removed", report.removed_count());
                } else {
                    info!("🔁 0 duplicates removed");
                }
                self.checkpoints = partition.retained;
                self.dedup_report = Some(report);
            }
            None => {
                self.checkpoints = raw_checkpoints;
                self.dedup_report = None;
            }
        }

        info!("✅ {} checkpoints kept", self.checkpoints.len());
        Ok(&self.checkpoints)
    }

    pub fn checkpoints(&self) -> &[String] {
        &self.checkpoints
    }

    pub fn dedup_report(&self) -> Option<&DedupReport> {
        self.dedup_report.as_ref()
    }

    pub async fn generate_test_cases<G>(&mut self, generator: &G) -> Result<&[String], SessionError>
    where
        G: Generator + ?Sized,
    {
        if self.checkpoints.is_empty() {
            return Err(SessionError::MissingCheckpoints);
        }

        self.test_cases = generator.generate_test_cases(&self.checkpoints).await?;
        info!("✅ {} test cases generated", self.test_cases.len());
        Ok(&self.test_cases)
    }

    pub fn test_cases(&self) -> &[String] {
        &self.test_cases
    }
}
