use crate::normalize::normalize;
use crate::similarity::{Comparator, SimilarityMeasure};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use thiserror::Error;
use tracing::{debug, info};

/// Similarity at or above which two checkpoints count as the same control point.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

#[derive(Debug, Error, PartialEq)]
pub enum DedupError {
    #[error("similarity threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
    #[error("unknown similarity measure '{0}' (expected 'ratio' or 'jaccard')")]
    UnknownMeasure(String),
}

/// A generated checkpoint judged to repeat an existing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    /// Position of the checkpoint in the generated list.
    pub index: usize,
    pub checkpoint: String,
    /// First existing checkpoint that met the threshold.
    pub matched: String,
    pub score: f64,
}

/// Both halves of one deduplication pass. `retained` keeps the generated
/// order; `duplicates` lists the rest, also in generated order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub retained: Vec<String>,
    pub duplicates: Vec<DuplicateMatch>,
}

impl Partition {
    pub fn removed_count(&self) -> usize {
        self.duplicates.len()
    }
}

/// Built-in measure plus threshold. The threshold is always within `[0, 1]`,
/// including when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DedupConfigFields")]
pub struct DedupConfig {
    measure: SimilarityMeasure,
    threshold: f64,
}

#[derive(Deserialize)]
struct DedupConfigFields {
    #[serde(default)]
    measure: SimilarityMeasure,
    #[serde(default = "default_threshold")]
    threshold: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl TryFrom<DedupConfigFields> for DedupConfig {
    type Error = DedupError;

    fn try_from(fields: DedupConfigFields) -> Result<Self, DedupError> {
        DedupConfig::new(fields.measure, fields.threshold)
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            measure: SimilarityMeasure::default(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl DedupConfig {
    pub fn new(measure: SimilarityMeasure, threshold: f64) -> Result<Self, DedupError> {
        validate_threshold(threshold)?;
        Ok(Self { measure, threshold })
    }

    pub fn measure(&self) -> SimilarityMeasure {
        self.measure
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_similar(&self, a: &str, b: &str) -> bool {
        self.measure.score(a, b) >= self.threshold
    }

    pub fn remove_duplicates<G, E>(&self, generated: &[G], existing: &[E]) -> Vec<String>
    where
        G: AsRef<str>,
        E: AsRef<str>,
    {
        self.partition(generated, existing).retained
    }

    pub fn partition<G, E>(&self, generated: &[G], existing: &[E]) -> Partition
    where
        G: AsRef<str>,
        E: AsRef<str>,
    {
        Deduplicator::new(*self)
            .partition(generated, existing)
            .unwrap_or_else(|never: Infallible| match never {})
    }
}

/// Runs a [`Comparator`] against a threshold.
#[derive(Debug, Clone)]
pub struct Deduplicator<C> {
    comparator: C,
    threshold: f64,
}

impl Deduplicator<SimilarityMeasure> {
    /// `config` already holds a validated threshold.
    pub fn new(config: DedupConfig) -> Self {
        Self {
            comparator: config.measure,
            threshold: config.threshold,
        }
    }
}

impl<C: Comparator> Deduplicator<C> {
    /// Wrap an external similarity function.
    pub fn with_comparator(comparator: C, threshold: f64) -> Result<Self, DedupError> {
        validate_threshold(threshold)?;
        Ok(Self {
            comparator,
            threshold,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Both sides are normalized before the comparator sees them.
    pub fn is_similar(&self, a: &str, b: &str) -> Result<bool, C::Error> {
        Ok(self.comparator.similarity(&normalize(a), &normalize(b))? >= self.threshold)
    }

    /// First existing checkpoint similar to `checkpoint`, with its score.
    pub fn find_match<'e, E>(
        &self,
        checkpoint: &str,
        existing: &'e [E],
    ) -> Result<Option<(&'e str, f64)>, C::Error>
    where
        E: AsRef<str>,
    {
        let normalized: Vec<String> = existing.iter().map(|e| normalize(e.as_ref())).collect();
        self.find_normalized_match(&normalize(checkpoint), existing, &normalized)
    }

    fn find_normalized_match<'e, E>(
        &self,
        checkpoint: &str,
        existing: &'e [E],
        normalized_existing: &[String],
    ) -> Result<Option<(&'e str, f64)>, C::Error>
    where
        E: AsRef<str>,
    {
        for (candidate, normalized) in existing.iter().zip(normalized_existing) {
            let score = self.comparator.similarity(checkpoint, normalized)?;
            if score >= self.threshold {
                return Ok(Some((candidate.as_ref(), score)));
            }
        }
        Ok(None)
    }

    pub fn remove_duplicates<G, E>(
        &self,
        generated: &[G],
        existing: &[E],
    ) -> Result<Vec<String>, C::Error>
    where
        G: AsRef<str>,
        E: AsRef<str>,
    {
        Ok(self.partition(generated, existing)?.retained)
    }

    /// Split `generated` into retained and duplicate checkpoints in one pass.
    ///
    /// Only `existing` is used as reference: repeats inside `generated` are
    /// kept, and `existing` is never compared with itself.
    pub fn partition<G, E>(&self, generated: &[G], existing: &[E]) -> Result<Partition, C::Error>
    where
        G: AsRef<str>,
        E: AsRef<str>,
    {
        let mut partition = Partition::default();
        let normalized_existing: Vec<String> =
            existing.iter().map(|e| normalize(e.as_ref())).collect();

        for (index, checkpoint) in generated.iter().enumerate() {
            let checkpoint = checkpoint.as_ref();
            let normalized = normalize(checkpoint);
            match self.find_normalized_match(&normalized, existing, &normalized_existing)? {
                Some((matched, score)) => {
                    debug!(
                        "🔁 Checkpoint #{} duplicates existing one (score: {:.3}): {}",
                        index + 1,
                        score,
                        checkpoint
                    );
                    partition.duplicates.push(DuplicateMatch {
                        index,
                        checkpoint: checkpoint.to_string(),
                        matched: matched.to_string(),
                        score,
                    });
                }
                None => partition.retained.push(checkpoint.to_string()),
            }
        }

        if !existing.is_empty() {
            info!(
                "📋 Deduplication: {} generated, {} existing, {} retained, {} duplicates (threshold: {:.2})",
                generated.len(),
                existing.len(),
                partition.retained.len(),
                partition.duplicates.len(),
                self.threshold
            );
        }

        Ok(partition)
    }
}

/// Default-configuration similarity check.
pub fn is_similar(a: &str, b: &str) -> bool {
    DedupConfig::default().is_similar(a, b)
}

/// Default-configuration removal of generated checkpoints that repeat an
/// existing one.
pub fn remove_duplicates<G, E>(generated: &[G], existing: &[E]) -> Vec<String>
where
    G: AsRef<str>,
    E: AsRef<str>,
{
    DedupConfig::default().remove_duplicates(generated, existing)
}

/// Default-configuration single-pass partition.
pub fn partition<G, E>(generated: &[G], existing: &[E]) -> Partition
where
    G: AsRef<str>,
    E: AsRef<str>,
{
    DedupConfig::default().partition(generated, existing)
}

fn validate_threshold(threshold: f64) -> Result<(), DedupError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(DedupError::InvalidThreshold(threshold))
    }
}
