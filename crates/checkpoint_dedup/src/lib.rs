//! Near-duplicate detection between freshly generated checkpoints and the
//! checkpoints a user already has.
//!
//! The free functions use the default configuration (character ratio,
//! threshold 0.8). Use [`DedupConfig`] to pick another measure or threshold,
//! or [`Deduplicator::with_comparator`] to plug in an external similarity
//! function whose failures propagate to the caller.

mod dedup;
mod normalize;
mod similarity;

pub use dedup::{
    is_similar, partition, remove_duplicates, DedupConfig, DedupError, Deduplicator,
    DuplicateMatch, Partition, DEFAULT_THRESHOLD,
};
pub use normalize::normalize;
pub use similarity::{character_ratio, token_jaccard, Comparator, SimilarityMeasure};
