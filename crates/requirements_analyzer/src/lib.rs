//! Requirements analysis pipeline: document text, business rules,
//! deduplicated checkpoints and test cases.

pub mod config;
pub mod export;
pub mod session;

pub use config::{dedup_from_env, Config};
pub use export::{
    checkpoint_listing, duplicates_summary, lines_export, numbered_export, paginate, Page,
};
pub use session::{AnalysisSession, DedupReport, DuplicatePreview, SessionError};
