use ai_generation::AIService;
use anyhow::{Context, Result};
use checkpoint_dedup::{DedupConfig, SimilarityMeasure};
use clap::{Args, Parser, Subcommand};
use document_processing::{
    extract_text, format_frequency_report, parse_checkpoint_lines, text_preview,
};
use requirements_analyzer::{
    checkpoint_listing, dedup_from_env, duplicates_summary, lines_export, numbered_export,
    AnalysisSession, Config, DedupReport,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DUPLICATE_PREVIEW_LIMIT: usize = 10;
const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Parser)]
#[command(name = "requirements_analyzer")]
#[command(about = "Derive business rules, checkpoints and test cases from requirements documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract a document and show its most frequent words
    Analyze {
        document: PathBuf,
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
    /// Generate business rules from a document
    Rules {
        document: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Generate checkpoints, dropping those already in an existing list
    Checkpoints {
        document: PathBuf,
        #[arg(long)]
        existing: Option<PathBuf>,
        #[command(flatten)]
        dedup: DedupArgs,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Show a single page of the listing (1-based)
        #[arg(long)]
        page: Option<usize>,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
    /// Generate test cases, running the rule and checkpoint steps first
    TestCases {
        document: PathBuf,
        #[arg(long)]
        existing: Option<PathBuf>,
        #[command(flatten)]
        dedup: DedupArgs,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Compare two checkpoint files offline
    Dedup {
        generated: PathBuf,
        existing: PathBuf,
        #[command(flatten)]
        dedup: DedupArgs,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct DedupArgs {
    /// Similarity at or above which a checkpoint counts as a duplicate
    #[arg(long)]
    threshold: Option<f64>,
    /// ratio or jaccard
    #[arg(long)]
    measure: Option<SimilarityMeasure>,
}

impl DedupArgs {
    fn resolve(&self, base: DedupConfig) -> Result<DedupConfig> {
        let config = DedupConfig::new(
            self.measure.unwrap_or(base.measure()),
            self.threshold.unwrap_or(base.threshold()),
        )?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Analyze { document, top } => {
            let mut session = AnalysisSession::new();
            let text = session.load_document(&document)?;
            info!("🔍 Preview: {}", text_preview(text, 200));
            println!("{}", format_frequency_report(&session.word_frequencies(top)));
        }
        Command::Rules { document, output } => {
            let config = Config::from_env()?;
            let service = AIService::new(config.provider)?;

            let mut session = AnalysisSession::new();
            session.load_document(&document)?;
            let rules = session.generate_rules(&service).await?;
            write_output(output.as_deref(), &lines_export(rules))?;
        }
        Command::Checkpoints {
            document,
            existing,
            dedup,
            output,
            page,
            page_size,
        } => {
            let config = Config::from_env()?;
            let dedup_config = dedup.resolve(config.dedup)?;
            let service = AIService::new(config.provider)?;

            let mut session = prepare_session(&document, existing.as_deref())?;
            session.generate_rules(&service).await?;
            session.generate_checkpoints(&service, &dedup_config).await?;
            report_duplicates(&session);
            // Files always get the full list
            let listing = match output {
                Some(_) => numbered_export(session.checkpoints()),
                None => checkpoint_listing(session.checkpoints(), page, page_size),
            };
            write_output(output.as_deref(), &listing)?;
        }
        Command::TestCases {
            document,
            existing,
            dedup,
            output,
        } => {
            let config = Config::from_env()?;
            let dedup_config = dedup.resolve(config.dedup)?;
            let service = AIService::new(config.provider)?;

            let mut session = prepare_session(&document, existing.as_deref())?;
            session.generate_rules(&service).await?;
            session.generate_checkpoints(&service, &dedup_config).await?;
            report_duplicates(&session);
            let test_cases = session.generate_test_cases(&service).await?;
            write_output(output.as_deref(), &lines_export(test_cases))?;
        }
        Command::Dedup {
            generated,
            existing,
            dedup,
            json,
        } => {
            let dedup_config = dedup.resolve(dedup_from_env()?)?;
            let generated = read_checkpoints(&generated)?;
            let existing = read_checkpoints(&existing)?;

            let partition = dedup_config.partition(&generated, &existing);
            let report = DedupReport::new(&partition, dedup_config);

            if json {
                println!("{}", serde_json::to_string_pretty(&partition)?);
            } else {
                println!("{}", numbered_export(&partition.retained));
                info!("{}", duplicates_summary(&report, DUPLICATE_PREVIEW_LIMIT));
            }
        }
    }

    Ok(())
}

fn prepare_session(document: &Path, existing: Option<&Path>) -> Result<AnalysisSession> {
    let mut session = AnalysisSession::new();
    session.load_document(document)?;
    if let Some(path) = existing {
        let count = session.load_existing_checkpoints(path)?;
        if count == 0 {
            warn!("⚠️ {} contains no checkpoints", path.display());
        }
    }
    Ok(session)
}

fn report_duplicates(session: &AnalysisSession) {
    if let Some(report) = session.dedup_report() {
        info!("{}", duplicates_summary(report, DUPLICATE_PREVIEW_LIMIT));
    }
}

fn read_checkpoints(path: &Path) -> Result<Vec<String>> {
    let text =
        extract_text(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parse_checkpoint_lines(&text))
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("💾 Saved to {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
