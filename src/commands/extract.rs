use anyhow::{Context, Result};
use pollscrape::{
    config::Config,
    extraction::{CandidateRecord, PollExtractor, RecordDeduplicator},
    util::truncate_for_display,
};
use std::path::PathBuf;
use tracing::{info, warn};
use url::Url;

/// Output format for extracted records
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON array
    Json,
    /// One summary line per record
    Text,
}

pub async fn extract_files(
    mut config: Config,
    files: Vec<PathBuf>,
    page_url: Option<String>,
    max_records: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    if let Some(max) = max_records {
        config.extraction.max_records = max;
    }
    config.validate()?;

    let page_url = page_url
        .map(|u| Url::parse(&u).with_context(|| format!("Invalid page URL '{}'", u)))
        .transpose()?;

    let extractor = PollExtractor::new(config.extraction.clone());
    let mut dedup = RecordDeduplicator::new();
    let mut records: Vec<CandidateRecord> = Vec::new();

    for file in &files {
        let html = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?;

        match extractor.extract(&html, page_url.as_ref()) {
            Ok(found) => {
                let fresh = dedup.retain_new(found);
                info!("{}: {} records", file.display(), fresh.len());
                records.extend(fresh);
            }
            Err(e) => warn!("Skipping {}: {}", file.display(), e),
        }
    }

    records.truncate(config.extraction.max_records);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        OutputFormat::Text => {
            for record in &records {
                println!("{}", summary_line(record));
            }
            println!("\n{} records from {} files", records.len(), files.len());
        }
    }

    Ok(())
}

fn summary_line(record: &CandidateRecord) -> String {
    let results: Vec<String> = record
        .results
        .iter()
        .map(|r| format!("{} {}%", r.choice, r.pct))
        .collect();
    format!(
        "[{}] {} | {} | {} | {} | {}",
        record.category,
        truncate_for_display(&record.pollster, 40),
        truncate_for_display(&record.race, 40),
        record.date_text,
        record.sample,
        results.join(", ")
    )
}
