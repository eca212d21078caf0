use anyhow::{Context, Result};
use pollscrape::{
    config::Config,
    harvest::{FileSource, Harvester, HttpSource, PageSource},
};
use std::path::PathBuf;
use tracing::info;
use url::Url;

pub async fn harvest_pages(
    mut config: Config,
    urls: Vec<String>,
    output: Option<PathBuf>,
    min_records: Option<usize>,
    snapshots: Option<PathBuf>,
) -> Result<()> {
    if !urls.is_empty() {
        config.harvest.pages = urls;
    }
    if let Some(output) = output {
        config.harvest.output = output;
    }
    if let Some(min) = min_records {
        config.harvest.min_records = min;
    }
    config.validate()?;

    let pages = config
        .harvest
        .pages
        .iter()
        .map(|p| Url::parse(p).with_context(|| format!("Invalid page URL '{}'", p)))
        .collect::<Result<Vec<_>>>()?;
    if pages.is_empty() {
        anyhow::bail!("No pages to harvest: pass URLs or set [harvest].pages");
    }

    match snapshots {
        Some(dir) => {
            info!("Reading snapshots from {}", dir.display());
            let source = FileSource::new(dir).with_max_frames(config.fetch.max_frames);
            run(source, &config, &pages).await
        }
        None => {
            let source = HttpSource::new(config.fetch.clone())
                .context("Failed to create HTTP client")?;
            run(source, &config, &pages).await
        }
    }
}

async fn run<S: PageSource>(source: S, config: &Config, pages: &[Url]) -> Result<()> {
    info!("Harvesting {} pages", pages.len());

    let harvester = Harvester::from_config(source, config);
    let report = harvester.run(pages).await.context("Harvest failed")?;
    report.write(&config.harvest.output)?;

    println!(
        "Wrote {} polls from {} pages to {}",
        report.poll_count(),
        pages.len(),
        config.harvest.output.display()
    );
    Ok(())
}
