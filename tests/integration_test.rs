//! Integration tests for pollscrape
//!
//! These tests run the extractor and the harvester end to end over saved pages.

use pollscrape::{
    config::{Config, FetchConfig, HarvestConfig},
    extraction::{normalize_text, ExtractorConfig, PollCategory, PollExtractor},
    harvest::{FileSource, HarvestError, Harvester, PollReport},
};
use tempfile::TempDir;
use url::Url;

const ACME_CARD: &str = r#"
  <div class="poll">
    <div>Pollster: Acme Research</div>
    <div>Generic Ballot</div>
    <div>Jan 3-5, 2026</div>
    <div>n=1,204</div>
    <ul><li>Democrats 47%</li><li>Republicans 44%</li></ul>
    <a href="/polls/acme-generic#details">details</a>
    <a href="https://acme.example/release?utm_source=feed">release</a>
  </div>"#;

fn latest_page() -> String {
    format!(
        r#"<html>
<head><title>Latest Polls</title></head>
<body>
<header><nav><a href="/">Home</a> <a href="/senate">Senate polls 47% LV</a></nav></header>
<main>
  {ACME_CARD}
  <div class="poll">
    <div>Keystone Polling</div>
    <div>PA Governor</div>
    <div>2/10-2/12/26</div>
    <div>650 rv</div>
    <ul><li>Shapiro 52%</li><li>Mastriano 41%</li></ul>
    <a href="/polls/keystone">details</a>
  </div>
  {ACME_CARD}
  <div class="poll">
    <div>Lakeside Survey</div>
    <div>Trump approval</div>
    <div>Mar 1, 2026</div>
    <ul><li>Approve 41%</li><li>Disapprove 55%</li></ul>
    <a href="https://twitter.com/lakeside">share</a>
    <a href="https://lakeside.example/approval">release</a>
  </div>
  <article>
    <h3>Riverside Polls</h3>
    <p>TX Senate · Oct 2-4, 2026 · 900 LV</p>
    <ul><li>Cruz 48%</li><li>Allred 45%</li></ul>
  </article>
</main>
<footer><a href="mailto:desk@polls.example">Contact</a></footer>
</body>
</html>"#
    )
}

fn page_url() -> Url {
    Url::parse("https://polls.example/latest").unwrap()
}

#[test]
fn test_extracts_records_from_page() {
    let extractor = PollExtractor::default();
    let records = extractor.extract(&latest_page(), Some(&page_url())).unwrap();

    let pollsters: Vec<&str> = records.iter().map(|r| r.pollster.as_str()).collect();
    assert_eq!(
        pollsters,
        vec!["Acme Research", "Keystone Polling", "Lakeside Survey", "Riverside Polls"]
    );

    let acme = &records[0];
    assert_eq!(acme.category, PollCategory::GenericBallot);
    assert_eq!(acme.race, "Generic Ballot");
    assert_eq!(acme.date_text, "Jan 3-5, 2026");
    assert_eq!(acme.sample, "n=1,204");
    assert_eq!(acme.url, "https://acme.example/release");
    assert_eq!(acme.results.len(), 2);
    assert_eq!(acme.results[0].choice, "Democrats");
    assert_eq!(acme.results[0].pct, 47.0);
    assert_eq!(acme.results[1].choice, "Republicans");
    assert_eq!(acme.results[1].pct, 44.0);

    let keystone = &records[1];
    assert_eq!(keystone.category, PollCategory::Governor);
    assert_eq!(keystone.race, "PA Governor");
    assert!(keystone.date_text.starts_with("2/10"));
    assert_eq!(keystone.sample, "650 RV");
    assert_eq!(keystone.url, "https://polls.example/polls/keystone");

    let lakeside = &records[2];
    assert_eq!(lakeside.category, PollCategory::Approval);
    assert_eq!(lakeside.url, "https://lakeside.example/approval");
    assert_eq!(lakeside.sample, "");

    let riverside = &records[3];
    assert_eq!(riverside.category, PollCategory::Senate);
    assert_eq!(riverside.url, "");
    assert_eq!(riverside.results[0].choice, "Cruz");
}

#[test]
fn test_output_invariants() {
    let records = PollExtractor::default()
        .extract(&latest_page(), Some(&page_url()))
        .unwrap();

    for record in &records {
        assert!(!record.results.is_empty());
        assert!(record.results.iter().all(|r| r.pct.is_finite() && (0.0..=100.0).contains(&r.pct)));
        assert_eq!(normalize_text(&record.results_text), record.results_text);
        assert!(record.pollster.chars().count() <= 100);
        assert!(record.population.is_empty());
        assert!(!record.results_text.contains("Home"));
    }
}

#[test]
fn test_out_of_range_blocks_are_never_selected() {
    let filler = "Smith 47% Jones 43% senate poll of likely voters. ".repeat(60);
    let html = format!(
        r#"<html><body>
             <div><a href="https://a.example/">LV 9%</a></div>
             <div>{filler}<a href="https://b.example/">release</a></div>
           </body></html>"#
    );
    let records = PollExtractor::default().extract(&html, None).unwrap();
    assert!(records.is_empty(), "unexpected records: {records:?}");
}

#[test]
fn test_record_cap() {
    let cards: String = (0..30)
        .map(|i| {
            format!(
                r#"<div><div>Firm {i}</div><div>Senate poll</div>
                   <ul><li>Smith {}%</li><li>Jones {}%</li></ul>
                   <a href="https://firm{i}.example/">release</a></div>"#,
                40 + i % 10,
                50 - i % 10
            )
        })
        .collect();
    let html = format!("<html><body>{cards}</body></html>");

    let extractor = PollExtractor::new(ExtractorConfig {
        max_records: 7,
        ..Default::default()
    });
    let records = extractor.extract(&html, None).unwrap();
    assert_eq!(records.len(), 7);
    assert_eq!(records[0].pollster, "Firm 0");
}

#[test]
fn test_blank_document_is_an_error() {
    assert!(PollExtractor::default().extract(" \n ", None).is_err());
}

fn write_snapshot(root: &std::path::Path, rel: &str, html: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, html).unwrap();
}

fn offline_harvester(root: &std::path::Path, min_records: usize) -> Harvester<FileSource> {
    let mut config = Config::default();
    config.fetch = FetchConfig {
        max_attempts: 1,
        initial_backoff_ms: 0,
        max_backoff_ms: 0,
        ..Default::default()
    };
    config.harvest = HarvestConfig {
        source: "polls.example".to_string(),
        min_records,
        ..Default::default()
    };
    Harvester::from_config(FileSource::new(root), &config)
}

#[tokio::test]
async fn test_harvest_snapshots_to_report() {
    let dir = TempDir::new().unwrap();
    write_snapshot(dir.path(), "polls.example/latest.html", &latest_page());
    write_snapshot(
        dir.path(),
        "polls.example/latest.frame1.html",
        &format!("<html><body>{ACME_CARD}</body></html>"),
    );
    write_snapshot(
        dir.path(),
        "polls.example/senate/index.html",
        r#"<html><body><section>
             <h3>Bluebonnet Research</h3>
             <p>TX Senate · Sep 9-12, 2026 · n=1,010</p>
             <ul><li>Cruz 47%</li><li>Allred 46%</li></ul>
           </section></body></html>"#,
    );

    let harvester = offline_harvester(dir.path(), 5);
    let pages = [
        page_url(),
        Url::parse("https://polls.example/senate/").unwrap(),
        Url::parse("https://polls.example/missing").unwrap(),
    ];
    let report = harvester.run(&pages).await.unwrap();

    assert_eq!(report.poll_count(), 5);
    assert_eq!(report.polls[4].pollster, "Bluebonnet Research");
    assert_eq!(report.source_pages.len(), 3);

    let out = dir.path().join("out/polls.json");
    report.write(&out).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["source"], "polls.example");
    assert!(json["updatedAt"].as_str().is_some());
    assert_eq!(json["polls"].as_array().unwrap().len(), 5);
    assert_eq!(json["polls"][0]["category"], "generic_ballot");
    assert!(json["polls"][0]["resultsText"].as_str().unwrap().contains("Acme Research"));

    let reread = PollReport::read(&out).unwrap();
    assert_eq!(reread.poll_count(), 5);
}

#[tokio::test]
async fn test_harvest_reports_too_few_records() {
    let dir = TempDir::new().unwrap();
    write_snapshot(dir.path(), "polls.example/latest.html", &latest_page());

    let harvester = offline_harvester(dir.path(), 10);
    match harvester.run(&[page_url()]).await {
        Err(HarvestError::TooFewRecords { found, required }) => {
            assert_eq!(found, 4);
            assert_eq!(required, 10);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_harvest_fails_when_every_page_fails() {
    let dir = TempDir::new().unwrap();
    let harvester = offline_harvester(dir.path(), 0);
    let result = harvester.run(&[page_url()]).await;
    assert!(matches!(result, Err(HarvestError::Fetch { .. })));
}
