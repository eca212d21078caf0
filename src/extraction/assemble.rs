//! Record assembly: one candidate record per discovered block

use url::Url;

use super::classify::{
    classify_category, extract_date_text, extract_pollster, extract_race, extract_results_in,
    extract_sample,
};
use super::discovery::{is_noise_href, DiscoveredBlock, LINK_SELECTOR};
use super::types::CandidateRecord;

/// Query parameters dropped from canonical record URLs
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
];

/// Builds candidate records for blocks found on one page
pub struct RecordAssembler<'p> {
    page_url: Option<&'p Url>,
    source_host: Option<String>,
}

impl<'p> RecordAssembler<'p> {
    pub fn new(page_url: Option<&'p Url>) -> Self {
        Self {
            page_url,
            source_host: page_url.and_then(|u| u.host_str()).map(site_host),
        }
    }

    /// Assemble a record, or `None` when the block carries no numeric result
    pub fn assemble(&self, block: &DiscoveredBlock<'_>) -> Option<CandidateRecord> {
        let text = &block.text;

        let results = extract_results_in(&text.lines);
        if results.is_empty() {
            return None;
        }

        Some(CandidateRecord {
            url: self.select_url(block),
            category: classify_category(&text.normalized),
            race: extract_race(&text.lines),
            pollster: extract_pollster(&text.lines),
            date_text: extract_date_text(&text.lines),
            sample: extract_sample(&text.normalized),
            population: String::new(),
            results_text: text.normalized.clone(),
            results,
        })
    }

    /// Pick the record URL: an off-site link inside the block, then the anchor
    /// link, then any link inside the block.
    pub fn select_url(&self, block: &DiscoveredBlock<'_>) -> String {
        let links: Vec<Url> = block
            .element
            .select(&LINK_SELECTOR)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| self.resolve(href))
            .collect();

        links
            .iter()
            .find(|url| self.is_external(url))
            .cloned()
            .or_else(|| block.anchor_href.as_deref().and_then(|href| self.resolve(href)))
            .or_else(|| links.first().cloned())
            .map(|url| canonical_url(&url))
            .unwrap_or_default()
    }

    /// Resolve an href against the page, keeping only non-noise http(s) links
    fn resolve(&self, href: &str) -> Option<Url> {
        if is_noise_href(href) {
            return None;
        }
        let href = href.trim();
        let url = match self.page_url {
            Some(base) => base.join(href).ok()?,
            None => Url::parse(href).ok()?,
        };
        matches!(url.scheme(), "http" | "https").then_some(url)
    }

    fn is_external(&self, url: &Url) -> bool {
        match (&self.source_host, url.host_str()) {
            (Some(source), Some(host)) => site_host(host) != *source,
            (None, Some(_)) => true,
            (_, None) => false,
        }
    }
}

/// Lowercased host without a leading `www.`
fn site_host(host: &str) -> String {
    let host = host.to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => host,
    }
}

/// Strip the fragment and tracking parameters from a link
pub fn canonical_url(url: &Url) -> String {
    let mut canonical = url.clone();
    canonical.set_fragment(None);

    if canonical.query().is_some() {
        let kept: Vec<(String, String)> = canonical
            .query_pairs()
            .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.to_ascii_lowercase().as_str()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            canonical.set_query(None);
        } else {
            canonical.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    canonical.to_string()
}
