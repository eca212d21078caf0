//! Poll block discovery
//!
//! Two passes over the DOM:
//! - Link-driven: walk up from each content link to the smallest ancestor that
//!   looks like a single poll
//! - Container scan: only when the first pass finds too few blocks, test generic
//!   containers directly so polls without any outbound link are still found

use ego_tree::NodeId;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use url::Url;

use super::text::{render_block, BlockText};
use super::types::ExtractorConfig;

pub(crate) static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid link selector"));

static CONTAINER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div, li, p, article, section").expect("valid container selector")
});

static DOMAIN_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:lv|rv|poll\w*|survey\w*|approv\w*|disapprov\w*|ballot\w*|senate|governor\w*|house|primar\w*|republican\w*|democrat\w*|gop|dem)\b",
    )
    .expect("valid domain keyword pattern")
});

/// Tags that mark page chrome rather than content
const CHROME_TAGS: &[&str] = &["header", "nav", "footer"];

/// ARIA roles equivalent to the chrome tags
const CHROME_ROLES: &[&str] = &["banner", "navigation", "contentinfo"];

/// Link targets that never point at a poll source
const SOCIAL_DOMAINS: &[&str] = &[
    "twitter.com",
    "x.com",
    "facebook.com",
    "instagram.com",
    "youtube.com",
    "tiktok.com",
    "linkedin.com",
    "threads.net",
];

/// Decides whether the normalized text of an element is a poll block.
pub trait BlockPredicate {
    fn accepts(&self, text: &str) -> bool;
}

impl<F> BlockPredicate for F
where
    F: Fn(&str) -> bool,
{
    fn accepts(&self, text: &str) -> bool {
        self(text)
    }
}

/// Default poll-likeness rule: a percent sign, bounded length, and a polling keyword.
#[derive(Debug, Clone, Copy)]
pub struct PollLikeness {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl PollLikeness {
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self {
            min_chars: config.min_block_chars,
            max_chars: config.max_block_chars,
        }
    }
}

impl BlockPredicate for PollLikeness {
    fn accepts(&self, text: &str) -> bool {
        if !text.contains('%') {
            return false;
        }
        let len = text.chars().count();
        if len < self.min_chars || len > self.max_chars {
            return false;
        }
        DOMAIN_KEYWORD_RE.is_match(text)
    }
}

/// A DOM element believed to hold exactly one poll
#[derive(Debug, Clone)]
pub struct DiscoveredBlock<'a> {
    /// The enclosing element
    pub element: ElementRef<'a>,
    /// Rendered text of `element`
    pub text: BlockText,
    /// href of the link the block was reached from, if any
    pub anchor_href: Option<String>,
}

/// Finds poll blocks in a parsed document
pub struct BlockDiscoverer<'c, P> {
    config: &'c ExtractorConfig,
    predicate: P,
}

impl<'c> BlockDiscoverer<'c, PollLikeness> {
    /// Discoverer using the default poll-likeness rule
    pub fn with_default_predicate(config: &'c ExtractorConfig) -> Self {
        Self::new(config, PollLikeness::from_config(config))
    }
}

impl<'c, P: BlockPredicate> BlockDiscoverer<'c, P> {
    pub fn new(config: &'c ExtractorConfig, predicate: P) -> Self {
        Self { config, predicate }
    }

    /// Discover poll blocks in document order, bounded by `max_blocks`.
    pub fn discover<'a>(&self, document: &'a Html) -> Vec<DiscoveredBlock<'a>> {
        let mut pass = DiscoveryPass::default();

        self.link_pass(document, &mut pass);
        let linked = pass.blocks.len();

        if linked < self.config.fallback_threshold {
            self.container_pass(document, &mut pass);
        }

        tracing::debug!(
            linked,
            total = pass.blocks.len(),
            rendered = pass.rendered.len(),
            "Block discovery finished"
        );

        pass.blocks
    }

    fn link_pass<'a>(&self, document: &'a Html, pass: &mut DiscoveryPass<'a>) {
        for link in document.select(&LINK_SELECTOR) {
            if pass.blocks.len() >= self.config.max_blocks {
                break;
            }

            let Some(href) = link.value().attr("href") else {
                continue;
            };
            if is_noise_href(href) || is_in_page_chrome(link) {
                continue;
            }

            if let Some(block) = self.enclosing_block(link, pass) {
                pass.push(block, Some(href.to_string()));
            }
        }
    }

    fn container_pass<'a>(&self, document: &'a Html, pass: &mut DiscoveryPass<'a>) {
        for element in document
            .select(&CONTAINER_SELECTOR)
            .take(self.config.fallback_scan_limit)
        {
            if pass.blocks.len() >= self.config.max_blocks {
                break;
            }
            if pass.seen.contains(&element.id()) || is_in_page_chrome(element) {
                continue;
            }
            if self.predicate.accepts(&pass.render(element).normalized) {
                pass.push(element, None);
            }
        }
    }

    /// Test `start` and its ancestors, `ancestor_depth` elements in all; first accepted element wins.
    fn enclosing_block<'a>(
        &self,
        start: ElementRef<'a>,
        pass: &mut DiscoveryPass<'a>,
    ) -> Option<ElementRef<'a>> {
        let mut current = Some(start);
        let mut depth = 0;

        while let Some(element) = current {
            if depth >= self.config.ancestor_depth {
                break;
            }
            if self.predicate.accepts(&pass.render(element).normalized) {
                return Some(element);
            }
            current = element.parent().and_then(ElementRef::wrap);
            depth += 1;
        }

        None
    }
}

/// State of one discovery run over one document
#[derive(Default)]
struct DiscoveryPass<'a> {
    blocks: Vec<DiscoveredBlock<'a>>,
    seen: HashSet<NodeId>,
    rendered: HashMap<NodeId, BlockText>,
}

impl<'a> DiscoveryPass<'a> {
    fn render(&mut self, element: ElementRef<'a>) -> &BlockText {
        self.rendered
            .entry(element.id())
            .or_insert_with(|| render_block(element))
    }

    fn push(&mut self, element: ElementRef<'a>, anchor_href: Option<String>) {
        if !self.seen.insert(element.id()) {
            return;
        }
        let text = self.render(element).clone();
        self.blocks.push(DiscoveredBlock {
            element,
            text,
            anchor_href,
        });
    }
}

/// Check whether an element sits inside header, nav or footer regions
pub fn is_in_page_chrome(element: ElementRef<'_>) -> bool {
    let mut current = Some(element);
    while let Some(el) = current {
        let value = el.value();
        if CHROME_TAGS.contains(&value.name()) {
            return true;
        }
        if let Some(role) = value.attr("role") {
            if CHROME_ROLES.contains(&role.trim().to_ascii_lowercase().as_str()) {
                return true;
            }
        }
        current = el.parent().and_then(ElementRef::wrap);
    }
    false
}

/// Links that never identify a poll: in-page anchors, mail/phone/script, social media
pub fn is_noise_href(href: &str) -> bool {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return true;
    }

    let lower = href.to_ascii_lowercase();
    if ["mailto:", "tel:", "javascript:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return true;
    }

    match Url::parse(href) {
        Ok(url) => url.host_str().is_some_and(is_social_host),
        Err(_) => false,
    }
}

fn is_social_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    SOCIAL_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
}
