//! Bot-wall detection
//!
//! Detects pages that were served an interstitial instead of content:
//! - CAPTCHA and "verify you are human" prompts
//! - Rate-limit notices ("unusual traffic")
//! - Access-denied pages and browser challenges
//!
//! Markers only count when the page is short or when they appear in the
//! `<title>`, so a long article that merely mentions a captcha is not flagged.

use std::fmt;
use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::extraction::text::render_block;

/// Pages with at least this much visible text are only flagged by their title
pub const SHORT_PAGE_CHARS: usize = 3000;

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));

/// Why a page looks like a bot wall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    Captcha,
    HumanVerification,
    RobotCheck,
    UnusualTraffic,
    AccessDenied,
    Challenge,
}

impl BlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Captcha => "captcha",
            Self::HumanVerification => "human verification",
            Self::RobotCheck => "robot check",
            Self::UnusualTraffic => "unusual traffic",
            Self::AccessDenied => "access denied",
            Self::Challenge => "browser challenge",
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase markers, checked in order
const MARKERS: &[(&str, BlockReason)] = &[
    ("captcha", BlockReason::Captcha),
    ("verify you are human", BlockReason::HumanVerification),
    ("verify you are a human", BlockReason::HumanVerification),
    ("are you a robot", BlockReason::RobotCheck),
    ("unusual traffic", BlockReason::UnusualTraffic),
    ("access denied", BlockReason::AccessDenied),
    ("just a moment", BlockReason::Challenge),
    ("checking your browser", BlockReason::Challenge),
];

/// Detect whether `html` is a bot wall rather than real content.
pub fn detect_block(html: &str) -> Option<BlockReason> {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|t| t.text().collect::<String>().to_lowercase())
        .unwrap_or_default();
    if let Some(reason) = find_marker(&title) {
        return Some(reason);
    }

    let body = render_block(document.root_element());
    if body.char_len() >= SHORT_PAGE_CHARS {
        return None;
    }
    find_marker(&body.normalized.to_lowercase())
}

fn find_marker(text: &str) -> Option<BlockReason> {
    if text.is_empty() {
        return None;
    }
    MARKERS
        .iter()
        .find(|(marker, _)| text.contains(marker))
        .map(|(_, reason)| *reason)
}
