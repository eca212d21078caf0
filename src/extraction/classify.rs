//! Field classifiers
//!
//! Each classifier is a total function over the text of one poll block. A miss
//! returns the field's zero value (empty string or empty vector).

use regex::Regex;
use std::sync::LazyLock;

use super::text::truncate_chars;
use super::types::{PollCategory, PollResult};

/// Lines scanned for a field date range
pub const DATE_LOOKBACK: usize = 8;
/// Lines scanned for a labeled pollster
pub const POLLSTER_LOOKBACK: usize = 10;
/// Lines scanned for a race label
pub const RACE_LOOKBACK: usize = 12;
/// Maximum results kept per block
pub const MAX_RESULTS: usize = 12;
/// Maximum pollster length in characters
pub const MAX_POLLSTER_CHARS: usize = 100;
/// Maximum race label length in characters
pub const MAX_RACE_CHARS: usize = 120;

/// Category keywords in priority order; the first hit wins.
const CATEGORY_KEYWORDS: &[(&str, PollCategory)] = &[
    ("generic ballot", PollCategory::GenericBallot),
    ("disapprove", PollCategory::Approval),
    ("approve", PollCategory::Approval),
    ("approval", PollCategory::Approval),
    ("senate", PollCategory::Senate),
    ("governor", PollCategory::Governor),
    ("gubernatorial", PollCategory::Governor),
    ("house", PollCategory::House),
    ("congressional", PollCategory::House),
    ("democratic primary", PollCategory::DemPrimary),
    ("dem primary", PollCategory::DemPrimary),
    ("republican primary", PollCategory::GopPrimary),
    ("gop primary", PollCategory::GopPrimary),
    ("presidential general", PollCategory::PresGeneral),
    ("general election", PollCategory::PresGeneral),
    ("presidential", PollCategory::President),
    ("president", PollCategory::President),
];

static RESULT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\p{Lu}[\p{L}'’.\-]*(?:[ \t]+\p{Lu}[\p{L}'’.\-]*){0,4})[ \t]*:?[ \t]*(\d{1,3}(?:\.\d+)?)[ \t]*%",
    )
    .expect("valid result pattern")
});

static MARGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{2}(?:\.\d)?)\s*[-–]\s*(\d{2}(?:\.\d)?)\b").expect("valid margin pattern")
});

const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";

static MONTH_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b{MONTH}\s+\d{{1,2}}(?:\s*[-–]\s*(?:{MONTH}\s+)?\d{{1,2}})?(?:,?\s+\d{{4}})?\b"
    ))
    .expect("valid month date pattern")
});

static NUMERIC_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b\d{1,2}/\d{1,2}(?:/(?:\d{4}|\d{2}))?(?:\s*[-–]\s*\d{1,2}/\d{1,2}(?:/(?:\d{4}|\d{2}))?)?\b",
    )
    .expect("valid numeric date pattern")
});

/// Sample count: thousands groups or a plain digit run, never a trailing comma
const SAMPLE_COUNT: &str = r"(?:\d{1,3}(?:,\d{3})+|\d+)";

static SAMPLE_N_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bn\s*=\s*{SAMPLE_COUNT}")).expect("valid sample pattern")
});

// A bare `A` only counts when uppercase, so "2026 a poll" is not a sample
static SAMPLE_POP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b({SAMPLE_COUNT})\s+((?i:adults|voters|lv|rv)|A)\b"
    ))
    .expect("valid population pattern")
});

static POLLSTER_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:pollster|poll|firm)\s*:\s*(.+)$").expect("valid pollster pattern")
});

static RACE_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:senate|governor|house|president|presidential|primary|generic ballot|approval)\b")
        .expect("valid race keyword pattern")
});

static RACE_STATE_OFFICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z]{2}\s+(?:Sen|Senate|Gov|Governor|House|Pres|President)\b")
        .expect("valid state office pattern")
});

static RACE_DISTRICT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{2}-\d{1,2}\b").expect("valid district pattern"));

/// Classify a block into a coarse category.
pub fn classify_category(text: &str) -> PollCategory {
    let lower = text.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, category)| *category)
        .unwrap_or_default()
}

/// Extract `Name NN%` results, falling back to an unlabeled `NN-NN` margin.
pub fn extract_results(text: &str) -> Vec<PollResult> {
    extract_results_in(&[text])
}

/// Same as [`extract_results`], matching each line separately so a name never
/// runs across a line break.
pub fn extract_results_in<S: AsRef<str>>(lines: &[S]) -> Vec<PollResult> {
    let results: Vec<PollResult> = lines
        .iter()
        .flat_map(|line| RESULT_RE.captures_iter(line.as_ref()))
        .filter_map(|caps| {
            let choice = caps.get(1)?.as_str().trim();
            let pct = caps.get(2)?.as_str().parse::<f64>().ok()?;
            PollResult::new(choice, pct)
        })
        .take(MAX_RESULTS)
        .collect();

    if !results.is_empty() {
        return results;
    }

    lines
        .iter()
        .find_map(|line| margin_results(line.as_ref()))
        .unwrap_or_default()
}

fn margin_results(text: &str) -> Option<Vec<PollResult>> {
    let caps = MARGIN_RE.captures(text)?;
    let first = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let second = caps.get(2)?.as_str().parse::<f64>().ok()?;
    Some(vec![PollResult::new("A", first)?, PollResult::new("B", second)?])
}

/// Find the raw field-date substring near the top of the block.
pub fn extract_date_text(lines: &[String]) -> String {
    let window = &lines[..lines.len().min(DATE_LOOKBACK)];

    [&*MONTH_DATE_RE, &*NUMERIC_DATE_RE]
        .into_iter()
        .find_map(|re| window.iter().find_map(|line| re.find(line)))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Find the raw sample size (`n=812` or `812 LV`).
pub fn extract_sample(text: &str) -> String {
    if let Some(m) = SAMPLE_N_RE.find(text) {
        return m.as_str().to_string();
    }

    SAMPLE_POP_RE
        .captures(text)
        .map(|caps| format!("{} {}", &caps[1], caps[2].to_uppercase()))
        .unwrap_or_default()
}

/// Find the pollster: an explicit label, else the block's first line.
pub fn extract_pollster(lines: &[String]) -> String {
    let labeled = lines
        .iter()
        .take(POLLSTER_LOOKBACK)
        .find_map(|line| POLLSTER_LABEL_RE.captures(line.trim()))
        .map(|caps| caps[1].trim().to_string());

    let pollster = labeled.or_else(|| {
        lines
            .iter()
            .map(|line| line.trim())
            .find(|line| !line.is_empty())
            .map(str::to_string)
    });

    pollster
        .map(|p| truncate_chars(&p, MAX_POLLSTER_CHARS))
        .unwrap_or_default()
}

/// Find the first line that names a contest.
pub fn extract_race(lines: &[String]) -> String {
    lines
        .iter()
        .take(RACE_LOOKBACK)
        .find(|line| {
            RACE_KEYWORD_RE.is_match(line)
                || RACE_STATE_OFFICE_RE.is_match(line)
                || RACE_DISTRICT_RE.is_match(line)
        })
        .map(|line| truncate_chars(line.trim(), MAX_RACE_CHARS))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_category_priority_order() {
        assert_eq!(
            classify_category("Generic ballot poll, president mentioned"),
            PollCategory::GenericBallot
        );
        assert_eq!(classify_category("Presidential approval rating"), PollCategory::Approval);
        assert_eq!(
            classify_category("Democratic Primary for President"),
            PollCategory::DemPrimary
        );
        assert_eq!(classify_category("GOP primary, president"), PollCategory::GopPrimary);
        assert_eq!(classify_category("TX SENATE race"), PollCategory::Senate);
        assert_eq!(classify_category("2028 Presidential General"), PollCategory::PresGeneral);
        assert_eq!(classify_category("President: Smith vs Jones"), PollCategory::President);
        assert_eq!(classify_category("Favorability of Smith"), PollCategory::Other);
    }

    #[test]
    fn test_results_primary_pattern() {
        let results = extract_results("Smith 47% Jones 43%");
        assert_eq!(
            results,
            vec![
                PollResult::new("Smith", 47.0).unwrap(),
                PollResult::new("Jones", 43.0).unwrap(),
            ]
        );
    }

    #[test]
    fn test_results_multi_word_names() {
        let results = extract_results("Mary Beth O'Neil-Smith 45.5% Jr. Ray 41 %");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].choice, "Mary Beth O'Neil-Smith");
        assert_eq!(results[0].pct, 45.5);
        assert_eq!(results[1].choice, "Jr. Ray");
        assert_eq!(results[1].pct, 41.0);
    }

    #[test]
    fn test_results_labeled_with_colon() {
        let results = extract_results("Approve: 44% Disapprove: 52%");
        assert_eq!(results[0], PollResult::new("Approve", 44.0).unwrap());
        assert_eq!(results[1], PollResult::new("Disapprove", 52.0).unwrap());
    }

    #[test]
    fn test_results_exclude_out_of_range() {
        let results = extract_results("Smith 147% Jones 43%");
        assert_eq!(results, vec![PollResult::new("Jones", 43.0).unwrap()]);
    }

    #[test]
    fn test_results_capped() {
        let text: String = (0..20).map(|i| format!("Name {}%  ", i + 1)).collect();
        assert_eq!(extract_results(&text).len(), MAX_RESULTS);
    }

    #[test]
    fn test_results_margin_fallback() {
        let results = extract_results("Smith leads Jones 47-43 among likely voters");
        assert_eq!(
            results,
            vec![
                PollResult::new("A", 47.0).unwrap(),
                PollResult::new("B", 43.0).unwrap(),
            ]
        );

        let results = extract_results("Spread 48.5 - 44.2");
        assert_eq!(results[0].pct, 48.5);
        assert_eq!(results[1].pct, 44.2);
    }

    #[test]
    fn test_results_per_line_keeps_names_apart() {
        let block = lines("Acme Research\n812 LV\nMcCormick 48% Casey 46%");
        let results = extract_results_in(&block);
        assert_eq!(results[0].choice, "McCormick");
        assert_eq!(results[1].choice, "Casey");

        // Single-line text lets the preceding capitalized token join the name
        let joined = extract_results("812 LV McCormick 48%");
        assert_eq!(joined[0].choice, "LV McCormick");
    }

    #[test]
    fn test_results_names_never_take_digits() {
        let results = extract_results("Smith47% Jones43%");
        assert_eq!(
            results,
            vec![
                PollResult::new("Smith", 47.0).unwrap(),
                PollResult::new("Jones", 43.0).unwrap(),
            ]
        );

        let results = extract_results("Núñez 51% Ørsted 40%");
        assert_eq!(results[0].choice, "Núñez");
        assert_eq!(results[1].choice, "Ørsted");
    }

    #[test]
    fn test_results_empty_when_no_signal() {
        assert!(extract_results("No numbers in here at all").is_empty());
        assert!(extract_results("").is_empty());
    }

    #[test]
    fn test_date_month_range() {
        let block = lines("Acme Research\nJan 3-5, 2026\nSmith 47%");
        assert_eq!(extract_date_text(&block), "Jan 3-5, 2026");

        let block = lines("Acme\nField dates: Sept. 28 - Oct. 2, 2025");
        assert_eq!(extract_date_text(&block), "Sept. 28 - Oct. 2, 2025");
    }

    #[test]
    fn test_date_numeric_fallback() {
        let block = lines("Acme Research\n10/12-10/14/2025\nSmith 47%");
        assert_eq!(extract_date_text(&block), "10/12-10/14/2025");
    }

    #[test]
    fn test_date_prefers_month_pattern() {
        let block = lines("1/2/2026 update\nNov 1-3\n");
        assert_eq!(extract_date_text(&block), "Nov 1-3");
    }

    #[test]
    fn test_date_outside_window_ignored() {
        let mut block = vec!["filler".to_string(); DATE_LOOKBACK];
        block.push("Jan 3-5, 2026".to_string());
        assert_eq!(extract_date_text(&block), "");
    }

    #[test]
    fn test_sample_patterns() {
        assert_eq!(extract_sample("Registered Voters n=812"), "n=812");
        assert_eq!(extract_sample("N = 1,204 adults"), "N = 1,204");
        assert_eq!(extract_sample("812 LV"), "812 LV");
        assert_eq!(extract_sample("1,500 rv"), "1,500 RV");
        assert_eq!(extract_sample("900 Adults"), "900 ADULTS");
        assert_eq!(extract_sample("no sample here"), "");
        assert_eq!(extract_sample("Acme Research, n=812, MoE ±3.4%"), "n=812");
        assert_eq!(extract_sample("n=12345 likely voters"), "n=12345");
        assert_eq!(extract_sample("1,012 A Smith 47%"), "1,012 A");
    }

    #[test]
    fn test_sample_ignores_lowercase_article() {
        assert_eq!(
            extract_sample("Acme Research Jan 3-5, 2026 a poll of likely voters Smith 47%"),
            ""
        );
        assert_eq!(extract_sample("Released 2026, a survey of 800 voters"), "800 VOTERS");
    }

    #[test]
    fn test_pollster_label_and_fallback() {
        let block = lines("Generic Ballot\nPollster: Acme Research\nDem 47%");
        assert_eq!(extract_pollster(&block), "Acme Research");

        let block = lines("Quinnipiac University\nDem 47%");
        assert_eq!(extract_pollster(&block), "Quinnipiac University");

        let long = "x".repeat(250);
        assert_eq!(extract_pollster(&[long]).chars().count(), MAX_POLLSTER_CHARS);

        assert_eq!(extract_pollster(&[]), "");
    }

    #[test]
    fn test_race_detection() {
        let block = lines("Acme Research\nPennsylvania Senate\nSmith 47%");
        assert_eq!(extract_race(&block), "Pennsylvania Senate");

        let block = lines("Acme Research\nTX Gov: Smith vs Jones");
        assert_eq!(extract_race(&block), "TX Gov: Smith vs Jones");

        let block = lines("Acme Research\nCA-12 special\n");
        assert_eq!(extract_race(&block), "CA-12 special");

        let block = lines("Acme Research\nSmith 47%");
        assert_eq!(extract_race(&block), "");
    }
}
