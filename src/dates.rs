//! Free-text date normalization.
//!
//! Upstream sites publish dates in every shape imaginable ("Oct 5",
//! "10/05/2025", "Wednesday, October 5, 2025", "tomorrow"). Everything is
//! collapsed to a calendar date; time-of-day is handled separately and
//! never canonicalized.

use chrono::{Datelike, Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2})(?::(\d{2}))?\s*(am|pm)").expect("valid time regex"));

static SLASH_MDY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("valid m/d/y regex"));

// No trailing \b: the date part of "2025-06-12T09:00" must still match.
static ISO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})").expect("valid iso regex"));

static DASH_MDY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})-(\d{1,2})-(\d{4})\b").expect("valid m-d-y regex"));

// "January 5", "Jan. 5th, 2025"
static MONTH_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b(?:,?\s+(\d{4}))?",
    )
    .expect("valid month-day regex")
});

// "5 January", "05 Jan 2025"
static DAY_MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?(?:,?\s+(\d{4}))?",
    )
    .expect("valid day-month regex")
});

const WHOLE_FORMATS: [&str; 12] = [
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %e, %Y",
    "%b %e, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
    "%A %B %d, %Y",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%m-%d-%Y",
    "%Y/%m/%d",
];

pub fn clean_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Normalize arbitrary date text to a calendar date, or `None` when the
/// text carries no recognizable date. Attempts stop at the first success:
/// relative keywords, strict ISO, whole-string formats, then regex scans
/// over surrounding text. Never fabricates a date.
pub fn normalize(text: &str, now: NaiveDate) -> Option<NaiveDate> {
    let cleaned = clean_text(text);
    if cleaned.is_empty() {
        return None;
    }
    let lower = cleaned.to_lowercase();

    if lower.contains("today") {
        return Some(now);
    }
    if lower.contains("tomorrow") {
        return now.checked_add_days(Days::new(1));
    }
    if lower.contains("next week") {
        return now.checked_add_days(Days::new(7));
    }

    if let Ok(date) = NaiveDate::parse_from_str(&cleaned, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&cleaned) {
        return Some(dt.date_naive());
    }

    for fmt in WHOLE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return Some(date);
        }
    }
    // Yearless forms like "October 5" fall through to the regex scan.
    scan_patterns(&cleaned, now)
}

/// Regex scan for a date embedded in longer text
/// ("Join us Wednesday, October 5 at 9am ET").
fn scan_patterns(text: &str, now: NaiveDate) -> Option<NaiveDate> {
    if let Some(caps) = ISO_RE.captures(text) {
        let (y, m, d) = (num(&caps, 1)?, num(&caps, 2)?, num(&caps, 3)?);
        if let Some(date) = NaiveDate::from_ymd_opt(y as i32, m, d) {
            return Some(date);
        }
    }
    if let Some(caps) = SLASH_MDY_RE.captures(text) {
        let (m, d, y) = (num(&caps, 1)?, num(&caps, 2)?, num(&caps, 3)?);
        if let Some(date) = NaiveDate::from_ymd_opt(y as i32, m, d) {
            return Some(date);
        }
    }
    if let Some(caps) = DASH_MDY_RE.captures(text) {
        let (m, d, y) = (num(&caps, 1)?, num(&caps, 2)?, num(&caps, 3)?);
        if let Some(date) = NaiveDate::from_ymd_opt(y as i32, m, d) {
            return Some(date);
        }
    }
    if let Some(caps) = MONTH_DAY_RE.captures(text) {
        let month = month_number(caps.get(1)?.as_str())?;
        let day = num(&caps, 2)?;
        return build_date(month, day, caps.get(3).map(|m| m.as_str()), now);
    }
    if let Some(caps) = DAY_MONTH_RE.captures(text) {
        let day = num(&caps, 1)?;
        let month = month_number(caps.get(2)?.as_str())?;
        return build_date(month, day, caps.get(3).map(|m| m.as_str()), now);
    }
    None
}

/// The substring that looks like a date, if any pattern matches. Used by
/// the extractor to decide whether a blob of node text or an attribute
/// value is worth feeding to the normalizer at all.
pub fn first_date_fragment(text: &str) -> Option<String> {
    for re in [
        &*ISO_RE,
        &*SLASH_MDY_RE,
        &*DASH_MDY_RE,
        &*MONTH_DAY_RE,
        &*DAY_MONTH_RE,
    ] {
        if let Some(m) = re.find(text) {
            return Some(m.as_str().to_string());
        }
    }
    None
}

/// Legacy backfill only: a deterministic date 1-30 days out. Gated behind
/// `AppConfig::allow_synthetic_dates`; the scrape path keeps `None` so the
/// feed never sorts or filters on an invented date.
pub fn synthetic_fallback(now: NaiveDate, seed: u64) -> NaiveDate {
    let offset = (seed % 30) + 1;
    now.checked_add_days(Days::new(offset)).unwrap_or(now)
}

/// Best-effort time-of-day extraction ("Doors 7pm" -> "07:00 PM").
/// No canonicalization guarantee beyond this one shape.
pub fn find_first_time(text: &str) -> Option<String> {
    let cleaned = clean_text(text);
    TIME_RE.captures(&cleaned).map(|caps| {
        let hour = caps.get(1).unwrap().as_str().parse::<u32>().unwrap_or(0);
        let minute = caps
            .get(2)
            .map(|m| m.as_str().parse::<u32>().unwrap_or(0))
            .unwrap_or(0);
        let period = caps.get(3).unwrap().as_str().to_uppercase();
        format!("{:02}:{:02} {}", hour, minute, period)
    })
}

fn build_date(month: u32, day: u32, year: Option<&str>, now: NaiveDate) -> Option<NaiveDate> {
    match year {
        Some(y) => NaiveDate::from_ymd_opt(y.parse().ok()?, month, day),
        None => Some(default_year(month, day, now)),
    }
}

/// Year-less dates get the current year, rolling into the next year when
/// the result would already be behind the reference date.
fn default_year(month: u32, day: u32, now: NaiveDate) -> NaiveDate {
    let this_year = NaiveDate::from_ymd_opt(now.year(), month, day);
    match this_year {
        Some(date) if date >= now => date,
        _ => NaiveDate::from_ymd_opt(now.year() + 1, month, day)
            .or(this_year)
            .unwrap_or(now),
    }
}

fn month_number(prefix: &str) -> Option<u32> {
    match prefix.to_lowercase().as_str() {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}

fn num(caps: &regex::Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_now() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 20).expect("valid reference date")
    }

    #[test]
    fn supported_formats_agree() {
        let now = reference_now();
        let expected = NaiveDate::from_ymd_opt(2025, 1, 5);
        for text in ["January 5, 2025", "01/05/2025", "2025-01-05", "5 January 2025"] {
            assert_eq!(normalize(text, now), expected, "failed on {text}");
        }
    }

    #[test]
    fn relative_keywords() {
        let now = reference_now();
        assert_eq!(normalize("Today!", now), Some(now));
        assert_eq!(
            normalize("tomorrow", now),
            NaiveDate::from_ymd_opt(2024, 11, 21)
        );
        assert_eq!(
            normalize("Next Week", now),
            NaiveDate::from_ymd_opt(2024, 11, 27)
        );
    }

    #[test]
    fn embedded_date_in_prose() {
        assert_eq!(
            normalize("Join us Wednesday, December 4th at 9am ET", reference_now()),
            NaiveDate::from_ymd_opt(2024, 12, 4)
        );
    }

    #[test]
    fn yearless_date_rolls_forward() {
        // Reference is November 2024, so "March 3" means March 2025.
        assert_eq!(
            normalize("March 3", reference_now()),
            NaiveDate::from_ymd_opt(2025, 3, 3)
        );
        assert_eq!(
            normalize("Dec 1", reference_now()),
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
    }

    #[test]
    fn unparseable_is_none() {
        assert_eq!(normalize("Register now", reference_now()), None);
        assert_eq!(normalize("", reference_now()), None);
        assert_eq!(normalize("   ", reference_now()), None);
    }

    #[test]
    fn synthetic_fallback_stays_in_window() {
        let now = reference_now();
        for seed in 0..40 {
            let date = synthetic_fallback(now, seed);
            let days = (date - now).num_days();
            assert!((1..=30).contains(&days), "offset {days} out of range");
        }
    }

    #[test]
    fn extracts_time_of_day() {
        assert_eq!(
            find_first_time("Doors: 7pm / Show 8pm").as_deref(),
            Some("07:00 PM")
        );
        assert_eq!(find_first_time("all day").as_deref(), None);
    }
}
