//! DOM heuristics shared by every source extractor.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

use crate::dates::clean_text;

/// Selectors consulted when a source has no explicit date field.
/// Ordered roughly by how often real event pages use them.
static DATE_HINT_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "time",
        ".date",
        ".event-date",
        ".datetime",
        ".when",
        ".schedule",
        ".event-meta",
        ".meta",
        "[class*=date]",
        "[class*=Date]",
        "[itemprop=startDate]",
    ]
    .iter()
    .filter_map(|s| Selector::parse(s).ok())
    .collect()
});

/// Attributes that commonly carry machine-readable dates.
const DATE_ATTRS: [&str; 6] = [
    "data-date",
    "datetime",
    "data-start-date",
    "data-event-date",
    "content",
    "title",
];

static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4").expect("heading selector"));
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("anchor selector"));

pub fn inner_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// First non-empty text over a fallback chain of selector strings.
pub fn first_text_in_chain(element: &ElementRef<'_>, chain: &[&str]) -> Option<String> {
    for raw in chain {
        let Ok(selector) = Selector::parse(raw) else {
            tracing::debug!(selector = raw, "skipping unparseable selector");
            continue;
        };
        for node in element.select(&selector) {
            let text = inner_text(node);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

pub fn first_attr(element: &ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    element
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string)
}

/// Title fallback order: configured chain, then headings, then anchor text.
pub fn extract_title(element: &ElementRef<'_>, chain: &[&str]) -> Option<String> {
    first_text_in_chain(element, chain)
        .or_else(|| {
            element
                .select(&HEADING_SELECTOR)
                .map(inner_text)
                .find(|t| !t.is_empty())
        })
        .or_else(|| {
            element
                .select(&ANCHOR_SELECTOR)
                .map(inner_text)
                .find(|t| !t.is_empty())
        })
}

/// Href of the candidate itself when it is an anchor, else its first
/// descendant anchor.
pub fn extract_href(element: &ElementRef<'_>) -> Option<String> {
    if element.value().name() == "a" {
        if let Some(href) = element.value().attr("href") {
            return Some(href.to_string());
        }
    }
    first_attr(element, &ANCHOR_SELECTOR, "href")
}

pub fn absolute_url(base: &str, href: Option<String>) -> Option<String> {
    let href = href?;
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href);
    }
    let base_url = reqwest::Url::parse(base).ok()?;
    base_url.join(&href).ok().map(|u| u.to_string())
}

/// Date-text discovery for candidates without an explicit date field:
/// date-ish selectors, then a pattern scan of the node's own text, then
/// date-bearing attributes on the node and up to two ancestor levels.
/// First non-empty hit wins; the caller feeds it to the normalizer.
pub fn discover_date_text(element: &ElementRef<'_>) -> Option<String> {
    for selector in DATE_HINT_SELECTORS.iter() {
        for node in element.select(selector) {
            let text = inner_text(node);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }

    let own_text = inner_text(*element);
    if crate::dates::first_date_fragment(&own_text).is_some() {
        return Some(own_text);
    }

    let mut current = Some(*element);
    for _ in 0..3 {
        let Some(node) = current else { break };
        for attr in DATE_ATTRS {
            if let Some(value) = node.value().attr(attr) {
                let cleaned = clean_text(value);
                if !cleaned.is_empty() && crate::dates::first_date_fragment(&cleaned).is_some() {
                    return Some(cleaned);
                }
            }
        }
        current = node.parent().and_then(ElementRef::wrap);
    }

    None
}
