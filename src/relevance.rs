//! Keyword in-domain filter.
//!
//! Generic event-type words are in the table on purpose: small niche
//! sources often describe an event without naming the sector, and a false
//! positive costs less than dropping a genuine listing.

/// Sector terms plus generic event-type terms. Substring match, no stemming.
const KEYWORDS: [&str; 32] = [
    "energy",
    "climate",
    "solar",
    "wind",
    "grid",
    "carbon",
    "emission",
    "renewable",
    "electric",
    "battery",
    "hydrogen",
    "nuclear",
    "efficiency",
    "sustainab",
    "clean",
    "power",
    "utility",
    "decarboniz",
    "transmission",
    "geothermal",
    "conference",
    "summit",
    "workshop",
    "forum",
    "webinar",
    "briefing",
    "symposium",
    "seminar",
    "panel",
    "roundtable",
    "hearing",
    "expo",
];

pub fn is_relevant(title: &str, description: &str) -> bool {
    let haystack = format!("{} {}", title, description).to_lowercase();
    KEYWORDS.iter().any(|kw| haystack.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sector_terms_pass() {
        assert!(is_relevant("Offshore Wind Outlook", ""));
        assert!(is_relevant("Quarterly update", "state of the solar market"));
    }

    #[test]
    fn event_type_terms_pass() {
        assert!(is_relevant("Annual Policy Summit", "registration open"));
    }

    #[test]
    fn case_insensitive() {
        assert!(is_relevant("CLIMATE WEEK", ""));
    }

    #[test]
    fn unrelated_content_rejected() {
        assert!(!is_relevant("Staff picks: best novels of 2025", "our reading list"));
        assert!(!is_relevant("", ""));
    }
}
