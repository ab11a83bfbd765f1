//! The source table. One entry per external site; everything an extractor
//! needs to know about a site lives here, so onboarding a new organization
//! is a data change.

use super::SourceConfig;

const DC: &str = "Washington DC";
const ONLINE: &str = "Online";

/// Chains shared by the many orgs whose event pages follow the usual
/// CMS shapes (Drupal views, WordPress archives, card grids).
const ORG_CARDS: &[&str] = &[
    ".event-card",
    ".event-item",
    "article.event",
    ".views-row",
    "li.event",
    "article",
];
const ORG_TITLES: &[&str] = &[".event-title", "h3 a", "h3", "h2 a", "h2"];
const ORG_DATES: &[&str] = &[".event-date", ".date-display-single", "time", ".date"];
const ORG_LOCATIONS: &[&str] = &[".event-location", ".location", ".venue"];
const ORG_DESCRIPTIONS: &[&str] = &[".event-description", ".summary", ".field-body", "p"];

/// Baseline config for a single-purpose energy organization: targeted
/// selectors, lenient on missing dates, no relevance filter needed.
const fn org(
    slug: &'static str,
    host: &'static str,
    url: &'static str,
    default_location: &'static str,
) -> SourceConfig {
    SourceConfig {
        slug,
        host,
        url,
        default_location,
        candidate_selectors: ORG_CARDS,
        title_selectors: ORG_TITLES,
        date_selectors: ORG_DATES,
        location_selectors: ORG_LOCATIONS,
        description_selectors: ORG_DESCRIPTIONS,
        category: None,
        requires_relevance_filter: false,
        strict_dates: false,
    }
}

static SOURCES: [SourceConfig; 35] = [
    // General aggregators: huge off-domain catalogs, generic DOM scans.
    // These keep the relevance filter on and drop dateless candidates.
    SourceConfig {
        slug: "eventbrite",
        host: "Eventbrite",
        url: "https://www.eventbrite.com/d/dc--washington/energy/",
        default_location: ONLINE,
        candidate_selectors: &["[data-testid=event-card]", ".search-event-card", "article"],
        title_selectors: &["h3", "h2"],
        date_selectors: &["[data-testid=event-date]", ".event-card__date"],
        location_selectors: &["[data-testid=event-location]", ".card-text--truncated"],
        description_selectors: &["p"],
        category: None,
        requires_relevance_filter: true,
        strict_dates: true,
    },
    SourceConfig {
        slug: "meetup",
        host: "Meetup",
        url: "https://www.meetup.com/find/?keywords=energy&location=us--dc--washington",
        default_location: ONLINE,
        candidate_selectors: &["[data-testid=event-card]", "[data-recommendationid]", "article"],
        title_selectors: &["h3", "h2"],
        date_selectors: &["[data-testid=event-date]", "time"],
        location_selectors: &["[data-testid=event-location]"],
        description_selectors: &["p"],
        category: None,
        requires_relevance_filter: true,
        strict_dates: true,
    },
    // DC-area climate calendars and advocacy groups.
    SourceConfig {
        slug: "dmv-climate",
        host: "DMV Climate Partners",
        url: "https://www.dmvclimate.org/events",
        default_location: DC,
        candidate_selectors: &[".eventlist-event", ".event-card", "article"],
        title_selectors: &[".eventlist-title a", ".eventlist-title", "h1 a"],
        date_selectors: &[".eventlist-datetag-startdate", ".event-date", "time"],
        location_selectors: &[".eventlist-meta-address", ".event-location"],
        description_selectors: &[".eventlist-excerpt", "p"],
        category: None,
        requires_relevance_filter: false,
        strict_dates: false,
    },
    SourceConfig {
        slug: "ase",
        host: "Alliance to Save Energy",
        url: "https://www.ase.org/events",
        default_location: DC,
        candidate_selectors: &[".views-row", ".event-teaser", "article"],
        title_selectors: &["h3 a", "h2 a", ".node-title"],
        date_selectors: &[".date-display-single", ".event-date", "time"],
        location_selectors: &[".field-location", ".event-location"],
        description_selectors: &[".field-summary", "p"],
        category: None,
        requires_relevance_filter: false,
        strict_dates: false,
    },
    SourceConfig {
        slug: "acore",
        host: "American Council on Renewable Energy",
        url: "https://acore.org/events/",
        default_location: DC,
        candidate_selectors: &[".event-listing", ".tribe-events-calendar-list__event", "article"],
        title_selectors: &[".tribe-events-calendar-list__event-title a", "h3 a", "h3"],
        date_selectors: &[".tribe-events-calendar-list__event-datetime", "time", ".event-date"],
        location_selectors: &[".tribe-events-venue-details", ".event-location"],
        description_selectors: &[".tribe-events-calendar-list__event-description", "p"],
        category: Some("Conference"),
        requires_relevance_filter: false,
        strict_dates: false,
    },
    SourceConfig {
        slug: "c2es",
        host: "Center for Climate and Energy Solutions",
        url: "https://www.c2es.org/events/",
        default_location: DC,
        candidate_selectors: &[".event", ".post-listing article", "article"],
        title_selectors: &["h3 a", "h2 a", ".entry-title"],
        date_selectors: &[".event-date", ".entry-date", "time"],
        location_selectors: &[".event-location"],
        description_selectors: &[".entry-summary", "p"],
        category: None,
        requires_relevance_filter: false,
        strict_dates: false,
    },
    // Federal and regulatory calendars.
    org("doe-eere", "U.S. Department of Energy EERE", "https://www.energy.gov/eere/events", DC),
    org("ferc", "Federal Energy Regulatory Commission", "https://www.ferc.gov/news-events/events", DC),
    org("eia", "U.S. Energy Information Administration", "https://www.eia.gov/about/events/", DC),
    org("epa-events", "U.S. Environmental Protection Agency", "https://www.epa.gov/events", DC),
    SourceConfig {
        category: Some("Briefing"),
        ..org("naruc", "National Association of Regulatory Utility Commissioners", "https://www.naruc.org/meetings-and-events/", DC)
    },
    // Think tanks and research shops.
    org("rff", "Resources for the Future", "https://www.rff.org/events/", DC),
    org("eesi", "Environmental and Energy Study Institute", "https://www.eesi.org/briefings", DC),
    org("aceee", "American Council for an Energy-Efficient Economy", "https://www.aceee.org/events", DC),
    org("wri", "World Resources Institute", "https://www.wri.org/events", DC),
    org("brookings-energy", "Brookings Institution", "https://www.brookings.edu/topic/energy-climate/", DC),
    org("csis-energy", "Center for Strategic and International Studies", "https://www.csis.org/programs/energy-security-and-climate-change-program/events", DC),
    org("atlantic-council", "Atlantic Council Global Energy Center", "https://www.atlanticcouncil.org/programs/global-energy-center/events/", DC),
    org("wilson-center", "Wilson Center Environmental Change and Security Program", "https://www.wilsoncenter.org/program/environmental-change-and-security-program", DC),
    org("itif-energy", "Information Technology and Innovation Foundation", "https://itif.org/events/", DC),
    org("bpc-energy", "Bipartisan Policy Center", "https://bipartisanpolicy.org/events/", DC),
    org("catf", "Clean Air Task Force", "https://www.catf.us/events/", ONLINE),
    org("edf-events", "Environmental Defense Fund", "https://www.edf.org/events", ONLINE),
    org("nrdc-events", "Natural Resources Defense Council", "https://www.nrdc.org/events", ONLINE),
    // Trade associations.
    org("seia", "Solar Energy Industries Association", "https://www.seia.org/events", DC),
    org("acp", "American Clean Power Association", "https://cleanpower.org/events/", DC),
    org("eei", "Edison Electric Institute", "https://www.eei.org/en/meetings-and-events", DC),
    org("nei", "Nuclear Energy Institute", "https://www.nei.org/conferences", DC),
    org("sepa", "Smart Electric Power Alliance", "https://sepapower.org/events/", ONLINE),
    org("esa-storage", "Energy Storage Association", "https://energystorage.org/events/", DC),
    org("nha-hydro", "National Hydropower Association", "https://www.hydro.org/events/", DC),
    org("usea", "United States Energy Association", "https://usea.org/events", DC),
    org("irec", "Interstate Renewable Energy Council", "https://irecusa.org/events/", ONLINE),
    // Universities.
    org("gw-solar", "George Washington University Solar Institute", "https://solar.gwu.edu/events", DC),
    org("georgetown-climate", "Georgetown Climate Center", "https://www.georgetownclimate.org/events.html", DC),
];

pub fn all() -> &'static [SourceConfig] {
    &SOURCES
}

pub fn by_slug(slug: &str) -> Option<&'static SourceConfig> {
    SOURCES.iter().find(|s| s.slug == slug)
}
