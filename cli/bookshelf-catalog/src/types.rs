//! Catalog record types.
//!
//! Raw API documents are modeled with optional fields and normalized into the
//! simplified record shapes exactly once, here. Consumers never see a missing
//! sequence: `subjects`, `covers`, `links` and friends default to empty.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Work keys arrive as `/works/OL45883W`; ids keep only the last segment.
const WORK_KEY_PREFIX: &str = "/works/";

/// Fixed image host for cover art.
const COVER_IMAGE_BASE: &str = "https://covers.openlibrary.org";

/// How many subjects feed the one-line summary of a search result.
const SHORT_DESC_SUBJECTS: usize = 5;

/// A single normalized search result.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Stable, URL-safe work identifier. `None` when the source document
    /// carries no usable key at all.
    pub id: Option<String>,
    pub title: String,
    /// All author names joined with `", "`. Empty when unknown.
    pub author_name: String,
    pub first_publish_year: Option<i32>,
    /// Numeric id of the cover image, when one exists.
    pub cover_i: Option<i64>,
    /// One-line summary: the first few subjects, else the subtitle.
    pub short_desc: String,
}

impl SearchResult {
    /// Cover image URL for this result, derived from the cover id.
    pub fn cover_url(&self, size: CoverSize) -> Option<String> {
        self.cover_i.map(|id| cover_image_url(id, size))
    }
}

/// An external link attached to a work record.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub title: String,
    pub url: String,
}

/// The full normalized record for a single work.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkDetails {
    pub id: String,
    pub title: String,
    /// Plain text description. The API serves either a bare string or a
    /// `{value}` object; both collapse to this field.
    pub description: String,
    pub subjects: Vec<String>,
    /// Numeric cover image ids, best first.
    pub covers: Vec<i64>,
    pub links: Vec<Link>,
    /// Creation timestamp of the record, as reported by the catalog.
    pub created: Option<String>,
    pub first_publish_date: Option<String>,
}

impl WorkDetails {
    /// Cover image URL for this work, derived from the first cover id.
    pub fn cover_url(&self, size: CoverSize) -> Option<String> {
        self.covers.first().map(|id| cover_image_url(*id, size))
    }
}

/// Cover art sizes offered by the image host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSize {
    Small,
    Medium,
    Large,
}

impl CoverSize {
    fn letter(&self) -> char {
        match self {
            CoverSize::Small => 'S',
            CoverSize::Medium => 'M',
            CoverSize::Large => 'L',
        }
    }
}

/// Builds the deterministic image URL for a cover id.
pub fn cover_image_url(cover_id: i64, size: CoverSize) -> String {
    format!(
        "{COVER_IMAGE_BASE}/b/id/{cover_id}-{letter}.jpg",
        letter = size.letter()
    )
}

/// One page of search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    pub docs: Vec<SearchResult>,
    /// Total number of matches across all pages.
    pub num_found: u64,
}

impl SearchPage {
    /// Number of pages the catalog holds for this search.
    ///
    /// Never less than 1, so an empty result set still renders as
    /// "page 1 of 1" rather than "page 1 of 0".
    pub fn total_pages(&self, page_size: NonZeroU32) -> u32 {
        let pages = self.num_found.div_ceil(page_size.get() as u64);
        pages.clamp(1, u32::MAX as u64) as u32
    }
}

// ---------------------------------------------------------------------------
// Raw API documents
// ---------------------------------------------------------------------------

fn strip_work_key(key: &str) -> String {
    key.strip_prefix(WORK_KEY_PREFIX).unwrap_or(key).to_string()
}

/// Raw response of the search endpoint.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawSearchPage {
    #[serde(default)]
    pub(crate) docs: Vec<RawSearchDoc>,
    #[serde(default, rename = "numFound")]
    pub(crate) num_found: u64,
}

impl From<RawSearchPage> for SearchPage {
    fn from(raw: RawSearchPage) -> Self {
        SearchPage {
            docs: raw.docs.into_iter().map(SearchResult::from).collect(),
            num_found: raw.num_found,
        }
    }
}

/// One raw search document, pre-normalization.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawSearchDoc {
    key: Option<String>,
    cover_edition_key: Option<String>,
    #[serde(default)]
    edition_key: Vec<String>,
    title: Option<String>,
    #[serde(default)]
    author_name: Vec<String>,
    first_publish_year: Option<i32>,
    cover_i: Option<i64>,
    #[serde(default)]
    subject: Vec<String>,
    subtitle: Option<String>,
}

impl From<RawSearchDoc> for SearchResult {
    fn from(doc: RawSearchDoc) -> Self {
        let id = doc
            .key
            .as_deref()
            .map(strip_work_key)
            .or(doc.cover_edition_key)
            .or_else(|| doc.edition_key.into_iter().next());
        let short_desc = if doc.subject.is_empty() {
            doc.subtitle.unwrap_or_default()
        } else {
            doc.subject
                .iter()
                .take(SHORT_DESC_SUBJECTS)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        };
        SearchResult {
            id,
            title: doc.title.unwrap_or_default(),
            author_name: doc.author_name.join(", "),
            first_publish_year: doc.first_publish_year,
            cover_i: doc.cover_i,
            short_desc,
        }
    }
}

/// A raw work document, pre-normalization.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawWork {
    key: Option<String>,
    title: Option<String>,
    description: Option<RawDescription>,
    #[serde(default)]
    subjects: Vec<String>,
    #[serde(default)]
    covers: Vec<i64>,
    #[serde(default)]
    links: Vec<RawLink>,
    created: Option<RawTimestamp>,
    first_publish_date: Option<String>,
    first_publish_year: Option<i32>,
}

impl RawWork {
    /// Normalizes the raw document. The requested id backstops records whose
    /// own key is missing.
    pub(crate) fn normalize(self, requested_id: &str) -> WorkDetails {
        WorkDetails {
            id: self
                .key
                .as_deref()
                .map(strip_work_key)
                .unwrap_or_else(|| requested_id.to_string()),
            title: self.title.unwrap_or_default(),
            description: self.description.map(RawDescription::normalize).unwrap_or_default(),
            subjects: self.subjects,
            covers: self.covers,
            links: self.links.into_iter().map(Link::from).collect(),
            created: self.created.and_then(RawTimestamp::normalize),
            first_publish_date: self
                .first_publish_date
                .or_else(|| self.first_publish_year.map(|year| year.to_string())),
        }
    }
}

/// A description is served either as a bare string or as a typed object
/// carrying a `value` field. Anything else collapses to empty.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawDescription {
    Text(String),
    Value { value: String },
    Other(serde_json::Value),
}

impl RawDescription {
    fn normalize(self) -> String {
        match self {
            RawDescription::Text(text) => text,
            RawDescription::Value { value } => value,
            RawDescription::Other(_) => String::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawLink {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
}

impl From<RawLink> for Link {
    fn from(raw: RawLink) -> Self {
        Link {
            title: raw.title,
            url: raw.url,
        }
    }
}

/// Record timestamps are typed objects with a `value` field, though some
/// historical records carry `date` or a bare string instead.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawTimestamp {
    Object {
        value: Option<String>,
        date: Option<String>,
    },
    Text(String),
    Other(serde_json::Value),
}

impl RawTimestamp {
    fn normalize(self) -> Option<String> {
        match self {
            RawTimestamp::Object { value, date } => value.or(date),
            RawTimestamp::Text(text) => Some(text),
            RawTimestamp::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    const PAGE_SIZE: NonZeroU32 = NonZeroU32::new(10).unwrap();

    fn page_with(num_found: u64) -> SearchPage {
        SearchPage {
            docs: vec![],
            num_found,
        }
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(page_with(25).total_pages(PAGE_SIZE), 3);
        assert_eq!(page_with(100).total_pages(PAGE_SIZE), 10);
        assert_eq!(page_with(101).total_pages(PAGE_SIZE), 11);
    }

    #[test]
    fn total_pages_is_at_least_one() {
        assert_eq!(page_with(0).total_pages(PAGE_SIZE), 1);
        assert_eq!(page_with(1).total_pages(PAGE_SIZE), 1);
    }

    proptest! {
        #[test]
        fn total_pages_matches_ceiling_division(num_found in 0u64..1_000_000) {
            let expected = std::cmp::max(1, num_found.div_ceil(10));
            prop_assert_eq!(page_with(num_found).total_pages(PAGE_SIZE) as u64, expected);
        }
    }

    #[test]
    fn search_doc_id_prefers_stripped_work_key() {
        let doc: RawSearchDoc = serde_json::from_value(json!({
            "key": "/works/OL45883W",
            "cover_edition_key": "OL7353617M",
            "title": "The Dispossessed",
        }))
        .unwrap();
        assert_eq!(SearchResult::from(doc).id.as_deref(), Some("OL45883W"));
    }

    #[test]
    fn search_doc_id_falls_back_to_edition_keys() {
        let doc: RawSearchDoc = serde_json::from_value(json!({
            "cover_edition_key": "OL7353617M",
            "edition_key": ["OL1M", "OL2M"],
        }))
        .unwrap();
        assert_eq!(SearchResult::from(doc).id.as_deref(), Some("OL7353617M"));

        let doc: RawSearchDoc = serde_json::from_value(json!({
            "edition_key": ["OL1M", "OL2M"],
        }))
        .unwrap();
        assert_eq!(SearchResult::from(doc).id.as_deref(), Some("OL1M"));

        let doc: RawSearchDoc = serde_json::from_value(json!({})).unwrap();
        assert_eq!(SearchResult::from(doc).id, None);
    }

    #[test]
    fn search_doc_short_desc_prefers_subjects_over_subtitle() {
        let doc: RawSearchDoc = serde_json::from_value(json!({
            "subject": ["a", "b", "c", "d", "e", "f", "g"],
            "subtitle": "a subtitle",
        }))
        .unwrap();
        assert_eq!(SearchResult::from(doc).short_desc, "a, b, c, d, e");

        let doc: RawSearchDoc = serde_json::from_value(json!({
            "subtitle": "a subtitle",
        }))
        .unwrap();
        assert_eq!(SearchResult::from(doc).short_desc, "a subtitle");
    }

    #[test]
    fn search_doc_defaults_apply_once() {
        let result = SearchResult::from(serde_json::from_value::<RawSearchDoc>(json!({})).unwrap());
        assert_eq!(result.title, "");
        assert_eq!(result.author_name, "");
        assert_eq!(result.short_desc, "");
        assert_eq!(result.first_publish_year, None);
    }

    #[test]
    fn search_doc_joins_author_names() {
        let doc: RawSearchDoc = serde_json::from_value(json!({
            "author_name": ["Terry Pratchett", "Neil Gaiman"],
        }))
        .unwrap();
        assert_eq!(
            SearchResult::from(doc).author_name,
            "Terry Pratchett, Neil Gaiman"
        );
    }

    #[test]
    fn work_description_normalizes_both_shapes() {
        let raw: RawWork = serde_json::from_value(json!({
            "description": "plain text",
        }))
        .unwrap();
        assert_eq!(raw.normalize("OL1W").description, "plain text");

        let raw: RawWork = serde_json::from_value(json!({
            "description": {"type": "/type/text", "value": "typed text"},
        }))
        .unwrap();
        assert_eq!(raw.normalize("OL1W").description, "typed text");

        let raw: RawWork = serde_json::from_value(json!({})).unwrap();
        assert_eq!(raw.normalize("OL1W").description, "");
    }

    #[test]
    fn work_sequences_default_to_empty() {
        let work = serde_json::from_value::<RawWork>(json!({"title": "Dune"}))
            .unwrap()
            .normalize("OL893415W");
        assert_eq!(work.id, "OL893415W");
        assert!(work.subjects.is_empty());
        assert!(work.covers.is_empty());
        assert!(work.links.is_empty());
    }

    #[test]
    fn work_created_takes_value_then_date() {
        let raw: RawWork = serde_json::from_value(json!({
            "created": {"type": "/type/datetime", "value": "2009-12-11T01:57:19"},
        }))
        .unwrap();
        assert_eq!(
            raw.normalize("OL1W").created.as_deref(),
            Some("2009-12-11T01:57:19")
        );

        let raw: RawWork = serde_json::from_value(json!({
            "created": {"date": "2009-12-11"},
        }))
        .unwrap();
        assert_eq!(raw.normalize("OL1W").created.as_deref(), Some("2009-12-11"));
    }

    #[test]
    fn work_first_publish_date_falls_back_to_year() {
        let raw: RawWork = serde_json::from_value(json!({
            "first_publish_year": 1965,
        }))
        .unwrap();
        assert_eq!(
            raw.normalize("OL1W").first_publish_date.as_deref(),
            Some("1965")
        );
    }

    #[test]
    fn cover_urls_derive_from_cover_ids() {
        let work = WorkDetails {
            covers: vec![11481354, 21],
            ..Default::default()
        };
        assert_eq!(
            work.cover_url(CoverSize::Large).as_deref(),
            Some("https://covers.openlibrary.org/b/id/11481354-L.jpg")
        );
        assert_eq!(WorkDetails::default().cover_url(CoverSize::Large), None);

        let result = SearchResult {
            cover_i: Some(42),
            ..Default::default()
        };
        assert_eq!(
            result.cover_url(CoverSize::Medium).as_deref(),
            Some("https://covers.openlibrary.org/b/id/42-M.jpg")
        );
    }
}
