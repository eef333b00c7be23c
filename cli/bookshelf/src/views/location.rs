//! Navigable, shareable query-string state.

use url::form_urlencoded;

const QUERY_KEY: &str = "q";
const PAGE_KEY: &str = "page";

/// The portion of view state that is shareable as a query string: the search
/// term, the 1-based page, and any unrelated parameters passed through
/// untouched.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Location {
    query: Option<String>,
    page: u32,
    extra: Vec<(String, String)>,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            query: None,
            page: 1,
            extra: Vec::new(),
        }
    }
}

impl Location {
    pub(crate) fn new(query: Option<&str>, page: Option<u32>) -> Self {
        let query = query
            .filter(|q| !q.trim().is_empty())
            .map(str::to_owned);
        let page = page.filter(|page| *page >= 1).unwrap_or(1);
        Self {
            query,
            page,
            extra: Vec::new(),
        }
    }

    /// Parse a query string. An absent or blank `q` means the empty-query
    /// state; an absent or unparseable `page` defaults to 1.
    pub(crate) fn parse(query_string: &str) -> Self {
        let mut location = Self::default();
        for (key, value) in form_urlencoded::parse(query_string.as_bytes()) {
            match &*key {
                QUERY_KEY => {
                    location.query = Some(value.into_owned()).filter(|q| !q.trim().is_empty());
                },
                PAGE_KEY => {
                    location.page = value.parse().ok().filter(|page| *page >= 1).unwrap_or(1);
                },
                _ => location.extra.push((key.into_owned(), value.into_owned())),
            }
        }
        location
    }

    pub(crate) fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(query) = &self.query {
            serializer.append_pair(QUERY_KEY, query);
            serializer.append_pair(PAGE_KEY, &self.page.to_string());
        }
        for (key, value) in &self.extra {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    pub(crate) fn query(&self) -> &str {
        self.query.as_deref().unwrap_or("")
    }

    pub(crate) fn page(&self) -> u32 {
        self.page
    }

    /// Set a new search term and reset the page to 1.
    pub(crate) fn set_query(&mut self, query: &str) {
        self.query = Some(query.to_string());
        self.page = 1;
    }

    /// Clear the search term and page, keeping unrelated parameters.
    pub(crate) fn clear_query(&mut self) {
        self.query = None;
        self.page = 1;
    }

    /// Move to another page, preserving everything else.
    pub(crate) fn set_page(&mut self, page: u32) {
        self.page = page;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_string_parses_to_defaults() {
        let location = Location::parse("");
        assert_eq!(location.query(), "");
        assert_eq!(location.page(), 1);
    }

    #[test]
    fn query_and_page_round_trip() {
        let location = Location::parse("q=the+dune&page=2");
        assert_eq!(location.query(), "the dune");
        assert_eq!(location.page(), 2);
        assert_eq!(location.to_query_string(), "q=the+dune&page=2");
    }

    #[test]
    fn invalid_page_defaults_to_one() {
        assert_eq!(Location::parse("q=dune&page=abc").page(), 1);
        assert_eq!(Location::parse("q=dune&page=0").page(), 1);
        assert_eq!(Location::parse("q=dune").page(), 1);
    }

    #[test]
    fn blank_query_is_the_empty_state() {
        let location = Location::parse("q=+++&page=3");
        assert_eq!(location.query(), "");
    }

    #[test]
    fn set_query_resets_the_page() {
        let mut location = Location::parse("q=dune&page=5");
        location.set_query("arrakis");
        assert_eq!(location.query(), "arrakis");
        assert_eq!(location.page(), 1);
    }

    #[test]
    fn clear_query_removes_query_keys_but_keeps_extras() {
        let mut location = Location::parse("q=dune&page=5&lang=en");
        location.clear_query();
        assert_eq!(location.to_query_string(), "lang=en");
    }

    #[test]
    fn set_page_preserves_other_parameters() {
        let mut location = Location::parse("q=dune&page=2&lang=en");
        location.set_page(3);
        assert_eq!(location.to_query_string(), "q=dune&page=3&lang=en");
    }
}
