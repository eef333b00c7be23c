//! State machine for the search screen.

use bookshelf_catalog::{CatalogError, DEFAULT_PAGE_SIZE, SearchPage, SearchResult};
use tracing::debug;

use super::Location;

/// A pending search request. Returned whenever a state change requires a
/// fetch; the holder runs the catalog call and settles the view with the
/// outcome. The embedded generation keeps superseded responses out.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchTicket {
    generation: u64,
    query: String,
    page: u32,
}

impl SearchTicket {
    pub(crate) fn query(&self) -> &str {
        &self.query
    }

    pub(crate) fn page(&self) -> u32 {
        self.page
    }
}

/// State of the search screen: the navigable location, the current page of
/// results, loading/error flags, and the page-local filters.
#[derive(Debug)]
pub(crate) struct SearchView {
    location: Location,
    items: Vec<SearchResult>,
    total_pages: u32,
    loading: bool,
    error: Option<String>,
    author_filter: String,
    year_filter: String,
    generation: u64,
}

impl SearchView {
    /// Create the view for a location, along with the initial fetch when the
    /// location carries a search term.
    pub(crate) fn new(location: Location) -> (Self, Option<SearchTicket>) {
        let mut view = Self {
            location,
            items: Vec::new(),
            total_pages: 1,
            loading: false,
            error: None,
            author_filter: String::new(),
            year_filter: String::new(),
            generation: 0,
        };
        let ticket = view.refetch();
        (view, ticket)
    }

    /// Replace the search term. A blank term clears the screen without
    /// fetching; anything else resets to page 1 and fetches.
    pub(crate) fn set_query(&mut self, raw: &str) -> Option<SearchTicket> {
        if raw.trim().is_empty() {
            self.location.clear_query();
        } else {
            self.location.set_query(raw);
        }
        self.refetch()
    }

    /// Move to another page of the current search. Out-of-range pages are
    /// ignored entirely, as is the page the view is already on.
    pub(crate) fn go_to_page(&mut self, page: u32) -> Option<SearchTicket> {
        if page < 1 || page > self.total_pages || page == self.location.page() {
            return None;
        }
        self.location.set_page(page);
        self.refetch()
    }

    /// Invalidate any in-flight request and, for a non-blank query, enter the
    /// loading state and issue a new ticket.
    fn refetch(&mut self) -> Option<SearchTicket> {
        self.generation += 1;
        if self.location.query().trim().is_empty() {
            self.items.clear();
            self.total_pages = 1;
            self.loading = false;
            self.error = None;
            return None;
        }
        self.loading = true;
        self.error = None;
        Some(SearchTicket {
            generation: self.generation,
            query: self.location.query().to_string(),
            page: self.location.page(),
        })
    }

    /// Commit the outcome of a fetch, unless a newer request has been issued
    /// since the ticket was handed out.
    pub(crate) fn settle(&mut self, ticket: SearchTicket, outcome: Result<SearchPage, CatalogError>) {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding stale search response"
            );
            return;
        }
        self.loading = false;
        match outcome {
            Ok(page) => {
                self.total_pages = page.total_pages(DEFAULT_PAGE_SIZE);
                self.items = page.docs;
            },
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    pub(crate) fn set_author_filter(&mut self, filter: &str) {
        self.author_filter = filter.to_string();
    }

    pub(crate) fn set_year_filter(&mut self, filter: &str) {
        self.year_filter = filter.to_string();
    }

    /// The current page's items, narrowed by the filters. Filtering never
    /// refetches and never changes the page count.
    pub(crate) fn visible_items(&self) -> Vec<&SearchResult> {
        self.items
            .iter()
            .filter(|item| self.passes_filters(item))
            .collect()
    }

    fn passes_filters(&self, item: &SearchResult) -> bool {
        let author_filter = self.author_filter.trim();
        let author_match = author_filter.is_empty()
            || item
                .author_name
                .to_lowercase()
                .contains(&author_filter.to_lowercase());

        let year_filter = self.year_filter.trim();
        let year_match = year_filter.is_empty()
            || year_filter
                .parse::<i32>()
                .is_ok_and(|year| item.first_publish_year == Some(year));

        author_match && year_match
    }

    pub(crate) fn location(&self) -> &Location {
        &self.location
    }

    pub(crate) fn query(&self) -> &str {
        self.location.query()
    }

    pub(crate) fn page(&self) -> u32 {
        self.location.page()
    }

    pub(crate) fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub(crate) fn loading(&self) -> bool {
        self.loading
    }

    pub(crate) fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn items(&self) -> &[SearchResult] {
        &self.items
    }

    pub(crate) fn author_filter(&self) -> &str {
        &self.author_filter
    }

    pub(crate) fn year_filter(&self) -> &str {
        &self.year_filter
    }
}
