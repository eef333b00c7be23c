use anyhow::{Result, bail};
use bookshelf_catalog::{Client, ClientTrait, DEFAULT_PAGE_SIZE};
use bpaf::Bpaf;
use log::debug;
use tracing::instrument;

use crate::utils::display::DisplayResults;
use crate::utils::message;
use crate::views::{Location, SearchView};

// Search the catalog for works
#[derive(Debug, Bpaf, Clone)]
pub struct Search {
    /// Display search results as a JSON array
    #[bpaf(long)]
    pub json: bool,

    /// Page of results to fetch (1-based)
    #[bpaf(long, argument("page"), fallback(1))]
    pub page: u32,

    /// Only display results whose authors contain this text
    #[bpaf(long, argument("author"))]
    pub author: Option<String>,

    /// Only display results first published in this year
    #[bpaf(long, argument("year"))]
    pub year: Option<String>,

    /// The term to search the catalog for
    #[bpaf(positional("search-term"))]
    pub search_term: String,
}

impl Search {
    #[instrument(name = "search", fields(search_term = %self.search_term, page = self.page), skip_all)]
    pub async fn handle(self, client: Client) -> Result<()> {
        debug!("performing search for term: {}", self.search_term);

        let location = Location::new(Some(&self.search_term), Some(self.page));
        let (mut view, ticket) = SearchView::new(location);
        let Some(ticket) = ticket else {
            bail!("search term must not be empty");
        };

        let outcome = client
            .search(ticket.query(), ticket.page(), DEFAULT_PAGE_SIZE)
            .await;
        view.settle(ticket, outcome);

        if let Some(filter) = &self.author {
            view.set_author_filter(filter);
        }
        if let Some(filter) = &self.year {
            view.set_year_filter(filter);
        }

        if let Some(err) = view.error() {
            bail!("search failed: {err}");
        }

        if self.json {
            debug!("printing search results as JSON");
            let docs = view
                .visible_items()
                .into_iter()
                .cloned()
                .collect::<Vec<_>>();
            println!("{}", serde_json::to_string(&docs)?);
            return Ok(());
        }

        if view.items().is_empty() {
            bail!(
                "no works matched this search term: '{}'",
                self.search_term
            );
        }

        let visible = view.visible_items();
        if visible.is_empty() {
            // The page has results, the filters just hide all of them.
            message::plain("No matching results.");
        } else {
            println!("{}", DisplayResults::new(&visible));
        }

        let mut hints = String::new();
        if view.total_pages() > 1 {
            hints.push_str(&format!(
                "\nPage {page} of {total}. Use '--page' to fetch another page.",
                page = view.page(),
                total = view.total_pages(),
            ));
        }
        hints.push_str(&format!(
            "\nShareable: ?{}",
            view.location().to_query_string()
        ));
        message::plain(hints);

        Ok(())
    }
}
