use std::io::Write;

use anyhow::Result;
use bookshelf_catalog::{
    CatalogError, Client, ClientTrait, DEFAULT_PAGE_SIZE, SearchPage, WorkDetails,
};
use bpaf::Bpaf;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use indoc::indoc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, instrument};

use crate::utils::display::{DisplayResults, DisplayWork};
use crate::utils::message;
use crate::views::{DetailTicket, DetailView, Location, SearchTicket, SearchView};

const BROWSE_HELP: &str = indoc! {"
    q <text>   search for works (blank text clears the search)
    n / p      next / previous page
    g <n>      go to page <n>
    a <text>   filter the current page by author (blank clears)
    y <year>   filter the current page by first publish year (blank clears)
    o <id>     open the record for a work
    b          back to the result list
    l          print the shareable location string
    ?          show this help
    x          quit
"};

// Browse the catalog interactively
#[derive(Debug, Bpaf, Clone)]
pub struct Browse {
    /// Start from a shareable location string, e.g. 'q=dune&page=2'
    #[bpaf(long, argument("location"))]
    pub location: Option<String>,

    /// Page of results to start on (1-based)
    #[bpaf(long, argument("page"))]
    pub page: Option<u32>,

    /// Initial search term
    #[bpaf(positional("search-term"))]
    pub search_term: Option<String>,
}

/// Which screen the loop is rendering.
enum Screen {
    List,
    Detail,
}

/// Completion of the single in-flight fetch.
enum Settled {
    Search(SearchTicket, Result<SearchPage, CatalogError>),
    Detail(DetailTicket, Result<Option<WorkDetails>, CatalogError>),
}

impl Browse {
    /// Run the interactive loop: one branch reads commands, the other drives
    /// the single in-flight fetch. Issuing a new fetch replaces the pending
    /// one, and the view generation check drops anything that slips through.
    #[instrument(name = "browse", skip_all)]
    pub async fn handle(self, client: Client) -> Result<()> {
        let location = match &self.location {
            Some(query_string) => Location::parse(query_string),
            None => Location::new(self.search_term.as_deref(), self.page),
        };
        let (mut search_view, ticket) = SearchView::new(location);
        let mut detail_view: Option<DetailView> = None;
        let mut screen = Screen::List;
        let mut inflight: Option<LocalBoxFuture<'_, Settled>> =
            ticket.map(|ticket| spawn_search(&client, ticket));

        message::plain(BROWSE_HELP);
        render(&screen, &search_view, detail_view.as_ref());
        prompt();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let fetch_pending = inflight.is_some();
            tokio::select! {
                settled = async { inflight.as_mut().expect("in-flight fetch missing").await }, if fetch_pending => {
                    inflight = None;
                    match settled {
                        Settled::Search(ticket, outcome) => search_view.settle(ticket, outcome),
                        // A detail response after 'b' has no view left to land in.
                        Settled::Detail(ticket, outcome) => {
                            if let Some(view) = detail_view.as_mut() {
                                view.settle(ticket, outcome);
                            }
                        },
                    }
                    render(&screen, &search_view, detail_view.as_ref());
                    prompt();
                },
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    let input = line.trim();
                    let (command, rest) = match input.split_once(char::is_whitespace) {
                        Some((command, rest)) => (command, rest.trim()),
                        None => (input, ""),
                    };
                    match command {
                        "" => {},
                        "x" | "quit" | "exit" => break,
                        "?" | "help" => {
                            message::plain(BROWSE_HELP);
                        },
                        "q" => {
                            screen = Screen::List;
                            inflight = search_view
                                .set_query(rest)
                                .map(|ticket| spawn_search(&client, ticket));
                        },
                        "n" => {
                            let next = search_view.page().saturating_add(1);
                            if let Some(ticket) = search_view.go_to_page(next) {
                                inflight = Some(spawn_search(&client, ticket));
                            }
                        },
                        "p" => {
                            let previous = search_view.page().saturating_sub(1);
                            if let Some(ticket) = search_view.go_to_page(previous) {
                                inflight = Some(spawn_search(&client, ticket));
                            }
                        },
                        "g" => match rest.parse::<u32>() {
                            Ok(page) => {
                                if let Some(ticket) = search_view.go_to_page(page) {
                                    inflight = Some(spawn_search(&client, ticket));
                                }
                            },
                            Err(_) => message::warning("usage: g <page-number>"),
                        },
                        "a" => search_view.set_author_filter(rest),
                        "y" => search_view.set_year_filter(rest),
                        "o" => {
                            if rest.is_empty() {
                                message::warning("usage: o <work-id>");
                            } else {
                                screen = Screen::Detail;
                                let ticket = match detail_view.as_mut() {
                                    Some(view) => view.set_id(rest),
                                    None => {
                                        let (view, ticket) = DetailView::open(rest);
                                        detail_view = Some(view);
                                        ticket
                                    },
                                };
                                inflight = Some(spawn_detail(&client, ticket));
                            }
                        },
                        "b" => {
                            screen = Screen::List;
                            detail_view = None;
                        },
                        "l" => {
                            message::plain(format!("?{}", search_view.location().to_query_string()));
                        },
                        other => {
                            message::warning(format!("unknown command '{other}', type '?' for help"));
                        },
                    }
                    render(&screen, &search_view, detail_view.as_ref());
                    prompt();
                },
            }
        }
        Ok(())
    }
}

fn spawn_search<'a>(client: &'a Client, ticket: SearchTicket) -> LocalBoxFuture<'a, Settled> {
    debug!(query = ticket.query(), page = ticket.page(), "dispatching search");
    async move {
        let outcome = client
            .search(ticket.query(), ticket.page(), DEFAULT_PAGE_SIZE)
            .await;
        Settled::Search(ticket, outcome)
    }
    .boxed_local()
}

fn spawn_detail<'a>(client: &'a Client, ticket: DetailTicket) -> LocalBoxFuture<'a, Settled> {
    debug!(id = ticket.id(), "dispatching work lookup");
    async move {
        let outcome = client.work_details(ticket.id()).await;
        Settled::Detail(ticket, outcome)
    }
    .boxed_local()
}

fn render(screen: &Screen, search: &SearchView, detail: Option<&DetailView>) {
    match screen {
        Screen::Detail => {
            if let Some(view) = detail {
                render_detail(view);
            }
        },
        Screen::List => render_list(search),
    }
}

fn render_list(view: &SearchView) {
    if view.query().trim().is_empty() {
        message::plain("Start exploring: type 'q <text>' to search the catalog.");
        return;
    }

    // The search and filter inputs stay visible in every state below.
    message::plain(format!(
        "Search: '{}'   author filter: '{}'   year filter: '{}'",
        view.query(),
        view.author_filter(),
        view.year_filter(),
    ));

    if view.loading() {
        message::plain("Searching...");
        return;
    }
    if let Some(err) = view.error() {
        message::error(err);
        return;
    }

    let visible = view.visible_items();
    if visible.is_empty() {
        message::plain("No matching results.");
    } else {
        println!("{}", DisplayResults::new(&visible));
    }

    if view.total_pages() > 1 {
        message::plain(format!(
            "Page {} of {} ('n' next, 'p' previous, 'g <n>' jump)",
            view.page(),
            view.total_pages(),
        ));
    }
}

fn render_detail(view: &DetailView) {
    if view.loading() {
        message::plain(format!("Loading '{}'...", view.id()));
        return;
    }
    if let Some(err) = view.error() {
        message::error(err);
        return;
    }
    match view.item() {
        None => message::plain("Work not found."),
        Some(work) => {
            println!("{}", DisplayWork(work));
            message::plain("'b' to go back");
        },
    }
}

fn prompt() {
    eprint!("> ");
    let _ = std::io::stderr().flush();
}
