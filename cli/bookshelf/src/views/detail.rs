//! State machine for the single-work detail screen.

use bookshelf_catalog::{CatalogError, WorkDetails};
use tracing::debug;

/// A pending work lookup, tied to the generation that issued it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DetailTicket {
    generation: u64,
    id: String,
}

impl DetailTicket {
    pub(crate) fn id(&self) -> &str {
        &self.id
    }
}

/// State of the detail screen, keyed by the work id it was opened with.
///
/// A settled view with no item and no error is the not-found state: the
/// catalog answered, there is just no such work.
#[derive(Debug)]
pub(crate) struct DetailView {
    id: String,
    item: Option<WorkDetails>,
    loading: bool,
    error: Option<String>,
    generation: u64,
}

impl DetailView {
    /// Open the detail screen for a work, returning the initial fetch.
    pub(crate) fn open(id: impl Into<String>) -> (Self, DetailTicket) {
        let mut view = Self {
            id: id.into(),
            item: None,
            loading: false,
            error: None,
            generation: 0,
        };
        let ticket = view.refetch();
        (view, ticket)
    }

    /// Switch the screen to another work. The previous request, if still in
    /// flight, is superseded.
    pub(crate) fn set_id(&mut self, id: impl Into<String>) -> DetailTicket {
        self.id = id.into();
        self.refetch()
    }

    fn refetch(&mut self) -> DetailTicket {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        DetailTicket {
            generation: self.generation,
            id: self.id.clone(),
        }
    }

    /// Commit the outcome of a lookup, unless the ticket has been superseded.
    /// A `None` item is stored as-is; not-found is not an error.
    pub(crate) fn settle(
        &mut self,
        ticket: DetailTicket,
        outcome: Result<Option<WorkDetails>, CatalogError>,
    ) {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding stale work response"
            );
            return;
        }
        self.loading = false;
        match outcome {
            Ok(item) => self.item = item,
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn loading(&self) -> bool {
        self.loading
    }

    pub(crate) fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn item(&self) -> Option<&WorkDetails> {
        self.item.as_ref()
    }

    /// True once the catalog has answered that the work does not exist.
    pub(crate) fn is_not_found(&self) -> bool {
        !self.loading && self.error.is_none() && self.item.is_none()
    }
}
