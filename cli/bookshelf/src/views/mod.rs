//! View state machines for the search and detail screens.
//!
//! Views own their state exclusively and never perform network calls
//! themselves. A state change that requires data returns a ticket; the caller
//! runs the catalog call and hands the outcome back through `settle`. Tickets
//! carry a generation counter so a response whose request has been superseded
//! is discarded instead of committed.

mod detail;
mod location;
mod search;

pub(crate) use detail::{DetailTicket, DetailView};
pub(crate) use location::Location;
pub(crate) use search::{SearchTicket, SearchView};
