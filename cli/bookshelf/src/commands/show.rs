use anyhow::{Result, bail};
use bookshelf_catalog::{Client, ClientTrait};
use bpaf::Bpaf;
use tracing::instrument;

use crate::utils::display::DisplayWork;
use crate::utils::message;
use crate::views::DetailView;

// Show detailed work information
#[derive(Debug, Bpaf, Clone)]
pub struct Show {
    /// Display the work record as JSON
    #[bpaf(long)]
    pub json: bool,

    /// The work to show, e.g. an id copied from the output of
    /// 'bookshelf search'.
    #[bpaf(positional("work-id"))]
    pub work_id: String,
}

impl Show {
    #[instrument(name = "show", skip_all)]
    pub async fn handle(self, client: Client) -> Result<()> {
        tracing::debug!("fetching work record: {}", self.work_id);

        let (mut view, ticket) = DetailView::open(&self.work_id);
        let outcome = client.work_details(ticket.id()).await;
        view.settle(ticket, outcome);

        if let Some(err) = view.error() {
            bail!("failed to fetch work '{}': {err}", self.work_id);
        }

        // Not-found is an answer, not a failure.
        if view.is_not_found() {
            message::plain(format!("No work found with id '{}'", self.work_id));
            return Ok(());
        }

        if let Some(work) = view.item() {
            if self.json {
                println!("{}", serde_json::to_string(work)?);
            } else {
                println!("{}", DisplayWork(work));
            }
        }
        Ok(())
    }
}
