mod browse;
mod search;
mod show;

use std::fmt;

use anyhow::Result;
use bpaf::Bpaf;
use indoc::indoc;

use crate::config::Config;
use crate::utils::init::init_catalog_client;

static BOOKSHELF_DESCRIPTION: &'_ str = indoc! {"
    Bookshelf is a terminal client for the Open Library book catalog.

    Search for works, page through results with author and year filters,
    and open the full record for a single work."
};

fn vec_len<T>(x: Vec<T>) -> usize {
    Vec::len(&x)
}

#[derive(Bpaf, Clone, Copy, Debug)]
pub enum Verbosity {
    Verbose(
        /// Increase logging verbosity
        ///
        /// Invoke multiple times for increasing detail.
        #[bpaf(short('v'), long("verbose"), req_flag(()), many, map(vec_len))]
        usize,
    ),

    /// Silence logs except for errors
    #[bpaf(short, long)]
    Quiet,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Verbose(0)
    }
}

/// Main bookshelf args parser
#[derive(Debug, Bpaf)]
#[bpaf(options, version, descr(BOOKSHELF_DESCRIPTION))]
pub struct BookshelfArgs {
    #[bpaf(external, fallback(Default::default()))]
    pub verbosity: Verbosity,

    #[bpaf(external(commands))]
    command: Commands,
}

impl BookshelfArgs {
    pub async fn handle(self, config: Config) -> Result<()> {
        let client = init_catalog_client(&config)?;
        match self.command {
            Commands::Search(args) => args.handle(client).await,
            Commands::Show(args) => args.handle(client).await,
            Commands::Browse(args) => args.handle(client).await,
        }
    }
}

#[derive(Bpaf, Clone)]
enum Commands {
    /// Search the catalog for works matching a term
    #[bpaf(command)]
    Search(#[bpaf(external(search::search))] search::Search),

    /// Show the full record for a single work
    #[bpaf(command)]
    Show(#[bpaf(external(show::show))] show::Show),

    /// Browse the catalog interactively
    #[bpaf(command)]
    Browse(#[bpaf(external(browse::browse))] browse::Browse),
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command")
    }
}
