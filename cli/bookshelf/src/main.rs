use std::process::ExitCode;

use anyhow::Result;
use bpaf::Args;
use commands::BookshelfArgs;
use log::debug;
use utils::init::init_logger;
use utils::message;

mod commands;
mod config;
mod utils;
mod views;

async fn run(args: BookshelfArgs) -> Result<()> {
    init_logger(Some(args.verbosity));
    let config = config::Config::parse()?;
    args.handle(config).await?;
    Ok(())
}

fn main() -> ExitCode {
    // initialize logger with "best guess" defaults
    // updating the logger conf is cheap, so we reinitialize whenever we get more information
    init_logger(None);

    // Run the argument parser
    //
    // Pass through Completion "failure"; in completion mode this needs to be
    // printed as is to work with the shell completion frontends
    //
    // Pass through Stdout failure; this represents `--help`
    let args = commands::bookshelf_args().run_inner(Args::current_args());

    if let Some(parse_err) = args.as_ref().err() {
        match parse_err {
            bpaf::ParseFailure::Stdout(m, _) => {
                print!("{m:80}");
                return ExitCode::from(0);
            },
            bpaf::ParseFailure::Stderr(m) => {
                message::error(format!("{m:80}"));
                return ExitCode::from(1);
            },
            bpaf::ParseFailure::Completion(c) => {
                print!("{c}");
                return ExitCode::from(0);
            },
        }
    }

    // Errors handled above
    let args = args.unwrap();

    let runtime = tokio::runtime::Runtime::new().unwrap();

    // Run bookshelf. Print errors and exit with status 1 on failure
    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::from(0),

        Err(e) => {
            debug!("{:#}", e);

            let err_str = e
                .chain()
                .skip(1)
                .fold(e.to_string(), |acc, cause| format!("{}: {}", acc, cause));

            message::error(err_str);

            ExitCode::from(1)
        },
    }
}
