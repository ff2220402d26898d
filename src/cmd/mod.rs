//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`validate`], or [`health`]. Each handler
//! lives in its own submodule.

pub mod health;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::FleetError;

pub async fn dispatch(cli: Cli) -> Result<(), FleetError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args).await,
        Some(Commands::Health(args)) => health::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  fleet-relay v{version} - fleet telemetry ingestion with partner fanout\n\n  \
         No command provided. To get started:\n\n    \
         fleet-relay run                           Start the server (fanout disabled)\n    \
         fleet-relay validate partners.json        Check a partner targets file\n    \
         fleet-relay health http://host:8000       Show partner delivery health\n    \
         fleet-relay --help                        See all commands and options\n"
    );
}
