//! Issue Shepherd CLI entry point.

use clap::Parser;

use issue_shepherd::cli::commands::{self, load_settings};
use issue_shepherd::cli::{handle_error, Cli, Commands};
use issue_shepherd::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let global = &cli.global;

    let settings = match load_settings(global) {
        Ok(settings) => settings,
        Err(err) => handle_error(err, global.json),
    };
    let _logger = match LoggerImpl::init(&settings.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, global.json),
    };

    let result = match &cli.command {
        Commands::Serve(args) => commands::serve::execute(global, &settings, args).await,
        Commands::Sync => commands::sync::execute(global, &settings).await,
        Commands::Init => commands::init::execute(global, &settings).await,
        Commands::Destroy(args) => commands::destroy::execute(global, &settings, args).await,
        Commands::Info => commands::info::execute(global),
    };

    if let Err(err) = result {
        handle_error(err, global.json);
    }
}
