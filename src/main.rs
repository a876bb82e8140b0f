use clap::Parser;
use env_logger::Env;

use gerrit_batch::changes::ChangeSelection;
use gerrit_batch::cli::Cli;
use gerrit_batch::client_factory::create_gerrit_client;
use gerrit_batch::commands;
use gerrit_batch::config::{ConfigFile, ServerProfile};
use gerrit_batch::error::Result;
use gerrit_batch::prompt::TerminalConfirmation;

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "gerrit_batch=debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    ChangeSelection::from_cli(&cli).validate()?;

    let config = match &cli.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::load_default()?,
    };
    let profile = ServerProfile::resolve(&cli, &config)?;
    let client = create_gerrit_client(&profile)?;

    commands::run(&cli, &profile, client.as_ref(), &mut TerminalConfirmation).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
