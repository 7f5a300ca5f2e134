use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The chat client shares the terminal with its log output
    let directive = match cli.command {
        Some(Commands::Chat(_)) => "ecofusion=warn",
        _ => "ecofusion=info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::run(&args).await,
        Some(Commands::Health(args)) => commands::health::run(&args).await,
        Some(Commands::Chat(args)) => commands::chat::run(&args).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
