use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tutorhub::app::Command;
use tutorhub::{App, Config};

#[derive(Parser)]
#[command(name = "tutorhub")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tutorhub=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Browsing is the default
    let command = cli.command.unwrap_or(Command::List {
        search: None,
        category: None,
        difficulty: None,
        page: 1,
    });

    let config = Config::load()?;
    let mut app = App::new(config)?;
    let output = app.execute(command).await?;
    print!("{output}");

    Ok(())
}
