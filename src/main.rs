use clap::Parser;
use eyrie_apply::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing
    let filter = cli.log_filter();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Command::Serve {
            bind,
            sheet,
            in_memory,
        } => cli::serve::serve(&bind, &sheet, in_memory).await?,
        Command::Submit {
            full_name,
            phone,
            email,
            university,
            department,
            level,
            why,
            discord,
            sheet,
        } => {
            let answers = cli::submit::Answers {
                details: cli::submit::details(
                    &full_name,
                    &phone,
                    &email,
                    &university,
                    &department,
                    &level,
                ),
                motivation: cli::submit::motivation(&why, &discord),
            };
            cli::submit::submit(&answers, &sheet).await?;
        }
        Command::Apply {
            server,
            community_url,
        } => cli::apply::apply(&server, &community_url).await?,
    }

    Ok(())
}
