use anyhow::{bail, Context, Result};
use bracket_client::{BracketClient, DEFAULT_SERVER_URL};
use bracket_proto::{TeamId, TeamSelection};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "bracket-request",
    author,
    version,
    about = "Pick up to five favorite teams and ask the bracket server for a bracket"
)]
struct Cli {
    /// Base URL of the bracket server.
    #[arg(long, env = "BRACKET_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Print the tournament field and exit.
    #[arg(long)]
    list: bool,

    /// Team ids to highlight (1-64, at most five).
    team_ids: Vec<TeamId>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = BracketClient::new(&cli.server)
        .with_context(|| format!("invalid server url: {}", cli.server))?;

    if cli.list {
        let teams = client
            .list_teams()
            .await
            .context("failed to fetch the tournament field")?;
        for team in teams {
            println!(
                "{:>2}  {:<8} seed {:>2}  {}",
                team.id,
                team.region.label(),
                team.seed,
                team.name
            );
        }
        return Ok(());
    }

    let selection = TeamSelection::new(cli.team_ids)?;
    let result = client.request_bracket(selection.ids()).await;
    if !result.success {
        bail!(
            "{}",
            result
                .error
                .unwrap_or_else(|| "bracket generation failed".to_string())
        );
    }

    if let Some(champion) = &result.champion {
        println!("champion: {champion}");
    }
    if let Some(message) = &result.message {
        println!("{message}");
    }
    if let Some(url) = &result.bracket_url {
        println!("bracket: {url}");
    }
    Ok(())
}
