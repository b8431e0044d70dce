mod cli;
mod context;
mod handlers;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use context::CliContext;
use tracing_subscriber::EnvFilter;

fn init_tracing() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("TASKBOARD_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        let filter =
            EnvFilter::try_from_env("TASKBOARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "taskboard", &mut std::io::stdout());
        return Ok(());
    }

    let ctx = match CliContext::connect(&cli).await {
        Ok(ctx) => ctx,
        Err(e) => output::output_error(&e),
    };

    let result = match cli.command {
        Commands::Board(board_cmd) => handlers::board::handle(&ctx, board_cmd.action).await,
        Commands::Column(column_cmd) => handlers::column::handle(&ctx, column_cmd.action).await,
        Commands::Card(card_cmd) => handlers::card::handle(&ctx, card_cmd.action).await,
        Commands::Completions { .. } => Ok(()),
    };

    // output_error exits without running destructors, so release the store first.
    ctx.close().await?;
    if let Err(e) = result {
        output::output_error(&e);
    }
    Ok(())
}
