mod cli;
mod commands;
mod error;
mod mcp;
mod page_range;
mod pdf;
mod selection;
mod session;
mod thumbnails;

use anyhow::{anyhow, Result};
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{prelude::*, EnvFilter};

fn init_logging() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout belongs to command output and the MCP transport
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let settings = cli.settings;
    match cli.command {
        Commands::Mcp => {
            mcp::run_server(settings.render_backend()).await?;
        }
        Commands::Select {
            path,
            output_dir,
            thumbnail_dir,
        } => {
            commands::select::run(
                path.as_deref(),
                &output_dir,
                thumbnail_dir.as_deref(),
                &settings,
            )
            .await?;
        }
        Commands::Extract {
            path,
            clicks,
            output,
        } => {
            commands::extract::run(&path, &clicks, output.as_deref(), settings.order).await?;
        }
        Commands::Thumbnails { path, output_dir } => {
            commands::thumbnails::run(&path, &output_dir, &settings).await?;
        }
    }

    Ok(())
}
