mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "binstage",
    about = "Build entry points into staged, executable CLI artifacts"
)]
#[command(version)]
struct Cli {
    /// Workspace root containing binstage.toml
    #[arg(long, short = 'C', global = true, default_value = ".")]
    project_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run prebuild, compile every target, and stage the primary output
    Build,
    /// Validate binstage.toml and list the targets a build would produce
    Plan,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                // arch-lint: allow(no-silent-result-drop) reason="an unset or invalid RUST_LOG falls back to info"
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build => commands::build(&cli.project_dir).await?,
        Commands::Plan => commands::plan(&cli.project_dir)?,
    }

    Ok(())
}
