use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use skyhop_core::config::SkyhopConfig;

use crate::{compare::CompareArgs, replay::ReplayArgs, suggest::SuggestArgs};

mod compare;
mod parsers;
mod places;
mod replay;
mod suggest;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the flying time with the driving time between two places
    #[command(visible_alias = "c")]
    Compare {
        #[command(flatten)]
        args: CompareArgs,
    },
    /// List place suggestions for a query
    #[command(visible_alias = "s")]
    Suggest {
        #[command(flatten)]
        args: SuggestArgs,
    },
    /// Animate a pair on the map and write the resulting style document
    #[command(visible_alias = "r")]
    Replay {
        #[command(flatten)]
        args: ReplayArgs,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::from_filename("./.env.local").ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let config = SkyhopConfig::from_env()?;

    match cli.command {
        Commands::Compare { args } => compare::run(args, &config).await?,
        Commands::Suggest { args } => suggest::run(args, &config).await?,
        Commands::Replay { args } => replay::run(args, &config).await?,
    }

    Ok(())
}
