mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Configure {
            root,
            output,
            prior,
            alignment,
            show,
        } => {
            let update = commands::configure::ConfigUpdate {
                root,
                output,
                prior,
                alignment,
            };
            commands::configure::handle(cli.config.as_deref(), update, show)?;
        }

        Commands::Rebuild {
            source,
            output,
            format,
        } => {
            let config = Config::load(cli.config.as_deref())?;
            commands::rebuild::handle(&config, &source, output, format)?;
        }

        Commands::Effects {
            root,
            prior,
            output,
            strict,
        } => {
            let config = Config::load(cli.config.as_deref())?;
            commands::effects::handle(&config, root, prior, output, strict)?;
        }

        Commands::Show {
            set_dir,
            source,
            format,
        } => {
            let config = Config::load(cli.config.as_deref())?;
            commands::show::handle(&config, &set_dir, &source, format)?;
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays clean for `show`
fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "gearcat=info",
        1 => "gearcat=debug",
        _ => "gearcat=trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
