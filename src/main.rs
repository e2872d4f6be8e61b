//! Flamelayer CLI
//!
//! Command-line front end for the per-image flame layer settings.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{debug, warn};

use flamelayer::cli::{commands, Cli, Commands};
use flamelayer::layers::Viewport;
use flamelayer::{AppConfig, FlameError};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    debug!("Flamelayer v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let result = match cli.command {
        Some(cmd) => handle_command(&config, cmd),
        None => {
            println!("Flamelayer v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = &result {
        if let Some(hint) = e
            .downcast_ref::<FlameError>()
            .and_then(FlameError::recovery_suggestion)
        {
            warn!("{}", hint);
        }
    }
    result
}

fn handle_command(config: &AppConfig, cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::ListImages => commands::list_images(config)
            .with_context(|| format!("listing images in {}", config.images_dir.display())),
        Commands::Show { layer } => commands::show(config, layer.as_deref()).context("show"),
        Commands::Set {
            layer,
            param,
            value,
        } => commands::set(config, &layer, &param, &value)
            .with_context(|| format!("setting {} on {}", param, layer)),
        Commands::Visibility { layer, visible } => commands::visibility(config, &layer, visible)
            .with_context(|| format!("changing visibility of {}", layer)),
        Commands::Blend { layer, mode } => commands::blend(config, &layer, &mode)
            .with_context(|| format!("changing blend mode of {}", layer)),
        Commands::Next { from } => commands::next(config, from.as_deref()).context("next"),
        Commands::Preview {
            frames,
            fps,
            width,
            height,
        } => commands::preview(config, frames, fps, Viewport::new(width, height))
            .context("preview"),
        Commands::Reset => commands::reset(config).context("reset"),
    }
}
