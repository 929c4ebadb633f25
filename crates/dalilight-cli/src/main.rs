mod cli;
mod simulate;

use anyhow::{Context, bail};
use clap::Parser;
use dalilight_core::EntityId;
use dalilight_hardware::AnyTransport;
use dalilight_platform::{DaliConfig, EntityCollector, EntityState, LightEntity, setup_platform};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    run(cli).await
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = DaliConfig::load(&cli.global.config)
        .with_context(|| format!("loading {}", cli.global.config.display()))?;

    if let Command::CheckConfig = cli.command {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let (mut transports, _handles) = simulate::build_buses(&config, &cli.global.gear)?;
    let (updates, mut announced) = mpsc::unbounded_channel();
    let mut sink = EntityCollector::new().with_updates(updates);

    let registered = setup_platform(&config, &mut transports, &mut sink).await?;
    tracing::debug!(registered, command = ?cli.command, "dispatching command");

    let mut entities = sink.into_entities();
    match cli.command {
        Command::Status => {
            let states: Vec<EntityState> = entities.iter().map(LightEntity::state).collect();
            println!("{}", serde_json::to_string_pretty(&states)?);
        }
        Command::On(args) => {
            find(&mut entities, args.target.entity)?
                .turn_on(args.brightness)
                .await;
        }
        Command::Off(args) => {
            find(&mut entities, args.entity)?.turn_off().await;
        }
        Command::CheckConfig => {}
    }

    // entities hold the remaining senders
    drop(entities);
    while let Some(state) = announced.recv().await {
        println!("{}", serde_json::to_string(&state)?);
    }

    Ok(())
}

fn find(
    entities: &mut [LightEntity<AnyTransport>],
    id: u32,
) -> anyhow::Result<&mut LightEntity<AnyTransport>> {
    let Some(position) = entities.iter().position(|e| e.unique_id().as_u32() == id) else {
        let known: Vec<EntityId> = entities.iter().map(LightEntity::unique_id).collect();
        bail!("no entity with id {id}, registered ids: {known:?}");
    };
    Ok(&mut entities[position])
}
