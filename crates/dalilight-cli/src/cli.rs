use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::simulate::GearSpec;

/// Discover and drive DALI lamps.
///
/// Buses are simulated: every `[[drivers]]` entry in the configuration gets
/// one bus, populated with the gear given by `--gear`.
#[derive(Debug, Parser)]
#[command(name = "dalilight", version, about, arg_required_else_help = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "DALILIGHT_CONFIG", default_value = "dalilight.toml", global = true)]
    pub config: PathBuf,

    /// Simulated gear as BUS:ADDRESS=LEVEL, e.g. 0:3=120 (repeatable)
    #[arg(short, long = "gear", value_name = "BUS:ADDRESS=LEVEL", global = true)]
    pub gear: Vec<GearSpec>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the state of every registered entity as JSON
    Status,

    /// Turn an entity on
    On(OnArgs),

    /// Turn an entity off
    Off(TargetArgs),

    /// Validate the configuration and print it
    CheckConfig,
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Unique id of the lamp or bus entity
    pub entity: u32,
}

#[derive(Debug, Args)]
pub struct OnArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Brightness 0-255; 255 is sent as 254. Full level when omitted
    #[arg(short, long)]
    pub brightness: Option<u8>,
}
