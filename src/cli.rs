//! Command-line interface of the rigport host, built on clap.
//!
//! Defines [`Cli`] with the [`Command`] subcommands (migrate, plan, check)
//! and the global flags (--config, --verbose).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// rigport: ports avatar animator controllers onto another runtime's parameter schema.
#[derive(Debug, Parser)]
#[command(name = "rigport", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Settings file to use instead of `rigport.toml`.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enables debug logging.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Source and target controller files shared by every subcommand.
#[derive(Debug, Args)]
pub struct Controllers {
    /// Controller or override controller to migrate.
    pub source: PathBuf,

    /// Controller whose parameter schema (and layers) the source is ported onto.
    #[arg(long, short)]
    pub target: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Migrates the source controller and writes the converted copy.
    Migrate {
        #[command(flatten)]
        controllers: Controllers,

        /// Output path. Defaults to the source name passed through `output_name_format`.
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Shows the parameter conversions without writing anything.
    Plan {
        #[command(flatten)]
        controllers: Controllers,
    },

    /// Reports whether the source is already set up for the target.
    Check {
        #[command(flatten)]
        controllers: Controllers,
    },
}
