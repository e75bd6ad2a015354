mod cli;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command, Controllers};
use rigport::controller::{OutputMode, converted_path};
use rigport::migrate::{MigrationStatus, Migrator};
use rigport::{ControllerAsset, RigportConfig};
use ui::MigrationProgress;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => RigportConfig::load_from(path)?,
        None => RigportConfig::load()?,
    };

    match cli.command {
        Command::Migrate { controllers, out } => {
            run_migrate(&config, &controllers, out, cli.verbose)
        }
        Command::Plan { controllers } => run_plan(&config, &controllers),
        Command::Check { controllers } => run_check(&controllers),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn load_pair(controllers: &Controllers) -> Result<(ControllerAsset, ControllerAsset)> {
    let source = ControllerAsset::load(&controllers.source)?;
    let target = ControllerAsset::load(&controllers.target)?;
    Ok((source, target))
}

fn run_migrate(
    config: &RigportConfig,
    controllers: &Controllers,
    out: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let progress = MigrationProgress::start(&controllers.source);

    let (source, target) = load_pair(controllers)?;
    let target = match target.resolve() {
        Ok(graph) => graph,
        Err(e) => {
            progress.fail(&e.to_string());
            return Err(e.into());
        }
    };

    // Work on a copy; the loaded source stays as it was.
    let mut graph = match source.resolve() {
        Ok(graph) => graph.clone(),
        Err(e) => {
            progress.fail(&e.to_string());
            return Err(e.into());
        }
    };

    progress.step(&format!("Migrating {}", graph.name));
    let report = match config.migrator().migrate(&mut graph, Some(target)) {
        Ok(report) => report,
        Err(e) => {
            progress.fail(&e.to_string());
            return Err(e.into());
        }
    };

    if report.status == MigrationStatus::AlreadyMigrated {
        progress.report(&report, None, verbose);
        return Ok(());
    }

    let output =
        out.unwrap_or_else(|| converted_path(&controllers.source, &config.output_name_format));
    progress.output(&output, OutputMode::for_path(&output));

    let asset = source.ported(
        graph,
        &output,
        &config.output_name_format,
        config.override_policy(),
    );
    asset.save(&output)?;

    progress.report(&report, Some(&output), verbose);
    Ok(())
}

fn run_plan(config: &RigportConfig, controllers: &Controllers) -> Result<()> {
    let progress = MigrationProgress::start(&controllers.source);
    let (source, target) = load_pair(controllers)?;
    let plan = config
        .migrator()
        .plan(source.resolve()?, target.resolve()?)?;
    progress.plan(&plan);
    Ok(())
}

fn run_check(controllers: &Controllers) -> Result<()> {
    let progress = MigrationProgress::start(&controllers.source);
    let (source, target) = load_pair(controllers)?;
    let migrated = Migrator::is_migrated(source.resolve()?, target.resolve()?);
    progress.check(migrated);
    Ok(())
}
