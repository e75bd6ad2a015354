//! Terminal output of the rigport host: a spinner while working and a
//! colored summary of the migration.

use std::path::Path;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use rigport::controller::OutputMode;
use rigport::migrate::{MigrationReport, MigrationStatus, Reconciliation};

pub struct MigrationProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
    dim: Style,
}

impl MigrationProgress {
    pub fn start(source: &Path) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Loading {}", source.display()));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            dim: Style::new().dim(),
        }
    }

    pub fn step(&self, message: &str) {
        self.pb.set_message(message.to_string());
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }

    pub fn fail(&self, message: &str) {
        self.pb.finish_and_clear();
        println!("  {} {message}", self.red.apply_to("✗"));
    }

    /// Prints the outcome and, when verbose, the full report as JSON.
    pub fn report(&self, report: &MigrationReport, output: Option<&Path>, verbose: bool) {
        self.finish();
        match report.status {
            MigrationStatus::AlreadyMigrated => {
                println!(
                    "  {} `{}` is already set up for the target",
                    self.yellow.apply_to("•"),
                    report.graph
                );
                return;
            }
            MigrationStatus::Migrated => {
                println!(
                    "  {} Migrated `{}`: {} transitions, {} split, {} added",
                    self.green.apply_to("✓"),
                    report.graph,
                    report.transitions.visited,
                    report.transitions.expanded,
                    report.transitions.added
                );
            }
        }

        for conversion in &report.conversions {
            println!("    {}", self.dim.apply_to(conversion));
        }
        for notice in &report.notices {
            println!("  {} {notice}", self.yellow.apply_to("!"));
        }
        if !report.dangling_parameters.is_empty() {
            println!(
                "  {} Undeclared parameters: {}",
                self.yellow.apply_to("!"),
                report.dangling_parameters.join(", ")
            );
        }
        if let Some(output) = output {
            println!("  {} {}", self.dim.apply_to("→"), output.display());
        }

        if verbose {
            println!();
            println!("{}", self.green.apply_to("─── Migration Report ───"));
            println!("{}", serde_json::to_string_pretty(report).unwrap_or_default());
        }
    }

    pub fn plan(&self, plan: &Reconciliation) {
        self.finish();
        if plan.conversions.is_empty() {
            println!("  {} No parameters change type", self.yellow.apply_to("•"));
        }
        for conversion in &plan.conversions {
            println!("  {} {conversion}", self.green.apply_to("~"));
        }
        println!();
        println!("{}", self.green.apply_to("─── Parameters ───"));
        for parameter in &plan.parameters {
            println!("  {} {}", parameter.name, self.dim.apply_to(parameter.kind));
        }
    }

    pub fn check(&self, migrated: bool) {
        self.finish();
        if migrated {
            println!("  {} Already set up for the target", self.green.apply_to("✓"));
        } else {
            println!("  {} Needs migration", self.yellow.apply_to("•"));
        }
    }

    /// Lists the file to be written and whether it replaces an existing one.
    pub fn output(&self, path: &Path, mode: OutputMode) {
        let line = match mode {
            OutputMode::Overwrite => {
                format!("  {} Overwriting {}", self.yellow.apply_to("!"), path.display())
            }
            OutputMode::Create => {
                format!("  {} Creating {}", self.dim.apply_to("+"), path.display())
            }
        };
        self.pb.println(line);
    }
}
