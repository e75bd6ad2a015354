//! Ports an animator graph onto a target controller's parameter schema.
//!
//! [`Migrator::migrate`] reconciles the two parameter sets, rewrites every
//! transition guard through the rule table, installs the merged parameter set
//! and optionally prepends the target's own layers. Reconciliation and rule
//! evaluation finish before the graph is touched, so a failure leaves it as
//! it was.

mod fold;
mod reconcile;
mod rules;
mod walker;

pub use fold::{Expansion, fold};
pub use reconcile::{Reconciliation, reconcile};
pub use rules::{
    DEFAULT_GESTURE_MAPPING, DEFAULT_MARGIN, DEFAULT_RENAME_PREFIX, GestureWeight, IndexMapping,
    Rebind, Rewrite, RuleKind, RuleTable,
};
pub use walker::{WalkStats, walk};

use log::{info, warn};
use serde::Serialize;

use crate::error::{MigrationError, Notice};
use crate::graph::{Graph, Parameter, ParameterConversion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOptions {
    /// Prepend the target controller's layers to the migrated graph.
    pub merge_target_layers: bool,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            merge_target_layers: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStatus {
    Migrated,
    /// The source already carries the target's layers and parameters.
    AlreadyMigrated,
}

/// Summary of one migration.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub graph: String,
    pub status: MigrationStatus,
    pub conversions: Vec<ParameterConversion>,
    pub parameters: Vec<Parameter>,
    #[serde(flatten)]
    pub transitions: WalkStats,
    pub layers_merged: usize,
    pub notices: Vec<Notice>,
    pub dangling_parameters: Vec<String>,
}

impl MigrationReport {
    fn already_migrated(graph: &Graph) -> Self {
        Self {
            graph: graph.name.clone(),
            status: MigrationStatus::AlreadyMigrated,
            conversions: Vec::new(),
            parameters: graph.parameters.clone(),
            transitions: WalkStats::default(),
            layers_merged: 0,
            notices: Vec::new(),
            dangling_parameters: Vec::new(),
        }
    }
}

/// Runs migrations with a fixed rule table and options.
#[derive(Debug, Clone, Default)]
pub struct Migrator {
    rules: RuleTable,
    options: MigrationOptions,
}

impl Migrator {
    pub fn new(rules: RuleTable, options: MigrationOptions) -> Self {
        Self { rules, options }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// True when every target layer name and every target `(name, type)`
    /// parameter is already present in `source`.
    pub fn is_migrated(source: &Graph, target: &Graph) -> bool {
        let layers_match = target.layers.iter().all(|l| source.has_layer(&l.name));
        let parameters_match = target
            .parameters
            .iter()
            .all(|p| source.parameters.contains(p));
        layers_match && parameters_match
    }

    /// Conversions and merged parameter set, without touching either graph.
    pub fn plan(&self, source: &Graph, target: &Graph) -> Result<Reconciliation, MigrationError> {
        reconcile(&source.parameters, &target.parameters, &self.rules)
    }

    /// Migrates `graph` in place onto `target`'s schema.
    ///
    /// `graph` should be a working copy; it is left untouched when this
    /// returns an error.
    pub fn migrate(
        &self,
        graph: &mut Graph,
        target: Option<&Graph>,
    ) -> Result<MigrationReport, MigrationError> {
        let target = target.ok_or_else(|| {
            MigrationError::UnresolvedController("no target controller supplied".into())
        })?;

        if Self::is_migrated(graph, target) {
            info!("`{}` is already set up for `{}`", graph.name, target.name);
            return Ok(MigrationReport::already_migrated(graph));
        }

        let reconciliation = self.plan(graph, target)?;
        let mut notices = Vec::new();

        if reconciliation.conversions.is_empty() {
            info!(
                "`{}` shares no differently typed parameters with `{}`",
                graph.name, target.name
            );
            notices.push(Notice::NoConvertibleParameters);
        }

        for conversion in reconciliation.renamed() {
            let renamed_to = conversion.rename.clone().unwrap_or_default();
            warn!(
                "no rule converts {} to {} for `{}`, keeping it as `{renamed_to}`",
                conversion.old_type, conversion.new_type, conversion.name
            );
            notices.push(Notice::UnhandledTypePair {
                parameter: conversion.name.clone(),
                old_type: conversion.old_type,
                new_type: conversion.new_type,
                renamed_to,
            });
        }

        let stats = walk(&self.rules, graph, &reconciliation.conversions)?;
        info!(
            "rewrote {} transitions of `{}`, {} split into {} more",
            stats.visited, graph.name, stats.expanded, stats.added
        );

        graph.parameters = reconciliation.parameters.clone();

        let layers_merged = if self.options.merge_target_layers {
            let mut layers = target.layers.clone();
            layers.append(&mut graph.layers);
            graph.layers = layers;
            target.layers.len()
        } else {
            0
        };

        let dangling_parameters = graph.dangling_parameters();
        for name in &dangling_parameters {
            warn!("`{}` references undeclared parameter `{name}`", graph.name);
        }

        Ok(MigrationReport {
            graph: graph.name.clone(),
            status: MigrationStatus::Migrated,
            conversions: reconciliation.conversions,
            parameters: reconciliation.parameters,
            transitions: stats,
            layers_merged,
            notices,
            dangling_parameters,
        })
    }
}
