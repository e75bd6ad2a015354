//! Controller assets as handed over by the host: a plain controller or an
//! override controller wrapping one, plus output naming and clip override
//! carry-over for the migrated copy.

use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::MigrationError;
use crate::graph::Graph;

/// Replaces one clip of the base controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipOverride {
    pub original: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideController {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<Graph>,
    #[serde(default)]
    pub overrides: Vec<ClipOverride>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControllerAsset {
    Controller(Graph),
    Override(OverrideController),
}

impl ControllerAsset {
    pub fn load(path: &Path) -> Result<Self, MigrationError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), MigrationError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn name(&self) -> &str {
        match self {
            ControllerAsset::Controller(graph) => &graph.name,
            ControllerAsset::Override(o) => &o.name,
        }
    }

    /// The animator graph behind this asset.
    pub fn resolve(&self) -> Result<&Graph, MigrationError> {
        match self {
            ControllerAsset::Controller(graph) => Ok(graph),
            ControllerAsset::Override(OverrideController {
                controller: Some(graph),
                ..
            }) => Ok(graph),
            ControllerAsset::Override(o) => Err(MigrationError::UnresolvedController(format!(
                "override controller `{}` has no controller assigned",
                o.name
            ))),
        }
    }

    pub fn as_override(&self) -> Option<&OverrideController> {
        match self {
            ControllerAsset::Override(o) => Some(o),
            ControllerAsset::Controller(_) => None,
        }
    }

    /// Wraps the migrated `graph` the way this asset wrapped its source.
    ///
    /// A plain controller becomes the renamed graph. An override controller
    /// becomes a renamed override over it, with clip overrides chosen by
    /// `policy` from this asset and whatever override already sits at `output`.
    /// An unreadable file at `output` is logged and treated as absent.
    pub fn ported(
        &self,
        mut graph: Graph,
        output: &Path,
        format: &str,
        policy: OverridePolicy,
    ) -> ControllerAsset {
        graph.name = converted_name(&graph.name, format);

        let Some(source) = self.as_override() else {
            return ControllerAsset::Controller(graph);
        };

        let overwritten = match OutputMode::for_path(output) {
            OutputMode::Create => None,
            OutputMode::Overwrite => match ControllerAsset::load(output) {
                Ok(existing) => existing.as_override().cloned(),
                Err(e) => {
                    warn!(
                        "Ignoring overrides of unreadable {}: {e}",
                        output.display()
                    );
                    None
                }
            },
        };

        ControllerAsset::Override(OverrideController {
            name: converted_name(&source.name, format),
            controller: Some(graph),
            overrides: carry_overrides(source, overwritten.as_ref(), policy),
        })
    }
}

/// Whether writing the migrated asset creates a file or replaces one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Create,
    Overwrite,
}

impl OutputMode {
    pub fn for_path(path: &Path) -> Self {
        if path.exists() {
            OutputMode::Overwrite
        } else {
            OutputMode::Create
        }
    }
}

/// Which clip overrides the migrated override controller starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverridePolicy {
    /// Copy the overrides of the source override controller.
    pub preserve: bool,
    /// Keep the overrides of an override controller about to be overwritten.
    pub preserve_overwritten: bool,
}

/// Overrides of an existing output take precedence over the source's.
pub fn carry_overrides(
    source: &OverrideController,
    overwritten: Option<&OverrideController>,
    policy: OverridePolicy,
) -> Vec<ClipOverride> {
    match overwritten {
        Some(existing) if policy.preserve_overwritten => existing.overrides.clone(),
        _ if policy.preserve => source.overrides.clone(),
        _ => Vec::new(),
    }
}

/// `format` with `{}` replaced by `name`.
pub fn converted_name(name: &str, format: &str) -> String {
    format.replace("{}", name)
}

/// Sibling of `path` whose file stem is passed through `format`.
pub fn converted_path(path: &Path, format: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut file_name = converted_name(&stem, format);
    if let Some(extension) = path.extension() {
        file_name.push('.');
        file_name.push_str(&extension.to_string_lossy());
    }
    path.with_file_name(file_name)
}
