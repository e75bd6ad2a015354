//! Migration settings loaded from `rigport.toml`.
//!
//! Every field of [`RigportConfig`] has a default, so an absent or partial
//! file is fine. The `RIGPORT_CONFIG` environment variable names another file
//! and takes precedence over the working directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::controller::OverridePolicy;
use crate::migrate::{
    DEFAULT_GESTURE_MAPPING, DEFAULT_MARGIN, DEFAULT_RENAME_PREFIX, GestureWeight, IndexMapping,
    MigrationOptions, Migrator, RuleTable,
};

pub const CONFIG_FILE: &str = "rigport.toml";
pub const CONFIG_ENV: &str = "RIGPORT_CONFIG";

/// Top-level settings read from `rigport.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RigportConfig {
    /// Distance kept between an integer value and the float bounds replacing it.
    #[serde(default = "default_condition_margin")]
    pub condition_margin: f32,

    /// Prepended to a parameter kept under a shadow name.
    #[serde(default = "default_rename_prefix")]
    pub rename_prefix: String,

    /// Name of the migrated asset; `{}` stands for the source name.
    #[serde(default = "default_output_name_format")]
    pub output_name_format: String,

    /// Target value for each source gesture index.
    #[serde(default = "default_gesture_mapping")]
    pub gesture_mapping: Vec<i32>,

    /// Target value for indices outside `gesture_mapping`.
    #[serde(default)]
    pub unmapped_gesture: i32,

    /// When false, integer thresholds keep their value on conversion to float.
    #[serde(default = "default_true")]
    pub remap_int_thresholds: bool,

    /// Gesture parameters paired with the weight parameter they replace.
    #[serde(default = "GestureWeight::defaults")]
    pub gesture_weights: Vec<GestureWeight>,

    /// Prepend the target controller's layers to the migrated graph.
    #[serde(default = "default_true")]
    pub merge_target_layers: bool,

    /// Copy clip overrides from a source override controller.
    #[serde(default = "default_true")]
    pub preserve_overrides: bool,

    /// Keep the clip overrides of an output file being replaced.
    #[serde(default = "default_true")]
    pub preserve_overwritten_overrides: bool,
}

// Default margin: 0.01.
fn default_condition_margin() -> f32 {
    DEFAULT_MARGIN
}

// Default shadow prefix: "_".
fn default_rename_prefix() -> String {
    DEFAULT_RENAME_PREFIX.to_string()
}

// Default output name: source name with a `_CVR` suffix.
fn default_output_name_format() -> String {
    "{}_CVR".to_string()
}

// Default gesture table, see `DEFAULT_GESTURE_MAPPING`.
fn default_gesture_mapping() -> Vec<i32> {
    DEFAULT_GESTURE_MAPPING.to_vec()
}

fn default_true() -> bool {
    true
}

impl Default for RigportConfig {
    fn default() -> Self {
        Self {
            condition_margin: default_condition_margin(),
            rename_prefix: default_rename_prefix(),
            output_name_format: default_output_name_format(),
            gesture_mapping: default_gesture_mapping(),
            unmapped_gesture: 0,
            remap_int_thresholds: true,
            gesture_weights: GestureWeight::defaults(),
            merge_target_layers: true,
            preserve_overrides: true,
            preserve_overwritten_overrides: true,
        }
    }
}

impl RigportConfig {
    /// Loads from `$RIGPORT_CONFIG`, else `rigport.toml` in the current
    /// directory, else defaults.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV)
            && !path.is_empty()
        {
            return Self::load_from(Path::new(&path));
        }

        let path = PathBuf::from(CONFIG_FILE);
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = toml::from_str::<RigportConfig>(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn rule_table(&self) -> RuleTable {
        let mapping = self
            .remap_int_thresholds
            .then(|| IndexMapping::new(self.gesture_mapping.clone(), self.unmapped_gesture));
        RuleTable::new(
            self.condition_margin,
            &self.rename_prefix,
            mapping,
            self.gesture_weights.clone(),
        )
    }

    pub fn migrator(&self) -> Migrator {
        Migrator::new(
            self.rule_table(),
            MigrationOptions {
                merge_target_layers: self.merge_target_layers,
            },
        )
    }

    pub fn override_policy(&self) -> OverridePolicy {
        OverridePolicy {
            preserve: self.preserve_overrides,
            preserve_overwritten: self.preserve_overwritten_overrides,
        }
    }
}
