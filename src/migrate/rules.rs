//! Per-type-pair rewrite rules for transition conditions.
//!
//! [`RuleKind::for_pair`] picks the rule for a parameter's old and new type;
//! [`RuleTable::apply`] runs it against one condition list and returns the
//! alternative lists that together replace it. Alternatives are mutually
//! exclusive guards, each one becomes its own transition.

use serde::{Deserialize, Serialize};

use crate::graph::{
    Condition, ConditionMode, ParameterConversion, ParameterType, map_named, thresholds,
};

pub const DEFAULT_MARGIN: f32 = 0.01;
pub const DEFAULT_RENAME_PREFIX: &str = "_";

/// Gesture indices of the source runtime, indexed by source value.
pub const DEFAULT_GESTURE_MAPPING: [i32; 8] = [
    0,  // Idle
    1,  // Fist
    -1, // Open hand
    4,  // Point
    5,  // Peace
    6,  // Rock 'n roll
    3,  // Finger gun
    2,  // Thumbs up
];

/// The rewrite policy for one `(old, new)` parameter type pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Identity,
    FloatToInt,
    IntToFloat,
    BoolToFloat,
    BoolToInt,
    TriggerToFloat,
    TriggerToInt,
    TriggerToBool,
    /// No rule applies: the old parameter is kept under a shadow name.
    Shadow,
}

impl RuleKind {
    pub fn for_pair(old: ParameterType, new: ParameterType) -> Self {
        use ParameterType::*;

        match (old, new) {
            (old, new) if old == new => RuleKind::Identity,
            (Float, Int) => RuleKind::FloatToInt,
            (Int, Float) => RuleKind::IntToFloat,
            (Bool, Float) => RuleKind::BoolToFloat,
            (Bool, Int) => RuleKind::BoolToInt,
            (Trigger, Float) => RuleKind::TriggerToFloat,
            (Trigger, Int) => RuleKind::TriggerToInt,
            (Trigger, Bool) => RuleKind::TriggerToBool,
            _ => RuleKind::Shadow,
        }
    }

    pub fn renames(self) -> bool {
        self == RuleKind::Shadow
    }
}

/// Maps integer thresholds of the source runtime onto the target's values.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMapping {
    table: Vec<i32>,
    fallback: i32,
}

impl IndexMapping {
    pub fn new(table: Vec<i32>, fallback: i32) -> Self {
        Self { table, fallback }
    }

    pub fn map(&self, index: i32) -> i32 {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.table.get(i))
            .copied()
            .unwrap_or(self.fallback)
    }
}

impl Default for IndexMapping {
    fn default() -> Self {
        Self::new(DEFAULT_GESTURE_MAPPING.to_vec(), 0)
    }
}

/// A gesture parameter and the weight parameter of the source runtime that
/// carried its analog trigger value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureWeight {
    pub gesture: String,
    pub weight: String,
}

impl GestureWeight {
    pub fn new(gesture: impl Into<String>, weight: impl Into<String>) -> Self {
        Self {
            gesture: gesture.into(),
            weight: weight.into(),
        }
    }

    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("GestureLeft", "GestureLeftWeight"),
            Self::new("GestureRight", "GestureRightWeight"),
        ]
    }
}

/// Destination-state edit requested by the gesture rule.
///
/// If the destination's time parameter is `weight`, it is rebound to
/// `parameter` when `drive_time` is set and unbound otherwise. Blend trees
/// reading `weight` read `parameter` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rebind {
    pub parameter: String,
    pub weight: String,
    pub drive_time: bool,
}

/// Result of applying one rule to one condition list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rewrite {
    pub variants: Vec<Vec<Condition>>,
    pub rebinds: Vec<Rebind>,
}

impl Rewrite {
    pub fn single(conditions: Vec<Condition>) -> Self {
        Self {
            variants: vec![conditions],
            rebinds: Vec::new(),
        }
    }
}

/// Immutable rule configuration; [`RuleTable::apply`] is a pure function of
/// it and its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    margin: f32,
    rename_prefix: String,
    index_mapping: Option<IndexMapping>,
    gesture_weights: Vec<GestureWeight>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_MARGIN,
            DEFAULT_RENAME_PREFIX,
            Some(IndexMapping::default()),
            GestureWeight::defaults(),
        )
    }
}

impl RuleTable {
    /// An empty `rename_prefix` falls back to `_` so shadow names always differ.
    pub fn new(
        margin: f32,
        rename_prefix: &str,
        index_mapping: Option<IndexMapping>,
        gesture_weights: Vec<GestureWeight>,
    ) -> Self {
        let rename_prefix = if rename_prefix.is_empty() {
            DEFAULT_RENAME_PREFIX
        } else {
            rename_prefix
        };
        Self {
            margin,
            rename_prefix: rename_prefix.to_string(),
            index_mapping,
            gesture_weights,
        }
    }

    /// Integer thresholds pass through unmapped.
    pub fn without_index_mapping(mut self) -> Self {
        self.index_mapping = None;
        self
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn rename_prefix(&self) -> &str {
        &self.rename_prefix
    }

    /// Rewrites the conditions on `conversion.name` for its type change.
    ///
    /// Conditions on other parameters are carried through unchanged. When the
    /// parameter is not referenced, or the type does not change, the input is
    /// returned as the only variant.
    pub fn apply(&self, conversion: &ParameterConversion, conditions: &[Condition]) -> Rewrite {
        let name = conversion.name.as_str();
        if conversion.is_identity() || !conditions.iter().any(|c| c.refers_to(name)) {
            return Rewrite::single(conditions.to_vec());
        }

        match RuleKind::for_pair(conversion.old_type, conversion.new_type) {
            RuleKind::Identity => Rewrite::single(conditions.to_vec()),
            RuleKind::FloatToInt => Rewrite::single(self.float_to_int(conditions, name)),
            RuleKind::IntToFloat => self.int_to_float(conditions, name),
            RuleKind::BoolToFloat => Rewrite::single(flag_to_number(conditions, name, self.margin)),
            RuleKind::BoolToInt | RuleKind::TriggerToFloat | RuleKind::TriggerToInt => {
                Rewrite::single(flag_to_number(conditions, name, 0.0))
            }
            RuleKind::TriggerToBool => Rewrite::single(map_named(conditions, name, |c| {
                Condition::if_true(&c.parameter)
            })),
            RuleKind::Shadow => {
                let shadow = conversion
                    .rename
                    .clone()
                    .unwrap_or_else(|| format!("{}{name}", self.rename_prefix));
                Rewrite::single(map_named(conditions, name, |c| Condition {
                    parameter: shadow.clone(),
                    ..c.clone()
                }))
            }
        }
    }

    /// Collapses the `>` and `<` checks on `name` into integer bounds.
    ///
    /// Each bound is the mean of its group's thresholds, rounded half away
    /// from zero. Coinciding bounds become a single equality check.
    fn float_to_int(&self, conditions: &[Condition], name: &str) -> Vec<Condition> {
        let lower = rounded_mean(&thresholds(conditions, name, ConditionMode::GreaterThan));
        let upper = rounded_mean(&thresholds(conditions, name, ConditionMode::LessThan));

        if lower.is_none() && upper.is_none() {
            return conditions.to_vec();
        }

        let mut rewritten: Vec<Condition> = conditions
            .iter()
            .filter(|c| {
                !(c.is(name, ConditionMode::GreaterThan) || c.is(name, ConditionMode::LessThan))
            })
            .cloned()
            .collect();

        match (lower, upper) {
            (Some(lower), Some(upper)) if lower == upper => {
                rewritten.push(Condition::equals(name, lower as f32));
            }
            _ => {
                if let Some(upper) = upper {
                    rewritten.push(Condition::less(name, upper as f32));
                }
                if let Some(lower) = lower {
                    rewritten.push(Condition::greater(name, lower as f32));
                }
            }
        }

        rewritten
    }

    /// Turns integer equality checks into float ranges `value ± margin`.
    ///
    /// Equality ranges stay together in one variant. The `!=` checks cannot
    /// be a single conjunction, so they yield two more variants: every below
    /// side, then every above side. Only equality thresholds are remapped.
    fn int_to_float(&self, conditions: &[Condition], name: &str) -> Rewrite {
        let margin = self.margin;
        let gesture = self.gesture_weights.iter().find(|g| g.gesture == name);
        let mut rebinds = Vec::new();

        let base: Vec<Condition> = conditions
            .iter()
            .filter(|c| {
                !(c.is(name, ConditionMode::Equals) || c.is(name, ConditionMode::NotEqual))
            })
            .map(|c| match c.mode {
                ConditionMode::LessThan if c.refers_to(name) => {
                    Condition::less(name, c.threshold - margin)
                }
                ConditionMode::GreaterThan if c.refers_to(name) => {
                    Condition::greater(name, c.threshold + margin)
                }
                _ => c.clone(),
            })
            .collect();

        let mut ranges = Vec::new();
        for c in conditions.iter().filter(|c| c.is(name, ConditionMode::Equals)) {
            let value = self.remap(c.threshold);
            // A fist carries its analog trigger value in the new runtime.
            let compensate = gesture.is_some() && value == 1;
            if let Some(gesture) = gesture {
                rebinds.push(Rebind {
                    parameter: name.to_string(),
                    weight: gesture.weight.clone(),
                    drive_time: compensate,
                });
            }

            let widen = if compensate { 1.0 } else { 0.0 };
            ranges.push(Condition::greater(name, value as f32 - margin - widen));
            ranges.push(Condition::less(name, value as f32 + margin));
        }

        let (below, above): (Vec<_>, Vec<_>) = conditions
            .iter()
            .filter(|c| c.is(name, ConditionMode::NotEqual))
            .map(|c| {
                (
                    Condition::less(name, c.threshold - margin),
                    Condition::greater(name, c.threshold + margin),
                )
            })
            .unzip();

        let extend = |extra: Vec<Condition>| {
            let mut variant = base.clone();
            variant.extend(extra);
            variant
        };

        let mut variants = Vec::new();
        if !ranges.is_empty() {
            variants.push(extend(ranges));
        }
        if !below.is_empty() {
            variants.push(extend(below));
            variants.push(extend(above));
        }
        if variants.is_empty() {
            variants.push(base);
        }

        Rewrite { variants, rebinds }
    }

    fn remap(&self, threshold: f32) -> i32 {
        let index = threshold as i32;
        match &self.index_mapping {
            Some(mapping) => mapping.map(index),
            None => index,
        }
    }
}

/// Every check on `name` becomes `> threshold`, whatever its mode.
fn flag_to_number(conditions: &[Condition], name: &str, threshold: f32) -> Vec<Condition> {
    map_named(conditions, name, |c| Condition::greater(&c.parameter, threshold))
}

fn rounded_mean(values: &[f32]) -> Option<i32> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().map(|&v| f64::from(v)).sum();
    Some((sum / values.len() as f64).round() as i32)
}
