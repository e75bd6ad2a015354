use std::fmt;

use serde::{Deserialize, Serialize};

/// Comparison applied by a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionMode {
    IfTrue,
    IfFalse,
    GreaterThan,
    LessThan,
    Equals,
    NotEqual,
}

impl fmt::Display for ConditionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionMode::IfTrue => write!(f, "if"),
            ConditionMode::IfFalse => write!(f, "if not"),
            ConditionMode::GreaterThan => write!(f, ">"),
            ConditionMode::LessThan => write!(f, "<"),
            ConditionMode::Equals => write!(f, "=="),
            ConditionMode::NotEqual => write!(f, "!="),
        }
    }
}

/// A single test on one parameter. A transition fires when all of its
/// conditions hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub parameter: String,
    pub mode: ConditionMode,
    #[serde(default)]
    pub threshold: f32,
}

impl Condition {
    pub fn new(parameter: impl Into<String>, mode: ConditionMode, threshold: f32) -> Self {
        Self {
            parameter: parameter.into(),
            mode,
            threshold,
        }
    }

    pub fn if_true(parameter: impl Into<String>) -> Self {
        Self::new(parameter, ConditionMode::IfTrue, 0.0)
    }

    pub fn if_false(parameter: impl Into<String>) -> Self {
        Self::new(parameter, ConditionMode::IfFalse, 0.0)
    }

    pub fn greater(parameter: impl Into<String>, threshold: f32) -> Self {
        Self::new(parameter, ConditionMode::GreaterThan, threshold)
    }

    pub fn less(parameter: impl Into<String>, threshold: f32) -> Self {
        Self::new(parameter, ConditionMode::LessThan, threshold)
    }

    pub fn equals(parameter: impl Into<String>, threshold: f32) -> Self {
        Self::new(parameter, ConditionMode::Equals, threshold)
    }

    pub fn not_equal(parameter: impl Into<String>, threshold: f32) -> Self {
        Self::new(parameter, ConditionMode::NotEqual, threshold)
    }

    pub fn refers_to(&self, name: &str) -> bool {
        self.parameter == name
    }

    pub fn is(&self, name: &str, mode: ConditionMode) -> bool {
        self.refers_to(name) && self.mode == mode
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            ConditionMode::IfTrue | ConditionMode::IfFalse => {
                write!(f, "{} {}", self.mode, self.parameter)
            }
            _ => write!(f, "{} {} {}", self.parameter, self.mode, self.threshold),
        }
    }
}

/// Rewrites every condition on `name` with `f`, leaving the others untouched.
pub fn map_named(
    conditions: &[Condition],
    name: &str,
    f: impl Fn(&Condition) -> Condition,
) -> Vec<Condition> {
    conditions
        .iter()
        .map(|c| if c.refers_to(name) { f(c) } else { c.clone() })
        .collect()
}

/// Thresholds of every condition on `name` using `mode`, in list order.
pub fn thresholds(conditions: &[Condition], name: &str, mode: ConditionMode) -> Vec<f32> {
    conditions
        .iter()
        .filter(|c| c.is(name, mode))
        .map(|c| c.threshold)
        .collect()
}
