use serde::{Deserialize, Serialize};

use super::condition::Condition;
use super::state::StateId;

/// Which transitions may interrupt a transition in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterruptionSource {
    #[default]
    None,
    Source,
    Destination,
    SourceThenDestination,
    DestinationThenSource,
}

/// Every transition attribute besides its endpoints and guard. Copied
/// verbatim when a transition is split into several variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionSettings {
    pub name: String,
    pub duration: f32,
    pub offset: f32,
    pub has_exit_time: bool,
    pub exit_time: f32,
    pub has_fixed_duration: bool,
    pub interruption_source: InterruptionSource,
    pub ordered_interruption: bool,
    pub can_transition_to_self: bool,
    pub mute: bool,
    pub solo: bool,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            duration: 0.25,
            offset: 0.0,
            has_exit_time: false,
            exit_time: 0.75,
            has_fixed_duration: true,
            interruption_source: InterruptionSource::None,
            ordered_interruption: true,
            can_transition_to_self: true,
            mute: false,
            solo: false,
        }
    }
}

/// A guarded edge into `destination`. A missing `source` means the
/// transition leaves from "any state".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<StateId>,
    pub destination: StateId,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub settings: TransitionSettings,
}

impl Transition {
    pub fn new(source: StateId, destination: StateId, conditions: Vec<Condition>) -> Self {
        Self {
            source: Some(source),
            destination,
            conditions,
            settings: TransitionSettings::default(),
        }
    }

    pub fn from_any_state(destination: StateId, conditions: Vec<Condition>) -> Self {
        Self {
            source: None,
            destination,
            conditions,
            settings: TransitionSettings::default(),
        }
    }

    /// A copy of this transition guarded by `conditions` instead.
    pub fn with_conditions(&self, conditions: Vec<Condition>) -> Self {
        Self {
            source: self.source.clone(),
            destination: self.destination.clone(),
            conditions,
            settings: self.settings.clone(),
        }
    }

    /// Short human-readable label, e.g. `Idle -> Fist`.
    pub fn label(&self) -> String {
        match &self.source {
            Some(source) => format!("{source} -> {}", self.destination),
            None => format!("Any State -> {}", self.destination),
        }
    }
}
