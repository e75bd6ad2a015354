use std::fmt;

use serde::{Deserialize, Serialize};

use super::transition::Transition;

/// Identifies a state within its state machine.
///
/// Ids may repeat across sibling machines; lookups start at the machine
/// owning the transition and then widen to its ancestors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(pub String);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StateId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Motion played by a state: a plain clip or a blend tree driven by parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Motion {
    Clip { name: String },
    BlendTree(BlendTree),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendTree {
    pub name: String,
    pub blend_parameter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blend_parameter_y: Option<String>,
    #[serde(default)]
    pub children: Vec<ChildMotion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildMotion {
    pub motion: Motion,
    #[serde(default)]
    pub threshold: f32,
}

impl Motion {
    pub fn clip(name: impl Into<String>) -> Self {
        Motion::Clip { name: name.into() }
    }

    /// Renames every blend parameter reference to `from`, nested trees
    /// included. Returns how many references changed.
    pub fn rename_parameter(&mut self, from: &str, to: &str) -> usize {
        let Motion::BlendTree(tree) = self else {
            return 0;
        };

        let mut renamed = 0;
        if tree.blend_parameter == from {
            tree.blend_parameter = to.to_string();
            renamed += 1;
        }
        if let Some(y) = tree.blend_parameter_y.as_mut()
            && *y == from
        {
            *y = to.to_string();
            renamed += 1;
        }
        for child in &mut tree.children {
            renamed += child.motion.rename_parameter(from, to);
        }
        renamed
    }

    /// Every parameter name this motion reads.
    pub fn parameters(&self) -> Vec<&str> {
        match self {
            Motion::Clip { .. } => Vec::new(),
            Motion::BlendTree(tree) => {
                let mut names = vec![tree.blend_parameter.as_str()];
                names.extend(tree.blend_parameter_y.as_deref());
                for child in &tree.children {
                    names.extend(child.motion.parameters());
                }
                names
            }
        }
    }
}

/// A node of a state machine with its ordered outgoing transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<Motion>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
    /// Parameter driving normalized playback time instead of the clock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_parameter: Option<String>,
    #[serde(default)]
    pub time_parameter_active: bool,
    #[serde(default = "default_speed")]
    pub speed: f32,
}

fn default_speed() -> f32 {
    1.0
}

impl State {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id: StateId(id),
            motion: None,
            transitions: Vec::new(),
            time_parameter: None,
            time_parameter_active: false,
            speed: default_speed(),
        }
    }

    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = Some(motion);
        self
    }

    pub fn with_transitions(mut self, transitions: Vec<Transition>) -> Self {
        self.transitions = transitions;
        self
    }
}
