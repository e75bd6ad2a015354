use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::parameter::Parameter;
use super::state::{State, StateId};
use super::transition::Transition;

/// A tree of states and nested state machines.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StateMachine {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub states: Vec<State>,
    #[serde(default)]
    pub state_machines: Vec<StateMachine>,
    #[serde(default)]
    pub any_state_transitions: Vec<Transition>,
}

impl StateMachine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Every transition list owned by this machine and its descendants.
    ///
    /// Machines are visited depth-first, parent before children. Within a
    /// machine the any-state list comes first, then each state's list in
    /// declaration order. [`Self::transition_lists_mut`] yields the same order.
    pub fn transition_lists(&self) -> Vec<&[Transition]> {
        let mut lists = Vec::new();
        self.collect_lists(&mut lists);
        lists
    }

    fn collect_lists<'a>(&'a self, out: &mut Vec<&'a [Transition]>) {
        out.push(&self.any_state_transitions);
        for state in &self.states {
            out.push(&state.transitions);
        }
        for machine in &self.state_machines {
            machine.collect_lists(out);
        }
    }

    pub fn transition_lists_mut(&mut self) -> Vec<&mut Vec<Transition>> {
        let mut lists = Vec::new();
        self.collect_lists_mut(&mut lists);
        lists
    }

    fn collect_lists_mut<'a>(&'a mut self, out: &mut Vec<&'a mut Vec<Transition>>) {
        out.push(&mut self.any_state_transitions);
        for state in &mut self.states {
            out.push(&mut state.transitions);
        }
        for machine in &mut self.state_machines {
            machine.collect_lists_mut(out);
        }
    }

    /// Every state in this machine and its descendants.
    pub fn all_states(&self) -> Vec<&State> {
        let mut states: Vec<&State> = self.states.iter().collect();
        for machine in &self.state_machines {
            states.extend(machine.all_states());
        }
        states
    }

    pub fn state_mut(&mut self, id: &StateId) -> Option<&mut State> {
        if let Some(index) = self.states.iter().position(|s| &s.id == id) {
            return self.states.get_mut(index);
        }
        self.state_machines
            .iter_mut()
            .find_map(|machine| machine.state_mut(id))
    }

    pub fn transition_count(&self) -> usize {
        self.transition_lists().iter().map(|list| list.len()).sum()
    }
}

/// One animation layer with its root state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub state_machine: StateMachine,
}

impl Layer {
    pub fn new(name: impl Into<String>, state_machine: StateMachine) -> Self {
        Self {
            name: name.into(),
            state_machine,
        }
    }
}

/// An animator controller: ordered layers plus the parameter set they read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl Graph {
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.is_named(name))
    }

    pub fn has_layer(&self, name: &str) -> bool {
        self.layers.iter().any(|l| l.name == name)
    }

    pub fn transition_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.state_machine.transition_count())
            .sum()
    }

    /// Every parameter name read by a condition, a time binding or a blend tree.
    pub fn referenced_parameters(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for layer in &self.layers {
            let machine = &layer.state_machine;
            for list in machine.transition_lists() {
                for transition in list {
                    names.extend(transition.conditions.iter().map(|c| c.parameter.clone()));
                }
            }
            for state in machine.all_states() {
                if state.time_parameter_active
                    && let Some(name) = &state.time_parameter
                {
                    names.insert(name.clone());
                }
                if let Some(motion) = &state.motion {
                    names.extend(motion.parameters().into_iter().map(str::to_string));
                }
            }
        }
        names
    }

    /// Referenced parameter names missing from the parameter set.
    pub fn dangling_parameters(&self) -> Vec<String> {
        self.referenced_parameters()
            .into_iter()
            .filter(|name| self.parameter(name).is_none())
            .collect()
    }
}
