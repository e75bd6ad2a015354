//! Applies the condition fold to every transition of a graph.
//!
//! The walk runs in two passes. The first computes an [`Expansion`] for every
//! transition without touching the graph, so a failing rule leaves it intact.
//! The second splices the variants into each owning list in place of their
//! original, keeping list order, then applies destination-state rebinds
//! within the owning machine.

use log::debug;
use serde::Serialize;

use crate::error::MigrationError;
use crate::graph::{Graph, ParameterConversion, State, StateId, StateMachine, Transition};

use super::fold::{Expansion, fold};
use super::rules::{Rebind, RuleTable};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WalkStats {
    /// Transitions present before the walk.
    pub visited: usize,
    /// Transitions that were split into several variants.
    pub expanded: usize,
    /// Transitions inserted after their original.
    pub added: usize,
    /// Destination states whose bindings changed.
    pub rebound_states: usize,
}

/// Rewrites every transition of `graph` for `conversions`.
pub fn walk(
    rules: &RuleTable,
    graph: &mut Graph,
    conversions: &[ParameterConversion],
) -> Result<WalkStats, MigrationError> {
    let plan = plan(rules, graph, conversions)?;
    Ok(splice(graph, plan))
}

// One entry per transition list, in `StateMachine::transition_lists` order.
fn plan(
    rules: &RuleTable,
    graph: &Graph,
    conversions: &[ParameterConversion],
) -> Result<Vec<Vec<Expansion>>, MigrationError> {
    let mut plan = Vec::new();
    for layer in &graph.layers {
        for list in layer.state_machine.transition_lists() {
            let expansions = list
                .iter()
                .map(|t| fold(rules, &t.conditions, conversions))
                .collect::<Result<Vec<_>, _>>()?;
            plan.push(expansions);
        }
    }
    Ok(plan)
}

fn splice(graph: &mut Graph, plan: Vec<Vec<Expansion>>) -> WalkStats {
    let mut stats = WalkStats::default();
    let mut planned = plan.into_iter();

    for layer in &mut graph.layers {
        let unresolved = splice_machine(&mut layer.state_machine, &mut planned, &mut stats);
        for (id, _) in unresolved {
            debug!("[{}] rebind target `{id}` not found", layer.name);
        }
    }

    stats
}

/// Splices one machine's lists, then its children's, in plan order.
///
/// Rebinds resolve against the machine owning the transition first, then
/// each enclosing machine. Those no machine on the path can resolve are
/// returned to the caller.
fn splice_machine(
    machine: &mut StateMachine,
    planned: &mut impl Iterator<Item = Vec<Expansion>>,
    stats: &mut WalkStats,
) -> Vec<(StateId, Rebind)> {
    let mut rebinds: Vec<(StateId, Rebind)> = Vec::new();

    let lists = std::iter::once(&mut machine.any_state_transitions)
        .chain(machine.states.iter_mut().map(|s| &mut s.transitions));
    for (list, expansions) in lists.zip(planned.by_ref()) {
        splice_list(&machine.name, list, expansions, stats, &mut rebinds);
    }

    for child in &mut machine.state_machines {
        rebinds.extend(splice_machine(child, planned, stats));
    }

    rebinds
        .into_iter()
        .filter(|(id, rebind)| match machine.state_mut(id) {
            Some(state) => {
                if apply_rebind(state, rebind) {
                    stats.rebound_states += 1;
                }
                false
            }
            None => true,
        })
        .collect()
}

fn splice_list(
    machine: &str,
    list: &mut Vec<Transition>,
    expansions: Vec<Expansion>,
    stats: &mut WalkStats,
    rebinds: &mut Vec<(StateId, Rebind)>,
) {
    let originals = std::mem::take(list);
    list.reserve(expansions.iter().map(Expansion::variant_count).sum());

    for (mut transition, expansion) in originals.into_iter().zip(expansions) {
        stats.visited += 1;
        let Expansion {
            first,
            rest,
            rebinds: requested,
        } = expansion;

        rebinds.extend(
            requested
                .into_iter()
                .map(|r| (transition.destination.clone(), r)),
        );

        if !rest.is_empty() {
            debug!(
                "[{machine}] {} split into {} transitions",
                transition.label(),
                rest.len() + 1
            );
            stats.expanded += 1;
            stats.added += rest.len();
        }

        let siblings: Vec<Transition> = rest
            .into_iter()
            .map(|conditions| transition.with_conditions(conditions))
            .collect();
        transition.conditions = first;
        list.push(transition);
        list.extend(siblings);
    }
}

/// Returns whether the state changed.
fn apply_rebind(state: &mut State, rebind: &Rebind) -> bool {
    let mut changed = false;

    if state.time_parameter.as_deref() == Some(rebind.weight.as_str()) {
        if rebind.drive_time {
            state.time_parameter = Some(rebind.parameter.clone());
            state.time_parameter_active = true;
        } else {
            state.time_parameter = None;
            state.time_parameter_active = false;
        }
        changed = true;
    }

    if let Some(motion) = state.motion.as_mut() {
        changed |= motion.rename_parameter(&rebind.weight, &rebind.parameter) > 0;
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BlendTree, Condition, Layer, Motion, Parameter, ParameterType};

    fn conversion(name: &str, old: ParameterType, new: ParameterType) -> ParameterConversion {
        ParameterConversion::new(&Parameter::new(name, old), new)
    }

    fn marker(name: &str) -> Transition {
        Transition::new("Idle".into(), "Idle".into(), vec![Condition::if_true(name)])
    }

    fn graph_with(machine: StateMachine) -> Graph {
        Graph {
            name: "Test".into(),
            parameters: vec![],
            layers: vec![Layer::new("Base", machine)],
        }
    }

    fn first_params(list: &[Transition]) -> Vec<String> {
        list.iter()
            .map(|t| t.conditions.first().map(|c| c.parameter.clone()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn single_variant_rewrites_in_place() {
        let mut machine = StateMachine::new("Root");
        machine.states.push(State::new("Idle").with_transitions(vec![Transition::new(
            "Idle".into(),
            "Sit".into(),
            vec![Condition::if_true("Seated")],
        )]));
        let mut graph = graph_with(machine);

        let stats = walk(
            &RuleTable::default(),
            &mut graph,
            &[conversion("Seated", ParameterType::Bool, ParameterType::Int)],
        )
        .unwrap();

        let list = &graph.layers[0].state_machine.states[0].transitions;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].conditions, vec![Condition::greater("Seated", 0.0)]);
        assert_eq!(stats.visited, 1);
        assert_eq!(stats.expanded, 0);
    }

    #[test]
    fn expansion_keeps_position_and_order() {
        let mut split = Transition::new(
            "Idle".into(),
            "Walk".into(),
            vec![Condition::not_equal("Mode", 2.0)],
        );
        split.settings.duration = 0.42;
        split.settings.has_exit_time = true;

        let mut machine = StateMachine::new("Root");
        machine.states.push(State::new("Idle").with_transitions(vec![
            marker("Before"),
            split,
            marker("After"),
        ]));
        let mut graph = graph_with(machine);

        let stats = walk(
            &RuleTable::default().without_index_mapping(),
            &mut graph,
            &[conversion("Mode", ParameterType::Int, ParameterType::Float)],
        )
        .unwrap();

        let list = &graph.layers[0].state_machine.states[0].transitions;
        assert_eq!(first_params(list), vec!["Before", "Mode", "Mode", "After"]);
        assert_eq!(list[1].conditions[0].mode, crate::graph::ConditionMode::LessThan);
        assert_eq!(list[2].conditions[0].mode, crate::graph::ConditionMode::GreaterThan);
        for t in &list[1..3] {
            assert_eq!(t.destination, StateId::from("Walk"));
            assert_eq!(t.source, Some(StateId::from("Idle")));
            assert_eq!(t.settings.duration, 0.42);
            assert!(t.settings.has_exit_time);
        }
        assert_eq!(stats.visited, 3);
        assert_eq!(stats.expanded, 1);
        assert_eq!(stats.added, 1);
    }

    #[test]
    fn walks_any_state_and_nested_machines() {
        let mut inner = StateMachine::new("Inner");
        inner.any_state_transitions.push(Transition::from_any_state(
            "Deep".into(),
            vec![Condition::not_equal("Mode", 0.0)],
        ));
        inner.states.push(State::new("Deep").with_transitions(vec![Transition::new(
            "Deep".into(),
            "Top".into(),
            vec![Condition::not_equal("Mode", 1.0)],
        )]));

        let mut root = StateMachine::new("Root");
        root.states.push(State::new("Top"));
        root.state_machines.push(inner);
        let mut graph = graph_with(root);

        let stats = walk(
            &RuleTable::default().without_index_mapping(),
            &mut graph,
            &[conversion("Mode", ParameterType::Int, ParameterType::Float)],
        )
        .unwrap();

        let inner = &graph.layers[0].state_machine.state_machines[0];
        assert_eq!(inner.any_state_transitions.len(), 2);
        assert!(inner.any_state_transitions.iter().all(|t| t.source.is_none()));
        assert_eq!(inner.states[0].transitions.len(), 2);
        assert_eq!(stats.added, 2);
        assert_eq!(graph.transition_count(), 4);
    }

    #[test]
    fn fist_transition_rebinds_destination_time_and_blend_tree() {
        let mut fist = State::new("Fist").with_motion(Motion::BlendTree(BlendTree {
            name: "Fist blend".into(),
            blend_parameter: "GestureLeftWeight".into(),
            blend_parameter_y: None,
            children: vec![],
        }));
        fist.time_parameter = Some("GestureLeftWeight".into());
        fist.time_parameter_active = true;

        let mut machine = StateMachine::new("Root");
        machine.states.push(State::new("Idle").with_transitions(vec![Transition::new(
            "Idle".into(),
            "Fist".into(),
            vec![Condition::equals("GestureLeft", 1.0)],
        )]));
        machine.states.push(fist);
        let mut graph = graph_with(machine);

        let stats = walk(
            &RuleTable::default(),
            &mut graph,
            &[conversion("GestureLeft", ParameterType::Int, ParameterType::Float)],
        )
        .unwrap();

        let fist = &graph.layers[0].state_machine.states[1];
        assert_eq!(fist.time_parameter.as_deref(), Some("GestureLeft"));
        assert!(fist.time_parameter_active);
        assert_eq!(
            fist.motion.as_ref().unwrap().parameters(),
            vec!["GestureLeft"]
        );
        assert_eq!(stats.rebound_states, 1);
    }

    #[test]
    fn non_fist_transition_unbinds_weight_time_parameter() {
        let mut point = State::new("Point");
        point.time_parameter = Some("GestureRightWeight".into());
        point.time_parameter_active = true;

        let mut machine = StateMachine::new("Root");
        machine.any_state_transitions.push(Transition::from_any_state(
            "Point".into(),
            vec![Condition::equals("GestureRight", 3.0)],
        ));
        machine.states.push(point);
        let mut graph = graph_with(machine);

        walk(
            &RuleTable::default(),
            &mut graph,
            &[conversion("GestureRight", ParameterType::Int, ParameterType::Float)],
        )
        .unwrap();

        let point = &graph.layers[0].state_machine.states[0];
        assert!(point.time_parameter.is_none());
        assert!(!point.time_parameter_active);
    }

    #[test]
    fn unrelated_time_parameter_is_left_alone() {
        let mut state = State::new("Fist");
        state.time_parameter = Some("Progress".into());
        state.time_parameter_active = true;
        let rebind = Rebind {
            parameter: "GestureLeft".into(),
            weight: "GestureLeftWeight".into(),
            drive_time: false,
        };
        assert!(!apply_rebind(&mut state, &rebind));
        assert_eq!(state.time_parameter.as_deref(), Some("Progress"));
    }

    #[test]
    fn rebind_prefers_state_in_owning_machine() {
        let weighted = |machine: &str| {
            let mut state = State::new("Fist");
            state.time_parameter = Some("GestureLeftWeight".into());
            state.time_parameter_active = true;
            let mut m = StateMachine::new(machine);
            m.states.push(state);
            m
        };

        let left = weighted("Left");
        let mut right = weighted("Right");
        right.states.push(State::new("Idle").with_transitions(vec![Transition::new(
            "Idle".into(),
            "Fist".into(),
            vec![Condition::equals("GestureLeft", 1.0)],
        )]));

        let mut root = StateMachine::new("Root");
        root.state_machines.push(left);
        root.state_machines.push(right);
        let mut graph = graph_with(root);

        let stats = walk(
            &RuleTable::default(),
            &mut graph,
            &[conversion("GestureLeft", ParameterType::Int, ParameterType::Float)],
        )
        .unwrap();

        let root = &graph.layers[0].state_machine;
        let left = &root.state_machines[0].states[0];
        let right = &root.state_machines[1].states[0];
        assert_eq!(left.time_parameter.as_deref(), Some("GestureLeftWeight"));
        assert_eq!(right.time_parameter.as_deref(), Some("GestureLeft"));
        assert_eq!(stats.rebound_states, 1);
    }

    #[test]
    fn rebind_falls_back_to_enclosing_machine() {
        let mut fist = State::new("Fist");
        fist.time_parameter = Some("GestureRightWeight".into());
        fist.time_parameter_active = true;

        let mut inner = StateMachine::new("Inner");
        inner.any_state_transitions.push(Transition::from_any_state(
            "Fist".into(),
            vec![Condition::equals("GestureRight", 1.0)],
        ));

        let mut root = StateMachine::new("Root");
        root.states.push(fist);
        root.state_machines.push(inner);
        let mut graph = graph_with(root);

        walk(
            &RuleTable::default(),
            &mut graph,
            &[conversion("GestureRight", ParameterType::Int, ParameterType::Float)],
        )
        .unwrap();

        let fist = &graph.layers[0].state_machine.states[0];
        assert_eq!(fist.time_parameter.as_deref(), Some("GestureRight"));
    }
}
