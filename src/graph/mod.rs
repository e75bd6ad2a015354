mod condition;
mod machine;
mod parameter;
mod state;
mod transition;

pub use condition::{Condition, ConditionMode, map_named, thresholds};
pub use machine::{Graph, Layer, StateMachine};
pub use parameter::{Parameter, ParameterConversion, ParameterType};
pub use state::{BlendTree, ChildMotion, Motion, State, StateId};
pub use transition::{InterruptionSource, Transition, TransitionSettings};
