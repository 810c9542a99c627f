//! One-step temporal-difference updates.
//!
//! Action-value rules differ only in the bootstrap target they read from the
//! next state; the step itself is shared:
//!
//! `Q(s,a) ← Q(s,a) + α[r + γ·target - Q(s,a)]`, with `target = 0` when the
//! transition is terminal.

mod expected_sarsa_step;
mod q_step;
mod sarsa_step;
mod state_value_step;

use enum_dispatch::enum_dispatch;
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::Result;
use crate::value_table::ActionValueTable;

pub use expected_sarsa_step::ExpectedSarsaStep;
pub use q_step::QStep;
pub use sarsa_step::SarsaStep;
pub use state_value_step::StateValueStep;

/// One observed step, as seen by an update rule.
#[derive(Debug, Clone)]
pub struct Transition<'a, S, A> {
    pub state: &'a S,
    pub action: &'a A,
    pub reward: f64,
    pub next_state: &'a S,
    /// The action already chosen for `next_state`, when the agent looked ahead.
    pub next_action: Option<&'a A>,
    /// Legal actions of `next_state`; empty when the transition is terminal.
    pub next_legal: &'a [A],
    pub terminal: bool,
    /// Exploration rate of the policy that will act in `next_state`.
    pub exploration_rate: f64,
}

#[enum_dispatch]
pub trait PolicyUpdate {
    /// Applies one TD step to `table` and returns the TD error.
    fn update<S, A>(
        &self,
        table: &mut ActionValueTable<S, A>,
        transition: &Transition<S, A>,
    ) -> Result<f64>
    where
        S: Hash + Eq + Clone + Debug,
        A: Hash + Eq + Clone + Debug;

    /// Whether the target needs the action chosen for the next state.
    fn on_policy(&self) -> bool;
}

#[enum_dispatch(PolicyUpdate)]
#[derive(Debug, Clone)]
pub enum UpdateRule {
    QStep,
    SarsaStep,
    ExpectedSarsaStep,
}

pub(crate) fn td_step<S, A>(
    table: &mut ActionValueTable<S, A>,
    transition: &Transition<S, A>,
    target: f64,
    learning_rate: f64,
    discount_factor: f64,
) -> f64
where
    S: Hash + Eq + Clone + Debug,
    A: Hash + Eq + Clone + Debug,
{
    let old_value: f64 = table.value(transition.state, transition.action);
    let temporal_difference: f64 = transition.reward + discount_factor * target - old_value;
    table.set(
        transition.state,
        transition.action,
        old_value + learning_rate * temporal_difference,
    );
    temporal_difference
}
