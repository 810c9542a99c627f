use std::fmt::Debug;
use std::hash::Hash;

use super::{td_step, PolicyUpdate, Transition};
use crate::error::{RLError, Result};
use crate::value_table::ActionValueTable;

/// Expected target under the epsilon-greedy policy acting in the next state.
///
/// Greedy mass `1 - ε` goes to a best action; the exploration mass `ε` is
/// spread evenly over the legal actions.
#[derive(Debug, Clone)]
pub struct ExpectedSarsaStep {
    learning_rate: f64,
    discount_factor: f64,
}

impl ExpectedSarsaStep {
    pub fn new(learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            learning_rate,
            discount_factor,
        }
    }

    fn expected_value<S, A>(table: &mut ActionValueTable<S, A>, transition: &Transition<S, A>) -> Result<f64>
    where
        S: Hash + Eq + Clone + Debug,
        A: Hash + Eq + Clone + Debug,
    {
        let state: &S = transition.next_state;
        let legal: &[A] = transition.next_legal;
        if legal.is_empty() {
            return Err(RLError::no_legal_actions(state));
        }
        let epsilon: f64 = transition.exploration_rate;
        let best: Vec<A> = table.best(state, legal)?;
        let mut expectation: f64 = (1.0 - epsilon) * table.value(state, &best[0]);
        if epsilon > 0.0 {
            let total: f64 = legal.iter().map(|action| table.value(state, action)).sum();
            expectation += epsilon * total / legal.len() as f64;
        }
        Ok(expectation)
    }
}

impl PolicyUpdate for ExpectedSarsaStep {
    fn update<S, A>(
        &self,
        table: &mut ActionValueTable<S, A>,
        transition: &Transition<S, A>,
    ) -> Result<f64>
    where
        S: Hash + Eq + Clone + Debug,
        A: Hash + Eq + Clone + Debug,
    {
        let future_q_value: f64 = if transition.terminal {
            0.0
        } else {
            Self::expected_value(table, transition)?
        };
        Ok(td_step(
            table,
            transition,
            future_q_value,
            self.learning_rate,
            self.discount_factor,
        ))
    }

    fn on_policy(&self) -> bool {
        false
    }
}
