use std::fmt::Debug;
use std::hash::Hash;

use super::{td_step, PolicyUpdate, Transition};
use crate::error::Result;
use crate::value_table::ActionValueTable;

/// Off-policy target: the value of a maximizing action in the next state.
#[derive(Debug, Clone)]
pub struct QStep {
    learning_rate: f64,
    discount_factor: f64,
}

impl QStep {
    pub fn new(learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            learning_rate,
            discount_factor,
        }
    }
}

impl PolicyUpdate for QStep {
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
            // every tied action shares the maximum, so any one will do
            let best: Vec<A> = table.best(transition.next_state, transition.next_legal)?;
            table.value(transition.next_state, &best[0])
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
