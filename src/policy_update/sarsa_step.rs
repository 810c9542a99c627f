use std::fmt::Debug;
use std::hash::Hash;

use super::{td_step, PolicyUpdate, Transition};
use crate::error::{RLError, Result};
use crate::value_table::ActionValueTable;

/// On-policy target: the value of the action actually chosen for the next state.
#[derive(Debug, Clone)]
pub struct SarsaStep {
    learning_rate: f64,
    discount_factor: f64,
}

impl SarsaStep {
    pub fn new(learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            learning_rate,
            discount_factor,
        }
    }
}

impl PolicyUpdate for SarsaStep {
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
            let next_action: &A = transition.next_action.ok_or(RLError::MissingNextAction)?;
            table.value(transition.next_state, next_action)
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
        true
    }
}
