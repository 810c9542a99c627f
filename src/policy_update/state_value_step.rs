use std::hash::Hash;

use crate::value_table::{InitialValue, StateValueTable};

/// State-value TD step: `V(s) ← V(s) + α[V(s') - V(s)]`.
#[derive(Debug, Clone)]
pub struct StateValueStep {
    learning_rate: f64,
}

impl StateValueStep {
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Moves the value of `state` toward the value of `next_state` and returns the error.
    pub fn update<S, D>(&self, table: &mut StateValueTable<S, D>, state: &S, next_state: &S) -> f64
    where
        S: Hash + Eq + Clone,
        D: InitialValue<S>,
    {
        let prev_value: f64 = table.value(state);
        let prime_value: f64 = table.value(next_state);
        let error: f64 = prime_value - prev_value;
        table.set(state, prev_value + self.learning_rate * error);
        error
    }
}
