use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt::Debug;
use std::hash::Hash;

use super::TieBreak;
use crate::error::{RLError, Result};
use crate::utils::max_set;
use crate::value_table::ActionValueTable;

/// A selected action and whether it came from the exploration branch.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice<A> {
    pub action: A,
    pub exploratory: bool,
}

/// Uniformly random legal action with probability `epsilon`, otherwise one of
/// the maximum-value actions resolved by the configured [`TieBreak`].
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    exploration_decider: Uniform<f64>,
    rng: StdRng,
    initial_epsilon: f64,
    epsilon: f64,
    epsilon_decay: f64,
    final_epsilon: f64,
    tie_break: TieBreak,
}

impl EpsilonGreedy {
    pub fn new(epsilon: f64, tie_break: TieBreak) -> Self {
        Self {
            exploration_decider: Uniform::from(0.0..1.0),
            rng: StdRng::from_entropy(),
            initial_epsilon: epsilon,
            epsilon,
            epsilon_decay: 0.0,
            final_epsilon: epsilon,
            tie_break,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Linear decay applied at every episode end, never going below `final_epsilon`.
    pub fn with_decay(mut self, epsilon_decay: f64, final_epsilon: f64) -> Self {
        self.epsilon_decay = epsilon_decay;
        self.final_epsilon = final_epsilon;
        self
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    fn should_explore(&mut self) -> bool {
        self.epsilon != 0.0 && self.exploration_decider.sample(&mut self.rng) < self.epsilon
    }

    fn explore<A: Clone>(&mut self, legal: &[A]) -> Option<Choice<A>> {
        legal.choose(&mut self.rng).map(|action| Choice {
            action: action.clone(),
            exploratory: true,
        })
    }

    fn exploit<A>(&mut self, ties: Vec<A>) -> Option<Choice<A>> {
        self.tie_break
            .pick(ties, &mut self.rng)
            .map(|action| Choice {
                action,
                exploratory: false,
            })
    }

    /// Epsilon-greedy choice over an action-value table.
    ///
    /// The greedy branch takes the table's best known actions of `state`
    /// restricted to `legal`; when none of them is legal, it falls back to the
    /// best of the legal actions themselves.
    pub fn choose<S, A>(
        &mut self,
        state: &S,
        table: &mut ActionValueTable<S, A>,
        legal: &[A],
    ) -> Result<Choice<A>>
    where
        S: Hash + Eq + Clone + Debug,
        A: Hash + Eq + Clone + Debug,
    {
        if legal.is_empty() {
            return Err(RLError::no_legal_actions(state));
        }
        if self.should_explore() {
            return self
                .explore(legal)
                .ok_or_else(|| RLError::no_legal_actions(state));
        }
        let mut best: Vec<A> = table.best(state, legal)?;
        best.retain(|action| legal.contains(action));
        if best.is_empty() {
            best = table.best_among(state, legal)?;
        }
        self.exploit(best)
            .ok_or_else(|| RLError::no_legal_actions(state))
    }

    /// Epsilon-greedy choice where the greedy branch scores each legal action
    /// with `value_of`.
    pub fn choose_by<S, A, F>(&mut self, state: &S, legal: &[A], mut value_of: F) -> Result<Choice<A>>
    where
        S: Debug,
        A: Clone,
        F: FnMut(&A) -> f64,
    {
        if legal.is_empty() {
            return Err(RLError::no_legal_actions(state));
        }
        if self.should_explore() {
            return self
                .explore(legal)
                .ok_or_else(|| RLError::no_legal_actions(state));
        }
        let scored: Vec<(A, f64)> = legal
            .iter()
            .map(|action| (action.clone(), value_of(action)))
            .collect();
        self.exploit(max_set(scored))
            .ok_or_else(|| RLError::no_legal_actions(state))
    }

    /// Called once per finished episode.
    pub fn update(&mut self) {
        if self.epsilon > self.final_epsilon {
            self.epsilon = (self.epsilon - self.epsilon_decay).max(self.final_epsilon);
        }
    }

    pub fn reset(&mut self) {
        self.epsilon = self.initial_epsilon;
    }
}
