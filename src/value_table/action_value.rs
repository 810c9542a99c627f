use fxhash::{FxBuildHasher, FxHashMap};
use indexmap::IndexMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{RLError, Result};
use crate::utils::max_set;

type ActionValues<A> = IndexMap<A, f64, FxBuildHasher>;

/// Action-value table keyed by `(state, action)`.
///
/// Actions of a state keep their first-seen order, which is the order ties are
/// reported in by [`ActionValueTable::best`].
#[derive(Debug, Clone)]
pub struct ActionValueTable<S: Hash + Eq + Clone + Debug, A: Hash + Eq + Clone + Debug> {
    default_value: f64,
    values: FxHashMap<S, ActionValues<A>>,
}

impl<S: Hash + Eq + Clone + Debug, A: Hash + Eq + Clone + Debug> ActionValueTable<S, A> {
    pub fn new(default_value: f64) -> Self {
        Self {
            default_value,
            values: FxHashMap::default(),
        }
    }

    pub fn default_value(&self) -> f64 {
        self.default_value
    }

    /// Stored value of `(state, action)`, inserting the default when unseen.
    pub fn value(&mut self, state: &S, action: &A) -> f64 {
        if let Some(value) = self.get(state, action) {
            return value;
        }
        let default_value: f64 = self.default_value;
        *self
            .values
            .entry(state.clone())
            .or_default()
            .entry(action.clone())
            .or_insert(default_value)
    }

    /// Stored value of `(state, action)` without inserting anything.
    pub fn get(&self, state: &S, action: &A) -> Option<f64> {
        self.values
            .get(state)
            .and_then(|actions| actions.get(action))
            .copied()
    }

    pub fn set(&mut self, state: &S, action: &A, value: f64) {
        match self.values.get_mut(state) {
            Some(actions) => {
                match actions.get_mut(action) {
                    Some(stored) => *stored = value,
                    None => {
                        actions.insert(action.clone(), value);
                    }
                };
            }
            None => {
                let mut actions: ActionValues<A> = ActionValues::default();
                actions.insert(action.clone(), value);
                self.values.insert(state.clone(), actions);
            }
        }
    }

    /// All known actions of `state` tied for the maximum value.
    ///
    /// A state without recorded actions is first seeded with default entries
    /// for `legal`; it is an error if there is nothing to seed it with.
    pub fn best(&mut self, state: &S, legal: &[A]) -> Result<Vec<A>> {
        let unknown: bool = self.values.get(state).map_or(true, |a| a.is_empty());
        if unknown {
            if legal.is_empty() {
                return Err(RLError::no_legal_actions(state));
            }
            for action in legal {
                self.value(state, action);
            }
        }
        let actions: &ActionValues<A> = match self.values.get(state) {
            Some(actions) => actions,
            None => return Err(RLError::no_legal_actions(state)),
        };
        Ok(max_set(
            actions.iter().map(|(action, value)| (action.clone(), *value)),
        ))
    }

    /// Actions of `legal` tied for the maximum value, seeding unseen ones.
    pub fn best_among(&mut self, state: &S, legal: &[A]) -> Result<Vec<A>> {
        if legal.is_empty() {
            return Err(RLError::no_legal_actions(state));
        }
        let values: Vec<(A, f64)> = legal
            .iter()
            .map(|action| (action.clone(), self.value(state, action)))
            .collect();
        Ok(max_set(values))
    }

    pub fn known_actions<'a>(&'a self, state: &S) -> impl Iterator<Item = (&'a A, f64)> + 'a {
        self.values
            .get(state)
            .into_iter()
            .flat_map(|actions| actions.iter().map(|(action, value)| (action, *value)))
    }

    pub fn contains(&self, state: &S, action: &A) -> bool {
        self.get(state, action).is_some()
    }

    /// Every stored `((state, action), value)` pair, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = ((&S, &A), f64)> + '_ {
        self.values.iter().flat_map(|(state, actions)| {
            actions
                .iter()
                .map(move |(action, value)| ((state, action), *value))
        })
    }

    pub fn len(&self) -> usize {
        self.values.values().map(|actions| actions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
