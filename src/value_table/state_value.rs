use fxhash::FxHashMap;
use std::hash::Hash;

use crate::env::GameTask;

/// Computes the value a state-value entry starts with.
///
/// Evaluated exactly once per key, on first access; the result is cached in
/// the table.
pub trait InitialValue<K> {
    fn initial_value(&self, key: &K) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant(pub f64);

impl<K> InitialValue<K> for Constant {
    fn initial_value(&self, _key: &K) -> f64 {
        self.0
    }
}

impl<K, F: Fn(&K) -> f64> InitialValue<K> for F {
    fn initial_value(&self, key: &K) -> f64 {
        self(key)
    }
}

/// Initial value of a board from `player`'s point of view.
///
/// Wins and draws start at 1.0, losses at 0.0 and anything still in play at
/// `initial_value`.
pub fn outcome_value<S, T: GameTask<S>>(
    task: &T,
    player: &T::Player,
    initial_value: f64,
    state: &S,
) -> f64 {
    match task.winner(state) {
        Some(winner) if &winner == player => 1.0,
        Some(_) => 0.0,
        None if task.is_draw(state) => 1.0,
        None => initial_value,
    }
}

#[derive(Debug, Clone)]
pub struct OutcomeValue<T, P> {
    task: T,
    player: P,
    initial_value: f64,
}

impl<T, P> OutcomeValue<T, P> {
    pub fn new(task: T, player: P, initial_value: f64) -> Self {
        Self {
            task,
            player,
            initial_value,
        }
    }

    pub fn player(&self) -> &P {
        &self.player
    }
}

impl<S, P, T: GameTask<S, Player = P>> InitialValue<S> for OutcomeValue<T, P> {
    fn initial_value(&self, key: &S) -> f64 {
        outcome_value(&self.task, &self.player, self.initial_value, key)
    }
}

/// State-value table keyed by state alone.
#[derive(Debug, Clone)]
pub struct StateValueTable<S: Hash + Eq + Clone, D: InitialValue<S> = Constant> {
    initial: D,
    values: FxHashMap<S, f64>,
}

impl<S: Hash + Eq + Clone, D: InitialValue<S>> StateValueTable<S, D> {
    pub fn new(initial: D) -> Self {
        Self {
            initial,
            values: FxHashMap::default(),
        }
    }

    pub fn initial(&self) -> &D {
        &self.initial
    }

    /// Stored value of `state`, computing and caching its initial value when unseen.
    pub fn value(&mut self, state: &S) -> f64 {
        if let Some(value) = self.values.get(state) {
            return *value;
        }
        let value: f64 = self.initial.initial_value(state);
        self.values.insert(state.clone(), value);
        value
    }

    pub fn get(&self, state: &S) -> Option<f64> {
        self.values.get(state).copied()
    }

    pub fn set(&mut self, state: &S, value: f64) {
        match self.values.get_mut(state) {
            Some(stored) => *stored = value,
            None => {
                self.values.insert(state.clone(), value);
            }
        }
    }

    pub fn contains(&self, state: &S) -> bool {
        self.values.contains_key(state)
    }

    /// Every stored `(state, value)` pair, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (&S, f64)> + '_ {
        self.values.iter().map(|(state, value)| (state, *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::env::tic_tac_toe::{Board, Mark, TicTacToeTask};

    #[test]
    fn initial_value_is_computed_once() {
        let calls: Cell<u32> = Cell::new(0);
        let mut table: StateValueTable<u8, _> = StateValueTable::new(|key: &u8| {
            calls.set(calls.get() + 1);
            *key as f64 / 10.0
        });
        assert_eq!(table.value(&3), 0.3);
        assert_eq!(table.value(&3), 0.3);
        assert_eq!(calls.get(), 1);
        table.value(&4);
        assert_eq!(calls.get(), 2);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn set_is_never_replaced_by_default() {
        let mut table: StateValueTable<u8> = StateValueTable::new(Constant(0.5));
        table.set(&1, 0.9);
        assert_eq!(table.value(&1), 0.9);
        assert_eq!(table.get(&2), None);
        assert_eq!(table.value(&2), 0.5);
        assert!(table.contains(&2));
    }

    #[test]
    fn outcome_value_scores_terminal_boards() {
        let task = TicTacToeTask;
        let x_wins = Board::parse("XXXOO....").unwrap();
        let o_wins = Board::parse("OOOXX.X..").unwrap();
        let draw = Board::parse("XOXXOOOXX").unwrap();
        let open = Board::parse("X........").unwrap();

        assert_eq!(outcome_value(&task, &Mark::X, 0.5, &x_wins), 1.0);
        assert_eq!(outcome_value(&task, &Mark::X, 0.5, &o_wins), 0.0);
        assert_eq!(outcome_value(&task, &Mark::X, 0.5, &draw), 1.0);
        assert_eq!(outcome_value(&task, &Mark::X, 0.5, &open), 0.5);
        assert_eq!(outcome_value(&task, &Mark::O, 0.5, &o_wins), 1.0);
    }

    #[test]
    fn outcome_value_table_caches_per_board() {
        let mut table = StateValueTable::new(OutcomeValue::new(TicTacToeTask, Mark::O, 0.3));
        let x_wins = Board::parse("XXXOO....").unwrap();
        assert_eq!(table.value(&x_wins), 0.0);
        assert_eq!(table.value(&Board::default()), 0.3);
        assert_eq!(table.entries().count(), 2);
    }
}
