pub mod grid_world;
pub mod tic_tac_toe;

use std::fmt::Debug;
use std::hash::Hash;

use crate::error::Result;

pub use grid_world::{Direction, GridWorld, Position, ReachExit};
pub use tic_tac_toe::{Board, Mark, Place, TicTacToe, TicTacToeTask};

/// The world an agent acts in.
pub trait Domain {
    type State: Clone + Eq + Hash + Debug;
    type Action: Clone + Eq + Hash + Debug;

    fn current_state(&self) -> Self::State;

    /// Actions available from `state`; never empty for a non-terminal state.
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    fn apply_action(&mut self, action: &Self::Action) -> Result<()>;

    fn reset(&mut self);
}

/// A domain whose actions lead to a successor known before acting.
pub trait GameDomain: Domain {
    fn successor(&self, state: &Self::State, action: &Self::Action) -> Result<Self::State>;
}

/// Reward function and episode termination for a domain.
pub trait Task<S, A> {
    fn reward(&self, state: &S, action: &A, next_state: &S) -> f64;

    fn is_final(&self, state: &S) -> bool;
}

pub trait GameTask<S> {
    type Player: Clone + PartialEq + Debug;

    fn winner(&self, state: &S) -> Option<Self::Player>;

    fn is_draw(&self, state: &S) -> bool;
}
