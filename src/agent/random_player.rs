use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{GamePlayer, Step};
use crate::env::{GameDomain, Task};
use crate::error::{RLError, Result};

/// Opponent picking uniformly among the legal moves. Never learns.
#[derive(Debug, Clone)]
pub struct RandomPlayer {
    rng: StdRng,
    cumulative_reward: f64,
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPlayer {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            cumulative_reward: 0.0,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            cumulative_reward: 0.0,
        }
    }
}

impl<D, T> GamePlayer<D, T> for RandomPlayer
where
    D: GameDomain,
    T: Task<D::State, D::Action>,
{
    fn prepare_for_new_episode(&mut self, _state: &D::State) {
        self.cumulative_reward = 0.0;
    }

    fn act(&mut self, domain: &mut D, task: &T) -> Result<Step<D::Action>> {
        let state: D::State = domain.current_state();
        let action: D::Action = domain
            .legal_actions(&state)
            .choose(&mut self.rng)
            .cloned()
            .ok_or_else(|| RLError::no_legal_actions(&state))?;
        domain.apply_action(&action)?;
        let next_state: D::State = domain.current_state();
        let reward: f64 = task.reward(&state, &action, &next_state);
        self.cumulative_reward += reward;
        Ok(Step {
            action,
            reward,
            terminal: task.is_final(&next_state),
            exploratory: true,
            td_error: 0.0,
        })
    }

    fn see_result(&mut self, _state: &D::State) -> Result<f64> {
        let reward: f64 = self.cumulative_reward;
        self.cumulative_reward = 0.0;
        Ok(reward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Board, Domain, TicTacToe, TicTacToeTask};

    #[test]
    fn plays_only_legal_moves() {
        let mut game = TicTacToe::new();
        let task = TicTacToeTask;
        let mut player = RandomPlayer::with_seed(3);
        let mut moves = 0;
        while !task.is_final(&game.current_state()) {
            let before: Board = game.current_state();
            let step = player.act(&mut game, &task).unwrap();
            assert!(before.get(step.action.cell).is_none());
            moves += 1;
        }
        assert!(moves >= 5 && moves <= 9);
    }

    #[test]
    fn fails_without_legal_moves() {
        let mut game = TicTacToe::from_board(Board::parse("XXXOO....").unwrap());
        let mut player = RandomPlayer::with_seed(3);
        assert!(matches!(
            player.act(&mut game, &TicTacToeTask),
            Err(RLError::NoLegalActions { .. })
        ));
    }
}
