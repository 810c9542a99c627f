mod random_player;
pub mod self_play;
mod state_value_agent;
mod td_agent;

pub use random_player::RandomPlayer;
pub use state_value_agent::{GameConfig, StateValueAgent};
pub use td_agent::{TdAgent, TdConfig, TdMethod};

use kdam::{tqdm, BarExt};

use crate::env::{Domain, GameDomain, Task};
use crate::error::Result;

/// What happened during one call to `act`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<A> {
    pub action: A,
    pub reward: f64,
    pub terminal: bool,
    pub exploratory: bool,
    pub td_error: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub reward: f64,
    pub steps: u128,
    /// The episode hit the step bound before reaching a terminal state.
    pub truncated: bool,
}

pub type TrainResults = (Vec<f64>, Vec<u128>);

/// An agent acting alone in a domain, one transition per `act`.
pub trait Agent<D: Domain, T: Task<D::State, D::Action>> {
    fn act(&mut self, domain: &mut D, task: &T) -> Result<Step<D::Action>>;

    /// Running reward of the current episode.
    fn cumulative_reward(&self) -> f64;

    /// Clears per-episode state; call after reading the final reward.
    fn episode_ended(&mut self);

    /// Clears per-episode state of an episode that did not finish, without
    /// counting it.
    fn episode_aborted(&mut self);

    fn run_episode(
        &mut self,
        domain: &mut D,
        task: &T,
        max_steps: Option<u128>,
    ) -> Result<EpisodeSummary> {
        domain.reset();
        let mut steps: u128 = 0;
        let mut truncated: bool = false;
        while !task.is_final(&domain.current_state()) {
            if max_steps.map_or(false, |max| steps >= max) {
                truncated = true;
                break;
            }
            if let Err(e) = self.act(domain, task) {
                log::warn!("episode halted after {} steps: {}", steps, e);
                self.episode_aborted();
                return Err(e);
            }
            steps += 1;
        }
        let summary: EpisodeSummary = EpisodeSummary {
            reward: self.cumulative_reward(),
            steps,
            truncated,
        };
        self.episode_ended();
        Ok(summary)
    }

    fn train(
        &mut self,
        domain: &mut D,
        task: &T,
        n_episodes: u128,
        max_steps: Option<u128>,
    ) -> Result<TrainResults> {
        let mut training_reward: Vec<f64> = vec![];
        let mut training_length: Vec<u128> = vec![];

        let mut pb = tqdm!(total = n_episodes as usize);
        pb.set_description(String::from("training"));
        if let Err(e) = pb.refresh() {
            log::warn!("progress bar refresh failed: {}", e);
        }

        for _episode in 0..n_episodes {
            let summary: EpisodeSummary = self.run_episode(domain, task, max_steps)?;
            training_reward.push(summary.reward);
            training_length.push(summary.steps);
            if let Err(e) = pb.update(1) {
                log::warn!("progress bar update failed: {}", e);
            }
        }
        Ok((training_reward, training_length))
    }
}

/// One side of a turn-based game.
pub trait GamePlayer<D: GameDomain, T: Task<D::State, D::Action>> {
    fn prepare_for_new_episode(&mut self, state: &D::State);

    fn act(&mut self, domain: &mut D, task: &T) -> Result<Step<D::Action>>;

    /// Observes the terminal state and returns the reward collected in the episode.
    fn see_result(&mut self, state: &D::State) -> Result<f64>;
}
