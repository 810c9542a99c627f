use std::fmt::Debug;
use std::hash::Hash;

use super::{GamePlayer, Step};
use crate::action_selection::{Choice, EpsilonGreedy, TieBreak};
use crate::env::{GameDomain, GameTask, Task};
use crate::error::{check_range, RLError, Result};
use crate::policy_update::StateValueStep;
use crate::value_table::{InitialValue, OutcomeValue, StateValueTable};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    pub learning_rate: f64,
    pub epsilon: f64,
    /// Starting value of boards that are still in play.
    pub initial_value: f64,
    /// Whether exploratory moves take part in learning.
    pub update_exploratory: bool,
    pub tie_break: TieBreak,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.2,
            epsilon: 0.1,
            initial_value: 0.5,
            update_exploratory: false,
            tie_break: TieBreak::First,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        check_range("learning_rate", self.learning_rate, 0.0, 1.0, "[0, 1]")?;
        check_range("epsilon", self.epsilon, 0.0, 1.0, "[0, 1]")?;
        check_range("initial_value", self.initial_value, f64::MIN, f64::MAX, "a finite number")
    }
}

/// Self-play agent valuing the boards it can move to.
///
/// Learning chains through the agent's own observations: the observed board is
/// moved toward the board its chosen move produces, and that board is moved
/// toward whatever board the agent observes next.
#[derive(Debug, Clone)]
pub struct StateValueAgent<S: Hash + Eq + Clone + Debug, V: InitialValue<S>> {
    config: GameConfig,
    table: StateValueTable<S, V>,
    action_selection: EpsilonGreedy,
    policy_update: StateValueStep,
    previous_state: Option<S>,
    previous_move: Option<S>,
    was_exploratory: bool,
    cumulative_reward: f64,
    episodes: u128,
}

impl<S, T> StateValueAgent<S, OutcomeValue<T, T::Player>>
where
    S: Hash + Eq + Clone + Debug,
    T: GameTask<S>,
{
    /// Agent playing as `player`, scoring unseen boards from the game outcome.
    pub fn for_player(config: GameConfig, task: T, player: T::Player) -> Result<Self> {
        Self::new(config, OutcomeValue::new(task, player, config.initial_value))
    }
}

impl<S: Hash + Eq + Clone + Debug, V: InitialValue<S>> StateValueAgent<S, V> {
    /// Agent with a custom initial value; `config.initial_value` is not consulted.
    pub fn new(config: GameConfig, initial: V) -> Result<Self> {
        Self::with_table(config, StateValueTable::new(initial))
    }

    pub fn with_table(config: GameConfig, table: StateValueTable<S, V>) -> Result<Self> {
        config.validate()?;
        let action_selection: EpsilonGreedy = match config.seed {
            Some(seed) => EpsilonGreedy::new(config.epsilon, config.tie_break).with_seed(seed),
            None => EpsilonGreedy::new(config.epsilon, config.tie_break),
        };
        Ok(Self {
            config,
            table,
            action_selection,
            policy_update: StateValueStep::new(config.learning_rate),
            previous_state: None,
            previous_move: None,
            was_exploratory: false,
            cumulative_reward: 0.0,
            episodes: 0,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn table(&self) -> &StateValueTable<S, V> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut StateValueTable<S, V> {
        &mut self.table
    }

    pub fn into_table(self) -> StateValueTable<S, V> {
        self.table
    }

    pub fn epsilon(&self) -> f64 {
        self.action_selection.epsilon()
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.action_selection.set_epsilon(epsilon);
    }

    pub fn previous_state(&self) -> Option<&S> {
        self.previous_state.as_ref()
    }

    pub fn previous_move(&self) -> Option<&S> {
        self.previous_move.as_ref()
    }

    pub fn was_exploratory(&self) -> bool {
        self.was_exploratory
    }

    pub fn cumulative_reward(&self) -> f64 {
        self.cumulative_reward
    }

    pub fn episodes(&self) -> u128 {
        self.episodes
    }

    fn learns_from(&self, exploratory: bool) -> bool {
        !exploratory || self.config.update_exploratory
    }

    /// Moves the board of the previous move toward the newly observed `state`.
    fn observe(&mut self, state: &S) {
        if !self.learns_from(self.was_exploratory) {
            return;
        }
        if let Some(previous_move) = &self.previous_move {
            self.policy_update
                .update(&mut self.table, previous_move, state);
        }
    }

    /// Chooses a move from the domain's current state and learns from it.
    pub fn choose_move<D>(&mut self, domain: &D) -> Result<Choice<D::Action>>
    where
        D: GameDomain<State = S>,
    {
        self.decide(domain).map(|(choice, _)| choice)
    }

    fn decide<D>(&mut self, domain: &D) -> Result<(Choice<D::Action>, f64)>
    where
        D: GameDomain<State = S>,
    {
        let state: S = domain.current_state();
        let options: Vec<(D::Action, S)> = domain
            .legal_actions(&state)
            .into_iter()
            .map(|action| {
                let next: S = domain.successor(&state, &action)?;
                Ok((action, next))
            })
            .collect::<Result<_>>()?;

        let table: &mut StateValueTable<S, V> = &mut self.table;
        let choice: Choice<(D::Action, S)> = self
            .action_selection
            .choose_by(&state, &options, |(_, next)| table.value(next))?;
        let (action, next) = choice.action;

        self.observe(&state);
        let td_error: f64 = if self.learns_from(choice.exploratory) {
            self.policy_update.update(&mut self.table, &state, &next)
        } else {
            0.0
        };

        self.previous_state = Some(state);
        self.previous_move = Some(next);
        self.was_exploratory = choice.exploratory;
        Ok((
            Choice {
                action,
                exploratory: choice.exploratory,
            },
            td_error,
        ))
    }
}

impl<S: Hash + Eq + Clone + Debug, V: InitialValue<S> + Clone> StateValueAgent<S, V> {
    /// Greedy, non-learning copy playing from a snapshot of the table.
    pub fn frozen(&self) -> Result<Self> {
        let config: GameConfig = GameConfig {
            learning_rate: 0.0,
            epsilon: 0.0,
            ..self.config
        };
        Self::with_table(config, self.table.clone())
    }
}

impl<D, T, V> GamePlayer<D, T> for StateValueAgent<D::State, V>
where
    D: GameDomain,
    T: Task<D::State, D::Action>,
    V: InitialValue<D::State>,
{
    fn prepare_for_new_episode(&mut self, state: &D::State) {
        self.previous_state = Some(state.clone());
        self.previous_move = None;
        self.was_exploratory = false;
        self.cumulative_reward = 0.0;
    }

    fn act(&mut self, domain: &mut D, task: &T) -> Result<Step<D::Action>> {
        let state: D::State = domain.current_state();
        let (choice, td_error) = self.decide(&*domain)?;
        domain.apply_action(&choice.action)?;
        let next_state: D::State = domain.current_state();
        let reward: f64 = task.reward(&state, &choice.action, &next_state);
        self.cumulative_reward += reward;
        Ok(Step {
            action: choice.action,
            reward,
            terminal: task.is_final(&next_state),
            exploratory: choice.exploratory,
            td_error,
        })
    }

    fn see_result(&mut self, state: &D::State) -> Result<f64> {
        if self.previous_state.as_ref() == Some(state) {
            return Err(RLError::StaleResult {
                state: format!("{:?}", state),
            });
        }
        self.observe(state);
        self.episodes += 1;
        let reward: f64 = self.cumulative_reward;
        log::debug!(
            "game {} ended: reward={} table size={}",
            self.episodes,
            reward,
            self.table.len()
        );
        self.previous_state = None;
        self.previous_move = None;
        self.was_exploratory = false;
        self.cumulative_reward = 0.0;
        self.action_selection.update();
        Ok(reward)
    }
}
