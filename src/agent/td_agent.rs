use std::fmt::Debug;
use std::hash::Hash;
use std::str::FromStr;

use super::{Agent, EpisodeSummary, Step};
use crate::action_selection::{Choice, EpsilonGreedy, TieBreak};
use crate::env::{Domain, Task};
use crate::error::{check_range, Result};
use crate::policy_update::{
    ExpectedSarsaStep, PolicyUpdate, QStep, SarsaStep, Transition, UpdateRule,
};
use crate::value_table::ActionValueTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TdMethod {
    QLearning,
    Sarsa,
    ExpectedSarsa,
}

impl TdMethod {
    pub fn rule(&self, learning_rate: f64, discount_factor: f64) -> UpdateRule {
        match self {
            TdMethod::QLearning => QStep::new(learning_rate, discount_factor).into(),
            TdMethod::Sarsa => SarsaStep::new(learning_rate, discount_factor).into(),
            TdMethod::ExpectedSarsa => ExpectedSarsaStep::new(learning_rate, discount_factor).into(),
        }
    }
}

impl FromStr for TdMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(|c| c == '-' || c == '_', "").as_str() {
            "qlearning" | "q" => Ok(TdMethod::QLearning),
            "sarsa" => Ok(TdMethod::Sarsa),
            "expectedsarsa" => Ok(TdMethod::ExpectedSarsa),
            _ => Err(format!(
                "unknown method '{}' (expected q-learning, sarsa or expected-sarsa)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TdConfig {
    pub learning_rate: f64,
    pub discount_factor: f64,
    pub epsilon: f64,
    pub epsilon_decay: f64,
    pub final_epsilon: f64,
    pub default_value: f64,
    pub tie_break: TieBreak,
    pub seed: Option<u64>,
}

impl Default for TdConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.6,
            discount_factor: 0.95,
            epsilon: 0.1,
            epsilon_decay: 0.0,
            final_epsilon: 0.0,
            default_value: 0.0,
            tie_break: TieBreak::Random,
            seed: None,
        }
    }
}

impl TdConfig {
    pub fn validate(&self) -> Result<()> {
        check_range("learning_rate", self.learning_rate, 0.0, 1.0, "[0, 1]")?;
        check_range("discount_factor", self.discount_factor, 0.0, 1.0, "[0, 1]")?;
        check_range("epsilon", self.epsilon, 0.0, 1.0, "[0, 1]")?;
        check_range("final_epsilon", self.final_epsilon, 0.0, 1.0, "[0, 1]")?;
        check_range("epsilon_decay", self.epsilon_decay, 0.0, f64::MAX, ">= 0")?;
        check_range("default_value", self.default_value, f64::MIN, f64::MAX, "a finite number")
    }

    fn action_selection(&self) -> EpsilonGreedy {
        let selection: EpsilonGreedy = EpsilonGreedy::new(self.epsilon, self.tie_break)
            .with_decay(self.epsilon_decay, self.final_epsilon);
        match self.seed {
            Some(seed) => selection.with_seed(seed),
            None => selection,
        }
    }

    /// Same configuration with learning and exploration switched off.
    pub fn frozen(&self) -> Self {
        Self {
            learning_rate: 0.0,
            epsilon: 0.0,
            epsilon_decay: 0.0,
            final_epsilon: 0.0,
            ..*self
        }
    }
}

/// Epsilon-greedy agent learning an action-value table with a one-step TD rule.
///
/// On-policy rules choose the next action before updating and then execute
/// that same action on the following `act`.
#[derive(Debug, Clone)]
pub struct TdAgent<S: Hash + Eq + Clone + Debug, A: Hash + Eq + Clone + Debug> {
    config: TdConfig,
    method: TdMethod,
    table: ActionValueTable<S, A>,
    action_selection: EpsilonGreedy,
    policy_update: UpdateRule,
    previous_state: Option<S>,
    previous_action: Option<A>,
    next_choice: Option<Choice<A>>,
    cumulative_reward: f64,
    episodes: u128,
}

impl<S: Hash + Eq + Clone + Debug, A: Hash + Eq + Clone + Debug> TdAgent<S, A> {
    pub fn new(config: TdConfig, method: TdMethod) -> Result<Self> {
        Self::with_table(config, method, ActionValueTable::new(config.default_value))
    }

    /// Agent continuing from an existing table.
    pub fn with_table(
        config: TdConfig,
        method: TdMethod,
        table: ActionValueTable<S, A>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            method,
            table,
            action_selection: config.action_selection(),
            policy_update: method.rule(config.learning_rate, config.discount_factor),
            previous_state: None,
            previous_action: None,
            next_choice: None,
            cumulative_reward: 0.0,
            episodes: 0,
        })
    }

    pub fn config(&self) -> &TdConfig {
        &self.config
    }

    pub fn method(&self) -> TdMethod {
        self.method
    }

    pub fn table(&self) -> &ActionValueTable<S, A> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut ActionValueTable<S, A> {
        &mut self.table
    }

    pub fn into_table(self) -> ActionValueTable<S, A> {
        self.table
    }

    pub fn epsilon(&self) -> f64 {
        self.action_selection.epsilon()
    }

    pub fn previous_state(&self) -> Option<&S> {
        self.previous_state.as_ref()
    }

    pub fn previous_action(&self) -> Option<&A> {
        self.previous_action.as_ref()
    }

    pub fn episodes(&self) -> u128 {
        self.episodes
    }

    pub fn choose_action<D>(&mut self, domain: &D, state: &S) -> Result<Choice<A>>
    where
        D: Domain<State = S, Action = A>,
    {
        let legal: Vec<A> = domain.legal_actions(state);
        self.action_selection.choose(state, &mut self.table, &legal)
    }

    fn clear_episode(&mut self) {
        self.cumulative_reward = 0.0;
        self.previous_state = None;
        self.previous_action = None;
        self.next_choice = None;
    }

    /// Greedy, non-learning copy of this agent sharing a snapshot of its table.
    pub fn frozen(&self) -> Result<Self> {
        Self::with_table(self.config.frozen(), self.method, self.table.clone())
    }

    /// Runs greedy episodes on a frozen copy; the agent itself is left untouched.
    pub fn evaluate<D, T>(
        &self,
        domain: &mut D,
        task: &T,
        n_episodes: u128,
        max_steps: Option<u128>,
    ) -> Result<Vec<EpisodeSummary>>
    where
        D: Domain<State = S, Action = A>,
        T: Task<S, A>,
    {
        let mut agent: Self = self.frozen()?;
        (0..n_episodes)
            .map(|_| agent.run_episode(&mut *domain, task, max_steps))
            .collect()
    }
}

impl<D, T> Agent<D, T> for TdAgent<D::State, D::Action>
where
    D: Domain,
    T: Task<D::State, D::Action>,
{
    fn act(&mut self, domain: &mut D, task: &T) -> Result<Step<D::Action>> {
        let state: D::State = domain.current_state();
        let choice: Choice<D::Action> = match self.next_choice.take() {
            Some(choice) => choice,
            None => self.choose_action(&*domain, &state)?,
        };

        domain.apply_action(&choice.action)?;
        let next_state: D::State = domain.current_state();
        let terminal: bool = task.is_final(&next_state);
        let reward: f64 = task.reward(&state, &choice.action, &next_state);

        let next_legal: Vec<D::Action> = if terminal {
            vec![]
        } else {
            domain.legal_actions(&next_state)
        };
        let next_choice: Option<Choice<D::Action>> = if !terminal && self.policy_update.on_policy()
        {
            Some(
                self.action_selection
                    .choose(&next_state, &mut self.table, &next_legal)?,
            )
        } else {
            None
        };

        let td_error: f64 = self.policy_update.update(
            &mut self.table,
            &Transition {
                state: &state,
                action: &choice.action,
                reward,
                next_state: &next_state,
                next_action: next_choice.as_ref().map(|c| &c.action),
                next_legal: &next_legal,
                terminal,
                exploration_rate: self.action_selection.epsilon(),
            },
        )?;
        log::trace!(
            "{:?} --{:?}--> {:?} reward={} td_error={}",
            state,
            choice.action,
            next_state,
            reward,
            td_error
        );

        self.cumulative_reward += reward;
        self.previous_state = Some(state);
        self.previous_action = Some(choice.action.clone());
        self.next_choice = next_choice;

        Ok(Step {
            action: choice.action,
            reward,
            terminal,
            exploratory: choice.exploratory,
            td_error,
        })
    }

    fn cumulative_reward(&self) -> f64 {
        self.cumulative_reward
    }

    fn episode_ended(&mut self) {
        self.episodes += 1;
        log::debug!(
            "episode {} ended: reward={} epsilon={} table size={}",
            self.episodes,
            self.cumulative_reward,
            self.action_selection.epsilon(),
            self.table.len()
        );
        self.clear_episode();
        self.action_selection.update();
    }

    fn episode_aborted(&mut self) {
        log::debug!(
            "episode {} aborted after reward={}",
            self.episodes + 1,
            self.cumulative_reward
        );
        self.clear_episode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Direction, GridWorld, Position, ReachExit};
    use crate::error::RLError;

    fn config() -> TdConfig {
        TdConfig {
            learning_rate: 0.5,
            discount_factor: 0.9,
            epsilon: 0.0,
            tie_break: TieBreak::First,
            seed: Some(5),
            ..TdConfig::default()
        }
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        let bad_alpha = TdConfig {
            learning_rate: -0.1,
            ..config()
        };
        let err = TdAgent::<u8, u8>::new(bad_alpha, TdMethod::QLearning).unwrap_err();
        assert!(matches!(
            err,
            RLError::InvalidParameter {
                name: "learning_rate",
                ..
            }
        ));
        let bad_gamma = TdConfig {
            discount_factor: 1.5,
            ..config()
        };
        assert!(TdAgent::<u8, u8>::new(bad_gamma, TdMethod::Sarsa).is_err());
        let bad_epsilon = TdConfig {
            epsilon: f64::NAN,
            ..config()
        };
        assert!(TdAgent::<u8, u8>::new(bad_epsilon, TdMethod::Sarsa).is_err());
    }

    #[test]
    fn method_parses_from_cli_text() {
        assert_eq!("q-learning".parse::<TdMethod>(), Ok(TdMethod::QLearning));
        assert_eq!("SARSA".parse::<TdMethod>(), Ok(TdMethod::Sarsa));
        assert_eq!("expected_sarsa".parse::<TdMethod>(), Ok(TdMethod::ExpectedSarsa));
        assert!("td-lambda".parse::<TdMethod>().is_err());
    }

    #[test]
    fn act_tracks_reward_and_previous_step() {
        let mut world = GridWorld::new(3, 1);
        let task = ReachExit::new(&world);
        let mut agent: TdAgent<Position, Direction> =
            TdAgent::new(config(), TdMethod::QLearning).unwrap();
        let step = agent.act(&mut world, &task).unwrap();
        assert_eq!(step.reward, -1.0);
        assert!(!step.exploratory);
        assert_eq!(Agent::<GridWorld, ReachExit>::cumulative_reward(&agent), -1.0);
        assert_eq!(agent.previous_state(), Some(&Position::new(0, 0)));
        assert_eq!(agent.previous_action(), Some(&step.action));

        Agent::<GridWorld, ReachExit>::episode_ended(&mut agent);
        assert_eq!(Agent::<GridWorld, ReachExit>::cumulative_reward(&agent), 0.0);
        assert_eq!(agent.previous_state(), None);
        assert_eq!(agent.episodes(), 1);
    }

    #[test]
    fn sarsa_executes_the_action_it_looked_ahead_with() {
        let mut world = GridWorld::new(4, 1);
        let task = ReachExit::new(&world);
        let mut agent: TdAgent<Position, Direction> = TdAgent::new(
            TdConfig {
                epsilon: 1.0,
                ..config()
            },
            TdMethod::Sarsa,
        )
        .unwrap();
        agent.act(&mut world, &task).unwrap();
        let planned: Direction = agent.next_choice.as_ref().unwrap().action;
        let step = agent.act(&mut world, &task).unwrap();
        assert_eq!(step.action, planned);
    }

    #[test]
    fn table_never_loses_keys() {
        let mut world = GridWorld::new(4, 4);
        let task = ReachExit::new(&world);
        let mut agent: TdAgent<Position, Direction> = TdAgent::new(
            TdConfig {
                epsilon: 0.3,
                ..config()
            },
            TdMethod::ExpectedSarsa,
        )
        .unwrap();
        let mut seen: Vec<(Position, Direction)> = vec![];
        for _ in 0..20 {
            agent.run_episode(&mut world, &task, Some(200)).unwrap();
            let keys: Vec<(Position, Direction)> =
                agent.table().entries().map(|((s, a), _)| (*s, *a)).collect();
            assert!(keys.len() >= seen.len());
            assert!(seen.iter().all(|k| keys.contains(k)));
            seen = keys;
        }
    }

    #[test]
    fn evaluate_does_not_touch_the_trained_table() {
        let mut world = GridWorld::new(3, 3);
        let task = ReachExit::new(&world);
        let mut agent: TdAgent<Position, Direction> = TdAgent::new(
            TdConfig {
                epsilon: 0.2,
                ..config()
            },
            TdMethod::QLearning,
        )
        .unwrap();
        agent.train(&mut world, &task, 30, Some(100)).unwrap();
        let before: usize = agent.table().len();
        let results = agent.evaluate(&mut world, &task, 3, Some(50)).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(agent.table().len(), before);
        assert_eq!(agent.epsilon(), 0.2);
    }

    /// Never final, and stuck in a state without legal actions.
    #[derive(Debug, Default)]
    struct Stuck;

    impl Domain for Stuck {
        type State = u8;
        type Action = u8;

        fn current_state(&self) -> u8 {
            0
        }

        fn legal_actions(&self, _state: &u8) -> Vec<u8> {
            vec![]
        }

        fn apply_action(&mut self, _action: &u8) -> Result<()> {
            Ok(())
        }

        fn reset(&mut self) {}
    }

    struct Endless;

    impl Task<u8, u8> for Endless {
        fn reward(&self, _state: &u8, _action: &u8, _next_state: &u8) -> f64 {
            0.0
        }

        fn is_final(&self, _state: &u8) -> bool {
            false
        }
    }

    #[test]
    fn halted_episode_is_not_counted() {
        let mut agent: TdAgent<u8, u8> = TdAgent::new(
            TdConfig {
                epsilon: 0.5,
                epsilon_decay: 0.1,
                ..config()
            },
            TdMethod::QLearning,
        )
        .unwrap();
        let err = agent.run_episode(&mut Stuck, &Endless, Some(10)).unwrap_err();
        assert!(matches!(err, RLError::NoLegalActions { .. }));
        assert_eq!(agent.episodes(), 0);
        assert_eq!(agent.epsilon(), 0.5);
        assert_eq!(agent.previous_state(), None);
    }
}
