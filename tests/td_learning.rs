use tabular_td::action_selection::TieBreak;
use tabular_td::agent::{Agent, TdAgent, TdConfig, TdMethod};
use tabular_td::env::{Direction, Domain, GridWorld, Position, ReachExit, Task};
use tabular_td::Result;

/// One decision: `A` pays 1, `B` pays 0, both end the episode.
#[derive(Debug, Clone, Default)]
struct TwoArms {
    done: bool,
}

impl Domain for TwoArms {
    type State = u8;
    type Action = char;

    fn current_state(&self) -> u8 {
        u8::from(self.done)
    }

    fn legal_actions(&self, state: &u8) -> Vec<char> {
        if *state == 0 {
            vec!['A', 'B']
        } else {
            vec![]
        }
    }

    fn apply_action(&mut self, _action: &char) -> Result<()> {
        self.done = true;
        Ok(())
    }

    fn reset(&mut self) {
        self.done = false;
    }
}

struct PayA;

impl Task<u8, char> for PayA {
    fn reward(&self, _state: &u8, action: &char, _next_state: &u8) -> f64 {
        if *action == 'A' {
            1.0
        } else {
            0.0
        }
    }

    fn is_final(&self, state: &u8) -> bool {
        *state == 1
    }
}

fn greedy_config() -> TdConfig {
    TdConfig {
        learning_rate: 0.5,
        discount_factor: 0.9,
        epsilon: 0.0,
        tie_break: TieBreak::First,
        seed: Some(0),
        ..TdConfig::default()
    }
}

#[test]
fn one_step_task_converges_for_every_method() {
    for method in [TdMethod::QLearning, TdMethod::Sarsa, TdMethod::ExpectedSarsa] {
        let mut domain = TwoArms::default();
        let mut agent: TdAgent<u8, char> = TdAgent::new(greedy_config(), method).unwrap();
        let (rewards, lengths) = agent.train(&mut domain, &PayA, 50, None).unwrap();
        assert_eq!(rewards.len(), 50);
        assert!(lengths.iter().all(|&steps| steps == 1));

        let table = agent.table();
        assert!((table.get(&0, &'A').unwrap() - 1.0).abs() < 1e-2, "{:?}", method);
        assert!(table.get(&0, &'B').unwrap().abs() < 1e-2, "{:?}", method);

        domain.reset();
        let choice = agent.choose_action(&domain, &0).unwrap();
        assert_eq!(choice.action, 'A');
    }
}

#[test]
fn q_learning_finds_a_short_path_in_a_small_grid() {
    let mut world = GridWorld::new(4, 4);
    let task = ReachExit::new(&world);
    let config = TdConfig {
        learning_rate: 0.6,
        discount_factor: 0.95,
        epsilon: 0.1,
        seed: Some(42),
        ..TdConfig::default()
    };
    let mut agent: TdAgent<Position, Direction> = TdAgent::new(config, TdMethod::QLearning).unwrap();
    agent.train(&mut world, &task, 500, Some(500)).unwrap();

    let summaries = agent.evaluate(&mut world, &task, 3, Some(100)).unwrap();
    for summary in summaries {
        assert!(!summary.truncated);
        assert!(summary.reward >= -10.0, "greedy reward {}", summary.reward);
    }
}

#[test]
fn seeded_runs_are_reproducible() {
    let run = || {
        let mut world = GridWorld::new(5, 3);
        let task = ReachExit::new(&world);
        let config = TdConfig {
            epsilon: 0.2,
            tie_break: TieBreak::Random,
            seed: Some(7),
            ..TdConfig::default()
        };
        let mut agent: TdAgent<Position, Direction> = TdAgent::new(config, TdMethod::Sarsa).unwrap();
        agent.train(&mut world, &task, 30, Some(200)).unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn epsilon_decays_once_per_episode_down_to_the_floor() {
    let mut domain = TwoArms::default();
    let config = TdConfig {
        epsilon: 0.5,
        epsilon_decay: 0.2,
        final_epsilon: 0.05,
        ..greedy_config()
    };
    let mut agent: TdAgent<u8, char> = TdAgent::new(config, TdMethod::QLearning).unwrap();
    agent.run_episode(&mut domain, &PayA, None).unwrap();
    assert!((agent.epsilon() - 0.3).abs() < 1e-12);
    agent.train(&mut domain, &PayA, 5, None).unwrap();
    assert!((agent.epsilon() - 0.05).abs() < 1e-12);
}

#[test]
fn step_bound_truncates_endless_episodes() {
    let mut world = GridWorld::new(6, 6);
    let task = ReachExit::new(&world);
    let config = TdConfig {
        learning_rate: 0.0,
        epsilon: 0.0,
        tie_break: TieBreak::First,
        ..TdConfig::default()
    };
    // frozen at zero: the first direction (up) always wins and never reaches the exit
    let mut agent: TdAgent<Position, Direction> = TdAgent::new(config, TdMethod::QLearning).unwrap();
    let summary = agent.run_episode(&mut world, &task, Some(25)).unwrap();
    assert!(summary.truncated);
    assert_eq!(summary.steps, 25);
    assert_eq!(summary.reward, -25.0);
}
