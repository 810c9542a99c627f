use std::time::Instant;

use tabular_td::action_selection::TieBreak;
use tabular_td::agent::{Agent, EpisodeSummary, TdAgent, TdConfig, TdMethod};
use tabular_td::env::{Direction, GridWorld, Position, ReachExit};
use tabular_td::utils::moving_average;
use tabular_td::Result;

extern crate structopt;

use structopt::StructOpt;

/// Train a TD agent on a grid world and report periodic greedy evaluations
#[derive(StructOpt, Debug)]
#[structopt(name = "tabular_td - GridWorld")]
struct Cli {
    /// Number of evaluation points
    #[structopt(long = "n_evaluations", default_value = "10")]
    n_evaluations: u128,

    /// Training episodes between two evaluation points
    #[structopt(long = "evaluation_period", default_value = "1200")]
    evaluation_period: u128,

    /// Greedy episodes run at each evaluation point
    #[structopt(long = "evaluation_episodes", default_value = "100")]
    evaluation_episodes: u128,

    /// TD method: q-learning, sarsa or expected-sarsa
    #[structopt(long = "method", default_value = "sarsa")]
    method: TdMethod,

    /// Width of the grid
    #[structopt(long = "width", default_value = "10")]
    width: usize,

    /// Height of the grid
    #[structopt(long = "height", default_value = "10")]
    height: usize,

    /// Maximum number of steps per episode
    #[structopt(long = "max_steps", default_value = "1000")]
    max_steps: u128,

    /// Learning rate of the RL agent
    #[structopt(long = "learning_rate", default_value = "0.6")]
    learning_rate: f64,

    /// Discount factor to be used on the temporal difference calculation
    #[structopt(long = "discount_factor", default_value = "0.95")]
    discount_factor: f64,

    /// Initial value for the exploration ratio
    #[structopt(long = "epsilon", default_value = "0.1")]
    epsilon: f64,

    /// Value to decrease of the exploration ratio after each episode
    #[structopt(long = "epsilon_decay", default_value = "0.0")]
    epsilon_decay: f64,

    /// Final value for the exploration ratio
    #[structopt(long = "final_epsilon", default_value = "0.0")]
    final_epsilon: f64,

    /// Value of never visited state-action pairs
    #[structopt(long = "default_value", default_value = "0.0")]
    default_value: f64,

    /// How tied actions are resolved: first or random
    #[structopt(long = "tie_break", default_value = "random")]
    tie_break: TieBreak,

    /// Seed for the exploration of the agent
    #[structopt(long = "seed")]
    seed: Option<u64>,

    /// Moving average window used on the training rewards
    #[structopt(long = "moving_average_window", default_value = "100")]
    moving_average_window: usize,

    /// Print the greedy policy after training
    #[structopt(long = "show_policy")]
    show_policy: bool,
}

fn mean_reward(summaries: &[EpisodeSummary]) -> f64 {
    if summaries.is_empty() {
        return 0.0;
    }
    summaries.iter().map(|s| s.reward).sum::<f64>() / summaries.len() as f64
}

fn run(cli: &Cli) -> Result<()> {
    let mut world: GridWorld = GridWorld::new(cli.width, cli.height);
    let task: ReachExit = ReachExit::new(&world);
    let mut evaluation_world: GridWorld = world.clone();

    let config: TdConfig = TdConfig {
        learning_rate: cli.learning_rate,
        discount_factor: cli.discount_factor,
        epsilon: cli.epsilon,
        epsilon_decay: cli.epsilon_decay,
        final_epsilon: cli.final_epsilon,
        default_value: cli.default_value,
        tie_break: cli.tie_break,
        seed: cli.seed,
    };
    let mut agent: TdAgent<Position, Direction> = TdAgent::new(config, cli.method)?;
    log::info!("training {:?} on a {}x{} grid", cli.method, cli.width, cli.height);

    println!("episodes,greedy_reward,training_reward");
    let now: Instant = Instant::now();
    for point in 0..=cli.n_evaluations {
        let summaries: Vec<EpisodeSummary> = agent.evaluate(
            &mut evaluation_world,
            &task,
            cli.evaluation_episodes,
            Some(cli.max_steps),
        )?;
        let evaluation: f64 = mean_reward(&summaries);
        let truncated: usize = summaries.iter().filter(|s| s.truncated).count();
        if truncated > 0 {
            log::warn!("{} greedy episodes hit the step bound", truncated);
        }
        if point == cli.n_evaluations {
            println!("{},{:.4},", point * cli.evaluation_period, evaluation);
            break;
        }

        let (reward_history, _episode_length) = agent.train(
            &mut world,
            &task,
            cli.evaluation_period,
            Some(cli.max_steps),
        )?;
        let ma_reward: Vec<f64> = moving_average(cli.moving_average_window, &reward_history);
        let training: f64 = ma_reward.last().copied().unwrap_or(0.0);
        println!("{},{:.4},{:.4}", point * cli.evaluation_period, evaluation, training);
    }
    log::info!(
        "trained for {} episodes in {:.2?}; table holds {} entries",
        agent.episodes(),
        now.elapsed(),
        agent.table().len()
    );

    if cli.show_policy {
        println!("{}", world.render_policy(agent.table()));
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli: Cli = Cli::from_args();
    if let Err(e) = run(&cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
