use std::time::Instant;

use tabular_td::action_selection::TieBreak;
use tabular_td::agent::self_play::{play_episode, play_matches, Scoreboard};
use tabular_td::agent::{GameConfig, RandomPlayer, StateValueAgent};
use tabular_td::env::{Board, Mark, TicTacToe, TicTacToeTask};
use tabular_td::value_table::OutcomeValue;
use tabular_td::Result;

extern crate structopt;

use structopt::StructOpt;

type Learner = StateValueAgent<Board, OutcomeValue<TicTacToeTask, Mark>>;

/// Train two state-value agents by self-play and measure them against a random opponent
#[derive(StructOpt, Debug)]
#[structopt(name = "tabular_td - TicTacToe")]
struct Cli {
    /// Number of self-play games for the training
    #[structopt(long = "n_episodes", short = "n", default_value = "20000")]
    n_episodes: u128,

    /// Number of games played against the random opponent per seat
    #[structopt(long = "evaluation_games", default_value = "1000")]
    evaluation_games: u128,

    /// Learning rate of the agents
    #[structopt(long = "learning_rate", default_value = "0.2")]
    learning_rate: f64,

    /// Exploration ratio during training
    #[structopt(long = "epsilon", default_value = "0.1")]
    epsilon: f64,

    /// Value of boards that were never seen and are still in play
    #[structopt(long = "initial_value", default_value = "0.5")]
    initial_value: f64,

    /// Also learn from exploratory moves
    #[structopt(long = "update_exploratory")]
    update_exploratory: bool,

    /// How tied moves are resolved: first or random
    #[structopt(long = "tie_break", default_value = "first")]
    tie_break: TieBreak,

    /// Seed for the agents and the random opponent
    #[structopt(long = "seed")]
    seed: Option<u64>,

    /// Print the final board of one greedy self-play game
    #[structopt(long = "show_example")]
    show_example: bool,
}

/// Seed of one of the players, derived from the command line seed.
fn player_seed(seed: Option<u64>, offset: u64) -> Option<u64> {
    seed.map(|seed| seed.wrapping_add(offset))
}

fn opponent(seed: Option<u64>) -> RandomPlayer {
    match seed {
        Some(seed) => RandomPlayer::with_seed(seed),
        None => RandomPlayer::new(),
    }
}

fn report(title: &str, scoreboard: &Scoreboard) {
    println!(
        "{}: X won {:.3}, O won {:.3}, draws {:.3}",
        title,
        scoreboard.win_rate(0),
        scoreboard.win_rate(1),
        scoreboard.draw_rate()
    );
}

fn run(cli: &Cli) -> Result<()> {
    let task: TicTacToeTask = TicTacToeTask;
    let mut game: TicTacToe = TicTacToe::new();
    let seats: [Mark; 2] = [Mark::X, Mark::O];

    let config = |offset: u64| GameConfig {
        learning_rate: cli.learning_rate,
        epsilon: cli.epsilon,
        initial_value: cli.initial_value,
        update_exploratory: cli.update_exploratory,
        tie_break: cli.tie_break,
        seed: player_seed(cli.seed, offset),
    };
    let mut x: Learner = StateValueAgent::for_player(config(0), task, Mark::X)?;
    let mut o: Learner = StateValueAgent::for_player(config(1), task, Mark::O)?;

    let now: Instant = Instant::now();
    let training: Scoreboard = play_matches(&mut game, &task, [&mut x, &mut o], &seats, cli.n_episodes)?;
    log::info!(
        "self-play took {:.2?}; X knows {} boards, O knows {} boards",
        now.elapsed(),
        x.table().len(),
        o.table().len()
    );
    report("self-play", &training);

    let mut greedy_x: Learner = x.frozen()?;
    let mut random_o: RandomPlayer = opponent(player_seed(cli.seed, 2));
    let as_x: Scoreboard = play_matches(
        &mut game,
        &task,
        [&mut greedy_x, &mut random_o],
        &seats,
        cli.evaluation_games,
    )?;
    report("greedy X vs random O", &as_x);

    let mut random_x: RandomPlayer = opponent(player_seed(cli.seed, 3));
    let mut greedy_o: Learner = o.frozen()?;
    let as_o: Scoreboard = play_matches(
        &mut game,
        &task,
        [&mut random_x, &mut greedy_o],
        &seats,
        cli.evaluation_games,
    )?;
    report("random X vs greedy O", &as_o);

    if cli.show_example {
        let mut greedy_x: Learner = x.frozen()?;
        let mut greedy_o: Learner = o.frozen()?;
        let result = play_episode(&mut game, &task, [&mut greedy_x, &mut greedy_o])?;
        println!("{}", result.final_state);
        match result.winner {
            Some(mark) => println!("{:?} wins after {} moves", mark, result.moves),
            None => println!("draw after {} moves", result.moves),
        }
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
