//! Turn-based driver for two [`GamePlayer`]s sharing one domain.

use kdam::{tqdm, BarExt};

use super::GamePlayer;
use crate::env::{GameDomain, GameTask, Task};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult<S, P> {
    pub final_state: S,
    pub winner: Option<P>,
    /// Reward each seat collected, as returned by `see_result`.
    pub rewards: [f64; 2],
    pub moves: u128,
}

impl<S, P> MatchResult<S, P> {
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// Win and draw counts per seat over a series of games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub wins: [u128; 2],
    pub draws: u128,
    pub games: u128,
}

impl Scoreboard {
    pub fn record<S, P: PartialEq>(&mut self, result: &MatchResult<S, P>, seats: &[P; 2]) {
        self.games += 1;
        match &result.winner {
            Some(winner) => {
                if let Some(seat) = seats.iter().position(|p| p == winner) {
                    self.wins[seat] += 1;
                }
            }
            None => self.draws += 1,
        }
    }

    pub fn win_rate(&self, seat: usize) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.wins[seat] as f64 / self.games as f64
    }

    pub fn draw_rate(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.draws as f64 / self.games as f64
    }
}

/// Plays one game from the domain's reset state, seat 0 moving first.
///
/// Both players see the terminal state once the game is over, in seat order.
pub fn play_episode<D, T>(
    domain: &mut D,
    task: &T,
    mut players: [&mut (dyn GamePlayer<D, T> + '_); 2],
) -> Result<MatchResult<D::State, T::Player>>
where
    D: GameDomain,
    T: Task<D::State, D::Action> + GameTask<D::State>,
{
    domain.reset();
    let start: D::State = domain.current_state();
    for player in players.iter_mut() {
        player.prepare_for_new_episode(&start);
    }

    let mut moves: u128 = 0;
    let mut turn: usize = 0;
    while !task.is_final(&domain.current_state()) {
        let step = players[turn].act(domain, task)?;
        log::trace!("seat {} played {:?}", turn, step.action);
        moves += 1;
        turn = 1 - turn;
    }

    let final_state: D::State = domain.current_state();
    let rewards: [f64; 2] = [
        players[0].see_result(&final_state)?,
        players[1].see_result(&final_state)?,
    ];
    let winner: Option<T::Player> = task.winner(&final_state);
    log::debug!("game over after {} moves, winner {:?}", moves, winner);
    Ok(MatchResult {
        final_state,
        winner,
        rewards,
        moves,
    })
}

/// Plays `n_episodes` games with a progress bar and tallies the outcomes.
pub fn play_matches<D, T>(
    domain: &mut D,
    task: &T,
    players: [&mut (dyn GamePlayer<D, T> + '_); 2],
    seats: &[T::Player; 2],
    n_episodes: u128,
) -> Result<Scoreboard>
where
    D: GameDomain,
    T: Task<D::State, D::Action> + GameTask<D::State>,
{
    let [first, second] = players;
    let mut scoreboard: Scoreboard = Scoreboard::default();

    let mut pb = tqdm!(total = n_episodes as usize);
    pb.set_description(String::from("playing"));
    if let Err(e) = pb.refresh() {
        log::warn!("progress bar refresh failed: {}", e);
    }

    for _episode in 0..n_episodes {
        let result = play_episode(domain, task, [&mut *first, &mut *second])?;
        scoreboard.record(&result, seats);
        if let Err(e) = pb.update(1) {
            log::warn!("progress bar update failed: {}", e);
        }
    }
    log::info!(
        "{} games: seat 0 won {:.3}, seat 1 won {:.3}, draws {:.3}",
        scoreboard.games,
        scoreboard.win_rate(0),
        scoreboard.win_rate(1),
        scoreboard.draw_rate()
    );
    Ok(scoreboard)
}
