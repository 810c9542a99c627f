mod epsilon_greedy;
mod tie_break;

pub use epsilon_greedy::{Choice, EpsilonGreedy};
pub use tie_break::TieBreak;
