pub mod action_selection;
pub mod agent;
pub mod env;
pub mod error;
pub mod policy_update;
pub mod utils;
pub mod value_table;

pub use agent::{Agent, GamePlayer};
pub use error::{RLError, Result};
