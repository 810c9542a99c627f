//! Lookup tables mapping visited keys to scalar value estimates.
//!
//! Entries are created lazily on first read with a computed default and are
//! never removed, so a table only grows with the part of the state space the
//! agent actually visits.

mod action_value;
mod state_value;

pub use action_value::ActionValueTable;
pub use state_value::{outcome_value, Constant, InitialValue, OutcomeValue, StateValueTable};
