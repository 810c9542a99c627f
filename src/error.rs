use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RLError {
    #[error("no legal actions available in state {state}")]
    NoLegalActions { state: String },

    #[error("on-policy update requires the next chosen action")]
    MissingNextAction,

    #[error("terminal state {state} was already observed as the previous state")]
    StaleResult { state: String },

    #[error("illegal action {action}")]
    IllegalAction { action: String },

    #[error("invalid parameter {name} = {value} (expected {expected})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("environment is not ready to receive actions")]
    EnvNotReady,
}

impl RLError {
    pub fn no_legal_actions<S: std::fmt::Debug>(state: &S) -> Self {
        Self::NoLegalActions {
            state: format!("{:?}", state),
        }
    }

    pub fn illegal_action<A: std::fmt::Debug>(action: &A) -> Self {
        Self::IllegalAction {
            action: format!("{:?}", action),
        }
    }
}

pub type Result<T> = std::result::Result<T, RLError>;

/// Checks that `value` is finite and lies in `[low, high]`.
pub(crate) fn check_range(
    name: &'static str,
    value: f64,
    low: f64,
    high: f64,
    expected: &'static str,
) -> Result<()> {
    if value.is_finite() && value >= low && value <= high {
        Ok(())
    } else {
        Err(RLError::InvalidParameter {
            name,
            value,
            expected,
        })
    }
}
