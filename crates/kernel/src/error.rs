use crate::sim::SimState;

/// Errors surfaced by the simulation kernel.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },
    #[error("invalid state: cannot {operation} while {state:?}")]
    InvalidState {
        state: SimState,
        operation: &'static str,
    },
}

impl SimError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}
