use thiserror::Error;

/// Rejected move: the choice cannot be taken from the given state.
///
/// This is the only runtime failure the engine produces. It never mutates a
/// session and the same input always fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("unknown state '{0}'")]
    UnknownState(String),

    /// Also returned for every choice on a terminal state.
    #[error("state '{state_id}' has no choice '{choice_id}'")]
    UnknownChoice { state_id: String, choice_id: String },

    /// The choice exists but points outside the catalog.
    #[error("choice '{choice_id}' on '{state_id}' leads to missing state '{next_state_id}'")]
    DanglingTarget {
        state_id: String,
        choice_id: String,
        next_state_id: String,
    },

    /// Taking the choice would push a running total past `i64`.
    #[error("choice '{choice_id}' on '{state_id}' would overflow the session totals")]
    ScoreOverflow { state_id: String, choice_id: String },
}

/// Failure while rebuilding a session from recorded history.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    /// A recorded step does not start where the replay currently is.
    #[error("recorded step {index} starts at '{recorded}' but session is at '{expected}'")]
    HistoryMismatch {
        index: usize,
        expected: String,
        recorded: String,
    },

    #[error("recorded step {index}: {source}")]
    Step {
        index: usize,
        #[source]
        source: TransitionError,
    },
}

/// Defect found while building or loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate state id '{0}'")]
    DuplicateState(String),

    #[error("state '{state_id}' has duplicate choice id '{choice_id}'")]
    DuplicateChoice { state_id: String, choice_id: String },

    #[error("choice '{choice_id}' on '{state_id}' points to unknown state '{next_state_id}'")]
    DanglingChoice {
        state_id: String,
        choice_id: String,
        next_state_id: String,
    },

    #[error("state '{0}' is terminal but has choices")]
    TerminalWithChoices(String),

    #[error("state '{0}' is not terminal but has no choices")]
    DeadEnd(String),

    #[error("start id '{0}' does not name a state")]
    UnknownStart(String),

    #[error("start id '{0}' names a terminal state")]
    TerminalStart(String),

    #[error("default start '{0}' is not listed as a start id")]
    DefaultNotListed(String),

    #[error("catalog has no start ids")]
    NoStarts,

    #[error("malformed identifier '{0}'")]
    InvalidId(String),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}
