//! One play-through: running totals, current state and history.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::engine::{apply_choice, Transition};
use crate::error::{ReplayError, TransitionError};
use crate::scenario::{ScenarioState, StateCatalog};

/// One choice taken, recorded for replay and audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub state_id: String,
    pub choice_id: String,
}

/// Serializable play-through data. The host decides whether and where to
/// persist it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub start_state_id: String,
    pub current_state_id: String,
    pub total_xp: i64,
    /// Unbounded. Clamp for display with [`Debrief::breach_meter`].
    pub total_breach: i64,
    pub history: Vec<Step>,
}

impl Session {
    /// Totals after `t`, or `ScoreOverflow` if either would leave `i64`.
    fn totals_after(
        &self,
        t: &Transition<'_>,
        state_id: &str,
        choice_id: &str,
    ) -> Result<(i64, i64), TransitionError> {
        self.total_xp
            .checked_add(t.xp_delta)
            .zip(self.total_breach.checked_add(t.breach_delta))
            .ok_or_else(|| TransitionError::ScoreOverflow {
                state_id: state_id.to_string(),
                choice_id: choice_id.to_string(),
            })
    }

    fn new(start_state_id: &str) -> Self {
        Self {
            start_state_id: start_state_id.to_string(),
            current_state_id: start_state_id.to_string(),
            total_xp: 0,
            total_breach: 0,
            history: Vec::new(),
        }
    }

    /// Rebuild a session by re-applying `history` from the resolved start.
    ///
    /// Each step must begin at the state the previous one ended on. The first
    /// step that does not fit is returned as the error.
    pub fn replay(
        catalog: &StateCatalog,
        scenario_id: Option<&str>,
        history: &[Step],
    ) -> Result<Self, ReplayError> {
        let start = catalog.get_initial_state(scenario_id);
        let mut session = Self::new(&start.id);

        for (index, step) in history.iter().enumerate() {
            if step.state_id != session.current_state_id {
                return Err(ReplayError::HistoryMismatch {
                    index,
                    expected: session.current_state_id.clone(),
                    recorded: step.state_id.clone(),
                });
            }
            let (t, totals) = apply_choice(catalog, &step.state_id, &step.choice_id)
                .and_then(|t| {
                    let totals = session.totals_after(&t, &step.state_id, &step.choice_id)?;
                    Ok((t, totals))
                })
                .map_err(|source| ReplayError::Step { index, source })?;
            (session.total_xp, session.total_breach) = totals;
            session.current_state_id = t.next_state.id.clone();
            session.history.push(step.clone());
        }

        Ok(session)
    }
}

/// What the rendering layer needs after a successful choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOutcome<'c> {
    pub new_state: &'c ScenarioState,
    pub xp_delta: i64,
    pub breach_delta: i64,
    /// Feedback of the choice just taken, not the destination's body.
    pub feedback: &'c str,
    pub total_xp: i64,
    pub total_breach: i64,
}

/// End-of-round summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debrief {
    pub start_state_id: String,
    pub ended_at: String,
    pub complete: bool,
    pub total_xp: i64,
    pub total_breach: i64,
    pub steps_taken: usize,
    /// Longest possible play-through from the same start.
    pub max_steps: usize,
}

impl Debrief {
    pub fn breach_meter(&self) -> u8 {
        breach_meter(self.total_breach)
    }
}

/// Clamp a breach total to 0..=100 for a meter display.
pub fn breach_meter(total_breach: i64) -> u8 {
    total_breach.clamp(0, 100) as u8
}

/// Owns a single [`Session`] and drives it through the catalog.
///
/// Many controllers can borrow the same catalog at once.
#[derive(Debug, Clone)]
pub struct SessionController<'c> {
    catalog: &'c StateCatalog,
    current: &'c ScenarioState,
    session: Session,
}

impl<'c> SessionController<'c> {
    /// New game at the resolved starting state with zero totals.
    pub fn start(catalog: &'c StateCatalog, scenario_id: Option<&str>) -> Self {
        let current = catalog.get_initial_state(scenario_id);
        info!("Session started at '{}'", current.id);
        Self {
            catalog,
            current,
            session: Session::new(&current.id),
        }
    }

    /// Continue a persisted session. The history is replayed from its start
    /// and the replayed totals win over the recorded ones.
    pub fn resume(
        catalog: &'c StateCatalog,
        snapshot: &Session,
    ) -> Result<Self, ReplayError> {
        let session = Session::replay(
            catalog,
            Some(&snapshot.start_state_id),
            &snapshot.history,
        )?;

        if session != *snapshot {
            warn!(
                "Snapshot disagrees with its history (xp {} vs {}, breach {} vs {}, at '{}' vs '{}')",
                snapshot.total_xp,
                session.total_xp,
                snapshot.total_breach,
                session.total_breach,
                snapshot.current_state_id,
                session.current_state_id
            );
        }

        // replay only ever lands on catalog states
        let current = catalog.get_state(&session.current_state_id).ok_or_else(|| {
            ReplayError::Step {
                index: session.history.len(),
                source: TransitionError::UnknownState(session.current_state_id.clone()),
            }
        })?;

        Ok(Self {
            catalog,
            current,
            session,
        })
    }

    /// Take `choice_id` from the current state. On error nothing changes.
    pub fn choose(&mut self, choice_id: &str) -> Result<ChoiceOutcome<'c>, TransitionError> {
        let applied = apply_choice(self.catalog, &self.current.id, choice_id).and_then(|t| {
            let totals = self.session.totals_after(&t, &self.current.id, choice_id)?;
            Ok((t, totals))
        });
        let (t, totals) = match applied {
            Ok(applied) => applied,
            Err(e) => {
                warn!("Rejected choice: {e}");
                return Err(e);
            }
        };

        (self.session.total_xp, self.session.total_breach) = totals;
        self.session.history.push(Step {
            state_id: self.current.id.clone(),
            choice_id: choice_id.to_string(),
        });
        self.session.current_state_id = t.next_state.id.clone();

        info!(
            "Transition: {} -> {} via '{}' (xp {}, breach {})",
            self.current.id,
            t.next_state.id,
            choice_id,
            self.session.total_xp,
            self.session.total_breach
        );
        self.current = t.next_state;

        Ok(ChoiceOutcome {
            new_state: t.next_state,
            xp_delta: t.xp_delta,
            breach_delta: t.breach_delta,
            feedback: &t.choice.feedback,
            total_xp: self.session.total_xp,
            total_breach: self.session.total_breach,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.current.is_terminal
    }

    /// Same as a fresh [`start`](Self::start); prior totals and history are
    /// dropped.
    pub fn restart(&mut self, scenario_id: Option<&str>) {
        *self = Self::start(self.catalog, scenario_id);
    }

    pub fn current_state(&self) -> &'c ScenarioState {
        self.current
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn total_xp(&self) -> i64 {
        self.session.total_xp
    }

    pub fn total_breach(&self) -> i64 {
        self.session.total_breach
    }

    pub fn catalog(&self) -> &'c StateCatalog {
        self.catalog
    }

    pub fn debrief(&self) -> Debrief {
        Debrief {
            start_state_id: self.session.start_state_id.clone(),
            ended_at: self.current.id.clone(),
            complete: self.is_complete(),
            total_xp: self.session.total_xp,
            total_breach: self.session.total_breach,
            steps_taken: self.session.history.len(),
            max_steps: self.catalog.max_steps(&self.session.start_state_id),
        }
    }
}
