//! Stateless transition function over a catalog.

use log::trace;

use crate::error::TransitionError;
use crate::scenario::{Choice, ScenarioState, StateCatalog};

/// Raw result of one transition. Nothing is accumulated here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<'c> {
    pub next_state: &'c ScenarioState,
    /// The edge that was taken; carries the feedback text.
    pub choice: &'c Choice,
    pub xp_delta: i64,
    pub breach_delta: i64,
}

/// Apply `choice_id` to `state_id`.
///
/// Fails for unknown states, for choices the state does not offer (which
/// covers every terminal state) and for choices whose target is missing from
/// the catalog. There is no fallback target.
pub fn apply_choice<'c>(
    catalog: &'c StateCatalog,
    state_id: &str,
    choice_id: &str,
) -> Result<Transition<'c>, TransitionError> {
    let state = catalog
        .get_state(state_id)
        .ok_or_else(|| TransitionError::UnknownState(state_id.to_string()))?;

    let choice = state
        .choice(choice_id)
        .ok_or_else(|| TransitionError::UnknownChoice {
            state_id: state_id.to_string(),
            choice_id: choice_id.to_string(),
        })?;

    let next_state = catalog.get_state(&choice.next_state_id).ok_or_else(|| {
        TransitionError::DanglingTarget {
            state_id: state_id.to_string(),
            choice_id: choice_id.to_string(),
            next_state_id: choice.next_state_id.clone(),
        }
    })?;

    trace!(
        "{state_id} --{choice_id}--> {} (xp {:+}, breach {:+})",
        next_state.id,
        choice.xp_delta,
        choice.breach_delta
    );

    Ok(Transition {
        next_state,
        choice,
        xp_delta: choice.xp_delta,
        breach_delta: choice.breach_delta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::breach::breach_simulation;

    #[test]
    fn test_report_it() {
        let catalog = breach_simulation().unwrap();
        let t = apply_choice(&catalog, "phishing_received", "report_it").unwrap();
        assert_eq!(t.next_state.id, "reported_safe");
        assert_eq!((t.xp_delta, t.breach_delta), (50, -10));
        assert!(t.next_state.is_terminal);
    }

    #[test]
    fn test_click_link() {
        let catalog = breach_simulation().unwrap();
        let t = apply_choice(&catalog, "phishing_received", "click_link").unwrap();
        assert_eq!(t.next_state.id, "malware_triggered");
        assert_eq!((t.xp_delta, t.breach_delta), (0, 35));
        assert!(!t.next_state.is_terminal);
    }

    #[test]
    fn test_deterministic() {
        let catalog = breach_simulation().unwrap();
        for state in catalog.states() {
            for choice in &state.choices {
                let a = apply_choice(&catalog, &state.id, &choice.id).unwrap();
                let b = apply_choice(&catalog, &state.id, &choice.id).unwrap();
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn test_illegal_moves() {
        let catalog = breach_simulation().unwrap();

        let err = apply_choice(&catalog, "phishing_received", "nonexistent_choice").unwrap_err();
        assert!(matches!(err, TransitionError::UnknownChoice { .. }));

        let err = apply_choice(&catalog, "not_a_state", "report_it").unwrap_err();
        assert_eq!(err, TransitionError::UnknownState("not_a_state".into()));

        // terminal states offer nothing
        let err = apply_choice(&catalog, "reported_safe", "report_it").unwrap_err();
        assert!(matches!(err, TransitionError::UnknownChoice { .. }));

        // a choice id that only exists on another state
        let err = apply_choice(&catalog, "phishing_received", "disconnect").unwrap_err();
        assert!(matches!(err, TransitionError::UnknownChoice { .. }));
    }

    #[test]
    fn test_dangling_target_is_reported() {
        let catalog = StateCatalog::new_unchecked(
            vec![ScenarioState {
                id: "start".into(),
                title: "Start".into(),
                body: String::new(),
                is_terminal: false,
                choices: vec![Choice {
                    id: "jump".into(),
                    label: "Jump".into(),
                    next_state_id: "void".into(),
                    xp_delta: 1,
                    breach_delta: 1,
                    feedback: String::new(),
                }],
            }],
            vec!["start".into()],
            "start",
        );
        assert!(catalog.validate().is_err());

        let err = apply_choice(&catalog, "start", "jump").unwrap_err();
        assert_eq!(
            err,
            TransitionError::DanglingTarget {
                state_id: "start".into(),
                choice_id: "jump".into(),
                next_state_id: "void".into(),
            }
        );
    }
}
