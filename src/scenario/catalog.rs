use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::scenario::state::{Choice, ScenarioState};

/// The fixed scenario graph. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct StateCatalog {
    /// States in declaration order.
    states: Vec<ScenarioState>,
    /// state id -> position in `states`
    index: HashMap<String, usize>,
    start_ids: Vec<String>,
    default_start: String,
}

/// On-disk shape of a catalog.
#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    default_start: String,
    start_ids: Vec<String>,
    states: Vec<ScenarioState>,
}

/// Identifiers are lowercase snake case and must contain a letter, so a
/// typed number always means a position in the choice list.
fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9_]*[a-z][a-z0-9_]*$").unwrap())
}

fn check_id(id: &str) -> Result<(), CatalogError> {
    if id_pattern().is_match(id) {
        Ok(())
    } else {
        Err(CatalogError::InvalidId(id.to_string()))
    }
}

impl StateCatalog {
    /// Build a catalog and check every structural invariant.
    ///
    /// `default_start` must be one of `start_ids`; all start ids must name
    /// non-terminal states.
    pub fn new(
        states: Vec<ScenarioState>,
        start_ids: Vec<String>,
        default_start: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(states.len());
        for (i, state) in states.iter().enumerate() {
            if index.insert(state.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateState(state.id.clone()));
            }
        }

        let catalog = Self {
            states,
            index,
            start_ids,
            default_start: default_start.into(),
        };
        catalog.validate()?;

        debug!(
            "Catalog ready: {} states, {} scenarios, default '{}'",
            catalog.states.len(),
            catalog.start_ids.len(),
            catalog.default_start
        );
        Ok(catalog)
    }

    /// Skip validation. Only for exercising failure paths in tests.
    #[cfg(test)]
    pub(crate) fn new_unchecked(
        states: Vec<ScenarioState>,
        start_ids: Vec<String>,
        default_start: &str,
    ) -> Self {
        let index = states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        Self {
            states,
            index,
            start_ids,
            default_start: default_start.to_string(),
        }
    }

    /// Parse a JSON catalog (see `to_json` for the shape).
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.states, file.start_ids, file.default_start)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        let file = CatalogFile {
            default_start: self.default_start.clone(),
            start_ids: self.start_ids.clone(),
            states: self.states.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Re-check identifiers, terminality, sibling uniqueness, references and
    /// start ids.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for state in &self.states {
            check_id(&state.id)?;

            if state.is_terminal && !state.choices.is_empty() {
                return Err(CatalogError::TerminalWithChoices(state.id.clone()));
            }
            if !state.is_terminal && state.choices.is_empty() {
                return Err(CatalogError::DeadEnd(state.id.clone()));
            }

            let mut seen = HashSet::new();
            for choice in &state.choices {
                check_id(&choice.id)?;
                if !seen.insert(choice.id.as_str()) {
                    return Err(CatalogError::DuplicateChoice {
                        state_id: state.id.clone(),
                        choice_id: choice.id.clone(),
                    });
                }
                if !self.index.contains_key(&choice.next_state_id) {
                    return Err(CatalogError::DanglingChoice {
                        state_id: state.id.clone(),
                        choice_id: choice.id.clone(),
                        next_state_id: choice.next_state_id.clone(),
                    });
                }
            }
        }

        if self.start_ids.is_empty() {
            return Err(CatalogError::NoStarts);
        }
        for id in &self.start_ids {
            match self.get_state(id) {
                None => return Err(CatalogError::UnknownStart(id.clone())),
                Some(state) if state.is_terminal => {
                    return Err(CatalogError::TerminalStart(id.clone()))
                }
                Some(_) => {}
            }
        }
        if !self.start_ids.contains(&self.default_start) {
            return Err(CatalogError::DefaultNotListed(self.default_start.clone()));
        }

        Ok(())
    }

    pub fn get_state(&self, state_id: &str) -> Option<&ScenarioState> {
        self.index.get(state_id).map(|&i| &self.states[i])
    }

    /// Look up a choice on a state. `None` for unknown states, unknown
    /// choices, and every choice on a terminal state.
    pub fn get_choice(&self, state_id: &str, choice_id: &str) -> Option<&Choice> {
        self.get_state(state_id)?.choice(choice_id)
    }

    /// Curated entry points, in display order.
    pub fn list_scenario_start_ids(&self) -> &[String] {
        &self.start_ids
    }

    pub fn default_start_id(&self) -> &str {
        &self.default_start
    }

    /// Resolve a starting state. Unknown or missing ids fall back to the
    /// default start, so this never fails.
    pub fn get_initial_state(&self, scenario_id: Option<&str>) -> &ScenarioState {
        if let Some(state) = scenario_id.and_then(|id| self.get_state(id)) {
            return state;
        }
        if let Some(id) = scenario_id {
            debug!("Unknown scenario '{id}', using '{}'", self.default_start);
        }
        // default_start is checked to exist in `validate`
        &self.states[self.index[&self.default_start]]
    }

    pub fn states(&self) -> impl Iterator<Item = &ScenarioState> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Count the non-terminal states on the longest path from `start_id`
    /// (i.e. the most choices a player can make before the play-through
    /// ends). Unknown ids count as 0.
    ///
    /// Exact on acyclic graphs. Back edges count as 0 and each state's
    /// length is computed once, so on cyclic graphs this is a lower bound.
    pub fn max_steps(&self, start_id: &str) -> usize {
        let mut on_path = HashSet::new();
        let mut memo = HashMap::new();
        self.longest_path(start_id, &mut on_path, &mut memo)
    }

    fn longest_path<'a>(
        &'a self,
        state_id: &'a str,
        on_path: &mut HashSet<&'a str>,
        memo: &mut HashMap<&'a str, usize>,
    ) -> usize {
        let state = match self.get_state(state_id) {
            Some(s) => s,
            None => return 0,
        };
        if state.is_terminal {
            return 0;
        }
        if let Some(&steps) = memo.get(state_id) {
            return steps;
        }
        if !on_path.insert(state_id) {
            return 0;
        }
        let max_child = state
            .choices
            .iter()
            .map(|c| self.longest_path(c.next_state_id.as_str(), on_path, memo))
            .max()
            .unwrap_or(0);
        on_path.remove(state_id);
        memo.insert(state_id, 1 + max_child);
        1 + max_child
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(id: &str, choices: Vec<Choice>) -> ScenarioState {
        ScenarioState {
            id: id.into(),
            title: id.to_uppercase(),
            body: format!("You are at {id}."),
            is_terminal: choices.is_empty(),
            choices,
        }
    }

    fn choice(id: &str, next: &str) -> Choice {
        Choice {
            id: id.into(),
            label: id.into(),
            next_state_id: next.into(),
            xp_delta: 10,
            breach_delta: 5,
            feedback: format!("took {id}"),
        }
    }

    fn small() -> StateCatalog {
        StateCatalog::new(
            vec![
                state("start", vec![choice("go", "middle"), choice("quit", "end")]),
                state("middle", vec![choice("go", "end"), choice("back", "start")]),
                state("end", vec![]),
            ],
            vec!["start".into()],
            "start",
        )
        .unwrap()
    }

    #[test]
    fn test_lookups() {
        let catalog = small();
        assert_eq!(catalog.get_state("middle").unwrap().title, "MIDDLE");
        assert!(catalog.get_state("nowhere").is_none());
        assert_eq!(catalog.get_choice("start", "go").unwrap().next_state_id, "middle");
        assert!(catalog.get_choice("start", "back").is_none());
        assert!(catalog.get_choice("nowhere", "go").is_none());
        assert!(catalog.get_choice("end", "go").is_none());
    }

    #[test]
    fn test_sibling_choice_ids_are_scoped_to_state() {
        let catalog = small();
        assert_eq!(catalog.get_choice("start", "go").unwrap().next_state_id, "middle");
        assert_eq!(catalog.get_choice("middle", "go").unwrap().next_state_id, "end");
    }

    #[test]
    fn test_initial_state_falls_back() {
        let catalog = small();
        assert_eq!(catalog.get_initial_state(None).id, "start");
        assert_eq!(catalog.get_initial_state(Some("middle")).id, "middle");
        assert_eq!(catalog.get_initial_state(Some("typo")).id, "start");
        assert_eq!(catalog.get_initial_state(Some("")).id, "start");
    }

    #[test]
    fn test_max_steps_cuts_cycles() {
        let catalog = small();
        // start -> middle -> end, the back edge is ignored
        assert_eq!(catalog.max_steps("start"), 2);
        assert_eq!(catalog.max_steps("end"), 0);
        assert_eq!(catalog.max_steps("nowhere"), 0);
    }

    #[test]
    fn test_rejects_dangling_choice() {
        let err = StateCatalog::new(
            vec![state("start", vec![choice("go", "missing")])],
            vec!["start".into()],
            "start",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::DanglingChoice { ref next_state_id, .. } if next_state_id == "missing"
        ));
    }

    #[test]
    fn test_rejects_terminal_flag_mismatch() {
        let mut dead_end = state("start", vec![]);
        dead_end.is_terminal = false;
        let err = StateCatalog::new(vec![dead_end], vec!["start".into()], "start").unwrap_err();
        assert!(matches!(err, CatalogError::DeadEnd(_)));

        let mut with_choices = state("start", vec![choice("go", "start")]);
        with_choices.is_terminal = true;
        let err = StateCatalog::new(vec![with_choices], vec!["start".into()], "start").unwrap_err();
        assert!(matches!(err, CatalogError::TerminalWithChoices(_)));
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = StateCatalog::new(
            vec![state("end", vec![]), state("end", vec![])],
            vec!["end".into()],
            "end",
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateState(_)));

        let err = StateCatalog::new(
            vec![
                state("start", vec![choice("go", "end"), choice("go", "end")]),
                state("end", vec![]),
            ],
            vec!["start".into()],
            "start",
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateChoice { .. }));
    }

    #[test]
    fn test_rejects_bad_starts() {
        let states = || vec![state("start", vec![choice("go", "end")]), state("end", vec![])];

        let err = StateCatalog::new(states(), vec![], "start").unwrap_err();
        assert!(matches!(err, CatalogError::NoStarts));

        let err = StateCatalog::new(states(), vec!["end".into()], "end").unwrap_err();
        assert!(matches!(err, CatalogError::TerminalStart(_)));

        let err = StateCatalog::new(states(), vec!["ghost".into()], "ghost").unwrap_err();
        assert!(matches!(err, CatalogError::UnknownStart(_)));

        let err = StateCatalog::new(states(), vec!["start".into()], "elsewhere").unwrap_err();
        assert!(matches!(err, CatalogError::DefaultNotListed(_)));
    }

    #[test]
    fn test_rejects_malformed_ids() {
        let err = StateCatalog::new(
            vec![state("Start Here", vec![])],
            vec!["Start Here".into()],
            "Start Here",
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidId(ref id) if id == "Start Here"));
    }

    #[test]
    fn test_id_pattern() {
        for id in ["start", "report_it", "step_2", "2fa_prompt"] {
            assert!(check_id(id).is_ok(), "{id}");
        }
        for id in ["", "2", "12", "_", "Start", "has space", "dash-ed"] {
            assert!(check_id(id).is_err(), "{id}");
        }
    }

    #[test]
    fn test_rejects_numeric_choice_id() {
        let err = StateCatalog::new(
            vec![state("start", vec![choice("2", "end")]), state("end", vec![])],
            vec!["start".into()],
            "start",
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidId(ref id) if id == "2"));
    }

    #[test]
    fn test_max_steps_on_wide_ladder() {
        // s_i -> s_{i+1} and s_{i+2}: exponentially many paths
        let n = 80;
        let mut states: Vec<ScenarioState> = (0..n)
            .map(|i| {
                let mut choices = vec![choice("one", &format!("s_{}", i + 1))];
                if i + 2 <= n {
                    choices.push(choice("two", &format!("s_{}", i + 2)));
                }
                state(&format!("s_{i}"), choices)
            })
            .collect();
        states.push(state(&format!("s_{n}"), vec![]));
        let catalog = StateCatalog::new(states, vec!["s_0".into()], "s_0").unwrap();

        assert_eq!(catalog.max_steps("s_0"), n);
        assert_eq!(catalog.max_steps("s_40"), n - 40);
    }

    #[test]
    fn test_json_through_file() {
        use std::io::Write;

        let json = small().to_json().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        let loaded = StateCatalog::from_json(&text).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.default_start_id(), "start");
        let ids: Vec<&str> = loaded.states().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["start", "middle", "end"]);
        assert_eq!(loaded.get_choice("middle", "back").unwrap().xp_delta, 10);
    }

    #[test]
    fn test_json_defaults_and_parse_errors() {
        let json = r#"{
            "default_start": "a",
            "start_ids": ["a"],
            "states": [
                {"id": "a", "title": "A", "body": "",
                 "choices": [{"id": "x", "label": "X", "next_state_id": "b", "feedback": ""}]},
                {"id": "b", "title": "B", "body": "", "is_terminal": true}
            ]
        }"#;
        let catalog = StateCatalog::from_json(json).unwrap();
        let x = catalog.get_choice("a", "x").unwrap();
        assert_eq!((x.xp_delta, x.breach_delta), (0, 0));

        let err = StateCatalog::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }
}
