use serde::{Deserialize, Serialize};

/// A single node in the scenario graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioState {
    /// Unique identifier for this state (e.g. "phishing_received").
    pub id: String,
    /// Short label shown above the narrative.
    pub title: String,
    /// The situation the player is facing.
    pub body: String,
    /// If true, the play-through ends here. Authoritative over `choices`.
    #[serde(default)]
    pub is_terminal: bool,
    /// Outgoing edges, in display order. Empty iff `is_terminal`.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl ScenarioState {
    /// Find an outgoing choice by id.
    pub fn choice(&self, choice_id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }
}

/// A labelled edge between two states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Unique among the owning state's choices only.
    pub id: String,
    pub label: String,
    pub next_state_id: String,
    /// Experience awarded for taking this choice.
    #[serde(default)]
    pub xp_delta: i64,
    /// Change to the breach accumulator. Positive is worse.
    #[serde(default)]
    pub breach_delta: i64,
    /// Shown right after the choice is taken.
    pub feedback: String,
}
