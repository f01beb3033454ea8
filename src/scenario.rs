//! Scenario graph: states, choices and the catalog that holds them.

pub mod breach;
pub mod catalog;
pub mod state;

pub use catalog::StateCatalog;
pub use state::{Choice, ScenarioState};
