//! Breach simulation: a branching security-awareness drill.
//!
//! - `scenario` - states, choices and the read-only [`StateCatalog`]
//! - `engine` - the stateless [`apply_choice`] transition
//! - `session` - per play-through totals and the [`SessionController`]
//! - `game` - a line-based terminal front end
//! - `store` - catalog files and recorded sessions

pub mod engine;
pub mod error;
pub mod game;
pub mod scenario;
pub mod session;
pub mod store;

pub use engine::{apply_choice, Transition};
pub use error::{CatalogError, ReplayError, TransitionError};
pub use scenario::{Choice, ScenarioState, StateCatalog};
pub use session::{ChoiceOutcome, Debrief, Session, SessionController, Step};
