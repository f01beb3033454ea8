//! Host-side file I/O: catalog files and recorded sessions.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::scenario::breach::breach_simulation;
use crate::scenario::StateCatalog;
use crate::session::{Debrief, Session};

/// What `--record` writes after each round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub session: Session,
    pub debrief: Debrief,
}

/// Load a JSON catalog, or the built-in scenarios when `path` is `None`.
pub fn load_catalog(path: Option<&Path>) -> Result<StateCatalog> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read catalog {}", path.display()))?;
            let catalog = StateCatalog::from_json(&text)
                .with_context(|| format!("invalid catalog {}", path.display()))?;
            info!("Loaded catalog from {}", path.display());
            Ok(catalog)
        }
        None => breach_simulation().context("built-in catalog is inconsistent"),
    }
}

/// Write `catalog` in the format `load_catalog` reads.
pub fn export_catalog(catalog: &StateCatalog, path: &Path) -> Result<()> {
    let json = catalog.to_json()?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

pub fn write_record(path: &Path, record: &Record) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    fs::write(path, json)
        .with_context(|| format!("failed to record session to {}", path.display()))?;
    info!("Session recorded to {}", path.display());
    Ok(())
}

pub fn read_record(path: &Path) -> Result<Record> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read record {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid record {}", path.display()))
}
