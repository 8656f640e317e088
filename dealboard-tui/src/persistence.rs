//! Persisted UI state — the active panel survives restarts.
//!
//! Stored as JSON under the user config dir. Selection sets are not
//! persisted: they reset to "everything" on each fresh data set anyway.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::app::{AppState, Panel};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    pub active_panel: Panel,
}

pub fn state_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dealboard")
        .join("state.json")
}

pub fn load(path: &Path) -> Option<PersistedState> {
    let text = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}

pub fn save(path: &Path, state: &PersistedState) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state).expect("state serializes");
    std::fs::write(path, json)
}

pub fn apply(app: &mut AppState, persisted: Option<PersistedState>) {
    if let Some(state) = persisted {
        app.active_panel = state.active_panel;
    }
}

pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        active_panel: app.active_panel,
    }
}
