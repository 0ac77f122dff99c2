//! Scripted editor sessions.
//!
//! A script is a JSON list of editor commands run in order:
//!
//! ```json
//! { "commands": [
//!     { "op": "select", "kind": "grass", "variant": 0 },
//!     { "op": "pointer", "x": 40.0, "y": 100.0 },
//!     { "op": "press", "button": "left" },
//!     { "op": "tick", "repeat": 3 },
//!     { "op": "release", "button": "left" },
//!     { "op": "autotile" },
//!     { "op": "save" }
//! ] }
//! ```

use crate::editor::EditorState;
use glam::Vec2;
use ledge_core::input::MouseBtn;
use ledge_map::{AssetError, LevelError, TileAssets, TileKind};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read editor script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse editor script {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("editor script validation failed: {0}")]
    Invalid(String),
    #[error("command {index} failed: {source}")]
    Asset {
        index: usize,
        #[source]
        source: AssetError,
    },
    #[error("command {index} failed: {source}")]
    Level {
        index: usize,
        #[source]
        source: LevelError,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditorScript {
    pub commands: Vec<EditorCommand>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditorCommand {
    Select { kind: TileKind, variant: u32 },
    NextGroup,
    PrevGroup,
    NextVariant,
    PrevVariant,
    ToggleGrid,
    Scroll { dx: f32, dy: f32 },
    Pointer { x: f32, y: f32 },
    Press { button: MouseBtn },
    Release { button: MouseBtn },
    /// Press, one tick, release.
    Click { button: MouseBtn },
    Tick {
        #[serde(default = "default_repeat")]
        repeat: u32,
    },
    Autotile,
    Save,
}

/// Totals over a script run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub ticks: u32,
    pub placed: usize,
    pub removed: usize,
    pub retiled: usize,
    pub saves: usize,
}

pub fn load_script_from_path(path: &Path) -> Result<EditorScript, ScriptError> {
    let raw = fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let script: EditorScript = serde_json::from_str(&raw).map_err(|source| ScriptError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if script.commands.is_empty() {
        return Err(ScriptError::Invalid("commands list is empty".to_string()));
    }
    Ok(script)
}

/// Run every command against `editor`. `save` commands write to `save_path`.
/// Stops at the first failing command.
pub fn run_script<A: TileAssets>(
    editor: &mut EditorState<A>,
    script: &EditorScript,
    save_path: &Path,
) -> Result<ScriptSummary, ScriptError> {
    let mut summary = ScriptSummary::default();
    for (index, command) in script.commands.iter().enumerate() {
        log::debug!("editor command {index}: {command:?}");
        let asset_err = |source| ScriptError::Asset { index, source };
        match *command {
            EditorCommand::Select { kind, variant } => {
                editor.select(kind, variant).map_err(asset_err)?;
            }
            EditorCommand::NextGroup => editor.cycle_group(true),
            EditorCommand::PrevGroup => editor.cycle_group(false),
            EditorCommand::NextVariant => editor.cycle_variant(true),
            EditorCommand::PrevVariant => editor.cycle_variant(false),
            EditorCommand::ToggleGrid => editor.toggle_grid(),
            EditorCommand::Scroll { dx, dy } => editor.scroll_by(Vec2::new(dx, dy)),
            EditorCommand::Pointer { x, y } => editor.input.mouse_position = (x, y),
            EditorCommand::Press { button } => editor.input.mouse_down(button),
            EditorCommand::Release { button } => editor.input.mouse_up(button),
            EditorCommand::Click { button } => {
                editor.input.mouse_down(button);
                let outcome = editor.tick().map_err(asset_err)?;
                summary.ticks += 1;
                summary.placed += outcome.placed;
                summary.removed += outcome.removed;
                editor.input.mouse_up(button);
            }
            EditorCommand::Tick { repeat } => {
                for _ in 0..repeat {
                    let outcome = editor.tick().map_err(asset_err)?;
                    summary.ticks += 1;
                    summary.placed += outcome.placed;
                    summary.removed += outcome.removed;
                }
            }
            EditorCommand::Autotile => summary.retiled += editor.auto_tile(),
            EditorCommand::Save => {
                editor
                    .save(save_path)
                    .map_err(|source| ScriptError::Level { index, source })?;
                summary.saves += 1;
                log::info!("Saved level {}", save_path.display());
            }
        }
    }
    Ok(summary)
}

const fn default_repeat() -> u32 {
    1
}
