//! Ledge level editor (headless).
//!
//! Loads a level and the tile asset manifest, then either runs an editor
//! script against it or just reports what the level contains. Saving goes
//! back to the level path unless `--out` names another file.

mod editor;
mod script;

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ledge_map::assets::load_manifest_from_path;
use ledge_map::level::load_level_from_path;
use ledge_map::tilemap::DEFAULT_TILE_SIZE;
use ledge_map::TileMap;

use editor::EditorState;
use script::{load_script_from_path, run_script};

const DEFAULT_LEVEL_PATH: &str = "data/levels/0.json";
const DEFAULT_ASSETS_PATH: &str = "data/tiles.json";

#[derive(Debug, Parser)]
#[command(name = "ledge_editor", about = "Edit level files")]
struct Args {
    /// Level file to edit. Created on save if missing.
    #[arg(long, default_value = DEFAULT_LEVEL_PATH)]
    level: PathBuf,
    /// Tile asset manifest listing variant sizes per group.
    #[arg(long, default_value = DEFAULT_ASSETS_PATH)]
    assets: PathBuf,
    /// Editor command script to run.
    #[arg(long)]
    script: Option<PathBuf>,
    /// Where `save` writes. Defaults to the level path.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let manifest = load_manifest_from_path(&args.assets)?;
    let groups: Vec<String> = manifest.kinds().map(|kind| kind.to_string()).collect();
    log::info!("Tile groups: {}", groups.join(", "));

    let map = match load_level_from_path(&args.level) {
        Ok(map) => map,
        Err(err) if err.is_not_found() => {
            log::warn!("{err}; starting a new level");
            TileMap::new(DEFAULT_TILE_SIZE)
        }
        Err(err) => return Err(err.into()),
    };
    let mut editor = EditorState::new(map, manifest)?;

    if let Some(script_path) = &args.script {
        let script = load_script_from_path(script_path)?;
        let save_path = args.out.as_deref().unwrap_or(&args.level);
        let summary = run_script(&mut editor, &script, save_path)?;
        log::info!(
            "Script {} done: {} ticks, {} placed, {} removed, {} retiled, {} saves",
            script_path.display(),
            summary.ticks,
            summary.placed,
            summary.removed,
            summary.retiled,
            summary.saves
        );
    }

    let preview = editor.preview();
    log::info!(
        "Level has {} grid tiles and {} decorations (tile size {}), brush {} #{} at ({}, {})",
        editor.map.grid_len(),
        editor.map.off_grid_tiles().len(),
        editor.map.tile_size(),
        preview.kind,
        preview.variant,
        preview.pos.x,
        preview.pos.y
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
