//! Board persistence and backup naming.
//!
//! The board lives at `~/.micro-trello/micro-trello-board.json`. Loading is
//! forgiving: a missing or unreadable file yields an empty board instead of
//! an error, so the UI always has something to render. Saves are atomic
//! (write to temp file, then rename) to prevent corruption.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::board::BoardState;

const BOARD_DIR: &str = ".micro-trello";
const BOARD_FILE: &str = "micro-trello-board.json";

/// Get the path to the persisted board file.
fn board_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(BOARD_DIR).join(BOARD_FILE))
}

/// Load the persisted board, or an empty one when nothing usable is on disk.
pub fn load_board() -> BoardState {
    match board_file_path() {
        Some(path) => {
            tracing::info!("loading board from {}", path.display());
            load_board_from_path(&path)
        }
        None => {
            tracing::warn!("could not determine home directory, starting with an empty board");
            BoardState::default()
        }
    }
}

/// Write the full board state to disk.
pub fn save_board(state: &BoardState) -> std::io::Result<()> {
    let path = board_file_path().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        )
    })?;
    save_board_to_path(&path, state)
}

/// Render the board as the pretty-printed backup JSON the user downloads.
pub fn export_board_json(state: &BoardState) -> serde_json::Result<String> {
    serde_json::to_string_pretty(state)
}

/// Suggested file name for a backup, stamped with today's UTC date.
pub fn export_file_name() -> String {
    export_file_name_at(Utc::now())
}

// --- Internal functions that accept a path or clock (for testing) ---

fn load_board_from_path(path: &Path) -> BoardState {
    if !path.exists() {
        return BoardState::default();
    }

    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) => {
            tracing::warn!("could not read board file {}: {}", path.display(), err);
            return BoardState::default();
        }
    };

    match serde_json::from_str(&json) {
        Ok(board) => board,
        Err(err) => {
            tracing::warn!("board file {} is corrupt: {}", path.display(), err);
            BoardState::default()
        }
    }
}

fn save_board_to_path(path: &Path, state: &BoardState) -> std::io::Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string(state)?;

    // Atomic write: write to temp file, then rename
    let temp_path = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)?;

    Ok(())
}

fn export_file_name_at(now: DateTime<Utc>) -> String {
    format!("micro-trello-backup-{}.json", now.format("%Y-%m-%d"))
}
