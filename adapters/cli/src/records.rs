use std::{fs, io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use panel_cut_system_records::Leaderboard;

/// Loads the leaderboard at `path`, starting empty when the file is absent.
pub(crate) fn load_leaderboard(path: &Path) -> Result<Leaderboard> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Leaderboard::default()),
        Err(error) => {
            return Err(error)
                .with_context(|| format!("failed to read leaderboard at {}", path.display()))
        }
    };
    Leaderboard::from_json(&contents)
        .with_context(|| format!("failed to parse leaderboard at {}", path.display()))
}

/// Writes the leaderboard to `path`, creating parent directories as needed.
pub(crate) fn save_leaderboard(path: &Path, board: &Leaderboard) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = board.to_json().context("failed to encode leaderboard")?;
    fs::write(path, json)
        .with_context(|| format!("failed to write leaderboard at {}", path.display()))
}
