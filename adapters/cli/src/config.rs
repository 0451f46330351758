use std::{fs, path::Path};

use anyhow::{Context, Result};
use panel_cut_core::SessionConfig;

/// Reads and validates the stage table at `path`.
pub(crate) fn load_session_config(path: &Path) -> Result<SessionConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read stage table at {}", path.display()))?;
    parse_session_config(&contents)
        .with_context(|| format!("invalid stage table at {}", path.display()))
}

fn parse_session_config(contents: &str) -> Result<SessionConfig> {
    let config: SessionConfig =
        toml::from_str(contents).context("failed to parse stage table toml contents")?;
    config.validate().context("stage table failed validation")?;
    Ok(config)
}
