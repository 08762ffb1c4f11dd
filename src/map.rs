//! The pre-rendered trip-flow map, read as opaque HTML.

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapArtifact {
    Loaded(String),
    /// The file does not exist. Shown to the user as a warning.
    Missing(PathBuf),
}

impl MapArtifact {
    pub fn html(&self) -> Option<&str> {
        match self {
            MapArtifact::Loaded(html) => Some(html),
            MapArtifact::Missing(_) => None,
        }
    }
}

/// Reads the map file verbatim. A missing file is not an error; any other
/// I/O failure is.
pub fn load_map(path: &Path) -> Result<MapArtifact> {
    match std::fs::read_to_string(path) {
        Ok(html) => {
            debug!(path = %path.display(), bytes = html.len(), "Map loaded");
            Ok(MapArtifact::Loaded(html))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "Map file not found");
            Ok(MapArtifact::Missing(path.to_path_buf()))
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read map {}", path.display())),
    }
}
