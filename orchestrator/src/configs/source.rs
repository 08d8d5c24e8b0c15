use std::{num::NonZeroUsize, path::PathBuf};

use serde::{Deserialize, Serialize};

/// Where the client takes its frames from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Chunks of the standard input.
    Interactive,
    /// Chunks of a binary file.
    File,
    /// One encoded frame per read from a looping capture.
    Video,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "SourceConfig::default_chunk_size")]
    pub chunk_size: NonZeroUsize,
}

impl SourceConfig {
    pub fn interactive(chunk_size: NonZeroUsize) -> Self {
        Self {
            kind: SourceKind::Interactive,
            path: None,
            chunk_size,
        }
    }

    pub fn file(path: impl Into<PathBuf>, chunk_size: NonZeroUsize) -> Self {
        Self {
            kind: SourceKind::File,
            path: Some(path.into()),
            chunk_size,
        }
    }

    pub fn video(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: SourceKind::Video,
            path: Some(path.into()),
            chunk_size: Self::default_chunk_size(),
        }
    }

    fn default_chunk_size() -> NonZeroUsize {
        NonZeroUsize::new(1024).unwrap_or(NonZeroUsize::MIN)
    }
}
