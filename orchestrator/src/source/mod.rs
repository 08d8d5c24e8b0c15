//! The frames a client feeds into a session.

mod chunked;
mod video;

use std::{io, num::NonZeroUsize, path::Path};

use log::info;
use tokio::{
    fs::File,
    io::{AsyncRead, Stdin},
};

use crate::{
    SessionErr,
    configs::{SourceConfig, SourceKind},
};

pub use chunked::Chunked;
pub use video::{Capture, FrameDirectory, VideoSource};

/// Any readable stream usable as an interactive source.
pub type Interactive = Box<dyn AsyncRead + Unpin + Send>;

/// A sequence of opaque frames.
///
/// Interactive and file sources report exhaustion with `None`. Video sources
/// wrap around and never do.
pub enum FrameSource {
    Interactive(Chunked<Interactive>),
    File(Chunked<File>),
    Video(VideoSource),
}

impl FrameSource {
    /// Opens the source described by `config`.
    ///
    /// # Returns
    /// `SourceUnavailable` if the file or clip can not be opened.
    pub async fn open(config: &SourceConfig) -> Result<Self, SessionErr> {
        let chunk_size = config.chunk_size;

        let source = match config.kind {
            SourceKind::Interactive => Self::interactive(chunk_size),
            SourceKind::File => Self::file(required_path(config)?, chunk_size).await?,
            SourceKind::Video => {
                let dir = required_path(config)?;
                let clip = FrameDirectory::open(dir)
                    .await
                    .map_err(|source| unavailable(dir, source))?;

                Self::Video(VideoSource::new(Box::new(clip)))
            }
        };

        info!("frame source ready: {:?}", config.kind);
        Ok(source)
    }

    /// A source reading chunks from the standard input.
    pub fn interactive(chunk_size: NonZeroUsize) -> Self {
        let stdin: Stdin = tokio::io::stdin();
        Self::from_reader(Box::new(stdin), chunk_size)
    }

    /// An interactive source over any stream.
    pub fn from_reader(reader: Interactive, chunk_size: NonZeroUsize) -> Self {
        Self::Interactive(Chunked::new(reader, chunk_size))
    }

    /// A source reading chunks from the binary file at `path`.
    pub async fn file(path: &Path, chunk_size: NonZeroUsize) -> Result<Self, SessionErr> {
        let file = File::open(path)
            .await
            .map_err(|source| unavailable(path, source))?;

        Ok(Self::File(Chunked::new(file, chunk_size)))
    }

    /// A looping source over `capture`.
    pub fn video(capture: Box<dyn Capture>) -> Self {
        Self::Video(VideoSource::new(capture))
    }

    /// Reads the next frame.
    ///
    /// # Returns
    /// `None` when an interactive or file source is exhausted.
    pub async fn read_frame(&mut self) -> io::Result<Option<Vec<u8>>> {
        match self {
            Self::Interactive(chunks) => chunks.next_chunk().await,
            Self::File(chunks) => chunks.next_chunk().await,
            Self::Video(video) => video.next_frame().await.map(Some),
        }
    }

    /// Starts the sequence over, a no-op for interactive sources.
    pub async fn reset(&mut self) -> io::Result<()> {
        match self {
            Self::Interactive(_) => Ok(()),
            Self::File(chunks) => chunks.rewind().await,
            Self::Video(video) => video.rewind().await,
        }
    }
}

fn required_path(config: &SourceConfig) -> Result<&Path, SessionErr> {
    config.path.as_deref().ok_or_else(|| {
        SessionErr::InvalidConfig(format!("a {:?} source requires a path", config.kind))
    })
}

fn unavailable(path: &Path, source: io::Error) -> SessionErr {
    SessionErr::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    }
}
