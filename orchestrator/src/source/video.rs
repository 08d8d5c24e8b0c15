use std::{
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use log::debug;
use tokio::fs;

/// A device or clip yielding one encoded image per call.
#[async_trait]
pub trait Capture: Send {
    /// Returns the next encoded frame, `None` once the clip is over.
    async fn grab(&mut self) -> io::Result<Option<Vec<u8>>>;

    /// Moves back to the first frame.
    async fn rewind(&mut self) -> io::Result<()>;
}

/// A clip stored as a directory of already encoded images, played in name order.
pub struct FrameDirectory {
    frames: Vec<PathBuf>,
    next: usize,
}

impl FrameDirectory {
    /// Opens the clip at `dir`.
    ///
    /// # Returns
    /// An error if the directory can not be listed or holds no files.
    pub async fn open(dir: &Path) -> io::Result<Self> {
        let mut entries = fs::read_dir(dir).await?;
        let mut frames = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                frames.push(entry.path());
            }
        }

        if frames.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no frames found in {}", dir.display()),
            ));
        }

        frames.sort();
        debug!("opened clip of {} frames at {}", frames.len(), dir.display());

        Ok(Self { frames, next: 0 })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[async_trait]
impl Capture for FrameDirectory {
    async fn grab(&mut self) -> io::Result<Option<Vec<u8>>> {
        let Some(path) = self.frames.get(self.next) else {
            return Ok(None);
        };

        let frame = fs::read(path).await?;
        self.next += 1;
        Ok(Some(frame))
    }

    async fn rewind(&mut self) -> io::Result<()> {
        self.next = 0;
        Ok(())
    }
}

/// Wraps a `Capture` so it loops forever.
pub struct VideoSource {
    capture: Box<dyn Capture>,
}

impl VideoSource {
    pub fn new(capture: Box<dyn Capture>) -> Self {
        Self { capture }
    }

    /// Returns the next frame, starting over once the clip is exhausted.
    ///
    /// # Returns
    /// Always a frame, or an `InvalidData` error if the capture yields
    /// nothing even right after rewinding.
    pub async fn next_frame(&mut self) -> io::Result<Vec<u8>> {
        if let Some(frame) = self.capture.grab().await? {
            return Ok(frame);
        }

        debug!("clip exhausted, rewinding");
        self.capture.rewind().await?;

        self.capture.grab().await?.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "video capture yields no frame after rewinding",
            )
        })
    }

    pub async fn rewind(&mut self) -> io::Result<()> {
        self.capture.rewind().await
    }
}
