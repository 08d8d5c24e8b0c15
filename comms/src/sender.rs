//! The sending end of the length-prefixed framing.

use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{LEN_TYPE_SIZE, LenType};

/// The sending end handle of the communication.
pub struct FrameSender<W>
where
    W: AsyncWrite + Unpin,
{
    tx: W,
    buf: Vec<u8>,
}

impl<W: AsyncWrite + Unpin> FrameSender<W> {
    /// Creates a new `FrameSender` instance.
    ///
    /// # Arguments
    /// * `tx` - The underlying writer.
    pub(super) fn new(tx: W) -> Self {
        Self {
            tx,
            buf: Vec::new(),
        }
    }

    /// Sends `payload` as a single length-prefixed message.
    ///
    /// The prefix and the payload are assembled into one buffer and written
    /// with a single `write_all`, so a message is never interleaved with another.
    ///
    /// # Arguments
    /// * `payload` - The raw bytes of the message.
    ///
    /// # Returns
    /// The amount of payload bytes sent or an `io::Error` on failure.
    pub async fn send(&mut self, payload: &[u8]) -> io::Result<usize> {
        let len = LenType::try_from(payload.len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("payload of {} bytes does not fit a length prefix", payload.len()),
            )
        })?;

        let Self { tx, buf } = self;

        buf.clear();
        buf.reserve(LEN_TYPE_SIZE + payload.len());
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(payload);

        tx.write_all(buf).await?;
        tx.flush().await?;

        Ok(payload.len())
    }

    /// Shuts down the writing half, the peer will observe an orderly disconnect.
    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.tx.shutdown().await
    }
}
