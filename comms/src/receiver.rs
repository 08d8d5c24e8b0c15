use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{LEN_TYPE_SIZE, LenType};

/// The receiving end handle of the communication.
pub struct FrameReceiver<R: AsyncRead + Unpin> {
    rx: R,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> FrameReceiver<R> {
    /// Creates a new `FrameReceiver` instance.
    ///
    /// # Arguments
    /// * `rx` - The underlying reader.
    pub(super) fn new(rx: R) -> Self {
        Self {
            rx,
            buf: Vec::new(),
        }
    }

    /// Waits to receive a new message, returning an owned copy of its payload.
    ///
    /// # Returns
    /// `Ok(None)` if the peer closed the connection before a new message started,
    /// the payload otherwise, or an `io::Error` on a malformed or truncated read.
    pub async fn recv(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut buf = std::mem::take(&mut self.buf);
        let res = self.recv_into(&mut buf).await.map(|x| x.map(<[u8]>::to_vec));
        self.buf = buf;
        res
    }

    /// Waits to receive a new message from the inner receiver.
    ///
    /// # Arguments
    /// * `buf` - The buffer to read the payload into, the returned slice
    ///           borrows from it.
    ///
    /// # Returns
    /// `Ok(None)` on an orderly disconnect, the payload on success or an
    /// `io::Error` on failure.
    pub async fn recv_into<'buf>(&mut self, buf: &'buf mut Vec<u8>) -> io::Result<Option<&'buf [u8]>> {
        let mut size_buf = [0; LEN_TYPE_SIZE];

        if !self.read_prefix(&mut size_buf).await? {
            return Ok(None);
        }

        let len = LenType::from_be_bytes(size_buf) as usize;

        buf.clear();
        buf.resize(len, 0);
        self.rx.read_exact(buf).await?;

        Ok(Some(buf.as_slice()))
    }

    /// Fills `prefix` with the length header of the next message.
    ///
    /// # Returns
    /// `false` if the stream ended before the first byte of the header, an
    /// `UnexpectedEof` error if it ended in the middle of it.
    async fn read_prefix(&mut self, prefix: &mut [u8; LEN_TYPE_SIZE]) -> io::Result<bool> {
        let mut filled = 0;

        while filled < LEN_TYPE_SIZE {
            match self.rx.read(&mut prefix[filled..]).await? {
                0 if filled == 0 => return Ok(false),
                0 => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("connection closed after {filled} of {LEN_TYPE_SIZE} length bytes"),
                    ));
                }
                n => filled += n,
            }
        }

        Ok(true)
    }
}
