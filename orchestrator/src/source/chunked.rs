use std::{io, io::SeekFrom, num::NonZeroUsize};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

/// Splits a byte stream into frames of a fixed size.
pub struct Chunked<R> {
    reader: R,
    chunk_size: NonZeroUsize,
}

impl<R: AsyncRead + Unpin> Chunked<R> {
    pub fn new(reader: R, chunk_size: NonZeroUsize) -> Self {
        Self { reader, chunk_size }
    }

    /// Reads the next chunk.
    ///
    /// Short reads are retried until the chunk is full or the stream ends,
    /// so only the last chunk can be shorter than `chunk_size`.
    ///
    /// # Returns
    /// `None` once the stream is exhausted.
    pub async fn next_chunk(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut buf = vec![0; self.chunk_size.get()];
        let mut filled = 0;

        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]).await {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        if filled == 0 {
            return Ok(None);
        }

        buf.truncate(filled);
        Ok(Some(buf))
    }
}

impl<R: AsyncRead + AsyncSeek + Unpin> Chunked<R> {
    /// Moves back to the first byte of the stream.
    pub async fn rewind(&mut self) -> io::Result<()> {
        self.reader.seek(SeekFrom::Start(0)).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[tokio::test]
    async fn exact_multiple_has_no_short_tail() -> io::Result<()> {
        let mut chunks = Chunked::new(Cursor::new(vec![1u8; 20]), NonZeroUsize::new(10).unwrap());

        assert_eq!(chunks.next_chunk().await?.map(|c| c.len()), Some(10));
        assert_eq!(chunks.next_chunk().await?.map(|c| c.len()), Some(10));
        assert_eq!(chunks.next_chunk().await?, None);
        assert_eq!(chunks.next_chunk().await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn empty_stream_is_exhausted_immediately() -> io::Result<()> {
        let mut chunks = Chunked::new(Cursor::new(Vec::<u8>::new()), NonZeroUsize::MIN);
        assert_eq!(chunks.next_chunk().await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn rewind_clears_the_end_of_stream() -> io::Result<()> {
        let mut chunks = Chunked::new(Cursor::new(vec![1, 2, 3]), NonZeroUsize::new(2).unwrap());

        assert_eq!(chunks.next_chunk().await?, Some(vec![1, 2]));
        assert_eq!(chunks.next_chunk().await?, Some(vec![3]));
        assert_eq!(chunks.next_chunk().await?, None);

        chunks.rewind().await?;
        assert_eq!(chunks.next_chunk().await?, Some(vec![1, 2]));
        Ok(())
    }
}
