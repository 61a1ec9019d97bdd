//! JSONL writing operations.

use crate::Result;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Async writer for JSONL (JSON Lines) data.
///
/// Each value is serialized to a single line followed by `\n`. Output is
/// buffered; call [`flush`](Self::flush) before dropping the writer.
pub struct JsonlWriter<W> {
    writer: BufWriter<W>,
    lines_written: usize,
}

impl<W: AsyncWrite + Unpin> JsonlWriter<W> {
    /// Creates a new `JsonlWriter` wrapping the given async writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            lines_written: 0,
        }
    }

    /// Number of values written so far.
    #[must_use]
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Serializes one value as a line.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails, `Error::Io` on write failure.
    pub async fn write<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let line = serde_json::to_string(value)?;
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.lines_written += 1;
        Ok(())
    }

    /// Serializes every value from the iterator, one per line.
    ///
    /// # Errors
    ///
    /// Stops at the first failing value; see [`write`](Self::write).
    pub async fn write_all<T, I>(&mut self, values: I) -> Result<()>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.write(&value).await?;
        }
        Ok(())
    }

    /// Flushes buffered output to the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the flush fails.
    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await?;
        Ok(())
    }

    /// Consumes the writer, returning the underlying writer.
    ///
    /// This does not flush; call [`flush`](Self::flush) first.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}
