//! JSONL reading operations.
//!
//! [`JsonlReader`] reads line by line, skipping blank lines and tracking
//! 1-based line numbers so parse failures point at the right place.

use crate::warning::Warning;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// A single line pulled from the input, before deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLine {
    /// A non-blank, valid UTF-8 line with surrounding whitespace trimmed.
    Text {
        /// The 1-based line number.
        line_number: usize,
        /// The trimmed line contents.
        text: String,
    },
    /// A line whose bytes are not valid UTF-8.
    InvalidUtf8 {
        /// The 1-based line number.
        line_number: usize,
    },
}

/// Async reader for JSONL (JSON Lines) data.
///
/// # Examples
///
/// ```no_run
/// use sanad_jsonl::JsonlReader;
/// use tokio::fs::File;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let file = File::open("graph.jsonl").await?;
/// let mut reader = JsonlReader::new(file);
/// while let Some(value) = reader.read_value::<serde_json::Value>().await? {
///     println!("{value}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct JsonlReader<R> {
    reader: BufReader<R>,
    /// Number of lines consumed so far, blank ones included.
    line_number: usize,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Creates a new `JsonlReader` wrapping the given async reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buf: Vec::new(),
        }
    }

    /// Returns the line number of the last line read (0 before any read).
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads the next non-blank line.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the underlying reader fails.
    pub async fn next_line(&mut self) -> Result<Option<RawLine>> {
        loop {
            self.buf.clear();
            let read = self.reader.read_until(b'\n', &mut self.buf).await?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let Ok(text) = std::str::from_utf8(&self.buf) else {
                return Ok(Some(RawLine::InvalidUtf8 {
                    line_number: self.line_number,
                }));
            };

            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }

            return Ok(Some(RawLine::Text {
                line_number: self.line_number,
                text: trimmed.to_string(),
            }));
        }
    }

    /// Reads and deserializes the next value, failing on the first bad line.
    ///
    /// # Errors
    ///
    /// - `Error::Parse` if a line is not valid JSON for `T`
    /// - `Error::InvalidFormat` if a line is not valid UTF-8
    /// - `Error::Io` if the underlying reader fails
    pub async fn read_value<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        match self.next_line().await? {
            None => Ok(None),
            Some(RawLine::InvalidUtf8 { line_number }) => Err(Error::InvalidFormat(format!(
                "line {line_number} is not valid UTF-8"
            ))),
            Some(RawLine::Text { line_number, text }) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|source| Error::Parse {
                    line_number,
                    source,
                }),
        }
    }

    /// Reads every remaining value, collecting bad lines as warnings.
    ///
    /// # Errors
    ///
    /// Only IO failures are fatal; parse problems become [`Warning`]s.
    pub async fn read_resilient<T: DeserializeOwned>(&mut self) -> Result<(Vec<T>, Vec<Warning>)> {
        let mut values = Vec::new();
        let mut warnings = Vec::new();

        while let Some(line) = self.next_line().await? {
            match line {
                RawLine::InvalidUtf8 { line_number } => {
                    warnings.push(Warning::SkippedLine {
                        line_number,
                        reason: "invalid UTF-8".to_string(),
                    });
                }
                RawLine::Text { line_number, text } => match serde_json::from_str(&text) {
                    Ok(value) => values.push(value),
                    Err(e) => {
                        tracing::debug!(line_number, error = %e, "Skipping malformed JSONL line");
                        warnings.push(Warning::MalformedJson {
                            line_number,
                            error: e.to_string(),
                        });
                    }
                },
            }
        }

        Ok((values, warnings))
    }
}

/// Reads a whole JSONL file resiliently.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be opened or read.
pub async fn read_jsonl_resilient<T, P>(path: P) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref()).await?;
    JsonlReader::new(file).read_resilient().await
}
