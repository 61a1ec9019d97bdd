//! JSON Lines persistence primitives for the SANAD milestone graph.
//!
//! Snapshots of the dependency graph are stored one record per line. This
//! crate provides the line-tracking reader, the buffered writer, resilient
//! loading that reports bad lines as [`Warning`]s instead of failing, and
//! crash-safe atomic rewrites of a whole file.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod error;
pub mod reader;
pub mod warning;
pub mod writer;

pub use atomic::{write_jsonl_atomic, write_jsonl_atomic_iter};
pub use error::{Error, Result};
pub use reader::{JsonlReader, read_jsonl_resilient};
pub use warning::Warning;
pub use writer::JsonlWriter;
