//! SANAD milestone dependency graph.
//!
//! Projects own milestones; milestones are linked by directed dependency
//! edges (predecessor -> successor). This crate keeps that edge set acyclic,
//! keeps each milestone's status consistent with its incoming edges, and
//! exposes the results as JSON-shaped views, both as a library and through
//! the `sanad` CLI.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod access;
pub mod api;
pub mod domain;
pub mod error;
pub mod id_generation;
pub mod manager;
pub mod storage;

// CLI surface (needed by binary)
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod output;
