//! Habit check-in engine.
//!
//! Tasks are checked in once per day, optionally with structured detail
//! (tags plus a measured quantity) carried inside the check-in note. The
//! core modules are pure functions over a [`snapshot::Snapshot`]; storage
//! and the CLI live on the edges.

pub mod calendar;
pub mod categories;
pub mod commands;
pub mod dates;
pub mod error;
pub mod makeup;
pub mod models;
pub mod note;
pub mod snapshot;
pub mod stats;
pub mod storage;
pub mod tags;
pub mod tui;
