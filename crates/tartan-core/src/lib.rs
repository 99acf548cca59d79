//! Core types for the Tartan home
//!
//! This crate provides the fundamental types shared by the evaluator, the
//! configuration loader and the command line driver: the typed
//! [`StateSnapshot`], the closed [`StateKey`] set, [`HvacMode`] and the
//! append-only [`LogSink`].

mod hvac;
mod keys;
mod log;
mod snapshot;

pub use hvac::HvacMode;
pub use keys::{KeyError, StateKey, ValueKind};
pub use log::{LogSink, TraceLog};
pub use snapshot::{SnapshotError, StateChange, StateSnapshot, REDACTED};
