// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, recording, JSON export, and `log` bridging for thicket
//! diagnostics.
//!
//! This crate provides [`TraceSink`](thicket_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: keeps [`recorder::RecordedEvent`]s in
//!   memory, in arrival order.
//! - [`json::export`]: writes recorded events as JSON lines.
//! - [`log_sink::LogSink`]: forwards warnings to `log::warn!` and everything
//!   else to `log::trace!`.

pub mod json;
pub mod log_sink;
pub mod pretty;
pub mod recorder;
