// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON-lines exporter.
//!
//! [`export`] writes events recorded by a
//! [`RecorderSink`](super::recorder::RecorderSink) as one JSON object per
//! line. Every object has an `"event"` field naming the kind (see
//! [`RecordedEvent::kind`]); node handles are written as
//! `{"index": .., "generation": ..}` objects.

use std::io::{self, Write};

use serde_json::{Value, json};

use thicket_core::host::NodeId;
use thicket_core::trace::Warning;

use crate::recorder::RecordedEvent;

/// Writes `events` as JSON lines.
pub fn export(events: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    for event in events {
        let line = to_json(event);
        serde_json::to_writer(&mut *writer, &line)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Converts one event to its JSON object.
#[must_use]
pub fn to_json(event: &RecordedEvent) -> Value {
    let kind = event.kind();
    match event {
        RecordedEvent::Warning(w) => json!({
            "event": kind,
            "warning": warning_kind(w),
            "message": w.to_string(),
        }),
        RecordedEvent::NodeMounted(e) => json!({
            "event": kind,
            "node": node(e.node),
            "parent": e.parent.map(node),
        }),
        RecordedEvent::NodeMoved(e) => json!({
            "event": kind,
            "node": node(e.node),
            "parent": node(e.parent),
            "anchor": e.anchor.map(node),
        }),
        RecordedEvent::NodeRemoved(e) => json!({
            "event": kind,
            "node": node(e.node),
            "parent": e.parent.map(node),
        }),
        RecordedEvent::FlushBegin(e) => json!({
            "event": kind,
            "flush_index": e.flush_index,
            "queued": e.queued,
        }),
        RecordedEvent::FlushEnd(s) => json!({
            "event": kind,
            "flush_index": s.flush_index,
            "passes": s.passes,
            "jobs_run": s.jobs_run,
            "jobs_failed": s.jobs_failed,
            "jobs_skipped": s.jobs_skipped,
            "jobs_suppressed": s.jobs_suppressed,
            "post_flush_run": s.post_flush_run,
        }),
    }
}

fn node(id: NodeId) -> Value {
    json!({ "index": id.index(), "generation": id.generation() })
}

fn warning_kind(w: &Warning) -> &'static str {
    match w {
        Warning::RecursionLimit { .. } => "recursion_limit",
        Warning::JobFailed { .. } => "job_failed",
        Warning::MissingMountTarget { .. } => "missing_mount_target",
        Warning::NoMountNode => "no_mount_node",
        Warning::MissingRootNode => "missing_root_node",
    }
}
