//! NDJSON export of recorded traces.
//!
//! Long traces are unpleasant to read in an assertion message. Exporting
//! them writes one JSON object per event, which can be grepped or diffed
//! offline. Exported files are never read back by the validator.

use crate::error::Error;
use crate::event::EventRef;
use crate::trace::Trace;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One exported trace event.
#[derive(Debug, Serialize)]
struct EventRecord<'a> {
    index: usize,
    event_type: &'a str,
    fingerprint: String,
    rendered: String,
}

/// Writes trace events as NDJSON.
///
/// Each call to `emit()` writes one JSON object on a new line:
/// ```json
/// {"index":0,"event_type":"timeout","fingerprint":"timeout","rendered":"timeout(round 1)"}
/// ```
pub struct TraceEmitter<W: Write = BufWriter<File>> {
    writer: W,
    count: usize,
}

impl TraceEmitter {
    /// Create a new emitter writing to the given file path.
    pub fn create(path: &Path) -> Result<Self, Error> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TraceEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, count: 0 }
    }

    /// Emit one event. Its index is the number of events emitted before it.
    pub fn emit(&mut self, event: &EventRef) -> Result<(), Error> {
        let record = EventRecord {
            index: self.count,
            event_type: event.event_type().as_str(),
            fingerprint: event.comparable_str(),
            rendered: event.to_string(),
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;

        self.count += 1;
        Ok(())
    }

    /// Emit every event of `trace`, in order.
    ///
    /// Fails on a malformed trace before writing anything.
    pub fn emit_trace(&mut self, trace: &Trace) -> Result<(), Error> {
        trace.check_well_formed()?;
        trace.iter().try_for_each(|event| self.emit(event))
    }

    /// Flush buffered output and return the number of events emitted.
    pub fn finish(mut self) -> Result<usize, Error> {
        self.writer.flush()?;
        Ok(self.count)
    }

    /// Get the number of events emitted so far.
    pub fn count(&self) -> usize {
        self.count
    }
}
