//! Append-only event histories.
//!
//! A trace is the complete history of an automaton since construction (or
//! since its last reset), never a fragment. Order matters: traces are
//! compared position by position and are never reordered or deduplicated.

use crate::error::TraceError;
use crate::event::{Event, EventRef, EventType};
use std::fmt;

/// Prefix marking a rendering that lost its head.
const TRUNCATED_PREFIX: &str = "(truncated...)\t";

/// An ordered sequence of events.
///
/// Traces grown through [`Trace::extend`] are always well formed. A trace
/// assembled from raw slots with [`Trace::from_slots`] may hold absent
/// events; [`Trace::check_well_formed`] finds them.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    events: Vec<Option<EventRef>>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a trace from slots without checking them.
    pub fn from_slots(events: Vec<Option<EventRef>>) -> Self {
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Append events in order.
    ///
    /// If any argument is absent the call fails with
    /// [`TraceError::NilEvent`] and the trace is left untouched.
    pub fn extend<I>(&mut self, events: I) -> Result<(), TraceError>
    where
        I: IntoIterator,
        I::Item: Into<Option<EventRef>>,
    {
        let batch: Vec<Option<EventRef>> = events.into_iter().map(Into::into).collect();
        if let Some(index) = batch.iter().position(Option::is_none) {
            return Err(TraceError::NilEvent { index });
        }
        self.events.extend(batch);
        Ok(())
    }

    /// Append a single event. Infallible, since the event is present.
    pub fn push(&mut self, event: EventRef) {
        self.events.push(Some(event));
    }

    /// Fail on the first absent event.
    pub fn check_well_formed(&self) -> Result<(), TraceError> {
        match self.events.iter().position(Option::is_none) {
            Some(index) => Err(TraceError::MalformedTrace { index }),
            None => Ok(()),
        }
    }

    /// The event at `index`, if that slot exists and is present.
    pub fn get(&self, index: usize) -> Option<&EventRef> {
        self.events.get(index).and_then(Option::as_ref)
    }

    /// Present events, in order. Absent slots are skipped.
    pub fn iter(&self) -> impl Iterator<Item = &EventRef> + '_ {
        self.events.iter().flatten()
    }

    /// Fingerprint of the slot at `index`. `None` for an absent slot.
    pub(crate) fn fingerprint_at(&self, index: usize) -> Option<String> {
        self.get(index).map(|e| e.comparable_str())
    }

    /// The events recorded at positions `from..`, as a trace of their own.
    pub fn suffix(&self, from: usize) -> Trace {
        let start = from.min(self.events.len());
        Trace {
            events: self.events[start..].to_vec(),
        }
    }

    /// Index of the first position, within the bounds of `reference`,
    /// whose fingerprint differs from `reference`.
    ///
    /// Positions past the end of `reference` are unconstrained.
    pub fn first_divergence(&self, reference: &Trace) -> Option<usize> {
        let bound = self.len().min(reference.len());
        (0..bound).find(|&i| self.fingerprint_at(i) != reference.fingerprint_at(i))
    }

    /// Whether any event satisfies `pred`.
    pub fn contains_fn(&self, pred: impl Fn(&dyn Event) -> bool) -> bool {
        self.iter().any(|e| pred(e.as_ref()))
    }

    /// Whether an event with the same fingerprint as `event` was recorded.
    pub fn contains(&self, event: &dyn Event) -> bool {
        let fingerprint = event.comparable_str();
        self.contains_fn(|e| e.comparable_str() == fingerprint)
    }

    /// Whether some recorded fingerprint contains `needle`.
    pub fn contains_substring(&self, needle: &str) -> bool {
        self.contains_fn(|e| e.comparable_str().contains(needle))
    }

    /// Number of recorded events with the same fingerprint as `event`.
    pub fn count_event(&self, event: &dyn Event) -> usize {
        let fingerprint = event.comparable_str();
        self.iter()
            .filter(|e| e.comparable_str() == fingerprint)
            .count()
    }

    /// Number of recorded actions, as opposed to routed events.
    pub fn count_actions(&self) -> usize {
        self.iter()
            .filter(|e| e.event_type() == EventType::WrappedAction)
            .count()
    }

    /// Render the fingerprints, one input/output pair per line.
    ///
    /// With `window = Some(n)` only the trailing `n` bytes (rounded to a
    /// character boundary) are kept.
    pub fn render(&self, window: Option<usize>) -> String {
        let mut buf = String::from("{\n");
        for (i, slot) in self.events.iter().enumerate() {
            let fingerprint = slot
                .as_ref()
                .map_or_else(|| "<nil>".to_string(), |e| e.comparable_str());
            buf.push('\t');
            buf.push_str(&fingerprint);
            buf.push_str(" |");
            if i % 2 == 1 {
                buf.push('\n');
            }
        }
        if self.events.len() % 2 == 1 {
            buf.push('\n');
        }
        buf.push_str("}\n");

        let Some(window) = window else {
            return buf;
        };
        if buf.len() <= window {
            return buf;
        }
        let mut cut = buf.len() - window;
        while !buf.is_char_boundary(cut) {
            cut += 1;
        }
        format!("{TRUNCATED_PREFIX}{}", &buf[cut..])
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(None))
    }
}

impl FromIterator<EventRef> for Trace {
    fn from_iter<I: IntoIterator<Item = EventRef>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().map(Some).collect(),
        }
    }
}
