//! Typed errors for ioa-harness.
//!
//! Runtime faults (the harness could not reach a verdict) and behavioural
//! verdicts (the machine under test did the wrong thing) live in separate
//! types so that they can never be confused by a caller.

use std::any::Any;
use thiserror::Error;

/// Top-level error type for ioa-harness operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Error while extending or checking a trace.
    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),

    /// Error while evaluating a safety property.
    #[error("Property error: {0}")]
    Property(#[from] PropertyError),

    /// Error while validating a test case.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Error in a configuration builder.
    #[error("Builder error: {0}")]
    Builder(#[from] BuilderError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[cfg(feature = "trace-export")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error raised by trace bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TraceError {
    /// An absent event was handed to `Trace::extend`. Nothing was appended.
    #[error("Cannot extend trace with nil event (argument {index})")]
    NilEvent { index: usize },

    /// The trace holds an absent event.
    #[error("Trace contains nil event at position {index}")]
    MalformedTrace { index: usize },
}

/// Error raised while evaluating a safety property.
///
/// This is never "the trace is outside the property"; that outcome is a
/// [`Containment`](crate::property::Containment) value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PropertyError {
    /// The property cannot perform the requested operation.
    #[error("Unsupported: {property} cannot {operation}")]
    Unsupported {
        property: String,
        operation: &'static str,
    },

    /// The trace handed to the property is not well formed.
    #[error(transparent)]
    Trace(#[from] TraceError),
}

/// A rejection raised by an incremental property checker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Rejection(pub String);

impl Rejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A panic raised by the machine under test, caught at the adapter boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Panic: {message}")]
pub struct PanicError {
    pub message: String,
}

impl PanicError {
    /// Convert a payload returned by `std::panic::catch_unwind`.
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "UNKNOWN".to_string()
        };
        Self { message }
    }
}

/// Infrastructure fault raised by the validator: no verdict was reached.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// Inputs and outputs have incompatible lengths.
    #[error(
        "Malformed test case: either inputs and outputs must be same length, \
         or inputs should be one longer than outputs (inputs: {inputs}, outputs: {outputs})"
    )]
    MalformedTestCase { inputs: usize, outputs: usize },

    /// The expected trace built from the test case has an absent event.
    #[error("Outputs cannot contain nil events; {0}")]
    NilExpectedEvent(#[source] TraceError),

    /// The automaton failed to record its own trace.
    #[error("Transition failed: {0}")]
    Transition(#[from] TraceError),

    /// A safety property could not be evaluated.
    #[error("Error evaluating safety property {property}: {source}")]
    PropertyEvaluation {
        property: String,
        #[source]
        source: PropertyError,
    },
}

/// Behavioural failure: the automaton ran, but its trace is not the one expected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InvalidTrace {
    /// The produced trace does not match the expected prefix.
    #[error(
        "Trace diverged at event {index} (pair {pair}):\nExpected: {expected}\nActual: {actual}{diff}",
        pair = .index / 2 + 1
    )]
    Diverged {
        index: usize,
        expected: String,
        actual: String,
        diff: String,
    },

    /// The machine panicked although every input has an expected output.
    #[error("Panicked when we were not expecting it: {0}")]
    UnexpectedPanic(PanicError),

    /// The final input has no expected output, but the machine did not panic.
    #[error("Did not panic when we were expecting to")]
    MissingPanic,

    /// The machine panicked before producing the expected prefix.
    #[error("Panicked early: {produced}:{expected}:\t{panic}")]
    PanickedEarly {
        produced: usize,
        expected: usize,
        panic: PanicError,
    },

    /// The machine stopped short without panicking.
    #[error("Trace too short ({produced}:{expected})")]
    TooShort { produced: usize, expected: usize },

    /// The whole trace is outside an attached safety property.
    #[error("Trace not in safety property: {property}, {reason}")]
    PropertyViolated { property: String, reason: String },
}

/// Error in a configuration builder.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuilderError {
    /// A builder field holds a value the configuration cannot use.
    #[error("{builder}: invalid field '{field}': {reason}")]
    InvalidField {
        builder: &'static str,
        field: &'static str,
        reason: String,
    },
}

/// Result type alias using ioa-harness's Error.
pub type HarnessResult<T> = std::result::Result<T, Error>;
