//! The automaton contract shared by every adapter.
//!
//! State machines are modelled as I/O automata even though they are
//! synchronous and single-threaded: exactly one event is in flight at a
//! time and each input yields one externally visible output. The adapters
//! record what they see as traces and turn panics of the wrapped machine
//! into [`Transition::Panicked`], so that a crash never unwinds past them.

use crate::error::{PanicError, TraceError};
use crate::event::EventRef;
use crate::trace::Trace;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;
use tracing::subscriber::NoSubscriber;
use tracing::{debug, trace};

/// How a transition ended, when it did not fail to record its trace.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a panicked transition should be checked"]
pub enum Transition {
    /// The machine handled the input and its output was recorded.
    Completed,

    /// The machine panicked. Nothing was recorded on the hidden trace for
    /// this input.
    Panicked(PanicError),
}

impl Transition {
    pub fn is_panicked(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }

    pub fn panic(&self) -> Option<&PanicError> {
        match self {
            Self::Completed => None,
            Self::Panicked(p) => Some(p),
        }
    }
}

/// Something that records the traces of its execution.
pub trait Traceable {
    /// Top-level inputs and outputs since construction or the last reset.
    fn trace(&self) -> &Trace;

    /// Every event, internal dispatches included.
    fn trace_visible(&self) -> &Trace;

    /// Forget the recorded history. The wrapped machine keeps its state.
    fn reset_trace(&mut self);
}

/// A traceable state machine driven one event at a time.
pub trait Automaton: Traceable {
    /// Feed one input. `None` means no input for this step and is a no-op.
    ///
    /// `Err` is a bookkeeping failure of the harness. A panic of the
    /// wrapped machine is `Ok(Transition::Panicked(_))`.
    fn transition(&mut self, input: Option<&EventRef>) -> Result<Transition, TraceError>;

    /// Feed inputs in order, stopping at the first error or panic.
    fn transition_all(&mut self, inputs: &[Option<EventRef>]) -> Result<Transition, TraceError> {
        for (step, input) in inputs.iter().enumerate() {
            let outcome = self.transition(input.as_ref())?;
            if outcome.is_panicked() {
                trace!(step, "Stopping transitions after panic");
                return Ok(outcome);
            }
        }
        Ok(Transition::Completed)
    }
}

thread_local! {
    static GUARDED: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Stop the panic hook from printing panics caught by an adapter.
///
/// Catching a panic does not stop the process-wide panic hook from writing
/// `thread '..' panicked at ..` to stderr first, so every crash a test case
/// expects shows up in the output. This wraps the current hook so that it
/// stays silent while a wrapped machine runs on the calling thread. Panics
/// anywhere else still reach the previous hook. Installing more than once
/// has no further effect.
pub fn install_quiet_panic_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !GUARDED.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

/// Clears the guarded flag on drop, unwinding included.
struct GuardedScope {
    outer: bool,
}

impl GuardedScope {
    fn enter() -> Self {
        Self {
            outer: GUARDED.with(|g| g.replace(true)),
        }
    }
}

impl Drop for GuardedScope {
    fn drop(&mut self) {
        GUARDED.with(|g| g.set(self.outer));
    }
}

/// Run `f` with logging discarded on this thread and panics caught.
///
/// The previous log dispatcher is restored when the guard drops, which
/// happens on both normal return and unwinding. The panic hook still runs
/// for a caught panic and prints it, unless [`install_quiet_panic_hook`]
/// was called.
pub(crate) fn call_guarded<T>(f: impl FnOnce() -> T) -> Result<T, PanicError> {
    let result = {
        let _quiet = tracing::subscriber::set_default(NoSubscriber::default());
        let _scope = GuardedScope::enter();
        panic::catch_unwind(AssertUnwindSafe(f))
    };
    result.map_err(|payload| {
        let panic = PanicError::from_payload(payload);
        debug!(message = %panic.message, "Caught panic from wrapped machine");
        panic
    })
}

/// Run `f` with logging discarded on this thread. Panics propagate.
pub(crate) fn quietly<T>(f: impl FnOnce() -> T) -> T {
    tracing::subscriber::with_default(NoSubscriber::default(), f)
}
