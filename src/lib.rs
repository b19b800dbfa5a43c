//! ioa-harness: trace-based validation for synchronous agreement state
//! machines.
//!
//! State machines of the agreement engine are modelled as I/O automata:
//! they accept one input event at a time and answer with one output. This
//! crate drives such a machine (a single listener, or a whole router and
//! player network) with scripted inputs, records what it does as a trace
//! and decides whether that trace is acceptable:
//!
//! - an exact expected sequence of input/output pairs, matched as a prefix
//!   of what the machine produced, and
//! - any number of safety properties over the whole history, checked event
//!   by event.
//!
//! It tells apart three outcomes: the trace diverged from the expectation,
//! the machine panicked where the test case said it would, and the machine
//! panicked where it should not have.
//!
//! # Quick Start
//!
//! ```ignore
//! use ioa_harness::*;
//!
//! struct RoundKeeper { /* listener under test */ }
//!
//! impl Listener<()> for RoundKeeper {
//!     fn handle(&mut self, r: &mut dyn Router<()>, p: &(), e: &EventRef) -> Option<EventRef> {
//!         /* ... */
//!     }
//! }
//!
//! let mut builder = TestCaseBuilder::new();
//! builder.add_in_out_pair(timeout(), new_round());
//! builder.add_safety_prop(CheckedProperty(NoRoundSkipped));
//! let case = builder.build();
//!
//! let mut automaton = ListenerAutomaton::<_, NullRouter, ()>::new(RoundKeeper::default());
//! assert_eq!(case.validate(&mut automaton)?, Verdict::Valid);
//! ```

pub mod automaton;
mod builder;
pub mod case;
pub mod error;
pub mod event;
#[cfg(feature = "trace-export")]
pub mod export;
pub mod listener;
pub mod network;
pub mod property;
pub mod trace;
pub mod validate;

// Re-export core types for convenience
pub use automaton::{install_quiet_panic_hook, Automaton, Traceable, Transition};
pub use case::{TestCase, TestCaseBuilder};
pub use error::{
    BuilderError, Error, HarnessResult, InvalidTrace, PanicError, PropertyError, Rejection,
    TraceError, ValidationError,
};
pub use event::{
    ev, Action, ActionRef, EmptyEvent, Event, EventRef, EventType, RoundPeriodStep,
    StateMachineTag, WrappedAction,
};
#[cfg(feature = "trace-export")]
pub use export::TraceEmitter;
pub use listener::{Listener, ListenerAutomaton, NullRouter, Router};
pub use network::{Network, NetworkAutomaton};
pub use property::{
    AcceptAll, AcceptAllChecker, CheckedProperty, CheckerFactory, Conjunction, Containment,
    DirectMatch, PropChecker, SafetyProperty,
};
pub use trace::Trace;
#[cfg(feature = "parallel")]
pub use validate::validate_all_parallel;
pub use validate::{validate_all, ValidatorConfig, ValidatorConfigBuilder, Verdict};
