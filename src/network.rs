//! Adapter around a full router and player network.
//!
//! The network is driven through its single top-level entry point, which
//! may dispatch any number of events internally before returning the
//! actions visible to the outside world. Only the input and those actions
//! are recorded.

use crate::automaton::{call_guarded, Automaton, Traceable, Transition};
use crate::error::TraceError;
use crate::event::{ActionRef, EventRef, WrappedAction};
use crate::trace::Trace;
use std::iter;
use std::sync::Arc;
use tracing::trace;

/// A composed network of agreement state machines.
pub trait Network {
    /// Submit `event` at the top of the network and return the resulting
    /// actions, in the order they were produced.
    fn submit_top(&mut self, event: &EventRef) -> Vec<ActionRef>;
}

/// Wraps a [`Network`] and records a single unified trace of inputs and
/// the actions they produced.
#[derive(Debug)]
pub struct NetworkAutomaton<N> {
    network: N,
    trace: Trace,
}

impl<N> NetworkAutomaton<N> {
    pub fn new(network: N) -> Self {
        Self {
            network,
            trace: Trace::new(),
        }
    }

    /// The wrapped network, for inspecting its state.
    pub fn network(&self) -> &N {
        &self.network
    }
}

impl<N> Traceable for NetworkAutomaton<N> {
    fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Internal dispatches are not observed, so this is the same trace as
    /// [`Traceable::trace`].
    fn trace_visible(&self) -> &Trace {
        &self.trace
    }

    fn reset_trace(&mut self) {
        self.trace = Trace::new();
    }
}

impl<N: Network> Automaton for NetworkAutomaton<N> {
    fn transition(&mut self, input: Option<&EventRef>) -> Result<Transition, TraceError> {
        let Some(input) = input else {
            return Ok(Transition::Completed);
        };
        trace!(input = %input, "Network transition");

        let network = &mut self.network;
        let actions = match call_guarded(|| network.submit_top(input)) {
            Ok(actions) => actions,
            Err(panic) => return Ok(Transition::Panicked(panic)),
        };
        trace!(actions = actions.len(), "Network produced actions");

        let outputs = actions
            .into_iter()
            .map(|a| Arc::new(WrappedAction(a)) as EventRef);
        self.trace.extend(iter::once(input.clone()).chain(outputs))?;
        Ok(Transition::Completed)
    }
}
