//! Adapter around a single listener.
//!
//! A listener needs a router to dispatch events to other sub-machines and a
//! player context to read consensus state from. The adapter owns both and
//! hands the listener a tap in front of the router, so that every event
//! routed beneath the listener lands on the visible trace while only the
//! top-level input and output land on the hidden one.

use crate::automaton::{call_guarded, Automaton, Traceable, Transition};
use crate::error::TraceError;
use crate::event::{EmptyEvent, EventRef, RoundPeriodStep, StateMachineTag};
use crate::trace::Trace;
use std::iter;
use std::sync::Arc;
use tracing::trace;

/// Dispatches an event from one sub-machine to another.
pub trait Router<P> {
    /// Deliver `event` from `src` to `dest` at position `at` and return the
    /// destination's response.
    fn dispatch(
        &mut self,
        player: &P,
        event: EventRef,
        src: StateMachineTag,
        dest: StateMachineTag,
        at: RoundPeriodStep,
    ) -> EventRef;
}

/// The minimal unit of agreement logic: consumes one event, produces one.
pub trait Listener<P> {
    /// Handle `event`. `None` breaks the one-output contract and is
    /// reported by the adapter as a trace error.
    fn handle(
        &mut self,
        router: &mut dyn Router<P>,
        player: &P,
        event: &EventRef,
    ) -> Option<EventRef>;
}

/// Router used when a listener is tested on its own: every dispatch
/// answers with [`EmptyEvent`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRouter;

impl<P> Router<P> for NullRouter {
    fn dispatch(
        &mut self,
        _player: &P,
        _event: EventRef,
        _src: StateMachineTag,
        _dest: StateMachineTag,
        _at: RoundPeriodStep,
    ) -> EventRef {
        Arc::new(EmptyEvent)
    }
}

/// Records each routed event and its response, in dispatch order.
struct RouterTap<'a, R> {
    inner: &'a mut R,
    recorded: &'a mut Trace,
}

impl<P, R: Router<P>> Router<P> for RouterTap<'_, R> {
    fn dispatch(
        &mut self,
        player: &P,
        event: EventRef,
        src: StateMachineTag,
        dest: StateMachineTag,
        at: RoundPeriodStep,
    ) -> EventRef {
        self.recorded.push(event.clone());
        let out = self.inner.dispatch(player, event, src, dest, at);
        self.recorded.push(out.clone());
        out
    }
}

/// Wraps a listener with its router and player context.
///
/// The hidden trace holds `input, output` for every completed transition.
/// The visible trace holds `input`, then every routed event and its
/// response, then `output`. A panicking transition leaves the hidden trace
/// untouched and records `input` and whatever was routed before the panic
/// on the visible trace.
#[derive(Debug)]
pub struct ListenerAutomaton<L, R = NullRouter, P = ()> {
    listener: L,
    router: R,
    player: P,
    hidden: Trace,
    visible: Trace,
}

impl<L, P: Default> ListenerAutomaton<L, NullRouter, P> {
    /// Wrap `listener` with a [`NullRouter`] and a default player.
    pub fn new(listener: L) -> Self {
        Self::with_context(listener, NullRouter, P::default())
    }
}

impl<L, R, P> ListenerAutomaton<L, R, P> {
    pub fn with_context(listener: L, router: R, player: P) -> Self {
        Self {
            listener,
            router,
            player,
            hidden: Trace::new(),
            visible: Trace::new(),
        }
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn player(&self) -> &P {
        &self.player
    }
}

impl<L, R, P> Traceable for ListenerAutomaton<L, R, P> {
    fn trace(&self) -> &Trace {
        &self.hidden
    }

    fn trace_visible(&self) -> &Trace {
        &self.visible
    }

    fn reset_trace(&mut self) {
        self.hidden = Trace::new();
        self.visible = Trace::new();
    }
}

impl<L, R, P> Automaton for ListenerAutomaton<L, R, P>
where
    L: Listener<P>,
    R: Router<P>,
{
    fn transition(&mut self, input: Option<&EventRef>) -> Result<Transition, TraceError> {
        let Some(input) = input else {
            return Ok(Transition::Completed);
        };
        trace!(input = %input, "Listener transition");

        let mut routed = Trace::new();
        let listener = &mut self.listener;
        let player = &self.player;
        let mut tap = RouterTap {
            inner: &mut self.router,
            recorded: &mut routed,
        };
        let output = match call_guarded(|| listener.handle(&mut tap, player, input)) {
            Ok(output) => output,
            Err(panic) => {
                // keep what was routed before the crash
                self.visible.push(input.clone());
                for event in routed.iter() {
                    self.visible.push(event.clone());
                }
                return Ok(Transition::Panicked(panic));
            }
        };

        self.hidden.extend([Some(input.clone()), output.clone()])?;
        self.visible.extend(
            iter::once(input.clone())
                .chain(routed.iter().cloned())
                .map(Some)
                .chain(iter::once(output)),
        )?;
        Ok(Transition::Completed)
    }
}
