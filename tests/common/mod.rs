//! Shared fixtures: toy agreement events, listeners, routers and networks.

#![allow(dead_code)]

use ioa_harness::*;
use std::fmt;
use std::sync::Arc;

/// An event known only by its discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tagged(pub EventType);

impl fmt::Display for Tagged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Event for Tagged {
    fn event_type(&self) -> EventType {
        self.0
    }

    fn comparable_str(&self) -> String {
        self.0.to_string()
    }
}

pub fn tagged(t: EventType) -> EventRef {
    Arc::new(Tagged(t))
}

pub fn timeout() -> EventRef {
    tagged(EventType::Timeout)
}

pub fn new_round() -> EventRef {
    tagged(EventType::NewRound)
}

pub fn new_period() -> EventRef {
    tagged(EventType::NewPeriod)
}

pub fn vote_verified() -> EventRef {
    tagged(EventType::VoteVerified)
}

pub fn bundle_malformed() -> EventRef {
    tagged(EventType::BundleMalformed)
}

/// A vote observed at a round, from a sender.
#[derive(Debug, Clone)]
pub struct VotePresent {
    pub round: u64,
    pub sender: &'static str,
}

impl fmt::Display for VotePresent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "votePresent(round {}, from {})", self.round, self.sender)
    }
}

impl Event for VotePresent {
    fn event_type(&self) -> EventType {
        EventType::VotePresent
    }

    fn comparable_str(&self) -> String {
        format!("{{votePresent round={} sender={}}}", self.round, self.sender)
    }
}

/// A filtered vote carrying an error. The error text is not part of the
/// fingerprint, so any two filtered votes compare equal.
#[derive(Debug, Clone)]
pub struct VoteFiltered {
    pub err: String,
}

impl fmt::Display for VoteFiltered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voteFiltered: {}", self.err)
    }
}

impl Event for VoteFiltered {
    fn event_type(&self) -> EventType {
        EventType::VoteFiltered
    }

    fn comparable_str(&self) -> String {
        "{voteFiltered err=<error>}".to_string()
    }
}

pub fn vote_filtered(err: &str) -> EventRef {
    Arc::new(VoteFiltered {
        err: err.to_string(),
    })
}

/// Relays a message to peers.
#[derive(Debug, Clone)]
pub struct Broadcast(pub &'static str);

impl fmt::Display for Broadcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "broadcast {}", self.0)
    }
}

impl Action for Broadcast {
    fn comparable_str(&self) -> String {
        format!("{{broadcast {}}}", self.0)
    }
}

/// Starts a new round on timeouts and verified votes, panics on malformed
/// bundles and ignores everything else. Counts what it handled.
#[derive(Debug, Default)]
pub struct RoundListener {
    pub handled: usize,
}

impl<P> Listener<P> for RoundListener {
    fn handle(&mut self, _r: &mut dyn Router<P>, _p: &P, event: &EventRef) -> Option<EventRef> {
        self.handled += 1;
        match event.event_type() {
            EventType::Timeout | EventType::VoteVerified => Some(new_round()),
            EventType::BundleMalformed => panic!("bundle malformed at handled={}", self.handled),
            _ => Some(Arc::new(EmptyEvent)),
        }
    }
}

pub fn round_automaton() -> ListenerAutomaton<RoundListener> {
    ListenerAutomaton::new(RoundListener::default())
}

/// Alternates between new rounds and new periods, starting with a round.
#[derive(Debug, Default)]
pub struct Alternator {
    count: usize,
}

impl Listener<()> for Alternator {
    fn handle(&mut self, _r: &mut dyn Router<()>, _p: &(), _e: &EventRef) -> Option<EventRef> {
        self.count += 1;
        Some(if self.count % 2 == 1 {
            new_round()
        } else {
            new_period()
        })
    }
}

/// Player context: the round a listener believes it is in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Player {
    pub round: u64,
}

/// Forwards every input to the vote machine and returns the answer
/// wrapped as a threshold event.
#[derive(Debug, Default)]
pub struct Forwarder;

impl Listener<Player> for Forwarder {
    fn handle(&mut self, r: &mut dyn Router<Player>, p: &Player, event: &EventRef) -> Option<EventRef> {
        let at = RoundPeriodStep::new(p.round, 0, 1);
        let answer = r.dispatch(
            p,
            event.clone(),
            StateMachineTag::PlayerMachine,
            StateMachineTag::VoteMachine,
            at,
        );
        if answer.event_type() == EventType::VoteAccepted {
            r.dispatch(
                p,
                tagged(EventType::NextThresholdStatusRequest),
                StateMachineTag::PlayerMachine,
                StateMachineTag::VoteMachineRound,
                at,
            );
            return Some(tagged(EventType::SoftThreshold));
        }
        Some(Arc::new(EmptyEvent))
    }
}

/// Accepts votes, answers threshold status requests, and counts dispatches.
#[derive(Debug, Default)]
pub struct VoteRouter {
    pub dispatched: Vec<(StateMachineTag, StateMachineTag, RoundPeriodStep)>,
}

impl Router<Player> for VoteRouter {
    fn dispatch(
        &mut self,
        _player: &Player,
        event: EventRef,
        src: StateMachineTag,
        dest: StateMachineTag,
        at: RoundPeriodStep,
    ) -> EventRef {
        self.dispatched.push((src, dest, at));
        match event.event_type() {
            EventType::VotePresent => tagged(EventType::VoteAccepted),
            EventType::NextThresholdStatusRequest => tagged(EventType::NextThresholdStatus),
            _ => Arc::new(EmptyEvent),
        }
    }
}

/// A network that broadcasts on timeouts, stays quiet on votes and panics
/// on malformed bundles.
#[derive(Debug, Default)]
pub struct ToyNetwork {
    pub round: u64,
}

impl Network for ToyNetwork {
    fn submit_top(&mut self, event: &EventRef) -> Vec<ActionRef> {
        match event.event_type() {
            EventType::Timeout => {
                self.round += 1;
                vec![
                    Arc::new(Broadcast("next-vote")) as ActionRef,
                    Arc::new(Broadcast("bundle")) as ActionRef,
                ]
            }
            EventType::BundleMalformed => panic!("malformed bundle reached the player"),
            _ => Vec::new(),
        }
    }
}
