//! Events and actions carried on a trace.
//!
//! Every event supplies its discriminant, a rendering for diagnostics and a
//! *fingerprint* (`comparable_str`). Fingerprint equality is the only
//! equality used when comparing traces. Event kinds that carry opaque
//! payloads (errors, in particular) project them away in their fingerprint,
//! so that an expected event matches any value of that kind.
//!
//! # Example
//!
//! ```
//! use ioa_harness::{Event, EventRef, EventType};
//! use std::fmt;
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct Timeout {
//!     round: u64,
//! }
//!
//! impl fmt::Display for Timeout {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "timeout(round {})", self.round)
//!     }
//! }
//!
//! impl Event for Timeout {
//!     fn event_type(&self) -> EventType {
//!         EventType::Timeout
//!     }
//!
//!     fn comparable_str(&self) -> String {
//!         self.to_string()
//!     }
//! }
//!
//! let e: EventRef = Arc::new(Timeout { round: 3 });
//! assert_eq!(e.comparable_str(), "timeout(round 3)");
//! ```

use std::fmt;
use std::sync::Arc;

/// Discriminant of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum EventType {
    None,
    VotePresent,
    PayloadPresent,
    BundlePresent,
    VoteVerified,
    PayloadVerified,
    BundleVerified,
    RoundInterruption,
    Timeout,
    FastTimeout,
    SpeculationTimeout,
    SoftThreshold,
    CertThreshold,
    NextThreshold,
    ProposalCommittable,
    ProposalAccepted,
    VoteFiltered,
    VoteMalformed,
    BundleFiltered,
    BundleMalformed,
    PayloadRejected,
    PayloadMalformed,
    PayloadPipelined,
    PayloadAccepted,
    ProposalFrozen,
    VoteAccepted,
    NewRound,
    NewPeriod,
    ReadStaging,
    ReadPinned,
    ReadLowestValue,
    ReadLowestPayload,
    VoteFilterRequest,
    VoteFilteredStep,
    NextThresholdStatusRequest,
    NextThresholdStatus,
    FreshestBundleRequest,
    FreshestBundle,
    DumpVotesRequest,
    DumpVotes,
    /// An action produced by a machine, wrapped so it can sit on a trace.
    WrappedAction,
    CheckpointReached,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::VotePresent => "votePresent",
            Self::PayloadPresent => "payloadPresent",
            Self::BundlePresent => "bundlePresent",
            Self::VoteVerified => "voteVerified",
            Self::PayloadVerified => "payloadVerified",
            Self::BundleVerified => "bundleVerified",
            Self::RoundInterruption => "roundInterruption",
            Self::Timeout => "timeout",
            Self::FastTimeout => "fastTimeout",
            Self::SpeculationTimeout => "speculationTimeout",
            Self::SoftThreshold => "softThreshold",
            Self::CertThreshold => "certThreshold",
            Self::NextThreshold => "nextThreshold",
            Self::ProposalCommittable => "proposalCommittable",
            Self::ProposalAccepted => "proposalAccepted",
            Self::VoteFiltered => "voteFiltered",
            Self::VoteMalformed => "voteMalformed",
            Self::BundleFiltered => "bundleFiltered",
            Self::BundleMalformed => "bundleMalformed",
            Self::PayloadRejected => "payloadRejected",
            Self::PayloadMalformed => "payloadMalformed",
            Self::PayloadPipelined => "payloadPipelined",
            Self::PayloadAccepted => "payloadAccepted",
            Self::ProposalFrozen => "proposalFrozen",
            Self::VoteAccepted => "voteAccepted",
            Self::NewRound => "newRound",
            Self::NewPeriod => "newPeriod",
            Self::ReadStaging => "readStaging",
            Self::ReadPinned => "readPinned",
            Self::ReadLowestValue => "readLowestValue",
            Self::ReadLowestPayload => "readLowestPayload",
            Self::VoteFilterRequest => "voteFilterRequest",
            Self::VoteFilteredStep => "voteFilteredStep",
            Self::NextThresholdStatusRequest => "nextThresholdStatusRequest",
            Self::NextThresholdStatus => "nextThresholdStatus",
            Self::FreshestBundleRequest => "freshestBundleRequest",
            Self::FreshestBundle => "freshestBundle",
            Self::DumpVotesRequest => "dumpVotesRequest",
            Self::DumpVotes => "dumpVotes",
            Self::WrappedAction => "wrappedAction",
            Self::CheckpointReached => "checkpointReached",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message consumed or produced by a state machine.
pub trait Event: fmt::Debug + fmt::Display + Send + Sync {
    /// The discriminant of this event.
    fn event_type(&self) -> EventType;

    /// The fingerprint used for trace comparison.
    ///
    /// Must be stable under structurally-equal reconstruction. Payload
    /// fields that should match "any value of this kind" are left out.
    fn comparable_str(&self) -> String;
}

/// Shared handle to an event. The same event sits on both the hidden and
/// the visible trace.
pub type EventRef = Arc<dyn Event>;

/// Output of a machine's handling logic.
pub trait Action: fmt::Debug + fmt::Display + Send + Sync {
    /// The fingerprint used for trace comparison.
    fn comparable_str(&self) -> String;
}

/// Shared handle to an action.
pub type ActionRef = Arc<dyn Action>;

/// An action lifted onto a trace as an event of type
/// [`EventType::WrappedAction`].
#[derive(Debug, Clone)]
pub struct WrappedAction(pub ActionRef);

impl fmt::Display for WrappedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Event for WrappedAction {
    fn event_type(&self) -> EventType {
        EventType::WrappedAction
    }

    fn comparable_str(&self) -> String {
        self.0.comparable_str()
    }
}

/// Wrap an action as an event.
pub fn ev(action: impl Action + 'static) -> EventRef {
    Arc::new(WrappedAction(Arc::new(action)))
}

/// The event of type [`EventType::None`]. Returned by routers that have
/// nothing to say about a dispatched event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyEvent;

impl fmt::Display for EmptyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("none")
    }
}

impl Event for EmptyEvent {
    fn event_type(&self) -> EventType {
        EventType::None
    }

    fn comparable_str(&self) -> String {
        EventType::None.to_string()
    }
}

/// Names the sub-machines of the agreement network, for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum StateMachineTag {
    Demultiplexer,
    PlayerMachine,
    VoteMachine,
    VoteMachineRound,
    VoteMachinePeriod,
    VoteMachineStep,
    ProposalMachine,
    ProposalMachineRound,
    ProposalMachinePeriod,
}

impl fmt::Display for StateMachineTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Demultiplexer => "demultiplexer",
            Self::PlayerMachine => "playerMachine",
            Self::VoteMachine => "voteMachine",
            Self::VoteMachineRound => "voteMachineRound",
            Self::VoteMachinePeriod => "voteMachinePeriod",
            Self::VoteMachineStep => "voteMachineStep",
            Self::ProposalMachine => "proposalMachine",
            Self::ProposalMachineRound => "proposalMachineRound",
            Self::ProposalMachinePeriod => "proposalMachinePeriod",
        };
        f.write_str(name)
    }
}

/// Round, period and step a dispatch is addressed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoundPeriodStep {
    pub round: u64,
    pub period: u64,
    pub step: u64,
}

impl RoundPeriodStep {
    pub fn new(round: u64, period: u64, step: u64) -> Self {
        Self {
            round,
            period,
            step,
        }
    }
}

impl fmt::Display for RoundPeriodStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.round, self.period, self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Broadcast(&'static str);

    impl fmt::Display for Broadcast {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "broadcast({})", self.0)
        }
    }

    impl Action for Broadcast {
        fn comparable_str(&self) -> String {
            "broadcast".to_string()
        }
    }

    #[test]
    fn wrapped_action_delegates_to_action() {
        let e = ev(Broadcast("vote"));
        assert_eq!(e.event_type(), EventType::WrappedAction);
        assert_eq!(e.comparable_str(), "broadcast");
        assert_eq!(e.to_string(), "broadcast(vote)");
    }

    #[test]
    fn event_type_names() {
        assert_eq!(EventType::None.to_string(), "none");
        assert_eq!(EventType::NewRound.to_string(), "newRound");
        assert_eq!(
            EventType::NextThresholdStatusRequest.to_string(),
            "nextThresholdStatusRequest"
        );
        assert_eq!(EventType::CheckpointReached.to_string(), "checkpointReached");
    }
}
