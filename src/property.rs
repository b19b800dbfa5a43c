//! Safety properties over traces.
//!
//! A property answers "is this whole trace in my language". Properties that
//! can also be checked incrementally hand out a [`PropChecker`], a stateful
//! validator fed one event at a time that rejects as soon as the prefix it
//! has seen can no longer be extended into an accepted trace.
//!
//! Any [`CheckerFactory`] becomes a whole-trace property through
//! [`CheckedProperty`].

use crate::error::{PropertyError, Rejection};
use crate::event::EventRef;
use crate::trace::Trace;
use std::fmt;

/// Whether a trace belongs to a property.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "containment should be checked"]
pub enum Containment {
    /// The trace is in the property.
    Inside,

    /// The trace is not in the property.
    Outside {
        /// Why, when the property can say.
        reason: Option<String>,
    },
}

impl Containment {
    pub fn is_inside(&self) -> bool {
        matches!(self, Self::Inside)
    }

    fn outside(reason: impl Into<String>) -> Self {
        Self::Outside {
            reason: Some(reason.into()),
        }
    }
}

/// A predicate over whole traces.
pub trait SafetyProperty: fmt::Debug + Send + Sync {
    /// Decide whether `trace` is in the property.
    ///
    /// `Err` means the evaluation itself could not complete.
    fn contains_trace(&self, trace: &Trace) -> Result<Containment, PropertyError>;

    /// A fresh incremental checker for this property.
    fn new_checker(&self) -> Result<Box<dyn PropChecker>, PropertyError>;
}

/// Stateful safety validator fed the events of a trace in order.
pub trait PropChecker {
    /// Consume the next event. Rejects if the trace seen so far is no longer
    /// a prefix of any trace in the property.
    fn add_event(&mut self, event: &EventRef) -> Result<(), Rejection>;
}

/// Manufactures incremental checkers.
pub trait CheckerFactory: fmt::Debug + Send + Sync {
    type Checker: PropChecker + 'static;

    fn new_checker(&self) -> Self::Checker;
}

/// The property containing every trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

/// Checker of [`AcceptAll`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllChecker;

impl PropChecker for AcceptAllChecker {
    fn add_event(&mut self, _event: &EventRef) -> Result<(), Rejection> {
        Ok(())
    }
}

impl SafetyProperty for AcceptAll {
    fn contains_trace(&self, _trace: &Trace) -> Result<Containment, PropertyError> {
        Ok(Containment::Inside)
    }

    fn new_checker(&self) -> Result<Box<dyn PropChecker>, PropertyError> {
        Ok(Box::new(AcceptAllChecker))
    }
}

/// Accepts a trace iff it agrees with a reference trace on every position
/// the reference covers.
///
/// The reference is a prefix constraint: events past its end are
/// unconstrained, and a candidate shorter than the reference is accepted if
/// it agrees wherever both are defined. Comparison uses fingerprints only.
#[derive(Debug, Clone)]
pub struct DirectMatch {
    reference: Trace,
}

impl DirectMatch {
    pub fn new(reference: Trace) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> &Trace {
        &self.reference
    }
}

impl SafetyProperty for DirectMatch {
    fn contains_trace(&self, trace: &Trace) -> Result<Containment, PropertyError> {
        Ok(match trace.first_divergence(&self.reference) {
            None => Containment::Inside,
            Some(index) => Containment::outside(format!("events differ at position {index}")),
        })
    }

    /// Direct matching is only defined over complete traces.
    fn new_checker(&self) -> Result<Box<dyn PropChecker>, PropertyError> {
        Err(PropertyError::Unsupported {
            property: "DirectMatch".to_string(),
            operation: "check traces incrementally",
        })
    }
}

/// Lifts a [`CheckerFactory`] into a whole-trace property.
///
/// Every evaluation runs on a fresh checker and stops at the first
/// rejection.
#[derive(Debug, Clone)]
pub struct CheckedProperty<F>(pub F);

impl<F: CheckerFactory> SafetyProperty for CheckedProperty<F> {
    fn contains_trace(&self, trace: &Trace) -> Result<Containment, PropertyError> {
        trace.check_well_formed()?;
        let mut checker = self.0.new_checker();
        for event in trace.iter() {
            if let Err(rejection) = checker.add_event(event) {
                return Ok(Containment::outside(rejection.0));
            }
        }
        Ok(Containment::Inside)
    }

    fn new_checker(&self) -> Result<Box<dyn PropChecker>, PropertyError> {
        Ok(Box::new(self.0.new_checker()))
    }
}

/// The composition of several properties: a trace is inside iff it is
/// inside every member.
#[derive(Debug, Default)]
pub struct Conjunction {
    members: Vec<Box<dyn SafetyProperty>>,
}

impl Conjunction {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn and(mut self, property: impl SafetyProperty + 'static) -> Self {
        self.members.push(Box::new(property));
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl SafetyProperty for Conjunction {
    fn contains_trace(&self, trace: &Trace) -> Result<Containment, PropertyError> {
        for member in &self.members {
            let verdict = member.contains_trace(trace)?;
            if !verdict.is_inside() {
                return Ok(verdict);
            }
        }
        Ok(Containment::Inside)
    }

    fn new_checker(&self) -> Result<Box<dyn PropChecker>, PropertyError> {
        let checkers = self
            .members
            .iter()
            .map(|m| m.new_checker())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Box::new(ConjunctionChecker { checkers }))
    }
}

struct ConjunctionChecker {
    checkers: Vec<Box<dyn PropChecker>>,
}

impl PropChecker for ConjunctionChecker {
    fn add_event(&mut self, event: &EventRef) -> Result<(), Rejection> {
        for checker in &mut self.checkers {
            checker.add_event(event)?;
        }
        Ok(())
    }
}
