//! Deterministic test cases.
//!
//! A test case is a list of inputs, the outputs expected for them and the
//! safety properties the whole run must satisfy. It either has one expected
//! output per input, or one fewer: the latter says the machine must panic
//! while handling the final input.

use crate::event::EventRef;
use crate::property::SafetyProperty;
use std::fmt;

/// Inputs, expected outputs and safety properties for one validation run.
///
/// Nothing is checked at construction; the validator rejects a malformed
/// case before running it.
#[derive(Default)]
pub struct TestCase {
    pub(crate) inputs: Vec<Option<EventRef>>,
    pub(crate) expected_outputs: Vec<Option<EventRef>>,
    pub(crate) safety_props: Vec<Box<dyn SafetyProperty>>,
}

impl TestCase {
    /// A case from raw slots. An absent input means "no input for this
    /// step"; an absent output makes the case malformed.
    pub fn new(inputs: Vec<Option<EventRef>>, expected_outputs: Vec<Option<EventRef>>) -> Self {
        Self {
            inputs,
            expected_outputs,
            safety_props: Vec::new(),
        }
    }

    /// A case from present events only.
    pub fn from_events(
        inputs: impl IntoIterator<Item = EventRef>,
        expected_outputs: impl IntoIterator<Item = EventRef>,
    ) -> Self {
        Self::new(
            inputs.into_iter().map(Some).collect(),
            expected_outputs.into_iter().map(Some).collect(),
        )
    }

    /// Attach a safety property checked against the entire trace.
    #[must_use]
    pub fn with_property(mut self, property: impl SafetyProperty + 'static) -> Self {
        self.safety_props.push(Box::new(property));
        self
    }

    pub fn inputs(&self) -> &[Option<EventRef>] {
        &self.inputs
    }

    pub fn expected_outputs(&self) -> &[Option<EventRef>] {
        &self.expected_outputs
    }

    pub fn safety_props(&self) -> &[Box<dyn SafetyProperty>] {
        &self.safety_props
    }

    /// Whether the case says the machine panics on its final input.
    pub fn expects_panic(&self) -> bool {
        self.inputs.len() == self.expected_outputs.len() + 1
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("inputs", &self.inputs.len())
            .field("expected_outputs", &self.expected_outputs.len())
            .field("safety_props", &self.safety_props)
            .finish()
    }
}

/// Accumulates input/output pairs in lockstep.
#[derive(Default)]
pub struct TestCaseBuilder {
    inputs: Vec<Option<EventRef>>,
    expected_outputs: Vec<Option<EventRef>>,
    safety_props: Vec<Box<dyn SafetyProperty>>,
}

impl TestCaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_in_out_pair(&mut self, input: EventRef, output: EventRef) -> &mut Self {
        self.inputs.push(Some(input));
        self.expected_outputs.push(Some(output));
        self
    }

    pub fn add_safety_prop(&mut self, property: impl SafetyProperty + 'static) -> &mut Self {
        self.safety_props.push(Box::new(property));
        self
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn build(self) -> TestCase {
        TestCase {
            inputs: self.inputs,
            expected_outputs: self.expected_outputs,
            safety_props: self.safety_props,
        }
    }
}
