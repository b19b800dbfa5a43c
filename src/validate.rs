//! Deterministic trace validation.
//!
//! Drives an automaton with the inputs of a [`TestCase`], checks that the
//! hidden trace it produced starts with the expected input/output pairs,
//! checks that it panicked exactly when the case said it would, and finally
//! checks the whole accumulated trace against the attached safety
//! properties.
//!
//! A verdict ([`Verdict::Invalid`]) means the machine under test is wrong.
//! An `Err` ([`ValidationError`]) means the harness could not reach a
//! verdict at all.

use crate::automaton::{quietly, Automaton, Transition};
use crate::builder::impl_builder;
use crate::case::TestCase;
use crate::error::{InvalidTrace, ValidationError};
use crate::property::{Containment, DirectMatch, SafetyProperty};
use crate::trace::Trace;
use similar::{ChangeTag, TextDiff};
use tracing::{debug, info};

/// Outcome of validating a test case.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
#[must_use = "validation verdict should be checked"]
pub enum Verdict {
    /// The automaton behaved as the test case expects.
    Valid,

    /// The automaton ran but did not behave as expected.
    Invalid(InvalidTrace),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn invalid(&self) -> Option<&InvalidTrace> {
        match self {
            Self::Valid => None,
            Self::Invalid(reason) => Some(reason),
        }
    }
}

/// Options for rendering validation diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ValidatorConfig {
    /// Keep only a trailing window of each trace rendering (default: false).
    pub truncate_render: bool,

    /// Characters kept when truncating (default: 500).
    pub render_window: usize,

    /// Attach a unified diff of the renderings to diverged traces
    /// (default: true).
    pub show_diff: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            truncate_render: false,
            render_window: 500,
            show_diff: true,
        }
    }
}

impl_builder!(ValidatorConfig, ValidatorConfigBuilder {
    /// Keep only a trailing window of each trace rendering.
    truncate_render: bool,
    /// Characters kept when truncating.
    render_window: usize,
    /// Attach a unified diff to diverged traces.
    show_diff: bool,
} check = check_config);

fn check_config(config: &ValidatorConfig) -> Result<(), (&'static str, String)> {
    if config.truncate_render && config.render_window == 0 {
        return Err((
            "render_window",
            "must be positive when truncate_render is set".to_string(),
        ));
    }
    Ok(())
}

impl ValidatorConfig {
    fn render(&self, trace: &Trace) -> String {
        trace.render(self.truncate_render.then_some(self.render_window))
    }
}

impl TestCase {
    /// Validate an automaton at its start state.
    pub fn validate<A>(&self, automaton: &mut A) -> Result<Verdict, ValidationError>
    where
        A: Automaton + ?Sized,
    {
        self.validate_as_extension(automaton)
    }

    /// Validate an automaton that may already have been driven: only the
    /// part of the trace produced by this case is matched against the
    /// expected pairs.
    pub fn validate_as_extension<A>(&self, automaton: &mut A) -> Result<Verdict, ValidationError>
    where
        A: Automaton + ?Sized,
    {
        self.validate_with(&ValidatorConfig::default(), automaton)
    }

    /// [`TestCase::validate_as_extension`] with explicit options.
    pub fn validate_with<A>(
        &self,
        config: &ValidatorConfig,
        automaton: &mut A,
    ) -> Result<Verdict, ValidationError>
    where
        A: Automaton + ?Sized,
    {
        let (inputs, outputs) = (self.inputs.len(), self.expected_outputs.len());
        let expect_panic = match inputs.checked_sub(outputs) {
            Some(0) => false,
            Some(1) => true,
            _ => return Err(ValidationError::MalformedTestCase { inputs, outputs }),
        };
        debug!(inputs, outputs, expect_panic, "Validating test case");

        // the automaton may already have run and produced a trace
        let existing = automaton.trace().len();

        let expected = Trace::from_slots(
            self.inputs
                .iter()
                .zip(&self.expected_outputs)
                .flat_map(|(input, output)| [input.clone(), output.clone()])
                .collect(),
        );
        expected
            .check_well_formed()
            .map_err(ValidationError::NilExpectedEvent)?;

        let outcome = automaton.transition_all(&self.inputs)?;

        let extension = automaton.trace().suffix(existing);
        let matcher = DirectMatch::new(expected);
        let matched = matcher
            .contains_trace(&extension)
            .map_err(|source| ValidationError::PropertyEvaluation {
                property: "DirectMatch".to_string(),
                source,
            })?;

        // any trace should be valid up to the point of panicking
        if !matched.is_inside() {
            let expected = matcher.reference();
            let invalid = InvalidTrace::Diverged {
                index: extension.first_divergence(expected).unwrap_or_default(),
                expected: config.render(expected),
                actual: config.render(&extension),
                diff: if config.show_diff {
                    format!(
                        "\n--- expected\n+++ actual\n{}",
                        unified_diff(&expected.render(None), &extension.render(None))
                    )
                } else {
                    String::new()
                },
            };
            return Ok(reject(invalid));
        }

        match (&outcome, expect_panic) {
            (Transition::Panicked(panic), false) => {
                return Ok(reject(InvalidTrace::UnexpectedPanic(panic.clone())));
            }
            (Transition::Completed, true) => return Ok(reject(InvalidTrace::MissingPanic)),
            _ => {}
        }

        let (produced, wanted) = (extension.len(), matcher.reference().len());
        if produced < wanted {
            // a synchronous machine produces an output for every input it survives
            let invalid = match outcome {
                Transition::Panicked(panic) => InvalidTrace::PanickedEarly {
                    produced,
                    expected: wanted,
                    panic,
                },
                Transition::Completed => InvalidTrace::TooShort {
                    produced,
                    expected: wanted,
                },
            };
            return Ok(reject(invalid));
        }

        // the safety properties see the entire trace, not just the extension
        let whole = automaton.trace();
        for property in &self.safety_props {
            let verdict = quietly(|| property.contains_trace(whole)).map_err(|source| {
                ValidationError::PropertyEvaluation {
                    property: format!("{property:?}"),
                    source,
                }
            })?;
            if let Containment::Outside { reason } = verdict {
                return Ok(reject(InvalidTrace::PropertyViolated {
                    property: format!("{property:?}"),
                    reason: reason.unwrap_or_default(),
                }));
            }
        }

        debug!(events = produced, "Test case valid");
        Ok(Verdict::Valid)
    }
}

fn reject(invalid: InvalidTrace) -> Verdict {
    debug!(reason = %invalid, "Test case invalid");
    Verdict::Invalid(invalid)
}

/// Validate every case against a fresh automaton from `factory`, in order.
pub fn validate_all<A: Automaton>(
    cases: &[TestCase],
    factory: impl Fn() -> A,
) -> Vec<Result<Verdict, ValidationError>> {
    info!(case_count = cases.len(), "Validating test cases");
    let results: Vec<_> = cases
        .iter()
        .map(|case| case.validate(&mut factory()))
        .collect();
    log_summary(&results);
    results
}

/// Validate every case against a fresh automaton from `factory`, spread
/// over the rayon thread pool. Results are returned in case order.
#[cfg(feature = "parallel")]
pub fn validate_all_parallel<A, F>(
    cases: &[TestCase],
    factory: F,
) -> Vec<Result<Verdict, ValidationError>>
where
    A: Automaton,
    F: Fn() -> A + Sync,
{
    use rayon::prelude::*;

    info!(case_count = cases.len(), "Validating test cases in parallel");
    let results: Vec<_> = cases
        .par_iter()
        .map(|case| case.validate(&mut factory()))
        .collect();
    log_summary(&results);
    results
}

fn log_summary(results: &[Result<Verdict, ValidationError>]) {
    let valid = results
        .iter()
        .filter(|r| matches!(r, Ok(Verdict::Valid)))
        .count();
    let errors = results.iter().filter(|r| r.is_err()).count();
    info!(
        valid,
        invalid = results.len() - valid - errors,
        errors,
        "Validation finished"
    );
}

/// Produce a unified diff between two renderings.
fn unified_diff(left: &str, right: &str) -> String {
    let diff = TextDiff::from_lines(left, right);
    let mut output = String::new();

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        output.push_str(sign);
        output.push_str(change.value());
        if !change.value().ends_with('\n') {
            output.push('\n');
        }
    }

    output
}
