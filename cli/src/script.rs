//! Operation scripts.
//!
//! A script is a JSON array of steps, each one an object whose `op` field
//! names the operation, for example:
//!
//! ```json
//! [
//!   { "op": "range", "start": 0, "end": 100 },
//!   { "op": "save", "name": "numbers" },
//!   { "op": "slice", "from": 10, "to": -10 },
//!   { "op": "concat", "name": "numbers" },
//!   { "op": "expect_len", "len": 180 },
//!   { "op": "report" }
//! ]
//! ```
//!
//! Steps act on a current sequence, which starts out empty. Sequences can be
//! saved under a name and used again later; since they are persistent, saving
//! one is just a clone.

use std::collections::HashMap;

use log::debug;
use rrb_seq::{Sequence, Shape};
use serde::{Deserialize, Serialize};

use crate::error::{CliResult, Error};

pub type Value = i64;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Replaces the current sequence with `start..end`.
    Range { start: Value, end: Value },
    /// Replaces the current sequence with the given elements.
    Elements { values: Vec<Value> },
    Append { value: Value },
    Prepend { value: Value },
    Update { index: usize, value: Value },
    Insert { index: usize, value: Value },
    Remove { from: usize, count: usize },
    Slice { from: isize, to: isize },
    Take { count: usize },
    Skip { count: usize },
    Reverse,
    /// Concatenates a saved sequence after the current one.
    Concat { name: String },
    /// Concatenates a saved sequence before the current one.
    ConcatFront { name: String },
    Save { name: String },
    Load { name: String },
    ExpectLen { len: usize },
    ExpectGet { index: usize, value: Option<Value> },
    ExpectElements { values: Vec<Value> },
    /// Records the elements and the shape of the current sequence.
    Report,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub step: usize,
    pub elements: Vec<Value>,
    pub shape: Shape,
}

pub fn parse(source: &str) -> CliResult<Vec<Step>> {
    serde_json::from_str(source).map_err(|error| Error::Parse { error })
}

/// The state of a script being replayed.
#[derive(Default)]
pub struct Replay {
    current: Sequence<Value>,
    saved: HashMap<String, Sequence<Value>>,
    /// Whether to check the structural invariants after every step.
    check: bool,
    reports: Vec<Report>,
}

impl Replay {
    pub fn new(check: bool) -> Self {
        Replay {
            check,
            ..Replay::default()
        }
    }

    pub fn run(mut self, steps: &[Step]) -> CliResult<Vec<Report>> {
        for (i, step) in steps.iter().enumerate() {
            self.apply(i + 1, step)?;
        }
        Ok(self.reports)
    }

    fn saved(&self, step: usize, name: &str) -> CliResult<&Sequence<Value>> {
        self.saved.get(name).ok_or_else(|| Error::UnknownName {
            step,
            name: name.to_owned(),
        })
    }

    /// Applies a single step. Steps are numbered from 1 in errors and
    /// reports.
    pub fn apply(&mut self, step: usize, op: &Step) -> CliResult<()> {
        debug!("step {step}: {op:?}");

        let seq = &self.current;
        let next = match op {
            Step::Range { start, end } => Sequence::range(*start, *end),
            Step::Elements { values } => Sequence::from_slice(values),
            Step::Append { value } => seq.append(*value),
            Step::Prepend { value } => seq.prepend(*value),
            Step::Update { index, value } => seq.update(*index, *value),
            Step::Insert { index, value } => seq.insert(*index, *value),
            Step::Remove { from, count } => seq.remove(*from, *count),
            Step::Slice { from, to } => seq.slice(*from, *to),
            Step::Take { count } => seq.take(*count),
            Step::Skip { count } => seq.skip(*count),
            Step::Reverse => seq.reverse(),
            Step::Concat { name } => seq.concat(self.saved(step, name)?),
            Step::ConcatFront { name } => self.saved(step, name)?.concat(seq),
            Step::Save { name } => {
                self.saved.insert(name.clone(), seq.clone());
                return Ok(());
            }
            Step::Load { name } => self.saved(step, name)?.clone(),
            Step::ExpectLen { len } => {
                return expect(step, len, &seq.len());
            }
            Step::ExpectGet { index, value } => {
                return expect(step, value, &seq.get(*index).copied());
            }
            Step::ExpectElements { values } => {
                return expect(step, values, &seq.iter().copied().collect());
            }
            Step::Report => {
                self.reports.push(Report {
                    step,
                    elements: seq.iter().copied().collect(),
                    shape: seq.shape(),
                });
                return Ok(());
            }
        };

        if self.check {
            next.check_invariants();
        }
        self.current = next;
        Ok(())
    }
}

fn expect<V: PartialEq + std::fmt::Debug>(step: usize, expected: &V, actual: &V) -> CliResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::Expectation {
            step,
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        })
    }
}
