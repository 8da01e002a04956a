//! Line diff between two flattened snapshots

use crate::error::Result;
use crate::flatten::flatten_lines;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// One signed line of a diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    /// Present before, absent after
    Removed(String),
    /// Absent before, present after
    Added(String),
}

impl DiffLine {
    /// The unsigned `path=value` line
    pub fn line(&self) -> &str {
        match self {
            Self::Removed(line) | Self::Added(line) => line,
        }
    }

    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added(_))
    }
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Removed(line) => write!(f, "-{line}"),
            Self::Added(line) => write!(f, "+{line}"),
        }
    }
}

/// Only the lines that differ between two snapshots, in sorted order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineDiff {
    pub lines: Vec<DiffLine>,
}

impl LineDiff {
    /// Diff two serializable snapshots
    ///
    /// Both sides go through their serde wire form first, so renamed fields
    /// appear under the names the platform uses.
    pub fn compute<A, B>(before: &A, after: &B) -> Result<Self>
    where
        A: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let before = serde_json::to_value(before)?;
        let after = serde_json::to_value(after)?;
        Ok(Self::between(&before, &after))
    }

    /// Diff two already-parsed snapshots
    pub fn between(before: &Value, after: &Value) -> Self {
        let before = flatten_lines(before);
        let after = flatten_lines(after);
        Self {
            lines: merge(before, after),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn additions(&self) -> usize {
        self.lines.iter().filter(|l| l.is_added()).count()
    }

    pub fn removals(&self) -> usize {
        self.lines.len() - self.additions()
    }
}

impl fmt::Display for LineDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Walk two sorted line lists together, keeping lines found on one side only
///
/// Repeated lines are matched one-for-one, so three copies before and two
/// after yield a single removal.
fn merge(before: Vec<String>, after: Vec<String>) -> Vec<DiffLine> {
    let mut out = Vec::new();
    let mut before = before.into_iter().peekable();
    let mut after = after.into_iter().peekable();

    loop {
        let order = match (before.peek(), after.peek()) {
            (Some(b), Some(a)) => b.cmp(a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => break,
        };
        match order {
            Ordering::Equal => {
                before.next();
                after.next();
            }
            Ordering::Less => out.extend(before.next().map(DiffLine::Removed)),
            Ordering::Greater => out.extend(after.next().map(DiffLine::Added)),
        }
    }

    out
}

/// Diff two snapshots and render the result as `-`/`+` prefixed lines
///
/// Unchanged lines are never emitted. Structurally mismatched snapshots are
/// not an error; they simply produce more lines.
pub fn flat_diff<A, B>(before: &A, after: &B) -> Result<String>
where
    A: Serialize + ?Sized,
    B: Serialize + ?Sized,
{
    Ok(LineDiff::compute(before, after)?.to_string())
}
