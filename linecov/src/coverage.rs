//! Line coverage table of a single source file.
//!
//! A [`Coverage`] has one slot per source line, starting from line 1. A slot is `None` when the line contains no
//! executable code, or `Some(count)` with the number of times the line has been executed.
//!
//! [`Coverage`]: ./struct.Coverage.html

use std::ops::Index;

/// Execution count of one source line. `None` marks a non-executable line.
pub type LineCount = Option<u64>;

/// Line coverage of a source file, serialized as a plain JSON array (`null` for non-executable lines).
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Coverage {
    lines: Vec<LineCount>,
}

impl Coverage {
    /// Creates an empty table.
    pub fn new() -> Coverage {
        Coverage::default()
    }

    /// Number of lines in the table.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the table has no lines at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Appends the count of the next line.
    pub fn push(&mut self, count: LineCount) {
        self.lines.push(count);
    }

    /// Merges the coverage of the same source file reported by another translation unit.
    ///
    /// The merge is applied line by line, growing `self` when `other` is longer:
    ///
    /// | `self` | `other` | Result |
    /// |--------|---------|--------|
    /// | (absent) | `x` | `x` |
    /// | `None` | `x` | `x` |
    /// | `Some(0)` | `Some(n)` | `Some(n)` |
    /// | `Some(m)` | `Some(n)` | `Some(m + n)` |
    /// | `Some(m)` | `None` | `Some(m)` |
    ///
    /// A line stays non-executable only if every unit says so. Hit counts are summed across units, so merging the
    /// same report twice doubles its counts.
    pub fn merge(&mut self, other: &Coverage) {
        let common = self.lines.len().min(other.lines.len());
        for (target, &incoming) in self.lines.iter_mut().zip(&other.lines[..common]) {
            *target = match (*target, incoming) {
                (None, x) => x,
                (Some(m), Some(n)) => Some(m.saturating_add(n)),
                (t, None) => t,
            };
        }
        self.lines.extend_from_slice(&other.lines[common..]);
    }

    /// Number of executable lines.
    pub fn lines_count(&self) -> usize {
        self.lines.iter().filter(|c| c.is_some()).count()
    }

    /// Number of executable lines which have been executed at least once.
    pub fn lines_covered(&self) -> usize {
        self.lines.iter().filter(|c| c.map_or(false, |n| n > 0)).count()
    }
}

impl From<Vec<LineCount>> for Coverage {
    fn from(lines: Vec<LineCount>) -> Coverage {
        Coverage { lines }
    }
}

impl From<Coverage> for Vec<LineCount> {
    fn from(coverage: Coverage) -> Vec<LineCount> {
        coverage.lines
    }
}

impl Index<usize> for Coverage {
    type Output = LineCount;
    fn index(&self, index: usize) -> &LineCount {
        &self.lines[index]
    }
}

#[cfg(test)]
fn merged(target: Vec<LineCount>, incoming: Vec<LineCount>) -> Vec<LineCount> {
    let mut coverage = Coverage::from(target);
    coverage.merge(&Coverage::from(incoming));
    coverage.into()
}

#[test]
fn test_merge_precedence() {
    assert_eq!(merged(vec![None], vec![Some(5)]), vec![Some(5)]);
    assert_eq!(merged(vec![Some(0)], vec![Some(5)]), vec![Some(5)]);
    assert_eq!(merged(vec![Some(3)], vec![Some(5)]), vec![Some(8)]);
    assert_eq!(merged(vec![Some(3)], vec![None]), vec![Some(3)]);
    assert_eq!(merged(vec![Some(0)], vec![None]), vec![Some(0)]);
    assert_eq!(merged(vec![None], vec![None]), vec![None]);
    assert_eq!(merged(vec![None], vec![Some(0)]), vec![Some(0)]);
}

#[test]
fn test_merge_length() {
    let cases = [
        (vec![], vec![]),
        (vec![], vec![Some(1), None]),
        (vec![Some(1), None, Some(0)], vec![]),
        (vec![Some(1)], vec![None, Some(2), Some(3)]),
        (vec![None, None, Some(4)], vec![Some(7)]),
    ];
    for &(ref target, ref incoming) in &cases {
        let expected_len = target.len().max(incoming.len());
        assert_eq!(merged(target.clone(), incoming.clone()).len(), expected_len);
    }
}

#[test]
fn test_merge_extends_with_tail() {
    assert_eq!(
        merged(vec![Some(1), None], vec![Some(2), Some(3), None, Some(0)]),
        vec![Some(3), Some(3), None, Some(0)]
    );
}

#[test]
fn test_merge_twice_accumulates() {
    let report = Coverage::from(vec![None, Some(2), Some(0), Some(5)]);
    let mut coverage = Coverage::new();
    coverage.merge(&report);
    coverage.merge(&report);
    assert_eq!(Vec::from(coverage), vec![None, Some(4), Some(0), Some(10)]);
}

#[test]
fn test_merge_saturates() {
    assert_eq!(merged(vec![Some(u64::max_value())], vec![Some(1)]), vec![Some(u64::max_value())]);
}

#[test]
fn test_line_summary() {
    let coverage = Coverage::from(vec![None, Some(2), Some(0), None, Some(1)]);
    assert_eq!(coverage.lines_count(), 3);
    assert_eq!(coverage.lines_covered(), 2);
}

#[test]
fn test_serialize_as_array() {
    let coverage = Coverage::from(vec![None, Some(2), Some(0)]);
    assert_eq!(::serde_json::to_string(&coverage).unwrap(), "[null,2,0]");
}
