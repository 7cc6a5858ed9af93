use log::warn;

use super::ContainerError;

/// Upper bound on the number of strings a multi-character range produces.
///
/// An odometer range between two long strings can describe an enormous
/// sequence; enumeration stops here and logs a warning.
pub const STRING_RANGE_ITERATION_CAP: usize = 10_000;

/// Integer range, either bounded (`start..end`, `start..=end`) or unbounded (`start..`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LazyRange {
    pub start: i64,
    pub end: Option<i64>,
    pub inclusive: bool,
}

impl LazyRange {
    pub fn new(start: i64, end: Option<i64>, inclusive: bool) -> Self {
        LazyRange {
            start,
            end,
            inclusive,
        }
    }

    pub fn unbounded(start: i64) -> Self {
        Self::new(start, None, false)
    }

    pub fn is_infinite(&self) -> bool {
        self.end.is_none()
    }

    /// The whole sequence, or `None` for an unbounded range.
    pub fn materialize(&self) -> Option<Vec<i64>> {
        self.end?;
        Some(self.iter().collect())
    }

    /// A fresh iterator; calling it again restarts from `start`.
    pub fn iter(&self) -> RangeIter {
        RangeIter {
            next: Some(self.start),
            range: *self,
        }
    }
}

impl std::fmt::Display for LazyRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.end, self.inclusive) {
            (None, _) => write!(f, "{}..", self.start),
            (Some(end), true) => write!(f, "{}..={}", self.start, end),
            (Some(end), false) => write!(f, "{}..{}", self.start, end),
        }
    }
}

pub struct RangeIter {
    next: Option<i64>,
    range: LazyRange,
}

impl Iterator for RangeIter {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let current = self.next?;
        let past_end = match self.range.end {
            None => false,
            Some(end) if self.range.inclusive => current > end,
            Some(end) => current >= end,
        };
        if past_end {
            self.next = None;
            return None;
        }

        self.next = current.checked_add(1);
        Some(current)
    }
}

/// Enumerates a string range: code points for single characters, the
/// odometer sequence otherwise.
pub fn string_range(start: &str, end: &str, inclusive: bool) -> Result<Vec<String>, ContainerError> {
    let mut start_chars = start.chars();
    let mut end_chars = end.chars();

    match (start_chars.next(), start_chars.next(), end_chars.next(), end_chars.next()) {
        (Some(first), None, Some(last), None) => Ok(char_range(first, last, inclusive)),
        _ => odometer_range(start, end, inclusive),
    }
}

pub fn char_range(start: char, end: char, inclusive: bool) -> Vec<String> {
    let (start, end) = (start as u32, end as u32);
    let codes = if inclusive { start..end.saturating_add(1) } else { start..end };

    codes
        .filter_map(char::from_u32)
        .map(String::from)
        .collect()
}

/// Counts from `start` towards `end` like an odometer.
///
/// Both strings must have the same length in characters. The rightmost
/// position turns fastest. A position that runs past the end of its
/// alphabet (`a-z`, `A-Z` or `0-9`, taken from its character in `start`)
/// wraps to the first letter of that alphabet and carries one into the
/// position to its left. Counting stops at `end`, or as soon as the value
/// has passed it.
pub fn odometer_range(start: &str, end: &str, inclusive: bool) -> Result<Vec<String>, ContainerError> {
    let lower: Vec<char> = start.chars().collect();
    let upper: Vec<char> = end.chars().collect();

    if lower.len() != upper.len() {
        return Err(ContainerError::MismatchedRangeBounds {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    let alphabets: Vec<(char, char)> = lower.iter().map(|&c| alphabet(c)).collect();
    let mut produced = vec![];
    let mut current = lower;

    loop {
        if current == upper {
            if inclusive {
                produced.push(current.iter().collect());
            }
            break;
        }
        if current > upper {
            break;
        }

        if produced.len() >= STRING_RANGE_ITERATION_CAP {
            warn!(
                "string range {:?}..{:?} truncated after {} values",
                start, end, STRING_RANGE_ITERATION_CAP
            );
            break;
        }
        produced.push(current.iter().collect());

        if !advance(&mut current, &alphabets) {
            break;
        }
    }

    Ok(produced)
}

/// First and last character of the alphabet `c` counts in.
fn alphabet(c: char) -> (char, char) {
    match c {
        'a'..='z' => ('a', 'z'),
        'A'..='Z' => ('A', 'Z'),
        '0'..='9' => ('0', '9'),
        other => (other, char::MAX),
    }
}

/// Steps `current` once. Returns false when the leftmost position overflowed.
fn advance(current: &mut [char], alphabets: &[(char, char)]) -> bool {
    for position in (0..current.len()).rev() {
        let (first, last) = alphabets[position];
        if current[position] < last {
            current[position] = next_char(current[position]);
            return true;
        }
        current[position] = first;
    }
    false
}

fn next_char(c: char) -> char {
    // Skips the surrogate block, the only gap below `char::MAX`.
    char::from_u32(c as u32 + 1)
        .or_else(|| char::from_u32(0xE000))
        .unwrap_or(char::MAX)
}
