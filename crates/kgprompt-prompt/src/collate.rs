//! Case-insensitive, numeric-aware string ordering.
//!
//! Strings are compared segment by segment. A run of ASCII digits is one
//! segment compared by numeric value, so `Item2 < Item10`. Letters compare
//! case-folded. Whitespace and punctuation sort before digits, and digits
//! before letters. Strings that differ only in case compare equal; callers
//! break those ties themselves.

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Segment<'a> {
  Other(char),
  /// Significant digits (leading zeros stripped), ordered by length first.
  Number(usize, &'a str),
  Letter(char),
}

struct Segments<'a> {
  rest: &'a str,
}

impl<'a> Iterator for Segments<'a> {
  type Item = Segment<'a>;

  fn next(&mut self) -> Option<Segment<'a>> {
    let c = self.rest.chars().next()?;

    if c.is_ascii_digit() {
      let end = self
        .rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(self.rest.len());
      let (run, rest) = self.rest.split_at(end);
      self.rest = rest;
      let digits = run.trim_start_matches('0');
      return Some(Segment::Number(digits.len(), digits));
    }

    self.rest = &self.rest[c.len_utf8()..];
    if c.is_alphabetic() {
      Some(Segment::Letter(c.to_lowercase().next().unwrap_or(c)))
    } else {
      Some(Segment::Other(c))
    }
  }
}

/// Compare two display names the way a reader expects them listed.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
  Segments { rest: a }.cmp(Segments { rest: b })
}
