//! ASCII character ranges and classes.

use crate::error::{ConstructionError, Result};
use smallvec::SmallVec;
use std::fmt;

/// Largest code point of the working universe.
pub const ASCII_MAX: u8 = 0x7F;

/// Inclusive range of ASCII code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharRange {
    lo: u8,
    hi: u8,
}

impl CharRange {
    /// Printable ASCII, `' '..='~'`.
    pub const PRINTABLE: CharRange = CharRange { lo: 0x20, hi: 0x7E };

    /// Create the range `lo..=hi`.
    pub fn new(lo: char, hi: char) -> Result<Self> {
        let lo_byte = ascii_byte(lo)?;
        let hi_byte = ascii_byte(hi)?;
        if lo_byte > hi_byte {
            return Err(ConstructionError::InvertedRange { lo, hi });
        }
        Ok(Self {
            lo: lo_byte,
            hi: hi_byte,
        })
    }

    /// Range holding a single character.
    pub fn single(c: char) -> Result<Self> {
        Self::new(c, c)
    }

    /// Lower bound.
    #[must_use]
    pub fn lo(&self) -> u8 {
        self.lo
    }

    /// Upper bound (inclusive).
    #[must_use]
    pub fn hi(&self) -> u8 {
        self.hi
    }

    /// Number of code points in the range.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.hi - self.lo) + 1
    }

    /// Ranges are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check whether `c` lies in the range.
    #[must_use]
    pub fn contains(&self, c: char) -> bool {
        u8::try_from(u32::from(c)).is_ok_and(|b| self.contains_byte(b))
    }

    /// Check whether the code point `b` lies in the range.
    #[must_use]
    pub fn contains_byte(&self, b: u8) -> bool {
        self.lo <= b && b <= self.hi
    }
}

impl fmt::Display for CharRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lo == self.hi {
            write!(f, "{:?}", char::from(self.lo))
        } else {
            write!(f, "{:?}-{:?}", char::from(self.lo), char::from(self.hi))
        }
    }
}

fn ascii_byte(c: char) -> Result<u8> {
    match u8::try_from(u32::from(c)) {
        Ok(b) if b <= ASCII_MAX => Ok(b),
        _ => Err(ConstructionError::NonAscii { ch: c }),
    }
}

/// Non-empty set of characters given as a union of ranges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharSet {
    ranges: SmallVec<[CharRange; 4]>,
}

impl CharSet {
    /// Set of the characters `lo..=hi`.
    pub fn range(lo: char, hi: char) -> Result<Self> {
        Ok(Self::from(CharRange::new(lo, hi)?))
    }

    /// Set of the characters appearing in `chars`.
    pub fn chars(chars: &str) -> Result<Self> {
        Self::from_ranges(
            chars
                .chars()
                .map(CharRange::single)
                .collect::<Result<Vec<_>>>()?,
        )
    }

    /// Union of the given ranges.
    pub fn from_ranges(ranges: impl IntoIterator<Item = CharRange>) -> Result<Self> {
        let ranges: SmallVec<[CharRange; 4]> = ranges.into_iter().collect();
        if ranges.is_empty() {
            return Err(ConstructionError::EmptyUnion);
        }
        Ok(Self { ranges })
    }

    /// Union with another set.
    #[must_use]
    pub fn union(mut self, other: &CharSet) -> Self {
        self.ranges.extend(other.ranges.iter().copied());
        self
    }

    /// Ranges making up the set (may overlap).
    #[must_use]
    pub fn ranges(&self) -> &[CharRange] {
        &self.ranges
    }

    /// Check whether `c` is in the set.
    #[must_use]
    pub fn contains(&self, c: char) -> bool {
        self.ranges.iter().any(|r| r.contains(c))
    }

    /// Check whether the code point `b` is in the set.
    #[must_use]
    pub fn contains_byte(&self, b: u8) -> bool {
        self.ranges.iter().any(|r| r.contains_byte(b))
    }
}

impl From<CharRange> for CharSet {
    fn from(range: CharRange) -> Self {
        let mut ranges = SmallVec::new();
        ranges.push(range);
        Self { ranges }
    }
}

impl fmt::Display for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", range)?;
        }
        write!(f, "]")
    }
}
