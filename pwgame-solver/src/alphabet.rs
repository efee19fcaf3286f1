//! Character classes over the ASCII universe.
//!
//! Two characters land in the same class when no range of the formula
//! separates them, so every automaton and counter treats them alike and the
//! search only has to try one representative per class.

use pwgame_core::{ASCII_MAX, CharRange};
use rustc_hash::FxHashMap;

const UNIVERSE: usize = ASCII_MAX as usize + 1;

/// Partition of ASCII into equivalence classes.
#[derive(Debug, Clone)]
pub struct Alphabet {
    class_of: [u16; UNIVERSE],
    representatives: Vec<u8>,
}

impl Alphabet {
    /// Coarsest partition refining every range in `ranges`.
    pub fn from_ranges(ranges: impl IntoIterator<Item = CharRange>, prefer_readable: bool) -> Self {
        let mut distinct: Vec<CharRange> = ranges.into_iter().collect();
        distinct.sort_unstable();
        distinct.dedup();

        let words = distinct.len().div_ceil(64).max(1);
        let mut by_signature: FxHashMap<Vec<u64>, u16> = FxHashMap::default();
        let mut class_of = [0u16; UNIVERSE];
        let mut members: Vec<Vec<u8>> = Vec::new();

        for byte in 0..=ASCII_MAX {
            let mut signature = vec![0u64; words];
            for (i, range) in distinct.iter().enumerate() {
                if range.contains_byte(byte) {
                    signature[i / 64] |= 1u64 << (i % 64);
                }
            }
            let next_id = members.len() as u16;
            let id = *by_signature.entry(signature).or_insert(next_id);
            if id == next_id {
                members.push(Vec::new());
            }
            members[usize::from(id)].push(byte);
            class_of[usize::from(byte)] = id;
        }

        let representatives = members
            .iter()
            .map(|bytes| {
                let pick = if prefer_readable {
                    bytes.iter().min_by_key(|&&b| (readability(b), b))
                } else {
                    bytes.first()
                };
                pick.copied().unwrap_or(0)
            })
            .collect();

        Self {
            class_of,
            representatives,
        }
    }

    /// Number of classes.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.representatives.len()
    }

    /// Class of an ASCII code point.
    #[must_use]
    pub fn class_of(&self, byte: u8) -> usize {
        usize::from(self.class_of[usize::from(byte & ASCII_MAX)])
    }

    /// Character standing for `class` in witnesses.
    #[must_use]
    pub fn representative(&self, class: usize) -> u8 {
        self.representatives[class]
    }
}

fn readability(b: u8) -> u8 {
    match b {
        b'a'..=b'z' => 0,
        b'A'..=b'Z' => 1,
        b'0'..=b'9' => 2,
        b'!'..=b'~' => 3,
        b' ' => 4,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_range_splits_in_two() {
        let alphabet = Alphabet::from_ranges([CharRange::new('0', '9').unwrap()], true);
        assert_eq!(alphabet.num_classes(), 2);
        assert_eq!(alphabet.class_of(b'3'), alphabet.class_of(b'7'));
        assert_ne!(alphabet.class_of(b'3'), alphabet.class_of(b'a'));
    }

    #[test]
    fn test_disjoint_outside_regions_merge() {
        // Bytes below and above the printable range are indistinguishable.
        let alphabet = Alphabet::from_ranges([CharRange::PRINTABLE], true);
        assert_eq!(alphabet.num_classes(), 2);
        assert_eq!(alphabet.class_of(0x00), alphabet.class_of(0x7F));
    }

    #[test]
    fn test_overlapping_ranges_refine() {
        let alphabet = Alphabet::from_ranges(
            [
                CharRange::new('a', 'z').unwrap(),
                CharRange::single('m').unwrap(),
            ],
            true,
        );
        // outside, a-l/n-z, m
        assert_eq!(alphabet.num_classes(), 3);
        assert_eq!(alphabet.class_of(b'a'), alphabet.class_of(b'z'));
        assert_ne!(alphabet.class_of(b'a'), alphabet.class_of(b'm'));
    }

    #[test]
    fn test_readable_representatives() {
        let alphabet = Alphabet::from_ranges([CharRange::PRINTABLE], true);
        let printable = alphabet.class_of(b'x');
        assert_eq!(alphabet.representative(printable), b'a');

        let raw = Alphabet::from_ranges([CharRange::PRINTABLE], false);
        assert_eq!(raw.representative(raw.class_of(b'x')), b' ');
    }

    #[test]
    fn test_empty_input_single_class() {
        let alphabet = Alphabet::from_ranges(std::iter::empty(), true);
        assert_eq!(alphabet.num_classes(), 1);
        assert_eq!(alphabet.representative(0), b'a');
    }
}
