//! Construction errors for regular-language expressions.

use thiserror::Error;

/// A regular-language expression or character class could not be built.
///
/// Raised when a rule is defined, never later: a malformed range must not
/// degrade into the empty or the full language.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// Range whose lower bound is above its upper bound.
    #[error("inverted character range {lo:?}..={hi:?}")]
    InvertedRange {
        /// Lower bound as written
        lo: char,
        /// Upper bound as written
        hi: char,
    },
    /// Character outside the ASCII alphabet (above U+007F).
    #[error("character {ch:?} is outside the ASCII alphabet")]
    NonAscii {
        /// Offending character
        ch: char,
    },
    /// Union or character class with no alternatives.
    #[error("union of zero alternatives")]
    EmptyUnion,
}

/// Result type for expression construction.
pub type Result<T> = std::result::Result<T, ConstructionError>;
