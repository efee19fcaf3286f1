//! The fixed, ordered catalog of password rules.
//!
//! Each rule is a pure function from the password variable to a formula built
//! with the combinators of [`pwgame_core::regex`]. Rules never look at each
//! other; their conjunction is what the driver hands to the oracle.
//!
//! Most rules are exact. Three deserve a note:
//! - rule 5 is exact too: the digit sum is a weighted character count
//!   (`'1'..='9'` weigh 1..9) compared to 25
//! - rule 9 is the only strengthened rule (every string it accepts satisfies
//!   the game's rule): it fixes the roman numerals to exactly `V` and `VII`
//! - rule 10 is the one intentional literal, the captcha shown by one game
//!   session

use crate::error::RuleError;
use crate::redundancy::{DEFAULT_BOUND, RedundancyClaim};
use pwgame_core::regex::{any_literal, class, concat, containing, literal, range, star};
use pwgame_core::{CharRange, CharSet, ConstructionError, Formula, StrVar};
use pwgame_solver::satisfies;
use std::fmt;

/// Name of the password variable in every rule.
pub const VARIABLE: &str = "password";

/// Month names accepted by rule 6 (lowercase convention).
pub const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Sponsors accepted by rule 8 (lowercase convention).
pub const SPONSORS: [&str; 3] = ["starbucks", "pepsi", "shell"];

/// Captcha shown by the game session the catalog was written against.
pub const CAPTCHA: &str = "dmgx7";

/// Characters the game reads as roman numerals.
pub const ROMAN_NUMERALS: &str = "IVXLCDM";

/// Total the digits must add up to (rule 5).
pub const DIGIT_SUM: u64 = 25;

/// Number of rules in the standard catalog.
pub const RULE_COUNT: usize = 11;

/// Builds the formula of one rule.
pub type RuleFn = fn(&StrVar) -> Result<Formula, ConstructionError>;

/// One entry of the catalog.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    index: usize,
    name: &'static str,
    description: &'static str,
    build: RuleFn,
    implemented: bool,
}

impl Rule {
    /// Create an implemented rule.
    #[must_use]
    pub fn new(index: usize, name: &'static str, description: &'static str, build: RuleFn) -> Self {
        Self {
            index,
            name,
            description,
            build,
            implemented: true,
        }
    }

    /// Same rule, marked pending.
    #[must_use]
    pub fn pending(mut self) -> Self {
        self.implemented = false;
        self
    }

    /// Position in the catalog.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Short identifier, e.g. `digit`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Requirement as the game states it.
    #[must_use]
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Check if the rule has an encoding.
    #[must_use]
    pub fn is_implemented(&self) -> bool {
        self.implemented
    }

    /// Formula of the rule over `var`.
    pub fn formula(&self, var: &StrVar) -> Result<Formula, RuleError> {
        if !self.implemented {
            return Err(RuleError::NotImplemented { index: self.index });
        }
        Ok((self.build)(var)?)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule {} ({}): {}", self.index, self.name, self.description)
    }
}

const RULES: [(&str, &str, RuleFn); RULE_COUNT] = [
    ("ascii", "The password consists of printable ASCII characters", ascii_only),
    ("length", "Your password must be at least 5 characters (and at most 40), without spaces", length_without_spaces),
    ("digit", "Your password must include a number", has_digit),
    ("uppercase", "Your password must include an uppercase letter", has_uppercase),
    ("special", "Your password must include a special character", has_special),
    ("digit-sum", "The digits in your password must add up to 25", digits_add_up),
    ("month", "Your password must include a month of the year", has_month),
    ("roman", "Your password must include a roman numeral", has_roman_numeral),
    ("sponsor", "Your password must include one of our sponsors", has_sponsor),
    ("roman-product", "The roman numerals in your password should multiply to 35", roman_product),
    ("captcha", "Your password must include this CAPTCHA", has_captcha),
];

/// Ordered list of rules, possibly with a pending tail.
#[derive(Debug, Clone)]
pub struct Catalog {
    rules: Vec<Rule>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    /// All rules, all implemented.
    #[must_use]
    pub fn standard() -> Self {
        Self::truncated(RULE_COUNT)
    }

    /// All rules, with only the first `implemented` of them encoded.
    #[must_use]
    pub fn truncated(implemented: usize) -> Self {
        let rules = RULES
            .iter()
            .enumerate()
            .map(|(index, &(name, description, build))| {
                let rule = Rule::new(index, name, description, build);
                if index < implemented { rule } else { rule.pending() }
            })
            .collect();
        Self { rules }
    }

    /// Catalog of custom rules, renumbered in the given order.
    #[must_use]
    pub fn from_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        let rules = rules
            .into_iter()
            .enumerate()
            .map(|(index, rule)| Rule { index, ..rule })
            .collect();
        Self { rules }
    }

    /// Number of rules, pending ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the catalog has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of implemented rules.
    #[must_use]
    pub fn implemented(&self) -> usize {
        self.rules.iter().filter(|r| r.implemented).count()
    }

    /// Rule at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    /// Rules in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Indices of implemented rules that `witness` violates.
    pub fn violations(&self, var: &StrVar, witness: &str) -> Result<Vec<usize>, RuleError> {
        let mut violated = Vec::new();
        for rule in self.rules.iter().filter(|r| r.implemented) {
            if !satisfies(&rule.formula(var)?, var, witness) {
                violated.push(rule.index);
            }
        }
        Ok(violated)
    }

    /// Check a concrete string against every implemented rule.
    pub fn conforms(&self, var: &StrVar, witness: &str) -> Result<bool, RuleError> {
        Ok(self.violations(var, witness)?.is_empty())
    }

    /// Rules of this catalog that follow from others, with their support.
    ///
    /// - a digit sum of 25 needs a digit (2 from 0 and 5)
    /// - `V·VII` has an uppercase letter (3 from 0 and 9)
    /// - `V·VII` has a roman numeral (7 from 0 and 9)
    ///
    /// Claims mentioning a pending rule are left out.
    #[must_use]
    pub fn redundancy_claims(&self) -> Vec<RedundancyClaim> {
        let implemented = |index: usize| self.get(index).is_some_and(Rule::is_implemented);
        [
            RedundancyClaim::new(2, [0, 5], DEFAULT_BOUND),
            RedundancyClaim::new(3, [0, 9], DEFAULT_BOUND),
            RedundancyClaim::new(7, [0, 9], DEFAULT_BOUND),
        ]
        .into_iter()
        .filter(|claim| {
            implemented(claim.candidate()) && claim.support().iter().all(|&i| implemented(i))
        })
        .collect()
    }
}

// ============================================================================
// Rule encodings
// ============================================================================

fn ascii_only(p: &StrVar) -> Result<Formula, ConstructionError> {
    Ok(p.in_re(star(range(' ', '~')?)))
}

fn length_without_spaces(p: &StrVar) -> Result<Formula, ConstructionError> {
    Ok(Formula::and([
        p.len().ge(5),
        p.len().le(40),
        !p.in_re(containing(literal(" ")?)),
    ]))
}

fn has_digit(p: &StrVar) -> Result<Formula, ConstructionError> {
    Ok(p.in_re(containing(range('0', '9')?)))
}

fn has_uppercase(p: &StrVar) -> Result<Formula, ConstructionError> {
    Ok(p.in_re(containing(range('A', 'Z')?)))
}

/// Printable ASCII punctuation: everything but letters, digits and space.
fn special_characters() -> Result<CharSet, ConstructionError> {
    CharSet::from_ranges([
        CharRange::new('!', '/')?,
        CharRange::new(':', '@')?,
        CharRange::new('[', '`')?,
        CharRange::new('{', '~')?,
    ])
}

fn has_special(p: &StrVar) -> Result<Formula, ConstructionError> {
    Ok(p.in_re(containing(class(&special_characters()?))))
}

fn digits_add_up(p: &StrVar) -> Result<Formula, ConstructionError> {
    let mut weights = Vec::with_capacity(9);
    for (digit, weight) in ('1'..='9').zip(1u32..) {
        weights.push((CharSet::range(digit, digit)?, weight));
    }
    Ok(p.weighted_count(weights).eq(DIGIT_SUM))
}

fn has_month(p: &StrVar) -> Result<Formula, ConstructionError> {
    Ok(p.in_re(containing(any_literal(MONTHS)?)))
}

fn roman_numerals() -> Result<CharSet, ConstructionError> {
    CharSet::chars(ROMAN_NUMERALS)
}

fn has_roman_numeral(p: &StrVar) -> Result<Formula, ConstructionError> {
    Ok(p.in_re(containing(class(&roman_numerals()?))))
}

fn has_sponsor(p: &StrVar) -> Result<Formula, ConstructionError> {
    Ok(p.in_re(containing(any_literal(SPONSORS)?)))
}

/// `V`, one non-roman character, `VII`, and no other roman numeral anywhere:
/// the numerals read as 5 and 7.
fn roman_product(p: &StrVar) -> Result<Formula, ConstructionError> {
    let separator = CharSet::range('a', 'z')?
        .union(&CharSet::range('0', '9')?)
        .union(&special_characters()?);
    let pattern = concat([literal("V")?, class(&separator), literal("VII")?]);
    Ok(Formula::and([
        p.in_re(containing(pattern)),
        p.count(roman_numerals()?).eq(4),
    ]))
}

fn has_captcha(p: &StrVar) -> Result<Formula, ConstructionError> {
    Ok(p.in_re(containing(literal(CAPTCHA)?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(index: usize, witness: &str) -> bool {
        let p = StrVar::new("password");
        let formula = Catalog::standard().get(index).unwrap().formula(&p).unwrap();
        satisfies(&formula, &p, witness)
    }

    #[test]
    fn test_every_rule_builds() {
        let p = StrVar::new("password");
        let catalog = Catalog::standard();
        assert_eq!(catalog.len(), RULE_COUNT);
        for rule in catalog.iter() {
            assert!(rule.formula(&p).is_ok(), "{}", rule);
        }
    }

    #[test]
    fn test_ascii_only() {
        assert!(check(0, ""));
        assert!(check(0, "Hello, World! ~"));
        assert!(!check(0, "tab\there"));
        assert!(!check(0, "caf\u{e9}"));
    }

    #[test]
    fn test_length_without_spaces() {
        assert!(!check(1, "abcd"));
        assert!(check(1, "abcde"));
        assert!(check(1, &"a".repeat(40)));
        assert!(!check(1, &"a".repeat(41)));
        assert!(!check(1, "abc de"));
        assert!(!check(1, " abcde"));
    }

    #[test]
    fn test_character_classes() {
        assert!(check(2, "a1"));
        assert!(!check(2, "abc"));
        assert!(check(3, "aB"));
        assert!(!check(3, "ab"));
        for c in "!/:@[`{~".chars() {
            assert!(check(4, &format!("a{}", c)), "{:?}", c);
        }
        assert!(!check(4, "aZ09 "));
    }

    #[test]
    fn test_digit_sum() {
        assert!(check(5, "dmgx799"));
        assert!(check(5, "a9b8c8"));
        assert!(check(5, "0000997"));
        assert!(!check(5, "997x1"));
        assert!(!check(5, "99"));
    }

    #[test]
    fn test_month_and_sponsor_are_lowercase() {
        assert!(check(6, "xmayx"));
        assert!(check(6, "september"));
        assert!(!check(6, "May"));
        assert!(check(8, "pepsi"));
        assert!(check(8, "astarbucks"));
        assert!(!check(8, "Shell"));
    }

    #[test]
    fn test_roman_numeral_is_uppercase() {
        assert!(check(7, "xIx"));
        assert!(!check(7, "civic"));
    }

    #[test]
    fn test_roman_product() {
        assert!(check(9, "V!VII"));
        assert!(check(9, "abV7VIIcd"));
        // product is still 35, but the numerals are not V and VII
        assert!(!check(9, "VIIaV"));
        // extra numeral changes the product
        assert!(!check(9, "V!VIIX"));
        assert!(!check(9, "V VII"));
        assert!(!check(9, "VXVII"));
    }

    #[test]
    fn test_captcha() {
        assert!(check(10, "dmgx7"));
        assert!(!check(10, "dmgx"));
    }

    #[test]
    fn test_truncated_marks_tail_pending() {
        let p = StrVar::new("password");
        let catalog = Catalog::truncated(3);
        assert_eq!(catalog.implemented(), 3);
        assert!(catalog.get(2).unwrap().formula(&p).is_ok());
        assert_eq!(
            catalog.get(3).unwrap().formula(&p),
            Err(RuleError::NotImplemented { index: 3 })
        );
    }

    #[test]
    fn test_conformance() {
        let p = StrVar::new("password");
        let catalog = Catalog::truncated(3);
        assert!(catalog.conforms(&p, "abcd1").unwrap());
        assert_eq!(catalog.violations(&p, "ab1").unwrap(), vec![1]);
        assert_eq!(catalog.violations(&p, "ab cd").unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_claims_follow_implemented_rules() {
        assert_eq!(Catalog::standard().redundancy_claims().len(), 3);
        let partial = Catalog::truncated(6);
        let claims = partial.redundancy_claims();
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].candidate(), 2);
        assert!(Catalog::truncated(2).redundancy_claims().is_empty());
    }

    #[test]
    fn test_known_witness_conforms_to_all() {
        let p = StrVar::new("password");
        assert!(Catalog::standard().conforms(&p, "V!VIImaypepsidmgx799").unwrap());
    }
}
