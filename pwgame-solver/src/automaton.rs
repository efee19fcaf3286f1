//! Nondeterministic finite automata for regular-language expressions.
//!
//! Implements:
//! - Thompson construction from [`Regex`]
//! - Epsilon closure
//! - Language membership by on-the-fly subset simulation

use pwgame_core::{CharRange, Regex};

/// State identifier.
pub type StateId = usize;

/// Transition label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Any character of the range
    Range(CharRange),
    /// Epsilon transition (empty string)
    Epsilon,
}

/// Thompson NFA with a single initial and a single accepting state.
#[derive(Debug, Clone)]
pub struct Nfa {
    /// Outgoing transitions per state
    transitions: Vec<Vec<(Symbol, StateId)>>,
    /// Initial state
    initial: StateId,
    /// Accepting state
    accepting: StateId,
}

/// Start and end state of a partially built automaton.
#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: StateId,
    end: StateId,
}

/// Builds one [`Nfa`] by gluing fragments together.
#[derive(Debug, Default)]
pub struct AutomatonBuilder {
    transitions: Vec<Vec<(Symbol, StateId)>>,
}

impl AutomatonBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn add_state(&mut self) -> StateId {
        self.transitions.push(Vec::new());
        self.transitions.len() - 1
    }

    fn add_transition(&mut self, from: StateId, symbol: Symbol, to: StateId) {
        self.transitions[from].push((symbol, to));
    }

    fn fragment(&mut self, regex: &Regex) -> Fragment {
        match regex {
            Regex::Range(range) => {
                let start = self.add_state();
                let end = self.add_state();
                self.add_transition(start, Symbol::Range(*range), end);
                Fragment { start, end }
            }
            Regex::Literal(text) => {
                let start = self.add_state();
                let mut current = start;
                for ch in text.chars() {
                    let next = self.add_state();
                    // Non-ASCII literals never match; the dangling state keeps
                    // the fragment well formed.
                    if let Ok(range) = CharRange::single(ch) {
                        self.add_transition(current, Symbol::Range(range), next);
                    }
                    current = next;
                }
                Fragment {
                    start,
                    end: current,
                }
            }
            Regex::Concat(parts) => {
                let start = self.add_state();
                let mut end = start;
                for part in parts {
                    let piece = self.fragment(part);
                    self.add_transition(end, Symbol::Epsilon, piece.start);
                    end = piece.end;
                }
                Fragment { start, end }
            }
            Regex::Union(parts) => {
                let start = self.add_state();
                let end = self.add_state();
                for part in parts {
                    let piece = self.fragment(part);
                    self.add_transition(start, Symbol::Epsilon, piece.start);
                    self.add_transition(piece.end, Symbol::Epsilon, end);
                }
                Fragment { start, end }
            }
            Regex::Star(inner) => {
                let start = self.add_state();
                let end = self.add_state();
                let piece = self.fragment(inner);
                self.add_transition(start, Symbol::Epsilon, piece.start);
                self.add_transition(start, Symbol::Epsilon, end);
                self.add_transition(piece.end, Symbol::Epsilon, piece.start);
                self.add_transition(piece.end, Symbol::Epsilon, end);
                Fragment { start, end }
            }
        }
    }

    /// Compile `regex` into an automaton.
    #[must_use]
    pub fn build(mut self, regex: &Regex) -> Nfa {
        let Fragment { start, end } = self.fragment(regex);
        Nfa {
            transitions: self.transitions,
            initial: start,
            accepting: end,
        }
    }
}

impl Nfa {
    /// Thompson construction for `regex`.
    #[must_use]
    pub fn from_regex(regex: &Regex) -> Self {
        AutomatonBuilder::new().build(regex)
    }

    /// Number of states.
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.transitions.len()
    }

    /// Epsilon closure of the initial state, sorted.
    #[must_use]
    pub fn initial_states(&self) -> Vec<StateId> {
        self.epsilon_closure(std::iter::once(self.initial))
    }

    /// Check whether any state of `states` is accepting.
    #[must_use]
    pub fn is_accepting(&self, states: &[StateId]) -> bool {
        states.binary_search(&self.accepting).is_ok()
    }

    /// Compute the sorted epsilon closure of `seeds`.
    pub fn epsilon_closure(&self, seeds: impl IntoIterator<Item = StateId>) -> Vec<StateId> {
        let mut seen = vec![false; self.transitions.len()];
        let mut stack: Vec<StateId> = Vec::new();
        for state in seeds {
            if !seen[state] {
                seen[state] = true;
                stack.push(state);
            }
        }
        let mut closure = Vec::new();
        while let Some(state) = stack.pop() {
            closure.push(state);
            for &(symbol, dest) in &self.transitions[state] {
                if symbol == Symbol::Epsilon && !seen[dest] {
                    seen[dest] = true;
                    stack.push(dest);
                }
            }
        }
        closure.sort_unstable();
        closure
    }

    /// States reached from `states` by reading the code point `byte`,
    /// closed under epsilon.
    #[must_use]
    pub fn step(&self, states: &[StateId], byte: u8) -> Vec<StateId> {
        let targets = states.iter().flat_map(|&state| {
            self.transitions[state]
                .iter()
                .filter_map(move |&(symbol, dest)| match symbol {
                    Symbol::Range(range) if range.contains_byte(byte) => Some(dest),
                    _ => None,
                })
        });
        self.epsilon_closure(targets)
    }

    /// Check if a string is accepted by the automaton.
    #[must_use]
    pub fn accepts(&self, input: &str) -> bool {
        let mut current = self.initial_states();
        for ch in input.chars() {
            if !ch.is_ascii() {
                return false;
            }
            current = self.step(&current, ch as u8);
            if current.is_empty() {
                return false;
            }
        }
        self.is_accepting(&current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwgame_core::regex::{concat, containing, full, literal, range, star, union};

    #[test]
    fn test_single_range() {
        let nfa = Nfa::from_regex(&range('a', 'c').unwrap());

        assert!(nfa.accepts("a"));
        assert!(nfa.accepts("c"));
        assert!(!nfa.accepts("d"));
        assert!(!nfa.accepts("aa"));
        assert!(!nfa.accepts(""));
    }

    #[test]
    fn test_union() {
        let nfa = Nfa::from_regex(&union([literal("a").unwrap(), literal("b").unwrap()]).unwrap());

        assert!(nfa.accepts("a"));
        assert!(nfa.accepts("b"));
        assert!(!nfa.accepts("c"));
    }

    #[test]
    fn test_concatenation() {
        let nfa = Nfa::from_regex(&concat([literal("a").unwrap(), literal("b").unwrap()]));

        assert!(nfa.accepts("ab"));
        assert!(!nfa.accepts("a"));
        assert!(!nfa.accepts("b"));
        assert!(!nfa.accepts("ba"));
    }

    #[test]
    fn test_kleene_star() {
        let nfa = Nfa::from_regex(&star(literal("a").unwrap()));

        assert!(nfa.accepts(""));
        assert!(nfa.accepts("a"));
        assert!(nfa.accepts("aa"));
        assert!(nfa.accepts("aaa"));
        assert!(!nfa.accepts("b"));
    }

    #[test]
    fn test_empty_literal_is_epsilon() {
        let nfa = Nfa::from_regex(&literal("").unwrap());
        assert!(nfa.accepts(""));
        assert!(!nfa.accepts("a"));
    }

    #[test]
    fn test_full_rejects_control_characters() {
        let nfa = Nfa::from_regex(&full());
        assert!(nfa.accepts(""));
        assert!(nfa.accepts("Hello, World!"));
        assert!(!nfa.accepts("tab\there"));
        assert!(!nfa.accepts("caf\u{e9}"));
    }

    #[test]
    fn test_containing_any_position() {
        let nfa = Nfa::from_regex(&containing(literal("997").unwrap()));
        assert!(nfa.accepts("997"));
        assert!(nfa.accepts("997abc"));
        assert!(nfa.accepts("abc997"));
        assert!(nfa.accepts("a997b"));
        assert!(!nfa.accepts("99a7"));
    }
}
