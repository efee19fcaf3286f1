//! Product-automaton search for a satisfying string.
//!
//! The formula is compiled into atoms over one string variable:
//! - membership atoms become minimal DFAs over a shared [`Alphabet`]
//! - the length becomes a counter capped just above its largest constant
//! - each distinct count term becomes a weighted counter, capped the same way
//!
//! A search state is the tuple of all DFA states and counters, so the state
//! space is finite and exhausting it proves that no string satisfies the
//! formula. States are expanded best-first, ordered by length plus an
//! estimate of the characters still missing. A state is pruned when no
//! continuation can satisfy the formula: its fate is decided as false, or
//! the extension lengths its atoms allow do not overlap.

use crate::alphabet::Alphabet;
use crate::automaton::Nfa;
use crate::config::SolverConfig;
use crate::dfa::{Dfa, Fate};
use pwgame_core::{Cmp, CountTerm, Formula, Regex};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Instant;
use tracing::{debug, trace};

/// Packed search state: DFA states, then the length, then the counters.
type StateKey = SmallVec<[u32; 16]>;

/// How often (in expanded states) the clock is consulted.
const TIMEOUT_CHECK_INTERVAL: usize = 4096;

/// Outcome of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A satisfying string
    Found(String),
    /// No string satisfies the formula
    Exhausted,
    /// A resource limit was hit
    GaveUp(String),
}

/// Counters gathered during one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Character classes of the alphabet
    pub classes: usize,
    /// Membership atoms (distinct regexes)
    pub automata: usize,
    /// Total states of the minimised automata
    pub automaton_states: usize,
    /// Product states reached
    pub explored: usize,
    /// Product states discarded as hopeless
    pub pruned: usize,
}

/// Formula with atoms replaced by indices into the compiled tables.
#[derive(Debug, Clone)]
enum Node {
    Const(bool),
    Member(usize),
    Len(Cmp, u64),
    Count(usize, Cmp, u64),
    Not(Box<Node>),
    And(Vec<Node>),
    Or(Vec<Node>),
}

#[derive(Debug)]
struct Counter {
    /// Weight added per character class
    weights: Vec<u32>,
    max_weight: u32,
    cap: u32,
}

/// A formula compiled against one alphabet.
#[derive(Debug)]
pub struct Compiled {
    alphabet: Alphabet,
    dfas: Vec<Dfa>,
    counters: Vec<Counter>,
    /// `None` when no atom looks at the length
    length_cap: Option<u32>,
    root: Node,
}

fn cap_for(max_constant: u64) -> u32 {
    narrow(max_constant.saturating_add(1))
}

struct Collector<'f> {
    regexes: Vec<&'f Regex>,
    regex_ids: FxHashMap<&'f Regex, usize>,
    terms: Vec<&'f CountTerm>,
    term_ids: FxHashMap<&'f CountTerm, usize>,
    term_max: Vec<u64>,
    length_max: Option<u64>,
}

impl<'f> Collector<'f> {
    fn node(&mut self, formula: &'f Formula) -> Node {
        match formula {
            Formula::True => Node::Const(true),
            Formula::False => Node::Const(false),
            Formula::InRe(_, regex) => {
                let next = self.regexes.len();
                let id = *self.regex_ids.entry(regex).or_insert(next);
                if id == next {
                    self.regexes.push(regex);
                }
                Node::Member(id)
            }
            Formula::Len(_, op, n) => {
                let n = *n as u64;
                self.length_max = Some(self.length_max.map_or(n, |m| m.max(n)));
                Node::Len(*op, n)
            }
            Formula::Count(term, op, n) => {
                let next = self.terms.len();
                let id = *self.term_ids.entry(term).or_insert(next);
                if id == next {
                    self.terms.push(term);
                    self.term_max.push(0);
                }
                self.term_max[id] = self.term_max[id].max(*n);
                Node::Count(id, *op, *n)
            }
            Formula::Not(inner) => Node::Not(Box::new(self.node(inner))),
            Formula::And(parts) => Node::And(parts.iter().map(|p| self.node(p)).collect()),
            Formula::Or(parts) => Node::Or(parts.iter().map(|p| self.node(p)).collect()),
        }
    }
}

impl Compiled {
    /// Compile `formula`; `None` when an automaton exceeds `state_limit`.
    #[must_use]
    pub fn new(formula: &Formula, config: &SolverConfig) -> Option<Self> {
        let mut collector = Collector {
            regexes: Vec::new(),
            regex_ids: FxHashMap::default(),
            terms: Vec::new(),
            term_ids: FxHashMap::default(),
            term_max: Vec::new(),
            length_max: None,
        };
        let root = collector.node(formula);

        let mut ranges = Vec::new();
        for regex in &collector.regexes {
            regex.visit_ranges(&mut |r| ranges.push(r));
        }
        for term in &collector.terms {
            for (set, _) in term.weights() {
                ranges.extend(set.ranges().iter().copied());
            }
        }
        let alphabet = Alphabet::from_ranges(ranges, config.prefer_readable);

        let mut dfas = Vec::with_capacity(collector.regexes.len());
        for regex in &collector.regexes {
            let nfa = Nfa::from_regex(regex);
            let dfa = Dfa::determinize(&nfa, &alphabet, config.max_states)?.minimize();
            trace!(
                regex_size = regex.size(),
                nfa_states = nfa.num_states(),
                dfa_states = dfa.num_states(),
                "compiled membership atom"
            );
            dfas.push(dfa);
        }

        let counters = collector
            .terms
            .iter()
            .zip(&collector.term_max)
            .map(|(term, &max)| {
                let cap = cap_for(max);
                let weights: Vec<u32> = (0..alphabet.num_classes())
                    .map(|class| narrow(term.weight_of(char::from(alphabet.representative(class)))))
                    .collect();
                let max_weight = weights.iter().copied().max().unwrap_or(0);
                Counter {
                    weights,
                    max_weight,
                    cap,
                }
            })
            .collect();

        Some(Self {
            alphabet,
            dfas,
            counters,
            length_cap: collector.length_max.map(cap_for),
            root,
        })
    }

    fn initial(&self) -> StateKey {
        let mut key: StateKey = self.dfas.iter().map(Dfa::initial).collect();
        key.push(0);
        key.extend(self.counters.iter().map(|_| 0));
        key
    }

    fn step(&self, state: &StateKey, class: usize) -> StateKey {
        let mut next = StateKey::with_capacity(state.len());
        for (dfa, &s) in self.dfas.iter().zip(state.iter()) {
            next.push(dfa.next(s, class));
        }
        let len_slot = self.dfas.len();
        let len = state[len_slot];
        next.push(match self.length_cap {
            Some(cap) => len.saturating_add(1).min(cap),
            None => 0,
        });
        for (i, counter) in self.counters.iter().enumerate() {
            let value = state[len_slot + 1 + i];
            next.push(value.saturating_add(counter.weights[class]).min(counter.cap));
        }
        next
    }

    /// Truth value of the formula for the string that led to `state`.
    fn holds(&self, node: &Node, state: &StateKey) -> bool {
        let len_slot = self.dfas.len();
        match node {
            Node::Const(b) => *b,
            Node::Member(i) => self.dfas[*i].is_accepting(state[*i]),
            Node::Len(op, n) => op.holds(u64::from(state[len_slot]), *n),
            Node::Count(i, op, n) => op.holds(u64::from(state[len_slot + 1 + i]), *n),
            Node::Not(inner) => !self.holds(inner, state),
            Node::And(parts) => parts.iter().all(|p| self.holds(p, state)),
            Node::Or(parts) => parts.iter().any(|p| self.holds(p, state)),
        }
    }

    /// Value of the formula shared by every continuation of `state`, if any.
    ///
    /// Lengths and counters never decrease, which decides most comparisons
    /// once they are crossed.
    fn fate(&self, node: &Node, state: &StateKey) -> Option<bool> {
        let len_slot = self.dfas.len();
        match node {
            Node::Const(b) => Some(*b),
            Node::Member(i) => match self.dfas[*i].fate(state[*i]) {
                Fate::Always => Some(true),
                Fate::Never => Some(false),
                Fate::Open => None,
            },
            Node::Len(op, n) => monotone_fate(*op, u64::from(state[len_slot]), *n),
            Node::Count(i, op, n) => monotone_fate(*op, u64::from(state[len_slot + 1 + i]), *n),
            Node::Not(inner) => self.fate(inner, state).map(|b| !b),
            Node::And(parts) => {
                let mut all_true = true;
                for part in parts {
                    match self.fate(part, state) {
                        Some(false) => return Some(false),
                        Some(true) => {}
                        None => all_true = false,
                    }
                }
                all_true.then_some(true)
            }
            Node::Or(parts) => {
                let mut all_false = true;
                for part in parts {
                    match self.fate(part, state) {
                        Some(true) => return Some(true),
                        Some(false) => {}
                        None => all_false = false,
                    }
                }
                all_false.then_some(false)
            }
        }
    }

    /// Feasible extension lengths of `node` from `state`, with a guidance cost.
    ///
    /// `None` means no continuation satisfies the node.
    fn estimate(&self, node: &Node, state: &StateKey) -> Option<Estimate> {
        let len_slot = self.dfas.len();
        match node {
            Node::Const(true) => Some(Estimate::FREE),
            Node::Const(false) => None,
            Node::Member(i) => self.dfas[*i]
                .distance_to_accept(state[*i])
                .map(Estimate::at_least),
            Node::Len(op, n) => length_estimate(*op, u64::from(state[len_slot]), *n),
            Node::Count(i, op, n) => count_estimate(
                *op,
                u64::from(state[len_slot + 1 + i]),
                *n,
                self.counters[*i].max_weight,
            ),
            Node::Not(inner) => match inner.as_ref() {
                Node::Member(i) => self.dfas[*i]
                    .distance_to_reject(state[*i])
                    .map(Estimate::at_least),
                Node::Not(twice) => self.estimate(twice, state),
                Node::Len(op, n) => self.estimate(&Node::Len(op.negate(), *n), state),
                Node::Count(i, op, n) => self.estimate(&Node::Count(*i, op.negate(), *n), state),
                other => match self.fate(other, state) {
                    Some(true) => None,
                    _ => Some(Estimate::FREE),
                },
            },
            Node::And(parts) => {
                let mut total = Estimate::FREE;
                for part in parts {
                    let e = self.estimate(part, state)?;
                    total.min = total.min.max(e.min);
                    total.max = total.max.min(e.max);
                    total.cost = total.cost.saturating_add(e.cost);
                }
                (total.min <= total.max).then_some(total)
            }
            Node::Or(parts) => parts
                .iter()
                .filter_map(|part| self.estimate(part, state))
                .reduce(|a, b| Estimate {
                    min: a.min.min(b.min),
                    max: a.max.max(b.max),
                    cost: a.cost.min(b.cost),
                }),
        }
    }

    /// Whether `state` can still lead to a model.
    fn viable(&self, state: &StateKey) -> Option<Estimate> {
        if self.fate(&self.root, state) == Some(false) {
            return None;
        }
        self.estimate(&self.root, state)
    }

    /// Best-first search for a short satisfying string.
    ///
    /// States are popped by length plus estimated cost, ties broken towards
    /// longer prefixes and then discovery order, so the result is
    /// deterministic for a given formula.
    pub fn search(&self, config: &SolverConfig, stats: &mut SearchStats) -> SearchOutcome {
        stats.classes = self.alphabet.num_classes();
        stats.automata = self.dfas.len();
        stats.automaton_states = self.dfas.iter().map(Dfa::num_states).sum();

        let start = Instant::now();
        let initial = self.initial();
        stats.explored = 1;
        if self.holds(&self.root, &initial) {
            return SearchOutcome::Found(String::new());
        }
        let Some(estimate) = self.viable(&initial) else {
            stats.pruned = 1;
            return SearchOutcome::Exhausted;
        };

        // nodes[i] = (parent index, class read to get here, depth)
        let mut nodes: Vec<(u32, u16, u32)> = vec![(u32::MAX, 0, 0)];
        let mut keys: Vec<StateKey> = vec![initial.clone()];
        let mut seen: FxHashMap<StateKey, u32> = FxHashMap::default();
        seen.insert(initial, 0);
        let mut frontier: BinaryHeap<Reverse<(u32, Reverse<u32>, u32)>> = BinaryHeap::new();
        frontier.push(Reverse((estimate.cost, Reverse(0), 0)));
        let mut expanded = 0usize;

        while let Some(Reverse((_, Reverse(depth), index))) = frontier.pop() {
            if depth > nodes[index as usize].2 {
                continue;
            }
            expanded += 1;
            if expanded.is_multiple_of(TIMEOUT_CHECK_INTERVAL)
                && let Some(timeout) = config.timeout
                && start.elapsed() >= timeout
            {
                return SearchOutcome::GaveUp(format!("timeout after {:?}", timeout));
            }

            let state = keys[index as usize].clone();
            let next_depth = depth + 1;
            for class in 0..self.alphabet.num_classes() {
                let next = self.step(&state, class);
                let next_index = match seen.get(&next) {
                    Some(&known) if nodes[known as usize].2 <= next_depth => continue,
                    Some(&known) => {
                        nodes[known as usize] = (index, class as u16, next_depth);
                        known
                    }
                    None => {
                        let fresh = nodes.len() as u32;
                        nodes.push((index, class as u16, next_depth));
                        keys.push(next.clone());
                        stats.explored += 1;

                        if self.holds(&self.root, &next) {
                            debug!(explored = stats.explored, pruned = stats.pruned, "witness found");
                            return SearchOutcome::Found(self.witness(&nodes, fresh));
                        }
                        seen.insert(next.clone(), fresh);
                        fresh
                    }
                };
                let Some(estimate) = self.viable(&next) else {
                    stats.pruned += 1;
                    continue;
                };
                if stats.explored >= config.max_states {
                    return SearchOutcome::GaveUp(format!(
                        "state limit of {} reached",
                        config.max_states
                    ));
                }
                let priority = next_depth.saturating_add(estimate.cost);
                frontier.push(Reverse((priority, Reverse(next_depth), next_index)));
            }
        }

        debug!(explored = stats.explored, pruned = stats.pruned, "state space exhausted");
        SearchOutcome::Exhausted
    }

    fn witness(&self, nodes: &[(u32, u16, u32)], mut index: u32) -> String {
        let mut bytes = Vec::new();
        while index != 0 {
            let (parent, class, _) = nodes[index as usize];
            bytes.push(self.alphabet.representative(usize::from(class)));
            index = parent;
        }
        bytes.iter().rev().map(|&b| char::from(b)).collect()
    }
}

/// Extension lengths a node admits, and how far it seems from holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Estimate {
    /// No continuation shorter than this satisfies the node
    min: u32,
    /// No continuation longer than this satisfies the node
    max: u32,
    /// Search guidance; not a bound
    cost: u32,
}

impl Estimate {
    const FREE: Self = Self {
        min: 0,
        max: u32::MAX,
        cost: 0,
    };

    fn at_least(min: u32) -> Self {
        Self {
            min,
            max: u32::MAX,
            cost: min,
        }
    }

    fn exactly(n: u32) -> Self {
        Self {
            min: n,
            max: n,
            cost: n,
        }
    }

    fn at_most(max: u32) -> Self {
        Self {
            min: 0,
            max,
            cost: 0,
        }
    }
}

fn narrow(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn length_estimate(op: Cmp, len: u64, n: u64) -> Option<Estimate> {
    match op {
        Cmp::Lt => (len < n).then(|| Estimate::at_most(narrow(n - 1 - len))),
        Cmp::Le => (len <= n).then(|| Estimate::at_most(narrow(n - len))),
        Cmp::Eq => (len <= n).then(|| Estimate::exactly(narrow(n - len))),
        Cmp::Ge => Some(Estimate::at_least(narrow(n.saturating_sub(len)))),
        Cmp::Gt => Some(Estimate::at_least(narrow((n + 1).saturating_sub(len)))),
        Cmp::Ne if len == n => Some(Estimate::at_least(1)),
        Cmp::Ne => Some(Estimate::FREE),
    }
}

fn count_estimate(op: Cmp, value: u64, n: u64, max_weight: u32) -> Option<Estimate> {
    let reach = |target: u64| -> Option<Estimate> {
        let missing = target.saturating_sub(value);
        if missing == 0 {
            Some(Estimate::FREE)
        } else if max_weight == 0 {
            None
        } else {
            Some(Estimate::at_least(narrow(missing.div_ceil(u64::from(max_weight)))))
        }
    };
    match op {
        Cmp::Lt => (value < n).then_some(Estimate::FREE),
        Cmp::Le => (value <= n).then_some(Estimate::FREE),
        Cmp::Eq if value > n => None,
        Cmp::Eq | Cmp::Ge => reach(n),
        Cmp::Gt => reach(n + 1),
        Cmp::Ne if value == n => reach(n + 1),
        Cmp::Ne => Some(Estimate::FREE),
    }
}

fn monotone_fate(op: Cmp, value: u64, n: u64) -> Option<bool> {
    match op {
        Cmp::Lt if value >= n => Some(false),
        Cmp::Le | Cmp::Eq if value > n => Some(false),
        Cmp::Gt if value > n => Some(true),
        Cmp::Ge if value >= n => Some(true),
        Cmp::Ne if value > n => Some(true),
        _ => None,
    }
}
