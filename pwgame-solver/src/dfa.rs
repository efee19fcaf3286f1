//! Complete deterministic automata over character classes.
//!
//! An [`Nfa`] is determinised against an [`Alphabet`] (one transition per
//! class), minimised with Moore's partition refinement, and every state is
//! tagged with its [`Fate`] so the search can stop exploring branches whose
//! outcome no longer depends on the rest of the string.

use crate::alphabet::Alphabet;
use crate::automaton::{Nfa, StateId};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// What a DFA state can still become.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fate {
    /// Every continuation is accepted
    Always,
    /// No continuation is accepted
    Never,
    /// Depends on the continuation
    Open,
}

/// Complete DFA; state 0 is not special, see [`Dfa::initial`].
#[derive(Debug, Clone)]
pub struct Dfa {
    num_classes: usize,
    /// Row-major table: `transitions[state * num_classes + class]`
    transitions: Vec<u32>,
    accepting: Vec<bool>,
    fates: Vec<Fate>,
    /// Fewest characters leading to an accepting state (`u32::MAX` = none)
    to_accept: Vec<u32>,
    /// Fewest characters leading to a rejecting state (`u32::MAX` = none)
    to_reject: Vec<u32>,
    initial: u32,
}

impl Dfa {
    /// Subset construction of `nfa` over the classes of `alphabet`.
    ///
    /// Returns `None` when more than `limit` states would be created.
    #[must_use]
    pub fn determinize(nfa: &Nfa, alphabet: &Alphabet, limit: usize) -> Option<Self> {
        let num_classes = alphabet.num_classes();
        let mut ids: FxHashMap<Vec<StateId>, u32> = FxHashMap::default();
        let mut sets: Vec<Vec<StateId>> = Vec::new();
        let mut transitions = Vec::new();
        let mut queue = VecDeque::new();

        let initial = nfa.initial_states();
        ids.insert(initial.clone(), 0);
        sets.push(initial);
        queue.push_back(0u32);

        while let Some(id) = queue.pop_front() {
            let current = sets[id as usize].clone();
            let row_start = id as usize * num_classes;
            if transitions.len() < row_start + num_classes {
                transitions.resize(row_start + num_classes, 0);
            }
            for class in 0..num_classes {
                let next = nfa.step(&current, alphabet.representative(class));
                let target = match ids.get(&next) {
                    Some(&existing) => existing,
                    None => {
                        if sets.len() >= limit {
                            return None;
                        }
                        let fresh = sets.len() as u32;
                        ids.insert(next.clone(), fresh);
                        sets.push(next);
                        queue.push_back(fresh);
                        fresh
                    }
                };
                transitions[row_start + class] = target;
            }
        }

        transitions.resize(sets.len() * num_classes, 0);
        let accepting = sets.iter().map(|set| nfa.is_accepting(set)).collect();
        Some(Self::with_fates(num_classes, transitions, accepting, 0))
    }

    fn with_fates(num_classes: usize, transitions: Vec<u32>, accepting: Vec<bool>, initial: u32) -> Self {
        let mut dfa = Self {
            num_classes,
            transitions,
            accepting,
            fates: Vec::new(),
            to_accept: Vec::new(),
            to_reject: Vec::new(),
            initial,
        };
        dfa.compute_fates();
        dfa
    }

    /// Merge equivalent states (Moore's algorithm).
    #[must_use]
    pub fn minimize(&self) -> Self {
        let n = self.num_states();
        let mut block: Vec<u32> = self.accepting.iter().map(|&a| u32::from(a)).collect();
        let mut num_blocks = if self.accepting.iter().all(|&a| a) || self.accepting.iter().all(|&a| !a) {
            1
        } else {
            2
        };
        if num_blocks == 1 {
            block.iter_mut().for_each(|b| *b = 0);
        }

        loop {
            let mut signatures: FxHashMap<Vec<u32>, u32> = FxHashMap::default();
            let mut refined = Vec::with_capacity(n);
            for state in 0..n {
                let mut signature = Vec::with_capacity(self.num_classes + 1);
                signature.push(block[state]);
                signature.extend(
                    (0..self.num_classes).map(|c| block[self.next(state as u32, c) as usize]),
                );
                let next_id = signatures.len() as u32;
                refined.push(*signatures.entry(signature).or_insert(next_id));
            }
            let refined_blocks = signatures.len();
            block = refined;
            if refined_blocks == num_blocks {
                break;
            }
            num_blocks = refined_blocks;
        }

        let mut transitions = vec![0u32; num_blocks * self.num_classes];
        let mut accepting = vec![false; num_blocks];
        for state in 0..n {
            let b = block[state] as usize;
            accepting[b] = self.accepting[state];
            for class in 0..self.num_classes {
                transitions[b * self.num_classes + class] = block[self.next(state as u32, class) as usize];
            }
        }
        Self::with_fates(
            self.num_classes,
            transitions,
            accepting,
            block[self.initial as usize],
        )
    }

    fn compute_fates(&mut self) {
        let n = self.num_states();
        let mut reverse: Vec<Vec<u32>> = vec![Vec::new(); n];
        for state in 0..n {
            for class in 0..self.num_classes {
                reverse[self.next(state as u32, class) as usize].push(state as u32);
            }
        }
        // Backward BFS from the accepting (resp. rejecting) states.
        let distances = |wanted: bool| -> Vec<u32> {
            let mut dist = vec![u32::MAX; n];
            let mut queue: VecDeque<u32> = VecDeque::new();
            for state in 0..n {
                if self.accepting[state] == wanted {
                    dist[state] = 0;
                    queue.push_back(state as u32);
                }
            }
            while let Some(state) = queue.pop_front() {
                let d = dist[state as usize] + 1;
                for &pred in &reverse[state as usize] {
                    if dist[pred as usize] == u32::MAX {
                        dist[pred as usize] = d;
                        queue.push_back(pred);
                    }
                }
            }
            dist
        };
        let to_accept = distances(true);
        let to_reject = distances(false);
        self.fates = (0..n)
            .map(|state| match (to_accept[state], to_reject[state]) {
                (u32::MAX, _) => Fate::Never,
                (_, u32::MAX) => Fate::Always,
                _ => Fate::Open,
            })
            .collect();
        self.to_accept = to_accept;
        self.to_reject = to_reject;
    }

    /// Number of states.
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.accepting.len()
    }

    /// Initial state.
    #[must_use]
    pub fn initial(&self) -> u32 {
        self.initial
    }

    /// Successor of `state` on `class`.
    #[must_use]
    pub fn next(&self, state: u32, class: usize) -> u32 {
        self.transitions[state as usize * self.num_classes + class]
    }

    /// Check if `state` is accepting.
    #[must_use]
    pub fn is_accepting(&self, state: u32) -> bool {
        self.accepting[state as usize]
    }

    /// Fate of `state`.
    #[must_use]
    pub fn fate(&self, state: u32) -> Fate {
        self.fates[state as usize]
    }

    /// Shortest continuation from `state` that is accepted.
    #[must_use]
    pub fn distance_to_accept(&self, state: u32) -> Option<u32> {
        Some(self.to_accept[state as usize]).filter(|&d| d != u32::MAX)
    }

    /// Shortest continuation from `state` that is rejected.
    #[must_use]
    pub fn distance_to_reject(&self, state: u32) -> Option<u32> {
        Some(self.to_reject[state as usize]).filter(|&d| d != u32::MAX)
    }

    /// Run the automaton over a string of ASCII code points.
    #[must_use]
    pub fn accepts(&self, alphabet: &Alphabet, input: &[u8]) -> bool {
        let end = input
            .iter()
            .fold(self.initial, |state, &b| self.next(state, alphabet.class_of(b)));
        self.is_accepting(end)
    }
}
