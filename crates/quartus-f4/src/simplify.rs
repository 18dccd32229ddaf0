//! Memoization of reduced row representatives.
//!
//! Building a reducer row as `t * f_i` repeats work the matrix already
//! did in earlier degree steps. The simplifier stores, per basis index,
//! representatives keyed by multiplier term: `(i, t) -> p` with
//! `p = t * f_i` modulo reductions already performed and
//! `LT(p) = t * LT(f_i)`. Two storage layouts exist; the database layout
//! is the production path, the flat one is kept for comparison runs.

use quartus_poly::Polynomial;
use quartus_terms::{Term, TermMonoid, TermOrder};
use rustc_hash::FxHashMap;

use crate::config::SimplifyMode;

/// The reducer-row memoization layer.
pub enum Simplifier {
    /// Memoization disabled; every lookup falls through to the basis.
    Off,
    /// Flat per-index lists, scanned linearly.
    InMemory(Vec<Vec<(Term, Polynomial)>>),
    /// Per-index maps keyed by multiplier term.
    Database(Vec<FxHashMap<Term, Polynomial>>),
}

impl Simplifier {
    /// Creates a simplifier for the configured mode.
    #[must_use]
    pub fn new(mode: SimplifyMode) -> Self {
        match mode {
            SimplifyMode::Off => Simplifier::Off,
            SimplifyMode::InMemory => Simplifier::InMemory(Vec::new()),
            SimplifyMode::Database => Simplifier::Database(Vec::new()),
        }
    }

    /// True when lookups can ever return something.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Simplifier::Off)
    }

    /// Records `(i, t) -> p`, replacing any previous representative for
    /// the same key.
    pub fn insert(&mut self, i: usize, t: Term, p: Polynomial) {
        match self {
            Simplifier::Off => {}
            Simplifier::InMemory(lists) => {
                if lists.len() <= i {
                    lists.resize_with(i + 1, Vec::new);
                }
                let list = &mut lists[i];
                match list.iter_mut().find(|(key, _)| *key == t) {
                    Some(entry) => entry.1 = p,
                    None => list.push((t, p)),
                }
            }
            Simplifier::Database(maps) => {
                if maps.len() <= i {
                    maps.resize_with(i + 1, FxHashMap::default);
                }
                maps[i].insert(t, p);
            }
        }
    }

    /// Finds the stored representative whose multiplier is the largest
    /// divisor of `t` under the ordering, identity entries included.
    /// Returns `None` when nothing is stored for this index.
    #[must_use]
    pub fn lookup(
        &self,
        i: usize,
        t: Term,
        monoid: &TermMonoid,
        order: TermOrder,
    ) -> Option<(Term, &Polynomial)> {
        let mut best: Option<(Term, &Polynomial)> = None;
        self.scan(i, |key, p| {
            if monoid.divides(key, t) {
                let better = match best {
                    // Incomparable divisors are tie-broken by the
                    // ordering; equal keys cannot collide.
                    Some((b, _)) => monoid.compare(order, key, b) == std::cmp::Ordering::Greater,
                    None => true,
                };
                if better {
                    best = Some((key, p));
                }
            }
        });
        best
    }

    /// Like [`Simplifier::lookup`], falling back to the plain basis
    /// member as `(identity, fallback)` when nothing is stored.
    #[must_use]
    pub fn search<'a>(
        &'a self,
        i: usize,
        t: Term,
        fallback: &'a Polynomial,
        monoid: &TermMonoid,
        order: TermOrder,
    ) -> (Term, &'a Polynomial) {
        self.lookup(i, t, monoid, order)
            .unwrap_or((monoid.one(), fallback))
    }

    /// Non-mutating probe: the degree of the best stored divisor of `t`,
    /// zero when at most the identity applies. Used to rank competing
    /// reducers.
    #[must_use]
    pub fn check(&self, i: usize, t: Term, monoid: &TermMonoid, order: TermOrder) -> u32 {
        self.lookup(i, t, monoid, order)
            .map(|(key, _)| monoid.degree(key))
            .unwrap_or(0)
    }

    fn scan<'a>(&'a self, i: usize, mut visit: impl FnMut(Term, &'a Polynomial)) {
        match self {
            Simplifier::Off => {}
            Simplifier::InMemory(lists) => {
                if let Some(list) = lists.get(i) {
                    for (key, p) in list {
                        visit(*key, p);
                    }
                }
            }
            Simplifier::Database(maps) => {
                if let Some(map) = maps.get(i) {
                    for (key, p) in map {
                        visit(*key, p);
                    }
                }
            }
        }
    }
}
