//! The degree-by-degree driver.
//!
//! Validates and normalizes the generators, then alternates between the
//! pair manager and the reduction engine until no pairs remain. The
//! output is tail-interreduced, so no leading term of one member divides
//! any term of another.

use std::cmp::Ordering;

use rayon::ThreadPoolBuilder;
use tracing::debug;

use quartus_poly::Polynomial;
use quartus_rings::PrimeField;
use quartus_terms::{Term, TermMonoid, TermOrder};

use crate::config::F4Config;
use crate::engine::Reducer;
use crate::error::F4Error;
use crate::pairs::PairSet;
use crate::simplify::Simplifier;

/// An F4 Gröbner basis computation.
pub struct F4<'a> {
    field: &'a PrimeField,
    monoid: &'a TermMonoid,
    order: TermOrder,
    config: F4Config,
}

impl<'a> F4<'a> {
    /// Creates a driver over the given field, monoid and ordering.
    #[must_use]
    pub fn new(
        field: &'a PrimeField,
        monoid: &'a TermMonoid,
        order: TermOrder,
        config: F4Config,
    ) -> Self {
        Self {
            field,
            monoid,
            order,
            config,
        }
    }

    /// Computes the reduced Gröbner basis of the ideal generated by
    /// `generators`.
    pub fn compute(&self, generators: Vec<Polynomial>) -> Result<Vec<Polynomial>, F4Error> {
        for (i, g) in generators.iter().enumerate() {
            if g.is_zero() {
                return Err(F4Error::ZeroGenerator(i));
            }
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.threads.max(1))
            .build()?;
        pool.install(|| self.run(generators))
    }

    fn run(&self, mut generators: Vec<Polynomial>) -> Result<Vec<Polynomial>, F4Error> {
        generators.sort_by(|a, b| b.cmp_leading(a, self.monoid, self.order));
        for g in &mut generators {
            g.normalize(self.field)?;
        }

        let mut pairs = PairSet::new(self.monoid, self.order, self.config.sugar_selection);
        let mut simplifier = Simplifier::new(self.config.simplify);
        let reducer = Reducer::new(
            self.field,
            self.monoid,
            self.order,
            self.config.block_size,
            self.config.verbosity,
        );

        pairs.update(generators);
        self.seed_representatives(&mut simplifier, &pairs, 0);
        let mut seeded = pairs.slot_count();

        while let Some((degree, batch)) = pairs.select_batch() {
            if self.config.verbosity >= 1 {
                debug!(degree, pairs = batch.len(), "selected batch");
            }
            let reduction = reducer.reduce(
                &batch,
                degree,
                pairs.slots(),
                &simplifier,
                simplifier.is_enabled(),
            )?;
            for (k, t, rep) in reduction.representatives {
                simplifier.insert(k, t, rep);
            }
            let new_count = reduction.polys.len();
            if new_count > 0 {
                pairs.update(reduction.polys);
            }
            self.seed_representatives(&mut simplifier, &pairs, seeded);
            seeded = pairs.slot_count();
            if self.config.verbosity >= 1 {
                let active = pairs.slots().iter().filter(|s| s.in_basis).count();
                debug!(
                    new = new_count,
                    basis = active,
                    pending = pairs.pending(),
                    terms = self.monoid.len(),
                    "degree step finished"
                );
            }
        }

        self.interreduce(pairs.basis())
    }

    fn seed_representatives(&self, simplifier: &mut Simplifier, pairs: &PairSet, from: usize) {
        if !simplifier.is_enabled() {
            return;
        }
        for (k, slot) in pairs.slots().iter().enumerate().skip(from) {
            simplifier.insert(k, self.monoid.one(), slot.poly.clone());
        }
    }

    /// Tail-reduces every basis member against the others. Leading terms
    /// are pairwise non-divisible at this point, so only tails change.
    fn interreduce(&self, mut basis: Vec<Polynomial>) -> Result<Vec<Polynomial>, F4Error> {
        for idx in 0..basis.len() {
            let target = basis[idx].clone();
            let others: Vec<Polynomial> = basis
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != idx)
                .map(|(_, p)| p.clone())
                .collect();
            basis[idx] = reduce_full(self.field, self.monoid, self.order, &target, &others)?;
        }
        Ok(basis)
    }
}

/// Computes the normal form of `poly` modulo `basis`.
///
/// Every term is reduced, largest first, until nothing in `basis` has a
/// leading term dividing anything left. Reducers need not be monic. The
/// result's sugar is the maximum over everything combined into it.
pub fn reduce_full(
    field: &PrimeField,
    monoid: &TermMonoid,
    order: TermOrder,
    poly: &Polynomial,
    basis: &[Polynomial],
) -> Result<Polynomial, F4Error> {
    let mut work: Vec<(u64, Term)> = poly.terms().to_vec();
    let mut out: Vec<(u64, Term)> = Vec::new();
    let mut sugar = poly.sugar();

    while let Some(&(c, t)) = work.first() {
        let mut hit: Option<(u64, Term, &Polynomial)> = None;
        for g in basis {
            if let Some((lc, lt)) = g.leading() {
                if monoid.divides(lt, t) {
                    hit = Some((lc, lt, g));
                    break;
                }
            }
        }
        match hit {
            Some((lc, lt, g)) => {
                let u = monoid.div(t, lt);
                let f = field.mul(c, field.inv(lc)?);
                sugar = sugar.max(g.sugar() + monoid.degree(u));
                work = sub_scaled(field, monoid, order, &work, g, u, f);
            }
            None => {
                out.push((c, t));
                work.remove(0);
            }
        }
    }

    Ok(Polynomial::with_sugar(out, sugar))
}

/// Merges `work - f * u * g`, both sides descending. The leading terms
/// cancel by construction of the caller.
fn sub_scaled(
    field: &PrimeField,
    monoid: &TermMonoid,
    order: TermOrder,
    work: &[(u64, Term)],
    g: &Polynomial,
    u: Term,
    f: u64,
) -> Vec<(u64, Term)> {
    let mut out = Vec::with_capacity(work.len() + g.len());
    let mut a = work.iter().copied().peekable();
    let mut b = g
        .terms()
        .iter()
        .map(|&(c, t)| (field.mul(f, c), monoid.mul(u, t)))
        .peekable();
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (Some((ca, ta)), Some((cb, tb))) => match monoid.compare(order, ta, tb) {
                Ordering::Greater => {
                    out.push((ca, ta));
                    a.next();
                }
                Ordering::Less => {
                    out.push((field.neg(cb), tb));
                    b.next();
                }
                Ordering::Equal => {
                    let c = field.sub(ca, cb);
                    if c != 0 {
                        out.push((c, ta));
                    }
                    a.next();
                    b.next();
                }
            },
            (Some((ca, ta)), None) => {
                out.push((ca, ta));
                a.next();
            }
            (None, Some((cb, tb))) => {
                out.push((field.neg(cb), tb));
                b.next();
            }
            (None, None) => break,
        }
    }
    out
}
