//! The F4 reduction engine.
//!
//! One call to [`Reducer::reduce`] turns a batch of critical pairs into
//! new basis candidates: symbolic preprocessing materializes a sparse
//! matrix whose rows are term multiples of basis members, an operation
//! schedule eliminates every pivot column, and a final Gaussian pass over
//! the S-polynomial rows extracts the survivors.
//!
//! The dense matrix covers only the non-pivot columns. A pivot row's
//! leading entry is implicit (basis members are monic), so eliminating a
//! pivot column from a row is exactly one fused `x - f*y` sweep over the
//! dense tail.

use parking_lot::RwLock;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use quartus_poly::Polynomial;
use quartus_rings::PrimeField;
use quartus_terms::{PackedExponents, Term, TermMonoid, TermOrder};

use crate::error::F4Error;
use crate::pairs::{BasisSlot, CriticalPair};
use crate::simplify::Simplifier;

/// What a row was materialized from.
enum RowSource {
    /// A plain basis member.
    Basis(u32),
    /// A memoized representative from the simplify database.
    Simplified(Polynomial),
}

/// A matrix row: `mult * source`, created to cover the term `target`.
struct Row {
    /// Originating basis index.
    basis: u32,
    /// Leading term of the materialized row.
    target: Term,
    /// `target / LT(f_basis)`; the memoization key.
    multiplier: Term,
    /// Multiplier actually applied to `source` (differs from
    /// `multiplier` when a representative was substituted).
    mult: Term,
    source: RowSource,
}

/// One bucket of data-parallel eliminations, struct-of-arrays.
#[derive(Default)]
struct OpLevel {
    targets: Vec<u32>,
    opers: Vec<u32>,
    factors: Vec<u64>,
}

impl OpLevel {
    fn push(&mut self, target: u32, oper: u32, factor: u64) {
        self.targets.push(target);
        self.opers.push(oper);
        self.factors.push(factor);
    }

    fn len(&self) -> usize {
        self.targets.len()
    }
}

/// The result of reducing one pair batch.
pub struct Reduction {
    /// New basis candidates, monic, sugar set to the batch degree.
    pub polys: Vec<Polynomial>,
    /// `(basis index, multiplier, representative)` rows whose leading
    /// term survived the solve, for the simplify database.
    pub representatives: Vec<(usize, Term, Polynomial)>,
}

/// The reduction engine. All parallelism of the computation lives here;
/// callers run it inside the worker pool they sized.
pub struct Reducer<'a> {
    field: &'a PrimeField,
    monoid: &'a TermMonoid,
    order: TermOrder,
    block_size: usize,
    verbosity: u8,
}

impl<'a> Reducer<'a> {
    /// Creates a reducer over the given field, monoid and ordering.
    #[must_use]
    pub fn new(
        field: &'a PrimeField,
        monoid: &'a TermMonoid,
        order: TermOrder,
        block_size: usize,
        verbosity: u8,
    ) -> Self {
        Self {
            field,
            monoid,
            order,
            block_size: block_size.max(1),
            verbosity,
        }
    }

    /// Reduces a batch of critical pairs selected at `degree`.
    ///
    /// `collect_representatives` controls whether pivot rows are folded
    /// into [`Reduction::representatives`] for the simplify database.
    pub fn reduce(
        &self,
        batch: &[CriticalPair],
        degree: u32,
        slots: &[BasisSlot],
        simplifier: &Simplifier,
        collect_representatives: bool,
    ) -> Result<Reduction, F4Error> {
        let upper = 2 * batch.len();

        // Seed two rows per pair; the even row is the pivot for the lcm.
        let mut rows: Vec<Row> = Vec::with_capacity(upper);
        let mut pivots: FxHashMap<Term, u32> = FxHashMap::default();
        for (idx, pair) in batch.iter().enumerate() {
            rows.push(self.make_row(pair.i, pair.lcm, slots, simplifier));
            rows.push(self.make_row(pair.j, pair.lcm, slots, simplifier));
            pivots.entry(pair.lcm).or_insert((2 * idx) as u32);
        }

        // Symbolic preprocessing: materialize rows wave by wave (the
        // term products run on the pool), then walk the monomials to
        // classify columns and discover reducer rows. Pivot rows skip
        // their implicit leading monomial.
        let mut sparse: Vec<Vec<(u64, Term)>> = (0..rows.len()).map(|_| Vec::new()).collect();
        let mut columns: Vec<Term> = Vec::new();
        let mut known: FxHashSet<Term> = FxHashSet::default();
        let mut pivot_ops: FxHashMap<Term, Vec<(u32, u64)>> = FxHashMap::default();
        let mut processed = 0;

        while processed < rows.len() {
            let wave_start = processed;
            let wave_end = rows.len();
            let materialized: Vec<Vec<(u64, Term)>> = rows[wave_start..wave_end]
                .par_iter()
                .map(|row| self.materialize(row, slots))
                .collect();
            processed = wave_end;

            for (offset, monomials) in materialized.into_iter().enumerate() {
                let r = wave_start + offset;
                let skip = if r >= upper || r % 2 == 0 { 1 } else { 0 };
                for &(c, t) in &monomials[skip..] {
                    if known.contains(&t) {
                        sparse[r].push((c, t));
                        continue;
                    }
                    if pivots.contains_key(&t) {
                        pivot_ops.entry(t).or_default().push((r as u32, c));
                        continue;
                    }
                    match self.find_reducer(t, slots, simplifier) {
                        Some(k) => {
                            rows.push(self.make_row(k, t, slots, simplifier));
                            sparse.push(Vec::new());
                            pivots.insert(t, (rows.len() - 1) as u32);
                            pivot_ops.entry(t).or_default().push((r as u32, c));
                        }
                        None => {
                            known.insert(t);
                            columns.push(t);
                            sparse[r].push((c, t));
                        }
                    }
                }
            }
        }

        // Dense column layout: non-pivot terms, descending.
        let mut packed: Vec<(PackedExponents, Term)> = columns
            .iter()
            .map(|&t| (self.monoid.packed(t), t))
            .collect();
        let order = self.order;
        packed.sort_by(|a, b| order.compare(&b.0, &a.0));
        let columns: Vec<Term> = packed.into_iter().map(|(_, t)| t).collect();
        let col_index: FxHashMap<Term, u32> = columns
            .iter()
            .enumerate()
            .map(|(m, &t)| (t, m as u32))
            .collect();
        let ncols = columns.len();

        // Sparse to dense; each worker owns a distinct row.
        let mut dense: Vec<Vec<u64>> = (0..rows.len()).map(|_| vec![0u64; ncols]).collect();
        dense
            .par_iter_mut()
            .zip(sparse.par_iter())
            .for_each(|(drow, srow)| {
                for &(c, t) in srow {
                    drow[col_index[&t] as usize] = c;
                }
            });
        drop(sparse);

        // Operation schedule. Pivot columns are walked from the largest
        // term downward; a consumer lands at its row's current level,
        // and the operator row is pinned to a later-built level so its
        // own pending eliminations execute first (levels run in reverse
        // build order).
        let mut pivot_cols: Vec<(PackedExponents, Term)> = pivot_ops
            .keys()
            .map(|&t| (self.monoid.packed(t), t))
            .collect();
        pivot_cols.sort_by(|a, b| order.compare(&b.0, &a.0));

        let mut level_of: Vec<u32> = vec![0; rows.len()];
        let mut levels: Vec<OpLevel> = vec![OpLevel::default()];
        for &(_, t) in &pivot_cols {
            let o = pivots[&t];
            for &(target, factor) in &pivot_ops[&t] {
                let l = level_of[target as usize] as usize;
                levels[l].push(target, o, factor);
                level_of[target as usize] = (l + 1) as u32;
                if level_of[o as usize] < (l + 1) as u32 {
                    level_of[o as usize] = (l + 1) as u32;
                }
                if l + 1 >= levels.len() {
                    levels.push(OpLevel::default());
                }
            }
        }
        // The last level never receives an operation.
        levels.pop();

        if self.verbosity >= 2 {
            trace!(
                rows = rows.len(),
                cols = ncols,
                pivots = pivots.len(),
                levels = levels.len(),
                "reduction matrix assembled"
            );
        }

        // Row sugars, propagated in execution order so a combined row
        // carries the maximum of everything folded into it.
        let mut row_sugar: Vec<u32> = rows
            .iter()
            .map(|row| {
                let base = match &row.source {
                    RowSource::Basis(k) => slots[*k as usize].poly.sugar(),
                    RowSource::Simplified(p) => p.sugar(),
                };
                base + self.monoid.degree(row.mult)
            })
            .collect();
        for level in levels.iter().rev() {
            for n in 0..level.len() {
                let t = level.targets[n] as usize;
                let o = level.opers[n] as usize;
                if row_sugar[o] > row_sugar[t] {
                    row_sugar[t] = row_sugar[o];
                }
            }
        }

        // Triangular solve: levels execute last-built first; within a
        // level no row is both target and operator, so slices of
        // operations run in parallel guarded by per-row locks.
        let locked: Vec<RwLock<Vec<u64>>> = dense.into_iter().map(RwLock::new).collect();
        let block = self.block_size;
        if ncols > 0 {
            for level in levels.iter().rev() {
                level
                    .targets
                    .par_chunks(block)
                    .zip(level.opers.par_chunks(block))
                    .zip(level.factors.par_chunks(block))
                    .for_each(|((targets, opers), factors)| {
                        for n in 0..targets.len() {
                            debug_assert_ne!(targets[n], opers[n]);
                            let oper = locked[opers[n] as usize].read();
                            let mut target = locked[targets[n] as usize].write();
                            let f = factors[n];
                            for m in 0..ncols {
                                target[m] = self.field.mul_sub(target[m], oper[m], f);
                            }
                        }
                    });
            }
        }

        // Gaussian elimination over the S-polynomial rows (the odd half
        // of the seed block). The modular stride spreads the writes of
        // one outer step across distinct rows.
        let mut empty = vec![false; upper];
        for i in (1..upper).step_by(2) {
            let (p, factor) = {
                let row = locked[i].read();
                match row.iter().enumerate().find(|&(_, &v)| v != 0) {
                    Some((p, &v)) => (p, v),
                    None => {
                        empty[i] = true;
                        continue;
                    }
                }
            };
            if factor != 1 {
                let inv = self.field.inv(factor)?;
                let mut row = locked[i].write();
                for m in p..ncols {
                    row[m] = self.field.mul(row[m], inv);
                }
            }
            let pivot_guard = locked[i].read();
            let pivot: &[u64] = &pivot_guard;
            let js: Vec<usize> = (2..upper).step_by(2).collect();
            js.par_chunks(block).for_each(|chunk| {
                for &j in chunk {
                    let k = (i + j) % upper;
                    let mut row = locked[k].write();
                    let f = row[p];
                    if f != 0 {
                        for m in p..ncols {
                            row[m] = self.field.mul_sub(row[m], pivot[m], f);
                        }
                    }
                }
            });
        }

        // Extraction: every surviving odd row is a new basis candidate.
        let mut polys = Vec::new();
        for i in (1..upper).step_by(2) {
            if empty[i] {
                continue;
            }
            let row = locked[i].read();
            let terms: Vec<(u64, Term)> = columns
                .iter()
                .enumerate()
                .filter(|&(m, _)| row[m] != 0)
                .map(|(m, &t)| (row[m], t))
                .collect();
            polys.push(Polynomial::with_sugar(terms, degree));
        }

        // Pivot rows keep their leading term through the solve, so they
        // are valid representatives of `multiplier * f_basis`.
        let mut representatives = Vec::new();
        if collect_representatives {
            for (r, row) in rows.iter().enumerate() {
                if r < upper && r % 2 == 1 {
                    continue;
                }
                let dense_row = locked[r].read();
                let mut terms = Vec::with_capacity(1 + ncols / 4);
                terms.push((1u64, row.target));
                for (m, &t) in columns.iter().enumerate() {
                    if dense_row[m] != 0 {
                        terms.push((dense_row[m], t));
                    }
                }
                representatives.push((
                    row.basis as usize,
                    row.multiplier,
                    Polynomial::with_sugar(terms, row_sugar[r]),
                ));
            }
        }

        if self.verbosity >= 2 {
            trace!(new = polys.len(), "batch reduced");
        }

        Ok(Reduction {
            polys,
            representatives,
        })
    }

    fn make_row(
        &self,
        k: u32,
        target: Term,
        slots: &[BasisSlot],
        simplifier: &Simplifier,
    ) -> Row {
        let slot = &slots[k as usize];
        let ir = self.monoid.div(target, slot.lt);
        if let Some((key, rep)) = simplifier.lookup(k as usize, ir, self.monoid, self.order) {
            return Row {
                basis: k,
                target,
                multiplier: ir,
                mult: self.monoid.div(ir, key),
                source: RowSource::Simplified(rep.clone()),
            };
        }
        Row {
            basis: k,
            target,
            multiplier: ir,
            mult: ir,
            source: RowSource::Basis(k),
        }
    }

    fn materialize(&self, row: &Row, slots: &[BasisSlot]) -> Vec<(u64, Term)> {
        let source = match &row.source {
            RowSource::Basis(k) => &slots[*k as usize].poly,
            RowSource::Simplified(p) => p,
        };
        if row.mult == self.monoid.one() {
            source.terms().to_vec()
        } else {
            source
                .terms()
                .iter()
                .map(|&(c, t)| (c, self.monoid.mul(row.mult, t)))
                .collect()
        }
    }

    /// Picks the basis member whose leading term divides `t`. With the
    /// simplify database enabled, candidates are ranked by how much of
    /// the multiplier the database already covers; otherwise the first
    /// match wins.
    fn find_reducer(&self, t: Term, slots: &[BasisSlot], simplifier: &Simplifier) -> Option<u32> {
        if simplifier.is_enabled() {
            let mut best: Option<(u32, u32)> = None;
            for (k, slot) in slots.iter().enumerate() {
                if slot.in_basis && self.monoid.divides(slot.lt, t) {
                    let score = simplifier.check(
                        k,
                        self.monoid.div(t, slot.lt),
                        self.monoid,
                        self.order,
                    );
                    let better = match best {
                        Some((s, _)) => score > s,
                        None => true,
                    };
                    if better {
                        best = Some((score, k as u32));
                    }
                }
            }
            best.map(|(_, k)| k)
        } else {
            slots
                .iter()
                .position(|s| s.in_basis && self.monoid.divides(s.lt, t))
                .map(|k| k as u32)
        }
    }
}
