//! Critical pairs and the basis bookkeeping around them.
//!
//! The pair set applies the Gebauer-Möller criteria when new polynomials
//! arrive and hands the reduction engine one minimal batch at a time. It
//! also owns the basis slots: pairs reference basis members by index, so
//! slots are never removed, only flagged out of the active basis.

use quartus_poly::Polynomial;
use quartus_terms::{Term, TermMonoid, TermOrder};
use rustc_hash::FxHashMap;

/// A deferred S-polynomial computation.
#[derive(Clone, Copy, Debug)]
pub struct CriticalPair {
    /// Index of the first basis member (`i < j`).
    pub i: u32,
    /// Index of the second basis member.
    pub j: u32,
    /// lcm of the two leading terms.
    pub lcm: Term,
    /// True when the leading terms are coprime, i.e. the lcm equals
    /// their product.
    pub marked: bool,
    /// Sugar degree of the S-polynomial.
    pub sugar: u32,
}

/// A basis member together with its activity flag.
///
/// Cleared slots stay addressable because pairs reference them by index;
/// they are just excluded from the output and from reducer searches.
#[derive(Clone, Debug)]
pub struct BasisSlot {
    /// The polynomial, monic.
    pub poly: Polynomial,
    /// Cached leading term.
    pub lt: Term,
    /// Whether the slot belongs to the current reduced basis.
    pub in_basis: bool,
}

/// The critical-pair manager.
pub struct PairSet<'m> {
    monoid: &'m TermMonoid,
    order: TermOrder,
    use_sugar: bool,
    pairs: Vec<CriticalPair>,
    slots: Vec<BasisSlot>,
}

impl<'m> PairSet<'m> {
    /// Creates an empty pair set.
    #[must_use]
    pub fn new(monoid: &'m TermMonoid, order: TermOrder, use_sugar: bool) -> Self {
        Self {
            monoid,
            order,
            use_sugar,
            pairs: Vec::new(),
            slots: Vec::new(),
        }
    }

    /// True when no work remains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of pending pairs.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pairs.len()
    }

    /// All basis slots, active or not.
    #[must_use]
    pub fn slots(&self) -> &[BasisSlot] {
        &self.slots
    }

    /// Number of basis slots.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// The active basis members, in slot order.
    #[must_use]
    pub fn basis(&self) -> Vec<Polynomial> {
        self.slots
            .iter()
            .filter(|s| s.in_basis)
            .map(|s| s.poly.clone())
            .collect()
    }

    /// Folds newly discovered polynomials into the basis and the pair
    /// set, applying the Buchberger criteria.
    ///
    /// Zero polynomials are skipped; callers validate inputs, and the
    /// reduction engine never emits them.
    pub fn update(&mut self, new_polys: Vec<Polynomial>) {
        for h in new_polys {
            let Some(lt_h) = h.leading_term() else {
                continue;
            };
            self.insert_one(h, lt_h);
        }
    }

    fn insert_one(&mut self, h: Polynomial, lt_h: Term) {
        let monoid = self.monoid;
        let t = self.slots.len() as u32;

        // Criterion B: a surviving pair must either have an lcm not
        // divisible by LT(h), or reproduce its lcm with one of its own
        // members against h.
        let slots = &self.slots;
        self.pairs.retain(|pr| {
            !monoid.divides(lt_h, pr.lcm)
                || monoid.lcm(lt_h, slots[pr.i as usize].lt) == pr.lcm
                || monoid.lcm(lt_h, slots[pr.j as usize].lt) == pr.lcm
        });

        // Candidate flags start from the current activity flags.
        let mut d1: Vec<bool> = self.slots.iter().map(|s| s.in_basis).collect();

        let mut insert_into_g = true;
        for (i, slot) in self.slots.iter().enumerate() {
            if d1[i] && monoid.divides(slot.lt, lt_h) {
                insert_into_g = false;
                break;
            }
        }

        if insert_into_g {
            let lcms: Vec<Term> = self
                .slots
                .iter()
                .map(|slot| monoid.lcm(lt_h, slot.lt))
                .collect();

            // Criterion M: cancel (i, t) when some (j, t) has an lcm
            // properly dividing it.
            for i in 0..d1.len() {
                if !d1[i] {
                    continue;
                }
                let a = lcms[i];
                for j in 0..d1.len() {
                    if i != j && d1[j] {
                        let b = lcms[j];
                        if a != b && monoid.divides(b, a) {
                            d1[i] = false;
                            break;
                        }
                    }
                }
            }

            // One representative per lcm, preferring one that fails the
            // product test; then Criterion F drops the product cases.
            let mut kept: Vec<CriticalPair> = Vec::new();
            let mut bucket: FxHashMap<Term, usize> = FxHashMap::default();
            for i in 0..d1.len() {
                if !d1[i] {
                    continue;
                }
                let lcm = lcms[i];
                let slot = &self.slots[i];
                let marked = monoid.coprime(slot.lt, lt_h);
                // Saturating: under non-graded orders a member's leading
                // degree may exceed its sugar.
                let sugar = slot
                    .poly
                    .sugar()
                    .saturating_sub(monoid.degree(slot.lt))
                    .max(h.sugar().saturating_sub(monoid.degree(lt_h)))
                    + monoid.degree(lcm);
                let pair = CriticalPair {
                    i: i as u32,
                    j: t,
                    lcm,
                    marked,
                    sugar,
                };
                match bucket.get(&lcm) {
                    Some(&pos) => {
                        if kept[pos].marked && !marked {
                            kept[pos] = pair;
                        }
                    }
                    None => {
                        bucket.insert(lcm, kept.len());
                        kept.push(pair);
                    }
                }
            }
            self.pairs.extend(kept.into_iter().filter(|p| !p.marked));

            // LT(h) now dominates: retire every active member whose
            // leading term it divides.
            for slot in &mut self.slots {
                if slot.in_basis && monoid.divides(lt_h, slot.lt) {
                    slot.in_basis = false;
                }
            }
        }

        self.slots.push(BasisSlot {
            poly: h,
            lt: lt_h,
            in_basis: insert_into_g,
        });
    }

    /// Removes and returns every pair of minimal selection degree,
    /// together with that degree.
    ///
    /// The batch order is deterministic given the term ordering: sorted
    /// by degree, then lcm, then indices.
    pub fn select_batch(&mut self) -> Option<(u32, Vec<CriticalPair>)> {
        if self.pairs.is_empty() {
            return None;
        }
        let monoid = self.monoid;
        let order = self.order;
        let use_sugar = self.use_sugar;
        let key = move |p: &CriticalPair| {
            if use_sugar {
                p.sugar
            } else {
                monoid.degree(p.lcm)
            }
        };
        self.pairs.sort_by(|a, b| {
            key(a)
                .cmp(&key(b))
                .then_with(|| monoid.compare(order, a.lcm, b.lcm))
                .then_with(|| (a.i, a.j).cmp(&(b.i, b.j)))
        });
        let degree = key(&self.pairs[0]);
        let split = self.pairs.partition_point(|p| key(p) == degree);
        let batch: Vec<CriticalPair> = self.pairs.drain(..split).collect();
        Some((degree, batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quartus_rings::PrimeField;

    fn poly(
        field: &PrimeField,
        monoid: &TermMonoid,
        rows: &[(i64, &[u16])],
    ) -> Polynomial {
        let mut p = Polynomial::build(field, monoid, TermOrder::DegRevLex, rows).unwrap();
        p.normalize(field).unwrap();
        p
    }

    #[test]
    fn test_coprime_pair_is_pruned() {
        let field = PrimeField::new(32003).unwrap();
        let monoid = TermMonoid::new(2).unwrap();
        let mut pairs = PairSet::new(&monoid, TermOrder::DegRevLex, true);

        let x = poly(&field, &monoid, &[(1, &[1, 0])]);
        let y = poly(&field, &monoid, &[(1, &[0, 1])]);
        pairs.update(vec![x, y]);

        // The only pair has coprime leading terms and dies to the
        // product criterion.
        assert!(pairs.is_empty());
        assert_eq!(pairs.slot_count(), 2);
        assert!(pairs.slots().iter().all(|s| s.in_basis));
    }

    #[test]
    fn test_pair_survives_with_shared_variable() {
        let field = PrimeField::new(32003).unwrap();
        let monoid = TermMonoid::new(2).unwrap();
        let mut pairs = PairSet::new(&monoid, TermOrder::DegRevLex, true);

        // x^2 - y and xy - 1 share x.
        let f = poly(&field, &monoid, &[(1, &[2, 0]), (-1, &[0, 1])]);
        let g = poly(&field, &monoid, &[(1, &[1, 1]), (-1, &[0, 0])]);
        pairs.update(vec![f, g]);

        assert_eq!(pairs.pending(), 1);
        let (degree, batch) = pairs.select_batch().unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].lcm, monoid.make(&[2, 1]).unwrap());
        // sugar = max(2 - 2, 2 - 2) + 3
        assert_eq!(degree, 3);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_dominated_leading_term_clears_flag() {
        let field = PrimeField::new(32003).unwrap();
        let monoid = TermMonoid::new(2).unwrap();
        let mut pairs = PairSet::new(&monoid, TermOrder::DegRevLex, true);

        let f = poly(&field, &monoid, &[(1, &[2, 0]), (1, &[0, 1])]);
        pairs.update(vec![f]);
        assert!(pairs.slots()[0].in_basis);

        // x divides x^2: the old member retires, the new one is active.
        let g = poly(&field, &monoid, &[(1, &[1, 0])]);
        pairs.update(vec![g]);
        assert!(!pairs.slots()[0].in_basis);
        assert!(pairs.slots()[1].in_basis);
    }

    #[test]
    fn test_dominated_newcomer_generates_no_pairs() {
        let field = PrimeField::new(32003).unwrap();
        let monoid = TermMonoid::new(2).unwrap();
        let mut pairs = PairSet::new(&monoid, TermOrder::DegRevLex, true);

        let f = poly(&field, &monoid, &[(1, &[1, 0])]);
        pairs.update(vec![f]);

        // LT = x^2 is divisible by x: recorded but inactive, no pairs.
        let g = poly(&field, &monoid, &[(1, &[2, 0]), (1, &[0, 1])]);
        pairs.update(vec![g]);
        assert!(pairs.is_empty());
        assert!(!pairs.slots()[1].in_basis);
    }

    #[test]
    fn test_update_with_nothing_is_idempotent() {
        let field = PrimeField::new(32003).unwrap();
        let monoid = TermMonoid::new(2).unwrap();
        let mut pairs = PairSet::new(&monoid, TermOrder::DegRevLex, true);

        let f = poly(&field, &monoid, &[(1, &[2, 0]), (-1, &[0, 1])]);
        let g = poly(&field, &monoid, &[(1, &[1, 1]), (-1, &[0, 0])]);
        pairs.update(vec![f, g]);
        let before = pairs.pending();
        pairs.update(vec![]);
        assert_eq!(pairs.pending(), before);
    }

    #[test]
    fn test_batch_selection_is_minimal_and_sorted() {
        let field = PrimeField::new(32003).unwrap();
        let monoid = TermMonoid::new(3).unwrap();
        let mut pairs = PairSet::new(&monoid, TermOrder::DegRevLex, true);

        // Three generators producing pairs of different sugar.
        let f = poly(&field, &monoid, &[(1, &[2, 1, 0]), (1, &[0, 0, 1])]);
        let g = poly(&field, &monoid, &[(1, &[1, 2, 0]), (1, &[0, 0, 1])]);
        let h = poly(&field, &monoid, &[(1, &[1, 0, 3]), (1, &[0, 1, 0])]);
        pairs.update(vec![f, g, h]);

        let (degree, batch) = pairs.select_batch().unwrap();
        assert!(!batch.is_empty());
        for p in &batch {
            assert_eq!(p.sugar, degree);
        }
        if let Some((next_degree, _)) = pairs.select_batch() {
            assert!(next_degree > degree);
        }
    }
}
