use num_bigint::BigUint;
use rustc_hash::FxHashMap;

use crate::canonical::{conjunctions_compatible, Conjunction};
use crate::error::Result;
use crate::reference::ExprId;
use crate::store::ExpressionStore;
use crate::types::Lit;

impl ExpressionStore {
    /// Returns one satisfying partial assignment of the expression, if any exists.
    ///
    /// Any canonical conjunction is satisfiable, so this is the first one.
    /// Variables not mentioned in it are unconstrained.
    pub fn one_sat(&self, id: ExprId) -> Result<Option<Vec<Lit>>> {
        self.with_expression(id, |e| e.conjunctions().first().cloned())
    }

    /// Counts the satisfying assignments over the variables of the expression.
    ///
    /// TRUE has exactly one (empty) assignment, FALSE has none.
    pub fn sat_count(&self, id: ExprId) -> Result<BigUint> {
        let conjunctions = self.with_expression(id, |e| e.conjunctions().to_vec())?;
        let num_vars = self.get_expression_variables(id)?.len();
        let mut cache = FxHashMap::default();
        Ok(sat_count_(conjunctions, num_vars, &mut cache))
    }

    /// Whether the conjunctions of the expression are pairwise exclusive.
    ///
    /// When they are, the sum computed by the evaluator is an exact
    /// probability under independent variables. Otherwise overlapping terms
    /// are counted more than once.
    pub fn has_disjoint_terms(&self, id: ExprId) -> Result<bool> {
        self.with_expression(id, |e| {
            let cs = e.conjunctions();
            cs.iter()
                .enumerate()
                .all(|(i, x)| cs[i + 1..].iter().all(|y| !conjunctions_compatible(x, y)))
        })
    }
}

// Shannon expansion on the first variable of the first conjunction.
fn sat_count_(
    conjunctions: Vec<Conjunction>,
    free: usize,
    cache: &mut FxHashMap<(Vec<Conjunction>, usize), BigUint>,
) -> BigUint {
    if conjunctions.is_empty() {
        return BigUint::ZERO;
    }
    if conjunctions.iter().any(|c| c.is_empty()) {
        return BigUint::from(1u32) << free;
    }

    let key = (conjunctions, free);
    if let Some(count) = cache.get(&key) {
        return count.clone();
    }
    let (conjunctions, free) = &key;

    let var = conjunctions[0][0].var();
    let high = cofactor(conjunctions, var.pos());
    let low = cofactor(conjunctions, var.neg());
    let count = sat_count_(high, free - 1, cache) + sat_count_(low, free - 1, cache);

    cache.insert(key, count.clone());
    count
}

/// Conjunctions under the assumption that `lit` holds.
fn cofactor(conjunctions: &[Conjunction], lit: Lit) -> Vec<Conjunction> {
    let mut result: Vec<Conjunction> = conjunctions
        .iter()
        .filter(|c| !c.contains(&!lit))
        .map(|c| c.iter().copied().filter(|&l| l != lit).collect())
        .collect();
    result.sort_unstable();
    result.dedup();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_sat_count_constants() {
        let store = ExpressionStore::default();
        assert_eq!(store.sat_count(ExprId::TRUE).unwrap(), BigUint::from(1u32));
        assert_eq!(store.sat_count(ExprId::FALSE).unwrap(), BigUint::ZERO);
    }

    #[test]
    fn test_sat_count() {
        let store = ExpressionStore::default();
        let x1 = store.create_literal_expression(1).unwrap();
        let x2 = store.create_literal_expression(2).unwrap();

        assert_eq!(store.sat_count(x1).unwrap(), BigUint::from(1u32));
        let f = store.or_expressions(x1, x2).unwrap();
        assert_eq!(store.sat_count(f).unwrap(), BigUint::from(3u32));
        let g = store.and_expressions(x1, x2).unwrap();
        assert_eq!(store.sat_count(g).unwrap(), BigUint::from(1u32));
    }

    #[test]
    fn test_sat_count_overlapping_terms() {
        let store = ExpressionStore::default();
        // (1 & 2) | (~1 & 3) | (2 & 3) over 3 variables: the consensus term adds nothing.
        let e = store.create_expression(&[
            vec![Lit::from_signed(1).unwrap(), Lit::from_signed(2).unwrap()],
            vec![Lit::from_signed(-1).unwrap(), Lit::from_signed(3).unwrap()],
            vec![Lit::from_signed(2).unwrap(), Lit::from_signed(3).unwrap()],
        ]);
        assert_eq!(store.sat_count(e.unwrap()).unwrap(), BigUint::from(4u32));
    }

    #[test]
    fn test_sat_count_wide() {
        let store = ExpressionStore::default();
        // x1 | x2 | ... | x70: all but one of 2^70 assignments.
        let conjunctions: Vec<Conjunction> = (1..=70).map(|i| vec![Lit::from_signed(i).unwrap()]).collect();
        let e = store.create_expression(&conjunctions).unwrap();
        let expected = (BigUint::from(1u32) << 70usize) - BigUint::from(1u32);
        assert_eq!(store.sat_count(e).unwrap(), expected);
    }

    #[test]
    fn test_one_sat() {
        let store = ExpressionStore::default();
        let e = store.create_cube([3, -1]).unwrap();
        assert_eq!(
            store.one_sat(e).unwrap(),
            Some(vec![Lit::from_signed(-1).unwrap(), Lit::from_signed(3).unwrap()])
        );
        assert_eq!(store.one_sat(ExprId::FALSE).unwrap(), None);
        assert_eq!(store.one_sat(ExprId::TRUE).unwrap(), Some(vec![]));
    }

    #[test]
    fn test_disjoint_terms() {
        let store = ExpressionStore::default();
        let x1 = store.create_literal_expression(1).unwrap();
        let x2 = store.create_literal_expression(2).unwrap();
        let f = store.or_expressions(x1, x2).unwrap();
        assert!(!store.has_disjoint_terms(f).unwrap());

        let (a, b) = store.split_expression(ExprId::TRUE, crate::types::Var::new(1)).unwrap();
        let g = store.or_expressions(a, b).unwrap();
        assert!(store.has_disjoint_terms(g).unwrap());
        assert!(store.has_disjoint_terms(ExprId::FALSE).unwrap());
    }
}
