//! Canonical forms of conjunctions and DNF expressions.
//!
//! A *canonical conjunction* is a strictly increasing sequence of literals (see
//! the order on [`Lit`]) that never mentions one variable twice. A *canonical
//! expression* is a strictly increasing sequence of canonical conjunctions,
//! compared lexicographically with the shorter sequence first on a common
//! prefix (which is exactly the order of `Vec<Lit>`).
//!
//! Two expressions with the same canonical form are the same expression; the
//! [`ContentHash`] of that form is the key under which the store deduplicates.
//!
//! ```
//! use dnf_rs::canonical::{canonicalize_conjunction, canonicalize_expression};
//! use dnf_rs::types::Var;
//!
//! let (a, b) = (Var::new(1), Var::new(2));
//!
//! // Sorted, deduplicated:
//! let c = canonicalize_conjunction(&[b.pos(), a.neg(), b.pos()]);
//! assert_eq!(c, Some(vec![a.neg(), b.pos()]));
//!
//! // Contradictory:
//! assert_eq!(canonicalize_conjunction(&[a.pos(), a.neg()]), None);
//!
//! // Contradictory conjunctions vanish from a DNF, duplicates collapse:
//! let e = canonicalize_expression(&[
//!     vec![b.pos()],
//!     vec![a.pos(), a.neg()],
//!     vec![b.pos(), b.pos()],
//! ]);
//! assert_eq!(e, vec![vec![b.pos()]]);
//! ```

use std::cmp::Ordering;
use std::fmt;

use crate::types::Lit;

/// An AND of literals.
pub type Conjunction = Vec<Lit>;

const HASH_DOMAIN: &[u8] = b"dnf-rs.expression.v1";

/// Sorts and deduplicates `literals`.
///
/// Returns `None` if the conjunction contains a variable with both polarities,
/// i.e. it is unsatisfiable. Empty input is the (valid) TRUE conjunction.
pub fn canonicalize_conjunction(literals: &[Lit]) -> Option<Conjunction> {
    let mut literals = literals.to_vec();
    literals.sort_unstable();
    literals.dedup();

    // After dedup, two adjacent literals on one variable differ in polarity.
    if literals.windows(2).any(|w| w[0].var() == w[1].var()) {
        return None;
    }
    Some(literals)
}

/// Reduces a list of conjunctions (understood as their OR) to canonical form.
///
/// Contradictory conjunctions are dropped. An empty (TRUE) conjunction is kept.
pub fn canonicalize_expression(conjunctions: &[Conjunction]) -> Vec<Conjunction> {
    let mut result: Vec<Conjunction> = conjunctions
        .iter()
        .filter_map(|c| canonicalize_conjunction(c))
        .collect();
    result.sort_unstable();
    result.dedup();
    result
}

/// Union of two canonical conjunctions.
///
/// Shared literals collapse to one, and opposite literals on the same variable
/// make the result contradictory (`None`). Runs in linear time.
pub fn merge_conjunctions(a: &[Lit], b: &[Lit]) -> Option<Conjunction> {
    debug_assert!(is_canonical_conjunction(a));
    debug_assert!(is_canonical_conjunction(b));

    let mut result = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let (x, y) = (a[i], b[j]);
        match x.var().cmp(&y.var()) {
            Ordering::Less => {
                result.push(x);
                i += 1;
            }
            Ordering::Greater => {
                result.push(y);
                j += 1;
            }
            Ordering::Equal => {
                if x != y {
                    return None;
                }
                result.push(x);
                i += 1;
                j += 1;
            }
        }
    }
    result.extend_from_slice(&a[i..]);
    result.extend_from_slice(&b[j..]);
    Some(result)
}

/// Whether two canonical conjunctions can be true at the same time.
pub fn conjunctions_compatible(a: &[Lit], b: &[Lit]) -> bool {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].var().cmp(&b[j].var()) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                if a[i] != b[j] {
                    return false;
                }
                i += 1;
                j += 1;
            }
        }
    }
    true
}

pub fn is_canonical_conjunction(literals: &[Lit]) -> bool {
    literals
        .windows(2)
        .all(|w| w[0] < w[1] && w[0].var() != w[1].var())
}

pub fn is_canonical_expression(conjunctions: &[Conjunction]) -> bool {
    conjunctions.iter().all(|c| is_canonical_conjunction(c))
        && conjunctions.windows(2).all(|w| w[0] < w[1])
}

/// 256-bit digest of a canonical expression.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough to tell hashes apart in logs.
        write!(f, "ContentHash(")?;
        for byte in &self.0[..6] {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, "..)")
    }
}

/// Hashes an expression that is already in canonical form.
///
/// Each conjunction is written as its length followed by its literals, and the
/// whole stream is prefixed by the number of conjunctions, so the encoding is
/// injective and TRUE (`[[]]`) and FALSE (`[]`) hash differently.
pub fn compute_expression_hash(conjunctions: &[Conjunction]) -> ContentHash {
    debug_assert!(is_canonical_expression(conjunctions));

    let mut hasher = blake3::Hasher::new();
    hasher.update(HASH_DOMAIN);
    hasher.update(&(conjunctions.len() as u64).to_le_bytes());
    for conjunction in conjunctions {
        hasher.update(&(conjunction.len() as u64).to_le_bytes());
        for lit in conjunction {
            hasher.update(&lit.to_bytes());
        }
    }
    ContentHash(*hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::Var;

    fn lits(xs: &[i64]) -> Conjunction {
        xs.iter().map(|&x| Lit::from_signed(x).unwrap()).collect()
    }

    #[test]
    fn test_canonicalize_conjunction() {
        assert_eq!(canonicalize_conjunction(&lits(&[3, 1, 2])), Some(lits(&[1, 2, 3])));
        assert_eq!(canonicalize_conjunction(&lits(&[2, 2, -1])), Some(lits(&[-1, 2])));
        assert_eq!(canonicalize_conjunction(&lits(&[1, 2, -1])), None);
        assert_eq!(canonicalize_conjunction(&[]), Some(vec![]));
    }

    #[test]
    fn test_negated_sorts_after_positive() {
        let c = canonicalize_conjunction(&lits(&[-2, 1])).unwrap();
        assert_eq!(c, lits(&[1, -2]));
        assert!(Var::new(2).pos() < Var::new(2).neg());
    }

    #[test]
    fn test_canonicalize_conjunction_idempotent() {
        let c = canonicalize_conjunction(&lits(&[5, -3, 5, 9, -1])).unwrap();
        assert_eq!(canonicalize_conjunction(&c), Some(c.clone()));
        assert!(is_canonical_conjunction(&c));
    }

    #[test]
    fn test_canonicalize_expression() {
        let e = canonicalize_expression(&[lits(&[2]), lits(&[1, 2]), lits(&[1]), lits(&[2, 1]), lits(&[3, -3])]);
        assert_eq!(e, vec![lits(&[1]), lits(&[1, 2]), lits(&[2])]);
        assert!(is_canonical_expression(&e));
        assert_eq!(canonicalize_expression(&e), e);
    }

    #[test]
    fn test_canonicalize_expression_keeps_true() {
        let e = canonicalize_expression(&[lits(&[1]), vec![]]);
        assert_eq!(e, vec![vec![], lits(&[1])]);
    }

    #[test]
    fn test_canonicalize_expression_all_contradictory() {
        let e = canonicalize_expression(&[lits(&[1, -1]), lits(&[2, -2])]);
        assert!(e.is_empty());
    }

    #[test]
    fn test_merge_conjunctions() {
        assert_eq!(merge_conjunctions(&lits(&[1, 3]), &lits(&[2, 3])), Some(lits(&[1, 2, 3])));
        assert_eq!(merge_conjunctions(&lits(&[1, 3]), &lits(&[-3])), None);
        assert_eq!(merge_conjunctions(&[], &lits(&[4])), Some(lits(&[4])));
    }

    #[test]
    fn test_compatible() {
        assert!(conjunctions_compatible(&lits(&[1, 2]), &lits(&[2, 3])));
        assert!(!conjunctions_compatible(&lits(&[1, 2]), &lits(&[-2, 3])));
        assert!(conjunctions_compatible(&[], &lits(&[-2])));
    }

    #[test]
    fn test_hash_deterministic() {
        let a = canonicalize_expression(&[lits(&[2, 1]), lits(&[3])]);
        let b = canonicalize_expression(&[lits(&[3]), lits(&[1, 2]), lits(&[3, 3])]);
        assert_eq!(compute_expression_hash(&a), compute_expression_hash(&b));
    }

    #[test]
    fn test_hash_distinguishes_structure() {
        let hashes = [
            compute_expression_hash(&[]),
            compute_expression_hash(&[vec![]]),
            compute_expression_hash(&[lits(&[1, 2])]),
            compute_expression_hash(&[lits(&[1]), lits(&[2])]),
            compute_expression_hash(&[lits(&[1, -2])]),
        ];
        for i in 0..hashes.len() {
            for j in (i + 1)..hashes.len() {
                assert_ne!(hashes[i], hashes[j], "hashes {} and {} collide", i, j);
            }
        }
    }
}
