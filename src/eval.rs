//! Continuous evaluation of conjunctions and DNF expressions.
//!
//! Variables take fixed-point values in `[0, SCALE]`, read as a degree of truth
//! (`SCALE` is 1.0). A literal contributes its variable's value, or
//! `SCALE - value` when negated. A conjunction evaluates to the product of its
//! literal contributions (probabilistic AND of independent events), and an
//! expression to the sum of its conjunctions, capped at `SCALE`.
//!
//! The sum is an exact probability only when the conjunctions are pairwise
//! exclusive, see [`ExpressionStore::has_disjoint_terms`][crate::store::ExpressionStore::has_disjoint_terms].
//!
//! ```
//! use dnf_rs::eval::{evaluate_conjunction_with_values, SCALE};
//! use dnf_rs::types::Var;
//!
//! let (a, b) = (Var::new(1), Var::new(2));
//! let value = evaluate_conjunction_with_values(
//!     &[a.pos(), b.neg()],
//!     &[a, b],
//!     &[SCALE / 2, SCALE / 4],
//! )
//! .unwrap();
//! assert_eq!(value, SCALE / 2 * 3 / 4);
//! ```

use log::debug;
use rustc_hash::FxHashMap;

use crate::canonical::Conjunction;
use crate::config::{StoreConfig, MAX_CONJUNCTIONS, MAX_EVAL_LITERALS};
use crate::error::{ExprError, Result};
use crate::types::{Lit, Var};

/// Fixed-point unit: the value of certain truth.
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Values of settled variables.
///
/// Every stored value lies in `[0, SCALE]`.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    values: FxHashMap<Var, u128>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an assignment from parallel id/value slices.
    ///
    /// When an id is repeated, its first value is used.
    pub fn from_parallel(variable_ids: &[Var], variable_values: &[u128]) -> Result<Self> {
        if variable_ids.len() != variable_values.len() {
            return Err(ExprError::LengthMismatch {
                ids: variable_ids.len(),
                values: variable_values.len(),
            });
        }
        let mut assignment = Self::new();
        for (&var, &value) in variable_ids.iter().zip(variable_values) {
            check_value(var, value)?;
            assignment.values.entry(var).or_insert(value);
        }
        Ok(assignment)
    }

    /// Sets the value of `var`, replacing any previous one.
    pub fn insert(&mut self, var: Var, value: u128) -> Result<()> {
        check_value(var, value)?;
        self.values.insert(var, value);
        Ok(())
    }

    pub fn get(&self, var: Var) -> Option<u128> {
        self.values.get(&var).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Var, u128)> + '_ {
        self.values.iter().map(|(&var, &value)| (var, value))
    }

    /// Contribution of one literal: the variable's value, or its complement.
    pub fn literal_value(&self, lit: Lit) -> Result<u128> {
        let value = self
            .get(lit.var())
            .ok_or(ExprError::VariableValueNotProvided(lit.var()))?;
        Ok(if lit.is_negated() { SCALE - value } else { value })
    }
}

fn check_value(var: Var, value: u128) -> Result<()> {
    if value > SCALE {
        return Err(ExprError::ValueOutOfRange { var, value });
    }
    Ok(())
}

/// Product of the literal contributions, rescaled after every step.
///
/// Stops at the first zero partial product.
pub fn evaluate_conjunction(literals: &[Lit], assignment: &Assignment, max_literals: usize) -> Result<u128> {
    if literals.len() > max_literals {
        return Err(ExprError::TooManyLiterals {
            size: literals.len(),
            max: max_literals,
        });
    }

    let mut product = SCALE;
    for &lit in literals {
        // Both factors are at most SCALE = 10^18, so the product fits in u128.
        product = product * assignment.literal_value(lit)? / SCALE;
        if product == 0 {
            debug!("evaluate_conjunction: zero at {}", lit);
            return Ok(0);
        }
    }
    Ok(product)
}

/// Sum of the conjunction values, saturating at `SCALE`.
pub fn evaluate_expression(conjunctions: &[Conjunction], assignment: &Assignment, config: &StoreConfig) -> Result<u128> {
    if conjunctions.len() > config.max_conjunctions {
        return Err(ExprError::TooManyConjunctions {
            size: conjunctions.len(),
            max: config.max_conjunctions,
        });
    }

    let mut sum = 0;
    for conjunction in conjunctions {
        sum += evaluate_conjunction(conjunction, assignment, config.max_eval_literals)?;
        if sum >= SCALE {
            debug!("evaluate_expression: saturated");
            return Ok(SCALE);
        }
    }
    Ok(sum)
}

pub fn evaluate_conjunction_with_values(
    literals: &[Lit],
    variable_ids: &[Var],
    variable_values: &[u128],
) -> Result<u128> {
    let assignment = Assignment::from_parallel(variable_ids, variable_values)?;
    evaluate_conjunction(literals, &assignment, MAX_EVAL_LITERALS)
}

pub fn evaluate_expression_with_values(
    conjunctions: &[Conjunction],
    variable_ids: &[Var],
    variable_values: &[u128],
) -> Result<u128> {
    let assignment = Assignment::from_parallel(variable_ids, variable_values)?;
    evaluate_expression(conjunctions, &assignment, &StoreConfig::default())
}

/// Size metrics of an expression and its estimated evaluation cost.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct Complexity {
    pub conjunction_count: usize,
    pub max_literals: usize,
    pub total_literals: usize,
    pub estimated_cost: u64,
}

pub fn expression_complexity_with(conjunctions: &[Conjunction], config: &StoreConfig) -> Result<Complexity> {
    if conjunctions.len() > config.max_conjunctions {
        return Err(ExprError::TooManyConjunctions {
            size: conjunctions.len(),
            max: config.max_conjunctions,
        });
    }

    let mut max_literals = 0;
    let mut total_literals = 0;
    for conjunction in conjunctions {
        if conjunction.len() > config.max_eval_literals {
            return Err(ExprError::TooManyLiterals {
                size: conjunction.len(),
                max: config.max_eval_literals,
            });
        }
        max_literals = max_literals.max(conjunction.len());
        total_literals += conjunction.len();
    }

    Ok(Complexity {
        conjunction_count: conjunctions.len(),
        max_literals,
        total_literals,
        estimated_cost: config.cost.estimate(conjunctions.len(), total_literals),
    })
}

pub fn expression_complexity(conjunctions: &[Conjunction]) -> Result<Complexity> {
    expression_complexity_with(conjunctions, &StoreConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn lits(xs: &[i64]) -> Conjunction {
        xs.iter().map(|&x| Lit::from_signed(x).unwrap()).collect()
    }

    fn vars(xs: &[u64]) -> Vec<Var> {
        xs.iter().copied().map(Var::new).collect()
    }

    #[test]
    fn test_conjunction_product() {
        let v = evaluate_conjunction_with_values(&lits(&[1, 2]), &vars(&[1, 2]), &[SCALE * 6 / 10, SCALE / 2]).unwrap();
        assert_eq!(v, SCALE * 3 / 10);
    }

    #[test]
    fn test_negated_literal() {
        let v = evaluate_conjunction_with_values(&lits(&[-1]), &vars(&[1]), &[SCALE / 4]).unwrap();
        assert_eq!(v, SCALE * 3 / 4);
    }

    #[test]
    fn test_empty_conjunction_is_true() {
        assert_eq!(evaluate_conjunction_with_values(&[], &[], &[]), Ok(SCALE));
    }

    #[test]
    fn test_missing_variable() {
        let res = evaluate_conjunction_with_values(&lits(&[1, 2]), &vars(&[1]), &[SCALE]);
        assert_eq!(res, Err(ExprError::VariableValueNotProvided(Var::new(2))));
    }

    #[test]
    fn test_zero_short_circuit() {
        // Variable 2 is missing, but the product is already zero.
        let res = evaluate_conjunction_with_values(&lits(&[1, 2]), &vars(&[1]), &[0]);
        assert_eq!(res, Ok(0));
    }

    #[test]
    fn test_value_out_of_range() {
        let res = evaluate_conjunction_with_values(&lits(&[1]), &vars(&[1]), &[SCALE + 1]);
        assert_eq!(
            res,
            Err(ExprError::ValueOutOfRange {
                var: Var::new(1),
                value: SCALE + 1
            })
        );
    }

    #[test]
    fn test_length_mismatch() {
        let res = evaluate_expression_with_values(&[lits(&[1])], &vars(&[1, 2]), &[SCALE]);
        assert_eq!(res, Err(ExprError::LengthMismatch { ids: 2, values: 1 }));
    }

    #[test]
    fn test_conjunction_too_long() {
        let long: Vec<Lit> = (1..=(MAX_EVAL_LITERALS as u64 + 1)).map(|i| Var::new(i).pos()).collect();
        let res = evaluate_conjunction(&long, &Assignment::new(), MAX_EVAL_LITERALS);
        assert_eq!(
            res,
            Err(ExprError::TooManyLiterals {
                size: MAX_EVAL_LITERALS + 1,
                max: MAX_EVAL_LITERALS
            })
        );
    }

    #[test]
    fn test_expression_sum_saturates() {
        let e = vec![lits(&[1]), lits(&[2])];
        let v = evaluate_expression_with_values(&e, &vars(&[1, 2]), &[SCALE * 7 / 10, SCALE / 2]).unwrap();
        assert_eq!(v, SCALE);

        let v = evaluate_expression_with_values(&e, &vars(&[1, 2]), &[SCALE / 10, SCALE / 5]).unwrap();
        assert_eq!(v, SCALE * 3 / 10);
    }

    #[test]
    fn test_false_expression_is_zero() {
        assert_eq!(evaluate_expression_with_values(&[], &[], &[]), Ok(0));
    }

    #[test]
    fn test_first_value_wins() {
        let assignment = Assignment::from_parallel(&vars(&[1, 1]), &[SCALE, 0]).unwrap();
        assert_eq!(assignment.get(Var::new(1)), Some(SCALE));
        assert_eq!(assignment.len(), 1);
    }

    #[test]
    fn test_complexity() {
        let e = vec![lits(&[1]), lits(&[1, 2, 3]), lits(&[-4, 5])];
        let c = expression_complexity(&e).unwrap();
        assert_eq!(c.conjunction_count, 3);
        assert_eq!(c.max_literals, 3);
        assert_eq!(c.total_literals, 6);
        assert_eq!(c.estimated_cost, StoreConfig::default().cost.estimate(3, 6));
    }

    #[test]
    fn test_complexity_too_many_conjunctions() {
        let config = StoreConfig {
            max_conjunctions: 2,
            ..StoreConfig::default()
        };
        let e = vec![lits(&[1]), lits(&[2]), lits(&[3])];
        assert_eq!(
            expression_complexity_with(&e, &config),
            Err(ExprError::TooManyConjunctions { size: 3, max: 2 })
        );
    }
}
