//! Store configuration: size caps and the cost model of the complexity estimator.

/// Default cap on literals in one stored conjunction.
pub const MAX_LITERALS: usize = 128;
/// Default cap on conjunctions in one stored expression.
pub const MAX_CONJUNCTIONS: usize = 1024;
/// Default cap on literals in one conjunction handed to the evaluator.
pub const MAX_EVAL_LITERALS: usize = 256;

/// Linear cost model: `base + per_conjunction * conjunctions + per_literal * literals`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CostModel {
    pub base: u64,
    pub per_conjunction: u64,
    pub per_literal: u64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            base: 5_000,
            per_conjunction: 2_000,
            per_literal: 500,
        }
    }
}

impl CostModel {
    pub fn estimate(&self, conjunctions: usize, literals: usize) -> u64 {
        self.base
            .saturating_add(self.per_conjunction.saturating_mul(conjunctions as u64))
            .saturating_add(self.per_literal.saturating_mul(literals as u64))
    }
}

/// Configuration of an [`ExpressionStore`][crate::store::ExpressionStore].
///
/// # Examples
///
/// ```
/// use dnf_rs::config::StoreConfig;
/// use dnf_rs::store::ExpressionStore;
///
/// let config = StoreConfig {
///     max_literals: 16,
///     ..StoreConfig::default()
/// };
/// let store = ExpressionStore::new(config);
/// assert_eq!(store.config().max_literals, 16);
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct StoreConfig {
    /// Cap on literals in any stored conjunction.
    pub max_literals: usize,
    /// Cap on conjunctions in any stored expression.
    pub max_conjunctions: usize,
    /// Cap on literals in one conjunction passed to the evaluator.
    pub max_eval_literals: usize,
    pub cost: CostModel,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_literals: MAX_LITERALS,
            max_conjunctions: MAX_CONJUNCTIONS,
            max_eval_literals: MAX_EVAL_LITERALS,
            cost: CostModel::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_estimate() {
        let cost = CostModel::default();
        assert_eq!(cost.estimate(0, 0), 5_000);
        assert_eq!(cost.estimate(2, 3), 5_000 + 4_000 + 1_500);
    }

    #[test]
    fn test_cost_saturates() {
        let cost = CostModel {
            base: u64::MAX,
            per_conjunction: 1,
            per_literal: 1,
        };
        assert_eq!(cost.estimate(10, 10), u64::MAX);
    }
}
