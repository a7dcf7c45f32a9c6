//! Debug utilities for inspecting stored expressions.
//!
//! These are primarily useful in tests, logs and during development.

use crate::canonical::{Conjunction, ContentHash};
use crate::error::Result;
use crate::eval::Complexity;
use crate::reference::ExprId;
use crate::store::ExpressionStore;
use crate::types::Var;

/// Summary of a single stored expression.
#[derive(Debug, Clone)]
pub struct ExpressionInfo {
    pub id: ExprId,
    pub hash: ContentHash,
    pub variables: Vec<Var>,
    pub complexity: Complexity,
    pub formula: String,
}

impl std::fmt::Display for ExpressionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(conjunctions={}, literals={}, vars={}, cost={}) = {}",
            self.id,
            self.complexity.conjunction_count,
            self.complexity.total_literals,
            self.variables.len(),
            self.complexity.estimated_cost,
            self.formula
        )
    }
}

fn write_formula(out: &mut String, conjunctions: &[Conjunction]) {
    if conjunctions.is_empty() {
        out.push_str("FALSE");
        return;
    }
    for (i, c) in conjunctions.iter().enumerate() {
        if i > 0 {
            out.push_str(" | ");
        }
        let parens = c.len() > 1 && conjunctions.len() > 1;
        if parens {
            out.push('(');
        }
        if c.is_empty() {
            out.push_str("TRUE");
        }
        for (j, lit) in c.iter().enumerate() {
            if j > 0 {
                out.push_str(" & ");
            }
            out.push_str(&lit.to_string());
        }
        if parens {
            out.push(')');
        }
    }
}

impl ExpressionStore {
    /// Renders the expression as an infix formula, e.g. `(x1 & ~x2) | x3`.
    pub fn to_formula_string(&self, id: ExprId) -> Result<String> {
        self.with_expression(id, |e| {
            let mut out = String::new();
            write_formula(&mut out, e.conjunctions());
            out
        })
    }

    pub fn expression_info(&self, id: ExprId) -> Result<ExpressionInfo> {
        Ok(ExpressionInfo {
            id,
            hash: self.content_hash(id)?,
            variables: self.get_expression_variables(id)?,
            complexity: self.get_expression_complexity(id)?,
            formula: self.to_formula_string(id)?,
        })
    }
}
