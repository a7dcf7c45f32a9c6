//! Expressions to DOT (Graphviz) conversion.
//!
//! Each expression is drawn as a three-level tree: the expression node (an OR)
//! on top, one node per conjunction (an AND) below it, and literal leaves at the
//! bottom. Literal leaves are shared between all rendered expressions, so
//! common variables are easy to spot.
//!
//! # Examples
//!
//! ```
//! use dnf_rs::store::ExpressionStore;
//!
//! let store = ExpressionStore::default();
//! let f = store.create_cube([1, -2]).unwrap();
//! let g = store.create_literal_expression(2).unwrap();
//!
//! let dot = store.to_dot(&[f, g]).unwrap();
//! assert!(dot.starts_with("digraph"));
//! // Render with: dot -Tpng output.dot -o output.png
//! ```

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::error::Result;
use crate::reference::ExprId;
use crate::store::ExpressionStore;
use crate::table::Expression;
use crate::types::Lit;

/// Configuration options for DOT output generation.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for expression (root) nodes (default: "rect")
    pub root_shape: &'static str,
    /// Shape for conjunction nodes (default: "circle")
    pub conjunction_shape: &'static str,
    /// Shape for literal leaves (default: "plaintext")
    pub literal_shape: &'static str,
    /// Style for edges into negated literals (default: "dashed")
    pub negated_edge_style: &'static str,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            root_shape: "rect",
            conjunction_shape: "circle",
            literal_shape: "plaintext",
            negated_edge_style: "dashed",
        }
    }
}

fn literal_node(lit: Lit) -> String {
    format!("l{}{}", if lit.is_negated() { "n" } else { "p" }, lit.var().id())
}

impl ExpressionStore {
    pub fn to_dot(&self, roots: &[ExprId]) -> Result<String> {
        self.to_dot_with_config(roots, &DotConfig::default())
    }

    pub fn to_dot_with_config(&self, roots: &[ExprId], config: &DotConfig) -> Result<String> {
        let mut expressions = Vec::with_capacity(roots.len());
        for &id in roots {
            expressions.push(self.expression(id)?);
        }
        Ok(render(&expressions, config)?)
    }
}

fn render(expressions: &[Expression], config: &DotConfig) -> std::result::Result<String, std::fmt::Error> {
    let mut dot = String::new();
    writeln!(dot, "digraph {{")?;

    let mut literals = BTreeSet::new();
    for e in expressions {
        let root = format!("e{}", e.id().get());
        writeln!(dot, "{} [shape={}, label=\"{}\"];", root, config.root_shape, e.id())?;
        for (i, c) in e.conjunctions().iter().enumerate() {
            let node = format!("{}c{}", root, i);
            writeln!(dot, "{} [shape={}, label=\"&\"];", node, config.conjunction_shape)?;
            writeln!(dot, "{} -> {};", root, node)?;
            for &lit in c {
                literals.insert(lit);
                let style = if lit.is_negated() {
                    config.negated_edge_style
                } else {
                    "solid"
                };
                writeln!(dot, "{} -> {} [style={}];", node, literal_node(lit), style)?;
            }
        }
    }

    writeln!(dot, "{{ rank=sink;")?;
    for lit in literals {
        writeln!(dot, "{} [shape={}, label=\"{}\"];", literal_node(lit), config.literal_shape, lit)?;
    }
    writeln!(dot, "}}")?;

    writeln!(dot, "}}")?;
    Ok(dot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_dot() {
        let store = ExpressionStore::default();
        let f = store.create_cube([1, -2]).unwrap();
        let dot = store.to_dot(&[f]).unwrap();
        println!("{}", dot);
        assert!(dot.contains("e3 -> e3c0;"));
        assert!(dot.contains("e3c0 -> lp1 [style=solid];"));
        assert!(dot.contains("e3c0 -> ln2 [style=dashed];"));
        assert!(dot.contains("ln2 [shape=plaintext, label=\"~x2\"];"));
    }

    #[test]
    fn test_to_dot_shares_literals() {
        let store = ExpressionStore::default();
        let f = store.create_cube([1, 2]).unwrap();
        let g = store.create_literal_expression(1).unwrap();
        let dot = store.to_dot(&[f, g]).unwrap();
        assert_eq!(dot.matches("lp1 [shape=").count(), 1);
    }

    #[test]
    fn test_to_dot_unknown() {
        let store = ExpressionStore::default();
        assert!(store.to_dot(&[ExprId::new(7)]).is_err());
    }
}
