//! # dnf-rs: content-addressed DNF expressions with continuous evaluation
//!
//! **`dnf-rs`** stores logical expressions over binary event variables in
//! disjunctive normal form (an OR of AND-clauses), reduced to a canonical form
//! and deduplicated by a content hash. It is the expression layer of a
//! conditional-market system: positions are conditioned on expressions, and
//! once events settle, expressions are evaluated to a payout fraction.
//!
//! ## Key Features
//!
//! - **Manager-Centric Architecture**: All operations go through the [`ExpressionStore`][crate::store::ExpressionStore]
//!   manager, which canonicalizes every result and hands out one [`ExprId`][crate::reference::ExprId] per distinct DNF.
//! - **Canonical Forms**: Literals and conjunctions are sorted and deduplicated, contradictory conjunctions vanish.
//!   Semantically equal DNFs get the same identity no matter how they were built.
//! - **Continuous Evaluation**: Variables take fixed-point values in `[0, SCALE]`; conjunctions multiply, expressions
//!   add up (capped at `SCALE`).
//! - **Reserved Constants**: `@1` is TRUE (one empty conjunction), `@2` is FALSE (no conjunctions).
//!
//! ## Basic Usage
//!
//! ```rust
//! use dnf_rs::eval::SCALE;
//! use dnf_rs::store::ExpressionStore;
//! use dnf_rs::types::Var;
//!
//! // 1. Initialize the store
//! let store = ExpressionStore::default();
//!
//! // 2. Create literal expressions (signed, 1-based like DIMACS)
//! let a = store.create_literal_expression(1).unwrap();
//! let b = store.create_literal_expression(2).unwrap();
//!
//! // 3. Combine: f = a AND b
//! let f = store.and_expressions(a, b).unwrap();
//!
//! // 4. Evaluate with a = 0.6, b = 0.5
//! let value = store
//!     .evaluate_expression_with_values(f, &[Var::new(1), Var::new(2)], &[SCALE * 6 / 10, SCALE / 2])
//!     .unwrap();
//! assert_eq!(value, SCALE * 3 / 10);
//! ```
//!
//! ## Core Components
//!
//! - **[`canonical`]**: canonical forms and content hashing.
//! - **[`eval`]**: continuous evaluation and complexity metrics.
//! - **[`store`]**: the [`ExpressionStore`][crate::store::ExpressionStore] and its algebraic operators.
//! - **[`sat`]**: model counting and term disjointness.

pub mod canonical;
pub mod config;
pub mod debug;
pub mod dot;
pub mod error;
pub mod eval;
pub mod ops;
pub mod reference;
pub mod sat;
pub mod store;
pub mod table;
pub mod types;
