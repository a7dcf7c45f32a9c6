//! Operator sugar for building expressions.
//!
//! `a & b` and `a | b` on [`ExprId`]s produce lazy operations that are
//! evaluated against a store with [`ExpressionStore::eval`].
//!
//! ```
//! use dnf_rs::store::ExpressionStore;
//!
//! let store = ExpressionStore::default();
//! let x = store.create_literal_expression(1).unwrap();
//! let y = store.create_literal_expression(2).unwrap();
//!
//! let f = store.eval(x & y).unwrap();
//! assert_eq!(f, store.and_expressions(x, y).unwrap());
//! ```

use std::ops::{BitAnd, BitOr};

use crate::error::{ExprError, Result};
use crate::reference::ExprId;
use crate::store::ExpressionStore;

pub struct AndOp {
    a: ExprId,
    b: ExprId,
}

impl BitAnd for ExprId {
    type Output = AndOp;

    fn bitand(self, rhs: Self) -> Self::Output {
        AndOp { a: self, b: rhs }
    }
}

pub struct OrOp {
    a: ExprId,
    b: ExprId,
}

impl BitOr for ExprId {
    type Output = OrOp;

    fn bitor(self, rhs: Self) -> Self::Output {
        OrOp { a: self, b: rhs }
    }
}

pub trait Eval {
    fn eval(&self, store: &ExpressionStore) -> Result<ExprId>;
}

impl ExpressionStore {
    pub fn eval(&self, value: impl Eval) -> Result<ExprId> {
        value.eval(self)
    }
}

impl Eval for ExprId {
    fn eval(&self, store: &ExpressionStore) -> Result<ExprId> {
        if store.expression_exists(*self) {
            Ok(*self)
        } else {
            Err(ExprError::ExpressionNotFound(*self))
        }
    }
}

impl Eval for AndOp {
    fn eval(&self, store: &ExpressionStore) -> Result<ExprId> {
        store.and_expressions(self.a, self.b)
    }
}

impl Eval for OrOp {
    fn eval(&self, store: &ExpressionStore) -> Result<ExprId> {
        store.or_expressions(self.a, self.b)
    }
}
