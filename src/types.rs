//! Variables and literals.
//!
//! A [`Lit`] is a variable together with a polarity. Literals are totally
//! ordered by variable id first and polarity second (the unnegated literal comes
//! first), so after sorting, the two polarities of one variable are adjacent.
//! Canonical conjunctions rely on this order for contradiction detection.

use std::fmt;
use std::ops::Not;

use crate::error::{ExprError, Result};

/// A variable identifier in `[0, 2^64)`.
///
/// Unlike the signed literal form, id `0` is an ordinary variable here. The
/// signed form ([`Lit::from_signed`]) reaches ids up to `2^63` only.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u64);

impl Var {
    /// Creates a new variable with the given ID.
    pub const fn new(id: u64) -> Self {
        Var(id)
    }

    /// Returns the raw variable ID.
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Positive literal of this variable.
    pub const fn pos(self) -> Lit {
        Lit::new(self, false)
    }

    /// Negative literal of this variable.
    pub const fn neg(self) -> Lit {
        Lit::new(self, true)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<u64> for Var {
    fn from(id: u64) -> Self {
        Var(id)
    }
}

impl From<Var> for u64 {
    fn from(var: Var) -> Self {
        var.0
    }
}

/// A variable reference with a polarity.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Lit {
    // Field order is load-bearing: the derived `Ord` compares `var` first,
    // then `negated` (false < true).
    var: Var,
    negated: bool,
}

impl Lit {
    pub const fn new(var: Var, negated: bool) -> Self {
        Self { var, negated }
    }

    /// Converts a signed literal (positive = unnegated, negative = negated).
    ///
    /// Zero has no sign and is rejected.
    pub fn from_signed(value: i64) -> Result<Self> {
        if value == 0 {
            return Err(ExprError::ZeroLiteral);
        }
        Ok(Self::new(Var(value.unsigned_abs()), value < 0))
    }

    /// Signed representation of this literal.
    ///
    /// Returns `None` for variable `0` and for ids that do not fit into `i64`.
    pub fn to_signed(self) -> Option<i64> {
        let id = i64::try_from(self.var.0).ok().filter(|&id| id != 0)?;
        Some(if self.negated { -id } else { id })
    }

    pub const fn var(self) -> Var {
        self.var
    }

    pub const fn is_negated(self) -> bool {
        self.negated
    }

    pub const fn is_positive(self) -> bool {
        !self.negated
    }

    pub const fn negate(self) -> Self {
        Self::new(self.var, !self.negated)
    }

    /// Byte encoding used for content hashing: the variable id in little-endian
    /// order followed by the polarity byte.
    pub(crate) fn to_bytes(self) -> [u8; 9] {
        let mut bytes = [0u8; 9];
        bytes[..8].copy_from_slice(&self.var.0.to_le_bytes());
        bytes[8] = self.negated as u8;
        bytes
    }
}

impl Not for Lit {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "~{}", self.var)
        } else {
            write!(f, "{}", self.var)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_domain() {
        let min = Lit::from_signed(i64::MIN).unwrap();
        assert_eq!(min.var(), Var::new(1 << 63));
        assert!(min.is_negated());
        assert_eq!(min.to_signed(), None);

        let top = Var::new(u64::MAX).pos();
        assert_eq!(top.to_signed(), None);
        assert!(Var::new(0).pos() < Var::new(0).neg());
        assert_eq!(Var::new(0).neg().to_signed(), None);
    }

    #[test]
    fn test_from_signed() {
        let a = Lit::from_signed(5).unwrap();
        assert_eq!(a.var(), Var::new(5));
        assert!(a.is_positive());

        let b = Lit::from_signed(-5).unwrap();
        assert_eq!(b.var(), Var::new(5));
        assert!(b.is_negated());
        assert_eq!(b, !a);
        assert_eq!(b.to_signed(), Some(-5));
    }

    #[test]
    fn test_zero_literal() {
        assert_eq!(Lit::from_signed(0), Err(ExprError::ZeroLiteral));
    }

    #[test]
    fn test_variable_zero_is_ordinary() {
        let lit = Var::new(0).neg();
        assert_eq!(lit.var().id(), 0);
        assert_ne!(lit, Var::new(0).pos());
        assert_eq!(lit.to_signed(), None);
    }

    #[test]
    fn test_order() {
        let mut lits = vec![
            Var::new(3).neg(),
            Var::new(1).pos(),
            Var::new(3).pos(),
            Var::new(2).neg(),
        ];
        lits.sort();
        assert_eq!(
            lits,
            vec![
                Var::new(1).pos(),
                Var::new(2).neg(),
                Var::new(3).pos(),
                Var::new(3).neg(),
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Var::new(7).pos().to_string(), "x7");
        assert_eq!(Var::new(7).neg().to_string(), "~x7");
    }
}
