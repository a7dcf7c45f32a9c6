use std::fmt::{Display, Formatter};

/// Handle of an expression stored in an [`ExpressionStore`][crate::store::ExpressionStore].
///
/// Identities are assigned once, on first registration of a canonical form,
/// and never reused for different content.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ExprId(u64);

impl ExprId {
    /// The canonical TRUE expression: a single empty conjunction.
    pub const TRUE: ExprId = ExprId(1);
    /// The canonical FALSE expression: no conjunctions at all.
    pub const FALSE: ExprId = ExprId(2);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Return the raw identity.
    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn is_true(self) -> bool {
        self.0 == Self::TRUE.0
    }

    pub const fn is_false(self) -> bool {
        self.0 == Self::FALSE.0
    }

    pub const fn is_constant(self) -> bool {
        self.is_true() || self.is_false()
    }
}

impl Display for ExprId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl From<ExprId> for u64 {
    fn from(id: ExprId) -> Self {
        id.0
    }
}
