use rustc_hash::FxHashMap;

use crate::canonical::{compute_expression_hash, Conjunction, ContentHash};
use crate::reference::ExprId;

/// A stored expression: canonical DNF content together with its content hash.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Expression {
    id: ExprId,
    conjunctions: Vec<Conjunction>,
    hash: ContentHash,
}

impl Expression {
    pub fn id(&self) -> ExprId {
        self.id
    }

    /// Canonical conjunctions of the expression.
    pub fn conjunctions(&self) -> &[Conjunction] {
        &self.conjunctions
    }

    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    pub fn len(&self) -> usize {
        self.conjunctions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conjunctions.is_empty()
    }
}

/// Append-only registry of expressions, keyed both by identity and by content hash.
///
/// The two maps always agree: every registered hash points to the one identity
/// whose content hashes to it.
pub struct Table {
    /// Expression with identity `i` lives at `data[i - 1]`.
    data: Vec<Expression>,
    index: FxHashMap<ContentHash, ExprId>,
}

impl Table {
    /// Create a table holding only the reserved TRUE and FALSE expressions.
    pub fn new() -> Self {
        let mut table = Self {
            data: Vec::new(),
            index: FxHashMap::default(),
        };

        let one = vec![Vec::new()];
        let (t, _) = table.put(compute_expression_hash(&one), one);
        assert_eq!(t, ExprId::TRUE); // Make sure TRUE is @1.
        let (f, _) = table.put(compute_expression_hash(&[]), Vec::new());
        assert_eq!(f, ExprId::FALSE); // Make sure FALSE is @2.

        table
    }

    /// Number of stored expressions, TRUE and FALSE included.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Identity the next new expression will receive.
    pub fn next_id(&self) -> ExprId {
        ExprId::new(self.data.len() as u64 + 1)
    }

    pub fn get(&self, id: ExprId) -> Option<&Expression> {
        let index = usize::try_from(id.get()).ok()?.checked_sub(1)?;
        self.data.get(index)
    }

    pub fn contains(&self, id: ExprId) -> bool {
        self.get(id).is_some()
    }

    pub fn lookup(&self, hash: &ContentHash) -> Option<ExprId> {
        self.index.get(hash).copied()
    }

    /// Register canonical `conjunctions` under `hash`.
    ///
    /// Returns the identity and whether it was newly allocated.
    pub fn put(&mut self, hash: ContentHash, conjunctions: Vec<Conjunction>) -> (ExprId, bool) {
        if let Some(id) = self.lookup(&hash) {
            debug_assert_eq!(self.data[id.get() as usize - 1].conjunctions, conjunctions);
            return (id, false);
        }

        let id = self.next_id();
        self.data.push(Expression {
            id,
            conjunctions,
            hash,
        });
        self.index.insert(hash, id);
        (id, true)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Expression> {
        self.data.iter()
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::{Lit, Var};

    #[test]
    fn test_reserved() {
        let table = Table::new();
        assert_eq!(table.len(), 2);
        assert_eq!(table.next_id(), ExprId::new(3));
        assert_eq!(table.get(ExprId::TRUE).unwrap().conjunctions(), &[Vec::<Lit>::new()]);
        assert!(table.get(ExprId::FALSE).unwrap().is_empty());
        assert!(table.get(ExprId::new(0)).is_none());
        assert!(table.get(ExprId::new(3)).is_none());
    }

    #[test]
    fn test_put() {
        let mut table = Table::new();
        let content = vec![vec![Var::new(5).pos()]];
        let hash = compute_expression_hash(&content);

        let (id1, new1) = table.put(hash, content.clone());
        assert!(new1);
        assert_eq!(id1, ExprId::new(3));

        let (id2, new2) = table.put(hash, content);
        assert!(!new2);
        assert_eq!(id1, id2);
        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup(&hash), Some(id1));
        assert_eq!(table.get(id1).unwrap().hash(), hash);
    }
}
