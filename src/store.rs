//! The expression store: content-addressed storage of canonical DNF expressions.
//!
//! All operations go through an [`ExpressionStore`]. Every construction path
//! canonicalizes its result and hashes the canonical form; if an expression with
//! that hash is already registered, its identity is returned instead of a new
//! one. Semantically equal DNFs therefore always share one [`ExprId`].
//!
//! Expressions are immutable. Operators never rewrite stored content, they
//! build new content and register it.
//!
//! ```
//! use dnf_rs::store::ExpressionStore;
//! use dnf_rs::reference::ExprId;
//!
//! let store = ExpressionStore::default();
//! let x = store.create_literal_expression(3).unwrap();
//! let not_x = store.create_literal_expression(-3).unwrap();
//!
//! // x AND NOT x is contradictory:
//! assert_eq!(store.and_expressions(x, not_x).unwrap(), ExprId::FALSE);
//!
//! // Same content, same identity:
//! assert_eq!(store.create_literal_expression(3).unwrap(), x);
//! ```
//!
//! # Atomicity
//!
//! The store is `Sync`. Each operation holds one lock for its whole duration,
//! checks every precondition first, and registers its results only after all
//! checks passed. A failed operation leaves the store unchanged.

use std::collections::BTreeSet;
use std::fmt::Debug;

use log::debug;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::canonical::{
    canonicalize_expression, compute_expression_hash, conjunctions_compatible, merge_conjunctions, Conjunction,
    ContentHash,
};
use crate::config::StoreConfig;
use crate::error::{ExprError, Result};
use crate::eval::{self, Assignment, Complexity, SCALE};
use crate::reference::ExprId;
use crate::table::{Expression, Table};
use crate::types::{Lit, Var};

/// Notification about a newly registered expression.
///
/// Not emitted for deduplication hits.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ExpressionCreated {
    pub id: ExprId,
    pub hash: ContentHash,
}

/// Canonical content that passed the size checks but is not registered yet.
struct Prepared {
    conjunctions: Vec<Conjunction>,
    hash: ContentHash,
}

struct State {
    table: Table,
    events: Vec<ExpressionCreated>,
}

impl State {
    fn get(&self, id: ExprId) -> Result<&Expression> {
        self.table.get(id).ok_or(ExprError::ExpressionNotFound(id))
    }

    fn commit(&mut self, prepared: Prepared) -> ExprId {
        let Prepared { conjunctions, hash } = prepared;
        let (id, inserted) = self.table.put(hash, conjunctions);
        if inserted {
            debug!("registered {} with hash {}", id, hash);
            self.events.push(ExpressionCreated { id, hash });
        } else {
            debug!("dedup: hash {:?} is already {}", hash, id);
        }
        id
    }
}

/// Manager of all expressions.
///
/// The store owns the registry of canonical expressions and hands out
/// [`ExprId`] handles. All operations take `&self`, so one store can be shared
/// between threads.
///
/// Every newly registered expression queues an [`ExpressionCreated`] event.
/// The queue is unbounded: callers that create many expressions should take
/// the events regularly with [`drain_events`][Self::drain_events].
pub struct ExpressionStore {
    state: Mutex<State>,
    config: StoreConfig,
}

impl ExpressionStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            state: Mutex::new(State {
                table: Table::new(),
                events: Vec::new(),
            }),
            config,
        }
    }
}

impl Default for ExpressionStore {
    fn default() -> Self {
        ExpressionStore::new(StoreConfig::default())
    }
}

impl Debug for ExpressionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ExpressionStore")
            .field("size", &state.table.len())
            .field("next_id", &state.table.next_id())
            .field("pending_events", &state.events.len())
            .finish()
    }
}

impl ExpressionStore {
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn true_id(&self) -> ExprId {
        ExprId::TRUE
    }

    pub fn false_id(&self) -> ExprId {
        ExprId::FALSE
    }

    pub fn expression_exists(&self, id: ExprId) -> bool {
        self.state.lock().table.contains(id)
    }

    /// Number of stored expressions, TRUE and FALSE included.
    pub fn len(&self) -> usize {
        self.state.lock().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().table.is_empty()
    }

    /// Identity the next genuinely new expression will receive.
    pub fn next_expression_id(&self) -> ExprId {
        self.state.lock().table.next_id()
    }

    /// Snapshot of the stored canonical content of `id`.
    pub fn expression(&self, id: ExprId) -> Result<Expression> {
        self.state.lock().get(id).cloned()
    }

    pub fn content_hash(&self, id: ExprId) -> Result<ContentHash> {
        self.state.lock().get(id).map(|e| e.hash())
    }

    pub fn find_by_hash(&self, hash: &ContentHash) -> Option<ExprId> {
        self.state.lock().table.lookup(hash)
    }

    /// Take all creation notifications queued since the last call, oldest first.
    pub fn drain_events(&self) -> Vec<ExpressionCreated> {
        std::mem::take(&mut self.state.lock().events)
    }

    /// Run `f` on the stored expression `id`.
    pub(crate) fn with_expression<R>(&self, id: ExprId, f: impl FnOnce(&Expression) -> R) -> Result<R> {
        let state = self.state.lock();
        Ok(f(state.get(id)?))
    }

    /// Canonicalize `conjunctions` and check the result against the size caps.
    fn prepare(&self, conjunctions: &[Conjunction]) -> Result<Prepared> {
        let conjunctions = canonicalize_expression(conjunctions);
        if conjunctions.len() > self.config.max_conjunctions {
            return Err(ExprError::TooManyConjunctions {
                size: conjunctions.len(),
                max: self.config.max_conjunctions,
            });
        }
        if let Some(c) = conjunctions.iter().find(|c| c.len() > self.config.max_literals) {
            return Err(ExprError::TooManyLiterals {
                size: c.len(),
                max: self.config.max_literals,
            });
        }
        let hash = compute_expression_hash(&conjunctions);
        Ok(Prepared { conjunctions, hash })
    }

    /// Fail early if a pairwise combination of `a` and `b` cannot fit.
    fn check_product(&self, a: &Expression, b: &Expression) -> Result<usize> {
        let size = a.len().saturating_mul(b.len());
        if size > self.config.max_conjunctions {
            return Err(ExprError::TooManyConjunctions {
                size,
                max: self.config.max_conjunctions,
            });
        }
        Ok(size)
    }
}

// Construction
impl ExpressionStore {
    /// Register the OR of arbitrary `conjunctions`, returning the existing
    /// identity if the canonical form is already known.
    pub fn create_expression(&self, conjunctions: &[Conjunction]) -> Result<ExprId> {
        debug!("create_expression({} conjunctions)", conjunctions.len());
        let prepared = self.prepare(conjunctions)?;
        Ok(self.state.lock().commit(prepared))
    }

    /// Single-literal expression from a signed literal (negative means negated).
    pub fn create_literal_expression(&self, literal: i64) -> Result<ExprId> {
        debug!("create_literal_expression(literal = {})", literal);
        let lit = Lit::from_signed(literal)?;
        self.create_expression(&[vec![lit]])
    }

    /// Single-conjunction expression from signed literals.
    pub fn create_cube(&self, literals: impl IntoIterator<Item = i64>) -> Result<ExprId> {
        let conjunction = literals
            .into_iter()
            .map(Lit::from_signed)
            .collect::<Result<Conjunction>>()?;
        debug!("create_cube(literals = {:?})", conjunction);
        self.create_expression(&[conjunction])
    }
}

// Algebra
impl ExpressionStore {
    fn union(&self, a: ExprId, b: ExprId) -> Result<ExprId> {
        let mut state = self.state.lock();
        let prepared = {
            let (ea, eb) = (state.get(a)?, state.get(b)?);
            let mut conjunctions = Vec::with_capacity(ea.len() + eb.len());
            conjunctions.extend_from_slice(ea.conjunctions());
            conjunctions.extend_from_slice(eb.conjunctions());
            self.prepare(&conjunctions)?
        };
        Ok(state.commit(prepared))
    }

    pub fn or_expressions(&self, a: ExprId, b: ExprId) -> Result<ExprId> {
        debug!("or_expressions(a = {}, b = {})", a, b);
        self.union(a, b)
    }

    /// Union of two parts of a partition, e.g. the halves of [`split_conjunction`][Self::split_conjunction].
    ///
    /// Behaves exactly like [`or_expressions`][Self::or_expressions].
    pub fn merge_expressions(&self, a: ExprId, b: ExprId) -> Result<ExprId> {
        debug!("merge_expressions(a = {}, b = {})", a, b);
        self.union(a, b)
    }

    /// Distributes AND over OR: every pair of conjunctions is concatenated.
    pub fn and_expressions(&self, a: ExprId, b: ExprId) -> Result<ExprId> {
        debug!("and_expressions(a = {}, b = {})", a, b);
        let mut state = self.state.lock();
        let prepared = {
            let (ea, eb) = (state.get(a)?, state.get(b)?);
            let size = self.check_product(ea, eb)?;
            let mut product = Vec::with_capacity(size);
            for x in ea.conjunctions() {
                for y in eb.conjunctions() {
                    let mut c = Vec::with_capacity(x.len() + y.len());
                    c.extend_from_slice(x);
                    c.extend_from_slice(y);
                    product.push(c);
                }
            }
            self.prepare(&product)?
        };
        Ok(state.commit(prepared))
    }

    /// Like [`and_expressions`][Self::and_expressions], but pairs are merged
    /// eagerly and contradictory pairs are dropped before canonicalization.
    pub fn intersect_expressions(&self, a: ExprId, b: ExprId) -> Result<ExprId> {
        debug!("intersect_expressions(a = {}, b = {})", a, b);
        let mut state = self.state.lock();
        let prepared = {
            let (ea, eb) = (state.get(a)?, state.get(b)?);
            let size = self.check_product(ea, eb)?;
            let mut merged = Vec::with_capacity(size);
            for x in ea.conjunctions() {
                for y in eb.conjunctions() {
                    if let Some(c) = merge_conjunctions(x, y) {
                        merged.push(c);
                    }
                }
            }
            debug!("intersect: {} of {} pairs survive", merged.len(), size);
            self.prepare(&merged)?
        };
        Ok(state.commit(prepared))
    }

    /// Whether some pair of conjunctions of `a` and `b` is not contradictory.
    pub fn expressions_have_intersection(&self, a: ExprId, b: ExprId) -> Result<bool> {
        debug!("expressions_have_intersection(a = {}, b = {})", a, b);
        let state = self.state.lock();
        let (ea, eb) = (state.get(a)?, state.get(b)?);
        let res = ea
            .conjunctions()
            .iter()
            .any(|x| eb.conjunctions().iter().any(|y| conjunctions_compatible(x, y)));
        Ok(res)
    }

    /// Returns `(id AND var, id AND NOT var)`.
    pub fn split_expression(&self, id: ExprId, var: Var) -> Result<(ExprId, ExprId)> {
        debug!("split_expression(id = {}, var = {})", id, var);
        let mut state = self.state.lock();
        let (with, without) = {
            let e = state.get(id)?;
            (
                self.prepare(&extend_all(e.conjunctions(), var.pos()))?,
                self.prepare(&extend_all(e.conjunctions(), var.neg()))?,
            )
        };
        Ok((state.commit(with), state.commit(without)))
    }

    /// Returns `(conjunction #index alone, all other conjunctions)`.
    pub fn split_conjunction(&self, id: ExprId, index: usize) -> Result<(ExprId, ExprId)> {
        debug!("split_conjunction(id = {}, index = {})", id, index);
        let mut state = self.state.lock();
        let (single, rest) = {
            let e = state.get(id)?;
            if index >= e.len() {
                return Err(ExprError::ConjunctionIndexOutOfRange { index, len: e.len() });
            }
            let single = vec![e.conjunctions()[index].clone()];
            let rest: Vec<Conjunction> = e
                .conjunctions()
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != index)
                .map(|(_, c)| c.clone())
                .collect();
            (self.prepare(&single)?, self.prepare(&rest)?)
        };
        Ok((state.commit(single), state.commit(rest)))
    }

    /// Inverse of [`split_expression`][Self::split_expression].
    ///
    /// Every conjunction of `with_var` must contain `var`, and every conjunction
    /// of `with_not_var` must contain `NOT var`. A conjunction that appears on
    /// both sides once the literal is removed is rejoined without `var`; any
    /// other conjunction is kept as it is. The result is accepted only if
    /// splitting it on `var` gives back exactly the two inputs.
    ///
    /// The result is always equivalent to `with_var OR with_not_var`. It is the
    /// original expression unless that one held a pair like `c` and `c & var`,
    /// or `c & var` and `c & ~var`, which splitting cannot tell apart from `c`.
    pub fn merge_expressions_on_variable(&self, with_var: ExprId, with_not_var: ExprId, var: Var) -> Result<ExprId> {
        debug!(
            "merge_expressions_on_variable(with_var = {}, with_not_var = {}, var = {})",
            with_var, with_not_var, var
        );
        let mut state = self.state.lock();
        let prepared = {
            let (with, without) = (state.get(with_var)?, state.get(with_not_var)?);
            let pos = strip_literal(with, var.pos())?;
            let neg = strip_literal(without, var.neg())?;
            let merged = self.prepare(&rejoin(with.conjunctions(), &pos, without.conjunctions(), &neg))?;

            let resplit_with = compute_expression_hash(&canonicalize_expression(&extend_all(
                &merged.conjunctions,
                var.pos(),
            )));
            let resplit_without = compute_expression_hash(&canonicalize_expression(&extend_all(
                &merged.conjunctions,
                var.neg(),
            )));
            if resplit_with != with.hash() || resplit_without != without.hash() {
                debug!("merge: {} and {} are not halves of one split", with_var, with_not_var);
                return Err(ExprError::SplitHalvesDiffer);
            }
            merged
        };
        Ok(state.commit(prepared))
    }

    /// Applies settled boolean values: satisfied literals are removed, and
    /// conjunctions with a falsified literal are dropped.
    ///
    /// Every value must be exactly `0` or `SCALE`.
    pub fn simplify_expression(&self, id: ExprId, variable_ids: &[Var], variable_values: &[u128]) -> Result<ExprId> {
        debug!("simplify_expression(id = {}, {} settled)", id, variable_ids.len());
        let settled = settled_booleans(variable_ids, variable_values)?;

        let mut state = self.state.lock();
        let prepared = {
            let e = state.get(id)?;
            let mut conjunctions = Vec::with_capacity(e.len());
            'outer: for c in e.conjunctions() {
                let mut kept = Vec::with_capacity(c.len());
                for &lit in c {
                    match settled.get(&lit.var()) {
                        // Satisfied iff the literal's polarity matches the value.
                        Some(&value) if value == lit.is_positive() => {}
                        Some(_) => continue 'outer,
                        None => kept.push(lit),
                    }
                }
                conjunctions.push(kept);
            }
            self.prepare(&conjunctions)?
        };
        Ok(state.commit(prepared))
    }
}

/// Appends `lit` to every conjunction.
fn extend_all(conjunctions: &[Conjunction], lit: Lit) -> Vec<Conjunction> {
    conjunctions
        .iter()
        .map(|c| {
            let mut c = c.clone();
            c.push(lit);
            c
        })
        .collect()
}

/// Reassembles split halves. `pos` and `neg` are the halves with the split
/// literal removed, index-aligned with `with` and `without`.
fn rejoin(with: &[Conjunction], pos: &[Conjunction], without: &[Conjunction], neg: &[Conjunction]) -> Vec<Conjunction> {
    let pos_set: FxHashSet<&Conjunction> = pos.iter().collect();
    let neg_set: FxHashSet<&Conjunction> = neg.iter().collect();

    let mut result = Vec::with_capacity(with.len() + without.len());
    for (c, stripped) in with.iter().zip(pos) {
        if neg_set.contains(stripped) {
            result.push(stripped.clone());
        } else {
            result.push(c.clone());
        }
    }
    for (c, stripped) in without.iter().zip(neg) {
        // Paired conjunctions were already taken from the positive side.
        if !pos_set.contains(stripped) {
            result.push(c.clone());
        }
    }
    result
}

fn strip_literal(e: &Expression, lit: Lit) -> Result<Vec<Conjunction>> {
    e.conjunctions()
        .iter()
        .map(|c| {
            let pos = c.binary_search(&lit).map_err(|_| ExprError::MissingSplitLiteral {
                expression: e.id(),
                literal: lit,
            })?;
            let mut c = c.clone();
            c.remove(pos);
            Ok(c)
        })
        .collect()
}

fn settled_booleans(variable_ids: &[Var], variable_values: &[u128]) -> Result<FxHashMap<Var, bool>> {
    if variable_ids.len() != variable_values.len() {
        return Err(ExprError::LengthMismatch {
            ids: variable_ids.len(),
            values: variable_values.len(),
        });
    }
    let mut settled = FxHashMap::default();
    for (&var, &value) in variable_ids.iter().zip(variable_values) {
        let b = match value {
            0 => false,
            SCALE => true,
            v if v > SCALE => return Err(ExprError::ValueOutOfRange { var, value }),
            _ => return Err(ExprError::NonBooleanValue { var, value }),
        };
        settled.entry(var).or_insert(b);
    }
    Ok(settled)
}

// Evaluation and queries
impl ExpressionStore {
    pub fn evaluate_with(&self, id: ExprId, assignment: &Assignment) -> Result<u128> {
        debug!("evaluate_with(id = {}, {} values)", id, assignment.len());
        let state = self.state.lock();
        eval::evaluate_expression(state.get(id)?.conjunctions(), assignment, &self.config)
    }

    pub fn evaluate_expression_with_values(
        &self,
        id: ExprId,
        variable_ids: &[Var],
        variable_values: &[u128],
    ) -> Result<u128> {
        let assignment = Assignment::from_parallel(variable_ids, variable_values)?;
        self.evaluate_with(id, &assignment)
    }

    pub fn evaluate_conjunction(
        &self,
        id: ExprId,
        index: usize,
        variable_ids: &[Var],
        variable_values: &[u128],
    ) -> Result<u128> {
        debug!("evaluate_conjunction(id = {}, index = {})", id, index);
        let assignment = Assignment::from_parallel(variable_ids, variable_values)?;
        let state = self.state.lock();
        let e = state.get(id)?;
        let c = e
            .conjunctions()
            .get(index)
            .ok_or(ExprError::ConjunctionIndexOutOfRange { index, len: e.len() })?;
        eval::evaluate_conjunction(c, &assignment, self.config.max_eval_literals)
    }

    /// Distinct variables of the expression, polarity stripped, in ascending order.
    pub fn get_expression_variables(&self, id: ExprId) -> Result<Vec<Var>> {
        self.with_expression(id, |e| {
            let vars: BTreeSet<Var> = e.conjunctions().iter().flatten().map(|lit| lit.var()).collect();
            vars.into_iter().collect()
        })
    }

    pub fn get_expression_complexity(&self, id: ExprId) -> Result<Complexity> {
        let state = self.state.lock();
        eval::expression_complexity_with(state.get(id)?.conjunctions(), &self.config)
    }
}
