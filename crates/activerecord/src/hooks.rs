//! Per-column lifecycle hooks.
//!
//! Every record type carries a [`HookRegistry`] with one map per
//! [`HookAction`]. A column owns at most one hook per action. Hooks run in
//! column declaration order before the action's statement is built.
//!
//! Create, update and delete hooks mutate the record's cells. Read and search
//! hooks contribute a predicate that is ANDed into the query.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use activerecord_core::{Error, Result, TableDefinition, Values};
use activerecord_query::Expr;

/// The record operation a hook is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookAction {
    Create,
    Read,
    Update,
    Delete,
    Search,
}

impl HookAction {
    pub const ALL: [HookAction; 5] = [
        HookAction::Create,
        HookAction::Read,
        HookAction::Update,
        HookAction::Delete,
        HookAction::Search,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            HookAction::Create => "create",
            HookAction::Read => "read",
            HookAction::Update => "update",
            HookAction::Delete => "delete",
            HookAction::Search => "search",
        }
    }

    /// True for actions whose hooks contribute predicates.
    pub const fn is_filter(&self) -> bool {
        matches!(self, HookAction::Read | HookAction::Search)
    }

    const fn slot(self) -> usize {
        match self {
            HookAction::Create => 0,
            HookAction::Read => 1,
            HookAction::Update => 2,
            HookAction::Delete => 3,
            HookAction::Search => 4,
        }
    }
}

impl fmt::Display for HookAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hook that mutates the record's cells.
pub type MutateHook = Arc<dyn Fn(&mut Values) -> Result<()> + Send + Sync>;

/// Hook that contributes an optional predicate.
pub type FilterHook = Arc<dyn Fn() -> Option<Expr> + Send + Sync>;

/// A hook callback.
#[derive(Clone)]
pub enum Hook {
    /// For create, update and delete.
    Mutate(MutateHook),
    /// For read and search.
    Filter(FilterHook),
}

impl Hook {
    pub fn mutate<F>(f: F) -> Self
    where
        F: Fn(&mut Values) -> Result<()> + Send + Sync + 'static,
    {
        Hook::Mutate(Arc::new(f))
    }

    pub fn filter<F>(f: F) -> Self
    where
        F: Fn() -> Option<Expr> + Send + Sync + 'static,
    {
        Hook::Filter(Arc::new(f))
    }

    fn fits(&self, action: HookAction) -> bool {
        match self {
            Hook::Mutate(_) => !action.is_filter(),
            Hook::Filter(_) => action.is_filter(),
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Mutate(_) => f.write_str("Hook::Mutate"),
            Hook::Filter(_) => f.write_str("Hook::Filter"),
        }
    }
}

/// Hooks of one record type, keyed by (action, column).
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    // Keyed by column position so iteration follows declaration order.
    slots: [BTreeMap<usize, (String, Hook)>; 5],
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook` for `column` under `action`.
    ///
    /// Fails with `UnknownColumn`, `DuplicateHook` or `NotCallable`, checked
    /// in that order.
    pub fn register(
        &mut self,
        table: &TableDefinition,
        action: HookAction,
        column: &str,
        hook: Hook,
    ) -> Result<()> {
        let position = table.position(column).ok_or_else(|| Error::UnknownColumn {
            column: column.to_string(),
        })?;
        let slot = &mut self.slots[action.slot()];
        if slot.contains_key(&position) {
            return Err(Error::DuplicateHook {
                action: action.as_str(),
                column: column.to_string(),
            });
        }
        if !hook.fits(action) {
            return Err(Error::NotCallable {
                action: action.as_str(),
                column: column.to_string(),
            });
        }
        tracing::trace!(table = table.name(), column, action = action.as_str(), "Registered hook");
        slot.insert(position, (column.to_string(), hook));
        Ok(())
    }

    /// Run every mutate hook of `action` against `values`.
    pub fn run(&self, action: HookAction, values: &mut Values) -> Result<()> {
        let slot = &self.slots[action.slot()];
        if !slot.is_empty() {
            tracing::debug!(
                table = values.table().name(),
                action = action.as_str(),
                hooks = slot.len(),
                "Running hooks"
            );
        }
        for (_, hook) in slot.values() {
            if let Hook::Mutate(f) = hook {
                f(values)?;
            }
        }
        Ok(())
    }

    /// Predicates contributed by the filter hooks of `action`, with the
    /// owning column.
    pub fn filters(&self, action: HookAction) -> Vec<(String, Expr)> {
        self.slots[action.slot()]
            .values()
            .filter_map(|(column, hook)| match hook {
                Hook::Filter(f) => f().map(|expr| (column.clone(), expr)),
                Hook::Mutate(_) => None,
            })
            .collect()
    }

    pub fn has(&self, action: HookAction, column: &str) -> bool {
        self.slots[action.slot()]
            .values()
            .any(|(name, _)| name == column)
    }

    /// Number of hooks registered for `action`.
    pub fn len(&self, action: HookAction) -> usize {
        self.slots[action.slot()].len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(BTreeMap::is_empty)
    }
}
