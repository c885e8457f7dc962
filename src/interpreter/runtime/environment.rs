use crate::{ast::Position, error::NameError, interpreter::value::core::Value};

/// Identifies a scope in the arena.
///
/// The generation changes every time the slot is released, so an id kept by a
/// closure stops resolving once its scope has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId {
    index:      usize,
    generation: u32,
}

/// Identifies a binding cell.
///
/// `@` parameters and references share cells, so several entries may name
/// the same cell while only the declaring entry owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId {
    index:      usize,
    generation: u32,
}

#[derive(Debug)]
struct Cell {
    value:      Option<Value>,
    mutable:    bool,
    generation: u32,
}

#[derive(Debug)]
struct Entry {
    name:    String,
    cell:    CellId,
    owned:   bool,
    deleted: bool,
}

#[derive(Debug)]
struct Scope {
    parent:     Option<ScopeId>,
    entries:    Vec<Entry>,
    generation: u32,
    live:       bool,
}

/// All scopes and binding cells of a running program.
#[derive(Debug)]
pub struct Environment {
    scopes:      Vec<Scope>,
    free_scopes: Vec<usize>,
    cells:       Vec<Cell>,
    free_cells:  Vec<usize>,
    global:      ScopeId,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Creates an environment holding only the empty global scope.
    #[must_use]
    pub fn new() -> Self {
        let global = Scope { parent:     None,
                             entries:    Vec::new(),
                             generation: 0,
                             live:       true, };
        Self { scopes:      vec![global],
               free_scopes: Vec::new(),
               cells:       Vec::new(),
               free_cells:  Vec::new(),
               global:      ScopeId { index:      0,
                                      generation: 0, }, }
    }

    /// The outermost scope, where named functions and top-level bindings live.
    #[must_use]
    pub const fn global(&self) -> ScopeId {
        self.global
    }

    /// Opens a new scope under `parent`.
    pub fn push_scope(&mut self, parent: ScopeId) -> ScopeId {
        if let Some(index) = self.free_scopes.pop() {
            let scope = &mut self.scopes[index];
            scope.parent = Some(parent);
            scope.live = true;
            return ScopeId { index,
                             generation: scope.generation };
        }
        self.scopes.push(Scope { parent:     Some(parent),
                                 entries:    Vec::new(),
                                 generation: 0,
                                 live:       true, });
        ScopeId { index:      self.scopes.len() - 1,
                  generation: 0, }
    }

    /// Reports whether `scope` still refers to an open scope.
    #[must_use]
    pub fn is_live(&self, scope: ScopeId) -> bool {
        self.scope(scope).is_some()
    }

    /// Closes `scope` and drops every binding it owns.
    ///
    /// Returns the dropped bindings in drop order, which is the reverse of
    /// declaration order. Deleted bindings were already dropped and are
    /// skipped.
    pub fn pop_scope(&mut self, scope: ScopeId) -> Vec<(String, Value)> {
        let Some(slot) = self.scopes.get_mut(scope.index)
        else {
            return Vec::new();
        };
        if !slot.live || slot.generation != scope.generation {
            return Vec::new();
        }
        let entries = std::mem::take(&mut slot.entries);
        slot.live = false;
        slot.parent = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_scopes.push(scope.index);

        let mut dropped = Vec::new();
        for entry in entries.into_iter().rev() {
            if entry.owned
               && !entry.deleted
               && let Some(value) = self.release_cell(entry.cell)
            {
                tracing::trace!(name = %entry.name, "binding dropped");
                dropped.push((entry.name, value));
            }
        }
        dropped
    }

    /// Declares a new binding in `scope` and returns its cell.
    ///
    /// A later declaration of the same name shadows the earlier one; the
    /// checker rejects this within a scope unless the earlier binding was
    /// deleted.
    pub fn declare(&mut self, scope: ScopeId, name: &str, value: Value, mutable: bool) -> CellId {
        let cell = self.alloc_cell(value, mutable);
        if let Some(slot) = self.scope_mut(scope) {
            slot.entries.push(Entry { name: name.to_string(),
                                      cell,
                                      owned: true,
                                      deleted: false });
        }
        cell
    }

    /// Binds `name` in `scope` to an existing cell without taking ownership.
    ///
    /// Used for `@` parameters: writes go to the caller's binding, and closing
    /// the callee's scope leaves that binding alone.
    pub fn alias(&mut self, scope: ScopeId, name: &str, cell: CellId) {
        if let Some(slot) = self.scope_mut(scope) {
            slot.entries.push(Entry { name: name.to_string(),
                                      cell,
                                      owned: false,
                                      deleted: false });
        }
    }

    /// Finds the cell `name` refers to from `scope`.
    ///
    /// The search walks outwards through parent scopes. The nearest entry
    /// decides: if it was deleted the name is an error even when an outer
    /// scope has a binding of the same name.
    pub fn lookup(&self, scope: ScopeId, name: &str, pos: Position) -> Result<CellId, NameError> {
        let entry = self.find_entry(scope, name)
                        .ok_or_else(|| NameError::Undefined { name: name.to_string(),
                                                              pos })?;
        if entry.deleted {
            return Err(NameError::Deleted { name: name.to_string(),
                                            pos });
        }
        Ok(entry.cell)
    }

    /// Marks the nearest binding of `name` as deleted.
    ///
    /// Returns the dropped value when the entry owned its cell, or `None` for
    /// aliases.
    pub fn delete(&mut self, scope: ScopeId, name: &str, pos: Position) -> Result<Option<Value>, NameError> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let Some(slot) = self.scope_mut(id) else {
                break;
            };
            if let Some(entry) = slot.entries.iter_mut().rev().find(|e| e.name == name) {
                if entry.deleted {
                    return Err(NameError::Deleted { name: name.to_string(),
                                                    pos });
                }
                entry.deleted = true;
                let (owned, cell) = (entry.owned, entry.cell);
                if !owned {
                    return Ok(None);
                }
                tracing::trace!(name, "binding deleted");
                return Ok(self.release_cell(cell));
            }
            current = slot.parent;
        }
        Err(NameError::Undefined { name: name.to_string(),
                                   pos })
    }

    /// Reads a cell. `None` means the binding has been dropped.
    #[must_use]
    pub fn get(&self, cell: CellId) -> Option<&Value> {
        self.cell(cell).and_then(|c| c.value.as_ref())
    }

    /// Mutable access to a cell's value.
    pub fn get_mut(&mut self, cell: CellId) -> Option<&mut Value> {
        self.cells
            .get_mut(cell.index)
            .filter(|c| c.generation == cell.generation)
            .and_then(|c| c.value.as_mut())
    }

    /// Reports whether the binding behind `cell` was declared with `#@` or
    /// `@`.
    #[must_use]
    pub fn is_mutable(&self, cell: CellId) -> bool {
        self.cell(cell).is_some_and(|c| c.mutable)
    }

    /// Overwrites a cell. Returns `false` when the cell is gone.
    pub fn set(&mut self, cell: CellId, value: Value) -> bool {
        match self.get_mut(cell) {
            Some(slot) => {
                *slot = value;
                true
            },
            None => false,
        }
    }

    /// Number of open scopes, the global scope included.
    #[must_use]
    pub fn live_scopes(&self) -> usize {
        self.scopes.iter().filter(|s| s.live).count()
    }

    fn find_entry(&self, scope: ScopeId, name: &str) -> Option<&Entry> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let slot = self.scope(id)?;
            if let Some(entry) = slot.entries.iter().rev().find(|e| e.name == name) {
                return Some(entry);
            }
            current = slot.parent;
        }
        None
    }

    fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes
            .get(id.index)
            .filter(|s| s.live && s.generation == id.generation)
    }

    fn scope_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        self.scopes
            .get_mut(id.index)
            .filter(|s| s.live && s.generation == id.generation)
    }

    fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.index).filter(|c| c.generation == id.generation)
    }

    fn alloc_cell(&mut self, value: Value, mutable: bool) -> CellId {
        if let Some(index) = self.free_cells.pop() {
            let cell = &mut self.cells[index];
            cell.value = Some(value);
            cell.mutable = mutable;
            return CellId { index,
                            generation: cell.generation };
        }
        self.cells.push(Cell { value: Some(value),
                               mutable,
                               generation: 0 });
        CellId { index:      self.cells.len() - 1,
                 generation: 0, }
    }

    fn release_cell(&mut self, id: CellId) -> Option<Value> {
        let cell = self.cells.get_mut(id.index).filter(|c| c.generation == id.generation)?;
        let value = cell.value.take();
        cell.generation = cell.generation.wrapping_add(1);
        self.free_cells.push(id.index);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::new(1, 1)
    }

    #[test]
    fn scopes_drop_in_reverse_declaration_order() {
        let mut env = Environment::new();
        let scope = env.push_scope(env.global());
        env.declare(scope, "a", Value::from(1), false);
        env.declare(scope, "b", Value::from(2), false);
        env.declare(scope, "c", Value::from(3), false);

        let names: Vec<_> = env.pop_scope(scope).into_iter().map(|(n, _)| n).collect();

        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn lookup_walks_outwards_and_respects_shadowing() {
        let mut env = Environment::new();
        let outer = env.push_scope(env.global());
        env.declare(outer, "x", Value::from(1), false);
        let inner = env.push_scope(outer);
        env.declare(inner, "x", Value::from(2), false);

        let cell = env.lookup(inner, "x", pos()).unwrap();
        assert_eq!(env.get(cell), Some(&Value::from(2)));

        env.pop_scope(inner);
        let cell = env.lookup(outer, "x", pos()).unwrap();
        assert_eq!(env.get(cell), Some(&Value::from(1)));
    }

    #[test]
    fn deleted_names_are_errors_and_skip_the_final_drop() {
        let mut env = Environment::new();
        let scope = env.push_scope(env.global());
        env.declare(scope, "a", Value::from(1), false);
        env.declare(scope, "b", Value::from(2), false);

        assert_eq!(env.delete(scope, "a", pos()).unwrap(), Some(Value::from(1)));
        assert!(matches!(env.lookup(scope, "a", pos()), Err(NameError::Deleted { .. })));
        assert!(matches!(env.delete(scope, "a", pos()), Err(NameError::Deleted { .. })));

        let dropped = env.pop_scope(scope);
        assert_eq!(dropped, vec![("b".to_string(), Value::from(2))]);
    }

    #[test]
    fn redeclaring_after_delete_is_visible() {
        let mut env = Environment::new();
        let scope = env.push_scope(env.global());
        env.declare(scope, "a", Value::from(1), false);
        env.delete(scope, "a", pos()).unwrap();
        env.declare(scope, "a", Value::from(5), false);

        let cell = env.lookup(scope, "a", pos()).unwrap();
        assert_eq!(env.get(cell), Some(&Value::from(5)));
    }

    #[test]
    fn aliases_share_the_cell_but_do_not_own_it() {
        let mut env = Environment::new();
        let caller = env.push_scope(env.global());
        let cell = env.declare(caller, "v", Value::from(1), true);

        let callee = env.push_scope(env.global());
        env.alias(callee, "p", cell);
        let aliased = env.lookup(callee, "p", pos()).unwrap();
        assert!(env.set(aliased, Value::from(9)));

        assert!(env.pop_scope(callee).is_empty());
        assert_eq!(env.get(cell), Some(&Value::from(9)));
    }

    #[test]
    fn ended_scopes_are_detected_after_reuse() {
        let mut env = Environment::new();
        let first = env.push_scope(env.global());
        env.pop_scope(first);
        let second = env.push_scope(env.global());

        assert!(!env.is_live(first));
        assert!(env.is_live(second));
        assert_ne!(first, second);
    }

    #[test]
    fn dropped_cells_stop_resolving() {
        let mut env = Environment::new();
        let scope = env.push_scope(env.global());
        let cell = env.declare(scope, "a", Value::from(1), false);
        env.pop_scope(scope);

        let other = env.push_scope(env.global());
        env.declare(other, "b", Value::from(2), false);

        assert_eq!(env.get(cell), None);
    }
}
