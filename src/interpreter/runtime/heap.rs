use std::fmt;

use crate::{ast::Position, error::RuntimeError, interpreter::value::core::Value};

/// A pointer value: a slot index plus the generation it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index:      usize,
    generation: u32,
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<ptr {}:{}>", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot {
    value:      Option<Value>,
    generation: u32,
}

/// Append-only slot table backing `ptr<<T>>` values.
///
/// Slots are never reused. Freeing empties the slot and bumps its generation,
/// so every handle issued before the free is recognised as stale.
#[derive(Debug, Default)]
pub struct Heap {
    slots: Vec<Slot>,
}

impl Heap {
    /// Creates an empty heap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` in a fresh slot.
    pub fn alloc(&mut self, value: Value) -> Handle {
        self.slots.push(Slot { value:      Some(value),
                               generation: 0, });
        let handle = Handle { index:      self.slots.len() - 1,
                              generation: 0, };
        tracing::trace!(%handle, "heap alloc");
        handle
    }

    /// Reads the value behind `handle`.
    pub fn get(&self, handle: Handle, pos: Position) -> Result<&Value, RuntimeError> {
        self.slots
            .get(handle.index)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.value.as_ref())
            .ok_or(RuntimeError::UseAfterFree { pos })
    }

    /// Mutable access to the value behind `handle`.
    pub fn get_mut(&mut self, handle: Handle, pos: Position) -> Result<&mut Value, RuntimeError> {
        self.slots
            .get_mut(handle.index)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.value.as_mut())
            .ok_or(RuntimeError::UseAfterFree { pos })
    }

    /// Releases the slot behind `handle` and returns its value.
    pub fn free(&mut self, handle: Handle, pos: Position) -> Result<Value, RuntimeError> {
        let slot = self.slots
                       .get_mut(handle.index)
                       .filter(|s| s.generation == handle.generation)
                       .ok_or(RuntimeError::DoubleFree { pos })?;
        let value = slot.value.take().ok_or(RuntimeError::DoubleFree { pos })?;
        slot.generation = slot.generation.wrapping_add(1);
        tracing::trace!(%handle, "heap free");
        Ok(value)
    }

    /// Number of slots that have been allocated and not freed.
    #[must_use]
    pub fn live_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.value.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::new(3, 5)
    }

    #[test]
    fn alloc_then_deref() {
        let mut heap = Heap::new();
        let p = heap.alloc(Value::from(42));
        assert_eq!(heap.get(p, pos()), Ok(&Value::from(42)));
        assert_eq!(heap.live_slots(), 1);
    }

    #[test]
    fn deref_after_free_is_use_after_free() {
        let mut heap = Heap::new();
        let p = heap.alloc(Value::from(1));
        heap.free(p, pos()).unwrap();

        assert_eq!(heap.get(p, pos()), Err(RuntimeError::UseAfterFree { pos: pos() }));
        assert_eq!(heap.live_slots(), 0);
    }

    #[test]
    fn second_free_is_double_free() {
        let mut heap = Heap::new();
        let p = heap.alloc(Value::from(1));
        heap.free(p, pos()).unwrap();

        assert_eq!(heap.free(p, pos()), Err(RuntimeError::DoubleFree { pos: pos() }));
    }

    #[test]
    fn slots_are_not_reused() {
        let mut heap = Heap::new();
        let first = heap.alloc(Value::from(1));
        heap.free(first, pos()).unwrap();
        let second = heap.alloc(Value::from(2));

        assert_ne!(first, second);
        assert!(heap.get(first, pos()).is_err());
        assert_eq!(heap.get(second, pos()), Ok(&Value::from(2)));
    }

    #[test]
    fn handles_display_index_and_generation() {
        let mut heap = Heap::new();
        heap.alloc(Value::Unit);
        let p = heap.alloc(Value::Unit);
        assert_eq!(p.to_string(), "<ptr 1:0>");
    }
}
