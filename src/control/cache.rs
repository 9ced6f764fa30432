//! Memoised fields for symbolic entities.
//!
//! A [`LazyField`] is computed on first access and then trusted until it is explicitly
//! invalidated. Nothing here tracks dependencies: a cached value stays stale after the
//! model changes until the owner is told to recompute.

use std::cell::RefCell;

/// State of a memoised field.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cached<T> {
    #[default]
    Unset,
    Ready(T),
}

impl<T: Clone> Cached<T> {
    /// Returns a copy of the cached value, if any.
    pub fn get(&self) -> Option<T> {
        match self {
            Cached::Ready(value) => Some(value.clone()),
            Cached::Unset => None,
        }
    }
}

/// A single-threaded memo cell holding a [`Cached`] value.
#[derive(Debug, Default)]
pub struct LazyField<T> {
    slot: RefCell<Cached<T>>,
}

impl<T: Clone> LazyField<T> {
    pub fn new() -> Self {
        Self {
            slot: RefCell::new(Cached::Unset),
        }
    }

    /// Returns the cached value without computing it.
    pub fn peek(&self) -> Option<T> {
        self.slot.borrow().get()
    }

    /// Returns the cached value, computing and storing it on first access.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> T {
        if let Some(value) = self.peek() {
            return value;
        }
        let value = init();
        self.set(value.clone());
        value
    }

    /// Fallible variant of [`LazyField::get_or_init`]. Nothing is cached on error.
    pub fn get_or_try_init<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        if let Some(value) = self.peek() {
            return Ok(value);
        }
        let value = init()?;
        self.set(value.clone());
        Ok(value)
    }

    pub fn set(&self, value: T) {
        *self.slot.borrow_mut() = Cached::Ready(value);
    }

    /// Clears the field so the next access recomputes it.
    pub fn invalidate(&self) {
        *self.slot.borrow_mut() = Cached::Unset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_computes_once() {
        let field = LazyField::new();
        let calls = Cell::new(0);

        let first = field.get_or_init(|| {
            calls.set(calls.get() + 1);
            1.5
        });
        let second = field.get_or_init(|| {
            calls.set(calls.get() + 1);
            2.5
        });

        assert_eq!(first, 1.5);
        assert_eq!(second, 1.5);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let field = LazyField::new();
        field.set(1.0);
        field.invalidate();

        assert_eq!(field.peek(), None);
        assert_eq!(field.get_or_init(|| 3.0), 3.0);
    }

    #[test]
    fn test_error_is_not_cached() {
        let field: LazyField<f64> = LazyField::new();
        let result: Result<f64, &str> = field.get_or_try_init(|| Err("boom"));

        assert!(result.is_err());
        assert_eq!(field.peek(), None);
    }
}
