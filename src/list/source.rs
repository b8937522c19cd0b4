//! List sources - where a list reads its items from.
//!
//! Mirrors a prop value: a fixed vector, a signal, or a getter that may read
//! any number of signals. Reading a reactive source inside an effect
//! subscribes that effect, so the list re-renders when the source changes.
//!
//! # Example
//!
//! ```ignore
//! use spark_signals::signal;
//! use spark_dom::ListSource;
//!
//! let todos = signal(vec!["write", "test"]);
//! let from_signal: ListSource<&str> = todos.clone().into();
//! let from_vec: ListSource<&str> = vec!["fixed"].into();
//! let filtered = ListSource::getter(move || {
//!     todos.get().into_iter().filter(|t| t.starts_with('w')).collect()
//! });
//! ```

use std::rc::Rc;

use spark_signals::{PropValue, Signal};

/// Items for [`list`](super::list), [`virtual_list`](super::virtual_list)
/// and [`delegated_list`](super::delegated_list).
pub enum ListSource<T> {
    Static(Vec<T>),
    Signal(Signal<Vec<T>>),
    Getter(Rc<dyn Fn() -> Vec<T>>),
}

impl<T: Clone + 'static> ListSource<T> {
    /// Current items. Subscribes the running effect for reactive sources.
    pub fn get(&self) -> Vec<T> {
        match self {
            ListSource::Static(items) => items.clone(),
            ListSource::Signal(s) => s.get(),
            ListSource::Getter(f) => f(),
        }
    }

    pub fn getter(f: impl Fn() -> Vec<T> + 'static) -> Self {
        ListSource::Getter(Rc::new(f))
    }
}

impl<T> ListSource<T> {
    pub fn is_reactive(&self) -> bool {
        !matches!(self, ListSource::Static(_))
    }
}

impl<T: Clone> Clone for ListSource<T> {
    fn clone(&self) -> Self {
        match self {
            ListSource::Static(items) => ListSource::Static(items.clone()),
            ListSource::Signal(s) => ListSource::Signal(s.clone()),
            ListSource::Getter(f) => ListSource::Getter(f.clone()),
        }
    }
}

impl<T> From<Vec<T>> for ListSource<T> {
    fn from(items: Vec<T>) -> Self {
        ListSource::Static(items)
    }
}

impl<T> From<Signal<Vec<T>>> for ListSource<T> {
    fn from(signal: Signal<Vec<T>>) -> Self {
        ListSource::Signal(signal)
    }
}

impl<T: Clone + PartialEq + 'static> From<PropValue<Vec<T>>> for ListSource<T> {
    fn from(prop: PropValue<Vec<T>>) -> Self {
        match prop {
            PropValue::Static(items) => ListSource::Static(items),
            PropValue::Signal(s) => ListSource::Signal(s),
            PropValue::Getter(f) => ListSource::Getter(Rc::from(f)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_signals::{effect, signal};
    use std::cell::Cell;

    #[test]
    fn test_list_source_variants() {
        let items = signal(vec![1, 2]);
        let from_signal: ListSource<i32> = items.clone().into();
        let from_vec: ListSource<i32> = vec![3].into();
        let getter = ListSource::getter(|| vec![4, 5, 6]);

        assert_eq!(from_signal.get(), vec![1, 2]);
        assert_eq!(from_vec.get(), vec![3]);
        assert_eq!(getter.get(), vec![4, 5, 6]);
        assert!(from_signal.is_reactive());
        assert!(!from_vec.is_reactive());
    }

    #[test]
    fn test_prop_value_converts() {
        let items = signal(vec![7]);
        let source: ListSource<i32> = PropValue::Signal(items.clone()).into();
        assert!(source.is_reactive());
        items.set(vec![8, 9]);
        assert_eq!(source.get(), vec![8, 9]);

        let getter: ListSource<i32> = PropValue::getter(|| vec![1]).into();
        assert_eq!(getter.get(), vec![1]);
    }

    #[test]
    fn test_effect_follows_signal_source() {
        let items = signal(vec![1]);
        let source: ListSource<i32> = items.clone().into();
        let seen = Rc::new(Cell::new(0usize));

        let seen_clone = seen.clone();
        let stop = effect(move || seen_clone.set(source.get().len()));
        assert_eq!(seen.get(), 1);

        items.set(vec![1, 2, 3]);
        assert_eq!(seen.get(), 3);

        stop();
        items.set(vec![]);
        assert_eq!(seen.get(), 3, "stopped effect must not run");
    }
}
