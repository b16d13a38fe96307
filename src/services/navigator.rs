//! Ordered cyclic navigation ("next / previous project" links).
//!
//! Items are ranked by `(order, key)`. The successor of the last item is the
//! first one and vice versa. Inactive items never show up as neighbours.
//! Each call is a linear scan over the collection; nothing is indexed.

/// Anything that can sit in a navigable collection.
pub trait Orderable {
    type Key: Ord;

    fn order(&self) -> i32;
    fn key(&self) -> Self::Key;
    fn is_active(&self) -> bool;
}

#[derive(Debug, PartialEq, Eq)]
pub struct Neighbors<'a, T> {
    pub next: Option<&'a T>,
    pub previous: Option<&'a T>,
}

impl<T> Default for Neighbors<'_, T> {
    fn default() -> Self {
        Self {
            next: None,
            previous: None,
        }
    }
}

/// Successor and predecessor of `pivot` within the active part of `items`.
///
/// `items` need not be sorted and may contain the pivot itself. A side that
/// would resolve back to the pivot is `None`.
pub fn neighbors<'a, T: Orderable>(pivot: &T, items: &'a [T]) -> Neighbors<'a, T> {
    let pivot_rank = (pivot.order(), pivot.key());

    let mut next: Option<(&T, (i32, T::Key))> = None;
    let mut previous: Option<(&T, (i32, T::Key))> = None;
    let mut first: Option<(&T, (i32, T::Key))> = None;
    let mut last: Option<(&T, (i32, T::Key))> = None;

    for item in items.iter().filter(|i| i.is_active()) {
        let rank = (item.order(), item.key());

        if rank > pivot_rank && next.as_ref().is_none_or(|(_, r)| rank < *r) {
            next = Some((item, (item.order(), item.key())));
        }
        if rank < pivot_rank && previous.as_ref().is_none_or(|(_, r)| rank > *r) {
            previous = Some((item, (item.order(), item.key())));
        }
        if first.as_ref().is_none_or(|(_, r)| rank < *r) {
            first = Some((item, (item.order(), item.key())));
        }
        if last.as_ref().is_none_or(|(_, r)| rank > *r) {
            last = Some((item, rank));
        }
    }

    let resolve = |hit: Option<(&'a T, (i32, T::Key))>| match hit {
        Some((item, rank)) if rank != pivot_rank => Some(item),
        _ => None,
    };

    Neighbors {
        next: resolve(next.or(first)),
        previous: resolve(previous.or(last)),
    }
}
