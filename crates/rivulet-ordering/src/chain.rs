//! Multi-key projection chain.
//!
//! Each level holds a key selector, a comparator, a direction flag, and a
//! per-slot buffer of projected keys. Comparing two slots reads the
//! stored keys and falls through to the next level on equality, which is
//! what makes `order_by(...).then_by(...)` compare as one unit.
//!
//! Level *specifications* are collected bottom-up by `then_by` into a
//! plain list; one chain of live levels is instantiated per subscription.

use std::cmp::Ordering;
use std::rc::Rc;

use rivulet_core::Result;

/// Comparison over slot handles with per-slot key storage.
///
/// `keys[slot]` is valid only between `evaluate(value, slot)` and the
/// next `remove(slot)` / `move_slot(.., slot)`; `compare` must only be
/// called for evaluated slots.
pub trait SlotComparer<T> {
    /// Project `value` at every level and store the keys under `slot`.
    /// A selector failure leaves the engine no choice but to abort, so
    /// partially stored keys are not rolled back.
    fn evaluate(&mut self, value: &T, slot: usize) -> Result<()>;

    /// Copy all levels' keys from `from` to `to` and clear `from`.
    fn move_slot(&mut self, from: usize, to: usize);

    /// Clear the stored keys at every level.
    fn remove(&mut self, slot: usize);

    fn compare(&self, a: usize, b: usize) -> Ordering;
}

/// One `(selector, comparer, descending)` refinement step. Mints a live
/// chain level per subscription.
pub trait LevelSpec<T> {
    fn instantiate(
        &self,
        capacity: usize,
        next: Option<Box<dyn SlotComparer<T>>>,
    ) -> Box<dyn SlotComparer<T>>;
}

pub type Selector<T, K> = Rc<dyn Fn(&T) -> Result<K>>;
pub type KeyComparer<K> = Rc<dyn Fn(&K, &K) -> Ordering>;

/// Reusable level specification.
pub struct KeyLevel<T, K> {
    selector: Selector<T, K>,
    comparer: KeyComparer<K>,
    descending: bool,
}

impl<T: 'static, K: 'static> KeyLevel<T, K> {
    pub fn new(
        selector: Selector<T, K>,
        comparer: KeyComparer<K>,
        descending: bool,
    ) -> Rc<dyn LevelSpec<T>> {
        Rc::new(Self {
            selector,
            comparer,
            descending,
        })
    }

    /// Level over an infallible selector and the key type's natural order.
    pub fn natural(
        selector: impl Fn(&T) -> K + 'static,
        descending: bool,
    ) -> Rc<dyn LevelSpec<T>>
    where
        K: Ord,
    {
        Self::new(
            Rc::new(move |value: &T| Ok(selector(value))),
            Rc::new(|a: &K, b: &K| a.cmp(b)),
            descending,
        )
    }

    /// Level over an infallible selector and an explicit comparator.
    pub fn with_comparer(
        selector: impl Fn(&T) -> K + 'static,
        comparer: impl Fn(&K, &K) -> Ordering + 'static,
        descending: bool,
    ) -> Rc<dyn LevelSpec<T>> {
        Self::new(
            Rc::new(move |value: &T| Ok(selector(value))),
            Rc::new(comparer),
            descending,
        )
    }

    /// Level over a fallible selector; a `StreamError` aborts the engine
    /// like a source error.
    pub fn fallible(
        selector: impl Fn(&T) -> Result<K> + 'static,
        descending: bool,
    ) -> Rc<dyn LevelSpec<T>>
    where
        K: Ord,
    {
        Self::new(
            Rc::new(selector),
            Rc::new(|a: &K, b: &K| a.cmp(b)),
            descending,
        )
    }
}

impl<T: 'static, K: 'static> LevelSpec<T> for KeyLevel<T, K> {
    fn instantiate(
        &self,
        capacity: usize,
        next: Option<Box<dyn SlotComparer<T>>>,
    ) -> Box<dyn SlotComparer<T>> {
        let mut keys = Vec::new();
        keys.resize_with(capacity, || None);
        Box::new(ChainLevel {
            selector: self.selector.clone(),
            comparer: self.comparer.clone(),
            descending: self.descending,
            keys,
            next,
        })
    }
}

struct ChainLevel<T, K> {
    selector: Selector<T, K>,
    comparer: KeyComparer<K>,
    descending: bool,
    keys: Vec<Option<K>>,
    next: Option<Box<dyn SlotComparer<T>>>,
}

impl<T, K> ChainLevel<T, K> {
    fn ensure_slot(&mut self, slot: usize) {
        if slot >= self.keys.len() {
            self.keys.resize_with(slot + 1, || None);
        }
    }
}

impl<T, K> SlotComparer<T> for ChainLevel<T, K> {
    fn evaluate(&mut self, value: &T, slot: usize) -> Result<()> {
        let key = (self.selector)(value)?;
        self.ensure_slot(slot);
        self.keys[slot] = Some(key);
        if let Some(next) = self.next.as_mut() {
            next.evaluate(value, slot)?;
        }
        Ok(())
    }

    fn move_slot(&mut self, from: usize, to: usize) {
        self.ensure_slot(from.max(to));
        self.keys[to] = self.keys[from].take();
        if let Some(next) = self.next.as_mut() {
            next.move_slot(from, to);
        }
    }

    fn remove(&mut self, slot: usize) {
        if let Some(entry) = self.keys.get_mut(slot) {
            *entry = None;
        }
        if let Some(next) = self.next.as_mut() {
            next.remove(slot);
        }
    }

    fn compare(&self, a: usize, b: usize) -> Ordering {
        // Unevaluated slots never reach compare; treating them as equal
        // keeps the ordering total regardless.
        let ordering = match (
            self.keys.get(a).and_then(Option::as_ref),
            self.keys.get(b).and_then(Option::as_ref),
        ) {
            (Some(ka), Some(kb)) => (self.comparer)(ka, kb),
            _ => Ordering::Equal,
        };
        let ordering = if self.descending {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering == Ordering::Equal {
            if let Some(next) = self.next.as_ref() {
                return next.compare(a, b);
            }
        }
        ordering
    }
}

/// Instantiate one chain from bottom-up collected level specs. The last
/// refinement nests deepest; `None` only for an empty spec list, which
/// the public API never produces.
pub fn instantiate_chain<T>(
    levels: &[Rc<dyn LevelSpec<T>>],
    capacity: usize,
) -> Option<Box<dyn SlotComparer<T>>> {
    let mut chain = None;
    for level in levels.iter().rev() {
        chain = Some(level.instantiate(capacity, chain));
    }
    chain
}

/// Compare through an optional chain; absent chains compare all slots
/// equal (arrival order wins).
pub fn compare_slots<T>(chain: &Option<Box<dyn SlotComparer<T>>>, a: usize, b: usize) -> Ordering {
    match chain {
        Some(chain) => chain.compare(a, b),
        None => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivulet_core::StreamError;

    fn two_level_chain() -> Box<dyn SlotComparer<(i32, i32)>> {
        let levels: Vec<Rc<dyn LevelSpec<(i32, i32)>>> = vec![
            KeyLevel::natural(|pair: &(i32, i32)| pair.0, false),
            KeyLevel::natural(|pair: &(i32, i32)| pair.1, true),
        ];
        match instantiate_chain(&levels, 4) {
            Some(chain) => chain,
            None => unreachable!("two levels were supplied"),
        }
    }

    #[test]
    fn falls_through_to_next_level_on_equality() {
        let mut chain = two_level_chain();
        chain.evaluate(&(1, 10), 0).expect("evaluate");
        chain.evaluate(&(1, 20), 1).expect("evaluate");
        chain.evaluate(&(2, 0), 2).expect("evaluate");

        // Same primary key: the descending second level decides.
        assert_eq!(chain.compare(0, 1), Ordering::Greater);
        // Different primary key: second level never consulted.
        assert_eq!(chain.compare(0, 2), Ordering::Less);
        assert_eq!(chain.compare(0, 0), Ordering::Equal);
    }

    #[test]
    fn move_slot_carries_all_levels() {
        let mut chain = two_level_chain();
        chain.evaluate(&(5, 50), 3).expect("evaluate");
        chain.evaluate(&(5, 60), 0).expect("evaluate");

        chain.move_slot(3, 1);
        // Slot 1 now holds (5, 50): equal primary, descending secondary.
        assert_eq!(chain.compare(1, 0), Ordering::Greater);
    }

    #[test]
    fn selector_failure_propagates() {
        let levels: Vec<Rc<dyn LevelSpec<i32>>> = vec![KeyLevel::fallible(
            |v: &i32| {
                if *v < 0 {
                    Err(StreamError::selector("negative input"))
                } else {
                    Ok(*v)
                }
            },
            false,
        )];
        let mut chain = match instantiate_chain(&levels, 2) {
            Some(chain) => chain,
            None => unreachable!("one level was supplied"),
        };

        assert!(chain.evaluate(&3, 0).is_ok());
        assert!(chain.evaluate(&-1, 1).is_err());
    }
}
