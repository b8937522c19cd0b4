//! Property-based invariant tests for the keyed reconciler.
//!
//! Random insert/remove/reorder sequences are applied to a [`KeyedList`] and
//! checked against a naive model that simply re-renders the whole list:
//!
//! 1. DOM order equals the model order after every pass.
//! 2. Surviving keys keep their node.
//! 3. Each removed key's cleanup runs exactly once; live keys never.
//! 4. Insert calls never exceed the number of non-stable items.
//! 5. Reconciling the same items again is free.
//! 6. Dispose cleans up everything exactly once.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use proptest::prelude::*;
use spark_dom::{Dom, Key, KeyedList, ListOptions, MockDom, NodeId, Rendered, reset_pool};

// ── Helpers ─────────────────────────────────────────────────────────────

const UNIVERSE: u32 = 24;

/// One pass worth of unique keys in random order.
fn pass() -> impl Strategy<Value = Vec<u32>> {
    proptest::sample::subsequence((0..UNIVERSE).collect::<Vec<_>>(), 0..=UNIVERSE as usize)
        .prop_shuffle()
}

fn passes() -> impl Strategy<Value = Vec<Vec<u32>>> {
    proptest::collection::vec(pass(), 1..8)
}

type Cleanups = Rc<RefCell<HashMap<u32, usize>>>;

struct Harness {
    dom: Rc<MockDom>,
    container: NodeId,
    list: KeyedList<u32>,
    cleanups: Cleanups,
}

impl Harness {
    fn new(recycle: bool) -> Self {
        reset_pool();
        let dom = Rc::new(MockDom::new());
        let container = dom.create_element("ul");
        dom.append_child(dom.body(), container);
        let list = KeyedList::new(
            dom.clone(),
            &ListOptions {
                recycle,
                ..Default::default()
            },
        );
        dom.append_child(container, list.fragment());
        Self {
            dom,
            container,
            list,
            cleanups: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    fn apply(&mut self, items: &[u32]) {
        let dom = self.dom.clone();
        let cleanups = self.cleanups.clone();
        self.list
            .reconcile(
                items,
                move |item: &u32, _| {
                    let li = dom.create_element("li");
                    dom.set_text_content(li, &item.to_string());
                    let cleanups = cleanups.clone();
                    let item = *item;
                    Rendered::node(li).with_cleanup(move || {
                        *cleanups.borrow_mut().entry(item).or_insert(0) += 1;
                    })
                },
                |item: &u32, _| *item,
            )
            .expect("templates never fail here");
    }

    fn texts(&self) -> Vec<String> {
        self.dom.child_texts(self.container)
    }

    fn node_of(&self, key: u32) -> Option<NodeId> {
        self.list.nodes(&Key::from(key)).map(|nodes| nodes[0])
    }
}

/// Naive model: the whole list, re-rendered.
fn model_texts(items: &[u32]) -> Vec<String> {
    items.iter().map(u32::to_string).collect()
}

fn reference_lis_len(values: &[usize]) -> usize {
    let mut best = vec![1usize; values.len()];
    for i in 0..values.len() {
        for j in 0..i {
            if values[j] < values[i] {
                best[i] = best[i].max(best[j] + 1);
            }
        }
    }
    best.into_iter().max().unwrap_or(0)
}

// ═════════════════════════════════════════════════════════════════════════
// 1-4. Order, identity, cleanup, move bound
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn matches_naive_model(steps in passes(), recycle in any::<bool>()) {
        let mut harness = Harness::new(recycle);
        let mut previous: Vec<u32> = Vec::new();
        let mut expected_cleanups: HashMap<u32, usize> = HashMap::new();

        for items in &steps {
            let before: HashMap<u32, NodeId> = previous
                .iter()
                .filter_map(|&k| harness.node_of(k).map(|n| (k, n)))
                .collect();

            let old_positions: HashMap<u32, usize> =
                previous.iter().enumerate().map(|(i, &k)| (k, i)).collect();
            let reused: Vec<usize> = items.iter().filter_map(|k| old_positions.get(k).copied()).collect();
            let stable = reference_lis_len(&reused);

            harness.dom.reset_stats();
            harness.apply(items);

            prop_assert_eq!(harness.texts(), model_texts(items));

            for key in items {
                if let Some(&node) = before.get(key) {
                    prop_assert_eq!(harness.node_of(*key), Some(node), "key {} lost its node", key);
                }
            }

            for key in &previous {
                if !items.contains(key) {
                    *expected_cleanups.entry(*key).or_insert(0) += 1;
                }
            }
            let cleanups = harness.cleanups.borrow().clone();
            prop_assert_eq!(&cleanups, &expected_cleanups);

            let inserts = harness.dom.stats().inserts;
            prop_assert!(
                inserts <= items.len() - stable,
                "{} inserts for {} items with {} stable", inserts, items.len(), stable
            );

            previous = items.clone();
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn second_identical_pass_is_free(first in pass(), second in pass()) {
        let mut harness = Harness::new(false);
        harness.apply(&first);
        harness.apply(&second);

        harness.dom.reset_stats();
        harness.apply(&second);

        let stats = harness.dom.stats();
        prop_assert_eq!(stats.inserts, 0);
        prop_assert_eq!(stats.removes, 0);
        prop_assert_eq!(stats.created, 0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Dispose
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn dispose_cleans_every_key_once(steps in passes()) {
        let mut harness = Harness::new(false);
        let mut seen: HashMap<u32, usize> = HashMap::new();
        let mut previous: Vec<u32> = Vec::new();
        for items in &steps {
            for key in &previous {
                if !items.contains(key) {
                    *seen.entry(*key).or_insert(0) += 1;
                }
            }
            harness.apply(items);
            previous = items.clone();
        }
        for key in &previous {
            *seen.entry(*key).or_insert(0) += 1;
        }

        harness.list.dispose();

        let cleanups = harness.cleanups.borrow().clone();
        prop_assert_eq!(&cleanups, &seen);
        prop_assert!(harness.dom.children(harness.container).is_empty());
    }
}
