//! Property-based invariant tests for the LIS solver.
//!
//! 1. Output indices are ascending and in bounds.
//! 2. Values at those indices are strictly increasing.
//! 3. Length matches an O(n²) dynamic-programming reference.
//! 4. Sorted input keeps every index; reversed input keeps one.
//! 5. Determinism: same input, same output.

use proptest::prelude::*;
use spark_dom::compute_lis;

// ── Helpers ─────────────────────────────────────────────────────────────

fn sequences(max_len: usize) -> impl Strategy<Value = Vec<u32>> {
    proptest::collection::vec(0u32..64, 0..=max_len)
}

fn reference_lis_len(values: &[u32]) -> usize {
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
// 1-2. Valid increasing subsequence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn output_is_increasing_subsequence(values in sequences(200)) {
        let lis = compute_lis(&values);
        for &i in &lis {
            prop_assert!(i < values.len(), "index {} out of bounds", i);
        }
        for pair in lis.windows(2) {
            prop_assert!(pair[0] < pair[1], "indices not ascending: {:?}", lis);
            prop_assert!(
                values[pair[0]] < values[pair[1]],
                "values not strictly increasing at {:?}", pair
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Optimal length
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn length_is_maximal(values in sequences(120)) {
        prop_assert_eq!(
            compute_lis(&values).len(),
            reference_lis_len(&values),
            "suboptimal LIS for {:?}", &values[..values.len().min(20)]
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Sorted and reversed inputs
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn sorted_keeps_all_reversed_keeps_one(n in 1usize..200) {
        let sorted: Vec<usize> = (0..n).collect();
        prop_assert_eq!(compute_lis(&sorted), sorted.clone());

        let reversed: Vec<usize> = (0..n).rev().collect();
        prop_assert_eq!(compute_lis(&reversed).len(), 1);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn deterministic(values in sequences(100)) {
        prop_assert_eq!(compute_lis(&values), compute_lis(&values));
    }
}

#[test]
fn known_cases() {
    assert!(compute_lis::<u32>(&[]).is_empty());
    assert_eq!(compute_lis(&[5, 4, 3, 2, 1]).len(), 1);
    assert_eq!(compute_lis(&[1, 2, 3, 4, 5]), vec![0, 1, 2, 3, 4]);
}
