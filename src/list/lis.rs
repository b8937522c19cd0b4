//! Longest increasing subsequence.
//!
//! Used by the keyed reconciler to find the largest set of surviving items
//! that are already in the right relative order and can stay where they are.
//!
//! Patience sorting with binary search over pile tops, O(n log n). Ties go to
//! the pile found first: an element replaces the leftmost top that is not
//! smaller than it, so among several longest subsequences the one built from
//! the latest candidates at each length wins. For a strictly decreasing input
//! that is the last index.

/// Indices into `sequence` forming one longest strictly increasing
/// subsequence, in ascending order.
///
/// ```ignore
/// use spark_dom::list::compute_lis;
///
/// assert_eq!(compute_lis(&[2, 0, 1, 3]), vec![1, 2, 3]);
/// assert_eq!(compute_lis::<u32>(&[]), Vec::<usize>::new());
/// ```
pub fn compute_lis<T: Ord>(sequence: &[T]) -> Vec<usize> {
    if sequence.is_empty() {
        return Vec::new();
    }

    // tails[k] = index of the smallest tail of any increasing run of length k+1
    let mut tails: Vec<usize> = Vec::with_capacity(sequence.len());
    // predecessors[i] = index before i in the best run ending at i
    let mut predecessors: Vec<Option<usize>> = vec![None; sequence.len()];

    for (i, value) in sequence.iter().enumerate() {
        let pile = tails.partition_point(|&t| sequence[t] < *value);
        if pile > 0 {
            predecessors[i] = Some(tails[pile - 1]);
        }
        if pile == tails.len() {
            tails.push(i);
        } else {
            tails[pile] = i;
        }
    }

    let mut result = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        result.push(i);
        cursor = predecessors[i];
    }
    result.reverse();
    result
}
