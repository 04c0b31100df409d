//! Extremum index selection with a lowest-index tie-break.
//!
//! Every "pick the best candidate" decision in the crate (histogram peaks,
//! largest region, nearest contour point) goes through these two functions so
//! that ties always resolve to the first occurrence.

use std::cmp::Ordering;

/// Index of the first maximal element, `None` for an empty slice.
///
/// Incomparable values (NaN) never replace the current best.
pub fn index_of_max<T: PartialOrd>(values: &[T]) -> Option<usize> {
    select_index(values, Ordering::Greater)
}

/// Index of the first minimal element, `None` for an empty slice.
///
/// Incomparable values (NaN) never replace the current best.
pub fn index_of_min<T: PartialOrd>(values: &[T]) -> Option<usize> {
    select_index(values, Ordering::Less)
}

/// Like [`index_of_max`] but over a key derived from each item.
pub fn index_of_max_by_key<T, K, F>(items: &[T], key: F) -> Option<usize>
where
    K: PartialOrd,
    F: FnMut(&T) -> K,
{
    let keys: Vec<K> = items.iter().map(key).collect();
    index_of_max(&keys)
}

/// Like [`index_of_min`] but over a key derived from each item.
pub fn index_of_min_by_key<T, K, F>(items: &[T], key: F) -> Option<usize>
where
    K: PartialOrd,
    F: FnMut(&T) -> K,
{
    let keys: Vec<K> = items.iter().map(key).collect();
    index_of_min(&keys)
}

fn select_index<T: PartialOrd>(values: &[T], wanted: Ordering) -> Option<usize> {
    let mut best: Option<usize> = None;

    for (i, value) in values.iter().enumerate() {
        match best {
            // a value not comparable to itself (NaN) cannot seed the search
            None if value.partial_cmp(value).is_none() => {}
            None => best = Some(i),
            // strict comparison keeps the earliest index on ties
            Some(b) if value.partial_cmp(&values[b]) == Some(wanted) => best = Some(i),
            Some(_) => {}
        }
    }

    best
}
