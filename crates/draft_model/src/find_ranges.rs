// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Run-length scanning over a sequence.
//!
//! [`find_ranges`] is the one primitive behind style runs, entity runs,
//! decorator runs and raw style encoding.

/// Scan `haystack` once, coalescing maximal runs of adjacent elements for
/// which `are_equal(previous, next)` holds. For every run whose value passes
/// `filter`, `found(start, end)` is called with the half-open index range.
///
/// Ranges are reported in ascending order and never overlap. An empty
/// haystack reports nothing.
pub fn find_ranges<T, E, F, C>(
    haystack: &[T],
    mut are_equal: E,
    mut filter: F,
    mut found: C,
) where
    E: FnMut(&T, &T) -> bool,
    F: FnMut(&T) -> bool,
    C: FnMut(usize, usize),
{
    let Some(last) = haystack.last() else {
        return;
    };

    let mut cursor = 0;
    for (index, pair) in haystack.windows(2).enumerate() {
        let next_index = index + 1;
        if !are_equal(&pair[0], &pair[1]) {
            if filter(&pair[0]) {
                found(cursor, next_index);
            }
            cursor = next_index;
        }
    }

    if filter(last) {
        found(cursor, haystack.len());
    }
}

/// Collect the ranges reported by [`find_ranges`] into a vector.
pub fn collect_ranges<T, E, F>(
    haystack: &[T],
    are_equal: E,
    filter: F,
) -> Vec<(usize, usize)>
where
    E: FnMut(&T, &T) -> bool,
    F: FnMut(&T) -> bool,
{
    let mut ranges = Vec::new();
    find_ranges(haystack, are_equal, filter, |start, end| {
        ranges.push((start, end))
    });
    ranges
}
