// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Random block keys.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use uuid::Uuid;

/// Keys are drawn from `[0, 2^24)` and printed in base 32 (at most 5 chars).
const KEY_SPACE: u128 = 1 << 24;
const DIGITS: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";

/// How many handed out keys are remembered before the memory starts over.
const MAX_REMEMBERED: usize = 1 << 16;

static SEEN_KEYS: Lazy<Mutex<HashSet<String>>> =
    Lazy::new(|| Mutex::new(HashSet::new()));

/// Generate a short block key that this process has not handed out
/// recently.
pub fn generate_random_key() -> String {
    generate_key_where(|_| true)
}

/// Like [`generate_random_key`], but only returns a key for which
/// `is_free` holds. Callers adding blocks to a map use this to rule out the
/// keys already in it, which the process-wide memory may have forgotten.
pub(crate) fn generate_key_where(is_free: impl Fn(&str) -> bool) -> String {
    let mut seen = SEEN_KEYS.lock().unwrap_or_else(PoisonError::into_inner);
    loop {
        if seen.len() >= MAX_REMEMBERED {
            tracing::debug!(remembered = seen.len(), "forgetting handed out block keys");
            seen.clear();
        }
        let candidate = to_base_32(Uuid::new_v4().as_u128() % KEY_SPACE);
        if is_free(&candidate) && seen.insert(candidate.clone()) {
            return candidate;
        }
    }
}

fn to_base_32(mut value: u128) -> String {
    if value == 0 {
        return "0".to_owned();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 32) as usize]);
        value /= 32;
    }
    digits.iter().rev().map(|d| *d as char).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{
        generate_key_where, generate_random_key, to_base_32, MAX_REMEMBERED,
        SEEN_KEYS,
    };

    #[test]
    fn base_32_encoding() {
        assert_eq!(to_base_32(0), "0");
        assert_eq!(to_base_32(31), "v");
        assert_eq!(to_base_32(32), "10");
        assert_eq!(to_base_32((1 << 24) - 1), "fvvvv");
    }

    #[test]
    fn keys_respect_the_caller_filter() {
        for _ in 0..20 {
            let key = generate_key_where(|key| key.starts_with('a'));
            assert!(key.starts_with('a'));
        }
    }

    #[test]
    fn keys_are_short_unique_and_bounded() {
        let keys: Vec<String> = (0..500).map(|_| generate_random_key()).collect();
        let unique: HashSet<&String> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
        assert!(keys.iter().all(|k| !k.is_empty() && k.len() <= 5));

        for _ in 0..MAX_REMEMBERED {
            generate_random_key();
        }
        assert!(SEEN_KEYS.lock().unwrap().len() <= MAX_REMEMBERED);
    }
}
