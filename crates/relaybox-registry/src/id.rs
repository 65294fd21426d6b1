// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File identifier generation.
//!
//! Identifiers are the last eight digits of the Unix time in milliseconds
//! followed by six characters from `[A-Z0-9]`. Uniqueness is only probable;
//! the store's unique constraint is what enforces it.

use rand::Rng;

const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 6;
const TIME_DIGITS: i64 = 100_000_000;

/// Length of every generated identifier.
pub const FILE_ID_LEN: usize = 8 + SUFFIX_LEN;

/// A source of fresh file identifiers.
pub trait IdSource: Send + Sync + 'static {
    fn next_id(&self) -> String;
}

/// Time-plus-random identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampIds;

impl IdSource for TimestampIds {
    fn next_id(&self) -> String {
        let millis = chrono::Utc::now().timestamp_millis().rem_euclid(TIME_DIGITS);
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect();
        format!("{millis:08}{suffix}")
    }
}

/// Whether `id` has the shape [`TimestampIds`] produces.
pub fn is_well_formed(id: &str) -> bool {
    id.len() == FILE_ID_LEN
        && id.is_ascii()
        && id[..8].bytes().all(|b| b.is_ascii_digit())
        && id[8..]
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn generated_ids_are_well_formed() {
        let ids = TimestampIds;
        for _ in 0..1000 {
            let id = ids.next_id();
            assert!(is_well_formed(&id), "bad id {id}");
        }
    }

    #[test]
    fn ids_do_not_repeat_in_a_burst() {
        let ids = TimestampIds;
        let seen: HashSet<String> = (0..2_000).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 2_000);
    }

    #[test]
    fn generator_is_shareable_across_threads() {
        let ids: Arc<dyn IdSource> = Arc::new(TimestampIds);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..500).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
    }

    #[test]
    fn malformed_ids_are_detected() {
        assert!(!is_well_formed("ZZZZZZZZ"));
        assert!(!is_well_formed("12345678abcdef"));
        assert!(is_well_formed("12345678ABC123"));
        assert!(!is_well_formed("1234567\u{e9}ABCDE"));
    }

    proptest! {
        #[test]
        fn accepts_exactly_the_generated_shape(id in "[0-9]{8}[A-Z0-9]{6}") {
            prop_assert!(is_well_formed(&id));
        }

        #[test]
        fn never_panics_on_arbitrary_input(id in "\\PC{0,20}") {
            let _ = is_well_formed(&id);
        }
    }
}
