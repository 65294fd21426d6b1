// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic identifier source.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use relaybox_registry::IdSource;

/// Yields the given ids in order, then repeats the last one forever.
pub struct SequenceIds {
    queue: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

impl SequenceIds {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue: VecDeque<String> = ids.into_iter().map(Into::into).collect();
        let last = queue.back().cloned().unwrap_or_default();
        Self {
            queue: Mutex::new(queue),
            last: Mutex::new(last),
        }
    }

    /// Always returns `id`.
    pub fn repeating(id: &str) -> Self {
        Self::new([id])
    }
}

impl IdSource for SequenceIds {
    fn next_id(&self) -> String {
        let next = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match next {
            Some(id) => {
                *self.last.lock().unwrap_or_else(PoisonError::into_inner) = id.clone();
                id
            }
            None => self
                .last
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}
