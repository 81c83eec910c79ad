use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Default)]
struct Sequence<K> {
    current: usize,
    seen: HashMap<K, usize>,
}

impl<K: Eq + Hash> Sequence<K> {
    fn next(&mut self, key: K) -> usize {
        if let Some(id) = self.seen.get(&key) {
            return *id;
        }
        self.current += 1;
        self.seen.insert(key, self.current);
        self.current
    }
}

#[derive(Default)]
struct Counts {
    ids: Sequence<String>,
    guids: Sequence<Uuid>,
    times: Sequence<DateTime<Utc>>,
}

/// Hands out stable small numbers for volatile values within one verification.
///
/// The same input always maps to the same number; each kind counts from 1 on its own.
#[derive(Default)]
pub struct CountHolder {
    counts: Mutex<Counts>,
}

impl CountHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self, key: &str) -> usize {
        self.lock().ids.next(key.to_string())
    }

    pub fn next_guid(&self, guid: Uuid) -> usize {
        self.lock().guids.next(guid)
    }

    pub fn next_time(&self, time: DateTime<Utc>) -> usize {
        self.lock().times.next(time)
    }

    fn lock(&self) -> MutexGuard<'_, Counts> {
        self.counts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
