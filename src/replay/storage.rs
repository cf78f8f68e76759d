//! Replay persistence over a string key-value store
//!
//! The store itself (LocalStorage in the browser) is an external
//! collaborator: quota errors, serialization failures and missing data all
//! degrade to "no data" / "save skipped" with a logged warning. Nothing in
//! here can crash a session.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::log::ReplayLog;

/// String-keyed persistent store boundary.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    /// Returns false when the write was dropped (quota, unavailable store).
    fn set(&mut self, key: &str, value: &str) -> bool;
    fn remove(&mut self, key: &str);
}

/// In-memory store for native runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: std::collections::HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        self.map.insert(key.to_owned(), value.to_owned());
        true
    }

    fn remove(&mut self, key: &str) {
        self.map.remove(key);
    }
}

/// Browser LocalStorage, origin-scoped. All failures are caught here.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalStore;

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok()).flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl KvStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage().and_then(|s| s.get_item(key).ok()).flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        match Self::storage() {
            Some(s) => match s.set_item(key, value) {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("storage write for {key} skipped: {err:?}");
                    false
                }
            },
            None => {
                log::warn!("LocalStorage unavailable, save skipped");
                false
            }
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(s) = Self::storage() {
            let _ = s.remove_item(key);
        }
    }
}

/// Typed repository for everything the replay feature persists.
#[derive(Debug, Default)]
pub struct ReplayStore<S: KvStore> {
    store: S,
}

impl<S: KvStore> ReplayStore<S> {
    /// Retained history entries, most recent first. The original shipped
    /// with two disagreeing caps (10 and 50); this constant is the single
    /// authoritative one.
    pub const HISTORY_CAP: usize = 50;

    const KEY_LAST: &'static str = "snake_last_replay";
    const KEY_BEST_REPLAY: &'static str = "snake_highscore_replay";
    const KEY_HISTORY: &'static str = "snake_replay_history";
    const KEY_HIGH_SCORE: &'static str = "snake_high_score";

    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = self.store.get(key)?;
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("corrupt data under {key}, treating as empty: {err}");
                None
            }
        }
    }

    fn save_json<T: Serialize>(&mut self, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(json) => self.store.set(key, &json),
            Err(err) => {
                log::warn!("serialize for {key} failed, save skipped: {err}");
                false
            }
        }
    }

    /// Single-slot overwrite of the most recently played session.
    pub fn save_last(&mut self, log: &ReplayLog) {
        self.save_json(Self::KEY_LAST, log);
    }

    pub fn load_last(&self) -> Option<ReplayLog> {
        self.load_json(Self::KEY_LAST)
    }

    /// Stored numeric high score (0 when none).
    pub fn high_score(&self) -> u32 {
        self.load_json(Self::KEY_HIGH_SCORE).unwrap_or(0)
    }

    /// Keep `log` as the high-score replay iff its score strictly beats the
    /// stored one. Returns whether it did.
    pub fn save_high_score(&mut self, log: &ReplayLog) -> bool {
        if log.final_score <= self.high_score() {
            return false;
        }
        self.save_json(Self::KEY_HIGH_SCORE, &log.final_score);
        self.save_json(Self::KEY_BEST_REPLAY, log);
        true
    }

    pub fn load_high_score_replay(&self) -> Option<ReplayLog> {
        self.load_json(Self::KEY_BEST_REPLAY)
    }

    /// Prepend to the history ring, dropping the oldest past the cap.
    pub fn push_history(&mut self, log: &ReplayLog) {
        let mut history = self.history();
        history.insert(0, log.clone());
        history.truncate(Self::HISTORY_CAP);
        self.save_json(Self::KEY_HISTORY, &history);
    }

    /// Most-recent-first history; empty on missing or corrupt data.
    pub fn history(&self) -> Vec<ReplayLog> {
        self.load_json(Self::KEY_HISTORY).unwrap_or_default()
    }

    /// Remove one history entry; out-of-range indices are a no-op.
    pub fn delete_history(&mut self, index: usize) {
        let mut history = self.history();
        if index >= history.len() {
            return;
        }
        history.remove(index);
        self.save_json(Self::KEY_HISTORY, &history);
    }

    pub fn clear_history(&mut self) {
        self.store.remove(Self::KEY_HISTORY);
    }
}
