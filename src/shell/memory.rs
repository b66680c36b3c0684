//! In-memory cache storage.
//!
//! Mirrors the Cache API semantics the worker relies on: named caches in
//! creation order, lookups across every cache (oldest first), whole-cache
//! deletes. Used by the exporter's preflight and by tests.

use async_trait::async_trait;
use std::cell::RefCell;
use url::Url;

use super::{CacheStore, ShellError};

#[derive(Debug)]
pub struct MemoryCacheStorage<R> {
    caches: RefCell<Vec<(String, Vec<(Url, R)>)>>,
}

impl<R> Default for MemoryCacheStorage<R> {
    fn default() -> Self {
        Self {
            caches: RefCell::new(Vec::new()),
        }
    }
}

impl<R: Clone> MemoryCacheStorage<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache names, in creation order
    pub fn names(&self) -> Vec<String> {
        self.caches
            .borrow()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// URLs stored in `cache`, in insertion order
    pub fn urls(&self, cache: &str) -> Vec<Url> {
        self.caches
            .borrow()
            .iter()
            .find(|(name, _)| name == cache)
            .map(|(_, entries)| entries.iter().map(|(url, _)| url.clone()).collect())
            .unwrap_or_default()
    }

    /// Store a single entry (like `cache.put`)
    pub fn insert(&self, cache: &str, url: Url, response: R) {
        let mut caches = self.caches.borrow_mut();
        let entries = match caches.iter().position(|(name, _)| name == cache) {
            Some(i) => &mut caches[i].1,
            None => {
                caches.push((cache.to_string(), Vec::new()));
                let last = caches.len() - 1;
                &mut caches[last].1
            }
        };
        match entries.iter_mut().find(|(existing, _)| *existing == url) {
            Some(entry) => entry.1 = response,
            None => entries.push((url, response)),
        }
    }
}

#[async_trait(?Send)]
impl<R: Clone> CacheStore<R> for MemoryCacheStorage<R> {
    async fn put_all(&self, cache: &str, entries: Vec<(Url, R)>) -> Result<(), ShellError> {
        for (url, response) in entries {
            self.insert(cache, url, response);
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, ShellError> {
        Ok(self.names())
    }

    async fn delete(&self, cache: &str) -> Result<bool, ShellError> {
        let mut caches = self.caches.borrow_mut();
        let before = caches.len();
        caches.retain(|(name, _)| name != cache);
        Ok(caches.len() != before)
    }

    async fn lookup(&self, url: &Url) -> Result<Option<R>, ShellError> {
        Ok(self.caches.borrow().iter().find_map(|(_, entries)| {
            entries
                .iter()
                .find(|(cached, _)| cached == url)
                .map(|(_, response)| response.clone())
        }))
    }
}
