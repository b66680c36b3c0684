//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use url::Url;

use slow_roads_launcher::host::{FrameId, HostError, HostSurface, Slot};
use slow_roads_launcher::shell::memory::MemoryCacheStorage;
use slow_roads_launcher::shell::{CacheStore, Fetcher, ShellError, ShellResponse};
use slow_roads_launcher::theme::Theme;

pub const ORIGIN: &str = "https://launcher.test/";

pub fn url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
}

// ============ Page ============

/// Host that records every page mutation in order
#[derive(Default)]
pub struct RecordingHost {
    pub log: Vec<String>,
    pub visible: HashMap<Slot, bool>,
    pub frame: Option<FrameId>,
    pub next_frame: u64,
    pub fullscreen: bool,
    pub popups_blocked: bool,
    pub standalone: bool,
    pub storage: HashMap<String, String>,
    pub storage_broken: bool,
    pub theme: Theme,
}

impl RecordingHost {
    pub fn is_visible(&self, slot: Slot) -> bool {
        self.visible.get(&slot).copied().unwrap_or(false)
    }

    pub fn count(&self, entry: &str) -> usize {
        self.log.iter().filter(|e| e.as_str() == entry).count()
    }
}

impl HostSurface for RecordingHost {
    fn has(&self, _slot: Slot) -> bool {
        true
    }

    fn set_visible(&mut self, slot: Slot, visible: bool) {
        let verb = if visible { "show" } else { "hide" };
        self.log.push(format!("{} {:?}", verb, slot));
        self.visible.insert(slot, visible);
    }

    fn frame(&self) -> Option<FrameId> {
        self.frame
    }

    fn create_frame(&mut self) -> FrameId {
        self.next_frame += 1;
        let frame = FrameId(self.next_frame);
        self.log.push(format!("create {}", frame));
        self.frame = Some(frame);
        frame
    }

    fn navigate_frame(&mut self, frame: FrameId, url: &str) {
        self.log.push(format!("navigate {} {}", frame, url));
    }

    fn remove_frame(&mut self, frame: FrameId) {
        self.log.push(format!("remove {}", frame));
        if self.frame == Some(frame) {
            self.frame = None;
        }
    }

    fn enable_fullscreen_control(&mut self) {
        self.log.push("enable fullscreen".to_string());
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn request_fullscreen(&mut self) -> Result<(), HostError> {
        self.fullscreen = true;
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<(), HostError> {
        self.fullscreen = false;
        Ok(())
    }

    fn open_in_new_tab(&mut self, url: &str) -> bool {
        self.log.push(format!("open {}", url));
        !self.popups_blocked
    }

    fn notify(&mut self, message: &str) {
        self.log.push(format!("notify {}", message));
    }

    fn navigate(&mut self, url: &str) {
        self.log.push(format!("redirect {}", url));
    }

    fn is_standalone(&self) -> bool {
        self.standalone
    }

    fn load_item(&self, key: &str) -> Option<String> {
        self.storage.get(key).cloned()
    }

    fn store_item(&mut self, key: &str, value: &str) -> Result<(), HostError> {
        if self.storage_broken {
            return Err(HostError::StorageUnavailable);
        }
        self.storage.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}

// ============ Shell ============

#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub status: u16,
    pub body: String,
}

impl Page {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }
}

impl ShellResponse for Page {
    fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn status(&self) -> u16 {
        self.status
    }
}

/// Network double: serves registered pages, 404 for the rest, fails when offline
#[derive(Default)]
pub struct FakeNetwork {
    pages: HashMap<Url, Page>,
    pub offline: Cell<bool>,
    pub unreachable: Vec<Url>,
    pub requests: RefCell<Vec<Url>>,
}

impl FakeNetwork {
    pub fn serving(pages: &[(&str, Page)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(path, page)| (url(path), page.clone()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

#[async_trait(?Send)]
impl Fetcher for FakeNetwork {
    type Response = Page;
    type Request = Url;

    async fn fetch(&self, url: &Url) -> Result<Page, ShellError> {
        self.requests.borrow_mut().push(url.clone());
        if self.offline.get() || self.unreachable.contains(url) {
            return Err(ShellError::Fetch {
                url: url.to_string(),
                reason: "network down".into(),
            });
        }
        Ok(self.pages.get(url).cloned().unwrap_or(Page {
            status: 404,
            body: String::new(),
        }))
    }
}

/// Shared in-memory cache storage that counts every access
#[derive(Clone, Default)]
pub struct CountingStore {
    pub inner: Rc<MemoryCacheStorage<Page>>,
    pub reads: Rc<Cell<usize>>,
    pub writes: Rc<Cell<usize>>,
    pub broken_lookups: Rc<Cell<bool>>,
    /// Commit this many entries, then fail the rest (quota exceeded)
    pub quota: Rc<Cell<Option<usize>>>,
}

impl CountingStore {
    pub fn accesses(&self) -> usize {
        self.reads.get() + self.writes.get()
    }
}

#[async_trait(?Send)]
impl CacheStore<Page> for CountingStore {
    async fn put_all(&self, cache: &str, entries: Vec<(Url, Page)>) -> Result<(), ShellError> {
        self.writes.set(self.writes.get() + 1);
        match self.quota.get() {
            Some(limit) if entries.len() > limit => {
                let fits = entries.into_iter().take(limit).collect();
                self.inner.put_all(cache, fits).await?;
                Err(ShellError::Cache("QuotaExceededError".into()))
            }
            _ => self.inner.put_all(cache, entries).await,
        }
    }

    async fn keys(&self) -> Result<Vec<String>, ShellError> {
        self.reads.set(self.reads.get() + 1);
        self.inner.keys().await
    }

    async fn delete(&self, cache: &str) -> Result<bool, ShellError> {
        self.writes.set(self.writes.get() + 1);
        self.inner.delete(cache).await
    }

    async fn lookup(&self, url: &Url) -> Result<Option<Page>, ShellError> {
        self.reads.set(self.reads.get() + 1);
        if self.broken_lookups.get() {
            return Err(ShellError::Cache("lookup failed".into()));
        }
        self.inner.lookup(url).await
    }
}
