//! Offline shell cache - the service worker's logic.
//!
//! - install: fetch every manifest asset, commit all of them or none
//! - activate: delete every cache except the current version
//! - fetch: same-origin only; cache first, then network, then the offline page
//!
//! Cache storage and network access are traits so the same worker runs over
//! the browser Cache API (`web`), in memory (`memory`), or against an
//! exported directory (`dir`).

#[cfg(feature = "export")]
pub mod dir;
pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod web;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// Default cache version
pub const DEFAULT_CACHE_NAME: &str = "sr-shell-v1";

/// Offline fallback document
pub const OFFLINE_PAGE: &str = "/offline.html";

/// Default shell assets, in install order
pub const SHELL_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/assets/styles.css",
    "/assets/app.js",
    "/manifest.webmanifest",
    OFFLINE_PAGE,
];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShellError {
    #[error("invalid shell URL {path}: {reason}")]
    InvalidUrl { path: String, reason: String },

    #[error("fetch {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("fetch {url} returned status {status}")]
    BadStatus { url: String, status: u16 },

    #[error("cache storage: {0}")]
    Cache(String),
}

/// Versioned list of shell assets
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheManifest {
    pub cache_name: String,
    pub assets: Vec<String>,
    pub offline_page: String,
}

impl Default for CacheManifest {
    fn default() -> Self {
        Self {
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            assets: SHELL_ASSETS.iter().map(|s| s.to_string()).collect(),
            offline_page: OFFLINE_PAGE.to_string(),
        }
    }
}

impl CacheManifest {
    pub fn new(cache_name: impl Into<String>, assets: &[&str]) -> Self {
        Self {
            cache_name: cache_name.into(),
            assets: assets.iter().map(|s| s.to_string()).collect(),
            offline_page: OFFLINE_PAGE.to_string(),
        }
    }

    /// Replace the version suffix with a hash of the shell contents, so any
    /// content change produces a new cache name.
    ///
    /// `prefix` is the name without a version (e.g. `sr-shell`). The hash is
    /// the first 8 hex chars of SHA-256 over each asset path and its bytes.
    pub fn with_content_version<'a>(
        mut self,
        prefix: &str,
        contents: impl IntoIterator<Item = (&'a str, &'a [u8])>,
    ) -> Self {
        let mut hasher = Sha256::new();
        for (path, bytes) in contents {
            hasher.update(path.as_bytes());
            hasher.update([0u8]);
            hasher.update(bytes);
        }
        let digest = hasher.finalize();
        self.cache_name = format!("{}-{}", prefix, hex::encode(&digest[..4]));
        self
    }
}

/// Minimal view of a response the worker needs
pub trait ShellResponse: Clone {
    /// 2xx status (the Cache API refuses to add anything else)
    fn is_ok(&self) -> bool;

    fn status(&self) -> u16;
}

/// A request intercepted by the worker
pub trait ShellRequest {
    fn url(&self) -> Result<Url, ShellError>;
}

impl ShellRequest for Url {
    fn url(&self) -> Result<Url, ShellError> {
        Ok(self.clone())
    }
}

/// Network access from the worker
#[async_trait(?Send)]
pub trait Fetcher {
    type Response: ShellResponse;

    /// What the worker intercepts. Browser requests carry mode, headers,
    /// credentials and redirect mode that a bare URL would lose.
    type Request: ShellRequest;

    /// Plain GET, used for install
    async fn fetch(&self, url: &Url) -> Result<Self::Response, ShellError>;

    /// Send an intercepted request on unchanged
    async fn forward(&self, request: &Self::Request) -> Result<Self::Response, ShellError> {
        self.fetch(&request.url()?).await
    }
}

/// Versioned cache storage (the Cache API's `caches` object)
#[async_trait(?Send)]
pub trait CacheStore<R, Q: ShellRequest = Url> {
    /// Write all entries into `cache`, creating it if needed
    async fn put_all(&self, cache: &str, entries: Vec<(Url, R)>) -> Result<(), ShellError>;

    /// Names of every cache, in creation order
    async fn keys(&self) -> Result<Vec<String>, ShellError>;

    async fn delete(&self, cache: &str) -> Result<bool, ShellError>;

    /// Look `url` up across every cache
    async fn lookup(&self, url: &Url) -> Result<Option<R>, ShellError>;

    /// Look an intercepted request up across every cache
    async fn lookup_request(&self, request: &Q) -> Result<Option<R>, ShellError> {
        self.lookup(&request.url()?).await
    }
}

/// How a fetch was answered
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome<R> {
    /// Cross-origin: left to the platform, cache untouched
    Passthrough,
    Cache(R),
    Network(R),
    /// Network failed; offline page served instead
    Offline(R),
    /// Network failed and no offline page is cached
    Unavailable,
}

impl<R> FetchOutcome<R> {
    pub fn into_response(self) -> Option<R> {
        match self {
            FetchOutcome::Cache(r) | FetchOutcome::Network(r) | FetchOutcome::Offline(r) => Some(r),
            FetchOutcome::Passthrough | FetchOutcome::Unavailable => None,
        }
    }
}

pub struct ShellCacheWorker<S, F> {
    manifest: CacheManifest,
    origin: Url,
    caches: S,
    network: F,
}

impl<S, F> ShellCacheWorker<S, F>
where
    F: Fetcher,
    S: CacheStore<F::Response, F::Request>,
{
    /// `origin` is the worker's own location; manifest paths resolve against it.
    pub fn new(manifest: CacheManifest, origin: Url, caches: S, network: F) -> Self {
        Self {
            manifest,
            origin,
            caches,
            network,
        }
    }

    pub fn manifest(&self) -> &CacheManifest {
        &self.manifest
    }

    pub fn caches(&self) -> &S {
        &self.caches
    }

    pub fn network(&self) -> &F {
        &self.network
    }

    fn resolve(&self, path: &str) -> Result<Url, ShellError> {
        self.origin.join(path).map_err(|e| ShellError::InvalidUrl {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Fetch and commit every manifest asset. Nothing is written unless all
    /// fetches succeed with an OK status, and a commit that fails part way
    /// drops the cache it started. Returns the number of cached assets.
    pub async fn install(&self) -> Result<usize, ShellError> {
        let urls = self
            .manifest
            .assets
            .iter()
            .map(|path| self.resolve(path))
            .collect::<Result<Vec<_>, _>>()?;

        let fetches = urls.into_iter().map(|url| async move {
            let response = self.network.fetch(&url).await?;
            if !response.is_ok() {
                return Err(ShellError::BadStatus {
                    url: url.to_string(),
                    status: response.status(),
                });
            }
            Ok::<_, ShellError>((url, response))
        });
        let entries = match futures::future::try_join_all(fetches).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Shell install failed, nothing cached: {}", e);
                return Err(e);
            }
        };

        let count = entries.len();
        let name = &self.manifest.cache_name;
        let existed = self.caches.keys().await?.iter().any(|k| k == name);
        if let Err(e) = self.caches.put_all(name, entries).await {
            warn!("Committing {} failed: {}", name, e);
            if !existed {
                if let Err(cleanup) = self.caches.delete(name).await {
                    warn!("Could not drop partial cache {}: {}", name, cleanup);
                }
            }
            return Err(e);
        }
        info!(
            "Installed {} shell assets into {}",
            count, self.manifest.cache_name
        );
        Ok(count)
    }

    /// Delete every cache except the current version. Returns deleted names.
    pub async fn activate(&self) -> Result<Vec<String>, ShellError> {
        let mut deleted = Vec::new();
        for name in self.caches.keys().await? {
            if name == self.manifest.cache_name {
                continue;
            }
            if self.caches.delete(&name).await? {
                info!("Deleted stale shell cache {}", name);
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Whether the worker answers this URL at all (same origin only)
    pub fn intercepts(&self, url: &Url) -> bool {
        url.origin() == self.origin.origin()
    }

    /// Answer a request: cache, then network, then the offline page
    pub async fn handle_fetch(&self, request: &F::Request) -> FetchOutcome<F::Response> {
        let url = match request.url() {
            Ok(url) => url,
            Err(e) => {
                debug!("Not intercepting: {}", e);
                return FetchOutcome::Passthrough;
            }
        };
        if !self.intercepts(&url) {
            return FetchOutcome::Passthrough;
        }

        match self.caches.lookup_request(request).await {
            Ok(Some(cached)) => return FetchOutcome::Cache(cached),
            Ok(None) => {}
            Err(e) => warn!("Cache lookup for {} failed: {}", url, e),
        }

        match self.network.forward(request).await {
            Ok(response) => FetchOutcome::Network(response),
            Err(e) => {
                debug!("Network failed for {}: {}, trying offline page", url, e);
                self.offline_page().await
            }
        }
    }

    async fn offline_page(&self) -> FetchOutcome<F::Response> {
        let url = match self.resolve(&self.manifest.offline_page) {
            Ok(url) => url,
            Err(e) => {
                warn!("{}", e);
                return FetchOutcome::Unavailable;
            }
        };
        match self.caches.lookup(&url).await {
            Ok(Some(page)) => FetchOutcome::Offline(page),
            Ok(None) => FetchOutcome::Unavailable,
            Err(e) => {
                warn!("Offline page lookup failed: {}", e);
                FetchOutcome::Unavailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Navigation request carrying more than its URL
    struct Navigation {
        url: Url,
        redirect: &'static str,
    }

    impl ShellRequest for Navigation {
        fn url(&self) -> Result<Url, ShellError> {
            Ok(self.url.clone())
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Reply(&'static str);

    impl ShellResponse for Reply {
        fn is_ok(&self) -> bool {
            true
        }

        fn status(&self) -> u16 {
            200
        }
    }

    #[derive(Default)]
    struct Wire {
        forwarded: RefCell<Vec<&'static str>>,
    }

    #[async_trait(?Send)]
    impl Fetcher for Wire {
        type Response = Reply;
        type Request = Navigation;

        async fn fetch(&self, _url: &Url) -> Result<Reply, ShellError> {
            Ok(Reply("rebuilt"))
        }

        async fn forward(&self, request: &Navigation) -> Result<Reply, ShellError> {
            self.forwarded.borrow_mut().push(request.redirect);
            Ok(Reply("forwarded"))
        }
    }

    #[derive(Default)]
    struct EmptyCaches {
        matched: RefCell<Vec<&'static str>>,
    }

    #[async_trait(?Send)]
    impl CacheStore<Reply, Navigation> for EmptyCaches {
        async fn put_all(&self, _cache: &str, _entries: Vec<(Url, Reply)>) -> Result<(), ShellError> {
            Ok(())
        }

        async fn keys(&self) -> Result<Vec<String>, ShellError> {
            Ok(Vec::new())
        }

        async fn delete(&self, _cache: &str) -> Result<bool, ShellError> {
            Ok(false)
        }

        async fn lookup(&self, _url: &Url) -> Result<Option<Reply>, ShellError> {
            Ok(None)
        }

        async fn lookup_request(&self, request: &Navigation) -> Result<Option<Reply>, ShellError> {
            self.matched.borrow_mut().push(request.redirect);
            Ok(None)
        }
    }

    #[tokio::test]
    async fn intercepted_request_is_matched_and_forwarded_whole() {
        let origin = Url::parse("https://launcher.test/").unwrap();
        let worker = ShellCacheWorker::new(
            CacheManifest::default(),
            origin.clone(),
            EmptyCaches::default(),
            Wire::default(),
        );
        let request = Navigation {
            url: origin.join("/docs").unwrap(),
            redirect: "manual",
        };

        let outcome = worker.handle_fetch(&request).await;

        assert_eq!(outcome, FetchOutcome::Network(Reply("forwarded")));
        assert_eq!(*worker.caches().matched.borrow(), vec!["manual"]);
        assert_eq!(*worker.network().forwarded.borrow(), vec!["manual"]);
    }

    #[tokio::test]
    async fn cross_origin_request_is_not_forwarded() {
        let worker = ShellCacheWorker::new(
            CacheManifest::default(),
            Url::parse("https://launcher.test/").unwrap(),
            EmptyCaches::default(),
            Wire::default(),
        );
        let request = Navigation {
            url: Url::parse("https://slowroads.io/").unwrap(),
            redirect: "follow",
        };

        assert_eq!(worker.handle_fetch(&request).await, FetchOutcome::Passthrough);
        assert!(worker.network().forwarded.borrow().is_empty());
        assert!(worker.caches().matched.borrow().is_empty());
    }

    #[test]
    fn default_manifest_lists_the_shell() {
        let manifest = CacheManifest::default();
        assert_eq!(manifest.cache_name, "sr-shell-v1");
        assert_eq!(manifest.assets.len(), 6);
        assert!(manifest.assets.contains(&manifest.offline_page));
    }

    #[test]
    fn content_version_tracks_contents() {
        let a = CacheManifest::default()
            .with_content_version("sr-shell", [("/a.html", b"one".as_slice())]);
        let b = CacheManifest::default()
            .with_content_version("sr-shell", [("/a.html", b"two".as_slice())]);
        let a_again = CacheManifest::default()
            .with_content_version("sr-shell", [("/a.html", b"one".as_slice())]);

        assert!(a.cache_name.starts_with("sr-shell-"));
        assert_eq!(a.cache_name.len(), "sr-shell-".len() + 8);
        assert_ne!(a.cache_name, b.cache_name);
        assert_eq!(a.cache_name, a_again.cache_name);
    }

    #[test]
    fn manifest_deserializes_with_defaults() {
        let manifest: CacheManifest =
            serde_json::from_str(r#"{"cache_name":"v2","assets":["/a.html"]}"#).unwrap();
        assert_eq!(manifest.cache_name, "v2");
        assert_eq!(manifest.assets, vec!["/a.html".to_string()]);
        assert_eq!(manifest.offline_page, OFFLINE_PAGE);
    }
}
