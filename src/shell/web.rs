//! Browser bindings for the shell worker.
//!
//! `ShellWorker` is exported to JavaScript; the generated service worker
//! loader constructs it with the baked-in manifest and forwards lifecycle
//! and fetch events to it.

use async_trait::async_trait;
use js_sys::Array;
use std::rc::Rc;
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{Cache, CacheStorage, Request, Response, ServiceWorkerGlobalScope};

use super::{
    CacheManifest, CacheStore, FetchOutcome, Fetcher, ShellCacheWorker, ShellError, ShellRequest,
    ShellResponse,
};

fn describe(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

fn cache_error(e: JsValue) -> ShellError {
    ShellError::Cache(describe(e))
}

impl ShellResponse for Response {
    fn is_ok(&self) -> bool {
        self.ok()
    }

    fn status(&self) -> u16 {
        Response::status(self)
    }
}

impl ShellRequest for Request {
    fn url(&self) -> Result<Url, ShellError> {
        let href = Request::url(self);
        Url::parse(&href).map_err(|e| ShellError::InvalidUrl {
            path: href,
            reason: e.to_string(),
        })
    }
}

fn into_cached(found: JsValue) -> Result<Option<Response>, ShellError> {
    if found.is_undefined() || found.is_null() {
        return Ok(None);
    }
    found
        .dyn_into::<Response>()
        .map(Some)
        .map_err(|_| ShellError::Cache("cache match did not return a Response".into()))
}

/// The worker's `caches` object
pub struct BrowserCaches {
    storage: CacheStorage,
}

#[async_trait(?Send)]
impl CacheStore<Response, Request> for BrowserCaches {
    async fn put_all(&self, cache: &str, entries: Vec<(Url, Response)>) -> Result<(), ShellError> {
        let cache: Cache = JsFuture::from(self.storage.open(cache))
            .await
            .map_err(cache_error)?
            .unchecked_into();
        for (url, response) in entries {
            JsFuture::from(cache.put_with_str(url.as_str(), &response))
                .await
                .map_err(cache_error)?;
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, ShellError> {
        let keys = JsFuture::from(self.storage.keys())
            .await
            .map_err(cache_error)?;
        Ok(Array::from(&keys)
            .iter()
            .filter_map(|k| k.as_string())
            .collect())
    }

    async fn delete(&self, cache: &str) -> Result<bool, ShellError> {
        let deleted = JsFuture::from(self.storage.delete(cache))
            .await
            .map_err(cache_error)?;
        Ok(deleted.as_bool().unwrap_or(false))
    }

    async fn lookup(&self, url: &Url) -> Result<Option<Response>, ShellError> {
        let found = JsFuture::from(self.storage.match_with_str(url.as_str()))
            .await
            .map_err(cache_error)?;
        into_cached(found)
    }

    async fn lookup_request(&self, request: &Request) -> Result<Option<Response>, ShellError> {
        let found = JsFuture::from(self.storage.match_with_request(request))
            .await
            .map_err(cache_error)?;
        into_cached(found)
    }
}

/// `fetch` from the worker scope
pub struct BrowserFetch {
    scope: ServiceWorkerGlobalScope,
}

#[async_trait(?Send)]
impl Fetcher for BrowserFetch {
    type Response = Response;
    type Request = Request;

    async fn fetch(&self, url: &Url) -> Result<Response, ShellError> {
        let pending = self.scope.fetch_with_str(url.as_str());
        into_response(url.as_str(), JsFuture::from(pending).await)
    }

    async fn forward(&self, request: &Request) -> Result<Response, ShellError> {
        let pending = self.scope.fetch_with_request(request);
        into_response(&request.url(), JsFuture::from(pending).await)
    }
}

fn into_response(url: &str, fetched: Result<JsValue, JsValue>) -> Result<Response, ShellError> {
    let response = fetched.map_err(|e| ShellError::Fetch {
        url: url.to_string(),
        reason: describe(e),
    })?;
    response.dyn_into::<Response>().map_err(|_| ShellError::Fetch {
        url: url.to_string(),
        reason: "not a Response".into(),
    })
}

#[wasm_bindgen]
pub struct ShellWorker {
    inner: Rc<ShellCacheWorker<BrowserCaches, BrowserFetch>>,
}

#[wasm_bindgen]
impl ShellWorker {
    /// `manifest` is a serialized `CacheManifest`
    #[wasm_bindgen(constructor)]
    pub fn new(manifest: JsValue) -> Result<ShellWorker, JsValue> {
        let manifest: CacheManifest = serde_wasm_bindgen::from_value(manifest)?;
        let scope: ServiceWorkerGlobalScope = js_sys::global().dyn_into()?;
        let origin = Url::parse(&scope.location().href())
            .map_err(|e| JsValue::from_str(&format!("worker location: {}", e)))?;
        let storage = scope.caches()?;

        Ok(ShellWorker {
            inner: Rc::new(ShellCacheWorker::new(
                manifest,
                origin,
                BrowserCaches { storage },
                BrowserFetch { scope },
            )),
        })
    }

    #[wasm_bindgen(js_name = cacheName, getter)]
    pub fn cache_name(&self) -> String {
        self.inner.manifest().cache_name.clone()
    }

    /// Resolves with the number of cached assets; rejects if any asset failed
    pub fn install(&self) -> js_sys::Promise {
        let inner = self.inner.clone();
        future_to_promise(async move {
            inner
                .install()
                .await
                .map(|count| JsValue::from(count as u32))
                .map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }

    /// Resolves with the deleted cache names
    pub fn activate(&self) -> js_sys::Promise {
        let inner = self.inner.clone();
        future_to_promise(async move {
            let deleted = inner
                .activate()
                .await
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            Ok(deleted
                .into_iter()
                .map(JsValue::from)
                .collect::<Array>()
                .into())
        })
    }

    /// Resolves with a Response, or `undefined` when nothing could answer.
    /// The request is matched and forwarded as the page sent it.
    pub fn respond(&self, request: Request) -> js_sys::Promise {
        let inner = self.inner.clone();
        future_to_promise(async move {
            Ok(match inner.handle_fetch(&request).await {
                FetchOutcome::Passthrough | FetchOutcome::Unavailable => JsValue::UNDEFINED,
                outcome => outcome
                    .into_response()
                    .map(JsValue::from)
                    .unwrap_or(JsValue::UNDEFINED),
            })
        })
    }
}
