//! Shell exporter.
//!
//! Writes the static half of the offline shell into an output directory:
//! the stylesheet and icon (embedded in the binary), the server-rendered
//! offline page, the web app manifest and the service worker loader with
//! the cache manifest baked in. The page bundle itself (`index.html`,
//! `assets/app.js`) comes from `dx bundle --features web`.
//!
//! `check` preflights the worker install against the directory with the
//! same `ShellCacheWorker` the browser runs.

use anyhow::{bail, Context, Result};
use dioxus::prelude::*;
use rust_embed::RustEmbed;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

use crate::app::pages::OfflinePage;
use crate::config::Config;
use crate::settings::LauncherSettings;
use crate::shell::dir::{DirFetcher, StaticResponse};
use crate::shell::memory::MemoryCacheStorage;
use crate::shell::{CacheManifest, ShellCacheWorker};

/// Stylesheet and icon, served from `/assets/`
#[derive(RustEmbed)]
#[folder = "public/"]
struct PublicAssets;

/// wasm-pack `--target no-modules` output for the worker
const WORKER_BUNDLE: &str = "./pkg/slow_roads_launcher.js";
const WORKER_WASM: &str = "./pkg/slow_roads_launcher_bg.wasm";

/// Cache seeded before the preflight activation so it has something to delete
const PREFLIGHT_STALE_CACHE: &str = "preflight-stale";

const SERVICE_WORKER_TEMPLATE: &str = r#"// Generated by slow-roads-launcher export. Do not edit.
importScripts('__BUNDLE__');

const SHELL = __SHELL__;
const worker = wasm_bindgen('__WASM__').then(() => new wasm_bindgen.ShellWorker(SHELL));

self.addEventListener('install', (e) => {
  e.waitUntil(worker.then((w) => w.install()));
});

self.addEventListener('activate', (e) => {
  e.waitUntil(worker.then((w) => w.activate()));
});

self.addEventListener('fetch', (e) => {
  // respondWith must be decided synchronously: same-origin GETs only
  const url = new URL(e.request.url);
  if (url.origin !== self.location.origin || e.request.method !== 'GET') return;
  e.respondWith(
    worker
      .then((w) => w.respond(e.request))
      .then((res) => res || Response.error())
  );
});
"#;

/// Applies the saved theme before first paint on the static offline page
const THEME_BOOT_SCRIPT: &str = "(function(){var t=['dark','sunset','light'][parseInt(localStorage.getItem('themeIndex')||'0',10)];if(t&&t!=='dark')document.documentElement.setAttribute('data-theme',t);})();";

/// Web app manifest (`manifest.webmanifest`)
#[derive(Debug, Serialize)]
pub struct WebAppManifest {
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub start_url: String,
    pub scope: String,
    pub display: String,
    pub background_color: String,
    pub theme_color: String,
    pub icons: Vec<ManifestIcon>,
}

#[derive(Debug, Serialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime: String,
    pub purpose: String,
}

impl WebAppManifest {
    pub fn new(settings: &LauncherSettings) -> Self {
        Self {
            name: settings.frame_title.clone(),
            short_name: settings.frame_title.clone(),
            description: "Endless relaxing drive, launched from the home screen".to_string(),
            start_url: "/".to_string(),
            scope: "/".to_string(),
            display: "standalone".to_string(),
            background_color: "#0d1117".to_string(),
            theme_color: "#0d1117".to_string(),
            icons: vec![ManifestIcon {
                src: "/assets/icon.svg".to_string(),
                sizes: "any".to_string(),
                mime: "image/svg+xml".to_string(),
                purpose: "any maskable".to_string(),
            }],
        }
    }
}

/// Full offline document
pub fn offline_html(settings: &LauncherSettings) -> String {
    let body = dioxus::ssr::render_element(rsx! {
        OfflinePage { play_url: settings.play_url.clone() }
    });
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Offline - {title}</title>
    <link rel="stylesheet" href="/assets/styles.css">
    <link rel="manifest" href="/manifest.webmanifest">
    <script>{script}</script>
</head>
<body>
{body}
</body>
</html>
"#,
        title = settings.frame_title,
        script = THEME_BOOT_SCRIPT,
        body = body,
    )
}

/// Service worker loader with `manifest` baked in
pub fn service_worker_js(manifest: &CacheManifest) -> Result<String> {
    let shell = serde_json::to_string(manifest).context("serialize cache manifest")?;
    Ok(SERVICE_WORKER_TEMPLATE
        .replace("__BUNDLE__", WORKER_BUNDLE)
        .replace("__WASM__", WORKER_WASM)
        .replace("__SHELL__", &shell))
}

/// Worker script file name, from the page-relative registration path
pub fn service_worker_file(settings: &LauncherSettings) -> &str {
    settings
        .service_worker_path
        .trim_start_matches("./")
        .trim_start_matches('/')
}

#[derive(Debug)]
pub struct ExportReport {
    pub cache_name: String,
    pub written: Vec<PathBuf>,
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create {}", parent.display()))?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("write {}", path.display()))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

fn origin(config: &Config) -> Result<Url> {
    Url::parse(&config.origin).with_context(|| format!("invalid origin {}", config.origin))
}

/// Cache manifest to bake into the worker: the configured one, or with a
/// version derived from the shell files currently in the output directory.
async fn versioned_manifest(config: &Config) -> Result<CacheManifest> {
    let manifest = config.shell.clone();
    if !config.content_versioned {
        return Ok(manifest);
    }

    let origin = origin(config)?;
    let fetcher = DirFetcher::new(&config.out_dir);
    let mut contents = Vec::new();
    for asset in &manifest.assets {
        let Some(file) = origin.join(asset).ok().and_then(|url| fetcher.file_for(&url)) else {
            continue;
        };
        if let Ok(bytes) = tokio::fs::read(&file).await {
            contents.push((asset.clone(), bytes));
        }
    }

    let prefix = manifest
        .cache_name
        .rsplit_once('-')
        .map(|(prefix, _)| prefix.to_string())
        .unwrap_or_else(|| manifest.cache_name.clone());
    Ok(manifest.with_content_version(
        &prefix,
        contents
            .iter()
            .map(|(path, bytes)| (path.as_str(), bytes.as_slice())),
    ))
}

/// Write the shell files into `config.out_dir`
pub async fn export(config: &Config) -> Result<ExportReport> {
    let out = &config.out_dir;
    let mut written = Vec::new();

    for name in PublicAssets::iter() {
        let Some(file) = PublicAssets::get(&name) else {
            continue;
        };
        let path = out.join("assets").join(name.as_ref());
        write_file(&path, &file.data).await?;
        written.push(path);
    }

    let offline = out.join(config.shell.offline_page.trim_start_matches('/'));
    write_file(&offline, offline_html(&config.launcher).as_bytes()).await?;
    written.push(offline);

    let manifest_path = out.join("manifest.webmanifest");
    let manifest_json = serde_json::to_vec_pretty(&WebAppManifest::new(&config.launcher))
        .context("serialize web app manifest")?;
    write_file(&manifest_path, &manifest_json).await?;
    written.push(manifest_path);

    let shell = versioned_manifest(config).await?;
    let worker_path = out.join(service_worker_file(&config.launcher));
    write_file(&worker_path, service_worker_js(&shell)?.as_bytes()).await?;
    written.push(worker_path);

    info!(
        "Exported {} files to {} (cache {})",
        written.len(),
        out.display(),
        shell.cache_name
    );
    Ok(ExportReport {
        cache_name: shell.cache_name,
        written,
    })
}

#[derive(Debug)]
pub struct CheckReport {
    pub cache_name: String,
    pub cached: usize,
    pub deleted: Vec<String>,
}

/// Manifest entries with no file behind them in the output directory
pub fn missing_assets(config: &Config) -> Result<Vec<String>> {
    let origin = origin(config)?;
    let fetcher = DirFetcher::new(&config.out_dir);
    Ok(config
        .shell
        .assets
        .iter()
        .filter(|asset| {
            origin
                .join(asset)
                .ok()
                .and_then(|url| fetcher.file_for(&url))
                .map_or(true, |file| !file.is_file())
        })
        .cloned()
        .collect())
}

/// Run install and activation against the output directory
pub async fn check(config: &Config) -> Result<CheckReport> {
    let missing = missing_assets(config)?;
    if !missing.is_empty() {
        bail!(
            "{} shell asset(s) missing from {}: {}",
            missing.len(),
            config.out_dir.display(),
            missing.join(", ")
        );
    }

    let manifest = versioned_manifest(config).await?;
    let cache_name = manifest.cache_name.clone();
    let origin = origin(config)?;

    let caches = MemoryCacheStorage::new();
    caches.insert(
        PREFLIGHT_STALE_CACHE,
        origin.join("/")?,
        StaticResponse::not_found(),
    );

    let worker = ShellCacheWorker::new(
        manifest,
        origin,
        caches,
        DirFetcher::new(&config.out_dir),
    );
    let cached = worker
        .install()
        .await
        .context("preflight install failed")?;
    let deleted = worker
        .activate()
        .await
        .context("preflight activation failed")?;

    let remaining = worker.caches().names();
    if remaining != [cache_name.clone()] {
        bail!(
            "activation should leave only {}, found {:?}",
            cache_name,
            remaining
        );
    }

    info!(
        "Preflight passed: {} assets cached in {}, removed {:?}",
        cached, cache_name, deleted
    );
    Ok(CheckReport {
        cache_name,
        cached,
        deleted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(out_dir: &Path) -> Config {
        Config {
            out_dir: out_dir.to_path_buf(),
            origin: "http://localhost".to_string(),
            content_versioned: false,
            launcher: LauncherSettings::default(),
            shell: CacheManifest::default(),
        }
    }

    fn add_page_bundle(out_dir: &Path) {
        std::fs::write(out_dir.join("index.html"), "<div id=\"main\"></div>").unwrap();
        std::fs::write(out_dir.join("assets/app.js"), "// bundle").unwrap();
    }

    #[test]
    fn offline_page_is_a_full_document() {
        let html = offline_html(&LauncherSettings::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("re offline"));
        assert!(html.contains("slowroads.io"));
        assert!(html.contains("/assets/styles.css"));
    }

    #[test]
    fn worker_loader_bakes_in_the_manifest() {
        let js = service_worker_js(&CacheManifest::new("sr-shell-v7", &["/", "/offline.html"]))
            .unwrap();
        assert!(js.contains(r#""cache_name":"sr-shell-v7""#));
        assert!(js.contains("importScripts('./pkg/slow_roads_launcher.js')"));
        assert!(js.contains("url.origin !== self.location.origin"));
        assert!(js.contains("w.respond(e.request)"));
        assert!(!js.contains("__SHELL__"));
    }

    #[test]
    fn web_manifest_is_standalone() {
        let json = serde_json::to_value(WebAppManifest::new(&LauncherSettings::default())).unwrap();
        assert_eq!(json["display"], "standalone");
        assert_eq!(json["icons"][0]["type"], "image/svg+xml");
    }

    #[tokio::test]
    async fn export_writes_the_static_shell() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let report = export(&config(dir.path())).await.unwrap();

        assert_eq!(report.cache_name, "sr-shell-v1");
        for file in [
            "assets/styles.css",
            "assets/icon.svg",
            "offline.html",
            "manifest.webmanifest",
            "slow-roads-sw.js",
        ] {
            assert!(dir.path().join(file).is_file(), "{} not written", file);
        }
    }

    #[tokio::test]
    async fn check_fails_until_every_asset_exists() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config = config(dir.path());
        export(&config).await.unwrap();

        assert_eq!(
            missing_assets(&config).unwrap(),
            vec!["/", "/index.html", "/assets/app.js"]
        );
        let err = check(&config).await.unwrap_err();
        assert!(err.to_string().contains("missing"), "{}", err);

        add_page_bundle(dir.path());
        let report = check(&config).await.unwrap();
        assert_eq!(report.cache_name, "sr-shell-v1");
        assert_eq!(report.cached, 6);
        assert_eq!(report.deleted, vec![PREFLIGHT_STALE_CACHE.to_string()]);
    }

    #[tokio::test]
    async fn content_versioned_name_follows_the_shell() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut config = config(dir.path());
        config.content_versioned = true;
        export(&config).await.unwrap();
        add_page_bundle(dir.path());

        let first = export(&config).await.unwrap().cache_name;
        assert!(first.starts_with("sr-shell-"));
        assert_ne!(first, "sr-shell-v1");
        assert_eq!(export(&config).await.unwrap().cache_name, first);

        std::fs::write(dir.path().join("assets/app.js"), "// bundle v2").unwrap();
        let second = export(&config).await.unwrap().cache_name;
        assert_ne!(first, second);

        // The preflight uses the same derived name
        assert_eq!(check(&config).await.unwrap().cache_name, second);
    }
}
