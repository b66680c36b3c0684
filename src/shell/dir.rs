//! Directory-backed fetcher for preflighting an exported shell.
//!
//! Maps URL paths onto files under a root directory the way a static host
//! would: `/` and directory paths serve `index.html`, anything missing is a 404.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use url::Url;

use super::{Fetcher, ShellError, ShellResponse};

/// Response read from disk
#[derive(Clone, Debug, PartialEq)]
pub struct StaticResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl StaticResponse {
    pub fn not_found() -> Self {
        Self {
            status: 404,
            content_type: "text/plain".to_string(),
            body: Vec::new(),
        }
    }
}

impl ShellResponse for StaticResponse {
    fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn status(&self) -> u16 {
        self.status
    }
}

pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File a URL path maps to, or `None` if it would escape the root
    pub fn file_for(&self, url: &Url) -> Option<PathBuf> {
        let mut path = self.root.clone();
        for segment in url.path_segments()? {
            if segment == ".." {
                return None;
            }
            if !segment.is_empty() {
                path.push(segment);
            }
        }
        if url.path().ends_with('/') {
            path.push("index.html");
        }
        Some(path)
    }
}

#[async_trait(?Send)]
impl Fetcher for DirFetcher {
    type Response = StaticResponse;
    type Request = Url;

    async fn fetch(&self, url: &Url) -> Result<StaticResponse, ShellError> {
        let Some(path) = self.file_for(url) else {
            return Ok(StaticResponse::not_found());
        };

        match tokio::fs::read(&path).await {
            Ok(body) => Ok(StaticResponse {
                status: 200,
                content_type: mime_guess::from_path(&path)
                    .first_or_octet_stream()
                    .to_string(),
                body,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StaticResponse::not_found()),
            Err(e) => Err(ShellError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
