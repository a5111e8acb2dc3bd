//! Resource fetching - component files from disk or HTTP (v0.1)

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{BinderyError, Result};

/// Default timeout for HTTP requests (30 seconds)
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of component resources, addressed by relative path
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Text of the resource at `path` (e.g. `counter/index.html`)
    async fn fetch_text(&self, path: &str) -> Result<String>;
}

/// Reads resources below a local directory
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ResourceFetcher for FsFetcher {
    async fn fetch_text(&self, path: &str) -> Result<String> {
        let full = self.root.join(path);
        debug!(path = %full.display(), "Reading resource");
        tokio::fs::read_to_string(&full)
            .await
            .map_err(|e| BinderyError::ResourceMissing {
                path: full.display().to_string(),
                details: e.to_string(),
            })
    }
}

/// Fetches resources relative to a base URL
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base: Url,
}

impl HttpFetcher {
    /// `base` is treated as a directory (a trailing `/` is added)
    pub fn new(base: &str) -> Result<Self> {
        let mut base = Url::parse(base)
            .map_err(|e| BinderyError::Config(format!("Invalid base URL '{}': {}", base, e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .connect_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(concat!("bindery/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BinderyError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Absolute URL of a resource path
    pub fn resolve(&self, path: &str) -> Result<Url> {
        self.base.join(path).map_err(|e| BinderyError::ResourceMissing {
            path: path.to_string(),
            details: e.to_string(),
        })
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch_text(&self, path: &str) -> Result<String> {
        let url = self.resolve(path)?;

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            BinderyError::ResourceMissing {
                path: url.to_string(),
                details: format!("HTTP request failed: {}", e),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BinderyError::ResourceFailure {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| BinderyError::ResourceMissing {
            path: url.to_string(),
            details: format!("Failed to read response: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fs_fetcher_reads_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nav")).unwrap();
        std::fs::write(dir.path().join("nav/index.html"), "<nav></nav>").unwrap();

        let fetcher = FsFetcher::new(dir.path());
        assert_eq!(fetcher.fetch_text("nav/index.html").await.unwrap(), "<nav></nav>");
    }

    #[tokio::test]
    async fn fs_fetcher_missing_file_is_a_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsFetcher::new(dir.path())
            .fetch_text("nope/index.json")
            .await
            .unwrap_err();
        assert!(err.is_resource_error());
        assert_eq!(err.code(), "BIND-031");
    }

    #[test]
    fn http_base_is_treated_as_directory() {
        let fetcher = HttpFetcher::new("http://localhost:8080/components").unwrap();
        assert_eq!(
            fetcher.resolve("nav/index.html").unwrap().as_str(),
            "http://localhost:8080/components/nav/index.html"
        );
    }

    #[test]
    fn http_rejects_invalid_base() {
        let err = HttpFetcher::new("not a url").unwrap_err();
        assert_eq!(err.code(), "BIND-050");
    }
}
