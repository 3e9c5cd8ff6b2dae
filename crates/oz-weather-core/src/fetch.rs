use crate::LoadError;
use anyhow::{Context, Result};
use log::debug;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Read access to the static JSON assets of a site.
///
/// `path` is always site-relative with a leading slash (`/climate.json`);
/// any deployment prefix is the implementation's business.
pub trait Fetch: Sync {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError>;
}

impl<T: Fetch + ?Sized> Fetch for &T {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        (**self).fetch(path)
    }
}

impl<T: Fetch + ?Sized> Fetch for Box<T> {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        (**self).fetch(path)
    }
}

/// Fetches assets from a deployed site over HTTP.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    base: Url,
}

impl HttpFetcher {
    /// `base_url` is the site origin, `base_path` the prefix the site is
    /// mounted under (empty in development).
    pub fn new(base_url: &str, base_path: &str, timeout: Duration) -> Result<Self> {
        let base = site_base(base_url, base_path)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url_for(&self, path: &str) -> Result<Url, LoadError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|source| LoadError::InvalidUrl {
                path: path.to_string(),
                source,
            })
    }
}

fn site_base(base_url: &str, base_path: &str) -> Result<Url> {
    let origin = Url::parse(base_url).with_context(|| format!("Invalid base URL: {}", base_url))?;
    let prefix = base_path.trim_matches('/');
    let joined = if prefix.is_empty() {
        String::new()
    } else {
        format!("{}/", prefix)
    };
    // Resolve from the origin root so a base_path always wins over any path in base_url.
    origin
        .join(&format!("/{}", joined))
        .with_context(|| format!("Invalid base path: {}", base_path))
}

impl Fetch for HttpFetcher {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        let url = self.url_for(path)?;
        debug!("Fetching asset — path={} url={}", path, url);

        let transport = |source| LoadError::Transport {
            path: path.to_string(),
            source,
        };

        let response = self.client.get(url).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().map_err(transport)?;
        debug!("Fetched asset — path={} bytes={}", path, bytes.len());
        Ok(bytes.to_vec())
    }
}

/// Reads assets straight out of a static build directory, for prerendering
/// without a server.
#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn file_for(&self, path: &str) -> Result<PathBuf, LoadError> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || relative.as_os_str().is_empty() {
            return Err(LoadError::InvalidPath {
                path: path.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl Fetch for DirFetcher {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        let file = self.file_for(path)?;
        debug!("Reading asset — path={} file={}", path, file.display());
        std::fs::read(&file).map_err(|source| LoadError::Io {
            path: path.to_string(),
            source,
        })
    }
}
