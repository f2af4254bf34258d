//! Document loaders.
//!
//! Everything the runtime reads from outside (manifests, script source,
//! atlas images) goes through a `Loader`. URLs are slash-separated; a leading
//! `/` means "from the loader root", matching how project scripts reference
//! their resources.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::LoadError;

pub trait Loader {
    fn load_bytes(&self, url: &str) -> Result<Vec<u8>, LoadError>;

    fn load_text(&self, url: &str) -> Result<String, LoadError> {
        let bytes = self.load_bytes(url)?;
        String::from_utf8(bytes).map_err(|e| LoadError::Io {
            url: url.to_string(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })
    }

    fn load_json(&self, url: &str) -> Result<Value, LoadError> {
        let bytes = self.load_bytes(url)?;
        serde_json::from_slice(&bytes).map_err(|source| LoadError::Json {
            url: url.to_string(),
            source,
        })
    }
}

/// Load `url` as JSON and decode it into `T`.
pub fn load_document<T: DeserializeOwned>(loader: &dyn Loader, url: &str) -> Result<T, LoadError> {
    let value = loader.load_json(url)?;
    serde_json::from_value(value).map_err(|source| LoadError::Json {
        url: url.to_string(),
        source,
    })
}

/// Where a manifest comes from: a URL to fetch, or an already decoded value.
#[derive(Debug, Clone)]
pub enum ManifestSource<T> {
    Url(String),
    Inline(T),
}

impl<T: DeserializeOwned> ManifestSource<T> {
    /// Decode the manifest, returning it with the directory relative
    /// resources inside it are resolved against.
    pub fn resolve(self, loader: &dyn Loader) -> Result<(T, String), LoadError> {
        match self {
            ManifestSource::Url(url) => {
                let manifest = load_document(loader, &url)?;
                Ok((manifest, crate::path::directory(&url)))
            }
            ManifestSource::Inline(manifest) => Ok((manifest, String::new())),
        }
    }
}

impl<T> From<&str> for ManifestSource<T> {
    fn from(url: &str) -> Self {
        ManifestSource::Url(url.to_string())
    }
}

fn normalize(url: &str) -> &str {
    url.trim_start_matches('/')
}

/// Serves files below a root directory.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        self.root.join(normalize(url))
    }
}

impl Loader for FsLoader {
    fn load_bytes(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let path = self.resolve(url);
        log::debug!("loading {url} from {}", path.display());
        fs::read(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound {
                url: url.to_string(),
            },
            _ => LoadError::Io {
                url: url.to_string(),
                source,
            },
        })
    }
}

/// Serves documents held in memory. Useful for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: &str, contents: impl Into<Vec<u8>>) {
        self.files.insert(normalize(url).to_string(), contents.into());
    }

    pub fn with(mut self, url: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(url, contents);
        self
    }
}

impl Loader for MemoryLoader {
    fn load_bytes(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        self.files
            .get(normalize(url))
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                url: url.to_string(),
            })
    }
}
