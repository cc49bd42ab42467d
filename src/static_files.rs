//! Named static resources served by the dashboard (`/` and `/index.min.js`).

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Loads a named resource as raw bytes.
pub trait AssetLoader: Send + Sync {
    /// # Errors
    ///
    /// `NotFound` if no resource has that name, or the underlying I/O error.
    fn load(&self, name: &str) -> io::Result<Vec<u8>>;
}

/// Assets compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedAssets;

const EMBEDDED: &[(&str, &[u8])] = &[
    ("Index.html", include_bytes!("../assets/Index.html")),
    ("index.min.js", include_bytes!("../assets/index.min.js")),
];

impl AssetLoader for EmbeddedAssets {
    fn load(&self, name: &str) -> io::Result<Vec<u8>> {
        EMBEDDED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, bytes)| bytes.to_vec())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "asset not embedded"))
    }
}

/// Assets read from a directory on every request, for UI development.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self { base_dir: base.into() }
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn map_path(&self, name: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        for comp in Path::new(name.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }
}

impl AssetLoader for StaticFiles {
    fn load(&self, name: &str) -> io::Result<Vec<u8>> {
        let path = self
            .map_path(name)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid path"))?;
        if !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        }
        fs::read(&path)
    }
}
