use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};

/// Downloadable tutorial assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AssetKind {
    /// Quantized OLMo instruct model weights (GGUF)
    Model,
    /// astro-ph arXiv abstracts (JSONL)
    Abstracts,
    /// Astropy documentation pages collected from GitHub (JSONL)
    Documents,
    /// Prebuilt Qdrant vector index, shipped as a zip
    VectorIndex,
}

impl AssetKind {
    /// Every kind, in the order a full download visits them
    pub const ALL: [AssetKind; 4] = [
        AssetKind::Model,
        AssetKind::Abstracts,
        AssetKind::Documents,
        AssetKind::VectorIndex,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AssetKind::Model => "model",
            AssetKind::Abstracts => "abstracts",
            AssetKind::Documents => "documents",
            AssetKind::VectorIndex => "vector-index",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where an asset comes from and where it lives in the cache.
///
/// For plain files `download_path` and `local_path` are the same file. For
/// archive assets the zip is downloaded to `download_path` and `local_path` is
/// the folder it unpacks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    pub kind: AssetKind,
    pub base_url: String,
    pub filename: String,
    pub download_path: PathBuf,
    pub local_path: PathBuf,
    archive: bool,
}

impl AssetDescriptor {
    pub fn file(kind: AssetKind, base_url: &str, filename: &str, root: &Path) -> Self {
        let path = root.join(filename);
        Self {
            kind,
            base_url: base_url.to_owned(),
            filename: filename.to_owned(),
            download_path: path.clone(),
            local_path: path,
            archive: false,
        }
    }

    pub fn archive(
        kind: AssetKind,
        base_url: &str,
        filename: &str,
        folder: &str,
        root: &Path,
    ) -> Self {
        Self {
            kind,
            base_url: base_url.to_owned(),
            filename: filename.to_owned(),
            download_path: root.join(filename),
            local_path: root.join(folder),
            archive: true,
        }
    }

    pub fn is_archive(&self) -> bool {
        self.archive
    }

    /// Same asset under another remote filename. Archives unpack to the
    /// filename's stem.
    pub fn with_filename(&self, filename: &str) -> Self {
        let root = self
            .download_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        if self.archive {
            let folder = Path::new(filename)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| filename.to_owned());
            Self::archive(self.kind, &self.base_url, filename, &folder, &root)
        } else {
            Self::file(self.kind, &self.base_url, filename, &root)
        }
    }

    pub fn url(&self) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, self.filename)
        } else {
            format!("{}/{}", self.base_url, self.filename)
        }
    }
}

pub mod fetch;
