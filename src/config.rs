//! Cache locations for the tutorial assets.
//!
//! Everything is resolved once, from environment variables with hard-coded
//! defaults, into a [`CacheConfig`] that is handed to each operation.

use crate::assets::{AssetDescriptor, AssetKind};
use crate::error::{Error, Result};
use crate::utils::files::ensure_directory;
use std::path::{Path, PathBuf};

pub const CACHE_DIR_ENV: &str = "TUTORIAL_CACHE_DIR";
pub const MODEL_FILE_ENV: &str = "OLMO_MODEL_FILE";
pub const ABSTRACTS_FILE_ENV: &str = "ASTROPH_ARXIV_ABSTRACTS_FILE";
pub const DOCUMENTS_FILE_ENV: &str = "ASTROPY_GITHUB_DOCUMENTS_FILE";
pub const INDEX_ZIP_ENV: &str = "QDRANT_ZIP_FILE";
pub const INDEX_FOLDER_ENV: &str = "QDRANT_FOLDER";
pub const COLLECTION_NAME_ENV: &str = "QDRANT_COLLECTION_NAME";
pub const MODEL_BASE_URL_ENV: &str = "TUTORIAL_MODEL_BASE_URL";
pub const DATA_BASE_URL_ENV: &str = "TUTORIAL_DATA_BASE_URL";

pub const DEFAULT_MODEL_FILE: &str = "OLMo-7B-Instruct-Q4_K_M.gguf";
pub const DEFAULT_ABSTRACTS_FILE: &str = "astro_ph_arxiv_abstracts.jsonl";
pub const DEFAULT_DOCUMENTS_FILE: &str = "astropy_github_documents.jsonl";
pub const DEFAULT_INDEX_ZIP: &str = "qdrant_data.zip";
pub const DEFAULT_INDEX_FOLDER: &str = "qdrant_data";
pub const DEFAULT_COLLECTION_NAME: &str = "arxiv_astro-ph_abstracts_astropy_github_documentation";

pub const DEFAULT_MODEL_BASE_URL: &str =
    "https://huggingface.co/ssec-uw/OLMo-7B-Instruct-GGUF/resolve/main/";
pub const DEFAULT_DATA_BASE_URL: &str =
    "https://huggingface.co/datasets/ssec-uw/scipy-2024-tutorial-data/resolve/main/";

#[derive(Debug, Clone)]
pub struct CacheConfig {
    root: PathBuf,
    model: AssetDescriptor,
    abstracts: AssetDescriptor,
    documents: AssetDescriptor,
    vector_index: AssetDescriptor,
    collection_name: String,
}

impl CacheConfig {
    /// `~/.cache/ssec_tutorials`
    pub fn default_root() -> Result<PathBuf> {
        cache_root_in(dirs::home_dir())
    }

    /// Resolve from the process environment. An explicit root wins over
    /// `TUTORIAL_CACHE_DIR`, which wins over [`CacheConfig::default_root`].
    pub fn from_env(root: Option<PathBuf>) -> Result<Self> {
        let lookup = |key: &str| std::env::var(key).ok();
        let root = match root.or_else(|| non_empty(lookup(CACHE_DIR_ENV)).map(PathBuf::from)) {
            Some(root) => root,
            None => Self::default_root()?,
        };
        Ok(Self::from_lookup(root, lookup))
    }

    /// Resolve against an arbitrary variable source. Empty values count as
    /// unset.
    pub fn from_lookup(root: PathBuf, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| {
            non_empty(lookup(key)).unwrap_or_else(|| default.to_owned())
        };

        let model_base = var(MODEL_BASE_URL_ENV, DEFAULT_MODEL_BASE_URL);
        let data_base = var(DATA_BASE_URL_ENV, DEFAULT_DATA_BASE_URL);

        let model = AssetDescriptor::file(
            AssetKind::Model,
            &model_base,
            &var(MODEL_FILE_ENV, DEFAULT_MODEL_FILE),
            &root,
        );
        let abstracts = AssetDescriptor::file(
            AssetKind::Abstracts,
            &data_base,
            &var(ABSTRACTS_FILE_ENV, DEFAULT_ABSTRACTS_FILE),
            &root,
        );
        let documents = AssetDescriptor::file(
            AssetKind::Documents,
            &data_base,
            &var(DOCUMENTS_FILE_ENV, DEFAULT_DOCUMENTS_FILE),
            &root,
        );
        let vector_index = AssetDescriptor::archive(
            AssetKind::VectorIndex,
            &data_base,
            &var(INDEX_ZIP_ENV, DEFAULT_INDEX_ZIP),
            &var(INDEX_FOLDER_ENV, DEFAULT_INDEX_FOLDER),
            &root,
        );

        Self {
            model,
            abstracts,
            documents,
            vector_index,
            collection_name: var(COLLECTION_NAME_ENV, DEFAULT_COLLECTION_NAME),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn asset(&self, kind: AssetKind) -> &AssetDescriptor {
        match kind {
            AssetKind::Model => &self.model,
            AssetKind::Abstracts => &self.abstracts,
            AssetKind::Documents => &self.documents,
            AssetKind::VectorIndex => &self.vector_index,
        }
    }

    /// Name of the Qdrant collection stored in the vector index
    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    pub fn ensure_root(&self) -> Result<()> {
        ensure_directory(&self.root)
    }
}

fn cache_root_in(home: Option<PathBuf>) -> Result<PathBuf> {
    let home = home.ok_or(Error::NoHomeDir)?;
    Ok(home.join(".cache").join("ssec_tutorials"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
