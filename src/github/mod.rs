//! Collect documentation pages from a GitHub repository.
//!
//! The contents API is walked depth-first and every file with the document
//! suffix becomes a [`Document`] titled after its filename.

use crate::documents::Document;
use crate::error::{Error, Result};
use crate::utils::http::{next_page, send_checked};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const ASTROPY_REPO: &str = "astropy/astropy";
pub const ASTROPY_BRANCH: &str = "main";
pub const ASTROPY_DOCS_PATH: &str = "docs";
pub const RST_SUFFIX: &str = ".rst";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Dir,
    #[serde(other)]
    Other,
}

/// One item of a contents listing
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub path: String,
    pub download_url: Option<String>,
}

/// Which tree to walk
#[derive(Debug, Clone)]
pub struct TreeSource {
    pub api_url: String,
    pub repo: String,
    pub branch: String,
    pub path: String,
    pub suffix: String,
}

impl TreeSource {
    pub fn new(repo: &str, branch: &str, path: &str) -> Self {
        Self {
            api_url: GITHUB_API_URL.to_owned(),
            repo: repo.to_owned(),
            branch: branch.to_owned(),
            path: path.to_owned(),
            suffix: RST_SUFFIX.to_owned(),
        }
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_owned();
        self
    }

    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_owned();
        self
    }

    /// `{api}/repos/{repo}/contents/{path}?ref={branch}`, each piece escaped
    fn listing_url(&self, path: &str) -> Result<Url> {
        let invalid = || Error::ApiUrl(self.api_url.clone());
        let mut url = Url::parse(&self.api_url).map_err(|_| invalid())?;

        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push("repos")
            .extend(self.repo.split('/'))
            .push("contents")
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        url.query_pairs_mut().append_pair("ref", &self.branch);

        Ok(url)
    }
}

/// Walk `source` and return one document per matching file.
///
/// Directories are expanded in place, so the result is in the order a
/// recursive listing would produce. Any failed request aborts the walk.
pub async fn walk(
    client: &Client,
    source: &TreeSource,
    token: Option<&str>,
) -> Result<Vec<Document>> {
    info!(
        "Walking {}@{}:/{} for *{} files",
        source.repo, source.branch, source.path, source.suffix
    );

    let mut documents = Vec::new();
    let mut stack = vec![list_directory(client, source, &source.path, token)
        .await?
        .into_iter()];
    let mut directories = 1;

    while let Some(entries) = stack.last_mut() {
        let Some(entry) = entries.next() else {
            stack.pop();
            continue;
        };

        match entry.entry_type {
            EntryType::Dir => {
                let listing = list_directory(client, source, &entry.path, token).await?;
                stack.push(listing.into_iter());
                directories += 1;
            }
            EntryType::File if entry.name.ends_with(&source.suffix) => {
                let Some(url) = entry.download_url.as_deref() else {
                    debug!("No download URL for {}, skipping", entry.path);
                    continue;
                };
                let content = fetch_text(client, url, token).await?;
                documents.push(
                    Document::new(content)
                        .with_metadata("title", title_from_filename(&entry.name, &source.suffix))
                        .with_metadata("url", url),
                );
            }
            _ => {}
        }
    }

    info!(
        "Collected {} documents from {} directories",
        documents.len(),
        directories
    );
    Ok(documents)
}

/// Every entry of one directory, following `Link` pagination
pub async fn list_directory(
    client: &Client,
    source: &TreeSource,
    path: &str,
    token: Option<&str>,
) -> Result<Vec<RemoteEntry>> {
    let mut entries = Vec::new();
    let mut next = Some(source.listing_url(path)?.to_string());

    while let Some(url) = next {
        let response = send_checked(authorized(client, &url, token), &url).await?;
        next = next_page(response.headers());

        let page: Vec<RemoteEntry> = response.json().await.map_err(|source| Error::Decode {
            url: url.clone(),
            source,
        })?;
        debug!("{} entries in {}", page.len(), url);
        entries.extend(page);
    }

    Ok(entries)
}

async fn fetch_text(client: &Client, url: &str, token: Option<&str>) -> Result<String> {
    let response = send_checked(authorized(client, url, token), url).await?;
    response.text().await.map_err(|e| Error::transport(url, e))
}

fn authorized(client: &Client, url: &str, token: Option<&str>) -> reqwest::RequestBuilder {
    let request = client.get(url).header(ACCEPT, "application/vnd.github+json");
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// `getting_started.rst` -> `Getting Started`
pub fn title_from_filename(name: &str, suffix: &str) -> String {
    let stem = name.strip_suffix(suffix).unwrap_or(name);
    title_case(&stem.replace('_', " "))
}

/// Upper-case the first letter of each alphabetic run, lower-case the rest
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
