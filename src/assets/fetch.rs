use super::AssetKind;
use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::utils::archive::extract_and_clean;
use crate::utils::http::download_to_file;
use reqwest::Client;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    AlreadyPresent,
    Downloaded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub kind: AssetKind,
    pub path: PathBuf,
    pub status: FetchStatus,
}

/// Make sure one asset is in the cache.
///
/// `filename` replaces the configured remote filename. Nothing touches the
/// network when the resolved target already exists, unless `force` is set.
pub async fn fetch_asset(
    client: &Client,
    config: &CacheConfig,
    kind: AssetKind,
    filename: Option<&str>,
    force: bool,
) -> Result<FetchOutcome> {
    let asset = match filename {
        Some(name) => config.asset(kind).with_filename(name),
        None => config.asset(kind).clone(),
    };

    if asset.local_path.exists() && !force {
        info!("{} already exists at {}", kind, asset.local_path.display());
        return Ok(FetchOutcome {
            kind,
            path: asset.local_path,
            status: FetchStatus::AlreadyPresent,
        });
    }

    config.ensure_root()?;
    download_to_file(client, &asset.url(), &asset.download_path).await?;

    if asset.is_archive() {
        extract_and_clean(&asset.download_path, config.root())?;
        if !asset.local_path.exists() {
            return Err(Error::ArchiveLayout {
                archive: asset.download_path,
                expected: asset.local_path,
            });
        }
    }

    Ok(FetchOutcome {
        kind,
        path: asset.local_path,
        status: FetchStatus::Downloaded,
    })
}

/// Fetch every asset in [`AssetKind::ALL`] order, stopping at the first failure
pub async fn download_all(
    client: &Client,
    config: &CacheConfig,
    force: bool,
) -> Result<Vec<FetchOutcome>> {
    let mut outcomes = Vec::with_capacity(AssetKind::ALL.len());
    for kind in AssetKind::ALL {
        outcomes.push(fetch_asset(client, config, kind, None, force).await?);
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DATA_BASE_URL_ENV, MODEL_BASE_URL_ENV};
    use crate::test_support::{zip_bytes, Reply, TestServer};
    use crate::utils::http::build_client;
    use std::fs;
    use std::path::Path;

    fn config_for(root: &Path, base: &str) -> CacheConfig {
        let base = base.to_owned();
        CacheConfig::from_lookup(root.to_path_buf(), move |key| match key {
            MODEL_BASE_URL_ENV | DATA_BASE_URL_ENV => Some(format!("{}/", base)),
            _ => None,
        })
    }

    fn asset_server() -> TestServer {
        TestServer::start(|url, _| {
            if url.ends_with(".zip") {
                Reply::ok(zip_bytes(&[
                    ("qdrant_data/meta.json", "{\"collections\":{}}"),
                    ("qdrant_data/collection/points.bin", "points"),
                ]))
            } else {
                Reply::ok(format!("payload for {}", url))
            }
        })
    }

    #[tokio::test]
    async fn second_fetch_is_served_from_cache() {
        let server = asset_server();
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), server.base());
        let client = build_client().unwrap();

        let first = fetch_asset(&client, &config, AssetKind::Model, None, false)
            .await
            .unwrap();
        let second = fetch_asset(&client, &config, AssetKind::Model, None, false)
            .await
            .unwrap();

        assert_eq!(first.status, FetchStatus::Downloaded);
        assert_eq!(second.status, FetchStatus::AlreadyPresent);
        assert_eq!(first.path, second.path);
        assert_eq!(server.hit_count(), 1);
        assert_eq!(
            fs::read_to_string(&first.path).unwrap(),
            "payload for /OLMo-7B-Instruct-Q4_K_M.gguf"
        );
    }

    #[tokio::test]
    async fn force_always_downloads() {
        let server = asset_server();
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), server.base());
        let client = build_client().unwrap();
        let path = &config.asset(AssetKind::Abstracts).local_path;
        fs::write(path, "old").unwrap();

        for _ in 0..2 {
            let outcome = fetch_asset(&client, &config, AssetKind::Abstracts, None, true)
                .await
                .unwrap();
            assert_eq!(outcome.status, FetchStatus::Downloaded);
        }

        assert_eq!(server.hit_count(), 2);
        assert_ne!(fs::read_to_string(path).unwrap(), "old");
    }

    #[tokio::test]
    async fn override_is_checked_against_its_own_path() {
        let server = asset_server();
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), server.base());
        let client = build_client().unwrap();
        fs::write(&config.asset(AssetKind::Model).local_path, "default").unwrap();

        let outcome = fetch_asset(&client, &config, AssetKind::Model, Some("tiny.gguf"), false)
            .await
            .unwrap();

        assert_eq!(outcome.status, FetchStatus::Downloaded);
        assert_eq!(outcome.path, dir.path().join("tiny.gguf"));
        assert_eq!(server.hits()[0].url, "/tiny.gguf");

        let again = fetch_asset(&client, &config, AssetKind::Model, Some("tiny.gguf"), false)
            .await
            .unwrap();
        assert_eq!(again.status, FetchStatus::AlreadyPresent);
        assert_eq!(server.hit_count(), 1);
    }

    #[tokio::test]
    async fn vector_index_is_unpacked_and_zip_removed() {
        let server = asset_server();
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), server.base());
        let client = build_client().unwrap();

        let outcome = fetch_asset(&client, &config, AssetKind::VectorIndex, None, false)
            .await
            .unwrap();

        assert_eq!(outcome.path, dir.path().join("qdrant_data"));
        assert!(outcome.path.join("meta.json").is_file());
        assert!(outcome.path.join("collection/points.bin").is_file());
        assert!(!dir.path().join("qdrant_data.zip").exists());

        let again = fetch_asset(&client, &config, AssetKind::VectorIndex, None, false)
            .await
            .unwrap();
        assert_eq!(again.status, FetchStatus::AlreadyPresent);
        assert_eq!(server.hit_count(), 1);
    }

    #[tokio::test]
    async fn archive_without_expected_folder_is_an_error() {
        let server = TestServer::start(|_, _| Reply::ok(zip_bytes(&[("meta.json", "{}")])));
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), server.base());
        let client = build_client().unwrap();

        let err = fetch_asset(&client, &config, AssetKind::VectorIndex, Some("small.zip"), false)
            .await
            .unwrap_err();

        match err {
            Error::ArchiveLayout { archive, expected } => {
                assert_eq!(archive, dir.path().join("small.zip"));
                assert_eq!(expected, dir.path().join("small"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!dir.path().join("small").exists());
        assert!(!dir.path().join("small.zip").exists());
    }

    #[tokio::test]
    async fn download_all_visits_each_asset_once() {
        let server = asset_server();
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&dir.path().join("cache"), server.base());
        let client = build_client().unwrap();

        let outcomes = download_all(&client, &config, false).await.unwrap();
        let kinds: Vec<_> = outcomes.iter().map(|o| o.kind).collect();
        assert_eq!(kinds, AssetKind::ALL);
        assert!(outcomes.iter().all(|o| o.path.exists()));
        assert_eq!(server.hit_count(), 4);

        let rerun = download_all(&client, &config, false).await.unwrap();
        assert!(rerun.iter().all(|o| o.status == FetchStatus::AlreadyPresent));
        assert_eq!(server.hit_count(), 4);
    }

    #[tokio::test]
    async fn missing_remote_file_is_fatal() {
        let server = TestServer::start(|_, _| Reply::status(404, "Entry not found"));
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), server.base());
        let client = build_client().unwrap();

        let err = download_all(&client, &config, false).await.unwrap_err();

        assert!(matches!(err, Error::Status { .. }));
        assert_eq!(server.hit_count(), 1);
        assert!(!config.asset(AssetKind::Model).local_path.exists());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), &format!("http://127.0.0.1:{}", port));
        let client = build_client().unwrap();

        let err = fetch_asset(&client, &config, AssetKind::Documents, None, false)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport { .. }));
    }
}
