use crate::error::{Error, Result};
use futures::stream::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{HeaderMap, LINK};
use reqwest::{Client, RequestBuilder, Response};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Get standard user agent string
pub fn get_user_agent() -> &'static str {
    "TutorialFetch"
}

/// Client shared by every request in one run
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(get_user_agent())
        .build()
        .map_err(Error::Client)
}

/// Send a prepared request, turning any non-success status into an error
pub async fn send_checked(request: RequestBuilder, url: &str) -> Result<Response> {
    let response = request.send().await.map_err(|e| Error::transport(url, e))?;
    let status = response.status();
    debug!("GET {} -> {}", url, status);

    if !status.is_success() {
        return Err(Error::Status {
            url: url.to_owned(),
            status,
        });
    }
    Ok(response)
}

/// Stream `url` into `path`, replacing whatever is there.
///
/// The body lands in `<path>.part` first and is renamed into place once
/// complete. Returns the number of bytes written.
pub async fn download_to_file(client: &Client, url: &str, path: &Path) -> Result<u64> {
    info!("Downloading {}", url);
    let response = send_checked(client.get(url), url).await?;

    let partial = partial_path(path);
    let pb = progress_bar(response.content_length());

    let written = match write_body(response, url, &partial, &pb).await {
        Ok(written) => written,
        Err(e) => {
            pb.abandon();
            discard_partial(&partial).await;
            return Err(e);
        }
    };

    if let Err(e) = tokio::fs::rename(&partial, path).await {
        pb.abandon();
        discard_partial(&partial).await;
        return Err(Error::io(path, e));
    }
    pb.finish_and_clear();

    info!("Successfully downloaded: {} ({} bytes)", path.display(), written);
    Ok(written)
}

async fn write_body(
    response: Response,
    url: &str,
    partial: &Path,
    pb: &ProgressBar,
) -> Result<u64> {
    let mut file = tokio::fs::File::create(partial)
        .await
        .map_err(|e| Error::io(partial, e))?;

    let mut written = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::transport(url, e))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| Error::io(partial, e))?;
        written += chunk.len() as u64;
        pb.inc(chunk.len() as u64);
    }

    file.flush().await.map_err(|e| Error::io(partial, e))?;
    Ok(written)
}

async fn discard_partial(partial: &Path) {
    if let Err(e) = tokio::fs::remove_file(partial).await {
        debug!("Could not remove {}: {}", partial.display(), e);
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

fn progress_bar(total: Option<u64>) -> ProgressBar {
    match total {
        Some(len) => {
            let pb = ProgressBar::new(len);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        }
        None => ProgressBar::new_spinner(),
    }
}

/// Target of a `Link: <...>; rel="next"` header, if the response has one
pub fn next_page(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;

    link.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        let is_next = params
            .split(';')
            .any(|param| matches!(param.trim(), "rel=\"next\"" | "rel=next"));
        is_next.then(|| {
            target
                .trim()
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_owned()
        })
    })
}
