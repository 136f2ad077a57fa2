use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod assets;
mod config;
mod documents;
mod error;
mod github;
mod llama;
mod utils;

#[cfg(test)]
mod test_support;

use assets::fetch::{download_all, fetch_asset, FetchStatus};
use assets::AssetKind;
use config::{CacheConfig, CACHE_DIR_ENV};
use github::{
    TreeSource, ASTROPY_BRANCH, ASTROPY_DOCS_PATH, ASTROPY_REPO, GITHUB_API_URL, RST_SUFFIX,
};
use utils::http::build_client;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResponseKind {
    /// create_chat_completion output
    Chat,
    /// Plain text completion output
    Text,
}

/// Fetch and prepare the data used by the LLM tutorials
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Cache directory [default: ~/.cache/ssec_tutorials]
    #[arg(long, global = true, env = CACHE_DIR_ENV)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download tutorial assets into the cache
    Download {
        /// Asset to fetch (all of them when omitted)
        #[arg(value_enum)]
        asset: Option<AssetKind>,

        /// Remote filename to fetch instead of the configured one
        #[arg(short, long, requires = "asset")]
        file: Option<String>,

        /// Download even if the asset is already cached
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Show where every asset is cached
    Paths,
    /// Collect documentation pages from a GitHub repository into a JSONL file
    Walk {
        /// Repository as owner/name
        #[arg(long, default_value = ASTROPY_REPO)]
        repo: String,

        /// Branch or tag to read
        #[arg(long, default_value = ASTROPY_BRANCH)]
        branch: String,

        /// Directory to start from
        #[arg(long, default_value = ASTROPY_DOCS_PATH)]
        path: String,

        /// Only files ending with this suffix become documents
        #[arg(long, default_value = RST_SUFFIX)]
        suffix: String,

        /// GitHub token sent as a bearer credential
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// GitHub API root
        #[arg(long, default_value = GITHUB_API_URL)]
        api_url: String,

        /// Where to write the documents
        #[arg(short, long)]
        output: PathBuf,
    },
    /// List the records stored in a JSONL document file
    Inspect {
        /// JSONL file to read
        path: PathBuf,
    },
    /// Print the output contained in a saved llama.cpp completion response
    ParseResponse {
        /// Shape of the response
        #[arg(short, long, value_enum, default_value_t = ResponseKind::Chat)]
        kind: ResponseKind,

        /// JSON file holding the response
        path: PathBuf,
    },
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();
    let args = Args::parse();
    let config = CacheConfig::from_env(args.cache_dir)?;

    match args.command {
        Commands::Download { asset, file, force } => {
            let client = build_client()?;
            let outcomes = match asset {
                Some(kind) => vec![fetch_asset(&client, &config, kind, file.as_deref(), force)
                    .await
                    .with_context(|| format!("failed to fetch {}", kind))?],
                None => download_all(&client, &config, force)
                    .await
                    .context("failed to download tutorial data")?,
            };

            println!("\nTutorial assets:");
            for outcome in &outcomes {
                let note = match outcome.status {
                    FetchStatus::AlreadyPresent => "already cached",
                    FetchStatus::Downloaded => "downloaded",
                };
                println!(
                    "  - {:<13} {} ({})",
                    outcome.kind.name(),
                    outcome.path.display(),
                    note
                );
            }
        }
        Commands::Paths => {
            println!("Cache: {}", config.root().display());
            for kind in AssetKind::ALL {
                let asset = config.asset(kind);
                let mark = if asset.local_path.exists() { "cached" } else { "missing" };
                println!(
                    "  - {:<13} {} ({})",
                    kind.name(),
                    asset.local_path.display(),
                    mark
                );
            }
            println!("Collection: {}", config.collection_name());
        }
        Commands::Walk {
            repo,
            branch,
            path,
            suffix,
            token,
            api_url,
            output,
        } => {
            let client = build_client()?;
            let source = TreeSource::new(&repo, &branch, &path)
                .with_api_url(&api_url)
                .with_suffix(&suffix);

            let docs = github::walk(&client, &source, token.as_deref())
                .await
                .with_context(|| format!("failed to walk {}/{}", repo, path))?;
            let count = documents::save_documents(&docs, &output)?;

            println!("Saved {} documents to {}", count, output.display());
        }
        Commands::Inspect { path } => {
            let docs = documents::load_documents(&path)?;

            println!("{} documents in {}", docs.len(), path.display());
            for doc in &docs {
                println!(
                    "  - {} ({} chars)",
                    doc.title().unwrap_or("(untitled)"),
                    doc.page_content.chars().count()
                );
            }
        }
        Commands::ParseResponse { kind, path } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let response: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not JSON", path.display()))?;

            match kind {
                ResponseKind::Chat => {
                    let message = llama::parse_chat_completion(&response)?;
                    println!("[{}] {}", message.role, message.content);
                }
                ResponseKind::Text => println!("{}", llama::parse_text_completion(&response)?),
            }
        }
    }

    Ok(())
}
