use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("writing {path} failed: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Downloads a remote asset to a local file
#[async_trait]
pub trait AssetFetch {
    /// Single attempt. On failure no file is left at `dest`.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

/// Configuration for the image download client
#[derive(Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub enable_gzip: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: USER_AGENT.to_string(),
            enable_gzip: true,
        }
    }
}

/// Streams assets over HTTP(S) straight into files
pub struct HttpAssetFetcher {
    client: Client,
}

impl HttpAssetFetcher {
    /// Create a new fetcher with default configuration
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new fetcher with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self, reqwest::Error> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .gzip(config.enable_gzip)
            .brotli(config.enable_gzip)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client })
    }

    async fn stream_to(&self, url: &str, dest: &Path, file: &mut File) -> Result<(), FetchError> {
        let io_err = |source| FetchError::Io {
            path: dest.display().to_string(),
            source,
        };
        let transport_err = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let mut response = self.client.get(url).send().await.map_err(transport_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        while let Some(chunk) = response.chunk().await.map_err(transport_err)? {
            file.write_all(&chunk).await.map_err(io_err)?;
        }

        file.flush().await.map_err(io_err)?;
        file.sync_all().await.map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl AssetFetch for HttpAssetFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let io_err = |source| FetchError::Io {
            path: dest.display().to_string(),
            source,
        };

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let mut file = File::create(dest).await.map_err(io_err)?;
        let result = self.stream_to(url, dest, &mut file).await;
        drop(file);

        if result.is_err() {
            // No partial files
            if let Err(e) = tokio::fs::remove_file(dest).await {
                log::warn!("Could not remove partial file {}: {}", dest.display(), e);
            }
        }
        result
    }
}
