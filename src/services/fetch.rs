use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {0:?}")]
    InvalidUrl(String),

    #[error("URL {0:?} does not name a file")]
    NoFileName(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server answered {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("could not write download: {0}")]
    Io(#[from] io::Error),
}

/// Downloads a remote file into a directory and returns the written path.
pub trait RemoteFetcher {
    fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, FetchError>;
}

pub struct HttpFetcher {
    client: Client,
    chunk_size: usize,
}

impl HttpFetcher {
    pub fn new(timeout: Option<Duration>, chunk_size: usize) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            chunk_size: chunk_size.max(1),
        })
    }
}

impl RemoteFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, FetchError> {
        let parsed = parse_url(url)?;
        let name = file_name_from_url(&parsed)
            .ok_or_else(|| FetchError::NoFileName(url.to_string()))?;

        let mut resp = self.client.get(parsed).send().map_err(|e| {
            tracing::warn!(%url, error = %e, "download request failed");
            FetchError::Request(e)
        })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "download rejected by server");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        fs::create_dir_all(dest_dir)?;
        let path = dest_dir.join(&name);

        match stream_to_file(&mut resp, &path, self.chunk_size) {
            Ok(bytes) => {
                tracing::debug!(%url, path = %path.display(), bytes, "download complete");
                Ok(path)
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "download interrupted");
                let _ = fs::remove_file(&path);
                Err(FetchError::Io(e))
            }
        }
    }
}

pub fn parse_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url.trim()).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(FetchError::InvalidUrl(url.to_string())),
    }
}

/// Last non-empty path segment of the URL.
pub fn file_name_from_url(url: &Url) -> Option<String> {
    url.path_segments()?
        .last()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Copies `reader` into `path` in `chunk_size` reads, stopping at the first
/// empty read. Returns the number of bytes written.
pub fn stream_to_file<R: Read>(reader: &mut R, path: &Path, chunk_size: usize) -> io::Result<u64> {
    let mut out = BufWriter::new(File::create(path)?);
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        out.write_all(&buf[..n])?;
        total += n as u64;
    }

    out.flush()?;
    Ok(total)
}
