use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::app::{ProgressEvent, ProgressSink};
use crate::domain::Accession;
use crate::error::SyncError;
use crate::manifest::{self, FieldSet, FileEntry};

pub trait FetchClient: Send + Sync {
    fn fetch(&self, entry: &FileEntry, destination: &Path) -> Result<(), SyncError>;
}

#[derive(Clone)]
pub struct HttpFetchClient {
    client: Client,
}

impl HttpFetchClient {
    pub fn new(transfer_timeout: Option<Duration>) -> Result<Self, SyncError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("ena-sync/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| SyncError::FetchHttp(err.to_string()))?,
        );
        // No timeout unless one was configured; reads span multi-GB files.
        let client = Client::builder()
            .default_headers(headers)
            .timeout(transfer_timeout)
            .build()
            .map_err(|err| SyncError::FetchHttp(err.to_string()))?;
        Ok(Self { client })
    }

    fn normalize_url(url: &str) -> String {
        if let Some(rest) = url.strip_prefix("ftp://") {
            return format!("https://{rest}");
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        // filereport lists bare hosts (ftp.sra.ebi.ac.uk/...)
        format!("https://{url}")
    }
}

impl FetchClient for HttpFetchClient {
    fn fetch(&self, entry: &FileEntry, destination: &Path) -> Result<(), SyncError> {
        let url = Self::normalize_url(&entry.remote_path);
        let mut response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| SyncError::FetchHttp(err.to_string()))?;
        if !response.status().is_success() {
            return Err(SyncError::FetchStatus {
                status: response.status().as_u16(),
                url,
            });
        }

        let parent = destination
            .parent()
            .ok_or_else(|| SyncError::Filesystem("invalid destination path".to_string()))?;
        let mut temp = tempfile::Builder::new()
            .prefix(".ena-sync")
            .tempfile_in(parent)
            .map_err(|err| SyncError::Filesystem(err.to_string()))?;
        io::copy(&mut response, temp.as_file_mut())
            .map_err(|err| SyncError::FetchHttp(err.to_string()))?;
        if destination.exists() {
            fs::remove_file(destination).map_err(|err| SyncError::Filesystem(err.to_string()))?;
        }
        temp.persist(destination)
            .map_err(|err| SyncError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

pub fn worklist_path(dir: &Utf8Path, accession: &Accession) -> Utf8PathBuf {
    dir.join(format!(".{}.worklist.tsv", accession.as_str()))
}

/// Fetch every worklist entry into the working directory on a bounded
/// worker pool. Individual transfer failures are logged and absorbed;
/// the next reconcile pass finds whatever is still missing or corrupt.
pub fn dispatch<F: FetchClient>(
    accession: &Accession,
    worklist: &[FileEntry],
    dir: &Utf8Path,
    client: &F,
    concurrency: usize,
    fields: FieldSet,
    sink: &dyn ProgressSink,
) -> Result<(), SyncError> {
    if worklist.is_empty() {
        return Ok(());
    }

    let artifact = worklist_path(dir, accession);
    let file = File::create(artifact.as_std_path())
        .map_err(|err| SyncError::Filesystem(err.to_string()))?;
    manifest::write_worklist(accession, worklist, fields, file)
        .map_err(|err| SyncError::Filesystem(err.to_string()))?;

    sink.event(ProgressEvent {
        message: format!("phase=Dispatch; fetching {} files", worklist.len()),
        elapsed: None,
    });

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency.max(1))
        .build()
        .map_err(|err| SyncError::Dispatch(err.to_string()))?;
    pool.install(|| {
        worklist.par_iter().for_each(|entry| {
            let destination = dir.join(&entry.filename);
            match client.fetch(entry, destination.as_std_path()) {
                Ok(()) => {
                    sink.event(ProgressEvent {
                        message: format!("phase=Dispatch; fetched {}", entry.filename),
                        elapsed: None,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        file = %entry.filename,
                        error = %err,
                        "transfer failed; next pass will retry"
                    );
                }
            }
        });
    });

    if let Err(err) = fs::remove_file(artifact.as_std_path()) {
        tracing::debug!(error = %err, "could not remove worklist artifact");
    }
    Ok(())
}
