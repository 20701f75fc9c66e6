use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SyncError {
    #[error("invalid ENA accession: {0}")]
    InvalidAccession(String),

    #[error("failed to read accession list at {0}")]
    AccessionListRead(Utf8PathBuf),

    #[error("working directory does not exist: {0}")]
    MissingDirectory(Utf8PathBuf),

    #[error("malformed manifest header: {0}")]
    MalformedManifest(String),

    #[error("unreadable file {path}: {message}")]
    UnreadableFile { path: String, message: String },

    #[error("ENA request failed: {0}")]
    EnaHttp(String),

    #[error("ENA returned status {status}: {message}")]
    EnaStatus { status: u16, message: String },

    #[error("ENA manifest request gave up after {attempts} attempts")]
    TransportExhausted { attempts: usize },

    #[error("transfer failed: {0}")]
    FetchHttp(String),

    #[error("transfer returned status {status} for {url}")]
    FetchStatus { status: u16, url: String },

    #[error("fetch dispatch failed: {0}")]
    Dispatch(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
