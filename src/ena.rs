use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::domain::Accession;
use crate::error::SyncError;
use crate::manifest::FieldSet;

// The warehouse reports its own backend timeouts as a 200 with this body.
const TIMEOUT_SENTINEL: &str = "Timed out";
const BASE_DELAY_MS: u64 = 500;

pub trait ManifestSource: Send + Sync {
    fn fetch_manifest(&self, accession: &Accession) -> Result<String, SyncError>;
}

#[derive(Clone)]
pub struct EnaPortalClient {
    client: Client,
    base_url: String,
    fields: FieldSet,
    retry_attempts: usize,
}

enum RequestFailure {
    Transient(String),
    Fatal(SyncError),
}

impl EnaPortalClient {
    pub fn new(fields: FieldSet, retry_attempts: usize) -> Result<Self, SyncError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("ena-sync/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| SyncError::EnaHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| SyncError::EnaHttp(err.to_string()))?;

        Ok(Self {
            client,
            base_url: "https://www.ebi.ac.uk/ena/portal/api/filereport".to_string(),
            fields,
            retry_attempts: retry_attempts.max(1),
        })
    }

    fn filereport_url(&self, accession: &Accession) -> String {
        format!(
            "{}?accession={}&result=read_run&fields={}&download=text",
            self.base_url,
            accession,
            self.fields.columns()
        )
    }

    fn request_once(&self, url: &str) -> Result<String, RequestFailure> {
        let response = self.client.get(url).send().map_err(|err| {
            if is_retryable_error(&err) {
                RequestFailure::Transient(err.to_string())
            } else {
                RequestFailure::Fatal(SyncError::EnaHttp(err.to_string()))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let status = status.as_u16();
            if is_retryable_status(status) {
                return Err(RequestFailure::Transient(format!("status {status}")));
            }
            let message = response
                .text()
                .unwrap_or_else(|_| "ENA request failed".to_string());
            return Err(RequestFailure::Fatal(SyncError::EnaStatus {
                status,
                message,
            }));
        }

        let text = response
            .text()
            .map_err(|err| RequestFailure::Fatal(SyncError::EnaHttp(err.to_string())))?;
        if text.starts_with(TIMEOUT_SENTINEL) {
            return Err(RequestFailure::Transient(
                "warehouse reported a timeout".to_string(),
            ));
        }
        Ok(text)
    }
}

impl ManifestSource for EnaPortalClient {
    fn fetch_manifest(&self, accession: &Accession) -> Result<String, SyncError> {
        let url = self.filereport_url(accession);
        let mut attempt = 0usize;
        loop {
            attempt += 1;
            match self.request_once(&url) {
                Ok(text) => return Ok(text),
                Err(RequestFailure::Fatal(err)) => return Err(err),
                Err(RequestFailure::Transient(reason)) => {
                    if attempt >= self.retry_attempts {
                        return Err(SyncError::TransportExhausted { attempts: attempt });
                    }
                    let delay = BASE_DELAY_MS << (attempt - 1);
                    tracing::debug!(
                        accession = %accession,
                        attempt,
                        delay_ms = delay,
                        reason,
                        "transient manifest failure, backing off"
                    );
                    thread::sleep(Duration::from_millis(delay));
                }
            }
        }
    }
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}
