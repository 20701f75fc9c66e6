use std::collections::BTreeSet;
use std::time::Duration;

use camino::Utf8Path;
use serde::Serialize;

use crate::checksum::ContentHasher;
use crate::config;
use crate::domain::Accession;
use crate::ena::ManifestSource;
use crate::error::SyncError;
use crate::fetch::{self, FetchClient};
use crate::manifest::{self, ExpectedFileSet, FieldSet};
use crate::reconcile;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub max_passes: usize,
    pub concurrency: usize,
    pub fields: FieldSet,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            max_passes: config::DEFAULT_MAX_PASSES,
            concurrency: config::DEFAULT_CONCURRENCY,
            fields: FieldSet::Fastq,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessionReport {
    pub accession: String,
    pub expected: usize,
    pub correct: Vec<String>,
    pub residual_missing: Vec<String>,
    pub passes: usize,
    pub completed_at: String,
}

impl AccessionReport {
    pub fn is_converged(&self) -> bool {
        self.residual_missing.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AccessionOutcome {
    Synchronized {
        #[serde(flatten)]
        report: AccessionReport,
    },
    ResidualFailures {
        #[serde(flatten)]
        report: AccessionReport,
    },
    Failed {
        accession: String,
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub accessions: Vec<AccessionOutcome>,
}

impl SyncReport {
    pub fn fully_synchronized(&self) -> bool {
        self.accessions
            .iter()
            .all(|outcome| matches!(outcome, AccessionOutcome::Synchronized { .. }))
    }
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink: Send + Sync {
    fn event(&self, event: ProgressEvent);
}

#[derive(Clone)]
pub struct App<M: ManifestSource, F: FetchClient, H: ContentHasher> {
    manifest_source: M,
    fetch_client: F,
    hasher: H,
    options: SyncOptions,
}

impl<M: ManifestSource, F: FetchClient, H: ContentHasher> App<M, F, H> {
    pub fn new(manifest_source: M, fetch_client: F, hasher: H, options: SyncOptions) -> Self {
        Self {
            manifest_source,
            fetch_client,
            hasher,
            options,
        }
    }

    /// Synchronize a batch of accessions against one working directory.
    /// Each accession runs its own reconcile/fetch controller; a failing
    /// accession is recorded and the batch continues.
    pub fn synchronize(
        &self,
        accessions: &[Accession],
        dir: &Utf8Path,
        sink: &dyn ProgressSink,
    ) -> Result<SyncReport, SyncError> {
        if !dir.as_std_path().is_dir() {
            return Err(SyncError::MissingDirectory(dir.to_owned()));
        }

        let mut outcomes = Vec::with_capacity(accessions.len());
        for accession in accessions {
            match self.synchronize_accession(accession, dir, sink) {
                Ok(report) if report.is_converged() => {
                    outcomes.push(AccessionOutcome::Synchronized { report });
                }
                Ok(report) => {
                    tracing::warn!(
                        accession = %accession,
                        residual = report.residual_missing.len(),
                        "pass budget exhausted with files still outstanding"
                    );
                    outcomes.push(AccessionOutcome::ResidualFailures { report });
                }
                Err(err) => {
                    tracing::warn!(accession = %accession, error = %err, "accession failed");
                    outcomes.push(AccessionOutcome::Failed {
                        accession: accession.to_string(),
                        error: err.to_string(),
                    });
                }
            }
        }
        Ok(SyncReport {
            accessions: outcomes,
        })
    }

    /// One accession through the controller: fetch manifest, then loop
    /// reconcile -> dispatch -> re-verify until converged or the pass
    /// budget runs out. Passes after the first verify against a synthetic
    /// expected set built from the previous worklist, so the manifest is
    /// fetched exactly once.
    pub fn synchronize_accession(
        &self,
        accession: &Accession,
        dir: &Utf8Path,
        sink: &dyn ProgressSink,
    ) -> Result<AccessionReport, SyncError> {
        sink.event(ProgressEvent {
            message: format!("phase=Manifest; fetching manifest for {accession}"),
            elapsed: None,
        });
        let text = self.manifest_source.fetch_manifest(accession)?;
        let remote = manifest::parse_manifest(&text, self.options.fields)?;
        tracing::info!(accession = %accession, files = remote.len(), "fetched manifest");
        sink.event(ProgressEvent {
            message: format!("phase=Manifest; {} expected files", remote.len()),
            elapsed: None,
        });

        let expected_total = remote.len();
        let max_passes = self.options.max_passes.max(1);
        let mut correct: BTreeSet<String> = BTreeSet::new();
        let mut expected = remote;
        let mut residual = Vec::new();
        let mut passes = 0usize;

        loop {
            passes += 1;
            sink.event(ProgressEvent {
                message: format!("phase=Reconcile; pass {passes}/{max_passes}"),
                elapsed: None,
            });
            let classification = reconcile::reconcile(&expected, dir, &self.hasher, sink);
            correct.extend(classification.correct.iter().cloned());

            let worklist = classification.worklist(&expected);
            if worklist.is_empty() {
                break;
            }
            if passes >= max_passes {
                tracing::warn!(
                    accession = %accession,
                    outstanding = worklist.len(),
                    "pass budget exhausted"
                );
                residual = worklist.into_iter().map(|entry| entry.filename).collect();
                break;
            }

            fetch::dispatch(
                accession,
                &worklist,
                dir,
                &self.fetch_client,
                self.options.concurrency,
                self.options.fields,
                sink,
            )?;
            expected = ExpectedFileSet::from_entries(worklist);
        }

        sink.event(ProgressEvent {
            message: format!(
                "phase=Done; {} correct, {} residual",
                correct.len(),
                residual.len()
            ),
            elapsed: None,
        });
        Ok(AccessionReport {
            accession: accession.to_string(),
            expected: expected_total,
            correct: correct.into_iter().collect(),
            residual_missing: residual,
            passes,
            completed_at: iso_timestamp(),
        })
    }
}

fn iso_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
