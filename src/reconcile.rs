use std::collections::BTreeSet;
use std::fs;

use camino::Utf8Path;
use serde::Serialize;

use crate::app::{ProgressEvent, ProgressSink};
use crate::checksum::ContentHasher;
use crate::local;
use crate::manifest::{ExpectedFileSet, FileEntry};

/// Disjoint classification of every expected filename after one pass.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub correct: BTreeSet<String>,
    pub missing: BTreeSet<String>,
    pub corrupt: BTreeSet<String>,
}

impl Classification {
    pub fn is_converged(&self) -> bool {
        self.missing.is_empty() && self.corrupt.is_empty()
    }

    pub fn outstanding(&self) -> usize {
        self.missing.len() + self.corrupt.len()
    }

    /// The fetch worklist: missing and corrupt entries, in filename order.
    pub fn worklist(&self, expected: &ExpectedFileSet) -> Vec<FileEntry> {
        self.missing
            .iter()
            .chain(self.corrupt.iter())
            .filter_map(|name| expected.get(name).cloned())
            .collect()
    }
}

/// Classify every expected file against the working directory.
///
/// Corrupt files are deleted as part of classification so the next
/// dispatch pass can rewrite them; this is the only place the engine
/// removes files. Reapplying to an already-correct directory performs
/// zero deletions and returns the same result.
pub fn reconcile(
    expected: &ExpectedFileSet,
    dir: &Utf8Path,
    hasher: &impl ContentHasher,
    sink: &dyn ProgressSink,
) -> Classification {
    let mut result = Classification::default();
    let total = expected.len();

    for (index, entry) in expected.iter().enumerate() {
        sink.event(ProgressEvent {
            message: format!(
                "phase=Verify; processing {}/{total} {}",
                index + 1,
                entry.filename
            ),
            elapsed: None,
        });

        let status = match local::inspect(dir, &entry.filename, hasher) {
            Ok(status) => status,
            Err(err) => {
                // An unreadable file cannot be trusted; let a fetch retry it.
                tracing::warn!(
                    file = %entry.filename,
                    error = %err,
                    "unreadable local file, scheduling re-fetch"
                );
                result.missing.insert(entry.filename.clone());
                continue;
            }
        };

        if !status.exists {
            result.missing.insert(entry.filename.clone());
        } else if status.digest.as_deref() == Some(entry.expected_digest.as_str()) {
            result.correct.insert(entry.filename.clone());
        } else {
            tracing::warn!(
                file = %entry.filename,
                expected = %entry.expected_digest,
                actual = status.digest.as_deref().unwrap_or_default(),
                "removing file with mismatched digest"
            );
            let path = dir.join(&entry.filename);
            if let Err(err) = fs::remove_file(path.as_std_path()) {
                tracing::warn!(file = %entry.filename, error = %err, "failed to delete corrupt file");
            }
            result.corrupt.insert(entry.filename.clone());
        }
    }

    result
}
