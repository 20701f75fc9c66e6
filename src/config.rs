use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

use crate::domain::Accession;
use crate::error::SyncError;
use crate::manifest::FieldSet;

pub const DEFAULT_MAX_PASSES: usize = 2;
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_RETRY_ATTEMPTS: usize = 4;

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub working_directory: Utf8PathBuf,
    pub max_passes: usize,
    pub concurrency: usize,
    /// Per-file transfer timeout in seconds; no timeout when absent.
    pub transfer_timeout: Option<u64>,
    pub retry_attempts: usize,
    pub fields: FieldSet,
}

impl SyncConfig {
    pub fn new(working_directory: Utf8PathBuf) -> Self {
        Self {
            working_directory,
            max_passes: DEFAULT_MAX_PASSES,
            concurrency: DEFAULT_CONCURRENCY,
            transfer_timeout: None,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            fields: FieldSet::Fastq,
        }
    }
}

/// Resolve the accession argument: either a comma-separated list or a
/// path to a text file with one accession per line.
pub fn resolve_accessions(input: &str) -> Result<Vec<Accession>, SyncError> {
    let trimmed = input.trim();
    let path = Utf8Path::new(trimmed);

    let raw: Vec<String> = if path.as_std_path().is_file() {
        fs::read_to_string(path.as_std_path())
            .map_err(|_| SyncError::AccessionListRead(path.to_owned()))?
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    } else {
        trimmed
            .split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    };

    if raw.is_empty() {
        return Err(SyncError::InvalidAccession(input.to_string()));
    }
    raw.iter().map(|value| value.parse()).collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn resolve_single_accession() {
        let accessions = resolve_accessions("SRR1544510").unwrap();
        assert_eq!(accessions.len(), 1);
        assert_eq!(accessions[0].as_str(), "SRR1544510");
    }

    #[test]
    fn resolve_comma_separated_list() {
        let accessions = resolve_accessions("SRR1544510, ERR164407 ,PRJEB1787").unwrap();
        let names: Vec<&str> = accessions.iter().map(|a| a.as_str()).collect();
        assert_eq!(names, vec!["SRR1544510", "ERR164407", "PRJEB1787"]);
    }

    #[test]
    fn resolve_from_file() {
        let temp = tempfile::tempdir().unwrap();
        let list = temp.path().join("accessions.txt");
        fs::write(&list, "SRR1544510\n\nERR164407\n").unwrap();

        let accessions = resolve_accessions(list.to_str().unwrap()).unwrap();
        assert_eq!(accessions.len(), 2);
        assert_eq!(accessions[1].as_str(), "ERR164407");
    }

    #[test]
    fn resolve_rejects_invalid_entry() {
        let err = resolve_accessions("SRR1544510,banana").unwrap_err();
        assert_matches!(err, SyncError::InvalidAccession(_));
    }

    #[test]
    fn resolve_rejects_empty_input() {
        let err = resolve_accessions(" , ").unwrap_err();
        assert_matches!(err, SyncError::InvalidAccession(_));
    }

    #[test]
    fn config_defaults() {
        let config = SyncConfig::new(Utf8PathBuf::from("/data/fastq"));
        assert_eq!(config.max_passes, 2);
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.retry_attempts, 4);
        assert!(config.transfer_timeout.is_none());
        assert_eq!(config.fields, FieldSet::Fastq);
    }
}
