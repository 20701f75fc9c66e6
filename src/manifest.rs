use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::Accession;
use crate::error::SyncError;

/// Which ENA filereport columns the manifest is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FieldSet {
    Fastq,
    Submitted,
}

impl FieldSet {
    pub fn columns(self) -> &'static str {
        match self {
            FieldSet::Fastq => "run_accession,fastq_md5,fastq_ftp",
            FieldSet::Submitted => "run_accession,submitted_md5,submitted_ftp",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            FieldSet::Fastq => "run_accession\tfastq_md5\tfastq_ftp",
            FieldSet::Submitted => "run_accession\tsubmitted_md5\tsubmitted_ftp",
        }
    }
}

impl fmt::Display for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSet::Fastq => write!(f, "fastq"),
            FieldSet::Submitted => write!(f, "submitted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub filename: String,
    pub remote_path: String,
    pub expected_digest: String,
}

impl FileEntry {
    fn from_remote(remote_path: &str, digest: &str) -> Option<Self> {
        let remote_path = remote_path.trim();
        let digest = digest.trim();
        let filename = remote_path.rsplit('/').next().unwrap_or_default();
        if filename.is_empty() || digest.is_empty() {
            return None;
        }
        Some(Self {
            filename: filename.to_string(),
            remote_path: remote_path.to_string(),
            expected_digest: digest.to_string(),
        })
    }
}

/// Expected on-disk state for one accession, keyed by filename.
#[derive(Debug, Default, Clone)]
pub struct ExpectedFileSet {
    entries: BTreeMap<String, FileEntry>,
}

impl ExpectedFileSet {
    pub fn from_entries(entries: impl IntoIterator<Item = FileEntry>) -> Self {
        let mut set = Self::default();
        for entry in entries {
            set.insert(entry);
        }
        set
    }

    pub fn insert(&mut self, entry: FileEntry) {
        self.entries.insert(entry.filename.clone(), entry);
    }

    pub fn get(&self, filename: &str) -> Option<&FileEntry> {
        self.entries.get(filename)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.values()
    }
}

/// Parse raw filereport text into an [`ExpectedFileSet`].
///
/// Rows that do not extract positionally are skipped with a warning; the
/// upstream warehouse occasionally emits partial rows and a partial row
/// must not abort the whole manifest.
pub fn parse_manifest(text: &str, fields: FieldSet) -> Result<ExpectedFileSet, SyncError> {
    let mut lines = text.lines();
    let header = lines.next().unwrap_or_default().trim_end();
    if !header.starts_with(fields.header()) {
        return Err(SyncError::MalformedManifest(header.to_string()));
    }

    let mut set = ExpectedFileSet::default();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        match parse_row(line) {
            Some(entries) => {
                for entry in entries {
                    set.insert(entry);
                }
            }
            None => {
                tracing::warn!(row = line, "skipping malformed manifest row");
            }
        }
    }
    Ok(set)
}

fn parse_row(line: &str) -> Option<Vec<FileEntry>> {
    let mut tokens = line.split_whitespace();
    let _run_accession = tokens.next()?;
    let digest_column = tokens.next()?;
    let path_column = tokens.next()?;

    if path_column.contains(';') {
        let paths: Vec<&str> = path_column.split(';').collect();
        let digests: Vec<&str> = digest_column.split(';').collect();
        if paths.len() != 2 || digests.len() != 2 {
            return None;
        }
        let forward = FileEntry::from_remote(paths[0], digests[0])?;
        let reverse = FileEntry::from_remote(paths[1], digests[1])?;
        Some(vec![forward, reverse])
    } else {
        Some(vec![FileEntry::from_remote(path_column, digest_column)?])
    }
}

/// Write a worklist in the manifest wire format, the handoff artifact the
/// dispatcher leaves next to the files it is fetching.
pub fn write_worklist<W: Write>(
    accession: &Accession,
    entries: &[FileEntry],
    fields: FieldSet,
    mut out: W,
) -> io::Result<()> {
    writeln!(out, "{}", fields.header())?;
    for entry in entries {
        writeln!(
            out,
            "{}\t{}\t{}",
            accession, entry.expected_digest, entry.remote_path
        )?;
    }
    Ok(())
}
