use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SyncError;

static ACCESSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(PRJ[EDN][A-Z]\d+|SAM[EDN][A-Z]?\d+|[EDS]R[PRSXZ]\d+)$").unwrap()
});

/// An ENA/SRA accession: a run, experiment, study, sample or project id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Accession(String);

impl Accession {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Accession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Accession {
    type Err = SyncError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        if !ACCESSION_RE.is_match(&normalized) {
            return Err(SyncError::InvalidAccession(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_run_accession() {
        let acc: Accession = "SRR1544510".parse().unwrap();
        assert_eq!(acc.as_str(), "SRR1544510");
    }

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let acc: Accession = " err164407 ".parse().unwrap();
        assert_eq!(acc.as_str(), "ERR164407");
    }

    #[test]
    fn parse_project_accession() {
        let acc: Accession = "PRJEB1787".parse().unwrap();
        assert_eq!(acc.as_str(), "PRJEB1787");
    }

    #[test]
    fn parse_study_and_sample_accessions() {
        assert!("ERP001736".parse::<Accession>().is_ok());
        assert!("SAMEA2590836".parse::<Accession>().is_ok());
        assert!("DRX001234".parse::<Accession>().is_ok());
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = "not-an-accession".parse::<Accession>().unwrap_err();
        assert_matches!(err, SyncError::InvalidAccession(_));
    }

    #[test]
    fn parse_rejects_empty() {
        let err = "  ".parse::<Accession>().unwrap_err();
        assert_matches!(err, SyncError::InvalidAccession(_));
    }
}
