use assert_matches::assert_matches;

use ena_sync::domain::Accession;
use ena_sync::error::SyncError;

#[test]
fn parse_run_accessions() {
    for value in ["SRR1544510", "ERR164407", "DRR000001"] {
        let acc: Accession = value.parse().unwrap();
        assert_eq!(acc.as_str(), value);
    }
}

#[test]
fn parse_project_and_study_accessions() {
    assert!("PRJEB1787".parse::<Accession>().is_ok());
    assert!("PRJNA257197".parse::<Accession>().is_ok());
    assert!("SRP045416".parse::<Accession>().is_ok());
}

#[test]
fn parse_lowercases_are_normalized() {
    let acc: Accession = "srr1544510".parse().unwrap();
    assert_eq!(acc.as_str(), "SRR1544510");
}

#[test]
fn parse_invalid_accession() {
    let err = "SRR".parse::<Accession>().unwrap_err();
    assert_matches!(err, SyncError::InvalidAccession(_));

    let err = "12345".parse::<Accession>().unwrap_err();
    assert_matches!(err, SyncError::InvalidAccession(_));
}
