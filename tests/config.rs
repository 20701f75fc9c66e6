use assert_matches::assert_matches;

use ena_sync::config::resolve_accessions;
use ena_sync::error::SyncError;

#[test]
fn resolve_comma_separated_list() {
    let accessions = resolve_accessions("SRR1544510,ERR164407").unwrap();
    assert_eq!(accessions.len(), 2);
    assert_eq!(accessions[0].as_str(), "SRR1544510");
    assert_eq!(accessions[1].as_str(), "ERR164407");
}

#[test]
fn resolve_accession_file() {
    let temp = tempfile::tempdir().unwrap();
    let list = temp.path().join("accessions.txt");
    std::fs::write(&list, "PRJEB1787\nSRR1544510\n").unwrap();

    let accessions = resolve_accessions(list.to_str().unwrap()).unwrap();
    assert_eq!(accessions.len(), 2);
    assert_eq!(accessions[0].as_str(), "PRJEB1787");
}

#[test]
fn resolve_rejects_malformed_accession() {
    let err = resolve_accessions("SRR1544510,oops").unwrap_err();
    assert_matches!(err, SyncError::InvalidAccession(_));
}
