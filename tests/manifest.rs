use assert_matches::assert_matches;

use ena_sync::error::SyncError;
use ena_sync::manifest::{FieldSet, parse_manifest};

#[test]
fn paired_record_yields_two_entries_with_paired_digests() {
    let text = "run_accession\tfastq_md5\tfastq_ftp\n\
                SRR1\tmd5a;md5b\tftp://x/SRR1_1.fastq.gz;ftp://x/SRR1_2.fastq.gz\n";
    let set = parse_manifest(text, FieldSet::Fastq).unwrap();

    assert_eq!(set.len(), 2);
    assert_eq!(set.get("SRR1_1.fastq.gz").unwrap().expected_digest, "md5a");
    assert_eq!(set.get("SRR1_2.fastq.gz").unwrap().expected_digest, "md5b");
}

#[test]
fn single_record_yields_one_entry() {
    let text = "run_accession\tfastq_md5\tfastq_ftp\nSRR2\tmd5c\tftp://x/SRR2.fastq.gz\n";
    let set = parse_manifest(text, FieldSet::Fastq).unwrap();

    assert_eq!(set.len(), 1);
    let entry = set.get("SRR2.fastq.gz").unwrap();
    assert_eq!(entry.expected_digest, "md5c");
    assert_eq!(entry.remote_path, "ftp://x/SRR2.fastq.gz");
}

#[test]
fn records_merge_across_runs_keyed_by_filename() {
    let text = "run_accession\tfastq_md5\tfastq_ftp\n\
                SRR1\tmd5a;md5b\tftp://x/SRR1_1.fastq.gz;ftp://x/SRR1_2.fastq.gz\n\
                SRR2\tmd5c\tftp://x/SRR2.fastq.gz\n";
    let set = parse_manifest(text, FieldSet::Fastq).unwrap();
    assert_eq!(set.len(), 3);
}

#[test]
fn malformed_header_rejects_whole_manifest() {
    let err = parse_manifest("oops\nSRR2\tmd5c\tftp://x/SRR2.fastq.gz\n", FieldSet::Fastq)
        .unwrap_err();
    assert_matches!(err, SyncError::MalformedManifest(_));
}

#[test]
fn partial_rows_are_skipped_not_fatal() {
    let text = "run_accession\tfastq_md5\tfastq_ftp\n\
                SRR9\n\
                SRR2\tmd5c\tftp://x/SRR2.fastq.gz\n";
    let set = parse_manifest(text, FieldSet::Fastq).unwrap();
    assert_eq!(set.len(), 1);
}
