use std::process::ExitCode;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use ena_sync::app::{App, SyncOptions, SyncReport};
use ena_sync::checksum::Md5Hasher;
use ena_sync::config::{self, SyncConfig};
use ena_sync::ena::EnaPortalClient;
use ena_sync::error::SyncError;
use ena_sync::fetch::HttpFetchClient;
use ena_sync::manifest::FieldSet;
use ena_sync::output::{JsonOutput, TextOutput};

#[derive(Parser)]
#[command(name = "ena-sync")]
#[command(about = "Reconcile a local directory of fastq files against ENA manifests")]
#[command(version, author)]
struct Cli {
    /// Accession, comma-separated accession list, or path to a file with
    /// one accession per line
    #[arg(short = 'e', long)]
    accession: String,

    /// Existing directory the files are synchronized into
    #[arg(short = 'd', long)]
    directory: Utf8PathBuf,

    #[arg(long, default_value_t = config::DEFAULT_MAX_PASSES)]
    max_passes: usize,

    #[arg(long, default_value_t = config::DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Per-file transfer timeout in seconds (no timeout when omitted)
    #[arg(long)]
    timeout: Option<u64>,

    #[arg(long, default_value_t = config::DEFAULT_RETRY_ATTEMPTS)]
    retry_attempts: usize,

    #[arg(long, value_enum, default_value_t = FieldSet::Fastq)]
    fields: FieldSet,

    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{report:?}");
            if let Some(err) = report.downcast_ref::<SyncError>() {
                return ExitCode::from(map_exit_code(err));
            }
            ExitCode::from(1)
        }
    }
}

fn map_exit_code(error: &SyncError) -> u8 {
    match error {
        SyncError::InvalidAccession(_)
        | SyncError::AccessionListRead(_)
        | SyncError::MissingDirectory(_) => 2,
        SyncError::EnaHttp(_)
        | SyncError::EnaStatus { .. }
        | SyncError::TransportExhausted { .. }
        | SyncError::FetchHttp(_)
        | SyncError::FetchStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut sync_config = SyncConfig::new(cli.directory);
    sync_config.max_passes = cli.max_passes;
    sync_config.concurrency = cli.concurrency;
    sync_config.transfer_timeout = cli.timeout;
    sync_config.retry_attempts = cli.retry_attempts;
    sync_config.fields = cli.fields;

    let accessions = config::resolve_accessions(&cli.accession)?;

    let manifest_source = EnaPortalClient::new(sync_config.fields, sync_config.retry_attempts)?;
    let fetch_client =
        HttpFetchClient::new(sync_config.transfer_timeout.map(Duration::from_secs))?;
    let options = SyncOptions {
        max_passes: sync_config.max_passes,
        concurrency: sync_config.concurrency,
        fields: sync_config.fields,
    };
    let app = App::new(manifest_source, fetch_client, Md5Hasher, options);

    let report: SyncReport = if cli.json {
        let report = app.synchronize(&accessions, &sync_config.working_directory, &JsonOutput)?;
        JsonOutput::print_report(&report).into_diagnostic()?;
        report
    } else {
        let report = app.synchronize(&accessions, &sync_config.working_directory, &TextOutput)?;
        TextOutput::print_report(&report).into_diagnostic()?;
        report
    };

    if report.fully_synchronized() {
        Ok(ExitCode::SUCCESS)
    } else {
        // residual or failed accessions must be visible to the caller
        Ok(ExitCode::from(4))
    }
}
