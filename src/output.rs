use std::io::{self, Write};

use serde::Serialize;

use crate::app::{AccessionOutcome, ProgressEvent, ProgressSink, SyncReport};

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_report(report: &SyncReport) -> io::Result<()> {
        Self::print_json(report)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_report(report: &SyncReport) -> io::Result<()> {
        let mut stdout = io::stdout();
        for outcome in &report.accessions {
            match outcome {
                AccessionOutcome::Synchronized { report } => {
                    writeln!(
                        stdout,
                        "{}: {} files synchronized",
                        report.accession,
                        report.correct.len()
                    )?;
                }
                AccessionOutcome::ResidualFailures { report } => {
                    writeln!(
                        stdout,
                        "{}: {} synchronized, {} still missing after {} passes: {}",
                        report.accession,
                        report.correct.len(),
                        report.residual_missing.len(),
                        report.passes,
                        report.residual_missing.join(", ")
                    )?;
                }
                AccessionOutcome::Failed { accession, error } => {
                    writeln!(stdout, "{accession}: failed ({error})")?;
                }
            }
        }
        Ok(())
    }
}

impl ProgressSink for TextOutput {
    fn event(&self, event: ProgressEvent) {
        eprintln!("{}", event.message);
    }
}
