// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Druckwerk — single-station print kiosk
//
// Entry point. Initialises logging, stages the document into the spool
// directory, wires the orchestrator to its collaborators, and drives one job
// through its whole lifecycle, reporting state transitions on stdout.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};
use uuid::Uuid;

use druckwerk_bridge::cups::LpPrintBackend;
use druckwerk_bridge::events::event_channel;
use druckwerk_bridge::simulated::{
    PaymentOutcome, SimulatedPaymentProvider, SimulatedPrintBackend,
};
use druckwerk_bridge::traits::{PaymentProvider, PrintBackend};
use druckwerk_core::config::KioskConfig;
use druckwerk_core::error::{DruckwerkError, Result};
use druckwerk_core::human_errors::humanize_error;
use druckwerk_core::types::{DocumentRef, JobState, PrintMode};
use druckwerk_document::cleanup::CleanupManager;
use druckwerk_document::resolver::StructuralPageResolver;
use druckwerk_kiosk::JobOrchestrator;

const USAGE: &str = "\
usage: druckwerk [options] <document>

options:
  --color            print in colour (default: monochrome)
  --cups             submit to the local CUPS spooler instead of simulating
  --printer <name>   CUPS destination queue (implies --cups)
  --config <path>    JSON configuration file
  --decline          simulated acquirer declines the payment
  --silent           simulated acquirer never responds (deadline demo)
  -h, --help         show this help";

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
struct StationArgs {
    document: PathBuf,
    mode: PrintMode,
    cups: bool,
    printer: Option<String>,
    config: Option<PathBuf>,
    outcome: PaymentOutcome,
}

impl StationArgs {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut document = None;
        let mut mode = PrintMode::Monochrome;
        let mut cups = false;
        let mut printer = None;
        let mut config = None;
        let mut outcome = PaymentOutcome::Confirm;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--color" => mode = PrintMode::Color,
                "--cups" => cups = true,
                "--printer" => {
                    let name = args.next().ok_or_else(|| {
                        DruckwerkError::MalformedRequest("--printer needs a queue name".into())
                    })?;
                    printer = Some(name);
                    cups = true;
                }
                "--config" => {
                    let path = args.next().ok_or_else(|| {
                        DruckwerkError::MalformedRequest("--config needs a file path".into())
                    })?;
                    config = Some(PathBuf::from(path));
                }
                "--decline" => outcome = PaymentOutcome::Decline,
                "--silent" => outcome = PaymentOutcome::Silent,
                "-h" | "--help" => {
                    return Err(DruckwerkError::MalformedRequest("help".into()));
                }
                other if other.starts_with('-') => {
                    return Err(DruckwerkError::MalformedRequest(format!(
                        "unknown option {other}"
                    )));
                }
                _ => {
                    if document.replace(PathBuf::from(&arg)).is_some() {
                        return Err(DruckwerkError::MalformedRequest(
                            "only one document per job".into(),
                        ));
                    }
                }
            }
        }

        let document = document.ok_or_else(|| {
            DruckwerkError::MalformedRequest("no document given".into())
        })?;
        Ok(Self {
            document,
            mode,
            cups,
            printer,
            config,
            outcome,
        })
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = match StationArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{USAGE}");
            if !matches!(&e, DruckwerkError::MalformedRequest(m) if m == "help") {
                eprintln!("\nerror: {e}");
                return ExitCode::FAILURE;
            }
            return ExitCode::SUCCESS;
        }
    };

    tracing::info!("Druckwerk station starting");

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "cannot start async runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(JobState::Completed) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            let human = humanize_error(&e);
            eprintln!("{}", human.message);
            eprintln!("{}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

/// Drive one document through the whole lifecycle; returns its terminal state.
async fn run(args: StationArgs) -> Result<JobState> {
    let config = match &args.config {
        Some(path) => KioskConfig::load(path)?,
        None => KioskConfig::default(),
    };

    let original_name = args
        .document
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            DruckwerkError::MalformedRequest("document path has no usable file name".into())
        })?
        .to_string();

    let document = stage_into_spool(&args.document, &original_name, &config).await?;
    info!(document = %document, "document staged");

    // Collaborators deliver their confirmations over one shared channel.
    let (sink, events) = event_channel();
    let payment: Arc<dyn PaymentProvider> = Arc::new(
        SimulatedPaymentProvider::new(sink.clone(), &config.simulation).with_outcome(args.outcome),
    );
    let printer: Arc<dyn PrintBackend> = if args.cups {
        Arc::new(LpPrintBackend::new(sink.clone(), args.printer.clone()))
    } else {
        Arc::new(SimulatedPrintBackend::new(sink.clone(), &config.simulation))
    };
    drop(sink);

    let orchestrator = JobOrchestrator::new(
        Arc::new(StructuralPageResolver),
        payment,
        printer,
        Arc::new(CleanupManager::new()),
        config.clone(),
    );
    let pump = orchestrator.clone().run_event_pump(events);

    let receipt = orchestrator.submit_upload(document.clone(), &original_name).await?;
    println!(
        "{}: {} page(s), {} {}",
        original_name, receipt.page_count, receipt.price, config.tariff.currency
    );

    if args.mode == PrintMode::Color {
        let price = orchestrator.set_print_mode(receipt.job_id, PrintMode::Color)?;
        println!("colour print: {} {}", price, config.tariff.currency);
    }

    let ticket = orchestrator.initiate_payment(receipt.job_id, &document).await?;
    println!("scan to pay: {}", ticket.proof);

    // Poll until the job reaches a terminal state; the watchdogs guarantee it
    // always does.
    let mut last_state = JobState::AwaitingPayment;
    let mut poll = tokio::time::interval(Duration::from_millis(500));
    let terminal = loop {
        poll.tick().await;
        let view = orchestrator.status(receipt.job_id)?;
        if view.state != last_state {
            println!("-> {}", view.state);
            last_state = view.state;
        }
        if view.state.is_terminal() {
            if let Some(reason) = &view.failure_reason {
                eprintln!("failed: {reason}");
            }
            break view.state;
        }
    };

    // The collaborators keep their sink clones for the life of the
    // orchestrator, so the pump never ends on its own.
    debug!("job terminal, stopping the event pump");
    pump.abort();
    Ok(terminal)
}

/// Copy the source document into the spool directory under a unique name, so
/// two files with the same name can never collide.
async fn stage_into_spool(
    source: &PathBuf,
    original_name: &str,
    config: &KioskConfig,
) -> Result<DocumentRef> {
    tokio::fs::create_dir_all(&config.spool_dir).await?;
    let staged = config
        .spool_dir
        .join(format!("{}_{original_name}", Uuid::new_v4()));
    tokio::fs::copy(source, &staged).await?;
    Ok(DocumentRef::new(staged))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<StationArgs> {
        StationArgs::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn document_alone_uses_defaults() {
        let args = parse(&["report.pdf"]).expect("parse");
        assert_eq!(args.document, PathBuf::from("report.pdf"));
        assert_eq!(args.mode, PrintMode::Monochrome);
        assert!(!args.cups);
        assert_eq!(args.outcome, PaymentOutcome::Confirm);
    }

    #[test]
    fn printer_flag_implies_cups() {
        let args = parse(&["--printer", "Kiosk", "report.pdf"]).expect("parse");
        assert!(args.cups);
        assert_eq!(args.printer.as_deref(), Some("Kiosk"));
    }

    #[test]
    fn color_and_outcome_flags() {
        let args = parse(&["--color", "--decline", "thesis.pdf"]).expect("parse");
        assert_eq!(args.mode, PrintMode::Color);
        assert_eq!(args.outcome, PaymentOutcome::Decline);
    }

    #[test]
    fn missing_document_is_rejected() {
        assert!(matches!(
            parse(&["--color"]),
            Err(DruckwerkError::MalformedRequest(_))
        ));
    }

    #[test]
    fn two_documents_are_rejected() {
        assert!(matches!(
            parse(&["a.pdf", "b.pdf"]),
            Err(DruckwerkError::MalformedRequest(_))
        ));
    }

    #[test]
    fn dangling_value_flags_are_rejected() {
        assert!(parse(&["--printer"]).is_err());
        assert!(parse(&["--config"]).is_err());
    }
}
