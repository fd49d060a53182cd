// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CUPS spooler print backend.
//
// The production path on the kiosk hardware (Raspberry Pi + CUPS): shell out
// to `lp` with the colour mode option. Completion is reported as soon as the
// spooler accepts the job; a non-zero exit fails the job.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{info, instrument, warn};

use druckwerk_core::error::{DruckwerkError, Result};
use druckwerk_core::types::{DocumentRef, JobId, PrintHandle, PrintMode};

use crate::events::{CollaboratorEvent, EventSink};
use crate::traits::PrintBackend;

/// Print backend that submits to the local CUPS spooler via `lp`.
pub struct LpPrintBackend {
    sink: EventSink,
    /// Destination queue (`lp -d`); `None` uses the CUPS default printer.
    printer: Option<String>,
}

impl LpPrintBackend {
    pub fn new(sink: EventSink, printer: Option<String>) -> Self {
        Self { sink, printer }
    }
}

#[async_trait]
impl PrintBackend for LpPrintBackend {
    #[instrument(skip(self, document), fields(%job_id, document = %document, ?mode))]
    async fn submit_print_job(
        &self,
        job_id: JobId,
        document: &DocumentRef,
        mode: PrintMode,
    ) -> Result<PrintHandle> {
        let mut cmd = Command::new("lp");
        if let Some(printer) = &self.printer {
            cmd.arg("-d").arg(printer);
        }
        cmd.arg("-o")
            .arg(format!("ColorMode={}", mode.lp_color_mode()))
            .arg(document.path());

        let output = cmd
            .output()
            .await
            .map_err(|e| DruckwerkError::Print(format!("cannot run lp: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(code = ?output.status.code(), %stderr, "lp rejected the job");
            return Err(DruckwerkError::Print(format!(
                "lp exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let handle = PrintHandle(
            parse_request_id(&stdout).unwrap_or_else(|| format!("lp-{job_id}")),
        );
        info!(%handle, "job accepted by CUPS spooler");

        // The spooler owns the job from here; acceptance is our completion
        // signal.
        self.sink.emit(CollaboratorEvent::PrintFinished {
            job_id,
            success: true,
            detail: format!("accepted by spooler as {handle}"),
        });

        Ok(handle)
    }
}

/// Extract the request id from `lp` output, e.g.
/// `request id is Kiosk-42 (1 file(s))` → `Kiosk-42`.
fn parse_request_id(stdout: &str) -> Option<String> {
    stdout
        .split("request id is ")
        .nth(1)?
        .split_whitespace()
        .next()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_lp_request_id() {
        let out = "request id is Kiosk-42 (1 file(s))\n";
        assert_eq!(parse_request_id(out).as_deref(), Some("Kiosk-42"));
    }

    #[test]
    fn missing_request_id_yields_none() {
        assert_eq!(parse_request_id("lp: something unexpected"), None);
        assert_eq!(parse_request_id(""), None);
    }
}
