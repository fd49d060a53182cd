// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collaborator trait definitions.
//
// Outbound calls only. Inbound confirmations (payment confirmed/failed,
// print finished) are delivered separately as `CollaboratorEvent`s or by
// invoking the orchestrator's callback operations directly.

use async_trait::async_trait;

use druckwerk_core::error::Result;
use druckwerk_core::types::{DocumentRef, JobId, Money, PaymentTicket, PrintHandle, PrintMode};

/// Issues payment handles for quoted amounts.
///
/// `request_payment` may take noticeable time (acquirer round-trip); callers
/// must not hold the job slot's lock across it.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Request a payment handle for `amount`, returning the opaque payment
    /// reference and a displayable proof (QR payload/URL) for the kiosk
    /// screen.
    async fn request_payment(&self, job_id: JobId, amount: Money) -> Result<PaymentTicket>;
}

/// Submits documents to the physical printer.
#[async_trait]
pub trait PrintBackend: Send + Sync {
    /// Hand the staged document to the printer. Returns a handle once the
    /// submission is accepted; completion arrives later as an event
    /// addressed by `job_id`.
    async fn submit_print_job(
        &self,
        job_id: JobId,
        document: &DocumentRef,
        mode: PrintMode,
    ) -> Result<PrintHandle>;
}
