// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job lifecycle orchestrator.
//
// Owns the state machine (uploaded → priced → awaiting-payment → printing →
// completed/failed), enforces single-slot admission, and reconciles the
// asynchronous payment and print confirmations against it. All transitions
// are applied atomically under the slot's lock via the store's closures; the
// lock is never held across a collaborator call. Stale or duplicate
// collaborator events are no-ops by design, so at-most-once delivery
// violations cannot corrupt the state.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use druckwerk_bridge::events::{CollaboratorEvent, EventStream};
use druckwerk_bridge::traits::{PaymentProvider, PrintBackend};
use druckwerk_core::config::KioskConfig;
use druckwerk_core::error::{DruckwerkError, Result};
use druckwerk_core::pricing;
use druckwerk_core::types::{
    DocumentFormat, DocumentRef, Job, JobId, JobState, Money, PaymentRef, PaymentTicket, PrintMode,
};
use druckwerk_document::cleanup::CleanupManager;
use druckwerk_document::resolver::PageCountResolver;

use crate::status::{self, JobStatusView};
use crate::store::JobStore;

/// What the user sees immediately after a successful upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReceipt {
    pub job_id: JobId,
    pub page_count: u32,
    pub price: Money,
}

/// The kiosk's lifecycle core. One instance per station.
pub struct JobOrchestrator {
    store: JobStore,
    resolver: Arc<dyn PageCountResolver>,
    payment: Arc<dyn PaymentProvider>,
    printer: Arc<dyn PrintBackend>,
    cleanup: Arc<CleanupManager>,
    config: KioskConfig,
}

impl JobOrchestrator {
    pub fn new(
        resolver: Arc<dyn PageCountResolver>,
        payment: Arc<dyn PaymentProvider>,
        printer: Arc<dyn PrintBackend>,
        cleanup: Arc<CleanupManager>,
        config: KioskConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            store: JobStore::new(),
            resolver,
            payment,
            printer,
            cleanup,
            config,
        })
    }

    // -- Upload ---------------------------------------------------------------

    /// Admit a staged document, resolve its page count, and quote a price.
    ///
    /// Rejects without creating a job when the format is unrecognised or the
    /// slot is occupied. A resolution failure or a zero page count creates
    /// the job, fails it immediately, and runs cleanup.
    #[instrument(skip(self, document), fields(name = declared_name))]
    pub async fn submit_upload(
        &self,
        document: DocumentRef,
        declared_name: &str,
    ) -> Result<UploadReceipt> {
        let format = DocumentFormat::from_name(declared_name);
        if format == DocumentFormat::Unsupported {
            // No job exists; remove the stray staged file so the spool
            // directory does not accumulate rejects.
            if let Err(e) = self.cleanup.remove(&document).await {
                warn!(error = %e, "could not remove rejected upload");
            }
            return Err(DruckwerkError::UnsupportedFormat(declared_name.into()));
        }

        let job = Job::new(document.clone(), declared_name, format);
        let job_id = job.id;
        if let Err(e) = self.store.admit(job) {
            if let Err(remove_err) = self.cleanup.remove(&document).await {
                warn!(error = %remove_err, "could not remove upload rejected by busy slot");
            }
            return Err(e);
        }
        info!(%job_id, ?format, "job admitted");

        // Resolution happens outside the slot lock; status reads stay live.
        match self.resolver.resolve(&document, format).await {
            Ok(0) => {
                let reason = "document contains no printable pages";
                self.fail_job(job_id, reason).await;
                Err(DruckwerkError::Resolution(reason.into()))
            }
            Ok(page_count) => {
                let price = self.store.update(job_id, |job| {
                    job.page_count = Some(page_count);
                    job.price = pricing::quote(page_count, job.print_mode, &self.config.tariff);
                    job.enter(JobState::Priced);
                    Ok(job.price)
                })?;
                info!(%job_id, page_count, %price, "job priced");
                Ok(UploadReceipt {
                    job_id,
                    page_count,
                    price,
                })
            }
            Err(e) => {
                self.fail_job(job_id, &format!("page count resolution failed: {e}"))
                    .await;
                Err(DruckwerkError::Resolution(e.to_string()))
            }
        }
    }

    // -- Quote adjustment -----------------------------------------------------

    /// Switch the print mode and re-quote. Legal only while `Priced` and
    /// before payment has been initiated — from that point the quoted amount
    /// handed to the payment collaborator must never be invalidated.
    pub fn set_print_mode(&self, job_id: JobId, mode: PrintMode) -> Result<Money> {
        let price = self.store.update(job_id, |job| {
            if job.state != JobState::Priced || job.payment_claimed {
                return Err(DruckwerkError::InvalidState {
                    operation: "set print mode".into(),
                    state: job.state,
                });
            }
            let page_count = job.page_count.ok_or_else(|| {
                DruckwerkError::Internal("priced job has no page count".into())
            })?;
            job.print_mode = mode;
            job.price = pricing::quote(page_count, mode, &self.config.tariff);
            Ok(job.price)
        })?;
        info!(%job_id, ?mode, %price, "print mode changed, price requoted");
        Ok(price)
    }

    // -- Payment --------------------------------------------------------------

    /// Initiate payment for the quoted amount.
    ///
    /// The caller proves it is talking about the document the kiosk actually
    /// has queued by echoing its `DocumentRef`; a mismatch is a stale client
    /// and is rejected. On success the job enters `AwaitingPayment` with the
    /// issued payment reference and the confirmation deadline armed.
    #[instrument(skip(self, expected_document), fields(%job_id))]
    pub async fn initiate_payment(
        self: &Arc<Self>,
        job_id: JobId,
        expected_document: &DocumentRef,
    ) -> Result<PaymentTicket> {
        // Claim the job under the lock; mode and price are frozen from here.
        let amount = self.store.update(job_id, |job| {
            if job.state != JobState::Priced || job.payment_claimed {
                return Err(DruckwerkError::InvalidState {
                    operation: "initiate payment".into(),
                    state: job.state,
                });
            }
            if job.document_ref != *expected_document {
                return Err(DruckwerkError::StaleReference(
                    "document reference does not match the queued job".into(),
                ));
            }
            job.payment_claimed = true;
            Ok(job.price)
        })?;

        // Acquirer round-trip without the lock.
        match self.payment.request_payment(job_id, amount).await {
            Ok(ticket) => {
                self.store.update(job_id, |job| {
                    job.payment_ref = Some(ticket.payment_ref.clone());
                    job.payment_proof = Some(ticket.proof.clone());
                    job.enter(JobState::AwaitingPayment);
                    Ok(())
                })?;
                info!(%job_id, payment_ref = %ticket.payment_ref, "awaiting payment");
                self.arm_payment_deadline(job_id, ticket.payment_ref.clone());
                Ok(ticket)
            }
            Err(e) => {
                self.fail_job(job_id, &format!("payment handle request failed: {e}"))
                    .await;
                Err(DruckwerkError::Payment(e.to_string()))
            }
        }
    }

    /// Payment confirmed by the acquirer. Idempotent: a duplicate, a
    /// mismatched payment reference, or a job no longer awaiting payment is
    /// ignored.
    #[instrument(skip(self, payment_ref), fields(%job_id))]
    pub async fn on_payment_confirmed(self: &Arc<Self>, job_id: JobId, payment_ref: &PaymentRef) {
        let claimed = self.store.apply_if(job_id, |job| {
            if job.state != JobState::AwaitingPayment
                || job.payment_ref.as_ref() != Some(payment_ref)
            {
                return None;
            }
            job.enter(JobState::Printing);
            Some((job.document_ref.clone(), job.print_mode))
        });
        let Some((document, mode)) = claimed else {
            debug!(%job_id, "stale or duplicate payment confirmation ignored");
            return;
        };
        info!(%job_id, "payment confirmed, submitting to printer");

        match self.printer.submit_print_job(job_id, &document, mode).await {
            Ok(handle) => {
                self.store.apply_if(job_id, |job| {
                    if job.state != JobState::Printing {
                        return None;
                    }
                    job.print_handle = Some(handle.clone());
                    Some(())
                });
                self.arm_print_deadline(job_id);
            }
            Err(e) => {
                self.fail_job(job_id, &format!("print submission failed: {e}"))
                    .await;
            }
        }
    }

    /// Payment declined or aborted by the acquirer. Same staleness
    /// discipline as confirmation.
    #[instrument(skip(self, payment_ref), fields(%job_id))]
    pub async fn on_payment_failed(&self, job_id: JobId, payment_ref: &PaymentRef, detail: &str) {
        let matched = self.store.apply_if(job_id, |job| {
            (job.state == JobState::AwaitingPayment
                && job.payment_ref.as_ref() == Some(payment_ref))
            .then_some(())
        });
        if matched.is_none() {
            debug!(%job_id, "stale or duplicate payment failure ignored");
            return;
        }
        self.fail_job(job_id, &format!("payment failed: {detail}"))
            .await;
    }

    // -- Printing -------------------------------------------------------------

    /// Print completion (or failure) reported by the print collaborator.
    /// Ignored unless the job is currently `Printing`.
    #[instrument(skip(self), fields(%job_id, success))]
    pub async fn on_print_finished(&self, job_id: JobId, success: bool, detail: &str) {
        let matched = self
            .store
            .apply_if(job_id, |job| (job.state == JobState::Printing).then_some(()));
        if matched.is_none() {
            debug!(%job_id, "stale or duplicate print completion ignored");
            return;
        }
        if success {
            self.complete_job(job_id).await;
        } else {
            self.fail_job(job_id, &format!("print failed: {detail}"))
                .await;
        }
    }

    // -- Queries --------------------------------------------------------------

    /// Read-only status projection; never mutates state.
    pub fn status(&self, job_id: JobId) -> Result<JobStatusView> {
        self.store.read(job_id, status::project)
    }

    // -- Event pump -----------------------------------------------------------

    /// Drive collaborator events into the callbacks. Runs until every
    /// `EventSink` is dropped.
    pub fn run_event_pump(self: Arc<Self>, mut events: EventStream) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    CollaboratorEvent::PaymentConfirmed {
                        job_id,
                        payment_ref,
                    } => self.on_payment_confirmed(job_id, &payment_ref).await,
                    CollaboratorEvent::PaymentFailed {
                        job_id,
                        payment_ref,
                        detail,
                    } => self.on_payment_failed(job_id, &payment_ref, &detail).await,
                    CollaboratorEvent::PrintFinished {
                        job_id,
                        success,
                        detail,
                    } => self.on_print_finished(job_id, success, &detail).await,
                }
            }
            debug!("event channel closed, pump exiting");
        })
    }

    // -- Terminal transitions -------------------------------------------------

    async fn complete_job(&self, job_id: JobId) {
        let transitioned = self.store.apply_if(job_id, |job| {
            if job.state.is_terminal() {
                return None;
            }
            job.enter(JobState::Completed);
            Some(())
        });
        if transitioned.is_some() {
            info!(%job_id, "job completed");
            self.run_cleanup(job_id).await;
        }
    }

    /// Move the job to `Failed` with a human-readable reason and run
    /// cleanup. A job already in a terminal state is left alone, which makes
    /// racing failure paths (deadline vs. late event) harmless.
    async fn fail_job(&self, job_id: JobId, reason: &str) {
        let transitioned = self.store.apply_if(job_id, |job| {
            if job.state.is_terminal() {
                return None;
            }
            job.failure_reason = Some(reason.to_string());
            job.enter(JobState::Failed);
            Some(())
        });
        if transitioned.is_some() {
            warn!(%job_id, reason, "job failed");
            self.run_cleanup(job_id).await;
        }
    }

    /// Remove the backing document exactly once per job: the removal is
    /// claimed under the slot lock before the filesystem work starts.
    async fn run_cleanup(&self, job_id: JobId) {
        let document = self.store.apply_if(job_id, |job| {
            if job.cleanup_done {
                return None;
            }
            job.cleanup_done = true;
            Some(job.document_ref.clone())
        });
        if let Some(document) = document {
            if let Err(e) = self.cleanup.remove(&document).await {
                warn!(%job_id, error = %e, "document cleanup failed");
            }
        }
    }

    // -- Deadlines ------------------------------------------------------------

    /// Fail the job if the acquirer has not confirmed this payment attempt
    /// before the configured deadline.
    fn arm_payment_deadline(self: &Arc<Self>, job_id: JobId, payment_ref: PaymentRef) {
        let orchestrator = Arc::clone(self);
        let deadline = self.config.payment_deadline();
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            let expired = orchestrator.store.apply_if(job_id, |job| {
                (job.state == JobState::AwaitingPayment
                    && job.payment_ref.as_ref() == Some(&payment_ref))
                .then_some(())
            });
            if expired.is_some() {
                orchestrator
                    .fail_job(job_id, "payment confirmation timed out")
                    .await;
            }
        });
    }

    /// Fail the job if the printer has not reported completion before the
    /// configured deadline.
    fn arm_print_deadline(self: &Arc<Self>, job_id: JobId) {
        let orchestrator = Arc::clone(self);
        let deadline = self.config.print_deadline();
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            let expired = orchestrator
                .store
                .apply_if(job_id, |job| (job.state == JobState::Printing).then_some(()));
            if expired.is_some() {
                orchestrator
                    .fail_job(job_id, "print completion timed out")
                    .await;
            }
        });
    }
}
