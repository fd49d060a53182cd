// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Simulated collaborators for the reference deployment.
//
// No real acquirer or spooler: the payment provider issues a mock QR URL
// after a short delay and delivers its confirmation on a timer; the print
// backend accepts immediately and reports completion on a timer. Both are
// constructed with an `EventSink`, exactly like a real webhook handler
// would be.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use druckwerk_core::config::SimulationConfig;
use druckwerk_core::error::Result;
use druckwerk_core::types::{
    DocumentRef, JobId, Money, PaymentRef, PaymentTicket, PrintHandle, PrintMode,
};

use crate::events::{CollaboratorEvent, EventSink};
use crate::traits::{PaymentProvider, PrintBackend};

/// What the simulated acquirer eventually does with a payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Confirm after the configured delay.
    Confirm,
    /// Decline after the configured delay.
    Decline,
    /// Never respond — exercises the payment deadline.
    Silent,
}

/// Simulated payment provider.
pub struct SimulatedPaymentProvider {
    sink: EventSink,
    issue_delay: Duration,
    confirm_delay: Duration,
    outcome: PaymentOutcome,
}

impl SimulatedPaymentProvider {
    pub fn new(sink: EventSink, simulation: &SimulationConfig) -> Self {
        Self {
            sink,
            issue_delay: Duration::from_millis(simulation.payment_issue_delay_ms),
            confirm_delay: Duration::from_millis(simulation.payment_confirm_delay_ms),
            outcome: PaymentOutcome::Confirm,
        }
    }

    pub fn with_outcome(mut self, outcome: PaymentOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

#[async_trait]
impl PaymentProvider for SimulatedPaymentProvider {
    #[instrument(skip(self), fields(%job_id, %amount))]
    async fn request_payment(&self, job_id: JobId, amount: Money) -> Result<PaymentTicket> {
        // Acquirer round-trip for QR issuance.
        sleep(self.issue_delay).await;

        let payment_ref = PaymentRef::new(format!("mock-{}", Uuid::new_v4()));
        let proof = format!("https://example.com/pay?amount={amount}&orderId={job_id}");
        info!(%payment_ref, "payment handle issued");

        let sink = self.sink.clone();
        let confirm_delay = self.confirm_delay;
        let outcome = self.outcome;
        let delivered_ref = payment_ref.clone();
        tokio::spawn(async move {
            sleep(confirm_delay).await;
            match outcome {
                PaymentOutcome::Confirm => {
                    debug!(%job_id, "simulated acquirer confirms payment");
                    sink.emit(CollaboratorEvent::PaymentConfirmed {
                        job_id,
                        payment_ref: delivered_ref,
                    });
                }
                PaymentOutcome::Decline => {
                    debug!(%job_id, "simulated acquirer declines payment");
                    sink.emit(CollaboratorEvent::PaymentFailed {
                        job_id,
                        payment_ref: delivered_ref,
                        detail: "payment declined by acquirer".into(),
                    });
                }
                PaymentOutcome::Silent => {
                    debug!(%job_id, "simulated acquirer stays silent");
                }
            }
        });

        Ok(PaymentTicket { payment_ref, proof })
    }
}

/// Simulated print backend.
pub struct SimulatedPrintBackend {
    sink: EventSink,
    print_delay: Duration,
    succeed: bool,
}

impl SimulatedPrintBackend {
    pub fn new(sink: EventSink, simulation: &SimulationConfig) -> Self {
        Self {
            sink,
            print_delay: Duration::from_millis(simulation.print_delay_ms),
            succeed: true,
        }
    }

    /// Make every print attempt report failure instead of success.
    pub fn failing(mut self) -> Self {
        self.succeed = false;
        self
    }
}

#[async_trait]
impl PrintBackend for SimulatedPrintBackend {
    #[instrument(skip(self, document), fields(%job_id, document = %document, ?mode))]
    async fn submit_print_job(
        &self,
        job_id: JobId,
        document: &DocumentRef,
        mode: PrintMode,
    ) -> Result<PrintHandle> {
        let _ = mode;
        let handle = PrintHandle(format!("sim-{}", Uuid::new_v4()));
        info!(%handle, "print job accepted by simulated printer");

        let sink = self.sink.clone();
        let print_delay = self.print_delay;
        let succeed = self.succeed;
        tokio::spawn(async move {
            sleep(print_delay).await;
            let detail = if succeed {
                "printed".to_string()
            } else {
                "simulated printer error".to_string()
            };
            debug!(%job_id, success = succeed, "simulated print finished");
            sink.emit(CollaboratorEvent::PrintFinished {
                job_id,
                success: succeed,
                detail,
            });
        });

        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event_channel;

    fn fast_simulation() -> SimulationConfig {
        SimulationConfig {
            payment_issue_delay_ms: 1_000,
            payment_confirm_delay_ms: 8_000,
            print_delay_ms: 2_000,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn payment_ticket_carries_amount_and_order() {
        let (sink, _stream) = event_channel();
        let provider = SimulatedPaymentProvider::new(sink, &fast_simulation());
        let job_id = JobId::new();

        let ticket = provider
            .request_payment(job_id, Money::from_major(30))
            .await
            .expect("request payment");

        assert!(ticket.proof.contains("amount=30.00"));
        assert!(ticket.proof.contains(&job_id.to_string()));
        assert!(ticket.payment_ref.0.starts_with("mock-"));
    }

    #[tokio::test(start_paused = true)]
    async fn confirmation_arrives_after_the_configured_delay() {
        let (sink, mut stream) = event_channel();
        let provider = SimulatedPaymentProvider::new(sink, &fast_simulation());
        let job_id = JobId::new();

        let ticket = provider
            .request_payment(job_id, Money::from_major(10))
            .await
            .expect("request payment");

        match stream.recv().await {
            Some(CollaboratorEvent::PaymentConfirmed {
                job_id: event_job,
                payment_ref,
            }) => {
                assert_eq!(event_job, job_id);
                assert_eq!(payment_ref, ticket.payment_ref);
            }
            other => panic!("expected confirmation, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn declined_payment_reports_failure() {
        let (sink, mut stream) = event_channel();
        let provider = SimulatedPaymentProvider::new(sink, &fast_simulation())
            .with_outcome(PaymentOutcome::Decline);

        provider
            .request_payment(JobId::new(), Money::from_major(10))
            .await
            .expect("request payment");

        match stream.recv().await {
            Some(CollaboratorEvent::PaymentFailed { detail, .. }) => {
                assert!(detail.contains("declined"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn print_completion_is_delivered() {
        let (sink, mut stream) = event_channel();
        let backend = SimulatedPrintBackend::new(sink, &fast_simulation());
        let job_id = JobId::new();

        let handle = backend
            .submit_print_job(
                job_id,
                &DocumentRef::new("/tmp/spool/doc.pdf"),
                PrintMode::Monochrome,
            )
            .await
            .expect("submit");
        assert!(handle.0.starts_with("sim-"));

        match stream.recv().await {
            Some(CollaboratorEvent::PrintFinished {
                job_id: event_job,
                success,
                ..
            }) => {
                assert_eq!(event_job, job_id);
                assert!(success);
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failing_backend_reports_print_failure() {
        let (sink, mut stream) = event_channel();
        let backend = SimulatedPrintBackend::new(sink, &fast_simulation()).failing();

        backend
            .submit_print_job(
                JobId::new(),
                &DocumentRef::new("/tmp/spool/doc.pdf"),
                PrintMode::Color,
            )
            .await
            .expect("submit");

        match stream.recv().await {
            Some(CollaboratorEvent::PrintFinished { success, .. }) => assert!(!success),
            other => panic!("expected completion, got {other:?}"),
        }
    }
}
