// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Event intake channel.
//
// Collaborator confirmations arrive from a different flow of control than
// the request that armed them (a timer task here, a webhook handler in a
// real deployment). They are carried into the orchestrator's event pump
// over an unbounded mpsc channel; delivery may be duplicated or stale, the
// orchestrator's idempotency discipline absorbs that.

use tokio::sync::mpsc;
use tracing::warn;

use druckwerk_core::types::{JobId, PaymentRef};

/// An inbound confirmation from an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorEvent {
    /// The acquirer confirmed the payment attempt.
    PaymentConfirmed {
        job_id: JobId,
        payment_ref: PaymentRef,
    },
    /// The acquirer declined or aborted the payment attempt.
    PaymentFailed {
        job_id: JobId,
        payment_ref: PaymentRef,
        detail: String,
    },
    /// The printer finished (or gave up on) the submitted document.
    PrintFinished {
        job_id: JobId,
        success: bool,
        detail: String,
    },
}

/// Sending half, handed to collaborators. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EventSink(mpsc::UnboundedSender<CollaboratorEvent>);

impl EventSink {
    /// Deliver an event to the orchestrator's pump.
    ///
    /// A closed channel (pump shut down) drops the event with a warning —
    /// there is nobody left to care about it.
    pub fn emit(&self, event: CollaboratorEvent) {
        if self.0.send(event).is_err() {
            warn!("event channel closed, dropping collaborator event");
        }
    }
}

/// Receiving half, consumed by the orchestrator's event pump.
#[derive(Debug)]
pub struct EventStream(mpsc::UnboundedReceiver<CollaboratorEvent>);

impl EventStream {
    /// Wait for the next event. `None` once all sinks are dropped.
    pub async fn recv(&mut self) -> Option<CollaboratorEvent> {
        self.0.recv().await
    }
}

/// Create a connected sink/stream pair.
pub fn event_channel() -> (EventSink, EventStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSink(tx), EventStream(rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_arrive_in_order() {
        let (sink, mut stream) = event_channel();
        let job_id = JobId::new();

        sink.emit(CollaboratorEvent::PaymentConfirmed {
            job_id,
            payment_ref: PaymentRef::new("pay-1"),
        });
        sink.emit(CollaboratorEvent::PrintFinished {
            job_id,
            success: true,
            detail: "done".into(),
        });

        assert!(matches!(
            stream.recv().await,
            Some(CollaboratorEvent::PaymentConfirmed { .. })
        ));
        assert!(matches!(
            stream.recv().await,
            Some(CollaboratorEvent::PrintFinished { success: true, .. })
        ));
    }

    #[tokio::test]
    async fn emit_after_pump_shutdown_does_not_panic() {
        let (sink, stream) = event_channel();
        drop(stream);

        sink.emit(CollaboratorEvent::PaymentFailed {
            job_id: JobId::new(),
            payment_ref: PaymentRef::new("pay-1"),
            detail: "declined".into(),
        });
    }

    #[tokio::test]
    async fn stream_ends_when_all_sinks_drop() {
        let (sink, mut stream) = event_channel();
        drop(sink);
        assert!(stream.recv().await.is_none());
    }
}
