// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Status projection — the externally visible view of a job.
//
// Never exposes the documentRef or any filesystem path: the staged file is
// an internal ownership boundary between the orchestrator and its
// collaborators.

use serde::Serialize;

use druckwerk_core::types::{Job, JobId, JobState, Money, PaymentRef};

/// External status payload for one job.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatusView {
    pub job_id: JobId,
    pub state: JobState,
    pub original_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_ref: Option<PaymentRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_proof: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

/// Project a job record onto its external view.
pub fn project(job: &Job) -> JobStatusView {
    JobStatusView {
        job_id: job.id,
        state: job.state,
        original_name: job.original_name.clone(),
        page_count: job.page_count,
        // The price field is only meaningful once a page count exists.
        price: job.page_count.map(|_| job.price),
        payment_ref: job.payment_ref.clone(),
        payment_proof: job.payment_proof.clone(),
        failure_reason: job.failure_reason.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use druckwerk_core::types::{DocumentFormat, DocumentRef, PaymentRef};

    fn priced_job() -> Job {
        let mut job = Job::new(
            DocumentRef::new("/var/spool/druckwerk/1234_report.pdf"),
            "report.pdf",
            DocumentFormat::Pdf,
        );
        job.page_count = Some(3);
        job.price = Money::from_major(30);
        job.enter(JobState::Priced);
        job
    }

    #[test]
    fn projection_carries_quote_fields() {
        let view = project(&priced_job());
        assert_eq!(view.state, JobState::Priced);
        assert_eq!(view.page_count, Some(3));
        assert_eq!(view.price, Some(Money::from_major(30)));
        assert!(view.payment_ref.is_none());
        assert!(view.failure_reason.is_none());
    }

    #[test]
    fn price_is_absent_before_resolution() {
        let job = Job::new(
            DocumentRef::new("/var/spool/druckwerk/1234_x.pdf"),
            "x.pdf",
            DocumentFormat::Pdf,
        );
        let view = project(&job);
        assert!(view.page_count.is_none());
        assert!(view.price.is_none());
    }

    #[test]
    fn serialised_view_never_leaks_the_spool_path() {
        let mut job = priced_job();
        job.payment_ref = Some(PaymentRef::new("mock-1"));
        job.payment_proof = Some("https://example.com/pay?amount=30.00".into());

        let json = serde_json::to_string(&project(&job)).expect("serialize");
        assert!(!json.contains("/var/spool"));
        assert!(!json.contains("1234_report.pdf"));
        assert!(json.contains("report.pdf"));
        assert!(json.contains("\"30.00\""));
    }

    #[test]
    fn failure_reason_appears_in_failed_view() {
        let mut job = priced_job();
        job.failure_reason = Some("payment confirmation timed out".into());
        job.enter(JobState::Failed);

        let view = project(&job);
        assert_eq!(view.state, JobState::Failed);
        assert_eq!(
            view.failure_reason.as_deref(),
            Some("payment confirmation timed out")
        );
    }
}
