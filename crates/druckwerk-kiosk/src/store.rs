// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-slot job store.
//
// An arena of capacity one: zero or one job record behind an explicit
// admission check. Every mutation is a closure applied under the slot's
// lock, so a transition is read-checked-and-applied atomically and never
// computed from stale state. The lock is only ever held for the closure
// itself, never across I/O.
//
// "Clearing" the slot on terminal+cleanup means opening it for admission,
// not erasing the record: the terminal job stays queryable until the next
// upload replaces it.

use std::sync::Mutex;

use druckwerk_core::error::{DruckwerkError, Result};
use druckwerk_core::types::{Job, JobId};

/// Holds at most one active job.
#[derive(Debug, Default)]
pub struct JobStore {
    slot: Mutex<Option<Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a new job into the slot.
    ///
    /// The slot is free when it is empty or holds a terminal job whose
    /// cleanup has completed; otherwise the admission is rejected and the
    /// caller's job is returned untouched inside the error path.
    pub fn admit(&self, job: Job) -> Result<()> {
        let mut slot = self.slot.lock().expect("job slot lock poisoned");
        match slot.as_ref() {
            Some(existing) if !existing.state.is_terminal() || !existing.cleanup_done => {
                Err(DruckwerkError::SlotOccupied)
            }
            _ => {
                *slot = Some(job);
                Ok(())
            }
        }
    }

    /// Read from the job with the given id.
    pub fn read<T>(&self, job_id: JobId, f: impl FnOnce(&Job) -> T) -> Result<T> {
        let slot = self.slot.lock().expect("job slot lock poisoned");
        match slot.as_ref() {
            Some(job) if job.id == job_id => Ok(f(job)),
            _ => Err(DruckwerkError::UnknownJob(job_id.to_string())),
        }
    }

    /// Apply a fallible mutation to the job with the given id.
    ///
    /// The closure runs under the slot's lock; if it returns an error the
    /// job is left exactly as the closure left it, so closures must check
    /// their guards before mutating.
    pub fn update<T>(&self, job_id: JobId, f: impl FnOnce(&mut Job) -> Result<T>) -> Result<T> {
        let mut slot = self.slot.lock().expect("job slot lock poisoned");
        match slot.as_mut() {
            Some(job) if job.id == job_id => f(job),
            _ => Err(DruckwerkError::UnknownJob(job_id.to_string())),
        }
    }

    /// Apply a conditional mutation: the closure returns `None` to decline
    /// (job missing, wrong state, stale token), leaving the job untouched.
    ///
    /// This is the staleness-tolerant primitive used by collaborator
    /// callbacks, where a declined event is a no-op rather than an error.
    pub fn apply_if<T>(&self, job_id: JobId, f: impl FnOnce(&mut Job) -> Option<T>) -> Option<T> {
        let mut slot = self.slot.lock().expect("job slot lock poisoned");
        match slot.as_mut() {
            Some(job) if job.id == job_id => f(job),
            _ => None,
        }
    }

    /// Snapshot of the current job, if any.
    pub fn current(&self) -> Option<Job> {
        self.slot.lock().expect("job slot lock poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use druckwerk_core::types::{DocumentFormat, DocumentRef, JobState};

    fn test_job(name: &str) -> Job {
        Job::new(
            DocumentRef::new(format!("/tmp/spool/{name}")),
            name,
            DocumentFormat::Pdf,
        )
    }

    #[test]
    fn admits_into_an_empty_slot() {
        let store = JobStore::new();
        store.admit(test_job("a.pdf")).expect("admit");
        assert!(store.current().is_some());
    }

    #[test]
    fn rejects_while_a_job_is_in_flight() {
        let store = JobStore::new();
        store.admit(test_job("a.pdf")).expect("admit first");

        let result = store.admit(test_job("b.pdf"));
        assert!(matches!(result, Err(DruckwerkError::SlotOccupied)));
        assert_eq!(store.current().expect("job").original_name, "a.pdf");
    }

    #[test]
    fn rejects_over_a_terminal_job_whose_cleanup_is_pending() {
        let store = JobStore::new();
        let job = test_job("a.pdf");
        let id = job.id;
        store.admit(job).expect("admit");

        store
            .update(id, |job| {
                job.enter(JobState::Failed);
                Ok(())
            })
            .expect("fail job");

        // Terminal but not cleaned — still occupies the slot.
        assert!(matches!(
            store.admit(test_job("b.pdf")),
            Err(DruckwerkError::SlotOccupied)
        ));
    }

    #[test]
    fn admits_over_a_terminal_cleaned_job() {
        let store = JobStore::new();
        let job = test_job("a.pdf");
        let id = job.id;
        store.admit(job).expect("admit");

        store
            .update(id, |job| {
                job.enter(JobState::Completed);
                job.cleanup_done = true;
                Ok(())
            })
            .expect("complete job");

        store.admit(test_job("b.pdf")).expect("admit replacement");
        assert_eq!(store.current().expect("job").original_name, "b.pdf");
    }

    #[test]
    fn terminal_record_stays_queryable_until_replaced() {
        let store = JobStore::new();
        let job = test_job("a.pdf");
        let id = job.id;
        store.admit(job).expect("admit");

        store
            .update(id, |job| {
                job.failure_reason = Some("payment confirmation timed out".into());
                job.enter(JobState::Failed);
                job.cleanup_done = true;
                Ok(())
            })
            .expect("fail job");

        let reason = store
            .read(id, |job| job.failure_reason.clone())
            .expect("read");
        assert_eq!(reason.as_deref(), Some("payment confirmation timed out"));
    }

    #[test]
    fn unknown_id_is_rejected() {
        let store = JobStore::new();
        store.admit(test_job("a.pdf")).expect("admit");

        let other = JobId::new();
        assert!(matches!(
            store.read(other, |job| job.state),
            Err(DruckwerkError::UnknownJob(_))
        ));
        assert!(matches!(
            store.update(other, |_| Ok(())),
            Err(DruckwerkError::UnknownJob(_))
        ));
    }

    #[test]
    fn apply_if_declines_without_mutating() {
        let store = JobStore::new();
        let job = test_job("a.pdf");
        let id = job.id;
        store.admit(job).expect("admit");

        // Decline: wrong state guard.
        let applied = store.apply_if(id, |job| {
            if job.state == JobState::Printing {
                job.enter(JobState::Completed);
                Some(())
            } else {
                None
            }
        });
        assert!(applied.is_none());
        assert_eq!(store.current().expect("job").state, JobState::Uploaded);

        // Missing job: also a decline, not a panic.
        assert!(store.apply_if(JobId::new(), |_| Some(())).is_none());
    }
}
