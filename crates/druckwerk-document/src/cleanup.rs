// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spool cleanup — removal of a job's backing document.
//
// The exactly-once guarantee lives in the orchestrator (the removal is
// claimed under the job slot's lock); this manager does the filesystem work
// and tolerates a document that is already gone.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{info, instrument, warn};

use druckwerk_core::error::Result;
use druckwerk_core::types::DocumentRef;

/// Removes staged documents from the spool directory.
#[derive(Debug, Default)]
pub struct CleanupManager {
    /// Total removal invocations, observable for exactly-once assertions.
    invocations: AtomicU64,
}

impl CleanupManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the backing document.
    ///
    /// An already-absent file is logged and treated as success — the goal is
    /// "the document is gone", not "we deleted it". Other I/O errors are
    /// returned; the caller logs them and the job's terminal state stands.
    #[instrument(skip(self, document), fields(document = %document))]
    pub async fn remove(&self, document: &DocumentRef) -> Result<()> {
        self.invocations.fetch_add(1, Ordering::SeqCst);

        match tokio::fs::remove_file(document.path()).await {
            Ok(()) => {
                info!("staged document removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("staged document already absent at cleanup");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// How many times `remove` has been invoked on this manager.
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::SeqCst)
    }
}
