// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Druckwerk.

use thiserror::Error;

use crate::types::JobState;

/// Top-level error type for all Druckwerk operations.
#[derive(Debug, Error)]
pub enum DruckwerkError {
    // -- Validation (rejected before a job exists) --
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    // -- State (rejected, job unchanged) --
    #[error("another document is already in progress")]
    SlotOccupied,

    #[error("operation '{operation}' not allowed while job is {state}")]
    InvalidState { operation: String, state: JobState },

    // -- Staleness --
    #[error("stale reference: {0}")]
    StaleReference(String),

    #[error("no active job matches id {0}")]
    UnknownJob(String),

    // -- Resolution --
    #[error("page count resolution failed: {0}")]
    Resolution(String),

    // -- External collaborators --
    #[error("payment collaborator error: {0}")]
    Payment(String),

    #[error("print collaborator error: {0}")]
    Print(String),

    // -- Internal --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of an error, so a transport layer can pick a
/// response code without string-matching on messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Rejected synchronously; no job was created, no cleanup needed.
    Validation,
    /// Job was created, then immediately failed; cleanup has run.
    Resolution,
    /// Operation illegal in the current state; job unchanged.
    State,
    /// A documentRef or job id did not match the active job.
    Stale,
    /// A payment/print backend error or timeout; the job has failed.
    External,
    /// Unexpected internal failure.
    Internal,
}

impl DruckwerkError {
    /// Map this error onto the fault taxonomy.
    pub fn kind(&self) -> FaultKind {
        match self {
            Self::UnsupportedFormat(_) | Self::MalformedRequest(_) => FaultKind::Validation,
            Self::SlotOccupied | Self::InvalidState { .. } => FaultKind::State,
            Self::StaleReference(_) | Self::UnknownJob(_) => FaultKind::Stale,
            Self::Resolution(_) => FaultKind::Resolution,
            Self::Payment(_) | Self::Print(_) => FaultKind::External,
            Self::Config(_) | Self::Internal(_) | Self::Io(_) | Self::Serialization(_) => {
                FaultKind::Internal
            }
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DruckwerkError>;
