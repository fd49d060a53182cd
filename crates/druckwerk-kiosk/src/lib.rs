// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Druckwerk — the job lifecycle core: single-slot job store, status
// projection, and the orchestrator that owns the state machine.

pub mod orchestrator;
pub mod status;
pub mod store;

pub use orchestrator::{JobOrchestrator, UploadReceipt};
pub use status::JobStatusView;
pub use store::JobStore;
