// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Druckwerk — document-side collaborators: page count resolution and
// spool directory cleanup.

pub mod cleanup;
pub mod resolver;

pub use cleanup::CleanupManager;
pub use resolver::{PageCountResolver, StructuralPageResolver};
