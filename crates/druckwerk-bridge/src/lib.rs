// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Druckwerk — external collaborator boundaries.
//
// The payment provider and print backend are consumed through narrow traits;
// their asynchronous confirmations travel back as events on a channel. The
// reference deployment wires simulated collaborators, a real deployment wires
// an acquirer webhook and the CUPS backend without touching the state machine.

pub mod cups;
pub mod events;
pub mod simulated;
pub mod traits;

pub use events::{CollaboratorEvent, EventSink, EventStream, event_channel};
pub use traits::{PaymentProvider, PrintBackend};
