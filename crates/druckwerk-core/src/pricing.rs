// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pricing calculator — pure function from (page count, print mode) to a
// monetary amount. Used at quote time and at re-quote time after a mode
// change; never called once the price is frozen at payment initiation.

use crate::config::Tariff;
use crate::types::{Money, PrintMode};

/// Quote the price for printing `page_count` pages in the given mode.
pub fn quote(page_count: u32, mode: PrintMode, tariff: &Tariff) -> Money {
    tariff.rate(mode).times(page_count)
}
